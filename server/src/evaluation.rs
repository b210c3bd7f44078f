use actix_web::{post, web, HttpResponse};

use klm_closure::evaluation::EvaluationRequest;

use crate::config::Config;
use crate::error::{compute, ApiError};

pub(crate) fn routes(cfg: &mut web::ServiceConfig) {
    cfg.service(evaluate).service(import).service(export);
}

fn bounded(config: &Config, mut request: EvaluationRequest) -> EvaluationRequest {
    let budget = config.budget_ms();
    request.timeout_ms = Some(request.timeout_ms.map_or(budget, |ms| ms.min(budget)));
    request
}

/// Benchmarks generated knowledge bases.
#[post("/evaluation")]
async fn evaluate(
    config: web::Data<Config>,
    request: web::Json<EvaluationRequest>,
) -> Result<HttpResponse, ApiError> {
    let mut request = bounded(&config, request.into_inner());
    if request.generators.is_empty() {
        return Err(ApiError::EmptyEvaluation {
            missing: "generator settings",
        });
    }
    request.knowledge_bases.clear();
    let reports = compute(&config, "/evaluation", move || request.run()).await?;
    Ok(HttpResponse::Ok().json(reports))
}

/// Benchmarks imported knowledge bases with their queries.
#[post("/evaluation/import")]
async fn import(
    config: web::Data<Config>,
    request: web::Json<EvaluationRequest>,
) -> Result<HttpResponse, ApiError> {
    let mut request = bounded(&config, request.into_inner());
    if request.knowledge_bases.is_empty() {
        return Err(ApiError::EmptyEvaluation {
            missing: "knowledge bases",
        });
    }
    request.generators.clear();
    let reports = compute(&config, "/evaluation/import", move || request.run()).await?;
    Ok(HttpResponse::Ok().json(reports))
}

/// Generates the knowledge bases of the generator settings without benchmarking them.
#[post("/evaluation/export")]
async fn export(
    config: web::Data<Config>,
    request: web::Json<EvaluationRequest>,
) -> Result<HttpResponse, ApiError> {
    let request = request.into_inner();
    let generated = compute(&config, "/evaluation/export", move || Ok(request.export())).await?;
    Ok(HttpResponse::Ok().json(generated))
}

#[cfg(test)]
mod test {
    use super::*;
    use actix_web::http::StatusCode;
    use actix_web::{test, App};
    use serde_json::{json, Value};

    #[actix_web::test]
    async fn evaluation_routes() {
        let app = test::init_service(
            App::new()
                .app_data(web::Data::new(Config::default()))
                .configure(routes),
        )
        .await;

        let req = test::TestRequest::post()
            .uri("/evaluation")
            .set_json(json!({
                "generators": [{"ranks": 3, "statements": 6, "queries": 2, "seed": 3}],
                "algorithms": ["rational-naive", "lexical-naive"]
            }))
            .to_request();
        let reports: Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(reports[0]["ranks"], json!(3));
        assert_eq!(reports[0]["timings"][1]["algorithm"], json!("lexical"));
        assert_eq!(reports[0]["timings"][1]["times"].as_array().map(Vec::len), Some(2));

        let req = test::TestRequest::post()
            .uri("/evaluation/import")
            .set_json(json!({
                "knowledgeBases": [{
                    "knowledgeBase": ["b=>p", "p~>f", "b~>!f"],
                    "queries": ["b~>!f"]
                }],
                "algorithms": ["basic-relevant"]
            }))
            .to_request();
        let reports: Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(reports[0]["generator"], Value::Null);
        assert_eq!(reports[0]["timings"][0]["entailed"], json!([true]));

        let req = test::TestRequest::post()
            .uri("/evaluation/import")
            .set_json(json!({"generators": [{"ranks": 1}]}))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

        let req = test::TestRequest::post()
            .uri("/evaluation/export")
            .set_json(json!({"generators": [{"ranks": 2, "statements": 2, "queries": 1}]}))
            .to_request();
        let generated: Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(
            generated[0]["knowledgeBase"].as_array().map(Vec::len),
            Some(3)
        );
        assert_eq!(generated[0]["generator"]["ranks"], json!(2));
    }
}
