use actix_web::{post, web, HttpResponse};

use klm_closure::baserank::BaseRank;
use klm_closure::closure::{Algorithm, EntailmentResult};
use klm_closure::datatypes::KnowledgeBase;
use klm_closure::parser::parse_query;
use klm_closure::reasoner::{Reasoner, ReasonerConfig};

use crate::config::Config;
use crate::error::{compute, ApiError};

pub(crate) fn routes(cfg: &mut web::ServiceConfig) {
    cfg.service(base_rank)
        .service(base_rank_explanation)
        .service(entailment)
        .service(explanation);
}

/// The reasoner settings of a request, bounded by the compute time of the service.
fn reasoner_config(config: &Config, requested: ReasonerConfig) -> ReasonerConfig {
    let budget = config.budget_ms();
    ReasonerConfig {
        timeout_ms: Some(requested.timeout_ms.map_or(budget, |ms| ms.min(budget))),
        ..requested
    }
}

#[post("/base-rank")]
async fn base_rank(
    config: web::Data<Config>,
    settings: web::Query<ReasonerConfig>,
    statements: web::Json<Vec<String>>,
) -> Result<HttpResponse, ApiError> {
    let settings = reasoner_config(&config, settings.into_inner());
    let statements = statements.into_inner();
    let ranking = compute(&config, "/base-rank", move || {
        let knowledge_base = KnowledgeBase::parse(&statements)?;
        Reasoner::new(knowledge_base, settings).base_rank()
    })
    .await?;
    Ok(HttpResponse::Ok().json(ranking))
}

#[post("/base-rank-explanation")]
async fn base_rank_explanation(
    config: web::Data<Config>,
    settings: web::Query<ReasonerConfig>,
    ranking: web::Json<BaseRank>,
) -> Result<HttpResponse, ApiError> {
    let settings = reasoner_config(&config, settings.into_inner());
    let ranking = ranking.into_inner();
    let explained = compute(&config, "/base-rank-explanation", move || {
        Reasoner::new(ranking.knowledge_base.clone(), settings).explain_base_rank(&ranking)
    })
    .await?;
    Ok(HttpResponse::Ok().json(explained))
}

#[post("/entailment/{algorithm}/{query}")]
async fn entailment(
    config: web::Data<Config>,
    path: web::Path<(Algorithm, String)>,
    settings: web::Query<ReasonerConfig>,
    ranking: web::Json<BaseRank>,
) -> Result<HttpResponse, ApiError> {
    let (algorithm, query) = path.into_inner();
    let settings = reasoner_config(&config, settings.into_inner());
    let ranking = ranking.into_inner();
    let result = compute(&config, "/entailment", move || {
        let query = parse_query(&query)?;
        Reasoner::new(ranking.knowledge_base.clone(), settings).entail(&query, algorithm, &ranking)
    })
    .await?;
    Ok(HttpResponse::Ok().json(result))
}

#[post("/explanation/{algorithm}")]
async fn explanation(
    path: web::Path<Algorithm>,
    result: web::Json<EntailmentResult>,
) -> Result<HttpResponse, ApiError> {
    let requested = path.into_inner();
    let found = result.algorithm();
    if requested != found {
        return Err(ApiError::AlgorithmMismatch { requested, found });
    }
    Ok(HttpResponse::Ok().json(result.explain()))
}
