use actix_files as fs;
use actix_web::{web, App, HttpServer};

#[cfg(feature = "cors_for_local_development")]
use actix_cors::Cors;

mod config;
mod error;
mod evaluation;
mod reasoning;

use config::{Config, JSON_LIMIT};

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    env_logger::builder()
        .filter_level(log::LevelFilter::Info)
        .parse_default_env()
        .init();

    let config = Config::from_env();
    log::info!(
        "serving on {}:{}, assets from {}, compute time {:?}",
        config.bind,
        config.port,
        config.assets,
        config.compute_time
    );
    let data = web::Data::new(config.clone());

    HttpServer::new(move || {
        let app = App::new();

        #[cfg(feature = "cors_for_local_development")]
        let cors = Cors::default()
            .allowed_origin("http://localhost:1234")
            .allow_any_method()
            .allow_any_header()
            .max_age(3600);

        #[cfg(feature = "cors_for_local_development")]
        let app = app.wrap(cors);

        app.app_data(data.clone())
            .app_data(web::JsonConfig::default().limit(JSON_LIMIT))
            .configure(reasoning::routes)
            .configure(evaluation::routes)
            // this must be last to not override anything
            .service(fs::Files::new("/", data.assets.clone()).index_file("index.html"))
    })
    .bind((config.bind.as_str(), config.port))?
    .run()
    .await
}
