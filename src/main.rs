// src/main.rs
use actix_web::{App, HttpServer, middleware, web};
use anyhow::Context;
use floraguard::config::Config;
use floraguard::services::GeminiService;
use floraguard::{AppState, configure};
use log::info;
use std::sync::Arc;

#[actix_web::main]
async fn main() -> anyhow::Result<()> {
    env_logger::init_from_env(env_logger::Env::new().default_filter_or("info"));

    info!("Starting FloraGuard...");

    let config = Config::from_env()?;
    info!("Loaded configuration: {:?}", config);

    let gemini = Arc::new(GeminiService::new(&config)?);
    let app_state = AppState::new(gemini);

    info!("Open http://{} in a browser to scan a plant", config.bind);

    HttpServer::new(move || {
        App::new()
            .app_data(web::Data::new(app_state.clone()))
            .wrap(middleware::Logger::default())
            .configure(configure)
    })
    .workers(1)
    .bind(&config.bind)
    .with_context(|| format!("failed to bind {}", config.bind))?
    .run()
    .await?;

    Ok(())
}
