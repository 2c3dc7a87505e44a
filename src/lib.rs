// src/lib.rs
use actix_web::web;
use std::sync::Arc;

pub mod config;
pub mod errors;
pub mod handlers;
pub mod models;
pub mod overlay;
pub mod services;
pub mod state;
pub mod views;

use crate::services::{AnalysisClient, ImageInput};
use crate::state::AnalysisSession;

#[derive(Clone)]
pub struct AppState {
    pub session: Arc<AnalysisSession>,
    pub image_input: Arc<ImageInput>,
}

impl AppState {
    pub fn new(client: Arc<dyn AnalysisClient>) -> Self {
        Self {
            session: Arc::new(AnalysisSession::new(client)),
            image_input: Arc::new(ImageInput::new()),
        }
    }
}

pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.route("/", web::get().to(handlers::index))
        .route("/scan", web::post().to(handlers::scan))
        .route("/reset", web::post().to(handlers::reset))
        .service(web::scope("/api").route("/state", web::get().to(handlers::get_state)))
        .route("/static/floraguard.css", web::get().to(handlers::stylesheet))
        .route("/health", web::get().to(handlers::health_check));
}
