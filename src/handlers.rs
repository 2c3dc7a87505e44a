// src/handlers.rs
use crate::{AppState, errors::FloraError, views};
use actix_multipart::Multipart;
use actix_web::{Error, HttpResponse, http::header, web};
use log::warn;
use serde::Deserialize;

// Embedded at build time; no files are read at runtime.
const STYLESHEET: &str = include_str!("../static/floraguard.css");

#[derive(Debug, Deserialize)]
pub struct PageQuery {
    focus: Option<String>,
}

impl PageQuery {
    fn show_focus(&self) -> bool {
        self.focus.as_deref() != Some("hidden")
    }
}

fn see_other(location: &str) -> HttpResponse {
    HttpResponse::SeeOther()
        .insert_header((header::LOCATION, location))
        .finish()
}

pub async fn index(data: web::Data<AppState>, query: web::Query<PageQuery>) -> HttpResponse {
    let state = data.session.current();

    HttpResponse::Ok()
        .content_type("text/html; charset=utf-8")
        .body(views::render_page(&state, query.show_focus()))
}

pub async fn scan(payload: Multipart, data: web::Data<AppState>) -> Result<HttpResponse, Error> {
    // Reject before reading megabytes of upload we cannot use.
    let current = data.session.current().status();
    if current != crate::state::Status::Idle {
        return Err(FloraError::InvalidTransition {
            action: "submit",
            status: current.as_str(),
        }
        .into());
    }

    match data.image_input.from_multipart(payload).await {
        Ok(image) => {
            data.session.submit(image)?;
        }
        Err(e) => {
            warn!("Upload could not be read: {}", e);
            data.session.fail_input(&e)?;
        }
    }

    Ok(see_other("/"))
}

pub async fn reset(data: web::Data<AppState>) -> HttpResponse {
    data.session.reset();
    see_other("/")
}

pub async fn get_state(data: web::Data<AppState>) -> HttpResponse {
    HttpResponse::Ok().json(data.session.current().snapshot())
}

pub async fn stylesheet() -> HttpResponse {
    HttpResponse::Ok()
        .content_type("text/css; charset=utf-8")
        .body(STYLESHEET)
}

pub async fn health_check() -> HttpResponse {
    HttpResponse::Ok().json(serde_json::json!({
        "status": "healthy",
        "service": "floraguard",
        "version": env!("CARGO_PKG_VERSION")
    }))
}
