// src/errors.rs
use actix_web::{HttpResponse, ResponseError};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum FloraError {
    #[error("Analysis error: {0}")]
    Analysis(String),

    #[error("Image input error: {0}")]
    ImageInput(String),

    #[error("Invalid transition: cannot {action} while {status}")]
    InvalidTransition {
        action: &'static str,
        status: &'static str,
    },

    #[error("Configuration error: {0}")]
    Config(String),
}

impl ResponseError for FloraError {
    fn error_response(&self) -> HttpResponse {
        match self {
            FloraError::Analysis(_) => HttpResponse::ServiceUnavailable().json(serde_json::json!({
                "error": "AI service error",
                "message": self.to_string()
            })),
            FloraError::ImageInput(_) => HttpResponse::BadRequest().json(serde_json::json!({
                "error": "Image input error",
                "message": self.to_string()
            })),
            FloraError::InvalidTransition { .. } => {
                HttpResponse::Conflict().json(serde_json::json!({
                    "error": "Invalid transition",
                    "message": self.to_string()
                }))
            }
            FloraError::Config(_) => HttpResponse::InternalServerError().json(serde_json::json!({
                "error": "Configuration error",
                "message": self.to_string()
            })),
        }
    }
}
