// src/services/mod.rs
pub mod analysis_client;
pub mod gemini_service;
pub mod image_input;

pub use analysis_client::AnalysisClient;
pub use gemini_service::GeminiService;
pub use image_input::{ImageDataUri, ImageInput};
