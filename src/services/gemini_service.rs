// src/services/gemini_service.rs
use crate::config::Config;
use crate::errors::FloraError;
use crate::models::AnalysisResult;
use crate::services::analysis_client::{AnalysisClient, strip_data_uri_header};
use async_trait::async_trait;
use log::debug;
use reqwest::Client;
use serde_json::{Value, json};
use std::time::Instant;

// Requests always declare JPEG; the uploaded MIME type is not forwarded.
const INLINE_MIME_TYPE: &str = "image/jpeg";

const ANALYSIS_PROMPT: &str = "Analyze this plant image. Identify the plant. If it is diseased, \
identify the disease, estimate severity, suggest treatments, and provide bounding box coordinates \
(0-1000 scale) for the affected areas to visualize as a heatmap. If healthy, provide coordinates \
for the main plant body.";

const SYSTEM_INSTRUCTION: &str = "You are an expert botanist and plant pathologist AI. Your goal \
is to accurately diagnose plant health issues from images.";

pub struct GeminiService {
    api_key: String,
    model: String,
    base_url: String,
    client: Client,
}

impl GeminiService {
    pub fn new(config: &Config) -> Result<Self, FloraError> {
        let client = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| FloraError::Config(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            api_key: config.api_key.clone(),
            model: config.model.clone(),
            base_url: config.base_url.clone(),
            client,
        })
    }

    fn endpoint(&self) -> String {
        format!(
            "{}/v1beta/models/{}:generateContent",
            self.base_url, self.model
        )
    }
}

#[async_trait]
impl AnalysisClient for GeminiService {
    async fn analyze(&self, base64_image: &str) -> Result<AnalysisResult, FloraError> {
        let start = Instant::now();
        let payload = strip_data_uri_header(base64_image);

        let response = self
            .client
            .post(self.endpoint())
            .header("x-goog-api-key", &self.api_key)
            .json(&request_body(payload))
            .send()
            .await
            .map_err(|e| FloraError::Analysis(format!("Gemini request failed: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response.text().await.unwrap_or_default();
            debug!("Gemini returned HTTP {}: {}", status, error_text);
            return Err(FloraError::Analysis(format!(
                "Gemini error {}: {}",
                status, error_text
            )));
        }

        let body: Value = response
            .json()
            .await
            .map_err(|e| FloraError::Analysis(format!("Failed to parse Gemini response: {}", e)))?;

        let result = parse_response(&body);
        debug!(
            "Gemini call to {} finished in {}ms",
            self.model,
            start.elapsed().as_millis()
        );
        if let Err(e) = &result {
            debug!("Gemini response rejected: {}", e);
        }
        result
    }

    fn name(&self) -> &str {
        &self.model
    }
}

pub fn request_body(payload: &str) -> Value {
    json!({
        "contents": [{
            "parts": [
                {
                    "inlineData": {
                        "mimeType": INLINE_MIME_TYPE,
                        "data": payload
                    }
                },
                {
                    "text": ANALYSIS_PROMPT
                }
            ]
        }],
        "systemInstruction": {
            "parts": [{ "text": SYSTEM_INSTRUCTION }]
        },
        "generationConfig": {
            "responseMimeType": "application/json",
            "responseSchema": response_schema()
        }
    })
}

pub fn response_schema() -> Value {
    json!({
        "type": "OBJECT",
        "properties": {
            "plantName": {
                "type": "STRING",
                "description": "The common name of the plant identified."
            },
            "isHealthy": {
                "type": "BOOLEAN",
                "description": "Whether the plant appears healthy."
            },
            "diseaseName": {
                "type": "STRING",
                "description": "Name of the disease if detected, or null if healthy.",
                "nullable": true
            },
            "severity": {
                "type": "STRING",
                "enum": ["LOW", "MEDIUM", "HIGH", "NONE"],
                "description": "The estimated severity of the disease."
            },
            "confidence": {
                "type": "NUMBER",
                "description": "Confidence score of the diagnosis from 0 to 100."
            },
            "description": {
                "type": "STRING",
                "description": "A brief 2-3 sentence explanation of the findings."
            },
            "treatment": {
                "type": "ARRAY",
                "items": { "type": "STRING" },
                "description": "List of recommended treatments or care steps."
            },
            "regions": {
                "type": "ARRAY",
                "items": {
                    "type": "OBJECT",
                    "properties": {
                        "ymin": { "type": "NUMBER", "description": "Top coordinate (0-1000)" },
                        "xmin": { "type": "NUMBER", "description": "Left coordinate (0-1000)" },
                        "ymax": { "type": "NUMBER", "description": "Bottom coordinate (0-1000)" },
                        "xmax": { "type": "NUMBER", "description": "Right coordinate (0-1000)" }
                    },
                    "required": ["ymin", "xmin", "ymax", "xmax"]
                },
                "description": "List of bounding boxes (normalized 0-1000) identifying diseased areas or key features."
            }
        },
        "required": [
            "plantName",
            "isHealthy",
            "severity",
            "confidence",
            "description",
            "treatment",
            "regions"
        ]
    })
}

/// Pulls the generated text out of a `generateContent` response and parses
/// it as the diagnosis document. Beyond JSON shape, nothing is validated.
pub fn parse_response(body: &Value) -> Result<AnalysisResult, FloraError> {
    let text: String = body["candidates"][0]["content"]["parts"]
        .as_array()
        .map(|parts| {
            parts
                .iter()
                .filter_map(|part| part["text"].as_str())
                .collect()
        })
        .unwrap_or_default();

    if text.trim().is_empty() {
        return Err(FloraError::Analysis("No response from Gemini.".to_string()));
    }

    serde_json::from_str(&text)
        .map_err(|e| FloraError::Analysis(format!("Failed to parse analysis JSON: {}", e)))
}
