// src/services/analysis_client.rs
use crate::errors::FloraError;
use crate::models::AnalysisResult;
use async_trait::async_trait;

/// The single boundary to whatever produces diagnoses. Implementations must
/// fold every failure (transport, empty response, unparseable payload) into
/// one `Err`; callers never retry.
#[async_trait]
pub trait AnalysisClient: Send + Sync {
    async fn analyze(&self, base64_image: &str) -> Result<AnalysisResult, FloraError>;

    fn name(&self) -> &str;
}

/// Drops a `data:...;base64,` style header: everything up to and including
/// the first comma. Input without a comma is returned as-is.
pub fn strip_data_uri_header(base64_image: &str) -> &str {
    match base64_image.split_once(',') {
        Some((_, payload)) => payload,
        None => base64_image,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strips_png_header() {
        assert_eq!(
            strip_data_uri_header("data:image/png;base64,iVBORw0KGgo="),
            "iVBORw0KGgo="
        );
    }

    #[test]
    fn bare_payload_is_untouched() {
        assert_eq!(strip_data_uri_header("iVBORw0KGgo="), "iVBORw0KGgo=");
    }

    #[test]
    fn only_first_comma_is_consumed() {
        assert_eq!(strip_data_uri_header("data:x;base64,ab,cd"), "ab,cd");
    }
}
