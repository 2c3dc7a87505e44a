// src/models.rs
use serde::{Deserialize, Serialize};
use std::fmt;

/// Bounding box on a normalized 1000x1000 grid, independent of the
/// source image resolution. The producing service does not guarantee
/// `min <= max` or the [0, 1000] range; consumers clamp.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DiseaseRegion {
    pub ymin: f64,
    pub xmin: f64,
    pub ymax: f64,
    pub xmax: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Severity {
    Low,
    Medium,
    High,
    None,
}

impl Severity {
    pub const ALL: [Severity; 4] = [
        Severity::Low,
        Severity::Medium,
        Severity::High,
        Severity::None,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Severity::Low => "LOW",
            Severity::Medium => "MEDIUM",
            Severity::High => "HIGH",
            Severity::None => "NONE",
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One completed diagnosis, exactly as the analysis service returned it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisResult {
    pub plant_name: String,
    pub is_healthy: bool,
    #[serde(default)]
    pub disease_name: Option<String>,
    pub severity: Severity,
    pub confidence: f64,
    pub description: String,
    pub treatment: Vec<String>,
    pub regions: Vec<DiseaseRegion>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_service_payload() {
        let raw = r#"{
            "plantName": "Tomato",
            "isHealthy": false,
            "diseaseName": "Early Blight",
            "severity": "MEDIUM",
            "confidence": 87.5,
            "description": "Concentric lesions on lower leaves.",
            "treatment": ["Remove affected leaves", "Apply copper fungicide"],
            "regions": [{"ymin": 120, "xmin": 80, "ymax": 400, "xmax": 310.5}]
        }"#;

        let result: AnalysisResult = serde_json::from_str(raw).unwrap();
        assert_eq!(result.plant_name, "Tomato");
        assert_eq!(result.disease_name.as_deref(), Some("Early Blight"));
        assert_eq!(result.severity, Severity::Medium);
        assert_eq!(result.treatment.len(), 2);
        assert_eq!(result.regions[0].xmax, 310.5);
    }

    #[test]
    fn disease_name_may_be_null_or_absent() {
        let with_null = r#"{"plantName":"Fern","isHealthy":true,"diseaseName":null,
            "severity":"NONE","confidence":95,"description":"Fine.","treatment":[],"regions":[]}"#;
        let absent = r#"{"plantName":"Fern","isHealthy":true,
            "severity":"NONE","confidence":95,"description":"Fine.","treatment":[],"regions":[]}"#;

        let a: AnalysisResult = serde_json::from_str(with_null).unwrap();
        let b: AnalysisResult = serde_json::from_str(absent).unwrap();
        assert_eq!(a.disease_name, None);
        assert_eq!(a, b);
    }

    #[test]
    fn unknown_severity_is_rejected() {
        let raw = r#"{"plantName":"Fern","isHealthy":true,"severity":"CRITICAL",
            "confidence":95,"description":"","treatment":[],"regions":[]}"#;
        assert!(serde_json::from_str::<AnalysisResult>(raw).is_err());
    }

    #[test]
    fn severity_display_matches_wire_name() {
        for severity in Severity::ALL {
            let wire = serde_json::to_string(&severity).unwrap();
            assert_eq!(wire, format!("\"{}\"", severity));
        }
    }
}
