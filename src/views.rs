// src/views.rs
use crate::models::{AnalysisResult, Severity};
use crate::overlay::HeatmapLayer;
use crate::services::ImageDataUri;
use crate::state::AnalysisState;
use chrono::{DateTime, Utc};

const STYLESHEET: &str = "/static/floraguard.css";
const ANALYZING_REFRESH_SECS: u32 = 2;

pub fn escape_html(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            _ => escaped.push(c),
        }
    }
    escaped
}

/// Renders the whole page for the current state. `show_focus` is the
/// viewer's overlay toggle and only matters on the result page.
pub fn render_page(state: &AnalysisState, show_focus: bool) -> String {
    match state {
        AnalysisState::Idle => layout(idle_body(), None),
        AnalysisState::Analyzing { .. } => layout(analyzing_body(), Some(ANALYZING_REFRESH_SECS)),
        AnalysisState::Complete {
            image,
            result,
            analyzed_at,
        } => layout(complete_body(image, result, analyzed_at, show_focus), None),
        AnalysisState::Error { message, .. } => layout(error_body(message), None),
    }
}

fn layout(body: String, refresh_secs: Option<u32>) -> String {
    let refresh = refresh_secs
        .map(|secs| format!("<meta http-equiv=\"refresh\" content=\"{}\">", secs))
        .unwrap_or_default();

    format!(
        "<!DOCTYPE html>\
<html lang=\"en\">\
<head>\
<meta charset=\"utf-8\">\
<meta name=\"viewport\" content=\"width=device-width, initial-scale=1\">\
{refresh}\
<title>FloraGuard AI</title>\
<link rel=\"stylesheet\" href=\"{STYLESHEET}\">\
</head>\
<body>\
<header class=\"app-bar\"><h1>FloraGuard AI</h1></header>\
<main>{body}</main>\
<footer>Powered by Gemini.</footer>\
</body>\
</html>"
    )
}

fn reset_button(label: &str, class: &str) -> String {
    format!(
        "<form method=\"post\" action=\"/reset\"><button type=\"submit\" class=\"{}\">{}</button></form>",
        class, label
    )
}

fn idle_body() -> String {
    "<section class=\"idle\">\
<h2>Is your plant healthy?</h2>\
<p>Instant disease detection with AI-powered heatmap diagnostics and severity tracking.</p>\
<form class=\"acquire\" method=\"post\" action=\"/scan\" enctype=\"multipart/form-data\">\
<label class=\"button primary\">Take Photo\
<input type=\"file\" name=\"image\" accept=\"image/*\" capture=\"environment\" onchange=\"this.form.submit()\">\
</label>\
</form>\
<form class=\"acquire\" method=\"post\" action=\"/scan\" enctype=\"multipart/form-data\">\
<label class=\"button secondary\">Upload from Gallery\
<input type=\"file\" name=\"image\" accept=\"image/*\" onchange=\"this.form.submit()\">\
</label>\
</form>\
<p class=\"hint\">Supported formats: JPEG, PNG, WEBP.<br>Ensure good lighting for best accuracy.</p>\
</section>"
        .to_string()
}

fn analyzing_body() -> String {
    format!(
        "<section class=\"analyzing\">\
<div class=\"spinner\"></div>\
<h3>Analyzing Leaf Structure...</h3>\
<p>Identifying potential pathogens and generating severity heatmap.</p>\
{}\
</section>",
        reset_button("Cancel", "button ghost")
    )
}

fn severity_class(severity: Severity) -> &'static str {
    match severity {
        Severity::High => "severity-high",
        Severity::Medium => "severity-medium",
        Severity::Low => "severity-low",
        Severity::None => "severity-none",
    }
}

fn complete_body(
    image: &ImageDataUri,
    result: &AnalysisResult,
    analyzed_at: &DateTime<Utc>,
    show_focus: bool,
) -> String {
    let badge = if result.is_healthy {
        "<span class=\"badge badge-healthy\">Healthy</span>"
    } else {
        "<span class=\"badge badge-diseased\">Diseased</span>"
    };

    let toggle_href = if show_focus { "/?focus=hidden" } else { "/" };
    let heatmap = HeatmapLayer::new(&result.regions, result.severity, show_focus)
        .render_html(image.as_str(), toggle_href);

    let mut html = String::new();
    html.push_str("<section class=\"result\">");
    html.push_str(&format!(
        "<div class=\"result-header\"><h2>{}</h2><div>{}<span class=\"confidence\">Confidence: {:.0}%</span></div></div>",
        escape_html(&result.plant_name),
        badge,
        result.confidence.round()
    ));
    html.push_str(&heatmap);
    html.push_str("<p class=\"caption\">AI Attention Heatmap (Simulated)</p>");

    html.push_str(&format!(
        "<div class=\"stats\">\
<div class=\"stat\"><div class=\"stat-label\">Severity</div><div class=\"badge {}\">{}</div></div>\
<div class=\"stat\"><div class=\"stat-label\">Issue</div><div class=\"stat-value\">{}</div></div>\
</div>",
        severity_class(result.severity),
        result.severity,
        escape_html(result.disease_name.as_deref().unwrap_or("None"))
    ));

    html.push_str(&format!(
        "<div class=\"card\"><h3>Diagnosis</h3><p>{}</p>",
        escape_html(&result.description)
    ));
    if !result.is_healthy && !result.treatment.is_empty() {
        html.push_str("<div class=\"treatment\"><h3>Recommended Treatment</h3><ol>");
        for step in &result.treatment {
            html.push_str(&format!("<li>{}</li>", escape_html(step)));
        }
        html.push_str("</ol></div>");
    }
    html.push_str("</div>");

    html.push_str(&format!(
        "<p class=\"timestamp\">Analyzed {}</p>",
        analyzed_at.format("%Y-%m-%d %H:%M UTC")
    ));
    html.push_str(&reset_button("New Plant Scan", "button primary"));
    html.push_str("</section>");
    html
}

fn error_body(message: &str) -> String {
    format!(
        "<section class=\"error\">\
<h3>Analysis Failed</h3>\
<p>{}</p>\
{}\
</section>",
        escape_html(message),
        reset_button("Try Again", "button primary")
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::DiseaseRegion;
    use crate::state::ANALYSIS_FAILED_MESSAGE;

    fn image() -> ImageDataUri {
        ImageDataUri::new("data:image/jpeg;base64,/9j/4AAQ")
    }

    fn diseased() -> AnalysisResult {
        AnalysisResult {
            plant_name: "Tomato <Solanum>".to_string(),
            is_healthy: false,
            disease_name: Some("Late Blight".to_string()),
            severity: Severity::High,
            confidence: 76.6,
            description: "Water-soaked lesions.".to_string(),
            treatment: vec!["Remove infected foliage".to_string(), "Apply fungicide".to_string()],
            regions: vec![
                DiseaseRegion { ymin: 100.0, xmin: 100.0, ymax: 400.0, xmax: 300.0 },
                DiseaseRegion { ymin: 500.0, xmin: 600.0, ymax: 700.0, xmax: 900.0 },
            ],
        }
    }

    fn complete(result: AnalysisResult) -> AnalysisState {
        AnalysisState::Complete {
            image: image(),
            result,
            analyzed_at: Utc::now(),
        }
    }

    #[test]
    fn escapes_markup() {
        assert_eq!(
            escape_html("<b>\"Rose\" & 'Ivy'</b>"),
            "&lt;b&gt;&quot;Rose&quot; &amp; &#39;Ivy&#39;&lt;/b&gt;"
        );
    }

    #[test]
    fn idle_page_offers_camera_and_gallery() {
        let html = render_page(&AnalysisState::Idle, true);
        assert!(html.contains("Take Photo"));
        assert!(html.contains("Upload from Gallery"));
        assert!(html.contains("accept=\"image/*\""));
        assert!(html.contains("capture=\"environment\""));
    }

    #[test]
    fn analyzing_page_refreshes_and_hides_acquisition() {
        let html = render_page(&AnalysisState::Analyzing { image: image() }, true);
        assert!(html.contains("http-equiv=\"refresh\""));
        assert!(html.contains("Analyzing Leaf Structure..."));
        assert!(!html.contains("action=\"/scan\""));
    }

    #[test]
    fn diseased_result_shows_treatment_and_heatmap() {
        let html = render_page(&complete(diseased()), true);
        assert!(html.contains("Tomato &lt;Solanum&gt;"));
        assert!(html.contains("Diseased"));
        assert!(html.contains("Confidence: 77%"));
        assert!(html.contains("Late Blight"));
        assert!(html.contains("<li>Apply fungicide</li>"));
        assert_eq!(html.matches("class=\"heat-glow\"").count(), 2);
        assert_eq!(html.matches("class=\"heat-outline\"").count(), 2);
        assert!(html.contains("New Plant Scan"));
    }

    #[test]
    fn focus_toggle_hides_overlay_only() {
        let html = render_page(&complete(diseased()), false);
        assert_eq!(html.matches("class=\"heat-glow\"").count(), 0);
        assert!(html.contains("Show AI Focus"));
        assert!(html.contains("Late Blight"));
    }

    #[test]
    fn healthy_result_hides_treatment_and_names_no_issue() {
        let mut result = diseased();
        result.is_healthy = true;
        result.disease_name = None;
        result.severity = Severity::None;
        let html = render_page(&complete(result), true);
        assert!(html.contains(">Healthy<"));
        assert!(!html.contains("Recommended Treatment"));
        assert!(html.contains("<div class=\"stat-value\">None</div>"));
        assert!(html.contains("rgba(34, 197, 94, 0.4)"));
    }

    #[test]
    fn error_page_shows_generic_message() {
        let state = AnalysisState::Error {
            image: None,
            message: ANALYSIS_FAILED_MESSAGE.to_string(),
        };
        let html = render_page(&state, true);
        assert!(html.contains("Analysis Failed"));
        assert!(html.contains("Please try again or use a clearer photo."));
        assert!(html.contains("Try Again"));
    }
}
