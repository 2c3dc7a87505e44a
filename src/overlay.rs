// src/overlay.rs
//! Heatmap overlay: turns normalized 0-1000 regions into percentage-placed
//! glow and outline elements over the analyzed photo.

use crate::models::{DiseaseRegion, Severity};
use crate::views::escape_html;
use std::fmt;

const GRID: f64 = 1000.0;
const GLOW_SCALE: f64 = 1.5;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GlowColor {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub alpha: f32,
}

impl fmt::Display for GlowColor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "rgba({}, {}, {}, {})", self.r, self.g, self.b, self.alpha)
    }
}

pub fn glow_color(severity: Severity) -> GlowColor {
    match severity {
        Severity::High => GlowColor { r: 239, g: 68, b: 68, alpha: 0.6 },
        Severity::Medium => GlowColor { r: 249, g: 115, b: 22, alpha: 0.6 },
        Severity::Low => GlowColor { r: 234, g: 179, b: 8, alpha: 0.6 },
        // Healthy plants get a softer highlight on the subject.
        Severity::None => GlowColor { r: 34, g: 197, b: 94, alpha: 0.4 },
    }
}

/// Box position as percentages of the rendered image.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PercentBox {
    pub top: f64,
    pub left: f64,
    pub width: f64,
    pub height: f64,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Glow {
    pub center_x: f64,
    pub center_y: f64,
    pub size: f64,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RegionOverlay {
    pub outline: PercentBox,
    pub glow: Glow,
}

fn clamp_coord(value: f64) -> f64 {
    if value.is_nan() {
        0.0
    } else {
        value.clamp(0.0, GRID)
    }
}

fn ordered(a: f64, b: f64) -> (f64, f64) {
    if a <= b { (a, b) } else { (b, a) }
}

impl RegionOverlay {
    pub fn from_region(region: &DiseaseRegion) -> Self {
        let (ymin, ymax) = ordered(clamp_coord(region.ymin), clamp_coord(region.ymax));
        let (xmin, xmax) = ordered(clamp_coord(region.xmin), clamp_coord(region.xmax));

        let outline = PercentBox {
            top: ymin / 10.0,
            left: xmin / 10.0,
            width: (xmax - xmin) / 10.0,
            height: (ymax - ymin) / 10.0,
        };

        let glow = Glow {
            center_x: outline.left + outline.width / 2.0,
            center_y: outline.top + outline.height / 2.0,
            size: outline.width.max(outline.height) * GLOW_SCALE,
        };

        Self { outline, glow }
    }
}

/// Everything needed to paint the heatmap. Visibility is a viewer
/// preference and never touches the analysis state.
#[derive(Debug, Clone, PartialEq)]
pub struct HeatmapLayer {
    pub color: GlowColor,
    pub regions: Vec<RegionOverlay>,
    pub visible: bool,
}

impl HeatmapLayer {
    pub fn new(regions: &[DiseaseRegion], severity: Severity, visible: bool) -> Self {
        Self {
            color: glow_color(severity),
            regions: regions.iter().map(RegionOverlay::from_region).collect(),
            visible,
        }
    }

    pub fn render_html(&self, image_uri: &str, toggle_href: &str) -> String {
        let mut html = String::new();
        html.push_str("<div class=\"heatmap\">");
        html.push_str(&format!(
            "<img class=\"heatmap-photo\" src=\"{}\" alt=\"Analyzed Plant\">",
            escape_html(image_uri)
        ));

        if self.visible {
            html.push_str("<div class=\"heatmap-layer\">");
            for region in &self.regions {
                let glow = region.glow;
                html.push_str(&format!(
                    "<div class=\"heat-glow\" style=\"top: {:.2}%; left: {:.2}%; width: {:.2}%; \
                     height: {:.2}%; background: radial-gradient(circle, {} 0%, rgba(0,0,0,0) 70%);\"></div>",
                    glow.center_y, glow.center_x, glow.size, glow.size, self.color
                ));
            }
            for region in &self.regions {
                let b = region.outline;
                html.push_str(&format!(
                    "<div class=\"heat-outline\" style=\"top: {:.2}%; left: {:.2}%; width: {:.2}%; \
                     height: {:.2}%;\"></div>",
                    b.top, b.left, b.width, b.height
                ));
            }
            html.push_str("</div>");
        }

        let label = if self.visible {
            "Hide AI Focus"
        } else {
            "Show AI Focus"
        };
        html.push_str(&format!(
            "<a class=\"focus-toggle\" href=\"{}\">{}</a>",
            escape_html(toggle_href),
            label
        ));
        html.push_str("</div>");
        html
    }
}
