use std::sync::LazyLock;

use async_trait::async_trait;
use audit_common::{Analyzer, AnalyzerError, AuditContext, Scorecard, Severity};
use regex::Regex;
use serde::Serialize;

pub const NAME: &str = "mobile";

/// Anything wider than a small phone viewport.
const MAX_FIXED_WIDTH_PX: u32 = 480;
const MIN_FONT_PX: f64 = 12.0;

static FIXED_WIDTH: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)(?:^|[;\s])(?:min-)?width\s*:\s*(\d+)px").expect("valid regex")
});

static FONT_SIZE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)font-size\s*:\s*(\d+(?:\.\d+)?)px").expect("valid regex"));

#[derive(Debug, Default, Serialize)]
struct MobileFindings {
    viewport: Option<String>,
    fixed_width_elements: usize,
    small_fonts: usize,
    touch_icon: bool,
}

impl MobileFindings {
    /// Viewport directives as lowercased `key=value` pairs.
    fn directives(&self) -> Vec<(String, String)> {
        self.viewport
            .as_deref()
            .unwrap_or_default()
            .split([',', ';'])
            .filter_map(|part| {
                let (key, value) = part.split_once('=')?;
                Some((key.trim().to_ascii_lowercase(), value.trim().to_ascii_lowercase()))
            })
            .collect()
    }

    fn zoom_disabled(&self) -> bool {
        self.directives().iter().any(|(key, value)| match key.as_str() {
            "user-scalable" => value == "no" || value == "0",
            "maximum-scale" => value.parse::<f64>().is_ok_and(|scale| scale <= 1.0),
            _ => false,
        })
    }

    fn device_width(&self) -> bool {
        self.directives()
            .iter()
            .any(|(key, value)| key == "width" && value == "device-width")
    }
}

/// Viewport configuration and inline styles that break small screens.
#[derive(Debug, Default)]
pub struct MobileAnalyzer {
    findings: MobileFindings,
}

#[async_trait(?Send)]
impl Analyzer for MobileAnalyzer {
    fn name(&self) -> &str {
        NAME
    }

    async fn collect(&mut self, cx: &AuditContext<'_>) -> Result<(), AnalyzerError> {
        let f = &mut self.findings;
        f.viewport = cx.dom.attr_of(r#"meta[name="viewport"]"#, "content")?;

        for el in cx.dom.query_many("[style]")? {
            let style = el.value().attr("style").unwrap_or_default();
            let fixed = FIXED_WIDTH
                .captures_iter(style)
                .filter_map(|c| c[1].parse::<u32>().ok())
                .any(|px| px > MAX_FIXED_WIDTH_PX);
            if fixed {
                f.fixed_width_elements += 1;
            }
            let small = FONT_SIZE
                .captures_iter(style)
                .filter_map(|c| c[1].parse::<f64>().ok())
                .any(|px| px < MIN_FONT_PX);
            if small {
                f.small_fonts += 1;
            }
        }

        f.touch_icon = cx.dom.count(r#"link[rel="apple-touch-icon"]"#)? > 0;
        Ok(())
    }

    fn validate(&self, card: &mut Scorecard) -> Result<(), AnalyzerError> {
        let f = &self.findings;

        match &f.viewport {
            None => card.add_issue(Severity::Critical, "Missing viewport meta tag"),
            Some(content) => {
                if f.device_width() {
                    card.add_passed_with_details("Responsive viewport", content.clone());
                } else {
                    card.add_issue_with_details(
                        Severity::Warning,
                        "Viewport missing device-width",
                        content.clone(),
                    );
                }
                if f.zoom_disabled() {
                    card.add_issue_with_details(
                        Severity::Warning,
                        "Viewport disables zoom",
                        content.clone(),
                    );
                }
            }
        }

        if f.fixed_width_elements > 0 {
            card.add_issue_with_details(
                Severity::Warning,
                "Fixed-width elements",
                format!("{} elements wider than {MAX_FIXED_WIDTH_PX}px", f.fixed_width_elements),
            );
        }
        if f.small_fonts > 0 {
            card.add_issue_with_details(
                Severity::Info,
                "Small font sizes",
                format!("{} elements", f.small_fonts),
            );
        }
        if !f.touch_icon {
            card.add_issue(Severity::Info, "Missing touch icon");
        }
        Ok(())
    }

    fn data(&self) -> serde_json::Value {
        serde_json::to_value(&self.findings).unwrap_or_default()
    }
}
