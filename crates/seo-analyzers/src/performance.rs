use async_trait::async_trait;
use audit_common::{Analyzer, AnalyzerError, AuditContext, Scorecard, Severity};
use serde::Serialize;

pub const NAME: &str = "performance";

const SLOW_RESPONSE_MS: u64 = 800;
const MAX_PAGE_BYTES: usize = 500 * 1024;
const MAX_SCRIPTS: usize = 15;
const MAX_STYLESHEETS: usize = 10;
const MAX_DOM_ELEMENTS: usize = 1500;

#[derive(Debug, Default, Serialize)]
struct PerformanceFindings {
    /// Absent when the page was not fetched over the network
    response_time_ms: Option<u64>,
    total_time_ms: Option<u64>,
    page_bytes: usize,
    scripts: usize,
    blocking_scripts: usize,
    stylesheets: usize,
    inline_styles: usize,
    dom_elements: usize,
}

/// Page weight, resource counts and (when fetched) server timing.
#[derive(Debug, Default)]
pub struct PerformanceAnalyzer {
    findings: PerformanceFindings,
}

#[async_trait(?Send)]
impl Analyzer for PerformanceAnalyzer {
    fn name(&self) -> &str {
        NAME
    }

    async fn collect(&mut self, cx: &AuditContext<'_>) -> Result<(), AnalyzerError> {
        let f = &mut self.findings;

        if let Some(timing) = cx.page.timing() {
            f.response_time_ms = Some(timing.response_time.as_millis() as u64);
            f.total_time_ms = Some(timing.total_time.as_millis() as u64);
        }
        f.page_bytes = cx.page.source().len();

        f.scripts = cx.dom.count("script[src]")?;
        f.blocking_scripts = cx
            .dom
            .query_many("head script[src]")?
            .into_iter()
            .filter(|el| {
                let attrs = el.value();
                attrs.attr("async").is_none()
                    && attrs.attr("defer").is_none()
                    && attrs.attr("type") != Some("module")
            })
            .count();
        f.stylesheets = cx.dom.count(r#"link[rel="stylesheet"]"#)?;
        f.inline_styles = cx.dom.count("[style]")?;
        f.dom_elements = cx.dom.count("*")?;
        Ok(())
    }

    fn validate(&self, card: &mut Scorecard) -> Result<(), AnalyzerError> {
        let f = &self.findings;

        match f.response_time_ms {
            Some(ms) if ms > SLOW_RESPONSE_MS => {
                card.add_issue_with_details(
                    Severity::Warning,
                    "Slow server response",
                    format!("{ms} ms"),
                );
            }
            Some(ms) => card.add_passed_with_details("Fast server response", format!("{ms} ms")),
            None => {}
        }

        if f.page_bytes > MAX_PAGE_BYTES {
            card.add_issue_with_details(
                Severity::Warning,
                "Large page size",
                format!("{} KB", f.page_bytes / 1024),
            );
        } else {
            card.add_passed_with_details(
                "Page size within budget",
                format!("{} KB", f.page_bytes / 1024),
            );
        }

        if f.scripts > MAX_SCRIPTS {
            card.add_issue_with_details(
                Severity::Warning,
                "Too many scripts",
                format!("{} external scripts", f.scripts),
            );
        }
        if f.blocking_scripts > 0 {
            card.add_issue_with_details(
                Severity::Warning,
                "Render-blocking scripts in head",
                format!("{} scripts", f.blocking_scripts),
            );
        }
        if f.stylesheets > MAX_STYLESHEETS {
            card.add_issue_with_details(
                Severity::Info,
                "Too many stylesheets",
                format!("{} stylesheets", f.stylesheets),
            );
        }

        if f.dom_elements > MAX_DOM_ELEMENTS {
            card.add_issue_with_details(
                Severity::Warning,
                "Excessive DOM size",
                format!("{} elements", f.dom_elements),
            );
        } else {
            card.add_passed_with_details(
                "DOM size reasonable",
                format!("{} elements", f.dom_elements),
            );
        }
        Ok(())
    }

    fn data(&self) -> serde_json::Value {
        serde_json::to_value(&self.findings).unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use audit_common::{run_analyzer, Page, PageTiming};

    use super::*;
    use crate::testing::{audit, has_issue};

    #[tokio::test]
    async fn test_light_local_page() {
        let result =
            audit::<PerformanceAnalyzer>("<html><head></head><body><p>hi</p></body></html>").await;
        assert!(result.issues.is_empty(), "{:?}", result.issues);
        assert!(result.data["response_time_ms"].is_null());
    }

    #[tokio::test]
    async fn test_heavy_page() {
        let scripts: String = (0..16)
            .map(|i| format!(r#"<script src="/{i}.js"></script>"#))
            .collect();
        let head = r#"<script src="/app.js"></script><script src="/m.js" type="module"></script>"#;
        let html = format!("<html><head>{head}</head><body>{scripts}</body></html>");
        let result = audit::<PerformanceAnalyzer>(&html).await;
        assert!(has_issue(&result, "Too many scripts"));
        assert!(has_issue(&result, "Render-blocking scripts in head"));
        assert_eq!(result.data["blocking_scripts"], 1);
        assert_eq!(result.data["scripts"], 18);
    }

    #[tokio::test]
    async fn test_slow_response() {
        let timing = PageTiming {
            response_time: Duration::from_millis(1200),
            total_time: Duration::from_millis(1500),
            transfer_bytes: 64,
        };
        let page = Page::parse("https://example.com/", "<p>slow</p>").with_timing(timing);
        let cx = AuditContext::new(&page);
        let result = run_analyzer(Box::new(PerformanceAnalyzer::default()), &cx, None).await;
        assert!(has_issue(&result, "Slow server response"));
        assert_eq!(result.score, 90);
        assert_eq!(result.data["response_time_ms"], 1200);
    }
}
