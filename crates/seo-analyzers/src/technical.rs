use async_trait::async_trait;
use audit_common::{Analyzer, AnalyzerError, AuditContext, Priority, Scorecard, Severity};
use serde::Serialize;
use url::Url;

pub const NAME: &str = "technical";

#[derive(Debug, Default, Serialize)]
struct TechnicalFindings {
    canonical: Vec<String>,
    robots: Option<String>,
    robots_header: Option<String>,
    https: bool,
    doctype: bool,
    favicon: bool,
    hreflang: usize,
}

impl TechnicalFindings {
    fn noindex(&self) -> bool {
        [&self.robots, &self.robots_header]
            .into_iter()
            .flatten()
            .any(|directives| {
                directives
                    .split(',')
                    .any(|d| matches!(d.trim().to_ascii_lowercase().as_str(), "noindex" | "none"))
            })
    }
}

/// Indexability and crawl plumbing: canonical, robots, HTTPS, doctype, favicon.
#[derive(Debug, Default)]
pub struct TechnicalAnalyzer {
    findings: TechnicalFindings,
}

#[async_trait(?Send)]
impl Analyzer for TechnicalAnalyzer {
    fn name(&self) -> &str {
        NAME
    }

    fn priority(&self) -> Priority {
        Priority::High
    }

    async fn collect(&mut self, cx: &AuditContext<'_>) -> Result<(), AnalyzerError> {
        let f = &mut self.findings;

        f.canonical = cx
            .dom
            .query_many(r#"link[rel="canonical"]"#)?
            .into_iter()
            .filter_map(|el| el.value().attr("href"))
            .map(|href| href.trim().to_string())
            .collect();
        f.robots = cx.dom.attr_of(r#"meta[name="robots"]"#, "content")?;
        f.robots_header = cx.page.header("x-robots-tag").map(str::to_string);
        f.https = Url::parse(cx.page.url()).is_ok_and(|u| u.scheme() == "https");

        let head = cx.page.source().trim_start();
        f.doctype = head.get(..9).is_some_and(|p| p.eq_ignore_ascii_case("<!doctype"));

        f.favicon = cx
            .dom
            .query_many("link[rel]")?
            .into_iter()
            .filter_map(|el| el.value().attr("rel"))
            .any(|rel| rel.split_whitespace().any(|r| r.eq_ignore_ascii_case("icon")));
        f.hreflang = cx.dom.count(r#"link[rel="alternate"][hreflang]"#)?;
        Ok(())
    }

    fn validate(&self, card: &mut Scorecard) -> Result<(), AnalyzerError> {
        let f = &self.findings;

        match f.canonical.len() {
            0 => card.add_issue(Severity::Warning, "Missing canonical URL"),
            1 => card.add_passed_with_details("Canonical URL set", f.canonical[0].clone()),
            _ => card.add_issue_with_details(
                Severity::Critical,
                "Multiple canonical URLs",
                f.canonical.join(", "),
            ),
        }

        if f.noindex() {
            card.add_issue(Severity::Critical, "Page blocked from indexing");
        } else {
            card.add_passed("Page is indexable");
        }

        if f.https {
            card.add_passed("Served over HTTPS");
        } else {
            card.add_issue(Severity::Warning, "Page not served over HTTPS");
        }

        if !f.doctype {
            card.add_issue(Severity::Info, "Missing doctype");
        }
        if !f.favicon {
            card.add_issue(Severity::Info, "Missing favicon");
        }
        if f.hreflang > 0 {
            card.add_passed_with_details(
                "Language alternates declared",
                format!("{} hreflang links", f.hreflang),
            );
        }
        Ok(())
    }

    fn data(&self) -> serde_json::Value {
        serde_json::to_value(&self.findings).unwrap_or_default()
    }
}
