use std::collections::BTreeMap;

use async_trait::async_trait;
use audit_common::{Analyzer, AnalyzerError, AuditContext, Priority, Scorecard, Severity};
use serde::Serialize;

pub const NAME: &str = "social";

const OPEN_GRAPH: &[(&str, &str, Severity)] = &[
    ("og:title", "Missing Open Graph title", Severity::Warning),
    ("og:description", "Missing Open Graph description", Severity::Warning),
    ("og:image", "Missing Open Graph image", Severity::Warning),
    ("og:url", "Missing Open Graph URL", Severity::Info),
    ("og:type", "Missing Open Graph type", Severity::Info),
];

#[derive(Debug, Default, Serialize)]
struct SocialFindings {
    open_graph: BTreeMap<String, String>,
    twitter: BTreeMap<String, String>,
}

/// Open Graph and Twitter card tags used for link previews.
#[derive(Debug, Default)]
pub struct SocialAnalyzer {
    findings: SocialFindings,
}

#[async_trait(?Send)]
impl Analyzer for SocialAnalyzer {
    fn name(&self) -> &str {
        NAME
    }

    fn priority(&self) -> Priority {
        Priority::Low
    }

    async fn collect(&mut self, cx: &AuditContext<'_>) -> Result<(), AnalyzerError> {
        for el in cx.dom.query_many("meta[property], meta[name]")? {
            let attrs = el.value();
            let Some(key) = attrs.attr("property").or(attrs.attr("name")) else {
                continue;
            };
            let content = attrs.attr("content").unwrap_or_default().trim().to_string();
            if content.is_empty() {
                continue;
            }
            let key = key.to_ascii_lowercase();
            if key.starts_with("og:") {
                self.findings.open_graph.entry(key).or_insert(content);
            } else if key.starts_with("twitter:") {
                self.findings.twitter.entry(key).or_insert(content);
            }
        }
        Ok(())
    }

    fn validate(&self, card: &mut Scorecard) -> Result<(), AnalyzerError> {
        let f = &self.findings;

        for (property, message, severity) in OPEN_GRAPH {
            match f.open_graph.get(*property) {
                Some(value) => card.add_passed_with_details(
                    format!("{property} present"),
                    value.clone(),
                ),
                None => card.add_issue(*severity, *message),
            }
        }

        if let Some(image) = f.open_graph.get("og:image") {
            if !image.starts_with("http://") && !image.starts_with("https://") {
                card.add_issue_with_details(
                    Severity::Info,
                    "Open Graph image should be an absolute URL",
                    image.clone(),
                );
            }
        }

        match f.twitter.get("twitter:card") {
            Some(kind) => card.add_passed_with_details("Twitter card present", kind.clone()),
            None => card.add_issue(Severity::Info, "Missing Twitter card"),
        }
        Ok(())
    }

    fn data(&self) -> serde_json::Value {
        serde_json::to_value(&self.findings).unwrap_or_default()
    }
}
