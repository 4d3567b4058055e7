use async_trait::async_trait;
use audit_common::{element_text, Analyzer, AnalyzerError, AuditContext, Scorecard, Severity};
use serde::Serialize;
use url::Url;

pub const NAME: &str = "link";

const GENERIC_TEXT: &[&str] = &[
    "click here",
    "here",
    "read more",
    "more",
    "learn more",
    "link",
    "this link",
    "continue",
];

#[derive(Debug, Default, Serialize)]
struct LinkFindings {
    total: usize,
    internal: usize,
    external: usize,
    nofollow: usize,
    generic: Vec<String>,
    empty: usize,
    unsafe_blank: usize,
    javascript: usize,
}

/// Internal/external link balance and anchor hygiene.
#[derive(Debug, Default)]
pub struct LinkAnalyzer {
    findings: LinkFindings,
}

#[async_trait(?Send)]
impl Analyzer for LinkAnalyzer {
    fn name(&self) -> &str {
        NAME
    }

    async fn collect(&mut self, cx: &AuditContext<'_>) -> Result<(), AnalyzerError> {
        let base = Url::parse(cx.page.url()).ok();
        let f = &mut self.findings;

        for el in cx.dom.query_many("a[href]")? {
            let attrs = el.value();
            let href = attrs.attr("href").unwrap_or_default().trim();
            f.total += 1;

            if href.to_ascii_lowercase().starts_with("javascript:") {
                f.javascript += 1;
                continue;
            }

            let resolved = match &base {
                Some(base) => base.join(href).ok(),
                None => Url::parse(href).ok(),
            };
            match (resolved, &base) {
                (Some(target), Some(base)) if target.host_str() == base.host_str() => {
                    f.internal += 1
                }
                (Some(target), _) if matches!(target.scheme(), "http" | "https") => f.external += 1,
                _ => {}
            }

            let rel = attrs.attr("rel").unwrap_or_default().to_ascii_lowercase();
            if rel.split_whitespace().any(|r| r == "nofollow") {
                f.nofollow += 1;
            }
            if attrs.attr("target") == Some("_blank")
                && !rel.split_whitespace().any(|r| r == "noopener" || r == "noreferrer")
            {
                f.unsafe_blank += 1;
            }

            let text = element_text(el);
            let labelled = attrs.attr("aria-label").is_some_and(|l| !l.trim().is_empty())
                || attrs.attr("title").is_some_and(|t| !t.trim().is_empty());
            let image_alt = el
                .descendants()
                .filter_map(scraper::ElementRef::wrap)
                .any(|child| child.value().attr("alt").is_some_and(|a| !a.trim().is_empty()));
            if text.is_empty() && !labelled && !image_alt {
                f.empty += 1;
            } else if GENERIC_TEXT.contains(&text.to_lowercase().as_str()) {
                f.generic.push(text);
            }
        }
        Ok(())
    }

    fn validate(&self, card: &mut Scorecard) -> Result<(), AnalyzerError> {
        let f = &self.findings;

        if f.internal == 0 {
            card.add_issue(Severity::Warning, "No internal links");
        } else {
            card.add_passed_with_details(
                "Internal links present",
                format!("{} internal, {} external", f.internal, f.external),
            );
        }

        if !f.generic.is_empty() {
            card.add_issue_with_details(
                Severity::Warning,
                "Links with non-descriptive text",
                f.generic.join(", "),
            );
        }
        if f.empty > 0 {
            card.add_issue_with_details(
                Severity::Warning,
                "Empty links",
                format!("{} links", f.empty),
            );
        }
        if f.unsafe_blank > 0 {
            card.add_issue_with_details(
                Severity::Warning,
                "Unsafe target=_blank links",
                format!("{} links", f.unsafe_blank),
            );
        }
        if f.javascript > 0 {
            card.add_issue_with_details(
                Severity::Info,
                "JavaScript pseudo-links",
                format!("{} links", f.javascript),
            );
        }
        if f.total > 0 && f.generic.is_empty() && f.empty == 0 {
            card.add_passed("Link text is descriptive");
        }
        Ok(())
    }

    fn data(&self) -> serde_json::Value {
        serde_json::to_value(&self.findings).unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{audit, has_issue};

    #[tokio::test]
    async fn test_classifies_internal_and_external() {
        let html = r#"
<a href="/about">About us</a>
<a href="https://example.com/contact">Contact</a>
<a href="https://other.org/" rel="nofollow noopener" target="_blank">Partner site</a>
<a href="mailto:hi@example.com">Email us</a>
"#;
        let result = audit::<LinkAnalyzer>(html).await;
        assert!(result.issues.is_empty(), "{:?}", result.issues);
        assert_eq!(result.data["internal"], 2);
        assert_eq!(result.data["external"], 1);
        assert_eq!(result.data["nofollow"], 1);
        assert_eq!(result.data["total"], 4);
    }

    #[tokio::test]
    async fn test_anchor_hygiene() {
        let html = r#"
<a href="/a">Click here</a>
<a href="/b"></a>
<a href="/c"><img src="x.png" alt="Home"></a>
<a href="https://other.org/" target="_blank">Other</a>
<a href="javascript:void(0)">Menu</a>
"#;
        let result = audit::<LinkAnalyzer>(html).await;
        assert!(has_issue(&result, "Links with non-descriptive text"));
        assert!(has_issue(&result, "Empty links"));
        assert!(has_issue(&result, "Unsafe target=_blank links"));
        assert!(has_issue(&result, "JavaScript pseudo-links"));
        assert!(!has_issue(&result, "No internal links"));
        assert_eq!(result.data["empty"], 1);
        assert_eq!(result.score, 65);
    }

    #[tokio::test]
    async fn test_no_links() {
        let result = audit::<LinkAnalyzer>("<p>No links</p>").await;
        assert!(has_issue(&result, "No internal links"));
        assert_eq!(result.score, 90);
    }
}
