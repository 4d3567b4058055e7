use async_trait::async_trait;
use audit_common::{Analyzer, AnalyzerError, AuditContext, Scorecard, Severity};
use serde::Serialize;

pub const NAME: &str = "semantic";

const SEMANTIC_TAGS: &[&str] = &[
    "main", "nav", "header", "footer", "article", "section", "aside", "figure", "time",
];

/// Below this share of semantic elements among containers, flag div soup.
const MIN_SEMANTIC_RATIO: f64 = 0.1;

#[derive(Debug, Default, Serialize)]
struct SemanticFindings {
    main: usize,
    nav: usize,
    header: usize,
    footer: usize,
    article: usize,
    section: usize,
    semantic_total: usize,
    divs: usize,
    ratio: f64,
}

/// HTML5 landmarks and the balance of semantic elements against plain divs.
#[derive(Debug, Default)]
pub struct SemanticAnalyzer {
    findings: SemanticFindings,
}

#[async_trait(?Send)]
impl Analyzer for SemanticAnalyzer {
    fn name(&self) -> &str {
        NAME
    }

    async fn collect(&mut self, cx: &AuditContext<'_>) -> Result<(), AnalyzerError> {
        let f = &mut self.findings;
        f.main = cx.dom.count("main, [role=main]")?;
        f.nav = cx.dom.count("nav, [role=navigation]")?;
        f.header = cx.dom.count("header")?;
        f.footer = cx.dom.count("footer")?;
        f.article = cx.dom.count("article")?;
        f.section = cx.dom.count("section")?;

        for tag in SEMANTIC_TAGS {
            f.semantic_total += cx.dom.count(tag)?;
        }
        f.divs = cx.dom.count("div")?;
        let containers = f.semantic_total + f.divs;
        if containers > 0 {
            f.ratio = f.semantic_total as f64 / containers as f64;
        }
        Ok(())
    }

    fn validate(&self, card: &mut Scorecard) -> Result<(), AnalyzerError> {
        let f = &self.findings;

        match f.main {
            0 => card.add_issue(Severity::Warning, "Missing main landmark"),
            1 => card.add_passed("Main landmark present"),
            n => card.add_issue_with_details(
                Severity::Warning,
                "Multiple main landmarks",
                format!("{n} found"),
            ),
        }

        if f.nav == 0 {
            card.add_issue(Severity::Info, "Missing navigation landmark");
        } else {
            card.add_passed("Navigation landmark present");
        }

        if f.header == 0 || f.footer == 0 {
            card.add_issue(Severity::Info, "Missing header or footer");
        } else {
            card.add_passed("Header and footer present");
        }

        if f.divs > 0 && f.ratio < MIN_SEMANTIC_RATIO {
            card.add_issue_with_details(
                Severity::Warning,
                "Low semantic element usage",
                format!("{} semantic elements vs {} divs", f.semantic_total, f.divs),
            );
        } else if f.semantic_total > 0 {
            card.add_passed_with_details(
                "Semantic elements used",
                format!("{} elements", f.semantic_total),
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
    use super::*;
    use crate::testing::{audit, has_issue};

    #[tokio::test]
    async fn test_landmarks_present() {
        let html = concat!(
            "<header><nav>n</nav></header>",
            "<main><article><section>s</section></article></main>",
            "<footer>f</footer>",
        );
        let result = audit::<SemanticAnalyzer>(html).await;
        assert!(result.issues.is_empty(), "{:?}", result.issues);
        assert_eq!(result.data["semantic_total"], 6);
    }

    #[tokio::test]
    async fn test_div_soup() {
        let html = format!("{}x{}", "<div>".repeat(10), "</div>".repeat(10));
        let result = audit::<SemanticAnalyzer>(&html).await;
        assert!(has_issue(&result, "Missing main landmark"));
        assert!(has_issue(&result, "Missing navigation landmark"));
        assert!(has_issue(&result, "Missing header or footer"));
        assert!(has_issue(&result, "Low semantic element usage"));
        assert_eq!(result.score, 70);
    }

    #[tokio::test]
    async fn test_role_main_counts_as_landmark() {
        let result = audit::<SemanticAnalyzer>(r#"<div role="main">x</div>"#).await;
        assert!(!has_issue(&result, "Missing main landmark"));
    }
}
