use async_trait::async_trait;
use audit_common::{
    element_text, Analyzer, AnalyzerError, AuditContext, Priority, Scorecard, Severity,
};
use serde::Serialize;

pub const NAME: &str = "heading";

#[derive(Debug, Clone, Serialize)]
struct Heading {
    level: u8,
    text: String,
}

#[derive(Debug, Default, Serialize)]
struct HeadingFindings {
    headings: Vec<Heading>,
}

impl HeadingFindings {
    fn count(&self, level: u8) -> usize {
        self.headings.iter().filter(|h| h.level == level).count()
    }

    /// (from, to) pairs where the outline jumps more than one level deeper.
    fn skips(&self) -> Vec<(u8, u8)> {
        self.headings
            .windows(2)
            .filter(|pair| pair[1].level > pair[0].level + 1)
            .map(|pair| (pair[0].level, pair[1].level))
            .collect()
    }
}

/// Heading outline: one h1, no skipped levels, no empty headings.
#[derive(Debug, Default)]
pub struct HeadingAnalyzer {
    findings: HeadingFindings,
}

#[async_trait(?Send)]
impl Analyzer for HeadingAnalyzer {
    fn name(&self) -> &str {
        NAME
    }

    fn priority(&self) -> Priority {
        Priority::High
    }

    async fn collect(&mut self, cx: &AuditContext<'_>) -> Result<(), AnalyzerError> {
        self.findings.headings = cx
            .dom
            .query_many("h1, h2, h3, h4, h5, h6")?
            .into_iter()
            .filter_map(|el| {
                let level = el.value().name().strip_prefix('h')?.parse::<u8>().ok()?;
                Some(Heading {
                    level,
                    text: element_text(el),
                })
            })
            .collect();
        Ok(())
    }

    fn validate(&self, card: &mut Scorecard) -> Result<(), AnalyzerError> {
        let f = &self.findings;

        match f.count(1) {
            0 => card.add_issue(Severity::Critical, "Missing H1 heading"),
            1 => card.add_passed("Single H1 heading"),
            n => card.add_issue_with_details(
                Severity::Warning,
                "Multiple H1 headings",
                format!("{n} found"),
            ),
        }

        let skips = f.skips();
        if skips.is_empty() {
            if !f.headings.is_empty() {
                card.add_passed("Heading hierarchy is sequential");
            }
        } else {
            let details = skips
                .iter()
                .map(|(from, to)| format!("h{from} → h{to}"))
                .collect::<Vec<_>>()
                .join(", ");
            card.add_issue_with_details(Severity::Warning, "Skipped heading level", details);
        }

        let empty = f.headings.iter().filter(|h| h.text.is_empty()).count();
        if empty > 0 {
            card.add_issue_with_details(
                Severity::Warning,
                "Empty heading",
                format!("{empty} empty"),
            );
        }

        if f.headings.len() > 1 && f.count(2) == 0 {
            card.add_issue(Severity::Info, "No H2 subheadings");
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
    async fn test_clean_outline() {
        let html = "<h1>Guide</h1><h2>Grind</h2><h3>Burr</h3><h2>Water</h2>";
        let result = audit::<HeadingAnalyzer>(html).await;
        assert!(result.issues.is_empty(), "{:?}", result.issues);
        assert_eq!(result.data["headings"].as_array().unwrap().len(), 4);
    }

    #[tokio::test]
    async fn test_missing_h1_and_skip() {
        let html = "<h2>Intro</h2><h4>Detail</h4><h3></h3>";
        let result = audit::<HeadingAnalyzer>(html).await;
        assert!(has_issue(&result, "Missing H1 heading"));
        assert!(has_issue(&result, "Skipped heading level"));
        assert!(has_issue(&result, "Empty heading"));
        assert_eq!(result.score, 60);

        let skip = result.issues.iter().find(|i| i.message == "Skipped heading level").unwrap();
        assert_eq!(skip.details.as_deref(), Some("h2 → h4"));
    }

    #[tokio::test]
    async fn test_multiple_h1() {
        let result = audit::<HeadingAnalyzer>("<h1>A</h1><h1>B</h1>").await;
        assert!(has_issue(&result, "Multiple H1 headings"));
        assert!(has_issue(&result, "No H2 subheadings"));
        assert_eq!(result.score, 85);
    }
}
