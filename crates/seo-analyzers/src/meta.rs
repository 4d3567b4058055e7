use async_trait::async_trait;
use audit_common::{
    element_text, Analyzer, AnalyzerError, AuditContext, Priority, Scorecard, Severity,
};
use serde::Serialize;

use crate::text::clip;

pub const NAME: &str = "meta";

const TITLE_MIN: usize = 30;
const TITLE_MAX: usize = 60;
const DESCRIPTION_MIN: usize = 120;
const DESCRIPTION_MAX: usize = 160;

#[derive(Debug, Default, Serialize)]
struct MetaFindings {
    title: String,
    title_count: usize,
    description: Option<String>,
    charset: Option<String>,
    keywords: Option<String>,
}

/// Title, description and charset checks.
#[derive(Debug, Default)]
pub struct MetaAnalyzer {
    findings: MetaFindings,
}

#[async_trait(?Send)]
impl Analyzer for MetaAnalyzer {
    fn name(&self) -> &str {
        NAME
    }

    fn priority(&self) -> Priority {
        Priority::High
    }

    async fn collect(&mut self, cx: &AuditContext<'_>) -> Result<(), AnalyzerError> {
        let titles = cx.dom.query_many("head > title")?;
        self.findings.title_count = titles.len();
        self.findings.title = titles.first().map(|t| element_text(*t)).unwrap_or_default();
        self.findings.description = cx
            .dom
            .attr_of("meta[name=description]", "content")?
            .filter(|d| !d.is_empty());
        self.findings.charset = cx
            .dom
            .attr_of("meta[charset]", "charset")?
            .or(cx.dom.attr_of("meta[http-equiv=Content-Type]", "content")?);
        self.findings.keywords = cx.dom.attr_of("meta[name=keywords]", "content")?;
        Ok(())
    }

    fn validate(&self, card: &mut Scorecard) -> Result<(), AnalyzerError> {
        let f = &self.findings;

        let title_len = f.title.chars().count();
        if title_len == 0 {
            card.add_issue(Severity::Critical, "Missing page title");
        } else if title_len < TITLE_MIN {
            card.add_issue_with_details(
                Severity::Warning,
                "Title too short",
                format!("{title_len} characters: \"{}\"", f.title),
            );
        } else if title_len > TITLE_MAX {
            card.add_issue_with_details(
                Severity::Warning,
                "Title too long",
                format!("{title_len} characters: \"{}\"", clip(&f.title, 80)),
            );
        } else {
            card.add_passed_with_details(
                "Title length is optimal",
                format!("{title_len} characters"),
            );
        }

        if f.title_count > 1 {
            card.add_issue_with_details(
                Severity::Warning,
                "Multiple title tags",
                format!("{} found", f.title_count),
            );
        }

        match &f.description {
            None => card.add_issue(Severity::Critical, "Missing meta description"),
            Some(d) => {
                let len = d.chars().count();
                if len < DESCRIPTION_MIN {
                    card.add_issue_with_details(
                        Severity::Warning,
                        "Meta description too short",
                        format!("{len} characters"),
                    );
                } else if len > DESCRIPTION_MAX {
                    card.add_issue_with_details(
                        Severity::Warning,
                        "Meta description too long",
                        format!("{len} characters"),
                    );
                } else {
                    card.add_passed_with_details(
                        "Meta description length is optimal",
                        format!("{len} characters"),
                    );
                }
            }
        }

        match &f.charset {
            Some(charset) => card.add_passed_with_details("Charset declared", charset.clone()),
            None => card.add_issue(Severity::Warning, "Missing charset declaration"),
        }

        if f.keywords.is_some() {
            card.add_issue(Severity::Info, "Meta keywords tag is ignored by search engines");
        }
        Ok(())
    }

    fn data(&self) -> serde_json::Value {
        serde_json::to_value(&self.findings).unwrap_or_default()
    }
}
