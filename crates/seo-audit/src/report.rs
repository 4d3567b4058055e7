use std::fmt::Write;

use audit_common::{AggregateResult, AnalyzerResult, Severity};

/// Plain-text console report, one block per category in result order.
pub fn render(result: &AggregateResult) -> String {
    let mut out = String::new();

    let _ = writeln!(out, "SEO audit: {}", result.url);
    if !result.title.is_empty() {
        let _ = writeln!(out, "Title: {}", result.title);
    }
    let _ = writeln!(
        out,
        "Overall score: {}/100 ({})",
        result.score,
        result.band().label()
    );
    let _ = writeln!(
        out,
        "Analyzed {} categories in {} ms at {}",
        result.categories.len(),
        result.execution_time_ms,
        result.timestamp.format("%Y-%m-%d %H:%M:%S UTC")
    );

    let failed = result.failed_analyzers();
    if !failed.is_empty() {
        let _ = writeln!(out, "Failed analyzers: {}", failed.join(", "));
    }

    for category in result.categories.iter() {
        out.push('\n');
        render_category(&mut out, category);
    }
    out
}

fn render_category(out: &mut String, category: &AnalyzerResult) {
    let _ = writeln!(
        out,
        "[{}] {}/100  ({} critical, {} warning, {} info)",
        category.name,
        category.score,
        category.issue_count(Severity::Critical),
        category.issue_count(Severity::Warning),
        category.issue_count(Severity::Info),
    );

    for issue in &category.issues {
        match &issue.details {
            Some(details) => {
                let _ = writeln!(
                    out,
                    "  {:<8} {} ({details})",
                    issue.severity.as_str(),
                    issue.message
                );
            }
            None => {
                let _ = writeln!(out, "  {:<8} {}", issue.severity.as_str(), issue.message);
            }
        }
        let _ = writeln!(out, "           -> {}", issue.suggestion);
    }

    if !category.passed.is_empty() {
        let _ = writeln!(out, "  passed   {} checks", category.passed.len());
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use audit_common::{AnalyzerResult, Categories, Priority};
    use chrono::Utc;

    use super::*;

    fn sample() -> AggregateResult {
        let mut categories = Categories::new();
        categories.insert(AnalyzerResult {
            name: "meta".to_string(),
            priority: Priority::High,
            score: 80,
            issues: vec![audit_common::Issue {
                severity: Severity::Warning,
                message: "Title too short".to_string(),
                details: Some("4 characters".to_string()),
                suggestion: "Expand the title".to_string(),
            }],
            passed: vec![audit_common::PassedCheck {
                message: "Charset declared".to_string(),
                details: None,
            }],
            data: serde_json::Value::Null,
            execution_time_ms: 1,
            error: false,
        });
        categories.insert(AnalyzerResult::failed("geo", Priority::Low, "boom", Duration::ZERO));

        AggregateResult {
            score: 72,
            categories,
            execution_time_ms: 5,
            timestamp: Utc::now(),
            url: "https://example.com/".to_string(),
            title: "Home".to_string(),
        }
    }

    #[test]
    fn test_render_report() {
        let text = render(&sample());
        assert!(text.contains("Overall score: 72/100 (good)"));
        assert!(text.contains("Failed analyzers: geo"));
        assert!(text.contains("[meta] 80/100  (0 critical, 1 warning, 0 info)"));
        assert!(text.contains("warning  Title too short (4 characters)"));
        assert!(text.contains("-> Expand the title"));
        assert!(text.contains("passed   1 checks"));
        assert!(text.contains("critical Analyzer failed: boom"));

        let meta = text.find("[meta]").unwrap();
        let geo = text.find("[geo]").unwrap();
        assert!(meta < geo);
    }
}
