/// Generative-engine optimization: signals that make a page easy for
/// answer engines to quote. Pattern matching over the markup only.
use std::sync::LazyLock;

use async_trait::async_trait;
use audit_common::{
    element_text, Analyzer, AnalyzerError, AuditContext, Priority, Scorecard, Severity,
};
use regex::Regex;
use serde::Serialize;
use url::Url;

pub const NAME: &str = "geo";

static QUESTION: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^(what|why|how|when|where|who|which|can|does|do|is|are|should)\b|\?$")
        .expect("valid regex")
});

static STATISTIC: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(concat!(
        r"\d+(?:[.,]\d+)?\s?(?:%|percent\b)",
        r"|[$€£]\s?\d",
        r"|\b\d{1,3}(?:,\d{3})+\b",
        r"|\b\d+(?:\.\d+)?\s?(?:million|billion|thousand)\b",
    ))
    .expect("valid regex")
});

static FAQ_MARKER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\bfaq|frequently asked").expect("valid regex"));

const AUTHOR_SELECTORS: &str = concat!(
    r#"meta[name="author"], [rel="author"], [itemprop="author"], "#,
    ".author, .byline",
);
const DATE_SELECTORS: &str = concat!(
    r#"time[datetime], meta[property="article:published_time"], "#,
    r#"[itemprop="datePublished"]"#,
);

#[derive(Debug, Default, Serialize)]
struct GeoFindings {
    question_headings: Vec<String>,
    faq: bool,
    lists: usize,
    tables: usize,
    statistics: usize,
    author: bool,
    published: bool,
    citations: usize,
}

/// Answer-engine readiness: question headings, FAQ blocks, structured
/// lists, concrete data points, authorship and citations.
#[derive(Debug, Default)]
pub struct GeoAnalyzer {
    findings: GeoFindings,
}

#[async_trait(?Send)]
impl Analyzer for GeoAnalyzer {
    fn name(&self) -> &str {
        NAME
    }

    fn priority(&self) -> Priority {
        Priority::Low
    }

    async fn collect(&mut self, cx: &AuditContext<'_>) -> Result<(), AnalyzerError> {
        let f = &mut self.findings;

        f.question_headings = cx
            .dom
            .query_many("h2, h3, h4")?
            .into_iter()
            .map(element_text)
            .filter(|text| QUESTION.is_match(text))
            .collect();

        let json_ld: String = cx
            .dom
            .query_many(r#"script[type="application/ld+json"]"#)?
            .into_iter()
            .flat_map(|el| el.text())
            .collect();

        let faq_section = cx
            .dom
            .query_many("[id], [class]")?
            .into_iter()
            .any(|el| {
                let attrs = el.value();
                [attrs.id(), attrs.attr("class")]
                    .into_iter()
                    .flatten()
                    .any(|v| FAQ_MARKER.is_match(v))
            });
        let faq_heading = cx
            .dom
            .query_many("h1, h2, h3")?
            .into_iter()
            .any(|el| FAQ_MARKER.is_match(&element_text(el)));
        f.faq = json_ld.contains("FAQPage")
            || faq_section
            || faq_heading
            || cx.dom.count("details > summary")? >= 2;

        f.lists = cx
            .dom
            .query_many("ul, ol")?
            .into_iter()
            .filter(|list| {
                list.children()
                    .filter_map(scraper::ElementRef::wrap)
                    .filter(|c| c.value().name() == "li")
                    .count()
                    >= 3
            })
            .count();
        f.tables = cx.dom.count("table")?;

        if let Some(body) = cx.dom.query_one("body")? {
            f.statistics = STATISTIC.find_iter(&element_text(body)).count();
        }

        f.author = cx.dom.count(AUTHOR_SELECTORS)? > 0 || json_ld.contains("\"author\"");
        f.published = cx.dom.count(DATE_SELECTORS)? > 0 || json_ld.contains("\"datePublished\"");

        let base = Url::parse(cx.page.url()).ok();
        let host = base.as_ref().and_then(|b| b.host_str().map(str::to_string));
        f.citations = cx
            .dom
            .query_many("a[href]")?
            .into_iter()
            .filter_map(|a| a.value().attr("href"))
            .filter_map(|href| Url::parse(href.trim()).ok())
            .filter(|u| {
                matches!(u.scheme(), "http" | "https") && u.host_str().map(str::to_string) != host
            })
            .count();
        Ok(())
    }

    fn validate(&self, card: &mut Scorecard) -> Result<(), AnalyzerError> {
        let f = &self.findings;

        if f.question_headings.is_empty() {
            card.add_issue(Severity::Info, "No question-style headings");
        } else {
            card.add_passed_with_details(
                "Question-style headings",
                f.question_headings.join(" | "),
            );
        }

        if f.faq {
            card.add_passed("FAQ content present");
        } else {
            card.add_issue(Severity::Info, "No FAQ content");
        }

        if f.lists + f.tables == 0 {
            card.add_issue(Severity::Warning, "No extractable lists or tables");
        } else {
            card.add_passed_with_details(
                "Extractable lists or tables",
                format!("{} lists, {} tables", f.lists, f.tables),
            );
        }

        if f.statistics == 0 {
            card.add_issue(Severity::Info, "No statistics or data points");
        } else {
            card.add_passed_with_details("Concrete data points", format!("{} found", f.statistics));
        }

        if f.author {
            card.add_passed("Author information present");
        } else {
            card.add_issue(Severity::Warning, "Missing author information");
        }
        if f.published {
            card.add_passed("Publish date present");
        } else {
            card.add_issue(Severity::Info, "Missing publish date");
        }

        if f.citations == 0 {
            card.add_issue(Severity::Info, "No outbound citations");
        } else {
            card.add_passed_with_details("Outbound citations", format!("{} links", f.citations));
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

    #[test]
    fn test_question_pattern() {
        assert!(QUESTION.is_match("How long should coffee bloom"));
        assert!(QUESTION.is_match("Grind size?"));
        assert!(!QUESTION.is_match("Whoever brews best"));
        assert!(!QUESTION.is_match("Brewing basics"));
    }

    #[test]
    fn test_statistic_pattern() {
        let text = "Sales rose 12% to $4 million, about 1,200,000 cups and 3.5 billion beans.";
        assert_eq!(STATISTIC.find_iter(text).count(), 4);
        assert_eq!(STATISTIC.find_iter("Version 2 of the guide").count(), 0);
    }

    #[tokio::test]
    async fn test_answer_ready_page() {
        let html = r#"<html><head><meta name="author" content="Sam Rivera"></head><body>
<h2>What grind size works best?</h2>
<p>About 60% of baristas prefer medium-fine.</p>
<ol><li>Rinse</li><li>Bloom</li><li>Pour</li></ol>
<section id="faq"><details><summary>Q</summary>A</details></section>
<time datetime="2024-05-01">May 1</time>
<a href="https://coffeeresearch.org/study">Study</a>
</body></html>"#;
        let result = audit::<GeoAnalyzer>(html).await;
        assert!(result.issues.is_empty(), "{:?}", result.issues);
        assert_eq!(result.data["lists"], 1);
        assert_eq!(result.data["citations"], 1);
    }

    #[tokio::test]
    async fn test_bare_page() {
        let html = concat!(
            "<body><h2>Brewing</h2><p>Pour water.</p>",
            r#"<a href="/home">Home</a><a href="https://example.com/x">Self</a></body>"#,
        );
        let result = audit::<GeoAnalyzer>(html).await;
        for message in [
            "No question-style headings",
            "No FAQ content",
            "No extractable lists or tables",
            "No statistics or data points",
            "Missing author information",
            "Missing publish date",
            "No outbound citations",
        ] {
            assert!(has_issue(&result, message), "{message}");
        }
        assert_eq!(result.score, 55);
    }
}
