use async_trait::async_trait;
use audit_common::{
    element_text, Analyzer, AnalyzerError, AuditContext, Priority, Scorecard, Severity,
};
use serde::Serialize;

use crate::text::{sentences, word_count};

pub const NAME: &str = "content";

const MIN_WORDS: usize = 300;
const MAX_PARAGRAPH_WORDS: usize = 150;
const MAX_AVG_SENTENCE_WORDS: f64 = 25.0;
const MIN_TEXT_RATIO: f64 = 0.10;

#[derive(Debug, Default, Serialize)]
struct ContentFindings {
    /// Which container the text was read from: main, article or body
    source: String,
    word_count: usize,
    paragraph_count: usize,
    long_paragraphs: usize,
    sentence_count: usize,
    avg_sentence_words: f64,
    text_ratio: f64,
}

/// Amount and readability of the main body text.
#[derive(Debug, Default)]
pub struct ContentAnalyzer {
    findings: ContentFindings,
}

#[async_trait(?Send)]
impl Analyzer for ContentAnalyzer {
    fn name(&self) -> &str {
        NAME
    }

    fn priority(&self) -> Priority {
        Priority::High
    }

    async fn collect(&mut self, cx: &AuditContext<'_>) -> Result<(), AnalyzerError> {
        let mut container = None;
        for selector in ["main", "article", "body"] {
            if let Some(el) = cx.dom.query_one(selector)? {
                container = Some((selector, el));
                break;
            }
        }
        let Some((source, root)) = container else {
            return Ok(());
        };

        let text = element_text(root);
        let f = &mut self.findings;
        f.source = source.to_string();
        f.word_count = word_count(&text);

        let paragraphs = cx.dom.query_many("p")?;
        f.paragraph_count = paragraphs.len();
        f.long_paragraphs = paragraphs
            .iter()
            .filter(|p| word_count(&element_text(**p)) > MAX_PARAGRAPH_WORDS)
            .count();

        let sentences = sentences(&text);
        f.sentence_count = sentences.len();
        if !sentences.is_empty() {
            let words: usize = sentences.iter().map(|s| word_count(s)).sum();
            f.avg_sentence_words = words as f64 / sentences.len() as f64;
        }

        let source_len = cx.page.source().len();
        if source_len > 0 {
            f.text_ratio = text.len() as f64 / source_len as f64;
        }
        Ok(())
    }

    fn validate(&self, card: &mut Scorecard) -> Result<(), AnalyzerError> {
        let f = &self.findings;

        if f.word_count < MIN_WORDS {
            card.add_issue_with_details(
                Severity::Warning,
                "Thin content",
                format!("{} words", f.word_count),
            );
        } else {
            card.add_passed_with_details(
                "Sufficient content length",
                format!("{} words", f.word_count),
            );
        }

        if f.long_paragraphs > 0 {
            card.add_issue_with_details(
                Severity::Info,
                "Long paragraphs",
                format!("{} paragraphs over {MAX_PARAGRAPH_WORDS} words", f.long_paragraphs),
            );
        }

        if f.avg_sentence_words > MAX_AVG_SENTENCE_WORDS {
            card.add_issue_with_details(
                Severity::Info,
                "Long sentences",
                format!("{:.1} words per sentence", f.avg_sentence_words),
            );
        } else if f.sentence_count > 0 {
            card.add_passed_with_details(
                "Readable sentence length",
                format!("{:.1} words per sentence", f.avg_sentence_words),
            );
        }

        if f.word_count > 0 && f.text_ratio < MIN_TEXT_RATIO {
            card.add_issue_with_details(
                Severity::Info,
                "Low text-to-HTML ratio",
                format!("{:.1}%", f.text_ratio * 100.0),
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

    fn sentence(words: usize) -> String {
        format!("{}.", vec!["coffee"; words].join(" "))
    }

    #[tokio::test]
    async fn test_thin_content() {
        let result = audit::<ContentAnalyzer>("<body><p>Short page.</p></body>").await;
        assert!(has_issue(&result, "Thin content"));
        assert_eq!(result.data["word_count"], 2);
        assert_eq!(result.data["source"], "body");
    }

    #[tokio::test]
    async fn test_prefers_main_container() {
        let body = (0..40).map(|_| sentence(10)).collect::<Vec<_>>().join(" ");
        let html = format!("<body><nav>Menu items</nav><main><p>{body}</p></main></body>");
        let result = audit::<ContentAnalyzer>(&html).await;
        assert_eq!(result.data["source"], "main");
        assert_eq!(result.data["word_count"], 400);
        assert!(!has_issue(&result, "Thin content"));
        assert!(has_issue(&result, "Long paragraphs"));
        assert!(!has_issue(&result, "Long sentences"));
    }

    #[tokio::test]
    async fn test_long_sentences() {
        let html = format!("<main><p>{}</p></main>", sentence(40));
        let result = audit::<ContentAnalyzer>(&html).await;
        assert!(has_issue(&result, "Long sentences"));
    }
}
