use async_trait::async_trait;
use audit_common::{Analyzer, AnalyzerError, AuditContext, Scorecard, Severity};
use serde::Serialize;

pub const NAME: &str = "image";

/// The first few images are usually above the fold and should load eagerly.
const EAGER_ALLOWANCE: usize = 3;

#[derive(Debug, Clone, Serialize)]
struct ImageInfo {
    src: String,
    alt: Option<String>,
    has_dimensions: bool,
    lazy: bool,
}

#[derive(Debug, Default, Serialize)]
struct ImageFindings {
    images: Vec<ImageInfo>,
}

/// Alt text, explicit dimensions and lazy loading.
#[derive(Debug, Default)]
pub struct ImageAnalyzer {
    findings: ImageFindings,
}

#[async_trait(?Send)]
impl Analyzer for ImageAnalyzer {
    fn name(&self) -> &str {
        NAME
    }

    async fn collect(&mut self, cx: &AuditContext<'_>) -> Result<(), AnalyzerError> {
        self.findings.images = cx
            .dom
            .query_many("img")?
            .into_iter()
            .map(|el| {
                let attrs = el.value();
                ImageInfo {
                    src: attrs.attr("src").unwrap_or_default().to_string(),
                    alt: attrs.attr("alt").map(|a| a.trim().to_string()),
                    has_dimensions: attrs.attr("width").is_some() && attrs.attr("height").is_some(),
                    lazy: attrs.attr("loading").is_some_and(|l| l.eq_ignore_ascii_case("lazy")),
                }
            })
            .collect();
        Ok(())
    }

    fn validate(&self, card: &mut Scorecard) -> Result<(), AnalyzerError> {
        let images = &self.findings.images;
        if images.is_empty() {
            card.add_passed("No images to check");
            return Ok(());
        }

        let missing_alt: Vec<&str> = images
            .iter()
            .filter(|i| i.alt.is_none())
            .map(|i| i.src.as_str())
            .collect();
        if missing_alt.is_empty() {
            card.add_passed_with_details(
                "All images have alt attributes",
                format!("{} images", images.len()),
            );
        } else {
            card.add_issue_with_details(
                Severity::Critical,
                "Images missing alt attribute",
                format!("{} of {}: {}", missing_alt.len(), images.len(), missing_alt.join(", ")),
            );
        }

        let empty_alt = images.iter().filter(|i| i.alt.as_deref() == Some("")).count();
        if empty_alt > 0 {
            card.add_issue_with_details(
                Severity::Info,
                "Images with empty alt text",
                format!("{empty_alt} marked decorative"),
            );
        }

        let no_dims = images.iter().filter(|i| !i.has_dimensions).count();
        if no_dims > 0 {
            card.add_issue_with_details(
                Severity::Warning,
                "Images missing dimensions",
                format!("{no_dims} images"),
            );
        } else {
            card.add_passed("All images declare width and height");
        }

        let eager = images
            .iter()
            .skip(EAGER_ALLOWANCE)
            .filter(|i| !i.lazy)
            .count();
        if eager > 0 {
            card.add_issue_with_details(
                Severity::Info,
                "Images not lazy loaded",
                format!("{eager} images"),
            );
        }
        Ok(())
    }

    fn data(&self) -> serde_json::Value {
        serde_json::json!({
            "total": self.findings.images.len(),
            "images": self.findings.images,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{audit, has_issue};

    #[tokio::test]
    async fn test_no_images_passes() {
        let result = audit::<ImageAnalyzer>("<p>text</p>").await;
        assert_eq!(result.score, 100);
        assert_eq!(result.data["total"], 0);
    }

    #[tokio::test]
    async fn test_alt_and_dimensions() {
        let html = r#"
<img src="a.png" alt="Kettle" width="10" height="10">
<img src="b.png">
<img src="c.png" alt="">
"#;
        let result = audit::<ImageAnalyzer>(html).await;
        assert!(has_issue(&result, "Images missing alt attribute"));
        assert!(has_issue(&result, "Images with empty alt text"));
        assert!(has_issue(&result, "Images missing dimensions"));
        assert!(!has_issue(&result, "Images not lazy loaded"));
        assert_eq!(result.score, 65);
    }

    #[tokio::test]
    async fn test_lazy_loading_beyond_fold() {
        let html = (0..5)
            .map(|i| {
                let loading = if i == 4 { r#" loading="lazy""# } else { "" };
                format!(r#"<img src="{i}.png" alt="x" width="1" height="1"{loading}>"#)
            })
            .collect::<String>();
        let result = audit::<ImageAnalyzer>(&html).await;
        let lazy = result.issues.iter().find(|i| i.message == "Images not lazy loaded").unwrap();
        assert_eq!(lazy.details.as_deref(), Some("1 images"));
    }
}
