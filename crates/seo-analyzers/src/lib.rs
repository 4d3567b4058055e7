/// Built-in page analyzers.
///
/// Each module implements one audit category. The core treats them as
/// opaque: it only sees the `Analyzer` trait and the resulting scores.
use std::sync::Arc;

use audit_common::{Analyzer, AnalyzerRegistry};
use tracing::info;

pub mod accessibility;
pub mod content;
pub mod geo;
pub mod heading;
pub mod image;
pub mod link;
pub mod meta;
pub mod mobile;
pub mod performance;
pub mod schema;
pub mod semantic;
pub mod social;
pub mod technical;
mod text;

pub type Constructor = fn() -> Box<dyn Analyzer>;

fn boxed<A: Analyzer + Default + 'static>() -> Box<dyn Analyzer> {
    Box::new(A::default())
}

/// Every built-in analyzer, in report order.
pub const BUILTIN: &[(&str, Constructor)] = &[
    (meta::NAME, boxed::<meta::MetaAnalyzer>),
    (heading::NAME, boxed::<heading::HeadingAnalyzer>),
    (image::NAME, boxed::<image::ImageAnalyzer>),
    (link::NAME, boxed::<link::LinkAnalyzer>),
    (social::NAME, boxed::<social::SocialAnalyzer>),
    (content::NAME, boxed::<content::ContentAnalyzer>),
    (semantic::NAME, boxed::<semantic::SemanticAnalyzer>),
    (accessibility::NAME, boxed::<accessibility::AccessibilityAnalyzer>),
    (schema::NAME, boxed::<schema::SchemaAnalyzer>),
    (technical::NAME, boxed::<technical::TechnicalAnalyzer>),
    (performance::NAME, boxed::<performance::PerformanceAnalyzer>),
    (geo::NAME, boxed::<geo::GeoAnalyzer>),
    (mobile::NAME, boxed::<mobile::MobileAnalyzer>),
];

/// Register every built-in analyzer.
pub fn install(registry: &AnalyzerRegistry) {
    for (name, constructor) in BUILTIN {
        registry.register(*name, *constructor);
    }
    info!(count = BUILTIN.len(), "built-in analyzers registered");
}

/// Wait for the registry to open, then register every built-in analyzer.
pub async fn install_when_ready(registry: Arc<AnalyzerRegistry>) {
    registry.ready().await;
    install(&registry);
}

#[cfg(test)]
pub(crate) mod testing {
    use audit_common::{run_analyzer, Analyzer, AnalyzerResult, AuditContext, Page};

    pub async fn audit<A: Analyzer + Default + 'static>(html: &str) -> AnalyzerResult {
        audit_url::<A>("https://example.com/blog/post", html).await
    }

    pub async fn audit_url<A: Analyzer + Default + 'static>(
        url: &str,
        html: &str,
    ) -> AnalyzerResult {
        let page = Page::parse(url, html);
        let cx = AuditContext::new(&page);
        run_analyzer(Box::new(A::default()), &cx, None).await
    }

    pub fn has_issue(result: &AnalyzerResult, message: &str) -> bool {
        result.issues.iter().any(|i| i.message == message)
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use audit_common::{AuditConfig, AuditCore, Page};

    use super::*;

    const WELL_FORMED: &str = r#"<!doctype html>
<html lang="en">
<head>
  <meta charset="utf-8">
  <meta name="viewport" content="width=device-width, initial-scale=1">
  <title>How to Brew Pour-Over Coffee at Home | Example</title>
  <meta name="description" content="A practical pour-over coffee guide covering grind size, water temperature, ratios and timing so you can brew a consistent, delicious cup at home.">
  <link rel="canonical" href="https://example.com/blog/post">
</head>
<body>
  <header><nav><a href="/">Home</a></nav></header>
  <main>
    <article>
      <h1>How to brew pour-over coffee</h1>
      <p>Pour-over is a manual brewing method.</p>
    </article>
  </main>
  <footer>Example</footer>
</body>
</html>"#;

    #[test]
    fn test_builtin_names_are_unique_and_weighted() {
        let weights = audit_common::WeightTable::default();
        let mut names: Vec<&str> = BUILTIN.iter().map(|(name, _)| *name).collect();
        for name in &names {
            assert!(weights.weight_for(name) > 0.01, "{name} should have a real weight");
        }
        names.sort_unstable();
        names.dedup();
        assert_eq!(names.len(), 13);
    }

    #[test]
    fn test_constructors_report_their_registered_name() {
        for (name, constructor) in BUILTIN {
            assert_eq!(constructor().name(), *name);
        }
    }

    #[tokio::test]
    async fn test_install_when_ready_waits_for_open() {
        let registry = Arc::new(AnalyzerRegistry::new());
        let loader = tokio::spawn(install_when_ready(Arc::clone(&registry)));

        tokio::task::yield_now().await;
        assert!(registry.is_empty());

        registry.open();
        loader.await.unwrap();
        assert_eq!(registry.len(), BUILTIN.len());
        assert_eq!(
            registry.wait_for_count(BUILTIN.len(), Duration::from_millis(10)).await,
            BUILTIN.len()
        );
    }

    #[tokio::test]
    async fn test_full_audit_runs_every_category() {
        let registry = Arc::new(AnalyzerRegistry::new());
        install(&registry);
        let core = AuditCore::new(Arc::clone(&registry), &AuditConfig::default());

        let page = Page::parse("https://example.com/blog/post", WELL_FORMED);
        let result = core.run(&page).await.unwrap();

        let expected: Vec<&str> = BUILTIN.iter().map(|(name, _)| *name).collect();
        assert_eq!(result.categories.names(), expected);
        assert!(result.failed_analyzers().is_empty());
        assert!(result.score > 0 && result.score <= 100);
        assert_eq!(result.title, "How to Brew Pour-Over Coffee at Home | Example");
    }

    #[tokio::test]
    async fn test_empty_document_still_scores() {
        let registry = Arc::new(AnalyzerRegistry::new());
        install(&registry);
        let core = AuditCore::new(Arc::clone(&registry), &AuditConfig::default());

        let page = Page::parse("https://example.com/", "");
        let result = core.run(&page).await.unwrap();
        assert_eq!(result.categories.len(), 13);
        assert!(result.failed_analyzers().is_empty());
        assert_eq!(result.categories.get(meta::NAME).unwrap().score, 50);
        assert_eq!(result.categories.get(performance::NAME).unwrap().score, 100);
        assert!(result.score < 80);
    }
}
