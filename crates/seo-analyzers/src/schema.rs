use async_trait::async_trait;
use audit_common::{Analyzer, AnalyzerError, AuditContext, Scorecard, Severity};
use serde::Serialize;
use serde_json::Value;

use crate::text::clip;

pub const NAME: &str = "schema";

#[derive(Debug, Default, Serialize)]
struct SchemaFindings {
    json_ld_blocks: usize,
    types: Vec<String>,
    invalid: Vec<String>,
    untyped: usize,
    microdata_items: usize,
    microdata_types: Vec<String>,
}

/// JSON-LD and microdata structured data.
#[derive(Debug, Default)]
pub struct SchemaAnalyzer {
    findings: SchemaFindings,
}

/// Collect `@type` values from a JSON-LD node, following `@graph` arrays.
/// Returns the number of top-level nodes that carry no type at all.
fn collect_types(node: &Value, types: &mut Vec<String>) -> usize {
    match node {
        Value::Array(items) => items.iter().map(|item| collect_types(item, types)).sum(),
        Value::Object(map) => {
            if let Some(graph) = map.get("@graph") {
                return collect_types(graph, types);
            }
            match map.get("@type") {
                Some(Value::String(t)) => {
                    types.push(t.clone());
                    0
                }
                Some(Value::Array(ts)) => {
                    types.extend(ts.iter().filter_map(Value::as_str).map(str::to_string));
                    0
                }
                _ => 1,
            }
        }
        _ => 1,
    }
}

#[async_trait(?Send)]
impl Analyzer for SchemaAnalyzer {
    fn name(&self) -> &str {
        NAME
    }

    async fn collect(&mut self, cx: &AuditContext<'_>) -> Result<(), AnalyzerError> {
        let f = &mut self.findings;

        for script in cx.dom.query_many(r#"script[type="application/ld+json"]"#)? {
            f.json_ld_blocks += 1;
            let body: String = script.text().collect();
            match serde_json::from_str::<Value>(body.trim()) {
                Ok(node) => f.untyped += collect_types(&node, &mut f.types),
                Err(e) => f.invalid.push(clip(&e.to_string(), 80)),
            }
        }

        for item in cx.dom.query_many("[itemscope]")? {
            f.microdata_items += 1;
            if let Some(kind) = item.value().attr("itemtype") {
                let kind = kind.rsplit('/').next().unwrap_or(kind).to_string();
                if !f.microdata_types.contains(&kind) {
                    f.microdata_types.push(kind);
                }
            }
        }
        Ok(())
    }

    fn validate(&self, card: &mut Scorecard) -> Result<(), AnalyzerError> {
        let f = &self.findings;

        if f.json_ld_blocks == 0 && f.microdata_items == 0 {
            card.add_issue(Severity::Warning, "No structured data found");
            return Ok(());
        }

        if !f.invalid.is_empty() {
            card.add_issue_with_details(
                Severity::Critical,
                "Invalid JSON-LD",
                f.invalid.join("; "),
            );
        }
        if f.untyped > 0 {
            card.add_issue_with_details(
                Severity::Warning,
                "Structured data missing @type",
                format!("{} nodes", f.untyped),
            );
        }

        let mut types = f.types.clone();
        types.extend(f.microdata_types.iter().cloned());
        if !types.is_empty() {
            card.add_passed_with_details("Structured data present", types.join(", "));
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
    async fn test_no_structured_data() {
        let result = audit::<SchemaAnalyzer>("<p>Plain page</p>").await;
        assert!(has_issue(&result, "No structured data found"));
        assert_eq!(result.score, 90);
    }

    #[tokio::test]
    async fn test_json_ld_graph() {
        let html = r#"<script type="application/ld+json">
{"@context":"https://schema.org","@graph":[
  {"@type":"Article","headline":"Pour-over"},
  {"@type":["BreadcrumbList","ItemList"]}
]}
</script>"#;
        let result = audit::<SchemaAnalyzer>(html).await;
        assert!(result.issues.is_empty(), "{:?}", result.issues);
        assert_eq!(
            result.data["types"],
            serde_json::json!(["Article", "BreadcrumbList", "ItemList"])
        );
    }

    #[tokio::test]
    async fn test_invalid_and_untyped() {
        let html = r#"
<script type="application/ld+json">{"@type": "Article",</script>
<script type="application/ld+json">{"name": "No type"}</script>
<div itemscope itemtype="https://schema.org/Recipe"></div>"#;
        let result = audit::<SchemaAnalyzer>(html).await;
        assert!(has_issue(&result, "Invalid JSON-LD"));
        assert!(has_issue(&result, "Structured data missing @type"));
        assert_eq!(result.data["microdata_types"][0], "Recipe");
        assert_eq!(result.score, 70);
    }
}
