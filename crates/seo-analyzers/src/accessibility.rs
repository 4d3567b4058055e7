use async_trait::async_trait;
use audit_common::{
    element_text, Analyzer, AnalyzerError, AuditContext, Priority, Scorecard, Severity,
};
use scraper::ElementRef;
use serde::Serialize;

pub const NAME: &str = "accessibility";

const FOCUSABLE: &str = "a[href], button, input, select, textarea, [tabindex]";

#[derive(Debug, Default, Serialize)]
struct AccessibilityFindings {
    lang: Option<String>,
    inputs: usize,
    unlabeled_inputs: Vec<String>,
    buttons: usize,
    unnamed_buttons: usize,
    positive_tabindex: usize,
    hidden_focusable: usize,
    skip_link: bool,
}

/// Document language, form labelling, accessible names and focus order.
#[derive(Debug, Default)]
pub struct AccessibilityAnalyzer {
    findings: AccessibilityFindings,
}

fn has_text_attr(el: &ElementRef<'_>, name: &str) -> bool {
    el.value().attr(name).is_some_and(|v| !v.trim().is_empty())
}

#[async_trait(?Send)]
impl Analyzer for AccessibilityAnalyzer {
    fn name(&self) -> &str {
        NAME
    }

    fn priority(&self) -> Priority {
        Priority::High
    }

    async fn collect(&mut self, cx: &AuditContext<'_>) -> Result<(), AnalyzerError> {
        let f = &mut self.findings;
        f.lang = cx.dom.attr_of("html", "lang")?.filter(|l| !l.is_empty());

        let label_targets: Vec<&str> = cx
            .dom
            .query_many("label[for]")?
            .into_iter()
            .filter_map(|l| l.value().attr("for"))
            .collect();

        for input in cx.dom.query_many("input, select, textarea")? {
            let attrs = input.value();
            let kind = attrs.attr("type").unwrap_or("text").to_ascii_lowercase();
            if matches!(kind.as_str(), "hidden" | "submit" | "button" | "reset" | "image") {
                continue;
            }
            f.inputs += 1;

            let by_for = attrs.attr("id").is_some_and(|id| label_targets.contains(&id));
            let wrapped = input
                .ancestors()
                .filter_map(ElementRef::wrap)
                .any(|a| a.value().name() == "label");
            let aria = has_text_attr(&input, "aria-label")
                || has_text_attr(&input, "aria-labelledby");
            if !(by_for || wrapped || aria || has_text_attr(&input, "title")) {
                let ident = attrs
                    .attr("name")
                    .or(attrs.attr("id"))
                    .unwrap_or(attrs.name())
                    .to_string();
                f.unlabeled_inputs.push(ident);
            }
        }

        for button in cx.dom.query_many("button, [role=button]")? {
            f.buttons += 1;
            let image_alt = button
                .descendants()
                .filter_map(ElementRef::wrap)
                .any(|child| has_text_attr(&child, "alt"));
            let named = !element_text(button).is_empty()
                || has_text_attr(&button, "aria-label")
                || has_text_attr(&button, "aria-labelledby")
                || has_text_attr(&button, "title")
                || image_alt;
            if !named {
                f.unnamed_buttons += 1;
            }
        }

        f.positive_tabindex = cx
            .dom
            .query_many("[tabindex]")?
            .into_iter()
            .filter(|el| {
                el.value()
                    .attr("tabindex")
                    .and_then(|t| t.trim().parse::<i32>().ok())
                    .is_some_and(|t| t > 0)
            })
            .count();

        f.hidden_focusable = cx
            .dom
            .query_many(FOCUSABLE)?
            .into_iter()
            .filter(|el| el.value().attr("aria-hidden") == Some("true"))
            .count();

        f.skip_link = cx
            .dom
            .query_many("a[href^='#']")?
            .into_iter()
            .any(|a| element_text(a).to_lowercase().contains("skip"));
        Ok(())
    }

    fn validate(&self, card: &mut Scorecard) -> Result<(), AnalyzerError> {
        let f = &self.findings;

        match &f.lang {
            Some(lang) => card.add_passed_with_details("Document language set", lang.clone()),
            None => card.add_issue(Severity::Critical, "Missing document language"),
        }

        if !f.unlabeled_inputs.is_empty() {
            card.add_issue_with_details(
                Severity::Critical,
                "Form inputs without labels",
                f.unlabeled_inputs.join(", "),
            );
        } else if f.inputs > 0 {
            card.add_passed_with_details(
                "Form inputs are labelled",
                format!("{} inputs", f.inputs),
            );
        }

        if f.unnamed_buttons > 0 {
            card.add_issue_with_details(
                Severity::Warning,
                "Buttons without accessible names",
                format!("{} of {}", f.unnamed_buttons, f.buttons),
            );
        } else if f.buttons > 0 {
            card.add_passed("Buttons have accessible names");
        }

        if f.positive_tabindex > 0 {
            card.add_issue_with_details(
                Severity::Warning,
                "Positive tabindex values",
                format!("{} elements", f.positive_tabindex),
            );
        }
        if f.hidden_focusable > 0 {
            card.add_issue_with_details(
                Severity::Warning,
                "Focusable elements hidden from assistive technology",
                format!("{} elements", f.hidden_focusable),
            );
        }

        if f.skip_link {
            card.add_passed("Skip link present");
        } else {
            card.add_issue(Severity::Info, "Missing skip link");
        }
        Ok(())
    }

    fn data(&self) -> serde_json::Value {
        serde_json::to_value(&self.findings).unwrap_or_default()
    }
}
