/// The analyzer contract and the lifecycle wrapper the engine drives it with.
///
/// Lifecycle per run: `collect` gathers findings from the page, `validate`
/// turns findings into issues and passes on a `Scorecard`, and the score is
/// clamped into [0, 100]. `run_analyzer` is the fault boundary: an error or a
/// panic in either phase becomes an error-shaped result, never a propagated
/// failure.
use std::any::Any;
use std::panic::AssertUnwindSafe;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use futures::FutureExt;
use tracing::{debug, warn};

use crate::dom::AuditContext;
use crate::error::AnalyzerError;
use crate::model::{AnalyzerResult, Issue, PassedCheck, Priority, Severity};
use crate::suggestions::suggestion_for;

const STARTING_SCORE: i32 = 100;

/// One pluggable audit category.
///
/// Implementations keep their own findings between `collect` and `validate`;
/// a fresh instance is built for every audit run.
#[async_trait(?Send)]
pub trait Analyzer {
    /// Category key, e.g. "meta" or "heading".
    fn name(&self) -> &str;

    fn priority(&self) -> Priority {
        Priority::Medium
    }

    /// Read the page. Absent elements are findings (empty values), not errors.
    async fn collect(&mut self, cx: &AuditContext<'_>) -> Result<(), AnalyzerError>;

    /// Judge the collected findings. Must not touch the page again.
    fn validate(&self, card: &mut Scorecard) -> Result<(), AnalyzerError>;

    /// Category-specific findings exposed to report consumers.
    fn data(&self) -> serde_json::Value {
        serde_json::Value::Null
    }
}

/// Issue and pass accumulator with a running penalty score.
#[derive(Debug, Clone)]
pub struct Scorecard {
    running: i32,
    issues: Vec<Issue>,
    passed: Vec<PassedCheck>,
}

impl Default for Scorecard {
    fn default() -> Self {
        Self::new()
    }
}

impl Scorecard {
    pub fn new() -> Self {
        Self {
            running: STARTING_SCORE,
            issues: Vec::new(),
            passed: Vec::new(),
        }
    }

    pub fn add_issue(&mut self, severity: Severity, message: impl Into<String>) {
        self.push_issue(severity, message.into(), None);
    }

    pub fn add_issue_with_details(
        &mut self,
        severity: Severity,
        message: impl Into<String>,
        details: impl Into<String>,
    ) {
        self.push_issue(severity, message.into(), Some(details.into()));
    }

    pub fn add_passed(&mut self, message: impl Into<String>) {
        self.passed.push(PassedCheck {
            message: message.into(),
            details: None,
        });
    }

    pub fn add_passed_with_details(
        &mut self,
        message: impl Into<String>,
        details: impl Into<String>,
    ) {
        self.passed.push(PassedCheck {
            message: message.into(),
            details: Some(details.into()),
        });
    }

    /// Unclamped `100 - Σpenalties`; may be negative.
    pub fn raw_score(&self) -> i32 {
        self.running
    }

    pub fn score(&self) -> u8 {
        self.running.clamp(0, 100) as u8
    }

    pub fn issues(&self) -> &[Issue] {
        &self.issues
    }

    pub fn passed(&self) -> &[PassedCheck] {
        &self.passed
    }

    fn push_issue(&mut self, severity: Severity, message: String, details: Option<String>) {
        self.running -= severity.penalty();
        let suggestion = suggestion_for(&message).to_string();
        self.issues.push(Issue {
            severity,
            message,
            details,
            suggestion,
        });
    }
}

impl AnalyzerResult {
    /// Error-shaped result: score 0 and a single critical issue carrying `reason`.
    pub fn failed(
        name: impl Into<String>,
        priority: Priority,
        reason: &str,
        elapsed: Duration,
    ) -> Self {
        let message = format!("Analyzer failed: {reason}");
        let suggestion = suggestion_for(&message).to_string();
        Self {
            name: name.into(),
            priority,
            score: 0,
            issues: vec![Issue {
                severity: Severity::Critical,
                message,
                details: None,
                suggestion,
            }],
            passed: Vec::new(),
            data: serde_json::Value::Null,
            execution_time_ms: elapsed.as_millis() as u64,
            error: true,
        }
    }
}

/// Drive one analyzer through its lifecycle, containing every failure.
///
/// `timeout`, when set, bounds the whole lifecycle; an overrun is reported the
/// same way as any other analyzer fault.
pub async fn run_analyzer(
    mut analyzer: Box<dyn Analyzer>,
    cx: &AuditContext<'_>,
    timeout: Option<Duration>,
) -> AnalyzerResult {
    let started = Instant::now();
    let name = analyzer.name().to_string();
    let priority = analyzer.priority();

    let guarded = AssertUnwindSafe(lifecycle(analyzer.as_mut(), cx)).catch_unwind();
    let outcome = match timeout {
        Some(limit) => match tokio::time::timeout(limit, guarded).await {
            Ok(outcome) => outcome,
            Err(_) => Ok(Err(AnalyzerError::Failed(format!(
                "timed out after {}ms",
                limit.as_millis()
            )))),
        },
        None => guarded.await,
    };
    let elapsed = started.elapsed();

    let reason = match outcome {
        Ok(Ok(card)) => {
            debug!(
                analyzer = %name,
                score = card.score(),
                issues = card.issues.len(),
                elapsed_ms = elapsed.as_millis() as u64,
                "analyzer finished"
            );
            return AnalyzerResult {
                score: card.score(),
                name,
                priority,
                issues: card.issues,
                passed: card.passed,
                data: analyzer.data(),
                execution_time_ms: elapsed.as_millis() as u64,
                error: false,
            };
        }
        Ok(Err(e)) => e.to_string(),
        Err(payload) => panic_message(&*payload),
    };

    warn!(analyzer = %name, error = %reason, "analyzer failed");
    AnalyzerResult::failed(name, priority, &reason, elapsed)
}

async fn lifecycle(
    analyzer: &mut dyn Analyzer,
    cx: &AuditContext<'_>,
) -> Result<Scorecard, AnalyzerError> {
    analyzer.collect(cx).await?;
    let mut card = Scorecard::new();
    analyzer.validate(&mut card)?;
    Ok(card)
}

pub(crate) fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        format!("panicked: {s}")
    } else if let Some(s) = payload.downcast_ref::<String>() {
        format!("panicked: {s}")
    } else {
        "panicked".to_string()
    }
}
