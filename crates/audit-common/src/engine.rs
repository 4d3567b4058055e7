/// Audit orchestration: fan out every registered analyzer, join, aggregate.
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use std::time::{Duration, Instant};

use chrono::Utc;
use futures::future::join_all;
use futures::FutureExt;
use tracing::{debug, error, info};

use crate::activity::{ActivityEntry, ActivityLog};
use crate::analyzer::{panic_message, run_analyzer};
use crate::config::AuditConfig;
use crate::dom::{AuditContext, Page};
use crate::error::AuditError;
use crate::model::{AggregateResult, AnalyzerResult, Categories, Priority};
use crate::registry::AnalyzerRegistry;
use crate::weights::WeightTable;

pub struct AuditCore {
    registry: Arc<AnalyzerRegistry>,
    weights: WeightTable,
    analyzer_timeout: Option<Duration>,
    activity: Option<ActivityLog>,
}

impl AuditCore {
    pub fn new(registry: Arc<AnalyzerRegistry>, config: &AuditConfig) -> Self {
        let activity = config
            .activity_log_path
            .as_ref()
            .map(|path| ActivityLog::new(path, config.activity_log_cap));
        Self {
            registry,
            weights: config.weights.clone(),
            analyzer_timeout: config.analyzer_timeout,
            activity,
        }
    }

    pub fn activity_log(&self) -> Option<&ActivityLog> {
        self.activity.as_ref()
    }

    /// Run every analyzer registered right now against `page`.
    ///
    /// Analyzers are instantiated fresh and polled concurrently on the current
    /// task; the audit completes once all of them have settled. Results are
    /// keyed by analyzer name in registration order, a later result replacing
    /// an earlier one with the same name.
    pub async fn analyze(&self, page: &Page) -> Result<AggregateResult, AuditError> {
        let started = Instant::now();
        let timestamp = Utc::now();
        let factories = self.registry.snapshot()?;
        let cx = AuditContext::new(page);

        let instances: Vec<_> = factories
            .into_iter()
            .map(|(registered, factory)| {
                std::panic::catch_unwind(AssertUnwindSafe(|| factory())).map_err(|payload| {
                    AnalyzerResult::failed(
                        registered,
                        Priority::default(),
                        &panic_message(&*payload),
                        Duration::ZERO,
                    )
                })
            })
            .collect();

        let cx = &cx;
        let timeout = self.analyzer_timeout;
        let results = join_all(instances.into_iter().map(|instance| async move {
            match instance {
                Ok(analyzer) => run_analyzer(analyzer, cx, timeout).await,
                Err(failed) => failed,
            }
        }))
        .await;

        let mut categories = Categories::new();
        for result in results {
            if let Some(replaced) = categories.insert(result) {
                debug!(analyzer = %replaced.name, "duplicate analyzer name, keeping later result");
            }
        }

        let score = self.weights.aggregate(&categories);
        debug!(
            queries = cx.dom.stats().misses,
            cache_hits = cx.dom.stats().hits,
            "dom query cache"
        );

        Ok(AggregateResult {
            score,
            categories,
            execution_time_ms: started.elapsed().as_millis() as u64,
            timestamp,
            url: page.url().to_string(),
            title: page.title(),
        })
    }

    /// Caller-facing audit entry point.
    ///
    /// Any failure above the analyzer layer is reported as a single
    /// `AuditError::RunFailed`; a successful run is appended to the activity
    /// log when one is configured.
    pub async fn run(&self, page: &Page) -> Result<AggregateResult, AuditError> {
        info!(url = page.url(), analyzers = self.registry.len(), "starting audit");

        let outcome = AssertUnwindSafe(self.analyze(page)).catch_unwind().await;
        let result = match outcome {
            Ok(Ok(result)) => result,
            Ok(Err(e)) => {
                error!(error = %e, url = page.url(), "audit failed");
                return Err(AuditError::RunFailed(e.to_string()));
            }
            Err(payload) => {
                let reason = panic_message(&*payload);
                error!(error = %reason, url = page.url(), "audit failed");
                return Err(AuditError::RunFailed(reason));
            }
        };

        let failed = result.failed_analyzers();
        info!(
            url = %result.url,
            score = result.score,
            categories = result.categories.len(),
            failed = failed.len(),
            elapsed_ms = result.execution_time_ms,
            "audit complete"
        );

        if let Some(log) = &self.activity {
            log.record(&ActivityEntry::from_result(&result, page.source()));
        }
        Ok(result)
    }
}
