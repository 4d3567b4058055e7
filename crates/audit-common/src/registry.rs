/// Name → factory mapping that analyzer modules register into.
///
/// Modules may register at any point, including after audits have already
/// run; the engine reads whatever is present when an audit starts.
/// Registering an existing name replaces its factory but keeps its slot, so
/// result order stays the order names were first registered in.
///
/// Readiness is an explicit barrier: modules await `ready()` once instead of
/// polling for the core, and callers that expect late modules can await
/// `wait_for_count()`.
use std::sync::{Arc, RwLock};
use std::time::Duration;

use tokio::sync::watch;
use tracing::{debug, info, warn};

use crate::analyzer::Analyzer;
use crate::error::AuditError;

/// Builds a fresh analyzer instance for one audit run.
pub type AnalyzerFactory = Arc<dyn Fn() -> Box<dyn Analyzer> + Send + Sync>;

pub struct AnalyzerRegistry {
    entries: RwLock<Vec<(String, AnalyzerFactory)>>,
    ready: watch::Sender<bool>,
    registered: watch::Sender<usize>,
}

impl Default for AnalyzerRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl AnalyzerRegistry {
    pub fn new() -> Self {
        Self {
            entries: RwLock::new(Vec::new()),
            ready: watch::Sender::new(false),
            registered: watch::Sender::new(0),
        }
    }

    /// Insert or replace the factory for `name`.
    ///
    /// A poisoned registry rejects the registration, matching `snapshot`.
    pub fn register<F>(&self, name: impl Into<String>, factory: F)
    where
        F: Fn() -> Box<dyn Analyzer> + Send + Sync + 'static,
    {
        let name = name.into();
        let factory: AnalyzerFactory = Arc::new(factory);
        let count = {
            let Ok(mut entries) = self.entries.write() else {
                warn!(analyzer = %name, "analyzer registry poisoned, registration dropped");
                return;
            };
            match entries.iter_mut().find(|(n, _)| *n == name) {
                Some(slot) => {
                    debug!(analyzer = %name, "replacing registered analyzer");
                    slot.1 = factory;
                }
                None => {
                    debug!(analyzer = %name, "registered analyzer");
                    entries.push((name, factory));
                }
            }
            entries.len()
        };
        self.registered.send_replace(count);
    }

    /// Ordered copy of the current registrations.
    pub fn snapshot(&self) -> Result<Vec<(String, AnalyzerFactory)>, AuditError> {
        let entries = self
            .entries
            .read()
            .map_err(|_| AuditError::RegistryUnavailable)?;
        Ok(entries
            .iter()
            .map(|(name, factory)| (name.clone(), Arc::clone(factory)))
            .collect())
    }

    pub fn names(&self) -> Vec<String> {
        self.snapshot()
            .map(|entries| entries.into_iter().map(|(name, _)| name).collect())
            .unwrap_or_default()
    }

    pub fn len(&self) -> usize {
        *self.registered.borrow()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Signal that the core is initialized and accepting registrations.
    pub fn open(&self) {
        if !self.ready.send_replace(true) {
            info!("analyzer registry open");
        }
    }

    pub fn is_open(&self) -> bool {
        *self.ready.borrow()
    }

    /// Resolves once `open()` has been called.
    pub async fn ready(&self) {
        let mut rx = self.ready.subscribe();
        // The sender lives in `self`, so the channel cannot close while we wait.
        let _ = rx.wait_for(|open| *open).await;
    }

    /// Wait until at least `expected` distinct names are registered.
    ///
    /// Returns the number registered when the wait ended; a value below
    /// `expected` means the timeout elapsed first.
    pub async fn wait_for_count(&self, expected: usize, timeout: Duration) -> usize {
        let mut rx = self.registered.subscribe();
        let waited = tokio::time::timeout(timeout, rx.wait_for(|count| *count >= expected)).await;
        if waited.is_err() {
            debug!(expected, registered = self.len(), "timed out waiting for analyzers");
        }
        self.len()
    }

    /// Poison the entry lock the way a panic mid-registration would.
    #[cfg(test)]
    pub(crate) fn poison(&self) {
        let _ = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
            let _guard = self.entries.write();
            panic!("registration panicked");
        }));
    }
}
