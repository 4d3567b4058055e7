/// Error types shared by the audit core and the analyzer crates.
///
/// Analyzer-level failures (`AnalyzerError`, `DomError`) never leave
/// `run_analyzer`; they are folded into an error-shaped `AnalyzerResult`.
/// Only `AuditError` is ever returned to callers of the engine.

#[derive(Debug, thiserror::Error)]
pub enum DomError {
    #[error("invalid selector `{selector}`: {message}")]
    InvalidSelector { selector: String, message: String },
}

#[derive(Debug, thiserror::Error)]
pub enum AnalyzerError {
    #[error(transparent)]
    Dom(#[from] DomError),

    #[error("{0}")]
    Failed(String),
}

#[derive(Debug, thiserror::Error)]
pub enum AuditError {
    #[error("analyzer registry unavailable")]
    RegistryUnavailable,

    #[error("audit failed: {0}")]
    RunFailed(String),
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("invalid value for {var}: {message}")]
    Invalid { var: &'static str, message: String },
}
