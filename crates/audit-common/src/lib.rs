pub mod activity;
pub mod analyzer;
pub mod config;
pub mod dom;
pub mod engine;
pub mod error;
pub mod model;
pub mod registry;
pub mod suggestions;
pub mod weights;

pub use analyzer::{run_analyzer, Analyzer, Scorecard};
pub use config::AuditConfig;
pub use dom::{element_text, AuditContext, DomQuery, Page, PageTiming};
pub use engine::AuditCore;
pub use error::{AnalyzerError, AuditError, ConfigError, DomError};
pub use model::{
    AggregateResult, AnalyzerResult, Categories, Issue, PassedCheck, Priority, ScoreBand, Severity,
};
pub use registry::{AnalyzerFactory, AnalyzerRegistry};
pub use weights::WeightTable;
