mod config;
mod error;
mod fetch;
mod report;

use std::path::PathBuf;
use std::sync::Arc;

use audit_common::{AnalyzerRegistry, AuditConfig, AuditCore, Page};
use clap::Parser;
use tracing::info;
use tracing_subscriber::EnvFilter;

use config::CliConfig;
use error::AppError;
use fetch::Fetcher;

/// Audit a single HTML page for SEO, accessibility and answer-engine readiness.
#[derive(Debug, Parser)]
#[command(name = "seo-audit", version, about)]
struct Cli {
    /// http(s) URL to fetch, or a path to a saved HTML file
    target: String,

    /// Print the full result as JSON instead of the text report
    #[arg(long)]
    json: bool,

    /// URL to audit a local file as (affects link and HTTPS checks)
    #[arg(long)]
    url: Option<String>,
}

/// Engine and CLI settings from one variable source, e.g. the process env.
fn load_config<F>(lookup: F) -> Result<(AuditConfig, CliConfig), AppError>
where
    F: Fn(&str) -> Option<String>,
{
    let audit = AuditConfig::from_lookup(&lookup)?;
    let cli = CliConfig::from_lookup(&lookup)?;
    Ok((audit, cli))
}

async fn load_page(cli: &Cli, config: CliConfig) -> Result<Page, AppError> {
    if fetch::is_remote(&cli.target) {
        let fetcher = Fetcher::new(config)?;
        fetcher.fetch(&cli.target).await
    } else {
        fetch::read_local(&PathBuf::from(&cli.target), cli.url.as_deref()).await
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Logs go to stderr so stdout carries only the report
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::from_default_env().add_directive(tracing::Level::WARN.into()),
        )
        .with_writer(std::io::stderr)
        .with_ansi(false)
        .init();

    let cli = Cli::parse();

    let (audit_config, cli_config) = load_config(|var| std::env::var(var).ok())?;
    info!(
        analyzer_timeout_ms = audit_config.analyzer_timeout.map(|t| t.as_millis() as u64),
        activity_log = audit_config.activity_log_path.is_some(),
        fetch_timeout_secs = cli_config.fetch_timeout.as_secs(),
        "configuration loaded"
    );

    // Analyzers register once the registry opens; the audit waits for all of them.
    let registry = Arc::new(AnalyzerRegistry::new());
    let loader = tokio::spawn(seo_analyzers::install_when_ready(Arc::clone(&registry)));
    registry.open();
    loader.await?;

    let page = load_page(&cli, cli_config).await?;
    let core = AuditCore::new(registry, &audit_config);
    let result = core.run(&page).await?;

    if cli.json {
        println!("{}", serde_json::to_string_pretty(&result)?);
    } else {
        print!("{}", report::render(&result));
    }
    Ok(())
}
