use std::time::Duration;

use audit_common::config::parse_number;
use audit_common::ConfigError;

const DEFAULT_FETCH_TIMEOUT_SECS: u64 = 30;
const DEFAULT_USER_AGENT: &str = concat!("seo-audit/", env!("CARGO_PKG_VERSION"));

/// Settings for loading the page. Engine settings live in `AuditConfig`.
#[derive(Debug, Clone)]
pub struct CliConfig {
    pub fetch_timeout: Duration,
    pub user_agent: String,
}

impl CliConfig {
    /// Optional:
    /// - `SEO_AUDIT_FETCH_TIMEOUT_SECS` (default 30, must be positive)
    /// - `SEO_AUDIT_USER_AGENT`
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let fetch_timeout = match lookup("SEO_AUDIT_FETCH_TIMEOUT_SECS") {
            Some(raw) => {
                let secs = parse_number::<u64>("SEO_AUDIT_FETCH_TIMEOUT_SECS", &raw)?;
                if secs == 0 {
                    return Err(ConfigError::Invalid {
                        var: "SEO_AUDIT_FETCH_TIMEOUT_SECS",
                        message: "timeout must be greater than zero".to_string(),
                    });
                }
                Duration::from_secs(secs)
            }
            None => Duration::from_secs(DEFAULT_FETCH_TIMEOUT_SECS),
        };

        let user_agent = lookup("SEO_AUDIT_USER_AGENT")
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .unwrap_or_else(|| DEFAULT_USER_AGENT.to_string());

        Ok(Self {
            fetch_timeout,
            user_agent,
        })
    }
}
