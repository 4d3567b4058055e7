use std::path::PathBuf;
use std::time::Duration;

use crate::error::ConfigError;
use crate::weights::WeightTable;

const DEFAULT_ACTIVITY_LOG_CAP: usize = 50;

/// Audit engine configuration loaded explicitly from environment variables.
///
/// Everything is optional; an unset variable keeps the built-in default.
#[derive(Debug, Clone)]
pub struct AuditConfig {
    /// Upper bound on a single analyzer's run. `None` waits indefinitely.
    pub analyzer_timeout: Option<Duration>,
    pub weights: WeightTable,
    /// JSON-lines file for the run history. `None` disables it.
    pub activity_log_path: Option<PathBuf>,
    pub activity_log_cap: usize,
}

impl Default for AuditConfig {
    fn default() -> Self {
        Self {
            analyzer_timeout: None,
            weights: WeightTable::default(),
            activity_log_path: None,
            activity_log_cap: DEFAULT_ACTIVITY_LOG_CAP,
        }
    }
}

impl AuditConfig {
    /// Optional:
    /// - `SEO_AUDIT_ANALYZER_TIMEOUT_MS`
    /// - `SEO_AUDIT_WEIGHTS` (e.g. "meta=0.2,geo=0.1")
    /// - `SEO_AUDIT_FALLBACK_WEIGHT`
    /// - `SEO_AUDIT_ACTIVITY_LOG`
    /// - `SEO_AUDIT_ACTIVITY_LOG_CAP`
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|var| std::env::var(var).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        if let Some(raw) = lookup("SEO_AUDIT_ANALYZER_TIMEOUT_MS") {
            let ms = parse_number::<u64>("SEO_AUDIT_ANALYZER_TIMEOUT_MS", &raw)?;
            config.analyzer_timeout = (ms > 0).then(|| Duration::from_millis(ms));
        }

        if let Some(raw) = lookup("SEO_AUDIT_FALLBACK_WEIGHT") {
            let fallback = parse_weight("SEO_AUDIT_FALLBACK_WEIGHT", &raw)?;
            config.weights.set_fallback(fallback);
        }

        if let Some(raw) = lookup("SEO_AUDIT_WEIGHTS") {
            for pair in raw.split(',').map(str::trim).filter(|p| !p.is_empty()) {
                let Some((name, weight)) = pair.split_once('=') else {
                    return Err(ConfigError::Invalid {
                        var: "SEO_AUDIT_WEIGHTS",
                        message: format!("expected name=weight, got `{pair}`"),
                    });
                };
                let weight = parse_weight("SEO_AUDIT_WEIGHTS", weight)?;
                config.weights.set(name.trim(), weight);
            }
        }

        config.activity_log_path = lookup("SEO_AUDIT_ACTIVITY_LOG")
            .filter(|p| !p.trim().is_empty())
            .map(PathBuf::from);

        if let Some(raw) = lookup("SEO_AUDIT_ACTIVITY_LOG_CAP") {
            config.activity_log_cap = parse_number::<usize>("SEO_AUDIT_ACTIVITY_LOG_CAP", &raw)?;
        }

        Ok(config)
    }
}

/// Parse a trimmed numeric variable, naming `var` in the error.
pub fn parse_number<T: std::str::FromStr>(var: &'static str, raw: &str) -> Result<T, ConfigError>
where
    T::Err: std::fmt::Display,
{
    raw.trim().parse::<T>().map_err(|e| ConfigError::Invalid {
        var,
        message: format!("`{raw}`: {e}"),
    })
}

fn parse_weight(var: &'static str, raw: &str) -> Result<f64, ConfigError> {
    let weight = parse_number::<f64>(var, raw)?;
    if !weight.is_finite() || weight < 0.0 {
        return Err(ConfigError::Invalid {
            var,
            message: format!("weight must be a non-negative number, got `{}`", raw.trim()),
        });
    }
    Ok(weight)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| vars.get(key).cloned()
    }

    #[test]
    fn test_defaults() {
        let config = AuditConfig::from_lookup(lookup(&[])).unwrap();
        assert_eq!(config.analyzer_timeout, None);
        assert_eq!(config.activity_log_path, None);
        assert_eq!(config.activity_log_cap, 50);
        assert_eq!(config.weights, WeightTable::default());
    }

    #[test]
    fn test_overrides() {
        let config = AuditConfig::from_lookup(lookup(&[
            ("SEO_AUDIT_ANALYZER_TIMEOUT_MS", "1500"),
            ("SEO_AUDIT_WEIGHTS", "meta=0.3, custom = 0.2,"),
            ("SEO_AUDIT_FALLBACK_WEIGHT", "0.02"),
            ("SEO_AUDIT_ACTIVITY_LOG", "/tmp/seo-activity.jsonl"),
            ("SEO_AUDIT_ACTIVITY_LOG_CAP", "10"),
        ]))
        .unwrap();

        assert_eq!(config.analyzer_timeout, Some(Duration::from_millis(1500)));
        assert_eq!(config.weights.weight_for("meta"), 0.3);
        assert_eq!(config.weights.weight_for("custom"), 0.2);
        assert_eq!(config.weights.weight_for("heading"), 0.10);
        assert_eq!(config.weights.weight_for("unlisted"), 0.02);
        assert_eq!(
            config.activity_log_path,
            Some(PathBuf::from("/tmp/seo-activity.jsonl"))
        );
        assert_eq!(config.activity_log_cap, 10);
    }

    #[test]
    fn test_zero_timeout_disables() {
        let config =
            AuditConfig::from_lookup(lookup(&[("SEO_AUDIT_ANALYZER_TIMEOUT_MS", "0")])).unwrap();
        assert_eq!(config.analyzer_timeout, None);
    }

    #[test]
    fn test_rejects_malformed_weights() {
        for raw in ["meta", "meta=abc", "meta=-1", "meta=NaN"] {
            let err = AuditConfig::from_lookup(lookup(&[("SEO_AUDIT_WEIGHTS", raw)])).unwrap_err();
            assert!(
                matches!(err, ConfigError::Invalid { var: "SEO_AUDIT_WEIGHTS", .. }),
                "{raw}"
            );
        }
    }

    #[test]
    fn test_rejects_bad_numbers() {
        for (var, raw) in [
            ("SEO_AUDIT_ACTIVITY_LOG_CAP", "many"),
            ("SEO_AUDIT_ANALYZER_TIMEOUT_MS", "-5"),
        ] {
            assert!(AuditConfig::from_lookup(lookup(&[(var, raw)])).is_err());
        }
    }
}
