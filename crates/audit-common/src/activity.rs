/// Capped run history, one JSON object per line.
///
/// Write failures degrade gracefully: they are logged and the audit carries
/// on. The file never holds more than `cap` entries; the oldest are dropped.
use std::fs;
use std::io::{BufRead, BufReader};
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use tracing::warn;

use crate::model::AggregateResult;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActivityEntry {
    pub timestamp: DateTime<Utc>,
    pub url: String,
    pub title: String,
    pub score: u8,
    pub analyzers: usize,
    pub failed_analyzers: Vec<String>,
    pub execution_time_ms: u64,
    /// SHA-256 of the audited page source
    pub fingerprint: String,
}

impl ActivityEntry {
    pub fn from_result(result: &AggregateResult, source: &str) -> Self {
        Self {
            timestamp: result.timestamp,
            url: result.url.clone(),
            title: result.title.clone(),
            score: result.score,
            analyzers: result.categories.len(),
            failed_analyzers: result
                .failed_analyzers()
                .into_iter()
                .map(str::to_string)
                .collect(),
            execution_time_ms: result.execution_time_ms,
            fingerprint: page_fingerprint(source),
        }
    }
}

#[derive(Debug, Clone)]
pub struct ActivityLog {
    path: PathBuf,
    cap: usize,
}

impl ActivityLog {
    pub fn new(path: impl Into<PathBuf>, cap: usize) -> Self {
        Self {
            path: path.into(),
            cap,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Append `entry`, trimming to the newest `cap`. Returns `true` on success.
    pub fn record(&self, entry: &ActivityEntry) -> bool {
        if self.cap == 0 {
            return false;
        }

        let mut entries = self.entries();
        entries.push(entry.clone());
        let overflow = entries.len().saturating_sub(self.cap);
        entries.drain(..overflow);

        let mut body = String::new();
        for entry in &entries {
            match serde_json::to_string(entry) {
                Ok(line) => {
                    body.push_str(&line);
                    body.push('\n');
                }
                Err(e) => warn!(error = %e, "activity entry serialization failed"),
            }
        }

        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            if let Err(e) = fs::create_dir_all(parent) {
                warn!(error = %e, path = %parent.display(), "cannot create activity log directory");
                return false;
            }
        }

        fs::write(&self.path, body)
            .inspect_err(|e| {
                warn!(error = %e, path = %self.path.display(), "activity log write failed")
            })
            .is_ok()
    }

    /// All stored entries, oldest first. Unreadable lines are skipped.
    pub fn entries(&self) -> Vec<ActivityEntry> {
        let Ok(file) = fs::File::open(&self.path) else {
            return Vec::new();
        };
        BufReader::new(file)
            .lines()
            .map_while(Result::ok)
            .filter(|line| !line.trim().is_empty())
            .filter_map(|line| {
                serde_json::from_str(&line)
                    .inspect_err(|e| warn!(error = %e, "skipping malformed activity entry"))
                    .ok()
            })
            .collect()
    }
}

/// Hex SHA-256 of the page source.
pub fn page_fingerprint(source: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(source.as_bytes());
    format!("{:x}", hasher.finalize())
}
