use chrono::{DateTime, Utc};
use serde::ser::SerializeMap;
use serde::{Deserialize, Serialize, Serializer};

/// How bad a detected problem is. Each severity carries a fixed score penalty.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Critical,
    Warning,
    Info,
}

impl Severity {
    /// Points subtracted from the running analyzer score for one issue.
    pub const fn penalty(self) -> i32 {
        match self {
            Severity::Critical => 20,
            Severity::Warning => 10,
            Severity::Info => 5,
        }
    }

    pub const fn as_str(self) -> &'static str {
        match self {
            Severity::Critical => "critical",
            Severity::Warning => "warning",
            Severity::Info => "info",
        }
    }
}

impl std::fmt::Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Analyzer metadata. Not consumed by aggregation.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    High,
    #[default]
    Medium,
    Low,
}

/// A detected problem, in detection order within its analyzer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Issue {
    pub severity: Severity,
    /// Human-readable problem statement, e.g. "Missing meta description"
    pub message: String,
    /// Free-form context such as the offending value or a count
    pub details: Option<String>,
    /// Remediation hint derived from `message`
    pub suggestion: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PassedCheck {
    pub message: String,
    pub details: Option<String>,
}

/// Outcome of one analyzer for one audit run.
#[derive(Debug, Clone, Serialize)]
pub struct AnalyzerResult {
    /// Category key used for weighting and report grouping
    pub name: String,
    pub priority: Priority,
    /// Clamped to [0, 100]
    pub score: u8,
    pub issues: Vec<Issue>,
    pub passed: Vec<PassedCheck>,
    /// Analyzer-defined findings; the core never inspects this
    pub data: serde_json::Value,
    pub execution_time_ms: u64,
    /// Set when the analyzer failed; score is then 0 with a single critical issue
    pub error: bool,
}

impl AnalyzerResult {
    pub fn issue_count(&self, severity: Severity) -> usize {
        self.issues.iter().filter(|i| i.severity == severity).count()
    }
}

/// Category results keyed by analyzer name, kept in invocation order.
///
/// Inserting a name that is already present replaces the earlier result in
/// its original slot.
#[derive(Debug, Clone, Default)]
pub struct Categories {
    entries: Vec<AnalyzerResult>,
}

impl Categories {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a result, returning the one it replaced (if any).
    pub fn insert(&mut self, result: AnalyzerResult) -> Option<AnalyzerResult> {
        match self.entries.iter_mut().find(|r| r.name == result.name) {
            Some(slot) => Some(std::mem::replace(slot, result)),
            None => {
                self.entries.push(result);
                None
            }
        }
    }

    pub fn get(&self, name: &str) -> Option<&AnalyzerResult> {
        self.entries.iter().find(|r| r.name == name)
    }

    pub fn iter(&self) -> impl Iterator<Item = &AnalyzerResult> {
        self.entries.iter()
    }

    pub fn names(&self) -> Vec<&str> {
        self.entries.iter().map(|r| r.name.as_str()).collect()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl Serialize for Categories {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for result in &self.entries {
            map.serialize_entry(&result.name, result)?;
        }
        map.end()
    }
}

/// Outcome of one full audit run.
#[derive(Debug, Clone, Serialize)]
pub struct AggregateResult {
    /// Weighted mean of the category scores, clamped to [0, 100]
    pub score: u8,
    pub categories: Categories,
    pub execution_time_ms: u64,
    pub timestamp: DateTime<Utc>,
    pub url: String,
    pub title: String,
}

impl AggregateResult {
    pub fn band(&self) -> ScoreBand {
        ScoreBand::from_score(self.score)
    }

    pub fn failed_analyzers(&self) -> Vec<&str> {
        self.categories
            .iter()
            .filter(|r| r.error)
            .map(|r| r.name.as_str())
            .collect()
    }
}

/// Coarse label for an aggregate score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ScoreBand {
    Excellent,
    Good,
    NeedsWork,
    Poor,
}

impl ScoreBand {
    pub fn from_score(score: u8) -> Self {
        match score {
            90..=u8::MAX => ScoreBand::Excellent,
            70..=89 => ScoreBand::Good,
            50..=69 => ScoreBand::NeedsWork,
            _ => ScoreBand::Poor,
        }
    }

    pub const fn label(self) -> &'static str {
        match self {
            ScoreBand::Excellent => "excellent",
            ScoreBand::Good => "good",
            ScoreBand::NeedsWork => "needs work",
            ScoreBand::Poor => "poor",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn result(name: &str, score: u8) -> AnalyzerResult {
        AnalyzerResult {
            name: name.to_string(),
            priority: Priority::Medium,
            score,
            issues: Vec::new(),
            passed: Vec::new(),
            data: serde_json::Value::Null,
            execution_time_ms: 0,
            error: false,
        }
    }

    #[test]
    fn test_categories_replace_in_place() {
        let mut categories = Categories::new();
        assert!(categories.insert(result("meta", 90)).is_none());
        assert!(categories.insert(result("heading", 70)).is_none());

        let replaced = categories.insert(result("meta", 40)).unwrap();
        assert_eq!(replaced.score, 90);
        assert_eq!(categories.len(), 2);
        assert_eq!(categories.names(), vec!["meta", "heading"]);
        assert_eq!(categories.get("meta").unwrap().score, 40);
    }

    #[test]
    fn test_categories_serialize_as_ordered_map() {
        let mut categories = Categories::new();
        categories.insert(result("link", 80));
        categories.insert(result("image", 60));

        let json = serde_json::to_string(&categories).unwrap();
        let link_pos = json.find("\"link\"").unwrap();
        let image_pos = json.find("\"image\"").unwrap();
        assert!(link_pos < image_pos);

        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value["image"]["score"], 60);
    }

    #[test]
    fn test_score_band_boundaries() {
        assert_eq!(ScoreBand::from_score(100), ScoreBand::Excellent);
        assert_eq!(ScoreBand::from_score(90), ScoreBand::Excellent);
        assert_eq!(ScoreBand::from_score(89), ScoreBand::Good);
        assert_eq!(ScoreBand::from_score(50), ScoreBand::NeedsWork);
        assert_eq!(ScoreBand::from_score(49), ScoreBand::Poor);
        assert_eq!(ScoreBand::from_score(0), ScoreBand::Poor);
    }
}
