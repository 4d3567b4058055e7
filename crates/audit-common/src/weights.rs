use std::collections::HashMap;

use crate::model::Categories;

/// Default share of each known category in the overall score.
pub const DEFAULT_WEIGHTS: &[(&str, f64)] = &[
    ("meta", 0.15),
    ("heading", 0.10),
    ("image", 0.08),
    ("link", 0.08),
    ("social", 0.05),
    ("content", 0.10),
    ("semantic", 0.06),
    ("accessibility", 0.08),
    ("schema", 0.07),
    ("technical", 0.08),
    ("performance", 0.07),
    ("geo", 0.04),
    ("mobile", 0.04),
];

/// Weight for any category name missing from the table.
pub const FALLBACK_WEIGHT: f64 = 0.01;

/// Category weights used to fold per-category scores into one.
#[derive(Debug, Clone, PartialEq)]
pub struct WeightTable {
    weights: HashMap<String, f64>,
    fallback: f64,
}

impl Default for WeightTable {
    fn default() -> Self {
        Self {
            weights: DEFAULT_WEIGHTS
                .iter()
                .map(|(name, weight)| (name.to_string(), *weight))
                .collect(),
            fallback: FALLBACK_WEIGHT,
        }
    }
}

impl WeightTable {
    /// An empty table where every category gets `fallback`.
    pub fn uniform(fallback: f64) -> Self {
        Self {
            weights: HashMap::new(),
            fallback,
        }
    }

    pub fn with_weight(mut self, name: impl Into<String>, weight: f64) -> Self {
        self.set(name, weight);
        self
    }

    pub fn set(&mut self, name: impl Into<String>, weight: f64) {
        self.weights.insert(name.into(), weight);
    }

    pub fn set_fallback(&mut self, fallback: f64) {
        self.fallback = fallback;
    }

    /// Effective weight for `name`. Non-finite or negative weights count as 0.
    pub fn weight_for(&self, name: &str) -> f64 {
        let weight = self.weights.get(name).copied().unwrap_or(self.fallback);
        if weight.is_finite() && weight > 0.0 {
            weight
        } else {
            0.0
        }
    }

    /// `round(Σ score·w / Σ w)` over the categories present; 0 when nothing
    /// carries weight.
    pub fn aggregate(&self, categories: &Categories) -> u8 {
        let (weighted, total) = categories.iter().fold((0.0_f64, 0.0_f64), |(sum, total), result| {
            let weight = self.weight_for(&result.name);
            (sum + f64::from(result.score) * weight, total + weight)
        });

        if total <= 0.0 || !total.is_finite() {
            return 0;
        }
        (weighted / total).round().clamp(0.0, 100.0) as u8
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{AnalyzerResult, Priority};

    fn categories(scores: &[(&str, u8)]) -> Categories {
        let mut categories = Categories::new();
        for (name, score) in scores {
            categories.insert(AnalyzerResult {
                name: name.to_string(),
                priority: Priority::Medium,
                score: *score,
                issues: Vec::new(),
                passed: Vec::new(),
                data: serde_json::Value::Null,
                execution_time_ms: 0,
                error: false,
            });
        }
        categories
    }

    #[test]
    fn test_defaults_sum_to_one() {
        let total: f64 = DEFAULT_WEIGHTS.iter().map(|(_, w)| w).sum();
        assert!((total - 1.0).abs() < 1e-9);
        assert!(DEFAULT_WEIGHTS.iter().all(|(_, w)| *w > FALLBACK_WEIGHT));
    }

    #[test]
    fn test_equal_weights_mean() {
        let table = WeightTable::uniform(0.01)
            .with_weight("a", 0.5)
            .with_weight("b", 0.5);
        assert_eq!(table.aggregate(&categories(&[("a", 80), ("b", 40)])), 60);
    }

    #[test]
    fn test_empty_is_zero() {
        assert_eq!(WeightTable::default().aggregate(&Categories::new()), 0);
    }

    #[test]
    fn test_single_category_equals_its_score() {
        assert_eq!(WeightTable::default().aggregate(&categories(&[("meta", 90)])), 90);
        assert_eq!(WeightTable::default().aggregate(&categories(&[("mystery", 37)])), 37);
    }

    #[test]
    fn test_unknown_category_has_small_influence() {
        let table = WeightTable::default();
        let base = categories(&[("meta", 100), ("heading", 100)]);
        assert_eq!(table.aggregate(&base), 100);

        let with_unknown = categories(&[("meta", 100), ("heading", 100), ("mystery", 0)]);
        let with_known = categories(&[("meta", 100), ("heading", 100), ("schema", 0)]);
        let unknown_score = table.aggregate(&with_unknown);
        let known_score = table.aggregate(&with_known);

        assert_eq!(table.weight_for("mystery"), FALLBACK_WEIGHT);
        assert!(unknown_score < 100);
        assert!(unknown_score > known_score);
    }

    #[test]
    fn test_rounds_half_up() {
        let table = WeightTable::uniform(1.0);
        assert_eq!(table.aggregate(&categories(&[("a", 50), ("b", 51)])), 51);
        assert_eq!(table.aggregate(&categories(&[("a", 0), ("b", 1)])), 1);
    }

    #[test]
    fn test_zero_total_weight_is_zero() {
        let table = WeightTable::uniform(0.0);
        assert_eq!(table.aggregate(&categories(&[("a", 80), ("b", 90)])), 0);
    }

    #[test]
    fn test_malformed_weights_are_ignored() {
        let table = WeightTable::uniform(0.0)
            .with_weight("a", f64::NAN)
            .with_weight("b", -3.0)
            .with_weight("c", f64::INFINITY)
            .with_weight("d", 1.0);
        assert_eq!(table.weight_for("a"), 0.0);
        assert_eq!(table.weight_for("b"), 0.0);
        assert_eq!(table.weight_for("c"), 0.0);
        assert_eq!(
            table.aggregate(&categories(&[("a", 10), ("b", 20), ("c", 30), ("d", 70)])),
            70
        );
    }
}
