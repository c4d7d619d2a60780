//! Relationship confidence
//!
//! A new relationship starts at the initial confidence. Each repeated
//! assertion moves it a fixed fraction of the remaining distance to 1.0:
//! `new = old + (1 - old) * factor`, rounded to three decimals.

use crate::config::GraphConfig;

/// Default confidence of a freshly created relationship
pub const DEFAULT_INITIAL_CONFIDENCE: f64 = 0.5;

/// Default fraction of the gap to 1.0 closed by each repeated assertion
pub const DEFAULT_INCREASE_FACTOR: f64 = 0.10;

/// Compute the strengthened confidence of an existing relationship
pub fn calculate_confidence(confidence: f64, increase_factor: f64) -> f64 {
    let confidence = confidence.clamp(0.0, 1.0);
    let new_confidence = confidence + (1.0 - confidence) * increase_factor.clamp(0.0, 1.0);
    (new_confidence * 1000.0).round() / 1000.0
}

/// Starting value and growth rate for relationship confidence
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ConfidencePolicy {
    pub initial: f64,
    pub increase_factor: f64,
}

impl Default for ConfidencePolicy {
    fn default() -> Self {
        Self {
            initial: DEFAULT_INITIAL_CONFIDENCE,
            increase_factor: DEFAULT_INCREASE_FACTOR,
        }
    }
}

impl ConfidencePolicy {
    pub fn from_config(config: &GraphConfig) -> Self {
        Self {
            initial: config.initial_confidence,
            increase_factor: config.increase_factor,
        }
    }

    /// Next confidence for a relationship that already exists
    ///
    /// A relationship without a confidence property is treated as if it had
    /// the initial confidence.
    pub fn strengthen(&self, current: Option<f64>) -> f64 {
        calculate_confidence(current.unwrap_or(self.initial), self.increase_factor)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_calculate_confidence_default_factor() {
        assert_eq!(calculate_confidence(0.5, 0.10), 0.55);
        assert_eq!(calculate_confidence(0.55, 0.10), 0.595);
        assert_eq!(calculate_confidence(0.0, 0.10), 0.1);
    }

    #[test]
    fn test_calculate_confidence_is_capped() {
        assert_eq!(calculate_confidence(1.0, 0.10), 1.0);
        assert_eq!(calculate_confidence(1.7, 0.10), 1.0);
        assert_eq!(calculate_confidence(0.5, 3.0), 1.0);
    }

    #[test]
    fn test_zero_factor_keeps_confidence() {
        assert_eq!(calculate_confidence(0.42, 0.0), 0.42);
    }

    #[test]
    fn test_repeated_strengthening_is_monotonic() {
        let policy = ConfidencePolicy::default();
        let mut confidence = policy.initial;
        for _ in 0..200 {
            let next = policy.strengthen(Some(confidence));
            assert!(next >= confidence);
            assert!(next <= 1.0);
            confidence = next;
        }
        assert!(confidence > 0.99);
    }

    #[test]
    fn test_missing_confidence_uses_initial() {
        let policy = ConfidencePolicy::default();
        assert_eq!(policy.strengthen(None), 0.55);
    }

    #[test]
    fn test_policy_from_config() {
        let config = GraphConfig {
            initial_confidence: 0.2,
            increase_factor: 0.5,
            default_label: "Concept".to_string(),
        };
        let policy = ConfidencePolicy::from_config(&config);
        assert_eq!(policy.initial, 0.2);
        assert_eq!(policy.strengthen(Some(0.2)), 0.6);
    }
}
