use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error, PartialEq)]
pub enum ConfigError {
    #[error("slot budget must be positive")]
    ZeroSlotBudget,
    #[error("per-assignment ceiling must be positive")]
    ZeroAssignmentCeiling,
    #[error("trim divisor must be positive")]
    ZeroTrimDivisor,
    #[error("{0} must be finite and non-negative")]
    InvalidWeight(&'static str),
}

/// Tunable constants of one optimization run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OptimizerConfig {
    pub slot_budget: u32,
    /// Numerator of the predicted play-rate weight (divided by total games).
    pub playrate_prior_weight: f64,
    /// Fights needed before the observed win-rate outweighs the 0.5 prior.
    pub winrate_prior_strength: f64,
    pub playrate_priority_weight: f64,
    pub underperformance_weight: f64,
    pub per_assignment_ceiling: u32,
    /// Scores strictly above this make a card relevant against an archetype.
    pub relevance_threshold: u8,
    pub dead_card_max_matchups: usize,
    pub trim_divisor: u32,
    pub backfill_relevance_bonus: i64,
    pub max_iterations: u32,
}

impl Default for OptimizerConfig {
    fn default() -> Self {
        Self {
            slot_budget: 15,
            playrate_prior_weight: 1.0,
            winrate_prior_strength: 30.0,
            playrate_priority_weight: 0.7,
            underperformance_weight: 0.3,
            per_assignment_ceiling: 4,
            relevance_threshold: 5,
            dead_card_max_matchups: 2,
            trim_divisor: 3,
            backfill_relevance_bonus: 3,
            max_iterations: 100,
        }
    }
}

impl OptimizerConfig {
    pub fn with_slot_budget(mut self, slot_budget: u32) -> Self {
        self.slot_budget = slot_budget;
        self
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.slot_budget == 0 {
            return Err(ConfigError::ZeroSlotBudget);
        }
        if self.per_assignment_ceiling == 0 {
            return Err(ConfigError::ZeroAssignmentCeiling);
        }
        if self.trim_divisor == 0 {
            return Err(ConfigError::ZeroTrimDivisor);
        }
        for (label, value) in [
            ("playrate_prior_weight", self.playrate_prior_weight),
            ("winrate_prior_strength", self.winrate_prior_strength),
            ("playrate_priority_weight", self.playrate_priority_weight),
            ("underperformance_weight", self.underperformance_weight),
        ] {
            if !value.is_finite() || value < 0.0 {
                return Err(ConfigError::InvalidWeight(label));
            }
        }
        Ok(())
    }

    pub fn is_relevant(&self, score: u8) -> bool {
        score > self.relevance_threshold
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        assert_eq!(OptimizerConfig::default().validate(), Ok(()));
    }

    #[test]
    fn partial_json_keeps_defaults() {
        let config: OptimizerConfig =
            serde_json::from_str(r#"{"playrate_prior_weight": 5.0}"#).expect("parse");
        assert_eq!(config.playrate_prior_weight, 5.0);
        assert_eq!(config.slot_budget, 15);
        assert_eq!(config.max_iterations, 100);
    }

    #[test]
    fn rejects_zero_budget_and_negative_weights() {
        let config = OptimizerConfig::default().with_slot_budget(0);
        assert_eq!(config.validate(), Err(ConfigError::ZeroSlotBudget));

        let config = OptimizerConfig {
            winrate_prior_strength: -1.0,
            ..OptimizerConfig::default()
        };
        assert_eq!(
            config.validate(),
            Err(ConfigError::InvalidWeight("winrate_prior_strength"))
        );
    }

    #[test]
    fn relevance_is_strictly_above_threshold() {
        let config = OptimizerConfig::default();
        assert!(!config.is_relevant(5));
        assert!(config.is_relevant(6));
    }
}
