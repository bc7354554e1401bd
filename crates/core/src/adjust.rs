//! Shrinkage estimates of how often each archetype shows up and how well
//! we do against it.
//!
//! Sparse archetypes lean on their predicted share and on a neutral 0.5
//! win-rate; archetypes with many recorded fights are driven by the data.

use crate::{MetaSnapshot, OptimizeError, OptimizerConfig};
use serde::{Deserialize, Serialize};

const NEUTRAL_WINRATE: f64 = 0.5;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AdjustedArchetype {
    pub name: String,
    pub adjusted_playrate: f64,
    pub adjusted_winrate: f64,
    pub max_slots: u32,
    /// Greedy ordering key: frequent and under-performing archetypes first.
    pub priority: f64,
}

pub fn adjust_archetypes(
    snapshot: &MetaSnapshot,
    config: &OptimizerConfig,
) -> Result<Vec<AdjustedArchetype>, OptimizeError> {
    let total = snapshot.total_games();
    if total == 0 {
        return Err(OptimizeError::InsufficientData);
    }
    let total = total as f64;
    let prior_weight = config.playrate_prior_weight / total;

    let adjusted = snapshot
        .archetypes()
        .iter()
        .map(|archetype| {
            let faced = f64::from(archetype.times_faced);
            let fights = faced.max(1.0);
            let adjusted_playrate = (faced + archetype.predicted_playrate * prior_weight)
                / (total + prior_weight);

            let strength = config.winrate_prior_strength / fights;
            let adjusted_winrate = (f64::from(archetype.match_wins) + NEUTRAL_WINRATE * strength)
                / (fights + strength);

            let priority = config.playrate_priority_weight * adjusted_playrate
                + config.underperformance_weight * (NEUTRAL_WINRATE - adjusted_winrate);

            tracing::trace!(
                archetype = %archetype.name,
                adjusted_playrate,
                adjusted_winrate,
                priority,
                "adjusted archetype"
            );
            AdjustedArchetype {
                name: archetype.name.clone(),
                adjusted_playrate,
                adjusted_winrate,
                max_slots: archetype.max_slots,
                priority,
            }
        })
        .collect();
    Ok(adjusted)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Archetype;

    fn snapshot_of(archetypes: Vec<Archetype>) -> MetaSnapshot {
        MetaSnapshot::new(archetypes, Vec::new()).expect("snapshot")
    }

    fn close(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    #[test]
    fn matches_reference_values() {
        let snapshot = snapshot_of(vec![
            Archetype::new("A", 0.6, 5).with_record(10, 7),
            Archetype::new("B", 0.4, 10),
        ]);
        let adjusted = adjust_archetypes(&snapshot, &OptimizerConfig::default()).expect("adjust");

        // w = 1 / 10
        assert!(close(adjusted[0].adjusted_playrate, (10.0 + 0.06) / 10.1));
        assert!(close(adjusted[1].adjusted_playrate, 0.04 / 10.1));
        // s = 30 / 10 for A, 30 / 1 for B
        assert!(close(adjusted[0].adjusted_winrate, (7.0 + 1.5) / 13.0));
        assert!(close(adjusted[1].adjusted_winrate, 15.0 / 31.0));
        assert!(adjusted[0].priority > adjusted[1].priority);
    }

    #[test]
    fn unseen_archetype_shrinks_toward_prediction() {
        let snapshot = snapshot_of(vec![
            Archetype::new("Seen", 0.1, 4).with_record(4, 2),
            Archetype::new("Unseen", 0.3, 4),
        ]);
        let adjusted = adjust_archetypes(&snapshot, &OptimizerConfig::default()).expect("adjust");
        assert!(adjusted[1].adjusted_playrate > 0.0);
        assert!(close(adjusted[1].adjusted_winrate, 15.0 / 31.0));
    }

    #[test]
    fn larger_prior_weight_pulls_harder() {
        let snapshot = snapshot_of(vec![
            Archetype::new("Seen", 0.1, 4).with_record(4, 2),
            Archetype::new("Unseen", 0.3, 4),
        ]);
        let light = adjust_archetypes(&snapshot, &OptimizerConfig::default()).expect("adjust");
        let heavy = adjust_archetypes(
            &snapshot,
            &OptimizerConfig {
                playrate_prior_weight: 5.0,
                ..OptimizerConfig::default()
            },
        )
        .expect("adjust");
        assert!(heavy[1].adjusted_playrate > light[1].adjusted_playrate);
    }

    #[test]
    fn rates_stay_in_bounds() {
        let snapshot = snapshot_of(vec![
            Archetype::new("Always", 1.0, 4).with_record(50, 50),
            Archetype::new("Never", 0.0, 4).with_record(50, 0),
            Archetype::new("Fresh", 0.5, 4),
        ]);
        for row in adjust_archetypes(&snapshot, &OptimizerConfig::default()).expect("adjust") {
            assert!(row.adjusted_winrate > 0.0 && row.adjusted_winrate < 1.0);
            assert!(row.adjusted_playrate > 0.0 && row.adjusted_playrate <= 1.0);
        }
    }

    #[test]
    fn no_games_is_insufficient_data() {
        let snapshot = snapshot_of(vec![Archetype::new("A", 0.5, 4), Archetype::new("B", 0.5, 4)]);
        let err = adjust_archetypes(&snapshot, &OptimizerConfig::default()).unwrap_err();
        assert!(matches!(err, OptimizeError::InsufficientData));

        let err = adjust_archetypes(&snapshot_of(Vec::new()), &OptimizerConfig::default()).unwrap_err();
        assert!(matches!(err, OptimizeError::InsufficientData));
    }
}
