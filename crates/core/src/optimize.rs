use crate::{
    adjust_archetypes, assign_greedy, refine, AdjustedArchetype, Archetype, Card, MetaSnapshot,
    OptimizeError, OptimizerConfig, RefineReport, Sideboard,
};
use serde::{Deserialize, Serialize};

/// Read side of the table store an optimization run pulls its data from.
pub trait MetaSource {
    fn load_archetypes(&self) -> Result<Vec<Archetype>, OptimizeError>;
    fn load_cards(&self) -> Result<Vec<Card>, OptimizeError>;

    /// Both tables joined into one snapshot. Sources that can read both
    /// tables at once should override this.
    fn load_snapshot(&self) -> Result<MetaSnapshot, OptimizeError> {
        let archetypes = self.load_archetypes()?;
        let cards = self.load_cards()?;
        Ok(MetaSnapshot::new(archetypes, cards)?)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OptimizeReport {
    pub allocation: Sideboard,
    pub greedy: Sideboard,
    pub adjusted: Vec<AdjustedArchetype>,
    pub refinement: RefineReport,
}

pub fn optimize(
    snapshot: &MetaSnapshot,
    config: &OptimizerConfig,
) -> Result<OptimizeReport, OptimizeError> {
    config.validate()?;
    let adjusted = adjust_archetypes(snapshot, config)?;
    let greedy = assign_greedy(snapshot, &adjusted, config);
    tracing::debug!(
        cards = greedy.len(),
        copies = greedy.total(),
        "greedy assignment done"
    );
    let refinement = refine(snapshot, greedy.clone(), config)?;
    tracing::debug!(
        cards = refinement.allocation.len(),
        copies = refinement.allocation.total(),
        iterations = refinement.iterations,
        termination = ?refinement.termination,
        "optimization done"
    );
    Ok(OptimizeReport {
        allocation: refinement.allocation.clone(),
        greedy,
        adjusted,
        refinement,
    })
}

/// Snapshots `source` once and optimizes against that snapshot.
pub fn optimize_source<S: MetaSource + ?Sized>(
    source: &S,
    config: &OptimizerConfig,
) -> Result<OptimizeReport, OptimizeError> {
    let snapshot = source.load_snapshot()?;
    optimize(&snapshot, config)
}
