//! Iterative refinement of a greedy allocation.
//!
//! Each pass reads the previous allocation and builds a new one: it trims
//! cards from archetypes holding more relevant copies than their cap, drops
//! cards that matter in too few matchups, and backfills the freed slots with
//! the best remaining candidates. The loop stops once an allocation repeats
//! or the iteration cap is hit.

use crate::{MetaSnapshot, OptimizeError, OptimizerConfig, Sideboard};
use serde::{Deserialize, Serialize};
use std::cmp::Reverse;
use std::collections::{HashMap, HashSet};

/// How many copies refinement has trimmed from each card during one run.
#[derive(Debug, Clone, Default)]
pub struct PenaltyTracker {
    counts: HashMap<String, u32>,
}

impl PenaltyTracker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, card: &str) -> u32 {
        self.counts.get(card).copied().unwrap_or(0)
    }

    fn bump(&mut self, card: &str) {
        *self.counts.entry(card.to_string()).or_insert(0) += 1;
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Termination {
    /// The last pass returned its own input.
    FixedPoint,
    /// An allocation seen on an earlier pass came back.
    Cycle,
    /// `max_iterations` passes ran without a repeat.
    IterationCap,
}

#[derive(Debug, Clone)]
pub struct PassOutcome {
    pub sideboard: Sideboard,
    /// One entry per trimmed copy, in the order they were taken.
    pub trimmed: Vec<String>,
    pub dead: Vec<String>,
    pub backfilled: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RefineReport {
    pub allocation: Sideboard,
    pub iterations: u32,
    pub termination: Termination,
}

pub fn refine(
    snapshot: &MetaSnapshot,
    initial: Sideboard,
    config: &OptimizerConfig,
) -> Result<RefineReport, OptimizeError> {
    check_allocation(snapshot, &initial, config)?;

    let mut current = initial;
    let mut penalties = PenaltyTracker::new();
    let mut seen: HashSet<Vec<(String, u32)>> = HashSet::new();
    let mut last_pass_changed = true;

    for iteration in 0..config.max_iterations {
        if !seen.insert(current.canonical()) {
            let termination = if last_pass_changed {
                Termination::Cycle
            } else {
                Termination::FixedPoint
            };
            tracing::debug!(iterations = iteration, ?termination, "refinement settled");
            return Ok(RefineReport {
                allocation: current,
                iterations: iteration,
                termination,
            });
        }
        let outcome = refine_pass(snapshot, &current, &mut penalties, config);
        tracing::trace!(
            iteration,
            trimmed = outcome.trimmed.len(),
            dead = outcome.dead.len(),
            backfilled = outcome.backfilled,
            total = outcome.sideboard.total(),
            "refinement pass"
        );
        last_pass_changed = outcome.sideboard != current;
        current = outcome.sideboard;
    }

    tracing::debug!(
        iterations = config.max_iterations,
        "refinement hit the iteration cap"
    );
    Ok(RefineReport {
        allocation: current,
        iterations: config.max_iterations,
        termination: Termination::IterationCap,
    })
}

/// One trim / dead-card / backfill pass over `previous`.
pub fn refine_pass(
    snapshot: &MetaSnapshot,
    previous: &Sideboard,
    penalties: &mut PenaltyTracker,
    config: &OptimizerConfig,
) -> PassOutcome {
    let threshold = config.relevance_threshold;
    let allocated: Vec<(usize, u32)> = previous
        .iter()
        .filter_map(|(name, copies)| snapshot.card_index(name).map(|idx| (idx, copies)))
        .collect();

    let mut trims: Vec<usize> = Vec::new();
    for (archetype_idx, archetype) in snapshot.archetypes().iter().enumerate() {
        let mut relevant: Vec<usize> = allocated
            .iter()
            .filter(|(card, _)| config.is_relevant(snapshot.score(*card, archetype_idx)))
            .map(|(card, _)| *card)
            .collect();
        let boardable: u32 = allocated
            .iter()
            .filter(|(card, _)| relevant.contains(card))
            .map(|(_, copies)| *copies)
            .sum();
        if boardable <= archetype.max_slots {
            continue;
        }
        let excess = boardable - archetype.max_slots;
        let take = (excess / config.trim_divisor).max(1) as usize;
        relevant.sort_by_key(|card| snapshot.score(*card, archetype_idx));
        tracing::trace!(
            archetype = %archetype.name,
            boardable,
            cap = archetype.max_slots,
            take,
            "archetype over-allocated"
        );
        trims.extend(relevant.into_iter().take(take));
    }

    let dead: Vec<usize> = allocated
        .iter()
        .map(|(card, _)| *card)
        .filter(|card| snapshot.relevant_matchups(*card, threshold) <= config.dead_card_max_matchups)
        .collect();

    let mut next = previous.clone();
    let mut trimmed = Vec::new();
    for card in trims {
        let name = &snapshot.card(card).name;
        if next.remove_copy(name) {
            penalties.bump(name);
            trimmed.push(name.clone());
        }
    }
    let mut dead_names = Vec::new();
    for card in dead {
        let name = &snapshot.card(card).name;
        if next.remove_card(name) > 0 {
            dead_names.push(name.clone());
        }
    }

    let backfilled = backfill(snapshot, &mut next, penalties, config);

    PassOutcome {
        sideboard: next,
        trimmed,
        dead: dead_names,
        backfilled,
    }
}

/// Backfill value: total score minus penalty plus a bonus per relevant matchup.
pub fn backfill_value(
    snapshot: &MetaSnapshot,
    card: usize,
    penalties: &PenaltyTracker,
    config: &OptimizerConfig,
) -> i64 {
    let relevant = snapshot.relevant_matchups(card, config.relevance_threshold) as i64;
    snapshot.total_score(card) - i64::from(penalties.get(&snapshot.card(card).name))
        + config.backfill_relevance_bonus * relevant
}

fn backfill(
    snapshot: &MetaSnapshot,
    sideboard: &mut Sideboard,
    penalties: &PenaltyTracker,
    config: &OptimizerConfig,
) -> u32 {
    let mut remaining = config.slot_budget.saturating_sub(sideboard.total());
    if remaining == 0 {
        return 0;
    }
    let mut ranked: Vec<usize> = (0..snapshot.cards().len()).collect();
    ranked.sort_by_key(|card| Reverse(backfill_value(snapshot, *card, penalties, config)));

    let mut added = 0;
    for card in ranked {
        let card = snapshot.card(card);
        while remaining > 0 && sideboard.copies(&card.name) < card.max_copies {
            sideboard.add_copy(&card.name);
            remaining -= 1;
            added += 1;
        }
        if remaining == 0 {
            break;
        }
    }
    added
}

fn check_allocation(
    snapshot: &MetaSnapshot,
    sideboard: &Sideboard,
    config: &OptimizerConfig,
) -> Result<(), OptimizeError> {
    if sideboard.total() > config.slot_budget {
        return Err(OptimizeError::InvalidAllocation(format!(
            "{} copies exceed the slot budget of {}",
            sideboard.total(),
            config.slot_budget
        )));
    }
    for (name, copies) in sideboard.iter() {
        let Some(idx) = snapshot.card_index(name) else {
            return Err(OptimizeError::InvalidAllocation(format!("unknown card {name}")));
        };
        let max_copies = snapshot.card(idx).max_copies;
        if copies > max_copies {
            return Err(OptimizeError::InvalidAllocation(format!(
                "{name}: {copies} copies exceed max of {max_copies}"
            )));
        }
    }
    Ok(())
}
