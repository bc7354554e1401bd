use crate::{AdjustedArchetype, MetaSnapshot, OptimizerConfig, Sideboard};
use std::cmp::Ordering;

/// Archetype indices by descending priority. The sort is stable, so equal
/// priorities keep table order.
pub fn priority_order(adjusted: &[AdjustedArchetype]) -> Vec<usize> {
    let mut order: Vec<usize> = (0..adjusted.len()).collect();
    order.sort_by(|a, b| {
        adjusted[*b]
            .priority
            .partial_cmp(&adjusted[*a].priority)
            .unwrap_or(Ordering::Equal)
    });
    order
}

/// Card indices by descending score against one archetype, table order on ties.
fn cards_for(snapshot: &MetaSnapshot, archetype: usize) -> Vec<usize> {
    let mut order: Vec<usize> = (0..snapshot.cards().len()).collect();
    order.sort_by_key(|card| std::cmp::Reverse(snapshot.score(*card, archetype)));
    order
}

/// Builds the first allocation by walking archetypes in priority order and
/// handing each card `min(ceiling, remaining, max copies, max slots)` copies.
///
/// A card assigned again by a later archetype has its count replaced, not
/// summed, while the budget is still charged for both assignments.
pub fn assign_greedy(
    snapshot: &MetaSnapshot,
    adjusted: &[AdjustedArchetype],
    config: &OptimizerConfig,
) -> Sideboard {
    let mut sideboard = Sideboard::new();
    let mut remaining = config.slot_budget;

    for archetype in priority_order(adjusted) {
        if remaining == 0 {
            break;
        }
        let max_slots = adjusted[archetype].max_slots;
        for card in cards_for(snapshot, archetype) {
            if remaining == 0 {
                break;
            }
            let copies = config
                .per_assignment_ceiling
                .min(remaining)
                .min(snapshot.card(card).max_copies)
                .min(max_slots);
            if copies > 0 {
                let name = &snapshot.card(card).name;
                if sideboard.contains(name) {
                    tracing::debug!(
                        card = %name,
                        previous = sideboard.copies(name),
                        copies,
                        "greedy overwrote earlier assignment"
                    );
                }
                sideboard.set(name, copies);
                remaining -= copies;
            }
        }
        tracing::trace!(
            archetype = %adjusted[archetype].name,
            remaining,
            "greedy archetype done"
        );
    }
    sideboard
}
