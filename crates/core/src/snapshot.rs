//! Read-only view of the archetype and card tables for a single run.
//!
//! Everything the optimizer needs is validated and indexed up front so the
//! allocation loops never deal with missing keys or malformed rows.

use crate::{Archetype, Card, MAX_SCORE};
use std::collections::{HashMap, HashSet};
use thiserror::Error;

#[derive(Debug, Error, PartialEq)]
pub enum SnapshotError {
    #[error("archetype name is empty")]
    EmptyArchetypeName,
    #[error("card name is empty")]
    EmptyCardName,
    #[error("duplicate archetype {0}")]
    DuplicateArchetype(String),
    #[error("duplicate card {0}")]
    DuplicateCard(String),
    #[error("archetype {name}: {wins} match wins exceed {faced} times faced")]
    WinsExceedFaced { name: String, wins: u32, faced: u32 },
    #[error("archetype {name}: predicted play-rate {value} is outside [0, 1]")]
    PlayrateOutOfRange { name: String, value: f64 },
    #[error("card {0}: max copies must be positive")]
    ZeroMaxCopies(String),
    #[error("card {card}: score {score} against {archetype} is above 10")]
    ScoreOutOfRange {
        card: String,
        archetype: String,
        score: u8,
    },
}

#[derive(Debug, Clone)]
pub struct MetaSnapshot {
    archetypes: Vec<Archetype>,
    cards: Vec<Card>,
    card_index: HashMap<String, usize>,
    /// `scores[card][archetype]`, zero where the card has no entry.
    scores: Vec<Vec<u8>>,
}

impl MetaSnapshot {
    pub fn new(archetypes: Vec<Archetype>, mut cards: Vec<Card>) -> Result<Self, SnapshotError> {
        let mut seen = HashSet::new();
        for archetype in &archetypes {
            if archetype.name.trim().is_empty() {
                return Err(SnapshotError::EmptyArchetypeName);
            }
            if !seen.insert(archetype.name.as_str()) {
                return Err(SnapshotError::DuplicateArchetype(archetype.name.clone()));
            }
            if archetype.match_wins > archetype.times_faced {
                return Err(SnapshotError::WinsExceedFaced {
                    name: archetype.name.clone(),
                    wins: archetype.match_wins,
                    faced: archetype.times_faced,
                });
            }
            let value = archetype.predicted_playrate;
            if !value.is_finite() || !(0.0..=1.0).contains(&value) {
                return Err(SnapshotError::PlayrateOutOfRange {
                    name: archetype.name.clone(),
                    value,
                });
            }
        }

        let mut card_index = HashMap::with_capacity(cards.len());
        for (idx, card) in cards.iter_mut().enumerate() {
            if card.name.trim().is_empty() {
                return Err(SnapshotError::EmptyCardName);
            }
            if card_index.insert(card.name.clone(), idx).is_some() {
                return Err(SnapshotError::DuplicateCard(card.name.clone()));
            }
            if card.max_copies == 0 {
                return Err(SnapshotError::ZeroMaxCopies(card.name.clone()));
            }
            if let Some((archetype, score)) =
                card.scores.iter().find(|(_, score)| **score > MAX_SCORE)
            {
                return Err(SnapshotError::ScoreOutOfRange {
                    card: card.name.clone(),
                    archetype: archetype.clone(),
                    score: *score,
                });
            }
            let before = card.scores.len();
            card.scores.retain(|archetype, _| seen.contains(archetype.as_str()));
            if card.scores.len() != before {
                tracing::warn!(
                    card = %card.name,
                    dropped = before - card.scores.len(),
                    "ignoring scores for unknown archetypes"
                );
            }
        }

        let scores = cards
            .iter()
            .map(|card| {
                archetypes
                    .iter()
                    .map(|archetype| card.score(&archetype.name))
                    .collect()
            })
            .collect();

        Ok(Self {
            archetypes,
            cards,
            card_index,
            scores,
        })
    }

    pub fn archetypes(&self) -> &[Archetype] {
        &self.archetypes
    }

    pub fn cards(&self) -> &[Card] {
        &self.cards
    }

    pub fn card(&self, idx: usize) -> &Card {
        &self.cards[idx]
    }

    pub fn card_index(&self, name: &str) -> Option<usize> {
        self.card_index.get(name).copied()
    }

    pub fn score(&self, card: usize, archetype: usize) -> u8 {
        self.scores[card][archetype]
    }

    /// Sum of the card's scores across every archetype in the table.
    pub fn total_score(&self, card: usize) -> i64 {
        self.scores[card].iter().map(|score| i64::from(*score)).sum()
    }

    /// Number of archetypes the card scores strictly above `threshold` against.
    pub fn relevant_matchups(&self, card: usize, threshold: u8) -> usize {
        self.scores[card]
            .iter()
            .filter(|score| **score > threshold)
            .count()
    }

    pub fn total_games(&self) -> u64 {
        self.archetypes
            .iter()
            .map(|archetype| u64::from(archetype.times_faced))
            .sum()
    }
}
