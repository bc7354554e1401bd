//! In-memory copy of both tables and the edits the store supports.
//!
//! Every edit is checked in full before anything is changed, so a rejected
//! edit leaves the tables untouched.

use crate::{ArchetypeRow, CardRow, CardTable, MatchResult, MatchResultError};
use serde::{Deserialize, Serialize};
use sideboard_core::{Archetype, Card, MAX_SCORE};
use std::collections::HashMap;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("archetype {0} not found")]
    UnknownArchetype(String),
    #[error("card {0} not found")]
    UnknownCard(String),
    #[error("archetype {0} already exists")]
    DuplicateArchetype(String),
    #[error("card {0} already exists")]
    DuplicateCard(String),
    #[error("missing score for {0}")]
    MissingScore(String),
    #[error("invalid value: {0}")]
    InvalidValue(String),
    #[error("{0} is missing but the effectiveness table exists; restore it before editing")]
    MissingMatchups(String),
    #[error(transparent)]
    MatchResult(#[from] MatchResultError),
    #[error(transparent)]
    Io(#[from] anyhow::Error),
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MetaTables {
    pub archetypes: Vec<ArchetypeRow>,
    pub cards: CardTable,
}

impl MetaTables {
    pub fn archetype_records(&self) -> Vec<Archetype> {
        self.archetypes.iter().map(ArchetypeRow::to_record).collect()
    }

    pub fn card_records(&self) -> Vec<Card> {
        self.cards.rows.iter().map(CardRow::to_record).collect()
    }

    pub fn archetype(&self, name: &str) -> Option<&ArchetypeRow> {
        self.archetypes.iter().find(|row| row.name == name)
    }

    pub fn card(&self, name: &str) -> Option<&CardRow> {
        self.cards.rows.iter().find(|row| row.name == name)
    }

    /// Adds a card; it needs a score against every archetype in the table.
    pub fn add_card(
        &mut self,
        name: &str,
        max_copies: u32,
        scores: HashMap<String, u8>,
    ) -> Result<(), StoreError> {
        let name = checked_name(name)?;
        if self.card(&name).is_some() {
            return Err(StoreError::DuplicateCard(name));
        }
        check_max_copies(max_copies)?;
        self.check_scores(&scores)?;
        if let Some(missing) = self
            .archetypes
            .iter()
            .find(|row| !scores.contains_key(&row.name))
        {
            return Err(StoreError::MissingScore(missing.name.clone()));
        }
        let decks: Vec<String> = self.archetypes.iter().map(|row| row.name.clone()).collect();
        for deck in &decks {
            self.ensure_deck_column(deck);
        }
        tracing::debug!(card = %name, max_copies, "adding card");
        self.cards.rows.push(CardRow {
            name,
            max_copies: Some(max_copies),
            scores,
        });
        Ok(())
    }

    /// Adds an archetype with no recorded fights and a score column filled
    /// from `scores_by_card`, which must cover every card.
    pub fn add_archetype(
        &mut self,
        name: &str,
        predicted_playrate: f64,
        max_slots: u32,
        scores_by_card: HashMap<String, u8>,
    ) -> Result<(), StoreError> {
        let name = checked_name(name)?;
        if self.archetype(&name).is_some() {
            return Err(StoreError::DuplicateArchetype(name));
        }
        check_playrate(predicted_playrate)?;
        if let Some(card) = scores_by_card.keys().find(|card| self.card(card).is_none()) {
            return Err(StoreError::UnknownCard(card.clone()));
        }
        if let Some(missing) = self
            .cards
            .rows
            .iter()
            .find(|row| !scores_by_card.contains_key(&row.name))
        {
            return Err(StoreError::MissingScore(missing.name.clone()));
        }
        check_score_range(scores_by_card.values())?;

        tracing::debug!(archetype = %name, predicted_playrate, max_slots, "adding archetype");
        self.archetypes.push(ArchetypeRow {
            name: name.clone(),
            predicted_playrate,
            max_slots,
            times_faced: 0,
            match_wins: 0,
        });
        self.ensure_deck_column(&name);
        for row in &mut self.cards.rows {
            if let Some(score) = scores_by_card.get(&row.name) {
                row.scores.insert(name.clone(), *score);
            }
        }
        Ok(())
    }

    /// Counts one more fight against `deck`, and a win if more games were won than lost.
    pub fn record_match(&mut self, deck: &str, result: MatchResult) -> Result<(), StoreError> {
        let row = self
            .archetypes
            .iter_mut()
            .find(|row| row.name == deck)
            .ok_or_else(|| StoreError::UnknownArchetype(deck.to_string()))?;
        row.times_faced += 1;
        if result.is_win() {
            row.match_wins += 1;
        }
        tracing::debug!(
            archetype = %deck,
            %result,
            times_faced = row.times_faced,
            match_wins = row.match_wins,
            "recorded match"
        );
        Ok(())
    }

    pub fn remove_archetype(&mut self, name: &str) -> Result<(), StoreError> {
        let before = self.archetypes.len();
        self.archetypes.retain(|row| row.name != name);
        if self.archetypes.len() == before {
            return Err(StoreError::UnknownArchetype(name.to_string()));
        }
        self.cards.decks.retain(|deck| deck != name);
        for row in &mut self.cards.rows {
            row.scores.remove(name);
        }
        Ok(())
    }

    pub fn remove_card(&mut self, name: &str) -> Result<(), StoreError> {
        let before = self.cards.rows.len();
        self.cards.rows.retain(|row| row.name != name);
        if self.cards.rows.len() == before {
            return Err(StoreError::UnknownCard(name.to_string()));
        }
        Ok(())
    }

    pub fn update_archetype(
        &mut self,
        name: &str,
        predicted_playrate: f64,
        max_slots: u32,
    ) -> Result<(), StoreError> {
        check_playrate(predicted_playrate)?;
        let row = self
            .archetypes
            .iter_mut()
            .find(|row| row.name == name)
            .ok_or_else(|| StoreError::UnknownArchetype(name.to_string()))?;
        row.predicted_playrate = predicted_playrate;
        row.max_slots = max_slots;
        Ok(())
    }

    /// Updates the card's copy limit and any scores given; other scores keep their values.
    pub fn update_card(
        &mut self,
        name: &str,
        max_copies: Option<u32>,
        scores: HashMap<String, u8>,
    ) -> Result<(), StoreError> {
        if self.card(name).is_none() {
            return Err(StoreError::UnknownCard(name.to_string()));
        }
        if let Some(max_copies) = max_copies {
            check_max_copies(max_copies)?;
        }
        self.check_scores(&scores)?;
        for deck in scores.keys() {
            self.ensure_deck_column(deck);
        }
        if let Some(row) = self.cards.rows.iter_mut().find(|row| row.name == name) {
            if max_copies.is_some() {
                row.max_copies = max_copies;
            }
            row.scores.extend(scores);
        }
        Ok(())
    }

    fn check_scores(&self, scores: &HashMap<String, u8>) -> Result<(), StoreError> {
        if let Some(deck) = scores.keys().find(|deck| self.archetype(deck).is_none()) {
            return Err(StoreError::UnknownArchetype(deck.clone()));
        }
        check_score_range(scores.values())
    }

    fn ensure_deck_column(&mut self, deck: &str) {
        if !self.cards.decks.iter().any(|column| column == deck) {
            self.cards.decks.push(deck.to_string());
        }
    }
}

fn checked_name(name: &str) -> Result<String, StoreError> {
    let name = name.trim();
    if name.is_empty() {
        return Err(StoreError::InvalidValue("name must not be empty".to_string()));
    }
    Ok(name.to_string())
}

fn check_max_copies(max_copies: u32) -> Result<(), StoreError> {
    if max_copies == 0 {
        return Err(StoreError::InvalidValue(
            "max copies must be positive".to_string(),
        ));
    }
    Ok(())
}

fn check_playrate(value: f64) -> Result<(), StoreError> {
    if !value.is_finite() || !(0.0..=1.0).contains(&value) {
        return Err(StoreError::InvalidValue(format!(
            "predicted play-rate {value} is outside [0, 1]"
        )));
    }
    Ok(())
}

fn check_score_range<'a>(scores: impl IntoIterator<Item = &'a u8>) -> Result<(), StoreError> {
    match scores.into_iter().find(|score| **score > MAX_SCORE) {
        Some(score) => Err(StoreError::InvalidValue(format!(
            "score {score} is above {MAX_SCORE}"
        ))),
        None => Ok(()),
    }
}
