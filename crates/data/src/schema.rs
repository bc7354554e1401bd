use serde::{Deserialize, Serialize};
use sideboard_core::{Archetype, Card, DEFAULT_MAX_COPIES};
use std::collections::HashMap;

pub const ARCHETYPES_FILE: &str = "Matchup_Data.csv";
pub const CARDS_FILE: &str = "Effectiveness_Scores.csv";

pub const CARD_NAME_COLUMN: &str = "Card Name";
pub const MAX_COPIES_COLUMN: &str = "Max Copies";

/// One row of the matchup table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ArchetypeRow {
    #[serde(rename = "Deck")]
    pub name: String,
    #[serde(rename = "MTGO PR")]
    pub predicted_playrate: f64,
    #[serde(rename = "Max Slots")]
    pub max_slots: u32,
    #[serde(rename = "# of times fought", default)]
    pub times_faced: u32,
    #[serde(rename = "# of match wins", default)]
    pub match_wins: u32,
}

impl ArchetypeRow {
    pub fn to_record(&self) -> Archetype {
        Archetype {
            name: self.name.clone(),
            times_faced: self.times_faced,
            match_wins: self.match_wins,
            predicted_playrate: self.predicted_playrate,
            max_slots: self.max_slots,
        }
    }
}

/// One row of the effectiveness table. Blank cells stay `None` / absent.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CardRow {
    pub name: String,
    pub max_copies: Option<u32>,
    pub scores: HashMap<String, u8>,
}

impl CardRow {
    pub fn to_record(&self) -> Card {
        Card {
            name: self.name.clone(),
            max_copies: self.max_copies.unwrap_or(DEFAULT_MAX_COPIES),
            scores: self.scores.clone(),
        }
    }
}

/// The effectiveness table with its deck columns in file order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CardTable {
    pub decks: Vec<String>,
    pub rows: Vec<CardRow>,
}
