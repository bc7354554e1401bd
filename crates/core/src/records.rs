use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Copies allowed when a card row leaves its max-copies column blank.
pub const DEFAULT_MAX_COPIES: u32 = 4;

/// Highest effectiveness score a card can carry against an archetype.
pub const MAX_SCORE: u8 = 10;

/// An opponent deck category with its match history and predicted share.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Archetype {
    pub name: String,
    #[serde(default)]
    pub times_faced: u32,
    #[serde(default)]
    pub match_wins: u32,
    pub predicted_playrate: f64,
    /// Cap on copies effective against this archetype.
    pub max_slots: u32,
}

impl Archetype {
    pub fn new(name: impl Into<String>, predicted_playrate: f64, max_slots: u32) -> Self {
        Self {
            name: name.into(),
            times_faced: 0,
            match_wins: 0,
            predicted_playrate,
            max_slots,
        }
    }

    pub fn with_record(mut self, times_faced: u32, match_wins: u32) -> Self {
        self.times_faced = times_faced;
        self.match_wins = match_wins;
        self
    }
}

/// A sideboard candidate and how well it performs against each archetype.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Card {
    pub name: String,
    #[serde(default = "default_max_copies")]
    pub max_copies: u32,
    #[serde(default)]
    pub scores: HashMap<String, u8>,
}

fn default_max_copies() -> u32 {
    DEFAULT_MAX_COPIES
}

impl Card {
    pub fn new(name: impl Into<String>, max_copies: u32) -> Self {
        Self {
            name: name.into(),
            max_copies,
            scores: HashMap::new(),
        }
    }

    pub fn with_score(mut self, archetype: impl Into<String>, score: u8) -> Self {
        self.scores.insert(archetype.into(), score);
        self
    }

    /// Effectiveness against `archetype`; a missing entry means no particular value.
    pub fn score(&self, archetype: &str) -> u8 {
        self.scores.get(archetype).copied().unwrap_or(0)
    }
}
