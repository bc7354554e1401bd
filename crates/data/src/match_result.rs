use std::fmt;
use std::str::FromStr;
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum MatchResultError {
    #[error("invalid match result {0:?}: expected games won and lost as 'W-L'")]
    Format(String),
}

/// Game score of a best-of match, e.g. `2-1`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MatchResult {
    pub games_won: u32,
    pub games_lost: u32,
}

impl MatchResult {
    pub fn is_win(&self) -> bool {
        self.games_won > self.games_lost
    }
}

impl FromStr for MatchResult {
    type Err = MatchResultError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let invalid = || MatchResultError::Format(value.to_string());
        let (won, lost) = value.trim().split_once('-').ok_or_else(invalid)?;
        let games_won = won.trim().parse::<u32>().map_err(|_| invalid())?;
        let games_lost = lost.trim().parse::<u32>().map_err(|_| invalid())?;
        Ok(Self {
            games_won,
            games_lost,
        })
    }
}

impl fmt::Display for MatchResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.games_won, self.games_lost)
    }
}
