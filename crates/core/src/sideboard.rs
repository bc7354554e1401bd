use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Card name -> assigned copies. Zero counts are never stored.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Sideboard {
    slots: BTreeMap<String, u32>,
}

impl Sideboard {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn total(&self) -> u32 {
        self.slots.values().sum()
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    pub fn copies(&self, card: &str) -> u32 {
        self.slots.get(card).copied().unwrap_or(0)
    }

    pub fn contains(&self, card: &str) -> bool {
        self.slots.contains_key(card)
    }

    /// Overwrites the card's count; zero removes it.
    pub fn set(&mut self, card: &str, copies: u32) {
        if copies == 0 {
            self.slots.remove(card);
        } else {
            self.slots.insert(card.to_string(), copies);
        }
    }

    pub fn add_copy(&mut self, card: &str) {
        *self.slots.entry(card.to_string()).or_insert(0) += 1;
    }

    /// Takes one copy away, dropping the card at zero. Returns false if absent.
    pub fn remove_copy(&mut self, card: &str) -> bool {
        let Some(copies) = self.slots.get_mut(card) else {
            return false;
        };
        *copies -= 1;
        if *copies == 0 {
            self.slots.remove(card);
        }
        true
    }

    /// Removes every copy of the card, returning how many there were.
    pub fn remove_card(&mut self, card: &str) -> u32 {
        self.slots.remove(card).unwrap_or(0)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, u32)> + '_ {
        self.slots.iter().map(|(card, copies)| (card.as_str(), *copies))
    }

    /// Sorted (card, copies) pairs; equal sideboards give equal keys.
    pub fn canonical(&self) -> Vec<(String, u32)> {
        self.slots
            .iter()
            .map(|(card, copies)| (card.clone(), *copies))
            .collect()
    }

    /// Entries ordered by copies descending, then name.
    pub fn ranked(&self) -> Vec<(&str, u32)> {
        let mut entries: Vec<_> = self.iter().collect();
        entries.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(b.0)));
        entries
    }
}

impl<S: Into<String>> FromIterator<(S, u32)> for Sideboard {
    fn from_iter<I: IntoIterator<Item = (S, u32)>>(iter: I) -> Self {
        let mut sideboard = Sideboard::new();
        for (card, copies) in iter {
            let card = card.into();
            sideboard.set(&card, copies);
        }
        sideboard
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_counts_are_not_stored() {
        let mut sideboard = Sideboard::new();
        sideboard.set("Pyroblast", 2);
        sideboard.set("Pyroblast", 0);
        assert!(sideboard.is_empty());

        sideboard.add_copy("Pyroblast");
        assert!(sideboard.remove_copy("Pyroblast"));
        assert!(!sideboard.contains("Pyroblast"));
        assert!(!sideboard.remove_copy("Pyroblast"));
    }

    #[test]
    fn canonical_form_ignores_insertion_order() {
        let a: Sideboard = [("B", 1), ("A", 2)].into_iter().collect();
        let b: Sideboard = [("A", 2), ("B", 1)].into_iter().collect();
        assert_eq!(a.canonical(), b.canonical());
        assert_eq!(a.canonical()[0], ("A".to_string(), 2));
        assert_eq!(a.total(), 3);
    }

    #[test]
    fn ranked_orders_by_copies_then_name() {
        let sideboard: Sideboard = [("C", 1), ("B", 3), ("A", 3)].into_iter().collect();
        assert_eq!(sideboard.ranked(), vec![("A", 3), ("B", 3), ("C", 1)]);
    }
}
