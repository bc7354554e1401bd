use crate::{
    load_archetype_rows, load_tables, save_card_table, save_tables, CardTable, MatchResult,
    MetaTables, StoreError, ARCHETYPES_FILE, CARDS_FILE,
};
use sideboard_core::{Archetype, Card, MetaSnapshot, MetaSource, OptimizeError};
use std::collections::HashMap;
use std::path::{Path, PathBuf};

/// Archetype and card tables kept as two CSV files in one directory.
///
/// Every operation reads the files fresh and edits write them back whole,
/// so nothing is cached between calls.
#[derive(Debug, Clone)]
pub struct CsvTableStore {
    dir: PathBuf,
}

impl CsvTableStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Creates whichever table file is missing and never touches an existing one.
    ///
    /// A missing effectiveness table gets one column per recorded deck. A
    /// missing matchup table next to an existing effectiveness table is an
    /// error. Returns whether anything was written.
    pub fn init(&self) -> Result<bool, StoreError> {
        let archetypes_path = self.dir.join(ARCHETYPES_FILE);
        let cards_path = self.dir.join(CARDS_FILE);
        let has_archetypes = archetypes_path.is_file();
        let has_cards = cards_path.is_file();
        match (has_archetypes, has_cards) {
            (true, true) => Ok(false),
            (false, true) => Err(StoreError::MissingMatchups(
                archetypes_path.display().to_string(),
            )),
            (false, false) => {
                save_tables(&self.dir, &MetaTables::default())?;
                tracing::info!(dir = %self.dir.display(), "initialized empty tables");
                Ok(true)
            }
            (true, false) => {
                let archetypes = load_archetype_rows(&archetypes_path)?;
                let table = CardTable {
                    decks: archetypes.iter().map(|row| row.name.clone()).collect(),
                    rows: Vec::new(),
                };
                save_card_table(&cards_path, &table)?;
                tracing::info!(
                    path = %cards_path.display(),
                    decks = table.decks.len(),
                    "created missing effectiveness table"
                );
                Ok(true)
            }
        }
    }

    pub fn tables(&self) -> Result<MetaTables, StoreError> {
        Ok(load_tables(&self.dir)?)
    }

    pub fn add_card(
        &self,
        name: &str,
        max_copies: u32,
        scores: HashMap<String, u8>,
    ) -> Result<(), StoreError> {
        self.edit(|tables| tables.add_card(name, max_copies, scores))
    }

    pub fn add_archetype(
        &self,
        name: &str,
        predicted_playrate: f64,
        max_slots: u32,
        scores_by_card: HashMap<String, u8>,
    ) -> Result<(), StoreError> {
        self.edit(|tables| tables.add_archetype(name, predicted_playrate, max_slots, scores_by_card))
    }

    /// Parses a `W-L` game score and records it against `deck`.
    pub fn record_match(&self, deck: &str, result: &str) -> Result<MatchResult, StoreError> {
        let result: MatchResult = result.parse()?;
        self.edit(|tables| tables.record_match(deck, result))?;
        Ok(result)
    }

    pub fn remove_archetype(&self, name: &str) -> Result<(), StoreError> {
        self.edit(|tables| tables.remove_archetype(name))
    }

    pub fn remove_card(&self, name: &str) -> Result<(), StoreError> {
        self.edit(|tables| tables.remove_card(name))
    }

    pub fn update_archetype(
        &self,
        name: &str,
        predicted_playrate: f64,
        max_slots: u32,
    ) -> Result<(), StoreError> {
        self.edit(|tables| tables.update_archetype(name, predicted_playrate, max_slots))
    }

    pub fn update_card(
        &self,
        name: &str,
        max_copies: Option<u32>,
        scores: HashMap<String, u8>,
    ) -> Result<(), StoreError> {
        self.edit(|tables| tables.update_card(name, max_copies, scores))
    }

    fn edit<F>(&self, apply: F) -> Result<(), StoreError>
    where
        F: FnOnce(&mut MetaTables) -> Result<(), StoreError>,
    {
        let mut tables = self.tables()?;
        apply(&mut tables)?;
        save_tables(&self.dir, &tables)?;
        Ok(())
    }
}

impl CsvTableStore {
    fn source_tables(&self) -> Result<MetaTables, OptimizeError> {
        load_tables(&self.dir).map_err(|err| OptimizeError::Source(format!("{err:#}")))
    }
}

impl MetaSource for CsvTableStore {
    fn load_archetypes(&self) -> Result<Vec<Archetype>, OptimizeError> {
        Ok(self.source_tables()?.archetype_records())
    }

    fn load_cards(&self) -> Result<Vec<Card>, OptimizeError> {
        Ok(self.source_tables()?.card_records())
    }

    /// Reads both files once so the two tables come from the same state.
    fn load_snapshot(&self) -> Result<MetaSnapshot, OptimizeError> {
        let tables = self.source_tables()?;
        Ok(MetaSnapshot::new(
            tables.archetype_records(),
            tables.card_records(),
        )?)
    }
}
