use crate::schema::{
    ArchetypeRow, CardRow, CardTable, ARCHETYPES_FILE, CARDS_FILE, CARD_NAME_COLUMN,
    MAX_COPIES_COLUMN,
};
use crate::MetaTables;
use anyhow::{bail, Context};
use serde::de::DeserializeOwned;
use sideboard_core::OptimizerConfig;
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

pub const DATA_DIR_ENV: &str = "SIDEBOARD_DATA_DIR";
const DEFAULT_DATA_DIR: &str = "data";

const ARCHETYPE_HEADERS: [&str; 5] = [
    "Deck",
    "MTGO PR",
    "Max Slots",
    "# of times fought",
    "# of match wins",
];

/// Explicit directory, else `$SIDEBOARD_DATA_DIR`, else `./data`.
pub fn resolve_data_dir(explicit: Option<&Path>) -> PathBuf {
    if let Some(path) = explicit {
        return path.to_path_buf();
    }
    if let Some(path) = std::env::var_os(DATA_DIR_ENV) {
        return PathBuf::from(path);
    }
    PathBuf::from(DEFAULT_DATA_DIR)
}

pub fn load_tables(dir: &Path) -> anyhow::Result<MetaTables> {
    let archetypes = load_archetype_rows(&dir.join(ARCHETYPES_FILE))?;
    let cards = load_card_table(&dir.join(CARDS_FILE))?;
    Ok(MetaTables { archetypes, cards })
}

pub fn save_tables(dir: &Path, tables: &MetaTables) -> anyhow::Result<()> {
    fs::create_dir_all(dir).with_context(|| format!("create {}", dir.display()))?;
    save_archetype_rows(&dir.join(ARCHETYPES_FILE), &tables.archetypes)?;
    save_card_table(&dir.join(CARDS_FILE), &tables.cards)?;
    Ok(())
}

pub fn load_archetype_rows(path: &Path) -> anyhow::Result<Vec<ArchetypeRow>> {
    let mut reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_path(path)
        .with_context(|| format!("open {}", path.display()))?;
    let mut rows = Vec::new();
    for (line, record) in reader.deserialize::<ArchetypeRow>().enumerate() {
        let row = record.with_context(|| format!("parse {} row {}", path.display(), line + 1))?;
        rows.push(row);
    }
    Ok(rows)
}

pub fn save_archetype_rows(path: &Path, rows: &[ArchetypeRow]) -> anyhow::Result<()> {
    let mut writer =
        csv::Writer::from_path(path).with_context(|| format!("write {}", path.display()))?;
    if rows.is_empty() {
        writer.write_record(ARCHETYPE_HEADERS)?;
    }
    for row in rows {
        writer
            .serialize(row)
            .with_context(|| format!("write {} row {}", path.display(), row.name))?;
    }
    writer.flush()?;
    Ok(())
}

/// Reads the effectiveness table: card name first, an optional max-copies
/// column, and one score column per deck.
pub fn load_card_table(path: &Path) -> anyhow::Result<CardTable> {
    let mut reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_path(path)
        .with_context(|| format!("open {}", path.display()))?;
    let headers = reader
        .headers()
        .with_context(|| format!("read headers of {}", path.display()))?
        .clone();
    if headers.is_empty() {
        bail!("{} has no header row", path.display());
    }
    let copies_col = headers.iter().position(|name| name == MAX_COPIES_COLUMN);
    let deck_cols: Vec<(usize, String)> = headers
        .iter()
        .enumerate()
        .skip(1)
        .filter(|(idx, _)| Some(*idx) != copies_col)
        .map(|(idx, name)| (idx, name.to_string()))
        .collect();

    let mut rows = Vec::new();
    for (line, record) in reader.records().enumerate() {
        let record = record.with_context(|| format!("parse {} row {}", path.display(), line + 1))?;
        let name = record.get(0).unwrap_or_default().to_string();
        if name.is_empty() {
            if record.iter().any(|cell| !cell.is_empty()) {
                tracing::warn!(
                    path = %path.display(),
                    row = line + 1,
                    "skipping card row without a name; it will not be written back"
                );
            }
            continue;
        }
        let max_copies = match copies_col.and_then(|idx| record.get(idx)) {
            Some(cell) => parse_count(cell)
                .with_context(|| format!("{}: card {name} {MAX_COPIES_COLUMN}", path.display()))?
                .map(|value| {
                    u32::try_from(value).with_context(|| {
                        format!("{}: card {name} {MAX_COPIES_COLUMN} {value}", path.display())
                    })
                })
                .transpose()?,
            None => None,
        };
        let mut scores = HashMap::new();
        for (idx, deck) in &deck_cols {
            let cell = record.get(*idx).unwrap_or_default();
            let score = parse_count(cell)
                .with_context(|| format!("{}: card {name} score for {deck}", path.display()))?;
            if let Some(score) = score {
                let score = u8::try_from(score)
                    .with_context(|| format!("{}: card {name} score {score}", path.display()))?;
                scores.insert(deck.clone(), score);
            }
        }
        rows.push(CardRow {
            name,
            max_copies,
            scores,
        });
    }
    tracing::debug!(
        path = %path.display(),
        cards = rows.len(),
        decks = deck_cols.len(),
        "loaded card table"
    );
    Ok(CardTable {
        decks: deck_cols.into_iter().map(|(_, name)| name).collect(),
        rows,
    })
}

pub fn save_card_table(path: &Path, table: &CardTable) -> anyhow::Result<()> {
    let mut writer =
        csv::Writer::from_path(path).with_context(|| format!("write {}", path.display()))?;
    let mut header = vec![CARD_NAME_COLUMN.to_string(), MAX_COPIES_COLUMN.to_string()];
    header.extend(table.decks.iter().cloned());
    writer.write_record(&header)?;
    for row in &table.rows {
        let mut record = vec![
            row.name.clone(),
            row.max_copies.map(|value| value.to_string()).unwrap_or_default(),
        ];
        record.extend(table.decks.iter().map(|deck| {
            row.scores
                .get(deck)
                .map(|score| score.to_string())
                .unwrap_or_default()
        }));
        writer
            .write_record(&record)
            .with_context(|| format!("write {} row {}", path.display(), row.name))?;
    }
    writer.flush()?;
    Ok(())
}

/// Blank -> `None`. Accepts `3` and spreadsheet-style `3.0`.
fn parse_count(cell: &str) -> anyhow::Result<Option<u64>> {
    let cell = cell.trim();
    if cell.is_empty() {
        return Ok(None);
    }
    if let Ok(value) = cell.parse::<u64>() {
        return Ok(Some(value));
    }
    let value: f64 = cell
        .parse()
        .with_context(|| format!("not a number: {cell:?}"))?;
    if value < 0.0 || value.fract() != 0.0 || !value.is_finite() {
        bail!("not a whole non-negative number: {cell:?}");
    }
    Ok(Some(value as u64))
}

pub fn load_optimizer_config(path: &Path) -> anyhow::Result<OptimizerConfig> {
    let config: OptimizerConfig = load_json(path)?;
    config
        .validate()
        .with_context(|| format!("validate {}", path.display()))?;
    Ok(config)
}

fn load_json<T: DeserializeOwned>(path: impl AsRef<Path>) -> anyhow::Result<T> {
    let path = path.as_ref();
    let raw = fs::read_to_string(path).with_context(|| format!("read {}", path.display()))?;
    let value = serde_json::from_str(&raw).with_context(|| format!("parse {}", path.display()))?;
    Ok(value)
}
