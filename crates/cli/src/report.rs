use anyhow::Context;
use sideboard_core::{OptimizeReport, Termination};
use sideboard_data::MetaTables;
use std::fs;
use std::path::Path;

pub fn sideboard_text(report: &OptimizeReport, budget: u32) -> String {
    let mut lines = vec![format!(
        "sideboard: {}/{} slots",
        report.allocation.total(),
        budget
    )];
    if report.allocation.is_empty() {
        lines.push("  (empty)".to_string());
    }
    for (card, copies) in report.allocation.ranked() {
        lines.push(format!("  {copies} x {card}"));
    }
    lines.push(String::new());
    lines.push("archetypes (priority order):".to_string());
    let mut adjusted: Vec<_> = report.adjusted.iter().collect();
    adjusted.sort_by(|a, b| {
        b.priority
            .partial_cmp(&a.priority)
            .unwrap_or(std::cmp::Ordering::Equal)
    });
    for row in adjusted {
        lines.push(format!(
            "  {:<24} play {:>6.2}%  win {:>6.2}%  slots {:>2}  priority {:+.4}",
            row.name,
            row.adjusted_playrate * 100.0,
            row.adjusted_winrate * 100.0,
            row.max_slots,
            row.priority
        ));
    }
    lines.push(String::new());
    lines.push(format!(
        "refinement: {} after {} iteration(s); greedy start {} copies",
        termination_label(report.refinement.termination),
        report.refinement.iterations,
        report.greedy.total()
    ));
    lines.join("\n")
}

fn termination_label(termination: Termination) -> &'static str {
    match termination {
        Termination::FixedPoint => "settled",
        Termination::Cycle => "cycle detected",
        Termination::IterationCap => "iteration cap reached",
    }
}

pub fn decks_text(tables: &MetaTables) -> String {
    let mut lines = vec![format!(
        "{:<24} {:>8} {:>6} {:>7} {:>5}",
        "deck", "mtgo pr", "slots", "fought", "wins"
    )];
    if tables.archetypes.is_empty() {
        lines.push("  (none)".to_string());
    }
    for row in &tables.archetypes {
        lines.push(format!(
            "{:<24} {:>8.3} {:>6} {:>7} {:>5}",
            row.name, row.predicted_playrate, row.max_slots, row.times_faced, row.match_wins
        ));
    }
    lines.join("\n")
}

pub fn cards_text(tables: &MetaTables) -> String {
    let mut header = format!("{:<24} {:>6}", "card", "copies");
    for deck in &tables.cards.decks {
        header.push_str(&format!(" {deck:>10.10}"));
    }
    let mut lines = vec![header];
    if tables.cards.rows.is_empty() {
        lines.push("  (none)".to_string());
    }
    for row in &tables.cards.rows {
        let copies = row
            .max_copies
            .map(|value| value.to_string())
            .unwrap_or_else(|| "-".to_string());
        let mut line = format!("{:<24} {:>6}", row.name, copies);
        for deck in &tables.cards.decks {
            let score = row
                .scores
                .get(deck)
                .map(|score| score.to_string())
                .unwrap_or_else(|| "-".to_string());
            line.push_str(&format!(" {score:>10}"));
        }
        lines.push(line);
    }
    lines.join("\n")
}

pub fn write_json(path: &Path, report: &OptimizeReport) -> anyhow::Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).with_context(|| format!("create {}", parent.display()))?;
    }
    let body = serde_json::to_string_pretty(report)?;
    fs::write(path, body).with_context(|| format!("write {}", path.display()))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use sideboard_core::{optimize, Archetype, Card, MetaSnapshot, OptimizerConfig};

    fn report() -> OptimizeReport {
        let snapshot = MetaSnapshot::new(
            vec![
                Archetype::new("Burn", 0.3, 6).with_record(6, 2),
                Archetype::new("Tron", 0.2, 6).with_record(3, 2),
                Archetype::new("Storm", 0.1, 6).with_record(1, 1),
            ],
            vec![Card::new("Leyline", 4)
                .with_score("Burn", 9)
                .with_score("Tron", 6)
                .with_score("Storm", 7)],
        )
        .expect("snapshot");
        optimize(&snapshot, &OptimizerConfig::default()).expect("optimize")
    }

    #[test]
    fn text_report_lists_cards_and_archetypes() {
        let text = sideboard_text(&report(), 15);
        assert!(text.starts_with("sideboard: 4/15 slots"));
        assert!(text.contains("4 x Leyline"));
        let burn = text.find("Burn").expect("burn row");
        let storm = text.find("Storm").expect("storm row");
        assert!(burn < storm, "higher priority archetype listed first");
    }

    #[test]
    fn json_report_is_written_with_parent_dirs() {
        let dir = tempfile::TempDir::new().expect("tempdir");
        let path = dir.path().join("nested").join("report.json");
        write_json(&path, &report()).expect("write");
        let body = std::fs::read_to_string(&path).expect("read");
        let value: serde_json::Value = serde_json::from_str(&body).expect("json");
        assert_eq!(value["allocation"]["Leyline"], 4);
        assert_eq!(value["refinement"]["termination"], "FixedPoint");
    }
}
