use sideboard_core::{optimize_source, MetaSnapshot, MetaSource, OptimizeError, OptimizerConfig};
use sideboard_data::{
    load_card_table, load_optimizer_config, CsvTableStore, StoreError, ARCHETYPES_FILE, CARDS_FILE,
};
use std::collections::HashMap;
use std::fs;
use tempfile::TempDir;

fn scores(pairs: &[(&str, u8)]) -> HashMap<String, u8> {
    pairs
        .iter()
        .map(|(name, score)| (name.to_string(), *score))
        .collect()
}

fn write_fixture(dir: &TempDir) {
    fs::write(
        dir.path().join(ARCHETYPES_FILE),
        "Deck,MTGO PR,Max Slots,# of times fought,# of match wins\n\
         Burn,0.12,5,8,3\n\
         Tron,0.08,4,4,3\n\
         Storm,0.05,3,0,0\n",
    )
    .expect("write matchups");
    fs::write(
        dir.path().join(CARDS_FILE),
        "Card Name,Max Copies,Burn,Tron,Storm\n\
         Leyline of Sanctity,4,9,1,8\n\
         Stony Silence,,2,8,7\n\
         Flusterstorm,4.0,1,6,10\n\
         Unscored Tech,2,,,\n",
    )
    .expect("write scores");
}

#[test]
fn reads_spreadsheet_exports() {
    let dir = TempDir::new().expect("tempdir");
    write_fixture(&dir);
    let store = CsvTableStore::new(dir.path());

    let archetypes = store.load_archetypes().expect("archetypes");
    assert_eq!(archetypes.len(), 3);
    assert_eq!(archetypes[0].name, "Burn");
    assert_eq!((archetypes[1].times_faced, archetypes[1].match_wins), (4, 3));

    let cards = store.load_cards().expect("cards");
    assert_eq!(cards[1].max_copies, 4, "blank max copies defaults to 4");
    assert_eq!(cards[2].max_copies, 4);
    assert_eq!(cards[0].score("Storm"), 8);
    assert!(cards[3].scores.is_empty());
    assert_eq!(cards[3].score("Burn"), 0);
}

#[test]
fn optimizes_straight_from_files() {
    let dir = TempDir::new().expect("tempdir");
    write_fixture(&dir);
    let store = CsvTableStore::new(dir.path());
    let config = OptimizerConfig::default();
    let report = optimize_source(&store, &config).expect("optimize");
    assert!(report.allocation.total() <= config.slot_budget);
    assert!(report.allocation.copies("Unscored Tech") <= 2);
    assert_eq!(report.adjusted.len(), 3);
}

#[test]
fn missing_files_surface_as_source_errors() {
    let dir = TempDir::new().expect("tempdir");
    let store = CsvTableStore::new(dir.path().join("absent"));
    let err = optimize_source(&store, &OptimizerConfig::default()).unwrap_err();
    assert!(matches!(err, OptimizeError::Source(_)));
}

#[test]
fn edits_round_trip_through_the_files() {
    let dir = TempDir::new().expect("tempdir");
    let store = CsvTableStore::new(dir.path());
    assert!(store.init().expect("init"));
    assert!(!store.init().expect("second init"));

    store
        .add_archetype("Burn", 0.2, 5, HashMap::new())
        .expect("burn");
    store
        .add_archetype("Tron", 0.1, 4, HashMap::new())
        .expect("tron");
    store
        .add_card("Leyline", 4, scores(&[("Burn", 9), ("Tron", 1)]))
        .expect("leyline");
    store
        .add_archetype("Storm", 0.05, 3, scores(&[("Leyline", 8)]))
        .expect("storm");

    let result = store.record_match("Burn", "2-1").expect("match");
    assert!(result.is_win());
    store.record_match("Burn", "1-2").expect("match");

    let tables = store.tables().expect("tables");
    let burn = tables.archetype("Burn").expect("burn");
    assert_eq!((burn.times_faced, burn.match_wins), (2, 1));
    assert_eq!(tables.cards.decks, vec!["Burn", "Tron", "Storm"]);
    assert_eq!(tables.card("Leyline").expect("card").scores["Storm"], 8);

    store.remove_archetype("Tron").expect("remove");
    let table = load_card_table(&dir.path().join(CARDS_FILE)).expect("cards");
    assert_eq!(table.decks, vec!["Burn", "Storm"]);

    store
        .update_card("Leyline", Some(3), scores(&[("Storm", 5)]))
        .expect("update");
    store.update_archetype("Storm", 0.07, 2).expect("update");
    let tables = store.tables().expect("tables");
    assert_eq!(tables.card("Leyline").expect("card").max_copies, Some(3));
    assert_eq!(tables.archetype("Storm").expect("storm").max_slots, 2);

    store.remove_card("Leyline").expect("remove");
    assert!(store.tables().expect("tables").cards.rows.is_empty());
}

#[test]
fn rejected_edits_leave_files_alone() {
    let dir = TempDir::new().expect("tempdir");
    write_fixture(&dir);
    let store = CsvTableStore::new(dir.path());
    let before = fs::read_to_string(dir.path().join(ARCHETYPES_FILE)).expect("read");

    let err = store.record_match("Burn", "2:1").unwrap_err();
    assert!(matches!(err, StoreError::MatchResult(_)));
    let err = store.record_match("Elves", "2-0").unwrap_err();
    assert!(matches!(err, StoreError::UnknownArchetype(_)));
    let err = store.update_archetype("Burn", 2.0, 5).unwrap_err();
    assert!(matches!(err, StoreError::InvalidValue(_)));

    let after = fs::read_to_string(dir.path().join(ARCHETYPES_FILE)).expect("read");
    assert_eq!(before, after);
}

#[test]
fn config_files_fill_in_defaults() {
    let dir = TempDir::new().expect("tempdir");
    let path = dir.path().join("optimizer.json");
    fs::write(&path, r#"{ "playrate_prior_weight": 5.0, "max_iterations": 20 }"#)
        .expect("write");
    let config = load_optimizer_config(&path).expect("config");
    assert_eq!(config.playrate_prior_weight, 5.0);
    assert_eq!(config.max_iterations, 20);
    assert_eq!(config.slot_budget, 15);

    fs::write(&path, r#"{ "slot_budget": 0 }"#).expect("write");
    assert!(load_optimizer_config(&path).is_err());
}

#[test]
fn init_keeps_an_existing_matchup_table() {
    let dir = TempDir::new().expect("tempdir");
    let matchups = "Deck,MTGO PR,Max Slots,# of times fought,# of match wins\n\
                    Burn,0.2,5,8,3\n";
    fs::write(dir.path().join(ARCHETYPES_FILE), matchups).expect("write matchups");
    let store = CsvTableStore::new(dir.path());

    assert!(store.init().expect("init"));
    let after = fs::read_to_string(dir.path().join(ARCHETYPES_FILE)).expect("read");
    assert_eq!(after, matchups);

    let tables = store.tables().expect("tables");
    let burn = tables.archetype("Burn").expect("burn");
    assert_eq!((burn.times_faced, burn.match_wins), (8, 3));
    assert_eq!(tables.cards.decks, vec!["Burn"]);
    assert!(tables.cards.rows.is_empty());

    assert!(!store.init().expect("second init"));
}

#[test]
fn init_refuses_a_lone_effectiveness_table() {
    let dir = TempDir::new().expect("tempdir");
    let scores_csv = "Card Name,Max Copies,Burn\nLeyline,4,9\n";
    fs::write(dir.path().join(CARDS_FILE), scores_csv).expect("write scores");
    let store = CsvTableStore::new(dir.path());

    let err = store.init().unwrap_err();
    assert!(matches!(err, StoreError::MissingMatchups(_)));
    assert!(!dir.path().join(ARCHETYPES_FILE).exists());
    let after = fs::read_to_string(dir.path().join(CARDS_FILE)).expect("read");
    assert_eq!(after, scores_csv);
}

#[test]
fn snapshot_reads_both_tables_together() {
    let dir = TempDir::new().expect("tempdir");
    write_fixture(&dir);
    let store = CsvTableStore::new(dir.path());

    let snapshot = store.load_snapshot().expect("snapshot");
    let separate = MetaSnapshot::new(
        store.load_archetypes().expect("archetypes"),
        store.load_cards().expect("cards"),
    )
    .expect("snapshot");
    assert_eq!(snapshot.archetypes(), separate.archetypes());
    assert_eq!(snapshot.cards(), separate.cards());

    let missing = CsvTableStore::new(dir.path().join("absent"));
    assert!(matches!(
        missing.load_snapshot().unwrap_err(),
        OptimizeError::Source(_)
    ));
}
