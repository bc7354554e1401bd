mod report;

use anyhow::{bail, Context};
use clap::{ArgAction, Parser, Subcommand};
use sideboard_core::{optimize_source, OptimizerConfig};
use sideboard_data::{load_optimizer_config, resolve_data_dir, CsvTableStore, DATA_DIR_ENV};
use std::collections::HashMap;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(name = "sideboard", about = "Recommend a sideboard from matchup data")]
struct Cli {
    /// Directory holding Matchup_Data.csv and Effectiveness_Scores.csv
    #[arg(long, global = true, env = DATA_DIR_ENV)]
    data_dir: Option<PathBuf>,

    /// More log output (-v info, -vv debug, -vvv trace); RUST_LOG overrides
    #[arg(short, long, global = true, action = ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Create empty tables if none exist
    Init,
    /// Run the optimizer on the current tables
    Optimize {
        /// Total sideboard slots
        #[arg(long)]
        budget: Option<u32>,
        /// Optimizer constants as JSON; missing fields keep their defaults
        #[arg(long)]
        config: Option<PathBuf>,
        /// Also write the full report as JSON
        #[arg(long)]
        json: Option<PathBuf>,
    },
    /// Show the matchup table
    Decks,
    /// Show the effectiveness table
    Cards,
    /// Add a card; needs a score for every deck
    AddCard {
        name: String,
        #[arg(long, default_value_t = 4)]
        max_copies: u32,
        /// DECK=SCORE, repeatable
        #[arg(long = "score", value_parser = parse_score)]
        scores: Vec<(String, u8)>,
    },
    /// Add a deck; needs a score for every card
    AddDeck {
        name: String,
        /// Predicted metagame share in [0, 1]
        #[arg(long)]
        playrate: f64,
        #[arg(long)]
        max_slots: u32,
        /// CARD=SCORE, repeatable
        #[arg(long = "score", value_parser = parse_score)]
        scores: Vec<(String, u8)>,
    },
    /// Record a match result such as 2-1
    RecordMatch { deck: String, result: String },
    RemoveDeck { name: String },
    RemoveCard { name: String },
    /// Change a deck's predicted play-rate and slot cap
    EditDeck {
        name: String,
        #[arg(long)]
        playrate: f64,
        #[arg(long)]
        max_slots: u32,
    },
    /// Change a card's copy limit or some of its scores
    EditCard {
        name: String,
        #[arg(long)]
        max_copies: Option<u32>,
        /// DECK=SCORE, repeatable
        #[arg(long = "score", value_parser = parse_score)]
        scores: Vec<(String, u8)>,
    },
}

fn parse_score(raw: &str) -> Result<(String, u8), String> {
    let (name, score) = raw
        .rsplit_once('=')
        .ok_or_else(|| format!("expected NAME=SCORE, got {raw:?}"))?;
    let name = name.trim();
    if name.is_empty() {
        return Err(format!("missing name in {raw:?}"));
    }
    let score = score
        .trim()
        .parse::<u8>()
        .map_err(|_| format!("invalid score in {raw:?}"))?;
    if score > sideboard_core::MAX_SCORE {
        return Err(format!("score {score} is above {}", sideboard_core::MAX_SCORE));
    }
    Ok((name.to_string(), score))
}

fn score_map(scores: Vec<(String, u8)>) -> anyhow::Result<HashMap<String, u8>> {
    let mut map = HashMap::with_capacity(scores.len());
    for (name, score) in scores {
        if map.insert(name.clone(), score).is_some() {
            bail!("score for {name} given twice");
        }
    }
    Ok(map)
}

fn init_tracing(verbose: u8) {
    let default = match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .try_init();
}

fn run(cli: Cli) -> anyhow::Result<()> {
    let store = CsvTableStore::new(resolve_data_dir(cli.data_dir.as_deref()));
    tracing::info!(dir = %store.dir().display(), "using data directory");
    match cli.command {
        Command::Init => {
            if store.init()? {
                println!("created empty tables in {}", store.dir().display());
            } else {
                println!("tables already exist in {}", store.dir().display());
            }
        }
        Command::Optimize {
            budget,
            config,
            json,
        } => {
            let mut settings = match config {
                Some(path) => load_optimizer_config(&path)?,
                None => OptimizerConfig::default(),
            };
            if let Some(budget) = budget {
                settings = settings.with_slot_budget(budget);
            }
            let report = optimize_source(&store, &settings)
                .with_context(|| format!("optimize {}", store.dir().display()))?;
            println!("{}", report::sideboard_text(&report, settings.slot_budget));
            if let Some(path) = json {
                report::write_json(&path, &report)?;
            }
        }
        Command::Decks => println!("{}", report::decks_text(&store.tables()?)),
        Command::Cards => println!("{}", report::cards_text(&store.tables()?)),
        Command::AddCard {
            name,
            max_copies,
            scores,
        } => {
            store.add_card(&name, max_copies, score_map(scores)?)?;
            println!("added card {name}");
        }
        Command::AddDeck {
            name,
            playrate,
            max_slots,
            scores,
        } => {
            store.add_archetype(&name, playrate, max_slots, score_map(scores)?)?;
            println!("added deck {name}");
        }
        Command::RecordMatch { deck, result } => {
            let result = store.record_match(&deck, &result)?;
            let outcome = if result.is_win() { "win" } else { "loss" };
            println!("recorded {result} ({outcome}) against {deck}");
        }
        Command::RemoveDeck { name } => {
            store.remove_archetype(&name)?;
            println!("removed deck {name}");
        }
        Command::RemoveCard { name } => {
            store.remove_card(&name)?;
            println!("removed card {name}");
        }
        Command::EditDeck {
            name,
            playrate,
            max_slots,
        } => {
            store.update_archetype(&name, playrate, max_slots)?;
            println!("updated deck {name}");
        }
        Command::EditCard {
            name,
            max_copies,
            scores,
        } => {
            store.update_card(&name, max_copies, score_map(scores)?)?;
            println!("updated card {name}");
        }
    }
    Ok(())
}

fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);
    if let Err(err) = run(cli) {
        eprintln!("error: {err:#}");
        std::process::exit(1);
    }
}
