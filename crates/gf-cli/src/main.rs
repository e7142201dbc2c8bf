//! GachaForge command-line front end
//!
//! Usage:
//!   gachaforge pools                     - List available pools
//!   gachaforge use <POOL_ID>             - Switch the active pool
//!   gachaforge pull                      - Draw one card
//!   gachaforge multi [COUNT]             - Draw a batch
//!   gachaforge stats                     - Show statistics
//!   gachaforge history                   - Show recent draws
//!   gachaforge export [--out FILE]       - Write the text report
//!   gachaforge reset                     - Clear pity and statistics
//!   gachaforge breakdown <TIER>          - Per-card counts of one tier

use std::fs;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use serde::Serialize;

use gf_core::GfResult;
use gf_gacha::{GachaConfig, PoolCatalog, PullRecord, Rarity};
use gf_state::{JsonFileStore, Response, SessionController};

#[derive(Parser)]
#[command(name = "gachaforge", version, about = "Gacha draw simulator with pity tracking")]
struct Cli {
    /// Pool catalog JSON
    #[arg(long, env = "GACHAFORGE_CATALOG", default_value = "data/cards.json", global = true)]
    catalog: PathBuf,

    /// Session file (defaults to the platform data directory)
    #[arg(long, env = "GACHAFORGE_SESSION", global = true)]
    session: Option<PathBuf>,

    /// Engine config (JSON or YAML)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Fixed RNG seed
    #[arg(long, global = true)]
    seed: Option<u64>,

    /// Print the JSON response envelope
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List available pools
    Pools,
    /// Switch the active pool
    Use {
        pool_id: String,
        /// Keep statistics instead of starting fresh
        #[arg(long)]
        keep_stats: bool,
    },
    /// Draw one card
    Pull,
    /// Draw a batch of cards
    Multi {
        #[arg(default_value_t = 10)]
        count: u32,
        /// Number of results to show
        #[arg(long)]
        show: Option<usize>,
    },
    /// Show statistics
    Stats,
    /// Show recent draws, newest first
    History {
        #[arg(short, long)]
        limit: Option<usize>,
    },
    /// Write the text report
    Export {
        /// Output file (stdout if omitted)
        #[arg(short, long)]
        out: Option<PathBuf>,
    },
    /// Clear pity and statistics
    Reset,
    /// Per-card counts of one tier (SSR, SR or R)
    Breakdown { tier: String },
}

fn main() -> Result<()> {
    env_logger::init();
    let cli = Cli::parse();

    let mut session = open_session(&cli)?;
    let json = cli.json;

    match cli.command {
        Commands::Pools => emit(json, Ok(session.list_pools()), |pools| {
            let active = session.active_pool().map(|p| p.id.as_str());
            for pool in pools {
                let marker = if Some(pool.pool_id.as_str()) == active { "*" } else { " " };
                println!(
                    "{marker} {:<16} {:<28} {:<10} {} cards",
                    pool.pool_id,
                    pool.name,
                    pool.pool_type.label(),
                    pool.card_count
                );
            }
        }),
        Commands::Use {
            pool_id,
            keep_stats,
        } => {
            let result = session
                .set_active_pool(&pool_id, !keep_stats)
                .map(|p| p.summary());
            emit(json, result, |pool| {
                println!("Active pool: {} ({})", pool.name, pool.pool_id);
            })
        }
        Commands::Pull => emit(json, session.pull_once(), |record| {
            print_record(record);
            println!("Pity: {}", record.pity_counter);
        }),
        Commands::Multi { count, show } => {
            let limit = show.unwrap_or(session.config().limits.max_return_results);
            emit(json, session.pull_batch(count, limit), |outcome| {
                println!(
                    "Drew {} cards (showing last {})",
                    outcome.actual_count, outcome.returned_count
                );
                for record in &outcome.records {
                    print_record(record);
                }
            })
        }
        Commands::Stats => emit(json, Ok(session.statistics()), |stats| {
            println!("Total pulls: {}", stats.total_pulls);
            for tier in &stats.tiers {
                println!("{:<4} {:>8} ({})", tier.rarity, tier.count, tier.rate);
            }
            println!("Current pity: {}", stats.pity_counter);
            for (id, count) in &stats.featured_counts {
                println!("Featured {id}: {count}");
            }
        }),
        Commands::History { limit } => emit(json, Ok(session.history(limit)), |records| {
            for record in records {
                print_record(record);
            }
        }),
        Commands::Export { out } => {
            let report = session.export_report();
            match out {
                Some(path) => {
                    fs::write(&path, &report)
                        .with_context(|| format!("Failed to write report to {}", path.display()))?;
                    emit(json, Ok(path.display().to_string()), |path| {
                        println!("Report written to {path}");
                    })
                }
                None => emit(json, Ok(report), |report| print!("{report}")),
            }
        }
        Commands::Reset => {
            session.reset();
            emit(json, Ok(session.statistics()), |_| println!("Session reset"))
        }
        Commands::Breakdown { tier } => {
            let result: GfResult<_> = tier
                .parse::<Rarity>()
                .map(|rarity| session.tier_breakdown(rarity));
            emit(json, result, |tallies| {
                for tally in tallies {
                    println!(
                        "{:<16} {:<24} {:>6} ({})",
                        tally.card_id, tally.name, tally.count, tally.share
                    );
                }
            })
        }
    }
}

fn open_session(cli: &Cli) -> Result<SessionController<JsonFileStore>> {
    let config = match &cli.config {
        Some(path) => GachaConfig::load(path)
            .with_context(|| format!("Failed to load config {}", path.display()))?,
        None => GachaConfig::default(),
    };
    let catalog = PoolCatalog::load(&cli.catalog)
        .with_context(|| format!("Failed to load pool catalog {}", cli.catalog.display()))?;
    let store = match &cli.session {
        Some(path) => JsonFileStore::new(path),
        None => JsonFileStore::at_default_path(),
    };
    log::debug!("Session file: {}", store.path().display());

    let mut session = SessionController::with_catalog(config, store, catalog);
    if let Some(seed) = cli.seed {
        session.seed(seed);
    }
    Ok(session)
}

/// Print either the response envelope or the human rendering
fn emit<T: Serialize>(json: bool, result: GfResult<T>, render: impl FnOnce(&T)) -> Result<()> {
    if json {
        let response = Response::from(result);
        println!("{}", response.to_json());
        if !response.is_success() {
            std::process::exit(1);
        }
        return Ok(());
    }

    let data = result?;
    render(&data);
    Ok(())
}

fn print_record(record: &PullRecord) {
    println!(
        "#{:<6} [{:<3}] {} ({})",
        record.sequence, record.card.rarity, record.card.name, record.card.id
    );
}
