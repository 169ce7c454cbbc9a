#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Headless tick driver that plays a full Bang! Howdy game between computer players.

mod demo_board;
mod report;

use std::{fs, path::PathBuf, sync::Arc};

use anyhow::{bail, Context, Result};
use clap::Parser;
use log::info;

use bang_howdy_core::{GameConfig, GamePhase, PlayerIndex, UnitMake};
use bang_howdy_system_scenario::{AiProfile, Purchase, ScenarioType, Session};
use bang_howdy_world::query;

use crate::report::GameReport;

/// Plays a game of Bang! Howdy between computer players.
#[derive(Debug, Parser)]
#[command(author, version, about)]
struct Args {
    /// Scenario to play, by short or long name (cj, gold_rush, wa, ...).
    #[arg(short, long, default_value = "cj")]
    scenario: ScenarioType,
    /// Number of seated computer players.
    #[arg(short, long, default_value_t = 2, value_parser = clap::value_parser!(u8).range(1..=4))]
    players: u8,
    /// Units bought by each player every round.
    #[arg(short, long, default_value_t = 3)]
    units: usize,
    /// Edge length of the generated square board.
    #[arg(long, default_value_t = 16, value_parser = clap::value_parser!(u32).range(i64::from(demo_board::MIN_SIZE)..=64))]
    size: u32,
    /// JSON game configuration replacing the built-in defaults.
    #[arg(short, long)]
    config: Option<PathBuf>,
    /// Overrides the configured number of rounds.
    #[arg(short, long)]
    rounds: Option<usize>,
    /// Overrides the configured round length in ticks.
    #[arg(short, long)]
    duration: Option<u16>,
    /// Overrides the configured random seed.
    #[arg(long)]
    seed: Option<u64>,
    /// Prints the results as JSON.
    #[arg(long)]
    json: bool,
}

/// Entry point for the Bang! Howdy command-line interface.
fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let args = Args::parse();

    let config = Arc::new(load_config(&args)?);
    let players = usize::from(args.players);
    let purchases = purchases(&config, players, args.units)?;
    let (board, pieces) = demo_board::build(args.scenario, args.size);
    let names = (1..=players).map(|seat| format!("bot{seat}"));
    let mut session = Session::new(Arc::clone(&config), board, pieces, names, args.scenario)
        .context("failed to set up the game")?;
    for seat in 0..players {
        let profile = AiProfile {
            aggressive: seat % 2 == 0,
        };
        session.add_ai(PlayerIndex::new(seat), profile);
    }

    info!(
        "playing {} rounds of {} with {players} players",
        config.round.rounds, args.scenario
    );
    while query::phase(session.world()) != GamePhase::GameOver {
        let round = query::rounds_started(session.world()) + 1;
        session
            .start_round(&purchases)
            .with_context(|| format!("round {round} failed to start"))?;
        while !session.tick().context("tick failed")?.round_over {}
    }

    let report = GameReport::collect(&session);
    if args.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        print!("{report}");
    }
    Ok(())
}

fn load_config(args: &Args) -> Result<GameConfig> {
    let mut config = match &args.config {
        Some(path) => {
            let text = fs::read_to_string(path)
                .with_context(|| format!("failed to read {}", path.display()))?;
            serde_json::from_str(&text)
                .with_context(|| format!("failed to parse {}", path.display()))?
        }
        None => GameConfig::default(),
    };
    if let Some(rounds) = args.rounds {
        config.round.rounds = rounds;
    }
    if let Some(duration) = args.duration {
        config.round.duration = duration;
    }
    if let Some(seed) = args.seed {
        config.seed = seed;
    }
    config.validate().context("invalid game configuration")?;
    Ok(config)
}

/// The same mix of regular units for every player, cycling through the unit table.
fn purchases(config: &GameConfig, players: usize, units: usize) -> Result<Vec<Purchase>> {
    let regular: Vec<_> = config
        .units
        .iter()
        .filter(|unit| unit.make == UnitMake::Normal)
        .map(|unit| unit.id)
        .collect();
    if regular.is_empty() {
        bail!("the configuration has no regular unit types to buy");
    }
    let mut purchases = Vec::with_capacity(players * units);
    for seat in 0..players {
        for unit_type in regular.iter().cycle().take(units) {
            purchases.push(Purchase::new(PlayerIndex::new(seat), *unit_type));
        }
    }
    Ok(purchases)
}
