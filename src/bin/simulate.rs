//! Headless simulation driver.
//!
//! Runs one or more complete play-throughs with a scripted bot: tap active
//! tiles until the requested number of hits, then deliberately miss to end
//! the game. Prints a JSON summary of the final session state. Useful for
//! watching the core under real timers without any UI.

use std::path::PathBuf;
use std::time::Duration;

use anyhow::Result;
use clap::Parser;
use tapgrid::{GameConfig, GameSession};
use tokio::time::sleep;
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

/// How often the bot re-scans the grid while no tile is tappable.
const POLL_INTERVAL: Duration = Duration::from_millis(100);

/// Drive a headless tapgrid session to completion
#[derive(Parser, Debug)]
#[command(name = "simulate")]
#[command(about = "Drive a headless tapgrid session to completion", long_about = None)]
#[command(version)]
struct Args {
    /// Path to a TOML game configuration
    #[arg(long)]
    config: Option<PathBuf>,

    /// Override the number of tiles in the grid
    #[arg(long)]
    tiles: Option<usize>,

    /// Successful taps to attempt before deliberately missing
    #[arg(long, default_value = "10")]
    hits: u32,

    /// Complete play-throughs to run, with a reset in between
    #[arg(long, default_value = "1")]
    rounds: u32,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let args = Args::parse();

    let mut config = match &args.config {
        Some(path) => GameConfig::from_file(path)?,
        None => GameConfig::default(),
    };
    if let Some(tiles) = args.tiles {
        config = config.with_tile_count(tiles);
    }

    info!(
        tiles = *config.tile_count(),
        hits = args.hits,
        rounds = args.rounds,
        "starting simulation"
    );

    let mut session = GameSession::new(config);

    // Log the event stream the way a UI shell would consume it.
    let mut events = session.subscribe();
    tokio::spawn(async move {
        while let Ok(event) = events.recv().await {
            info!(%event, "session event");
        }
    });

    for round in 1..=args.rounds {
        if round > 1 {
            session.reset();
        }
        info!(round, "round started");
        play_round(&session, args.hits).await;
        info!(round, final_score = session.score(), "round finished");
    }

    let summary = serde_json::json!({
        "rounds": args.rounds,
        "final_score": session.score(),
        "over": session.is_over(),
        "session": session.snapshot(),
    });
    println!("{summary}");

    Ok(())
}

/// Taps active tiles until `hits` land, then misses on purpose.
async fn play_round(session: &GameSession, hits: u32) {
    let mut landed = 0;
    while landed < hits && !session.is_over() {
        match session.tiles().iter().find(|tile| tile.is_active()) {
            Some(tile) => {
                debug!(tile = tile.index(), "bot taps active tile");
                tile.on_tap();
                landed += 1;
            }
            None => sleep(POLL_INTERVAL).await,
        }
    }

    // End the round with a deliberate miss on an inactive tile; an empty
    // grid has nothing to tap, so end the session directly.
    loop {
        if session.is_over() {
            return;
        }
        match session
            .tiles()
            .iter()
            .find(|tile| !tile.is_active() && !tile.is_stopped())
        {
            Some(tile) => {
                debug!(tile = tile.index(), "bot taps inactive tile");
                tile.on_tap();
                return;
            }
            None => {
                if session.tiles().is_empty() {
                    session.end_game();
                    return;
                }
                sleep(POLL_INTERVAL).await;
            }
        }
    }
}
