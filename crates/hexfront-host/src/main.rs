//! Hexfront host: loads a map, replays move batches and checks that every
//! batch undoes and redoes cleanly.

use anyhow::Context;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use hexfront_core::{GameState, Rules, Template};

mod config;
mod protocol;
mod replay;

use config::HostConfig;

/// Turns scripted when no replay file is given
const DEMO_TURNS: u32 = 4;

fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "info".into()),
        ))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = HostConfig::from_env()?;
    info!(seed = config.seed, "Starting Hexfront host...");

    let rules = match &config.rules {
        Some(path) => protocol::read_rules(path)?,
        None => Rules::default(),
    };

    let mut game = match &config.template {
        Some(path) => GameState::open(path, rules.clone(), config.seed)
            .with_context(|| format!("loading template {}", path.display()))?,
        None => {
            let mut game = GameState::new(rules.clone(), config.seed);
            game.load(&replay::demo_template(&rules));
            game
        }
    };
    let size = game.map().size();
    info!(
        width = size.width,
        height = size.height,
        regions = game.map().regions().len(),
        "map loaded"
    );

    let batches = match &config.replay {
        Some(path) => protocol::read_batches(path)?,
        None => {
            let template = Template::generate(game.map());
            replay::demo_batches(&template, &rules, config.seed, DEMO_TURNS)
        }
    };
    info!(batches = batches.len(), "replaying");

    let report = replay::run(&mut game, batches);
    if !report.verified() {
        warn!(diverged = ?report.diverged, "some batches did not undo cleanly");
    }
    info!(report = %serde_json::to_string(&report)?, "summary");

    let faults = game.map().audit_regions();
    if !faults.is_empty() {
        anyhow::bail!("region bookkeeping broken at {} tiles", faults.len());
    }
    if !report.verified() {
        anyhow::bail!("undo/redo diverged in {} batches", report.diverged.len());
    }
    Ok(())
}
