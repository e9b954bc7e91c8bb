//! File shapes read and written by the host.

use anyhow::Context;
use serde::{Deserialize, Serialize};
use std::path::Path;

use hexfront_core::{MoveBatch, Rules};

/// Read a replay file: a plain JSON array of move batches
pub fn read_batches(path: &Path) -> anyhow::Result<Vec<MoveBatch>> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("reading replay {}", path.display()))?;
    serde_json::from_str(&text).with_context(|| format!("parsing replay {}", path.display()))
}

/// Read a rules override; missing fields keep their defaults
pub fn read_rules(path: &Path) -> anyhow::Result<Rules> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("reading rules {}", path.display()))?;
    Rules::from_json(&text).with_context(|| format!("parsing rules {}", path.display()))
}

/// Outcome of a replay, logged as the final summary
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReplayReport {
    pub batches: usize,
    /// Batches refused for being played on another turn
    pub rejected: usize,
    /// Moves that took effect
    pub applied: usize,
    /// Moves whose preconditions no longer held
    pub skipped: usize,
    /// Batches whose undo-all or redo-all did not reproduce the map
    pub diverged: Vec<usize>,
    pub turn: u32,
    pub regions: usize,
}

impl ReplayReport {
    pub fn verified(&self) -> bool {
        self.diverged.is_empty()
    }
}
