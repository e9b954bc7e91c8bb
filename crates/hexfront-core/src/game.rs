//! Game state: the map, its move history and the turn seed.
//!
//! Everything a player does goes through `GameState` as a `Move`, so the
//! same log serves local undo/redo and the lockstep exchange with peers.

use std::path::Path;
use thiserror::Error;

use crate::codec::{self, CodecError};
use crate::hex::{GridSize, HexCoord};
use crate::history::History;
use crate::map::{Map, MapSnapshot};
use crate::moves::Move;
use crate::rules::Rules;
use crate::skill::{SkillKind, SkillState};
use crate::sync::MoveBatch;
use crate::template::Template;
use crate::turn::plan_turn;

/// Errors raised at the boundaries of a game
#[derive(Debug, Error)]
pub enum GameError {
    #[error("Batch was played on turn {found}, but this game is on turn {expected}")]
    StaleTurn { expected: u32, found: u32 },

    #[error(transparent)]
    Codec(#[from] CodecError),
}

#[derive(Debug, Clone, Default)]
pub struct GameState {
    map: Map,
    history: History,
    /// Feeds the end-of-turn planner; every peer must share it
    seed: u64,
    /// Turn the current history started on
    base_turn: u32,
}

impl GameState {
    /// An empty game with the given rules
    pub fn new(rules: Rules, seed: u64) -> Self {
        Self {
            map: Map::new(GridSize::default(), rules),
            seed,
            ..Self::default()
        }
    }

    /// Read a template file and start a game from it
    pub fn open(path: impl AsRef<Path>, rules: Rules, seed: u64) -> Result<Self, GameError> {
        let template = codec::load_template(path)?;
        let mut game = Self::new(rules, seed);
        game.load(&template);
        Ok(game)
    }

    /// Replace the map with a template and forget the history
    pub fn load(&mut self, template: &Template) {
        template.construct(&mut self.map);
        self.history.clear();
        self.base_turn = self.map.turn();
    }

    pub fn map(&self) -> &Map {
        &self.map
    }

    pub fn history(&self) -> &History {
        &self.history
    }

    pub fn seed(&self) -> u64 {
        self.seed
    }

    pub fn turn(&self) -> u32 {
        self.map.turn()
    }

    /// Apply a move and record it. Returns false when it does not apply.
    pub fn execute(&mut self, mv: impl Into<Move>) -> bool {
        self.history.add(&mut self.map, mv.into())
    }

    pub fn undo(&mut self) -> Option<HexCoord> {
        self.history.undo(&mut self.map)
    }

    pub fn redo(&mut self) -> Option<HexCoord> {
        self.history.redo(&mut self.map)
    }

    /// Highlight the targets of `skill` used from `origin`
    pub fn select(&mut self, skill: SkillKind, state: &SkillState, origin: HexCoord) -> Vec<HexCoord> {
        let radius = skill.radius(&self.map, origin);
        let spread = skill.selection(state, &self.map, origin);
        self.map.select(spread, origin, radius)
    }

    /// Build the move for a skill and execute it
    pub fn use_skill(
        &mut self,
        skill: SkillKind,
        state: &SkillState,
        origin: HexCoord,
        target: HexCoord,
    ) -> bool {
        match skill.action(state, &self.map, origin, target) {
            Some(mv) => self.execute(mv),
            None => false,
        }
    }

    /// Plan and apply the end-of-turn transitions
    pub fn end_turn(&mut self) -> bool {
        let turn = plan_turn(&self.map, self.seed);
        self.execute(turn)
    }

    pub fn snapshot(&self) -> MapSnapshot {
        self.map.snapshot()
    }

    /// Replay a peer's moves in order.
    ///
    /// Moves that no longer apply are skipped; the count of those that took
    /// effect is returned.
    pub fn apply_batch(&mut self, batch: MoveBatch) -> Result<usize, GameError> {
        if batch.turn != self.map.turn() {
            return Err(GameError::StaleTurn {
                expected: self.map.turn(),
                found: batch.turn,
            });
        }
        let mut applied = 0;
        for mv in batch.moves {
            if self.history.add(&mut self.map, mv) {
                applied += 1;
            }
        }
        Ok(applied)
    }

    /// Package the applied moves for the peers
    pub fn outgoing(&self, player: u8) -> MoveBatch {
        MoveBatch::new(player, self.base_turn, self.history.list().to_vec())
    }

    /// Package the applied moves and start a fresh history.
    ///
    /// Sent moves can no longer be undone.
    pub fn finish(&mut self, player: u8) -> MoveBatch {
        let batch = self.outgoing(player);
        self.commit();
        batch
    }

    /// Make everything applied so far permanent
    pub fn commit(&mut self) {
        self.history.clear();
        self.base_turn = self.map.turn();
    }
}
