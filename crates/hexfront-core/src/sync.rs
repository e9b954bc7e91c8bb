//! Lockstep move exchange.
//!
//! Peers never ship map state to each other. A player's turn travels as the
//! list of moves they applied, tagged with the turn it was played on; every
//! receiver replays the list against its own map.

use serde::{Deserialize, Serialize};

use crate::codec::{self, CodecError};
use crate::moves::Move;

/// Moves one player applied during one turn
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MoveBatch {
    pub player: u8,
    /// Turn the first move was applied on
    pub turn: u32,
    pub moves: Vec<Move>,
}

impl MoveBatch {
    pub fn new(player: u8, turn: u32, moves: Vec<Move>) -> Self {
        Self {
            player,
            turn,
            moves,
        }
    }

    pub fn len(&self) -> usize {
        self.moves.len()
    }

    pub fn is_empty(&self) -> bool {
        self.moves.is_empty()
    }

    /// Wire form, wrapped in the versioned envelope
    pub fn to_json(&self) -> Result<String, CodecError> {
        codec::encode(self)
    }

    pub fn from_json(text: &str) -> Result<Self, CodecError> {
        codec::decode(text)
    }
}
