//! Tile cells stored in the hex grid.

use serde::{Deserialize, Serialize};
use std::cell::Cell;

use crate::entity::{Occupant, OccupantSummary};
use crate::region::RegionId;
use crate::spread::Channel;

wire_enum! {
    /// Ground type of a tile
    pub enum Terrain {
        /// Nothing at all, not part of the playable map
        Void,
        Water,
        Ground,
        /// A walkable crossing over water
        Bridge,
    }
}

impl Terrain {
    /// Whether the terrain can be owned and occupied
    pub const fn is_solid(self) -> bool {
        matches!(self, Terrain::Ground | Terrain::Bridge)
    }
}

wire_enum! {
    /// Owner of a tile or region
    pub enum Team {
        Unclaimed,
        Red,
        Orange,
        Yellow,
        Green,
        Aqua,
        Blue,
        Purple,
        Pink,
    }
}

impl Team {
    pub const fn is_claimed(self) -> bool {
        !matches!(self, Team::Unclaimed)
    }
}

/// A single grid cell.
///
/// Tiles are created by the grid with default (void, unclaimed) state and
/// mutated in place afterwards. The region back-reference is an arena index;
/// it is maintained by the map so that every solid tile has exactly one.
#[derive(Debug, Clone, Default)]
pub struct Tile {
    pub terrain: Terrain,
    pub team: Team,
    pub occupant: Option<Occupant>,
    pub(crate) region: Option<RegionId>,
    /// Index of the last selection spread that highlighted this tile
    pub selected: u32,
    marks: [Cell<u64>; 2],
}

impl Tile {
    pub fn new(terrain: Terrain, team: Team) -> Self {
        Self {
            terrain,
            team,
            ..Self::default()
        }
    }

    pub fn is_solid(&self) -> bool {
        self.terrain.is_solid()
    }

    /// Region this tile belongs to, if any
    pub fn region(&self) -> Option<RegionId> {
        self.region
    }

    pub fn is_empty(&self) -> bool {
        self.occupant.is_none()
    }

    /// Read-only view handed to renderers
    pub fn summary(&self) -> TileSummary {
        TileSummary {
            terrain: self.terrain,
            team: self.team,
            occupant: self.occupant.as_ref().map(Occupant::summary),
            selected: self.selected,
        }
    }

    /// Stamp this tile as visited on `channel`.
    ///
    /// Returns false when it already carried `stamp`.
    pub(crate) fn visit(&self, channel: Channel, stamp: u64) -> bool {
        let mark = &self.marks[channel.index()];
        if mark.get() == stamp {
            return false;
        }
        mark.set(stamp);
        true
    }
}

// Visit marks are scratch state and never part of a tile's identity.
impl PartialEq for Tile {
    fn eq(&self, other: &Self) -> bool {
        self.terrain == other.terrain
            && self.team == other.team
            && self.occupant == other.occupant
            && self.region == other.region
            && self.selected == other.selected
    }
}

/// Terrain and owner of a tile, as stored in map templates
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct TileBase {
    pub terrain: Terrain,
    pub team: Team,
}

/// What a renderer needs to draw a tile
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TileSummary {
    pub terrain: Terrain,
    pub team: Team,
    pub occupant: Option<OccupantSummary>,
    pub selected: u32,
}
