//! Reversible moves.
//!
//! A `Move` is one gameplay action: the unit of undo/redo and of network
//! replay. Each variant records the state it overwrites while applying, so
//! reverting never has to look at anything but the move itself. Moves store
//! positions and resource snapshots, never region ids, which stay valid only
//! until the next merge or split.
//!
//! A move whose preconditions no longer hold (the attacker vanished, the
//! tile left the grid) returns `false` from `apply` without touching the map.

mod area;
mod entity;
mod game_turn;
mod troop;

use serde::{Deserialize, Serialize};
use std::fmt;

pub use area::{PlantCut, PlantHarvest, RadiusEffect, TroopHeal};
pub use entity::{EntityEffect, EntityPlace, EntityWithdraw, TileRepaint};
pub use game_turn::{GameTurn, RegionShift};
pub use troop::{TroopAttack, TroopMerge, TroopMove};

use crate::hex::HexCoord;
use crate::map::Map;
use crate::region::{Region, RegionId};
use crate::skill::SkillKind;
use crate::territory::Distribution;
use crate::tile::{Team, Terrain};

/// Cooldown charged to the entity that used a skill
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SkillUse {
    /// Where the acting entity stands when the move is applied
    pub pos: HexCoord,
    pub skill: SkillKind,
    pub cooldown: u8,
}

/// Every kind of action a move can carry
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum MoveKind {
    EntityPlace(EntityPlace),
    EntityWithdraw(EntityWithdraw),
    EntityEffect(EntityEffect),
    TroopAttack(TroopAttack),
    TroopMove(TroopMove),
    TroopMerge(TroopMerge),
    TroopHeal(TroopHeal),
    RadiusEffect(RadiusEffect),
    PlantCut(PlantCut),
    PlantHarvest(PlantHarvest),
    TileRepaint(TileRepaint),
    GameTurn(GameTurn),
}

impl MoveKind {
    fn apply(&mut self, map: &mut Map) -> bool {
        match self {
            MoveKind::EntityPlace(m) => m.apply(map),
            MoveKind::EntityWithdraw(m) => m.apply(map),
            MoveKind::EntityEffect(m) => m.apply(map),
            MoveKind::TroopAttack(m) => m.apply(map),
            MoveKind::TroopMove(m) => m.apply(map),
            MoveKind::TroopMerge(m) => m.apply(map),
            MoveKind::TroopHeal(m) => m.apply(map),
            MoveKind::RadiusEffect(m) => m.apply(map),
            MoveKind::PlantCut(m) => m.apply(map),
            MoveKind::PlantHarvest(m) => m.apply(map),
            MoveKind::TileRepaint(m) => m.apply(map),
            MoveKind::GameTurn(m) => m.apply(map),
        }
    }

    fn revert(&mut self, map: &mut Map) {
        match self {
            MoveKind::EntityPlace(m) => m.revert(map),
            MoveKind::EntityWithdraw(m) => m.revert(map),
            MoveKind::EntityEffect(m) => m.revert(map),
            MoveKind::TroopAttack(m) => m.revert(map),
            MoveKind::TroopMove(m) => m.revert(map),
            MoveKind::TroopMerge(m) => m.revert(map),
            MoveKind::TroopHeal(m) => m.revert(map),
            MoveKind::RadiusEffect(m) => m.revert(map),
            MoveKind::PlantCut(m) => m.revert(map),
            MoveKind::PlantHarvest(m) => m.revert(map),
            MoveKind::TileRepaint(m) => m.revert(map),
            MoveKind::GameTurn(m) => m.revert(map),
        }
    }

    /// Tile to select after applying
    fn apply_cursor(&self) -> Option<HexCoord> {
        match self {
            MoveKind::EntityPlace(m) => Some(m.pos),
            MoveKind::EntityWithdraw(m) => Some(m.pos),
            MoveKind::EntityEffect(m) => Some(m.pos),
            MoveKind::TroopAttack(m) => Some(m.from),
            MoveKind::TroopMove(m) => Some(m.dest),
            MoveKind::TroopMerge(m) => Some(m.dest),
            MoveKind::TroopHeal(m) => Some(m.mid),
            MoveKind::RadiusEffect(m) => Some(m.mid),
            MoveKind::PlantCut(m) => Some(m.from),
            MoveKind::PlantHarvest(m) => Some(m.mid),
            MoveKind::TileRepaint(m) => Some(m.pos),
            MoveKind::GameTurn(_) => None,
        }
    }

    /// Tile to select after reverting
    fn revert_cursor(&self) -> Option<HexCoord> {
        match self {
            MoveKind::TroopMove(m) => Some(m.from),
            MoveKind::TroopMerge(m) => Some(m.from),
            other => other.apply_cursor(),
        }
    }
}

impl fmt::Display for MoveKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MoveKind::EntityPlace(m) => write!(f, "place {:?} at {} for {}", m.entity.summary().kind, m.pos, m.cost()),
            MoveKind::EntityWithdraw(m) => write!(f, "withdraw at {}", m.pos),
            MoveKind::EntityEffect(m) => write!(f, "{:?} on {}", m.effect, m.pos),
            MoveKind::TroopAttack(m) => write!(f, "attack {} -> {}", m.from, m.dest),
            MoveKind::TroopMove(m) => write!(f, "move {} -> {}", m.from, m.dest),
            MoveKind::TroopMerge(m) => write!(f, "merge {} into {}", m.from, m.dest),
            MoveKind::TroopHeal(m) => write!(f, "heal around {} (r{})", m.mid, m.radius),
            MoveKind::RadiusEffect(m) => write!(f, "{:?} around {} (r{})", m.effect, m.mid, m.radius),
            MoveKind::PlantCut(m) => write!(f, "cut plant at {}", m.pos),
            MoveKind::PlantHarvest(m) => write!(f, "harvest around {} (r{})", m.mid, m.radius),
            MoveKind::TileRepaint(m) => write!(f, "repaint {} to {:?}/{:?}", m.pos, m.terrain, m.team),
            MoveKind::GameTurn(m) => write!(f, "end turn ({} entities, {} regions)", m.states.len(), m.regions.len()),
        }
    }
}

/// A move plus the optional skill cooldown wrapped around it
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Move {
    #[serde(default)]
    pub skill: Option<SkillUse>,
    pub kind: MoveKind,
}

impl Move {
    pub fn new(kind: impl Into<MoveKind>) -> Self {
        Self {
            skill: None,
            kind: kind.into(),
        }
    }

    /// Charge `cooldown` turns of `skill` to the entity at `pos`
    pub fn with_skill(mut self, pos: HexCoord, skill: SkillKind, cooldown: u8) -> Self {
        self.skill = Some(SkillUse {
            pos,
            skill,
            cooldown,
        });
        self
    }

    /// Apply the move. Returns false, leaving the map untouched, when its
    /// preconditions do not hold or the cooldown cannot be charged.
    pub fn apply(&mut self, map: &mut Map) -> bool {
        if !self.charge(map, true) {
            return false;
        }
        let applied = self.kind.apply(map);
        if !applied {
            self.charge(map, false);
        }
        applied
    }

    /// Undo an applied move
    pub fn revert(&mut self, map: &mut Map) {
        self.kind.revert(map);
        self.charge(map, false);
    }

    pub fn apply_cursor(&self) -> Option<HexCoord> {
        self.kind.apply_cursor()
    }

    pub fn revert_cursor(&self) -> Option<HexCoord> {
        self.kind.revert_cursor()
    }

    /// Add or remove the skill's cooldown; false when adding was refused
    fn charge(&self, map: &mut Map, add: bool) -> bool {
        let Some(skill) = self.skill else {
            return true;
        };
        let Some(occupant) = map.occupant_mut(skill.pos) else {
            return true;
        };
        let vitals = occupant.vitals_mut();
        if add {
            vitals.add_cooldown(skill.skill, skill.cooldown)
        } else {
            vitals.sub_cooldown(skill.skill, skill.cooldown);
            true
        }
    }
}

impl fmt::Display for Move {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.kind)?;
        if let Some(skill) = self.skill {
            write!(f, " [{:?} cd {}]", skill.skill, skill.cooldown)?;
        }
        Ok(())
    }
}

macro_rules! move_kinds {
    ($($variant:ident),* $(,)?) => {
        $(
            impl From<$variant> for MoveKind {
                fn from(m: $variant) -> Self {
                    MoveKind::$variant(m)
                }
            }

            impl From<$variant> for Move {
                fn from(m: $variant) -> Self {
                    Move::new(m)
                }
            }
        )*
    };
}

move_kinds!(
    EntityPlace,
    EntityWithdraw,
    EntityEffect,
    TroopAttack,
    TroopMove,
    TroopMerge,
    TroopHeal,
    RadiusEffect,
    PlantCut,
    PlantHarvest,
    TileRepaint,
    GameTurn,
);

/// Previous ownership of a repainted tile
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Ownership {
    pub terrain: Terrain,
    pub team: Team,
    /// The tile's region before the change, if it had one
    pub region: Option<Region>,
    /// Regions absorbed when the tile joined its new team
    pub distribution: Distribution,
}

impl Ownership {
    /// Repaint `pos` and remember what it was. The tile joins `prefer` when
    /// that region borders it.
    fn take(
        map: &mut Map,
        pos: HexCoord,
        terrain: Terrain,
        team: Team,
        prefer: Option<RegionId>,
    ) -> Option<Ownership> {
        let tile = map.tile(pos)?;
        let mut ownership = Ownership {
            terrain: tile.terrain,
            team: tile.team,
            region: map.region_at(pos).map(Region::detached),
            distribution: Vec::new(),
        };
        ownership.distribution = map.recolor(pos, terrain, team, prefer, None, &[]);
        Some(ownership)
    }

    /// Paint `pos` back and split regions exactly as they were
    fn restore(self, map: &mut Map, pos: HexCoord) {
        map.recolor(pos, self.terrain, self.team, None, self.region, &self.distribution);
    }
}
