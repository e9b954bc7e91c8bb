use serde::{Deserialize, Serialize};

use crate::entity::EntityState;
use crate::hex::HexCoord;
use crate::map::Map;
use crate::region::RegionRes;

/// New state of the region containing `seed`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegionShift {
    pub seed: HexCoord,
    pub res: RegionRes,
    pub dead: bool,
}

/// End of turn: overwrite regions, then entities, then advance the turn.
///
/// The transitions are planned up front (see `turn::plan_turn`), so the move
/// itself is a plain list of overwrites and replays the same everywhere.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameTurn {
    pub states: Vec<EntityState>,
    pub regions: Vec<RegionShift>,
    #[serde(default)]
    previous_states: Vec<EntityState>,
    #[serde(default)]
    previous_regions: Vec<RegionShift>,
}

impl GameTurn {
    pub fn new(states: Vec<EntityState>, regions: Vec<RegionShift>) -> Self {
        Self {
            states,
            regions,
            ..Self::default()
        }
    }

    pub(super) fn apply(&mut self, map: &mut Map) -> bool {
        self.previous_regions.clear();
        for shift in &self.regions {
            if let Some(region) = map.region_at_mut(shift.seed) {
                self.previous_regions.push(RegionShift {
                    seed: shift.seed,
                    res: region.res,
                    dead: region.dead,
                });
                region.res = shift.res;
                region.dead = shift.dead;
            }
        }

        self.previous_states.clear();
        for state in &self.states {
            if map.tile(state.pos).is_none() {
                continue;
            }
            let previous = map.set_occupant(state.pos, state.occupant.clone());
            self.previous_states.push(EntityState {
                pos: state.pos,
                occupant: previous,
            });
        }

        map.set_turn(map.turn() + 1);
        true
    }

    pub(super) fn revert(&mut self, map: &mut Map) {
        map.set_turn(map.turn().saturating_sub(1));
        for state in self.previous_states.drain(..).rev() {
            map.set_occupant(state.pos, state.occupant);
        }
        for shift in self.previous_regions.drain(..).rev() {
            if let Some(region) = map.region_at_mut(shift.seed) {
                region.res = shift.res;
                region.dead = shift.dead;
            }
        }
    }
}
