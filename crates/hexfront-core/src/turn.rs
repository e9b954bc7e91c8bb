//! End-of-turn planning.
//!
//! `plan_turn` reads the map and produces a `GameTurn` move listing every
//! region and entity that changes. The plan is a pure function of the map
//! and the seed, so every peer that plans the same turn gets the same move.

use rand::prelude::*;
use std::collections::HashSet;

use crate::entity::{Effect, EntityState, Occupant, Plant, PlantKind, Vitals};
use crate::map::Map;
use crate::moves::{GameTurn, RegionShift};
use crate::region::{RegionId, RegionRes};

/// Plan the transitions that close the current turn
pub fn plan_turn(map: &Map, seed: u64) -> GameTurn {
    let mut rng = StdRng::seed_from_u64(seed ^ u64::from(map.turn()));
    let (regions, dead) = plan_regions(map);

    let rules = map.rules();
    let mut states = Vec::new();
    for (pos, tile) in map.grid().iter() {
        let Some(occupant) = &tile.occupant else {
            continue;
        };
        let stranded = tile.region.map_or(false, |id| dead.contains(&id));

        let next: Option<Occupant> = match occupant {
            Occupant::Plant(plant) if plant.kind == PlantKind::Grave => None,
            Occupant::Plant(plant) => {
                let mut plant = plant.clone();
                plant.vitals.tick();
                if let Some(grown) = plant.kind.grown() {
                    if rng.gen::<f64>() < rules.plant_growth_chance {
                        plant.kind = grown;
                    }
                }
                Some(plant.into())
            }
            Occupant::Troop(troop) => {
                let mut troop = troop.clone();
                wear(&mut troop.vitals);
                if troop.vitals.hp <= 0 || stranded {
                    Some(Plant::new(PlantKind::Grave).into())
                } else {
                    Some(troop.into())
                }
            }
            Occupant::Build(build) => {
                let mut build = build.clone();
                wear(&mut build.vitals);
                (build.vitals.hp > 0).then(|| build.into())
            }
        };

        if next.as_ref() != Some(occupant) {
            states.push(EntityState {
                pos,
                occupant: next,
            });
        }
    }

    GameTurn::new(states, regions)
}

/// Tick cooldowns and effects; poison deals its damage and wears off
fn wear(vitals: &mut Vitals) {
    let poisoned = vitals.has_effect(Effect::Poisoned);
    vitals.tick();
    if poisoned {
        vitals.remove_effect(Effect::Poisoned);
        vitals.hp -= 1;
    }
}

/// Income for every live claimed region, plus the set of regions that are
/// dead once the turn ends
fn plan_regions(map: &Map) -> (Vec<RegionShift>, HashSet<RegionId>) {
    let mut shifts = Vec::new();
    let mut dead = HashSet::new();
    let mut seen = HashSet::new();

    for (pos, tile) in map.grid().iter() {
        let Some(id) = tile.region else {
            continue;
        };
        if !seen.insert(id) {
            continue;
        }
        let Some(region) = map.regions().get(id) else {
            continue;
        };
        if region.dead {
            dead.insert(id);
            continue;
        }
        if !region.team.is_claimed() {
            continue;
        }

        let res = RegionRes {
            money: region.res.money + region.income,
            ..region.res
        };
        let bankrupt = res.money < 0;
        if bankrupt {
            dead.insert(id);
        }
        if res != region.res || bankrupt {
            shifts.push(RegionShift {
                seed: pos,
                res,
                dead: bankrupt,
            });
        }
    }
    (shifts, dead)
}
