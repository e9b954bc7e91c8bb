//! Gameplay constants.
//!
//! `Rules::default()` carries the stock tables. A JSON document can override
//! any subset of fields; missing fields keep their defaults. Tables indexed
//! by a kind follow that kind's encoding order.

use serde::{Deserialize, Serialize};

use crate::codec::CodecError;
use crate::entity::{Build, BuildKind, Effect, Occupant, Troop, TroopKind};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Rules {
    pub troop_hp: [i32; 6],
    pub troop_damage: [i32; 6],
    pub troop_cost: [i32; 6],
    pub troop_upkeep: [i32; 6],
    /// Attack reach in tiles
    pub troop_range: [usize; 6],

    pub build_hp: [i32; 7],
    pub build_cost: [i32; 7],
    /// Negative upkeep is extra income (farms)
    pub build_upkeep: [i32; 7],
    /// Added to a farm's cost for every farm the region already has
    pub farm_cost_step: i32,

    /// Money granted for cutting each plant kind
    pub plant_bonus: [i32; 7],
    pub plant_upkeep: i32,
    pub plant_growth_chance: f64,
    pub harvest_range: usize,
    pub harvest_yield: i32,

    /// Income of an owned tile before upkeep
    pub tile_income: i32,
    /// Berries spent per healed hit point
    pub berry_per_hp: i32,
    /// Extra reach granted by `Effect::RangeBoost`
    pub range_boost: usize,
    /// Damage added or absorbed by offense and defense boosts
    pub boost_amount: i32,
    pub move_range: usize,
    pub effect_radius: usize,
}

impl Default for Rules {
    fn default() -> Self {
        Self {
            troop_hp: [1, 2, 3, 2, 4, 6],
            troop_damage: [0, 1, 2, 1, 3, 4],
            troop_cost: [10, 15, 20, 25, 30, 40],
            troop_upkeep: [2, 4, 6, 14, 18, 36],
            troop_range: [1, 1, 1, 3, 1, 1],

            build_hp: [4, 1, 2, 3, 2, 5, 1],
            build_cost: [0, 12, 80, 15, 35, 95, 8],
            build_upkeep: [0, -4, 0, 1, 6, 29, 0],
            farm_cost_step: 2,

            plant_bonus: [2, 3, 3, 4, 6, 4, 0],
            plant_upkeep: 1,
            plant_growth_chance: 0.3,
            harvest_range: 2,
            harvest_yield: 4,

            tile_income: 1,
            berry_per_hp: 3,
            range_boost: 2,
            boost_amount: 1,
            move_range: 2,
            effect_radius: 2,
        }
    }
}

impl Rules {
    /// Parse a rules document, filling gaps from the defaults
    pub fn from_json(text: &str) -> Result<Self, CodecError> {
        Ok(serde_json::from_str(text)?)
    }

    /// A fresh troop at full health
    pub fn troop(&self, kind: TroopKind) -> Troop {
        Troop::new(kind, self.troop_hp[kind.index()])
    }

    /// A fresh building at full health
    pub fn build(&self, kind: BuildKind) -> Build {
        Build::new(kind, self.build_hp[kind.index()])
    }

    pub fn max_hp(&self, occupant: &Occupant) -> i32 {
        match occupant {
            Occupant::Troop(t) => self.troop_hp[t.kind.index()],
            Occupant::Build(b) => self.build_hp[b.kind.index()],
            Occupant::Plant(_) => 1,
        }
    }

    /// Purchase price, given how many farms the buying region owns
    pub fn cost(&self, occupant: &Occupant, farms: i32) -> i32 {
        match occupant {
            Occupant::Troop(t) => self.troop_cost[t.kind.index()],
            Occupant::Build(b) if b.kind == BuildKind::Farm => {
                self.build_cost[b.kind.index()] + self.farm_cost_step * farms
            }
            Occupant::Build(b) => self.build_cost[b.kind.index()],
            Occupant::Plant(_) => 0,
        }
    }

    pub fn upkeep(&self, occupant: Option<&Occupant>) -> i32 {
        match occupant {
            None => 0,
            Some(Occupant::Troop(t)) => self.troop_upkeep[t.kind.index()],
            Some(Occupant::Build(b)) => self.build_upkeep[b.kind.index()],
            Some(Occupant::Plant(_)) => self.plant_upkeep,
        }
    }

    /// Per-turn income a tile adds to its region
    pub fn tile_income(&self, occupant: Option<&Occupant>) -> i32 {
        self.tile_income - self.upkeep(occupant)
    }

    /// Damage an attacker deals to a target
    pub fn damage(&self, attacker: &Occupant, target: &Occupant) -> i32 {
        let Some(troop) = attacker.as_troop() else {
            return 0;
        };
        let vitals = target.vitals();
        if vitals.has_effect(Effect::Shielded) {
            return 0;
        }
        let mut damage = self.troop_damage[troop.kind.index()];
        if troop.vitals.has_effect(Effect::OffenseBoost) {
            damage += self.boost_amount;
        }
        if vitals.has_effect(Effect::DefenseBoost) {
            damage -= self.boost_amount;
        }
        damage.max(0)
    }

    /// Attack reach of a troop, including a range boost
    pub fn range(&self, troop: &Troop) -> usize {
        let base = self.troop_range[troop.kind.index()];
        if troop.vitals.has_effect(Effect::RangeBoost) {
            base + self.range_boost
        } else {
            base
        }
    }

    /// Rank produced by merging two troops, if it exists
    pub fn merge(&self, a: TroopKind, b: TroopKind) -> Option<TroopKind> {
        TroopKind::ALL.get(a.index() + b.index() + 1).copied()
    }
}
