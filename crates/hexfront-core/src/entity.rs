//! Entities that can occupy a tile: troops, buildings and plants.
//!
//! A tile holds at most one occupant. All three kinds share the same
//! `Vitals` (hit points, status effects and skill cooldowns).

use serde::{Deserialize, Serialize};

use crate::hex::HexCoord;
use crate::skill::SkillKind;

wire_enum! {
    /// Troop ranks, weakest first
    pub enum TroopKind {
        Farmer,
        Lumberjack,
        Spearman,
        Archer,
        Baron,
        Knight,
    }
}

wire_enum! {
    pub enum BuildKind {
        /// Region capital
        Castle,
        Farm,
        Mine,
        Tower,
        Beacon,
        Fort,
        Tent,
    }
}

wire_enum! {
    pub enum PlantKind {
        Bush,
        /// Harvestable bush
        Berry,
        Sapling,
        Tree,
        /// Harvestable tree
        Peach,
        Pine,
        /// Left behind by a fallen troop
        Grave,
    }
}

impl PlantKind {
    /// What the plant grows into at the end of a turn
    pub const fn grown(self) -> Option<PlantKind> {
        match self {
            PlantKind::Bush => Some(PlantKind::Berry),
            PlantKind::Sapling => Some(PlantKind::Tree),
            PlantKind::Tree => Some(PlantKind::Peach),
            _ => None,
        }
    }

    /// What remains after harvesting
    pub const fn harvested(self) -> Option<PlantKind> {
        match self {
            PlantKind::Berry => Some(PlantKind::Bush),
            PlantKind::Peach => Some(PlantKind::Tree),
            _ => None,
        }
    }
}

wire_enum! {
    /// Status effects
    pub enum Effect {
        Shielded,
        RangeBoost,
        DefenseBoost,
        OffenseBoost,
        Poisoned,
        Stunned,
        /// Next attack poisons the target
        Enchant,
    }
}

impl Effect {
    /// Effects that wear off at the end of a turn
    pub const fn is_temporary(self) -> bool {
        matches!(
            self,
            Effect::Shielded
                | Effect::RangeBoost
                | Effect::DefenseBoost
                | Effect::OffenseBoost
                | Effect::Stunned
        )
    }
}

/// Remaining turns before a skill can be used again
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Cooldown {
    pub skill: SkillKind,
    pub turns: u8,
}

/// State shared by every kind of entity
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Vitals {
    pub hp: i32,
    #[serde(default)]
    pub effects: Vec<Effect>,
    #[serde(default)]
    pub cooldowns: Vec<Cooldown>,
}

impl Vitals {
    pub fn new(hp: i32) -> Self {
        Self {
            hp,
            ..Self::default()
        }
    }

    pub fn has_effect(&self, effect: Effect) -> bool {
        self.effects.contains(&effect)
    }

    /// Add an effect. Returns false if it was already present.
    pub fn add_effect(&mut self, effect: Effect) -> bool {
        if self.has_effect(effect) {
            return false;
        }
        self.effects.push(effect);
        true
    }

    /// Remove an effect. Returns false if it was not present.
    pub fn remove_effect(&mut self, effect: Effect) -> bool {
        let before = self.effects.len();
        self.effects.retain(|&e| e != effect);
        self.effects.len() != before
    }

    /// Turns left before `skill` is usable
    pub fn cooldown(&self, skill: SkillKind) -> u8 {
        self.cooldowns
            .iter()
            .find(|c| c.skill == skill)
            .map_or(0, |c| c.turns)
    }

    /// Add `turns` to the cooldown of `skill`. Refuses, changing nothing,
    /// when the total would not fit in a `u8`.
    pub fn add_cooldown(&mut self, skill: SkillKind, turns: u8) -> bool {
        if turns == 0 {
            return true;
        }
        match self.cooldowns.iter_mut().find(|c| c.skill == skill) {
            Some(c) => match c.turns.checked_add(turns) {
                Some(total) => c.turns = total,
                None => return false,
            },
            None => self.cooldowns.push(Cooldown { skill, turns }),
        }
        true
    }

    /// Exact inverse of an accepted `add_cooldown` with the same arguments
    pub fn sub_cooldown(&mut self, skill: SkillKind, turns: u8) {
        if turns == 0 {
            return;
        }
        if let Some(c) = self.cooldowns.iter_mut().find(|c| c.skill == skill) {
            c.turns = c.turns.saturating_sub(turns);
        }
        self.cooldowns.retain(|c| c.turns > 0);
    }

    /// Advance cooldowns and expire temporary effects by one turn
    pub fn tick(&mut self) {
        for c in &mut self.cooldowns {
            c.turns = c.turns.saturating_sub(1);
        }
        self.cooldowns.retain(|c| c.turns > 0);
        self.effects.retain(|e| !e.is_temporary());
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Troop {
    pub kind: TroopKind,
    #[serde(flatten)]
    pub vitals: Vitals,
}

impl Troop {
    pub fn new(kind: TroopKind, hp: i32) -> Self {
        Self {
            kind,
            vitals: Vitals::new(hp),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Build {
    pub kind: BuildKind,
    #[serde(flatten)]
    pub vitals: Vitals,
}

impl Build {
    pub fn new(kind: BuildKind, hp: i32) -> Self {
        Self {
            kind,
            vitals: Vitals::new(hp),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Plant {
    pub kind: PlantKind,
    #[serde(flatten)]
    pub vitals: Vitals,
}

impl Plant {
    pub fn new(kind: PlantKind) -> Self {
        Self {
            kind,
            vitals: Vitals::new(1),
        }
    }
}

/// The single entity standing on a tile
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Occupant {
    Troop(Troop),
    Build(Build),
    Plant(Plant),
}

impl Occupant {
    pub fn vitals(&self) -> &Vitals {
        match self {
            Occupant::Troop(t) => &t.vitals,
            Occupant::Build(b) => &b.vitals,
            Occupant::Plant(p) => &p.vitals,
        }
    }

    pub fn vitals_mut(&mut self) -> &mut Vitals {
        match self {
            Occupant::Troop(t) => &mut t.vitals,
            Occupant::Build(b) => &mut b.vitals,
            Occupant::Plant(p) => &mut p.vitals,
        }
    }

    pub fn as_troop(&self) -> Option<&Troop> {
        match self {
            Occupant::Troop(t) => Some(t),
            _ => None,
        }
    }

    pub fn as_troop_mut(&mut self) -> Option<&mut Troop> {
        match self {
            Occupant::Troop(t) => Some(t),
            _ => None,
        }
    }

    pub fn as_build(&self) -> Option<&Build> {
        match self {
            Occupant::Build(b) => Some(b),
            _ => None,
        }
    }

    pub fn as_plant(&self) -> Option<&Plant> {
        match self {
            Occupant::Plant(p) => Some(p),
            _ => None,
        }
    }

    pub fn is_troop(&self) -> bool {
        matches!(self, Occupant::Troop(_))
    }

    pub fn is_plant(&self) -> bool {
        matches!(self, Occupant::Plant(_))
    }

    /// Whether this is a farm, which counts towards farm cost scaling
    pub fn is_farm(&self) -> bool {
        matches!(self, Occupant::Build(b) if b.kind == BuildKind::Farm)
    }

    pub fn summary(&self) -> OccupantSummary {
        let kind = match self {
            Occupant::Troop(t) => OccupantKind::Troop(t.kind),
            Occupant::Build(b) => OccupantKind::Build(b.kind),
            Occupant::Plant(p) => OccupantKind::Plant(p.kind),
        };
        OccupantSummary {
            kind,
            hp: self.vitals().hp,
        }
    }
}

impl From<Troop> for Occupant {
    fn from(troop: Troop) -> Self {
        Occupant::Troop(troop)
    }
}

impl From<Build> for Occupant {
    fn from(build: Build) -> Self {
        Occupant::Build(build)
    }
}

impl From<Plant> for Occupant {
    fn from(plant: Plant) -> Self {
        Occupant::Plant(plant)
    }
}

/// Kind of an occupant without its state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum OccupantKind {
    Troop(TroopKind),
    Build(BuildKind),
    Plant(PlantKind),
}

/// Occupant details exposed to renderers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct OccupantSummary {
    pub kind: OccupantKind,
    pub hp: i32,
}

/// Full occupant state of one tile, used by end-of-turn transitions
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntityState {
    pub pos: HexCoord,
    pub occupant: Option<Occupant>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cooldown_add_sub_symmetric() {
        let mut vitals = Vitals::new(3);
        vitals.add_cooldown(SkillKind::Attack, 2);
        vitals.add_cooldown(SkillKind::Attack, 1);
        assert_eq!(vitals.cooldown(SkillKind::Attack), 3);

        vitals.sub_cooldown(SkillKind::Attack, 1);
        vitals.sub_cooldown(SkillKind::Attack, 2);
        assert_eq!(vitals, Vitals::new(3));
    }

    #[test]
    fn test_cooldown_refuses_overflow() {
        let mut vitals = Vitals::new(3);
        assert!(vitals.add_cooldown(SkillKind::Attack, 250));
        assert!(!vitals.add_cooldown(SkillKind::Attack, 6));
        assert_eq!(vitals.cooldown(SkillKind::Attack), 250);
        assert!(vitals.add_cooldown(SkillKind::Attack, 5));
        assert_eq!(vitals.cooldown(SkillKind::Attack), u8::MAX);

        vitals.sub_cooldown(SkillKind::Attack, 5);
        vitals.sub_cooldown(SkillKind::Attack, 250);
        assert_eq!(vitals, Vitals::new(3));
    }

    #[test]
    fn test_tick_expires_temporary_effects() {
        let mut vitals = Vitals::new(2);
        vitals.add_effect(Effect::Shielded);
        vitals.add_effect(Effect::Poisoned);
        vitals.add_cooldown(SkillKind::Move, 1);
        vitals.tick();
        assert_eq!(vitals.effects, vec![Effect::Poisoned]);
        assert!(vitals.cooldowns.is_empty());
    }

    #[test]
    fn test_effect_set_semantics() {
        let mut vitals = Vitals::new(1);
        assert!(vitals.add_effect(Effect::Stunned));
        assert!(!vitals.add_effect(Effect::Stunned));
        assert!(vitals.remove_effect(Effect::Stunned));
        assert!(!vitals.remove_effect(Effect::Stunned));
    }

    #[test]
    fn test_plant_cycle() {
        assert_eq!(PlantKind::Bush.grown(), Some(PlantKind::Berry));
        assert_eq!(PlantKind::Berry.harvested(), Some(PlantKind::Bush));
        assert_eq!(PlantKind::Peach.harvested(), Some(PlantKind::Tree));
        assert_eq!(PlantKind::Grave.grown(), None);
    }

    #[test]
    fn test_occupant_json_shape() {
        let troop = Occupant::from(Troop::new(TroopKind::Archer, 2));
        let json = serde_json::to_string(&troop).unwrap();
        assert_eq!(json, r#"{"Troop":{"kind":3,"hp":2,"effects":[],"cooldowns":[]}}"#);
        let back: Occupant = serde_json::from_str(&json).unwrap();
        assert_eq!(back, troop);
    }
}
