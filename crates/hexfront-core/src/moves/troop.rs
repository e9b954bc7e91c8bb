//! Troop actions: attacking, moving and merging.

use serde::{Deserialize, Serialize};

use super::Ownership;
use crate::entity::{Effect, Occupant, Plant, PlantKind, Troop, Vitals};
use crate::hex::HexCoord;
use crate::map::Map;
use crate::skill::SkillKind;

/// Damage the entity on `dest` with the troop on `from`.
///
/// The attack uses up the attacker's range boost. An enchanted attacker
/// poisons the target and loses the enchantment. A troop reduced to zero
/// hit points leaves a grave; anything else is removed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TroopAttack {
    pub from: HexCoord,
    pub dest: HexCoord,
    #[serde(default)]
    target: Option<Occupant>,
    #[serde(default)]
    attacker_effects: Vec<Effect>,
    #[serde(default)]
    damage: i32,
}

impl TroopAttack {
    pub fn new(from: HexCoord, dest: HexCoord) -> Self {
        Self {
            from,
            dest,
            target: None,
            attacker_effects: Vec::new(),
            damage: 0,
        }
    }

    /// Damage dealt by the last apply
    pub fn damage(&self) -> i32 {
        self.damage
    }

    pub(super) fn apply(&mut self, map: &mut Map) -> bool {
        if self.from == self.dest {
            return false;
        }
        let (Some(attacker), Some(target)) = (map.occupant(self.from), map.occupant(self.dest))
        else {
            return false;
        };
        if !attacker.is_troop() {
            return false;
        }
        let damage = map.rules().damage(attacker, target);
        let enchanted = attacker.vitals().has_effect(Effect::Enchant);
        let mut hit = target.clone();
        self.attacker_effects = attacker.vitals().effects.clone();
        self.target = Some(target.clone());
        self.damage = damage;

        if let Some(attacker) = map.occupant_mut(self.from) {
            let vitals = attacker.vitals_mut();
            vitals.remove_effect(Effect::RangeBoost);
            vitals.remove_effect(Effect::Enchant);
        }

        hit.vitals_mut().hp -= damage;
        if enchanted {
            hit.vitals_mut().add_effect(Effect::Poisoned);
        }
        let remains = if hit.vitals().hp > 0 {
            Some(hit)
        } else if hit.is_troop() {
            Some(Plant::new(PlantKind::Grave).into())
        } else {
            None
        };
        map.set_occupant(self.dest, remains);
        true
    }

    pub(super) fn revert(&mut self, map: &mut Map) {
        if let Some(target) = self.target.take() {
            map.set_occupant(self.dest, Some(target));
        }
        if let Some(attacker) = map.occupant_mut(self.from) {
            attacker.vitals_mut().effects = std::mem::take(&mut self.attacker_effects);
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
struct Displaced {
    occupant: Option<Occupant>,
    ownership: Option<Ownership>,
}

/// Move a troop to another tile.
///
/// Whatever stood on the destination is removed. If the destination belongs
/// to another team it is captured: it joins the mover's region and any other
/// regions of that team around it merge in.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TroopMove {
    pub from: HexCoord,
    pub dest: HexCoord,
    #[serde(default)]
    displaced: Option<Displaced>,
}

impl TroopMove {
    pub fn new(from: HexCoord, dest: HexCoord) -> Self {
        Self {
            from,
            dest,
            displaced: None,
        }
    }

    pub(super) fn apply(&mut self, map: &mut Map) -> bool {
        if self.from == self.dest || !map.occupant(self.from).map_or(false, Occupant::is_troop) {
            return false;
        }
        let (Some(team), Some(tile)) = (map.team(self.from), map.tile(self.dest)) else {
            return false;
        };
        if !tile.is_solid() {
            return false;
        }
        let (terrain, captured) = (tile.terrain, tile.team != team);
        let home = map.region_id(self.from);

        let occupant = map.take_occupant(self.dest);
        let ownership = if captured {
            Ownership::take(map, self.dest, terrain, team, home)
        } else {
            None
        };
        let troop = map.take_occupant(self.from);
        map.set_occupant(self.dest, troop);

        self.displaced = Some(Displaced {
            occupant,
            ownership,
        });
        true
    }

    pub(super) fn revert(&mut self, map: &mut Map) {
        let Some(displaced) = self.displaced.take() else {
            return;
        };
        let troop = map.take_occupant(self.dest);
        map.set_occupant(self.from, troop);
        if let Some(ownership) = displaced.ownership {
            ownership.restore(map, self.dest);
        }
        map.set_occupant(self.dest, displaced.occupant);
    }
}

/// Combine two troops into one of a higher rank.
///
/// The troop on `from` joins the one on `dest`. The result has the combined
/// hit points plus one (capped at its rank's maximum), keeps the target's
/// effects, and cannot be withdrawn for a turn.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TroopMerge {
    pub from: HexCoord,
    pub dest: HexCoord,
    #[serde(default)]
    merged: Option<(Troop, Troop)>,
}

impl TroopMerge {
    pub fn new(from: HexCoord, dest: HexCoord) -> Self {
        Self {
            from,
            dest,
            merged: None,
        }
    }

    pub(super) fn apply(&mut self, map: &mut Map) -> bool {
        if self.from == self.dest {
            return false;
        }
        let (Some(mover), Some(target)) = (
            map.occupant(self.from).and_then(Occupant::as_troop),
            map.occupant(self.dest).and_then(Occupant::as_troop),
        ) else {
            return false;
        };
        let Some(kind) = map.rules().merge(mover.kind, target.kind) else {
            return false;
        };
        let max_hp = map.rules().troop_hp[kind.index()];
        let mut vitals = Vitals {
            hp: (mover.vitals.hp + target.vitals.hp + 1).min(max_hp),
            effects: target.vitals.effects.clone(),
            cooldowns: Vec::new(),
        };
        vitals.add_cooldown(SkillKind::Withdraw, 1);
        let captured = (mover.clone(), target.clone());

        map.set_occupant(self.dest, Some(Troop { kind, vitals }.into()));
        map.take_occupant(self.from);
        self.merged = Some(captured);
        true
    }

    pub(super) fn revert(&mut self, map: &mut Map) {
        if let Some((mover, target)) = self.merged.take() {
            map.set_occupant(self.from, Some(mover.into()));
            map.set_occupant(self.dest, Some(target.into()));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entity::TroopKind;
    use crate::hex::GridSize;
    use crate::region::RegionRes;
    use crate::rules::Rules;
    use crate::template::{RegionSeed, Template};
    use crate::tile::{Team, Terrain};

    /// 5x3 map: columns 0-1 red, columns 2-4 blue.
    fn front() -> Map {
        let mut template = Template::filled(GridSize::new(5, 3), Terrain::Ground, Team::Red);
        for y in 0..3 {
            for x in 2..5 {
                template.paint(HexCoord::new(x, y), Terrain::Ground, Team::Blue);
            }
        }
        template.regions.push(RegionSeed {
            pos: HexCoord::new(0, 0),
            res: RegionRes::money(40),
        });
        template.regions.push(RegionSeed {
            pos: HexCoord::new(4, 0),
            res: RegionRes::money(60),
        });
        let mut map = Map::default();
        template.construct(&mut map);
        map
    }

    fn place(map: &mut Map, pos: HexCoord, troop: Troop) {
        map.set_occupant(pos, Some(troop.into()));
    }

    #[test]
    fn test_attack_kills_into_grave() {
        let mut map = front();
        let rules = Rules::default();
        let (from, dest) = (HexCoord::new(1, 0), HexCoord::new(2, 0));
        place(&mut map, from, rules.troop(TroopKind::Knight));
        place(&mut map, dest, rules.troop(TroopKind::Spearman));
        let before = map.snapshot();

        let mut attack = TroopAttack::new(from, dest);
        assert!(attack.apply(&mut map));
        assert_eq!(attack.damage(), 4);
        let remains = map.occupant(dest).unwrap().as_plant().unwrap();
        assert_eq!(remains.kind, PlantKind::Grave);

        attack.revert(&mut map);
        assert_eq!(map.snapshot(), before);
    }

    #[test]
    fn test_attack_consumes_boost_and_poisons() {
        let mut map = front();
        let rules = Rules::default();
        let (from, dest) = (HexCoord::new(0, 1), HexCoord::new(2, 1));
        let mut archer = rules.troop(TroopKind::Archer);
        archer.vitals.add_effect(Effect::RangeBoost);
        archer.vitals.add_effect(Effect::Enchant);
        place(&mut map, from, archer);
        place(&mut map, dest, rules.troop(TroopKind::Knight));
        let before = map.snapshot();

        let mut attack = TroopAttack::new(from, dest);
        assert!(attack.apply(&mut map));
        assert!(map.occupant(from).unwrap().vitals().effects.is_empty());
        let target = map.occupant(dest).unwrap().vitals();
        assert_eq!(target.hp, 5);
        assert!(target.has_effect(Effect::Poisoned));

        attack.revert(&mut map);
        assert_eq!(map.snapshot(), before);
    }

    #[test]
    fn test_attack_without_target_is_noop() {
        let mut map = front();
        place(&mut map, HexCoord::new(1, 0), Rules::default().troop(TroopKind::Knight));
        let mut attack = TroopAttack::new(HexCoord::new(1, 0), HexCoord::new(2, 0));
        assert!(!attack.apply(&mut map));
    }

    #[test]
    fn test_move_captures_and_restores() {
        let mut map = front();
        let (from, dest) = (HexCoord::new(1, 1), HexCoord::new(2, 1));
        place(&mut map, from, Rules::default().troop(TroopKind::Spearman));
        place(&mut map, dest, Rules::default().troop(TroopKind::Farmer));
        let before = map.snapshot();

        let mut mv = TroopMove::new(from, dest);
        assert!(mv.apply(&mut map));
        assert_eq!(map.team(dest), Some(Team::Red));
        assert_eq!(
            map.occupant(dest).unwrap().as_troop().unwrap().kind,
            TroopKind::Spearman
        );
        assert!(map.occupant(from).is_none());
        assert_eq!(map.region_at(dest).unwrap().res.money, 40);
        assert!(map.audit_regions().is_empty());

        mv.revert(&mut map);
        assert_eq!(map.snapshot(), before);
    }

    #[test]
    fn test_move_within_region_keeps_owner() {
        let mut map = front();
        let (from, dest) = (HexCoord::new(0, 0), HexCoord::new(1, 0));
        place(&mut map, from, Rules::default().troop(TroopKind::Farmer));
        let regions = map.regions().len();

        let mut mv = TroopMove::new(from, dest);
        assert!(mv.apply(&mut map));
        assert_eq!(map.regions().len(), regions);
        assert_eq!(map.team(dest), Some(Team::Red));
    }

    #[test]
    fn test_move_capture_joins_own_regions() {
        // A blue corridor along row 1 keeps two red pairs apart.
        let mut template = Template::filled(GridSize::new(3, 3), Terrain::Ground, Team::Red);
        for x in 0..2 {
            template.paint(HexCoord::new(x, 1), Terrain::Ground, Team::Blue);
        }
        template.paint(HexCoord::new(0, 0), Terrain::Ground, Team::Blue);
        template.paint(HexCoord::new(0, 2), Terrain::Ground, Team::Blue);
        template.regions.push(RegionSeed {
            pos: HexCoord::new(0, 0),
            res: RegionRes::money(9),
        });
        let mut map = Map::default();
        template.construct(&mut map);
        let before = map.snapshot();
        let total = map.regions().total();
        assert_eq!(map.regions().len(), 3);

        let (from, dest) = (HexCoord::new(1, 0), HexCoord::new(1, 1));
        place(&mut map, from, Rules::default().troop(TroopKind::Farmer));
        let with_troop = map.snapshot();
        let mut mv = TroopMove::new(from, dest);
        assert!(mv.apply(&mut map));
        assert!(map.audit_regions().is_empty());
        assert_eq!(map.regions().len(), 2);
        assert_eq!(map.regions().total(), total);

        mv.revert(&mut map);
        assert_eq!(map.snapshot(), with_troop);
        map.take_occupant(from);
        assert_eq!(map.snapshot(), before);
    }

    #[test]
    fn test_capture_joins_mover_region() {
        // Row 0: red, red, blue, red, red; the mover comes from the west.
        let mut template = Template::filled(GridSize::new(5, 1), Terrain::Ground, Team::Red);
        template.paint(HexCoord::new(2, 0), Terrain::Ground, Team::Blue);
        template.regions.push(RegionSeed {
            pos: HexCoord::new(0, 0),
            res: RegionRes::money(12),
        });
        template.regions.push(RegionSeed {
            pos: HexCoord::new(4, 0),
            res: RegionRes::money(30),
        });
        let mut map = Map::default();
        template.construct(&mut map);
        let (from, dest) = (HexCoord::new(1, 0), HexCoord::new(2, 0));
        place(&mut map, from, Rules::default().troop(TroopKind::Spearman));
        let west = map.region_id(from).unwrap();
        map.region_at_mut(HexCoord::new(4, 0)).unwrap().dead = true;
        let before = map.snapshot();

        let mut mv = TroopMove::new(from, dest);
        assert!(mv.apply(&mut map));
        assert_eq!(map.region_id(dest), Some(west));
        assert_eq!(map.region_id(HexCoord::new(4, 0)), Some(west));
        let merged = map.region_at(dest).unwrap();
        assert_eq!(merged.res.money, 42);
        assert!(!merged.dead);
        assert!(map.audit_regions().is_empty());

        mv.revert(&mut map);
        assert!(map.region_at(HexCoord::new(4, 0)).unwrap().dead);
        assert_eq!(map.snapshot(), before);
    }

    #[test]
    fn test_merge_ranks_and_caps_hp() {
        let mut map = front();
        let rules = Rules::default();
        let (from, dest) = (HexCoord::new(0, 0), HexCoord::new(1, 0));
        place(&mut map, from, rules.troop(TroopKind::Farmer));
        let mut target = rules.troop(TroopKind::Farmer);
        target.vitals.add_effect(Effect::DefenseBoost);
        place(&mut map, dest, target);
        let before = map.snapshot();

        let mut merge = TroopMerge::new(from, dest);
        assert!(merge.apply(&mut map));
        let merged = map.occupant(dest).unwrap().as_troop().unwrap();
        assert_eq!(merged.kind, TroopKind::Lumberjack);
        assert_eq!(merged.vitals.hp, 2);
        assert!(merged.vitals.has_effect(Effect::DefenseBoost));
        assert_eq!(merged.vitals.cooldown(SkillKind::Withdraw), 1);
        assert!(map.occupant(from).is_none());

        merge.revert(&mut map);
        assert_eq!(map.snapshot(), before);
    }

    #[test]
    fn test_merge_beyond_knight_is_noop() {
        let mut map = front();
        let rules = Rules::default();
        place(&mut map, HexCoord::new(0, 0), rules.troop(TroopKind::Knight));
        place(&mut map, HexCoord::new(1, 0), rules.troop(TroopKind::Farmer));
        let before = map.snapshot();
        assert!(!TroopMerge::new(HexCoord::new(0, 0), HexCoord::new(1, 0)).apply(&mut map));
        assert_eq!(map.snapshot(), before);
    }
}
