//! Moves that reach several tiles through a spread, plus plant cutting.

use serde::{Deserialize, Serialize};

use crate::entity::{Effect, Occupant, Plant, PlantKind};
use crate::hex::HexCoord;
use crate::map::Map;
use crate::region::RegionRes;
use crate::spread::Spread;
use crate::tile::Team;

/// Heal wounded troops of `team` around `mid`, paid in berries by the
/// region at `mid`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TroopHeal {
    pub mid: HexCoord,
    pub radius: usize,
    pub heal: i32,
    pub team: Team,
    /// Healed positions with their hit points before
    #[serde(default)]
    healed: Vec<(HexCoord, i32)>,
    #[serde(default)]
    cost: i32,
}

impl TroopHeal {
    pub fn new(mid: HexCoord, radius: usize, heal: i32, team: Team) -> Self {
        Self {
            mid,
            radius,
            heal,
            team,
            healed: Vec::new(),
            cost: 0,
        }
    }

    /// Berries charged by the last apply
    pub fn cost(&self) -> i32 {
        self.cost
    }

    /// Berries a heal of `heal` around `mid` would cost, and how many troops
    /// it would reach
    pub fn quote(map: &Map, mid: HexCoord, radius: usize, heal: i32, team: Team) -> (i32, usize) {
        let wounded = wounded(map, mid, radius, team);
        let cost = wounded
            .iter()
            .map(|&(_, hp, max)| (max - hp).min(heal) * map.rules().berry_per_hp)
            .sum();
        (cost, wounded.len())
    }

    pub(super) fn apply(&mut self, map: &mut Map) -> bool {
        if map.region_at(self.mid).is_none() {
            return false;
        }
        let wounded = wounded(map, self.mid, self.radius, self.team);
        if wounded.is_empty() {
            return false;
        }
        let berry_per_hp = map.rules().berry_per_hp;

        self.cost = 0;
        self.healed.clear();
        for (pos, hp, max) in wounded {
            if let Some(occupant) = map.occupant_mut(pos) {
                occupant.vitals_mut().hp = (hp + self.heal).min(max);
                self.cost += (max - hp).min(self.heal) * berry_per_hp;
                self.healed.push((pos, hp));
            }
        }
        if let Some(region) = map.region_at_mut(self.mid) {
            region.res.berry -= self.cost;
        }
        true
    }

    pub(super) fn revert(&mut self, map: &mut Map) {
        for (pos, hp) in self.healed.drain(..) {
            if let Some(occupant) = map.occupant_mut(pos) {
                occupant.vitals_mut().hp = hp;
            }
        }
        if let Some(region) = map.region_at_mut(self.mid) {
            region.res.berry += self.cost;
        }
    }
}

/// Troops of `team` below full health around `mid`: position, hp, max hp
fn wounded(map: &Map, mid: HexCoord, radius: usize, team: Team) -> Vec<(HexCoord, i32, i32)> {
    let rules = map.rules();
    let positions = Spread::new()
        .hop(|r| r.tile.is_solid())
        .pass(|r| {
            r.tile.team == team
                && r.tile
                    .occupant
                    .as_ref()
                    .and_then(Occupant::as_troop)
                    .map_or(false, |t| t.vitals.hp < rules.troop_hp[t.kind.index()])
        })
        .affect_origin(true)
        .probe(map.grid(), mid, radius);

    positions
        .into_iter()
        .filter_map(|pos| {
            let occupant = map.occupant(pos)?;
            Some((pos, occupant.vitals().hp, rules.max_hp(occupant)))
        })
        .collect()
}

/// Give an effect to every enemy troop around `mid`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RadiusEffect {
    pub mid: HexCoord,
    pub radius: usize,
    pub effect: Effect,
    /// Team casting the effect; its own troops are spared
    pub team: Team,
    #[serde(default)]
    affected: Vec<(HexCoord, bool)>,
}

impl RadiusEffect {
    pub fn new(mid: HexCoord, radius: usize, effect: Effect, team: Team) -> Self {
        Self {
            mid,
            radius,
            effect,
            team,
            affected: Vec::new(),
        }
    }

    pub(super) fn apply(&mut self, map: &mut Map) -> bool {
        let team = self.team;
        let targets = Spread::new()
            .pass(|r| {
                r.tile.team != team && r.tile.occupant.as_ref().map_or(false, Occupant::is_troop)
            })
            .probe(map.grid(), self.mid, self.radius);
        if targets.is_empty() {
            return false;
        }

        self.affected.clear();
        for pos in targets {
            if let Some(occupant) = map.occupant_mut(pos) {
                let added = occupant.vitals_mut().add_effect(self.effect);
                self.affected.push((pos, !added));
            }
        }
        true
    }

    pub(super) fn revert(&mut self, map: &mut Map) {
        for (pos, had) in self.affected.drain(..) {
            if had {
                continue;
            }
            if let Some(occupant) = map.occupant_mut(pos) {
                occupant.vitals_mut().remove_effect(self.effect);
            }
        }
    }
}

/// Cut down the plant on `pos`; the region at `from` collects its bonus
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlantCut {
    pub from: HexCoord,
    pub pos: HexCoord,
    #[serde(default)]
    cut: Option<Plant>,
    #[serde(default)]
    bonus: i32,
}

impl PlantCut {
    pub fn new(from: HexCoord, pos: HexCoord) -> Self {
        Self {
            from,
            pos,
            cut: None,
            bonus: 0,
        }
    }

    pub(super) fn apply(&mut self, map: &mut Map) -> bool {
        if map.tile(self.from).is_none() || !map.occupant(self.pos).map_or(false, Occupant::is_plant) {
            return false;
        }
        let Some(Occupant::Plant(plant)) = map.take_occupant(self.pos) else {
            return false;
        };

        self.bonus = map.rules().plant_bonus[plant.kind.index()];
        self.cut = Some(plant);
        if let Some(region) = map.region_at_mut(self.from) {
            region.res.money += self.bonus;
        }
        true
    }

    pub(super) fn revert(&mut self, map: &mut Map) {
        if let Some(region) = map.region_at_mut(self.from) {
            region.res.money -= self.bonus;
        }
        if let Some(plant) = self.cut.take() {
            map.set_occupant(self.pos, Some(plant.into()));
        }
    }
}

/// Harvest every ripe plant around `mid` into the region at `mid`.
///
/// Berries turn back into bushes and peaches back into trees.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlantHarvest {
    pub mid: HexCoord,
    pub radius: usize,
    #[serde(default)]
    harvested: Vec<(HexCoord, Plant)>,
    #[serde(default)]
    gained: RegionRes,
}

impl PlantHarvest {
    pub fn new(mid: HexCoord, radius: usize) -> Self {
        Self {
            mid,
            radius,
            harvested: Vec::new(),
            gained: RegionRes::default(),
        }
    }

    /// Resources collected by the last apply
    pub fn gained(&self) -> RegionRes {
        self.gained
    }

    pub(super) fn apply(&mut self, map: &mut Map) -> bool {
        if map.tile(self.mid).is_none() {
            return false;
        }
        let ripe = Spread::new()
            .pass(|r| {
                r.tile
                    .occupant
                    .as_ref()
                    .and_then(Occupant::as_plant)
                    .map_or(false, |p| p.kind.harvested().is_some())
            })
            .affect_origin(true)
            .probe(map.grid(), self.mid, self.radius);
        if ripe.is_empty() {
            return false;
        }
        let amount = map.rules().harvest_yield;

        self.gained = RegionRes::default();
        self.harvested.clear();
        for pos in ripe {
            let Some(plant) = map.occupant(pos).and_then(Occupant::as_plant).cloned() else {
                continue;
            };
            let Some(kind) = plant.kind.harvested() else {
                continue;
            };
            match plant.kind {
                PlantKind::Berry => self.gained.berry += amount,
                _ => self.gained.peach += amount,
            }
            let remains = Plant {
                kind,
                vitals: plant.vitals.clone(),
            };
            map.set_occupant(pos, Some(remains.into()));
            self.harvested.push((pos, plant));
        }
        if let Some(region) = map.region_at_mut(self.mid) {
            region.res += self.gained;
        }
        true
    }

    pub(super) fn revert(&mut self, map: &mut Map) {
        if let Some(region) = map.region_at_mut(self.mid) {
            region.res -= self.gained;
        }
        for (pos, plant) in self.harvested.drain(..) {
            map.set_occupant(pos, Some(plant.into()));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entity::TroopKind;
    use crate::hex::GridSize;
    use crate::rules::Rules;
    use crate::template::{RegionSeed, Template};
    use crate::tile::Terrain;

    fn red_map(res: RegionRes) -> Map {
        let mut template = Template::filled(GridSize::new(5, 4), Terrain::Ground, Team::Red);
        template.regions.push(RegionSeed {
            pos: HexCoord::new(0, 0),
            res,
        });
        let mut map = Map::default();
        template.construct(&mut map);
        map
    }

    fn wounded_troop(kind: TroopKind, hp: i32) -> Occupant {
        let mut troop = Rules::default().troop(kind);
        troop.vitals.hp = hp;
        troop.into()
    }

    #[test]
    fn test_heal_charges_berries_per_hp() {
        let mut map = red_map(RegionRes::new(0, 30, 0));
        map.set_occupant(HexCoord::new(1, 1), Some(wounded_troop(TroopKind::Spearman, 1)));
        map.set_occupant(HexCoord::new(2, 2), Some(wounded_troop(TroopKind::Knight, 2)));
        map.set_occupant(HexCoord::new(2, 1), Some(wounded_troop(TroopKind::Archer, 2)));
        let before = map.snapshot();

        let (quoted, count) = TroopHeal::quote(&map, HexCoord::new(1, 1), 2, 2, Team::Red);
        assert_eq!((quoted, count), (12, 2));

        let mut heal = TroopHeal::new(HexCoord::new(1, 1), 2, 2, Team::Red);
        assert!(heal.apply(&mut map));
        assert_eq!(heal.cost(), 12);
        assert_eq!(map.occupant(HexCoord::new(1, 1)).unwrap().vitals().hp, 3);
        assert_eq!(map.occupant(HexCoord::new(2, 2)).unwrap().vitals().hp, 4);
        assert_eq!(map.region_at(HexCoord::new(1, 1)).unwrap().res.berry, 18);

        heal.revert(&mut map);
        assert_eq!(map.snapshot(), before);
    }

    #[test]
    fn test_heal_nobody_wounded() {
        let mut map = red_map(RegionRes::new(0, 30, 0));
        map.set_occupant(HexCoord::new(1, 1), Some(Rules::default().troop(TroopKind::Baron).into()));
        assert!(!TroopHeal::new(HexCoord::new(1, 1), 2, 1, Team::Red).apply(&mut map));
    }

    #[test]
    fn test_radius_effect_spares_own_and_keeps_existing() {
        let mut map = red_map(RegionRes::default());
        let mid = HexCoord::new(1, 0);
        map.paint(HexCoord::new(2, 0), Terrain::Ground, Team::Blue);
        map.paint(HexCoord::new(2, 1), Terrain::Ground, Team::Blue);
        map.enumerate_regions();

        map.set_occupant(mid, Some(Rules::default().troop(TroopKind::Archer).into()));
        map.set_occupant(HexCoord::new(2, 0), Some(Rules::default().troop(TroopKind::Farmer).into()));
        let mut stunned = Rules::default().troop(TroopKind::Spearman);
        stunned.vitals.add_effect(Effect::Stunned);
        map.set_occupant(HexCoord::new(2, 1), Some(stunned.into()));
        let before = map.snapshot();

        let mut mv = RadiusEffect::new(mid, 2, Effect::Stunned, Team::Red);
        assert!(mv.apply(&mut map));
        assert!(map.occupant(HexCoord::new(2, 0)).unwrap().vitals().has_effect(Effect::Stunned));
        assert!(!map.occupant(mid).unwrap().vitals().has_effect(Effect::Stunned));

        mv.revert(&mut map);
        assert_eq!(map.snapshot(), before);
        assert!(map.occupant(HexCoord::new(2, 1)).unwrap().vitals().has_effect(Effect::Stunned));
    }

    #[test]
    fn test_cut_credits_bonus() {
        let mut map = red_map(RegionRes::money(5));
        let (from, pos) = (HexCoord::new(0, 0), HexCoord::new(1, 0));
        map.set_occupant(pos, Some(Plant::new(PlantKind::Peach).into()));
        let before = map.snapshot();

        let mut cut = PlantCut::new(from, pos);
        assert!(cut.apply(&mut map));
        assert!(map.occupant(pos).is_none());
        assert_eq!(map.region_at(from).unwrap().res.money, 11);

        cut.revert(&mut map);
        assert_eq!(map.snapshot(), before);
        assert!(!PlantCut::new(from, HexCoord::new(3, 3)).apply(&mut map));
    }

    #[test]
    fn test_harvest_ripe_plants() {
        let mut map = red_map(RegionRes::default());
        let mid = HexCoord::new(2, 2);
        map.set_occupant(HexCoord::new(1, 2), Some(Plant::new(PlantKind::Berry).into()));
        map.set_occupant(HexCoord::new(3, 2), Some(Plant::new(PlantKind::Peach).into()));
        map.set_occupant(HexCoord::new(2, 1), Some(Plant::new(PlantKind::Sapling).into()));
        let before = map.snapshot();

        let mut harvest = PlantHarvest::new(mid, 2);
        assert!(harvest.apply(&mut map));
        assert_eq!(harvest.gained(), RegionRes::new(0, 4, 4));
        let kind = |pos| map.occupant(pos).and_then(Occupant::as_plant).map(|p| p.kind);
        assert_eq!(kind(HexCoord::new(1, 2)), Some(PlantKind::Bush));
        assert_eq!(kind(HexCoord::new(3, 2)), Some(PlantKind::Tree));
        assert_eq!(kind(HexCoord::new(2, 1)), Some(PlantKind::Sapling));
        assert_eq!(map.region_at(mid).unwrap().res, RegionRes::new(0, 4, 4));

        harvest.revert(&mut map);
        assert_eq!(map.snapshot(), before);
    }
}
