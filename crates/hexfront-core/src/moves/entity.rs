//! Moves that place, remove or tag a single entity, and tile repaints.

use serde::{Deserialize, Serialize};

use super::Ownership;
use crate::entity::{Effect, Occupant};
use crate::hex::HexCoord;
use crate::map::Map;
use crate::tile::{Team, Terrain};

/// Put an entity on a tile, paid for by the tile's region
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntityPlace {
    pub pos: HexCoord,
    pub entity: Occupant,
    #[serde(default)]
    cost: i32,
    #[serde(default)]
    replaced: Option<Occupant>,
}

impl EntityPlace {
    pub fn new(pos: HexCoord, entity: impl Into<Occupant>) -> Self {
        Self {
            pos,
            entity: entity.into(),
            cost: 0,
            replaced: None,
        }
    }

    /// Price charged by the last apply
    pub fn cost(&self) -> i32 {
        self.cost
    }

    pub(super) fn apply(&mut self, map: &mut Map) -> bool {
        if !map.tile(self.pos).map_or(false, |t| t.is_solid()) {
            return false;
        }
        self.cost = map
            .region_at(self.pos)
            .map_or(0, |r| map.rules().cost(&self.entity, r.farms));
        self.replaced = map.set_occupant(self.pos, Some(self.entity.clone()));
        if let Some(region) = map.region_at_mut(self.pos) {
            region.res.money -= self.cost;
        }
        true
    }

    pub(super) fn revert(&mut self, map: &mut Map) {
        if let Some(region) = map.region_at_mut(self.pos) {
            region.res.money += self.cost;
        }
        map.set_occupant(self.pos, self.replaced.take());
    }
}

/// Remove whatever stands on a tile
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntityWithdraw {
    pub pos: HexCoord,
    #[serde(default)]
    withdrawn: Option<Occupant>,
}

impl EntityWithdraw {
    pub fn new(pos: HexCoord) -> Self {
        Self {
            pos,
            withdrawn: None,
        }
    }

    pub(super) fn apply(&mut self, map: &mut Map) -> bool {
        if map.occupant(self.pos).is_none() {
            return false;
        }
        self.withdrawn = map.take_occupant(self.pos);
        true
    }

    pub(super) fn revert(&mut self, map: &mut Map) {
        if let Some(occupant) = self.withdrawn.take() {
            map.set_occupant(self.pos, Some(occupant));
        }
    }
}

/// Give a status effect to one entity
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntityEffect {
    pub pos: HexCoord,
    pub effect: Effect,
    #[serde(default)]
    had: bool,
}

impl EntityEffect {
    pub fn new(pos: HexCoord, effect: Effect) -> Self {
        Self {
            pos,
            effect,
            had: false,
        }
    }

    pub(super) fn apply(&mut self, map: &mut Map) -> bool {
        let Some(occupant) = map.occupant_mut(self.pos) else {
            return false;
        };
        self.had = !occupant.vitals_mut().add_effect(self.effect);
        true
    }

    pub(super) fn revert(&mut self, map: &mut Map) {
        if self.had {
            return;
        }
        if let Some(occupant) = map.occupant_mut(self.pos) {
            occupant.vitals_mut().remove_effect(self.effect);
        }
    }
}

/// Change a tile's terrain and owner, as the map editor does.
///
/// Regions around the tile are merged and split to match. A tile that stops
/// being solid loses its occupant.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TileRepaint {
    pub pos: HexCoord,
    pub terrain: Terrain,
    pub team: Team,
    #[serde(default)]
    previous: Option<Ownership>,
    #[serde(default)]
    dropped: Option<Occupant>,
}

impl TileRepaint {
    pub fn new(pos: HexCoord, terrain: Terrain, team: Team) -> Self {
        Self {
            pos,
            terrain,
            team,
            previous: None,
            dropped: None,
        }
    }

    pub(super) fn apply(&mut self, map: &mut Map) -> bool {
        let Some(tile) = map.tile(self.pos) else {
            return false;
        };
        if tile.terrain == self.terrain && tile.team == self.team {
            return false;
        }
        self.dropped = if self.terrain.is_solid() {
            None
        } else {
            map.take_occupant(self.pos)
        };
        self.previous = Ownership::take(map, self.pos, self.terrain, self.team, None);
        true
    }

    pub(super) fn revert(&mut self, map: &mut Map) {
        if let Some(previous) = self.previous.take() {
            previous.restore(map, self.pos);
        }
        if let Some(occupant) = self.dropped.take() {
            map.set_occupant(self.pos, Some(occupant));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entity::{BuildKind, TroopKind};
    use crate::hex::GridSize;
    use crate::moves::Move;
    use crate::region::RegionRes;
    use crate::template::{RegionSeed, Template};

    fn red_map() -> Map {
        let mut template = Template::filled(GridSize::new(4, 4), Terrain::Ground, Team::Red);
        template.regions.push(RegionSeed {
            pos: HexCoord::new(0, 0),
            res: RegionRes::money(100),
        });
        let mut map = Map::default();
        template.construct(&mut map);
        map
    }

    #[test]
    fn test_place_charges_and_refunds() {
        let mut map = red_map();
        let before = map.snapshot();
        let pos = HexCoord::new(1, 1);
        let farm = map.rules().build(BuildKind::Farm);
        let mut mv = Move::new(EntityPlace::new(pos, farm));

        assert!(mv.apply(&mut map));
        let region = map.region_at(pos).unwrap();
        assert_eq!(region.res.money, 88);
        assert_eq!(region.farms, 1);

        // A second farm costs more.
        let farm = map.rules().build(BuildKind::Farm);
        let mut second = EntityPlace::new(HexCoord::new(2, 2), farm);
        assert!(second.apply(&mut map));
        assert_eq!(second.cost(), 14);
        second.revert(&mut map);

        mv.revert(&mut map);
        assert_eq!(map.snapshot(), before);
    }

    #[test]
    fn test_place_on_water_is_noop() {
        let mut map = red_map();
        let pos = HexCoord::new(0, 0);
        assert!(Move::new(TileRepaint::new(pos, Terrain::Water, Team::Unclaimed)).apply(&mut map));
        let troop = map.rules().troop(TroopKind::Farmer);
        let before = map.snapshot();
        assert!(!Move::new(EntityPlace::new(pos, troop)).apply(&mut map));
        assert_eq!(map.snapshot(), before);
    }

    #[test]
    fn test_withdraw_round_trip() {
        let mut map = red_map();
        let pos = HexCoord::new(2, 0);
        let troop = map.rules().troop(TroopKind::Knight);
        EntityPlace::new(pos, troop).apply(&mut map);
        let before = map.snapshot();

        let mut mv = EntityWithdraw::new(pos);
        assert!(mv.apply(&mut map));
        assert!(map.occupant(pos).is_none());
        mv.revert(&mut map);
        assert_eq!(map.snapshot(), before);

        assert!(!EntityWithdraw::new(HexCoord::new(0, 2)).apply(&mut map));
    }

    #[test]
    fn test_effect_keeps_existing() {
        let mut map = red_map();
        let pos = HexCoord::new(2, 0);
        let mut troop = map.rules().troop(TroopKind::Baron);
        troop.vitals.add_effect(Effect::Stunned);
        EntityPlace::new(pos, troop).apply(&mut map);

        let mut mv = EntityEffect::new(pos, Effect::Stunned);
        assert!(mv.apply(&mut map));
        mv.revert(&mut map);
        assert!(map.occupant(pos).unwrap().vitals().has_effect(Effect::Stunned));
    }

    #[test]
    fn test_repaint_corner_and_undo() {
        let mut map = red_map();
        let before = map.snapshot();
        let corner = HexCoord::new(0, 0);

        let mut mv = TileRepaint::new(corner, Terrain::Ground, Team::Blue);
        assert!(mv.apply(&mut map));
        let mut sizes: Vec<i32> = map.regions().iter().map(|(_, r)| r.tiles).collect();
        sizes.sort();
        assert_eq!(sizes, vec![1, 13]);

        mv.revert(&mut map);
        assert_eq!(map.snapshot(), before);
        assert_eq!(map.region_at(corner).unwrap().res.money, 100);
    }

    #[test]
    fn test_repaint_to_same_is_noop() {
        let mut map = red_map();
        let mut mv = TileRepaint::new(HexCoord::new(1, 0), Terrain::Ground, Team::Red);
        assert!(!mv.apply(&mut map));
    }

    #[test]
    fn test_repaint_to_water_drops_occupant() {
        let mut map = red_map();
        let pos = HexCoord::new(1, 2);
        let troop = map.rules().troop(TroopKind::Archer);
        EntityPlace::new(pos, troop).apply(&mut map);
        let before = map.snapshot();

        let mut mv = TileRepaint::new(pos, Terrain::Water, Team::Unclaimed);
        assert!(mv.apply(&mut map));
        assert!(map.occupant(pos).is_none());
        assert!(map.audit_regions().is_empty());

        mv.revert(&mut map);
        assert_eq!(map.snapshot(), before);
    }
}
