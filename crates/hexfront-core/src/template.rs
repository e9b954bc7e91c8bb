//! Map templates: the persisted form of a starting position.
//!
//! A template stores terrain and owner per storage slot (phantom columns
//! included, and ignored), the entities standing on the map, and the
//! resources of the regions that have any. Region membership is not stored;
//! it is rebuilt by enumeration when the template is constructed.

use serde::{Deserialize, Serialize};
use std::collections::HashSet;

use crate::entity::{Build, Occupant, Plant, Troop};
use crate::hex::{GridSize, HexCoord};
use crate::map::Map;
use crate::region::RegionRes;
use crate::tile::{Team, Terrain, TileBase};

/// An entity together with where it stands
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Placed<T> {
    pub pos: HexCoord,
    #[serde(flatten)]
    pub entity: T,
}

impl<T> From<(HexCoord, T)> for Placed<T> {
    fn from((pos, entity): (HexCoord, T)) -> Self {
        Self { pos, entity }
    }
}

/// Resources of the region containing `pos`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegionSeed {
    pub pos: HexCoord,
    pub res: RegionRes,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Template {
    pub size: GridSize,
    /// Row-major, `size.width * size.height` entries
    pub tiles: Vec<TileBase>,
    #[serde(default)]
    pub troops: Vec<Placed<Troop>>,
    #[serde(default)]
    pub builds: Vec<Placed<Build>>,
    #[serde(default)]
    pub plants: Vec<Placed<Plant>>,
    #[serde(default)]
    pub regions: Vec<RegionSeed>,
}

impl Template {
    /// A template of void tiles
    pub fn new(size: GridSize) -> Self {
        Self::filled(size, Terrain::Void, Team::Unclaimed)
    }

    /// A template with every tile set to the same terrain and owner
    pub fn filled(size: GridSize, terrain: Terrain, team: Team) -> Self {
        Self {
            size,
            tiles: vec![TileBase { terrain, team }; size.area()],
            ..Self::default()
        }
    }

    /// Terrain and owner at `pos`, if it is a playable tile
    pub fn tile(&self, pos: HexCoord) -> Option<TileBase> {
        self.tiles.get(self.slot(pos)?).copied()
    }

    /// Set terrain and owner at `pos`. Returns false outside the grid.
    pub fn paint(&mut self, pos: HexCoord, terrain: Terrain, team: Team) -> bool {
        match self.slot(pos).and_then(|slot| self.tiles.get_mut(slot)) {
            Some(tile) => {
                *tile = TileBase { terrain, team };
                true
            }
            None => false,
        }
    }

    /// Capture the current state of a map
    pub fn generate(map: &Map) -> Self {
        let size = map.size();
        let mut template = Self::new(size);
        let mut seen = HashSet::new();

        for (pos, tile) in map.grid().iter() {
            template.paint(pos, tile.terrain, tile.team);
            match &tile.occupant {
                Some(Occupant::Troop(troop)) => template.troops.push((pos, troop.clone()).into()),
                Some(Occupant::Build(build)) => template.builds.push((pos, build.clone()).into()),
                Some(Occupant::Plant(plant)) => template.plants.push((pos, plant.clone()).into()),
                None => {}
            }

            let Some(id) = tile.region() else {
                continue;
            };
            if !seen.insert(id) {
                continue;
            }
            if let Some(region) = map.regions().get(id).filter(|r| r.res != RegionRes::default()) {
                template.regions.push(RegionSeed {
                    pos,
                    res: region.res,
                });
            }
        }
        template
    }

    /// Replace the contents of `map` with this template.
    ///
    /// Entities outside the grid or on non-solid tiles are skipped, as are
    /// region seeds that do not land on a region. The map keeps its rules.
    pub fn construct(&self, map: &mut Map) {
        map.reset(self.size);
        for y in 0..self.size.height {
            for x in 0..self.size.width {
                let pos = HexCoord::new(x, y);
                if let Some(base) = self.tile(pos) {
                    map.paint(pos, base.terrain, base.team);
                }
            }
        }
        map.enumerate_regions();

        let entities = self
            .troops
            .iter()
            .map(|p| (p.pos, Occupant::from(p.entity.clone())))
            .chain(self.builds.iter().map(|p| (p.pos, Occupant::from(p.entity.clone()))))
            .chain(self.plants.iter().map(|p| (p.pos, Occupant::from(p.entity.clone()))));
        for (pos, occupant) in entities {
            if map.tile(pos).map_or(false, |t| t.is_solid()) {
                map.set_occupant(pos, Some(occupant));
            }
        }

        for seed in &self.regions {
            if let Some(region) = map.region_at_mut(seed.pos) {
                region.res = seed.res;
            }
        }
    }

    fn slot(&self, pos: HexCoord) -> Option<usize> {
        self.size
            .contains(pos)
            .then(|| (pos.y * self.size.width + pos.x) as usize)
    }
}
