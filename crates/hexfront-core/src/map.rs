//! The game map: grid, regions and rules owned together.
//!
//! Collaborators read tiles and regions through shared references only.
//! Every mutation goes through moves (or template loading), which keeps the
//! region counters and back-references consistent.

use serde::Serialize;
use std::collections::HashMap;

use crate::entity::Occupant;
use crate::grid::HexGrid;
use crate::hex::{GridRect, GridSize, HexCoord};
use crate::region::{Region, RegionId, Regions};
use crate::rules::Rules;
use crate::spread::{Spread, UNBOUNDED};
use crate::tile::{Team, Terrain, Tile, TileSummary};

#[derive(Debug, Clone, Default)]
pub struct Map {
    pub(crate) grid: HexGrid,
    pub(crate) regions: Regions,
    pub(crate) rules: Rules,
    turn: u32,
    selection: u32,
}

impl Map {
    pub fn new(size: GridSize, rules: Rules) -> Self {
        Self {
            grid: HexGrid::new(size),
            rules,
            ..Self::default()
        }
    }

    pub fn grid(&self) -> &HexGrid {
        &self.grid
    }

    pub fn regions(&self) -> &Regions {
        &self.regions
    }

    pub fn rules(&self) -> &Rules {
        &self.rules
    }

    pub fn set_rules(&mut self, rules: Rules) {
        self.rules = rules;
        self.recount_regions();
    }

    pub fn size(&self) -> GridSize {
        self.grid.size()
    }

    /// Number of completed turns
    pub fn turn(&self) -> u32 {
        self.turn
    }

    pub(crate) fn set_turn(&mut self, turn: u32) {
        self.turn = turn;
    }

    pub fn tile(&self, pos: HexCoord) -> Option<&Tile> {
        self.grid.at(pos)
    }

    pub fn occupant(&self, pos: HexCoord) -> Option<&Occupant> {
        self.grid.at(pos)?.occupant.as_ref()
    }

    pub fn team(&self, pos: HexCoord) -> Option<Team> {
        Some(self.grid.at(pos)?.team)
    }

    pub fn region_id(&self, pos: HexCoord) -> Option<RegionId> {
        self.grid.at(pos)?.region
    }

    /// Region of the tile at `pos`
    pub fn region_at(&self, pos: HexCoord) -> Option<&Region> {
        self.regions.get(self.region_id(pos)?)
    }

    pub(crate) fn region_at_mut(&mut self, pos: HexCoord) -> Option<&mut Region> {
        let id = self.region_id(pos)?;
        self.regions.get_mut(id)
    }

    /// Mutable occupant access for state that does not affect upkeep
    /// (hit points, effects, cooldowns). Kind changes go through
    /// `set_occupant`.
    pub(crate) fn occupant_mut(&mut self, pos: HexCoord) -> Option<&mut Occupant> {
        self.grid.at_mut(pos)?.occupant.as_mut()
    }

    /// Replace the occupant of a tile and return the previous one.
    ///
    /// The owning region's income and farm count follow the change.
    pub(crate) fn set_occupant(
        &mut self,
        pos: HexCoord,
        occupant: Option<Occupant>,
    ) -> Option<Occupant> {
        let Map {
            grid,
            regions,
            rules,
            ..
        } = self;
        let tile = grid.at_mut(pos)?;
        let (income_before, farms_before) = footprint(rules, tile.occupant.as_ref());
        let previous = std::mem::replace(&mut tile.occupant, occupant);
        let (income_after, farms_after) = footprint(rules, tile.occupant.as_ref());

        if let Some(region) = tile.region.and_then(|id| regions.get_mut(id)) {
            region.income += income_after - income_before;
            region.farms += farms_after - farms_before;
        }
        previous
    }

    pub(crate) fn take_occupant(&mut self, pos: HexCoord) -> Option<Occupant> {
        self.set_occupant(pos, None)
    }

    /// Drop everything and start over with a blank grid
    pub fn reset(&mut self, size: GridSize) {
        self.grid.empty(size);
        self.regions.clear();
        self.turn = 0;
        self.selection = 0;
    }

    /// Resize the grid relative to its current bounds and rebuild regions.
    ///
    /// Regions cut by the new bounds keep their resources in whichever
    /// piece contains their first remaining tile.
    pub fn resize(&mut self, rect: GridRect) {
        self.grid.resize(rect);
        self.enumerate_regions_keeping_res();
    }

    /// Highlight the tiles a spread reaches with a fresh selection index
    pub fn select(&mut self, spread: Spread<'_>, origin: HexCoord, radius: usize) -> Vec<HexCoord> {
        self.selection += 1;
        let index = self.selection;
        spread
            .effect(move |tile, _| tile.selected = index)
            .apply_list(&mut self.grid, origin, radius)
    }

    /// Index stamped by the most recent selection
    pub fn selection(&self) -> u32 {
        self.selection
    }

    pub fn is_selected(&self, pos: HexCoord) -> bool {
        self.selection > 0 && self.grid.at(pos).map_or(false, |t| t.selected == self.selection)
    }

    /// Renderer view of a sub-area
    pub fn view(&self, rect: GridRect) -> Vec<(HexCoord, TileSummary)> {
        self.grid
            .area(rect)
            .map(|(pos, tile)| (pos, tile.summary()))
            .collect()
    }

    /// First tile of a region in row-major order
    pub fn seed_of(&self, id: RegionId) -> Option<HexCoord> {
        self.grid
            .iter()
            .find(|(_, tile)| tile.region == Some(id))
            .map(|(pos, _)| pos)
    }

    /// Content-only view of the whole map.
    ///
    /// Region ids are replaced by first-appearance order, so two maps that
    /// went through different region allocations still compare equal when
    /// their tiles and region records match.
    pub fn snapshot(&self) -> MapSnapshot {
        let mut order: HashMap<RegionId, usize> = HashMap::new();
        let mut regions = Vec::new();
        let tiles = self
            .grid
            .iter()
            .map(|(pos, tile)| {
                let region = tile.region.map(|id| {
                    *order.entry(id).or_insert_with(|| {
                        regions.push(self.regions.get(id).cloned().unwrap_or_default());
                        regions.len() - 1
                    })
                });
                TileSnapshot {
                    pos,
                    terrain: tile.terrain,
                    team: tile.team,
                    occupant: tile.occupant.clone(),
                    region,
                }
            })
            .collect();
        MapSnapshot {
            size: self.size(),
            turn: self.turn,
            tiles,
            regions,
        }
    }

    /// Positions that break the region bookkeeping; empty when consistent.
    ///
    /// Checks that every solid tile has a live region of its own team, that
    /// no two adjacent same-team solid tiles disagree on their region, that
    /// every region is one connected piece, and that the derived counters
    /// match the member tiles.
    pub fn audit_regions(&self) -> Vec<HexCoord> {
        let mut faults = Vec::new();
        let mut counted: HashMap<RegionId, (HexCoord, i32, i32, i32)> = HashMap::new();

        for (pos, tile) in self.grid.iter() {
            if !tile.is_solid() {
                if tile.region.is_some() {
                    faults.push(pos);
                }
                continue;
            }
            let Some(id) = tile.region else {
                faults.push(pos);
                continue;
            };
            match self.regions.get(id) {
                Some(region) if region.team == tile.team => {}
                _ => {
                    faults.push(pos);
                    continue;
                }
            }
            let disagrees = pos
                .neighbors()
                .into_iter()
                .filter_map(|n| self.grid.at(n))
                .any(|n| n.is_solid() && n.team == tile.team && n.region != Some(id));
            if disagrees {
                faults.push(pos);
            }

            let (income, farms) = footprint(&self.rules, tile.occupant.as_ref());
            let entry = counted.entry(id).or_insert((pos, 0, 0, 0));
            entry.1 += 1;
            entry.2 += income;
            entry.3 += farms;
        }

        for (id, region) in self.regions.iter() {
            let Some(&(seed, tiles, income, farms)) = counted.get(&id) else {
                // A live region without tiles should have been freed.
                faults.push(HexCoord::new(-1, -1));
                continue;
            };
            let connected = Spread::new()
                .hop(|r| r.tile.region == Some(id))
                .affect_origin(true)
                .probe(&self.grid, seed, UNBOUNDED)
                .len() as i32;
            if connected != tiles
                || region.tiles != tiles
                || region.income != income
                || region.farms != farms
            {
                faults.push(seed);
            }
        }
        faults
    }

    pub(crate) fn grid_mut(&mut self) -> &mut HexGrid {
        &mut self.grid
    }

    /// Paint terrain and team without touching regions
    pub(crate) fn paint(&mut self, pos: HexCoord, terrain: Terrain, team: Team) {
        if let Some(tile) = self.grid.at_mut(pos) {
            tile.terrain = terrain;
            tile.team = team;
        }
    }
}

/// Income and farm count a tile contributes to its region
pub(crate) fn footprint(rules: &Rules, occupant: Option<&Occupant>) -> (i32, i32) {
    let farms = i32::from(occupant.map_or(false, Occupant::is_farm));
    (rules.tile_income(occupant), farms)
}

/// One tile of a `MapSnapshot`
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TileSnapshot {
    pub pos: HexCoord,
    pub terrain: Terrain,
    pub team: Team,
    pub occupant: Option<Occupant>,
    /// Index into `MapSnapshot::regions`
    pub region: Option<usize>,
}

/// Comparable copy of a map's game state
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MapSnapshot {
    pub size: GridSize,
    pub turn: u32,
    pub tiles: Vec<TileSnapshot>,
    pub regions: Vec<Region>,
}

impl MapSnapshot {
    /// Region record of the tile at `pos`
    pub fn region_at(&self, pos: HexCoord) -> Option<&Region> {
        let tile = self.tiles.iter().find(|t| t.pos == pos)?;
        self.regions.get(tile.region?)
    }
}
