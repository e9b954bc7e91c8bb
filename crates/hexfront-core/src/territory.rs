//! Region connectivity: full enumeration plus incremental merge and split.
//!
//! When a tile changes owner, the tile and its six neighbors are the "seams"
//! where regions can meet or come apart:
//! - merging folds every same-team region touching a seam into the tile's
//!   region and records what each absorbed region held;
//! - splitting walks the old region from each seam and peels off every
//!   extra connected piece as a new region.
//!
//! A merge distribution fed back into `split_region` restores the exact
//! prior resources and bankruptcy of every absorbed region, which is what
//! makes ownership changes reversible.

use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};

use crate::hex::HexCoord;
use crate::map::{footprint, Map};
use crate::region::{Region, RegionId, RegionRes, Regions};
use crate::rules::Rules;
use crate::spread::{Spread, UNBOUNDED};
use crate::tile::{Team, Terrain, Tile};

/// Game state a merge took over from one absorbed region
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Share {
    pub res: RegionRes,
    pub dead: bool,
}

impl Share {
    pub fn of(region: &Region) -> Self {
        Self {
            res: region.res,
            dead: region.dead,
        }
    }
}

/// Per-seam shares of the regions absorbed by a merge
pub type Distribution = Vec<Option<Share>>;

/// Move a tile from its current region to `to`, keeping both regions'
/// counters exact. A region left without tiles is freed.
fn attach_tile(tile: &mut Tile, regions: &mut Regions, rules: &Rules, to: Option<RegionId>) {
    if tile.region == to {
        return;
    }
    let (income, farms) = footprint(rules, tile.occupant.as_ref());

    if let Some(old) = tile.region.take() {
        if let Some(region) = regions.get_mut(old) {
            region.tiles -= 1;
            region.income -= income;
            region.farms -= farms;
            if region.tiles <= 0 {
                regions.remove(old);
            }
        }
    }
    if let Some(new) = to {
        if let Some(region) = regions.get_mut(new) {
            region.tiles += 1;
            region.income += income;
            region.farms += farms;
            tile.region = Some(new);
        }
    }
}

fn recorded(prior: &[Option<Share>], seam: usize) -> Option<Share> {
    prior.get(seam).copied().flatten()
}

/// A tile followed by its six neighbors
pub fn seams(pos: HexCoord) -> Vec<HexCoord> {
    std::iter::once(pos).chain(pos.neighbors()).collect()
}

impl Map {
    pub(crate) fn attach(&mut self, pos: HexCoord, to: Option<RegionId>) {
        let Map {
            grid,
            regions,
            rules,
            ..
        } = self;
        if let Some(tile) = grid.at_mut(pos) {
            attach_tile(tile, regions, rules, to);
        }
    }

    /// Rebuild every region from scratch.
    ///
    /// Tiles are scanned in row-major order; each solid tile without a
    /// region seeds a new one that floods over same-team solid tiles.
    /// Resources start at zero.
    pub fn enumerate_regions(&mut self) {
        let Map {
            grid,
            regions,
            rules,
            ..
        } = self;
        regions.clear();
        for tile in grid.tiles_mut() {
            tile.region = None;
        }

        let positions: Vec<HexCoord> = grid.positions().collect();
        for pos in positions {
            let Some(tile) = grid.at(pos) else {
                continue;
            };
            if !tile.is_solid() || tile.region.is_some() {
                continue;
            }
            let team = tile.team;
            let id = regions.create(Region::new(team, RegionRes::default()));
            Spread::new()
                .hop(|r| r.tile.is_solid() && r.tile.team == team)
                .affect_origin(true)
                .effect(|tile, _| attach_tile(tile, regions, rules, Some(id)))
                .apply(grid, pos, UNBOUNDED);
        }
    }

    /// Rebuild regions, handing each old region's resources to the new
    /// region that contains its first surviving tile.
    pub(crate) fn enumerate_regions_keeping_res(&mut self) {
        let old: Vec<(HexCoord, Option<RegionId>)> =
            self.grid.iter().map(|(pos, tile)| (pos, tile.region)).collect();
        let states: HashMap<RegionId, (RegionRes, bool)> = self
            .regions
            .iter()
            .map(|(id, region)| (id, (region.res, region.dead)))
            .collect();

        self.enumerate_regions();

        let mut claimed: HashSet<RegionId> = HashSet::new();
        let mut handed: HashSet<RegionId> = HashSet::new();
        for (pos, old_id) in old {
            let (Some(new_id), Some(old_id)) = (self.region_id(pos), old_id) else {
                continue;
            };
            let Some(&(res, dead)) = states.get(&old_id) else {
                continue;
            };
            if handed.contains(&new_id) || !claimed.insert(old_id) {
                continue;
            }
            handed.insert(new_id);
            if let Some(region) = self.regions.get_mut(new_id) {
                region.res = res;
                region.dead = dead;
            }
        }
    }

    /// Fold every region reachable from `seams` into `target`.
    ///
    /// Only regions of the target's team are absorbed; the target keeps its
    /// own `dead` flag. The returned distribution holds, per seam, the share
    /// of the region that seam pulled in, or `None` for the origin seam, seams already in the
    /// target, foreign seams and seams without a region.
    pub fn merge_regions(
        &mut self,
        target: RegionId,
        seams: &[HexCoord],
        origin: usize,
    ) -> Distribution {
        let Some(team) = self.regions.get(target).map(|r| r.team) else {
            return vec![None; seams.len()];
        };
        let mut distribution = Vec::with_capacity(seams.len());

        for (index, &seam) in seams.iter().enumerate() {
            let absorbed = self
                .grid
                .at(seam)
                .filter(|t| index != origin && t.is_solid() && t.team == team)
                .and_then(Tile::region)
                .filter(|&id| id != target);
            let Some((id, share)) =
                absorbed.and_then(|id| Some((id, Share::of(self.regions.get(id)?))))
            else {
                distribution.push(None);
                continue;
            };

            if let Some(region) = self.regions.get_mut(target) {
                region.res += share.res;
            }
            self.relabel(seam, id, Some(target));
            distribution.push(Some(share));
        }
        distribution
    }

    /// Break `source` into one region per connected piece touched by
    /// `seams`.
    ///
    /// The first piece whose seam has no recorded share keeps the source
    /// region. Every other piece becomes a new region holding its recorded
    /// share from `prior`, or an even share of the source's resources and
    /// the source's `dead` flag when nothing was recorded; the resources are
    /// taken out of the source.
    pub fn split_region(&mut self, source: RegionId, seams: &[HexCoord], prior: &[Option<Share>]) {
        let Some(region) = self.regions.get(source) else {
            return;
        };
        let (team, total, dead) = (region.team, region.res, region.dead);

        let mut seen: HashSet<HexCoord> = HashSet::new();
        let mut pieces: Vec<(usize, Vec<HexCoord>)> = Vec::new();
        for (index, &seam) in seams.iter().enumerate() {
            if seen.contains(&seam) || self.region_id(seam) != Some(source) {
                continue;
            }
            let members = Spread::new()
                .hop(|r| r.tile.region == Some(source))
                .affect_origin(true)
                .probe(&self.grid, seam, UNBOUNDED);
            seen.extend(members.iter().copied());
            pieces.push((index, members));
        }
        if pieces.len() < 2 {
            return;
        }

        let keeper = pieces
            .iter()
            .position(|(seam, _)| recorded(prior, *seam).is_none())
            .unwrap_or(0);
        let even = total.share(pieces.len() as i32);

        for (n, (seam, members)) in pieces.into_iter().enumerate() {
            if n == keeper {
                continue;
            }
            let share = recorded(prior, seam).unwrap_or(Share { res: even, dead });
            if let Some(region) = self.regions.get_mut(source) {
                region.res -= share.res;
            }
            let mut fresh = Region::new(team, share.res);
            fresh.dead = share.dead;
            let id = self.regions.create(fresh);
            for pos in members {
                self.attach(pos, Some(id));
            }
        }
    }

    /// Re-audit the regions around `pos` after its ownership changed.
    ///
    /// Merges neighbors into the tile's current region, then splits the
    /// region it used to belong to. Returns the merge distribution.
    pub fn update_regions(
        &mut self,
        pos: HexCoord,
        previous: Option<RegionId>,
        prior: &[Option<Share>],
    ) -> Distribution {
        let seams = seams(pos);
        let current = self.region_id(pos);
        let distribution = match current {
            Some(target) => self.merge_regions(target, &seams, 0),
            None => vec![None; seams.len()],
        };
        if let Some(previous) = previous.filter(|&p| Some(p) != current) {
            self.split_region(previous, &seams, prior);
        }
        distribution
    }

    /// Repaint a tile and bring the regions around it up to date.
    ///
    /// A solid tile joins an adjacent region of its new team: `prefer` when
    /// it is one of them, else the first found clockwise from north-east.
    /// With no such neighbor it starts a new region built from `seed`.
    /// `prior` is the distribution to split the old region with, when one
    /// was recorded.
    pub(crate) fn recolor(
        &mut self,
        pos: HexCoord,
        terrain: Terrain,
        team: Team,
        prefer: Option<RegionId>,
        seed: Option<Region>,
        prior: &[Option<Share>],
    ) -> Distribution {
        let Some(tile) = self.grid.at_mut(pos) else {
            return Vec::new();
        };
        let previous = tile.region;
        tile.terrain = terrain;
        tile.team = team;
        let solid = tile.is_solid();
        self.attach(pos, None);

        if solid {
            let adjacent: Vec<RegionId> = pos
                .neighbors()
                .into_iter()
                .filter_map(|n| self.grid.at(n))
                .filter(|t| t.is_solid() && t.team == team)
                .filter_map(Tile::region)
                .collect();
            let neighbor = prefer
                .filter(|id| adjacent.contains(id))
                .or_else(|| adjacent.first().copied());
            let target = match neighbor {
                Some(id) => id,
                None => {
                    let region = match seed {
                        Some(seed) => Region { team, ..seed.detached() },
                        None => Region::new(team, RegionRes::default()),
                    };
                    self.regions.create(region)
                }
            };
            self.attach(pos, Some(target));
        }
        self.update_regions(pos, previous, prior)
    }

    /// Reassign every tile of region `from` connected to `seam`
    fn relabel(&mut self, seam: HexCoord, from: RegionId, to: Option<RegionId>) -> usize {
        let Map {
            grid,
            regions,
            rules,
            ..
        } = self;
        Spread::new()
            .hop(|r| r.tile.region == Some(from))
            .affect_origin(true)
            .effect(|tile, _| attach_tile(tile, regions, rules, to))
            .apply(grid, seam, UNBOUNDED)
    }

    /// Recompute tile, income and farm counters without changing membership
    pub(crate) fn recount_regions(&mut self) {
        let mut totals: HashMap<RegionId, (i32, i32, i32)> = HashMap::new();
        for (_, tile) in self.grid.iter() {
            if let Some(id) = tile.region {
                let (income, farms) = footprint(&self.rules, tile.occupant.as_ref());
                let entry = totals.entry(id).or_default();
                entry.0 += 1;
                entry.1 += income;
                entry.2 += farms;
            }
        }
        for (id, (tiles, income, farms)) in totals {
            if let Some(region) = self.regions.get_mut(id) {
                region.tiles = tiles;
                region.income = income;
                region.farms = farms;
            }
        }
    }
}
