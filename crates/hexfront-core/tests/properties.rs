//! Property tests for the grid, spread, region and history invariants.

use proptest::prelude::*;
use std::collections::{HashMap, HashSet, VecDeque};

use hexfront_core::moves::{GameTurn, RegionShift, TileRepaint};
use hexfront_core::template::RegionSeed;
use hexfront_core::territory::{seams, Share};
use hexfront_core::*;

const TEAMS: [Team; 3] = [Team::Unclaimed, Team::Red, Team::Blue];

/// Template whose tiles come from `cells`, one `(terrain, team)` pair per slot
fn painted(width: i32, height: i32, cells: &[(usize, usize)]) -> Template {
    let mut template = Template::new(GridSize::new(width, height));
    for y in 0..height {
        for x in 0..width {
            let (terrain, team) = cells[(y * width + x) as usize % cells.len()];
            template.paint(
                HexCoord::new(x, y),
                Terrain::ALL[terrain % Terrain::ALL.len()],
                TEAMS[team % TEAMS.len()],
            );
        }
    }
    template
}

/// Breadth-first distances over solid tiles, the origin always included
fn solid_distances(grid: &HexGrid, origin: HexCoord, radius: usize) -> HashMap<HexCoord, usize> {
    let mut dist = HashMap::new();
    dist.insert(origin, 0);
    let mut queue = VecDeque::from([origin]);
    while let Some(pos) = queue.pop_front() {
        let d = dist[&pos];
        if d == radius {
            continue;
        }
        for next in pos.neighbors() {
            if dist.contains_key(&next) || !grid.at(next).map_or(false, Tile::is_solid) {
                continue;
            }
            dist.insert(next, d + 1);
            queue.push_back(next);
        }
    }
    dist
}

fn cells() -> impl Strategy<Value = Vec<(usize, usize)>> {
    prop::collection::vec((0usize..4, 0usize..3), 64)
}

proptest! {
    #[test]
    fn test_neighbors_symmetric(
        width in 1i32..10,
        height in 1i32..10,
        x in 0i32..10,
        y in 0i32..10,
    ) {
        let size = GridSize::new(width, height);
        let pos = HexCoord::new(x, y);
        prop_assume!(size.contains(pos));
        for direction in Direction::ALL {
            let next = pos.neighbor(direction);
            if size.contains(next) {
                prop_assert_eq!(next.neighbor(direction.opposite()), pos);
            }
        }
    }

    #[test]
    fn test_spread_reaches_exactly_the_radius(
        width in 1i32..9,
        height in 1i32..9,
        solid in prop::collection::vec(any::<bool>(), 64),
        ox in 0i32..9,
        oy in 0i32..9,
        radius in 0usize..5,
    ) {
        let mut grid = HexGrid::new(GridSize::new(width, height));
        let positions: Vec<HexCoord> = grid.positions().collect();
        for pos in positions {
            let slot = (pos.y * width + pos.x) as usize % solid.len();
            if let Some(tile) = grid.at_mut(pos) {
                tile.terrain = if solid[slot] { Terrain::Ground } else { Terrain::Water };
            }
        }
        let origin = HexCoord::new(ox, oy);
        prop_assume!(grid.contains(origin));

        let reached = Spread::new()
            .hop(|r| r.tile.is_solid())
            .apply_list(&mut grid, origin, radius);
        let unique: HashSet<HexCoord> = reached.iter().copied().collect();
        prop_assert_eq!(unique.len(), reached.len());

        let mut expected: HashSet<HexCoord> =
            solid_distances(&grid, origin, radius).into_keys().collect();
        expected.remove(&origin);
        prop_assert_eq!(unique, expected);
    }

    #[test]
    fn test_enumeration_keeps_region_invariant(
        width in 1i32..9,
        height in 1i32..9,
        cells in cells(),
    ) {
        let mut map = Map::default();
        painted(width, height, &cells).construct(&mut map);

        prop_assert!(map.audit_regions().is_empty());
        for (_, tile) in map.grid().iter() {
            prop_assert_eq!(tile.region().is_some(), tile.is_solid());
        }
        let counted: i32 = map.regions().iter().map(|(_, r)| r.tiles).sum();
        let solid = map.grid().iter().filter(|(_, t)| t.is_solid()).count();
        prop_assert_eq!(counted as usize, solid);
    }

    #[test]
    fn test_merge_then_split_restores_resources(
        segments in prop::collection::vec(
            (1i32..4, 0i32..100, 0i32..10, 0i32..10, any::<bool>()),
            2..5,
        ),
        pick in 0usize..4,
    ) {
        let width: i32 = segments.iter().map(|s| s.0).sum::<i32>() + segments.len() as i32 - 1;
        let mut template = Template::filled(GridSize::new(width, 1), Terrain::Ground, Team::Red);
        let mut gaps = Vec::new();
        let mut shifts = Vec::new();
        let mut x = 0;
        for (n, &(len, money, berry, peach, dead)) in segments.iter().enumerate() {
            let res = RegionRes::new(money, berry, peach);
            template.regions.push(RegionSeed { pos: HexCoord::new(x, 0), res });
            shifts.push(RegionShift { seed: HexCoord::new(x, 0), res, dead });
            x += len;
            if n + 1 < segments.len() {
                template.paint(HexCoord::new(x, 0), Terrain::Water, Team::Unclaimed);
                gaps.push(HexCoord::new(x, 0));
                x += 1;
            }
        }
        let mut map = Map::default();
        template.construct(&mut map);
        // Bankrupt some of the segments.
        prop_assert!(Move::new(GameTurn::new(Vec::new(), shifts)).apply(&mut map));
        let before = map.snapshot();
        let total = map.regions().total();

        let gap = gaps[pick % gaps.len()];
        let left = HexCoord::new(gap.x - 1, 0);
        let right = HexCoord::new(gap.x + 1, 0);
        let (Some(target), Some(absorbed)) = (map.region_id(left), map.region_id(right)) else {
            return Err(TestCaseError::fail("segments next to a gap must have regions"));
        };
        let absorbed_share = map.regions().get(absorbed).map(Share::of);

        let seams = seams(gap);
        let distribution = map.merge_regions(target, &seams, 0);
        prop_assert_eq!(map.regions().total(), total);
        prop_assert_eq!(map.region_id(right), Some(target));
        prop_assert_eq!(distribution.iter().flatten().count(), 1);
        prop_assert!(distribution.contains(&absorbed_share));

        map.split_region(target, &seams, &distribution);
        prop_assert_eq!(map.regions().total(), total);
        prop_assert_eq!(map.snapshot(), before);
    }

    #[test]
    fn test_history_round_trip(
        cells in cells(),
        repaints in prop::collection::vec((0i32..6, 0i32..5, 0usize..4, 0usize..3), 1..12),
        money in 0i32..50,
    ) {
        let mut template = painted(6, 5, &cells);
        template.regions.push(RegionSeed { pos: HexCoord::new(0, 0), res: RegionRes::new(money, 3, 1) });
        template.regions.push(RegionSeed { pos: HexCoord::new(5, 4), res: RegionRes::money(money + 7) });
        let mut map = Map::default();
        template.construct(&mut map);
        let start = map.snapshot();

        let mut history = History::new();
        for (x, y, terrain, team) in repaints {
            let repaint = TileRepaint::new(
                HexCoord::new(x, y),
                Terrain::ALL[terrain],
                TEAMS[team],
            );
            history.add(&mut map, repaint.into());
            prop_assert!(map.audit_regions().is_empty());
        }
        let end = map.snapshot();
        let (applied, _) = history.count();

        for _ in 0..applied {
            history.undo(&mut map);
        }
        prop_assert_eq!(map.snapshot(), start);
        for _ in 0..applied {
            history.redo(&mut map);
        }
        prop_assert_eq!(map.snapshot(), end);
    }
}
