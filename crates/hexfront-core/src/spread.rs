//! Conditional breadth-first propagation over the hex grid.
//!
//! A `Spread` is built per query from up to four closures:
//! - `hop`: blocking predicate. A tile it rejects is never entered, so
//!   propagation stops there.
//! - `pass`: non-blocking predicate. Gates only the effect.
//! - `effect`: runs on every dequeued tile that passes.
//! - `range`: dynamic radius override, consulted the moment a tile is reached.
//!
//! Visited tiles are stamped with a per-grid generation counter on one of
//! two channels. A spread running on `Channel::Alt` inside a predicate of a
//! `Channel::Primary` spread leaves the outer traversal's marks intact.

use std::collections::VecDeque;
use std::fmt;

use crate::grid::HexGrid;
use crate::hex::HexCoord;
use crate::tile::Tile;

/// Radius without a hop limit
pub const UNBOUNDED: usize = usize::MAX;

/// Visit-mark channel
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Channel {
    #[default]
    Primary,
    Alt,
}

impl Channel {
    pub(crate) const fn index(self) -> usize {
        self as usize
    }
}

/// A tile on the traversal frontier
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Hop {
    pub pos: HexCoord,
    /// Hops still available from this tile
    pub left: usize,
}

/// What predicates see about a reached tile
pub struct Reach<'g> {
    pub pos: HexCoord,
    pub left: usize,
    pub tile: &'g Tile,
    pub grid: &'g HexGrid,
}

type Check<'a> = Box<dyn FnMut(&Reach<'_>) -> bool + 'a>;
type Range<'a> = Box<dyn FnMut(&Reach<'_>) -> Option<usize> + 'a>;
type Effect<'a> = Box<dyn FnMut(&mut Tile, Hop) + 'a>;

/// Spread descriptor
#[derive(Default)]
pub struct Spread<'a> {
    hop: Option<Check<'a>>,
    pass: Option<Check<'a>>,
    range: Option<Range<'a>>,
    effect: Option<Effect<'a>>,
    affect_origin: bool,
    channel: Channel,
}

impl<'a> Spread<'a> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Blocking predicate
    pub fn hop(mut self, check: impl FnMut(&Reach<'_>) -> bool + 'a) -> Self {
        self.hop = Some(Box::new(check));
        self
    }

    /// Non-blocking predicate
    pub fn pass(mut self, check: impl FnMut(&Reach<'_>) -> bool + 'a) -> Self {
        self.pass = Some(Box::new(check));
        self
    }

    /// Replace the remaining hop budget of a reached tile
    pub fn range(mut self, range: impl FnMut(&Reach<'_>) -> Option<usize> + 'a) -> Self {
        self.range = Some(Box::new(range));
        self
    }

    pub fn effect(mut self, effect: impl FnMut(&mut Tile, Hop) + 'a) -> Self {
        self.effect = Some(Box::new(effect));
        self
    }

    pub fn affect_origin(mut self, affect: bool) -> Self {
        self.affect_origin = affect;
        self
    }

    pub fn channel(mut self, channel: Channel) -> Self {
        self.channel = channel;
        self
    }

    /// Run the spread and return how many tiles the effect ran on
    pub fn apply(&mut self, grid: &mut HexGrid, origin: HexCoord, radius: usize) -> usize {
        self.run(grid, origin, radius, |_| ())
    }

    /// Run the spread and return the affected tiles in visitation order
    pub fn apply_list(
        &mut self,
        grid: &mut HexGrid,
        origin: HexCoord,
        radius: usize,
    ) -> Vec<HexCoord> {
        let mut list = Vec::new();
        self.run(grid, origin, radius, |pos| list.push(pos));
        list
    }

    /// Read-only traversal: the tiles that would pass, without effects
    pub fn probe(&mut self, grid: &HexGrid, origin: HexCoord, radius: usize) -> Vec<HexCoord> {
        let mut list = Vec::new();
        let Some(start) = self.start(grid, origin, radius) else {
            return list;
        };
        let mut queue = VecDeque::new();

        if self.affect_origin && self.passes(grid, start) {
            list.push(origin);
        }
        self.expand(grid, start, &mut queue);
        while let Some(hop) = queue.pop_front() {
            if self.passes(grid, hop) {
                list.push(hop.pos);
            }
            self.expand(grid, hop, &mut queue);
        }
        list
    }

    fn run(
        &mut self,
        grid: &mut HexGrid,
        origin: HexCoord,
        radius: usize,
        mut visit: impl FnMut(HexCoord),
    ) -> usize {
        let Some(start) = self.start(grid, origin, radius) else {
            return 0;
        };
        let mut queue = VecDeque::new();
        let mut affected = 0;

        if self.affect_origin && self.passes(grid, start) {
            self.affect(grid, start);
            visit(origin);
            affected += 1;
        }
        self.expand(grid, start, &mut queue);
        while let Some(hop) = queue.pop_front() {
            if self.passes(grid, hop) {
                self.affect(grid, hop);
                visit(hop.pos);
                affected += 1;
            }
            self.expand(grid, hop, &mut queue);
        }
        affected
    }

    /// Stamp the origin and work out its hop budget
    fn start(&mut self, grid: &HexGrid, origin: HexCoord, radius: usize) -> Option<Hop> {
        let tile = grid.at(origin)?;
        let stamp = grid.next_stamp(self.channel);
        tile.visit(self.channel, stamp);
        let left = self.reach_left(grid, tile, origin, radius);
        Some(Hop { pos: origin, left })
    }

    fn expand(&mut self, grid: &HexGrid, from: Hop, queue: &mut VecDeque<Hop>) {
        if from.left == 0 {
            return;
        }
        let stamp = grid.generation(self.channel);
        for pos in from.pos.neighbors() {
            let Some(tile) = grid.at(pos) else {
                continue;
            };
            if !tile.visit(self.channel, stamp) {
                continue;
            }
            let left = self.reach_left(grid, tile, pos, from.left - 1);
            let reach = Reach {
                pos,
                left,
                tile,
                grid,
            };
            if self.hop.as_mut().map_or(true, |hop| hop(&reach)) {
                queue.push_back(Hop { pos, left });
            }
        }
    }

    fn reach_left(&mut self, grid: &HexGrid, tile: &Tile, pos: HexCoord, left: usize) -> usize {
        let Some(range) = self.range.as_mut() else {
            return left;
        };
        let reach = Reach {
            pos,
            left,
            tile,
            grid,
        };
        range(&reach).unwrap_or(left)
    }

    fn passes(&mut self, grid: &HexGrid, hop: Hop) -> bool {
        let Some(pass) = self.pass.as_mut() else {
            return true;
        };
        let Some(tile) = grid.at(hop.pos) else {
            return false;
        };
        pass(&Reach {
            pos: hop.pos,
            left: hop.left,
            tile,
            grid,
        })
    }

    fn affect(&mut self, grid: &mut HexGrid, hop: Hop) {
        if let (Some(effect), Some(tile)) = (self.effect.as_mut(), grid.at_mut(hop.pos)) {
            effect(tile, hop);
        }
    }
}

impl fmt::Debug for Spread<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Spread")
            .field("hop", &self.hop.is_some())
            .field("pass", &self.pass.is_some())
            .field("range", &self.range.is_some())
            .field("effect", &self.effect.is_some())
            .field("affect_origin", &self.affect_origin)
            .field("channel", &self.channel)
            .finish()
    }
}

/// Count tiles within `radius` of `pos` that satisfy `check`, on the alt
/// channel so it can run inside another spread's predicates.
pub fn count_around(
    grid: &HexGrid,
    pos: HexCoord,
    radius: usize,
    check: impl FnMut(&Reach<'_>) -> bool,
) -> usize {
    Spread::new()
        .pass(check)
        .channel(Channel::Alt)
        .probe(grid, pos, radius)
        .len()
}
