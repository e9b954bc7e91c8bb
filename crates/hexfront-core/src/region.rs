//! Region records and the generational arena that stores them.
//!
//! Tiles refer to their region by `RegionId`. Removing a region bumps the
//! generation of its slot, so a stale id simply fails to resolve instead of
//! aliasing whatever region reuses the slot.

use serde::{Deserialize, Serialize};
use std::ops::{Add, AddAssign, Sub, SubAssign};

use crate::tile::Team;

/// Currency counters of a region
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct RegionRes {
    /// Primary currency
    pub money: i32,
    pub berry: i32,
    pub peach: i32,
}

impl RegionRes {
    pub const fn new(money: i32, berry: i32, peach: i32) -> Self {
        Self {
            money,
            berry,
            peach,
        }
    }

    pub const fn money(money: i32) -> Self {
        Self::new(money, 0, 0)
    }

    /// Even share when splitting between `parts` regions (rounded down)
    pub fn share(self, parts: i32) -> Self {
        if parts <= 0 {
            return Self::default();
        }
        Self::new(self.money / parts, self.berry / parts, self.peach / parts)
    }
}

impl Add for RegionRes {
    type Output = RegionRes;

    fn add(self, rhs: Self) -> Self {
        Self::new(
            self.money + rhs.money,
            self.berry + rhs.berry,
            self.peach + rhs.peach,
        )
    }
}

impl Sub for RegionRes {
    type Output = RegionRes;

    fn sub(self, rhs: Self) -> Self {
        Self::new(
            self.money - rhs.money,
            self.berry - rhs.berry,
            self.peach - rhs.peach,
        )
    }
}

impl AddAssign for RegionRes {
    fn add_assign(&mut self, rhs: Self) {
        *self = *self + rhs;
    }
}

impl SubAssign for RegionRes {
    fn sub_assign(&mut self, rhs: Self) {
        *self = *self - rhs;
    }
}

/// A connected group of same-team solid tiles.
///
/// `tiles`, `income` and `farms` are derived from the member tiles and kept
/// up to date as tiles join and leave; `res` and `dead` are game state.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Region {
    pub team: Team,
    pub res: RegionRes,
    pub income: i32,
    pub tiles: i32,
    pub farms: i32,
    /// Bankrupt regions stop producing and consuming
    pub dead: bool,
}

impl Region {
    pub fn new(team: Team, res: RegionRes) -> Self {
        Self {
            team,
            res,
            ..Self::default()
        }
    }

    /// Copy of the game state with derived counters zeroed, for snapshots
    pub fn detached(&self) -> Self {
        Self {
            team: self.team,
            res: self.res,
            dead: self.dead,
            ..Self::default()
        }
    }
}

/// Arena handle of a region
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RegionId {
    index: u32,
    generation: u32,
}

impl RegionId {
    pub fn index(&self) -> usize {
        self.index as usize
    }
}

#[derive(Debug, Clone, Default)]
struct Slot {
    generation: u32,
    region: Option<Region>,
}

/// Generational arena of regions
#[derive(Debug, Clone, Default)]
pub struct Regions {
    slots: Vec<Slot>,
    free: Vec<u32>,
}

impl Regions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn create(&mut self, region: Region) -> RegionId {
        match self.free.pop() {
            Some(index) => {
                let slot = &mut self.slots[index as usize];
                slot.region = Some(region);
                RegionId {
                    index,
                    generation: slot.generation,
                }
            }
            None => {
                let index = self.slots.len() as u32;
                self.slots.push(Slot {
                    generation: 0,
                    region: Some(region),
                });
                RegionId {
                    index,
                    generation: 0,
                }
            }
        }
    }

    pub fn get(&self, id: RegionId) -> Option<&Region> {
        let slot = self.slots.get(id.index())?;
        if slot.generation != id.generation {
            return None;
        }
        slot.region.as_ref()
    }

    pub fn get_mut(&mut self, id: RegionId) -> Option<&mut Region> {
        let slot = self.slots.get_mut(id.index())?;
        if slot.generation != id.generation {
            return None;
        }
        slot.region.as_mut()
    }

    pub fn contains(&self, id: RegionId) -> bool {
        self.get(id).is_some()
    }

    /// Free a region; its id and every copy of it stop resolving
    pub fn remove(&mut self, id: RegionId) -> Option<Region> {
        let slot = self.slots.get_mut(id.index())?;
        if slot.generation != id.generation {
            return None;
        }
        let region = slot.region.take()?;
        slot.generation = slot.generation.wrapping_add(1);
        self.free.push(id.index);
        Some(region)
    }

    /// Free every region
    pub fn clear(&mut self) {
        for index in 0..self.slots.len() {
            let slot = &mut self.slots[index];
            if slot.region.take().is_some() {
                slot.generation = slot.generation.wrapping_add(1);
                self.free.push(index as u32);
            }
        }
    }

    pub fn len(&self) -> usize {
        self.slots.iter().filter(|s| s.region.is_some()).count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Live regions with their ids
    pub fn iter(&self) -> impl Iterator<Item = (RegionId, &Region)> + '_ {
        self.slots.iter().enumerate().filter_map(|(index, slot)| {
            let region = slot.region.as_ref()?;
            let id = RegionId {
                index: index as u32,
                generation: slot.generation,
            };
            Some((id, region))
        })
    }

    /// Sum of resources over every live region
    pub fn total(&self) -> RegionRes {
        self.iter()
            .fold(RegionRes::default(), |acc, (_, r)| acc + r.res)
    }
}
