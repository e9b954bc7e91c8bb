//! Skills: how a selected tile turns into moves.
//!
//! A skill highlights its candidate targets through `selection` and builds
//! the move through `action`. `action` declines with `None` rather than
//! build a move whose preconditions fail, so anything it returns can go
//! straight into the history.

use serde::{Deserialize, Serialize};

use crate::entity::{BuildKind, Effect, Occupant, TroopKind};
use crate::hex::HexCoord;
use crate::map::Map;
use crate::moves::{
    EntityEffect, EntityPlace, EntityWithdraw, Move, PlantCut, PlantHarvest, RadiusEffect,
    TroopAttack, TroopHeal, TroopMerge, TroopMove,
};
use crate::spread::{count_around, Spread, UNBOUNDED};
use crate::tile::Team;

wire_enum! {
    pub enum SkillKind {
        Withdraw,
        Move,
        Attack,
        Harvest,
        TreeCut,
        Shield,
        RangeBoost,
        DefenseBoost,
        OffenseBoost,
        Heal,
        Stun,
        BuyTroop,
        BuyBuild,
    }
}

/// Buildings offered by the shop, indexed by `SkillState::build`
pub const BUILD_SHOP: [BuildKind; 6] = [
    BuildKind::Farm,
    BuildKind::Mine,
    BuildKind::Tower,
    BuildKind::Beacon,
    BuildKind::Fort,
    BuildKind::Tent,
];

/// Hit points restored per troop by one heal
pub const HEAL_AMOUNT: i32 = 2;

/// Player-side choices a skill depends on
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct SkillState {
    /// Team issuing the skill
    pub team: Team,
    /// Index into `TroopKind::ALL` for troop purchases
    pub troop: usize,
    /// Index into `BUILD_SHOP` for building purchases
    pub build: usize,
    /// Seed tile of the region paying for purchases
    pub region: Option<HexCoord>,
}

impl SkillKind {
    /// Turns the acting entity waits before using the skill again
    pub const fn cooldown(self) -> u8 {
        match self {
            SkillKind::Withdraw | SkillKind::BuyTroop | SkillKind::BuyBuild => 0,
            SkillKind::Move | SkillKind::Attack | SkillKind::TreeCut => 1,
            SkillKind::Harvest | SkillKind::Heal => 2,
            SkillKind::Shield
            | SkillKind::RangeBoost
            | SkillKind::DefenseBoost
            | SkillKind::OffenseBoost
            | SkillKind::Stun => 3,
        }
    }

    /// Whether the skill needs a target tile besides its origin
    pub const fn is_aimed(self) -> bool {
        matches!(
            self,
            SkillKind::Move
                | SkillKind::Attack
                | SkillKind::TreeCut
                | SkillKind::BuyTroop
                | SkillKind::BuyBuild
        )
    }

    /// Purchases are paid by a region instead of performed by an entity
    pub const fn is_purchase(self) -> bool {
        matches!(self, SkillKind::BuyTroop | SkillKind::BuyBuild)
    }

    /// How far from `origin` the skill reaches before any bonus.
    ///
    /// A boosted attacker's extra range is granted by the selection spread
    /// when it reaches the origin.
    pub fn radius(self, map: &Map, origin: HexCoord) -> usize {
        let rules = map.rules();
        match self {
            SkillKind::Move => rules.move_range,
            SkillKind::Attack => map
                .occupant(origin)
                .and_then(Occupant::as_troop)
                .map_or(0, |t| rules.troop_range[t.kind.index()]),
            SkillKind::Harvest => rules.harvest_range,
            SkillKind::TreeCut => 1,
            SkillKind::Heal | SkillKind::Stun => rules.effect_radius,
            SkillKind::BuyTroop | SkillKind::BuyBuild => UNBOUNDED,
            _ => 0,
        }
    }

    /// Spread that reaches the skill's valid targets from `origin`.
    ///
    /// The spread owns everything it needs, so it can be handed to
    /// `Map::select` while the map is borrowed mutably.
    pub fn selection(self, state: &SkillState, map: &Map, origin: HexCoord) -> Spread<'static> {
        let team = state.team;
        let rules = map.rules().clone();
        match self {
            SkillKind::Move => {
                let own = map.region_id(origin);
                let Some(mover) = map.occupant(origin).filter(|o| o.is_troop()).cloned() else {
                    return nothing();
                };
                let kind = mover.as_troop().map(|t| t.kind);
                let attack_ready = mover.vitals().cooldown(SkillKind::Attack) == 0;
                Spread::new().hop(move |r| {
                    if !r.tile.is_solid() {
                        return false;
                    }
                    let near_own = r.tile.region == own
                        || count_around(r.grid, r.pos, 1, |nb| nb.tile.region == own) > 0;
                    if !near_own {
                        return false;
                    }
                    match &r.tile.occupant {
                        None | Some(Occupant::Plant(_)) => true,
                        Some(Occupant::Troop(t)) if r.tile.region == own => {
                            kind.and_then(|k| rules.merge(k, t.kind)).is_some()
                        }
                        Some(target) if r.tile.team != team => {
                            attack_ready && rules.damage(&mover, target) >= target.vitals().hp
                        }
                        Some(_) => false,
                    }
                })
            }
            SkillKind::Attack => {
                let boosted = map
                    .occupant(origin)
                    .and_then(Occupant::as_troop)
                    .map(|t| rules.range(t));
                Spread::new()
                    .range(move |r| boosted.filter(|_| r.pos == origin))
                    .hop(|r| r.tile.is_solid())
                    .pass(move |r| {
                        r.tile.team != team
                            && r.tile.occupant.as_ref().map_or(false, |o| !o.is_plant())
                    })
            }
            SkillKind::Harvest => Spread::new().affect_origin(true).pass(|r| {
                r.tile
                    .occupant
                    .as_ref()
                    .and_then(Occupant::as_plant)
                    .map_or(false, |p| p.kind.harvested().is_some())
            }),
            SkillKind::TreeCut => {
                Spread::new().pass(|r| r.tile.occupant.as_ref().map_or(false, Occupant::is_plant))
            }
            SkillKind::Heal => Spread::new()
                .hop(|r| r.tile.is_solid())
                .affect_origin(true)
                .pass(move |r| {
                    r.tile.team == team
                        && r.tile
                            .occupant
                            .as_ref()
                            .and_then(Occupant::as_troop)
                            .map_or(false, |t| t.vitals.hp < rules.troop_hp[t.kind.index()])
                }),
            SkillKind::Stun => Spread::new().pass(move |r| {
                r.tile.team != team && r.tile.occupant.as_ref().map_or(false, Occupant::is_troop)
            }),
            SkillKind::BuyTroop | SkillKind::BuyBuild => {
                let Some(own) = map.region_id(state.region.unwrap_or(origin)) else {
                    return nothing();
                };
                Spread::new()
                    .hop(move |r| r.tile.region == Some(own))
                    .pass(|r| r.tile.is_empty())
                    .affect_origin(true)
            }
            _ => Spread::new().affect_origin(true),
        }
    }

    /// Tiles the skill can target from `origin`, in spread order
    pub fn targets(self, state: &SkillState, map: &Map, origin: HexCoord) -> Vec<HexCoord> {
        let radius = self.radius(map, origin);
        self.selection(state, map, origin)
            .probe(map.grid(), origin, radius)
    }

    /// Build the move for using the skill from `origin` on `target`.
    ///
    /// Self-targeted skills ignore `target`. Purchases are paid by the region
    /// at `state.region`, falling back to the region at `origin`.
    pub fn action(
        self,
        state: &SkillState,
        map: &Map,
        origin: HexCoord,
        target: HexCoord,
    ) -> Option<Move> {
        if self.is_purchase() {
            return self.purchase(state, map, origin, target);
        }

        let actor = map.occupant(origin)?;
        if map.team(origin)? != state.team || !skills_of(actor).contains(&self) {
            return None;
        }
        let vitals = actor.vitals();
        if vitals.has_effect(Effect::Stunned) || vitals.cooldown(self) > 0 {
            return None;
        }
        if self.is_aimed() && !self.targets(state, map, origin).contains(&target) {
            return None;
        }

        let rules = map.rules();
        let kind: Move = match self {
            SkillKind::Withdraw => EntityWithdraw::new(origin).into(),
            SkillKind::Move => {
                let merge = map.region_id(target) == map.region_id(origin)
                    && map.occupant(target).map_or(false, Occupant::is_troop);
                if merge {
                    TroopMerge::new(origin, target).into()
                } else {
                    TroopMove::new(origin, target).into()
                }
            }
            SkillKind::Attack => TroopAttack::new(origin, target).into(),
            SkillKind::Harvest => {
                if self.targets(state, map, origin).is_empty() {
                    return None;
                }
                PlantHarvest::new(origin, rules.harvest_range).into()
            }
            SkillKind::TreeCut => PlantCut::new(origin, target).into(),
            SkillKind::Shield
            | SkillKind::RangeBoost
            | SkillKind::DefenseBoost
            | SkillKind::OffenseBoost => {
                let effect = self.granted_effect()?;
                if vitals.has_effect(effect) {
                    return None;
                }
                EntityEffect::new(origin, effect).into()
            }
            SkillKind::Heal => {
                let berry = map.region_at(origin)?.res.berry;
                let radius = rules.effect_radius;
                let (cost, count) = TroopHeal::quote(map, origin, radius, HEAL_AMOUNT, state.team);
                if count == 0 || cost > berry {
                    return None;
                }
                TroopHeal::new(origin, radius, HEAL_AMOUNT, state.team).into()
            }
            SkillKind::Stun => {
                if self.targets(state, map, origin).is_empty() {
                    return None;
                }
                RadiusEffect::new(origin, rules.effect_radius, Effect::Stunned, state.team).into()
            }
            SkillKind::BuyTroop | SkillKind::BuyBuild => return None,
        };
        Some(kind.with_skill(origin, self, self.cooldown()))
    }

    fn purchase(
        self,
        state: &SkillState,
        map: &Map,
        origin: HexCoord,
        target: HexCoord,
    ) -> Option<Move> {
        let seed = state.region.unwrap_or(origin);
        let region = map.region_at(seed)?;
        if region.team != state.team || region.dead {
            return None;
        }
        if !self.targets(state, map, seed).contains(&target) {
            return None;
        }

        let rules = map.rules();
        let entity: Occupant = match self {
            SkillKind::BuyTroop => rules.troop(*TroopKind::ALL.get(state.troop)?).into(),
            _ => rules.build(*BUILD_SHOP.get(state.build)?).into(),
        };
        if rules.cost(&entity, region.farms) > region.res.money {
            return None;
        }
        Some(EntityPlace::new(target, entity).into())
    }

    /// Effect given by the self-boost skills
    pub const fn granted_effect(self) -> Option<Effect> {
        match self {
            SkillKind::Shield => Some(Effect::Shielded),
            SkillKind::RangeBoost => Some(Effect::RangeBoost),
            SkillKind::DefenseBoost => Some(Effect::DefenseBoost),
            SkillKind::OffenseBoost => Some(Effect::OffenseBoost),
            _ => None,
        }
    }
}

/// Selection that reaches nothing
fn nothing() -> Spread<'static> {
    Spread::new().hop(|_| false).pass(|_| false)
}

/// Skills an entity can use, in menu order
pub fn skills_of(occupant: &Occupant) -> Vec<SkillKind> {
    match occupant {
        Occupant::Troop(troop) => {
            let mut skills = vec![SkillKind::Withdraw, SkillKind::Move];
            if troop.kind != TroopKind::Farmer {
                skills.push(SkillKind::Attack);
            }
            skills.push(match troop.kind {
                TroopKind::Farmer => SkillKind::Harvest,
                TroopKind::Lumberjack => SkillKind::TreeCut,
                TroopKind::Spearman => SkillKind::Shield,
                TroopKind::Archer => SkillKind::RangeBoost,
                TroopKind::Baron => SkillKind::DefenseBoost,
                TroopKind::Knight => SkillKind::OffenseBoost,
            });
            skills
        }
        Occupant::Build(build) => match build.kind {
            BuildKind::Castle => Vec::new(),
            BuildKind::Farm => vec![SkillKind::Withdraw, SkillKind::Harvest],
            BuildKind::Beacon => vec![SkillKind::Withdraw, SkillKind::Stun],
            BuildKind::Tent => vec![SkillKind::Withdraw, SkillKind::Heal],
            _ => vec![SkillKind::Withdraw],
        },
        Occupant::Plant(_) => Vec::new(),
    }
}
