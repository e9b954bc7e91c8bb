//! Batch replay with undo/redo verification.

use tracing::{debug, info, warn};

use hexfront_core::template::RegionSeed;
use hexfront_core::{
    BuildKind, GameState, GridSize, HexCoord, MapSnapshot, MoveBatch, RegionRes, Rules, SkillKind,
    SkillState, Team, Template, Terrain, TroopKind,
};

use crate::protocol::ReplayReport;

/// Players of the demo game: (player, team, castle)
const DEMO_SIDES: [(u8, Team, HexCoord); 2] = [
    (0, Team::Red, HexCoord::new(0, 0)),
    (1, Team::Blue, HexCoord::new(9, 6)),
];

/// Two kingdoms split by a river with a single bridge
pub fn demo_template(rules: &Rules) -> Template {
    let size = GridSize::new(10, 7);
    let mut template = Template::filled(size, Terrain::Ground, Team::Red);
    for y in 0..size.height {
        for x in 5..size.width {
            template.paint(HexCoord::new(x, y), Terrain::Ground, Team::Blue);
        }
        template.paint(HexCoord::new(4, y), Terrain::Water, Team::Unclaimed);
    }
    template.paint(HexCoord::new(4, 3), Terrain::Bridge, Team::Unclaimed);

    for (_, team, castle) in DEMO_SIDES {
        template.builds.push((castle, rules.build(BuildKind::Castle)).into());
        template.regions.push(RegionSeed {
            pos: castle,
            res: RegionRes::new(40, 6, 0),
        });
        debug!(?team, %castle, "demo kingdom");
    }
    template
}

/// Script a short game on the demo map: every turn each side buys a farmer
/// on its first free tile, and the last side ends the turn.
pub fn demo_batches(template: &Template, rules: &Rules, seed: u64, turns: u32) -> Vec<MoveBatch> {
    let mut game = GameState::new(rules.clone(), seed);
    game.load(template);
    let mut batches = Vec::new();

    for _ in 0..turns {
        for (n, &(player, team, castle)) in DEMO_SIDES.iter().enumerate() {
            let state = SkillState {
                team,
                troop: TroopKind::Farmer.index(),
                region: Some(castle),
                ..SkillState::default()
            };
            let spots = game.select(SkillKind::BuyTroop, &state, castle);
            if let Some(&spot) = spots.first() {
                game.use_skill(SkillKind::BuyTroop, &state, castle, spot);
            }
            if n + 1 == DEMO_SIDES.len() {
                game.end_turn();
            }
            batches.push(game.finish(player));
        }
    }
    batches
}

/// Replay batches in order.
///
/// After each batch every applied move is undone and redone again; the map
/// must come back to the same state both ways. Accepted batches are then
/// committed.
pub fn run(game: &mut GameState, batches: Vec<MoveBatch>) -> ReplayReport {
    let mut report = ReplayReport {
        batches: batches.len(),
        ..ReplayReport::default()
    };

    for (index, batch) in batches.into_iter().enumerate() {
        let (player, total) = (batch.player, batch.len());
        let before = game.snapshot();
        let applied = match game.apply_batch(batch) {
            Ok(applied) => applied,
            Err(err) => {
                warn!(index, player, %err, "batch rejected");
                report.rejected += 1;
                continue;
            }
        };
        if applied < total {
            warn!(index, player, skipped = total - applied, "moves no longer applied");
        }
        report.applied += applied;
        report.skipped += total - applied;

        if !verify(game, &before) {
            warn!(index, player, "undo/redo diverged");
            report.diverged.push(index);
        }
        game.commit();
        debug!(index, player, applied, turn = game.turn(), "batch replayed");
    }

    report.turn = game.turn();
    report.regions = game.map().regions().len();
    info!(
        batches = report.batches,
        applied = report.applied,
        rejected = report.rejected,
        turn = report.turn,
        "replay finished"
    );
    report
}

/// Undo everything in the history, then redo it, checking both ends
fn verify(game: &mut GameState, before: &MapSnapshot) -> bool {
    let after = game.snapshot();
    while game.history().can_undo() {
        game.undo();
    }
    let rewound = game.snapshot() == *before;
    while game.history().can_redo() {
        game.redo();
    }
    rewound && game.snapshot() == after
}

#[cfg(test)]
mod tests {
    use super::*;
    use hexfront_core::moves::EntityWithdraw;
    use pretty_assertions::assert_eq;

    fn demo_game(rules: &Rules) -> GameState {
        let mut game = GameState::new(rules.clone(), 17);
        game.load(&demo_template(rules));
        game
    }

    #[test]
    fn test_demo_replay_verifies() {
        let rules = Rules::default();
        let batches = demo_batches(&demo_template(&rules), &rules, 17, 3);
        assert_eq!(batches.len(), 6);
        let moves: usize = batches.iter().map(MoveBatch::len).sum();

        let mut game = demo_game(&rules);
        let report = run(&mut game, batches);
        assert!(report.verified());
        assert_eq!(report.rejected, 0);
        assert_eq!(report.skipped, 0);
        assert_eq!(report.applied, moves);
        assert_eq!(report.turn, 3);
        assert!(game.map().audit_regions().is_empty());
    }

    #[test]
    fn test_replays_are_deterministic() {
        let rules = Rules::default();
        let template = demo_template(&rules);
        let batches = demo_batches(&template, &rules, 17, 2);

        let mut first = demo_game(&rules);
        let mut second = demo_game(&rules);
        run(&mut first, batches.clone());
        run(&mut second, batches);
        assert_eq!(first.snapshot(), second.snapshot());
    }

    #[test]
    fn test_stale_and_skipped_moves_counted() {
        let rules = Rules::default();
        let mut game = demo_game(&rules);
        let batches = vec![
            MoveBatch::new(0, 4, Vec::new()),
            MoveBatch::new(
                1,
                0,
                vec![
                    EntityWithdraw::new(HexCoord::new(0, 0)).into(),
                    EntityWithdraw::new(HexCoord::new(1, 1)).into(),
                ],
            ),
        ];

        let report = run(&mut game, batches);
        assert_eq!(report.batches, 2);
        assert_eq!(report.rejected, 1);
        assert_eq!(report.applied, 1);
        assert_eq!(report.skipped, 1);
        assert!(report.verified());
    }
}
