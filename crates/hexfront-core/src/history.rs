//! Undo/redo log of applied moves.

use serde::{Deserialize, Serialize};

use crate::hex::HexCoord;
use crate::map::Map;
use crate::moves::Move;

/// Moves before `cursor` are applied; moves from `cursor` on can be redone
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct History {
    moves: Vec<Move>,
    cursor: usize,
}

impl History {
    pub fn new() -> Self {
        Self::default()
    }

    /// Apply a move and record it, dropping anything that could be redone.
    ///
    /// Returns false, recording nothing, when the move does not apply.
    pub fn add(&mut self, map: &mut Map, mut mv: Move) -> bool {
        self.moves.truncate(self.cursor);
        if !mv.apply(map) {
            return false;
        }
        self.moves.push(mv);
        self.cursor = self.moves.len();
        true
    }

    /// Revert the last applied move and return its cursor hint
    pub fn undo(&mut self, map: &mut Map) -> Option<HexCoord> {
        if !self.can_undo() {
            return None;
        }
        self.cursor -= 1;
        let mv = &mut self.moves[self.cursor];
        mv.revert(map);
        mv.revert_cursor()
    }

    /// Re-apply the next undone move and return its cursor hint.
    ///
    /// A move that no longer applies stays undone and gives `None`.
    pub fn redo(&mut self, map: &mut Map) -> Option<HexCoord> {
        if !self.can_redo() {
            return None;
        }
        let mv = &mut self.moves[self.cursor];
        if !mv.apply(map) {
            return None;
        }
        self.cursor += 1;
        mv.apply_cursor()
    }

    pub fn can_undo(&self) -> bool {
        self.cursor > 0
    }

    pub fn can_redo(&self) -> bool {
        self.cursor < self.moves.len()
    }

    /// Applied moves, oldest first
    pub fn list(&self) -> &[Move] {
        &self.moves[..self.cursor]
    }

    /// Number of applied and redoable moves
    pub fn count(&self) -> (usize, usize) {
        (self.cursor, self.moves.len() - self.cursor)
    }

    /// Most recently applied move
    pub fn last(&self) -> Option<&Move> {
        self.list().last()
    }

    /// Move that `redo` would apply
    pub fn next(&self) -> Option<&Move> {
        self.moves.get(self.cursor)
    }

    pub fn len(&self) -> usize {
        self.moves.len()
    }

    pub fn is_empty(&self) -> bool {
        self.moves.is_empty()
    }

    pub fn clear(&mut self) {
        self.moves.clear();
        self.cursor = 0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entity::{Effect, TroopKind};
    use crate::hex::GridSize;
    use crate::moves::{EntityEffect, EntityWithdraw, TroopMove};
    use crate::rules::Rules;
    use crate::template::Template;
    use crate::tile::{Team, Terrain};

    fn setup() -> (Map, History) {
        let mut template = Template::filled(GridSize::new(4, 4), Terrain::Ground, Team::Red);
        template.troops.push((HexCoord::new(0, 0), Rules::default().troop(TroopKind::Farmer)).into());
        let mut map = Map::default();
        template.construct(&mut map);
        (map, History::new())
    }

    #[test]
    fn test_add_undo_redo() {
        let (mut map, mut history) = setup();
        let start = map.snapshot();
        let (a, b) = (HexCoord::new(0, 0), HexCoord::new(1, 0));

        assert!(history.add(&mut map, TroopMove::new(a, b).into()));
        assert!(history.add(&mut map, EntityEffect::new(b, Effect::Shielded).into()));
        let end = map.snapshot();
        assert_eq!(history.count(), (2, 0));

        assert_eq!(history.undo(&mut map), Some(b));
        assert_eq!(history.undo(&mut map), Some(a));
        assert_eq!(history.undo(&mut map), None);
        assert_eq!(map.snapshot(), start);
        assert_eq!(history.count(), (0, 2));

        assert_eq!(history.redo(&mut map), Some(b));
        assert_eq!(history.redo(&mut map), Some(b));
        assert_eq!(history.redo(&mut map), None);
        assert_eq!(map.snapshot(), end);
    }

    #[test]
    fn test_failed_move_not_recorded() {
        let (mut map, mut history) = setup();
        assert!(!history.add(&mut map, EntityWithdraw::new(HexCoord::new(3, 3)).into()));
        assert!(history.is_empty());
        assert!(!history.can_undo());
    }

    #[test]
    fn test_redo_stops_at_stale_move() {
        let (mut map, mut history) = setup();
        let (a, b) = (HexCoord::new(0, 0), HexCoord::new(1, 0));
        history.add(&mut map, TroopMove::new(a, b).into());
        history.undo(&mut map);

        // The troop is gone, so the move cannot be replayed.
        map.take_occupant(a);
        let before = map.snapshot();
        assert_eq!(history.redo(&mut map), None);
        assert_eq!(history.count(), (0, 1));
        assert!(history.can_redo());
        assert_eq!(map.snapshot(), before);
    }

    #[test]
    fn test_add_prunes_redo_tail() {
        let (mut map, mut history) = setup();
        let (a, b, c) = (HexCoord::new(0, 0), HexCoord::new(1, 0), HexCoord::new(0, 1));
        history.add(&mut map, TroopMove::new(a, b).into());
        history.undo(&mut map);
        assert!(history.can_redo());

        assert!(history.add(&mut map, TroopMove::new(a, c).into()));
        assert!(!history.can_redo());
        assert_eq!(history.len(), 1);
        assert_eq!(history.last().and_then(Move::apply_cursor), Some(c));
        assert!(history.next().is_none());
    }

    #[test]
    fn test_list_excludes_undone() {
        let (mut map, mut history) = setup();
        history.add(&mut map, EntityEffect::new(HexCoord::new(0, 0), Effect::Shielded).into());
        history.add(&mut map, EntityEffect::new(HexCoord::new(0, 0), Effect::OffenseBoost).into());
        history.undo(&mut map);
        assert_eq!(history.list().len(), 1);

        history.clear();
        assert_eq!(history.count(), (0, 0));
    }
}
