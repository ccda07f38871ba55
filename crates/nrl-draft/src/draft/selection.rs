// Selection sets and the assignment controller.
//
// A player can sit in the priority queue (an ordered want-list per position)
// or the drafted roster, never both. The hidden set marks players taken by
// other managers and is independent of the other two, except that a hidden
// player is never left in the priority queue.
//
// Every operation is total: unknown ids, duplicate assignments, and
// out-of-range indices are absorbed as no-ops. Mutators return `true` when
// the state actually changed so callers know whether a save is needed.

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::catalog::player::{PlayerId, Position};
use crate::catalog::Catalog;

/// Player ids per assigned position.
pub type Buckets = BTreeMap<Position, Vec<PlayerId>>;

/// Which positional collection an operation targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SetKind {
    Priority,
    Roster,
}

/// A drag-and-drop request: move the item at `from` to `to`. `to` is `None`
/// when the item was dropped outside any bucket.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DragMove {
    pub from: (Position, usize),
    pub to: Option<(Position, usize)>,
}

/// The user's selections. Buckets are keyed by the position the player was
/// assigned to, which may differ from their innate position. Empty buckets
/// are never stored.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SelectionSets {
    #[serde(default)]
    priority: Buckets,
    #[serde(default)]
    roster: Buckets,
    #[serde(default)]
    hidden: BTreeSet<PlayerId>,
}

impl SelectionSets {
    pub fn new() -> Self {
        Self::default()
    }

    /// Assemble sets from separately stored documents. Call `normalize`
    /// afterwards; the parts may disagree with each other.
    pub fn from_parts(priority: Buckets, roster: Buckets, hidden: BTreeSet<PlayerId>) -> Self {
        SelectionSets {
            priority,
            roster,
            hidden,
        }
    }

    pub fn priority(&self) -> &Buckets {
        &self.priority
    }

    pub fn roster(&self) -> &Buckets {
        &self.roster
    }

    // ------------------------------------------------------------------
    // Queries
    // ------------------------------------------------------------------

    pub fn priority_bucket(&self, pos: Position) -> &[PlayerId] {
        self.priority.get(&pos).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn roster_bucket(&self, pos: Position) -> &[PlayerId] {
        self.roster.get(&pos).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Assigned position of a queued player.
    pub fn priority_position(&self, id: PlayerId) -> Option<Position> {
        find_bucket(&self.priority, id)
    }

    /// Assigned position of a drafted player.
    pub fn roster_position(&self, id: PlayerId) -> Option<Position> {
        find_bucket(&self.roster, id)
    }

    pub fn is_prioritized(&self, id: PlayerId) -> bool {
        self.priority_position(id).is_some()
    }

    pub fn is_drafted(&self, id: PlayerId) -> bool {
        self.roster_position(id).is_some()
    }

    pub fn is_hidden(&self, id: PlayerId) -> bool {
        self.hidden.contains(&id)
    }

    pub fn hidden(&self) -> &BTreeSet<PlayerId> {
        &self.hidden
    }

    pub fn priority_ids(&self) -> BTreeSet<PlayerId> {
        self.priority.values().flatten().copied().collect()
    }

    pub fn drafted_ids(&self) -> BTreeSet<PlayerId> {
        self.roster.values().flatten().copied().collect()
    }

    pub fn priority_len(&self) -> usize {
        self.priority.values().map(Vec::len).sum()
    }

    pub fn roster_len(&self) -> usize {
        self.roster.values().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.priority.is_empty() && self.roster.is_empty() && self.hidden.is_empty()
    }

    // ------------------------------------------------------------------
    // Assignment controller
    // ------------------------------------------------------------------

    /// Append a catalog player to the tail of `priority[pos]`.
    ///
    /// No-op when the player is unknown, already queued at any position,
    /// already drafted, or hidden.
    pub fn assign_to_priority(&mut self, catalog: &Catalog, id: PlayerId, pos: Position) -> bool {
        if !catalog.contains(id) {
            debug!("assign_to_priority: unknown player {id}");
            return false;
        }
        if self.is_prioritized(id) || self.is_drafted(id) || self.is_hidden(id) {
            return false;
        }
        self.priority.entry(pos).or_default().push(id);
        true
    }

    /// Draft a catalog player into `roster[pos]`, pulling them out of the
    /// priority queue first. No-op when the player is unknown or already
    /// drafted.
    pub fn assign_to_roster(&mut self, catalog: &Catalog, id: PlayerId, pos: Position) -> bool {
        if !catalog.contains(id) {
            debug!("assign_to_roster: unknown player {id}");
            return false;
        }
        if self.is_drafted(id) {
            return false;
        }
        remove_everywhere(&mut self.priority, id);
        self.roster.entry(pos).or_default().push(id);
        true
    }

    /// Move the item at `from` to `to` within `priority[pos]`. `to` is
    /// clamped to the last index; an out-of-range `from` is ignored.
    pub fn reorder_priority(&mut self, pos: Position, from: usize, to: usize) -> bool {
        let Some(bucket) = self.priority.get_mut(&pos) else {
            return false;
        };
        if from >= bucket.len() {
            return false;
        }
        let to = to.min(bucket.len() - 1);
        if from == to {
            return false;
        }
        let id = bucket.remove(from);
        bucket.insert(to, id);
        true
    }

    /// Apply a drag result. Drops outside a bucket and moves between
    /// different positions are rejected.
    pub fn apply_drag(&mut self, drag: DragMove) -> bool {
        match drag.to {
            Some((to_pos, to_idx)) if to_pos == drag.from.0 => {
                self.reorder_priority(to_pos, drag.from.1, to_idx)
            }
            _ => false,
        }
    }

    pub fn remove_from_priority(&mut self, id: PlayerId) -> bool {
        remove_everywhere(&mut self.priority, id)
    }

    pub fn remove_from_roster(&mut self, id: PlayerId) -> bool {
        remove_everywhere(&mut self.roster, id)
    }

    /// Mark a player as taken elsewhere. A hidden player cannot stay wanted,
    /// so they also leave the priority queue.
    pub fn mark_hidden(&mut self, id: PlayerId) -> bool {
        let inserted = self.hidden.insert(id);
        let dequeued = remove_everywhere(&mut self.priority, id);
        inserted || dequeued
    }

    pub fn unhide(&mut self, id: PlayerId) -> bool {
        self.hidden.remove(&id)
    }

    pub fn clear_priority(&mut self) -> bool {
        let changed = !self.priority.is_empty();
        self.priority.clear();
        changed
    }

    pub fn clear_roster(&mut self) -> bool {
        let changed = !self.roster.is_empty();
        self.roster.clear();
        changed
    }

    pub fn clear_hidden(&mut self) -> bool {
        let changed = !self.hidden.is_empty();
        self.hidden.clear();
        changed
    }

    pub fn clear_position(&mut self, kind: SetKind, pos: Position) -> bool {
        let buckets = match kind {
            SetKind::Priority => &mut self.priority,
            SetKind::Roster => &mut self.roster,
        };
        buckets.remove(&pos).is_some()
    }

    /// Restore the empty initial configuration.
    pub fn reset_all(&mut self) -> bool {
        let changed = !self.is_empty();
        *self = SelectionSets::default();
        changed
    }

    /// Repair a loaded document so the invariants hold again: duplicate ids
    /// keep their first slot, drafted and hidden players leave the queue, and
    /// empty buckets are dropped. Returns `true` if anything was repaired.
    pub fn normalize(&mut self) -> bool {
        let before = self.clone();

        let mut seen = BTreeSet::new();
        for bucket in self.roster.values_mut() {
            bucket.retain(|id| seen.insert(*id));
        }
        let drafted = seen;

        let hidden = &self.hidden;
        let mut seen = BTreeSet::new();
        for bucket in self.priority.values_mut() {
            bucket.retain(|id| !drafted.contains(id) && !hidden.contains(id) && seen.insert(*id));
        }

        self.priority.retain(|_, b| !b.is_empty());
        self.roster.retain(|_, b| !b.is_empty());
        *self != before
    }
}

fn find_bucket(buckets: &Buckets, id: PlayerId) -> Option<Position> {
    buckets
        .iter()
        .find(|(_, ids)| ids.contains(&id))
        .map(|(pos, _)| *pos)
}

/// Remove `id` from every bucket, dropping buckets that become empty.
fn remove_everywhere(buckets: &mut Buckets, id: PlayerId) -> bool {
    let mut removed = false;
    for ids in buckets.values_mut() {
        let len = ids.len();
        ids.retain(|&p| p != id);
        removed |= ids.len() != len;
    }
    buckets.retain(|_, ids| !ids.is_empty());
    removed
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::player::{Player, PlayerStats};

    fn test_catalog() -> Catalog {
        Catalog::new(
            (1..=6)
                .map(|id| Player {
                    id,
                    first_name: format!("Player{id}"),
                    last_name: String::new(),
                    positions: vec![Position::Middle, Position::Edge],
                    stats: PlayerStats::default(),
                    status: None,
                })
                .collect(),
        )
    }

    fn queued(catalog: &Catalog, ids: &[PlayerId], pos: Position) -> SelectionSets {
        let mut sets = SelectionSets::new();
        for &id in ids {
            assert!(sets.assign_to_priority(catalog, id, pos));
        }
        sets
    }

    #[test]
    fn assign_to_priority_appends_to_tail() {
        let catalog = test_catalog();
        let sets = queued(&catalog, &[3, 1, 2], Position::Middle);
        assert_eq!(sets.priority_bucket(Position::Middle), &[3, 1, 2]);
        assert_eq!(sets.priority_position(1), Some(Position::Middle));
    }

    #[test]
    fn assign_to_priority_is_idempotent() {
        let catalog = test_catalog();
        let mut sets = queued(&catalog, &[1], Position::Middle);
        let once = sets.clone();
        assert!(!sets.assign_to_priority(&catalog, 1, Position::Middle));
        assert!(!sets.assign_to_priority(&catalog, 1, Position::Edge));
        assert_eq!(sets, once);
    }

    #[test]
    fn assign_to_priority_ignores_unknown_player() {
        let catalog = test_catalog();
        let mut sets = SelectionSets::new();
        assert!(!sets.assign_to_priority(&catalog, 99, Position::Hooker));
        assert!(sets.is_empty());
    }

    #[test]
    fn assign_to_roster_removes_from_every_priority_bucket() {
        let catalog = test_catalog();
        let mut sets = queued(&catalog, &[1, 2], Position::Middle);
        assert!(sets.assign_to_priority(&catalog, 3, Position::Edge));

        assert!(sets.assign_to_roster(&catalog, 3, Position::Reserve));
        assert!(!sets.is_prioritized(3));
        assert_eq!(sets.roster_bucket(Position::Reserve), &[3]);
        assert!(sets.priority_bucket(Position::Edge).is_empty());
        assert_eq!(sets.priority_bucket(Position::Middle), &[1, 2]);
    }

    #[test]
    fn assign_to_roster_keeps_one_entry_per_player() {
        let catalog = test_catalog();
        let mut sets = SelectionSets::new();
        assert!(sets.assign_to_roster(&catalog, 4, Position::Edge));
        assert!(!sets.assign_to_roster(&catalog, 4, Position::Middle));
        assert_eq!(sets.roster_len(), 1);
        assert_eq!(sets.roster_position(4), Some(Position::Edge));
    }

    #[test]
    fn drafted_player_cannot_be_queued() {
        let catalog = test_catalog();
        let mut sets = SelectionSets::new();
        sets.assign_to_roster(&catalog, 4, Position::Edge);
        assert!(!sets.assign_to_priority(&catalog, 4, Position::Edge));
        assert!(!sets.is_prioritized(4));
    }

    #[test]
    fn reorder_moves_within_bucket() {
        let catalog = test_catalog();
        let mut sets = queued(&catalog, &[1, 2, 3, 4], Position::Middle);
        assert!(sets.reorder_priority(Position::Middle, 0, 2));
        assert_eq!(sets.priority_bucket(Position::Middle), &[2, 3, 1, 4]);
        assert!(sets.reorder_priority(Position::Middle, 3, 0));
        assert_eq!(sets.priority_bucket(Position::Middle), &[4, 2, 3, 1]);
    }

    #[test]
    fn reorder_clamps_destination_and_ignores_bad_source() {
        let catalog = test_catalog();
        let mut sets = queued(&catalog, &[1, 2, 3], Position::Middle);
        assert!(sets.reorder_priority(Position::Middle, 0, 50));
        assert_eq!(sets.priority_bucket(Position::Middle), &[2, 3, 1]);

        assert!(!sets.reorder_priority(Position::Middle, 7, 0));
        assert!(!sets.reorder_priority(Position::Hooker, 0, 1));
        assert!(!sets.reorder_priority(Position::Middle, 1, 1));
        assert_eq!(sets.priority_bucket(Position::Middle), &[2, 3, 1]);
    }

    #[test]
    fn reorder_preserves_membership() {
        let catalog = test_catalog();
        let mut sets = queued(&catalog, &[1, 2, 3, 4, 5], Position::Middle);
        let before = sets.priority_ids();
        for (from, to) in [(0, 4), (4, 0), (2, 3), (1, 9)] {
            sets.reorder_priority(Position::Middle, from, to);
            assert_eq!(sets.priority_ids(), before);
            assert_eq!(sets.priority_bucket(Position::Middle).len(), 5);
        }
    }

    #[test]
    fn cross_position_drag_is_rejected() {
        let catalog = test_catalog();
        let mut sets = queued(&catalog, &[1, 2], Position::Hooker);
        sets.assign_to_priority(&catalog, 3, Position::Middle);
        let before = sets.clone();

        let drag = DragMove {
            from: (Position::Hooker, 0),
            to: Some((Position::Middle, 0)),
        };
        assert!(!sets.apply_drag(drag));
        assert!(!sets.apply_drag(DragMove {
            from: (Position::Hooker, 0),
            to: None,
        }));
        assert_eq!(sets, before);

        assert!(sets.apply_drag(DragMove {
            from: (Position::Hooker, 0),
            to: Some((Position::Hooker, 1)),
        }));
        assert_eq!(sets.priority_bucket(Position::Hooker), &[2, 1]);
    }

    #[test]
    fn removal_of_missing_id_is_noop() {
        let catalog = test_catalog();
        let mut sets = queued(&catalog, &[1], Position::Middle);
        assert!(!sets.remove_from_priority(42));
        assert!(!sets.remove_from_roster(1));
        assert!(sets.remove_from_priority(1));
        assert!(sets.is_empty());
    }

    #[test]
    fn mark_hidden_dequeues_player() {
        let catalog = test_catalog();
        let mut sets = queued(&catalog, &[1, 2], Position::Middle);
        assert!(sets.mark_hidden(1));
        assert!(sets.is_hidden(1));
        assert!(!sets.is_prioritized(1));
        assert!(!sets.mark_hidden(1));
        assert!(!sets.assign_to_priority(&catalog, 1, Position::Middle));

        assert!(sets.unhide(1));
        assert!(sets.assign_to_priority(&catalog, 1, Position::Middle));
    }

    #[test]
    fn hidden_does_not_touch_roster() {
        let catalog = test_catalog();
        let mut sets = SelectionSets::new();
        sets.assign_to_roster(&catalog, 5, Position::Centre);
        sets.mark_hidden(5);
        assert!(sets.is_drafted(5));
        assert!(sets.is_hidden(5));
    }

    #[test]
    fn clears_succeed_on_empty_sets() {
        let mut sets = SelectionSets::new();
        assert!(!sets.clear_priority());
        assert!(!sets.clear_roster());
        assert!(!sets.clear_hidden());
        assert!(!sets.clear_position(SetKind::Priority, Position::Half));
        assert!(!sets.reset_all());
    }

    #[test]
    fn clear_position_only_touches_one_bucket() {
        let catalog = test_catalog();
        let mut sets = queued(&catalog, &[1, 2], Position::Middle);
        sets.assign_to_priority(&catalog, 3, Position::Edge);
        sets.assign_to_roster(&catalog, 4, Position::Middle);

        assert!(sets.clear_position(SetKind::Priority, Position::Middle));
        assert!(sets.priority_bucket(Position::Middle).is_empty());
        assert_eq!(sets.priority_bucket(Position::Edge), &[3]);
        assert_eq!(sets.roster_bucket(Position::Middle), &[4]);
    }

    #[test]
    fn reset_all_restores_empty_state() {
        let catalog = test_catalog();
        let mut sets = queued(&catalog, &[1, 2], Position::Middle);
        sets.assign_to_roster(&catalog, 3, Position::Edge);
        sets.mark_hidden(6);
        assert!(sets.reset_all());
        assert_eq!(sets, SelectionSets::default());
    }

    #[test]
    fn serde_uses_position_labels_as_keys() {
        let catalog = test_catalog();
        let mut sets = queued(&catalog, &[1], Position::Hooker);
        sets.assign_to_roster(&catalog, 2, Position::Reserve);
        let value = serde_json::to_value(&sets).unwrap();
        assert_eq!(value["priority"]["HOK"], serde_json::json!([1]));
        assert_eq!(value["roster"]["RES"], serde_json::json!([2]));

        let back: SelectionSets = serde_json::from_value(value).unwrap();
        assert_eq!(back, sets);
    }

    #[test]
    fn normalize_repairs_loaded_document() {
        let mut sets: SelectionSets = serde_json::from_value(serde_json::json!({
            "priority": {"HOK": [1, 2, 1], "MID": [2, 3, 4], "EDG": []},
            "roster": {"MID": [3], "EDG": [3, 5]},
            "hidden": [4]
        }))
        .unwrap();
        assert!(sets.normalize());
        assert_eq!(sets.priority_bucket(Position::Hooker), &[1, 2]);
        assert!(sets.priority_bucket(Position::Middle).is_empty());
        assert_eq!(sets.roster_bucket(Position::Middle), &[3]);
        assert_eq!(sets.roster_bucket(Position::Edge), &[5]);
        assert!(!sets.normalize());
    }

    #[test]
    fn parts_round_trip_through_separate_documents() {
        let catalog = test_catalog();
        let mut sets = queued(&catalog, &[1, 2], Position::Middle);
        sets.assign_to_roster(&catalog, 3, Position::Reserve);
        sets.mark_hidden(6);

        let rebuilt = SelectionSets::from_parts(
            sets.priority().clone(),
            sets.roster().clone(),
            sets.hidden().clone(),
        );
        assert_eq!(rebuilt, sets);

        // A roster saved after the queue can leave a stale queue entry behind.
        let mut stale = SelectionSets::from_parts(
            sets.priority().clone(),
            [(Position::Middle, vec![2])].into_iter().collect(),
            BTreeSet::new(),
        );
        assert!(stale.normalize());
        assert_eq!(stale.priority_bucket(Position::Middle), &[1]);
        assert_eq!(stale.roster_position(2), Some(Position::Middle));
    }
}
