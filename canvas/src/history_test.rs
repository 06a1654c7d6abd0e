use super::*;
use crate::scene::{Shape, ShapeKind};
use uuid::Uuid;

fn snap(n: usize) -> Snapshot {
    (0..n).map(|i| Shape::new(ShapeKind::Circle, i as f64 * 10.0, 0.0)).collect()
}

// =============================================================
// Push / undo / redo
// =============================================================

#[test]
fn empty_history_has_nothing_to_undo_or_redo() {
    let mut h = History::new(10);
    assert!(!h.can_undo());
    assert!(!h.can_redo());
    assert!(h.undo(snap(1)).is_none());
    assert!(h.redo(snap(1)).is_none());
}

#[test]
fn undo_returns_pushed_snapshot_and_enables_redo() {
    let mut h = History::new(10);
    let before = snap(0);
    let current = snap(1);
    h.push(before.clone());

    let restored = h.undo(current.clone()).unwrap();
    assert_eq!(restored, before);
    assert!(h.can_redo());

    let again = h.redo(restored).unwrap();
    assert_eq!(again, current);
    assert!(h.can_undo());
    assert!(!h.can_redo());
}

#[test]
fn push_clears_redo() {
    let mut h = History::new(10);
    h.push(snap(0));
    let _restored = h.undo(snap(1));
    assert!(h.can_redo());
    h.push(snap(0));
    assert!(!h.can_redo());
}

#[test]
fn undo_failure_leaves_redo_untouched() {
    let mut h = History::new(10);
    assert!(h.undo(snap(2)).is_none());
    assert_eq!(h.redo_len(), 0);
}

// =============================================================
// Depth bound
// =============================================================

#[test]
fn oldest_entries_evicted_first() {
    let mut h = History::new(3);
    for n in 0..5 {
        h.push(snap(n));
    }
    assert_eq!(h.undo_len(), 3);
    let mut lens = Vec::new();
    let mut current = snap(5);
    while let Some(prev) = h.undo(current) {
        lens.push(prev.len());
        current = prev;
    }
    assert_eq!(lens, vec![4, 3, 2]);
}

#[test]
fn zero_depth_is_treated_as_one() {
    let mut h = History::new(0);
    h.push(snap(0));
    h.push(snap(1));
    assert_eq!(h.undo_len(), 1);
}

#[test]
fn clear_empties_both_stacks() {
    let mut h = History::new(5);
    h.push(snap(0));
    h.push(snap(1));
    let _restored = h.undo(snap(2));
    h.clear();
    assert!(!h.can_undo());
    assert!(!h.can_redo());
}

// =============================================================
// Durable ids
// =============================================================

#[test]
fn assign_durable_ids_updates_both_stacks() {
    let mut h = History::new(5);
    let shape = Shape::new(ShapeKind::Square, 0.0, 0.0);
    let id = shape.id;
    h.push(vec![shape.clone()]);
    h.push(vec![shape.clone(), Shape::new(ShapeKind::Circle, 0.0, 0.0)]);
    let _restored = h.undo(vec![shape]);

    let durable = Uuid::new_v4();
    h.assign_durable_ids(&HashMap::from([(id, durable)]));

    let redo = h.redo(Vec::new()).unwrap();
    assert_eq!(redo[0].durable_id, Some(durable));
    // Step back over the empty current pushed by redo, then to the first entry.
    let _empty = h.undo(Vec::new());
    let oldest = h.undo(Vec::new()).unwrap();
    assert_eq!(oldest[0].durable_id, Some(durable));
}

#[test]
fn clear_stale_durable_ids_updates_both_stacks() {
    let mut h = History::new(5);
    let mut shape = Shape::new(ShapeKind::Square, 0.0, 0.0);
    shape.durable_id = Some(Uuid::new_v4());
    h.push(vec![shape.clone()]);
    h.push(vec![shape.clone()]);
    let _restored = h.undo(vec![shape]);

    assert_eq!(h.clear_stale_durable_ids(&HashSet::new()), 2);
    let redo = h.redo(Vec::new()).unwrap();
    assert_eq!(redo[0].durable_id, None);
    let _empty = h.undo(Vec::new());
    let oldest = h.undo(Vec::new()).unwrap();
    assert_eq!(oldest[0].durable_id, None);
}
