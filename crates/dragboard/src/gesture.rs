#![forbid(unsafe_code)]

//! Pure data model of one in-flight drag gesture.
//!
//! A [`GestureState`] is created when a gesture arms and destroyed when it
//! settles back to idle. The engine owns the only instance; readers get a
//! shared reference and can never mutate it (all mutation goes through the
//! engine's transition methods).

use dragboard_core::id::{ItemId, ListId};
use dragboard_core::input::GeometrySnapshot;
use serde::{Deserialize, Serialize};

/// Placeholder height used when the source element was not measured.
///
/// Matches a typical card height so the board does not visibly jump while
/// the real measurement is pending.
pub const DEFAULT_PLACEHOLDER_HEIGHT: f32 = 88.0;

/// Lifecycle phase of a drag gesture.
///
/// ```text
/// Idle -> Armed -> Dragging -> Committing -> Idle
///                         \--> Cancelled --> Idle
/// ```
///
/// Phases only move forward; no phase is revisited except `Idle`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GesturePhase {
    /// No gesture in flight.
    Idle,
    /// Pointer-down with drag intent; waiting one frame before the drag
    /// becomes visible.
    Armed,
    /// Actively tracking pointer updates against candidate positions.
    Dragging,
    /// Move command emitted; preview teardown settling.
    Committing,
    /// Gesture abandoned; preview teardown settling.
    Cancelled,
}

impl GesturePhase {
    /// True for the phases in which the gesture can still be cancelled.
    #[must_use]
    pub const fn is_cancellable(&self) -> bool {
        matches!(self, Self::Armed | Self::Dragging)
    }

    /// True once the gesture has passed the point of no return.
    #[must_use]
    pub const fn is_terminal(&self) -> bool {
        matches!(self, Self::Committing | Self::Cancelled)
    }
}

/// State of the single in-flight gesture.
///
/// `target_index` is always expressed in post-removal index space: the
/// index the item would occupy in the destination list after the source
/// item has been conceptually removed from its origin list.
#[derive(Debug, Clone, PartialEq)]
pub struct GestureState {
    /// Current lifecycle phase. Never `Idle` while the state exists.
    pub phase: GesturePhase,
    /// Item being moved. Immutable for the gesture's lifetime.
    pub item_id: ItemId,
    /// Origin list. Immutable once armed.
    pub source_list: ListId,
    /// Index in the origin list's pre-gesture ordering. Immutable once armed.
    pub source_index: usize,
    /// Current best-known destination list.
    pub target_list: ListId,
    /// Current best-known destination index (post-removal space).
    pub target_index: usize,
    /// Height reserved for the placeholder element.
    pub placeholder_height: f32,
}

impl GestureState {
    /// Create the state for a freshly armed gesture.
    ///
    /// The target starts at the source position: inserting at
    /// `source_index` into the post-removal list restores the original
    /// order, so the initial target is already in post-removal space.
    #[must_use]
    pub fn armed(
        item_id: ItemId,
        source_list: ListId,
        source_index: usize,
        snapshot: GeometrySnapshot,
    ) -> Self {
        Self {
            phase: GesturePhase::Armed,
            item_id,
            source_list,
            source_index,
            target_list: source_list,
            target_index: source_index,
            placeholder_height: snapshot.item_height().unwrap_or(DEFAULT_PLACEHOLDER_HEIGHT),
        }
    }

    /// Current target as a `(list, index)` pair.
    #[must_use]
    pub fn target(&self) -> (ListId, usize) {
        (self.target_list, self.target_index)
    }

    /// Whether the gesture would move the item at all.
    ///
    /// A same-list drop back onto the source position is a no-op move; the
    /// host may use this to skip a persistence round-trip.
    #[must_use]
    pub fn is_identity_move(&self) -> bool {
        self.target_list == self.source_list && self.target_index == self.source_index
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use dragboard_core::geometry::Rect;

    #[test]
    fn armed_state_targets_source_position() {
        let g = GestureState::armed(ItemId(1), ListId(3), 2, GeometrySnapshot::unmeasured());
        assert_eq!(g.phase, GesturePhase::Armed);
        assert_eq!(g.target(), (ListId(3), 2));
        assert!(g.is_identity_move());
    }

    #[test]
    fn placeholder_height_from_snapshot() {
        let snap = GeometrySnapshot::measured(Rect::new(0.0, 0.0, 240.0, 120.0));
        let g = GestureState::armed(ItemId(1), ListId(1), 0, snap);
        assert_eq!(g.placeholder_height, 120.0);
    }

    #[test]
    fn placeholder_height_default_when_unmeasured() {
        let g = GestureState::armed(ItemId(1), ListId(1), 0, GeometrySnapshot::unmeasured());
        assert_eq!(g.placeholder_height, DEFAULT_PLACEHOLDER_HEIGHT);
    }

    #[test]
    fn phase_predicates() {
        assert!(GesturePhase::Armed.is_cancellable());
        assert!(GesturePhase::Dragging.is_cancellable());
        assert!(!GesturePhase::Committing.is_cancellable());
        assert!(GesturePhase::Committing.is_terminal());
        assert!(GesturePhase::Cancelled.is_terminal());
        assert!(!GesturePhase::Idle.is_terminal());
    }

    #[test]
    fn identity_move_detection() {
        let mut g = GestureState::armed(ItemId(1), ListId(1), 2, GeometrySnapshot::unmeasured());
        assert!(g.is_identity_move());
        g.target_index = 3;
        assert!(!g.is_identity_move());
        g.target_index = 2;
        g.target_list = ListId(2);
        assert!(!g.is_identity_move());
    }
}
