#![forbid(unsafe_code)]

//! Canonical target-index resolution.
//!
//! Given a pointer position over a candidate slot, produce the single
//! authoritative insertion index in post-removal space. Two paths exist:
//!
//! - **Measured**: the candidate item has a live rectangle, so the
//!   half-point rule applies — pointer above the vertical midpoint inserts
//!   before the item, at or below it inserts after. Deterministic, no
//!   hysteresis band.
//! - **Coarse**: the candidate item has no usable geometry (virtualized or
//!   detached). The list is bucketed into bands from whatever mounted
//!   rects exist; when no band contains the pointer the resolution
//!   defaults to the end of the list.
//!
//! Both paths convert the raw index (current visual order, source item
//! still present) into post-removal space: for a same-list move any raw
//! index past the source shifts down by one, cross-list indices pass
//! through unchanged. The result is clamped to the post-removal length.

use dragboard_core::geometry::Rect;
use dragboard_core::id::ListId;
use dragboard_core::input::{CandidatePosition, MountedBand};

/// An insertion slot relative to an item ordinal in current visual order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DropSlot {
    /// Insert before the item at the given ordinal.
    Before(usize),
    /// Insert after the item at the given ordinal.
    After(usize),
    /// Append past the last item.
    End,
}

impl DropSlot {
    /// Apply the half-point rule to a measured candidate rectangle.
    #[must_use]
    pub fn from_pointer(pointer_y: f32, rect: Rect, ordinal: usize) -> Self {
        if pointer_y < rect.mid_y() {
            Self::Before(ordinal)
        } else {
            Self::After(ordinal)
        }
    }

    /// Raw insertion index in the list's current (pre-removal) order.
    #[must_use]
    pub fn raw_index(&self, list_len: usize) -> usize {
        match self {
            Self::Before(i) => *i,
            Self::After(i) => i + 1,
            Self::End => list_len,
        }
    }
}

/// Convert a raw pre-removal index into post-removal space and clamp.
///
/// `list_len` is the candidate list's current visual length, source item
/// included when the move is same-list.
#[must_use]
pub fn to_post_removal(
    raw: usize,
    source_list: ListId,
    source_index: usize,
    candidate_list: ListId,
    list_len: usize,
) -> usize {
    let same_list = candidate_list == source_list;
    let adjusted = if same_list && raw > source_index {
        // Removing the source shifts everything after it up by one.
        raw - 1
    } else {
        raw
    };
    let post_removal_len = if same_list {
        list_len.saturating_sub(1)
    } else {
        list_len
    };
    adjusted.min(post_removal_len)
}

/// Resolve a candidate with live item geometry via the half-point rule.
#[must_use]
pub fn resolve_measured(
    pointer_y: f32,
    rect: Rect,
    ordinal: usize,
    source_list: ListId,
    source_index: usize,
    candidate_list: ListId,
    list_len: usize,
) -> usize {
    let raw = DropSlot::from_pointer(pointer_y, rect, ordinal).raw_index(list_len);
    to_post_removal(raw, source_list, source_index, candidate_list, list_len)
}

/// Resolve a candidate without usable geometry from mounted-item bands.
///
/// Picks the band whose vertical extent contains the pointer and applies
/// the half-point rule within it; with no containing band (pointer over
/// unmounted territory, or nothing mounted at all) the slot defaults to
/// the list end.
#[must_use]
pub fn resolve_coarse(
    pointer_y: f32,
    mounted: &[MountedBand],
    source_list: ListId,
    source_index: usize,
    candidate_list: ListId,
    list_len: usize,
) -> usize {
    let slot = mounted
        .iter()
        .filter(|band| !band.rect.is_empty())
        .find(|band| band.rect.contains_y(pointer_y))
        .map(|band| DropSlot::from_pointer(pointer_y, band.rect, band.ordinal))
        .unwrap_or(DropSlot::End);
    let raw = slot.raw_index(list_len);
    to_post_removal(raw, source_list, source_index, candidate_list, list_len)
}

/// Resolve a full candidate position against the gesture's source.
///
/// Routes to the measured path when the candidate rect is usable and the
/// coarse path otherwise. An empty destination list always resolves to 0
/// regardless of pointer position.
#[must_use]
pub fn resolve_target_index(
    candidate: &CandidatePosition,
    source_list: ListId,
    source_index: usize,
) -> usize {
    match candidate.usable_rect() {
        Some(rect) => resolve_measured(
            candidate.pointer.y,
            rect,
            candidate.ordinal,
            source_list,
            source_index,
            candidate.list,
            candidate.list_len,
        ),
        None => {
            let mounted: &[MountedBand] = match &candidate.geometry {
                dragboard_core::input::CandidateGeometry::Unmeasured { mounted } => mounted,
                // Measured but zero-size: treat as having no live bands.
                dragboard_core::input::CandidateGeometry::Measured(_) => &[],
            };
            resolve_coarse(
                candidate.pointer.y,
                mounted,
                source_list,
                source_index,
                candidate.list,
                candidate.list_len,
            )
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use dragboard_core::geometry::Point;
    use proptest::prelude::*;

    fn card(ordinal: usize) -> Rect {
        // 88px cards stacked from y=0.
        Rect::new(0.0, ordinal as f32 * 88.0, 240.0, 88.0)
    }

    // === half-point rule ===

    #[test]
    fn above_midpoint_inserts_before() {
        let slot = DropSlot::from_pointer(10.0, card(0), 0);
        assert_eq!(slot, DropSlot::Before(0));
    }

    #[test]
    fn below_midpoint_inserts_after() {
        let slot = DropSlot::from_pointer(80.0, card(0), 0);
        assert_eq!(slot, DropSlot::After(0));
    }

    #[test]
    fn exact_midpoint_inserts_after() {
        let slot = DropSlot::from_pointer(44.0, card(0), 0);
        assert_eq!(slot, DropSlot::After(0));
    }

    #[test]
    fn end_slot_is_list_len() {
        assert_eq!(DropSlot::End.raw_index(7), 7);
        assert_eq!(DropSlot::After(6).raw_index(7), 7);
        assert_eq!(DropSlot::Before(0).raw_index(7), 0);
    }

    // === post-removal conversion ===

    #[test]
    fn same_list_past_source_shifts_down() {
        // List [A,B,C,D], dragging A (index 0) to raw 3 (after D):
        // post-removal list is [B,C,D], inserting at 2 yields [B,C,A,D].
        assert_eq!(to_post_removal(3, ListId(1), 0, ListId(1), 4), 2);
    }

    #[test]
    fn same_list_at_or_before_source_unchanged() {
        assert_eq!(to_post_removal(2, ListId(1), 2, ListId(1), 4), 2);
        assert_eq!(to_post_removal(1, ListId(1), 2, ListId(1), 4), 1);
        assert_eq!(to_post_removal(0, ListId(1), 2, ListId(1), 4), 0);
    }

    #[test]
    fn cross_list_unchanged() {
        // Dragging from list X index 1 to list Y raw 2: no adjustment.
        assert_eq!(to_post_removal(2, ListId(1), 1, ListId(2), 5), 2);
    }

    #[test]
    fn clamped_to_post_removal_len() {
        // Same-list: raw can never exceed len, but a stale ordinal might.
        assert_eq!(to_post_removal(9, ListId(1), 0, ListId(1), 4), 3);
        // Cross-list: clamp to destination length.
        assert_eq!(to_post_removal(9, ListId(1), 0, ListId(2), 4), 4);
    }

    #[test]
    fn empty_list_resolves_to_zero() {
        assert_eq!(to_post_removal(0, ListId(1), 0, ListId(2), 0), 0);
        let c = CandidatePosition::unmeasured(
            ListId(2),
            0,
            Point::new(0.0, 9999.0),
            Vec::new(),
            0,
        );
        assert_eq!(resolve_target_index(&c, ListId(1), 3), 0);
    }

    // === end-to-end scenarios ===

    #[test]
    fn drag_b_below_c_midpoint() {
        // Source list [A,B,C], drag B (index 1) past C's midpoint:
        // raw = 3 (after C), same-list and 3 > 1 so target = 2,
        // final order [A,C,B].
        let target = resolve_measured(
            250.0, // below midpoint of C (y 176..264, mid 220)
            card(2),
            2,
            ListId(1),
            1,
            ListId(1),
            3,
        );
        assert_eq!(target, 2);
    }

    #[test]
    fn drag_down_one_slot_is_not_identity() {
        // [A,B,C], drag A just past B's midpoint: raw 2 -> target 1.
        let target = resolve_measured(160.0, card(1), 1, ListId(1), 0, ListId(1), 3);
        assert_eq!(target, 1);
    }

    #[test]
    fn drag_up_keeps_raw_index() {
        // [A,B,C], drag C above B's midpoint: raw 1, 1 <= 2 -> target 1.
        let target = resolve_measured(90.0, card(1), 1, ListId(1), 2, ListId(1), 3);
        assert_eq!(target, 1);
    }

    // === coarse banding ===

    #[test]
    fn coarse_picks_containing_band() {
        let mounted = vec![
            MountedBand {
                ordinal: 4,
                rect: card(4),
            },
            MountedBand {
                ordinal: 5,
                rect: card(5),
            },
        ];
        // Pointer in lower half of ordinal 5's band -> after -> raw 6.
        let target = resolve_coarse(
            5.0 * 88.0 + 70.0,
            &mounted,
            ListId(1),
            9,
            ListId(1),
            20,
        );
        assert_eq!(target, 6);
    }

    #[test]
    fn coarse_defaults_to_list_end() {
        let mounted = vec![MountedBand {
            ordinal: 0,
            rect: card(0),
        }];
        // Pointer far below anything mounted.
        let target = resolve_coarse(5000.0, &mounted, ListId(2), 1, ListId(1), 12);
        assert_eq!(target, 12);
    }

    #[test]
    fn coarse_ignores_zero_size_bands() {
        let mounted = vec![MountedBand {
            ordinal: 3,
            rect: Rect::new(0.0, 0.0, 240.0, 0.0),
        }];
        let target = resolve_coarse(10.0, &mounted, ListId(2), 0, ListId(1), 8);
        assert_eq!(target, 8);
    }

    #[test]
    fn zero_size_measured_rect_routes_to_coarse() {
        let c = CandidatePosition::measured(
            ListId(1),
            2,
            Point::new(10.0, 100.0),
            Rect::new(0.0, 0.0, 0.0, 0.0),
            5,
        );
        // No bands available: end of list, post-removal (same list) = 4.
        assert_eq!(resolve_target_index(&c, ListId(1), 0), 4);
    }

    // === properties ===

    proptest! {
        /// Same-list: resolved = raw - 1 when raw > source, else raw
        /// (before clamping effects, which the bounds here avoid).
        #[test]
        fn same_list_index_space(source in 0usize..16, raw in 0usize..17) {
            let list_len = 17;
            let resolved = to_post_removal(raw, ListId(1), source, ListId(1), list_len);
            let expected = if raw > source { raw - 1 } else { raw };
            prop_assert_eq!(resolved, expected);
        }

        /// Cross-list: resolved index passes through unchanged within bounds.
        #[test]
        fn cross_list_passthrough(source in 0usize..16, raw in 0usize..9, len in 9usize..32) {
            let resolved = to_post_removal(raw, ListId(1), source, ListId(2), len);
            prop_assert_eq!(resolved, raw);
        }

        /// The resolved index never exceeds the post-removal length.
        #[test]
        fn always_within_post_removal_bounds(
            raw in 0usize..64,
            source in 0usize..32,
            len in 0usize..32,
            same in proptest::bool::ANY,
        ) {
            let candidate_list = if same { ListId(1) } else { ListId(2) };
            let resolved = to_post_removal(raw, ListId(1), source, candidate_list, len);
            let post_len = if same { len.saturating_sub(1) } else { len };
            prop_assert!(resolved <= post_len);
        }

        /// The half-point rule is exhaustive: every pointer y maps to a slot
        /// whose raw index is adjacent to the candidate ordinal.
        #[test]
        fn half_point_raw_adjacent(y in 0.0f32..2000.0, ordinal in 0usize..20) {
            let rect = card(ordinal);
            let raw = DropSlot::from_pointer(y, rect, ordinal).raw_index(20);
            prop_assert!(raw == ordinal || raw == ordinal + 1);
        }
    }
}
