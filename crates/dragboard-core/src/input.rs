#![forbid(unsafe_code)]

//! Input types consumed by the reorder engine.
//!
//! A [`CandidatePosition`] describes one drag-over sample: which list the
//! pointer is in, which ordinal slot it is over, and (when available) the
//! live rectangle of the item under it. Candidates are ephemeral; the
//! engine never retains more than the latest one.

use crate::geometry::{Point, Rect};
use crate::id::ListId;
use bitflags::bitflags;
use std::fmt;

bitflags! {
    /// Keyboard modifiers held during a pointer event.
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct Modifiers: u8 {
        /// No modifiers.
        const NONE  = 0b0000;
        /// Shift key.
        const SHIFT = 0b0001;
        /// Alt/Option key.
        const ALT   = 0b0010;
        /// Control key.
        const CTRL  = 0b0100;
        /// Super/Meta/Command key.
        const SUPER = 0b1000;
    }
}

impl Default for Modifiers {
    fn default() -> Self {
        Modifiers::NONE
    }
}

/// Geometry of the source element captured once at gesture start.
///
/// The rect may be absent (or zero-size) when the source item is mounted
/// but not yet measured; the engine then falls back to a default
/// placeholder height.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct GeometrySnapshot {
    /// Bounding rectangle of the source item at pointer-down.
    pub item_rect: Option<Rect>,
}

impl GeometrySnapshot {
    /// Snapshot with a measured source rectangle.
    #[must_use]
    pub const fn measured(item_rect: Rect) -> Self {
        Self {
            item_rect: Some(item_rect),
        }
    }

    /// Snapshot for an unmeasured source element.
    #[must_use]
    pub const fn unmeasured() -> Self {
        Self { item_rect: None }
    }

    /// Source item height, if a usable rectangle was captured.
    #[must_use]
    pub fn item_height(&self) -> Option<f32> {
        self.item_rect.filter(|r| !r.is_empty()).map(|r| r.height)
    }
}

/// A mounted item's rectangle, used for coarse band resolution when the
/// candidate item itself has no live geometry.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MountedBand {
    /// Ordinal of the item in the list's current visual order.
    pub ordinal: usize,
    /// Live rectangle of that item.
    pub rect: Rect,
}

/// Geometry available for resolving one candidate position.
#[derive(Debug, Clone, PartialEq)]
pub enum CandidateGeometry {
    /// The item under the pointer is mounted and measured.
    Measured(Rect),
    /// The item under the pointer has no usable rectangle (virtualized or
    /// detached). `mounted` holds whatever neighbour rects are live; it
    /// may be empty.
    Unmeasured {
        /// Rects of currently mounted items in the candidate list.
        mounted: Vec<MountedBand>,
    },
}

/// One drag-over sample handed to the engine per relevant pointer event.
#[derive(Debug, Clone, PartialEq)]
pub struct CandidatePosition {
    /// List the pointer is currently over.
    pub list: ListId,
    /// Ordinal of the item under the pointer in the list's current visual
    /// order. Pass `list_len` to mean "past the last item".
    pub ordinal: usize,
    /// Current pointer position.
    pub pointer: Point,
    /// Geometry available for this sample.
    pub geometry: CandidateGeometry,
    /// Item count of the candidate list in its current (pre-removal)
    /// visual order, source item included when present.
    pub list_len: usize,
    /// Modifiers held during the event.
    pub modifiers: Modifiers,
}

impl CandidatePosition {
    /// Candidate with a measured item rectangle.
    #[must_use]
    pub fn measured(list: ListId, ordinal: usize, pointer: Point, rect: Rect, list_len: usize) -> Self {
        Self {
            list,
            ordinal,
            pointer,
            geometry: CandidateGeometry::Measured(rect),
            list_len,
            modifiers: Modifiers::NONE,
        }
    }

    /// Candidate without usable item geometry.
    #[must_use]
    pub fn unmeasured(
        list: ListId,
        ordinal: usize,
        pointer: Point,
        mounted: Vec<MountedBand>,
        list_len: usize,
    ) -> Self {
        Self {
            list,
            ordinal,
            pointer,
            geometry: CandidateGeometry::Unmeasured { mounted },
            list_len,
            modifiers: Modifiers::NONE,
        }
    }

    /// Attach a modifier snapshot.
    #[must_use]
    pub fn with_modifiers(mut self, modifiers: Modifiers) -> Self {
        self.modifiers = modifiers;
        self
    }

    /// Validate invariants required for index resolution.
    pub fn validate(&self) -> Result<(), CandidateError> {
        if self.ordinal > self.list_len {
            return Err(CandidateError::OrdinalOutOfRange {
                ordinal: self.ordinal,
                list_len: self.list_len,
            });
        }
        Ok(())
    }

    /// The measured rectangle, demoted to `None` when zero-size.
    ///
    /// A zero-height rect is how detached elements report under
    /// virtualization; it must never reach the midpoint rule.
    #[must_use]
    pub fn usable_rect(&self) -> Option<Rect> {
        match &self.geometry {
            CandidateGeometry::Measured(rect) if !rect.is_empty() => Some(*rect),
            _ => None,
        }
    }
}

/// Validation failures for candidate positions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CandidateError {
    OrdinalOutOfRange { ordinal: usize, list_len: usize },
}

impl fmt::Display for CandidateError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::OrdinalOutOfRange { ordinal, list_len } => write!(
                f,
                "candidate ordinal {ordinal} exceeds list length {list_len}"
            ),
        }
    }
}

impl std::error::Error for CandidateError {}
