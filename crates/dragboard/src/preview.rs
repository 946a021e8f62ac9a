#![forbid(unsafe_code)]

//! Per-frame coalescing of preview placements.
//!
//! Drag-over and pointer-move handlers can fire many times per display
//! frame. [`PreviewSync`] decouples gesture-state frequency from paint
//! frequency: placements are coalesced latest-wins and the engine flushes
//! at most one per frame pulse. Intermediate positions are visually
//! irrelevant, so the coalescing is lossy by design.

use dragboard_core::id::ListId;
use serde::{Deserialize, Serialize};

/// Where the placeholder/preview element should sit.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PreviewPlacement {
    /// Destination list for the placeholder.
    pub list: ListId,
    /// Insertion index in post-removal space.
    pub index: usize,
    /// Height the placeholder should reserve.
    pub height: f32,
}

/// Coalesces preview placements to at most one per display frame.
///
/// Holds at most one pending placement; `schedule` replaces it, `flush`
/// takes it. Not thread-safe — all calls happen on the single event loop.
#[derive(Debug, Clone, Default)]
pub struct PreviewSync {
    /// Pending placement (latest wins).
    pending: Option<PreviewPlacement>,
}

impl PreviewSync {
    /// Create an empty coalescer.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Schedule a placement for the next frame, replacing any pending one.
    pub fn schedule(&mut self, placement: PreviewPlacement) {
        self.pending = Some(placement);
    }

    /// Take the pending placement, if any. Called once per frame pulse.
    #[must_use]
    pub fn flush(&mut self) -> Option<PreviewPlacement> {
        self.pending.take()
    }

    /// Whether a placement is waiting for the next frame.
    #[must_use]
    pub fn has_pending(&self) -> bool {
        self.pending.is_some()
    }

    /// Discard any pending placement without delivering it.
    ///
    /// Used at teardown so a cancelled gesture cannot leak one last
    /// placement into the frame after it ended.
    pub fn clear(&mut self) {
        self.pending = None;
    }
}

/// Visual description of the floating drag image.
///
/// Purely descriptive — the host renders it. Defaults match the familiar
/// card-lift look: slightly transparent with a small tilt.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DragImageConfig {
    /// Opacity of the drag image (0.0 = invisible, 1.0 = opaque).
    /// Default: 0.9.
    pub opacity: f32,
    /// Tilt applied to the drag image, in degrees. Default: 3.0.
    pub rotation_degrees: f32,
    /// Horizontal offset of the grab point, in pixels. Default: 0.0.
    pub offset_x: f32,
    /// Vertical offset of the grab point, in pixels. Default: 0.0.
    pub offset_y: f32,
}

impl Default for DragImageConfig {
    fn default() -> Self {
        Self {
            opacity: 0.9,
            rotation_degrees: 3.0,
            offset_x: 0.0,
            offset_y: 0.0,
        }
    }
}

impl DragImageConfig {
    /// Set opacity (clamped to 0.0..=1.0).
    #[must_use]
    pub fn with_opacity(mut self, opacity: f32) -> Self {
        self.opacity = opacity.clamp(0.0, 1.0);
        self
    }

    /// Set the tilt in degrees.
    #[must_use]
    pub fn with_rotation(mut self, degrees: f32) -> Self {
        self.rotation_degrees = degrees;
        self
    }

    /// Set the grab-point offset.
    #[must_use]
    pub fn with_offset(mut self, x: f32, y: f32) -> Self {
        self.offset_x = x;
        self.offset_y = y;
        self
    }
}
