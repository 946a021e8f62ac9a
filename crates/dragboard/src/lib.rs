#![forbid(unsafe_code)]

//! Drag-reorder engine for kanban-style boards.
//!
//! Tracks a single drag gesture from arm to commit or cancel, resolves
//! pointer positions into one canonical insertion index, and keeps a
//! rate-limited preview placement in sync with it. The engine renders
//! nothing and persists nothing: the host supplies candidate positions and
//! frame pulses, and receives at most one [`engine::MoveCommand`] per
//! gesture through the [`engine::MoveSink`] seam.
//!
//! # Index space
//!
//! Every target index the engine reports is in *post-removal* space: the
//! index the dragged item would occupy in the destination list after it
//! has been conceptually removed from its origin. Same-list and cross-list
//! moves therefore share one arithmetic convention and the host applies
//! the move as remove-then-insert without further adjustment.

pub mod engine;
pub mod gesture;
pub mod preview;
pub mod resolver;

pub use engine::{
    FramePulse, MoveCommand, MoveSink, ReorderConfig, ReorderEffect, ReorderEngine,
    ReorderTransition, StartGestureError,
};
pub use gesture::{GesturePhase, GestureState};
pub use preview::{DragImageConfig, PreviewPlacement, PreviewSync};
