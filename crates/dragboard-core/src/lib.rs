#![forbid(unsafe_code)]

//! Core types for the dragboard reorder engine: geometry, identifiers,
//! and candidate-position input.

pub mod geometry;
pub mod id;
pub mod input;
pub mod logging;

// Re-export tracing macros at crate root for ergonomic use.
#[cfg(feature = "tracing")]
pub use logging::{debug, trace, warn};
