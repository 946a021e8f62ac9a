#![forbid(unsafe_code)]

//! Reorder gesture state machine.
//!
//! [`ReorderEngine`] orchestrates one gesture: start → update (many times)
//! → commit | cancel → idle. It owns the single [`GestureState`], delegates
//! index math to [`crate::resolver`], and emits side-effect requests (one
//! [`MoveCommand`] per committed gesture, throttled preview placements) to
//! external collaborators. It performs no rendering or persistence itself.
//!
//! Every input produces a [`ReorderTransition`] with an explicit effect;
//! events that arrive in a phase that does not permit them degrade to
//! [`ReorderEffect::Noop`] with a diagnostic reason rather than erroring.
//! The only fallible operation is [`ReorderEngine::start_gesture`], which
//! refuses to overwrite an in-flight gesture.
//!
//! # Drop vs drag-end ordering
//!
//! Native drag protocols do not guarantee whether `drop` or `dragend`
//! arrives first. The engine resolves this structurally: once
//! `commit_gesture` runs, the gesture is past the point of no return and a
//! trailing `end_gesture` reports a no-op. No timing heuristics.

use crate::gesture::{GesturePhase, GestureState};
use crate::preview::{PreviewPlacement, PreviewSync};
use crate::resolver;
use dragboard_core::id::{ItemId, ListId};
use dragboard_core::input::{CandidatePosition, GeometrySnapshot};
use dragboard_core::{debug, trace, warn};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::{Duration, Instant};

/// Default safety timeout: a gesture that receives no events for this long
/// is cancelled (a platform quirk can swallow the native drag-end).
pub const DEFAULT_GESTURE_TIMEOUT: Duration = Duration::from_secs(30);

/// Engine configuration.
#[derive(Debug, Clone)]
pub struct ReorderConfig {
    /// Cancel the gesture when no events arrive for this long.
    pub gesture_timeout: Duration,
    /// Frame pulses to hold the terminal phase while preview teardown
    /// settles. 0 = settle within the commit/cancel call itself; >0 gives
    /// the host time to animate the preview into its final slot. The move
    /// command is always emitted before settling begins.
    pub settle_frames: u8,
}

impl Default for ReorderConfig {
    fn default() -> Self {
        Self {
            gesture_timeout: DEFAULT_GESTURE_TIMEOUT,
            settle_frames: 0,
        }
    }
}

impl ReorderConfig {
    /// Override the safety timeout.
    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.gesture_timeout = timeout;
        self
    }

    /// Hold terminal phases for the given number of frame pulses.
    #[must_use]
    pub fn with_settle_frames(mut self, frames: u8) -> Self {
        self.settle_frames = frames;
        self
    }
}

/// The atomic move emitted once per committed gesture.
///
/// `target_index` is in post-removal space: the consumer applies the move
/// as remove-then-insert with no further index adjustment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MoveCommand {
    pub item_id: ItemId,
    pub source_list: ListId,
    pub source_index: usize,
    pub target_list: ListId,
    pub target_index: usize,
}

/// Seam toward the data-layer collaborator.
///
/// `on_move` is invoked exactly 0 or 1 times per gesture. Whatever the
/// collaborator does with the command afterwards (optimistic update,
/// rollback on persistence failure) never re-enters the engine.
pub trait MoveSink {
    /// Receive the committed move.
    fn on_move(&mut self, command: MoveCommand);
}

impl<F> MoveSink for F
where
    F: FnMut(MoveCommand),
{
    fn on_move(&mut self, command: MoveCommand) {
        self(command);
    }
}

/// Why a gesture was cancelled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CancelReason {
    /// Native drag-end without a preceding drop.
    DragEnd,
    /// No events arrived within the safety timeout.
    Timeout,
}

/// Explicit diagnostics for events that are safely ignored.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NoopReason {
    /// Event arrived with no gesture in flight.
    NoActiveGesture,
    /// Event requires `Dragging` but the gesture is still `Armed`.
    DragNotStarted,
    /// The resolved target equals the current one.
    TargetUnchanged,
    /// The candidate position failed validation.
    InvalidCandidate,
    /// The gesture already committed; trailing events are ignored.
    CommitAlreadyStarted,
    /// The gesture is already cancelled and settling.
    CancelAlreadyPending,
    /// Frame pulse with no lifecycle work to do.
    FrameIdle,
}

/// Transition effect emitted by one engine step.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "effect", rename_all = "snake_case")]
pub enum ReorderEffect {
    /// A gesture armed; the drag is not yet visible.
    Armed {
        item: ItemId,
        source_list: ListId,
        source_index: usize,
    },
    /// The one-frame deferral elapsed; pointer tracking is active.
    DragStarted { item: ItemId },
    /// The canonical target moved.
    TargetChanged { list: ListId, index: usize },
    /// The move command was emitted (exactly once per gesture).
    Committed { command: MoveCommand },
    /// The gesture was abandoned; no move command was emitted.
    Cancelled { reason: CancelReason },
    /// A terminal phase finished settling back to idle.
    Settled,
    /// The event was ignored.
    Noop { reason: NoopReason },
}

/// One state-machine transition with deterministic telemetry fields.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReorderTransition {
    pub transition_id: u64,
    pub from: GesturePhase,
    pub to: GesturePhase,
    pub effect: ReorderEffect,
}

/// Result of one frame pulse: the lifecycle transition plus at most one
/// coalesced preview placement for the host to apply this frame.
#[derive(Debug, Clone, PartialEq)]
pub struct FramePulse {
    pub transition: ReorderTransition,
    pub placement: Option<PreviewPlacement>,
}

/// `start_gesture` failures.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StartGestureError {
    /// A gesture is already in flight; the prior gesture is left untouched.
    GestureInProgress {
        active_item: ItemId,
        requested_item: ItemId,
    },
}

impl fmt::Display for StartGestureError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::GestureInProgress {
                active_item,
                requested_item,
            } => write!(
                f,
                "cannot start gesture for {requested_item}: gesture for {active_item} still active"
            ),
        }
    }
}

impl std::error::Error for StartGestureError {}

/// The reorder gesture state machine.
///
/// Single-threaded and event-driven: all mutation happens synchronously
/// inside the host's event handlers, plus one `on_frame` pulse per display
/// refresh that drives the armed→dragging deferral, preview flushing,
/// terminal settling, and the safety timeout.
#[derive(Debug, Default)]
pub struct ReorderEngine {
    config: ReorderConfig,
    gesture: Option<GestureState>,
    preview: PreviewSync,
    transition_counter: u64,
    last_event: Option<Instant>,
    settle_remaining: u8,
}

impl ReorderEngine {
    /// Engine with default configuration.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Engine with explicit configuration.
    #[must_use]
    pub fn with_config(config: ReorderConfig) -> Self {
        Self {
            config,
            ..Self::default()
        }
    }

    // -----------------------------------------------------------------------
    // Lifecycle
    // -----------------------------------------------------------------------

    /// Arm a new gesture.
    ///
    /// Rejected (and the active gesture left untouched) unless the engine
    /// is idle. The target starts at the source position and the drag only
    /// becomes visible after the next [`on_frame`](Self::on_frame) pulse.
    pub fn start_gesture(
        &mut self,
        item_id: ItemId,
        source_list: ListId,
        source_index: usize,
        snapshot: GeometrySnapshot,
        now: Instant,
    ) -> Result<ReorderTransition, StartGestureError> {
        if let Some(active) = &self.gesture {
            warn!(
                "rejecting start_gesture for {}: {} still active in phase {:?}",
                item_id, active.item_id, active.phase
            );
            return Err(StartGestureError::GestureInProgress {
                active_item: active.item_id,
                requested_item: item_id,
            });
        }

        self.gesture = Some(GestureState::armed(
            item_id,
            source_list,
            source_index,
            snapshot,
        ));
        self.last_event = Some(now);
        Ok(self.transition(
            GesturePhase::Idle,
            GesturePhase::Armed,
            ReorderEffect::Armed {
                item: item_id,
                source_list,
                source_index,
            },
        ))
    }

    /// Feed one drag-over candidate position.
    ///
    /// No-op unless dragging. Resolves the canonical target index; when it
    /// differs from the current target the gesture state updates and a
    /// preview placement is scheduled (coalesced, flushed on the next
    /// frame pulse).
    pub fn update_gesture(
        &mut self,
        candidate: &CandidatePosition,
        now: Instant,
    ) -> ReorderTransition {
        let phase = self.phase();
        match phase {
            GesturePhase::Idle => self.noop(phase, NoopReason::NoActiveGesture),
            GesturePhase::Armed => {
                self.last_event = Some(now);
                self.noop(phase, NoopReason::DragNotStarted)
            }
            GesturePhase::Committing => self.noop(phase, NoopReason::CommitAlreadyStarted),
            GesturePhase::Cancelled => self.noop(phase, NoopReason::CancelAlreadyPending),
            GesturePhase::Dragging => {
                self.last_event = Some(now);
                if let Err(err) = candidate.validate() {
                    warn!("ignoring drag-over candidate: {}", err);
                    return self.noop(phase, NoopReason::InvalidCandidate);
                }

                let Some(gesture) = self.gesture.as_mut() else {
                    return self.noop(phase, NoopReason::NoActiveGesture);
                };
                let index = resolver::resolve_target_index(
                    candidate,
                    gesture.source_list,
                    gesture.source_index,
                );
                if (candidate.list, index) == gesture.target() {
                    return self.noop(phase, NoopReason::TargetUnchanged);
                }
                gesture.target_list = candidate.list;
                gesture.target_index = index;
                let height = gesture.placeholder_height;

                self.preview.schedule(PreviewPlacement {
                    list: candidate.list,
                    index,
                    height,
                });
                trace!("drag target moved to {} index {}", candidate.list, index);
                self.transition(
                    phase,
                    GesturePhase::Dragging,
                    ReorderEffect::TargetChanged {
                        list: candidate.list,
                        index,
                    },
                )
            }
        }
    }

    /// Commit the gesture (drop event).
    ///
    /// No-op unless dragging. Freezes the gesture, emits exactly one
    /// [`MoveCommand`] through the sink, and enters `Committing`; the
    /// phase settles to idle immediately or after `settle_frames` pulses.
    pub fn commit_gesture(&mut self, sink: &mut dyn MoveSink) -> ReorderTransition {
        let phase = self.phase();
        match phase {
            GesturePhase::Idle => self.noop(phase, NoopReason::NoActiveGesture),
            GesturePhase::Armed => self.noop(phase, NoopReason::DragNotStarted),
            GesturePhase::Committing => self.noop(phase, NoopReason::CommitAlreadyStarted),
            GesturePhase::Cancelled => self.noop(phase, NoopReason::CancelAlreadyPending),
            GesturePhase::Dragging => {
                let Some(gesture) = self.gesture.as_mut() else {
                    return self.noop(phase, NoopReason::NoActiveGesture);
                };
                gesture.phase = GesturePhase::Committing;
                let command = MoveCommand {
                    item_id: gesture.item_id,
                    source_list: gesture.source_list,
                    source_index: gesture.source_index,
                    target_list: gesture.target_list,
                    target_index: gesture.target_index,
                };

                sink.on_move(command);
                debug!(
                    "committed move of {}: {}[{}] -> {}[{}]",
                    command.item_id,
                    command.source_list,
                    command.source_index,
                    command.target_list,
                    command.target_index
                );
                self.preview.clear();

                if self.config.settle_frames == 0 {
                    self.destroy_gesture();
                    self.transition(
                        phase,
                        GesturePhase::Idle,
                        ReorderEffect::Committed { command },
                    )
                } else {
                    self.settle_remaining = self.config.settle_frames;
                    self.transition(
                        phase,
                        GesturePhase::Committing,
                        ReorderEffect::Committed { command },
                    )
                }
            }
        }
    }

    /// Native drag-end. Cancels while armed or dragging; no-op when idle,
    /// while a commit settles (the ordering guard), or repeated.
    pub fn end_gesture(&mut self) -> ReorderTransition {
        let phase = self.phase();
        match phase {
            GesturePhase::Idle => self.noop(phase, NoopReason::NoActiveGesture),
            GesturePhase::Committing => self.noop(phase, NoopReason::CommitAlreadyStarted),
            GesturePhase::Cancelled => self.noop(phase, NoopReason::CancelAlreadyPending),
            GesturePhase::Armed | GesturePhase::Dragging => {
                self.cancel(phase, CancelReason::DragEnd)
            }
        }
    }

    /// One pulse per display frame.
    ///
    /// Promotes `Armed` → `Dragging` (the deliberate one-frame deferral
    /// that keeps the native drag affordance alive), settles terminal
    /// phases, applies the safety timeout, and flushes at most one
    /// coalesced preview placement.
    pub fn on_frame(&mut self, now: Instant) -> FramePulse {
        let phase = self.phase();
        let transition = match phase {
            GesturePhase::Idle => self.noop(phase, NoopReason::NoActiveGesture),
            GesturePhase::Armed | GesturePhase::Dragging => {
                if self.timed_out(now) {
                    warn!("gesture timed out in phase {:?}", phase);
                    self.cancel(phase, CancelReason::Timeout)
                } else if phase == GesturePhase::Armed {
                    self.promote_to_dragging()
                } else {
                    self.noop(phase, NoopReason::FrameIdle)
                }
            }
            GesturePhase::Committing | GesturePhase::Cancelled => {
                self.settle_remaining = self.settle_remaining.saturating_sub(1);
                if self.settle_remaining == 0 {
                    self.destroy_gesture();
                    self.transition(phase, GesturePhase::Idle, ReorderEffect::Settled)
                } else {
                    let reason = if phase == GesturePhase::Committing {
                        NoopReason::CommitAlreadyStarted
                    } else {
                        NoopReason::CancelAlreadyPending
                    };
                    self.noop(phase, reason)
                }
            }
        };
        let placement = self.preview.flush();
        FramePulse {
            transition,
            placement,
        }
    }

    // -----------------------------------------------------------------------
    // Queries
    // -----------------------------------------------------------------------

    /// Current lifecycle phase (`Idle` when no gesture exists).
    #[must_use]
    pub fn phase(&self) -> GesturePhase {
        self.gesture
            .as_ref()
            .map_or(GesturePhase::Idle, |g| g.phase)
    }

    /// Shared view of the in-flight gesture state, if any.
    #[must_use]
    pub fn gesture(&self) -> Option<&GestureState> {
        self.gesture.as_ref()
    }

    /// Whether a drag is visibly in progress.
    #[must_use]
    pub fn is_dragging(&self) -> bool {
        self.phase() == GesturePhase::Dragging
    }

    /// Current best-known destination, while the gesture is cancellable.
    #[must_use]
    pub fn current_target(&self) -> Option<(ListId, usize)> {
        self.gesture
            .as_ref()
            .filter(|g| g.phase.is_cancellable())
            .map(GestureState::target)
    }

    /// Whether the given item is the one being dragged.
    #[must_use]
    pub fn is_item_being_dragged(&self, item: ItemId) -> bool {
        self.is_dragging()
            && self
                .gesture
                .as_ref()
                .is_some_and(|g| g.item_id == item)
    }

    /// Whether the placeholder belongs at `(list, index)` right now.
    #[must_use]
    pub fn should_show_placeholder(&self, list: ListId, index: usize) -> bool {
        self.is_dragging() && self.current_target() == Some((list, index))
    }

    /// Height the placeholder should reserve, while a gesture is active.
    #[must_use]
    pub fn placeholder_height(&self) -> Option<f32> {
        self.gesture.as_ref().map(|g| g.placeholder_height)
    }

    /// Total transitions taken (diagnostic).
    #[must_use]
    pub fn transition_count(&self) -> u64 {
        self.transition_counter
    }

    /// Current configuration.
    #[must_use]
    pub fn config(&self) -> &ReorderConfig {
        &self.config
    }

    // -----------------------------------------------------------------------
    // Internal helpers
    // -----------------------------------------------------------------------

    fn promote_to_dragging(&mut self) -> ReorderTransition {
        let Some(gesture) = self.gesture.as_mut() else {
            return self.noop(GesturePhase::Idle, NoopReason::NoActiveGesture);
        };
        gesture.phase = GesturePhase::Dragging;
        let item = gesture.item_id;
        let placement = PreviewPlacement {
            list: gesture.target_list,
            index: gesture.target_index,
            height: gesture.placeholder_height,
        };
        // The placeholder becomes visible at the source slot.
        self.preview.schedule(placement);
        trace!("drag started for {}", item);
        self.transition(
            GesturePhase::Armed,
            GesturePhase::Dragging,
            ReorderEffect::DragStarted { item },
        )
    }

    fn cancel(&mut self, from: GesturePhase, reason: CancelReason) -> ReorderTransition {
        self.preview.clear();
        if self.config.settle_frames == 0 {
            self.destroy_gesture();
            self.transition(from, GesturePhase::Idle, ReorderEffect::Cancelled { reason })
        } else {
            if let Some(gesture) = self.gesture.as_mut() {
                gesture.phase = GesturePhase::Cancelled;
            }
            self.settle_remaining = self.config.settle_frames;
            self.transition(
                from,
                GesturePhase::Cancelled,
                ReorderEffect::Cancelled { reason },
            )
        }
    }

    fn destroy_gesture(&mut self) {
        self.gesture = None;
        self.last_event = None;
        self.settle_remaining = 0;
        self.preview.clear();
    }

    fn timed_out(&self, now: Instant) -> bool {
        self.last_event
            .is_some_and(|last| now.duration_since(last) > self.config.gesture_timeout)
    }

    fn noop(&mut self, phase: GesturePhase, reason: NoopReason) -> ReorderTransition {
        self.transition(phase, phase, ReorderEffect::Noop { reason })
    }

    fn transition(
        &mut self,
        from: GesturePhase,
        to: GesturePhase,
        effect: ReorderEffect,
    ) -> ReorderTransition {
        self.transition_counter = self.transition_counter.saturating_add(1);
        ReorderTransition {
            transition_id: self.transition_counter,
            from,
            to,
            effect,
        }
    }
}
