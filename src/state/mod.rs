//! Study state machines (pure core).
//!
//! Gesture handling, the refocus animation and playlist sequencing all
//! live here, free of any real clock or UI toolkit: callers supply `now`
//! and a [`DisplaySink`], so every transition is testable with a
//! scripted clock.

pub mod sequencer;
pub mod viewport;

pub use sequencer::{AnswerOutcome, SequencerState, SessionComplete, StudySequencer};
pub use viewport::{DisplaySink, RefocusTick, ViewportController, REFOCUS_STEP_MS};
