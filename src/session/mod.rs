//! Session logs: dwell tracking and answer recording.

pub mod logger;

pub use logger::{LogOpenError, SessionLogger, ANSWER_SCENE_WIDTH};
