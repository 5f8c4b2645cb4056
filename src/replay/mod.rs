//! Headless replay of a study session from a JSONL event script.
//!
//! The replay driver stands in for the host UI shell: it feeds a
//! recorded gesture/answer stream into the study core against a virtual
//! clock, producing the same session logs a live run would. One event
//! per line:
//!
//! ```jsonl
//! {"event":"pan_start"}
//! {"event":"pan","dx":-40.0,"dy":0.0}
//! {"event":"wait","ms":500}
//! {"event":"double_tap","x":120.0,"y":80.0}
//! {"event":"answer","label":"Annoying"}
//! ```
//!
//! `wait` advances the virtual clock, firing any due refocus animation
//! steps in due order; all other events dispatch at the current clock.
//! Script errors are fatal - a study transcript must replay exactly or
//! not at all - and carry 1-based line numbers.

use crate::config::StudyConfig;
use crate::depth::DepthMapSource;
use crate::model::StudyError;
use crate::state::{DisplaySink, RefocusTick, SessionComplete, StudySequencer};
use chrono::{DateTime, TimeDelta, Utc};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::debug;

/// One input event from the host shell's recording.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum ScriptEvent {
    /// Finger down on the displayed image.
    PanStart,
    /// Drag translation since gesture start, in UI points.
    Pan {
        /// Horizontal translation.
        dx: f32,
        /// Vertical translation.
        dy: f32,
    },
    /// Double-tap at a position in displayed-view coordinates.
    DoubleTap {
        /// Tap x.
        x: f32,
        /// Tap y.
        y: f32,
    },
    /// Rating selected for the current scene.
    Answer {
        /// One of the configured answer labels.
        label: String,
    },
    /// Advance the virtual clock.
    Wait {
        /// Milliseconds to advance.
        ms: u64,
    },
}

/// A parsed event together with its script line, for error reporting.
#[derive(Debug, Clone, PartialEq)]
pub struct ScriptedEvent {
    /// 1-based line number in the script file.
    pub line: usize,
    /// The event itself.
    pub event: ScriptEvent,
}

/// Malformed or inconsistent replay script. Fatal for the replay run.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ScriptError {
    /// A line was not a valid event object.
    #[error("Invalid event at line {line}: {message}")]
    InvalidEvent {
        /// 1-based script line.
        line: usize,
        /// JSON parser error details.
        message: String,
    },

    /// An answer used a label outside the configured answer set.
    #[error("Unknown answer label '{label}' at line {line}")]
    UnknownAnswer {
        /// 1-based script line.
        line: usize,
        /// The offending label.
        label: String,
    },

    /// The script kept answering after the playlist was exhausted.
    #[error("Answer after the session completed at line {line}")]
    AnswerAfterComplete {
        /// 1-based script line.
        line: usize,
    },
}

/// What a finished replay produced.
#[derive(Debug, Clone, PartialEq)]
pub struct ReplaySummary {
    /// Number of answers recorded.
    pub answers_recorded: usize,
    /// Whether the playlist was answered to completion.
    pub completed: bool,
    /// Log lines dropped because an append failed.
    pub dropped_log_lines: u64,
    /// Path of the tracking log written for this session.
    pub tracking_path: PathBuf,
    /// Path of the answers log written for this session.
    pub answers_path: PathBuf,
}

/// Parse a JSONL event script. Blank lines are skipped; anything else
/// must be a valid event object.
pub fn parse_script(input: &str) -> Result<Vec<ScriptedEvent>, ScriptError> {
    let mut events = Vec::new();
    for (index, raw) in input.lines().enumerate() {
        let line = index + 1;
        if raw.trim().is_empty() {
            continue;
        }
        let event =
            serde_json::from_str::<ScriptEvent>(raw).map_err(|e| ScriptError::InvalidEvent {
                line,
                message: e.to_string(),
            })?;
        events.push(ScriptedEvent { line, event });
    }
    Ok(events)
}

/// Replay a parsed script through a fresh study session.
///
/// The virtual clock starts at `start`; only `wait` events move it.
pub fn run_script<D: DisplaySink, M: DepthMapSource>(
    events: &[ScriptedEvent],
    config: &StudyConfig,
    display: D,
    maps: M,
    log_dir: &Path,
    start: DateTime<Utc>,
) -> Result<ReplaySummary, StudyError> {
    let mut sequencer = StudySequencer::start(config, display, maps, log_dir, start)?;
    let mut now = start;
    let mut pending: Vec<RefocusTick> = Vec::new();
    let mut answers_recorded = 0usize;

    for scripted in events {
        match &scripted.event {
            ScriptEvent::PanStart => sequencer.gesture_start(),
            ScriptEvent::Pan { dx, dy } => sequencer.gesture_drag(*dx, *dy, now),
            ScriptEvent::DoubleTap { x, y } => {
                if let Some(tick) = sequencer.double_tap(*x, *y, now) {
                    pending.push(tick);
                }
            }
            ScriptEvent::Answer { label } => {
                if !config.answer_labels.iter().any(|known| known == label) {
                    return Err(ScriptError::UnknownAnswer {
                        line: scripted.line,
                        label: label.clone(),
                    }
                    .into());
                }
                match sequencer.record_answer(label, now) {
                    Ok(_) => answers_recorded += 1,
                    Err(SessionComplete) => {
                        return Err(ScriptError::AnswerAfterComplete {
                            line: scripted.line,
                        }
                        .into());
                    }
                }
            }
            ScriptEvent::Wait { ms } => {
                let target = now + TimeDelta::milliseconds(*ms as i64);
                advance_clock(&mut sequencer, &mut pending, &mut now, target);
            }
        }
    }

    debug!(answers = answers_recorded, "replay finished");
    Ok(ReplaySummary {
        answers_recorded,
        completed: sequencer.is_complete(),
        dropped_log_lines: sequencer.logger().write_failures(),
        tracking_path: sequencer.logger().tracking_path().to_path_buf(),
        answers_path: sequencer.logger().answers_path().to_path_buf(),
    })
}

/// Advance the virtual clock to `target`, firing due refocus ticks in
/// due order. Each fired tick may schedule a successor, which is fired
/// in turn if it also falls before `target`.
fn advance_clock<D: DisplaySink, M: DepthMapSource>(
    sequencer: &mut StudySequencer<D, M>,
    pending: &mut Vec<RefocusTick>,
    now: &mut DateTime<Utc>,
    target: DateTime<Utc>,
) {
    loop {
        let next_due = pending
            .iter()
            .enumerate()
            .filter(|(_, tick)| tick.due <= target)
            .min_by_key(|(_, tick)| tick.due)
            .map(|(index, _)| index);
        let Some(index) = next_due else {
            break;
        };
        let tick = pending.swap_remove(index);
        *now = (*now).max(tick.due);
        if let Some(next) = sequencer.tick(tick, *now) {
            pending.push(next);
        }
    }
    *now = target;
}

/// Display sink for headless replays: renders become tracing events,
/// optionally echoed to stdout.
#[derive(Debug)]
pub struct TraceSink {
    print: bool,
    rendered: usize,
}

impl TraceSink {
    /// Sink that traces every render; `print` echoes paths to stdout.
    pub fn new(print: bool) -> Self {
        Self { print, rendered: 0 }
    }

    /// Number of renders seen so far.
    pub fn rendered(&self) -> usize {
        self.rendered
    }
}

impl DisplaySink for TraceSink {
    fn render(&mut self, image_path: &str) {
        self.rendered += 1;
        debug!(image = image_path, "render");
        if self.print {
            println!("{image_path}");
        }
    }
}
