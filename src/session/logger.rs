//! Append-only session logs.
//!
//! One study session writes two text files into a host-provided
//! directory, both named with the session-start timestamp:
//!
//! - `<prefix>tracking.txt` - one line per image transition with the
//!   dwell interval, a blank line between scenes;
//! - `<prefix>answers.txt` - one fixed-width line per recorded answer.
//!
//! Appends are synchronous on the single study thread, so ordering
//! within each file is inherent. A failed append is a diagnostic, not a
//! crash: the line is dropped, a warning is traced, and a counter is
//! kept for operator reporting.

use chrono::{DateTime, TimeDelta, Utc};
use std::fs::File;
use std::io::Write;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::warn;

/// Width the scene name is left-padded to in the answers log.
pub const ANSWER_SCENE_WIDTH: usize = 30;

/// Session log file names are prefixed with this timestamp format.
const PREFIX_FORMAT: &str = "%Y.%m.%d-%H.%M.%S-";

/// Failure to create the session log files. Fatal at session start.
#[derive(Debug, Error)]
pub enum LogOpenError {
    /// The log directory could not be created.
    #[error("Failed to create log directory at {path}: {source}")]
    DirectoryCreation {
        /// Directory that could not be created.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// A log file could not be created or truncated.
    #[error("Failed to create log file {path}: {source}")]
    CreateFile {
        /// File that could not be created.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },
}

/// Writer for the per-session tracking and answers logs.
///
/// Owned by the study sequencer and passed by mutable reference into the
/// viewport, so there is exactly one instance per session and no shared
/// static file handles.
#[derive(Debug)]
pub struct SessionLogger {
    tracking: File,
    tracking_path: PathBuf,
    answers: File,
    answers_path: PathBuf,
    write_failures: u64,
}

impl SessionLogger {
    /// Create (truncating) both log files in `dir`, named with the
    /// `yyyy.MM.dd-HH.mm.ss-` prefix derived from `session_start`.
    pub fn open(dir: &Path, session_start: DateTime<Utc>) -> Result<Self, LogOpenError> {
        std::fs::create_dir_all(dir).map_err(|source| LogOpenError::DirectoryCreation {
            path: dir.to_path_buf(),
            source,
        })?;

        let prefix = session_start.format(PREFIX_FORMAT).to_string();
        let tracking_path = dir.join(format!("{prefix}tracking.txt"));
        let answers_path = dir.join(format!("{prefix}answers.txt"));

        let tracking = File::create(&tracking_path).map_err(|source| LogOpenError::CreateFile {
            path: tracking_path.clone(),
            source,
        })?;
        let answers = File::create(&answers_path).map_err(|source| LogOpenError::CreateFile {
            path: answers_path.clone(),
            source,
        })?;

        Ok(Self {
            tracking,
            tracking_path,
            answers,
            answers_path,
            write_failures: 0,
        })
    }

    /// Append one dwell line to the tracking log: the rendered image
    /// path, the interval it was on screen, and the elapsed duration.
    pub fn log_dwell(&mut self, image_path: &str, start: DateTime<Utc>, end: DateTime<Utc>) {
        let line = dwell_line(image_path, start, end);
        append(
            &mut self.tracking,
            &self.tracking_path,
            &line,
            &mut self.write_failures,
        );
    }

    /// Append the blank separator line between scenes in the tracking log.
    pub fn log_scene_boundary(&mut self) {
        append(
            &mut self.tracking,
            &self.tracking_path,
            "\n",
            &mut self.write_failures,
        );
    }

    /// Append one answer line: scene name padded to
    /// [`ANSWER_SCENE_WIDTH`], then the answer text with no separator.
    pub fn log_answer(&mut self, scene_name: &str, answer: &str) {
        let line = format!("{}\n", answer_line(scene_name, answer));
        append(
            &mut self.answers,
            &self.answers_path,
            &line,
            &mut self.write_failures,
        );
    }

    /// Number of log lines dropped because an append failed.
    pub fn write_failures(&self) -> u64 {
        self.write_failures
    }

    /// Path of the tracking log file.
    pub fn tracking_path(&self) -> &Path {
        &self.tracking_path
    }

    /// Path of the answers log file.
    pub fn answers_path(&self) -> &Path {
        &self.answers_path
    }
}

/// Append one line, dropping it with a warning on failure. Losing a log
/// line must never end the participant's session.
fn append(file: &mut File, path: &Path, line: &str, failures: &mut u64) {
    if let Err(err) = file.write_all(line.as_bytes()) {
        *failures += 1;
        warn!(path = %path.display(), error = %err, "dropped session log line");
    }
}

/// Format a full dwell line, trailing newline included.
fn dwell_line(image_path: &str, start: DateTime<Utc>, end: DateTime<Utc>) -> String {
    format!(
        "{}  start: {}  end: {}  on-screen: {}\n",
        image_path,
        format_clock_time(start),
        format_clock_time(end),
        format_elapsed(end - start),
    )
}

/// Time of day with microsecond precision: `HH:MM:SS.ffffff`.
pub fn format_clock_time(t: DateTime<Utc>) -> String {
    t.format("%H:%M:%S%.6f").to_string()
}

/// Elapsed duration as `HH:MM:SS.ffffff`.
///
/// Hours are zero-padded to two digits but unbounded in width; minutes
/// and seconds are zero-padded to two digits, microseconds to six.
/// Negative durations (a clock running backwards) collapse to zero.
pub fn format_elapsed(elapsed: TimeDelta) -> String {
    let total_micros = elapsed.num_microseconds().unwrap_or(0).max(0);
    let micros = total_micros % 1_000_000;
    let total_secs = total_micros / 1_000_000;
    let secs = total_secs % 60;
    let mins = (total_secs / 60) % 60;
    let hours = total_secs / 3600;
    format!("{hours:02}:{mins:02}:{secs:02}.{micros:06}")
}

/// Compose one answers-log line: the scene name right-aligned in a
/// fixed-width field (truncated if longer), immediately followed by the
/// answer text.
pub fn answer_line(scene_name: &str, answer: &str) -> String {
    format!(
        "{scene_name:>width$.width$}{answer}",
        width = ANSWER_SCENE_WIDTH
    )
}

#[cfg(test)]
#[path = "logger_tests.rs"]
mod tests;
