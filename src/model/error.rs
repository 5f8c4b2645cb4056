//! Error types for the study runner.
//!
//! A hierarchical taxonomy built on `thiserror`. Domain-specific errors
//! (`ConfigError`, `ConfigLoadError`, `LogOpenError`, `ScriptError`)
//! convert into the top-level [`StudyError`] via `From`, so startup and
//! replay code composes with `?`.
//!
//! Only failures that make a study impossible to run are fatal: malformed
//! configuration, unopenable session logs, a broken replay script. A
//! missing depth map degrades refocus to a silent no-op, and a failed log
//! append is surfaced as a diagnostic without stopping the session -
//! those paths never reach this module.

use thiserror::Error;

/// Top-level error for starting or replaying a study session.
#[derive(Debug, Error)]
pub enum StudyError {
    /// Configuration failed validation. Fatal at session start: a study
    /// cannot run with an empty playlist, an empty answer set, or a grid
    /// the default view does not fit in.
    #[error("Invalid study configuration: {0}")]
    Config(#[from] crate::config::ConfigError),

    /// A configuration file existed but could not be read or parsed.
    #[error("Failed to load configuration: {0}")]
    ConfigLoad(#[from] crate::config::ConfigLoadError),

    /// Session log files could not be created in the output directory.
    /// Without logs there is nothing to record, so this is fatal.
    #[error("Failed to open session logs: {0}")]
    LogOpen(#[from] crate::session::LogOpenError),

    /// The replay event script was malformed or inconsistent with the
    /// session (unknown answer label, answer after completion). A study
    /// transcript must replay exactly or not at all.
    #[error("Replay script error: {0}")]
    Script(#[from] crate::replay::ScriptError),

    /// I/O failure outside the log sink (reading the script file,
    /// creating the output directory).
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
