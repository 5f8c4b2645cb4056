//! Diagnostic logging setup.
//!
//! lfstudy has three output channels that must not mix: stdout belongs
//! to `--print-renders`, the tracking/answers files belong to the study
//! data, so tracing diagnostics get a file of their own. Watch it with
//! `tail -f`; `RUST_LOG` controls verbosity.

use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing_subscriber::filter::LevelFilter;
use tracing_subscriber::EnvFilter;

/// Failure to set up diagnostic logging.
#[derive(Debug, Error)]
pub enum LoggingError {
    /// The target has no file-name component (e.g. a bare directory).
    #[error("Diagnostic log target {0} is not a file path")]
    NotAFilePath(PathBuf),

    /// The log file's directory could not be created.
    #[error("Failed to create diagnostic log directory {path}: {source}")]
    DirectoryCreation {
        /// Directory that could not be created.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// A tracing subscriber was already installed for this process.
    #[error("Tracing subscriber already initialized")]
    AlreadyInitialized,
}

/// Route tracing diagnostics to `log_file`, falling back to the
/// platform default ([`crate::config::default_log_path`]) when the host
/// passed none.
///
/// Returns the resolved path so the caller can tell the operator where
/// diagnostics went. The file's directory is created if missing; ANSI
/// coloring is off since the target is a plain file.
pub fn init(log_file: Option<PathBuf>) -> Result<PathBuf, LoggingError> {
    let path = log_file.unwrap_or_else(crate::config::default_log_path);
    let (directory, file_name) = split_log_target(&path)?;

    std::fs::create_dir_all(directory).map_err(|source| LoggingError::DirectoryCreation {
        path: directory.to_path_buf(),
        source,
    })?;

    let filter = EnvFilter::builder()
        .with_default_directive(LevelFilter::INFO.into())
        .from_env_lossy();
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(tracing_appender::rolling::never(directory, file_name))
        .with_ansi(false)
        .try_init()
        .map_err(|_| LoggingError::AlreadyInitialized)?;

    Ok(path)
}

/// Split a log target into the directory to append in and the file
/// name. Bare file names land in the current directory; targets with
/// no file-name component are rejected.
fn split_log_target(path: &Path) -> Result<(&Path, &str), LoggingError> {
    match (path.parent(), path.file_name().and_then(|name| name.to_str())) {
        (Some(directory), Some(file_name)) => {
            let directory = if directory.as_os_str().is_empty() {
                Path::new(".")
            } else {
                directory
            };
            Ok((directory, file_name))
        }
        _ => Err(LoggingError::NotAFilePath(path.to_path_buf())),
    }
}
