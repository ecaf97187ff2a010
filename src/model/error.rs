//! Error types for tokflow.
//!
//! This module defines the error taxonomy using `thiserror`. Errors compose
//! via `?` and `From` conversions.
//!
//! # Error Hierarchy
//!
//! - [`AppError`] - Top-level error for the outer shell (CLI, terminal host)
//!   - [`InputError`] - Replay source failures (file not found, no input, IO)
//!   - [`crate::config::ConfigError`] - Config file read/parse failures
//!   - [`crate::logging::LoggingError`] - Log file / subscriber setup failures
//!   - `std::io::Error` - Terminal rendering failures
//!   - [`crate::view::TuiError`] - Event loop failures
//! - [`RevealError`] - Transient scheduling errors inside a reveal tick
//!
//! # Error Recovery Strategy
//!
//! The rendering core has no fatal errors. A [`RevealError`] raised while
//! computing a tick's batch is logged and the scheduler retries on the next
//! frame; it never reaches the host. Misuse (enqueue after dispose, inverted
//! viewport, unknown item id) is a logged no-op that returns a safe default.
//! Only the outer shell propagates errors, and only for things like a missing
//! input file or a broken terminal.

use std::path::PathBuf;
use thiserror::Error;

/// Top-level application error for the outer shell.
///
/// # Examples
///
/// ```no_run
/// use tokflow::model::error::{AppError, InputError};
///
/// fn run_app() -> Result<(), AppError> {
///     // InputError converts to AppError via From
///     let _text = read_input()?;
///     Ok(())
/// }
/// # fn read_input() -> Result<String, InputError> { Ok(String::new()) }
/// ```
#[derive(Debug, Error)]
pub enum AppError {
    /// Failed to read the replay input. Fatal: nothing to stream.
    #[error("Failed to read input: {0}")]
    InputRead(#[from] InputError),

    /// Config file exists but could not be read or parsed.
    #[error("Configuration error: {0}")]
    Config(#[from] crate::config::ConfigError),

    /// Logging could not be initialized.
    #[error("Logging error: {0}")]
    Logging(#[from] crate::logging::LoggingError),

    /// Terminal or TUI rendering error.
    #[error("Terminal error: {0}")]
    Terminal(#[from] std::io::Error),

    /// The terminal host failed while running.
    #[error("Viewer error: {0}")]
    Viewer(#[from] crate::view::TuiError),
}

/// Errors encountered when reading replay input from a file or stdin.
#[derive(Debug, Error)]
pub enum InputError {
    /// The given input file does not exist.
    ///
    /// # Examples
    ///
    /// ```
    /// use std::path::PathBuf;
    /// use tokflow::model::error::InputError;
    ///
    /// let err = InputError::FileNotFound {
    ///     path: PathBuf::from("/tmp/missing.txt")
    /// };
    /// assert!(err.to_string().contains("/tmp/missing.txt"));
    /// ```
    #[error("File not found: {path}")]
    FileNotFound {
        /// The path that was not found.
        path: PathBuf,
    },

    /// No file argument and stdin is an interactive terminal.
    ///
    /// ```
    /// use tokflow::model::error::InputError;
    ///
    /// let msg = InputError::NoInput.to_string();
    /// assert!(msg.contains("file path or pipe text to stdin"));
    /// ```
    #[error("No input source: provide a file path or pipe text to stdin")]
    NoInput,

    /// Any other I/O failure while reading input.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Transient error raised while computing a reveal tick's batch.
///
/// Recovered inside [`crate::reveal::RevealScheduler::tick`]: the error is
/// logged and the tick is rescheduled. Never propagated to the host.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RevealError {
    /// A proportional batch policy was configured with a zero divisor.
    #[error("batch divisor must be at least 1")]
    ZeroDivisor,

    /// A batch policy produced a size outside `1..=queued`.
    #[error("batch size {size} out of range for {queued} queued units")]
    BatchOutOfRange {
        /// Size the policy returned.
        size: usize,
        /// Units waiting in the queue.
        queued: usize,
    },
}
