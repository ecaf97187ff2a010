//! Replay input sources.
//!
//! This module turns a text file (or piped stdin) into a simulated token
//! stream:
//! - File loading and stdin reading, unified by [`InputSource`]
//! - Paragraph splitting into messages ([`split_messages`])
//! - Deterministic bursty chunking over time ([`ReplaySource`])

use crate::model::error::InputError;
use std::io::{IsTerminal, Read};
use std::path::{Path, PathBuf};

pub mod replay;

pub use replay::{ReplayConfig, ReplayEvent, ReplaySource};

/// Where the replay text comes from.
///
/// Sum type enforces exactly one variant.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InputSource {
    /// Read a whole file.
    File(PathBuf),
    /// Read piped stdin to EOF.
    Stdin,
}

impl InputSource {
    /// Read the complete input text.
    ///
    /// # Errors
    ///
    /// Returns `InputError::FileNotFound` if the file does not exist.
    /// Returns `InputError::Io` for other I/O errors.
    pub fn read_to_string(&self) -> Result<String, InputError> {
        match self {
            InputSource::File(path) => read_file(path),
            InputSource::Stdin => read_all(std::io::stdin().lock()),
        }
    }
}

/// Detect the input source.
///
/// # Logic:
/// 1. If file path is provided: read that file
/// 2. If stdin is piped: read stdin
/// 3. Else: return InputError::NoInput
///
/// # Errors
///
/// Returns `InputError::NoInput` if no file is provided and stdin is a terminal.
pub fn detect_input_source(file: Option<PathBuf>) -> Result<InputSource, InputError> {
    match file {
        Some(path) => Ok(InputSource::File(path)),
        None if std::io::stdin().is_terminal() => Err(InputError::NoInput),
        None => Ok(InputSource::Stdin),
    }
}

fn read_file(path: &Path) -> Result<String, InputError> {
    if !path.exists() {
        return Err(InputError::FileNotFound {
            path: path.to_path_buf(),
        });
    }
    Ok(std::fs::read_to_string(path)?)
}

fn read_all(mut reader: impl Read) -> Result<String, InputError> {
    let mut text = String::new();
    reader.read_to_string(&mut text)?;
    Ok(text)
}

/// Split text into messages on blank-line paragraph breaks.
///
/// Lines holding only whitespace count as blank. Single newlines inside a
/// paragraph are kept; surrounding blank lines are dropped.
///
/// ```
/// # use tokflow::source::split_messages;
/// let messages = split_messages("Hello\nthere\n\n\nSecond one\n");
/// assert_eq!(messages, vec!["Hello\nthere", "Second one"]);
/// ```
pub fn split_messages(text: &str) -> Vec<String> {
    let mut messages = Vec::new();
    let mut current: Vec<&str> = Vec::new();

    for line in text.lines() {
        if line.trim().is_empty() {
            if !current.is_empty() {
                messages.push(current.join("\n"));
                current.clear();
            }
        } else {
            current.push(line);
        }
    }
    if !current.is_empty() {
        messages.push(current.join("\n"));
    }

    messages
}
