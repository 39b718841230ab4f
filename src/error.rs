//! Error types for the keystroke session, passage loading and export

use std::path::PathBuf;

use thiserror::Error;

use crate::session::Phase;

/// Errors raised when an operation does not fit the current session phase
#[derive(Error, Debug, Clone, PartialEq)]
pub enum SessionError {
    #[error("A session needs at least one passage")]
    NoPassages,

    #[error("Cannot {action} while the session is {phase}")]
    InvalidPhase { action: &'static str, phase: Phase },

    #[error("Passage {0} does not exist")]
    UnknownPassage(usize),

    #[error("Passage {0} is already sealed")]
    PassageSealed(usize),

    #[error("Passage {0} does not match its reference yet")]
    PassageIncomplete(usize),
}

/// Errors raised by a passage source
#[derive(Error, Debug)]
pub enum PassageLoadError {
    #[error("Failed to read passage file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Passage file {0} is not valid UTF-8")]
    NotUtf8(PathBuf),

    #[error("Passage {0} is empty")]
    Empty(String),

    #[error("No passages found in {0}")]
    NoPassages(String),

    #[error("Both {first} and {second} claim passage number {number}")]
    DuplicateNumber {
        number: usize,
        first: String,
        second: String,
    },
}

/// Errors raised while exporting interval data
#[derive(Error, Debug)]
pub enum ExportError {
    #[error("Failed to write CSV: {0}")]
    Csv(#[from] csv::Error),

    #[error("Failed to write export file: {0}")]
    Io(#[from] std::io::Error),
}
