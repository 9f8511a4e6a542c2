//! Error types for termline
//!
//! Follows the taxonomy of the editing engine: read/write failures on the
//! terminal descriptors, raw-mode configuration failures, and history file
//! access failures. End-of-input is not an error; it is reported through
//! [`crate::Status`].

use std::io;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum LineError {
    #[error("Failed to read from terminal: {0}")]
    Read(#[source] io::Error),

    #[error("Failed to write to terminal: {0}")]
    Write(#[source] io::Error),

    #[error("Failed to configure terminal mode: {0}")]
    TermConfig(#[source] io::Error),

    #[error("Failed to access history file: {0}")]
    HistoryFile(#[source] io::Error),

    #[error("Invalid argument: {0}")]
    InvalidArgument(&'static str),

    #[error("Session is not editing a line")]
    NotEditing,
}

pub type Result<T> = std::result::Result<T, LineError>;
