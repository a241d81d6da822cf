//! Error types for schematic tooling

use std::path::PathBuf;
use thiserror::Error;

/// Main error type for the crate
#[derive(Debug, Error)]
pub enum Error {
    /// Malformed or unsupported schematic data. Per-item in batch
    /// operations: the batch records the failure and continues.
    #[error("decode error: {0}")]
    Decode(String),

    /// A named schematic or path could not be located.
    #[error("not found: {0}")]
    NotFound(String),

    /// The root of a batch operation is missing or not a directory.
    #[error("not a directory: {}", .0.display())]
    InvalidDirectory(PathBuf),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
