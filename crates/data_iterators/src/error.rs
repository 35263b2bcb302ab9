//! Typed failures raised by iterator construction, file discovery, label loading
//! and the pipeline.
//!
//! Every public operation in this crate returns `anyhow::Result`. When the failure
//! is one of the conditions below, the `anyhow::Error` wraps a [`BatchError`] so
//! callers can tell them apart with `err.downcast_ref::<BatchError>()`.

use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum BatchError {
    #[error("batch_size must be > 0, but got batch_size={0}")]
    InvalidBatchSize(usize),

    #[error(
        "Incompatible configuration: cannot guarantee same size of batches \
         when yielding a finite number of items (set infinite=true)"
    )]
    IncompatibleConfig,

    #[error("Sequences should have the same length: sequence {index} has {actual} items, expected {expected}")]
    LengthMismatch {
        index: usize,
        expected: usize,
        actual: usize,
    },

    #[error("Extension pattern '{0}' does not contain any extension")]
    EmptyPattern(String),

    #[error("Directory not found: {}", .0.display())]
    DirectoryNotFound(PathBuf),

    #[error("Path is not a directory: {}", .0.display())]
    NotADirectory(PathBuf),

    #[error("Labels file not found: {}", .0.display())]
    LabelsFileNotFound(PathBuf),

    #[error("Column '{0}' was not found in the labels file")]
    MissingColumn(String),

    #[error("Unknown class name: '{0}'")]
    UnknownClass(String),

    #[error("Unknown numeric label: {0}")]
    UnknownLabel(usize),

    #[error("Pipeline is poisoned by a failed stage; call configure() before pulling again")]
    PipelinePoisoned,
}
