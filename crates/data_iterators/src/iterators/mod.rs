//! Batch iterators.
//!
//! - [`BatchArrayIterator`]: positional batching over one or more in-memory sequences.
//! - [`FilesIterator`]: batches of file paths discovered once in a directory.
//! - [`FilesStream`]: one directory scan handing out any number of batch iterators.

pub mod array;
pub mod files;

pub use array::BatchArrayIterator;
pub use files::{FilesIterator, FilesStream, DEFAULT_IMAGE_PATTERN};
