//! src/config.rs
//!
//! Configuration for batch iterator behaviour
//!
//! The `IteratorConfig` struct stores the parameters that control how a sequence
//! is cut into batches and whether traversal loops over epochs.
//!
//! Example:
//! ```ignore
//! let config = IteratorConfig::builder()
//!     .batch_size(32)
//!     .infinite(true)
//!     .same_size_batches(true)
//!     .build();
//! ```
//!
//! The config can also be read from a JSON/YAML training manifest, any missing
//! field falls back to its default:
//! ```ignore
//! let config: IteratorConfig = serde_json::from_str(r#"{"batch_size": 8}"#)?;
//! ```

use crate::error::BatchError;
use anyhow::Result;
use serde::{Deserialize, Serialize};

/// Batch size used when none is specified.
pub const DEFAULT_BATCH_SIZE: usize = 32;

/// Configuration shared by every batch iterator
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct IteratorConfig {
    /// Number of items per batch (must be > 0)
    pub batch_size: usize,
    /// Whether to restart from the first batch once a pass is complete
    pub infinite: bool,
    /// Whether every batch must hold exactly `batch_size` items.
    /// Only valid together with `infinite = true`.
    pub same_size_batches: bool,
}

impl Default for IteratorConfig {
    fn default() -> Self {
        Self {
            batch_size: DEFAULT_BATCH_SIZE,
            infinite: false,
            same_size_batches: false,
        }
    }
}

impl IteratorConfig {
    pub fn builder() -> IteratorConfigBuilder {
        IteratorConfigBuilder::default()
    }

    /// Checks that the parameters can be honoured.
    ///
    /// Same-size batches over a finite pass cannot be guaranteed without looping
    /// back to the start, so `same_size_batches` requires `infinite`.
    pub fn validate(&self) -> Result<()> {
        if self.batch_size == 0 {
            return Err(BatchError::InvalidBatchSize(self.batch_size).into());
        }
        if self.same_size_batches && !self.infinite {
            return Err(BatchError::IncompatibleConfig.into());
        }
        Ok(())
    }

    /// Number of batches in one pass over `len` items.
    ///
    /// - `same_size_batches`: `floor(len / batch_size)`, a short trailing batch is never produced
    /// - otherwise: `ceil(len / batch_size)`
    pub fn num_batches(&self, len: usize) -> usize {
        if self.batch_size == 0 {
            return 0;
        }
        if self.same_size_batches {
            len / self.batch_size
        } else {
            len.div_ceil(self.batch_size)
        }
    }
}

/// Builder for IteratorConfig with method chaining
#[derive(Default)]
pub struct IteratorConfigBuilder {
    config: IteratorConfig,
}

impl IteratorConfigBuilder {
    /// Set the batch size (must be > 0)
    pub fn batch_size(mut self, size: usize) -> Self {
        self.config.batch_size = size;
        self
    }

    /// Set whether to loop over the data indefinitely
    pub fn infinite(mut self, infinite: bool) -> Self {
        self.config.infinite = infinite;
        self
    }

    /// Set whether all batches must have the same size
    pub fn same_size_batches(mut self, same_size: bool) -> Self {
        self.config.same_size_batches = same_size;
        self
    }

    /// Build the final configuration.
    pub fn build(self) -> IteratorConfig {
        self.config
    }
}
