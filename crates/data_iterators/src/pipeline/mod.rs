//! Staged per-item transforms.
//!
//! A [`GeneratorPipeline`] pulls items from a source and pushes each one through an
//! ordered list of [`Stage`]s. Any stage may answer [`Step::Skip`] to drop the current
//! item, in which case the pipeline moves straight on to the next source item.
//!
//! ```text
//!   source ──► stage 0 ──► stage 1 ──► ... ──► stage n ──► output
//!                 │           │                   │
//!               Skip        Skip                Skip
//!                 └───────────┴─────► pull next ◄─┘
//! ```
//!
//! Typical use is filtering or validating batches before they reach a training loop:
//! ```ignore
//! let batches = BatchArrayIterator::new(samples, config)?;
//! let mut pipeline = GeneratorPipeline::new(batches, Vec::new(), None)?;
//! pipeline
//!     .add(filter(|batch: &Vec<Sample>| !batch.is_empty()))
//!     .add(map(normalize_batch));
//! for batch in pipeline {
//!     train_step(batch?)?;
//! }
//! ```

mod generator;
pub mod stage;

pub use generator::GeneratorPipeline;
pub use stage::{filter, map, Filter, Map, Stage, Step};
