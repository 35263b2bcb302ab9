pub mod config;
pub mod error;
pub mod iterators;
pub mod pipeline;
pub mod readers;
pub mod sequences;
pub mod sources;
pub mod utils;

pub use config::{IteratorConfig, IteratorConfigBuilder};
pub use error::BatchError;
pub use iterators::{BatchArrayIterator, FilesIterator, FilesStream, DEFAULT_IMAGE_PATTERN};
pub use pipeline::{GeneratorPipeline, Stage, Step};
pub use readers::FileDirSource;
pub use sequences::Sequences;
pub use sources::{read_labels, LabelSource, LabelledSource};
pub use utils::{adjacent_pairs, strip_exts};
