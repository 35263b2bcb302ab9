pub mod labels;

pub use labels::{read_labels, LabelSource, LabelledSource};
