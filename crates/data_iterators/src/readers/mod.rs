pub mod file_dir;

pub use file_dir::{parse_pattern, FileDirSource};
