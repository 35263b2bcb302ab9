use super::array::BatchArrayIterator;
use crate::config::IteratorConfig;
use crate::readers::FileDirSource;
use anyhow::Result;
use std::iter::FusedIterator;
use std::path::{Path, PathBuf};

/// Extensions scanned by [`FilesStream`] when no pattern is given.
pub const DEFAULT_IMAGE_PATTERN: &str = "jpg|jpeg|png|bmp|tiff";

/// Iterator that yields batches of file paths.
///
/// The directory is scanned once, at construction. The resulting list is batched by a
/// [`BatchArrayIterator`] with the same config, so files are read lazily by the caller
/// instead of all at once. With `infinite = true` the paths are yielded in a loop, which
/// suits training over several epochs. Files created or removed after construction are
/// not seen.
///
/// The order of paths is the directory listing order grouped by extension and must be
/// treated as unspecified.
///
/// # Example
/// ```ignore
/// let config = IteratorConfig::builder().batch_size(16).infinite(true).build();
/// let mut files = FilesIterator::new("./data/train", "jpg|png", config)?;
/// for _ in 0..files.n_batches() * num_epochs {
///     let paths = files.next().unwrap();
///     // load images from `paths`...
/// }
/// ```
#[derive(Debug, Clone)]
pub struct FilesIterator {
    folder: PathBuf,
    pattern: String,
    extensions: Vec<String>,
    inner: BatchArrayIterator<Vec<PathBuf>>,
}

impl FilesIterator {
    /// Lists the direct children of `folder` matching the pipe-delimited `pattern`.
    pub fn new(folder: impl Into<PathBuf>, pattern: &str, config: IteratorConfig) -> Result<Self> {
        config.validate()?;
        let source = FileDirSource::from_pattern(folder, pattern, false)?;
        Self::build(source, pattern.to_string(), config)
    }

    /// Lists matching files from an already configured source (e.g. a recursive one).
    pub fn from_source(source: FileDirSource, config: IteratorConfig) -> Result<Self> {
        config.validate()?;
        let pattern = source.extensions().join("|");
        Self::build(source, pattern, config)
    }

    fn build(source: FileDirSource, pattern: String, config: IteratorConfig) -> Result<Self> {
        let files = source.list()?;
        let inner = BatchArrayIterator::new(files, config)?;
        Ok(Self {
            folder: source.dir_path().to_path_buf(),
            pattern,
            extensions: source.extensions().to_vec(),
            inner,
        })
    }

    pub fn folder(&self) -> &Path {
        &self.folder
    }

    pub fn pattern(&self) -> &str {
        &self.pattern
    }

    pub fn extensions(&self) -> &[String] {
        &self.extensions
    }

    /// Every path found at construction, in iteration order.
    pub fn files(&self) -> &[PathBuf] {
        self.inner.sequences()
    }

    pub fn n_batches(&self) -> usize {
        self.inner.n_batches()
    }

    pub fn batch_index(&self) -> usize {
        self.inner.batch_index()
    }

    pub fn epoch_index(&self) -> usize {
        self.inner.epoch_index()
    }

    pub fn batch_size(&self) -> usize {
        self.inner.batch_size()
    }

    pub fn infinite(&self) -> bool {
        self.inner.infinite()
    }

    pub fn same_size_batches(&self) -> bool {
        self.inner.same_size_batches()
    }

    /// Rewinds to the first batch without re-scanning the directory.
    pub fn reset(&mut self) {
        self.inner.reset();
    }
}

impl Iterator for FilesIterator {
    type Item = Vec<PathBuf>;

    fn next(&mut self) -> Option<Vec<PathBuf>> {
        self.inner.next()
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

impl FusedIterator for FilesIterator {}

/// A one-time directory scan that hands out independent batch iterators.
///
/// Each call to [`FilesStream::iter`] returns a fresh [`BatchArrayIterator`] over the
/// same file list, so a finite validation pass and an infinite training loop can be
/// drawn from a single scan.
///
/// # Example
/// ```ignore
/// let stream = FilesStream::new("./data/images", 32, DEFAULT_IMAGE_PATTERN)?;
/// let train = stream.iter(true, true)?;   // endless, every batch has 32 paths
/// let valid = stream.iter(false, false)?; // one pass, last batch may be short
/// ```
#[derive(Debug, Clone)]
pub struct FilesStream {
    folder: PathBuf,
    batch_size: usize,
    extensions: Vec<String>,
    files: Vec<PathBuf>,
}

impl FilesStream {
    pub fn new(folder: impl Into<PathBuf>, batch_size: usize, pattern: &str) -> Result<Self> {
        Self::from_source(FileDirSource::from_pattern(folder, pattern, false)?, batch_size)
    }

    pub fn from_source(source: FileDirSource, batch_size: usize) -> Result<Self> {
        // Fail on a bad batch size before touching the filesystem.
        IteratorConfig::builder()
            .batch_size(batch_size)
            .build()
            .validate()?;

        Ok(Self {
            folder: source.dir_path().to_path_buf(),
            batch_size,
            extensions: source.extensions().to_vec(),
            files: source.list()?,
        })
    }

    /// Creates an iterator yielding the scanned paths in batches.
    ///
    /// - `infinite`: keep yielding paths in a loop instead of stopping after one pass.
    /// - `same_size_batches`: every batch holds exactly `batch_size` paths; requires `infinite`.
    pub fn iter(
        &self,
        infinite: bool,
        same_size_batches: bool,
    ) -> Result<BatchArrayIterator<Vec<PathBuf>>> {
        let config = IteratorConfig::builder()
            .batch_size(self.batch_size)
            .infinite(infinite)
            .same_size_batches(same_size_batches)
            .build();
        BatchArrayIterator::new(self.files.clone(), config)
    }

    pub fn folder(&self) -> &Path {
        &self.folder
    }

    pub fn batch_size(&self) -> usize {
        self.batch_size
    }

    pub fn extensions(&self) -> &[String] {
        &self.extensions
    }

    pub fn files(&self) -> &[PathBuf] {
        &self.files
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::BatchError;
    use std::collections::HashSet;
    use std::fs::{self, File};
    use tempfile::tempdir;

    #[test]
    fn test_files_iterator_has_required_properties() -> Result<()> {
        let dir = tempdir()?;
        let iter = FilesIterator::new(dir.path(), "a|b|c", IteratorConfig::default())?;

        assert_eq!(iter.folder(), dir.path());
        assert_eq!(iter.pattern(), "a|b|c");
        assert_eq!(iter.batch_size(), 32);
        assert!(!iter.infinite());
        assert!(!iter.same_size_batches());
        assert_eq!(iter.extensions(), ["a", "b", "c"]);
        assert_eq!(iter.n_batches(), 0);
        Ok(())
    }

    #[test]
    fn test_files_iterator_loops_over_epochs() -> Result<()> {
        let dir = tempdir()?;
        for name in ["1.dat", "2.dat", "3.dat"] {
            File::create(dir.path().join(name))?;
        }
        let config = IteratorConfig::builder().batch_size(2).infinite(true).build();
        let mut iter = FilesIterator::new(dir.path(), "dat", config)?;

        let first_pass: Vec<_> = iter.by_ref().take(2).flatten().collect();
        let second_pass: Vec<_> = iter.by_ref().take(2).flatten().collect();
        assert_eq!(first_pass, second_pass);
        assert_eq!(iter.epoch_index(), 1);
        Ok(())
    }

    #[test]
    fn test_files_iterator_rejects_config_before_scanning() {
        let config = IteratorConfig::builder().same_size_batches(true).build();
        let err = FilesIterator::new("/definitely/not/here", "txt", config).unwrap_err();
        assert_eq!(
            err.downcast_ref::<BatchError>(),
            Some(&BatchError::IncompatibleConfig)
        );
    }

    #[test]
    fn test_files_iterator_from_recursive_source() -> Result<()> {
        let dir = tempdir()?;
        fs::create_dir(dir.path().join("inner"))?;
        File::create(dir.path().join("outer.log"))?;
        File::create(dir.path().join("inner/inner.log"))?;

        let source = FileDirSource::from_pattern(dir.path(), "log", true)?;
        let iter = FilesIterator::from_source(source, IteratorConfig::default())?;
        assert_eq!(iter.pattern(), "log");
        assert_eq!(iter.files().len(), 2);
        Ok(())
    }

    #[test]
    fn test_files_stream_hands_out_independent_iterators() -> Result<()> {
        let dir = tempdir()?;
        for i in 0..5 {
            File::create(dir.path().join(format!("{i}.png")))?;
        }
        let stream = FilesStream::new(dir.path(), 2, DEFAULT_IMAGE_PATTERN)?;
        assert_eq!(stream.files().len(), 5);

        let finite: Vec<_> = stream.iter(false, false)?.collect();
        assert_eq!(finite.len(), 3);

        let mut uniform = stream.iter(true, true)?;
        assert_eq!(uniform.n_batches(), 2);
        assert!(uniform.by_ref().take(7).all(|batch| batch.len() == 2));

        let all: HashSet<_> = finite.into_iter().flatten().collect();
        let expected: HashSet<_> = stream.files().iter().cloned().collect();
        assert_eq!(all, expected);

        assert!(stream.iter(false, true).is_err());
        Ok(())
    }
}
