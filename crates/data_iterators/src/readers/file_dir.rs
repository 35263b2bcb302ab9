use crate::error::BatchError;
use anyhow::{anyhow, Context, Result};
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tracing::debug;
use walkdir::WalkDir;

/// Splits a pipe-delimited extension pattern (`"jpg|jpeg|png"`) into its members.
///
/// Members are trimmed and a leading `*.` or `.` is dropped, so `"*.jpg|.png"`
/// reads the same as `"jpg|png"`. A pattern without any non-empty member is rejected.
pub fn parse_pattern(pattern: &str) -> Result<Vec<String>> {
    let extensions: Vec<String> = pattern
        .split('|')
        .map(|ext| ext.trim().trim_start_matches('*').trim_start_matches('.'))
        .filter(|ext| !ext.is_empty())
        .map(str::to_string)
        .collect();

    if extensions.is_empty() {
        return Err(BatchError::EmptyPattern(pattern.to_string()).into());
    }
    Ok(extensions)
}

/// Lists file paths from a directory (with optional recursion and extension filtering).
/// Only paths are produced, file contents are never read.
///
/// A file matches when its name ends with `.<ext>` for one of the extensions,
/// compared case-insensitively (ASCII). Multi-part extensions such as `tar.gz` work too.
/// Hidden files (name starting with `.`) are never listed, and only candidate names are
/// stat'ed, so unrelated entries cannot fail a scan. Symlinks to files are listed;
/// dangling symlinks are skipped.
///
/// # Example
/// ```ignore
/// let source = FileDirSource::new(
///     "./data/images",
///     &["jpg", "png"], // Allowed extensions (case-insensitive)
///     false,           // Only the top-level directory
/// );
///
/// for path in source.stream()? {
///     let path = path?;
/// }
/// ```
#[derive(Debug, Clone)]
pub struct FileDirSource {
    dir_path: PathBuf,
    extensions: Vec<String>,
    recurse: bool,
}

impl FileDirSource {
    /// Creates a new directory source.
    ///
    /// # Arguments
    /// - `dir_path`: Directory to scan.
    /// - `extensions`: File extensions to include (e.g., `["jpg", "png"]`). Case-insensitive.
    /// - `recurse`: If `true`, scans subdirectories recursively.
    pub fn new(dir_path: impl Into<PathBuf>, extensions: &[&str], recurse: bool) -> Self {
        Self {
            dir_path: dir_path.into(),
            extensions: extensions.iter().map(|s| s.to_string()).collect(),
            recurse,
        }
    }

    /// Creates a source from a pipe-delimited pattern such as `"jpg|jpeg|png"`.
    pub fn from_pattern(dir_path: impl Into<PathBuf>, pattern: &str, recurse: bool) -> Result<Self> {
        Ok(Self {
            dir_path: dir_path.into(),
            extensions: parse_pattern(pattern)?,
            recurse,
        })
    }

    pub fn dir_path(&self) -> &Path {
        &self.dir_path
    }

    pub fn extensions(&self) -> &[String] {
        &self.extensions
    }

    pub fn recurse(&self) -> bool {
        self.recurse
    }

    /// Returns an iterator over matching file paths in directory-listing order.
    pub fn stream(&self) -> Result<Box<dyn Iterator<Item = Result<PathBuf>> + Send>> {
        self.ensure_directory()?;

        // - recurse = true: traverse all subdirectories.
        // - recurse = false: only scan the top-level directory.
        let path_iter: Box<dyn Iterator<Item = Result<PathBuf>> + Send> = if self.recurse {
            Box::new(WalkDir::new(&self.dir_path).min_depth(1).into_iter().map(|entry| {
                entry
                    .map(|e| e.path().to_path_buf())
                    .map_err(|e| anyhow!("Failed to read directory entry: {}", e))
            }))
        } else {
            let entries = fs::read_dir(&self.dir_path).with_context(|| {
                format!("Failed to list directory: {}", self.dir_path.display())
            })?;
            Box::new(entries.map(|entry| {
                entry
                    .map(|e| e.path())
                    .map_err(|e| anyhow!("Failed to read directory entry: {}", e))
            }))
        };

        let extensions = lowercase_suffixes(&self.extensions);
        let iter = path_iter.filter_map(move |path_result| {
            let path = match path_result {
                Ok(path) => path,
                Err(e) => return Some(Err(e)),
            };
            // Entries whose name cannot match are never stat'ed.
            matching_extension(&path, &extensions)?;
            match path.metadata() {
                Ok(metadata) if metadata.is_file() => Some(Ok(path)),
                Ok(_) => None, // Not a regular file
                Err(e) if e.kind() == ErrorKind::NotFound && path.is_symlink() => {
                    debug!(path = %path.display(), "Skipping dangling symlink");
                    None
                }
                Err(e) => Some(Err(e).with_context(|| {
                    format!("Failed to get metadata for: {}", path.display())
                })),
            }
        });
        Ok(Box::new(iter))
    }

    /// Collects every matching path, grouped by extension in the order the
    /// extensions were given. Within one extension the listing order is kept.
    pub fn list(&self) -> Result<Vec<PathBuf>> {
        let suffixes = lowercase_suffixes(&self.extensions);
        let mut groups: Vec<Vec<PathBuf>> = vec![Vec::new(); suffixes.len()];

        for path in self.stream()? {
            let path = path?;
            if let Some(group) = matching_extension(&path, &suffixes) {
                groups[group].push(path);
            }
        }

        let files: Vec<PathBuf> = groups.into_iter().flatten().collect();
        debug!(
            dir = %self.dir_path.display(),
            extensions = ?self.extensions,
            recurse = self.recurse,
            count = files.len(),
            "Discovered files"
        );
        Ok(files)
    }

    fn ensure_directory(&self) -> Result<()> {
        let metadata = match fs::metadata(&self.dir_path) {
            Ok(metadata) => metadata,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                return Err(BatchError::DirectoryNotFound(self.dir_path.clone()).into());
            }
            Err(e) => {
                return Err(e).with_context(|| {
                    format!("Failed to access directory: {}", self.dir_path.display())
                });
            }
        };
        if !metadata.is_dir() {
            return Err(BatchError::NotADirectory(self.dir_path.clone()).into());
        }
        Ok(())
    }
}

fn lowercase_suffixes(extensions: &[String]) -> Vec<String> {
    extensions
        .iter()
        .map(|ext| format!(".{}", ext.to_ascii_lowercase()))
        .collect()
}

/// Index of the first suffix the file name ends with.
///
/// Names are compared as raw bytes, so names that are not valid UTF-8 still match.
/// Hidden names (leading `.`) never match.
fn matching_extension(path: &Path, suffixes: &[String]) -> Option<usize> {
    let name = path.file_name()?.as_encoded_bytes();
    if name.starts_with(b".") {
        return None;
    }
    suffixes.iter().position(|suffix| {
        let suffix = suffix.as_bytes();
        name.len() > suffix.len() && name[name.len() - suffix.len()..].eq_ignore_ascii_case(suffix)
    })
}
