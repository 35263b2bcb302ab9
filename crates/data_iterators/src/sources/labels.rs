//! Class labels for labelled datasets.
//!
//! A [`LabelSource`] says where labels come from. Loading it gives a [`LabelledSource`]:
//! the identifier to class-name mapping plus a stable numbering of the class names
//! (sorted alphabetically, numbered from 0).

use crate::error::BatchError;
use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use tracing::debug;

fn default_id_column() -> String {
    "id".to_string()
}

/// Label source selection, tagged by `labels_from`.
///
/// ```ignore
/// let source: LabelSource = serde_json::from_str(
///     r#"{"labels_from": "file", "filename": "labels.csv", "label_column": "class"}"#,
/// )?;
/// let labels = source.load()?;
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "labels_from", rename_all = "snake_case")]
pub enum LabelSource {
    /// CSV file with a header row and one row per item.
    File {
        filename: PathBuf,
        /// Column holding the class name.
        label_column: String,
        /// Column holding the item identifier.
        #[serde(default = "default_id_column")]
        id_column: String,
    },
}

impl LabelSource {
    /// CSV file source with the identifier in the `id` column.
    pub fn from_file(filename: impl Into<PathBuf>, label_column: impl Into<String>) -> Self {
        LabelSource::File {
            filename: filename.into(),
            label_column: label_column.into(),
            id_column: default_id_column(),
        }
    }

    pub fn with_id_column(self, column: impl Into<String>) -> Self {
        match self {
            LabelSource::File {
                filename,
                label_column,
                ..
            } => LabelSource::File {
                filename,
                label_column,
                id_column: column.into(),
            },
        }
    }

    /// Reads the labels and numbers the classes.
    pub fn load(&self) -> Result<LabelledSource> {
        match self {
            LabelSource::File {
                filename,
                label_column,
                id_column,
            } => {
                let labels = read_labels(filename, label_column, id_column)?;
                Ok(LabelledSource::from_labels(labels))
            }
        }
    }
}

/// Reads an identifier to class-name mapping from a CSV file.
///
/// The first row names the columns. Later rows with an already seen identifier
/// overwrite the earlier class.
pub fn read_labels(
    filename: &Path,
    label_column: &str,
    id_column: &str,
) -> Result<HashMap<String, String>> {
    if !filename.is_file() {
        return Err(BatchError::LabelsFileNotFound(filename.to_path_buf()).into());
    }

    let mut reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_path(filename)
        .with_context(|| format!("Failed to open labels file: {}", filename.display()))?;

    let headers = reader
        .headers()
        .with_context(|| format!("Failed to read header of: {}", filename.display()))?
        .clone();
    let column_index = |column: &str| {
        headers
            .iter()
            .position(|header| header == column)
            .ok_or_else(|| BatchError::MissingColumn(column.to_string()))
    };
    let id_index = column_index(id_column)?;
    let label_index = column_index(label_column)?;

    let mut labels = HashMap::new();
    for (row, record) in reader.records().enumerate() {
        let record = record
            .with_context(|| format!("Failed to parse row {} of: {}", row + 1, filename.display()))?;
        match (record.get(id_index), record.get(label_index)) {
            (Some(id), Some(label)) => {
                labels.insert(id.to_string(), label.to_string());
            }
            _ => bail!("Row {} of {} is missing fields", row + 1, filename.display()),
        }
    }

    debug!(file = %filename.display(), rows = labels.len(), "Read labels");
    Ok(labels)
}

/// Labels of a dataset with the class names numbered in sorted order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LabelledSource {
    uid_to_verbose: HashMap<String, String>,
    verbose_classes: Vec<String>,
}

impl LabelledSource {
    pub fn from_labels(uid_to_verbose: HashMap<String, String>) -> Self {
        let mut verbose_classes: Vec<String> = uid_to_verbose.values().cloned().collect();
        verbose_classes.sort();
        verbose_classes.dedup();
        Self {
            uid_to_verbose,
            verbose_classes,
        }
    }

    pub fn n_classes(&self) -> usize {
        self.verbose_classes.len()
    }

    /// Numeric labels, `0..n_classes`.
    pub fn classes(&self) -> Vec<usize> {
        (0..self.n_classes()).collect()
    }

    /// Class names, indexed by numeric label.
    pub fn verbose_classes(&self) -> &[String] {
        &self.verbose_classes
    }

    pub fn uid_to_verbose(&self) -> &HashMap<String, String> {
        &self.uid_to_verbose
    }

    /// Numeric label of the item with identifier `uid`, if it is labelled.
    pub fn label_of(&self, uid: &str) -> Option<usize> {
        let verbose = self.uid_to_verbose.get(uid)?;
        self.position(verbose)
    }

    pub fn to_label<S: AsRef<str>>(&self, names: &[S]) -> Result<Vec<usize>> {
        names
            .iter()
            .map(|name| {
                let name = name.as_ref();
                self.position(name)
                    .ok_or_else(|| BatchError::UnknownClass(name.to_string()).into())
            })
            .collect()
    }

    pub fn to_verbose(&self, labels: &[usize]) -> Result<Vec<String>> {
        labels
            .iter()
            .map(|&label| {
                self.verbose_classes
                    .get(label)
                    .cloned()
                    .ok_or_else(|| BatchError::UnknownLabel(label).into())
            })
            .collect()
    }

    fn position(&self, verbose: &str) -> Option<usize> {
        self.verbose_classes
            .binary_search_by(|class| class.as_str().cmp(verbose))
            .ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    const COLOURS: &str = "id,class\n1,red\n2,red\n3,green\n4,blue\n5,green\n";

    fn colours(dir: &Path) -> Result<LabelledSource> {
        let filename = dir.join("labels.csv");
        fs::write(&filename, COLOURS)?;
        LabelSource::from_file(filename, "class").load()
    }

    #[test]
    fn test_classes_are_numbered_in_sorted_order() -> Result<()> {
        let dir = tempdir()?;
        let source = colours(dir.path())?;

        assert_eq!(source.n_classes(), 3);
        assert_eq!(source.classes(), vec![0, 1, 2]);
        assert_eq!(source.verbose_classes(), ["blue", "green", "red"]);
        assert_eq!(source.uid_to_verbose().len(), 5);
        assert_eq!(source.label_of("3"), Some(1));
        assert_eq!(source.label_of("42"), None);
        Ok(())
    }

    #[test]
    fn test_maps_between_names_and_labels() -> Result<()> {
        let dir = tempdir()?;
        let source = colours(dir.path())?;

        assert_eq!(source.to_label(&["blue", "green", "red"])?, vec![0, 1, 2]);
        assert_eq!(source.to_verbose(&[0, 1, 2])?, vec!["blue", "green", "red"]);

        let err = source.to_label(&["purple"]).unwrap_err();
        assert_eq!(
            err.downcast_ref::<BatchError>(),
            Some(&BatchError::UnknownClass("purple".to_string()))
        );
        let err = source.to_verbose(&[3]).unwrap_err();
        assert_eq!(err.downcast_ref::<BatchError>(), Some(&BatchError::UnknownLabel(3)));
        Ok(())
    }

    #[test]
    fn test_custom_id_column_and_whitespace() -> Result<()> {
        let dir = tempdir()?;
        let filename = dir.path().join("train.csv");
        fs::write(&filename, "image, breed\n a.jpg , husky\nb.jpg,corgi\n")?;

        let source = LabelSource::from_file(&filename, "breed")
            .with_id_column("image")
            .load()?;
        assert_eq!(source.label_of("a.jpg"), Some(1));
        assert_eq!(source.verbose_classes(), ["corgi", "husky"]);
        Ok(())
    }

    #[test]
    fn test_read_labels_errors() -> Result<()> {
        let dir = tempdir()?;
        let missing = dir.path().join("missing.csv");
        let err = read_labels(&missing, "class", "id").unwrap_err();
        assert_eq!(
            err.downcast_ref::<BatchError>(),
            Some(&BatchError::LabelsFileNotFound(missing))
        );

        let filename = dir.path().join("labels.csv");
        fs::write(&filename, COLOURS)?;
        let err = read_labels(&filename, "label", "id").unwrap_err();
        assert_eq!(
            err.downcast_ref::<BatchError>(),
            Some(&BatchError::MissingColumn("label".to_string()))
        );
        Ok(())
    }

    #[test]
    fn test_deserialize_tagged_source() -> Result<()> {
        let source: LabelSource = serde_json::from_str(
            r#"{"labels_from": "file", "filename": "labels.csv", "label_column": "class"}"#,
        )?;
        assert_eq!(source, LabelSource::from_file("labels.csv", "class"));

        let unknown = serde_json::from_str::<LabelSource>(
            r#"{"labels_from": "kaggle", "filename": "labels.csv", "label_column": "class"}"#,
        );
        assert!(unknown.is_err());
        Ok(())
    }
}
