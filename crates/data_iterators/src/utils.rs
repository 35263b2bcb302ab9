//! Small helpers for sequences and file names.

use std::iter::FusedIterator;

/// Iterator over overlapping pairs of neighbouring items, see [`adjacent_pairs`].
#[derive(Debug, Clone)]
pub struct AdjacentPairs<I: Iterator> {
    iter: I,
    prev: Option<I::Item>,
}

impl<I> Iterator for AdjacentPairs<I>
where
    I: Iterator,
    I::Item: Clone,
{
    type Item = (I::Item, I::Item);

    fn next(&mut self) -> Option<Self::Item> {
        if self.prev.is_none() {
            self.prev = Some(self.iter.next()?);
        }
        let next = self.iter.next()?;
        let prev = self.prev.replace(next.clone())?;
        Some((prev, next))
    }
}

impl<I> FusedIterator for AdjacentPairs<I>
where
    I: FusedIterator,
    I::Item: Clone,
{
}

/// Splits a sequence into overlapping pairs of neighbours.
///
/// ```ignore
/// let pairs: Vec<_> = adjacent_pairs([1, 2, 3, 4]).collect();
/// assert_eq!(pairs, vec![(1, 2), (2, 3), (3, 4)]);
/// ```
/// Fewer than two items produce no pairs.
pub fn adjacent_pairs<I>(items: I) -> AdjacentPairs<I::IntoIter>
where
    I: IntoIterator,
    I::Item: Clone,
{
    AdjacentPairs {
        iter: items.into_iter(),
        prev: None,
    }
}

/// Removes extensions from a file name.
///
/// - Names starting with `.` (hidden files, `.folder`) are returned unchanged.
/// - `exts = None, strip_all = true`: everything from the first `.` is dropped.
/// - `exts = None, strip_all = false`: the name is returned unchanged.
/// - `exts = Some("zip|csv")`: matching trailing extensions are dropped, in any order,
///   until the name no longer ends with one of them.
pub fn strip_exts(filename: &str, exts: Option<&str>, strip_all: bool) -> String {
    if filename.starts_with('.') {
        return filename.to_string();
    }

    let Some(exts) = exts else {
        return if strip_all {
            filename.split('.').next().unwrap_or_default().to_string()
        } else {
            filename.to_string()
        };
    };

    let suffixes: Vec<String> = exts
        .split('|')
        .map(str::trim)
        .filter(|ext| !ext.is_empty())
        .map(|ext| format!(".{ext}"))
        .collect();

    let mut stripped = filename;
    while let Some(suffix) = suffixes
        .iter()
        .find(|suffix| stripped.ends_with(suffix.as_str()))
    {
        stripped = &stripped[..stripped.len() - suffix.len()];
    }
    stripped.to_string()
}
