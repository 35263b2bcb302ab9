use crate::error::BatchError;
use anyhow::Result;
use std::ops::Range;

/// One or more equal-length ordered sequences that can be sliced by position.
///
/// A single `Vec<T>` yields `Vec<T>` batches. A tuple of vectors, such as
/// `(Vec<PathBuf>, Vec<u32>)` for paired inputs and labels, yields a tuple of
/// slices taken at the same positions so paired items stay aligned.
///
/// # Example
/// ```ignore
/// let paired = (vec!["a.png", "b.png", "c.png"], vec![0, 1, 0]);
/// assert_eq!(paired.common_len()?, 3);
/// assert_eq!(paired.slice(1..3), (vec!["b.png", "c.png"], vec![1, 0]));
/// ```
pub trait Sequences {
    /// What one positional slice of every sequence looks like.
    type Batch;

    /// Length shared by all sequences; fails when the lengths differ.
    fn common_len(&self) -> Result<usize>;

    /// Copies the items at `range` out of every sequence.
    /// `range` must lie within `0..common_len()`.
    fn slice(&self, range: Range<usize>) -> Self::Batch;
}

impl<T: Clone> Sequences for Vec<T> {
    type Batch = Vec<T>;

    fn common_len(&self) -> Result<usize> {
        Ok(self.len())
    }

    fn slice(&self, range: Range<usize>) -> Vec<T> {
        self[range].to_vec()
    }
}

fn check_equal_lengths(lengths: &[usize]) -> Result<usize> {
    let expected = lengths[0];
    for (index, &actual) in lengths.iter().enumerate().skip(1) {
        if actual != expected {
            return Err(BatchError::LengthMismatch {
                index,
                expected,
                actual,
            }
            .into());
        }
    }
    Ok(expected)
}

impl<A: Clone, B: Clone> Sequences for (Vec<A>, Vec<B>) {
    type Batch = (Vec<A>, Vec<B>);

    fn common_len(&self) -> Result<usize> {
        check_equal_lengths(&[self.0.len(), self.1.len()])
    }

    fn slice(&self, range: Range<usize>) -> Self::Batch {
        (self.0[range.clone()].to_vec(), self.1[range].to_vec())
    }
}

impl<A: Clone, B: Clone, C: Clone> Sequences for (Vec<A>, Vec<B>, Vec<C>) {
    type Batch = (Vec<A>, Vec<B>, Vec<C>);

    fn common_len(&self) -> Result<usize> {
        check_equal_lengths(&[self.0.len(), self.1.len(), self.2.len()])
    }

    fn slice(&self, range: Range<usize>) -> Self::Batch {
        (
            self.0[range.clone()].to_vec(),
            self.1[range.clone()].to_vec(),
            self.2[range].to_vec(),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_single_sequence_slice() -> Result<()> {
        let items = vec![1, 2, 3, 4, 5];
        assert_eq!(items.common_len()?, 5);
        assert_eq!(items.slice(1..3), vec![2, 3]);
        assert!(items.slice(5..5).is_empty());
        Ok(())
    }

    #[test]
    fn test_paired_sequences_stay_aligned() -> Result<()> {
        let paired = (vec![1, 2, 3, 4], vec!["a", "b", "c", "d"]);
        assert_eq!(paired.common_len()?, 4);
        assert_eq!(paired.slice(2..4), (vec![3, 4], vec!["c", "d"]));
        Ok(())
    }

    #[test]
    fn test_mismatched_lengths_are_rejected() {
        let triple = (vec![1, 2, 3], vec![1.0, 2.0, 3.0], vec!['a', 'b']);
        let err = triple.common_len().unwrap_err();
        assert_eq!(
            err.downcast_ref::<BatchError>(),
            Some(&BatchError::LengthMismatch {
                index: 2,
                expected: 3,
                actual: 2
            })
        );
    }
}
