use crate::config::IteratorConfig;
use crate::sequences::Sequences;
use anyhow::Result;
use std::iter::FusedIterator;
use tracing::trace;

/// Iterates one or more equal-length sequences batch by batch.
///
/// Batches are cut by position: batch `i` holds items `[i * batch_size, (i + 1) * batch_size)`
/// of every sequence. The number of batches in one pass (an epoch) is:
/// - `ceil(n / batch_size)` by default, the last batch may be shorter;
/// - `floor(n / batch_size)` with `same_size_batches`, the trailing remainder is never yielded.
///
/// # Modes
/// - finite (`infinite = false`): yields one pass, then `None` forever.
/// - infinite: after the last batch of a pass it rewinds to the first batch and bumps
///   `epoch_index`. A pass with zero batches (empty input, or fewer items than
///   `batch_size` with `same_size_batches`) is exhausted immediately instead of spinning.
///
/// # Example
/// ```ignore
/// let config = IteratorConfig::builder().batch_size(2).build();
/// let batches: Vec<_> = BatchArrayIterator::new(vec![1, 2, 3], config)?.collect();
/// assert_eq!(batches, vec![vec![1, 2], vec![3]]);
///
/// // Paired data and labels stay aligned.
/// let paired = (vec!["a.png", "b.png"], vec![0, 1]);
/// let mut iter = BatchArrayIterator::new(paired, config)?;
/// assert_eq!(iter.next(), Some((vec!["a.png", "b.png"], vec![0, 1])));
/// ```
#[derive(Debug, Clone)]
pub struct BatchArrayIterator<S> {
    sequences: S,
    config: IteratorConfig,
    num_items: usize,
    n_batches: usize,
    batch_index: usize,
    epoch_index: usize,
}

impl<S: Sequences> BatchArrayIterator<S> {
    /// Takes ownership of the sequences and validates them against `config`.
    ///
    /// Fails when the config is invalid (zero batch size, same-size batches
    /// without infinite looping) or when the sequences differ in length.
    pub fn new(sequences: S, config: IteratorConfig) -> Result<Self> {
        config.validate()?;
        let num_items = sequences.common_len()?;
        let n_batches = config.num_batches(num_items);

        Ok(Self {
            sequences,
            config,
            num_items,
            n_batches,
            batch_index: 0,
            epoch_index: 0,
        })
    }

    /// Number of batches in one pass over the sequences.
    pub fn n_batches(&self) -> usize {
        self.n_batches
    }

    /// Position of the next batch within the current pass.
    pub fn batch_index(&self) -> usize {
        self.batch_index
    }

    /// Number of completed passes (only ever grows in infinite mode).
    pub fn epoch_index(&self) -> usize {
        self.epoch_index
    }

    pub fn batch_size(&self) -> usize {
        self.config.batch_size
    }

    pub fn infinite(&self) -> bool {
        self.config.infinite
    }

    pub fn same_size_batches(&self) -> bool {
        self.config.same_size_batches
    }

    pub fn config(&self) -> &IteratorConfig {
        &self.config
    }

    /// Number of items in each of the wrapped sequences.
    pub fn num_items(&self) -> usize {
        self.num_items
    }

    pub fn sequences(&self) -> &S {
        &self.sequences
    }

    /// Rewinds to the first batch of the first epoch, so a finite iterator
    /// can be traversed again.
    pub fn reset(&mut self) {
        self.batch_index = 0;
        self.epoch_index = 0;
    }
}

impl<S: Sequences> Iterator for BatchArrayIterator<S> {
    type Item = S::Batch;

    fn next(&mut self) -> Option<Self::Item> {
        if self.batch_index >= self.n_batches {
            if !self.config.infinite || self.n_batches == 0 {
                return None;
            }
            self.batch_index = 0;
            self.epoch_index += 1;
            trace!(epoch = self.epoch_index, "Starting a new pass over the sequences");
        }

        let start = self.batch_index * self.config.batch_size;
        let end = (start + self.config.batch_size).min(self.num_items);
        self.batch_index += 1;
        Some(self.sequences.slice(start..end))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        if self.config.infinite && self.n_batches > 0 {
            (usize::MAX, None)
        } else {
            let remaining = self.n_batches.saturating_sub(self.batch_index);
            (remaining, Some(remaining))
        }
    }
}

impl<S: Sequences> FusedIterator for BatchArrayIterator<S> {}
