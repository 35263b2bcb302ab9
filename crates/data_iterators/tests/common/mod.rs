#![allow(dead_code)]

use data_iterators::pipeline::{Stage, Step};

use anyhow::Result;
use rand::{distr::Alphanumeric, Rng};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

/// Random alphanumeric string, used for file names.
pub fn random_string(size: usize) -> String {
    rand::rng()
        .sample_iter(&Alphanumeric)
        .take(size)
        .map(char::from)
        .collect()
}

/// Creates `n` files named `<random>.<ext>` inside `root` and returns their paths.
pub fn make_files(root: &Path, n: usize, ext: &str) -> Result<Vec<PathBuf>> {
    (0..n)
        .map(|_| {
            let path = root.join(format!("{}.{}", random_string(20), ext));
            fs::write(&path, "content")?;
            Ok(path)
        })
        .collect()
}

pub fn is_odd(number: &u64) -> bool {
    number % 2 != 0
}

/// Treats 1 as prime, like a plain trial-division check over `2..=sqrt(n)`.
pub fn is_prime(number: &u64) -> bool {
    let threshold = (*number as f64).sqrt().floor() as u64 + 1;
    (2..threshold).all(|x| number % x != 0)
}

/// Counters shared between a test and a [`CountingStage`] moved into a pipeline.
#[derive(Debug, Clone, Default)]
pub struct StageCounters {
    pub received: Arc<AtomicUsize>,
    pub emitted: Arc<AtomicUsize>,
    pub resets: Arc<AtomicUsize>,
}

impl StageCounters {
    pub fn received(&self) -> usize {
        self.received.load(Ordering::SeqCst)
    }

    pub fn emitted(&self) -> usize {
        self.emitted.load(Ordering::SeqCst)
    }

    pub fn resets(&self) -> usize {
        self.resets.load(Ordering::SeqCst)
    }
}

/// A filtering stage that checks the receive/reset protocol it is driven with.
///
/// It fails when an item arrives while it still holds the previous output, and
/// records how often each call was made.
pub struct CountingStage<F> {
    keep: F,
    holding: bool,
    counters: StageCounters,
}

impl<F> CountingStage<F> {
    pub fn new(keep: F, counters: StageCounters) -> Self {
        Self {
            keep,
            holding: false,
            counters,
        }
    }
}

impl<F> Stage<u64> for CountingStage<F>
where
    F: Fn(&u64) -> bool + Send,
{
    fn receive(&mut self, item: u64) -> Result<Step<u64>> {
        anyhow::ensure!(!self.holding, "item {} received while holding output", item);
        self.counters.received.fetch_add(1, Ordering::SeqCst);
        if (self.keep)(&item) {
            self.holding = true;
            self.counters.emitted.fetch_add(1, Ordering::SeqCst);
            Ok(Step::Emit(item))
        } else {
            Ok(Step::Skip)
        }
    }

    fn reset(&mut self) -> Result<()> {
        self.holding = false;
        self.counters.resets.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}
