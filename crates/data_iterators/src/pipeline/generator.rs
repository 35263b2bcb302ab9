use super::stage::{Stage, Step};
use crate::error::BatchError;
use anyhow::Result;
use std::iter::Fuse;
use tracing::{debug, trace, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum StageState {
    AwaitingInput,
    HoldingOutput,
}

struct StageSlot<T> {
    stage: Box<dyn Stage<T>>,
    state: StageState,
}

/// Chains a source of items through an ordered list of [`Stage`]s.
///
/// Each pull takes the next source item and pushes it through the stages in order.
/// If a stage answers [`Step::Skip`], the later stages are bypassed, the item is
/// dropped and the next source item is pulled. The value emitted by the last stage is
/// the pipeline's output.
///
/// # Reset discipline
/// Every stage that emitted a value for the current item gets one `reset()` before the
/// next item is pulled (latest stage first), so it is awaiting input again. Stages that
/// skipped are already awaiting and are left alone.
///
/// # Item type
/// Every stage takes and returns the same item type `T`. Conversions that change the
/// type (paths to pixel arrays, raw bytes to floats) belong in the source, e.g.
/// `batches.map(load_batch)`, so the stages all see the converted items:
/// ```ignore
/// let pixels = BatchArrayIterator::new(raw_images, config)?.map(normalize);
/// let pipeline = GeneratorPipeline::new(pixels, vec![Box::new(filter(not_blank))], None)?;
/// ```
///
/// # Termination
/// The pipeline stops when the source is exhausted or when `max_iters` items have been
/// pulled since the last (re)configuration. The cap limits source pulls, not outputs.
///
/// # Failures
/// A stage error is returned to the caller as is. The pipeline is then poisoned: every
/// further pull fails with [`BatchError::PipelinePoisoned`] until [`configure`] is called.
///
/// [`configure`]: GeneratorPipeline::configure
///
/// # Example
/// ```ignore
/// let mut pipeline = GeneratorPipeline::new(
///     1u64..,
///     vec![
///         Box::new(filter(|n: &u64| n % 2 == 1)),
///         Box::new(filter(|n: &u64| is_prime(*n))),
///     ],
///     None,
/// )?;
/// let first: Vec<u64> = pipeline.by_ref().take(5).collect::<Result<_>>()?;
/// assert_eq!(first, vec![1, 3, 5, 7, 11]);
/// ```
pub struct GeneratorPipeline<T, I> {
    source: Fuse<I>,
    stages: Vec<StageSlot<T>>,
    max_iters: Option<usize>,
    pulled: usize,
    need_reset: Vec<usize>,
    poisoned: bool,
}

impl<T, I> GeneratorPipeline<T, I>
where
    I: Iterator<Item = T>,
{
    /// Builds the pipeline and resets every stage so it starts awaiting input.
    ///
    /// # Arguments
    /// - `source`: Items to transform. It is only ever read, never fed.
    /// - `stages`: Transformers applied in order.
    /// - `max_iters`: Maximum number of items pulled from `source`, `None` for no limit.
    pub fn new<S>(source: S, stages: Vec<Box<dyn Stage<T>>>, max_iters: Option<usize>) -> Result<Self>
    where
        S: IntoIterator<Item = T, IntoIter = I>,
    {
        let mut pipeline = Self {
            source: source.into_iter().fuse(),
            stages: stages
                .into_iter()
                .map(|stage| StageSlot {
                    stage,
                    state: StageState::AwaitingInput,
                })
                .collect(),
            max_iters,
            pulled: 0,
            need_reset: Vec::new(),
            poisoned: false,
        };
        pipeline.init()?;
        Ok(pipeline)
    }

    /// Appends a stage to the end of the chain.
    ///
    /// The stage is not reset; it is expected to be awaiting input already.
    pub fn add(&mut self, stage: impl Stage<T> + 'static) -> &mut Self {
        self.stages.push(StageSlot {
            stage: Box::new(stage),
            state: StageState::AwaitingInput,
        });
        self
    }

    /// Sets a new source pull cap and brings every stage back to awaiting input.
    ///
    /// The pull count restarts from zero, so a pipeline stopped by its cap can be resumed.
    /// This is also the only way to reuse a pipeline after a stage failure.
    pub fn configure(&mut self, max_iters: Option<usize>) -> Result<()> {
        self.max_iters = max_iters;
        self.init()
    }

    pub fn max_iters(&self) -> Option<usize> {
        self.max_iters
    }

    /// Number of items pulled from the source since the last (re)configuration.
    pub fn pulled(&self) -> usize {
        self.pulled
    }

    pub fn num_stages(&self) -> usize {
        self.stages.len()
    }

    pub fn is_poisoned(&self) -> bool {
        self.poisoned
    }

    /// Pulls source items until one makes it through every stage.
    ///
    /// Returns `Ok(None)` once the source is exhausted or the cap is reached.
    pub fn next_item(&mut self) -> Result<Option<T>> {
        if self.poisoned {
            return Err(BatchError::PipelinePoisoned.into());
        }

        while let Some(item) = self.pull_source() {
            let step = self.send(item).and_then(|step| {
                self.reset_if_needed()?;
                Ok(step)
            });

            match step {
                Ok(Step::Emit(value)) => return Ok(Some(value)),
                Ok(Step::Skip) => continue,
                Err(e) => {
                    self.poisoned = true;
                    warn!(error = %e, "Pipeline stage failed, pipeline needs to be reconfigured");
                    return Err(e);
                }
            }
        }
        Ok(None)
    }

    fn pull_source(&mut self) -> Option<T> {
        if self.max_iters.is_some_and(|max_iters| self.pulled >= max_iters) {
            return None;
        }
        let item = self.source.next()?;
        self.pulled += 1;
        Some(item)
    }

    /// Sends one item through the stages, stopping at the first `Skip`.
    fn send(&mut self, item: T) -> Result<Step<T>> {
        let mut processed = item;
        for (index, slot) in self.stages.iter_mut().enumerate() {
            debug_assert_eq!(slot.state, StageState::AwaitingInput);
            match slot.stage.receive(processed)? {
                Step::Emit(value) => {
                    slot.state = StageState::HoldingOutput;
                    self.need_reset.push(index);
                    processed = value;
                }
                Step::Skip => {
                    trace!(stage = index, "Stage skipped item");
                    return Ok(Step::Skip);
                }
            }
        }
        Ok(Step::Emit(processed))
    }

    /// Advances the stages that emitted on the last item, latest first.
    fn reset_if_needed(&mut self) -> Result<()> {
        while let Some(index) = self.need_reset.pop() {
            let slot = &mut self.stages[index];
            slot.stage.reset()?;
            slot.state = StageState::AwaitingInput;
        }
        Ok(())
    }

    fn init(&mut self) -> Result<()> {
        self.pulled = 0;
        self.need_reset.clear();
        self.poisoned = false;
        for slot in &mut self.stages {
            if let Err(e) = slot.stage.reset() {
                self.poisoned = true;
                return Err(e);
            }
            slot.state = StageState::AwaitingInput;
        }
        debug!(
            stages = self.stages.len(),
            max_iters = ?self.max_iters,
            "Pipeline configured"
        );
        Ok(())
    }
}

impl<T, I> Iterator for GeneratorPipeline<T, I>
where
    I: Iterator<Item = T>,
{
    type Item = Result<T>;

    fn next(&mut self) -> Option<Result<T>> {
        self.next_item().transpose()
    }
}
