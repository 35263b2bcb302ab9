use anyhow::Result;

/// Outcome of pushing one item through a [`Stage`].
///
/// `Skip` means "no result for this item": the remaining stages are bypassed and
/// the pipeline moves on to the next source item. Keeping it a separate variant
/// means an empty batch or a zero is still a real, emitted value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Step<T> {
    Emit(T),
    Skip,
}

impl<T> Step<T> {
    pub fn is_emit(&self) -> bool {
        matches!(self, Step::Emit(_))
    }

    pub fn is_skip(&self) -> bool {
        matches!(self, Step::Skip)
    }

    pub fn into_option(self) -> Option<T> {
        match self {
            Step::Emit(value) => Some(value),
            Step::Skip => None,
        }
    }

    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> Step<U> {
        match self {
            Step::Emit(value) => Step::Emit(f(value)),
            Step::Skip => Step::Skip,
        }
    }
}

impl<T> From<Option<T>> for Step<T> {
    fn from(value: Option<T>) -> Self {
        value.map_or(Step::Skip, Step::Emit)
    }
}

/// A stateful per-item transformer driven by [`GeneratorPipeline`](super::GeneratorPipeline).
///
/// A stage is either *awaiting input* or *holding output*:
/// - `receive(item)` is only called while awaiting. Returning `Emit` moves the stage to
///   holding output; returning `Skip` leaves it awaiting.
/// - `reset()` is the neutral signal that moves a holding stage back to awaiting. The
///   pipeline sends it once after every item the stage emitted for, and to every stage
///   when the pipeline is (re)configured.
///
/// Any private state (counters, running statistics, lookup tables) is untouched by the
/// pipeline apart from these two calls.
///
/// Closures `FnMut(T) -> Result<Step<T>>` are stages with a no-op `reset`.
pub trait Stage<T>: Send {
    /// Processes one item.
    fn receive(&mut self, item: T) -> Result<Step<T>>;

    /// Returns to the awaiting-input state.
    fn reset(&mut self) -> Result<()> {
        Ok(())
    }
}

impl<T, F> Stage<T> for F
where
    F: FnMut(T) -> Result<Step<T>> + Send,
{
    fn receive(&mut self, item: T) -> Result<Step<T>> {
        self(item)
    }
}

/// Keeps the items for which `predicate` returns `true`, skips the rest.
#[derive(Debug, Clone)]
pub struct Filter<F> {
    predicate: F,
}

impl<F> Filter<F> {
    pub fn new(predicate: F) -> Self {
        Self { predicate }
    }
}

impl<T, F> Stage<T> for Filter<F>
where
    F: FnMut(&T) -> bool + Send,
{
    fn receive(&mut self, item: T) -> Result<Step<T>> {
        if (self.predicate)(&item) {
            Ok(Step::Emit(item))
        } else {
            Ok(Step::Skip)
        }
    }
}

/// Applies a fallible function to every item. Never skips.
#[derive(Debug, Clone)]
pub struct Map<F> {
    f: F,
}

impl<F> Map<F> {
    pub fn new(f: F) -> Self {
        Self { f }
    }
}

impl<T, F> Stage<T> for Map<F>
where
    F: FnMut(T) -> Result<T> + Send,
{
    fn receive(&mut self, item: T) -> Result<Step<T>> {
        (self.f)(item).map(Step::Emit)
    }
}

/// Shorthand for [`Filter::new`].
pub fn filter<T, F>(predicate: F) -> Filter<F>
where
    F: FnMut(&T) -> bool + Send,
{
    Filter::new(predicate)
}

/// Shorthand for [`Map::new`].
pub fn map<T, F>(f: F) -> Map<F>
where
    F: FnMut(T) -> Result<T> + Send,
{
    Map::new(f)
}
