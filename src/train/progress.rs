//! Progress reporting and cooperative cancellation.

/// A progress report emitted at yield boundaries.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Progress {
    /// Iterations completed so far.
    pub iteration: u64,
    /// Completion percentage of the iteration budget, in [0, 100].
    pub percent: f64,
}

/// Flow-control decision returned by a progress sink.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Control {
    /// Keep training.
    Continue,
    /// Cancel at this yield boundary. The current sample's updates have
    /// already committed; nothing is rolled back.
    Stop,
}

/// Receives progress reports from the training loop.
///
/// Reports arrive only at yield boundaries, so a sink observing engine
/// state sees fully committed samples. Any `FnMut(Progress) -> Control`
/// closure is a sink.
pub trait ProgressSink {
    /// Called with the latest progress; the returned [`Control`] decides
    /// whether training resumes.
    fn on_progress(&mut self, progress: Progress) -> Control;
}

impl<F> ProgressSink for F
where
    F: FnMut(Progress) -> Control,
{
    fn on_progress(&mut self, progress: Progress) -> Control {
        self(progress)
    }
}

/// Sink that ignores reports and never cancels.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullSink;

impl ProgressSink for NullSink {
    fn on_progress(&mut self, _progress: Progress) -> Control {
        Control::Continue
    }
}
