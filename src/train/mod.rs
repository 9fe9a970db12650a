//! Training: the stochastic competitive loop, hierarchical refinement,
//! and cooperative progress reporting.

mod progress;
mod refine;
mod trainer;

pub use progress::{Control, NullSink, Progress, ProgressSink};
pub use refine::refine_hierarchy;
pub use trainer::{Trainer, PROGRESS_INTERVAL, REFINE_INTERVAL};
