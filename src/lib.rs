//! # Strata - Hierarchical Self-Organizing Map Engine
//!
//! Strata organizes multi-dimensional operational feature vectors into
//! several layers of increasingly abstract, spatially-ordered clusters,
//! with explicit parent/child linkage and bottom-up refinement between
//! layers.
//!
//! ## Overview
//!
//! The engine builds a pyramid of self-organizing map layers with shrinking
//! grid resolution, links nodes of adjacent layers proportionally, and
//! trains the whole hierarchy with stochastic competitive learning. Samples
//! carry a complexity tier that gates which layers they may update, so
//! coarse layers only learn from rich samples. Accumulated activation
//! evidence periodically refines coarser layers bottom-up.
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use strata::{Engine, EngineConfig, NullSink, TrainingSample};
//!
//! let config = EngineConfig {
//!     layers: 3,
//!     feature_count: 8,
//!     seed: Some(42),
//!     ..Default::default()
//! };
//!
//! let mut engine = Engine::new(config)?;
//! engine.load_samples(samples);
//! engine.train(&mut NullSink)?;
//!
//! // Inspect results
//! let stats = engine.stats().unwrap();
//! let snapshot = engine.snapshot();
//!
//! // Persist for a later session
//! engine.save("session.strata")?;
//! let resumed = Engine::load("session.strata")?;
//! ```
//!
//! ## Architecture
//!
//! - [`config`] - Configuration and per-level feature projection
//! - [`map`] - Nodes, layers, the layer builder, and the hierarchical linker
//! - [`train`] - The training loop, refinement, and progress reporting
//! - [`cluster`] - Post-training cluster labeling
//! - [`metrics`] - Per-layer diagnostic metrics
//! - [`engine`] - The engine lifecycle object
//! - [`snapshot`] - Read-only views for visualization consumers
//! - [`storage`] - Engine-state persistence
//!
//! ## Concurrency Model
//!
//! Training is single-threaded and cooperative: the engine is the only
//! writer, and it yields at fixed iteration boundaries where progress is
//! reported, cancellation takes effect, and snapshots are consistent.
//! Read-only metric computation may fan out internally.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod cluster;
pub mod config;
pub mod engine;
pub mod error;
pub mod map;
pub mod metrics;
pub mod sample;
pub mod snapshot;
pub mod storage;
pub mod train;

// Re-export commonly used types
pub use cluster::BASE_CLUSTERS;
pub use config::{EngineConfig, FeatureProjection};
pub use engine::{Engine, RunStatus};
pub use error::{Result, StrataError};
pub use map::{Layer, Node};
pub use metrics::LayerStats;
pub use sample::TrainingSample;
pub use snapshot::{EngineSnapshot, LayerView, NodeView};
pub use train::{Control, NullSink, Progress, ProgressSink, Trainer};

/// Library version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
