//! The engine object: explicit construct → train → snapshot lifecycle.

use crate::cluster::assign_clusters;
use crate::config::EngineConfig;
use crate::error::{Result, StrataError};
use crate::map::{build_layers, link_layers, Layer};
use crate::metrics::{compute_stats, LayerStats};
use crate::sample::TrainingSample;
use crate::snapshot::EngineSnapshot;
use crate::storage::{self, EngineState};
use crate::train::{Control, Progress, ProgressSink, Trainer, PROGRESS_INTERVAL};
use log::info;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Overall run status exposed to callers.
///
/// This is the only error surface end users see; detailed causes stay in
/// the logs and the [`crate::error::StrataError`] values returned to hosts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RunStatus {
    /// Constructed or cancelled; ready to (resume) training.
    Idle,
    /// A training batch is in flight.
    Training,
    /// The iteration budget is exhausted; clusters and stats are final.
    Completed,
    /// Training aborted on a fatal error.
    Failed,
}

/// The hierarchical map engine.
///
/// Owns the configuration, the layer pyramid, the training set, and all
/// training state. There is exactly one writer — the engine itself — so
/// readers take snapshots at yield boundaries and need no locking.
pub struct Engine {
    config: EngineConfig,
    layers: Vec<Layer>,
    samples: Vec<TrainingSample>,
    trainer: Trainer,
    stats: Option<Vec<LayerStats>>,
    status: RunStatus,
}

impl Engine {
    /// Validates the configuration, builds the layer pyramid, and links
    /// adjacent layers. No training state exists yet.
    pub fn new(config: EngineConfig) -> Result<Self> {
        config.validate()?;

        let mut rng = match config.seed {
            Some(seed) => ChaCha8Rng::seed_from_u64(seed),
            None => ChaCha8Rng::from_entropy(),
        };

        let mut layers = build_layers(&config, &mut rng)?;
        link_layers(&mut layers);
        let trainer = Trainer::new(&config, rng);

        info!(
            "Engine initialized: {} layers, {} iteration budget",
            config.layers, config.max_iterations
        );

        Ok(Self {
            config,
            layers,
            samples: Vec::new(),
            trainer,
            stats: None,
            status: RunStatus::Idle,
        })
    }

    /// Supplies the finite, pre-loaded training set. Replaces any previous
    /// set; call before training.
    pub fn load_samples(&mut self, samples: Vec<TrainingSample>) {
        info!("Loaded {} training samples", samples.len());
        self.samples = samples;
    }

    /// Runs training to the configured iteration budget, reporting to the
    /// sink at every yield boundary.
    ///
    /// The sink's [`Control`] return cancels cooperatively: a `Stop` takes
    /// effect after the current batch has fully committed, leaving the
    /// engine `Idle` and resumable. On completion the engine assigns
    /// cluster labels, computes stats, and becomes `Completed`.
    pub fn train<S: ProgressSink>(&mut self, sink: &mut S) -> Result<Progress> {
        self.ensure_samples()?;
        self.status = RunStatus::Training;

        loop {
            let progress = self.trainer.step_batch(
                &self.config,
                &mut self.layers,
                &self.samples,
                PROGRESS_INTERVAL,
            );

            if self.trainer.is_complete(&self.config) {
                sink.on_progress(progress);
                self.finish();
                return Ok(progress);
            }
            if sink.on_progress(progress) == Control::Stop {
                info!("Training cancelled at iteration {}", progress.iteration);
                self.status = RunStatus::Idle;
                return Ok(progress);
            }
        }
    }

    /// Runs one bounded batch of iterations and returns the committed
    /// progress snapshot; call again to resume. Clusters and stats are
    /// finalized when the batch reaches the budget.
    pub fn train_batch(&mut self, iterations: u64) -> Result<Progress> {
        self.ensure_samples()?;
        self.status = RunStatus::Training;

        let progress =
            self.trainer
                .step_batch(&self.config, &mut self.layers, &self.samples, iterations);

        if self.trainer.is_complete(&self.config) {
            self.finish();
        }
        Ok(progress)
    }

    fn ensure_samples(&mut self) -> Result<()> {
        if self.samples.is_empty() {
            self.status = RunStatus::Failed;
            return Err(StrataError::EmptyTrainingSet(
                "training invoked with zero samples".to_string(),
            ));
        }
        Ok(())
    }

    fn finish(&mut self) {
        assign_clusters(&mut self.layers, &self.config);
        self.stats = Some(compute_stats(&self.layers, &self.samples, &self.trainer));
        self.status = RunStatus::Completed;
        info!(
            "Training completed after {} iterations",
            self.trainer.iteration()
        );
    }

    /// The active configuration.
    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// The layer pyramid.
    pub fn layers(&self) -> &[Layer] {
        &self.layers
    }

    /// The loaded training set.
    pub fn samples(&self) -> &[TrainingSample] {
        &self.samples
    }

    /// The overall run-status flag.
    pub fn status(&self) -> RunStatus {
        self.status
    }

    /// Per-layer stats, present once training has completed.
    pub fn stats(&self) -> Option<&[LayerStats]> {
        self.stats.as_deref()
    }

    /// Iterations completed so far.
    pub fn iteration(&self) -> u64 {
        self.trainer.iteration()
    }

    /// Whether the iteration budget is exhausted.
    pub fn is_complete(&self) -> bool {
        self.trainer.is_complete(&self.config)
    }

    /// Current progress snapshot.
    pub fn progress(&self) -> Progress {
        self.trainer.progress(&self.config)
    }

    /// Captures a read-only snapshot of the whole hierarchy for
    /// visualization consumers.
    pub fn snapshot(&self) -> EngineSnapshot {
        EngineSnapshot::capture(&self.layers)
    }

    /// Saves the complete engine state so a later session resumes from it.
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        storage::save_state(path, &self.to_state())
    }

    /// Restores a saved session. Training continues from the saved schedule
    /// rather than restarting.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        Ok(Self::from_state(storage::load_state(path)?))
    }

    pub(crate) fn to_state(&self) -> EngineState {
        EngineState {
            config: self.config.clone(),
            layers: self.layers.clone(),
            samples: self.samples.clone(),
            trainer: self.trainer.clone(),
            stats: self.stats.clone(),
            status: self.status,
        }
    }

    pub(crate) fn from_state(state: EngineState) -> Self {
        Self {
            config: state.config,
            layers: state.layers,
            samples: state.samples,
            trainer: state.trainer,
            stats: state.stats,
            status: state.status,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::train::NullSink;

    fn test_config() -> EngineConfig {
        EngineConfig {
            layers: 2,
            base_width: 6,
            base_height: 6,
            feature_count: 3,
            max_iterations: 100,
            seed: Some(11),
            ..Default::default()
        }
    }

    fn test_samples() -> Vec<TrainingSample> {
        vec![
            TrainingSample::new(0, vec![0.1, 0.2, 0.1], "a", 1),
            TrainingSample::new(1, vec![0.9, 0.8, 0.9], "b", 2),
        ]
    }

    #[test]
    fn test_lifecycle() {
        let mut engine = Engine::new(test_config()).unwrap();
        assert_eq!(engine.status(), RunStatus::Idle);
        assert!(engine.stats().is_none());

        engine.load_samples(test_samples());
        let progress = engine.train(&mut NullSink).unwrap();

        assert_eq!(progress.iteration, 100);
        assert_eq!(engine.status(), RunStatus::Completed);
        assert!(engine.stats().is_some());
        assert!(engine
            .layers()
            .iter()
            .all(|l| l.nodes.iter().all(|n| n.cluster.is_some())));
    }

    #[test]
    fn test_empty_training_set_is_fatal() {
        let mut engine = Engine::new(test_config()).unwrap();
        let err = engine.train(&mut NullSink).unwrap_err();
        assert!(matches!(err, StrataError::EmptyTrainingSet(_)));
        assert_eq!(engine.status(), RunStatus::Failed);
        assert_eq!(engine.iteration(), 0);
    }

    #[test]
    fn test_invalid_config_rejected_before_building() {
        let config = EngineConfig {
            layers: 0,
            ..test_config()
        };
        assert!(matches!(
            Engine::new(config),
            Err(StrataError::Config(_))
        ));
    }

    #[test]
    fn test_cancellation_at_yield_boundary() {
        let mut engine = Engine::new(test_config()).unwrap();
        engine.load_samples(test_samples());

        let mut sink = |p: Progress| {
            if p.iteration >= 40 {
                Control::Stop
            } else {
                Control::Continue
            }
        };
        let progress = engine.train(&mut sink).unwrap();

        assert_eq!(progress.iteration, 40);
        assert_eq!(engine.status(), RunStatus::Idle);

        // Resumable: a second call continues to the budget.
        let progress = engine.train(&mut NullSink).unwrap();
        assert_eq!(progress.iteration, 100);
        assert_eq!(engine.status(), RunStatus::Completed);
    }

    #[test]
    fn test_batch_stepper_reports_committed_progress() {
        let mut engine = Engine::new(test_config()).unwrap();
        engine.load_samples(test_samples());

        let progress = engine.train_batch(30).unwrap();
        assert_eq!(progress.iteration, 30);
        assert_eq!(engine.status(), RunStatus::Training);

        let progress = engine.train_batch(1000).unwrap();
        assert_eq!(progress.iteration, 100);
        assert_eq!(engine.status(), RunStatus::Completed);
    }

    #[test]
    fn test_seeded_engines_are_identical() {
        let a = Engine::new(test_config()).unwrap();
        let b = Engine::new(test_config()).unwrap();

        for (la, lb) in a.layers().iter().zip(b.layers().iter()) {
            assert_eq!((la.width, la.height), (lb.width, lb.height));
            for (na, nb) in la.nodes.iter().zip(lb.nodes.iter()) {
                assert_eq!(na.weights, nb.weights);
                assert_eq!(na.parent, nb.parent);
            }
        }
    }
}
