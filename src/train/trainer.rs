//! The stochastic competitive training loop.

use crate::config::EngineConfig;
use crate::map::Layer;
use crate::sample::TrainingSample;
use crate::train::progress::Progress;
use crate::train::refine::refine_hierarchy;
use log::debug;
use rand::Rng;
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};

/// Per-level attenuation base: updates at level `l` are scaled by `0.8^l`,
/// so coarser layers move more slowly than the layer that drives them.
const LEVEL_ATTENUATION: f64 = 0.8;

/// Iteration period of hierarchical refinement passes.
pub const REFINE_INTERVAL: u64 = 50;

/// Iteration period of progress reports; this is the yield boundary at
/// which cancellation takes effect and snapshots are consistent.
pub const PROGRESS_INTERVAL: u64 = 20;

/// Mutable training-schedule state.
///
/// Everything here serializes, including the RNG stream, so a saved session
/// resumes mid-schedule with the same learning rate, radius, accumulated
/// error sums, and draw sequence.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Trainer {
    iteration: u64,
    learning_rate: f64,
    radius: f64,
    /// Per-layer accumulated BMU distances.
    error_sums: Vec<f64>,
    /// Per-layer counts of gated sample contributions.
    gated_counts: Vec<u64>,
    rng: ChaCha8Rng,
}

impl Trainer {
    /// Creates a fresh trainer at iteration 0 with the configured schedule.
    pub fn new(config: &EngineConfig, rng: ChaCha8Rng) -> Self {
        Self {
            iteration: 0,
            learning_rate: config.learning_rate,
            radius: config.neighborhood_radius,
            error_sums: vec![0.0; config.layers],
            gated_counts: vec![0; config.layers],
            rng,
        }
    }

    /// Iterations completed.
    #[inline]
    pub fn iteration(&self) -> u64 {
        self.iteration
    }

    /// Current (decayed) learning rate.
    #[inline]
    pub fn learning_rate(&self) -> f64 {
        self.learning_rate
    }

    /// Current (decayed) neighborhood radius.
    #[inline]
    pub fn radius(&self) -> f64 {
        self.radius
    }

    /// Whether the configured iteration budget is exhausted.
    #[inline]
    pub fn is_complete(&self, config: &EngineConfig) -> bool {
        self.iteration >= config.max_iterations
    }

    /// Progress snapshot for the current iteration count.
    pub fn progress(&self, config: &EngineConfig) -> Progress {
        Progress {
            iteration: self.iteration,
            percent: 100.0 * self.iteration as f64 / config.max_iterations as f64,
        }
    }

    /// Mean accumulated BMU distance for a level.
    ///
    /// Only samples gated to the level contribute; a level that never saw a
    /// gated sample reports 0.0 rather than dividing by zero.
    pub fn mean_quantization_error(&self, level: usize) -> f64 {
        let sum = self.error_sums.get(level).copied().unwrap_or(0.0);
        match self.gated_counts.get(level) {
            Some(&count) if count > 0 => sum / count as f64,
            _ => 0.0,
        }
    }

    /// Gated contribution count for a level.
    pub fn gated_count(&self, level: usize) -> u64 {
        self.gated_counts.get(level).copied().unwrap_or(0)
    }

    /// Runs up to `count` iterations, stopping early at the configured
    /// budget, and returns the resulting progress snapshot.
    ///
    /// Returning is the yield boundary: every sample processed inside the
    /// batch has fully committed by the time the caller sees the snapshot.
    pub fn step_batch(
        &mut self,
        config: &EngineConfig,
        layers: &mut [Layer],
        samples: &[TrainingSample],
        count: u64,
    ) -> Progress {
        debug_assert!(!samples.is_empty(), "caller must reject empty sample sets");

        let end = (self.iteration + count).min(config.max_iterations);
        while self.iteration < end {
            self.step(config, layers, samples);
        }
        self.progress(config)
    }

    /// One full iteration: draw a sample, update every gated layer, run the
    /// periodic refinement pass, decay the schedule.
    fn step(
        &mut self,
        config: &EngineConfig,
        layers: &mut [Layer],
        samples: &[TrainingSample],
    ) {
        let sample = &samples[self.rng.gen_range(0..samples.len())];
        self.iteration += 1;
        let tick = self.iteration;

        for layer in layers.iter_mut() {
            if !sample.gates(layer.level) {
                continue;
            }

            let dims = layer.feature_dims();
            let input = match sample.project(dims) {
                Some(input) => input,
                None => {
                    debug!(
                        "Sample {} too short for layer {} ({dims} dims), skipped",
                        sample.id, layer.level
                    );
                    continue;
                }
            };

            let Some(bmu_idx) = layer.find_bmu(input) else {
                continue;
            };

            self.error_sums[layer.level] += layer.nodes[bmu_idx].distance(input);
            self.gated_counts[layer.level] += 1;

            let (bx, by) = (layer.nodes[bmu_idx].x, layer.nodes[bmu_idx].y);
            layer.nodes[bmu_idx].record_activation(tick);

            let effective_radius = self.radius * layer.resolution;
            let rate = self.learning_rate * LEVEL_ATTENUATION.powi(layer.level as i32);
            let sigma_sq = 2.0 * effective_radius * effective_radius;

            for node in &mut layer.nodes {
                let dist = node.grid_distance(bx, by);
                if dist > effective_radius {
                    continue;
                }
                let influence = if dist == 0.0 {
                    1.0
                } else {
                    (-(dist * dist) / sigma_sq).exp()
                };
                node.update_weights(input, rate, influence);
            }
        }

        if self.iteration % REFINE_INTERVAL == 0 {
            refine_hierarchy(layers, config.refinement_threshold);
        }

        self.learning_rate *= config.decay_rate;
        self.radius *= config.decay_rate;
    }
}
