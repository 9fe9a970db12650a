//! Per-layer diagnostic metrics.
//!
//! All metrics are computed post-training from committed state. Every
//! division site is guarded: degenerate input (no gated samples, zero
//! activations, single-node layers) yields 0.0, never NaN.

use crate::map::Layer;
use crate::sample::TrainingSample;
use crate::train::Trainer;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Post-training diagnostics for a single layer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LayerStats {
    /// Hierarchy level these stats describe.
    pub level: usize,
    /// Mean distance between gated samples and their BMU weights.
    pub quantization_error: f64,
    /// Fraction of gated samples whose two nearest nodes by weight distance
    /// are not grid-adjacent (Chebyshev distance > 1).
    pub topographic_error: f64,
    /// Mean activation count over the layer, normalized by the maximum.
    pub convergence_rate: f64,
    /// Abstraction fidelity score in [0, 1]; 1.0 at level 0 by definition.
    pub abstraction_quality: f64,
}

/// Computes statistics for every layer from trained state and the sample set.
pub fn compute_stats(
    layers: &[Layer],
    samples: &[TrainingSample],
    trainer: &Trainer,
) -> Vec<LayerStats> {
    layers
        .iter()
        .map(|layer| LayerStats {
            level: layer.level,
            quantization_error: trainer.mean_quantization_error(layer.level),
            topographic_error: topographic_error(layer, samples),
            convergence_rate: convergence_rate(layer),
            abstraction_quality: abstraction_quality(layer),
        })
        .collect()
}

/// Fraction of gated samples whose first and second BMUs are not
/// grid-adjacent. Layers with fewer than two nodes cannot break adjacency
/// and score 0.0.
fn topographic_error(layer: &Layer, samples: &[TrainingSample]) -> f64 {
    if layer.nodes.len() < 2 {
        return 0.0;
    }

    let dims = layer.feature_dims();
    let gated: Vec<&TrainingSample> = samples
        .iter()
        .filter(|s| s.gates(layer.level) && s.features.len() >= dims)
        .collect();
    if gated.is_empty() {
        return 0.0;
    }

    let errors: u64 = gated
        .par_iter()
        .map(|sample| {
            let input = &sample.features[..dims];
            match layer.find_two_nearest(input) {
                Some((first, second)) => {
                    let a = &layer.nodes[first];
                    let b = &layer.nodes[second];
                    let chebyshev = a.x.abs_diff(b.x).max(a.y.abs_diff(b.y));
                    u64::from(chebyshev > 1)
                }
                None => 0,
            }
        })
        .sum();

    errors as f64 / gated.len() as f64
}

/// Mean activation normalized by the layer maximum; 0.0 for an untouched
/// layer.
fn convergence_rate(layer: &Layer) -> f64 {
    let max = layer.max_activation();
    if max == 0 || layer.nodes.is_empty() {
        return 0.0;
    }
    let mean = layer
        .nodes
        .iter()
        .map(|n| n.activation_count as f64)
        .sum::<f64>()
        / layer.nodes.len() as f64;
    mean / max as f64
}

/// Abstraction quality: 1.0 at level 0 (baseline fidelity by definition);
/// above, the mean of the activation-variance score and the inter-cluster
/// separation, each capped at 1.
fn abstraction_quality(layer: &Layer) -> f64 {
    if layer.level == 0 {
        return 1.0;
    }
    if layer.nodes.is_empty() {
        return 0.0;
    }

    let counts: Vec<f64> = layer
        .nodes
        .iter()
        .map(|n| n.activation_count as f64)
        .collect();
    let mean = counts.iter().sum::<f64>() / counts.len() as f64;
    let variance = counts.iter().map(|c| (c - mean).powi(2)).sum::<f64>() / counts.len() as f64;
    let variance_score = (variance / (mean + 1.0)).min(1.0);

    let separation = intercluster_separation(layer).min(1.0);

    (variance_score + separation) / 2.0
}

/// Average pairwise mean weight-distance between distinct-label node groups.
/// Layers with fewer than two labeled groups score 0.0.
fn intercluster_separation(layer: &Layer) -> f64 {
    let mut groups: BTreeMap<&str, Vec<usize>> = BTreeMap::new();
    for (i, node) in layer.nodes.iter().enumerate() {
        if let Some(label) = &node.cluster {
            groups.entry(label.as_str()).or_default().push(i);
        }
    }
    if groups.len() < 2 {
        return 0.0;
    }

    let groups: Vec<&Vec<usize>> = groups.values().collect();
    let mut total = 0.0;
    let mut pairs = 0u32;

    for i in 0..groups.len() {
        for j in i + 1..groups.len() {
            let mut sum = 0.0;
            let mut count = 0u32;
            for &a in groups[i] {
                for &b in groups[j] {
                    sum += layer.nodes[a].distance(&layer.nodes[b].weights);
                    count += 1;
                }
            }
            if count > 0 {
                total += sum / count as f64;
                pairs += 1;
            }
        }
    }

    if pairs == 0 {
        0.0
    } else {
        total / pairs as f64
    }
}
