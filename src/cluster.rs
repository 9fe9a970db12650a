//! Post-training clustering and labeling.

use crate::config::EngineConfig;
use crate::map::Layer;
use log::info;

/// Fixed base cluster names for operational feature maps.
pub const BASE_CLUSTERS: [&str; 6] = [
    "Throughput",
    "Latency",
    "ErrorRate",
    "Saturation",
    "Capacity",
    "Stability",
];

/// Weight above which a feature earns a `High:` tag.
const HIGH_TAG_THRESHOLD: f64 = 0.7;

/// Weight below which a feature earns a `Low:` tag.
const LOW_TAG_THRESHOLD: f64 = 0.3;

/// Assigns cluster labels and descriptive tags to every node of every layer.
pub fn assign_clusters(layers: &mut [Layer], config: &EngineConfig) {
    for layer in layers.iter_mut() {
        let level = layer.level;
        for node in &mut layer.nodes {
            node.cluster = Some(label_for(&node.weights, level));
            node.tags = tags_for(&node.weights, level, config);
        }
    }
    info!("Assigned cluster labels across {} layers", layers.len());
}

/// Maps a weight vector onto the base cluster list.
///
/// The dominant (argmax) component indexes proportionally into the list.
/// Levels above 0 compress the usable range to `K - level - 1` (floored at
/// one) to model coarser distinctions, and carry a `-Meta<level>` suffix.
fn label_for(weights: &[f64], level: usize) -> String {
    let k = BASE_CLUSTERS.len();
    let usable = if level == 0 {
        k
    } else {
        k.saturating_sub(level + 1).max(1)
    };

    let idx = if weights.is_empty() {
        0
    } else {
        (argmax(weights) * usable / weights.len()).min(usable - 1)
    };

    if level == 0 {
        BASE_CLUSTERS[idx].to_string()
    } else {
        format!("{}-Meta{level}", BASE_CLUSTERS[idx])
    }
}

/// Builds the per-feature tag list for a node.
fn tags_for(weights: &[f64], level: usize, config: &EngineConfig) -> Vec<String> {
    let mut tags = Vec::new();
    for (i, &w) in weights.iter().enumerate() {
        if w > HIGH_TAG_THRESHOLD {
            tags.push(format!("High:{}", config.feature_name(i)));
        } else if w < LOW_TAG_THRESHOLD {
            tags.push(format!("Low:{}", config.feature_name(i)));
        }
    }
    if level > 0 {
        tags.push(format!("Abstract:L{level}"));
    }
    tags
}

/// Index of the largest component; ties keep the first.
fn argmax(weights: &[f64]) -> usize {
    let mut best = 0;
    let mut best_value = f64::NEG_INFINITY;
    for (i, &w) in weights.iter().enumerate() {
        if w > best_value {
            best_value = w;
            best = i;
        }
    }
    best
}
