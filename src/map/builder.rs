//! Layer Builder: constructs the pyramid of map layers.

use crate::config::EngineConfig;
use crate::error::Result;
use crate::map::{abstraction_name, Layer, Node};
use log::info;
use rand::Rng;
use rand_chacha::ChaCha8Rng;

/// Builds the full layer pyramid from a configuration.
///
/// Grid dimensions shrink by the configured hierarchy factor per level and
/// never drop below `min_grid_dim`. Weights are initialized uniformly in
/// [0, 1] from the supplied RNG, so a seeded RNG reproduces both structure
/// and weights. Fails before allocating anything if the configuration is
/// out of range.
pub fn build_layers(config: &EngineConfig, rng: &mut ChaCha8Rng) -> Result<Vec<Layer>> {
    config.validate()?;

    let mut layers = Vec::with_capacity(config.layers);
    let mut next_id: u64 = 0;

    for level in 0..config.layers {
        let width = config.grid_width(level);
        let height = config.grid_height(level);
        let dims = config.dims_at(level);

        let mut nodes = Vec::with_capacity(width * height);
        for i in 0..width * height {
            let x = i % width;
            let y = i / width;
            let weights: Vec<f64> = (0..dims).map(|_| rng.gen_range(0.0..1.0)).collect();
            nodes.push(Node::new(next_id, x, y, level, weights));
            next_id += 1;
        }

        let name = abstraction_name(level);
        info!(
            "Built layer {level} ({name}): {width}x{height} grid, {dims} feature dims"
        );

        layers.push(Layer {
            level,
            width,
            height,
            resolution: config.resolution(level),
            name,
            nodes,
        });
    }

    Ok(layers)
}
