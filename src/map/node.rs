//! Node representation for hierarchical map layers.

use serde::{Deserialize, Serialize};

/// A single map unit within a layer's node arena.
///
/// Cross-layer links are plain indices into the adjacent layers' node
/// vectors; nodes never hold references into other layers. `parent` points
/// into the next-coarser layer, `children` into the next-finer one.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Node {
    /// Engine-wide node id.
    pub id: u64,
    /// Column position on the grid.
    pub x: usize,
    /// Row position on the grid.
    pub y: usize,
    /// Hierarchy level this node belongs to.
    pub level: usize,
    /// Weight vector; length equals the feature count of `level`.
    pub weights: Vec<f64>,
    /// Number of times this node was selected as BMU.
    pub activation_count: u64,
    /// Iteration tick of the most recent activation.
    pub last_activation: Option<u64>,
    /// Cluster label assigned after training.
    pub cluster: Option<String>,
    /// Descriptive per-feature tags assigned with the cluster label.
    pub tags: Vec<String>,
    /// Bottom-up refinement level in [0, 1].
    pub refinement: f64,
    /// Arena index of the parent node in the next-coarser layer.
    pub parent: Option<usize>,
    /// Arena indices of child nodes in the next-finer layer.
    pub children: Vec<usize>,
}

impl Node {
    /// Creates an unlinked node with the given weights.
    pub fn new(id: u64, x: usize, y: usize, level: usize, weights: Vec<f64>) -> Self {
        Self {
            id,
            x,
            y,
            level,
            weights,
            activation_count: 0,
            last_activation: None,
            cluster: None,
            tags: Vec::new(),
            refinement: 0.0,
            parent: None,
            children: Vec::new(),
        }
    }

    /// Euclidean distance between this node's weights and an input vector.
    pub fn distance(&self, input: &[f64]) -> f64 {
        self.distance_squared(input).sqrt()
    }

    /// Squared Euclidean distance (faster, avoids sqrt).
    #[inline]
    pub fn distance_squared(&self, input: &[f64]) -> f64 {
        debug_assert_eq!(
            self.weights.len(),
            input.len(),
            "Weight and input dimensions must match"
        );

        self.weights
            .iter()
            .zip(input.iter())
            .map(|(w, i)| (w - i).powi(2))
            .sum()
    }

    /// Euclidean grid distance to the given coordinates.
    #[inline]
    pub fn grid_distance(&self, x: usize, y: usize) -> f64 {
        let dx = self.x as f64 - x as f64;
        let dy = self.y as f64 - y as f64;
        (dx * dx + dy * dy).sqrt()
    }

    /// Moves the weights toward an input vector.
    ///
    /// `rate` is the level-attenuated learning rate, `influence` the
    /// neighborhood influence in [0, 1].
    pub fn update_weights(&mut self, input: &[f64], rate: f64, influence: f64) {
        let step = rate * influence;

        for (w, i) in self.weights.iter_mut().zip(input.iter()) {
            *w += step * (i - *w);
        }
    }

    /// Blends a child's weights into this node's, keeping 90% of the
    /// existing weight. Runs over this node's (coarser) dimensionality.
    pub fn blend_toward(&mut self, child_weights: &[f64]) {
        for (w, c) in self.weights.iter_mut().zip(child_weights.iter()) {
            *w = 0.9 * *w + 0.1 * c;
        }
    }

    /// Records a BMU selection at the given iteration tick.
    #[inline]
    pub fn record_activation(&mut self, tick: u64) {
        self.activation_count += 1;
        self.last_activation = Some(tick);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_node_creation() {
        let node = Node::new(7, 3, 5, 1, vec![0.0; 4]);
        assert_eq!(node.id, 7);
        assert_eq!((node.x, node.y), (3, 5));
        assert_eq!(node.level, 1);
        assert_eq!(node.weights.len(), 4);
        assert_eq!(node.activation_count, 0);
        assert!(node.parent.is_none());
        assert!(node.children.is_empty());
    }

    #[test]
    fn test_distance() {
        let node = Node::new(0, 0, 0, 0, vec![1.0, 0.0, 0.0]);
        let input = vec![0.0, 1.0, 0.0];
        let dist = node.distance(&input);
        assert!((dist - std::f64::consts::SQRT_2).abs() < 1e-10);
    }

    #[test]
    fn test_grid_distance() {
        let node = Node::new(0, 0, 0, 0, vec![0.0]);
        let dist = node.grid_distance(3, 4);
        assert!((dist - 5.0).abs() < 1e-10); // 3-4-5 triangle
    }

    #[test]
    fn test_update_weights() {
        let mut node = Node::new(0, 0, 0, 0, vec![0.0, 0.0, 0.0]);
        let input = vec![1.0, 1.0, 1.0];
        node.update_weights(&input, 0.5, 1.0);
        assert!((node.weights[0] - 0.5).abs() < 1e-10);

        // Zero influence leaves weights untouched.
        node.update_weights(&input, 0.5, 0.0);
        assert!((node.weights[0] - 0.5).abs() < 1e-10);
    }

    #[test]
    fn test_blend_toward() {
        let mut node = Node::new(0, 0, 0, 1, vec![1.0, 0.0]);
        // Child vectors may be longer; only the leading components blend.
        node.blend_toward(&[0.0, 1.0, 0.5]);
        assert!((node.weights[0] - 0.9).abs() < 1e-10);
        assert!((node.weights[1] - 0.1).abs() < 1e-10);
    }

    #[test]
    fn test_record_activation() {
        let mut node = Node::new(0, 0, 0, 0, vec![0.0]);
        node.record_activation(42);
        node.record_activation(99);
        assert_eq!(node.activation_count, 2);
        assert_eq!(node.last_activation, Some(99));
    }
}
