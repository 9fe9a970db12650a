//! Map layers: row-major node arenas with grid addressing.

use crate::map::Node;
use serde::{Deserialize, Serialize};

/// One level of the map hierarchy.
///
/// Nodes live in a flat row-major arena; all cross-layer links are indices
/// into these arenas.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Layer {
    /// Hierarchy level (0 = finest).
    pub level: usize,
    /// Grid width.
    pub width: usize,
    /// Grid height.
    pub height: usize,
    /// Spatial resolution factor (`hierarchy_factor^level`); scales the
    /// effective neighborhood radius on this grid.
    pub resolution: f64,
    /// Abstraction-level name.
    pub name: String,
    /// Nodes in row-major order.
    pub nodes: Vec<Node>,
}

impl Layer {
    /// Total number of nodes.
    #[inline]
    pub fn total_nodes(&self) -> usize {
        self.nodes.len()
    }

    /// Gets a node by its linear arena index.
    #[inline]
    pub fn get(&self, index: usize) -> Option<&Node> {
        self.nodes.get(index)
    }

    /// Gets a node by its grid position.
    #[inline]
    pub fn get_at(&self, x: usize, y: usize) -> Option<&Node> {
        if x < self.width && y < self.height {
            Some(&self.nodes[y * self.width + x])
        } else {
            None
        }
    }

    /// Converts grid coordinates to a linear arena index.
    #[inline]
    pub fn index_of(&self, x: usize, y: usize) -> usize {
        y * self.width + x
    }

    /// Converts a linear arena index to grid coordinates.
    #[inline]
    pub fn coords_of(&self, index: usize) -> (usize, usize) {
        (index % self.width, index / self.width)
    }

    /// Feature dimensionality of this layer's weight vectors.
    #[inline]
    pub fn feature_dims(&self) -> usize {
        self.nodes.first().map(|n| n.weights.len()).unwrap_or(0)
    }

    /// Finds the Best Matching Unit for an input vector.
    ///
    /// Ties on exactly equal minimal distances resolve to the lowest linear
    /// grid index: the scan keeps the first minimum it sees.
    pub fn find_bmu(&self, input: &[f64]) -> Option<usize> {
        let mut best = None;
        let mut best_dist = f64::INFINITY;

        for (i, node) in self.nodes.iter().enumerate() {
            let dist = node.distance_squared(input);
            if dist < best_dist {
                best_dist = dist;
                best = Some(i);
            }
        }

        best
    }

    /// Finds the two nearest nodes by weight distance.
    ///
    /// Returns `None` for layers with fewer than two nodes. Ties resolve to
    /// lower linear indices, like [`Layer::find_bmu`].
    pub fn find_two_nearest(&self, input: &[f64]) -> Option<(usize, usize)> {
        if self.nodes.len() < 2 {
            return None;
        }

        let mut best = (0usize, f64::INFINITY);
        let mut second = (0usize, f64::INFINITY);

        for (i, node) in self.nodes.iter().enumerate() {
            let dist = node.distance_squared(input);
            if dist < best.1 {
                second = best;
                best = (i, dist);
            } else if dist < second.1 {
                second = (i, dist);
            }
        }

        Some((best.0, second.0))
    }

    /// Largest activation count across the layer.
    pub fn max_activation(&self) -> u64 {
        self.nodes
            .iter()
            .map(|n| n.activation_count)
            .max()
            .unwrap_or(0)
    }
}

/// Conventional abstraction name for a level.
pub fn abstraction_name(level: usize) -> String {
    match level {
        0 => "operational".to_string(),
        1 => "tactical".to_string(),
        2 => "strategic".to_string(),
        n => format!("abstract-{n}"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_layer(width: usize, height: usize, dims: usize) -> Layer {
        let nodes = (0..width * height)
            .map(|i| Node::new(i as u64, i % width, i / width, 0, vec![0.0; dims]))
            .collect();
        Layer {
            level: 0,
            width,
            height,
            resolution: 1.0,
            name: abstraction_name(0),
            nodes,
        }
    }

    #[test]
    fn test_coordinate_conversion() {
        let layer = test_layer(8, 4, 2);
        assert_eq!(layer.index_of(2, 1), 10);
        assert_eq!(layer.coords_of(10), (2, 1));
        assert_eq!(layer.get_at(2, 1).map(|n| n.id), Some(10));
        assert!(layer.get_at(8, 0).is_none());
    }

    #[test]
    fn test_find_bmu() {
        let mut layer = test_layer(4, 4, 3);
        layer.nodes[5].weights = vec![1.0, 0.0, 0.0];

        let bmu = layer.find_bmu(&[1.0, 0.0, 0.0]);
        assert_eq!(bmu, Some(5));
    }

    #[test]
    fn test_find_bmu_ties_break_to_lowest_index() {
        // All nodes are identical; the first (index 0) must win.
        let layer = test_layer(4, 4, 3);
        assert_eq!(layer.find_bmu(&[0.5, 0.5, 0.5]), Some(0));
    }

    #[test]
    fn test_find_two_nearest() {
        let mut layer = test_layer(4, 4, 3);
        layer.nodes[3].weights = vec![1.0, 0.0, 0.0];
        layer.nodes[9].weights = vec![0.9, 0.0, 0.0];

        let (first, second) = layer.find_two_nearest(&[1.0, 0.0, 0.0]).unwrap();
        assert_eq!(first, 3);
        assert_eq!(second, 9);
    }

    #[test]
    fn test_two_nearest_requires_two_nodes() {
        let layer = test_layer(1, 1, 2);
        assert!(layer.find_two_nearest(&[0.0, 0.0]).is_none());
    }

    #[test]
    fn test_max_activation() {
        let mut layer = test_layer(2, 2, 1);
        assert_eq!(layer.max_activation(), 0);
        layer.nodes[2].activation_count = 9;
        assert_eq!(layer.max_activation(), 9);
    }

    #[test]
    fn test_abstraction_names() {
        assert_eq!(abstraction_name(0), "operational");
        assert_eq!(abstraction_name(1), "tactical");
        assert_eq!(abstraction_name(2), "strategic");
        assert_eq!(abstraction_name(5), "abstract-5");
    }
}
