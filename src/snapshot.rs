//! Read-only snapshot types for visualization consumers.
//!
//! The engine performs no rendering. External consumers read these
//! serializable views, captured only at yield boundaries where all node
//! state is fully committed.

use crate::map::Layer;
use serde::Serialize;

/// Read-only view of one node, including its cross-layer links.
#[derive(Debug, Clone, Serialize)]
pub struct NodeView {
    /// Engine-wide node id.
    pub id: u64,
    /// Column position on the grid.
    pub x: usize,
    /// Row position on the grid.
    pub y: usize,
    /// Current weight vector.
    pub weights: Vec<f64>,
    /// BMU selection count.
    pub activation_count: u64,
    /// Bottom-up refinement level in [0, 1].
    pub refinement_level: f64,
    /// Cluster label, present after training completes.
    pub cluster: Option<String>,
    /// Descriptive per-feature tags.
    pub tags: Vec<String>,
    /// Arena index of the parent in the next-coarser layer.
    pub parent: Option<usize>,
    /// Arena indices of children in the next-finer layer.
    pub children: Vec<usize>,
}

/// Read-only view of one layer.
#[derive(Debug, Clone, Serialize)]
pub struct LayerView {
    /// Hierarchy level.
    pub level: usize,
    /// Grid width.
    pub width: usize,
    /// Grid height.
    pub height: usize,
    /// Abstraction-level name.
    pub name: String,
    /// Node views in row-major order.
    pub nodes: Vec<NodeView>,
}

/// A consistent snapshot of the whole map hierarchy.
#[derive(Debug, Clone, Serialize)]
pub struct EngineSnapshot {
    /// Layer views, finest first.
    pub layers: Vec<LayerView>,
}

impl EngineSnapshot {
    /// Captures the current state of the given layers.
    pub fn capture(layers: &[Layer]) -> Self {
        let layers = layers
            .iter()
            .map(|layer| LayerView {
                level: layer.level,
                width: layer.width,
                height: layer.height,
                name: layer.name.clone(),
                nodes: layer
                    .nodes
                    .iter()
                    .map(|node| NodeView {
                        id: node.id,
                        x: node.x,
                        y: node.y,
                        weights: node.weights.clone(),
                        activation_count: node.activation_count,
                        refinement_level: node.refinement,
                        cluster: node.cluster.clone(),
                        tags: node.tags.clone(),
                        parent: node.parent,
                        children: node.children.clone(),
                    })
                    .collect(),
            })
            .collect();

        Self { layers }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::EngineConfig;
    use crate::map::{build_layers, link_layers};
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    #[test]
    fn test_capture_copies_state_and_links() {
        let config = EngineConfig {
            layers: 2,
            base_width: 6,
            base_height: 6,
            ..Default::default()
        };
        let mut rng = ChaCha8Rng::seed_from_u64(5);
        let mut layers = build_layers(&config, &mut rng).unwrap();
        link_layers(&mut layers);
        layers[0].nodes[3].activation_count = 9;
        layers[0].nodes[3].cluster = Some("Latency".to_string());

        let snapshot = EngineSnapshot::capture(&layers);

        assert_eq!(snapshot.layers.len(), 2);
        assert_eq!(snapshot.layers[0].name, "operational");
        let node = &snapshot.layers[0].nodes[3];
        assert_eq!(node.activation_count, 9);
        assert_eq!(node.cluster.as_deref(), Some("Latency"));
        assert_eq!(node.parent, layers[0].nodes[3].parent);
    }

    #[test]
    fn test_snapshot_serializes_to_json() {
        let config = EngineConfig {
            layers: 2,
            base_width: 4,
            base_height: 4,
            ..Default::default()
        };
        let mut rng = ChaCha8Rng::seed_from_u64(5);
        let layers = build_layers(&config, &mut rng).unwrap();
        let snapshot = EngineSnapshot::capture(&layers);

        let json = serde_json::to_string(&snapshot).unwrap();
        assert!(json.contains("\"activation_count\""));
        assert!(json.contains("\"refinement_level\""));
    }
}
