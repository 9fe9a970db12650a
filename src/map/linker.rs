//! Hierarchical Linker: parent/child linkage between adjacent layers.

use crate::map::Layer;
use log::debug;

/// Links every adjacent (fine, coarse) layer pair.
///
/// Each fine node maps to the coarse coordinate
/// `(floor(x·coarse_w/fine_w), floor(y·coarse_h/fine_h))`. Floor-based
/// mapping is deterministic: a coordinate landing on a cell boundary
/// resolves to exactly one parent. Linkage is bidirectional — the fine
/// node's `parent` and the coarse node's `children` always agree.
///
/// A fine node whose scaled coordinate has no exact coarse match is left
/// parentless. That is non-fatal: the node still trains normally and is
/// only excluded from refinement.
pub fn link_layers(layers: &mut [Layer]) {
    for fine_level in 0..layers.len().saturating_sub(1) {
        let (fine_part, coarse_part) = layers.split_at_mut(fine_level + 1);
        let fine = &mut fine_part[fine_level];
        let coarse = &mut coarse_part[0];

        let mut parentless = 0usize;
        for idx in 0..fine.nodes.len() {
            let (x, y) = (fine.nodes[idx].x, fine.nodes[idx].y);
            let px = x * coarse.width / fine.width;
            let py = y * coarse.height / fine.height;

            if px < coarse.width && py < coarse.height {
                let parent_idx = coarse.index_of(px, py);
                fine.nodes[idx].parent = Some(parent_idx);
                coarse.nodes[parent_idx].children.push(idx);
            } else {
                parentless += 1;
            }
        }

        if parentless > 0 {
            debug!(
                "Layer {fine_level}: {parentless} nodes left parentless by edge rounding"
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::EngineConfig;
    use crate::map::build_layers;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    fn linked_layers(config: &EngineConfig) -> Vec<Layer> {
        let mut rng = ChaCha8Rng::seed_from_u64(7);
        let mut layers = build_layers(config, &mut rng).unwrap();
        link_layers(&mut layers);
        layers
    }

    fn assert_bijective(layers: &[Layer]) {
        for fine_level in 0..layers.len() - 1 {
            let fine = &layers[fine_level];
            let coarse = &layers[fine_level + 1];

            for (idx, node) in fine.nodes.iter().enumerate() {
                if let Some(parent) = node.parent {
                    assert!(
                        coarse.nodes[parent].children.contains(&idx),
                        "level {fine_level} node {idx}: parent {parent} does not own it"
                    );
                }
            }
            for (pidx, parent) in coarse.nodes.iter().enumerate() {
                for &child in &parent.children {
                    assert_eq!(
                        fine.nodes[child].parent,
                        Some(pidx),
                        "level {} node {}: child link without back-reference",
                        fine_level + 1,
                        pidx
                    );
                }
            }
        }
    }

    #[test]
    fn test_proportional_mapping() {
        let config = EngineConfig {
            layers: 2,
            base_width: 8,
            base_height: 8,
            hierarchy_factor: 0.6,
            min_grid_dim: 4,
            ..Default::default()
        };
        let layers = linked_layers(&config);
        assert_eq!(layers[1].width, 4);

        // floor(x * 4 / 8): fine (0,0) -> coarse (0,0), fine (7,7) -> (3,3).
        let fine = &layers[0];
        let coarse = &layers[1];
        assert_eq!(fine.nodes[fine.index_of(0, 0)].parent, Some(coarse.index_of(0, 0)));
        assert_eq!(fine.nodes[fine.index_of(7, 7)].parent, Some(coarse.index_of(3, 3)));
        assert_eq!(fine.nodes[fine.index_of(4, 2)].parent, Some(coarse.index_of(2, 1)));
    }

    #[test]
    fn test_linkage_is_bijective_across_shrink_ratios() {
        for factor in [0.3, 0.5, 0.65, 0.8, 0.9] {
            let config = EngineConfig {
                layers: 4,
                base_width: 17,
                base_height: 13,
                hierarchy_factor: factor,
                ..Default::default()
            };
            let layers = linked_layers(&config);
            assert_bijective(&layers);
        }
    }

    #[test]
    fn test_every_fine_node_finds_a_parent() {
        // Floor mapping always lands inside the coarse grid, so no node is
        // orphaned even on awkward edge ratios.
        let config = EngineConfig {
            layers: 3,
            base_width: 15,
            base_height: 9,
            hierarchy_factor: 0.55,
            ..Default::default()
        };
        let layers = linked_layers(&config);
        for fine_level in 0..layers.len() - 1 {
            for node in &layers[fine_level].nodes {
                assert!(node.parent.is_some());
            }
        }
    }

    #[test]
    fn test_boundary_coordinates_resolve_to_one_parent() {
        // 8 -> 4 halves the grid; fine x=4 sits exactly on the boundary
        // between coarse cells 1 and 2 and must deterministically floor to 2.
        let config = EngineConfig {
            layers: 2,
            base_width: 8,
            base_height: 8,
            hierarchy_factor: 0.5,
            ..Default::default()
        };
        let a = linked_layers(&config);
        let b = linked_layers(&config);

        let fine = &a[0];
        let coarse = &a[1];
        assert_eq!(
            fine.nodes[fine.index_of(4, 4)].parent,
            Some(coarse.index_of(2, 2))
        );

        // Deterministic: repeated builds produce identical topology.
        for (la, lb) in a.iter().zip(b.iter()) {
            for (na, nb) in la.nodes.iter().zip(lb.nodes.iter()) {
                assert_eq!(na.parent, nb.parent);
                assert_eq!(na.children, nb.children);
            }
        }
    }

    #[test]
    fn test_top_layer_has_no_parents() {
        let layers = linked_layers(&EngineConfig::default());
        let top = layers.last().unwrap();
        assert!(top.nodes.iter().all(|n| n.parent.is_none()));
    }
}
