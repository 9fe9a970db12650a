//! Hierarchical refinement: bottom-up propagation of activation evidence.

use crate::map::Layer;

/// Refinement-level increment applied on each triggered propagation.
const REFINEMENT_STEP: f64 = 0.1;

/// Runs one bottom-up refinement pass over every adjacent (fine, coarse)
/// layer pair.
///
/// A fine node participates when it has been activated at least once and
/// carries a parent link; parentless nodes are skipped. Activation strength
/// is the node's activation count normalized by the fine layer's maximum.
/// Strengths above `threshold` nudge the parent's refinement level up by a
/// fixed step (capped at 1.0) and blend a tenth of the child's weights into
/// the parent — a soft, non-destructive propagation of detail into coarser
/// abstractions.
pub fn refine_hierarchy(layers: &mut [Layer], threshold: f64) {
    for fine_level in 0..layers.len().saturating_sub(1) {
        let (fine_part, coarse_part) = layers.split_at_mut(fine_level + 1);
        let fine = &fine_part[fine_level];
        let coarse = &mut coarse_part[0];

        let max_activation = fine.max_activation();
        if max_activation == 0 {
            continue;
        }

        for node in &fine.nodes {
            if node.activation_count == 0 {
                continue;
            }
            let Some(parent_idx) = node.parent else {
                continue;
            };

            let strength = node.activation_count as f64 / max_activation as f64;
            if strength > threshold {
                let parent = &mut coarse.nodes[parent_idx];
                parent.refinement = (parent.refinement + REFINEMENT_STEP).min(1.0);
                parent.blend_toward(&node.weights);
            }
        }
    }
}
