//! Configuration for the Strata hierarchical map engine.

use crate::error::{Result, StrataError};
use serde::{Deserialize, Serialize};

/// Engine configuration, applied at (re-)initialization.
///
/// Validation is explicit and fail-fast: [`EngineConfig::validate`] rejects
/// out-of-range values before any layer is built.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Number of map layers in the hierarchy. Must be at least 2.
    /// Default: 3.
    pub layers: usize,

    /// Level-0 grid width.
    /// Default: 16.
    pub base_width: usize,

    /// Level-0 grid height.
    /// Default: 16.
    pub base_height: usize,

    /// Initial learning rate.
    /// Default: 0.3.
    pub learning_rate: f64,

    /// Initial neighborhood radius, in grid units.
    /// Default: 4.0.
    pub neighborhood_radius: f64,

    /// Total training iteration budget.
    /// Default: 2000.
    pub max_iterations: u64,

    /// Per-iteration multiplicative decay applied to both the learning rate
    /// and the neighborhood radius. Must lie in (0, 1).
    /// Default: 0.999.
    pub decay_rate: f64,

    /// Grid shrink factor between adjacent levels. Must lie in (0, 1).
    /// Default: 0.65.
    pub hierarchy_factor: f64,

    /// Activation-strength threshold that triggers bottom-up refinement.
    /// Values of 1.0 or above are accepted and simply never trigger.
    /// Default: 0.5.
    pub refinement_threshold: f64,

    /// Dimensionality of level-0 feature vectors.
    /// Default: 8.
    pub feature_count: usize,

    /// Per-level feature projection.
    /// Default: every level sees the full feature vector.
    pub projection: FeatureProjection,

    /// Human-readable feature names used for node tags. Missing names are
    /// generated as `feature0..featureN`.
    /// Default: empty.
    pub feature_names: Vec<String>,

    /// Smallest width or height a level's grid may shrink to.
    /// Default: 4.
    pub min_grid_dim: usize,

    /// Random seed. Governs both grid structure and initial weights: a
    /// fixed seed reproduces dimensions, linkage topology, weights, and the
    /// training sample stream.
    /// Default: None (random).
    pub seed: Option<u64>,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            layers: 3,
            base_width: 16,
            base_height: 16,
            learning_rate: 0.3,
            neighborhood_radius: 4.0,
            max_iterations: 2000,
            decay_rate: 0.999,
            hierarchy_factor: 0.65,
            refinement_threshold: 0.5,
            feature_count: 8,
            projection: FeatureProjection::Full,
            feature_names: Vec::new(),
            min_grid_dim: 4,
            seed: None,
        }
    }
}

impl EngineConfig {
    /// Checks every field against its allowed range.
    ///
    /// Called by the engine before any layer is built; a failure here means
    /// no partial structure was created.
    pub fn validate(&self) -> Result<()> {
        if self.layers < 2 {
            return Err(StrataError::Config(format!(
                "layer count must be at least 2, got {}",
                self.layers
            )));
        }
        if self.base_width == 0 || self.base_height == 0 {
            return Err(StrataError::Config(format!(
                "base dimensions must be positive, got {}x{}",
                self.base_width, self.base_height
            )));
        }
        if !self.learning_rate.is_finite() || self.learning_rate <= 0.0 {
            return Err(StrataError::Config(format!(
                "learning rate must be positive, got {}",
                self.learning_rate
            )));
        }
        if !self.neighborhood_radius.is_finite() || self.neighborhood_radius <= 0.0 {
            return Err(StrataError::Config(format!(
                "neighborhood radius must be positive, got {}",
                self.neighborhood_radius
            )));
        }
        if self.max_iterations == 0 {
            return Err(StrataError::Config(
                "max iterations must be positive".to_string(),
            ));
        }
        if !self.decay_rate.is_finite() || self.decay_rate <= 0.0 || self.decay_rate >= 1.0 {
            return Err(StrataError::Config(format!(
                "decay rate must lie in (0, 1), got {}",
                self.decay_rate
            )));
        }
        if !self.hierarchy_factor.is_finite()
            || self.hierarchy_factor <= 0.0
            || self.hierarchy_factor >= 1.0
        {
            return Err(StrataError::Config(format!(
                "hierarchy factor must lie in (0, 1), got {}",
                self.hierarchy_factor
            )));
        }
        if !self.refinement_threshold.is_finite() || self.refinement_threshold <= 0.0 {
            return Err(StrataError::Config(format!(
                "refinement threshold must be positive, got {}",
                self.refinement_threshold
            )));
        }
        if self.feature_count == 0 {
            return Err(StrataError::Config(
                "feature count must be positive".to_string(),
            ));
        }
        if self.min_grid_dim == 0 {
            return Err(StrataError::Config(
                "minimum grid dimension must be positive".to_string(),
            ));
        }
        Ok(())
    }

    /// Grid width at a level: `max(min_grid_dim, floor(base · factor^level))`.
    #[inline]
    pub fn grid_width(&self, level: usize) -> usize {
        self.shrunk_dim(self.base_width, level)
    }

    /// Grid height at a level: `max(min_grid_dim, floor(base · factor^level))`.
    #[inline]
    pub fn grid_height(&self, level: usize) -> usize {
        self.shrunk_dim(self.base_height, level)
    }

    fn shrunk_dim(&self, base: usize, level: usize) -> usize {
        let scaled = (base as f64 * self.hierarchy_factor.powi(level as i32)).floor() as usize;
        scaled.max(self.min_grid_dim)
    }

    /// Spatial resolution factor of a level (`factor^level`); scales the
    /// effective neighborhood radius on that level's grid.
    #[inline]
    pub fn resolution(&self, level: usize) -> f64 {
        self.hierarchy_factor.powi(level as i32)
    }

    /// Feature dimensionality seen by a level under the configured projection.
    #[inline]
    pub fn dims_at(&self, level: usize) -> usize {
        self.projection.dims_at(self.feature_count, level)
    }

    /// Display name of feature `i`.
    pub fn feature_name(&self, i: usize) -> String {
        self.feature_names
            .get(i)
            .cloned()
            .unwrap_or_else(|| format!("feature{i}"))
    }
}

/// Per-level feature projection, declared in configuration.
///
/// Projection is prefix-slicing: level `l` sees the first `dims_at(l)`
/// components of a sample's feature vector.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum FeatureProjection {
    /// Every level sees the full feature vector.
    Full,
    /// Level `l` sees `max(min_dims, feature_count - step·l)` leading
    /// components, so coarser levels work on fewer features.
    Taper {
        /// Components dropped per level.
        step: usize,
        /// Floor on the projected dimensionality.
        min_dims: usize,
    },
}

impl FeatureProjection {
    /// Projected dimensionality for a level. Never exceeds `feature_count`
    /// and never reaches zero for a non-empty feature vector.
    pub fn dims_at(&self, feature_count: usize, level: usize) -> usize {
        match self {
            FeatureProjection::Full => feature_count,
            FeatureProjection::Taper { step, min_dims } => {
                let floor = (*min_dims).clamp(1, feature_count.max(1));
                feature_count.saturating_sub(step * level).max(floor)
            }
        }
    }
}
