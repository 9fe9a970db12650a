//! Training samples supplied by the feature-vector source.

use crate::error::{Result, StrataError};
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::BufReader;
use std::path::Path;

/// One labeled operational feature vector.
///
/// Samples are supplied as a finite, pre-loaded collection before training
/// starts; the engine never streams them. The complexity tier gates which
/// layers a sample may update: level `l` only learns from samples with
/// `complexity >= l + 1`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrainingSample {
    /// Feed-assigned sample id.
    pub id: u64,
    /// The feature vector.
    pub features: Vec<f64>,
    /// Human-readable label.
    pub label: String,
    /// Complexity tier, starting at 1.
    pub complexity: u32,
    /// Feed-assigned timestamp (milliseconds).
    #[serde(default)]
    pub timestamp: u64,
}

impl TrainingSample {
    /// Creates a sample with a zero timestamp.
    pub fn new(id: u64, features: Vec<f64>, label: impl Into<String>, complexity: u32) -> Self {
        Self {
            id,
            features,
            label: label.into(),
            complexity,
            timestamp: 0,
        }
    }

    /// Returns the leading `dims` components, or `None` when the vector is
    /// too short for the requested projection.
    #[inline]
    pub fn project(&self, dims: usize) -> Option<&[f64]> {
        self.features.get(..dims)
    }

    /// Whether this sample may update the given level.
    #[inline]
    pub fn gates(&self, level: usize) -> bool {
        self.complexity as usize >= level + 1
    }

    /// Loads a sample collection from a JSON array file.
    pub fn load_json<P: AsRef<Path>>(path: P) -> Result<Vec<TrainingSample>> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(StrataError::FileNotFound(path.to_path_buf()));
        }
        let file = File::open(path)?;
        let reader = BufReader::new(file);
        serde_json::from_reader(reader).map_err(|e| StrataError::Serialization(e.to_string()))
    }
}
