//! Engine-state persistence.
//!
//! State files carry a small fixed header followed by a bincode payload:
//!
//! ```text
//! +-------------------+
//! | Magic "STRA" (4)  |
//! | Version u16 LE (2)|
//! | Reserved (2)      |
//! +-------------------+
//! | bincode payload   |
//! | (EngineState)     |
//! +-------------------+
//! ```
//!
//! Save and load are explicit calls against an external store; the engine
//! keeps no ambient persisted state.

use crate::config::EngineConfig;
use crate::engine::RunStatus;
use crate::error::{Result, StrataError};
use crate::map::Layer;
use crate::metrics::LayerStats;
use crate::sample::TrainingSample;
use crate::train::Trainer;
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::{BufReader, BufWriter, Read, Write};
use std::path::Path;

/// Magic number for Strata state files.
const MAGIC: &[u8; 4] = b"STRA";

/// Current format version.
const VERSION: u16 = 1;

/// Header size in bytes.
const HEADER_SIZE: usize = 8;

/// The complete persistable engine state.
///
/// Includes the training set and the trainer's RNG stream so a resumed
/// session continues the exact schedule it left off, rather than
/// restarting.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EngineState {
    /// Configuration the engine was initialized with.
    pub config: EngineConfig,
    /// The layer pyramid, including linkage and learned weights.
    pub layers: Vec<Layer>,
    /// The loaded training set.
    pub samples: Vec<TrainingSample>,
    /// Training-schedule state (iteration, decayed rates, RNG).
    pub trainer: Trainer,
    /// Per-layer stats, present if training completed.
    pub stats: Option<Vec<LayerStats>>,
    /// Run-status flag at save time.
    pub status: RunStatus,
}

/// Writes engine state to a file.
pub fn save_state<P: AsRef<Path>>(path: P, state: &EngineState) -> Result<()> {
    let file = File::create(path)?;
    let mut writer = BufWriter::new(file);

    let mut header = [0u8; HEADER_SIZE];
    header[0..4].copy_from_slice(MAGIC);
    header[4..6].copy_from_slice(&VERSION.to_le_bytes());
    writer.write_all(&header)?;

    bincode::serialize_into(&mut writer, state)?;
    writer.flush()?;
    Ok(())
}

/// Reads engine state from a file.
pub fn load_state<P: AsRef<Path>>(path: P) -> Result<EngineState> {
    let path = path.as_ref();
    if !path.exists() {
        return Err(StrataError::FileNotFound(path.to_path_buf()));
    }

    let file = File::open(path)?;
    let mut reader = BufReader::new(file);

    let mut header = [0u8; HEADER_SIZE];
    reader.read_exact(&mut header)?;

    if &header[0..4] != MAGIC {
        return Err(StrataError::InvalidStateFormat(
            "bad magic number".to_string(),
        ));
    }
    let version = u16::from_le_bytes([header[4], header[5]]);
    if version != VERSION {
        return Err(StrataError::InvalidStateFormat(format!(
            "unsupported version {version}"
        )));
    }

    let state = bincode::deserialize_from(&mut reader)?;
    Ok(state)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::Engine;
    use tempfile::tempdir;

    fn test_state() -> EngineState {
        let config = EngineConfig {
            layers: 2,
            base_width: 5,
            base_height: 5,
            feature_count: 2,
            seed: Some(9),
            ..Default::default()
        };
        Engine::new(config).unwrap().to_state()
    }

    #[test]
    fn test_save_load_roundtrip() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("engine.strata");

        let state = test_state();
        save_state(&path, &state).unwrap();
        let loaded = load_state(&path).unwrap();

        assert_eq!(loaded.config.layers, 2);
        assert_eq!(loaded.layers.len(), state.layers.len());
        for (la, lb) in loaded.layers.iter().zip(state.layers.iter()) {
            for (na, nb) in la.nodes.iter().zip(lb.nodes.iter()) {
                assert_eq!(na.weights, nb.weights);
                assert_eq!(na.parent, nb.parent);
            }
        }
        assert_eq!(loaded.status, RunStatus::Idle);
    }

    #[test]
    fn test_missing_file() {
        let err = load_state("/nonexistent/engine.strata").unwrap_err();
        assert!(matches!(err, StrataError::FileNotFound(_)));
    }

    #[test]
    fn test_bad_magic_rejected() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("bogus.strata");
        std::fs::write(&path, b"NOPE0000trailing").unwrap();

        let err = load_state(&path).unwrap_err();
        assert!(matches!(err, StrataError::InvalidStateFormat(_)));
    }

    #[test]
    fn test_unsupported_version_rejected() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("future.strata");

        let mut bytes = Vec::new();
        bytes.extend_from_slice(MAGIC);
        bytes.extend_from_slice(&99u16.to_le_bytes());
        bytes.extend_from_slice(&[0, 0]);
        std::fs::write(&path, &bytes).unwrap();

        let err = load_state(&path).unwrap_err();
        assert!(matches!(err, StrataError::InvalidStateFormat(_)));
    }
}
