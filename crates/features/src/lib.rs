#![deny(clippy::all, clippy::pedantic)]

//! Static per-loop features and their observation encoding.
//!
//! The feature file is produced by the loop extraction pass: a JSON array
//! with one object per loop. [`FeatureStore`] loads it once and never
//! changes afterwards, so the loop count seen by an environment is fixed
//! for its whole lifetime.

use serde::Deserialize;
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use thiserror::Error;

mod encode;

pub use encode::{encode, encode_all, OBS_WIDTH};

/// Sentinel for a loop whose trip count could not be estimated.
pub const UNKNOWN_TRIP_COUNT: i64 = -1;

#[derive(Error, Debug)]
pub enum ConfigurationError {
    #[error("cannot read feature file {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("malformed feature file {path}: {source}")]
    Malformed {
        path: PathBuf,
        source: serde_json::Error,
    },
    #[error("feature input lists no loops")]
    Empty,
    #[error("duplicate loop id `{0}`")]
    DuplicateLoopId(String),
}

/// One loop as reported by the extraction pass.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct LoopFeature {
    pub loop_id: String,
    #[serde(default)]
    pub num_blocks: u32,
    #[serde(default)]
    pub num_loads: u32,
    #[serde(default)]
    pub num_stores: u32,
    #[serde(default)]
    pub num_arith: u32,
    #[serde(default)]
    pub num_calls: u32,
    #[serde(default = "unknown_trip_count")]
    pub trip_count_est: i64,
    /// Enclosing function, when the pass reports it.
    #[serde(default)]
    pub function: Option<String>,
    /// Name of the loop header block, when the pass reports it.
    #[serde(default)]
    pub header: Option<String>,
}

fn unknown_trip_count() -> i64 {
    UNKNOWN_TRIP_COUNT
}

/// Immutable, load-ordered, non-empty collection of [`LoopFeature`]
/// records.
#[derive(Debug, Clone)]
pub struct FeatureStore {
    loops: Vec<LoopFeature>,
}

impl FeatureStore {
    /// Reads and validates the feature file at `path`.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigurationError`] when the file cannot be read, is not a
    /// JSON array of loop records, is empty, or repeats a `loop_id`.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigurationError> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path).map_err(|source| ConfigurationError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let loops: Vec<LoopFeature> =
            serde_json::from_str(&json).map_err(|source| ConfigurationError::Malformed {
                path: path.to_path_buf(),
                source,
            })?;
        let store = Self::from_loops(loops)?;
        tracing::info!("Loaded {} loop feature records from {:?}", store.len(), path);
        Ok(store)
    }

    /// Builds a store from records already in memory.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigurationError::Empty`] for no records and
    /// [`ConfigurationError::DuplicateLoopId`] if two records share an id.
    pub fn from_loops(loops: Vec<LoopFeature>) -> Result<Self, ConfigurationError> {
        if loops.is_empty() {
            return Err(ConfigurationError::Empty);
        }
        let mut seen = HashSet::with_capacity(loops.len());
        for feature in &loops {
            if !seen.insert(feature.loop_id.as_str()) {
                return Err(ConfigurationError::DuplicateLoopId(feature.loop_id.clone()));
            }
        }
        Ok(Self { loops })
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.loops.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.loops.is_empty()
    }

    #[must_use]
    pub fn get(&self, idx: usize) -> Option<&LoopFeature> {
        self.loops.get(idx)
    }

    /// Records in load order.
    #[must_use]
    pub fn loops(&self) -> &[LoopFeature] {
        &self.loops
    }
}
