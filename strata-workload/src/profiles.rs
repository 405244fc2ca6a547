//! Sweep profiles: named or file-loaded workload parameter sets.
//!
//! A profile is the declarative half of a run: which (block size, block
//! count) pairs to sweep, whether to verify and clean up, and whether to
//! inject corruption. Built-in profiles cover the common cases; a TOML
//! file carries anything custom.

use std::path::Path;

use serde::Deserialize;
use strata_core::{BlockSize, LayoutError};
use thiserror::Error;

use crate::executor::{CorruptionMode, WorkloadOptions};

/// Errors loading a sweep profile.
#[derive(Debug, Error)]
pub enum ProfileError {
    /// The profile file could not be read.
    #[error("failed to read profile file: {0}")]
    Io(#[from] std::io::Error),

    /// The profile file is not valid TOML.
    #[error("failed to parse profile file: {0}")]
    Parse(#[from] toml::de::Error),

    /// No built-in profile with the given name exists.
    #[error("unknown profile {0:?} (built-in: smoke, full, corruption)")]
    UnknownProfile(String),
}

/// One sweep entry: a block size (as its display form, e.g. `"1M"`) and
/// how many blocks to write.
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
pub struct SweepEntry {
    /// Block size, e.g. `"4K"` or `"32M"`.
    pub block_size: String,
    /// Number of blocks per object.
    pub block_count: u32,
}

/// A named workload parameter set.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SweepProfile {
    /// Profile name, for logs and reports.
    pub name: String,
    /// Entries to sweep, in order.
    pub sweep: Vec<SweepEntry>,
    /// Read objects back and verify checksums.
    pub verify: bool,
    /// Delete objects after their lifecycle completes.
    pub cleanup: bool,
    /// Inject corruption at this block index and expect the engine (or the
    /// checksum comparison) to catch it.
    pub corrupt_block: Option<u32>,
    /// Seed for object ids and content. Combined with a per-node offset by
    /// the caller so nodes write distinct content.
    pub seed: u64,
}

impl Default for SweepProfile {
    fn default() -> Self {
        Self {
            name: "custom".to_string(),
            sweep: Vec::new(),
            verify: true,
            cleanup: true,
            corrupt_block: None,
            seed: 0,
        }
    }
}

impl SweepProfile {
    /// Loads a profile from a TOML file.
    ///
    /// # Errors
    ///
    /// Returns [`ProfileError`] if the file cannot be read or parsed.
    pub fn from_file(path: &Path) -> Result<Self, ProfileError> {
        let raw = std::fs::read_to_string(path)?;
        Ok(toml::from_str(&raw)?)
    }

    /// Resolves the sweep entries to typed (block size, block count) pairs.
    ///
    /// # Errors
    ///
    /// Returns [`LayoutError::UnsupportedBlockSize`] for an entry whose
    /// block size is not in the catalog.
    pub fn sweep(&self) -> Result<Vec<(BlockSize, u32)>, LayoutError> {
        self.sweep
            .iter()
            .map(|entry| Ok((entry.block_size.parse()?, entry.block_count)))
            .collect()
    }

    /// Returns the executor options this profile implies.
    #[must_use]
    pub const fn options(&self) -> WorkloadOptions {
        WorkloadOptions {
            verify: self.verify,
            cleanup: self.cleanup,
            corruption: match self.corrupt_block {
                None => CorruptionMode::Disabled,
                Some(block_index) => CorruptionMode::InjectAtBlockBoundary { block_index },
            },
        }
    }
}

fn entry(block_size: &str, block_count: u32) -> SweepEntry {
    SweepEntry {
        block_size: block_size.to_string(),
        block_count,
    }
}

/// Returns a built-in profile by name.
///
/// - `smoke`: one small and one mid-size object, quick sanity pass.
/// - `full`: every supported block size.
/// - `corruption`: injects corruption and expects it to be caught.
///
/// # Errors
///
/// Returns [`ProfileError::UnknownProfile`] for any other name.
pub fn load_profile(name: &str) -> Result<SweepProfile, ProfileError> {
    match name {
        "smoke" => Ok(SweepProfile {
            name: name.to_string(),
            sweep: vec![entry("4K", 1), entry("1M", 2)],
            ..SweepProfile::default()
        }),
        "full" => Ok(SweepProfile {
            name: name.to_string(),
            sweep: BlockSize::ALL
                .iter()
                .map(|size| entry(&size.to_string(), 4))
                .collect(),
            ..SweepProfile::default()
        }),
        "corruption" => Ok(SweepProfile {
            name: name.to_string(),
            sweep: vec![entry("1M", 4)],
            corrupt_block: Some(1),
            ..SweepProfile::default()
        }),
        other => Err(ProfileError::UnknownProfile(other.to_string())),
    }
}
