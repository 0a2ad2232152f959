// Configuration file support
// Run defaults from <config dir>/hashwatch/config.toml; flags override them

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::hash::algorithm::{AlgorithmChoice, AlgorithmFactory, MAX_BLAKE2B_DIGEST_SIZE};
use crate::hash::baseline::{BASELINE_STEM, DEFAULT_EXTENSION};
use crate::hash::error::{ChecksumError, Result};
use crate::hash::hash::{DEFAULT_CHUNK_BLOCKS, MAX_CHUNK_BYTES};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    /// Algorithm name, e.g. "blake2b", "sha256", "sha3-512"
    pub algorithm: String,
    /// Output size in bytes for the variable-length BLAKE2 algorithms
    pub digest_size: usize,
    /// Blocks per read chunk
    pub chunk_blocks: usize,
    /// Files above this many mebibytes are skipped; unset hashes everything
    pub size_cap_mb: Option<f64>,
    /// Basenames never enumerated
    pub exclude: Vec<String>,
    /// Extension of the default baseline file
    pub baseline_extension: String,
    /// Hash files on all cores
    pub parallel: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            algorithm: "blake2b".to_string(),
            digest_size: MAX_BLAKE2B_DIGEST_SIZE,
            chunk_blocks: DEFAULT_CHUNK_BLOCKS,
            size_cap_mb: None,
            exclude: vec![format!("{}{}", BASELINE_STEM, DEFAULT_EXTENSION)],
            baseline_extension: DEFAULT_EXTENSION.to_string(),
            parallel: false,
        }
    }
}

impl Config {
    /// Default config location, if the platform has a config directory
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("hashwatch").join("config.toml"))
    }

    /// Load the config at the default location, or defaults when there is none
    pub fn load_default() -> Result<Self> {
        match Self::default_path() {
            Some(path) if path.is_file() => Self::load(&path),
            _ => Ok(Self::default()),
        }
    }

    /// Load and validate a TOML config file
    pub fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .map_err(|e| ChecksumError::from_io_error(e, "reading config", Some(path.to_path_buf())))?;
        Self::from_toml(&content, path)
    }

    fn from_toml(content: &str, path: &Path) -> Result<Self> {
        let config: Config = toml::from_str(content).map_err(|e| ChecksumError::InvalidConfig {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;
        config.validate(path)?;
        Ok(config)
    }

    fn validate(&self, path: &Path) -> Result<()> {
        if let Some(cap) = self.size_cap_mb {
            validate_size_cap(cap).map_err(|reason| ChecksumError::InvalidConfig {
                path: path.to_path_buf(),
                reason: format!("size_cap_mb {}", reason),
            })?;
        }
        if self.chunk_blocks == 0 {
            return Err(ChecksumError::InvalidConfig {
                path: path.to_path_buf(),
                reason: "chunk_blocks must be at least 1".to_string(),
            });
        }

        // Unknown names fail here rather than on the first file
        let block_size = self.algorithm_choice()?.create()?.block_size();
        let fits = self
            .chunk_blocks
            .checked_mul(block_size)
            .is_some_and(|bytes| bytes <= MAX_CHUNK_BYTES);
        if !fits {
            return Err(ChecksumError::InvalidConfig {
                path: path.to_path_buf(),
                reason: format!(
                    "chunk_blocks of {} {}-byte blocks exceeds the {} MiB chunk limit",
                    self.chunk_blocks,
                    block_size,
                    MAX_CHUNK_BYTES / (1024 * 1024)
                ),
            });
        }
        Ok(())
    }

    /// The configured algorithm; digest sizes out of range are clamped, not rejected
    pub fn algorithm_choice(&self) -> Result<AlgorithmChoice> {
        AlgorithmChoice::from_name(&self.algorithm, self.digest_size)
    }

    pub fn to_toml(&self) -> std::result::Result<String, toml::ser::Error> {
        toml::to_string_pretty(self)
    }
}

/// A size cap must be a finite, non-negative number of MB
pub fn validate_size_cap(cap_mb: f64) -> std::result::Result<(), String> {
    if cap_mb.is_finite() && cap_mb >= 0.0 {
        Ok(())
    } else {
        Err(format!("must be a non-negative number, got {}", cap_mb))
    }
}
