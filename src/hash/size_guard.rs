// Size cap module
// Vetoes files above a configured size before any bytes are read

use std::fs;
use std::path::Path;

use super::error::{ChecksumError, Result};

const BYTES_PER_MB: f64 = 1024.0 * 1024.0;

/// Outcome of checking a file against the size cap
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SizeVerdict {
    Allowed { size_mb: f64 },
    Rejected { size_mb: f64 },
}

impl SizeVerdict {
    pub fn is_allowed(&self) -> bool {
        matches!(self, SizeVerdict::Allowed { .. })
    }

    pub fn size_mb(&self) -> f64 {
        match *self {
            SizeVerdict::Allowed { size_mb } | SizeVerdict::Rejected { size_mb } => size_mb,
        }
    }
}

/// Size cap in mebibytes (fractional allowed)
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SizeGuard {
    cap_mb: f64,
}

impl SizeGuard {
    pub fn new(cap_mb: f64) -> Self {
        Self { cap_mb }
    }

    pub fn cap_mb(&self) -> f64 {
        self.cap_mb
    }

    /// Stat the file once and decide; the file is never opened
    pub fn evaluate(&self, path: &Path) -> Result<SizeVerdict> {
        let metadata = fs::metadata(path)
            .map_err(|e| ChecksumError::from_io_error(e, "reading metadata of", Some(path.to_path_buf())))?;
        Ok(self.evaluate_len(metadata.len()))
    }

    /// Decide from a byte count; only sizes strictly above the cap are rejected
    pub fn evaluate_len(&self, bytes: u64) -> SizeVerdict {
        let size_mb = bytes_to_mb(bytes);
        if size_mb > self.cap_mb {
            SizeVerdict::Rejected { size_mb }
        } else {
            SizeVerdict::Allowed { size_mb }
        }
    }
}

pub fn bytes_to_mb(bytes: u64) -> f64 {
    bytes as f64 / BYTES_PER_MB
}
