// Digest algorithm module
// Capability trait for streaming digests plus the named algorithms we ship

use super::error::{ChecksumError, Result};
use blake2::digest::{Update, VariableOutput};
use blake2::{Blake2bVar, Blake2sVar};
use serde::{Deserialize, Serialize};
use sha2::Digest;

/// Smallest digest size accepted by the variable-length algorithms, in bytes
pub const MIN_DIGEST_SIZE: usize = 16;

/// Largest BLAKE2b digest size, in bytes
pub const MAX_BLAKE2B_DIGEST_SIZE: usize = 64;

/// Largest BLAKE2s digest size, in bytes
pub const MAX_BLAKE2S_DIGEST_SIZE: usize = 32;

/// A streaming digest algorithm
///
/// Construction is initialization: an instance starts with empty state,
/// is fed chunks through `update` and consumed by `finalize`.
pub trait DigestAlgorithm: Send {
    /// Canonical lowercase name of the algorithm
    fn name(&self) -> &str;

    /// Feed the next chunk of input
    fn update(&mut self, data: &[u8]);

    /// Consume the state and return the raw digest bytes
    fn finalize(self: Box<Self>) -> Vec<u8>;

    /// Internal block size in bytes, used to size read chunks
    fn block_size(&self) -> usize;

    /// Output size in bytes
    fn digest_size(&self) -> usize;
}

/// Produces fresh, initialized algorithm instances, one per file
pub trait AlgorithmFactory: Sync {
    fn create(&self) -> Result<Box<dyn DigestAlgorithm>>;
}

/// Information about a supported algorithm
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AlgorithmInfo {
    pub name: &'static str,
    pub block_size: usize,
    /// Output size in bytes; for variable-length algorithms, the maximum
    pub digest_size: usize,
    pub variable_length: bool,
}

macro_rules! fixed_digest {
    ($wrapper:ident, $inner:ty, $name:literal, $block:expr, $size:expr) => {
        pub struct $wrapper($inner);

        impl $wrapper {
            pub fn new() -> Self {
                Self(<$inner as Digest>::new())
            }
        }

        impl Default for $wrapper {
            fn default() -> Self {
                Self::new()
            }
        }

        impl DigestAlgorithm for $wrapper {
            fn name(&self) -> &str {
                $name
            }

            fn update(&mut self, data: &[u8]) {
                Digest::update(&mut self.0, data);
            }

            fn finalize(self: Box<Self>) -> Vec<u8> {
                Digest::finalize(self.0).to_vec()
            }

            fn block_size(&self) -> usize {
                $block
            }

            fn digest_size(&self) -> usize {
                $size
            }
        }
    };
}

fixed_digest!(Md5Digest, md5::Md5, "md5", 64, 16);
fixed_digest!(Sha1Digest, sha1::Sha1, "sha1", 64, 20);
fixed_digest!(Sha224Digest, sha2::Sha224, "sha224", 64, 28);
fixed_digest!(Sha256Digest, sha2::Sha256, "sha256", 64, 32);
fixed_digest!(Sha384Digest, sha2::Sha384, "sha384", 128, 48);
fixed_digest!(Sha512Digest, sha2::Sha512, "sha512", 128, 64);
fixed_digest!(Sha3_224Digest, sha3::Sha3_224, "sha3-224", 144, 28);
fixed_digest!(Sha3_256Digest, sha3::Sha3_256, "sha3-256", 136, 32);
fixed_digest!(Sha3_384Digest, sha3::Sha3_384, "sha3-384", 104, 48);
fixed_digest!(Sha3_512Digest, sha3::Sha3_512, "sha3-512", 72, 64);

/// BLAKE3 (fixed 256-bit output)
pub struct Blake3Digest(blake3::Hasher);

impl Blake3Digest {
    pub fn new() -> Self {
        Self(blake3::Hasher::new())
    }
}

impl Default for Blake3Digest {
    fn default() -> Self {
        Self::new()
    }
}

impl DigestAlgorithm for Blake3Digest {
    fn name(&self) -> &str {
        "blake3"
    }

    fn update(&mut self, data: &[u8]) {
        self.0.update(data);
    }

    fn finalize(self: Box<Self>) -> Vec<u8> {
        self.0.finalize().as_bytes().to_vec()
    }

    fn block_size(&self) -> usize {
        64
    }

    fn digest_size(&self) -> usize {
        32
    }
}

/// BLAKE2b with a caller-chosen output length in [16, 64] bytes
pub struct Blake2bDigest {
    state: Blake2bVar,
    digest_size: usize,
}

impl Blake2bDigest {
    /// Build a BLAKE2b state; the requested size is clamped first
    pub fn new(digest_size: usize) -> Result<Self> {
        let digest_size = clamp_blake2b_size(digest_size);
        let state = Blake2bVar::new(digest_size).map_err(|_| ChecksumError::UnsupportedAlgorithm {
            algorithm: format!("blake2b with {} byte output", digest_size),
        })?;
        Ok(Self { state, digest_size })
    }
}

impl DigestAlgorithm for Blake2bDigest {
    fn name(&self) -> &str {
        "blake2b"
    }

    fn update(&mut self, data: &[u8]) {
        Update::update(&mut self.state, data);
    }

    fn finalize(self: Box<Self>) -> Vec<u8> {
        self.state.finalize_boxed().into_vec()
    }

    fn block_size(&self) -> usize {
        128
    }

    fn digest_size(&self) -> usize {
        self.digest_size
    }
}

/// BLAKE2s with a caller-chosen output length in [16, 32] bytes
pub struct Blake2sDigest {
    state: Blake2sVar,
    digest_size: usize,
}

impl Blake2sDigest {
    pub fn new(digest_size: usize) -> Result<Self> {
        let digest_size = clamp_blake2s_size(digest_size);
        let state = Blake2sVar::new(digest_size).map_err(|_| ChecksumError::UnsupportedAlgorithm {
            algorithm: format!("blake2s with {} byte output", digest_size),
        })?;
        Ok(Self { state, digest_size })
    }
}

impl DigestAlgorithm for Blake2sDigest {
    fn name(&self) -> &str {
        "blake2s"
    }

    fn update(&mut self, data: &[u8]) {
        Update::update(&mut self.state, data);
    }

    fn finalize(self: Box<Self>) -> Vec<u8> {
        self.state.finalize_boxed().into_vec()
    }

    fn block_size(&self) -> usize {
        64
    }

    fn digest_size(&self) -> usize {
        self.digest_size
    }
}

/// Clamp a requested BLAKE2b digest size into [16, 64]
pub fn clamp_blake2b_size(requested: usize) -> usize {
    let clamped = requested.clamp(MIN_DIGEST_SIZE, MAX_BLAKE2B_DIGEST_SIZE);
    if clamped != requested {
        tracing::debug!(requested, clamped, "blake2b digest size clamped");
    }
    clamped
}

/// Clamp a requested BLAKE2s digest size into [16, 32]
pub fn clamp_blake2s_size(requested: usize) -> usize {
    let clamped = requested.clamp(MIN_DIGEST_SIZE, MAX_BLAKE2S_DIGEST_SIZE);
    if clamped != requested {
        tracing::debug!(requested, clamped, "blake2s digest size clamped");
    }
    clamped
}

/// Fixed-output algorithms selectable by name
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum FixedAlgorithm {
    Md5,
    Sha1,
    Sha224,
    Sha256,
    Sha384,
    Sha512,
    #[serde(rename = "sha3-224")]
    Sha3_224,
    #[serde(rename = "sha3-256")]
    Sha3_256,
    #[serde(rename = "sha3-384")]
    Sha3_384,
    #[serde(rename = "sha3-512")]
    Sha3_512,
    Blake3,
}

impl FixedAlgorithm {
    pub const ALL: [FixedAlgorithm; 11] = [
        FixedAlgorithm::Md5,
        FixedAlgorithm::Sha1,
        FixedAlgorithm::Sha224,
        FixedAlgorithm::Sha256,
        FixedAlgorithm::Sha384,
        FixedAlgorithm::Sha512,
        FixedAlgorithm::Sha3_224,
        FixedAlgorithm::Sha3_256,
        FixedAlgorithm::Sha3_384,
        FixedAlgorithm::Sha3_512,
        FixedAlgorithm::Blake3,
    ];

    /// Look up an algorithm by name, case-insensitive, dashed aliases accepted
    pub fn from_name(name: &str) -> Option<Self> {
        let lower = name.to_ascii_lowercase();
        let algorithm = match lower.as_str() {
            "md5" => FixedAlgorithm::Md5,
            "sha1" | "sha-1" => FixedAlgorithm::Sha1,
            "sha224" | "sha-224" => FixedAlgorithm::Sha224,
            "sha256" | "sha-256" => FixedAlgorithm::Sha256,
            "sha384" | "sha-384" => FixedAlgorithm::Sha384,
            "sha512" | "sha-512" => FixedAlgorithm::Sha512,
            "sha3-224" | "sha3_224" => FixedAlgorithm::Sha3_224,
            "sha3-256" | "sha3_256" => FixedAlgorithm::Sha3_256,
            "sha3-384" | "sha3_384" => FixedAlgorithm::Sha3_384,
            "sha3-512" | "sha3_512" => FixedAlgorithm::Sha3_512,
            "blake3" => FixedAlgorithm::Blake3,
            _ => return None,
        };
        Some(algorithm)
    }

    pub fn name(self) -> &'static str {
        match self {
            FixedAlgorithm::Md5 => "md5",
            FixedAlgorithm::Sha1 => "sha1",
            FixedAlgorithm::Sha224 => "sha224",
            FixedAlgorithm::Sha256 => "sha256",
            FixedAlgorithm::Sha384 => "sha384",
            FixedAlgorithm::Sha512 => "sha512",
            FixedAlgorithm::Sha3_224 => "sha3-224",
            FixedAlgorithm::Sha3_256 => "sha3-256",
            FixedAlgorithm::Sha3_384 => "sha3-384",
            FixedAlgorithm::Sha3_512 => "sha3-512",
            FixedAlgorithm::Blake3 => "blake3",
        }
    }

    pub fn create(self) -> Box<dyn DigestAlgorithm> {
        match self {
            FixedAlgorithm::Md5 => Box::new(Md5Digest::new()),
            FixedAlgorithm::Sha1 => Box::new(Sha1Digest::new()),
            FixedAlgorithm::Sha224 => Box::new(Sha224Digest::new()),
            FixedAlgorithm::Sha256 => Box::new(Sha256Digest::new()),
            FixedAlgorithm::Sha384 => Box::new(Sha384Digest::new()),
            FixedAlgorithm::Sha512 => Box::new(Sha512Digest::new()),
            FixedAlgorithm::Sha3_224 => Box::new(Sha3_224Digest::new()),
            FixedAlgorithm::Sha3_256 => Box::new(Sha3_256Digest::new()),
            FixedAlgorithm::Sha3_384 => Box::new(Sha3_384Digest::new()),
            FixedAlgorithm::Sha3_512 => Box::new(Sha3_512Digest::new()),
            FixedAlgorithm::Blake3 => Box::new(Blake3Digest::new()),
        }
    }
}

/// The algorithm selected for a run
///
/// Passed explicitly into every hashing call; nothing holds a
/// process-wide "current algorithm".
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AlgorithmChoice {
    /// BLAKE2b with variable output; size is clamped into [16, 64] at creation
    Blake2b { digest_size: usize },
    /// BLAKE2s with variable output; size is clamped into [16, 32] at creation
    Blake2s { digest_size: usize },
    Fixed(FixedAlgorithm),
}

impl AlgorithmChoice {
    pub fn blake2b(digest_size: usize) -> Self {
        AlgorithmChoice::Blake2b {
            digest_size: clamp_blake2b_size(digest_size),
        }
    }

    pub fn blake2s(digest_size: usize) -> Self {
        AlgorithmChoice::Blake2s {
            digest_size: clamp_blake2s_size(digest_size),
        }
    }

    /// BLAKE2b on 64-bit targets, BLAKE2s elsewhere
    pub fn native_blake2(digest_size: usize) -> Self {
        if cfg!(target_pointer_width = "64") {
            Self::blake2b(digest_size)
        } else {
            Self::blake2s(digest_size)
        }
    }

    /// Resolve a configured algorithm name
    /// `digest_size` only applies to the variable-length algorithms
    pub fn from_name(name: &str, digest_size: usize) -> Result<Self> {
        match name.to_ascii_lowercase().as_str() {
            "blake2b" => Ok(Self::blake2b(digest_size)),
            "blake2" => Ok(Self::native_blake2(digest_size)),
            "blake2s" => Ok(Self::blake2s(digest_size)),
            _ => FixedAlgorithm::from_name(name)
                .map(AlgorithmChoice::Fixed)
                .ok_or_else(|| ChecksumError::UnsupportedAlgorithm {
                    algorithm: name.to_string(),
                }),
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            AlgorithmChoice::Blake2b { .. } => "blake2b",
            AlgorithmChoice::Blake2s { .. } => "blake2s",
            AlgorithmChoice::Fixed(fixed) => fixed.name(),
        }
    }

    /// Effective output size in bytes
    pub fn digest_size(&self) -> usize {
        match self {
            AlgorithmChoice::Blake2b { digest_size } => clamp_blake2b_size(*digest_size),
            AlgorithmChoice::Blake2s { digest_size } => clamp_blake2s_size(*digest_size),
            AlgorithmChoice::Fixed(fixed) => fixed.create().digest_size(),
        }
    }
}

impl Default for AlgorithmChoice {
    fn default() -> Self {
        AlgorithmChoice::blake2b(MAX_BLAKE2B_DIGEST_SIZE)
    }
}

impl AlgorithmFactory for AlgorithmChoice {
    fn create(&self) -> Result<Box<dyn DigestAlgorithm>> {
        match *self {
            AlgorithmChoice::Blake2b { digest_size } => Ok(Box::new(Blake2bDigest::new(digest_size)?)),
            AlgorithmChoice::Blake2s { digest_size } => Ok(Box::new(Blake2sDigest::new(digest_size)?)),
            AlgorithmChoice::Fixed(fixed) => Ok(fixed.create()),
        }
    }
}

/// Registry of every algorithm name the tool understands
pub struct AlgorithmRegistry;

impl AlgorithmRegistry {
    /// List all available hash algorithms
    pub fn list() -> Vec<AlgorithmInfo> {
        let mut algorithms = vec![
            AlgorithmInfo {
                name: "blake2b",
                block_size: 128,
                digest_size: MAX_BLAKE2B_DIGEST_SIZE,
                variable_length: true,
            },
            AlgorithmInfo {
                name: "blake2s",
                block_size: 64,
                digest_size: MAX_BLAKE2S_DIGEST_SIZE,
                variable_length: true,
            },
        ];

        algorithms.extend(FixedAlgorithm::ALL.iter().map(|fixed| {
            let instance = fixed.create();
            AlgorithmInfo {
                name: fixed.name(),
                block_size: instance.block_size(),
                digest_size: instance.digest_size(),
                variable_length: false,
            }
        }));

        algorithms
    }

    /// Check whether a name resolves to a supported algorithm
    pub fn is_supported(name: &str) -> bool {
        AlgorithmChoice::from_name(name, MAX_BLAKE2B_DIGEST_SIZE).is_ok()
    }
}
