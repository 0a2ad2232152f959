// Checksum core
// Enumeration, streaming digests, size caps, baselines and comparison

pub mod algorithm;
pub mod baseline;
pub mod compare;
pub mod engine;
pub mod error;
pub mod hash;
pub mod mapping;
pub mod size_guard;
pub mod walker;

// Re-export commonly used types for convenience
pub use algorithm::{AlgorithmChoice, AlgorithmFactory, AlgorithmInfo, AlgorithmRegistry, DigestAlgorithm, FixedAlgorithm};
pub use baseline::BaselineStore;
pub use compare::{CompareReport, Comparator, ComparisonVerdict, Verdicts};
pub use engine::{ChecksumEngine, ScanOutcome, ScanProgress, ScanStats};
pub use error::ChecksumError;
pub use hash::HashComputer;
pub use mapping::{Baseline, ChecksumMapping, ChecksumRecord};
pub use size_guard::{SizeGuard, SizeVerdict};
pub use walker::FileEnumerator;
