// Checksum engine module
// Drives the size guard and hasher over a batch of files

use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use rayon::prelude::*;

use super::algorithm::AlgorithmFactory;
use super::error::Result;
use super::hash::HashComputer;
use super::mapping::{ChecksumMapping, ChecksumRecord};
use super::size_guard::{SizeGuard, SizeVerdict};
use super::walker::FileEnumerator;

/// Statistics collected during a run
#[derive(Debug, Clone, Default, PartialEq, serde::Serialize)]
pub struct ScanStats {
    pub files_hashed: usize,
    pub files_oversize: usize,
    pub files_failed: usize,
    pub total_bytes: u64,
    #[serde(serialize_with = "serialize_duration")]
    pub duration: Duration,
}

/// Progress information emitted after each file
#[derive(Debug, Clone, serde::Serialize)]
pub struct ScanProgress {
    pub files_done: usize,
    pub files_total: usize,
    pub current_file: PathBuf,
}

// Helper function to serialize Duration as seconds
fn serialize_duration<S>(duration: &Duration, serializer: S) -> std::result::Result<S::Ok, S::Error>
where
    S: serde::Serializer,
{
    serializer.serialize_f64(duration.as_secs_f64())
}

/// Records in input order plus run statistics
#[derive(Debug, Clone)]
pub struct ScanOutcome {
    pub records: Vec<ChecksumRecord>,
    pub stats: ScanStats,
}

impl ScanOutcome {
    pub fn into_mapping(self) -> ChecksumMapping {
        ChecksumMapping::from_records(self.records)
    }
}

/// Type alias for progress callback function
pub type ProgressCallback = Box<dyn Fn(ScanProgress) + Send + Sync>;

enum FileOutcome {
    Hashed { digest: String, bytes: u64 },
    Oversize,
    Failed,
}

/// Engine that turns a list of files into a checksum mapping
///
/// One oversized or unreadable file never aborts the batch: it is logged,
/// counted and left out of the mapping.
pub struct ChecksumEngine {
    computer: HashComputer,
    parallel: bool,
    progress_callback: Option<Arc<ProgressCallback>>,
}

impl ChecksumEngine {
    /// Create a sequential engine with the default chunk size
    pub fn new() -> Self {
        Self {
            computer: HashComputer::new(),
            parallel: false,
            progress_callback: None,
        }
    }

    /// Hash files on the rayon pool, one file per task
    /// Results are still reported in input order
    pub fn with_parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }

    pub fn with_chunk_blocks(mut self, chunk_blocks: usize) -> Self {
        self.computer = HashComputer::with_chunk_blocks(chunk_blocks);
        self
    }

    /// Set a progress callback function
    pub fn with_progress_callback<F>(mut self, callback: F) -> Self
    where
        F: Fn(ScanProgress) + Send + Sync + 'static,
    {
        self.progress_callback = Some(Arc::new(Box::new(callback)));
        self
    }

    /// Hash every path and build the mapping; skipped files are omitted
    pub fn compute_all<I>(
        &self,
        paths: I,
        algorithm: &dyn AlgorithmFactory,
        cap_mb: Option<f64>,
    ) -> ChecksumMapping
    where
        I: IntoIterator<Item = PathBuf>,
    {
        self.compute_records(paths, algorithm, cap_mb).into_mapping()
    }

    /// Hash every path, keeping one record per input path
    pub fn compute_records<I>(
        &self,
        paths: I,
        algorithm: &dyn AlgorithmFactory,
        cap_mb: Option<f64>,
    ) -> ScanOutcome
    where
        I: IntoIterator<Item = PathBuf>,
    {
        let start_time = Instant::now();
        let paths: Vec<PathBuf> = paths.into_iter().collect();
        let guard = cap_mb.map(SizeGuard::new);
        let done = AtomicUsize::new(0);
        let total = paths.len();

        let process = |path: &PathBuf| {
            let outcome = self.process_file(path, algorithm, guard.as_ref());
            let files_done = done.fetch_add(1, Ordering::Relaxed) + 1;
            if let Some(ref callback) = self.progress_callback {
                callback(ScanProgress {
                    files_done,
                    files_total: total,
                    current_file: path.clone(),
                });
            }
            outcome
        };

        let outcomes: Vec<FileOutcome> = if self.parallel {
            paths.par_iter().map(process).collect()
        } else {
            paths.iter().map(process).collect()
        };

        let mut stats = ScanStats::default();
        let records = paths
            .into_iter()
            .zip(outcomes)
            .map(|(path, outcome)| match outcome {
                FileOutcome::Hashed { digest, bytes } => {
                    stats.files_hashed += 1;
                    stats.total_bytes += bytes;
                    ChecksumRecord::new(path, Some(digest))
                }
                FileOutcome::Oversize => {
                    stats.files_oversize += 1;
                    ChecksumRecord::new(path, None)
                }
                FileOutcome::Failed => {
                    stats.files_failed += 1;
                    ChecksumRecord::new(path, None)
                }
            })
            .collect();
        stats.duration = start_time.elapsed();

        tracing::info!(
            hashed = stats.files_hashed,
            oversize = stats.files_oversize,
            failed = stats.files_failed,
            bytes = stats.total_bytes,
            "checksum run complete"
        );

        ScanOutcome { records, stats }
    }

    /// Enumerate `root` and hash everything found
    pub fn scan_directory<I, S>(
        &self,
        root: &Path,
        exclude: I,
        algorithm: &dyn AlgorithmFactory,
        cap_mb: Option<f64>,
    ) -> Result<ScanOutcome>
    where
        I: IntoIterator<Item = S>,
        S: Into<std::ffi::OsString>,
    {
        let files = FileEnumerator::new(root, exclude)?;
        tracing::info!("Scanning directory: {}", files.root().display());
        Ok(self.compute_records(files, algorithm, cap_mb))
    }

    fn process_file(
        &self,
        path: &Path,
        algorithm: &dyn AlgorithmFactory,
        guard: Option<&SizeGuard>,
    ) -> FileOutcome {
        if let Some(guard) = guard {
            match guard.evaluate(path) {
                Ok(SizeVerdict::Rejected { size_mb }) => {
                    tracing::info!(
                        "Skipping {} ({:.2} MB): only files up to {} MB are processed",
                        path.display(),
                        size_mb,
                        guard.cap_mb()
                    );
                    return FileOutcome::Oversize;
                }
                Ok(SizeVerdict::Allowed { size_mb }) => {
                    tracing::debug!(path = %path.display(), size_mb, "size within cap");
                }
                Err(e) => {
                    tracing::warn!("Failed to stat {}: {}", path.display(), e);
                    return FileOutcome::Failed;
                }
            }
        }

        let instance = match algorithm.create() {
            Ok(instance) => instance,
            Err(e) => {
                tracing::warn!("Failed to initialize digest for {}: {}", path.display(), e);
                return FileOutcome::Failed;
            }
        };

        match self.computer.digest_counted(path, instance) {
            Ok((digest, bytes)) => FileOutcome::Hashed { digest, bytes },
            Err(e) => {
                tracing::warn!("Failed to hash {}: {}", path.display(), e);
                FileOutcome::Failed
            }
        }
    }
}

impl Default for ChecksumEngine {
    fn default() -> Self {
        Self::new()
    }
}
