// Compare engine module
// Classifies a run's digests against a saved baseline

use std::path::{Path, PathBuf};

use serde::Serialize;

use super::mapping::{Baseline, ChecksumMapping};

/// Classification of one file from the current run
/// Digests are stored lowercased
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "verdict", rename_all = "snake_case")]
pub enum ComparisonVerdict {
    Match {
        path: PathBuf,
        digest: String,
    },
    Altered {
        path: PathBuf,
        old_digest: String,
        new_digest: String,
    },
    New {
        path: PathBuf,
        digest: String,
    },
}

impl ComparisonVerdict {
    pub fn path(&self) -> &Path {
        match self {
            ComparisonVerdict::Match { path, .. }
            | ComparisonVerdict::Altered { path, .. }
            | ComparisonVerdict::New { path, .. } => path,
        }
    }

    /// Digest from the current run
    pub fn digest(&self) -> &str {
        match self {
            ComparisonVerdict::Match { digest, .. } | ComparisonVerdict::New { digest, .. } => digest,
            ComparisonVerdict::Altered { new_digest, .. } => new_digest,
        }
    }

    pub fn is_match(&self) -> bool {
        matches!(self, ComparisonVerdict::Match { .. })
    }
}

/// Lazy verdict sequence in the order the current mapping was produced
///
/// Cloning yields an independent cursor, so the sequence can be restarted.
#[derive(Clone)]
pub struct Verdicts<'a> {
    current: std::slice::Iter<'a, (PathBuf, String)>,
    baseline: &'a Baseline,
}

impl Iterator for Verdicts<'_> {
    type Item = ComparisonVerdict;

    fn next(&mut self) -> Option<ComparisonVerdict> {
        let (path, digest) = self.current.next()?;
        let digest = normalize_digest(digest);

        let verdict = match self.baseline.get(path) {
            Some(previous) => {
                let previous = normalize_digest(previous);
                if previous == digest {
                    ComparisonVerdict::Match {
                        path: path.clone(),
                        digest,
                    }
                } else {
                    ComparisonVerdict::Altered {
                        path: path.clone(),
                        old_digest: previous,
                        new_digest: digest,
                    }
                }
            }
            None => ComparisonVerdict::New {
                path: path.clone(),
                digest,
            },
        };

        Some(verdict)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.current.size_hint()
    }
}

impl ExactSizeIterator for Verdicts<'_> {}

/// Comparison of a run against a baseline
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CompareReport {
    /// One verdict per path in the current run, in run order
    pub verdicts: Vec<ComparisonVerdict>,
    /// Paths present only in the baseline, sorted
    pub deleted: Vec<PathBuf>,
}

impl CompareReport {
    pub fn matches(&self) -> usize {
        self.count(|v| matches!(v, ComparisonVerdict::Match { .. }))
    }

    pub fn altered(&self) -> usize {
        self.count(|v| matches!(v, ComparisonVerdict::Altered { .. }))
    }

    pub fn new_files(&self) -> usize {
        self.count(|v| matches!(v, ComparisonVerdict::New { .. }))
    }

    /// True when anything was altered, added or deleted
    pub fn has_changes(&self) -> bool {
        !self.deleted.is_empty() || self.verdicts.iter().any(|v| !v.is_match())
    }

    fn count(&self, predicate: impl Fn(&ComparisonVerdict) -> bool) -> usize {
        self.verdicts.iter().filter(|v| predicate(v)).count()
    }

    /// Format the report as a JSON string
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        #[derive(Serialize)]
        struct Summary {
            matches: usize,
            altered: usize,
            new: usize,
            deleted: usize,
        }

        #[derive(Serialize)]
        struct JsonOutput<'a> {
            timestamp: String,
            summary: Summary,
            verdicts: &'a [ComparisonVerdict],
            deleted: &'a [PathBuf],
        }

        let output = JsonOutput {
            timestamp: chrono::Utc::now().to_rfc3339(),
            summary: Summary {
                matches: self.matches(),
                altered: self.altered(),
                new: self.new_files(),
                deleted: self.deleted.len(),
            },
            verdicts: &self.verdicts,
            deleted: &self.deleted,
        };

        serde_json::to_string_pretty(&output)
    }
}

/// Classifies current digests against a baseline
pub struct Comparator;

impl Comparator {
    /// Lazily classify every entry of `current`
    pub fn verdicts<'a>(current: &'a ChecksumMapping, baseline: &'a Baseline) -> Verdicts<'a> {
        Verdicts {
            current: current.entries().iter(),
            baseline,
        }
    }

    /// Classify every entry of `current` as Match, Altered or New
    ///
    /// Paths that exist only in the baseline produce no verdict here;
    /// see [`Comparator::deleted`].
    pub fn compare(current: &ChecksumMapping, baseline: &Baseline) -> Vec<ComparisonVerdict> {
        Self::verdicts(current, baseline).collect()
    }

    /// Baseline paths missing from the current run, sorted
    pub fn deleted(current: &ChecksumMapping, baseline: &Baseline) -> Vec<PathBuf> {
        let mut deleted: Vec<PathBuf> = baseline
            .iter()
            .filter(|(path, _)| !current.contains(path))
            .map(|(path, _)| path.to_path_buf())
            .collect();
        deleted.sort();
        deleted
    }

    /// Verdicts plus the deleted-file list
    pub fn report(current: &ChecksumMapping, baseline: &Baseline) -> CompareReport {
        CompareReport {
            verdicts: Self::compare(current, baseline),
            deleted: Self::deleted(current, baseline),
        }
    }
}

/// Digests compare case-insensitively
pub fn normalize_digest(digest: &str) -> String {
    digest.to_ascii_lowercase()
}
