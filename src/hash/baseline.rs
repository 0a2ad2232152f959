// Baseline persistence module
// Reads and writes checksum baselines as pretty-printed JSON objects

use std::ffi::OsString;
use std::fs::File;
use std::io::{BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};

use serde::Serialize;
use serde_json::ser::{PrettyFormatter, Serializer};

use super::error::{ChecksumError, Result};
use super::mapping::{Baseline, ChecksumMapping};

/// Stem of the default baseline file name
pub const BASELINE_STEM: &str = "checksum";

/// Default baseline extension
pub const DEFAULT_EXTENSION: &str = ".json";

/// Handler for reading and writing checksum baselines
pub struct BaselineStore;

impl BaselineStore {
    /// Where a baseline is looked for by default: `<dir>/checksum<extension>`
    /// The extension may be given with or without its leading dot
    pub fn default_path(dir: &Path, extension: &str) -> PathBuf {
        let extension = extension.trim_start_matches('.');
        if extension.is_empty() {
            dir.join(BASELINE_STEM)
        } else {
            dir.join(format!("{}.{}", BASELINE_STEM, extension))
        }
    }

    /// Mark a destination as a checksum baseline
    ///
    /// Names already containing "checksum" (any case) are kept. Other names
    /// get a `-checksum` suffix before the extension: `out.json` becomes
    /// `out-checksum.json`.
    pub fn annotate_path(destination: &Path) -> PathBuf {
        let file_name = match destination.file_name() {
            Some(name) => name.to_string_lossy(),
            None => return destination.join(format!("{}{}", BASELINE_STEM, DEFAULT_EXTENSION)),
        };

        if file_name.to_lowercase().contains(BASELINE_STEM) {
            return destination.to_path_buf();
        }

        let stem = destination
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_default();
        let annotated = match destination.extension() {
            Some(ext) => format!("{}-{}.{}", stem, BASELINE_STEM, ext.to_string_lossy()),
            None => format!("{}-{}", stem, BASELINE_STEM),
        };
        destination.with_file_name(annotated)
    }

    /// Basenames a run over `dir` must exclude so it never hashes its own baseline
    ///
    /// Always includes the default `checksum<extension>` name. `baseline` is the
    /// file actually being written or read; its name is added when it lives
    /// somewhere under `dir`.
    pub fn own_file_names(dir: &Path, extension: &str, baseline: Option<&Path>) -> Vec<OsString> {
        let mut names: Vec<OsString> = Self::default_path(dir, extension)
            .file_name()
            .map(|name| name.to_os_string())
            .into_iter()
            .collect();

        if let Some(path) = baseline {
            if let Some(name) = path.file_name() {
                if Self::is_under(dir, path) && !names.iter().any(|n| n == name) {
                    names.push(name.to_os_string());
                }
            }
        }
        names
    }

    // The baseline may not exist yet, so resolve its parent directory instead
    fn is_under(dir: &Path, path: &Path) -> bool {
        let parent = match path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        };
        match (dir.canonicalize(), parent.canonicalize()) {
            (Ok(dir), Ok(parent)) => parent.starts_with(dir),
            _ => false,
        }
    }

    /// Write the mapping as a JSON object indented by four spaces
    ///
    /// Non-ASCII paths are written as-is. Returns the path actually written,
    /// which differs from `destination` when the name had to be annotated.
    pub fn save(mapping: &ChecksumMapping, destination: &Path) -> Result<PathBuf> {
        let path = Self::annotate_path(destination);

        let file = File::create(&path)
            .map_err(|e| ChecksumError::from_io_error(e, "creating baseline", Some(path.clone())))?;
        let mut writer = BufWriter::new(file);

        let mut serializer = Serializer::with_formatter(&mut writer, PrettyFormatter::with_indent(b"    "));
        mapping
            .serialize(&mut serializer)
            .map_err(|e| ChecksumError::BaselineWriteError {
                path: path.clone(),
                reason: e.to_string(),
            })?;

        writer
            .flush()
            .map_err(|e| ChecksumError::from_io_error(e, "flushing baseline", Some(path.clone())))?;

        tracing::info!(entries = mapping.len(), path = %path.display(), "baseline saved");
        Ok(path)
    }

    /// Load a baseline for comparison
    pub fn load(source: &Path) -> Result<Baseline> {
        Self::load_as_mapping(source).map(Baseline::new)
    }

    /// Load a saved baseline as a plain mapping, e.g. to display or re-save it
    pub fn load_as_mapping(source: &Path) -> Result<ChecksumMapping> {
        let file = File::open(source).map_err(|e| match e.kind() {
            std::io::ErrorKind::NotFound => ChecksumError::BaselineNotFound {
                path: source.to_path_buf(),
            },
            _ => ChecksumError::from_io_error(e, "opening baseline", Some(source.to_path_buf())),
        })?;

        let mapping: ChecksumMapping = serde_json::from_reader(BufReader::new(file)).map_err(|e| {
            if e.is_io() {
                ChecksumError::IoError {
                    path: Some(source.to_path_buf()),
                    operation: "reading baseline".to_string(),
                    source: e.into(),
                }
            } else {
                ChecksumError::BaselineParseError {
                    path: source.to_path_buf(),
                    line: e.line(),
                    reason: e.to_string(),
                }
            }
        })?;

        tracing::debug!(entries = mapping.len(), path = %source.display(), "baseline loaded");
        Ok(mapping)
    }
}
