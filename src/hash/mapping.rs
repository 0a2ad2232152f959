// Checksum mapping module
// Ordered path -> digest maps produced by a run and loaded as baselines

use std::collections::HashMap;
use std::fmt;
use std::path::{Path, PathBuf};

use serde::de::{self, MapAccess, Visitor};
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// One file's result from a run; `digest` is None when the file was skipped
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ChecksumRecord {
    pub path: PathBuf,
    pub digest: Option<String>,
}

impl ChecksumRecord {
    pub fn new(path: PathBuf, digest: Option<String>) -> Self {
        Self { path, digest }
    }
}

/// Path -> hex digest, kept in insertion order
///
/// Inserting a path that is already present replaces its digest in place
/// (last write wins) and keeps its original position.
#[derive(Debug, Clone, Default)]
pub struct ChecksumMapping {
    entries: Vec<(PathBuf, String)>,
    index: HashMap<PathBuf, usize>,
}

impl ChecksumMapping {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a mapping from run records, omitting skipped files
    pub fn from_records<I>(records: I) -> Self
    where
        I: IntoIterator<Item = ChecksumRecord>,
    {
        records
            .into_iter()
            .filter_map(|record| record.digest.map(|digest| (record.path, digest)))
            .collect()
    }

    /// Insert a digest, returning the digest it replaced
    pub fn insert(&mut self, path: PathBuf, digest: String) -> Option<String> {
        match self.index.get(&path) {
            Some(&position) => Some(std::mem::replace(&mut self.entries[position].1, digest)),
            None => {
                self.index.insert(path.clone(), self.entries.len());
                self.entries.push((path, digest));
                None
            }
        }
    }

    pub fn get(&self, path: &Path) -> Option<&str> {
        self.index
            .get(path)
            .map(|&position| self.entries[position].1.as_str())
    }

    pub fn contains(&self, path: &Path) -> bool {
        self.index.contains_key(path)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn entries(&self) -> &[(PathBuf, String)] {
        &self.entries
    }

    pub fn iter(&self) -> impl Iterator<Item = (&Path, &str)> + '_ {
        self.entries
            .iter()
            .map(|(path, digest)| (path.as_path(), digest.as_str()))
    }

    pub fn paths(&self) -> impl Iterator<Item = &Path> + '_ {
        self.entries.iter().map(|(path, _)| path.as_path())
    }
}

/// Equal when both hold the same entries in the same order
impl PartialEq for ChecksumMapping {
    fn eq(&self, other: &Self) -> bool {
        self.entries == other.entries
    }
}

impl Eq for ChecksumMapping {}

impl FromIterator<(PathBuf, String)> for ChecksumMapping {
    fn from_iter<T: IntoIterator<Item = (PathBuf, String)>>(iter: T) -> Self {
        let mut mapping = ChecksumMapping::new();
        for (path, digest) in iter {
            mapping.insert(path, digest);
        }
        mapping
    }
}

impl IntoIterator for ChecksumMapping {
    type Item = (PathBuf, String);
    type IntoIter = std::vec::IntoIter<(PathBuf, String)>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.into_iter()
    }
}

// Serialized as a flat JSON object in entry order
impl Serialize for ChecksumMapping {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (path, digest) in &self.entries {
            map.serialize_entry(&path.to_string_lossy(), digest)?;
        }
        map.end()
    }
}

impl<'de> Deserialize<'de> for ChecksumMapping {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct MappingVisitor;

        impl<'de> Visitor<'de> for MappingVisitor {
            type Value = ChecksumMapping;

            fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
                f.write_str("an object mapping file paths to digest strings")
            }

            fn visit_map<A: MapAccess<'de>>(self, mut access: A) -> Result<Self::Value, A::Error> {
                let mut mapping = ChecksumMapping::new();
                while let Some((path, digest)) = access.next_entry::<String, String>()? {
                    if path.is_empty() {
                        return Err(de::Error::custom("file path cannot be empty"));
                    }
                    mapping.insert(PathBuf::from(path), digest);
                }
                Ok(mapping)
            }
        }

        deserializer.deserialize_map(MappingVisitor)
    }
}

/// A mapping loaded from disk to compare against; read-only
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Baseline {
    mapping: ChecksumMapping,
}

impl Baseline {
    pub fn new(mapping: ChecksumMapping) -> Self {
        Self { mapping }
    }

    pub fn get(&self, path: &Path) -> Option<&str> {
        self.mapping.get(path)
    }

    pub fn contains(&self, path: &Path) -> bool {
        self.mapping.contains(path)
    }

    pub fn len(&self) -> usize {
        self.mapping.len()
    }

    pub fn is_empty(&self) -> bool {
        self.mapping.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&Path, &str)> + '_ {
        self.mapping.iter()
    }

    pub fn as_mapping(&self) -> &ChecksumMapping {
        &self.mapping
    }

    pub fn into_mapping(self) -> ChecksumMapping {
        self.mapping
    }
}

impl From<ChecksumMapping> for Baseline {
    fn from(mapping: ChecksumMapping) -> Self {
        Baseline::new(mapping)
    }
}
