use crate::error::{Result, RetextError};
use figment::{
    providers::{Format, Toml},
    Figment,
};
use serde::Deserialize;
use std::collections::HashMap;
use std::fmt;
use std::path::PathBuf;

/// The shared trigger → expansion lookup table.
///
/// Immutable once published: a reload builds a fresh dictionary and swaps
/// the `Arc` held by the engine, so readers never observe a partially
/// populated map.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReplacementDictionary {
    entries: HashMap<String, String>,
}

impl ReplacementDictionary {
    pub fn from_pairs<I, K, V>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        let entries = pairs
            .into_iter()
            .map(|(k, v)| (k.into(), v.into()))
            .collect();
        Self { entries }
    }

    /// Exact, case-sensitive lookup.
    pub fn get(&self, trigger: &str) -> Option<&str> {
        self.entries.get(trigger).map(String::as_str)
    }

    #[allow(dead_code)]
    pub fn contains(&self, trigger: &str) -> bool {
        self.entries.contains_key(trigger)
    }

    #[allow(dead_code)]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl fmt::Display for ReplacementDictionary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} replacement(s)", self.entries.len())
    }
}

/// Produces the replacement dictionary at startup and on explicit reloads.
/// The on-disk/on-the-wire shape is this trait's responsibility, not the
/// engine's.
pub trait ReplacementSource: Send + Sync {
    fn load(&self) -> Result<ReplacementDictionary>;

    /// Human-readable origin for logging.
    fn describe(&self) -> String;
}

#[derive(Debug, Deserialize)]
struct ReplacementFile {
    #[serde(default)]
    replacements: HashMap<String, String>,
}

/// Loads the dictionary from a TOML file with a `[replacements]` table.
pub struct FileSource {
    path: PathBuf,
}

impl FileSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl ReplacementSource for FileSource {
    fn load(&self) -> Result<ReplacementDictionary> {
        if !self.path.exists() {
            return RetextError::data_source(format!(
                "Replacement file not found: {}",
                self.path.display()
            ));
        }

        let file: ReplacementFile = Figment::new()
            .merge(Toml::file(&self.path))
            .extract()
            .map_err(|e| {
                RetextError::DataSource(format!(
                    "Failed to parse {}: {}",
                    self.path.display(),
                    e
                ))
            })?;

        Ok(ReplacementDictionary::from_pairs(file.replacements))
    }

    fn describe(&self) -> String {
        self.path.display().to_string()
    }
}

/// A fixed in-memory dictionary, used by dry-run mode and tests.
pub struct StaticSource {
    dictionary: ReplacementDictionary,
}

impl StaticSource {
    pub fn new(dictionary: ReplacementDictionary) -> Self {
        Self { dictionary }
    }
}

impl ReplacementSource for StaticSource {
    fn load(&self) -> Result<ReplacementDictionary> {
        Ok(self.dictionary.clone())
    }

    fn describe(&self) -> String {
        "static".to_string()
    }
}
