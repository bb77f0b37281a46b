// ── Result store ──
//
// Durable history of snapshots (and exported documents) as one pretty
// JSON file per save, named `{namespace}_{YYYYmmdd_HHMMSS}.json` in UTC.
// Files are created exclusively: a second save within the same second
// fails instead of overwriting.

use std::fs::{self, OpenOptions};
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};

use chrono::{DateTime, NaiveDateTime, Utc};
use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::debug;

use crate::error::CoreError;
use crate::model::HealthSnapshot;

const TIMESTAMP_FORMAT: &str = "%Y%m%d_%H%M%S";
/// Length of a formatted timestamp (`20250101_120000`).
const TIMESTAMP_LEN: usize = 15;
const EXTENSION: &str = "json";

/// One saved document in the store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HistoryEntry {
    pub namespace: String,
    pub timestamp: DateTime<Utc>,
    pub path: PathBuf,
}

impl HistoryEntry {
    /// Read and deserialize the document.
    pub fn load_as<T: DeserializeOwned>(&self) -> Result<T, CoreError> {
        let raw = fs::read_to_string(&self.path).map_err(|e| CoreError::storage(&self.path, e))?;
        Ok(serde_json::from_str(&raw)?)
    }

    pub fn load(&self) -> Result<HealthSnapshot, CoreError> {
        self.load_as()
    }
}

/// Timestamped JSON history rooted at one directory.
#[derive(Debug, Clone)]
pub struct ResultStore {
    root: PathBuf,
}

impl ResultStore {
    /// The directory is created lazily on first save.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Persist `snapshot` under `namespace`, named by its own timestamp.
    pub fn save(&self, namespace: &str, snapshot: &HealthSnapshot) -> Result<PathBuf, CoreError> {
        self.save_document(namespace, snapshot, snapshot.timestamp)
    }

    /// Persist any serializable document under `namespace` at time `at`.
    pub fn save_document<T: Serialize + ?Sized>(
        &self,
        namespace: &str,
        value: &T,
        at: DateTime<Utc>,
    ) -> Result<PathBuf, CoreError> {
        validate_namespace(namespace)?;
        fs::create_dir_all(&self.root).map_err(|e| CoreError::storage(&self.root, e))?;

        let path = self.root.join(file_name(namespace, at));
        let mut json = serde_json::to_string_pretty(value)?;
        json.push('\n');

        let mut file = OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(&path)
            .map_err(|e| {
                if e.kind() == ErrorKind::AlreadyExists {
                    CoreError::SnapshotExists { path: path.clone() }
                } else {
                    CoreError::storage(&path, e)
                }
            })?;
        file.write_all(json.as_bytes())
            .map_err(|e| CoreError::storage(&path, e))?;

        debug!(path = %path.display(), "saved document");
        Ok(path)
    }

    /// Every entry saved under `namespace`, newest first.
    ///
    /// A missing root directory is an empty history. Files that do not
    /// follow the naming scheme are ignored.
    pub fn entries(&self, namespace: &str) -> Result<Vec<HistoryEntry>, CoreError> {
        validate_namespace(namespace)?;
        let dir = match fs::read_dir(&self.root) {
            Ok(dir) => dir,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(CoreError::storage(&self.root, e)),
        };

        let mut entries = Vec::new();
        for item in dir {
            let item = item.map_err(|e| CoreError::storage(&self.root, e))?;
            let path = item.path();
            if let Some(timestamp) = parse_file_name(&path, namespace) {
                entries.push(HistoryEntry {
                    namespace: namespace.to_owned(),
                    timestamp,
                    path,
                });
            }
        }

        entries.sort_by(|a, b| {
            b.timestamp
                .cmp(&a.timestamp)
                .then_with(|| b.path.cmp(&a.path))
        });
        Ok(entries)
    }

    /// Lazily load snapshots saved under `namespace`, newest first.
    ///
    /// Each item reads its file when pulled; take the first N for the
    /// most recent N snapshots.
    pub fn load_history(
        &self,
        namespace: &str,
    ) -> Result<impl Iterator<Item = Result<HealthSnapshot, CoreError>> + use<>, CoreError> {
        let entries = self.entries(namespace)?;
        Ok(entries.into_iter().map(|entry| entry.load()))
    }
}

fn validate_namespace(namespace: &str) -> Result<(), CoreError> {
    let valid = !namespace.is_empty()
        && namespace
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_');
    if valid {
        Ok(())
    } else {
        Err(CoreError::InvalidNamespace {
            namespace: namespace.to_owned(),
        })
    }
}

fn file_name(namespace: &str, at: DateTime<Utc>) -> String {
    format!("{namespace}_{}.{EXTENSION}", at.format(TIMESTAMP_FORMAT))
}

/// Timestamp of `path` if it is `{namespace}_{timestamp}.json` exactly.
fn parse_file_name(path: &Path, namespace: &str) -> Option<DateTime<Utc>> {
    if path.extension()? != EXTENSION {
        return None;
    }
    let stem = path.file_stem()?.to_str()?;
    let split = stem.len().checked_sub(TIMESTAMP_LEN)?;
    let (prefix, timestamp) = stem.split_at_checked(split)?;
    if prefix.strip_suffix('_')? != namespace {
        return None;
    }
    NaiveDateTime::parse_from_str(timestamp, TIMESTAMP_FORMAT)
        .ok()
        .map(|naive| naive.and_utc())
}
