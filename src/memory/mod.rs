//! File-backed memory store for core (persona) and user facts.
//!
//! Two JSON files back the store:
//! - `core_memory.json` — persona facts, provisioned at deploy time, never
//!   written by the running service.
//! - `user_memory.json` — facts about the user, appended to over time. The
//!   writable copy lives under a configurable directory; a read-only seed file
//!   beside the deployed code supplies initial content until the first write.

pub mod prompt;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::config::Config;

pub const CORE_MEMORY_FILE: &str = "core_memory.json";
pub const USER_MEMORY_FILE: &str = "user_memory.json";

/// Errors from reading or writing persisted memory.
///
/// A missing file is never an error — it reads as an empty record.
#[derive(Debug)]
pub enum MemoryError {
    /// The file exists but its content is not valid for the expected shape.
    Malformed { path: PathBuf, detail: String },
    /// An underlying filesystem read/write failed.
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
}

impl std::fmt::Display for MemoryError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            MemoryError::Malformed { path, detail } => {
                write!(f, "malformed memory file {}: {}", path.display(), detail)
            }
            MemoryError::Io { path, source } => {
                write!(f, "memory file I/O on {}: {}", path.display(), source)
            }
        }
    }
}

impl std::error::Error for MemoryError {}

/// Value shape allowed for a core-memory entry: plain text or an ordered list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum CoreValue {
    Text(String),
    List(Vec<String>),
}

/// Core memory record: insertion-ordered persona facts.
pub type CoreMemory = IndexMap<String, CoreValue>;

/// User memory record. `facts` is ordered and duplicate-free; any other
/// top-level keys present in the file are carried through rewrites untouched.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct UserMemory {
    #[serde(default)]
    pub facts: Vec<String>,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

/// Fallback rule for the user-memory read source.
///
/// The writable file is authoritative once it exists; before that the seed
/// (if present) supplies initial content. When neither exists the writable
/// path is still the answer — it names where the first write will land.
/// The existence check is injected so the rule is testable without a
/// filesystem.
pub fn resolve_user_source<'a, F>(writable: &'a Path, seed: &'a Path, exists: F) -> &'a Path
where
    F: Fn(&Path) -> bool,
{
    if exists(writable) {
        writable
    } else if exists(seed) {
        seed
    } else {
        writable
    }
}

/// Handle over the two memory files. Constructed once at startup with
/// explicit paths and shared by reference; no global file state.
pub struct MemoryStore {
    core_path: PathBuf,
    seed_path: PathBuf,
    writable_path: PathBuf,
}

impl MemoryStore {
    pub fn new(core_path: PathBuf, seed_path: PathBuf, writable_path: PathBuf) -> Self {
        Self {
            core_path,
            seed_path,
            writable_path,
        }
    }

    /// Core and seed files sit beside the deployed code; the writable user
    /// file goes under the configured memory directory.
    pub fn from_config(config: &Config) -> Self {
        Self::new(
            PathBuf::from(CORE_MEMORY_FILE),
            PathBuf::from(USER_MEMORY_FILE),
            config.memory_dir.join(USER_MEMORY_FILE),
        )
    }

    pub fn writable_path(&self) -> &Path {
        &self.writable_path
    }

    /// Current read source for user memory per the fallback rule.
    pub fn user_source(&self) -> &Path {
        resolve_user_source(&self.writable_path, &self.seed_path, |p| p.exists())
    }

    pub fn load_core(&self) -> Result<CoreMemory, MemoryError> {
        read_json(&self.core_path)
    }

    /// Not exercised by the request path (core memory is provisioning-time
    /// data); kept so provisioning and tests go through the same code.
    pub fn save_core(&self, core: &CoreMemory) -> Result<(), MemoryError> {
        write_json(&self.core_path, core)
    }

    pub fn load_user(&self) -> Result<UserMemory, MemoryError> {
        read_json(self.user_source())
    }

    /// Full-record overwrite of the writable file — never the seed.
    pub fn save_user(&self, user: &UserMemory) -> Result<(), MemoryError> {
        write_json(&self.writable_path, user)
    }

    /// Append `fact` to user memory unless an identical fact is already
    /// stored. Load-modify-save without locking: two concurrent saves race
    /// last-writer-wins on the full-record overwrite. Known limitation,
    /// matching the single-writer deployment this service targets.
    pub fn add_user_fact(&self, fact: &str) -> Result<(), MemoryError> {
        let mut user = self.load_user()?;
        if !user.facts.iter().any(|f| f == fact) {
            user.facts.push(fact.to_string());
        }
        self.save_user(&user)
    }
}

/// Read and parse a JSON file; a missing file yields the default (empty)
/// record, anything unparsable is surfaced as `Malformed`.
fn read_json<T>(path: &Path) -> Result<T, MemoryError>
where
    T: serde::de::DeserializeOwned + Default,
{
    if !path.exists() {
        return Ok(T::default());
    }
    let text = fs::read_to_string(path).map_err(|e| MemoryError::Io {
        path: path.to_path_buf(),
        source: e,
    })?;
    serde_json::from_str(&text).map_err(|e| MemoryError::Malformed {
        path: path.to_path_buf(),
        detail: e.to_string(),
    })
}

fn write_json<T: Serialize>(path: &Path, value: &T) -> Result<(), MemoryError> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent).map_err(|e| MemoryError::Io {
                path: parent.to_path_buf(),
                source: e,
            })?;
        }
    }
    let text = serde_json::to_string_pretty(value).map_err(|e| MemoryError::Malformed {
        path: path.to_path_buf(),
        detail: e.to_string(),
    })?;
    fs::write(path, text).map_err(|e| MemoryError::Io {
        path: path.to_path_buf(),
        source: e,
    })
}
