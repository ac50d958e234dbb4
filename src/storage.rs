use std::collections::HashMap;
use std::fs::{self, File};
use std::io::{self, Write};
use std::path::{Path, PathBuf};

/// Rough equivalent of a browser per-origin storage budget. `FileStore`
/// enforces it best-effort so a write that would blow the budget is rejected
/// instead of silently growing without bound.
pub const DEFAULT_CAPACITY_BYTES: u64 = 5 * 1024 * 1024;

#[derive(Debug, PartialEq, Eq)]
pub enum KvError {
    /// The write was rejected because it would exceed the storage budget.
    QuotaExceeded,
    /// The store cannot be used at all (missing, read-only, policy-disabled).
    Unavailable(String),
}

impl std::fmt::Display for KvError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            KvError::QuotaExceeded => write!(f, "storage quota exceeded"),
            KvError::Unavailable(detail) => write!(f, "storage unavailable: {detail}"),
        }
    }
}

impl std::error::Error for KvError {}

/// Durable string-keyed storage. `get` treats every failure as absence;
/// `set` distinguishes a full store from a broken one; `remove` is
/// best-effort and never fails.
pub trait KeyValueStore {
    fn get(&self, key: &str) -> Option<String>;
    fn set(&mut self, key: &str, value: &str) -> Result<(), KvError>;
    fn remove(&mut self, key: &str);
}

fn classify_io(err: &io::Error) -> KvError {
    match err.kind() {
        io::ErrorKind::StorageFull | io::ErrorKind::QuotaExceeded => KvError::QuotaExceeded,
        _ => KvError::Unavailable(err.to_string()),
    }
}

/// File-backed store: one file per key under `root`, written atomically
/// (temp file then rename) so a crash mid-write never corrupts a value.
pub struct FileStore {
    root: PathBuf,
    capacity: Option<u64>,
}

impl FileStore {
    pub fn new(root: PathBuf) -> Self {
        Self {
            root,
            capacity: Some(DEFAULT_CAPACITY_BYTES),
        }
    }

    pub fn with_capacity(root: PathBuf, capacity: Option<u64>) -> Self {
        Self { root, capacity }
    }

    fn key_path(&self, key: &str) -> PathBuf {
        self.root.join(key)
    }

    /// Total bytes held by other keys; the file being replaced does not count
    /// against the budget since its bytes are reclaimed by the write.
    fn used_bytes(&self, excluding: &Path) -> u64 {
        let Ok(entries) = fs::read_dir(&self.root) else {
            return 0;
        };
        entries
            .filter_map(|entry| entry.ok())
            .filter(|entry| entry.path() != excluding)
            .filter_map(|entry| entry.metadata().ok())
            .filter(|meta| meta.is_file())
            .map(|meta| meta.len())
            .sum()
    }

    fn write_atomic(path: &Path, value: &str) -> io::Result<()> {
        let temp_path = path.with_extension("tmp");
        {
            let mut file = File::create(&temp_path)?;
            file.write_all(value.as_bytes())?;
            file.sync_all()?;
        }
        fs::rename(temp_path, path)?;
        Ok(())
    }
}

impl KeyValueStore for FileStore {
    fn get(&self, key: &str) -> Option<String> {
        match fs::read_to_string(self.key_path(key)) {
            Ok(value) => Some(value),
            Err(err) if err.kind() == io::ErrorKind::NotFound => None,
            Err(err) => {
                log::warn!("read of key {key} failed, treating as absent: {err}");
                None
            }
        }
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), KvError> {
        fs::create_dir_all(&self.root).map_err(|err| classify_io(&err))?;
        let path = self.key_path(key);
        if let Some(limit) = self.capacity {
            let projected = self.used_bytes(&path) + value.len() as u64;
            if projected > limit {
                return Err(KvError::QuotaExceeded);
            }
        }
        Self::write_atomic(&path, value).map_err(|err| classify_io(&err))
    }

    fn remove(&mut self, key: &str) {
        if let Err(err) = fs::remove_file(self.key_path(key)) {
            if err.kind() != io::ErrorKind::NotFound {
                log::warn!("remove of key {key} failed: {err}");
            }
        }
    }
}

/// In-process store. Backs unit tests and keeps a session usable when the
/// durable store is unavailable.
#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: HashMap<String, String>,
    capacity: Option<usize>,
    unavailable: bool,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Budget over the sum of stored value lengths, mirroring `FileStore`.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            capacity: Some(capacity),
            ..Self::default()
        }
    }

    /// Simulates storage disabled by platform policy: every write fails.
    pub fn unavailable() -> Self {
        Self {
            unavailable: true,
            ..Self::default()
        }
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Option<String> {
        self.entries.get(key).cloned()
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), KvError> {
        if self.unavailable {
            return Err(KvError::Unavailable("storage disabled".to_string()));
        }
        if let Some(limit) = self.capacity {
            let others: usize = self
                .entries
                .iter()
                .filter(|(k, _)| k.as_str() != key)
                .map(|(_, v)| v.len())
                .sum();
            if others + value.len() > limit {
                return Err(KvError::QuotaExceeded);
            }
        }
        self.entries.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&mut self, key: &str) {
        self.entries.remove(key);
    }
}
