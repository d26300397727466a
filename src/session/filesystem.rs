use super::storage::TokenStore;
use crate::error::{Result, StockError};
use std::collections::BTreeMap;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use tracing::{debug, warn};

pub const TOKEN_FILE_NAME: &str = "tokens.json";

/// Token store backed by a single JSON object on disk.
///
/// The whole map is rewritten on every mutation. A missing file is an empty
/// store; a corrupt one is treated the same way so a damaged cache never
/// locks the user out of logging in again.
pub struct FilesystemTokenStore {
    path: PathBuf,
    // Serializes read-modify-write cycles within this process.
    lock: Mutex<()>,
}

impl FilesystemTokenStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            lock: Mutex::new(()),
        }
    }

    /// `~/.cache/stockctl/tokens.json` on Linux.
    pub fn default_path() -> Result<PathBuf> {
        let cache_dir = dirs::cache_dir()
            .or_else(|| dirs::home_dir().map(|h| h.join(".cache")))
            .ok_or_else(|| StockError::Store("could not determine a cache directory".into()))?;
        Ok(cache_dir.join("stockctl").join(TOKEN_FILE_NAME))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read_entries(&self) -> BTreeMap<String, String> {
        let content = match fs::read_to_string(&self.path) {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return BTreeMap::new(),
            Err(e) => {
                warn!(path = %self.path.display(), error = %e, "could not read token file");
                return BTreeMap::new();
            }
        };

        serde_json::from_str(&content).unwrap_or_else(|e| {
            warn!(path = %self.path.display(), error = %e, "token file is corrupt, ignoring it");
            BTreeMap::new()
        })
    }

    fn write_entries(&self, entries: &BTreeMap<String, String>) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() && !parent.exists() {
                fs::create_dir_all(parent)?;
            }
        }
        let content = serde_json::to_string_pretty(entries)?;

        // Write beside the target and rename over it, so readers only ever
        // see a complete file.
        let tmp_path = self.tmp_path();
        let written = write_private(&tmp_path, content.as_bytes())
            .and_then(|()| fs::rename(&tmp_path, &self.path));
        if let Err(e) = written {
            let _ = fs::remove_file(&tmp_path);
            return Err(e.into());
        }

        debug!(path = %self.path.display(), keys = entries.len(), "token file written");
        Ok(())
    }

    fn tmp_path(&self) -> PathBuf {
        let mut name = self
            .path
            .file_name()
            .map(|n| n.to_os_string())
            .unwrap_or_else(|| TOKEN_FILE_NAME.into());
        name.push(".tmp");
        self.path.with_file_name(name)
    }

    fn update<F>(&self, f: F) -> Result<()>
    where
        F: FnOnce(&mut BTreeMap<String, String>),
    {
        let _guard = self.lock.lock().unwrap_or_else(|e| e.into_inner());
        let mut entries = self.read_entries();
        f(&mut entries);
        self.write_entries(&entries)
    }
}

impl TokenStore for FilesystemTokenStore {
    fn get(&self, key: &str) -> Option<String> {
        let _guard = self.lock.lock().unwrap_or_else(|e| e.into_inner());
        self.read_entries().remove(key)
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        self.update(|entries| {
            entries.insert(key.to_string(), value.to_string());
        })
    }

    fn remove(&self, key: &str) -> Result<()> {
        let _guard = self.lock.lock().unwrap_or_else(|e| e.into_inner());
        if !self.path.exists() {
            return Ok(());
        }
        let mut entries = self.read_entries();
        if entries.remove(key).is_some() {
            self.write_entries(&entries)?;
        }
        Ok(())
    }

    fn clear(&self) -> Result<()> {
        let _guard = self.lock.lock().unwrap_or_else(|e| e.into_inner());
        match fs::remove_file(&self.path) {
            Ok(()) => {
                debug!(path = %self.path.display(), "token file removed");
                Ok(())
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}

/// The file holds bearer credentials, so only the owner may read it.
#[cfg(unix)]
fn write_private(path: &Path, content: &[u8]) -> std::io::Result<()> {
    use std::os::unix::fs::{OpenOptionsExt, PermissionsExt};

    let mut file = fs::OpenOptions::new()
        .write(true)
        .create(true)
        .truncate(true)
        .mode(0o600)
        .open(path)?;
    // `mode` only applies on creation; a stale temp file keeps its old bits.
    file.set_permissions(fs::Permissions::from_mode(0o600))?;
    file.write_all(content)?;
    file.sync_all()
}

#[cfg(not(unix))]
fn write_private(path: &Path, content: &[u8]) -> std::io::Result<()> {
    let mut file = fs::File::create(path)?;
    file.write_all(content)?;
    file.sync_all()
}
