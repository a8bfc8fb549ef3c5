//! File-based storage for client-side VEXT data
//!
//! Global user storage (`~/.vext/`):
//! - `projects.json` - saved projects, newest first
//! - `config.toml` / `secrets.toml` - see the config module

pub mod projects;

use fs2::FileExt;
use std::fs::{self, OpenOptions};
use std::path::{Path, PathBuf};

/// Common file operations result type
pub type FileResult<T> = Result<T, String>;

/// Get the global .vext directory in user home
pub fn get_global_vext_dir() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".vext")
}

/// Ensure a directory exists, creating it if necessary
pub fn ensure_dir(path: &Path) -> FileResult<()> {
    if !path.exists() {
        fs::create_dir_all(path)
            .map_err(|e| format!("Failed to create directory {:?}: {}", path, e))?;
    }
    Ok(())
}

/// Write data to a file atomically (temp file + rename)
pub fn atomic_write(path: &Path, content: &str) -> FileResult<()> {
    let temp_path = path.with_extension("tmp");

    if let Some(parent) = path.parent() {
        ensure_dir(parent)?;
    }

    fs::write(&temp_path, content)
        .map_err(|e| format!("Failed to write temp file {:?}: {}", temp_path, e))?;

    fs::rename(&temp_path, path)
        .map_err(|e| format!("Failed to rename {:?} to {:?}: {}", temp_path, path, e))?;

    Ok(())
}

/// Read a JSON file and deserialize it
pub fn read_json<T: serde::de::DeserializeOwned>(path: &Path) -> FileResult<T> {
    let content = fs::read_to_string(path)
        .map_err(|e| format!("Failed to read file {:?}: {}", path, e))?;

    serde_json::from_str(&content)
        .map_err(|e| format!("Failed to parse JSON from {:?}: {}", path, e))
}

/// Write data as pretty-printed JSON atomically
pub fn write_json<T: serde::Serialize>(path: &Path, data: &T) -> FileResult<()> {
    let content = serde_json::to_string_pretty(data)
        .map_err(|e| format!("Failed to serialize to JSON: {}", e))?;

    atomic_write(path, &content)
}

/// Run `f` while holding an exclusive lock on `<path>.lock`.
///
/// Serializes read-modify-write cycles between concurrent `vext` processes.
pub fn with_file_lock<T>(path: &Path, f: impl FnOnce() -> FileResult<T>) -> FileResult<T> {
    if let Some(parent) = path.parent() {
        ensure_dir(parent)?;
    }

    let lock_path = path.with_extension("lock");
    let lock_file = OpenOptions::new()
        .create(true)
        .truncate(false)
        .write(true)
        .open(&lock_path)
        .map_err(|e| format!("Failed to open lock file {:?}: {}", lock_path, e))?;

    lock_file
        .lock_exclusive()
        .map_err(|e| format!("Failed to lock {:?}: {}", lock_path, e))?;

    let result = f();

    if let Err(e) = FileExt::unlock(&lock_file) {
        log::warn!("Failed to release lock {:?}: {}", lock_path, e);
    }

    result
}
