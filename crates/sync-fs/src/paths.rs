//! Storage-directory resolution
//!
//! The storage directory is the per-user home of settings-sync: it holds the
//! persisted `settings.yml` plus backend caches. Callers (tests, the CLI
//! `--storage-dir` flag) can always supply an explicit directory instead.

use std::path::{Path, PathBuf};

use crate::{Error, Result};

/// File name of the persisted settings document inside the storage directory.
pub const SETTINGS_FILE: &str = "settings.yml";

/// Application directory name under the platform config directory.
const APP_DIR: &str = "settings-sync";

/// Resolve the default storage directory.
///
/// - Linux: `~/.config/settings-sync/`
/// - macOS: `~/Library/Application Support/settings-sync/`
/// - Windows: `%APPDATA%\settings-sync\`
pub fn default_storage_dir() -> Result<PathBuf> {
    dirs::config_dir()
        .map(|d| d.join(APP_DIR))
        .ok_or(Error::StorageDirUnavailable)
}

/// Path of the settings document inside a storage directory.
pub fn settings_file(storage_dir: &Path) -> PathBuf {
    storage_dir.join(SETTINGS_FILE)
}

/// Directory where the remote git backend keeps its cache clone.
pub fn remote_cache_dir(storage_dir: &Path) -> PathBuf {
    storage_dir.join("cache").join("remote")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn settings_file_is_inside_storage_dir() {
        let path = settings_file(Path::new("/home/user/.config/settings-sync"));
        assert!(path.ends_with("settings.yml"));
        assert!(path.starts_with("/home/user/.config/settings-sync"));
    }

    #[test]
    fn remote_cache_dir_is_nested() {
        let path = remote_cache_dir(Path::new("/store"));
        assert_eq!(path, PathBuf::from("/store/cache/remote"));
    }
}
