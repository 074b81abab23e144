//! [`TestHome`] builder for settings-sync test scenarios.
//!
//! Sets up a temporary "machine": a storage directory for the settings
//! document and backend caches, plus a local configuration tree to
//! synchronize.

use std::fs;
use std::path::{Path, PathBuf};

use tempfile::TempDir;

/// A temporary storage + local tree pair with helper methods for test setup
/// and assertion.
///
/// # Example
///
/// ```rust,no_run
/// use sync_test_utils::home::TestHome;
///
/// let home = TestHome::new();
/// home.write_settings("repository:\n  type: none\nprofile: main\n");
/// home.seed_local_file("init.vim", "set nu");
/// ```
pub struct TestHome {
    temp_dir: TempDir,
}

impl Default for TestHome {
    fn default() -> Self {
        Self::new()
    }
}

impl TestHome {
    /// Create a fresh machine with empty `storage/` and `local/` trees.
    pub fn new() -> Self {
        let temp_dir = TempDir::new().unwrap();
        fs::create_dir_all(temp_dir.path().join("storage")).unwrap();
        fs::create_dir_all(temp_dir.path().join("local")).unwrap();
        Self { temp_dir }
    }

    /// Root of the temporary machine.
    pub fn root(&self) -> &Path {
        self.temp_dir.path()
    }

    /// The storage directory holding `settings.yml` and caches.
    pub fn storage_dir(&self) -> PathBuf {
        self.temp_dir.path().join("storage")
    }

    /// The local configuration tree being synchronized.
    pub fn local_dir(&self) -> PathBuf {
        self.temp_dir.path().join("local")
    }

    /// Path of the settings document.
    pub fn settings_path(&self) -> PathBuf {
        self.storage_dir().join("settings.yml")
    }

    /// Write the settings document verbatim.
    pub fn write_settings(&self, content: &str) {
        fs::write(self.settings_path(), content).unwrap();
    }

    /// Read the settings document back.
    pub fn read_settings(&self) -> String {
        fs::read_to_string(self.settings_path())
            .unwrap_or_else(|_| panic!("Could not read {}", self.settings_path().display()))
    }

    /// Seed a file in the local tree, creating parent directories.
    pub fn seed_local_file(&self, relative: &str, content: &str) {
        let path = self.local_dir().join(relative);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).unwrap();
        }
        fs::write(path, content).unwrap();
    }

    /// Assert that `path` (relative to the machine root) exists.
    ///
    /// # Panics
    /// Panics with a descriptive message if the path does not exist.
    pub fn assert_file_exists(&self, path: &str) {
        let full_path = self.root().join(path);
        assert!(
            full_path.exists(),
            "Expected file to exist: {}",
            full_path.display()
        );
    }

    /// Assert that the file at `path` (relative to root) contains `content`.
    ///
    /// # Panics
    /// Panics if the file cannot be read or does not contain `content`.
    pub fn assert_file_contains(&self, path: &str, content: &str) {
        let full_path = self.root().join(path);
        let file_content = fs::read_to_string(&full_path)
            .unwrap_or_else(|_| panic!("Could not read file: {}", full_path.display()));
        assert!(
            file_content.contains(content),
            "File {} does not contain expected content.\nExpected: {}\nActual: {}",
            full_path.display(),
            content,
            file_content
        );
    }
}
