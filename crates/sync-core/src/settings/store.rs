//! Persistent settings store
//!
//! Owns the on-disk `settings.yml` and the in-memory document parsed from it.
//! The store is the only writer of the document path. External edits are
//! detected by comparing the content hash of the bytes on disk with the hash
//! of the bytes this process last read or wrote.

use std::path::{Path, PathBuf};

use sync_fs::paths;
use sync_fs::{ContentHash, io};

use crate::error::{Error, Result};
use crate::settings::document::{BackendSpec, SettingsDocument};

/// Bundled default document, seeded on first run.
const DEFAULT_TEMPLATE: &str = include_str!("../../assets/default-settings.yml");

/// The settings store.
///
/// Constructed once per process by the host via [`Settings::load`] and shared
/// behind a lock; initialization never fails on document *content*, only on
/// storage I/O. A malformed document degrades to the inert default
/// (`type: none`, empty profile) with an error log.
#[derive(Debug)]
pub struct Settings {
    storage_dir: PathBuf,
    path: PathBuf,
    document: SettingsDocument,
    hash: ContentHash,
}

impl Settings {
    /// Load the settings document from `storage_dir`.
    ///
    /// Exactly one of three paths executes:
    ///
    /// 1. `settings.yml` exists: read, hash, parse (degrading if malformed).
    /// 2. It is absent: seed from the bundled template, persist, hash.
    /// 3. The bundled template itself is unusable: synthesize an in-memory
    ///    default document and persist it.
    pub fn load(storage_dir: impl Into<PathBuf>) -> Result<Self> {
        let storage_dir = storage_dir.into();
        let path = paths::settings_file(&storage_dir);

        if path.is_file() {
            let bytes = io::read_bytes(&path)?;
            let hash = ContentHash::of_bytes(&bytes);
            let document = parse_or_degrade(&path, &bytes);
            tracing::debug!(path = %path.display(), hash = %hash, "loaded settings document");
            return Ok(Self {
                storage_dir,
                path,
                document,
                hash,
            });
        }

        match serde_yaml::from_str::<SettingsDocument>(DEFAULT_TEMPLATE) {
            Ok(document) => {
                io::write_private(&path, DEFAULT_TEMPLATE.as_bytes())?;
                let hash = ContentHash::of_bytes(DEFAULT_TEMPLATE.as_bytes());
                tracing::info!(path = %path.display(), "seeded settings document from bundled template");
                Ok(Self {
                    storage_dir,
                    path,
                    document,
                    hash,
                })
            }
            Err(e) => {
                tracing::error!(error = %e, "bundled settings template is unusable; synthesizing defaults");
                let mut settings = Self {
                    storage_dir,
                    path,
                    document: SettingsDocument {
                        profile: "default".to_string(),
                        ..Default::default()
                    },
                    hash: ContentHash::of_bytes(&[]),
                };
                settings.save()?;
                Ok(settings)
            }
        }
    }

    /// Re-read the document from disk.
    ///
    /// Returns `false` without touching in-memory state when the on-disk
    /// bytes hash to the value already held. On change, in-memory fields are
    /// replaced wholesale from the new bytes (never merged field-by-field).
    pub fn reload(&mut self) -> Result<bool> {
        let bytes = match io::read_bytes(&self.path) {
            Ok(bytes) => bytes,
            Err(e) => {
                tracing::warn!(error = %e, "settings document unreadable on reload; keeping current state");
                return Ok(false);
            }
        };

        let hash = ContentHash::of_bytes(&bytes);
        if hash == self.hash {
            tracing::debug!(hash = %hash, "settings document unchanged");
            return Ok(false);
        }

        self.document = parse_or_degrade(&self.path, &bytes);
        self.hash = hash;
        tracing::info!(path = %self.path.display(), "settings document changed on disk; state replaced");
        Ok(true)
    }

    /// Serialize the in-memory document and write it to disk with owner-only
    /// permissions, then recompute the hash from the written bytes.
    pub fn save(&mut self) -> Result<()> {
        let rendered = serde_yaml::to_string(&self.document)?;
        io::write_private(&self.path, rendered.as_bytes())?;
        self.hash = ContentHash::of_bytes(rendered.as_bytes());
        tracing::debug!(path = %self.path.display(), hash = %self.hash, "saved settings document");
        Ok(())
    }

    /// Set the active profile and persist the document.
    pub fn set_profile(&mut self, profile: &str) -> Result<()> {
        self.document.profile = profile.to_string();
        self.save()
    }

    /// The current in-memory document.
    pub fn document(&self) -> &SettingsDocument {
        &self.document
    }

    /// Hash of the last bytes read from or written to disk by this process.
    pub fn hash(&self) -> &ContentHash {
        &self.hash
    }

    /// Path of the on-disk document.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Storage directory holding the document and backend caches.
    pub fn storage_dir(&self) -> &Path {
        &self.storage_dir
    }

    /// Lower the document's `repository` mapping into a [`BackendSpec`].
    pub fn backend_spec(&self) -> Result<BackendSpec> {
        self.document.backend_spec()
    }
}

/// Parse document bytes, reporting the malformed-document error.
fn parse_document(path: &Path, bytes: &[u8]) -> Result<SettingsDocument> {
    serde_yaml::from_slice(bytes).map_err(|e| Error::MalformedDocument {
        path: path.to_path_buf(),
        message: e.to_string(),
    })
}

/// Parse document bytes, degrading to the inert default on failure.
///
/// A document that parses but has no profile keeps working with an empty
/// profile name; both conditions are logged as errors, never propagated.
fn parse_or_degrade(path: &Path, bytes: &[u8]) -> SettingsDocument {
    match parse_document(path, bytes) {
        Ok(document) => {
            if document.profile.is_empty() {
                tracing::error!(path = %path.display(), "settings document has no profile; falling back to an empty profile name");
            }
            document
        }
        Err(e) => {
            tracing::error!(error = %e, "falling back to an inert configuration");
            SettingsDocument::default()
        }
    }
}
