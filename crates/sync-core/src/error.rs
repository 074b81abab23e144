//! Error types for sync-core

use std::path::PathBuf;

/// Result type for sync-core operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in sync-core operations
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Unrecognized or ambiguous backend selection in the settings document.
    /// Fatal to backend construction; surfaced to the caller of
    /// [`RepositorySelector::get`](crate::RepositorySelector::get).
    #[error("Configuration error: {message}")]
    Configuration { message: String },

    /// Transport-level failure in a backend operation. Propagates unchanged;
    /// profile persistence only happens after backend acceptance, so this
    /// never corrupts the persisted settings.
    #[error("Backend error: {message}")]
    Backend { message: String },

    /// A hook command exited with non-zero status. Aborts the enclosing
    /// transfer; settings and backend state stay consistent.
    #[error("Hook `{command}` for {event} failed: {message}")]
    HookFailed {
        event: String,
        command: String,
        message: String,
    },

    /// The settings document failed to parse or lacks the `repository`
    /// mapping. The store recovers by degrading to an inert default; this
    /// variant never escapes `load`/`reload`.
    #[error("Malformed settings document at {path}: {message}")]
    MalformedDocument { path: PathBuf, message: String },

    /// Filesystem error from sync-fs
    #[error(transparent)]
    Fs(#[from] sync_fs::Error),

    /// Standard I/O error
    #[error(transparent)]
    Io(#[from] std::io::Error),

    /// YAML serialization error
    #[error(transparent)]
    Yaml(#[from] serde_yaml::Error),
}

impl Error {
    /// Create a configuration error with the given message
    pub fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration {
            message: message.into(),
        }
    }

    /// Create a backend error with the given message
    pub fn backend(message: impl Into<String>) -> Self {
        Self::Backend {
            message: message.into(),
        }
    }
}
