//! Settings document model and persistent store
//!
//! The document selects the active backend and profile; the store owns the
//! on-disk copy and detects external modification via content hashing.

mod document;
mod store;

pub use document::{BackendSpec, GitRemote, RepositoryConfig, SettingsDocument};
pub use store::Settings;
