//! Filesystem primitives for settings-sync
//!
//! Safe I/O for the settings document and backend stores: content hashing
//! for change detection, atomic owner-only writes, recursive tree copies,
//! and storage-directory resolution.

pub mod checksum;
pub mod error;
pub mod io;
pub mod paths;

pub use checksum::ContentHash;
pub use error::{Error, Result};
