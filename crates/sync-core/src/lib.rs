//! Core layer for settings-sync
//!
//! This crate implements the repository abstraction and the settings state
//! machine:
//!
//! - **Settings store**: the persisted configuration document (active
//!   profile, backend selection, hooks, hostname) with content-hash change
//!   detection
//! - **Repository contract**: the uniform async interface every storage
//!   backend satisfies
//! - **Repository selector**: lazy, hash-gated lifecycle of the single live
//!   backend instance
//! - **Transfer engine**: hook-bracketed upload/download
//!
//! # Architecture
//!
//! `sync-core` sits between the filesystem primitives and the host layer:
//!
//! ```text
//!      CLI / editor host
//!             |
//!         sync-core
//!             |
//!          sync-fs
//! ```
//!
//! Backends sequence the `git` and `rsync` CLIs through `tokio::process`, so
//! the user's own transport configuration (credentials, ssh agent) applies
//! unchanged.

pub mod error;
pub mod hooks;
pub mod repository;
pub mod settings;
pub mod transfer;

pub use error::{Error, Result};
pub use hooks::{HookCommands, HookEvent, HookOutcome, HookSet, run_hooks};
pub use repository::{
    BackendKind, DummyRepository, FileRepository, LocalGitRepository, RemoteGitRepository,
    Repository, RepositorySelector, RsyncRepository, SharedRepository, TransferContext,
    TransferReport,
};
pub use settings::{BackendSpec, GitRemote, RepositoryConfig, Settings, SettingsDocument};
pub use transfer::TransferEngine;
