//! Repository backend abstraction
//!
//! Provides a uniform contract over fundamentally different transports
//! (filesystem copy, git commit/push/pull, rsync invocation). Each backend is
//! an interchangeable strategy object; the selector owns the single live
//! instance and its lifecycle.

mod dummy;
mod file;
mod git;
mod rsync;
pub mod selector;

pub use dummy::DummyRepository;
pub use file::FileRepository;
pub use git::{LocalGitRepository, RemoteGitRepository};
pub use rsync::RsyncRepository;
pub use selector::{RepositorySelector, SharedRepository};

use std::fmt;
use std::path::{Path, PathBuf};

use async_trait::async_trait;

use crate::Result;
use crate::settings::{BackendSpec, GitRemote};

/// The concrete backend variant behind a repository instance.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BackendKind {
    /// No backend configured; all operations succeed trivially
    None,
    /// Plain filesystem tree
    File,
    /// Git working tree already present locally
    LocalGit,
    /// Remote git repository cloned into the storage cache
    RemoteGit,
    /// rsync target reached through a shell
    Rsync,
}

impl fmt::Display for BackendKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::None => write!(f, "none"),
            Self::File => write!(f, "file"),
            Self::LocalGit => write!(f, "git (local)"),
            Self::RemoteGit => write!(f, "git (remote)"),
            Self::Rsync => write!(f, "rsync"),
        }
    }
}

impl BackendSpec {
    /// The backend kind this spec constructs.
    pub fn kind(&self) -> BackendKind {
        match self {
            BackendSpec::None => BackendKind::None,
            BackendSpec::File { .. } => BackendKind::File,
            BackendSpec::Git {
                remote: GitRemote::Local { .. },
                ..
            } => BackendKind::LocalGit,
            BackendSpec::Git {
                remote: GitRemote::Remote { .. },
                ..
            } => BackendKind::RemoteGit,
            BackendSpec::Rsync { .. } => BackendKind::Rsync,
        }
    }
}

/// Snapshot of the settings fields a transfer needs.
#[derive(Debug, Clone)]
pub struct TransferContext {
    /// The local editor-configuration tree being synchronized
    pub local_dir: PathBuf,
    /// Active profile (namespace within the backend store)
    pub profile: String,
    /// This machine's name, for per-host commit messages
    pub hostname: Option<String>,
}

/// What a transfer moved.
#[derive(Debug, Clone, Default)]
pub struct TransferReport {
    /// Relative paths of the files that moved
    pub files: Vec<PathBuf>,
    /// Human-readable actions taken, in order
    pub actions: Vec<String>,
}

impl TransferReport {
    pub fn with_action(mut self, action: impl Into<String>) -> Self {
        self.actions.push(action.into());
        self
    }
}

/// Contract every backend variant must satisfy.
///
/// `set_profile` must be idempotent when called with the profile already
/// active. `terminate` must be safe to call multiple times and never fails
/// for "already terminated"; the selector is the only caller.
#[async_trait]
pub trait Repository: Send + Sync {
    /// The concrete variant behind this instance.
    fn kind(&self) -> BackendKind;

    /// Switch the backend's active namespace to `profile`.
    ///
    /// # Errors
    ///
    /// [`Error::Backend`](crate::Error::Backend) when the transport cannot
    /// resolve or create the namespace (branch checkout failure, path not
    /// writable).
    async fn set_profile(&mut self, profile: &str) -> Result<()>;

    /// Move the local configuration tree into the store's profile namespace.
    async fn upload(&self, ctx: &TransferContext) -> Result<TransferReport>;

    /// Restore the store's profile namespace into the local tree.
    async fn download(&self, ctx: &TransferContext) -> Result<TransferReport>;

    /// Release held resources. Idempotent.
    async fn terminate(&mut self) -> Result<()>;
}

/// Construct the backend matching a validated spec.
///
/// `storage_dir` supplies cache space for backends that need it (the remote
/// git clone). Construction itself is cheap; expensive work (cloning,
/// checkout) happens in `set_profile`.
pub(crate) fn from_spec(spec: &BackendSpec, storage_dir: &Path) -> Box<dyn Repository> {
    match spec {
        BackendSpec::None => Box::new(DummyRepository::new()),
        BackendSpec::File { path } => Box::new(FileRepository::new(path.clone())),
        BackendSpec::Git {
            remote: GitRemote::Local { path },
            branch,
            messages,
        } => Box::new(LocalGitRepository::new(
            path.clone(),
            branch.clone(),
            messages.clone(),
        )),
        BackendSpec::Git {
            remote: GitRemote::Remote { url },
            branch,
            messages,
        } => Box::new(RemoteGitRepository::new(
            url.clone(),
            branch.clone(),
            messages.clone(),
            storage_dir,
        )),
        BackendSpec::Rsync { destination, shell } => {
            Box::new(RsyncRepository::new(destination.clone(), shell.clone()))
        }
    }
}
