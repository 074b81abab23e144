//! Git backends
//!
//! Two sub-variants share the same storage model: profiles are subdirectories
//! of the working tree on the configured branch. [`LocalGitRepository`] works
//! against a tree already on disk and only commits; [`RemoteGitRepository`]
//! maintains a cache clone under the storage directory and pushes/pulls.
//!
//! Git is sequenced through the CLI rather than a bound library: the user's
//! own git configuration (credentials, ssh agent, signing) then applies
//! unchanged.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use chrono::Utc;
use tokio::process::Command;

use sync_fs::{io, paths};

use crate::error::{Error, Result};

use super::{BackendKind, Repository, TransferContext, TransferReport};

/// Run a git command in `cwd` and return trimmed stdout.
async fn run_git(cwd: &Path, args: &[&str]) -> Result<String> {
    let output = Command::new("git")
        .args(args)
        .current_dir(cwd)
        .output()
        .await
        .map_err(Error::Io)?;

    if output.status.success() {
        Ok(String::from_utf8_lossy(&output.stdout).trim().to_string())
    } else {
        let stderr = String::from_utf8_lossy(&output.stderr);
        Err(Error::backend(format!(
            "git {} failed: {}",
            args.first().unwrap_or(&""),
            stderr.trim()
        )))
    }
}

async fn branch_exists(worktree: &Path, name: &str) -> bool {
    run_git(
        worktree,
        &["rev-parse", "--verify", &format!("refs/heads/{name}")],
    )
    .await
    .is_ok()
}

// symbolic-ref also resolves an unborn branch right after init/clone
async fn current_branch(worktree: &Path) -> Result<String> {
    run_git(worktree, &["symbolic-ref", "--short", "HEAD"]).await
}

async fn remote_tracking_exists(worktree: &Path, name: &str) -> bool {
    run_git(
        worktree,
        &["rev-parse", "--verify", &format!("refs/remotes/origin/{name}")],
    )
    .await
    .is_ok()
}

/// Check out `branch`, tracking origin when it exists there, creating it
/// otherwise.
async fn ensure_branch(worktree: &Path, branch: &str) -> Result<()> {
    if current_branch(worktree).await.ok().as_deref() == Some(branch) {
        return Ok(());
    }

    if branch_exists(worktree, branch).await {
        run_git(worktree, &["checkout", branch]).await?;
    } else if remote_tracking_exists(worktree, branch).await {
        run_git(worktree, &["checkout", "--track", &format!("origin/{branch}")]).await?;
    } else {
        run_git(worktree, &["checkout", "-b", branch]).await?;
    }
    Ok(())
}

/// Stage the profile directory and commit when anything changed.
///
/// Returns the action taken for the transfer report.
async fn commit_profile(
    worktree: &Path,
    profile: &str,
    message: &str,
) -> Result<String> {
    run_git(worktree, &["add", "--all", "--", profile]).await?;

    let status = run_git(worktree, &["status", "--porcelain", "--", profile]).await?;
    if status.is_empty() {
        return Ok("store already up to date".to_string());
    }

    run_git(worktree, &["commit", "-m", message]).await?;
    Ok(format!("committed: {message}"))
}

/// Pick the commit message: the per-host template when one matches this
/// machine's hostname, otherwise a default carrying hostname and timestamp.
fn commit_message(messages: &BTreeMap<String, String>, hostname: Option<&str>) -> String {
    if let Some(message) = hostname.and_then(|h| messages.get(h)) {
        return message.clone();
    }
    format!(
        "settings-sync: update from {} at {}",
        hostname.unwrap_or("unknown host"),
        Utc::now().to_rfc3339()
    )
}

fn ensure_profile_dir(worktree: &Path, profile: &str) -> Result<()> {
    let dir = worktree.join(profile);
    std::fs::create_dir_all(&dir).map_err(|e| {
        Error::backend(format!(
            "cannot create profile directory {}: {e}",
            dir.display()
        ))
    })
}

/// Backend for a git working tree already present locally.
pub struct LocalGitRepository {
    worktree: PathBuf,
    branch: String,
    messages: BTreeMap<String, String>,
    profile: Option<String>,
}

impl LocalGitRepository {
    pub fn new(worktree: PathBuf, branch: String, messages: BTreeMap<String, String>) -> Self {
        Self {
            worktree,
            branch,
            messages,
            profile: None,
        }
    }
}

#[async_trait]
impl Repository for LocalGitRepository {
    fn kind(&self) -> BackendKind {
        BackendKind::LocalGit
    }

    async fn set_profile(&mut self, profile: &str) -> Result<()> {
        if self.profile.as_deref() == Some(profile) {
            return Ok(());
        }

        if !self.worktree.join(".git").exists() {
            return Err(Error::backend(format!(
                "not a git working tree: {}",
                self.worktree.display()
            )));
        }

        ensure_branch(&self.worktree, &self.branch).await?;
        ensure_profile_dir(&self.worktree, profile)?;
        self.profile = Some(profile.to_string());
        Ok(())
    }

    async fn upload(&self, ctx: &TransferContext) -> Result<TransferReport> {
        let target = self.worktree.join(&ctx.profile);
        let files = io::copy_tree(&ctx.local_dir, &target, &[".git"])?;

        let message = commit_message(&self.messages, ctx.hostname.as_deref());
        let action = commit_profile(&self.worktree, &ctx.profile, &message).await?;
        tracing::info!(count = files.len(), action, "uploaded to local git store");

        Ok(TransferReport {
            actions: vec![
                format!("copied {} file(s) into {}", files.len(), target.display()),
                action,
            ],
            files,
        })
    }

    async fn download(&self, ctx: &TransferContext) -> Result<TransferReport> {
        let source = self.worktree.join(&ctx.profile);
        if !source.is_dir() {
            return Err(Error::backend(format!(
                "profile `{}` does not exist on branch `{}`",
                ctx.profile, self.branch
            )));
        }

        let files = io::copy_tree(&source, &ctx.local_dir, &[".git"])?;
        tracing::info!(count = files.len(), "downloaded from local git store");

        Ok(TransferReport {
            actions: vec![format!(
                "copied {} file(s) from {}",
                files.len(),
                source.display()
            )],
            files,
        })
    }

    async fn terminate(&mut self) -> Result<()> {
        self.profile = None;
        Ok(())
    }
}

/// Backend for a remote git repository.
///
/// Maintains a cache clone under `<storage>/cache/remote`; the clone happens
/// lazily on the first `set_profile`, never at construction.
pub struct RemoteGitRepository {
    url: String,
    branch: String,
    messages: BTreeMap<String, String>,
    cache_dir: PathBuf,
    profile: Option<String>,
}

impl RemoteGitRepository {
    pub fn new(
        url: String,
        branch: String,
        messages: BTreeMap<String, String>,
        storage_dir: &Path,
    ) -> Self {
        Self {
            url,
            branch,
            messages,
            cache_dir: paths::remote_cache_dir(storage_dir),
            profile: None,
        }
    }

    /// The cache clone's working tree.
    pub fn cache_dir(&self) -> &Path {
        &self.cache_dir
    }

    /// Clone on first use, fetch afterwards.
    async fn ensure_clone(&self) -> Result<()> {
        if self.cache_dir.join(".git").exists() {
            run_git(&self.cache_dir, &["fetch", "origin"]).await?;
            return Ok(());
        }

        let parent = self
            .cache_dir
            .parent()
            .ok_or_else(|| Error::backend("cache directory has no parent"))?;
        std::fs::create_dir_all(parent)
            .map_err(|e| Error::backend(format!("cannot create cache directory: {e}")))?;

        tracing::info!(url = %self.url, cache = %self.cache_dir.display(), "cloning remote store");
        let cache = self.cache_dir.to_string_lossy().to_string();
        run_git(parent, &["clone", "--", &self.url, &cache]).await?;
        Ok(())
    }

    async fn remote_branch_exists(&self) -> bool {
        run_git(
            &self.cache_dir,
            &["ls-remote", "--heads", "origin", &self.branch],
        )
        .await
        .map(|out| !out.is_empty())
        .unwrap_or(false)
    }

    async fn pull_if_remote_has_branch(&self) -> Result<()> {
        if self.remote_branch_exists().await {
            run_git(
                &self.cache_dir,
                &["pull", "--ff-only", "origin", &self.branch],
            )
            .await?;
        } else {
            tracing::debug!(branch = %self.branch, "branch not on remote yet; nothing to pull");
        }
        Ok(())
    }
}

#[async_trait]
impl Repository for RemoteGitRepository {
    fn kind(&self) -> BackendKind {
        BackendKind::RemoteGit
    }

    async fn set_profile(&mut self, profile: &str) -> Result<()> {
        if self.profile.as_deref() == Some(profile) {
            return Ok(());
        }

        self.ensure_clone().await?;
        ensure_branch(&self.cache_dir, &self.branch).await?;
        self.pull_if_remote_has_branch().await?;
        ensure_profile_dir(&self.cache_dir, profile)?;
        self.profile = Some(profile.to_string());
        Ok(())
    }

    async fn upload(&self, ctx: &TransferContext) -> Result<TransferReport> {
        let target = self.cache_dir.join(&ctx.profile);
        let files = io::copy_tree(&ctx.local_dir, &target, &[".git"])?;

        let message = commit_message(&self.messages, ctx.hostname.as_deref());
        let action = commit_profile(&self.cache_dir, &ctx.profile, &message).await?;

        run_git(
            &self.cache_dir,
            &["push", "--set-upstream", "origin", &self.branch],
        )
        .await?;
        tracing::info!(count = files.len(), action, "uploaded to remote git store");

        Ok(TransferReport {
            actions: vec![
                format!("copied {} file(s) into the cache clone", files.len()),
                action,
                format!("pushed `{}` to origin", self.branch),
            ],
            files,
        })
    }

    async fn download(&self, ctx: &TransferContext) -> Result<TransferReport> {
        self.pull_if_remote_has_branch().await?;

        let source = self.cache_dir.join(&ctx.profile);
        if !source.is_dir() {
            return Err(Error::backend(format!(
                "profile `{}` does not exist on branch `{}` of {}",
                ctx.profile, self.branch, self.url
            )));
        }

        let files = io::copy_tree(&source, &ctx.local_dir, &[".git"])?;
        tracing::info!(count = files.len(), "downloaded from remote git store");

        Ok(TransferReport {
            actions: vec![format!("copied {} file(s) from the cache clone", files.len())],
            files,
        })
    }

    async fn terminate(&mut self) -> Result<()> {
        // The cache clone stays on disk so reconstruction stays cheap
        self.profile = None;
        Ok(())
    }
}
