//! Plain filesystem backend
//!
//! The store is a bare file tree rooted at the configured `path`; each
//! profile is a subdirectory named after it. Transfers are recursive copies.

use std::path::PathBuf;

use async_trait::async_trait;

use sync_fs::io;

use crate::error::{Error, Result};

use super::{BackendKind, Repository, TransferContext, TransferReport};

/// Backend storing configuration in a plain directory tree.
pub struct FileRepository {
    root: PathBuf,
    profile: Option<String>,
}

impl FileRepository {
    pub fn new(root: PathBuf) -> Self {
        Self {
            root,
            profile: None,
        }
    }

    fn profile_dir(&self, profile: &str) -> PathBuf {
        self.root.join(profile)
    }
}

#[async_trait]
impl Repository for FileRepository {
    fn kind(&self) -> BackendKind {
        BackendKind::File
    }

    async fn set_profile(&mut self, profile: &str) -> Result<()> {
        if self.profile.as_deref() == Some(profile) {
            return Ok(());
        }

        let dir = self.profile_dir(profile);
        tokio::fs::create_dir_all(&dir).await.map_err(|e| {
            Error::backend(format!(
                "cannot create profile directory {}: {e}",
                dir.display()
            ))
        })?;

        self.profile = Some(profile.to_string());
        Ok(())
    }

    async fn upload(&self, ctx: &TransferContext) -> Result<TransferReport> {
        let target = self.profile_dir(&ctx.profile);
        let files = io::copy_tree(&ctx.local_dir, &target, &[".git"])?;
        tracing::info!(count = files.len(), target = %target.display(), "uploaded settings tree");

        Ok(TransferReport {
            actions: vec![format!("copied {} file(s) to {}", files.len(), target.display())],
            files,
        })
    }

    async fn download(&self, ctx: &TransferContext) -> Result<TransferReport> {
        let source = self.profile_dir(&ctx.profile);
        if !source.is_dir() {
            return Err(Error::backend(format!(
                "profile `{}` has never been uploaded to {}",
                ctx.profile,
                self.root.display()
            )));
        }

        let files = io::copy_tree(&source, &ctx.local_dir, &[".git"])?;
        tracing::info!(count = files.len(), source = %source.display(), "downloaded settings tree");

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
        // No held resources; forget the active profile
        self.profile = None;
        Ok(())
    }
}
