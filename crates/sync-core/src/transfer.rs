//! Hook-bracketed transfers
//!
//! Upload and download always run through here so every backend gets
//! identical hook semantics: pre-hooks run before any data moves and a
//! failure aborts the transfer; post-hooks run after the backend finished
//! and a failure still surfaces, with the data already moved and both
//! settings and backend state consistent.

use std::path::PathBuf;
use std::sync::Arc;

use crate::Result;
use crate::hooks::{self, HookEvent, HookSet};
use crate::repository::{RepositorySelector, TransferContext, TransferReport};

/// Drives hook-bracketed transfers against the selector's live backend.
pub struct TransferEngine {
    selector: Arc<RepositorySelector>,
    local_dir: PathBuf,
}

impl TransferEngine {
    /// `local_dir` is the editor-configuration tree being synchronized.
    pub fn new(selector: Arc<RepositorySelector>, local_dir: impl Into<PathBuf>) -> Self {
        Self {
            selector,
            local_dir: local_dir.into(),
        }
    }

    /// Push the local tree into the backend's profile namespace.
    pub async fn upload(&self) -> Result<TransferReport> {
        let repository = self.selector.get().await?;
        let (hooks, ctx) = self.snapshot().await;

        hooks::run_hooks(&hooks, HookEvent::PreUpload, &self.local_dir).await?;
        let report = repository.lock().await.upload(&ctx).await?;
        hooks::run_hooks(&hooks, HookEvent::PostUpload, &self.local_dir).await?;

        Ok(report)
    }

    /// Restore the backend's profile namespace into the local tree.
    pub async fn download(&self) -> Result<TransferReport> {
        let repository = self.selector.get().await?;
        let (hooks, ctx) = self.snapshot().await;

        hooks::run_hooks(&hooks, HookEvent::PreDownload, &self.local_dir).await?;
        let report = repository.lock().await.download(&ctx).await?;
        hooks::run_hooks(&hooks, HookEvent::PostDownload, &self.local_dir).await?;

        Ok(report)
    }

    /// Read-through snapshot of the settings fields a transfer needs; never
    /// cached across operations.
    async fn snapshot(&self) -> (HookSet, TransferContext) {
        let settings = self.selector.settings();
        let settings = settings.lock().await;
        let document = settings.document();
        (
            document.hooks.clone(),
            TransferContext {
                local_dir: self.local_dir.clone(),
                profile: document.profile.clone(),
                hostname: document.hostname.clone(),
            },
        )
    }
}
