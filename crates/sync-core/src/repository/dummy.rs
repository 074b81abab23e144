//! Inert backend for `type: none`
//!
//! Used when no backend is configured. Every operation succeeds trivially
//! and no data moves, so the rest of the system never needs a special case
//! for "sync is not set up yet".

use async_trait::async_trait;

use crate::Result;

use super::{BackendKind, Repository, TransferContext, TransferReport};

/// No-op repository backend.
#[derive(Debug, Default)]
pub struct DummyRepository {
    profile: Option<String>,
    terminated: bool,
}

impl DummyRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// The profile most recently activated, if any.
    pub fn profile(&self) -> Option<&str> {
        self.profile.as_deref()
    }
}

#[async_trait]
impl Repository for DummyRepository {
    fn kind(&self) -> BackendKind {
        BackendKind::None
    }

    async fn set_profile(&mut self, profile: &str) -> Result<()> {
        self.profile = Some(profile.to_string());
        Ok(())
    }

    async fn upload(&self, _ctx: &TransferContext) -> Result<TransferReport> {
        tracing::warn!("no backend configured; upload moved nothing");
        Ok(TransferReport::default().with_action("no backend configured; nothing to upload"))
    }

    async fn download(&self, _ctx: &TransferContext) -> Result<TransferReport> {
        tracing::warn!("no backend configured; download moved nothing");
        Ok(TransferReport::default().with_action("no backend configured; nothing to download"))
    }

    async fn terminate(&mut self) -> Result<()> {
        if !self.terminated {
            tracing::debug!("dummy backend terminated");
            self.terminated = true;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    fn ctx() -> TransferContext {
        TransferContext {
            local_dir: PathBuf::from("/nonexistent"),
            profile: "main".into(),
            hostname: None,
        }
    }

    #[tokio::test]
    async fn all_operations_succeed_trivially() {
        let mut repo = DummyRepository::new();

        repo.set_profile("work").await.unwrap();
        assert_eq!(repo.profile(), Some("work"));

        let up = repo.upload(&ctx()).await.unwrap();
        assert!(up.files.is_empty());
        let down = repo.download(&ctx()).await.unwrap();
        assert!(down.files.is_empty());
    }

    #[tokio::test]
    async fn terminate_is_idempotent() {
        let mut repo = DummyRepository::new();
        repo.terminate().await.unwrap();
        repo.terminate().await.unwrap();
    }
}
