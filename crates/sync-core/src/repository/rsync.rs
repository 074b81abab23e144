//! rsync backend
//!
//! The store is a directory reachable by rsync, locally or through a remote
//! shell. Profiles are subdirectories of the destination, like the other
//! backends. Nothing about the destination can be validated without a
//! network round-trip, so `set_profile` only records the namespace and the
//! first transfer surfaces transport errors.

use std::path::Path;
use std::process::Stdio;

use async_trait::async_trait;
use tokio::process::Command;

use crate::error::{Error, Result};

use super::{BackendKind, Repository, TransferContext, TransferReport};

/// Backend invoking the rsync CLI.
pub struct RsyncRepository {
    destination: String,
    shell: Option<String>,
    profile: Option<String>,
}

impl RsyncRepository {
    pub fn new(destination: String, shell: Option<String>) -> Self {
        Self {
            destination,
            shell,
            profile: None,
        }
    }

    fn profile_destination(&self, profile: &str) -> String {
        format!("{}/{}/", self.destination.trim_end_matches('/'), profile)
    }

    async fn run_rsync(&self, source: &str, target: &str) -> Result<String> {
        let mut cmd = Command::new("rsync");
        cmd.args(["--archive", "--delete", "--exclude", ".git"]);
        if let Some(shell) = &self.shell {
            cmd.args(["-e", shell]);
        }
        // --itemize-changes gives one line per transferred path for the report
        cmd.args(["--itemize-changes", source, target]);

        tracing::debug!(source, target, "invoking rsync");
        let output = cmd.stdin(Stdio::null()).output().await.map_err(Error::Io)?;

        if output.status.success() {
            Ok(String::from_utf8_lossy(&output.stdout).to_string())
        } else {
            let stderr = String::from_utf8_lossy(&output.stderr);
            Err(Error::backend(format!(
                "rsync from {source} to {target} failed: {}",
                stderr.trim()
            )))
        }
    }
}

/// Relative file paths out of `--itemize-changes` output.
fn itemized_files(output: &str) -> Vec<std::path::PathBuf> {
    output
        .lines()
        .filter_map(|line| {
            // Format: "<11-char change flags> <path>"
            let (flags, path) = line.split_once(' ')?;
            if flags.starts_with('>') || flags.starts_with('<') || flags.starts_with('c') {
                let path = path.trim();
                (!path.ends_with('/')).then(|| std::path::PathBuf::from(path))
            } else {
                None
            }
        })
        .collect()
}

fn dir_with_trailing_slash(dir: &Path) -> String {
    format!("{}/", dir.display().to_string().trim_end_matches('/'))
}

#[async_trait]
impl Repository for RsyncRepository {
    fn kind(&self) -> BackendKind {
        BackendKind::Rsync
    }

    async fn set_profile(&mut self, profile: &str) -> Result<()> {
        self.profile = Some(profile.to_string());
        Ok(())
    }

    async fn upload(&self, ctx: &TransferContext) -> Result<TransferReport> {
        let source = dir_with_trailing_slash(&ctx.local_dir);
        let target = self.profile_destination(&ctx.profile);
        let output = self.run_rsync(&source, &target).await?;

        let files = itemized_files(&output);
        tracing::info!(count = files.len(), target, "uploaded via rsync");
        Ok(TransferReport {
            actions: vec![format!("rsync {} file(s) to {target}", files.len())],
            files,
        })
    }

    async fn download(&self, ctx: &TransferContext) -> Result<TransferReport> {
        let source = self.profile_destination(&ctx.profile);
        let target = dir_with_trailing_slash(&ctx.local_dir);
        let output = self.run_rsync(&source, &target).await?;

        let files = itemized_files(&output);
        tracing::info!(count = files.len(), source, "downloaded via rsync");
        Ok(TransferReport {
            actions: vec![format!("rsync {} file(s) from {source}", files.len())],
            files,
        })
    }

    async fn terminate(&mut self) -> Result<()> {
        self.profile = None;
        Ok(())
    }
}
