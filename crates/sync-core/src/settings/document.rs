//! Settings document model
//!
//! The persisted YAML document: hostname, backend selection with parameters,
//! hook commands, and the active profile. The raw `repository` mapping keeps
//! `type` as a plain string so an unrecognized value survives parsing and is
//! rejected at backend construction instead of corrupting the whole load.

use std::collections::BTreeMap;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::hooks::HookSet;

fn default_backend_type() -> String {
    "none".to_string()
}

/// The `repository` mapping as it appears on disk.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RepositoryConfig {
    /// Backend type: "none", "file", "git", or "rsync"
    #[serde(rename = "type", default = "default_backend_type")]
    pub kind: String,

    /// Store path (file backend, local git working tree, rsync destination)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path: Option<PathBuf>,

    /// Remote address (remote git clone URL, rsync destination)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,

    /// Git branch backing the store (defaults to "main")
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub branch: Option<String>,

    /// Remote shell passed to rsync via `-e` (e.g. "ssh -p 2222")
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub shell: Option<String>,

    /// Per-host commit message templates for git uploads, keyed by hostname
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub messages: Option<BTreeMap<String, String>>,
}

impl Default for RepositoryConfig {
    fn default() -> Self {
        Self {
            kind: default_backend_type(),
            path: None,
            url: None,
            branch: None,
            shell: None,
            messages: None,
        }
    }
}

/// Which of `path`/`url` selects the git sub-variant.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GitRemote {
    /// A git working tree already present locally
    Local { path: PathBuf },
    /// A remote repository cloned into the storage cache before use
    Remote { url: String },
}

/// Validated backend selection lowered from [`RepositoryConfig`].
///
/// The ambiguous git states (both or neither of `path`/`url`) are rejected
/// during lowering, so they are unrepresentable here.
#[derive(Debug, Clone, PartialEq)]
pub enum BackendSpec {
    None,
    File {
        path: PathBuf,
    },
    Git {
        remote: GitRemote,
        branch: String,
        messages: BTreeMap<String, String>,
    },
    Rsync {
        destination: String,
        shell: Option<String>,
    },
}

impl RepositoryConfig {
    /// Lower the raw mapping into a validated [`BackendSpec`].
    ///
    /// # Errors
    ///
    /// [`Error::Configuration`] when `type` is outside the closed
    /// enumeration, when the git backend has both or neither of
    /// `path`/`url`, or when a required parameter is missing.
    pub fn backend_spec(&self) -> Result<BackendSpec> {
        match self.kind.as_str() {
            "none" => Ok(BackendSpec::None),
            "file" => {
                let path = self.path.clone().ok_or_else(|| {
                    Error::configuration("file repository requires `path`")
                })?;
                Ok(BackendSpec::File { path })
            }
            "git" => {
                let remote = match (&self.path, &self.url) {
                    (Some(path), None) => GitRemote::Local { path: path.clone() },
                    (None, Some(url)) => GitRemote::Remote { url: url.clone() },
                    (Some(_), Some(_)) => {
                        return Err(Error::configuration(
                            "mysterious repository type: git with both `path` and `url` set",
                        ));
                    }
                    (None, None) => {
                        return Err(Error::configuration(
                            "mysterious repository type: git with neither `path` nor `url` set",
                        ));
                    }
                };
                Ok(BackendSpec::Git {
                    remote,
                    branch: self.branch.clone().unwrap_or_else(|| "main".to_string()),
                    messages: self.messages.clone().unwrap_or_default(),
                })
            }
            "rsync" => {
                let destination = self
                    .url
                    .clone()
                    .or_else(|| self.path.as_ref().map(|p| p.display().to_string()))
                    .ok_or_else(|| {
                        Error::configuration("rsync repository requires `path` or `url`")
                    })?;
                Ok(BackendSpec::Rsync {
                    destination,
                    shell: self.shell.clone(),
                })
            }
            other => Err(Error::configuration(format!(
                "mysterious repository type `{other}`"
            ))),
        }
    }
}

/// The persisted configuration document.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SettingsDocument {
    /// Identifies this machine for per-host commit messages
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hostname: Option<String>,

    /// Backend selection and parameters. Required: a document without it is
    /// malformed and degrades to the inert default at load time.
    pub repository: RepositoryConfig,

    /// Hook commands keyed by event name
    #[serde(default, skip_serializing_if = "HookSet::is_empty")]
    pub hooks: HookSet,

    /// Active profile name. Missing on disk degrades to "" with an error log.
    #[serde(default)]
    pub profile: String,
}

impl SettingsDocument {
    /// Lower this document's `repository` mapping into a [`BackendSpec`].
    pub fn backend_spec(&self) -> Result<BackendSpec> {
        self.repository.backend_spec()
    }
}
