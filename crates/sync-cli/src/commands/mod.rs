//! Command implementations

mod profile;
mod status;
mod transfer;

pub use profile::{run_profile, run_reload};
pub use status::{run_init, run_status};
pub use transfer::{run_download, run_upload};

use std::path::{Path, PathBuf};
use std::sync::Arc;

use tokio::sync::Mutex;

use sync_core::{RepositorySelector, Settings, TransferEngine};

use crate::error::{CliError, Result};

/// Load the settings store and wrap it in a selector.
pub(crate) fn build_selector(storage_dir: &Path) -> Result<Arc<RepositorySelector>> {
    let settings = Settings::load(storage_dir)?;
    Ok(Arc::new(RepositorySelector::new(Arc::new(Mutex::new(
        settings,
    )))))
}

/// Build the transfer engine; transfers need a local tree to synchronize.
pub(crate) fn build_engine(
    storage_dir: &Path,
    local_dir: Option<&PathBuf>,
) -> Result<TransferEngine> {
    let local_dir = local_dir.ok_or_else(|| {
        CliError::user(
            "no local configuration tree given; pass --local-dir or set SETSYNC_LOCAL_DIR",
        )
    })?;
    Ok(TransferEngine::new(
        build_selector(storage_dir)?,
        local_dir.clone(),
    ))
}
