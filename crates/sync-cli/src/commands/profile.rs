//! Profile and reload command implementations

use std::path::Path;

use colored::Colorize;

use crate::error::Result;

use super::build_selector;

/// Run the profile command
///
/// The backend must accept the profile before it is persisted; a backend
/// failure leaves the document unchanged.
pub async fn run_profile(storage_dir: &Path, name: &str) -> Result<()> {
    let selector = build_selector(storage_dir)?;

    // Construct the backend so the switch is validated against the store,
    // not just written to disk
    selector.get().await?;
    selector.set_profile(name).await?;

    println!("{} Active profile is now {}", "OK".green().bold(), name.green());
    Ok(())
}

/// Run the reload command
///
/// Re-reads the settings document and constructs the backend it selects,
/// surfacing configuration errors immediately instead of on the next
/// transfer.
pub async fn run_reload(storage_dir: &Path) -> Result<()> {
    let selector = build_selector(storage_dir)?;

    let instance = selector.get().await?;
    let kind = instance.lock().await.kind();

    let settings = selector.settings();
    let profile = {
        let settings = settings.lock().await;
        settings.document().profile.clone()
    };

    println!(
        "{} Settings document is valid. Backend: {}, profile: {}",
        "OK".green().bold(),
        kind.to_string().cyan(),
        profile.green()
    );
    Ok(())
}
