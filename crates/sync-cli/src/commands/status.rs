//! Init and status command implementations

use std::path::Path;

use colored::Colorize;

use sync_core::Settings;

use crate::error::Result;

/// Run the init command
///
/// Loading the store seeds the bundled template when no document exists yet.
pub fn run_init(storage_dir: &Path) -> Result<()> {
    let existed = sync_fs::paths::settings_file(storage_dir).is_file();
    let settings = Settings::load(storage_dir)?;

    if existed {
        println!(
            "{} Settings document already present at {}",
            "OK".green().bold(),
            settings.path().display()
        );
    } else {
        println!(
            "{} Seeded settings document at {}",
            "OK".green().bold(),
            settings.path().display()
        );
        println!(
            "Edit it to pick a backend, then run {}.",
            "setsync reload".cyan()
        );
    }
    Ok(())
}

/// Run the status command
pub fn run_status(storage_dir: &Path, json: bool) -> Result<()> {
    let settings = Settings::load(storage_dir)?;
    let document = settings.document();

    let backend = settings
        .backend_spec()
        .map(|spec| spec.kind().to_string())
        .unwrap_or_else(|e| format!("invalid ({e})"));
    let hooks: Vec<String> = document.hooks.events().map(|e| e.to_string()).collect();

    if json {
        let value = serde_json::json!({
            "settings": settings.path(),
            "hash": settings.hash().to_string(),
            "backend": backend,
            "profile": document.profile,
            "hostname": document.hostname,
            "hooks": hooks,
        });
        println!("{}", serde_json::to_string_pretty(&value)?);
        return Ok(());
    }

    println!("{} {}", "settings".bold(), settings.path().display());
    println!("{}  {}", "backend".bold(), backend.cyan());
    println!(
        "{}  {}",
        "profile".bold(),
        if document.profile.is_empty() {
            "(none)".yellow().to_string()
        } else {
            document.profile.green().to_string()
        }
    );
    if let Some(hostname) = &document.hostname {
        println!("{} {}", "hostname".bold(), hostname);
    }
    if !hooks.is_empty() {
        println!("{}    {}", "hooks".bold(), hooks.join(", "));
    }
    Ok(())
}
