//! Upload and download command implementations

use std::path::{Path, PathBuf};

use colored::Colorize;
use dialoguer::Confirm;

use sync_core::TransferReport;

use crate::error::Result;

use super::build_engine;

/// Run the upload command
pub async fn run_upload(storage_dir: &Path, local_dir: Option<&PathBuf>) -> Result<()> {
    let engine = build_engine(storage_dir, local_dir)?;

    println!("{} Uploading configuration...", "=>".blue().bold());
    let report = engine.upload().await?;
    print_report(&report);
    Ok(())
}

/// Run the download command
///
/// Downloading overwrites the local tree, so ask first unless `--yes`.
pub async fn run_download(storage_dir: &Path, local_dir: Option<&PathBuf>, yes: bool) -> Result<()> {
    if !yes {
        let proceed = Confirm::new()
            .with_prompt("Overwrite the local configuration tree with the stored profile?")
            .default(false)
            .interact()?;
        if !proceed {
            println!("Aborted.");
            return Ok(());
        }
    }

    let engine = build_engine(storage_dir, local_dir)?;

    println!("{} Downloading configuration...", "=>".blue().bold());
    let report = engine.download().await?;
    print_report(&report);
    Ok(())
}

fn print_report(report: &TransferReport) {
    for action in &report.actions {
        println!("   {} {}", "-".green(), action);
    }
    println!(
        "{} {} file(s) transferred.",
        "OK".green().bold(),
        report.files.len()
    );
}
