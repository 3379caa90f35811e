use crate::{AppContext, OutputFormat};
use anyhow::Result;
use console::style;
use roxy_browser::RoxyFinder;
use std::path::Path;

pub fn show(ctx: &AppContext, format: OutputFormat) -> Result<()> {
    let settings = &ctx.settings;

    if format.is_json() {
        println!("{}", serde_json::to_string_pretty(settings)?);
        return Ok(());
    }

    println!("{}", style("Settings").bold());
    println!("  File:              {}", ctx.settings_store.path().display());
    println!(
        "  RoxyBrowser path:  {}",
        settings
            .roxy_exe_path
            .as_ref()
            .map(|p| p.display().to_string())
            .unwrap_or_else(|| style("(not set)").dim().to_string())
    );
    println!(
        "  Auto-detect:       {}",
        if settings.auto_detect_enabled { "on" } else { "off" }
    );
    println!("  Poll interval:     {}s", settings.poll_interval().as_secs());
    Ok(())
}

pub fn set_path(ctx: &AppContext, path: &Path) -> Result<()> {
    let saved = ctx.settings_store.set_exe_path(path)?;
    println!("✅ RoxyBrowser path set to {}", saved.display());
    Ok(())
}

pub fn clear_path(ctx: &AppContext) -> Result<()> {
    ctx.settings_store.clear_exe_path()?;
    println!("✅ RoxyBrowser path cleared; auto-detection will be used");
    Ok(())
}

/// Look for RoxyBrowser in the usual install locations, optionally saving the hit
pub fn detect(ctx: &AppContext, save: bool) -> Result<()> {
    match RoxyFinder::auto_detect() {
        Some(path) => {
            println!("🔍 Found RoxyBrowser at: {}", path.display());
            if save {
                set_path(ctx, &path)?;
            }
        }
        None => {
            println!("{}", style("RoxyBrowser was not found in any default location:").yellow());
            for path in RoxyFinder::default_paths() {
                println!("  {}", path.display());
            }
            println!("Use 'roxy-manager settings set-path <PATH>' to configure it.");
        }
    }
    Ok(())
}
