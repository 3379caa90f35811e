use super::with_spinner;
use crate::AppContext;
use anyhow::{Context, Result};
use std::path::Path;

/// Export every saved profile into `dir`
pub async fn export(ctx: &AppContext, dir: &Path) -> Result<()> {
    let path = path_arg(dir)?;
    let message = with_spinner("Exporting profiles...", ctx.store.export_profiles(&path)).await?;

    println!("✅ {}", message);
    Ok(())
}

/// Merge profiles from an export directory
pub async fn import(ctx: &AppContext, dir: &Path) -> Result<()> {
    let path = path_arg(dir)?;
    let message = with_spinner("Importing profiles...", ctx.store.import_profiles(&path)).await?;

    println!("✅ {}", message);
    Ok(())
}

fn path_arg(dir: &Path) -> Result<String> {
    dir.to_str()
        .map(str::to_string)
        .with_context(|| format!("Path is not valid UTF-8: {}", dir.display()))
}
