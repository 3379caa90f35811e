use crate::vault::{copy_dir_all, ProfileVault, VaultConfig};
use crate::{Error, Result};
use roxy_core::Profile;
use std::fs;
use std::path::{Path, PathBuf};

/// Write every saved profile and its snapshot into `export_dir`
pub fn export_profiles(vault: &ProfileVault, export_dir: &Path) -> Result<String> {
    let config = vault.load_config();
    if config.users.is_empty() || !vault.profiles_dir().exists() {
        return Err(Error::Profile("No profiles to export".to_string()));
    }

    fs::create_dir_all(export_dir)?;
    fs::write(
        export_dir.join("config.json"),
        serde_json::to_string_pretty(&config)?,
    )?;

    let target = export_dir.join("profiles");
    fs::create_dir_all(&target)?;
    for user in &config.users {
        let src = vault.profile_dir(&user.email)?;
        if src.is_dir() {
            copy_dir_all(&src, &target.join(&user.email))?;
        } else {
            tracing::warn!("No snapshot for {}, exporting metadata only", user.email);
        }
    }

    tracing::info!("Exported {} profiles to {}", config.users.len(), export_dir.display());
    Ok(format!(
        "Exported {} profiles to {}",
        config.users.len(),
        export_dir.display()
    ))
}

/// Merge profiles from an export directory; known e-mails are left untouched
pub fn import_profiles(vault: &ProfileVault, import_dir: &Path) -> Result<String> {
    if !import_dir.is_dir() {
        return Err(Error::Profile(format!(
            "Import directory does not exist: {}",
            import_dir.display()
        )));
    }

    let config_path = import_dir.join("config.json");
    if !config_path.exists() {
        return Err(Error::Profile(format!(
            "No config.json found in {}",
            import_dir.display()
        )));
    }

    let incoming: VaultConfig = serde_json::from_str(&fs::read_to_string(&config_path)?)
        .map_err(|e| Error::Profile(format!("Invalid export config: {}", e)))?;

    let mut config = vault.load_config();

    // Every e-mail is checked before the first copy so a bad entry leaves the vault untouched.
    let mut pending: Vec<(Profile, PathBuf)> = Vec::new();
    for user in incoming.users {
        if config.contains(&user.email) || pending.iter().any(|(p, _)| p.email == user.email) {
            tracing::debug!("Skipping {}, already present", user.email);
            continue;
        }
        let dst = vault.profile_dir(&user.email)?;
        pending.push((user, dst));
    }

    let imported = pending.len();
    for (user, dst) in pending {
        let src = import_dir.join("profiles").join(&user.email);
        if src.is_dir() {
            copy_dir_all(&src, &dst)?;
        }
        config.users.push(user);
    }

    vault.save_config(&config)?;

    tracing::info!("Imported {} profiles from {}", imported, import_dir.display());
    Ok(format!("Imported {} profiles", imported))
}
