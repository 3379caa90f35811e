use crate::{Error, Result};
use roxy_core::{Profile, UserList};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Browser data items that make up a login snapshot
pub const BACKUP_ITEMS: &[&str] = &[
    "config.json",
    "Local Storage",
    "Cookies",
    "Session Storage",
    "IndexedDB",
];

const CONFIG_VERSION: u32 = 1;

/// The manager's `config.json`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VaultConfig {
    #[serde(default = "default_version")]
    pub version: u32,
    #[serde(rename = "currentUser")]
    pub current_user: Option<String>,
    #[serde(default)]
    pub users: Vec<Profile>,
}

fn default_version() -> u32 {
    CONFIG_VERSION
}

impl Default for VaultConfig {
    fn default() -> Self {
        Self {
            version: CONFIG_VERSION,
            current_user: None,
            users: Vec::new(),
        }
    }
}

impl VaultConfig {
    pub fn contains(&self, email: &str) -> bool {
        self.users.iter().any(|u| u.email == email)
    }

    pub fn user_mut(&mut self, email: &str) -> Option<&mut Profile> {
        self.users.iter_mut().find(|u| u.email == email)
    }

    pub fn to_user_list(&self) -> UserList {
        UserList {
            users: self.users.clone(),
            current_user: self.current_user.clone(),
        }
    }
}

/// Saved login snapshots plus the live browser data directory they are swapped into
#[derive(Debug, Clone)]
pub struct ProfileVault {
    home: PathBuf,
    browser_data: PathBuf,
}

impl ProfileVault {
    pub fn new(home: PathBuf, browser_data: PathBuf) -> Self {
        Self { home, browser_data }
    }

    /// `~/.roxy_manager`
    pub fn default_home() -> Result<PathBuf> {
        dirs::home_dir()
            .map(|home| home.join(".roxy_manager"))
            .ok_or_else(|| Error::Profile("Could not determine home directory".to_string()))
    }

    /// Where RoxyBrowser keeps its own data on this platform
    pub fn default_browser_data_dir() -> Result<PathBuf> {
        #[cfg(target_os = "macos")]
        let base = dirs::home_dir().map(|home| home.join("Library/Application Support"));

        #[cfg(target_os = "windows")]
        let base = dirs::data_dir();

        #[cfg(not(any(target_os = "macos", target_os = "windows")))]
        let base = dirs::config_dir();

        base.map(|dir| dir.join("RoxyBrowser")).ok_or_else(|| {
            Error::Profile("Could not determine RoxyBrowser data directory".to_string())
        })
    }

    pub fn home(&self) -> &Path {
        &self.home
    }

    pub fn browser_data(&self) -> &Path {
        &self.browser_data
    }

    pub fn profiles_dir(&self) -> PathBuf {
        self.home.join("profiles")
    }

    pub fn config_path(&self) -> PathBuf {
        self.home.join("config.json")
    }

    /// Snapshot directory for `email`
    pub fn profile_dir(&self, email: &str) -> Result<PathBuf> {
        validate_email_component(email)?;
        Ok(self.profiles_dir().join(email))
    }

    pub fn has_snapshot(&self, email: &str) -> bool {
        self.profile_dir(email).map(|dir| dir.is_dir()).unwrap_or(false)
    }

    /// Load `config.json`; a missing or unreadable file yields an empty config
    pub fn load_config(&self) -> VaultConfig {
        let path = self.config_path();
        if !path.exists() {
            return VaultConfig::default();
        }

        let parsed = fs::read_to_string(&path)
            .map_err(Error::from)
            .and_then(|content| serde_json::from_str(&content).map_err(Error::from));

        match parsed {
            Ok(config) => config,
            Err(e) => {
                tracing::warn!("Ignoring unreadable vault config {}: {}", path.display(), e);
                VaultConfig::default()
            }
        }
    }

    pub fn save_config(&self, config: &VaultConfig) -> Result<()> {
        fs::create_dir_all(&self.home)?;

        let content = serde_json::to_string_pretty(config)?;
        let path = self.config_path();
        let tmp = path.with_extension("json.tmp");
        fs::write(&tmp, content)?;
        fs::rename(&tmp, &path)?;

        tracing::debug!("Saved vault config with {} users", config.users.len());
        Ok(())
    }

    /// Copy the browser's login items into the snapshot for `email`
    pub fn backup(&self, email: &str) -> Result<()> {
        let profile_dir = self.profile_dir(email)?;
        fs::create_dir_all(&profile_dir)?;

        for item in BACKUP_ITEMS {
            let src = self.browser_data.join(item);
            if src.exists() {
                copy_item(&src, &profile_dir.join(item))?;
            }
        }

        tracing::debug!("Backed up browser data for {}", email);
        Ok(())
    }

    /// Replace the browser's login items with the snapshot for `email`
    pub fn restore(&self, email: &str) -> Result<()> {
        let profile_dir = self.profile_dir(email)?;
        if !profile_dir.is_dir() {
            return Err(Error::Profile(format!("No saved profile data for {}", email)));
        }

        fs::create_dir_all(&self.browser_data)?;
        for item in BACKUP_ITEMS {
            let dst = self.browser_data.join(item);
            remove_item(&dst)?;

            let src = profile_dir.join(item);
            if src.exists() {
                copy_item(&src, &dst)?;
            }
        }

        tracing::debug!("Restored browser data for {}", email);
        Ok(())
    }

    /// Remove every login item from the browser data directory
    pub fn clear_login_state(&self) -> Result<()> {
        for item in BACKUP_ITEMS {
            remove_item(&self.browser_data.join(item))?;
        }
        Ok(())
    }

    pub fn remove_snapshot(&self, email: &str) -> Result<()> {
        let dir = self.profile_dir(email)?;
        if dir.exists() {
            fs::remove_dir_all(&dir)?;
        }
        Ok(())
    }
}

/// Reject e-mails that would escape the profiles directory
fn validate_email_component(email: &str) -> Result<()> {
    let invalid = email.is_empty()
        || email == "."
        || email == ".."
        || email.contains(['/', '\\', '\0']);

    if invalid {
        return Err(Error::Profile(format!("Invalid profile e-mail: {:?}", email)));
    }
    Ok(())
}

fn copy_item(src: &Path, dst: &Path) -> Result<()> {
    if src.is_dir() {
        copy_dir_all(src, dst)
    } else {
        fs::copy(src, dst)?;
        Ok(())
    }
}

fn remove_item(path: &Path) -> Result<()> {
    if path.is_dir() {
        fs::remove_dir_all(path)?;
    } else if path.exists() {
        fs::remove_file(path)?;
    }
    Ok(())
}

/// Recursively copy `src` into `dst`, creating `dst` as needed
pub fn copy_dir_all(src: &Path, dst: &Path) -> Result<()> {
    fs::create_dir_all(dst)?;

    for entry in fs::read_dir(src)? {
        let entry = entry?;
        let target = dst.join(entry.file_name());
        if entry.file_type()?.is_dir() {
            copy_dir_all(&entry.path(), &target)?;
        } else {
            fs::copy(entry.path(), &target)?;
        }
    }
    Ok(())
}
