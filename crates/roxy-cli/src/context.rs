use anyhow::{Context, Result};
use roxy_browser::{LocalBackend, ProfileVault, RoxyLauncher, Settings, SettingsStore, SystemProcess};
use roxy_core::SessionStore;
use std::path::PathBuf;
use std::sync::Arc;

/// Locations given on the command line or through the environment
#[derive(Debug, Clone, Default)]
pub struct PathOverrides {
    pub home: Option<PathBuf>,
    pub browser_data: Option<PathBuf>,
    pub settings: Option<PathBuf>,
}

/// Composition root: wires settings, vault and process control into one session store
pub struct AppContext {
    pub settings_store: SettingsStore,
    pub settings: Settings,
    pub store: Arc<SessionStore<LocalBackend>>,
}

impl AppContext {
    pub fn new(paths: &PathOverrides) -> Result<Self> {
        let settings_store = SettingsStore::new(match &paths.settings {
            Some(path) => path.clone(),
            None => SettingsStore::default_path()?,
        });
        let settings = settings_store
            .load()
            .with_context(|| format!("Failed to load {}", settings_store.path().display()))?;

        let home = match &paths.home {
            Some(home) => home.clone(),
            None => ProfileVault::default_home()?,
        };
        let browser_data = match &paths.browser_data {
            Some(dir) => dir.clone(),
            None => ProfileVault::default_browser_data_dir()?,
        };
        tracing::debug!(
            "Vault at {}, browser data at {}",
            home.display(),
            browser_data.display()
        );

        let launcher = RoxyLauncher::new(settings.roxy_exe_path.clone(), settings.auto_detect_enabled);
        let backend = LocalBackend::new(
            ProfileVault::new(home, browser_data),
            SystemProcess::new(launcher),
        );

        Ok(Self {
            settings_store,
            settings,
            store: Arc::new(SessionStore::new(backend)),
        })
    }
}
