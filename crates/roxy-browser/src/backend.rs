use crate::detect::detect_logged_in_email;
use crate::process::{ProcessControl, SystemProcess};
use crate::vault::ProfileVault;
use crate::{transfer, Error, Result};
use async_trait::async_trait;
use chrono::Utc;
use roxy_core::{BoundaryError, BoundaryResult, CommandBoundary, ProcessStatus, Profile, UserList};
use std::path::PathBuf;
use std::sync::Arc;

/// [`CommandBoundary`] that works directly on the local vault and browser process
pub struct LocalBackend<P: ProcessControl = SystemProcess> {
    inner: Arc<Inner<P>>,
}

struct Inner<P> {
    vault: ProfileVault,
    process: P,
}

impl<P: ProcessControl> LocalBackend<P> {
    pub fn new(vault: ProfileVault, process: P) -> Self {
        Self {
            inner: Arc::new(Inner { vault, process }),
        }
    }

    pub fn vault(&self) -> &ProfileVault {
        &self.inner.vault
    }

    /// Run blocking filesystem/process work off the async runtime
    async fn run<T, F>(&self, operation: &'static str, f: F) -> BoundaryResult<T>
    where
        T: Send + 'static,
        F: FnOnce(&Inner<P>) -> Result<T> + Send + 'static,
    {
        let inner = Arc::clone(&self.inner);
        let result = tokio::task::spawn_blocking(move || f(&inner))
            .await
            .map_err(|e| BoundaryError::new(format!("{} aborted: {}", operation, e)))?;

        result.map_err(|e| {
            tracing::warn!("{} failed: {}", operation, e);
            BoundaryError::from(e)
        })
    }
}

impl<P: ProcessControl> Inner<P> {
    fn switch_user(&self, email: &str) -> Result<()> {
        let mut config = self.vault.load_config();
        if !config.contains(email) {
            return Err(unknown_profile(email));
        }

        self.process.stop()?;
        if let Some(current) = config.current_user.as_deref() {
            self.vault.backup(current)?;
        }
        self.vault.restore(email)?;

        config.current_user = Some(email.to_string());
        if let Some(user) = config.user_mut(email) {
            user.last_used = Utc::now();
        }
        self.vault.save_config(&config)?;

        self.process.start()?;
        tracing::info!("Switched RoxyBrowser to {}", email);
        Ok(())
    }

    fn delete_user(&self, email: &str) -> Result<()> {
        let mut config = self.vault.load_config();
        if config.current_user.as_deref() == Some(email) {
            return Err(Error::Profile(format!("Cannot delete current user {}", email)));
        }
        if !config.contains(email) {
            return Err(unknown_profile(email));
        }

        config.users.retain(|u| u.email != email);
        self.vault.save_config(&config)?;
        self.vault.remove_snapshot(email)?;
        Ok(())
    }

    fn update_user_note(&self, email: &str, note: &str) -> Result<()> {
        let mut config = self.vault.load_config();
        let user = config.user_mut(email).ok_or_else(|| unknown_profile(email))?;
        user.note = note.to_string();
        self.vault.save_config(&config)
    }

    fn prepare_for_new_user(&self) -> Result<()> {
        let config = self.vault.load_config();

        self.process.stop()?;
        if let Some(current) = config.current_user.as_deref() {
            self.vault.backup(current)?;
        }
        self.vault.clear_login_state()?;
        self.process.start()
    }

    fn finalize_new_user(&self) -> Result<()> {
        self.process.stop()?;

        let email = detect_logged_in_email(self.vault.browser_data()).ok_or_else(|| {
            Error::Profile(
                "No logged-in user detected. Finish signing in to RoxyBrowser first.".to_string(),
            )
        })?;
        self.vault.backup(&email)?;

        let mut config = self.vault.load_config();
        let now = Utc::now();
        match config.user_mut(&email) {
            Some(user) => user.last_used = now,
            None => {
                tracing::info!("Adding new profile {}", email);
                config.users.push(Profile::new(email.clone(), now));
            }
        }
        config.current_user = Some(email);
        self.vault.save_config(&config)?;

        self.process.start()
    }
}

fn unknown_profile(email: &str) -> Error {
    Error::Profile(format!("Profile {} does not exist", email))
}

#[async_trait]
impl<P: ProcessControl> CommandBoundary for LocalBackend<P> {
    async fn list_users(&self) -> BoundaryResult<UserList> {
        self.run("list_users", |inner| Ok(inner.vault.load_config().to_user_list()))
            .await
    }

    async fn get_roxy_status(&self) -> BoundaryResult<ProcessStatus> {
        self.run("get_roxy_status", |inner| inner.process.status()).await
    }

    async fn switch_user(&self, email: &str) -> BoundaryResult<()> {
        let email = email.to_string();
        self.run("switch_user", move |inner| inner.switch_user(&email))
            .await
    }

    async fn delete_user(&self, email: &str) -> BoundaryResult<()> {
        let email = email.to_string();
        self.run("delete_user", move |inner| inner.delete_user(&email))
            .await
    }

    async fn update_user_note(&self, email: &str, note: &str) -> BoundaryResult<()> {
        let (email, note) = (email.to_string(), note.to_string());
        self.run("update_user_note", move |inner| {
            inner.update_user_note(&email, &note)
        })
        .await
    }

    async fn start_roxy(&self) -> BoundaryResult<()> {
        self.run("start_roxy", |inner| inner.process.start()).await
    }

    async fn stop_roxy(&self) -> BoundaryResult<()> {
        self.run("stop_roxy", |inner| inner.process.stop()).await
    }

    async fn prepare_for_new_user(&self) -> BoundaryResult<()> {
        self.run("prepare_for_new_user", |inner| inner.prepare_for_new_user())
            .await
    }

    async fn finalize_new_user(&self) -> BoundaryResult<()> {
        self.run("finalize_new_user", |inner| inner.finalize_new_user())
            .await
    }

    async fn export_profiles(&self, export_path: &str) -> BoundaryResult<String> {
        let path = PathBuf::from(export_path);
        self.run("export_profiles", move |inner| {
            transfer::export_profiles(&inner.vault, &path)
        })
        .await
    }

    async fn import_profiles(&self, import_path: &str) -> BoundaryResult<String> {
        let path = PathBuf::from(import_path);
        self.run("import_profiles", move |inner| {
            transfer::import_profiles(&inner.vault, &path)
        })
        .await
    }
}
