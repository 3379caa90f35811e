use crate::{Error, Result, RoxyFinder};
use std::path::PathBuf;
use std::process::{Command, Stdio};

/// Starts RoxyBrowser detached from the manager
pub struct RoxyLauncher {
    executable: Option<PathBuf>,
    auto_detect: bool,
}

impl RoxyLauncher {
    /// Create a new RoxyLauncher; `executable` is the user-configured path, if any
    pub fn new(executable: Option<PathBuf>, auto_detect: bool) -> Self {
        Self {
            executable,
            auto_detect,
        }
    }

    /// Launch RoxyBrowser
    pub fn launch(&self) -> Result<()> {
        let mut command = self.build_command()?;
        tracing::debug!("Launching RoxyBrowser: {:?}", command);

        command
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .spawn()
            .map_err(|e| Error::Browser(format!("Failed to launch RoxyBrowser: {}", e)))?;

        tracing::info!("RoxyBrowser launched");
        Ok(())
    }

    /// Build the platform launch command
    fn build_command(&self) -> Result<Command> {
        // Without a configured binary, macOS resolves the app bundle itself
        #[cfg(target_os = "macos")]
        if self.executable.is_none() {
            let mut command = Command::new("open");
            command.args(["-a", "RoxyBrowser"]);
            return Ok(command);
        }

        let path = RoxyFinder::new(self.executable.clone())
            .with_auto_detect(self.auto_detect)
            .find()?;
        Ok(Command::new(path))
    }
}
