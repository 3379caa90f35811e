use crate::{Error, Result};
use std::path::{Path, PathBuf};

/// Locates the RoxyBrowser executable on the system
pub struct RoxyFinder {
    custom_path: Option<PathBuf>,
    auto_detect: bool,
}

impl RoxyFinder {
    /// Create a new RoxyFinder with optional custom path
    pub fn new(custom_path: Option<PathBuf>) -> Self {
        Self {
            custom_path,
            auto_detect: true,
        }
    }

    /// Whether platform default locations are searched when no custom path is set
    pub fn with_auto_detect(mut self, enabled: bool) -> Self {
        self.auto_detect = enabled;
        self
    }

    /// Find RoxyBrowser, checking the custom path first, then platform defaults
    pub fn find(&self) -> Result<PathBuf> {
        if let Some(ref path) = self.custom_path {
            match Self::validate(path) {
                Ok(path) => return Ok(path),
                Err(e) => tracing::warn!("Configured RoxyBrowser path rejected: {}", e),
            }
        }

        if !self.auto_detect {
            return Err(Error::Browser(
                "RoxyBrowser path is not configured and auto-detection is disabled. \
                 Use 'roxy-manager settings set-path' to specify its location."
                    .to_string(),
            ));
        }

        if let Some(path) = Self::auto_detect() {
            return Ok(path);
        }

        Err(Error::Browser(format!(
            "RoxyBrowser not found. Checked: {}. Use 'roxy-manager settings set-path' to specify its location.",
            Self::default_paths()
                .iter()
                .map(|p| p.display().to_string())
                .collect::<Vec<_>>()
                .join(", ")
        )))
    }

    /// First valid executable among the platform defaults, then `PATH`
    pub fn auto_detect() -> Option<PathBuf> {
        let found = Self::default_paths()
            .into_iter()
            .find_map(|path| Self::validate(&path).ok());

        if found.is_some() {
            return found;
        }

        which::which("roxybrowser")
            .ok()
            .and_then(|path| Self::validate(&path).ok())
    }

    /// Get platform-specific default RoxyBrowser paths, most specific first
    pub fn default_paths() -> Vec<PathBuf> {
        #[cfg(target_os = "windows")]
        return Self::windows_default_paths();

        #[cfg(target_os = "macos")]
        return vec![PathBuf::from(
            "/Applications/RoxyBrowser.app/Contents/MacOS/RoxyBrowser",
        )];

        #[cfg(target_os = "linux")]
        return vec![
            PathBuf::from("/usr/bin/roxybrowser"),
            PathBuf::from("/usr/local/bin/roxybrowser"),
        ];

        #[cfg(not(any(target_os = "macos", target_os = "linux", target_os = "windows")))]
        return vec![];
    }

    #[cfg(target_os = "windows")]
    fn windows_default_paths() -> Vec<PathBuf> {
        let mut paths = Vec::new();
        if let Some(local) = dirs::data_local_dir() {
            paths.push(local.join("Programs").join("RoxyBrowser").join("RoxyBrowser.exe"));
        }
        for drive in ['C', 'D', 'E', 'F'] {
            paths.push(PathBuf::from(format!(
                r"{}:\Program Files\RoxyBrowser\RoxyBrowser.exe",
                drive
            )));
            paths.push(PathBuf::from(format!(
                r"{}:\Program Files (x86)\RoxyBrowser\RoxyBrowser.exe",
                drive
            )));
        }
        paths
    }

    /// Validate that a path is an executable RoxyBrowser binary
    pub fn validate(path: &Path) -> Result<PathBuf> {
        if !path.exists() {
            return Err(Error::Browser(format!(
                "RoxyBrowser not found at: {}",
                path.display()
            )));
        }

        if !path.is_file() {
            return Err(Error::Browser(format!(
                "Not a file: {}",
                path.display()
            )));
        }

        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().to_lowercase())
            .unwrap_or_default();
        if !Self::is_roxy_file_name(&name) {
            return Err(Error::Browser(format!(
                "Not a RoxyBrowser executable: {}",
                path.display()
            )));
        }

        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            let metadata = std::fs::metadata(path).map_err(Error::Io)?;
            if metadata.permissions().mode() & 0o111 == 0 {
                return Err(Error::Browser(format!(
                    "RoxyBrowser binary not executable: {}",
                    path.display()
                )));
            }
        }

        Ok(path.to_path_buf())
    }

    fn is_roxy_file_name(lowercase_name: &str) -> bool {
        #[cfg(target_os = "windows")]
        return lowercase_name == "roxybrowser.exe";

        #[cfg(not(target_os = "windows"))]
        return lowercase_name == "roxybrowser";
    }
}
