//! Local RoxyBrowser backend: profile snapshots on disk, browser process
//! supervision, executable discovery, settings and export/import.

mod backend;
pub mod detect;
mod error;
mod finder;
mod launcher;
mod process;
mod settings;
pub mod transfer;
pub mod vault;

pub use backend::LocalBackend;
pub use error::{Error, Result};
pub use finder::RoxyFinder;
pub use launcher::RoxyLauncher;
pub use process::{PROCESS_NAME, ProcessControl, SystemProcess};
pub use settings::{Settings, SettingsStore};
pub use vault::{ProfileVault, VaultConfig};
