use crate::{Error, Result, RoxyLauncher};
use roxy_core::ProcessStatus;
use std::time::{Duration, Instant};
use sysinfo::{ProcessesToUpdate, System};

/// Substring matched (case-insensitively) against process names
pub const PROCESS_NAME: &str = "RoxyBrowser";

const STOP_TIMEOUT: Duration = Duration::from_secs(3);
const STOP_POLL: Duration = Duration::from_millis(100);

/// Supervises the external browser process
pub trait ProcessControl: Send + Sync + 'static {
    fn status(&self) -> Result<ProcessStatus>;

    fn start(&self) -> Result<()>;

    /// Terminate every browser process; succeeds when none is running
    fn stop(&self) -> Result<()>;
}

/// [`ProcessControl`] backed by the operating system's process table
pub struct SystemProcess {
    launcher: RoxyLauncher,
}

impl SystemProcess {
    pub fn new(launcher: RoxyLauncher) -> Self {
        Self { launcher }
    }

    fn snapshot() -> System {
        let mut system = System::new();
        system.refresh_processes(ProcessesToUpdate::All, true);
        system
    }

    fn is_roxy(name: &std::ffi::OsStr) -> bool {
        name.to_string_lossy()
            .to_lowercase()
            .contains(&PROCESS_NAME.to_lowercase())
    }

    fn running_pids(system: &System) -> Vec<u32> {
        let mut pids: Vec<u32> = system
            .processes()
            .iter()
            .filter(|(_, process)| Self::is_roxy(process.name()))
            .map(|(pid, _)| pid.as_u32())
            .collect();
        pids.sort_unstable();
        pids
    }
}

impl ProcessControl for SystemProcess {
    fn status(&self) -> Result<ProcessStatus> {
        let system = Self::snapshot();
        Ok(match Self::running_pids(&system).first() {
            Some(pid) => ProcessStatus::running(*pid),
            None => ProcessStatus::stopped(),
        })
    }

    fn start(&self) -> Result<()> {
        self.launcher.launch()
    }

    fn stop(&self) -> Result<()> {
        let system = Self::snapshot();
        let mut killed = 0;
        for process in system.processes().values() {
            if Self::is_roxy(process.name()) && process.kill() {
                killed += 1;
            }
        }

        if killed == 0 {
            tracing::debug!("RoxyBrowser not running, nothing to stop");
            return Ok(());
        }
        tracing::debug!("Sent kill to {} RoxyBrowser process(es)", killed);

        let deadline = Instant::now() + STOP_TIMEOUT;
        loop {
            let remaining = Self::running_pids(&Self::snapshot());
            if remaining.is_empty() {
                tracing::info!("RoxyBrowser stopped");
                return Ok(());
            }
            if Instant::now() >= deadline {
                return Err(Error::Browser(format!(
                    "RoxyBrowser did not exit within {}s (pids: {:?})",
                    STOP_TIMEOUT.as_secs(),
                    remaining
                )));
            }
            std::thread::sleep(STOP_POLL);
        }
    }
}
