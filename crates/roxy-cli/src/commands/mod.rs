pub mod completion;
pub mod process;
pub mod profile;
pub mod settings;
pub mod transfer;
pub mod wizard;

use indicatif::{ProgressBar, ProgressStyle};
use std::future::Future;
use std::time::Duration;

/// Show a spinner on stderr while `work` runs
pub(crate) async fn with_spinner<F, T>(message: impl Into<String>, work: F) -> T
where
    F: Future<Output = T>,
{
    let spinner = ProgressBar::new_spinner();
    if let Ok(style) = ProgressStyle::with_template("{spinner:.cyan} {msg}") {
        spinner.set_style(style);
    }
    spinner.set_message(message.into());
    spinner.enable_steady_tick(Duration::from_millis(100));

    let result = work.await;
    spinner.finish_and_clear();
    result
}
