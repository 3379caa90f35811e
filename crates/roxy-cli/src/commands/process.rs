use super::with_spinner;
use crate::{AppContext, OutputFormat};
use anyhow::Result;
use console::style;
use roxy_core::{ProcessStatus, SessionState, StatusPoller};

/// Print whether RoxyBrowser is running and who is signed in
pub async fn status(ctx: &AppContext, format: OutputFormat) -> Result<()> {
    let (loaded, status) = tokio::join!(ctx.store.load_users(), ctx.store.refresh_status());
    loaded?;
    status?;

    let state = ctx.store.snapshot();
    if format.is_json() {
        let out = serde_json::json!({
            "isRunning": state.process.is_running,
            "pid": state.process.pid,
            "currentUser": state.current_user,
        });
        println!("{}", serde_json::to_string_pretty(&out)?);
        return Ok(());
    }

    print_status(&state);
    Ok(())
}

pub async fn start(ctx: &AppContext) -> Result<()> {
    ctx.store.refresh_status().await?;
    with_spinner("Starting RoxyBrowser...", ctx.store.start_roxy()).await?;

    println!("🚀 RoxyBrowser started");
    Ok(())
}

pub async fn stop(ctx: &AppContext) -> Result<()> {
    ctx.store.refresh_status().await?;
    with_spinner("Stopping RoxyBrowser...", ctx.store.stop_roxy()).await?;

    println!("🛑 RoxyBrowser stopped");
    Ok(())
}

/// Follow the browser status until Ctrl+C
pub async fn watch(ctx: &AppContext) -> Result<()> {
    let mut updates = ctx.store.subscribe();
    let poller = StatusPoller::spawn(ctx.store.clone(), ctx.settings.poll_interval());

    println!(
        "Watching RoxyBrowser every {}s. Press Ctrl+C to stop.",
        ctx.settings.poll_interval().as_secs()
    );

    let ctrl_c = tokio::signal::ctrl_c();
    tokio::pin!(ctrl_c);

    let mut shown: Option<(ProcessStatus, Option<String>)> = None;
    loop {
        tokio::select! {
            _ = &mut ctrl_c => {
                println!();
                break;
            }
            changed = updates.changed() => {
                if changed.is_err() {
                    break;
                }
                let state = updates.borrow_and_update().clone();
                let view = (state.process, state.current_user.clone());
                if shown.as_ref() != Some(&view) {
                    print_status(&state);
                    shown = Some(view);
                }
            }
        }
    }

    poller.stop().await;
    Ok(())
}

fn print_status(state: &SessionState) {
    let process = &state.process;
    let running = match process.pid {
        Some(pid) if process.is_running => {
            format!("{} (pid {})", style("running").green().bold(), pid)
        }
        _ if process.is_running => style("running").green().bold().to_string(),
        _ => style("stopped").red().to_string(),
    };

    let user = match state.current_profile() {
        Some(profile) => style(profile.email.as_str()).cyan().to_string(),
        None => style("none").dim().to_string(),
    };

    println!("RoxyBrowser: {}    Current profile: {}", running, user);
}
