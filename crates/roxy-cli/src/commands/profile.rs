//! Saved-profile commands: list, switch, delete and annotate RoxyBrowser accounts.
//!
//! ```bash
//! roxy-manager list
//! roxy-manager switch alice@example.com
//! roxy-manager note alice@example.com "work account"
//! roxy-manager delete old@example.com
//! ```

use super::with_spinner;
use crate::{AppContext, OutputFormat};
use anyhow::{Result, bail};
use console::style;
use roxy_core::SessionState;
use serde_json::json;
use std::io::{self, Write};

/// List all saved profiles, most recently used first
pub async fn list(ctx: &AppContext, format: OutputFormat) -> Result<()> {
    ctx.store.load_users().await?;
    let state = ctx.store.snapshot();
    let profiles = state.profiles_by_recent_use();

    if format.is_json() {
        let out = json!({
            "users": profiles,
            "currentUser": state.current_user,
        });
        println!("{}", serde_json::to_string_pretty(&out)?);
        return Ok(());
    }

    if profiles.is_empty() {
        println!("No profiles saved yet. Run 'roxy-manager add' to capture one.");
        return Ok(());
    }

    println!("{}", style("Saved profiles:").bold());
    println!();
    for profile in profiles {
        let current = state.is_current(&profile.email);
        let marker = if current { "* " } else { "  " };
        let email = if current {
            style(profile.email.as_str()).green().bold()
        } else {
            style(profile.email.as_str())
        };

        println!(
            "{}{:<32} {:<16} {}",
            marker,
            email,
            profile.display_name,
            style(profile.last_used.format("%Y-%m-%d %H:%M")).dim()
        );
        if !profile.note.is_empty() {
            println!("    {}", style(&profile.note).italic());
        }
    }

    Ok(())
}

/// Swap the browser's login state to another saved profile
pub async fn switch(ctx: &AppContext, email: &str) -> Result<()> {
    ctx.store.load_users().await?;
    require_known(&ctx.store.snapshot(), email)?;

    with_spinner(
        format!("Switching RoxyBrowser to {}...", email),
        ctx.store.switch_user(email),
    )
    .await?;

    println!("✅ Switched to {}", style(email).green().bold());
    if !ctx.store.snapshot().process.is_running {
        println!(
            "{}",
            style("RoxyBrowser does not appear to be running yet.").yellow()
        );
    }
    Ok(())
}

/// Delete a saved profile and its snapshot
pub async fn delete(ctx: &AppContext, email: &str, force: bool) -> Result<()> {
    ctx.store.load_users().await?;
    let state = ctx.store.snapshot();
    require_known(&state, email)?;

    if !force && !state.is_current(email) {
        print!(
            "⚠️  This will permanently delete profile '{}' and its saved login data.\nType '{}' to confirm: ",
            email, email
        );
        io::stdout().flush()?;

        let mut input = String::new();
        io::stdin().read_line(&mut input)?;

        if input.trim() != email {
            println!("Deletion cancelled.");
            return Ok(());
        }
    }

    ctx.store.delete_user(email).await?;
    println!("✅ Profile '{}' deleted", email);
    Ok(())
}

/// Attach a free-text note to a profile
pub async fn note(ctx: &AppContext, email: &str, text: &str) -> Result<()> {
    ctx.store.load_users().await?;
    require_known(&ctx.store.snapshot(), email)?;

    ctx.store.update_user_note(email, text).await?;
    if text.is_empty() {
        println!("✅ Note cleared for {}", email);
    } else {
        println!("✅ Note saved for {}", email);
    }
    Ok(())
}

fn require_known(state: &SessionState, email: &str) -> Result<()> {
    if !state.profiles.contains_key(email) {
        bail!("Profile '{}' not found", email);
    }
    Ok(())
}
