use super::with_spinner;
use crate::AppContext;
use anyhow::Result;
use console::{Term, style};
use roxy_core::WizardStep;

enum Key {
    Continue,
    Back,
    Quit,
    Other,
}

/// Interactive add-profile wizard: prepare, log in, save
pub async fn add(ctx: &AppContext, yes: bool) -> Result<()> {
    ctx.store.load_users().await?;
    ctx.store.open_wizard();

    let result = drive(ctx, yes).await;

    if ctx.store.snapshot().wizard.open {
        ctx.store.close_wizard();
    }
    result
}

async fn drive(ctx: &AppContext, yes: bool) -> Result<()> {
    let mut auto_prepare = yes;

    loop {
        let state = ctx.store.snapshot();
        if !state.wizard.open {
            break;
        }
        let step = state.wizard.step;
        println!(
            "\n{} {}",
            style(format!("[{}/3]", step.index() + 1)).cyan(),
            style(step.title()).bold()
        );

        match step {
            WizardStep::Prepare => {
                println!("The current login will be saved and RoxyBrowser restarted signed out.");
                if let Some(current) = &state.current_user {
                    println!("  Current profile {} is backed up first.", style(current).green());
                }

                let key = if auto_prepare {
                    auto_prepare = false;
                    Key::Continue
                } else {
                    prompt("Press Enter to continue, q to cancel").await?
                };

                match key {
                    Key::Quit => return cancelled(),
                    Key::Continue => {
                        let outcome = with_spinner(
                            "Preparing RoxyBrowser for a new login...",
                            ctx.store.prepare_for_new_user(),
                        )
                        .await;
                        if let Err(e) = outcome {
                            report_failure(&e);
                        }
                    }
                    _ => {}
                }
            }
            WizardStep::Login => {
                println!("Sign in to the new account in RoxyBrowser.");
                match prompt("Press Enter once you are logged in, q to cancel").await? {
                    Key::Quit => return cancelled(),
                    Key::Continue => ctx.store.set_wizard_step(WizardStep::Finalize)?,
                    _ => {}
                }
            }
            WizardStep::Finalize => {
                println!("RoxyBrowser will be restarted and the logged-in account saved.");
                match prompt("Press Enter to save, b to go back, q to cancel").await? {
                    Key::Quit => return cancelled(),
                    Key::Back => ctx.store.set_wizard_step(WizardStep::Login)?,
                    Key::Continue => {
                        let outcome = with_spinner(
                            "Saving the new profile...",
                            ctx.store.finalize_new_user(),
                        )
                        .await;
                        if let Err(e) = outcome {
                            report_failure(&e);
                        }
                    }
                    Key::Other => {}
                }
            }
        }
    }

    let state = ctx.store.snapshot();
    match state.current_profile() {
        Some(profile) => println!(
            "\n✅ Profile {} saved and active",
            style(&profile.email).green().bold()
        ),
        None => println!("\n✅ Profile saved"),
    }
    Ok(())
}

fn report_failure(err: &roxy_core::StoreError) {
    println!("{} {}", style("✗").red().bold(), style(err).red());
    println!("{}", style("You can retry this step or press q to cancel.").dim());
}

fn cancelled() -> Result<()> {
    println!("Wizard cancelled.");
    Ok(())
}

async fn prompt(message: &str) -> Result<Key> {
    println!("{}", style(message).dim());

    let key = tokio::task::spawn_blocking(|| Term::stdout().read_char()).await??;
    Ok(match key.to_lowercase().next().unwrap_or(' ') {
        '\n' | '\r' | 'y' => Key::Continue,
        'b' => Key::Back,
        'q' | '\u{1b}' => Key::Quit,
        _ => Key::Other,
    })
}
