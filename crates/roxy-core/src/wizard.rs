//! Add-user wizard: `Prepare -> Login -> Finalize`, layered on the session store.
//!
//! Only two steps talk to the backend. `prepare_for_new_user` snapshots the current
//! profile and clears the browser's login state; `finalize_new_user` captures the
//! account the user just logged into. Between them the user moves freely between
//! `Login` and `Finalize`. `Prepare` cannot be re-entered from a later step because
//! clearing the login state again is not safe to repeat silently.

use crate::boundary::{BoundaryResult, CommandBoundary};
use crate::error::{PreconditionError, Result};
use crate::model::UserList;
use crate::store::SessionStore;
use std::fmt;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum WizardStep {
    #[default]
    Prepare,
    Login,
    Finalize,
}

impl WizardStep {
    pub fn index(self) -> u8 {
        match self {
            WizardStep::Prepare => 0,
            WizardStep::Login => 1,
            WizardStep::Finalize => 2,
        }
    }

    pub fn title(self) -> &'static str {
        match self {
            WizardStep::Prepare => "Prepare",
            WizardStep::Login => "Log in",
            WizardStep::Finalize => "Save",
        }
    }
}

impl TryFrom<u8> for WizardStep {
    type Error = PreconditionError;

    fn try_from(index: u8) -> std::result::Result<Self, Self::Error> {
        match index {
            0 => Ok(WizardStep::Prepare),
            1 => Ok(WizardStep::Login),
            2 => Ok(WizardStep::Finalize),
            other => Err(PreconditionError::InvalidStep(other)),
        }
    }
}

impl fmt::Display for WizardStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            WizardStep::Prepare => "prepare",
            WizardStep::Login => "login",
            WizardStep::Finalize => "finalize",
        };
        f.write_str(name)
    }
}

/// Wizard progress. `session` increases on every open so that a late backend
/// response can tell whether the wizard it was started from is still showing.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct WizardState {
    pub open: bool,
    pub step: WizardStep,
    pub session: u64,
}

impl WizardState {
    fn require(&self, expected: WizardStep) -> std::result::Result<(), PreconditionError> {
        if !self.open {
            return Err(PreconditionError::WizardClosed);
        }
        if self.step != expected {
            return Err(PreconditionError::WrongWizardStep {
                expected,
                actual: self.step,
            });
        }
        Ok(())
    }

    fn is_session(&self, session: u64) -> bool {
        self.open && self.session == session
    }

    fn closed(&self) -> Self {
        Self {
            open: false,
            step: WizardStep::Prepare,
            session: self.session,
        }
    }
}

impl<B: CommandBoundary> SessionStore<B> {
    /// Open the wizard at `Prepare`, discarding any earlier progress
    pub fn open_wizard(&self) {
        self.state.send_modify(|state| {
            state.wizard = WizardState {
                open: true,
                step: WizardStep::Prepare,
                session: state.wizard.session + 1,
            };
        });
        tracing::debug!("Add-user wizard opened");
    }

    /// Close the wizard from any step. Backend effects already committed stay in place.
    pub fn close_wizard(&self) {
        self.state.send_modify(|state| state.wizard = state.wizard.closed());
        tracing::debug!("Add-user wizard closed");
    }

    /// Move between `Login` and `Finalize`
    pub fn set_wizard_step(&self, step: WizardStep) -> std::result::Result<(), PreconditionError> {
        let mut verdict = Ok(());

        self.state.send_if_modified(|state| {
            let wizard = &mut state.wizard;
            verdict = if state.busy {
                Err(PreconditionError::Busy {
                    operation: "set_wizard_step",
                })
            } else if !wizard.open {
                Err(PreconditionError::WizardClosed)
            } else if wizard.step == WizardStep::Prepare || step == WizardStep::Prepare {
                Err(PreconditionError::StepNotReachable {
                    from: wizard.step,
                    to: step,
                })
            } else {
                Ok(())
            };

            if verdict.is_err() || wizard.step == step {
                return false;
            }
            wizard.step = step;
            true
        });

        verdict
    }

    /// Snapshot the current profile and clear the login state; advances to `Login`
    /// on success. A failure leaves the wizard at `Prepare` for a retry.
    pub async fn prepare_for_new_user(&self) -> Result<()> {
        let mut session = 0;
        let guard = self.begin("prepare_for_new_user", |state| {
            state.wizard.require(WizardStep::Prepare)?;
            session = state.wizard.session;
            Ok(())
        })?;

        let outcome = self.boundary.prepare_for_new_user().await;

        self.finish(guard, outcome, |state, _| {
            if state.wizard.is_session(session) {
                state.wizard.step = WizardStep::Login;
            }
        })
    }

    /// Capture the newly logged-in account, reload the profiles and close the wizard.
    /// A failure leaves the wizard at `Finalize` for a retry.
    pub async fn finalize_new_user(&self) -> Result<()> {
        let mut session = 0;
        let guard = self.begin("finalize_new_user", |state| {
            state.wizard.require(WizardStep::Finalize)?;
            session = state.wizard.session;
            Ok(())
        })?;

        let outcome: BoundaryResult<UserList> = async {
            self.boundary.finalize_new_user().await?;
            self.boundary.list_users().await
        }
        .await;

        self.finish(guard, outcome, |state, list| {
            state.apply_users(list);
            if state.wizard.is_session(session) {
                state.wizard = state.wizard.closed();
            }
        })?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::StoreError;
    use crate::testing::{FakeBoundary, profile};
    use std::sync::Arc;

    async fn store() -> Arc<SessionStore<FakeBoundary>> {
        let boundary = FakeBoundary::with_users(vec![profile("a@x.com")], Some("a@x.com"));
        let store = Arc::new(SessionStore::new(boundary));
        store.load_users().await.unwrap();
        store.boundary.clear_calls();
        store
    }

    fn wizard(store: &SessionStore<FakeBoundary>) -> (bool, u8) {
        let wizard = store.snapshot().wizard;
        (wizard.open, wizard.step.index())
    }

    #[test]
    fn test_step_from_index() {
        assert_eq!(WizardStep::try_from(2).unwrap(), WizardStep::Finalize);
        assert_eq!(
            WizardStep::try_from(3).unwrap_err(),
            PreconditionError::InvalidStep(3)
        );
    }

    #[tokio::test]
    async fn test_full_wizard_sequence() {
        let store = store().await;

        store.open_wizard();
        assert_eq!(wizard(&store), (true, 0));

        store.prepare_for_new_user().await.unwrap();
        assert_eq!(wizard(&store), (true, 1));

        store.set_wizard_step(WizardStep::Finalize).unwrap();
        assert_eq!(wizard(&store), (true, 2));

        store.finalize_new_user().await.unwrap();
        assert_eq!(wizard(&store), (false, 0));

        let calls = store.boundary.calls();
        assert_eq!(
            calls,
            vec!["prepare_for_new_user", "finalize_new_user", "list_users"]
        );
        assert_eq!(calls.iter().filter(|c| **c == "list_users").count(), 1);
    }

    #[tokio::test]
    async fn test_finalize_keeps_existing_profiles() {
        let store = store().await;
        let before: Vec<String> = store.snapshot().profiles.keys().cloned().collect();

        store.open_wizard();
        store.prepare_for_new_user().await.unwrap();
        store.set_wizard_step(WizardStep::Finalize).unwrap();
        store.finalize_new_user().await.unwrap();

        let after = store.snapshot();
        assert!(before.iter().all(|email| after.profiles.contains_key(email)));
        assert_eq!(after.profiles.len(), before.len() + 1);
        assert_eq!(after.current_user.as_deref(), Some("new@x.com"));
    }

    #[tokio::test]
    async fn test_open_resets_stale_progress() {
        let store = store().await;
        store.open_wizard();
        store.prepare_for_new_user().await.unwrap();
        store.set_wizard_step(WizardStep::Finalize).unwrap();
        assert_eq!(wizard(&store), (true, 2));

        store.open_wizard();

        assert_eq!(wizard(&store), (true, 0));
    }

    #[tokio::test]
    async fn test_close_from_any_step() {
        let store = store().await;
        store.open_wizard();
        store.prepare_for_new_user().await.unwrap();

        store.close_wizard();

        assert_eq!(wizard(&store), (false, 0));
    }

    #[tokio::test]
    async fn test_failed_prepare_stays_on_prepare() {
        let store = store().await;
        store.boundary.fail("prepare_for_new_user", "RoxyBrowser is locked");
        store.open_wizard();

        let err = store.prepare_for_new_user().await.unwrap_err();

        assert!(matches!(err, StoreError::Boundary(_)));
        let state = store.snapshot();
        assert_eq!((state.wizard.open, state.wizard.step), (true, WizardStep::Prepare));
        assert_eq!(state.error.as_deref(), Some("RoxyBrowser is locked"));
        assert!(!state.busy);
    }

    #[tokio::test]
    async fn test_failed_finalize_stays_on_finalize() {
        let store = store().await;
        store.open_wizard();
        store.prepare_for_new_user().await.unwrap();
        store.set_wizard_step(WizardStep::Finalize).unwrap();
        store.boundary.fail("finalize_new_user", "no logged-in user detected");

        assert!(store.finalize_new_user().await.is_err());

        assert_eq!(wizard(&store), (true, 2));
        assert!(store.snapshot().error.is_some());

        store.boundary.recover("finalize_new_user");
        store.finalize_new_user().await.unwrap();
        assert_eq!(wizard(&store), (false, 0));
        assert!(store.snapshot().error.is_none());
    }

    #[tokio::test]
    async fn test_prepare_requires_open_wizard_at_prepare() {
        let store = store().await;

        let err = store.prepare_for_new_user().await.unwrap_err();
        assert_eq!(err, StoreError::Precondition(PreconditionError::WizardClosed));

        store.open_wizard();
        store.prepare_for_new_user().await.unwrap();
        let err = store.prepare_for_new_user().await.unwrap_err();
        assert!(matches!(
            err,
            StoreError::Precondition(PreconditionError::WrongWizardStep { .. })
        ));
        assert_eq!(store.boundary.calls(), vec!["prepare_for_new_user"]);
    }

    #[tokio::test]
    async fn test_finalize_requires_finalize_step() {
        let store = store().await;
        store.open_wizard();
        store.prepare_for_new_user().await.unwrap();

        let err = store.finalize_new_user().await.unwrap_err();

        assert!(err.is_precondition());
        assert_eq!(wizard(&store), (true, 1));
    }

    #[tokio::test]
    async fn test_navigation_between_login_and_finalize() {
        let store = store().await;
        store.open_wizard();

        assert!(store.set_wizard_step(WizardStep::Login).is_err());

        store.prepare_for_new_user().await.unwrap();
        store.set_wizard_step(WizardStep::Finalize).unwrap();
        store.set_wizard_step(WizardStep::Login).unwrap();
        assert_eq!(wizard(&store), (true, 1));

        let err = store.set_wizard_step(WizardStep::Prepare).unwrap_err();
        assert_eq!(
            err,
            PreconditionError::StepNotReachable {
                from: WizardStep::Login,
                to: WizardStep::Prepare,
            }
        );
        assert_eq!(wizard(&store), (true, 1));
    }

    #[tokio::test]
    async fn test_closed_wizard_rejects_navigation() {
        let store = store().await;

        let err = store.set_wizard_step(WizardStep::Finalize).unwrap_err();

        assert_eq!(err, PreconditionError::WizardClosed);
    }

    #[tokio::test]
    async fn test_late_finalize_after_close_still_reloads_users() {
        let store = store().await;
        store.open_wizard();
        store.prepare_for_new_user().await.unwrap();
        store.set_wizard_step(WizardStep::Finalize).unwrap();
        let release = store.boundary.hold("finalize_new_user");
        let mut updates = store.subscribe();

        let task = {
            let store = store.clone();
            tokio::spawn(async move { store.finalize_new_user().await })
        };
        updates.wait_for(|state| state.busy).await.unwrap();

        store.close_wizard();
        store.open_wizard();
        release.send(()).unwrap();
        task.await.unwrap().unwrap();

        let state = store.snapshot();
        assert!(state.profiles.contains_key("new@x.com"));
        // The wizard reopened in the meantime keeps its own progress
        assert_eq!((state.wizard.open, state.wizard.step), (true, WizardStep::Prepare));
    }
}
