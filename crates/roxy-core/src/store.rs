use crate::boundary::{BoundaryResult, CommandBoundary};
use crate::error::{BoundaryError, PreconditionError, Result};
use crate::model::{ProcessStatus, SessionState, UserList};
use tokio::sync::watch;

/// Sole owner of [`SessionState`] and the only caller of the [`CommandBoundary`].
///
/// Gated operations share a single busy flag: while one is in flight every other
/// gated operation is rejected with [`PreconditionError::Busy`]. Nothing is queued.
/// [`SessionStore::refresh_status`] is the one operation that ignores the gate.
///
/// Consumers observe changes through [`SessionStore::subscribe`] and read
/// immutable snapshots.
pub struct SessionStore<B> {
    pub(crate) boundary: B,
    pub(crate) state: watch::Sender<SessionState>,
}

impl<B: CommandBoundary> SessionStore<B> {
    pub fn new(boundary: B) -> Self {
        let (state, _) = watch::channel(SessionState::default());
        Self { boundary, state }
    }

    /// Clone of the current state
    pub fn snapshot(&self) -> SessionState {
        self.state.borrow().clone()
    }

    /// Receiver that is notified on every state change
    pub fn subscribe(&self) -> watch::Receiver<SessionState> {
        self.state.subscribe()
    }

    /// Check the precondition and take the busy flag in one state update.
    ///
    /// On success `busy` is set and `error` cleared. On rejection the state is untouched.
    /// The returned guard must be handed to [`SessionStore::finish`]; if it is dropped
    /// first (the operation's future was cancelled) it releases the flag itself.
    pub(crate) fn begin<F>(
        &self,
        operation: &'static str,
        precondition: F,
    ) -> std::result::Result<BusyGuard<'_>, PreconditionError>
    where
        F: FnOnce(&SessionState) -> std::result::Result<(), PreconditionError>,
    {
        let mut verdict = Ok(());

        self.state.send_if_modified(|state| {
            if let Err(err) = precondition(state) {
                verdict = Err(err);
                return false;
            }
            if state.busy {
                verdict = Err(PreconditionError::Busy { operation });
                return false;
            }
            state.busy = true;
            state.error = None;
            true
        });

        match verdict {
            Ok(()) => {
                tracing::debug!("{} started", operation);
                Ok(BusyGuard {
                    state: &self.state,
                    operation,
                    armed: true,
                })
            }
            Err(err) => {
                tracing::debug!("{} rejected: {}", operation, err);
                Err(err)
            }
        }
    }

    /// Apply the outcome of a gated operation and release the busy flag
    pub(crate) fn finish<T>(
        &self,
        mut guard: BusyGuard<'_>,
        outcome: BoundaryResult<T>,
        apply: impl FnOnce(&mut SessionState, &T),
    ) -> Result<T> {
        guard.armed = false;
        let operation = guard.operation;

        match outcome {
            Ok(value) => {
                self.state.send_modify(|state| {
                    apply(state, &value);
                    state.busy = false;
                });
                tracing::info!("{} completed", operation);
                Ok(value)
            }
            Err(err) => {
                tracing::warn!("{} failed: {}", operation, err);
                self.state.send_modify(|state| {
                    state.error = Some(err.to_string());
                    state.busy = false;
                });
                Err(err.into())
            }
        }
    }

    /// Status check used after start/stop/switch. Failure is logged, not surfaced.
    async fn status_after_operation(&self) -> Option<ProcessStatus> {
        match self.boundary.get_roxy_status().await {
            Ok(status) => Some(status),
            Err(err) => {
                tracing::warn!("Status refresh failed: {}", err);
                None
            }
        }
    }

    pub async fn load_users(&self) -> Result<()> {
        let guard = self.begin("load_users", |_| Ok(()))?;

        let outcome = self.boundary.list_users().await;
        self.finish(guard, outcome, |state, list| state.apply_users(list))?;
        Ok(())
    }

    /// Replace the process status. Not gated by the busy flag and never touches `error`;
    /// the last completed refresh wins.
    pub async fn refresh_status(&self) -> std::result::Result<ProcessStatus, BoundaryError> {
        let status = self.boundary.get_roxy_status().await?;

        self.state.send_if_modified(|state| {
            if state.process == status {
                return false;
            }
            state.process = status;
            true
        });

        Ok(status)
    }

    pub async fn switch_user(&self, email: &str) -> Result<()> {
        let guard = self.begin("switch_user", |state| {
            if state.is_current(email) {
                return Err(PreconditionError::SwitchToCurrent(email.to_string()));
            }
            Ok(())
        })?;

        let outcome: BoundaryResult<(UserList, Option<ProcessStatus>)> = async {
            self.boundary.switch_user(email).await?;
            let users = self.boundary.list_users().await?;
            Ok((users, self.status_after_operation().await))
        }
        .await;

        self.finish(guard, outcome, |state, outcome| {
            let (users, status) = outcome;
            state.apply_users(users);
            if let Some(status) = status {
                state.process = *status;
            }
        })?;
        Ok(())
    }

    pub async fn delete_user(&self, email: &str) -> Result<()> {
        let guard = self.begin("delete_user", |state| {
            if state.is_current(email) {
                return Err(PreconditionError::DeleteCurrent(email.to_string()));
            }
            Ok(())
        })?;

        let outcome: BoundaryResult<UserList> = async {
            self.boundary.delete_user(email).await?;
            self.boundary.list_users().await
        }
        .await;

        self.finish(guard, outcome, |state, list| state.apply_users(list))?;
        Ok(())
    }

    pub async fn start_roxy(&self) -> Result<()> {
        let guard = self.begin("start_roxy", |state| {
            if state.process.is_running {
                return Err(PreconditionError::AlreadyRunning);
            }
            Ok(())
        })?;

        let outcome: BoundaryResult<Option<ProcessStatus>> = async {
            self.boundary.start_roxy().await?;
            Ok(self.status_after_operation().await)
        }
        .await;

        self.finish(guard, outcome, |state, status| {
            if let Some(status) = status {
                state.process = *status;
            }
        })?;
        Ok(())
    }

    pub async fn stop_roxy(&self) -> Result<()> {
        let guard = self.begin("stop_roxy", |state| {
            if !state.process.is_running {
                return Err(PreconditionError::NotRunning);
            }
            Ok(())
        })?;

        let outcome: BoundaryResult<Option<ProcessStatus>> = async {
            self.boundary.stop_roxy().await?;
            Ok(self.status_after_operation().await)
        }
        .await;

        self.finish(guard, outcome, |state, status| {
            if let Some(status) = status {
                state.process = *status;
            }
        })?;
        Ok(())
    }

    pub async fn update_user_note(&self, email: &str, note: &str) -> Result<()> {
        let guard = self.begin("update_user_note", |_| Ok(()))?;

        let outcome: BoundaryResult<UserList> = async {
            self.boundary.update_user_note(email, note).await?;
            self.boundary.list_users().await
        }
        .await;

        self.finish(guard, outcome, |state, list| {
            state.apply_users(list)
        })?;
        Ok(())
    }

    /// Export every profile into `path`; returns the backend's summary message
    pub async fn export_profiles(&self, path: &str) -> Result<String> {
        let guard = self.begin("export_profiles", |_| require_path(path))?;

        let outcome = self.boundary.export_profiles(path).await;
        self.finish(guard, outcome, |_, _| {})
    }

    /// Import profiles from `path`; returns the backend's summary message
    pub async fn import_profiles(&self, path: &str) -> Result<String> {
        let guard = self.begin("import_profiles", |_| require_path(path))?;

        let outcome: BoundaryResult<(String, UserList)> = async {
            let message = self.boundary.import_profiles(path).await?;
            let users = self.boundary.list_users().await?;
            Ok((message, users))
        }
        .await;

        let (message, _) = self.finish(guard, outcome, |state, outcome| {
            state.apply_users(&outcome.1)
        })?;
        Ok(message)
    }
}

/// Busy flag held by one in-flight gated operation
pub(crate) struct BusyGuard<'a> {
    state: &'a watch::Sender<SessionState>,
    operation: &'static str,
    armed: bool,
}

impl Drop for BusyGuard<'_> {
    fn drop(&mut self) {
        if self.armed {
            tracing::warn!("{} cancelled before the backend answered", self.operation);
            self.state.send_modify(|state| state.busy = false);
        }
    }
}

fn require_path(path: &str) -> std::result::Result<(), PreconditionError> {
    if path.trim().is_empty() {
        return Err(PreconditionError::EmptyPath);
    }
    Ok(())
}
