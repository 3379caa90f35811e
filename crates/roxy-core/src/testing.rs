//! Scripted in-memory backend for store, wizard and poller tests.

use crate::boundary::{BoundaryResult, CommandBoundary};
use crate::error::BoundaryError;
use crate::model::{ProcessStatus, Profile, UserList};
use async_trait::async_trait;
use chrono::{TimeZone, Utc};
use std::collections::HashMap;
use std::sync::Mutex;
use tokio::sync::oneshot;

pub fn profile(email: &str) -> Profile {
    Profile::new(email, Utc.timestamp_opt(1_700_000_000, 0).unwrap())
}

#[derive(Default)]
pub struct FakeBoundary {
    users: Mutex<UserList>,
    status: Mutex<ProcessStatus>,
    failures: Mutex<HashMap<&'static str, String>>,
    holds: Mutex<HashMap<&'static str, oneshot::Receiver<()>>>,
    calls: Mutex<Vec<&'static str>>,
}

impl FakeBoundary {
    pub fn with_users(users: Vec<Profile>, current: Option<&str>) -> Self {
        Self {
            users: Mutex::new(UserList {
                users,
                current_user: current.map(str::to_string),
            }),
            ..Self::default()
        }
    }

    /// Make every call named `call` fail with `message`
    pub fn fail(&self, call: &'static str, message: &str) {
        self.failures
            .lock()
            .unwrap()
            .insert(call, message.to_string());
    }

    pub fn recover(&self, call: &'static str) {
        self.failures.lock().unwrap().remove(call);
    }

    /// Suspend the next `call` until the returned sender fires
    pub fn hold(&self, call: &'static str) -> oneshot::Sender<()> {
        let (tx, rx) = oneshot::channel();
        self.holds.lock().unwrap().insert(call, rx);
        tx
    }

    /// Simulate the browser being launched outside the manager
    pub fn start_externally(&self) {
        *self.status.lock().unwrap() = ProcessStatus::running(7);
    }

    pub fn calls(&self) -> Vec<&'static str> {
        self.calls.lock().unwrap().clone()
    }

    pub fn clear_calls(&self) {
        self.calls.lock().unwrap().clear();
    }

    async fn enter(&self, call: &'static str) -> BoundaryResult<()> {
        self.calls.lock().unwrap().push(call);

        let hold = self.holds.lock().unwrap().remove(call);
        if let Some(rx) = hold {
            let _ = rx.await;
        }

        match self.failures.lock().unwrap().get(call) {
            Some(message) => Err(BoundaryError::new(message.clone())),
            None => Ok(()),
        }
    }

    fn add_user(&self, email: &str, make_current: bool) {
        let mut users = self.users.lock().unwrap();
        if !users.users.iter().any(|u| u.email == email) {
            users.users.push(profile(email));
        }
        if make_current {
            users.current_user = Some(email.to_string());
        }
    }
}

#[async_trait]
impl CommandBoundary for FakeBoundary {
    async fn list_users(&self) -> BoundaryResult<UserList> {
        self.enter("list_users").await?;
        Ok(self.users.lock().unwrap().clone())
    }

    async fn get_roxy_status(&self) -> BoundaryResult<ProcessStatus> {
        self.enter("get_roxy_status").await?;
        Ok(*self.status.lock().unwrap())
    }

    async fn switch_user(&self, email: &str) -> BoundaryResult<()> {
        self.enter("switch_user").await?;
        let mut users = self.users.lock().unwrap();
        if !users.users.iter().any(|u| u.email == email) {
            return Err(BoundaryError::new(format!("unknown user {}", email)));
        }
        users.current_user = Some(email.to_string());
        *self.status.lock().unwrap() = ProcessStatus::running(4242);
        Ok(())
    }

    async fn delete_user(&self, email: &str) -> BoundaryResult<()> {
        self.enter("delete_user").await?;
        self.users.lock().unwrap().users.retain(|u| u.email != email);
        Ok(())
    }

    async fn update_user_note(&self, email: &str, note: &str) -> BoundaryResult<()> {
        self.enter("update_user_note").await?;
        let mut users = self.users.lock().unwrap();
        match users.users.iter_mut().find(|u| u.email == email) {
            Some(user) => {
                user.note = note.to_string();
                Ok(())
            }
            None => Err(BoundaryError::new(format!("unknown user {}", email))),
        }
    }

    async fn start_roxy(&self) -> BoundaryResult<()> {
        self.enter("start_roxy").await?;
        *self.status.lock().unwrap() = ProcessStatus::running(4242);
        Ok(())
    }

    async fn stop_roxy(&self) -> BoundaryResult<()> {
        self.enter("stop_roxy").await?;
        *self.status.lock().unwrap() = ProcessStatus::stopped();
        Ok(())
    }

    async fn prepare_for_new_user(&self) -> BoundaryResult<()> {
        self.enter("prepare_for_new_user").await
    }

    async fn finalize_new_user(&self) -> BoundaryResult<()> {
        self.enter("finalize_new_user").await?;
        self.add_user("new@x.com", true);
        Ok(())
    }

    async fn export_profiles(&self, export_path: &str) -> BoundaryResult<String> {
        self.enter("export_profiles").await?;
        let count = self.users.lock().unwrap().users.len();
        Ok(format!("Exported {} profiles to {}", count, export_path))
    }

    async fn import_profiles(&self, _import_path: &str) -> BoundaryResult<String> {
        self.enter("import_profiles").await?;
        self.add_user("imported@x.com", false);
        Ok("Imported 1 profiles".to_string())
    }
}
