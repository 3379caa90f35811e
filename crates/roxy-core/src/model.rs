use crate::wizard::WizardState;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// A saved RoxyBrowser identity, keyed by e-mail
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Profile {
    pub email: String,
    #[serde(rename = "displayName")]
    pub display_name: String,
    #[serde(rename = "createdAt")]
    pub created_at: DateTime<Utc>,
    #[serde(rename = "lastUsed")]
    pub last_used: DateTime<Utc>,
    #[serde(default)]
    pub note: String,
}

impl Profile {
    /// Create a profile whose display name is the local part of the e-mail
    pub fn new(email: impl Into<String>, now: DateTime<Utc>) -> Self {
        let email = email.into();
        let display_name = email.split('@').next().unwrap_or(&email).to_string();

        Self {
            email,
            display_name,
            created_at: now,
            last_used: now,
            note: String::new(),
        }
    }
}

/// Payload of `list_users`
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserList {
    pub users: Vec<Profile>,
    #[serde(rename = "currentUser")]
    pub current_user: Option<String>,
}

/// Running state of the external browser, replaced wholesale on every refresh
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProcessStatus {
    #[serde(rename = "isRunning")]
    pub is_running: bool,
    pub pid: Option<u32>,
}

impl ProcessStatus {
    pub fn stopped() -> Self {
        Self::default()
    }

    pub fn running(pid: u32) -> Self {
        Self {
            is_running: true,
            pid: Some(pid),
        }
    }
}

/// Snapshot of everything the session store owns
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SessionState {
    pub profiles: BTreeMap<String, Profile>,
    pub current_user: Option<String>,
    pub process: ProcessStatus,
    pub busy: bool,
    pub error: Option<String>,
    pub wizard: WizardState,
}

impl SessionState {
    pub fn is_current(&self, email: &str) -> bool {
        self.current_user.as_deref() == Some(email)
    }

    pub fn current_profile(&self) -> Option<&Profile> {
        self.current_user
            .as_deref()
            .and_then(|email| self.profiles.get(email))
    }

    /// Profiles ordered by last use, most recent first
    pub fn profiles_by_recent_use(&self) -> Vec<&Profile> {
        let mut profiles: Vec<&Profile> = self.profiles.values().collect();
        profiles.sort_by(|a, b| b.last_used.cmp(&a.last_used).then(a.email.cmp(&b.email)));
        profiles
    }

    /// Replace the profile collection and current reference from a `list_users` payload
    pub(crate) fn apply_users(&mut self, list: &UserList) {
        self.profiles = list
            .users
            .iter()
            .map(|profile| (profile.email.clone(), profile.clone()))
            .collect();

        self.current_user = match &list.current_user {
            Some(email) if self.profiles.contains_key(email) => Some(email.clone()),
            Some(email) => {
                tracing::warn!("Backend reported unknown current user {}, ignoring", email);
                None
            }
            None => None,
        };
    }
}
