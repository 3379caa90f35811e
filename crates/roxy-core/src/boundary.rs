use crate::error::BoundaryError;
use crate::model::{ProcessStatus, UserList};
use async_trait::async_trait;

pub type BoundaryResult<T> = std::result::Result<T, BoundaryError>;

/// Request/response channel to the out-of-process backend.
///
/// Every call either fully succeeds or fully fails; there are no partial results.
/// Only [`SessionStore`](crate::SessionStore) is expected to hold one.
#[async_trait]
pub trait CommandBoundary: Send + Sync {
    async fn list_users(&self) -> BoundaryResult<UserList>;

    async fn get_roxy_status(&self) -> BoundaryResult<ProcessStatus>;

    async fn switch_user(&self, email: &str) -> BoundaryResult<()>;

    async fn delete_user(&self, email: &str) -> BoundaryResult<()>;

    async fn update_user_note(&self, email: &str, note: &str) -> BoundaryResult<()>;

    async fn start_roxy(&self) -> BoundaryResult<()>;

    async fn stop_roxy(&self) -> BoundaryResult<()>;

    /// Snapshot the current profile and clear the browser's login state
    async fn prepare_for_new_user(&self) -> BoundaryResult<()>;

    /// Detect and persist the account that was just logged in
    async fn finalize_new_user(&self) -> BoundaryResult<()>;

    async fn export_profiles(&self, export_path: &str) -> BoundaryResult<String>;

    async fn import_profiles(&self, import_path: &str) -> BoundaryResult<String>;
}
