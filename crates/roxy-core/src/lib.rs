//! Profile lifecycle orchestration for RoxyBrowser Manager.
//!
//! [`SessionStore`] owns the profile list, the browser process status and the
//! add-user wizard, and is the only component that talks to the backend through
//! a [`CommandBoundary`]. [`StatusPoller`] keeps the process status fresh.

mod boundary;
pub mod error;
mod model;
mod poller;
mod store;
mod wizard;

#[cfg(test)]
mod testing;

pub use boundary::{BoundaryResult, CommandBoundary};
pub use error::{BoundaryError, PreconditionError, Result, StoreError};
pub use model::{ProcessStatus, Profile, SessionState, UserList};
pub use poller::{DEFAULT_POLL_INTERVAL, StatusPoller};
pub use store::SessionStore;
pub use wizard::{WizardState, WizardStep};
