use crate::wizard::WizardStep;
use thiserror::Error;

/// A request rejected locally, before any command was sent to the backend.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PreconditionError {
    #[error("Another operation is still running: {operation} was not started")]
    Busy { operation: &'static str },

    #[error("{0} is already the current user")]
    SwitchToCurrent(String),

    #[error("Cannot delete current user {0}")]
    DeleteCurrent(String),

    #[error("RoxyBrowser is already running")]
    AlreadyRunning,

    #[error("RoxyBrowser is not running")]
    NotRunning,

    #[error("A directory path is required")]
    EmptyPath,

    #[error("The add-user wizard is not open")]
    WizardClosed,

    #[error("Wizard is at the {actual} step, expected {expected}")]
    WrongWizardStep {
        expected: WizardStep,
        actual: WizardStep,
    },

    #[error("Cannot move the wizard from {from} to {to}")]
    StepNotReachable { from: WizardStep, to: WizardStep },

    #[error("Invalid wizard step: {0}")]
    InvalidStep(u8),
}

/// Failure reported by the backend. The message is passed through verbatim.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{0}")]
pub struct BoundaryError(pub String);

impl BoundaryError {
    pub fn new(message: impl Into<String>) -> Self {
        Self(message.into())
    }

    pub fn message(&self) -> &str {
        &self.0
    }
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StoreError {
    #[error(transparent)]
    Precondition(#[from] PreconditionError),

    #[error(transparent)]
    Boundary(#[from] BoundaryError),
}

impl StoreError {
    pub fn is_precondition(&self) -> bool {
        matches!(self, StoreError::Precondition(_))
    }
}

pub type Result<T> = std::result::Result<T, StoreError>;
