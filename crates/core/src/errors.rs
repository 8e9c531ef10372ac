use thiserror::Error;

use crate::data::DataServiceError;
use crate::domain::StatusKind;
use crate::flows::PageKey;

#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum DomainError {
    #[error("unknown {kind} status `{value}`")]
    UnknownStatus { kind: StatusKind, value: String },
    #[error("page `{0}` is declared more than once in the flow table")]
    DuplicatePage(PageKey),
    #[error("path `{0}` is declared more than once in the flow table")]
    DuplicatePath(String),
    #[error("path `{pattern}` needs a value for `{parameter}`")]
    UnboundPathParameter { pattern: String, parameter: String },
    #[error("page `{0}` creates a move but the wizard state has no current orders")]
    MissingOrders(PageKey),
    #[error("domain invariant violation: {0}")]
    InvariantViolation(String),
}

#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum ApplicationError {
    #[error(transparent)]
    Domain(#[from] DomainError),
    #[error(transparent)]
    DataService(#[from] DataServiceError),
    #[error("configuration failure: {0}")]
    Configuration(String),
}

#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum InterfaceError {
    #[error("bad request: {message}")]
    BadRequest { message: String, correlation_id: String },
    #[error("not found: {message}")]
    NotFound { message: String, correlation_id: String },
    #[error("conflict: {message}")]
    Conflict { message: String, correlation_id: String },
    #[error("service unavailable: {message}")]
    ServiceUnavailable { message: String, correlation_id: String },
    #[error("internal error: {message}")]
    Internal { message: String, correlation_id: String },
}

impl InterfaceError {
    pub fn user_message(&self) -> &'static str {
        match self {
            Self::BadRequest { .. } => {
                "The request could not be processed. Check inputs and try again."
            }
            Self::NotFound { .. } => "The requested move could not be found.",
            Self::Conflict { .. } => {
                "You are trying to load a page that the system does not have context for. \
                 Please go to the home page and try again."
            }
            Self::ServiceUnavailable { .. } => {
                "The service is temporarily unavailable. Please retry shortly."
            }
            Self::Internal { .. } => "An unexpected internal error occurred.",
        }
    }

    pub fn correlation_id(&self) -> &str {
        match self {
            Self::BadRequest { correlation_id, .. }
            | Self::NotFound { correlation_id, .. }
            | Self::Conflict { correlation_id, .. }
            | Self::ServiceUnavailable { correlation_id, .. }
            | Self::Internal { correlation_id, .. } => correlation_id,
        }
    }
}

impl ApplicationError {
    pub fn into_interface(self, correlation_id: impl Into<String>) -> InterfaceError {
        let correlation_id = correlation_id.into();
        let mut mapped = InterfaceError::from(self);
        match &mut mapped {
            InterfaceError::BadRequest { correlation_id: id, .. }
            | InterfaceError::NotFound { correlation_id: id, .. }
            | InterfaceError::Conflict { correlation_id: id, .. }
            | InterfaceError::ServiceUnavailable { correlation_id: id, .. }
            | InterfaceError::Internal { correlation_id: id, .. } => *id = correlation_id,
        }
        mapped
    }
}

impl From<ApplicationError> for InterfaceError {
    fn from(value: ApplicationError) -> Self {
        let correlation_id = "unassigned".to_owned();
        match value {
            // Corrupt status data is a contract violation with the data service,
            // never the caller's fault.
            ApplicationError::Domain(error @ DomainError::UnknownStatus { .. }) => {
                Self::Internal { message: error.to_string(), correlation_id }
            }
            ApplicationError::Domain(error @ DomainError::MissingOrders(_)) => {
                Self::Conflict { message: error.to_string(), correlation_id }
            }
            ApplicationError::Domain(
                error @ (DomainError::UnboundPathParameter { .. }
                | DomainError::InvariantViolation(_)),
            ) => Self::BadRequest { message: error.to_string(), correlation_id },
            ApplicationError::Domain(
                error @ (DomainError::DuplicatePage(_) | DomainError::DuplicatePath(_)),
            ) => Self::Internal { message: error.to_string(), correlation_id },
            ApplicationError::DataService(error @ DataServiceError::MoveNotFound(_)) => {
                Self::NotFound { message: error.to_string(), correlation_id }
            }
            ApplicationError::DataService(
                error @ (DataServiceError::Unavailable(_) | DataServiceError::Fixture(_)),
            ) => Self::ServiceUnavailable { message: error.to_string(), correlation_id },
            ApplicationError::Configuration(message) => Self::Internal { message, correlation_id },
        }
    }
}
