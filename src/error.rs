//! Error types for the mail handler.

use thiserror::Error;

/// The event and settings together do not yield a complete envelope.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ResolveError {
    #[error("no recipient: check has no mail_to and no default mail_to is configured")]
    MissingRecipient,
    #[error("no sender: check has no mail_from and no default mail_from is configured")]
    MissingSender,
}

/// A delivery attempt failed for a reason other than running out of time.
#[derive(Debug, Error)]
pub enum DispatchError {
    #[error("{sink} delivery failed for {short_name}")]
    DeliveryFault {
        sink: String,
        short_name: String,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync + 'static>,
    },
    #[error("delivery task for {short_name} did not complete")]
    TaskFailed {
        short_name: String,
        #[source]
        source: tokio::task::JoinError,
    },
}

/// Anything that stops a single handler invocation.
#[derive(Debug, Error)]
pub enum HandlerError {
    #[error(transparent)]
    Resolve(#[from] ResolveError),
    #[error(transparent)]
    Dispatch(#[from] DispatchError),
}
