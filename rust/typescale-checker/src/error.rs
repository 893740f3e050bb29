use thiserror::Error;

/// The common error type used by this crate
#[derive(Error, Debug, Clone, PartialEq)]
pub enum TypeScaleError {
    /// An operation was called without the input it requires
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// The checker configuration violates one of its invariants
    #[error("Invalid configuration: {0}")]
    InvalidConfiguration(String),

    /// Something other than a function was offered as an event handler
    #[error("Handler for '{event}' must be a function, got {received}")]
    HandlerMismatch {
        /// The event the handler was meant for
        event: String,
        /// A description of the value that was supplied instead
        received: String,
    },

    /// A message could not be delivered to the other script context
    #[error("Message could not be delivered: {0}")]
    Messaging(String),

    /// A message envelope could not be encoded or decoded
    #[error("Malformed message: {0}")]
    MalformedMessage(String),

    /// The host document rejected a DOM operation
    #[error("DOM operation failed: {0}")]
    Dom(String),
}

impl From<serde_json::Error> for TypeScaleError {
    fn from(value: serde_json::Error) -> Self {
        TypeScaleError::MalformedMessage(format!("{value}"))
    }
}
