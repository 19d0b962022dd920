//! Errors raised while building matchers and dispatching events.

use thiserror::Error;

/// Failure in the matcher/listener machinery.
///
/// Type incompatibility between a matcher and a value is never an error; it
/// is a normal non-match. Everything here is something a caller has to react
/// to.
#[derive(Debug, Error)]
pub enum EventError {
    /// No factory was described under this name.
    #[error("no matcher named `{0}` has been described")]
    UnknownMatcher(String),

    /// A factory refused the configuration arguments it was given.
    #[error("matcher `{name}` rejected its arguments: {reason}")]
    BadMatcherArguments { name: String, reason: String },

    /// A type name did not resolve to a [`ValueKind`](super::value::ValueKind).
    #[error("unknown value kind `{0}`")]
    UnknownKind(String),

    /// A matcher predicate failed while screening a value.
    #[error("predicate failed: {0}")]
    Predicate(String),

    /// A listener handler failed.
    #[error("handler failed: {0}")]
    Handler(String),

    /// Wraps a predicate or handler failure with the event being dispatched.
    #[error("dispatch of `{event}` failed")]
    Dispatch {
        event: String,
        #[source]
        source: Box<EventError>,
    },
}

impl EventError {
    /// Shorthand for handler failures.
    pub fn handler(message: impl Into<String>) -> Self {
        EventError::Handler(message.into())
    }

    /// Shorthand for predicate failures.
    pub fn predicate(message: impl Into<String>) -> Self {
        EventError::Predicate(message.into())
    }

    pub fn bad_arguments(name: impl Into<String>, reason: impl Into<String>) -> Self {
        EventError::BadMatcherArguments {
            name: name.into(),
            reason: reason.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, EventError>;
