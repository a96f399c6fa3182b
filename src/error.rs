//! Error types and result handling.
//!
//! This crate generates exactly one kind of error itself: a content-type
//! mismatch raised by the typed adapter ([`JsonSource`](crate::JsonSource))
//! when raw content arrived but the requested type cannot be produced from it.
//! Every other error is an opaque pass-through from the external data layer,
//! carried verbatim in [`LoadableState::latest_error`](crate::LoadableState).
//!
//! The aggregator itself never returns errors; it only reflects error presence
//! into [`GroupStatus::Error`](crate::GroupStatus). Retry, backoff, and
//! suppression policy all belong to the caller, via rule selection and the
//! explicit [`GroupStatusModel::try_again`](crate::GroupStatusModel::try_again)
//! action.

use thiserror::Error;

/// An error carried by a loadable source's state.
///
/// Errors are descriptive, not control flow: they live in
/// [`LoadableState::latest_error`](crate::LoadableState) alongside any stale
/// content, and are surfaced to consumers through the group-status rules.
///
/// # Examples
///
/// ```
/// use statuswatch::LoadError;
///
/// let err = LoadError::source("connection refused");
/// assert_eq!(err.user_message(), "connection refused");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LoadError {
    /// Raw content arrived, but the caller-specified type could not be
    /// produced from it (a decode/type mismatch).
    #[error("the source returned content of an unexpected type")]
    WrongContentType,

    /// A failure reported by the external data layer, carried verbatim.
    #[error("{message}")]
    Source {
        /// Human-readable description, suitable for display to a user.
        message: String,
    },
}

impl LoadError {
    /// Wrap a failure reported by an external data layer.
    pub fn source(message: impl Into<String>) -> Self {
        LoadError::Source {
            message: message.into(),
        }
    }

    /// The user-facing message for this error.
    ///
    /// Presentation layers are expected to show this next to a retry
    /// affordance when any underlying source is reloadable.
    pub fn user_message(&self) -> String {
        self.to_string()
    }
}

/// Result type alias using [`LoadError`].
pub type Result<T> = std::result::Result<T, LoadError>;
