//! The loadable-state snapshot types.
//!
//! [`LoadableState`] is the uniform shape for "the state of one
//! asynchronously-loaded value": is it loading, does it have content, does it
//! have an error. It is decoupled from any particular fetching mechanism so
//! that data coming from anywhere (HTTP, disk, a computation) can be displayed
//! through the same aggregation machinery.
//!
//! A state is a *snapshot*: produced fresh on every upstream event and never
//! mutated in place. The three fields are deliberately independent rather than
//! a single enum, because a reload can fail while prior content remains valid
//! ("loading" + "stale content" + "error" may all co-occur).

use crate::error::LoadError;

/// A snapshot of one asynchronous value at a point in time.
///
/// # Examples
///
/// ```
/// use statuswatch::{LoadableState, LoadError};
///
/// // A reload failed while stale content is still on hand.
/// let state = LoadableState {
///     is_loading: false,
///     content: Some("cached page"),
///     latest_error: Some(LoadError::source("timeout")),
/// };
/// assert!(state.content.is_some());
/// assert!(state.latest_error.is_some());
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct LoadableState<T> {
    /// A fetch is currently in flight.
    pub is_loading: bool,

    /// The last successfully produced value, if any. May coexist with a
    /// subsequent error (stale-but-present data plus a new failure).
    pub content: Option<T>,

    /// The most recent failure, if any.
    pub latest_error: Option<LoadError>,
}

impl<T> LoadableState<T> {
    /// A state with a fetch in flight and nothing else.
    pub fn loading() -> Self {
        LoadableState {
            is_loading: true,
            content: None,
            latest_error: None,
        }
    }

    /// A settled state holding content.
    pub fn with_content(content: T) -> Self {
        LoadableState {
            is_loading: false,
            content: Some(content),
            latest_error: None,
        }
    }

    /// A settled state holding an error and no content.
    pub fn with_error(error: LoadError) -> Self {
        LoadableState {
            is_loading: false,
            content: None,
            latest_error: Some(error),
        }
    }

    /// Transform the content into a different type, preserving the loading
    /// flag and error exactly as they are at this snapshot instant.
    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> LoadableState<U> {
        LoadableState {
            is_loading: self.is_loading,
            content: self.content.map(f),
            latest_error: self.latest_error,
        }
    }

    /// The type-erased form used for heterogeneous aggregation.
    ///
    /// Group-status rules only ever inspect content *presence*, never content
    /// values, so erasure keeps a boolean instead of carrying `Any`. Typed
    /// content travels through the fixed-arity joins instead
    /// (see [`join_status2`](crate::join_status2)).
    pub fn snapshot(&self) -> StateSnapshot {
        StateSnapshot {
            is_loading: self.is_loading,
            has_content: self.content.is_some(),
            latest_error: self.latest_error.clone(),
        }
    }
}

/// The default state is idle regardless of `T`: a derived impl would demand
/// `T: Default`, but the idle state never holds content.
impl<T> Default for LoadableState<T> {
    fn default() -> Self {
        LoadableState {
            is_loading: false,
            content: None,
            latest_error: None,
        }
    }
}

/// The content-erased form of a [`LoadableState`].
///
/// This is what the group-status rules evaluate: a collection of these, one
/// per source, regardless of each source's content type.
#[derive(Debug, Clone, PartialEq)]
pub struct StateSnapshot {
    /// A fetch is currently in flight.
    pub is_loading: bool,

    /// Whether the source currently has content.
    pub has_content: bool,

    /// The most recent failure, if any.
    pub latest_error: Option<LoadError>,
}

impl StateSnapshot {
    /// An idle snapshot: not loading, no content, no error.
    pub fn idle() -> Self {
        StateSnapshot {
            is_loading: false,
            has_content: false,
            latest_error: None,
        }
    }
}
