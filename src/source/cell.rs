//! A push-driven loadable source fed by an external data layer.

use std::sync::Arc;

use tokio::sync::watch;

use crate::error::LoadError;
use crate::source::{Loadable, StateStream};
use crate::state::LoadableState;

type ReloadHook = Arc<dyn Fn() + Send + Sync>;

/// A [`Loadable`] whose state is pushed to it by an external data layer.
///
/// The owning layer drives the lifecycle explicitly: [`begin_load`] when a
/// fetch starts, then [`supply`] or [`fail`] when it resolves. Each call
/// produces a fresh immutable snapshot for all subscribers; state is never
/// mutated behind their backs.
///
/// A cell is not reloadable unless given a reload hook with
/// [`with_reloader`]; the hook is what `load()` invokes, typically kicking
/// the owning layer's fetch. `load_if_needed()` applies the cell's freshness
/// policy first: it only fires when no fetch is in flight and no content is
/// cached.
///
/// [`begin_load`]: SourceCell::begin_load
/// [`supply`]: SourceCell::supply
/// [`fail`]: SourceCell::fail
/// [`with_reloader`]: SourceCell::with_reloader
///
/// # Examples
///
/// ```
/// use statuswatch::{Loadable, SourceCell};
///
/// let cell = SourceCell::new();
/// cell.begin_load();
/// assert!(cell.state().is_loading);
///
/// cell.supply("payload");
/// assert_eq!(cell.state().content, Some("payload"));
/// ```
pub struct SourceCell<T: Clone + Send + Sync + 'static> {
    tx: watch::Sender<LoadableState<T>>,
    reload: Option<ReloadHook>,
}

impl<T: Clone + Send + Sync + 'static> SourceCell<T> {
    /// Create an idle cell: not loading, no content, no error.
    pub fn new() -> Self {
        let (tx, _rx) = watch::channel(LoadableState::default());
        SourceCell { tx, reload: None }
    }

    /// Create a cell already holding content.
    pub fn with_content(content: T) -> Self {
        let (tx, _rx) = watch::channel(LoadableState::with_content(content));
        SourceCell { tx, reload: None }
    }

    /// Attach a reload hook, making the cell reloadable.
    ///
    /// The hook runs synchronously on the caller of `load()` /
    /// `load_if_needed()`; it should only *initiate* work (e.g. notify the
    /// owning data layer), not perform it.
    pub fn with_reloader(mut self, hook: impl Fn() + Send + Sync + 'static) -> Self {
        self.reload = Some(Arc::new(hook));
        self
    }

    /// Mark a fetch as in flight. Content and error are untouched, so stale
    /// data keeps displaying while the reload runs.
    pub fn begin_load(&self) {
        tracing::trace!("source cell: load began");
        self.tx.send_modify(|state| state.is_loading = true);
    }

    /// Resolve the current fetch with a value. Clears any previous error.
    pub fn supply(&self, content: T) {
        tracing::trace!("source cell: content supplied");
        self.tx.send_modify(|state| {
            state.content = Some(content);
            state.latest_error = None;
            state.is_loading = false;
        });
    }

    /// Resolve the current fetch with a failure. Prior content is retained
    /// (stale-but-present data plus a new error).
    pub fn fail(&self, error: LoadError) {
        tracing::trace!(%error, "source cell: load failed");
        self.tx.send_modify(|state| {
            state.latest_error = Some(error);
            state.is_loading = false;
        });
    }

    /// Reset to the idle state.
    pub fn clear(&self) {
        self.tx.send_modify(|state| *state = LoadableState::default());
    }
}

impl<T: Clone + Send + Sync + 'static> Default for SourceCell<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Clone + Send + Sync + 'static> Loadable for SourceCell<T> {
    type Content = T;

    fn state(&self) -> LoadableState<T> {
        self.tx.borrow().clone()
    }

    fn state_stream(&self) -> StateStream<T> {
        StateStream::from_watch(self.tx.subscribe())
    }

    fn load_if_needed(&self) {
        let Some(hook) = &self.reload else { return };
        // Freshness policy: skip when a fetch is already in flight or a
        // value is cached. Drop the borrow before running the hook, which
        // may immediately call begin_load().
        let needed = {
            let state = self.tx.borrow();
            !state.is_loading && state.content.is_none()
        };
        if needed {
            tracing::debug!("source cell: load_if_needed triggering reload");
            hook();
        }
    }

    fn load(&self) {
        if let Some(hook) = &self.reload {
            tracing::debug!("source cell: load triggering reload");
            hook();
        }
    }

    fn is_reloadable(&self) -> bool {
        self.reload.is_some()
    }
}
