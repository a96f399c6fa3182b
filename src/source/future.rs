//! Adapts a future factory into a loadable source.

use std::future::Future;
use std::sync::Arc;

use futures::future::{BoxFuture, FutureExt};
use parking_lot::Mutex;
use tokio::sync::watch;
use tokio::task::JoinHandle;

use crate::error::Result;
use crate::source::{Loadable, StateStream};
use crate::state::LoadableState;

type Factory<T> = Arc<dyn Fn() -> BoxFuture<'static, Result<T>> + Send + Sync>;

/// A [`Loadable`] backed by a factory of futures.
///
/// Construction runs the factory once immediately, so the source starts in
/// the loading state; the state settles to content or error when the future
/// resolves. `load()` re-runs the factory with latest-wins semantics: any
/// attempt still in flight is aborted and only the newest one reports.
///
/// Prior content survives a failed reload (stale-but-present data plus a new
/// error), and a successful reload clears any previous error.
///
/// Must be created within a Tokio runtime; attempts run on spawned tasks.
///
/// # Examples
///
/// ```ignore
/// use statuswatch::{FutureSource, Loadable, LoadError};
///
/// let source = FutureSource::new(|| async {
///     fetch_user().await.map_err(|e| LoadError::source(e.to_string()))
/// });
/// assert!(source.state().is_loading);
/// ```
pub struct FutureSource<T: Clone + Send + Sync + 'static> {
    tx: watch::Sender<LoadableState<T>>,
    factory: Factory<T>,
    reloadable: bool,
    inflight: Mutex<Option<JoinHandle<()>>>,
}

impl<T: Clone + Send + Sync + 'static> FutureSource<T> {
    /// Create a reloadable source and start its first load.
    pub fn new<F, Fut>(factory: F) -> Arc<Self>
    where
        F: Fn() -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<T>> + Send + 'static,
    {
        Self::with_reloadable(factory, true)
    }

    /// Create a source that runs its factory exactly once.
    ///
    /// `load()` and `load_if_needed()` become no-ops and
    /// [`is_reloadable`](Loadable::is_reloadable) reports `false`, so no
    /// retry affordance is offered for it.
    pub fn once<F, Fut>(factory: F) -> Arc<Self>
    where
        F: Fn() -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<T>> + Send + 'static,
    {
        Self::with_reloadable(factory, false)
    }

    fn with_reloadable<F, Fut>(factory: F, reloadable: bool) -> Arc<Self>
    where
        F: Fn() -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<T>> + Send + 'static,
    {
        let (tx, _rx) = watch::channel(LoadableState::loading());
        let source = Arc::new(FutureSource {
            tx,
            factory: Arc::new(move || factory().boxed()),
            reloadable,
            inflight: Mutex::new(None),
        });
        source.start();
        source
    }

    /// Abort any in-flight attempt and start a new one.
    fn start(&self) {
        let mut inflight = self.inflight.lock();
        if let Some(previous) = inflight.take() {
            tracing::debug!("future source: aborting superseded attempt");
            previous.abort();
        }

        self.tx.send_modify(|state| state.is_loading = true);

        let tx = self.tx.clone();
        let attempt = (self.factory)();
        *inflight = Some(tokio::spawn(async move {
            match attempt.await {
                Ok(content) => tx.send_modify(|state| {
                    state.content = Some(content);
                    state.latest_error = None;
                    state.is_loading = false;
                }),
                Err(error) => tx.send_modify(|state| {
                    state.latest_error = Some(error);
                    state.is_loading = false;
                }),
            }
        }));
    }
}

impl<T: Clone + Send + Sync + 'static> Loadable for FutureSource<T> {
    type Content = T;

    fn state(&self) -> LoadableState<T> {
        self.tx.borrow().clone()
    }

    fn state_stream(&self) -> StateStream<T> {
        StateStream::from_watch(self.tx.subscribe())
    }

    fn load_if_needed(&self) {
        if !self.reloadable {
            return;
        }
        let needed = {
            let state = self.tx.borrow();
            !state.is_loading && state.content.is_none()
        };
        if needed {
            self.start();
        }
    }

    fn load(&self) {
        if self.reloadable {
            self.start();
        }
    }

    fn is_reloadable(&self) -> bool {
        self.reloadable
    }
}

impl<T: Clone + Send + Sync + 'static> Drop for FutureSource<T> {
    fn drop(&mut self) {
        if let Some(inflight) = self.inflight.lock().take() {
            inflight.abort();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::LoadError;
    use futures::StreamExt;
    use std::sync::atomic::{AtomicUsize, Ordering};

    async fn settled<T: Clone + Send + Sync + 'static>(
        source: &FutureSource<T>,
    ) -> LoadableState<T> {
        let mut stream = source.state_stream();
        loop {
            let state = stream.next().await.expect("source stream stays open");
            if !state.is_loading {
                return state;
            }
        }
    }

    #[tokio::test]
    async fn resolves_to_content() {
        let source = FutureSource::new(|| async { Ok(42) });
        assert!(source.state().is_loading);

        let state = settled(&source).await;
        assert_eq!(state.content, Some(42));
        assert!(state.latest_error.is_none());
    }

    #[tokio::test]
    async fn resolves_to_error() {
        let source: Arc<FutureSource<u8>> =
            FutureSource::new(|| async { Err(LoadError::source("nope")) });

        let state = settled(&source).await;
        assert!(state.content.is_none());
        assert_eq!(state.latest_error, Some(LoadError::source("nope")));
    }

    #[tokio::test]
    async fn failed_reload_keeps_stale_content() {
        let attempts = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&attempts);
        let source = FutureSource::new(move || {
            let n = counter.fetch_add(1, Ordering::SeqCst);
            async move {
                if n == 0 {
                    Ok("fresh")
                } else {
                    Err(LoadError::source("flaky"))
                }
            }
        });

        let state = settled(&source).await;
        assert_eq!(state.content, Some("fresh"));

        source.load();
        let state = settled(&source).await;
        assert_eq!(state.content, Some("fresh"), "stale content retained");
        assert_eq!(state.latest_error, Some(LoadError::source("flaky")));
    }

    #[tokio::test]
    async fn once_source_is_not_reloadable() {
        let attempts = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&attempts);
        let source = FutureSource::once(move || {
            counter.fetch_add(1, Ordering::SeqCst);
            async { Ok(1) }
        });

        let _ = settled(&source).await;
        assert!(!source.is_reloadable());

        source.load();
        source.load_if_needed();
        assert_eq!(attempts.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn load_if_needed_skips_when_content_cached() {
        let attempts = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&attempts);
        let source = FutureSource::new(move || {
            counter.fetch_add(1, Ordering::SeqCst);
            async { Ok("value") }
        });

        let _ = settled(&source).await;
        source.load_if_needed();
        assert_eq!(attempts.load(Ordering::SeqCst), 1);

        source.load();
        let _ = settled(&source).await;
        assert_eq!(attempts.load(Ordering::SeqCst), 2);
    }
}
