//! Pure content mapping over another loadable source.

use std::marker::PhantomData;
use std::sync::Arc;

use futures::StreamExt;

use crate::source::{Loadable, StateStream};
use crate::state::LoadableState;

/// A read-only, content-mapping view of another source.
///
/// Useful when one upstream resource should be presented under multiple
/// shapes to different consumers without re-fetching. The derived source's
/// `is_loading` and `latest_error` always equal the upstream's at the same
/// snapshot instant; only the content differs, via a pure
/// `Option<A> -> Option<B>` function (so a transform may also decide that
/// some upstream content has no derived representation).
///
/// Reload operations delegate to the upstream: reloading the view reloads
/// the resource it is a view of.
///
/// # Examples
///
/// ```
/// use std::sync::Arc;
/// use statuswatch::{Loadable, SourceCell, TransformedSource};
///
/// let upstream = Arc::new(SourceCell::with_content(vec![3, 1, 4, 1, 5]));
/// let count = TransformedSource::new(Arc::clone(&upstream), |v: Option<Vec<i32>>| {
///     v.map(|v| v.len())
/// });
/// assert_eq!(count.state().content, Some(5));
/// ```
pub struct TransformedSource<S, F, B>
where
    S: Loadable,
    F: Fn(Option<S::Content>) -> Option<B> + Send + Sync + 'static,
    B: Clone + Send + Sync + 'static,
{
    upstream: Arc<S>,
    transform: Arc<F>,
    _content: PhantomData<fn() -> B>,
}

impl<S, F, B> TransformedSource<S, F, B>
where
    S: Loadable,
    F: Fn(Option<S::Content>) -> Option<B> + Send + Sync + 'static,
    B: Clone + Send + Sync + 'static,
{
    /// Wrap `upstream`, presenting its content through `transform`.
    pub fn new(upstream: Arc<S>, transform: F) -> Self {
        TransformedSource {
            upstream,
            transform: Arc::new(transform),
            _content: PhantomData,
        }
    }

    fn apply(transform: &F, upstream: LoadableState<S::Content>) -> LoadableState<B> {
        let LoadableState {
            is_loading,
            content,
            latest_error,
        } = upstream;
        LoadableState {
            is_loading,
            content: transform(content),
            latest_error,
        }
    }
}

impl<S, F, B> Loadable for TransformedSource<S, F, B>
where
    S: Loadable,
    F: Fn(Option<S::Content>) -> Option<B> + Send + Sync + 'static,
    B: Clone + Send + Sync + 'static,
{
    type Content = B;

    fn state(&self) -> LoadableState<B> {
        Self::apply(&self.transform, self.upstream.state())
    }

    fn state_stream(&self) -> StateStream<B> {
        let transform = Arc::clone(&self.transform);
        StateStream::from_stream(
            self.upstream
                .state_stream()
                .map(move |state| Self::apply(&transform, state)),
        )
    }

    fn load_if_needed(&self) {
        self.upstream.load_if_needed();
    }

    fn load(&self) {
        self.upstream.load();
    }

    fn is_reloadable(&self) -> bool {
        self.upstream.is_reloadable()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::LoadError;
    use crate::source::SourceCell;
    use futures::StreamExt;

    #[test]
    fn loading_and_error_mirror_upstream() {
        let upstream = Arc::new(SourceCell::<i32>::new());
        let doubled =
            TransformedSource::new(Arc::clone(&upstream), |v: Option<i32>| v.map(|n| n * 2));

        upstream.begin_load();
        let state = doubled.state();
        assert!(state.is_loading);
        assert!(state.content.is_none());

        upstream.fail(LoadError::source("boom"));
        let state = doubled.state();
        assert_eq!(state.latest_error, Some(LoadError::source("boom")));

        upstream.supply(10);
        assert_eq!(doubled.state().content, Some(20));
    }

    #[test]
    fn transform_may_reject_content() {
        // A transform returning None from non-null input surfaces as absent
        // content, not as an error.
        let upstream = Arc::new(SourceCell::with_content(-1));
        let positive =
            TransformedSource::new(Arc::clone(&upstream), |v: Option<i32>| v.filter(|n| *n > 0));

        let state = positive.state();
        assert!(state.content.is_none());
        assert!(state.latest_error.is_none());
    }

    #[tokio::test]
    async fn stream_maps_every_snapshot() {
        let upstream = Arc::new(SourceCell::with_content("hello"));
        let lengths = TransformedSource::new(Arc::clone(&upstream), |v: Option<&str>| {
            v.map(|s| s.len())
        });

        let mut stream = lengths.state_stream();
        assert_eq!(stream.next().await.unwrap().content, Some(5));

        upstream.supply("hi");
        assert_eq!(stream.next().await.unwrap().content, Some(2));
    }

    #[test]
    fn reload_delegates_to_upstream() {
        use std::sync::atomic::{AtomicUsize, Ordering};

        let loads = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&loads);
        let upstream = Arc::new(SourceCell::<u8>::new().with_reloader(move || {
            counter.fetch_add(1, Ordering::SeqCst);
        }));
        let view = TransformedSource::new(Arc::clone(&upstream), |v: Option<u8>| v);

        assert!(view.is_reloadable());
        view.load();
        assert_eq!(loads.load(Ordering::SeqCst), 1);
    }
}
