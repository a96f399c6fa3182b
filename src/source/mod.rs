//! The loadable source abstraction and its canonical implementations.
//!
//! The loading/content/error/reload paradigm is a generally useful one: parts
//! of an application load failable, non-immediate data from all kinds of
//! places, and all of them can be displayed through the same aggregation
//! machinery if they can be represented as a [`Loadable`].
//!
//! # Module Organization
//!
//! ```text
//! source/
//! ├── cell      - SourceCell, a push-driven source fed by an external data layer
//! ├── future    - FutureSource, adapts a future factory into a Loadable
//! ├── typed     - JsonSource, a typed view over raw JSON content
//! └── transform - TransformedSource, pure content mapping over another source
//! ```
//!
//! # Key Types
//!
//! | Type | Description |
//! |------|-------------|
//! | [`Loadable`] | Contract any aggregatable data source must satisfy |
//! | [`StateStream`] | Replay-one stream of state snapshots |
//! | [`SubscribeOptions`] | Explicit opt-in for load-on-subscribe |
//! | [`ErasedLoadable`] | Object-safe erased form for heterogeneous collections |

use std::pin::Pin;
use std::task::{Context, Poll};

use futures::stream::{BoxStream, Stream, StreamExt};
use tokio::sync::watch;
use tokio_stream::wrappers::WatchStream;

use crate::error::Result;
use crate::state::{LoadableState, StateSnapshot};

mod cell;
mod future;
mod transform;
mod typed;

pub use cell::SourceCell;
pub use future::FutureSource;
pub use transform::TransformedSource;
pub use typed::JsonSource;

/// A provider of an asynchronously-updating, optionally-erroring value.
///
/// Implement this for anything whose loading state should participate in a
/// group status: an HTTP resource adapter, an in-memory fake, a computation.
/// The two canonical implementations are [`SourceCell`] (pushed to by an
/// external data layer) and [`FutureSource`] (wraps a future factory).
///
/// # Reload semantics
///
/// `load_if_needed` and `load` default to no-ops and `is_reloadable` to
/// `false`, which is correct for pure in-memory sources. Sources that can
/// refetch should override all three; the freshness policy behind
/// `load_if_needed` is owned by the source, never by the aggregator.
pub trait Loadable: Send + Sync + 'static {
    /// The content type this source produces.
    type Content: Clone + Send + Sync + 'static;

    /// The current state snapshot.
    fn state(&self) -> LoadableState<Self::Content>;

    /// A stream of state snapshots that immediately emits the current state
    /// on subscription (replay-one), then emits on every subsequent change.
    ///
    /// The stream never terminates on its own; it represents an ongoing
    /// liveness relationship, not a finite computation. Consumers are
    /// responsible for ending their subscription. Subscribing has no side
    /// effects; see [`Loadable::subscribe`] for the opt-in load trigger.
    fn state_stream(&self) -> StateStream<Self::Content>;

    /// Trigger a fetch only if none is in flight and no fresh value is
    /// cached. The default implementation does nothing.
    fn load_if_needed(&self) {}

    /// Unconditionally trigger a fetch/reload. The default implementation
    /// does nothing.
    fn load(&self) {}

    /// Whether `load`/`load_if_needed` have any effect for this source.
    /// Controls, for example, whether a retry affordance should be shown.
    fn is_reloadable(&self) -> bool {
        false
    }

    /// Subscribe with explicit options.
    ///
    /// Auto-triggering a load on first observation is a common convenience,
    /// but baked in it causes surprising double-fetches when several
    /// consumers observe the same source. It is therefore an explicit opt-in
    /// here rather than a default behavior.
    fn subscribe(&self, options: SubscribeOptions) -> StateStream<Self::Content> {
        if options.load_if_needed {
            self.load_if_needed();
        }
        self.state_stream()
    }
}

/// Options for [`Loadable::subscribe`].
#[derive(Debug, Clone, Copy, Default)]
pub struct SubscribeOptions {
    /// Call `load_if_needed()` as part of subscribing.
    pub load_if_needed: bool,
}

impl SubscribeOptions {
    /// Subscribe and trigger `load_if_needed()` in one step.
    pub fn triggering_load() -> Self {
        SubscribeOptions {
            load_if_needed: true,
        }
    }
}

/// A replay-one stream of [`LoadableState`] snapshots.
///
/// Implements [`Stream`], so all `StreamExt` combinators apply; a few
/// content-focused conveniences are provided directly.
pub struct StateStream<T> {
    inner: BoxStream<'static, LoadableState<T>>,
}

impl<T: Clone + Send + Sync + 'static> StateStream<T> {
    /// Build a state stream from a watch receiver.
    ///
    /// `watch` gives replay-one semantics for free: the receiver's current
    /// value is yielded immediately, then every subsequent change. Rapid
    /// successive changes may be conflated to the latest value, which is the
    /// right behavior for display state.
    pub fn from_watch(rx: watch::Receiver<LoadableState<T>>) -> Self {
        StateStream {
            inner: WatchStream::new(rx).boxed(),
        }
    }

    /// Wrap an arbitrary snapshot stream.
    ///
    /// The stream must provide replay-one semantics itself to satisfy the
    /// [`Loadable::state_stream`] contract.
    pub fn from_stream(
        stream: impl Stream<Item = LoadableState<T>> + Send + 'static,
    ) -> Self {
        StateStream {
            inner: stream.boxed(),
        }
    }

    /// Just the content, whenever it is present. Never errors.
    pub fn content(self) -> BoxStream<'static, T> {
        self.inner.filter_map(|s| async move { s.content }).boxed()
    }

    /// The content if present, otherwise `None`; one item per snapshot.
    pub fn optional_content(self) -> BoxStream<'static, Option<T>> {
        self.inner.map(|s| s.content).boxed()
    }

    /// Content when available, or `Err` for any snapshot carrying an error
    /// (regardless of whether stale content is also present).
    pub fn failing_content(self) -> BoxStream<'static, Result<T>> {
        self.inner
            .filter_map(|s| async move {
                if let Some(error) = s.latest_error {
                    Some(Err(error))
                } else {
                    s.content.map(Ok)
                }
            })
            .boxed()
    }
}

impl<T> Stream for StateStream<T> {
    type Item = LoadableState<T>;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        self.inner.poll_next_unpin(cx)
    }
}

/// Object-safe, content-erased view of a [`Loadable`].
///
/// The group aggregator holds N sources of different content types in one
/// collection; rules only inspect content presence, so each source is erased
/// down to [`StateSnapshot`]s. Every `Loadable` gets this for free via a
/// blanket implementation, so an `Arc<SourceCell<T>>` coerces directly to
/// [`AnyLoadable`].
pub trait ErasedLoadable: Send + Sync {
    /// The current snapshot, content erased to presence.
    fn snapshot(&self) -> StateSnapshot;

    /// Replay-one stream of erased snapshots.
    fn snapshot_stream(&self) -> BoxStream<'static, StateSnapshot>;

    /// Forward of [`Loadable::load_if_needed`].
    fn request_load_if_needed(&self);

    /// Forward of [`Loadable::load`].
    fn request_load(&self);

    /// Forward of [`Loadable::is_reloadable`].
    fn can_reload(&self) -> bool;
}

impl<L: Loadable> ErasedLoadable for L {
    fn snapshot(&self) -> StateSnapshot {
        self.state().snapshot()
    }

    fn snapshot_stream(&self) -> BoxStream<'static, StateSnapshot> {
        self.state_stream().map(|s| s.snapshot()).boxed()
    }

    fn request_load_if_needed(&self) {
        self.load_if_needed();
    }

    fn request_load(&self) {
        self.load();
    }

    fn can_reload(&self) -> bool {
        self.is_reloadable()
    }
}

/// A shared handle to an erased source, as consumed by
/// [`GroupStatusModel`](crate::GroupStatusModel).
pub type AnyLoadable = std::sync::Arc<dyn ErasedLoadable>;
