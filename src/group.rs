//! The live group-status aggregator.
//!
//! [`GroupStatusModel`] watches the state of a set of sources and applies a
//! prioritized rule list to determine what should be displayed for the group
//! as a whole. It subscribes to every source's snapshot stream, joins them
//! with [`combine_latest`](crate::combine_latest), recomputes the verdict on
//! every emission, and publishes the result to its own subscribers.
//!
//! The model performs no retries itself; an error status is purely
//! descriptive. Recovery is an explicit caller action through
//! [`try_again`](GroupStatusModel::try_again) (respecting each source's
//! freshness policy) or [`reload_all`](GroupStatusModel::reload_all)
//! (unconditional).

use std::pin::Pin;
use std::sync::{Arc, Weak};
use std::task::{Context, Poll};

use futures::stream::{Stream, StreamExt};
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio_stream::wrappers::WatchStream;

use crate::combine::combine_latest;
use crate::source::{AnyLoadable, ErasedLoadable};
use crate::status::{group_status, GroupStatus, GroupStatusRule};

/// Aggregates N sources' loadable states into one published [`GroupStatus`].
///
/// # Lifecycle and ownership
///
/// The model owns subscriptions to each source's snapshot stream for as long
/// as it is alive; the sources themselves are owned externally and only
/// weakly referenced here, for the purpose of issuing reload requests.
/// Dropping the model immediately stops recomputation and releases its
/// upstream subscriptions; it does not cancel fetches the sources already
/// started.
///
/// # Consistency
///
/// The published status is always consistent with the most recent snapshot
/// of every source as of the last recomputation. Snapshots from different
/// sources are not causally synchronized; each source updates independently
/// (standard combine-latest semantics, not a barrier).
///
/// # Examples
///
/// ```ignore
/// use std::sync::Arc;
/// use statuswatch::{GroupStatusModel, GroupStatusRule, SourceCell};
///
/// let posts = Arc::new(SourceCell::<Vec<Post>>::new());
/// let user = Arc::new(SourceCell::<User>::new());
///
/// let model = GroupStatusModel::new(
///     vec![posts.clone(), user.clone()],
///     GroupStatusRule::STANDARD.to_vec(),
/// );
///
/// // Render model.status(); offer a retry button when model.can_try_again().
/// ```
pub struct GroupStatusModel {
    sources: Vec<Weak<dyn ErasedLoadable>>,
    rules: Vec<GroupStatusRule>,
    rx: watch::Receiver<Option<GroupStatus>>,
    task: JoinHandle<()>,
}

impl GroupStatusModel {
    /// Watch `sources` and derive the group status from `rules`.
    ///
    /// The initial status is computed synchronously from the sources'
    /// current snapshots, so [`status`](Self::status) is meaningful before
    /// the first asynchronous update arrives. Must be called within a Tokio
    /// runtime.
    ///
    /// A rule list without a guaranteed-to-match final rule (such as
    /// [`GroupStatusRule::AlwaysData`]) can leave the status undetermined
    /// (`None`).
    pub fn new<I>(sources: I, rules: Vec<GroupStatusRule>) -> Self
    where
        I: IntoIterator<Item = AnyLoadable>,
    {
        let sources: Vec<AnyLoadable> = sources.into_iter().collect();

        let snapshots: Vec<_> = sources.iter().map(|s| s.snapshot()).collect();
        let initial = group_status(&snapshots, &rules);

        let streams: Vec<_> = sources.iter().map(|s| s.snapshot_stream()).collect();
        let (tx, rx) = watch::channel(initial);

        let task_rules = rules.clone();
        let task = tokio::spawn(async move {
            let mut combined = combine_latest(streams);
            while let Some(snapshots) = combined.next().await {
                let status = group_status(&snapshots, &task_rules);
                tracing::trace!(?status, "group status recomputed");
                if tx.send(status).is_err() {
                    break;
                }
            }
        });

        GroupStatusModel {
            sources: sources.iter().map(Arc::downgrade).collect(),
            rules,
            rx,
            task,
        }
    }

    /// The latest verdict; `None` when no rule matched.
    pub fn status(&self) -> Option<GroupStatus> {
        self.rx.borrow().clone()
    }

    /// The rule list this model evaluates, in priority order.
    pub fn rules(&self) -> &[GroupStatusRule] {
        &self.rules
    }

    /// A replay-one stream of verdicts: the current one immediately, then
    /// every change. Rapid recomputations may be conflated to the latest.
    pub fn subscribe(&self) -> StatusStream {
        StatusStream {
            inner: WatchStream::new(self.rx.clone()),
        }
    }

    /// Ask every reloadable source to load if it considers a load needed.
    ///
    /// Respects each source's own freshness policy: sources with a fetch in
    /// flight or a cached value will decline. Sources reporting
    /// `is_reloadable == false` are never invoked. Effects are observed
    /// asynchronously through the status stream.
    pub fn try_again(&self) {
        tracing::debug!("group model: try_again requested");
        for source in self.sources.iter().filter_map(Weak::upgrade) {
            if source.can_reload() {
                source.request_load_if_needed();
            }
        }
    }

    /// Unconditionally reload every reloadable source.
    ///
    /// The forced counterpart of [`try_again`](Self::try_again), for
    /// explicit refresh gestures where "already cached" must not skip the
    /// fetch.
    pub fn reload_all(&self) {
        tracing::debug!("group model: reload_all requested");
        for source in self.sources.iter().filter_map(Weak::upgrade) {
            if source.can_reload() {
                source.request_load();
            }
        }
    }

    /// Whether any underlying source is reloadable. Controls whether a retry
    /// affordance should be shown at all.
    pub fn can_try_again(&self) -> bool {
        self.sources
            .iter()
            .filter_map(Weak::upgrade)
            .any(|source| source.can_reload())
    }
}

impl Drop for GroupStatusModel {
    fn drop(&mut self) {
        self.task.abort();
    }
}

/// Stream of group-status verdicts returned by [`GroupStatusModel::subscribe`].
pub struct StatusStream {
    inner: WatchStream<Option<GroupStatus>>,
}

impl Stream for StatusStream {
    type Item = Option<GroupStatus>;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        Pin::new(&mut self.inner).poll_next(cx)
    }
}
