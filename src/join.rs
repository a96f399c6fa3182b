//! Fixed-arity typed joins: group status plus typed contents.
//!
//! [`GroupStatusModel`](crate::GroupStatusModel) erases content because it
//! joins an arbitrary number of differently-typed sources. When the arity is
//! known at compile time, these combinators keep the content types intact:
//! each emission carries the verdict *and* the latest typed contents, so a
//! consumer can render data without any downcasting.
//!
//! [`ready2`]/[`ready3`] build on the joins to express "wait until every
//! source is ready, then hand me the values": they trigger `load_if_needed`
//! on each source, then resolve with owned contents once all are present, or
//! with the first error observed.

use std::pin::Pin;
use std::task::{Context, Poll};

use futures::stream::{Stream, StreamExt};

use crate::error::{LoadError, Result};
use crate::source::{Loadable, StateStream};
use crate::state::{LoadableState, StateSnapshot};
use crate::status::{group_status, GroupStatus, GroupStatusRule};

/// A group verdict carrying typed contents.
///
/// The typed analogue of [`GroupStatus`]: `Data` holds the latest content of
/// every joined source (each still optional, since rules like
/// [`GroupStatusRule::AnyData`] can declare the group displayable before
/// every source has content).
#[derive(Debug, Clone, PartialEq)]
pub enum GroupDisplay<T> {
    /// Show a loading indicator.
    Loading,

    /// Show the error (and a retry affordance, if anything is reloadable).
    Error(LoadError),

    /// Render the joined contents.
    Data(T),
}

/// One joined member: its stream and the latest snapshot seen from it.
struct Slot<T: Clone + Send + Sync + 'static> {
    stream: StateStream<T>,
    latest: Option<LoadableState<T>>,
    done: bool,
}

impl<T: Clone + Send + Sync + 'static> Slot<T> {
    fn new(stream: StateStream<T>) -> Self {
        Slot {
            stream,
            latest: None,
            done: false,
        }
    }

    /// Drain ready items, keeping the freshest. Returns whether anything new
    /// arrived.
    fn poll_update(&mut self, cx: &mut Context<'_>) -> bool {
        let mut updated = false;
        while !self.done {
            match Pin::new(&mut self.stream).poll_next(cx) {
                Poll::Ready(Some(state)) => {
                    self.latest = Some(state);
                    updated = true;
                }
                Poll::Ready(None) => self.done = true,
                Poll::Pending => break,
            }
        }
        updated
    }

    fn snapshot(&self) -> Option<StateSnapshot> {
        self.latest.as_ref().map(LoadableState::snapshot)
    }

    fn content(&self) -> Option<T> {
        self.latest.as_ref().and_then(|state| state.content.clone())
    }
}

fn to_display<T>(status: GroupStatus, contents: T) -> GroupDisplay<T> {
    match status {
        GroupStatus::Loading => GroupDisplay::Loading,
        GroupStatus::Error(error) => GroupDisplay::Error(error),
        GroupStatus::Data => GroupDisplay::Data(contents),
    }
}

/// Join two sources into a stream of typed verdicts.
///
/// Emits once both sources have reported at least one snapshot, then on
/// every subsequent change, pairing the rule verdict with the latest typed
/// contents. An item of `None` means no rule matched (undetermined).
pub fn join_status2<LA, LB>(
    a: &LA,
    b: &LB,
    rules: &[GroupStatusRule],
) -> StatusJoin2<LA::Content, LB::Content>
where
    LA: Loadable,
    LB: Loadable,
    LA::Content: Unpin,
    LB::Content: Unpin,
{
    StatusJoin2 {
        a: Slot::new(a.state_stream()),
        b: Slot::new(b.state_stream()),
        rules: rules.to_vec(),
    }
}

/// Stream returned by [`join_status2`].
pub struct StatusJoin2<A, B>
where
    A: Clone + Send + Sync + Unpin + 'static,
    B: Clone + Send + Sync + Unpin + 'static,
{
    a: Slot<A>,
    b: Slot<B>,
    rules: Vec<GroupStatusRule>,
}

impl<A, B> Stream for StatusJoin2<A, B>
where
    A: Clone + Send + Sync + Unpin + 'static,
    B: Clone + Send + Sync + Unpin + 'static,
{
    type Item = Option<GroupDisplay<(Option<A>, Option<B>)>>;

    fn poll_next(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        let this = self.get_mut();

        let mut updated = this.a.poll_update(cx);
        updated |= this.b.poll_update(cx);

        if updated {
            if let (Some(sa), Some(sb)) = (this.a.snapshot(), this.b.snapshot()) {
                let status = group_status(&[sa, sb], &this.rules);
                let item =
                    status.map(|s| to_display(s, (this.a.content(), this.b.content())));
                return Poll::Ready(Some(item));
            }
        }

        if this.a.done && this.b.done {
            Poll::Ready(None)
        } else {
            Poll::Pending
        }
    }
}

/// Join three sources into a stream of typed verdicts.
///
/// See [`join_status2`]; identical semantics at arity three.
pub fn join_status3<LA, LB, LC>(
    a: &LA,
    b: &LB,
    c: &LC,
    rules: &[GroupStatusRule],
) -> StatusJoin3<LA::Content, LB::Content, LC::Content>
where
    LA: Loadable,
    LB: Loadable,
    LC: Loadable,
    LA::Content: Unpin,
    LB::Content: Unpin,
    LC::Content: Unpin,
{
    StatusJoin3 {
        a: Slot::new(a.state_stream()),
        b: Slot::new(b.state_stream()),
        c: Slot::new(c.state_stream()),
        rules: rules.to_vec(),
    }
}

/// Stream returned by [`join_status3`].
pub struct StatusJoin3<A, B, C>
where
    A: Clone + Send + Sync + Unpin + 'static,
    B: Clone + Send + Sync + Unpin + 'static,
    C: Clone + Send + Sync + Unpin + 'static,
{
    a: Slot<A>,
    b: Slot<B>,
    c: Slot<C>,
    rules: Vec<GroupStatusRule>,
}

impl<A, B, C> Stream for StatusJoin3<A, B, C>
where
    A: Clone + Send + Sync + Unpin + 'static,
    B: Clone + Send + Sync + Unpin + 'static,
    C: Clone + Send + Sync + Unpin + 'static,
{
    type Item = Option<GroupDisplay<(Option<A>, Option<B>, Option<C>)>>;

    fn poll_next(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        let this = self.get_mut();

        let mut updated = this.a.poll_update(cx);
        updated |= this.b.poll_update(cx);
        updated |= this.c.poll_update(cx);

        if updated {
            if let (Some(sa), Some(sb), Some(sc)) =
                (this.a.snapshot(), this.b.snapshot(), this.c.snapshot())
            {
                let status = group_status(&[sa, sb, sc], &this.rules);
                let item = status.map(|s| {
                    to_display(
                        s,
                        (this.a.content(), this.b.content(), this.c.content()),
                    )
                });
                return Poll::Ready(Some(item));
            }
        }

        if this.a.done && this.b.done && this.c.done {
            Poll::Ready(None)
        } else {
            Poll::Pending
        }
    }
}

/// Wait until both sources have content, then return it.
///
/// Triggers `load_if_needed()` on each source, then observes their states
/// until every source has content (returning owned copies) or any source
/// reports an error (returning the first one observed). Loading phases are
/// waited through, not surfaced.
pub async fn ready2<LA, LB>(a: &LA, b: &LB) -> Result<(LA::Content, LB::Content)>
where
    LA: Loadable,
    LB: Loadable,
    LA::Content: Unpin,
    LB::Content: Unpin,
{
    a.load_if_needed();
    b.load_if_needed();

    const RULES: [GroupStatusRule; 2] = [GroupStatusRule::AllData, GroupStatusRule::Error];
    let mut join = join_status2(a, b, &RULES);
    while let Some(item) = join.next().await {
        match item {
            Some(GroupDisplay::Data((Some(a), Some(b)))) => return Ok((a, b)),
            Some(GroupDisplay::Error(error)) => return Err(error),
            _ => {}
        }
    }
    Err(LoadError::source(
        "sources ended before producing content or an error",
    ))
}

/// Wait until all three sources have content, then return it.
///
/// See [`ready2`]; identical semantics at arity three.
pub async fn ready3<LA, LB, LC>(
    a: &LA,
    b: &LB,
    c: &LC,
) -> Result<(LA::Content, LB::Content, LC::Content)>
where
    LA: Loadable,
    LB: Loadable,
    LC: Loadable,
    LA::Content: Unpin,
    LB::Content: Unpin,
    LC::Content: Unpin,
{
    a.load_if_needed();
    b.load_if_needed();
    c.load_if_needed();

    const RULES: [GroupStatusRule; 2] = [GroupStatusRule::AllData, GroupStatusRule::Error];
    let mut join = join_status3(a, b, c, &RULES);
    while let Some(item) = join.next().await {
        match item {
            Some(GroupDisplay::Data((Some(a), Some(b), Some(c)))) => return Ok((a, b, c)),
            Some(GroupDisplay::Error(error)) => return Err(error),
            _ => {}
        }
    }
    Err(LoadError::source(
        "sources ended before producing content or an error",
    ))
}
