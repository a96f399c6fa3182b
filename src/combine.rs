//! A combine-latest join over a dynamic number of streams.
//!
//! [`combine_latest`] merges N streams into one stream of `Vec`s: once every
//! member has emitted at least once, each further upstream emission produces
//! a combined item holding that new value alongside whatever the other
//! members' most recent values were at that moment. This is the standard
//! combine-latest join: it emits once per upstream emission, not once per
//! full round of N emissions, and it gives no guarantee that the combined
//! values are causally related to the same wall-clock moment.
//!
//! A member that ends keeps contributing its last value; the combined stream
//! ends only when every member has ended.

use std::pin::Pin;
use std::task::{Context, Poll};

use futures::stream::Stream;

/// Combine `streams` into a single stream of latest-value vectors.
///
/// The output vector preserves the input order: element `i` is always the
/// most recent item of `streams[i]`. An empty input produces a stream that
/// ends immediately.
///
/// # Examples
///
/// ```
/// use futures::StreamExt;
/// use statuswatch::combine_latest;
///
/// # tokio_test::block_on(async {
/// let a = futures::stream::iter([1, 2]);
/// let b = futures::stream::iter([10]);
///
/// let combined: Vec<Vec<i32>> = combine_latest(vec![a.boxed(), b.boxed()])
///     .collect()
///     .await;
/// // `a` drains before `b` first emits, so the only full set is [2, 10].
/// assert_eq!(combined, vec![vec![2, 10]]);
/// # });
/// ```
pub fn combine_latest<S>(streams: Vec<S>) -> CombineLatest<S>
where
    S: Stream + Unpin,
    S::Item: Clone + Unpin,
{
    let len = streams.len();
    CombineLatest {
        streams,
        latest: (0..len).map(|_| None).collect(),
        done: vec![false; len],
    }
}

/// Stream returned by [`combine_latest`].
pub struct CombineLatest<S: Stream + Unpin> {
    streams: Vec<S>,
    latest: Vec<Option<S::Item>>,
    done: Vec<bool>,
}

impl<S> CombineLatest<S>
where
    S: Stream + Unpin,
    S::Item: Clone,
{
    fn full_set(&self) -> Option<Vec<S::Item>> {
        if self.latest.iter().all(Option::is_some) {
            Some(self.latest.iter().flatten().cloned().collect())
        } else {
            None
        }
    }
}

impl<S> Stream for CombineLatest<S>
where
    S: Stream + Unpin,
    S::Item: Clone + Unpin,
{
    type Item = Vec<S::Item>;

    fn poll_next(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        let this = self.get_mut();

        for i in 0..this.streams.len() {
            if this.done[i] {
                continue;
            }
            // Drain this member until it has nothing ready. Values that
            // arrive before every member has emitted are conflated down to
            // the freshest one, which is all combine-latest ever keeps.
            loop {
                match Pin::new(&mut this.streams[i]).poll_next(cx) {
                    Poll::Ready(Some(item)) => {
                        this.latest[i] = Some(item);
                        if let Some(combined) = this.full_set() {
                            return Poll::Ready(Some(combined));
                        }
                    }
                    Poll::Ready(None) => {
                        this.done[i] = true;
                        break;
                    }
                    Poll::Pending => break,
                }
            }
        }

        if this.done.iter().all(|done| *done) {
            Poll::Ready(None)
        } else {
            Poll::Pending
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures::stream::BoxStream;
    use futures::StreamExt;
    use tokio::sync::mpsc;
    use tokio_stream::wrappers::ReceiverStream;

    fn channel_stream<T: Send + 'static>() -> (mpsc::Sender<T>, BoxStream<'static, T>) {
        let (tx, rx) = mpsc::channel(16);
        (tx, ReceiverStream::new(rx).boxed())
    }

    #[tokio::test]
    async fn silent_until_every_member_emits() {
        let (tx_a, a) = channel_stream::<i32>();
        let (tx_b, b) = channel_stream::<i32>();
        let mut combined = combine_latest(vec![a, b]);

        tx_a.send(1).await.unwrap();
        tx_a.send(2).await.unwrap();
        tx_b.send(10).await.unwrap();

        assert_eq!(combined.next().await, Some(vec![2, 10]));
        drop(tx_a);
        drop(tx_b);
    }

    #[tokio::test]
    async fn emits_per_upstream_emission_with_latest_others() {
        let (tx_a, a) = channel_stream::<i32>();
        let (tx_b, b) = channel_stream::<i32>();
        let mut combined = combine_latest(vec![a, b]);

        tx_a.send(1).await.unwrap();
        tx_b.send(10).await.unwrap();
        assert_eq!(combined.next().await, Some(vec![1, 10]));

        tx_b.send(20).await.unwrap();
        assert_eq!(combined.next().await, Some(vec![1, 20]));

        tx_a.send(2).await.unwrap();
        assert_eq!(combined.next().await, Some(vec![2, 20]));

        drop(tx_a);
        drop(tx_b);
        assert_eq!(combined.next().await, None);
    }

    #[tokio::test]
    async fn ended_member_keeps_contributing_last_value() {
        let (tx_a, a) = channel_stream::<i32>();
        let (tx_b, b) = channel_stream::<i32>();
        let mut combined = combine_latest(vec![a, b]);

        tx_a.send(1).await.unwrap();
        drop(tx_a);
        tx_b.send(10).await.unwrap();
        assert_eq!(combined.next().await, Some(vec![1, 10]));

        tx_b.send(20).await.unwrap();
        assert_eq!(combined.next().await, Some(vec![1, 20]));
        drop(tx_b);
    }

    #[tokio::test]
    async fn empty_input_ends_immediately() {
        let mut combined = combine_latest(Vec::<BoxStream<'static, i32>>::new());
        assert_eq!(combined.next().await, None);
    }

    #[tokio::test]
    async fn member_ending_without_emitting_blocks_forever_then_closes() {
        let (tx_a, a) = channel_stream::<i32>();
        let (tx_b, b) = channel_stream::<i32>();
        let mut combined = combine_latest(vec![a, b]);

        tx_a.send(1).await.unwrap();
        drop(tx_b); // never emitted
        drop(tx_a);

        // No full set can ever form; the stream just ends.
        assert_eq!(combined.next().await, None);
    }
}
