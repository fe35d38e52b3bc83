// ── Update subscriptions ──
//
// The update signal carries no payload; every wake-up re-reads the
// published snapshot.

use std::pin::Pin;
use std::sync::Arc;
use std::task::{Context, Poll};

use arc_swap::ArcSwap;
use futures_core::Stream;
use tokio::sync::watch;
use tokio_stream::wrappers::WatchStream;

use crate::store::RouterState;

/// A subscription to published cycles.
pub struct UpdateStream {
    state: Arc<ArcSwap<RouterState>>,
    receiver: watch::Receiver<u64>,
}

impl UpdateStream {
    pub(crate) fn new(state: Arc<ArcSwap<RouterState>>, receiver: watch::Receiver<u64>) -> Self {
        Self { state, receiver }
    }

    /// The latest published snapshot.
    pub fn latest(&self) -> Arc<RouterState> {
        self.state.load_full()
    }

    /// Wait for the next completed cycle, returning its snapshot.
    /// Returns `None` if the store has been dropped.
    pub async fn changed(&mut self) -> Option<Arc<RouterState>> {
        self.receiver.changed().await.ok()?;
        self.receiver.mark_unchanged();
        Some(self.state.load_full())
    }

    /// Convert into a `Stream` that yields a snapshot per completed
    /// cycle, starting with the current one.
    pub fn into_stream(self) -> UpdateWatchStream {
        UpdateWatchStream {
            state: self.state,
            inner: WatchStream::new(self.receiver),
        }
    }
}

/// `Stream` adapter backed by the generation `watch::Receiver`.
pub struct UpdateWatchStream {
    state: Arc<ArcSwap<RouterState>>,
    inner: WatchStream<u64>,
}

impl Stream for UpdateWatchStream {
    type Item = Arc<RouterState>;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        match Pin::new(&mut self.inner).poll_next(cx) {
            Poll::Ready(Some(_)) => Poll::Ready(Some(self.state.load_full())),
            Poll::Ready(None) => Poll::Ready(None),
            Poll::Pending => Poll::Pending,
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use futures_util::StreamExt;

    use crate::model::Interface;
    use crate::store::{DataStore, RouterState};

    #[tokio::test]
    async fn publish_wakes_subscribers_once() {
        let store = DataStore::new();
        let mut updates = store.subscribe();

        let mut state = RouterState::default();
        state.interfaces.insert("ether1", Interface::default());
        store.publish(state);

        let snapshot = updates.changed().await.unwrap();
        assert_eq!(snapshot.interfaces.len(), 1);
        assert_eq!(store.generation(), 1);
        assert!(store.last_update().is_some());
        assert!(!updates.receiver.has_changed().unwrap());
    }

    #[tokio::test]
    async fn stream_yields_current_then_each_publish() {
        let store = DataStore::new();
        let mut stream = store.subscribe().into_stream();

        let current = stream.next().await.unwrap();
        assert!(current.interfaces.is_empty());

        let mut state = RouterState::default();
        state.interfaces.insert("ether1", Interface::default());
        store.publish(state);

        let next = stream.next().await.unwrap();
        assert_eq!(next.interfaces.len(), 1);

        drop(store);
        assert!(stream.next().await.is_none());
    }

    #[test]
    fn changed_stays_pending_until_publish() {
        let store = DataStore::new();
        let mut updates = store.subscribe();
        let mut changed = tokio_test::task::spawn(updates.changed());

        tokio_test::assert_pending!(changed.poll());

        store.publish(RouterState::default());
        assert!(changed.is_woken());
        let snapshot = tokio_test::assert_ready!(changed.poll());
        assert!(snapshot.is_some());
    }
}
