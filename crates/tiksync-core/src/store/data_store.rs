// ── Published snapshot store ──
//
// Holds the last completed cycle's model behind an `ArcSwap` so readers
// never block the cycle. A payload-less generation counter on a `watch`
// channel tells subscribers to re-read.

use std::sync::Arc;

use arc_swap::ArcSwap;
use chrono::{DateTime, Utc};
use tokio::sync::watch;

use super::RouterState;
use crate::stream::UpdateStream;

pub struct DataStore {
    state: Arc<ArcSwap<RouterState>>,
    generation: watch::Sender<u64>,
    last_update: watch::Sender<Option<DateTime<Utc>>>,
}

impl Default for DataStore {
    fn default() -> Self {
        Self::new()
    }
}

impl DataStore {
    pub fn new() -> Self {
        let (generation, _) = watch::channel(0);
        let (last_update, _) = watch::channel(None);
        Self {
            state: Arc::new(ArcSwap::from_pointee(RouterState::default())),
            generation,
            last_update,
        }
    }

    /// The model as of the last completed cycle.
    pub fn snapshot(&self) -> Arc<RouterState> {
        self.state.load_full()
    }

    /// Number of snapshots published so far.
    pub fn generation(&self) -> u64 {
        *self.generation.borrow()
    }

    pub fn last_update(&self) -> Option<DateTime<Utc>> {
        *self.last_update.borrow()
    }

    pub fn subscribe(&self) -> UpdateStream {
        UpdateStream::new(Arc::clone(&self.state), self.generation.subscribe())
    }

    /// Replace the published model and signal subscribers once.
    pub(crate) fn publish(&self, state: RouterState) {
        self.state.store(Arc::new(state));
        self.last_update.send_replace(Some(Utc::now()));
        // `send_modify` updates unconditionally, even with zero receivers.
        self.generation.send_modify(|g| *g += 1);
    }
}
