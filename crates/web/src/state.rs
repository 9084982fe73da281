use std::sync::Arc;

use storage::store::Store;

/// Shared handler state: the persistence backend and viewer settings.
#[derive(Clone)]
pub struct AppState {
    store: Arc<dyn Store>,
    pub poll_interval_ms: u64,
}

impl AppState {
    pub fn new<S>(store: S, poll_interval_ms: u64) -> Self
    where
        S: Store + 'static,
    {
        Self::from_shared(Arc::new(store), poll_interval_ms)
    }

    pub fn from_shared(store: Arc<dyn Store>, poll_interval_ms: u64) -> Self {
        Self {
            store,
            poll_interval_ms,
        }
    }

    pub fn store(&self) -> &dyn Store {
        self.store.as_ref()
    }
}
