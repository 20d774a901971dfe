use std::collections::HashMap;
use std::future::Future;
use std::hash::Hash;
use std::sync::{Arc, Mutex, PoisonError};

use tokio::sync::OnceCell;

use crate::RemapError;

type Slot<V> = Arc<OnceCell<Result<V, RemapError>>>;

/// Memo table scoped to one run.
///
/// The slot for a key is inserted at lookup time, before the fetch starts, so
/// concurrent callers for the same key wait on one fetch instead of issuing
/// their own. Failures are memoized as well; nothing is retried.
pub(crate) struct InflightCache<K, V> {
    slots: Mutex<HashMap<K, Slot<V>>>,
}

impl<K, V> InflightCache<K, V>
where
    K: Eq + Hash,
    V: Clone,
{
    pub(crate) fn new() -> Self {
        Self {
            slots: Mutex::new(HashMap::new()),
        }
    }

    pub(crate) async fn get_or_fetch<F, Fut>(&self, key: K, fetch: F) -> Result<V, RemapError>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<V, RemapError>>,
    {
        let slot = {
            let mut slots = self.slots.lock().unwrap_or_else(PoisonError::into_inner);
            Arc::clone(slots.entry(key).or_default())
        };
        slot.get_or_init(fetch).await.clone()
    }

    pub(crate) fn len(&self) -> usize {
        self.slots
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }
}
