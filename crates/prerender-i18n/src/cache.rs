//! Single-flight, populate-once cache.

use std::collections::HashMap;
use std::future::Future;
use std::sync::{Arc, Mutex, PoisonError};

use crate::loader::LocaleError;

type Slot<T> = Arc<tokio::sync::Mutex<Option<Arc<T>>>>;

/// A process-wide, lazily populated cache.
///
/// Values are loaded at most once per key; concurrent loads for the same
/// key serialize on a per-key lock so only the first caller actually
/// loads. Failures are not cached: the slot stays empty and the error
/// propagates to the caller.
#[derive(Debug)]
pub struct SingleFlightCache<T> {
    slots: Mutex<HashMap<String, Slot<T>>>,
}

impl<T> SingleFlightCache<T> {
    /// Create an empty cache.
    pub fn new() -> Self {
        Self {
            slots: Mutex::new(HashMap::new()),
        }
    }

    fn slot(&self, key: &str) -> Slot<T> {
        let mut slots = self.slots.lock().unwrap_or_else(PoisonError::into_inner);
        slots.entry(key.to_string()).or_default().clone()
    }

    /// Get the cached value for a key, loading it on first use.
    pub async fn get_or_load<F, Fut>(&self, key: &str, load: F) -> Result<Arc<T>, LocaleError>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<T, LocaleError>>,
    {
        let slot = self.slot(key);
        let mut guard = slot.lock().await;

        if let Some(value) = guard.as_ref() {
            return Ok(value.clone());
        }

        tracing::debug!(key, "locale cache miss; loading");
        let value = Arc::new(load().await?);
        *guard = Some(value.clone());
        Ok(value)
    }

    /// Whether a key has been populated.
    pub fn is_populated(&self, key: &str) -> bool {
        let slots = self.slots.lock().unwrap_or_else(PoisonError::into_inner);
        slots
            .get(key)
            .map(|slot| slot.try_lock().map(|g| g.is_some()).unwrap_or(false))
            .unwrap_or(false)
    }
}

impl<T> Default for SingleFlightCache<T> {
    fn default() -> Self {
        Self::new()
    }
}
