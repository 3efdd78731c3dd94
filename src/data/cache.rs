use std::collections::HashMap;
use std::sync::{Arc, Mutex, RwLock};

/// One slot per key; its mutex is held while the value loads so
/// concurrent callers for the same key wait for a single load.
type Slot<T> = Arc<Mutex<Option<Arc<T>>>>;

/// Memoizes expensive loads by key for the life of the process.
///
/// Values are handed out as `Arc<T>`: a hit returns the very instance the
/// first load produced. Failed loads leave the slot empty, so the next call
/// retries.
pub struct LoadCache<T> {
    slots: RwLock<HashMap<String, Slot<T>>>,
}

impl<T> Default for LoadCache<T> {
    fn default() -> Self {
        Self {
            slots: RwLock::new(HashMap::new()),
        }
    }
}

impl<T> LoadCache<T> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Return the cached value for `key`, running `load` on a miss.
    pub fn get_or_load<E, F>(&self, key: &str, load: F) -> Result<Arc<T>, E>
    where
        F: FnOnce(&str) -> Result<T, E>,
    {
        let slot = self.slot(key);
        let mut guard = slot.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        if let Some(value) = guard.as_ref() {
            log::debug!("cache hit for '{key}'");
            return Ok(Arc::clone(value));
        }
        let value = Arc::new(load(key)?);
        *guard = Some(Arc::clone(&value));
        Ok(value)
    }

    /// Drop the cached value for `key` so the next call reloads it.
    pub fn invalidate(&self, key: &str) {
        let mut slots = self.slots.write().unwrap_or_else(|p| p.into_inner());
        slots.remove(key);
    }

    /// Number of keys holding a loaded value.
    #[cfg(test)]
    pub fn len(&self) -> usize {
        let slots = self.slots.read().unwrap_or_else(|p| p.into_inner());
        slots
            .values()
            .filter(|slot| {
                slot.lock()
                    .map(|guard| guard.is_some())
                    .unwrap_or(false)
            })
            .count()
    }

    #[cfg(test)]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn slot(&self, key: &str) -> Slot<T> {
        {
            let slots = self.slots.read().unwrap_or_else(|p| p.into_inner());
            if let Some(slot) = slots.get(key) {
                return Arc::clone(slot);
            }
        }
        let mut slots = self.slots.write().unwrap_or_else(|p| p.into_inner());
        Arc::clone(slots.entry(key.to_string()).or_default())
    }
}
