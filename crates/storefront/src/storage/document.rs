//! Versioned JSON documents holding a list of items.
//!
//! Written layout:
//!
//! ```json
//! { "version": 1, "saved_at": "2026-01-05T10:00:00Z", "items": [ ... ] }
//! ```
//!
//! A bare JSON array is also accepted on load; that is how the browser
//! storefront wrote carts before documents were versioned.
//!
//! Loading never fails: a missing, unreadable, malformed or newer-versioned
//! document yields an empty list. Saving never fails either: the first write
//! error is logged and the list switches to in-memory only for the rest of
//! the session, so a broken backend cannot corrupt or block the stores.

use std::marker::PhantomData;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use super::KeyValueStore;

/// Current document schema version.
pub const SCHEMA_VERSION: u32 = 1;

#[derive(Serialize)]
struct Envelope<'a, T> {
    version: u32,
    saved_at: DateTime<Utc>,
    items: &'a [T],
}

#[derive(Deserialize)]
#[serde(untagged)]
enum StoredDocument<T> {
    Versioned { version: u32, items: Vec<T> },
    Legacy(Vec<T>),
}

/// A list of `T` persisted under a single key.
pub struct PersistedList<T> {
    key: &'static str,
    backend: Arc<dyn KeyValueStore>,
    degraded: bool,
    _items: PhantomData<fn() -> T>,
}

impl<T> std::fmt::Debug for PersistedList<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PersistedList")
            .field("key", &self.key)
            .field("degraded", &self.degraded)
            .finish_non_exhaustive()
    }
}

impl<T: Serialize + DeserializeOwned> PersistedList<T> {
    /// Bind a list to `key` in `backend`.
    #[must_use]
    pub fn new(key: &'static str, backend: Arc<dyn KeyValueStore>) -> Self {
        Self {
            key,
            backend,
            degraded: false,
            _items: PhantomData,
        }
    }

    /// Whether writes have been abandoned after a backend failure.
    #[must_use]
    pub const fn is_degraded(&self) -> bool {
        self.degraded
    }

    /// Read the list, falling back to empty on any problem.
    #[must_use]
    pub fn load(&self) -> Vec<T> {
        let raw = match self.backend.get(self.key) {
            Ok(Some(raw)) => raw,
            Ok(None) => return Vec::new(),
            Err(e) => {
                warn!(key = self.key, error = %e, "Failed to read persisted state, starting empty");
                return Vec::new();
            }
        };

        match serde_json::from_str::<StoredDocument<T>>(&raw) {
            Ok(StoredDocument::Versioned { version, items }) if version <= SCHEMA_VERSION => {
                debug!(key = self.key, version, count = items.len(), "Loaded persisted state");
                items
            }
            Ok(StoredDocument::Versioned { version, .. }) => {
                warn!(
                    key = self.key,
                    version,
                    supported = SCHEMA_VERSION,
                    "Persisted state was written by a newer version, starting empty"
                );
                Vec::new()
            }
            Ok(StoredDocument::Legacy(items)) => {
                debug!(key = self.key, count = items.len(), "Loaded legacy persisted state");
                items
            }
            Err(e) => {
                warn!(key = self.key, error = %e, "Persisted state is malformed, starting empty");
                Vec::new()
            }
        }
    }

    /// Write the full list. Best-effort; see the module docs.
    pub fn save(&mut self, items: &[T]) {
        if self.degraded {
            return;
        }

        let envelope = Envelope {
            version: SCHEMA_VERSION,
            saved_at: Utc::now(),
            items,
        };
        let result = serde_json::to_string(&envelope)
            .map_err(|e| e.to_string())
            .and_then(|json| {
                self.backend
                    .set(self.key, &json)
                    .map_err(|e| e.to_string())
            });

        if let Err(error) = result {
            warn!(
                key = self.key,
                %error,
                "Failed to persist state, continuing in memory for this session"
            );
            self.degraded = true;
        }
    }
}
