//! Keyed async locks serializing submissions for one `(student_id, session_label)`.
//!
//! This closes the check-then-write race only among submissions handled by
//! this process. Other writers sharing the same sheet are not covered.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use tokio::sync::{Mutex as AsyncMutex, OwnedMutexGuard};

type Key = (String, String);

#[derive(Default)]
pub struct RowLocks {
    inner: Mutex<HashMap<Key, Arc<AsyncMutex<()>>>>,
}

/// Held for the duration of one recording; dropping it releases the pair.
pub struct RowGuard {
    _guard: OwnedMutexGuard<()>,
}

impl RowLocks {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn acquire(&self, student_id: &str, session_label: &str) -> RowGuard {
        let lock = {
            let mut map = self.inner.lock().unwrap_or_else(|p| p.into_inner());
            // drop entries nobody is waiting on
            map.retain(|_, l| Arc::strong_count(l) > 1);
            map.entry((student_id.to_string(), session_label.to_string()))
                .or_default()
                .clone()
        };
        RowGuard {
            _guard: lock.lock_owned().await,
        }
    }

    /// Pairs currently locked or awaited.
    pub fn len(&self) -> usize {
        let map = self.inner.lock().unwrap_or_else(|p| p.into_inner());
        map.values().filter(|l| Arc::strong_count(l) > 1).count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
