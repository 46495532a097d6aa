//! Per-tab advisory locks.
//!
//! Row ids are derived from the row count and rows are addressed by index,
//! so read-then-write sequences on one tab must not interleave. The lock only
//! covers writers inside this process.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use tokio::sync::{Mutex as AsyncMutex, OwnedMutexGuard};

type TabKey = (String, String);

/// Lock table keyed by `(spreadsheet id, tab name)`.
#[derive(Debug, Default)]
pub struct TabLocks {
    tabs: Mutex<HashMap<TabKey, Arc<AsyncMutex<()>>>>,
}

impl TabLocks {
    pub fn new() -> Self {
        Self::default()
    }

    /// Waits for exclusive access to a tab. Released when the guard drops.
    pub async fn lock(&self, spreadsheet_id: &str, tab: &str) -> OwnedMutexGuard<()> {
        let slot = {
            let mut tabs = self.tabs.lock().unwrap_or_else(|e| e.into_inner());
            // Drop slots nobody holds or waits on.
            tabs.retain(|_, slot| Arc::strong_count(slot) > 1);
            tabs.entry((spreadsheet_id.to_string(), tab.to_string()))
                .or_default()
                .clone()
        };
        slot.lock_owned().await
    }

    /// Number of tabs currently locked or awaited.
    pub fn active(&self) -> usize {
        let tabs = self.tabs.lock().unwrap_or_else(|e| e.into_inner());
        tabs.values().filter(|slot| Arc::strong_count(slot) > 1).count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[tokio::test]
    async fn same_tab_is_exclusive() {
        let locks = Arc::new(TabLocks::new());
        let guard = locks.lock("s1", "1조").await;

        let contender = {
            let locks = Arc::clone(&locks);
            tokio::spawn(async move {
                let _guard = locks.lock("s1", "1조").await;
            })
        };
        tokio::time::sleep(Duration::from_millis(20)).await;
        assert!(!contender.is_finished());

        drop(guard);
        tokio::time::timeout(Duration::from_secs(1), contender)
            .await
            .unwrap()
            .unwrap();
    }

    #[tokio::test]
    async fn different_tabs_do_not_block() {
        let locks = TabLocks::new();
        let _a = locks.lock("s1", "1조").await;
        let _b = tokio::time::timeout(Duration::from_secs(1), locks.lock("s1", "2조"))
            .await
            .unwrap();
        let _c = tokio::time::timeout(Duration::from_secs(1), locks.lock("s2", "1조"))
            .await
            .unwrap();
        assert_eq!(locks.active(), 3);
    }

    #[tokio::test]
    async fn released_slots_are_pruned() {
        let locks = TabLocks::new();
        drop(locks.lock("s1", "1조").await);
        assert_eq!(locks.active(), 0);
        let _guard = locks.lock("s1", "2조").await;
        assert_eq!(locks.tabs.lock().unwrap().len(), 1);
    }
}
