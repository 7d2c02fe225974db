//! The sliding-window store backing conversational context.

use std::collections::HashMap;

use cascata_core::memory::MemoryEntry;
use cascata_core::message::UserId;
use chrono::{Duration, Utc};
use tokio::sync::RwLock;
use tracing::warn;

/// Per-user sliding time window of recent exchanges.
///
/// Growth is bounded only by the TTL: a user sending hundreds of requests
/// inside the window retains all of them until they age out. Pruning is
/// lazy — it happens on every `record`, never on a timer. Reads are
/// guaranteed to expose only non-expired entries even when expired ones are
/// still physically retained.
pub struct EphemeralMemory {
    ttl: Duration,
    warn_window_len: usize,
    windows: RwLock<HashMap<UserId, Vec<MemoryEntry>>>,
}

impl EphemeralMemory {
    /// Create a store with the given window TTL in milliseconds.
    pub fn new(ttl_ms: u64, warn_window_len: usize) -> Self {
        Self {
            ttl: Duration::milliseconds(ttl_ms as i64),
            warn_window_len,
            windows: RwLock::new(HashMap::new()),
        }
    }

    /// Append an exchange to the user's window, stamped with the current
    /// time, then prune that window to entries within the TTL.
    ///
    /// Append and prune happen under a single write lock, so concurrent
    /// `record` calls for the same user can never lose or duplicate an
    /// entry.
    pub async fn record(
        &self,
        user: &UserId,
        prompt: impl Into<String>,
        response: impl Into<String>,
    ) {
        let now = Utc::now();
        let mut windows = self.windows.write().await;

        let window = windows.entry(user.clone()).or_default();
        window.push(MemoryEntry {
            prompt: prompt.into(),
            response: response.into(),
            timestamp: now,
        });
        window.retain(|e| now - e.timestamp <= self.ttl);

        if window.len() > self.warn_window_len {
            warn!(
                user = %user,
                entries = window.len(),
                "Memory window unusually large within TTL"
            );
        }

        // Windows whose newest entry has expired hold nothing visible;
        // drop them entirely.
        let ttl = self.ttl;
        windows.retain(|_, w| w.last().is_some_and(|e| now - e.timestamp <= ttl));
    }

    /// Entries within the TTL for one user, oldest first.
    ///
    /// Never mutates: expired entries may remain physically stored until the
    /// next `record`, but are never visible here.
    pub async fn recent(&self, user: &UserId) -> Vec<MemoryEntry> {
        let now = Utc::now();
        let windows = self.windows.read().await;
        windows
            .get(user)
            .map(|window| {
                window
                    .iter()
                    .filter(|e| now - e.timestamp <= self.ttl)
                    .cloned()
                    .collect()
            })
            .unwrap_or_default()
    }

    /// How many users currently hold a window. Stale windows disappear from
    /// this count on the next `record` call from any user.
    pub async fn tracked_users(&self) -> usize {
        self.windows.read().await.len()
    }
}

impl Default for EphemeralMemory {
    fn default() -> Self {
        Self::new(60_000, 500)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::time::Duration as StdDuration;

    fn user(id: &str) -> UserId {
        UserId::new(id)
    }

    #[tokio::test]
    async fn record_and_recall() {
        let mem = EphemeralMemory::default();
        let u = user("alice");

        mem.record(&u, "2+2", "4").await;
        mem.record(&u, "oi", "olá!").await;

        let entries = mem.recent(&u).await;
        assert_eq!(entries.len(), 2);
        // Oldest first
        assert_eq!(entries[0].prompt, "2+2");
        assert_eq!(entries[1].prompt, "oi");
    }

    #[tokio::test]
    async fn unseen_user_has_empty_window() {
        let mem = EphemeralMemory::default();
        assert!(mem.recent(&user("nobody")).await.is_empty());
    }

    #[tokio::test]
    async fn users_are_isolated() {
        let mem = EphemeralMemory::default();
        mem.record(&user("alice"), "a", "1").await;
        mem.record(&user("bob"), "b", "2").await;

        let alice = mem.recent(&user("alice")).await;
        assert_eq!(alice.len(), 1);
        assert_eq!(alice[0].prompt, "a");
    }

    #[tokio::test]
    async fn entries_expire_after_ttl() {
        let mem = EphemeralMemory::new(50, 500);
        let u = user("alice");

        mem.record(&u, "old", "answer").await;
        assert_eq!(mem.recent(&u).await.len(), 1);

        tokio::time::sleep(StdDuration::from_millis(80)).await;
        assert!(mem.recent(&u).await.is_empty());
    }

    #[tokio::test]
    async fn unrelated_records_do_not_extend_a_window() {
        let mem = EphemeralMemory::new(60, 500);
        let u = user("alice");

        mem.record(&u, "old", "answer").await;
        tokio::time::sleep(StdDuration::from_millis(40)).await;
        // Another user's traffic must not keep alice's entry alive.
        mem.record(&user("bob"), "x", "y").await;
        tokio::time::sleep(StdDuration::from_millis(40)).await;

        assert!(mem.recent(&u).await.is_empty());
    }

    #[tokio::test]
    async fn fresh_entries_survive_a_prune() {
        let mem = EphemeralMemory::new(100, 500);
        let u = user("alice");

        mem.record(&u, "first", "1").await;
        tokio::time::sleep(StdDuration::from_millis(60)).await;
        mem.record(&u, "second", "2").await;

        // First is still inside the 100ms window here.
        let entries = mem.recent(&u).await;
        assert_eq!(entries.len(), 2);

        tokio::time::sleep(StdDuration::from_millis(60)).await;
        let entries = mem.recent(&u).await;
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].prompt, "second");
    }

    #[tokio::test]
    async fn stale_windows_are_garbage_collected() {
        let mem = EphemeralMemory::new(30, 500);
        mem.record(&user("alice"), "a", "1").await;
        assert_eq!(mem.tracked_users().await, 1);

        tokio::time::sleep(StdDuration::from_millis(60)).await;
        // Any record call sweeps fully-expired windows.
        mem.record(&user("bob"), "b", "2").await;
        assert_eq!(mem.tracked_users().await, 1);
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn concurrent_appends_lose_nothing() {
        let mem = Arc::new(EphemeralMemory::default());
        let u = user("alice");

        let mut handles = Vec::new();
        for i in 0..10 {
            let mem = Arc::clone(&mem);
            let u = u.clone();
            handles.push(tokio::spawn(async move {
                for j in 0..10 {
                    mem.record(&u, format!("p{i}-{j}"), "r").await;
                }
            }));
        }
        for handle in handles {
            handle.await.unwrap();
        }

        assert_eq!(mem.recent(&u).await.len(), 100);
    }
}
