use std::future::Future;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;
use tokio::sync::Mutex;

/// Freshness window shared by every dashboard resource.
pub const DEFAULT_TTL: Duration = Duration::from_secs(30);

/// Millisecond wall clock, swappable so tests can step time by hand.
pub trait Clock: Send + Sync {
    fn now_millis(&self) -> u64;
}

pub struct SystemClock;

impl Clock for SystemClock {
    fn now_millis(&self) -> u64 {
        u64::try_from(chrono::Utc::now().timestamp_millis()).unwrap_or(0)
    }
}

/// Clock that only moves when told to.
#[derive(Default)]
pub struct ManualClock {
    now: AtomicU64,
}

impl ManualClock {
    pub fn new(start_millis: u64) -> Self {
        Self {
            now: AtomicU64::new(start_millis),
        }
    }

    pub fn advance(&self, by: Duration) {
        self.now.fetch_add(by.as_millis() as u64, Ordering::SeqCst);
    }
}

impl Clock for ManualClock {
    fn now_millis(&self) -> u64 {
        self.now.load(Ordering::SeqCst)
    }
}

#[derive(Debug, Clone)]
pub struct CacheEntry<T> {
    pub data: T,
    pub timestamp: u64,
}

impl<T> CacheEntry<T> {
    fn is_fresh(&self, now: u64, ttl: Duration) -> bool {
        now.saturating_sub(self.timestamp) < ttl.as_millis() as u64
    }
}

/// Single-slot cache invalidated purely by age.
///
/// The slot lock is held for the whole check-refresh-store sequence, so
/// concurrent misses for the same resource wait for the first refresh and
/// then read its result instead of refreshing again.
pub struct TtlCache<T> {
    ttl: Duration,
    clock: Arc<dyn Clock>,
    slot: Mutex<Option<CacheEntry<T>>>,
}

impl<T: Clone> TtlCache<T> {
    pub fn new(ttl: Duration, clock: Arc<dyn Clock>) -> Self {
        Self {
            ttl,
            clock,
            slot: Mutex::new(None),
        }
    }

    /// Returns the cached value while fresh, otherwise runs `refresh`.
    ///
    /// A `None` from `refresh` keeps whatever entry was there before and is
    /// passed straight back; the stale entry is not served, so the next call
    /// refreshes again.
    pub async fn get_or_refresh<F, Fut>(&self, refresh: F) -> Option<T>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Option<T>>,
    {
        let mut slot = self.slot.lock().await;
        if let Some(entry) = slot.as_ref()
            && entry.is_fresh(self.clock.now_millis(), self.ttl)
        {
            return Some(entry.data.clone());
        }

        let data = refresh().await?;
        *slot = Some(CacheEntry {
            data: data.clone(),
            timestamp: self.clock.now_millis(),
        });
        Some(data)
    }

    /// Current entry regardless of age.
    #[cfg(test)]
    pub(crate) async fn peek(&self) -> Option<CacheEntry<T>> {
        self.slot.lock().await.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::AtomicUsize;

    fn cache(clock: &Arc<ManualClock>) -> TtlCache<String> {
        TtlCache::new(DEFAULT_TTL, clock.clone())
    }

    #[tokio::test]
    async fn serves_fresh_entry_without_refreshing() {
        let clock = Arc::new(ManualClock::new(1_000));
        let cache = cache(&clock);
        let calls = AtomicUsize::new(0);

        for _ in 0..3 {
            let value = cache
                .get_or_refresh(|| async {
                    calls.fetch_add(1, Ordering::SeqCst);
                    Some("v1".to_string())
                })
                .await;
            assert_eq!(value.as_deref(), Some("v1"));
            clock.advance(Duration::from_secs(9));
        }
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn refreshes_once_ttl_elapses() {
        let clock = Arc::new(ManualClock::new(0));
        let cache = cache(&clock);

        cache.get_or_refresh(|| async { Some("old".to_string()) }).await;
        clock.advance(Duration::from_millis(29_999));
        let still = cache.get_or_refresh(|| async { Some("new".to_string()) }).await;
        assert_eq!(still.as_deref(), Some("old"));

        clock.advance(Duration::from_millis(1));
        let renewed = cache.get_or_refresh(|| async { Some("new".to_string()) }).await;
        assert_eq!(renewed.as_deref(), Some("new"));
        assert_eq!(cache.peek().await.unwrap().timestamp, 30_000);
    }

    #[tokio::test]
    async fn failed_refresh_keeps_prior_entry_but_does_not_serve_it() {
        let clock = Arc::new(ManualClock::new(0));
        let cache = cache(&clock);

        cache.get_or_refresh(|| async { Some("good".to_string()) }).await;
        clock.advance(Duration::from_secs(31));

        let failed = cache.get_or_refresh(|| async { None }).await;
        assert_eq!(failed, None);

        let kept = cache.peek().await.unwrap();
        assert_eq!(kept.data, "good");
        assert_eq!(kept.timestamp, 0);

        let retried = cache.get_or_refresh(|| async { Some("better".to_string()) }).await;
        assert_eq!(retried.as_deref(), Some("better"));
    }

    #[tokio::test]
    async fn failure_on_empty_slot_stores_nothing() {
        let clock = Arc::new(ManualClock::new(0));
        let cache = cache(&clock);
        assert_eq!(cache.get_or_refresh(|| async { None }).await, None);
        assert!(cache.peek().await.is_none());
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn concurrent_misses_share_one_refresh() {
        let clock = Arc::new(ManualClock::new(0));
        let cache = Arc::new(cache(&clock));
        let calls = Arc::new(AtomicUsize::new(0));

        let mut handles = Vec::new();
        for _ in 0..8 {
            let cache = cache.clone();
            let calls = calls.clone();
            handles.push(tokio::spawn(async move {
                cache
                    .get_or_refresh(|| async move {
                        calls.fetch_add(1, Ordering::SeqCst);
                        tokio::time::sleep(Duration::from_millis(50)).await;
                        Some("shared".to_string())
                    })
                    .await
            }));
        }
        for handle in handles {
            assert_eq!(handle.await.unwrap().as_deref(), Some("shared"));
        }
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }
}
