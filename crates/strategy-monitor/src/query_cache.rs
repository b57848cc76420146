use dashmap::DashMap;
use std::fmt;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use strategy_client::Fetched;
use tokio::sync::Mutex;
use tokio::time::Instant;

/// Identity of a dashboard query
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum QueryKey {
    Regime,
    Signal,
    EquityCurve { years: u32 },
    Metrics { years: u32 },
}

impl fmt::Display for QueryKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            QueryKey::Regime => f.write_str("regime"),
            QueryKey::Signal => f.write_str("signal"),
            QueryKey::EquityCurve { years } => write!(f, "equity:{}", years),
            QueryKey::Metrics { years } => write!(f, "metrics:{}", years),
        }
    }
}

struct CachedValue<V> {
    value: Fetched<V>,
    fetched_at: Instant,
}

type Slot<V> = Arc<Mutex<Option<CachedValue<V>>>>;

/// Per-key cache that coalesces concurrent identical queries.
///
/// A caller that arrives while a fetch for the same key is in flight waits
/// for it and receives its result. Distinct keys never share state.
pub struct QueryCache<V> {
    slots: DashMap<QueryKey, Slot<V>>,
}

impl<V: Clone> QueryCache<V> {
    pub fn new() -> Self {
        Self {
            slots: DashMap::new(),
        }
    }

    /// Return a result no older than `stale_after`, or one produced after this
    /// call started; otherwise run `fetch`.
    pub async fn get_or_fetch<F, Fut>(&self, key: &QueryKey, stale_after: Duration, fetch: F) -> Fetched<V>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Fetched<V>>,
    {
        let requested_at = Instant::now();
        let slot = self.slots.entry(key.clone()).or_default().clone();
        let mut cached = slot.lock().await;

        if let Some(entry) = cached.as_ref() {
            if entry.fetched_at > requested_at || entry.fetched_at.elapsed() < stale_after {
                tracing::debug!(query = %key, "Query served from cache");
                return entry.value.clone();
            }
        }

        let value = fetch().await;
        *cached = Some(CachedValue {
            value: value.clone(),
            fetched_at: Instant::now(),
        });
        value
    }
}

impl<V: Clone> Default for QueryCache<V> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[tokio::test]
    async fn test_concurrent_identical_queries_coalesce() {
        let cache = QueryCache::<u32>::new();
        let calls = AtomicUsize::new(0);

        let query = || {
            cache.get_or_fetch(&QueryKey::Regime, Duration::ZERO, || async {
                calls.fetch_add(1, Ordering::SeqCst);
                tokio::time::sleep(Duration::from_millis(50)).await;
                Fetched::Live(7)
            })
        };

        let (a, b, c) = tokio::join!(query(), query(), query());

        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert_eq!((a.into_inner(), b.into_inner(), c.into_inner()), (7, 7, 7));
    }

    #[tokio::test]
    async fn test_sequential_polls_refetch_when_stale() {
        let cache = QueryCache::<u32>::new();
        let key = QueryKey::Signal;

        let first = cache.get_or_fetch(&key, Duration::ZERO, || async { Fetched::Live(1) }).await;
        let second = cache.get_or_fetch(&key, Duration::ZERO, || async { Fetched::Live(2) }).await;

        assert_eq!(first.into_inner(), 1);
        assert_eq!(second.into_inner(), 2);
    }

    #[tokio::test]
    async fn test_fresh_value_reused() {
        let cache = QueryCache::<u32>::new();
        let key = QueryKey::Metrics { years: 10 };

        cache.get_or_fetch(&key, Duration::from_secs(60), || async { Fetched::Live(1) }).await;
        let again = cache.get_or_fetch(&key, Duration::from_secs(60), || async { Fetched::Live(2) }).await;
        assert_eq!(again.into_inner(), 1);
    }

    #[tokio::test]
    async fn test_distinct_keys_do_not_share() {
        let cache = QueryCache::<u32>::new();
        let ten = QueryKey::EquityCurve { years: 10 };
        let five = QueryKey::EquityCurve { years: 5 };

        cache.get_or_fetch(&ten, Duration::from_secs(60), || async { Fetched::Live(10) }).await;
        let other = cache.get_or_fetch(&five, Duration::from_secs(60), || async { Fetched::Live(5) }).await;

        let first = cache.get_or_fetch(&ten, Duration::from_secs(60), || async { Fetched::Live(0) }).await;

        assert_eq!(other.into_inner(), 5);
        assert_eq!(first.into_inner(), 10);
        assert_eq!(ten.to_string(), "equity:10");
    }
}
