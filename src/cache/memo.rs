//! Argument-keyed memoization over [`LruCache`]
//!
//! Two flavors: [`Memo`] for synchronous computations and [`SharedMemo`]
//! for asynchronous ones. The async flavor caches the shared future itself,
//! so concurrent calls with the same key await one in-flight computation
//! instead of racing duplicate work (and duplicate network fetches).

use std::sync::Mutex;

use futures::FutureExt;
use futures::future::{BoxFuture, Shared};
use serde::Serialize;

use super::LruCache;

/// Default number of remembered argument tuples.
pub const DEFAULT_CACHE_SIZE: usize = 10;

/// A cached in-flight or finished asynchronous computation.
pub type SharedComputation<R> = Shared<BoxFuture<'static, R>>;

fn cache_key<A: Serialize>(args: &A) -> String {
    serde_json::to_string(args).unwrap_or_else(|err| {
        log::debug!("memo key serialization failed: {err}");
        String::from("<unserializable>")
    })
}

/// Memoized synchronous computation.
pub struct Memo<A, R> {
    func: Box<dyn Fn(&A) -> R + Send + Sync>,
    cache: Mutex<LruCache<R>>,
}

impl<A: Serialize, R: Clone> Memo<A, R> {
    /// Wrap `func` with the default cache capacity.
    pub fn new(func: impl Fn(&A) -> R + Send + Sync + 'static) -> Self {
        Self::with_capacity(func, DEFAULT_CACHE_SIZE)
    }

    /// Wrap `func`, remembering at most `max_size` argument tuples.
    pub fn with_capacity(func: impl Fn(&A) -> R + Send + Sync + 'static, max_size: usize) -> Self {
        Self {
            func: Box::new(func),
            cache: Mutex::new(LruCache::new(max_size)),
        }
    }

    /// Invoke the wrapped function, returning a cached clone when these
    /// arguments have been seen before.
    pub fn call(&self, args: &A) -> R {
        let key = cache_key(args);
        if let Ok(mut cache) = self.cache.lock() {
            if let Some(hit) = cache.get(&key) {
                return hit.clone();
            }
            let value = (self.func)(args);
            cache.insert(key, value.clone());
            return value;
        }
        // Poisoned lock: recompute without caching
        (self.func)(args)
    }

    /// Drop every remembered result; subsequent calls recompute.
    pub fn clear_cache(&self) {
        if let Ok(mut cache) = self.cache.lock() {
            cache.clear();
        }
    }
}

/// Memoized asynchronous computation with in-flight sharing.
pub struct SharedMemo<A, R: Clone> {
    factory: Box<dyn Fn(&A) -> BoxFuture<'static, R> + Send + Sync>,
    cache: Mutex<LruCache<SharedComputation<R>>>,
}

impl<A: Serialize, R: Clone + 'static> SharedMemo<A, R> {
    /// Wrap an async factory with the default cache capacity.
    pub fn new(factory: impl Fn(&A) -> BoxFuture<'static, R> + Send + Sync + 'static) -> Self {
        Self::with_capacity(factory, DEFAULT_CACHE_SIZE)
    }

    /// Wrap an async factory, remembering at most `max_size` argument tuples.
    pub fn with_capacity(
        factory: impl Fn(&A) -> BoxFuture<'static, R> + Send + Sync + 'static,
        max_size: usize,
    ) -> Self {
        Self {
            factory: Box::new(factory),
            cache: Mutex::new(LruCache::new(max_size)),
        }
    }

    /// Return the shared computation for these arguments, starting it if no
    /// call with the same key is cached or in flight.
    pub fn call(&self, args: &A) -> SharedComputation<R> {
        let key = cache_key(args);
        if let Ok(mut cache) = self.cache.lock() {
            if let Some(hit) = cache.get(&key) {
                return hit.clone();
            }
            let computation = (self.factory)(args).shared();
            cache.insert(key, computation.clone());
            return computation;
        }
        (self.factory)(args).shared()
    }

    /// Drop every remembered computation; subsequent calls recompute.
    pub fn clear_cache(&self) {
        if let Ok(mut cache) = self.cache.lock() {
            cache.clear();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn counted_double() -> (Arc<AtomicUsize>, Memo<i64, i64>) {
        let calls = Arc::new(AtomicUsize::new(0));
        let seen = Arc::clone(&calls);
        let memo = Memo::new(move |x: &i64| {
            seen.fetch_add(1, Ordering::SeqCst);
            x * 2
        });
        (calls, memo)
    }

    #[test]
    fn test_memoizes_results() {
        let (calls, memo) = counted_double();
        assert_eq!(memo.call(&2), 4);
        assert_eq!(memo.call(&2), 4);
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_clear_cache_forces_recompute() {
        let (calls, memo) = counted_double();
        memo.call(&2);
        memo.call(&2);
        assert_eq!(calls.load(Ordering::SeqCst), 1);

        memo.clear_cache();
        memo.call(&2);
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn test_respects_max_size() {
        let calls = Arc::new(AtomicUsize::new(0));
        let seen = Arc::clone(&calls);
        let memo = Memo::with_capacity(
            move |x: &i64| {
                seen.fetch_add(1, Ordering::SeqCst);
                x * 2
            },
            2,
        );

        memo.call(&1);
        memo.call(&2);
        memo.call(&3); // evicts key 1

        assert_eq!(memo.call(&2), 4); // cached
        assert_eq!(memo.call(&3), 6); // cached
        assert_eq!(memo.call(&1), 2); // recomputed
        assert_eq!(calls.load(Ordering::SeqCst), 4);
    }

    #[test]
    fn test_reaccess_updates_eviction_order() {
        let calls = Arc::new(AtomicUsize::new(0));
        let seen = Arc::clone(&calls);
        let memo = Memo::with_capacity(
            move |x: &i64| {
                seen.fetch_add(1, Ordering::SeqCst);
                x * 2
            },
            2,
        );

        memo.call(&1);
        memo.call(&2);
        memo.call(&1); // promote 1; 2 is now least recently used
        memo.call(&3); // evicts key 2

        assert_eq!(memo.call(&1), 2); // cached
        assert_eq!(memo.call(&3), 6); // cached
        assert_eq!(memo.call(&2), 4); // recomputed
        assert_eq!(calls.load(Ordering::SeqCst), 4);
    }

    #[test]
    fn test_key_is_value_based() {
        let (calls, memo) = counted_double();
        let a = 5;
        let b = 5;
        memo.call(&a);
        memo.call(&b);
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_shared_memo_runs_once() {
        let calls = Arc::new(AtomicUsize::new(0));
        let seen = Arc::clone(&calls);
        let memo = SharedMemo::new(move |x: &u32| {
            let seen = Arc::clone(&seen);
            let x = *x;
            async move {
                seen.fetch_add(1, Ordering::SeqCst);
                x + 1
            }
            .boxed()
        });

        assert_eq!(memo.call(&1).await, 2);
        assert_eq!(memo.call(&1).await, 2);
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_shared_memo_concurrent_calls_share_one_flight() {
        let calls = Arc::new(AtomicUsize::new(0));
        let seen = Arc::clone(&calls);
        let memo = SharedMemo::new(move |x: &u32| {
            let seen = Arc::clone(&seen);
            let x = *x;
            async move {
                tokio::time::sleep(std::time::Duration::from_millis(10)).await;
                seen.fetch_add(1, Ordering::SeqCst);
                x + 1
            }
            .boxed()
        });

        // Both computations are requested before either resolves.
        let first = memo.call(&7);
        let second = memo.call(&7);
        let (a, b) = tokio::join!(first, second);

        assert_eq!((a, b), (8, 8));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_shared_memo_clear_cache() {
        let calls = Arc::new(AtomicUsize::new(0));
        let seen = Arc::clone(&calls);
        let memo = SharedMemo::new(move |x: &u32| {
            let seen = Arc::clone(&seen);
            let x = *x;
            async move {
                seen.fetch_add(1, Ordering::SeqCst);
                x
            }
            .boxed()
        });

        memo.call(&1).await;
        memo.clear_cache();
        memo.call(&1).await;
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }
}
