//! Property-Based Tests for Cache Module
//!
//! Uses proptest to check the read-through cache against a simple model.

use proptest::prelude::*;
use serde_json::{json, Value};
use std::collections::HashMap;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use crate::cache::{CacheBackend, MemoryBackend, ReadThroughCache};
use crate::clock::{Clock, ManualClock};

// == Test Configuration ==
const START_MS: u64 = 1_600_000_000_000;
const DEFAULT_TTL: Duration = Duration::from_secs(15);

fn block_on<F: Future>(future: F) -> F::Output {
    tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .unwrap()
        .block_on(future)
}

fn cache_with(backend: Arc<dyn CacheBackend>) -> (ReadThroughCache, ManualClock) {
    let clock = ManualClock::new(START_MS);
    let cache = ReadThroughCache::with_clock(backend, Arc::new(clock.clone()), DEFAULT_TTL);
    (cache, clock)
}

// == Strategies ==
/// Generates endpoint-like keys
fn key_strategy() -> impl Strategy<Value = String> {
    "[a-z]{1,8}(/[0-9]{1,6}){0,2}"
}

/// Generates small JSON payloads
fn value_strategy() -> impl Strategy<Value = Value> {
    prop_oneof![
        any::<i64>().prop_map(Value::from),
        "[a-zA-Z0-9 ]{0,32}".prop_map(Value::from),
        (any::<u32>(), "[a-z]{1,10}").prop_map(|(id, name)| json!({"id": id, "name": name})),
    ]
}

#[derive(Debug, Clone)]
enum CacheOp {
    Put { key: String, value: Value, ttl_ms: u64 },
    Get { key: String },
    Remove { key: String },
    Advance { ms: u64 },
}

fn cache_op_strategy() -> impl Strategy<Value = CacheOp> {
    // Small key space so operations collide
    let key = prop_oneof![Just("a".to_string()), Just("b".to_string()), Just("c/1".to_string())];
    prop_oneof![
        (key.clone(), value_strategy(), 1u64..5_000)
            .prop_map(|(key, value, ttl_ms)| CacheOp::Put { key, value, ttl_ms }),
        key.clone().prop_map(|key| CacheOp::Get { key }),
        key.prop_map(|key| CacheOp::Remove { key }),
        (0u64..3_000).prop_map(|ms| CacheOp::Advance { ms }),
    ]
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(100))]

    // A value read back before its TTL elapses is the value written; at or
    // after the TTL it is a miss.
    #[test]
    fn prop_freshness_window(
        key in key_strategy(),
        value in value_strategy(),
        ttl_ms in 1u64..1_000_000,
        before in 0u64..1_000_000,
        after in 0u64..1_000_000,
    ) {
        let before = before % ttl_ms;
        let (cache, clock) = cache_with(Arc::new(MemoryBackend::new()));

        block_on(async {
            cache.put(&key, value.clone(), Some(Duration::from_millis(ttl_ms))).await;

            clock.advance(Duration::from_millis(before));
            prop_assert_eq!(cache.get(&key).await, Some(value));

            clock.set(START_MS + ttl_ms + after);
            prop_assert_eq!(cache.get(&key).await, None);
            Ok(())
        })?;
    }

    // Writing one key never makes a different key readable.
    #[test]
    fn prop_key_isolation(k1 in key_strategy(), k2 in key_strategy(), value in value_strategy()) {
        prop_assume!(k1 != k2);
        let (cache, _clock) = cache_with(Arc::new(MemoryBackend::new()));

        block_on(async {
            cache.put(&k1, value, None).await;
            prop_assert_eq!(cache.get(&k2).await, None);
            Ok(())
        })?;
    }

    // The last write to a key wins.
    #[test]
    fn prop_overwrite_semantics(key in key_strategy(), v1 in value_strategy(), v2 in value_strategy()) {
        let (cache, _clock) = cache_with(Arc::new(MemoryBackend::new()));

        block_on(async {
            cache.put(&key, v1, None).await;
            cache.put(&key, v2.clone(), None).await;
            prop_assert_eq!(cache.get(&key).await, Some(v2));
            Ok(())
        })?;
    }

    // Any interleaving of puts, gets, removes and clock moves agrees with a
    // map of (value, expires_at), and the hit/miss counters match.
    #[test]
    fn prop_matches_model(ops in prop::collection::vec(cache_op_strategy(), 1..60)) {
        let (cache, clock) = cache_with(Arc::new(MemoryBackend::new()));
        let mut model: HashMap<String, (Value, u64)> = HashMap::new();
        let mut hits = 0u64;
        let mut misses = 0u64;

        block_on(async {
            for op in ops {
                match op {
                    CacheOp::Put { key, value, ttl_ms } => {
                        cache.put(&key, value.clone(), Some(Duration::from_millis(ttl_ms))).await;
                        model.insert(key, (value, clock.now_ms() + ttl_ms));
                    }
                    CacheOp::Get { key } => {
                        let now = clock.now_ms();
                        let expected = match model.get(&key) {
                            Some((value, expires_at)) if now < *expires_at => Some(value.clone()),
                            _ => {
                                model.remove(&key);
                                None
                            }
                        };
                        if expected.is_some() { hits += 1 } else { misses += 1 }
                        prop_assert_eq!(cache.get(&key).await, expected);
                    }
                    CacheOp::Remove { key } => {
                        cache.remove(&key).await;
                        model.remove(&key);
                    }
                    CacheOp::Advance { ms } => clock.advance(Duration::from_millis(ms)),
                }
            }
            Ok(())
        })?;

        let stats = cache.stats();
        prop_assert_eq!(stats.hits, hits);
        prop_assert_eq!(stats.misses, misses);
    }

    // A bounded memory backend never holds more than its limit.
    #[test]
    fn prop_capacity_enforcement(
        entries in prop::collection::vec((key_strategy(), value_strategy()), 1..200),
        max_entries in 1usize..50,
    ) {
        let backend = Arc::new(MemoryBackend::with_capacity_limit(Some(max_entries)));
        let (cache, _clock) = cache_with(backend.clone());

        block_on(async {
            for (key, value) in entries {
                cache.put(&key, value, None).await;
                let len = backend.len().await;
                prop_assert!(len <= max_entries, "Cache size {} exceeds max {}", len, max_entries);
            }
            Ok(())
        })?;
    }
}
