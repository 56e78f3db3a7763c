//! Property-Based Tests for Cache Module
//!
//! Uses proptest to check the cache's replace, statistics and concurrency
//! guarantees, plus the error-to-response mapping the query API relies on.

use proptest::prelude::*;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use crate::cache::OrderCache;
use crate::models::order::fixtures::sample_order;
use crate::models::Order;

// == Test Configuration ==
const TEST_TTL: Duration = Duration::from_secs(300);

// == Strategies ==
/// Generates order identifiers from a small pool so operations collide
fn order_uid_strategy() -> impl Strategy<Value = String> {
    (0u8..8).prop_map(|n| format!("order_{}", n))
}

/// Generates version tags stamped into every field of a written order
fn version_strategy() -> impl Strategy<Value = String> {
    "[a-z0-9]{1,12}".prop_map(|s| s)
}

#[derive(Debug, Clone)]
enum CacheOp {
    Set { order_uid: String, version: String },
    Get { order_uid: String },
}

fn cache_op_strategy() -> impl Strategy<Value = CacheOp> {
    prop_oneof![
        (order_uid_strategy(), version_strategy())
            .prop_map(|(order_uid, version)| CacheOp::Set { order_uid, version }),
        order_uid_strategy().prop_map(|order_uid| CacheOp::Get { order_uid }),
    ]
}

/// Builds an order whose text fields all carry the same version tag.
fn versioned_order(order_uid: &str, version: &str) -> Order {
    let mut order = sample_order(order_uid);
    order.locale = version.to_string();
    order.customer_id = version.to_string();
    order.delivery.name = version.to_string();
    order.payment.transaction = version.to_string();
    for item in &mut order.items {
        item.name = version.to_string();
        item.rid = version.to_string();
    }
    order
}

/// Returns true when every versioned field agrees, i.e. the order was not torn.
fn is_consistent(order: &Order) -> bool {
    let version = &order.locale;
    order.customer_id == *version
        && order.delivery.name == *version
        && order.payment.transaction == *version
        && order
            .items
            .iter()
            .all(|item| item.name == *version && item.rid == *version)
}

fn runtime() -> tokio::runtime::Runtime {
    tokio::runtime::Builder::new_multi_thread()
        .worker_threads(4)
        .enable_all()
        .build()
        .unwrap()
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(100))]

    // Last writer wins: after any sequence of sets, each identifier maps to
    // the most recently written order and there is one entry per identifier.
    #[test]
    fn prop_last_writer_wins(ops in prop::collection::vec(cache_op_strategy(), 1..60)) {
        let rt = tokio::runtime::Builder::new_current_thread().enable_all().build().unwrap();

        rt.block_on(async {
            let cache = OrderCache::new(TEST_TTL);
            let mut model: HashMap<String, String> = HashMap::new();

            for op in ops {
                match op {
                    CacheOp::Set { order_uid, version } => {
                        cache.set(versioned_order(&order_uid, &version)).await;
                        model.insert(order_uid, version);
                    }
                    CacheOp::Get { order_uid } => {
                        let found = cache.get(&order_uid).await.map(|o| o.locale.clone());
                        prop_assert_eq!(found.as_ref(), model.get(&order_uid));
                    }
                }
            }

            prop_assert_eq!(cache.len().await, model.len());
            Ok(())
        })?;
    }

    // Statistics accuracy: hits and misses match the lookups performed.
    #[test]
    fn prop_statistics_accuracy(ops in prop::collection::vec(cache_op_strategy(), 1..50)) {
        let rt = tokio::runtime::Builder::new_current_thread().enable_all().build().unwrap();

        rt.block_on(async {
            let cache = OrderCache::new(TEST_TTL);
            let mut expected_hits: u64 = 0;
            let mut expected_misses: u64 = 0;

            for op in ops {
                match op {
                    CacheOp::Set { order_uid, version } => {
                        cache.set(versioned_order(&order_uid, &version)).await;
                    }
                    CacheOp::Get { order_uid } => match cache.get(&order_uid).await {
                        Some(_) => expected_hits += 1,
                        None => expected_misses += 1,
                    },
                }
            }

            let stats = cache.stats().await;
            prop_assert_eq!(stats.hits, expected_hits, "Hits mismatch");
            prop_assert_eq!(stats.misses, expected_misses, "Misses mismatch");
            prop_assert_eq!(stats.total_entries, cache.len().await, "Total entries mismatch");
            Ok(())
        })?;
    }
}

// == Property Test for Concurrent Operation Correctness ==
proptest! {
    #![proptest_config(ProptestConfig::with_cases(25))]

    // Under concurrent sets and gets on overlapping identifiers, every read
    // returns a complete order: all versioned fields come from one write.
    #[test]
    fn prop_concurrent_reads_never_torn(
        operations in prop::collection::vec(cache_op_strategy(), 20..120)
    ) {
        let rt = runtime();

        rt.block_on(async {
            let cache = OrderCache::new(TEST_TTL);
            let mut handles = vec![];

            for op in operations {
                let cache = cache.clone();
                handles.push(tokio::spawn(async move {
                    match op {
                        CacheOp::Set { order_uid, version } => {
                            cache.set(versioned_order(&order_uid, &version)).await;
                            Ok::<_, String>(())
                        }
                        CacheOp::Get { order_uid } => match cache.get(&order_uid).await {
                            Some(order) if !is_consistent(&order) => {
                                Err(format!("Torn read for '{}': {:?}", order_uid, order))
                            }
                            Some(order) if order.order_uid != order_uid => {
                                Err(format!("Read '{}' returned '{}'", order_uid, order.order_uid))
                            }
                            _ => Ok(()),
                        },
                    }
                }));
            }

            for handle in handles {
                let result = handle.await.expect("Task should not panic");
                prop_assert!(result.is_ok(), "Concurrent operation failed: {:?}", result);
            }

            let stats = cache.stats().await;
            let hit_rate = stats.hit_rate();
            prop_assert!((0.0..=1.0).contains(&hit_rate), "Hit rate out of range: {}", hit_rate);
            Ok(())
        })?;
    }
}

// == Property Test for Error Response Format ==
proptest! {
    #![proptest_config(ProptestConfig::with_cases(50))]

    // Every error maps to a JSON body with a string "error" field, and
    // infrastructure failures never echo their internal detail to clients.
    #[test]
    fn prop_error_response_format(detail in "[a-zA-Z0-9_-]{8,60}") {
        use crate::error::{OrderError, StoreError};
        use axum::body::to_bytes;
        use axum::response::IntoResponse;

        let variants = vec![
            (OrderError::NotFound(detail.clone()), false),
            (OrderError::store("fetch order", StoreError::Unavailable(detail.clone())), true),
            (OrderError::store("fetch order", StoreError::Timeout(Duration::from_secs(5))), true),
            (OrderError::Schema(detail.clone()), true),
        ];

        let rt = tokio::runtime::Builder::new_current_thread().enable_all().build().unwrap();

        for (error, internal) in variants {
            let response = error.into_response();

            let content_type = response
                .headers()
                .get("content-type")
                .and_then(|v| v.to_str().ok());
            prop_assert!(
                content_type.map(|ct| ct.contains("application/json")).unwrap_or(false),
                "Response should have JSON content-type"
            );

            let bytes = rt.block_on(async { to_bytes(response.into_body(), usize::MAX).await.unwrap() });
            let json: serde_json::Value = serde_json::from_slice(&bytes)
                .expect("Response body should be valid JSON");

            let message = json.get("error").and_then(|v| v.as_str());
            prop_assert!(message.is_some(), "JSON response should contain string 'error' field");
            if internal {
                prop_assert!(!message.unwrap().contains(&detail), "Internal detail leaked");
            }
        }
    }
}

// == Additional Unit Tests for Edge Cases ==
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_versioned_order_is_consistent() {
        assert!(is_consistent(&versioned_order("a", "v1")));

        let mut torn = versioned_order("a", "v1");
        torn.payment.transaction = "v2".to_string();
        assert!(!is_consistent(&torn));
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_many_writers_one_identifier() {
        let cache = OrderCache::new(TEST_TTL);
        let order_uid = "hot";

        let writers: Vec<_> = (0..16)
            .map(|n| {
                let cache = cache.clone();
                tokio::spawn(async move {
                    for round in 0..50 {
                        let order = Arc::new(versioned_order(order_uid, &format!("w{}r{}", n, round)));
                        cache.set(order).await;
                    }
                })
            })
            .collect();

        let readers: Vec<_> = (0..16)
            .map(|_| {
                let cache = cache.clone();
                tokio::spawn(async move {
                    for _ in 0..50 {
                        if let Some(order) = cache.get(order_uid).await {
                            assert!(is_consistent(&order), "Torn read: {:?}", order);
                        }
                        tokio::task::yield_now().await;
                    }
                })
            })
            .collect();

        for handle in writers.into_iter().chain(readers) {
            handle.await.unwrap();
        }

        assert_eq!(cache.len().await, 1);
    }
}
