//! Shared fixtures for integration tests.

#![allow(dead_code)]

use std::sync::Arc;
use std::time::Duration;

use order_cache::models::Order;
use order_cache::store::MemoryStore;
use order_cache::{OrderCache, OrderService};

/// Canonical valid order payload.
pub const SAMPLE_ORDER_JSON: &str = r#"{
    "order_uid": "b563feb7b2b84b6test",
    "track_number": "WBILMTESTTRACK",
    "entry": "WBIL",
    "delivery": {
        "name": "Test Testov",
        "phone": "+9720000000",
        "zip": "2639809",
        "city": "Kiryat Mozkin",
        "address": "Ploshad Mira 15",
        "region": "Kraiot",
        "email": "test@gmail.com"
    },
    "payment": {
        "transaction": "b563feb7b2b84b6test",
        "request_id": "",
        "currency": "USD",
        "provider": "wbpay",
        "amount": 1817,
        "payment_dt": 1637907727,
        "bank": "alpha",
        "delivery_cost": 1500,
        "goods_total": 317,
        "custom_fee": 0
    },
    "items": [
        {
            "chrt_id": 9934930,
            "track_number": "WBILMTESTTRACK",
            "price": 453,
            "rid": "ab4219087a764ae0btest",
            "name": "Mascaras",
            "sale": 30,
            "size": "0",
            "total_price": 317,
            "nm_id": 2389212,
            "brand": "Vivienne Sabo",
            "status": 202
        }
    ],
    "locale": "en",
    "internal_signature": "",
    "customer_id": "test",
    "delivery_service": "meest",
    "shardkey": "9",
    "sm_id": 99,
    "date_created": "2021-11-26T06:22:19Z",
    "oof_shard": "1"
}"#;

/// Returns the sample order re-keyed to `order_uid`.
pub fn sample_order(order_uid: &str) -> Order {
    let mut order: Order = serde_json::from_str(SAMPLE_ORDER_JSON).unwrap();
    order.order_uid = order_uid.to_string();
    order
}

/// Returns the sample payload re-keyed to `order_uid`.
pub fn sample_payload(order_uid: &str) -> Vec<u8> {
    serde_json::to_vec(&sample_order(order_uid)).unwrap()
}

/// Builds a service over a fresh in-memory store with a 24h TTL.
pub fn memory_service() -> (Arc<MemoryStore>, OrderService) {
    let store = Arc::new(MemoryStore::new());
    let service = OrderService::new(
        store.clone(),
        OrderCache::new(Duration::from_secs(24 * 60 * 60)),
        Duration::from_secs(5),
    );
    (store, service)
}
