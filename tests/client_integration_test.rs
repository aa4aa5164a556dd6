//! Integration tests for the document container client over the in-process
//! transport
//!
//! These cover the full operation surface end to end: point reads and writes,
//! paged enumeration, parameterized queries, throughput management, and the
//! sales-order walkthrough the demo command runs.

use docstore::client::DocumentContainerClient;
use docstore::config::ContainerConfig;
use docstore::domain::{Document, QuerySpec, StoreError};
use docstore::transport::{DocumentTransport, MemoryTransport};
use serde_json::json;
use std::sync::Arc;
use test_case::test_case;

async fn client() -> DocumentContainerClient {
    client_with(MemoryTransport::new()).await
}

async fn client_with(transport: MemoryTransport) -> DocumentContainerClient {
    DocumentContainerClient::connect(Arc::new(transport), &ContainerConfig::default())
        .await
        .expect("connect should succeed")
}

fn order(id: &str, account: &str, subtotal: f64) -> Document {
    Document::from_value(json!({
        "id": id,
        "partitionKey": account,
        "purchase_order_number": format!("PO{id}"),
        "subtotal": subtotal,
        "items": [{"product_code": "A-123", "order_qty": 1}],
    }))
    .expect("fixture should be a valid document")
}

#[tokio::test]
async fn test_create_then_read_round_trip() {
    let client = client().await;

    client
        .create_document(order("SalesOrder1", "Account1", 100.0))
        .await
        .unwrap();

    let read = client
        .read_document("SalesOrder1", "Account1".into())
        .await
        .unwrap();
    assert_eq!(read.id(), "SalesOrder1");
    assert_eq!(read.field("subtotal"), Some(&json!(100.0)));
    assert_eq!(
        read.field("items"),
        Some(&json!([{"product_code": "A-123", "order_qty": 1}]))
    );
    // Stored documents carry a server-assigned version tag.
    assert!(read.etag().is_some());
}

#[tokio::test]
async fn test_create_duplicate_id_fails() {
    let client = client().await;

    client
        .create_document(order("SalesOrder1", "Account1", 100.0))
        .await
        .unwrap();
    let err = client
        .create_document(order("SalesOrder1", "Account1", 200.0))
        .await
        .unwrap_err();
    assert!(matches!(err, StoreError::AlreadyExists { ref id } if id == "SalesOrder1"));
}

#[tokio::test]
async fn test_large_integer_partition_keys_scope_separately() {
    // Adjacent integers above 2^53 collapse to the same f64; they must still
    // place documents in distinct partition scopes.
    let client = client().await;
    for key in [9_007_199_254_740_992_i64, 9_007_199_254_740_993_i64] {
        let doc = Document::from_value(json!({
            "id": "SalesOrder1",
            "partitionKey": key,
            "subtotal": 100.0,
        }))
        .unwrap();
        client.create_document(doc).await.unwrap();
    }

    let read = client
        .read_document("SalesOrder1", 9_007_199_254_740_993_i64.into())
        .await
        .unwrap();
    assert_eq!(read.field("partitionKey"), Some(&json!(9_007_199_254_740_993_i64)));
}

#[tokio::test]
async fn test_read_scoped_to_partition_key() {
    let client = client().await;

    client
        .create_document(order("SalesOrder1", "Account1", 100.0))
        .await
        .unwrap();

    // Same id under a different partition key is a different document.
    let err = client
        .read_document("SalesOrder1", "Account2".into())
        .await
        .unwrap_err();
    assert!(matches!(err, StoreError::NotFound { .. }));
}

#[tokio::test]
async fn test_delete_then_read_not_found() {
    let client = client().await;

    client
        .create_document(order("SalesOrder1", "Account1", 100.0))
        .await
        .unwrap();
    client
        .delete_document("SalesOrder1", "Account1".into())
        .await
        .unwrap();

    let err = client
        .read_document("SalesOrder1", "Account1".into())
        .await
        .unwrap_err();
    assert!(matches!(err, StoreError::NotFound { ref id } if id == "SalesOrder1"));

    // Deleting again is a NotFound, not a silent success.
    let err = client
        .delete_document("SalesOrder1", "Account1".into())
        .await
        .unwrap_err();
    assert!(matches!(err, StoreError::NotFound { .. }));
}

#[tokio::test]
async fn test_replace_overwrites_whole_document() {
    let client = client().await;

    client
        .create_document(order("SalesOrder1", "Account1", 100.0))
        .await
        .unwrap();

    let mut updated = client
        .read_document("SalesOrder1", "Account1".into())
        .await
        .unwrap();
    updated.set_field("subtotal", json!(101.0));
    updated.remove_field("purchase_order_number");

    let replaced = client
        .replace_document("SalesOrder1", "Account1".into(), updated, None)
        .await
        .unwrap();
    assert_eq!(replaced.field("subtotal"), Some(&json!(101.0)));

    // Full overwrite: the removed field is gone from the stored copy.
    let read = client
        .read_document("SalesOrder1", "Account1".into())
        .await
        .unwrap();
    assert_eq!(read.field("purchase_order_number"), None);
}

#[tokio::test]
async fn test_replace_missing_does_not_insert() {
    let client = client().await;

    let err = client
        .replace_document(
            "SalesOrder1",
            "Account1".into(),
            order("SalesOrder1", "Account1", 100.0),
            None,
        )
        .await
        .unwrap_err();
    assert!(matches!(err, StoreError::NotFound { .. }));

    let all = client
        .read_all_documents(10)
        .await
        .unwrap()
        .try_collect()
        .await
        .unwrap();
    assert!(all.is_empty());
}

#[tokio::test]
async fn test_guarded_replace_detects_lost_race() {
    let client = client().await;

    client
        .create_document(order("SalesOrder1", "Account1", 100.0))
        .await
        .unwrap();
    let first_read = client
        .read_document("SalesOrder1", "Account1".into())
        .await
        .unwrap();
    let stale_version = first_read.etag().unwrap().to_string();

    // A concurrent writer wins the race.
    client
        .replace_document(
            "SalesOrder1",
            "Account1".into(),
            order("SalesOrder1", "Account1", 150.0),
            None,
        )
        .await
        .unwrap();

    let err = client
        .replace_document(
            "SalesOrder1",
            "Account1".into(),
            order("SalesOrder1", "Account1", 101.0),
            Some(&stale_version),
        )
        .await
        .unwrap_err();
    assert!(matches!(err, StoreError::VersionConflict { ref id } if id == "SalesOrder1"));

    // The racing writer's state survives.
    let read = client
        .read_document("SalesOrder1", "Account1".into())
        .await
        .unwrap();
    assert_eq!(read.field("subtotal"), Some(&json!(150.0)));
}

#[tokio::test]
async fn test_upsert_creates_then_replaces() {
    let client = client().await;

    let created = client
        .upsert_document(order("SalesOrder1", "Account1", 100.0))
        .await
        .unwrap();
    assert_eq!(created.field("subtotal"), Some(&json!(100.0)));

    let replaced = client
        .upsert_document(order("SalesOrder1", "Account1", 101.0))
        .await
        .unwrap();
    assert_eq!(replaced.field("subtotal"), Some(&json!(101.0)));

    let all = client
        .read_all_documents(10)
        .await
        .unwrap()
        .try_collect()
        .await
        .unwrap();
    assert_eq!(all.len(), 1);
}

#[tokio::test]
async fn test_upsert_is_idempotent() {
    let client = client().await;

    client
        .upsert_document(order("SalesOrder1", "Account1", 100.0))
        .await
        .unwrap();
    client
        .upsert_document(order("SalesOrder1", "Account1", 100.0))
        .await
        .unwrap();

    let read = client
        .read_document("SalesOrder1", "Account1".into())
        .await
        .unwrap();
    assert_eq!(read.field("subtotal"), Some(&json!(100.0)));
}

// Page boundaries must be invisible: one short of a page, exactly a page,
// and one past a page all enumerate every document exactly once.
#[test_case(1; "single document")]
#[test_case(3; "exactly one page")]
#[test_case(4; "one past a page")]
#[test_case(7; "several pages")]
#[tokio::test]
async fn test_read_all_crosses_page_boundaries(count: usize) {
    let client = client().await;
    for n in 0..count {
        client
            .create_document(order(&format!("SalesOrder{n}"), "Account1", n as f64))
            .await
            .unwrap();
    }

    let mut pages = client.read_all_documents(3).await.unwrap();
    let mut ids = Vec::new();
    while let Some(document) = pages.next().await {
        ids.push(document.unwrap().id().to_string());
    }

    assert_eq!(ids.len(), count);
    ids.sort();
    ids.dedup();
    assert_eq!(ids.len(), count, "each document enumerated exactly once");
}

#[tokio::test]
async fn test_read_all_empty_container() {
    let client = client().await;
    let all = client
        .read_all_documents(5)
        .await
        .unwrap()
        .try_collect()
        .await
        .unwrap();
    assert!(all.is_empty());
}

#[tokio::test]
async fn test_query_filters_by_partition_key() {
    let client = client().await;

    client
        .create_document(order("SalesOrder1", "Account1", 100.0))
        .await
        .unwrap();
    client
        .create_document(order("SalesOrder2", "Account2", 200.0))
        .await
        .unwrap();

    let query = QuerySpec::new("SELECT * FROM r WHERE r.partitionKey = @account_number")
        .with_parameter("@account_number", "Account1");
    let matches = client
        .query_documents(query)
        .await
        .unwrap()
        .try_collect()
        .await
        .unwrap();

    assert_eq!(matches.len(), 1);
    assert_eq!(matches[0].id(), "SalesOrder1");
}

#[tokio::test]
async fn test_query_with_no_matches_is_empty_not_error() {
    let client = client().await;

    client
        .create_document(order("SalesOrder1", "Account1", 100.0))
        .await
        .unwrap();

    let query = QuerySpec::new("SELECT * FROM r WHERE r.partitionKey = @account_number")
        .with_parameter("@account_number", "Account9");
    let matches = client
        .query_documents(query)
        .await
        .unwrap()
        .try_collect()
        .await
        .unwrap();
    assert!(matches.is_empty());
}

#[tokio::test]
async fn test_throughput_scale_up() {
    let client = client_with(MemoryTransport::with_initial_throughput(400)).await;

    let current = client.get_throughput().await.unwrap();
    assert_eq!(current.request_units(), 400);

    let replaced = client
        .set_throughput(current.increased_by(100).request_units())
        .await
        .unwrap();
    assert_eq!(replaced.request_units(), 500);

    let read_back = client.get_throughput().await.unwrap();
    assert_eq!(read_back.request_units(), 500);
}

#[tokio::test]
async fn test_throughput_not_configured() {
    let client = client().await;

    let err = client.get_throughput().await.unwrap_err();
    assert!(matches!(err, StoreError::ThroughputNotConfigured { .. }));
    // Not a failure of the container itself, so the condition is retryable
    // policy-wise but callers should treat it as "not applicable".
    assert!(err.is_recoverable());
}

#[tokio::test]
async fn test_invalid_throughput_rejected() {
    let client = client_with(MemoryTransport::with_initial_throughput(400)).await;

    let err = client.set_throughput(100).await.unwrap_err();
    assert!(matches!(err, StoreError::InvalidThroughput(_)));

    // The prior setting is untouched.
    assert_eq!(client.get_throughput().await.unwrap().request_units(), 400);
}

// The walkthrough the demo command performs, end to end.
#[tokio::test]
async fn test_sales_order_walkthrough() {
    let client = client_with(MemoryTransport::with_initial_throughput(400)).await;

    let current = client.get_throughput().await.unwrap();
    client
        .set_throughput(current.increased_by(100).request_units())
        .await
        .unwrap();

    client
        .create_document(order("SalesOrder1", "Account1", 100.0))
        .await
        .unwrap();
    client
        .create_document(order("SalesOrder2", "Account2", 200.0))
        .await
        .unwrap();

    let read = client
        .read_document("SalesOrder1", "Account1".into())
        .await
        .unwrap();
    assert_eq!(read.field("subtotal"), Some(&json!(100.0)));

    let all = client
        .read_all_documents(10)
        .await
        .unwrap()
        .try_collect()
        .await
        .unwrap();
    assert_eq!(all.len(), 2);

    let query = QuerySpec::new("SELECT * FROM r WHERE r.partitionKey = @account_number")
        .with_parameter("@account_number", "Account1");
    let matched = client
        .query_documents(query)
        .await
        .unwrap()
        .try_collect()
        .await
        .unwrap();
    assert_eq!(matched.len(), 1);

    let mut updated = read;
    updated.set_field("subtotal", json!(101.0));
    let replaced = client
        .replace_document("SalesOrder1", "Account1".into(), updated, None)
        .await
        .unwrap();
    assert_eq!(replaced.field("subtotal"), Some(&json!(101.0)));

    client
        .delete_document("SalesOrder1", "Account1".into())
        .await
        .unwrap();

    let remaining = client
        .read_all_documents(10)
        .await
        .unwrap()
        .try_collect()
        .await
        .unwrap();
    assert_eq!(remaining.len(), 1);
    assert_eq!(remaining[0].id(), "SalesOrder2");
}

#[tokio::test]
async fn test_connect_rejects_conflicting_partition_key_path() {
    let transport: Arc<dyn DocumentTransport> = Arc::new(MemoryTransport::new());
    DocumentContainerClient::connect(Arc::clone(&transport), &ContainerConfig::default())
        .await
        .unwrap();

    let conflicting = ContainerConfig {
        partition_key_path: "/accountNumber".to_string(),
        ..Default::default()
    };
    let err = DocumentContainerClient::connect(transport, &conflicting)
        .await
        .unwrap_err();
    assert!(matches!(err, StoreError::SchemaConflict { .. }));
}

#[tokio::test]
async fn test_stream_adapter_yields_every_document() {
    use futures::StreamExt;

    let client = client().await;
    for n in 0..5 {
        client
            .create_document(order(&format!("SalesOrder{n}"), "Account1", n as f64))
            .await
            .unwrap();
    }

    let stream = client.read_all_documents(2).await.unwrap().into_stream();
    let collected: Vec<_> = stream.collect().await;
    assert_eq!(collected.len(), 5);
    assert!(collected.iter().all(|r| r.is_ok()));
}
