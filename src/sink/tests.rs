//! Tests for sink module

use super::*;
use crate::config::TargetConfig;
use crate::error::Error;
use crate::output::Destination;
use crate::types::{Context, Record};
use futures::TryStreamExt;
use object_store::memory::InMemory;
use object_store::path::Path as ObjectPath;
use object_store::ObjectStore;
use pretty_assertions::assert_eq;
use serde_json::{json, Value};
use std::sync::Arc;
use std::time::Duration;

fn record(value: Value) -> Record {
    value.as_object().cloned().unwrap()
}

fn memory_sink(config: TargetConfig, stream: &str) -> (GcsSink, Arc<InMemory>) {
    let store = Arc::new(InMemory::new());
    let destination = Destination::from_store(store.clone(), "gs", config.bucket_name.clone());
    let sink = GcsSink::new(Arc::new(config), stream).with_destination(destination);
    (sink, store)
}

async fn list_keys(store: &Arc<InMemory>) -> Vec<String> {
    let objects: Vec<_> = store.list(None).try_collect().await.unwrap();
    objects.into_iter().map(|o| o.location.to_string()).collect()
}

async fn read_object(store: &Arc<InMemory>, key: &str) -> String {
    let bytes = store
        .get(&ObjectPath::from(key))
        .await
        .unwrap()
        .bytes()
        .await
        .unwrap();
    String::from_utf8(bytes.to_vec()).unwrap()
}

// ============================================================================
// Key Derivation Tests
// ============================================================================

#[tokio::test]
async fn test_key_name_is_cached() {
    let (mut sink, _) = memory_sink(TargetConfig::new("bucket"), "users");

    let first = sink.key_name().unwrap().to_string();
    tokio::time::sleep(Duration::from_millis(1100)).await;
    let second = sink.key_name().unwrap().to_string();

    assert_eq!(first, second);
    assert!(first.starts_with("users_"));
    assert!(first.ends_with(".jsonl"));
}

#[test]
fn test_key_name_with_prefix() {
    let config = TargetConfig::new("bucket")
        .with_key_prefix("/out/")
        .with_key_naming_convention("x.jsonl");
    let (mut sink, _) = memory_sink(config, "users");

    assert_eq!(sink.key_name().unwrap(), "out/x.jsonl");
}

#[test]
fn test_key_name_error_is_not_cached() {
    let config = TargetConfig::new("bucket").with_date_format("%");
    let (mut sink, _) = memory_sink(config, "users");

    assert!(sink.key_name().is_err());
    assert!(sink.key_name().is_err());
}

// ============================================================================
// Record Processing Tests
// ============================================================================

#[tokio::test]
async fn test_process_record_cleans_keys() {
    let config = TargetConfig::new("bucket").with_key_naming_convention("{stream}.jsonl");
    let (mut sink, store) = memory_sink(config, "users");
    let mut context = Context::new();

    sink.process_record(record(json!({"User Name": "a", "2cost%": 5})), &mut context)
        .await
        .unwrap();
    let summary = sink.close().await.unwrap().unwrap();

    assert_eq!(summary.uri, "gs://bucket/users.jsonl");
    assert_eq!(summary.records, 1);
    assert_eq!(
        read_object(&store, "users.jsonl").await,
        "{\"User_Name\":\"a\",\"_2cost_avg\":5}\n"
    );
}

#[tokio::test]
async fn test_handle_opened_once() {
    let config = TargetConfig::new("bucket").with_key_naming_convention("{stream}.jsonl");
    let (mut sink, store) = memory_sink(config, "events");
    let mut context = Context::new();

    assert!(!sink.is_open());
    for i in 0..250 {
        sink.process_record(record(json!({"id": i})), &mut context)
            .await
            .unwrap();
    }
    assert!(sink.is_open());
    assert_eq!(sink.records_written(), 250);

    sink.close().await.unwrap();

    assert_eq!(list_keys(&store).await, vec!["events.jsonl"]);
    let contents = read_object(&store, "events.jsonl").await;
    let lines: Vec<&str> = contents.lines().collect();
    assert_eq!(lines.len(), 250);
    assert_eq!(lines[0], "{\"id\":0}");
    assert_eq!(lines[249], "{\"id\":249}");
}

#[tokio::test]
async fn test_transformation_timestamp() {
    let config = TargetConfig::new("bucket")
        .with_key_naming_convention("{stream}.jsonl")
        .with_transformation_timestamp(true);
    let (mut sink, store) = memory_sink(config, "users");

    sink.process_record(record(json!({"id": 1})), &mut Context::new())
        .await
        .unwrap();
    sink.close().await.unwrap();

    let line = read_object(&store, "users.jsonl").await;
    let parsed: Value = serde_json::from_str(line.trim_end()).unwrap();
    let ts = parsed[TRANSFORMATION_TIMESTAMP_FIELD].as_str().unwrap();
    assert!(chrono::NaiveDateTime::parse_from_str(ts, "%Y-%m-%dT%H:%M:%S%.f").is_ok());
    assert_eq!(parsed["id"], json!(1));
}

#[tokio::test]
async fn test_no_transformation_timestamp_by_default() {
    let config = TargetConfig::new("bucket").with_key_naming_convention("{stream}.jsonl");
    let (mut sink, store) = memory_sink(config, "users");

    sink.process_record(record(json!({"id": 1})), &mut Context::new())
        .await
        .unwrap();
    sink.close().await.unwrap();

    assert_eq!(read_object(&store, "users.jsonl").await, "{\"id\":1}\n");
}

#[tokio::test]
async fn test_colliding_keys_last_write_wins() {
    let config = TargetConfig::new("bucket").with_key_naming_convention("{stream}.jsonl");
    let (mut sink, store) = memory_sink(config, "users");

    sink.process_record(record(json!({"a ": 1, "a-": 2})), &mut Context::new())
        .await
        .unwrap();
    sink.close().await.unwrap();

    assert_eq!(read_object(&store, "users.jsonl").await, "{\"a_\":2}\n");
}

#[tokio::test]
async fn test_context_is_untouched() {
    let (mut sink, _) = memory_sink(TargetConfig::new("bucket"), "users");
    let mut context = record(json!({"batch_id": "abc"}));

    sink.process_record(record(json!({"id": 1})), &mut context)
        .await
        .unwrap();

    assert_eq!(context, record(json!({"batch_id": "abc"})));
}

// ============================================================================
// Lifecycle Tests
// ============================================================================

#[tokio::test]
async fn test_close_without_records() {
    let (mut sink, store) = memory_sink(TargetConfig::new("bucket"), "users");

    assert!(sink.close().await.unwrap().is_none());
    assert!(list_keys(&store).await.is_empty());
}

#[tokio::test]
async fn test_flush_without_handle_is_noop() {
    let (mut sink, _) = memory_sink(TargetConfig::new("bucket"), "users");
    sink.flush().await.unwrap();
    assert!(!sink.is_open());
}

#[tokio::test]
async fn test_open_failure_is_fatal() {
    let config = TargetConfig::new("bucket").with_credentials_file("/no/such/credentials.json");
    let mut sink = GcsSink::new(Arc::new(config), "users");

    let err = sink
        .process_record(record(json!({"id": 1})), &mut Context::new())
        .await
        .unwrap_err();

    assert!(matches!(err, Error::Config { .. }));
    assert!(!sink.is_open());
}

#[tokio::test]
async fn test_sink_key_matches_handle() {
    let config = TargetConfig::new("bucket").with_key_prefix("raw");
    let (mut sink, store) = memory_sink(config, "orders");

    let key = sink.key_name().unwrap().to_string();
    sink.process_record(record(json!({"id": 1})), &mut Context::new())
        .await
        .unwrap();
    sink.close().await.unwrap();

    assert!(key.starts_with("raw/orders_"));
    assert_eq!(list_keys(&store).await, vec![key]);
}
