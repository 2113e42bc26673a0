#![allow(dead_code)]

use std::sync::{Arc, Mutex, Once};
use std::time::Duration;

use async_trait::async_trait;
use bytes::Bytes;
use reqwest::multipart;
use serde_json::Value;
use sqlx::PgPool;
use tokio::net::TcpListener;
use webapp::{
    models::AppState,
    services::{
        blob_store::{BlobStore, BlobStoreError, MemoryBlobStore},
        metrics::MetricsSink,
    },
};

pub const TEST_BUCKET: &str = "test-bucket";

pub fn init_tracing_once() {
    static INIT: Once = Once::new();
    INIT.call_once(|| {
        tracing_subscriber::fmt()
            .with_env_filter("webapp=debug")
            .with_test_writer()
            .init();
    });
}

/// A metrics sink that stores every sample for assertions.
#[derive(Debug, Default)]
pub struct RecordingMetrics {
    counters: Mutex<Vec<&'static str>>,
    timings: Mutex<Vec<&'static str>>,
}

impl RecordingMetrics {
    /// Number of times the counter `name` was incremented
    pub fn count(&self, name: &str) -> usize {
        self.counters
            .lock()
            .unwrap()
            .iter()
            .filter(|c| **c == name)
            .count()
    }

    /// Whether at least one timing sample was recorded for `name`
    pub fn timed(&self, name: &str) -> bool {
        self.timings.lock().unwrap().iter().any(|t| *t == name)
    }
}

impl MetricsSink for RecordingMetrics {
    fn increment(&self, name: &'static str) {
        self.counters.lock().unwrap().push(name);
    }

    fn timing(&self, name: &'static str, _elapsed: Duration) {
        self.timings.lock().unwrap().push(name);
    }
}

/// A blob store whose every operation fails.
#[derive(Debug, Default)]
pub struct FailingBlobStore;

#[async_trait]
impl BlobStore for FailingBlobStore {
    async fn put(
        &self,
        key: &str,
        _data: Bytes,
        _content_type: &str,
    ) -> Result<(), BlobStoreError> {
        Err(BlobStoreError::Put {
            key: key.to_owned(),
            message: "simulated outage".to_owned(),
        })
    }

    async fn delete(&self, key: &str) -> Result<(), BlobStoreError> {
        Err(BlobStoreError::Delete {
            key: key.to_owned(),
            message: "simulated outage".to_owned(),
        })
    }

    fn location(&self) -> &str {
        TEST_BUCKET
    }
}

/// A blob store that answers only after `delay`, then succeeds.
#[derive(Debug)]
pub struct SlowBlobStore {
    pub delay: Duration,
}

#[async_trait]
impl BlobStore for SlowBlobStore {
    async fn put(
        &self,
        _key: &str,
        _data: Bytes,
        _content_type: &str,
    ) -> Result<(), BlobStoreError> {
        tokio::time::sleep(self.delay).await;
        Ok(())
    }

    async fn delete(&self, _key: &str) -> Result<(), BlobStoreError> {
        tokio::time::sleep(self.delay).await;
        Ok(())
    }

    fn location(&self) -> &str {
        TEST_BUCKET
    }
}

/// Handle on a running test server and the collaborators injected into it.
pub struct TestApp {
    /// Address format: `http://127.0.0.1:8492`
    pub address: String,
    pub blob_store: Arc<MemoryBlobStore>,
    pub metrics: Arc<RecordingMetrics>,
}

/// Spawns the application with an in-memory blob store.
pub async fn spawn_app(test_db_pool: PgPool) -> TestApp {
    let blob_store = Arc::new(MemoryBlobStore::new(TEST_BUCKET));
    let metrics = Arc::new(RecordingMetrics::default());

    let address = spawn_app_with(
        test_db_pool,
        Arc::clone(&blob_store) as Arc<dyn BlobStore>,
        Arc::clone(&metrics) as Arc<dyn MetricsSink>,
    )
    .await;

    TestApp {
        address,
        blob_store,
        metrics,
    }
}

/// Spawns the application with the given collaborators and returns its address.
pub async fn spawn_app_with(
    test_db_pool: PgPool,
    blob_store: Arc<dyn BlobStore>,
    metrics: Arc<dyn MetricsSink>,
) -> String {
    spawn_app_with_timeout(test_db_pool, blob_store, metrics, Duration::from_secs(5)).await
}

/// Like [`spawn_app_with`], with a custom deadline for external calls.
pub async fn spawn_app_with_timeout(
    test_db_pool: PgPool,
    blob_store: Arc<dyn BlobStore>,
    metrics: Arc<dyn MetricsSink>,
    external_call_timeout: Duration,
) -> String {
    init_tracing_once();

    // Randomly choose an available port
    let listener = TcpListener::bind("127.0.0.1:0")
        .await
        .expect("Failed to bind random port at localhost");
    let port = listener.local_addr().unwrap().port();

    let state = AppState::new(test_db_pool, blob_store, metrics)
        .with_external_call_timeout(external_call_timeout);

    tokio::spawn(async move {
        axum::serve(listener, webapp::app(state)).await.unwrap();
    });

    let address = format!("http://127.0.0.1:{port}");

    // Wait for server to be ready; an unknown path answers without touching the database
    let client = reqwest::Client::new();
    for _ in 0..10 {
        if client.get(format!("{address}/ready")).send().await.is_ok() {
            break;
        }
        tokio::time::sleep(Duration::from_millis(100)).await;
    }

    address
}

/// Creates a simple 1x1 PNG image and returns its byte representation.
pub fn create_test_image() -> Vec<u8> {
    vec![
        0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A, // PNG signature
        0x00, 0x00, 0x00, 0x0D, // IHDR chunk length
        0x49, 0x48, 0x44, 0x52, // IHDR
        0x00, 0x00, 0x00, 0x01, // Width: 1
        0x00, 0x00, 0x00, 0x01, // Height: 1
        0x08, 0x02, 0x00, 0x00,
        0x00, // Bit depth: 8, Color type: 2 (RGB), Compression: 0, Filter: 0, Interlace: 0
        0x90, 0x77, 0x53, 0xDE, // CRC
        0x00, 0x00, 0x00, 0x0C, // IDAT chunk length
        0x49, 0x44, 0x41, 0x54, // IDAT
        0x08, 0x99, 0x01, 0x01, 0x00, 0x00, 0x00, 0xFF, 0xFF, 0x00, 0x00, 0x00, // Image data
        0x02, 0x00, 0x01, 0xE5, // CRC
        0x00, 0x00, 0x00, 0x00, // IEND chunk length
        0x49, 0x45, 0x4E, 0x44, // IEND
        0xAE, 0x42, 0x60, 0x82, // CRC
    ]
}

/// Builds a multipart form with one image part under `field_name`.
pub fn image_form(
    field_name: &str,
    file_name: &str,
    mime: &str,
    data: Vec<u8>,
) -> multipart::Form {
    multipart::Form::new().part(
        field_name.to_owned(),
        multipart::Part::bytes(data)
            .file_name(file_name.to_owned())
            .mime_str(mime)
            .unwrap(),
    )
}

/// Uploads the test image as `profile.png` and returns the JSON body.
pub async fn upload_test_image(client: &reqwest::Client, address: &str) -> Value {
    let form = image_form("profilePic", "profile.png", "image/png", create_test_image());

    let response = client
        .post(format!("{address}/v1/file"))
        .multipart(form)
        .send()
        .await
        .expect("Failed to upload file");

    assert_eq!(response.status(), reqwest::StatusCode::CREATED);
    response.json().await.expect("Failed to parse JSON response")
}

/// Number of rows in `table`.
pub async fn count_rows(pool: &PgPool, table: &str) -> i64 {
    sqlx::query_scalar::<_, i64>(&format!("SELECT COUNT(*) FROM {table}"))
        .fetch_one(pool)
        .await
        .expect("Failed to count rows")
}
