//! Shared fixtures for fieldsight-kc integration tests

#![allow(dead_code)]

use axum::{
    body::{Body, Bytes},
    http::Request,
    Router,
};
use fieldsight_common::config::{EnketoSettings, TomlConfig};
use fieldsight_common::report::Reporter;
use fieldsight_common::storage::{FileSystemStorage, Storage};
use fieldsight_kc::services::EnketoClient;
use fieldsight_kc::{build_router, AppState};
use serde_json::Value;
use sqlx::sqlite::SqlitePoolOptions;
use sqlx::SqlitePool;
use std::sync::{Arc, Mutex};
use tempfile::TempDir;

/// Single-connection in-memory database with the full schema
pub async fn setup_test_db() -> SqlitePool {
    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .connect("sqlite::memory:")
        .await
        .expect("Failed to create in-memory database");
    fieldsight_common::db::create_schema(&pool)
        .await
        .expect("Failed to create schema");
    pool
}

/// Reporter that keeps every report for assertions
#[derive(Default)]
pub struct RecordingReporter {
    pub reports: Mutex<Vec<(String, String)>>,
}

impl Reporter for RecordingReporter {
    fn report(&self, subject: &str, info: &str) {
        self.reports
            .lock()
            .unwrap()
            .push((subject.to_string(), info.to_string()));
    }
}

/// Test application with its database, media directory and reporter
pub struct TestApp {
    pub db: SqlitePool,
    pub media: TempDir,
    pub storage: Arc<FileSystemStorage>,
    pub reporter: Arc<RecordingReporter>,
    pub router: Router,
}

impl TestApp {
    pub async fn new() -> Self {
        Self::with_enketo(EnketoSettings::default()).await
    }

    pub async fn with_enketo(enketo: EnketoSettings) -> Self {
        let config = TomlConfig {
            enketo,
            ..TomlConfig::default()
        };
        Self::with_config(config).await
    }

    pub async fn with_config(config: TomlConfig) -> Self {
        let db = setup_test_db().await;
        let media = tempfile::tempdir().expect("Failed to create media dir");
        let storage = Arc::new(FileSystemStorage::new(media.path(), config.media.base_url.clone()));
        let reporter = Arc::new(RecordingReporter::default());
        let enketo = EnketoClient::new(config.enketo.clone()).expect("Failed to build Enketo client");

        let state = AppState::new(db.clone(), config, enketo, storage.clone(), reporter.clone());
        let router = build_router(state);

        Self {
            db,
            media,
            storage,
            reporter,
            router,
        }
    }

    /// Write a media file below the test media root
    pub fn storage_save(&self, name: &str, content: &[u8]) {
        self.storage.save(name, content).expect("Failed to save media file");
    }
}

pub fn test_request(method: &str, uri: &str) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .body(Body::empty())
        .unwrap()
}

pub fn json_request(method: &str, uri: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

pub fn xml_request(uri: &str, xml: &str) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header("content-type", "text/xml")
        .body(Body::from(xml.to_string()))
        .unwrap()
}

pub async fn body_bytes(body: Body) -> Bytes {
    axum::body::to_bytes(body, usize::MAX)
        .await
        .expect("Should read body")
}

pub async fn extract_json(body: Body) -> Value {
    serde_json::from_slice(&body_bytes(body).await).expect("Should parse JSON")
}
