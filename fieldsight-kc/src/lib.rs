//! fieldsight-kc library - KoBoCAT companion service
//!
//! HTTP service for staff/team management, instance review history,
//! instance ingestion, attachment archives and Enketo form links.

use axum::Router;
use fieldsight_common::config::TomlConfig;
use fieldsight_common::report::Reporter;
use fieldsight_common::storage::Storage;
use sqlx::SqlitePool;
use std::sync::Arc;
use tower_http::trace::TraceLayer;

pub mod api;
pub mod db;
pub mod error;
pub mod pagination;
pub mod services;

pub use error::{ApiError, ApiResult};

use services::EnketoClient;

/// Application state shared across HTTP handlers
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool
    pub db: SqlitePool,
    pub config: Arc<TomlConfig>,
    pub enketo: Arc<EnketoClient>,
    /// Media file storage
    pub storage: Arc<dyn Storage>,
    /// Operator error channel
    pub reporter: Arc<dyn Reporter>,
}

impl AppState {
    pub fn new(
        db: SqlitePool,
        config: TomlConfig,
        enketo: EnketoClient,
        storage: Arc<dyn Storage>,
        reporter: Arc<dyn Reporter>,
    ) -> Self {
        Self {
            db,
            config: Arc::new(config),
            enketo: Arc::new(enketo),
            storage,
            reporter,
        }
    }
}

/// Build application router
pub fn build_router(state: AppState) -> Router {
    Router::new()
        .merge(api::health_routes())
        .merge(api::staff_project_routes())
        .merge(api::team_routes())
        .merge(api::staff_routes())
        .merge(api::instance_history_routes())
        .merge(api::instance_routes())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
