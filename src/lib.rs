//! Warehousing quotation builder: pricing model, persistence and JSON API.

pub mod cache;
pub mod config;
pub mod db;
pub mod error;
pub mod quotation;

use std::sync::Arc;

use axum::{routing::get, Json, Router};
use serde_json::{json, Value};
use tower_http::trace::TraceLayer;

use crate::cache::AppCache;
use crate::config::Config;
use crate::db::QuotationStore;
use crate::quotation::Mailer;

/// Shared handler state
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn QuotationStore>,
    pub cache: AppCache,
    pub mailer: Arc<dyn Mailer>,
    pub config: Arc<Config>,
}

impl AppState {
    pub fn new(store: Arc<dyn QuotationStore>, mailer: Arc<dyn Mailer>, config: Config) -> Self {
        Self {
            store,
            cache: AppCache::new(),
            mailer,
            config: Arc::new(config),
        }
    }
}

async fn health(axum::extract::State(state): axum::extract::State<AppState>) -> Json<Value> {
    Json(json!({
        "status": "ok",
        "cache": state.cache.stats(),
    }))
}

/// Full application router
pub fn app(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .nest("/api", quotation::router())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
