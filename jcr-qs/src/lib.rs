//! jcr-qs library - Journal query service
//!
//! Fuzzy name search, multi-criteria filtering and cross-year aggregation
//! over the raw yearly tables in `jcr.db`. Every operation renders as plain
//! text (default) or JSON.

use axum::Router;
use jcr_common::db::TableStore;
use std::path::PathBuf;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

pub mod aggregate;
pub mod api;
pub mod error;
pub mod filter;
pub mod format;
pub mod info;
pub mod prompt;
pub mod search;
pub mod warnings;

pub use error::{QueryError, QueryResult};
pub use format::{OutputFormat, TextReport};

/// Application state shared across HTTP handlers
#[derive(Clone)]
pub struct AppState {
    /// Table store over the read-only pool
    pub store: TableStore,
    /// Shown by the info endpoint
    pub db_path: PathBuf,
}

impl AppState {
    pub fn new(store: TableStore, db_path: PathBuf) -> Self {
        Self { store, db_path }
    }
}

/// Build application router
pub fn build_router(state: AppState) -> Router {
    use axum::routing::get;

    let queries = Router::new()
        .route("/api/search", get(api::search_journal))
        .route("/api/trends", get(api::get_partition_trends))
        .route("/api/warnings", get(api::check_warning_journals))
        .route("/api/compare", get(api::compare_journals))
        .route("/api/filter", get(api::filter_journals))
        .route("/api/batch", get(api::batch_query_journals))
        .route("/api/info", get(api::get_database_info))
        .route(
            "/api/prompt/journal-analysis",
            get(api::get_journal_analysis_prompt),
        );

    Router::new()
        .merge(queries)
        .merge(api::health_routes())
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}
