//! Router assembly.
//!
//! SYSTEM CONTEXT
//! ==============
//! This module binds the table REST endpoints the floor-plan editor saves
//! through, plus a health check, under a single Axum router.

pub mod tables;

use axum::Router;
use axum::http::StatusCode;
use axum::routing::get;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::state::AppState;

/// Build the application router.
pub fn app(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route(
            "/api/floors/{floor_id}/tables",
            get(tables::list_tables).post(tables::create_table),
        )
        .route(
            "/api/floors/{floor_id}/tables/{table_id}",
            get(tables::get_table)
                .patch(tables::patch_table)
                .put(tables::patch_table)
                .delete(tables::delete_table),
        )
        .route("/healthz", get(healthz))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn healthz() -> StatusCode {
    StatusCode::OK
}
