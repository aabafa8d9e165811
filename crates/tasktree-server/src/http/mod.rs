//! HTTP server for the planning service.
//!
//! Provides endpoints for:
//! - MCP tools, legacy JSON variant (`/mcp/tools/*`)
//! - Task list API (`/v1/tasks`)
//! - Single task read (`/v1/tasks/:task_id`)
//! - Health check (`/health`)
//! - Prometheus metrics (`/metrics`)

use std::sync::Arc;

use axum::{
    routing::{get, post},
    Router,
};
use tower_http::cors::{Any, CorsLayer};

use crate::state::AppState;

mod handlers;
mod mcp;

/// Create the HTTP router.
pub fn create_router(state: Arc<AppState>) -> Router {
    // CORS layer for devtools access
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        // MCP tools (legacy JSON variant)
        .route("/mcp/tools/create_task", post(mcp::create_task))
        .route("/mcp/tools/decompose_task", post(mcp::decompose_task))
        .route("/mcp/tools/update_task", post(mcp::update_task))
        .route("/mcp/tools/set_task_status", post(mcp::set_task_status))
        .route("/mcp/tools/get_task_info", post(mcp::get_task_info))
        .route("/mcp/tools/get_current_task", post(mcp::get_current_task))
        // API routes
        .route("/v1/tasks", get(handlers::list_tasks_json))
        .route("/v1/tasks/:task_id", get(handlers::get_task_json))
        // Observability routes
        .route("/health", get(handlers::health_check))
        .route("/metrics", get(handlers::metrics_handler))
        .layer(cors)
        .with_state(state)
}
