//! HTTP request handlers for the REST read surface.

use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::{header, StatusCode},
    response::IntoResponse,
    Json,
};
use serde::Serialize;

use tasktree_core::TaskId;

use crate::state::AppState;

/// Summary row for the task list.
#[derive(Serialize)]
pub struct TaskSummary {
    pub task_id: String,
    pub title: String,
    pub status: String,
    pub critical_path: bool,
    pub depends_on_count: usize,
    pub created_at: String,
}

/// List tasks as JSON.
///
/// GET /v1/tasks
pub async fn list_tasks_json(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let store = state.store.read().await;

    let mut response: Vec<TaskSummary> = store
        .tasks()
        .map(|t| TaskSummary {
            task_id: t.id.as_str().to_string(),
            title: t.title.clone(),
            status: t.status.to_string(),
            critical_path: t.critical_path,
            depends_on_count: t.depends_on_task_ids.len(),
            created_at: t.created_at.to_rfc3339(),
        })
        .collect();
    response.sort_by(|a, b| a.created_at.cmp(&b.created_at));

    Json(response)
}

/// Error body for missing tasks.
#[derive(Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

/// Get a single task record.
///
/// GET /v1/tasks/:task_id
pub async fn get_task_json(
    State(state): State<Arc<AppState>>,
    Path(task_id): Path<String>,
) -> impl IntoResponse {
    let task_id = TaskId::new(&task_id);
    let store = state.store.read().await;

    match store.get(&task_id) {
        Some(task) => (StatusCode::OK, Json(task.clone())).into_response(),
        None => (
            StatusCode::NOT_FOUND,
            Json(ErrorResponse {
                error: format!("Task not found: {}", task_id),
            }),
        )
            .into_response(),
    }
}

/// Health check endpoint.
pub async fn health_check() -> impl IntoResponse {
    Json(serde_json::json!({ "status": "ok" }))
}

/// Prometheus metrics endpoint.
pub async fn metrics_handler(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let body = crate::metrics::collect_metrics(&state).await;
    ([(header::CONTENT_TYPE, "text/plain; version=0.0.4")], body)
}
