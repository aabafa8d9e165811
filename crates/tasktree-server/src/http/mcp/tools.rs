//! MCP tool handler implementations for the legacy JSON endpoints.

use std::sync::Arc;

use axum::{extract::State, Json};
use tracing::{info, warn};

use tasktree_core::{ComplexityEstimate, ComplexityLevel, CoreError, Task, TaskId, TaskStatus};

use crate::state::AppState;

use super::types::*;

/// Parse a wire status name into a TaskStatus.
fn parse_status(s: &str) -> Option<TaskStatus> {
    match s {
        "todo" => Some(TaskStatus::Todo),
        "in-progress" => Some(TaskStatus::InProgress),
        "done" => Some(TaskStatus::Done),
        "failed" => Some(TaskStatus::Failed),
        _ => None,
    }
}

/// Parse a wire complexity level name.
fn parse_complexity_level(s: &str) -> Option<ComplexityLevel> {
    match s {
        "low" => Some(ComplexityLevel::Low),
        "medium" => Some(ComplexityLevel::Medium),
        "high" => Some(ComplexityLevel::High),
        _ => None,
    }
}

// ============================================================================
// create_task
// ============================================================================

/// Create a new task.
pub async fn create_task(
    State(state): State<Arc<AppState>>,
    Json(request): Json<McpRequest<CreateTaskParams>>,
) -> Json<McpResponse<CreateTaskResult>> {
    let params = request.params;

    if params.title.trim().is_empty() {
        return Json(McpResponse::err(
            "INVALID_INPUT",
            "Task title must not be empty",
        ));
    }

    let complexity = match &params.estimated_complexity {
        Some(c) => match parse_complexity_level(&c.level) {
            Some(level) => {
                let mut estimate = ComplexityEstimate::new(level);
                if let Some(notes) = &c.notes {
                    estimate = estimate.with_notes(notes.clone());
                }
                Some(estimate)
            }
            None => {
                return Json(McpResponse::err(
                    "INVALID_INPUT",
                    &format!("Unknown complexity level: {}", c.level),
                ));
            }
        },
        None => None,
    };

    let mut task = Task::new(&params.title, &params.description, &params.goal, "mcp")
        .with_critical_path(params.critical_path)
        .with_dependencies(params.depends_on_task_ids.iter().map(TaskId::new).collect())
        .with_definitions_of_done(params.definitions_of_done.clone())
        .with_uncertainty_areas(params.uncertainty_areas.clone());
    if let Some(estimate) = complexity {
        task = task.with_complexity(estimate);
    }

    let task_id = task.id.clone();

    state.store.write().await.set(task_id.clone(), task);

    info!(
        task_id = %task_id,
        title = %params.title,
        "Created task via MCP"
    );

    Json(McpResponse::ok(CreateTaskResult {
        task_id: task_id.as_str().to_string(),
        status: TaskStatus::Todo.to_string(),
    }))
}

// ============================================================================
// decompose_task
// ============================================================================

/// Decompose a task into subtasks it depends on.
pub async fn decompose_task(
    State(state): State<Arc<AppState>>,
    Json(request): Json<McpRequest<DecomposeTaskParams>>,
) -> Json<McpResponse<DecomposeTaskResult>> {
    let params = request.params;
    let parent_id = TaskId::new(&params.task_id);

    if params.subtasks.is_empty() {
        return Json(McpResponse::err(
            "INVALID_INPUT",
            "At least one subtask is required",
        ));
    }

    for (index, subtask) in params.subtasks.iter().enumerate() {
        if subtask.title.trim().is_empty() {
            return Json(McpResponse::err(
                "INVALID_INPUT",
                &format!("Subtask {} has an empty title", index),
            ));
        }
        for &dep_index in &subtask.depends_on_subtask_indexes {
            if dep_index >= index {
                return Json(McpResponse::err(
                    "INVALID_INPUT",
                    &format!(
                        "Subtask {} may only depend on earlier subtasks (got index {})",
                        index, dep_index
                    ),
                ));
            }
        }
    }

    let mut store = state.store.write().await;

    match store.get(&parent_id) {
        Some(parent) if parent.is_complete() => {
            return Json(McpResponse::err(
                "INVALID_INPUT",
                &format!(
                    "Task {} is already finished and cannot be decomposed",
                    params.task_id
                ),
            ));
        }
        Some(_) => {}
        None => {
            return Json(McpResponse::err(
                "NOT_FOUND",
                &format!("Task not found: {}", params.task_id),
            ));
        }
    }

    let mut created: Vec<TaskId> = Vec::with_capacity(params.subtasks.len());
    for subtask in &params.subtasks {
        let deps: Vec<TaskId> = subtask
            .depends_on_subtask_indexes
            .iter()
            .map(|&i| created[i].clone())
            .collect();

        let task = Task::new(&subtask.title, &subtask.description, &subtask.goal, "mcp")
            .with_critical_path(subtask.critical_path)
            .with_dependencies(deps)
            .with_definitions_of_done(subtask.definitions_of_done.clone())
            .with_uncertainty_areas(subtask.uncertainty_areas.clone());

        created.push(task.id.clone());
        store.set(task.id.clone(), task);
    }

    if let Some(parent) = store.get_mut(&parent_id) {
        for id in &created {
            parent.add_dependency(id.clone());
        }
    }

    info!(
        task_id = %parent_id,
        subtask_count = created.len(),
        "Decomposed task via MCP"
    );

    Json(McpResponse::ok(DecomposeTaskResult {
        task_id: parent_id.as_str().to_string(),
        subtask_ids: created.iter().map(|id| id.as_str().to_string()).collect(),
    }))
}

// ============================================================================
// update_task
// ============================================================================

/// Append detail or dependencies to an existing task.
pub async fn update_task(
    State(state): State<Arc<AppState>>,
    Json(request): Json<McpRequest<UpdateTaskParams>>,
) -> Json<McpResponse<UpdateTaskResult>> {
    let params = request.params;
    let task_id = TaskId::new(&params.task_id);

    if params
        .add_depends_on_task_ids
        .iter()
        .any(|dep| dep == &params.task_id)
    {
        return Json(McpResponse::err(
            "INVALID_INPUT",
            "A task cannot depend on itself",
        ));
    }

    let mut store = state.store.write().await;

    let task = match store.get_mut(&task_id) {
        Some(t) => t,
        None => {
            return Json(McpResponse::err(
                "NOT_FOUND",
                &format!("Task not found: {}", params.task_id),
            ));
        }
    };

    if let Some(text) = &params.append_description {
        task.append_description(text);
    }
    for dep in &params.add_depends_on_task_ids {
        task.add_dependency(TaskId::new(dep));
    }
    task.definitions_of_done
        .extend(params.add_definitions_of_done.iter().cloned());
    task.uncertainty_areas
        .extend(params.add_uncertainty_areas.iter().cloned());

    let status = task.status;

    info!(task_id = %task_id, "Updated task via MCP");

    Json(McpResponse::ok(UpdateTaskResult {
        task_id: task_id.as_str().to_string(),
        status: status.to_string(),
    }))
}

// ============================================================================
// set_task_status
// ============================================================================

/// Transition a task through its lifecycle.
pub async fn set_task_status(
    State(state): State<Arc<AppState>>,
    Json(request): Json<McpRequest<SetTaskStatusParams>>,
) -> Json<McpResponse<SetTaskStatusResult>> {
    let params = request.params;
    let task_id = TaskId::new(&params.task_id);

    let next = match parse_status(&params.status) {
        Some(s) => s,
        None => {
            return Json(McpResponse::err(
                "INVALID_STATUS",
                &format!("Unknown status: {}", params.status),
            ));
        }
    };

    let mut store = state.store.write().await;

    let old_status = {
        let task = match store.get_mut(&task_id) {
            Some(t) => t,
            None => {
                return Json(McpResponse::err(
                    "NOT_FOUND",
                    &format!("Task not found: {}", params.task_id),
                ));
            }
        };

        match task.transition_to(next) {
            Ok(old) => old,
            Err(e @ CoreError::InvalidStateTransition { .. }) => {
                warn!(task_id = %task_id, error = %e, "Rejected status transition");
                return Json(McpResponse::err("INVALID_TRANSITION", &e.to_string()));
            }
            Err(e @ CoreError::DecompositionRequired(_)) => {
                return Json(McpResponse::err("DECOMPOSITION_REQUIRED", &e.to_string()));
            }
            Err(e) => {
                return Json(McpResponse::err("INVALID_INPUT", &e.to_string()));
            }
        }
    };

    if next == TaskStatus::InProgress {
        store.set_current_task(task_id.clone());
    }

    info!(
        task_id = %task_id,
        old_status = %old_status,
        new_status = %next,
        "Transitioned task via MCP"
    );

    Json(McpResponse::ok(SetTaskStatusResult {
        task_id: task_id.as_str().to_string(),
        old_status: old_status.to_string(),
        new_status: next.to_string(),
    }))
}

// ============================================================================
// get_task_info
// ============================================================================

/// Get a task, its dependency tree, and the incomplete execution order.
pub async fn get_task_info(
    State(state): State<Arc<AppState>>,
    Json(request): Json<McpRequest<GetTaskInfoParams>>,
) -> Json<McpResponse<GetTaskInfoResult>> {
    let task_id = TaskId::new(&request.params.task_id);

    let store = state.store.read().await;

    let task = match store.get(&task_id) {
        Some(t) => t.clone(),
        None => {
            return Json(McpResponse::err(
                "NOT_FOUND",
                &format!("Task not found: {}", request.params.task_id),
            ));
        }
    };

    let tree: Vec<Task> = store.all_in_tree(&task_id).into_iter().cloned().collect();
    let next_up: Vec<Task> = store
        .incomplete_tasks_in_tree(&task_id)
        .into_iter()
        .cloned()
        .collect();

    Json(McpResponse::ok(GetTaskInfoResult {
        task,
        tree,
        next_up,
    }))
}

// ============================================================================
// get_current_task
// ============================================================================

/// Get the task currently being worked on, if any.
pub async fn get_current_task(
    State(state): State<Arc<AppState>>,
    Json(_request): Json<McpRequest<GetCurrentTaskParams>>,
) -> Json<McpResponse<GetCurrentTaskResult>> {
    let store = state.store.read().await;

    let task_id = store.current_task().cloned();
    let task = task_id.as_ref().and_then(|id| store.get(id)).cloned();

    Json(McpResponse::ok(GetCurrentTaskResult {
        task_id: task_id.map(|id| id.as_str().to_string()),
        task,
    }))
}
