//! MCP (Model Context Protocol) server implementation.
//!
//! Provides MCP tools for planning work with TaskTree:
//! - `create_task` - Create a new task with dependencies and metadata
//! - `decompose_task` - Split a task into subtasks it depends on
//! - `update_task` - Append detail or dependencies to an existing task
//! - `set_task_status` - Transition a task through its lifecycle
//! - `get_task_info` - Get a task, its dependency tree, and execution order
//! - `get_current_task` - Get the task currently being worked on

use std::sync::Arc;

use axum::Router;
use rmcp::{
    handler::server::wrapper::Parameters,
    model::{CallToolResult, Content, ServerCapabilities, ServerInfo},
    tool, tool_handler, tool_router,
    transport::streamable_http_server::{
        session::local::LocalSessionManager, StreamableHttpServerConfig, StreamableHttpService,
    },
    ErrorData as McpError, ServerHandler,
};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use tokio_util::sync::CancellationToken;
use tracing::info;

use tasktree_core::{ComplexityEstimate, ComplexityLevel, Task, TaskId, TaskStatus};

use crate::state::AppState;

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

/// MCP server for TaskTree operations.
#[derive(Clone)]
pub struct TaskTreeMcpServer {
    state: Arc<AppState>,
    tool_router: rmcp::handler::server::router::tool::ToolRouter<Self>,
}

// ============================================================================
// Tool Parameter Types
// ============================================================================

/// Complexity estimate parameters.
#[derive(Debug, Deserialize, JsonSchema)]
pub struct ComplexityParams {
    /// Estimated level: "low", "medium", or "high".
    pub level: String,

    /// Optional notes explaining the estimate.
    #[serde(default)]
    pub notes: Option<String>,
}

/// Parameters for create_task tool.
#[derive(Debug, Deserialize, JsonSchema)]
pub struct CreateTaskParams {
    /// Short task title.
    pub title: String,

    /// Longer description of the work.
    #[serde(default)]
    pub description: String,

    /// What finishing this task achieves.
    #[serde(default)]
    pub goal: String,

    /// IDs of tasks this one depends on.
    #[serde(default)]
    pub depends_on_task_ids: Vec<String>,

    /// Concrete completion criteria.
    #[serde(default)]
    pub definitions_of_done: Vec<String>,

    /// Known unknowns worth resolving during execution.
    #[serde(default)]
    pub uncertainty_areas: Vec<String>,

    /// Whether the task sits on the critical path (scheduling priority).
    #[serde(default)]
    pub critical_path: bool,

    /// Optional complexity estimate; "high" requires decomposition before
    /// the task may start.
    #[serde(default)]
    pub estimated_complexity: Option<ComplexityParams>,
}

/// One subtask in a decompose_task request.
#[derive(Debug, Deserialize, JsonSchema)]
pub struct SubtaskParams {
    /// Short subtask title.
    pub title: String,

    /// Longer description of the work.
    #[serde(default)]
    pub description: String,

    /// What finishing this subtask achieves.
    #[serde(default)]
    pub goal: String,

    /// Whether the subtask sits on the critical path.
    #[serde(default)]
    pub critical_path: bool,

    /// Concrete completion criteria.
    #[serde(default)]
    pub definitions_of_done: Vec<String>,

    /// Known unknowns worth resolving during execution.
    #[serde(default)]
    pub uncertainty_areas: Vec<String>,

    /// Indexes of earlier subtasks in this batch that this one depends on.
    #[serde(default)]
    pub depends_on_subtask_indexes: Vec<usize>,
}

/// Parameters for decompose_task tool.
#[derive(Debug, Deserialize, JsonSchema)]
pub struct DecomposeTaskParams {
    /// Task ID to decompose.
    pub task_id: String,

    /// Subtasks to create. The parent gains a dependency on each.
    pub subtasks: Vec<SubtaskParams>,
}

/// Parameters for update_task tool.
#[derive(Debug, Deserialize, JsonSchema)]
pub struct UpdateTaskParams {
    /// Task ID to update.
    pub task_id: String,

    /// Text to append to the description.
    #[serde(default)]
    pub append_description: Option<String>,

    /// Additional dependency IDs (duplicates are skipped).
    #[serde(default)]
    pub add_depends_on_task_ids: Vec<String>,

    /// Additional completion criteria.
    #[serde(default)]
    pub add_definitions_of_done: Vec<String>,

    /// Additional uncertainty areas.
    #[serde(default)]
    pub add_uncertainty_areas: Vec<String>,
}

/// Parameters for set_task_status tool.
#[derive(Debug, Deserialize, JsonSchema)]
pub struct SetTaskStatusParams {
    /// Task ID to transition.
    pub task_id: String,

    /// Target status: "todo", "in-progress", "done", or "failed".
    pub status: String,
}

/// Parameters for get_task_info tool.
#[derive(Debug, Deserialize, JsonSchema)]
pub struct GetTaskInfoParams {
    /// Task ID to retrieve.
    pub task_id: String,
}

/// Parameters for get_current_task tool (none required).
#[derive(Debug, Deserialize, JsonSchema, Default)]
pub struct GetCurrentTaskParams {}

// ============================================================================
// Response Types
// ============================================================================

/// Result of creating a task.
#[derive(Debug, Serialize)]
pub struct CreateTaskResult {
    pub task_id: String,
    pub status: String,
}

/// Result of decomposing a task.
#[derive(Debug, Serialize)]
pub struct DecomposeTaskResult {
    pub task_id: String,
    pub subtask_ids: Vec<String>,
}

/// Result of updating a task.
#[derive(Debug, Serialize)]
pub struct UpdateTaskResult {
    pub task_id: String,
    pub status: String,
}

/// Result of a status transition.
#[derive(Debug, Serialize)]
pub struct SetTaskStatusResult {
    pub task_id: String,
    pub old_status: String,
    pub new_status: String,
}

/// Task details including graph context, serialized straight from the store.
#[derive(Debug, Serialize)]
pub struct TaskInfoResult {
    /// The requested task record.
    pub task: Task,

    /// Every task in the same dependency tree, in discovery order.
    pub tree: Vec<Task>,

    /// Incomplete tasks of the tree in dependency-respecting,
    /// critical-path-prioritized execution order.
    pub next_up: Vec<Task>,
}

/// The current-task pointer and its record, if any.
#[derive(Debug, Serialize)]
pub struct CurrentTaskResult {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub task_id: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub task: Option<Task>,
}

// ============================================================================
// Tool Implementations
// ============================================================================

#[tool_router]
impl TaskTreeMcpServer {
    /// Create a new MCP server with the given AppState.
    pub fn new(state: Arc<AppState>) -> Self {
        Self {
            state,
            tool_router: Self::tool_router(),
        }
    }

    /// Create a new task.
    #[tool(description = "Create a new task with optional dependencies, completion criteria, and complexity estimate.")]
    async fn create_task(
        &self,
        Parameters(params): Parameters<CreateTaskParams>,
    ) -> Result<CallToolResult, McpError> {
        if params.title.trim().is_empty() {
            return Ok(CallToolResult::error(vec![Content::text(
                "Task title must not be empty".to_string(),
            )]));
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
                    return Ok(CallToolResult::error(vec![Content::text(format!(
                        "Unknown complexity level: {}",
                        c.level
                    ))]));
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

        self.state
            .store
            .write()
            .await
            .set(task_id.clone(), task);

        info!(
            task_id = %task_id,
            title = %params.title,
            "Created task via MCP"
        );

        let result = CreateTaskResult {
            task_id: task_id.as_str().to_string(),
            status: TaskStatus::Todo.to_string(),
        };

        let response = serde_json::to_string_pretty(&result).unwrap_or_else(|_| "{}".to_string());

        Ok(CallToolResult::success(vec![Content::text(response)]))
    }

    /// Decompose a task into subtasks it depends on.
    #[tool(description = "Split a task into subtasks. The parent gains a dependency on each created subtask; subtasks may depend on earlier subtasks in the same batch by index.")]
    async fn decompose_task(
        &self,
        Parameters(params): Parameters<DecomposeTaskParams>,
    ) -> Result<CallToolResult, McpError> {
        let parent_id = TaskId::new(&params.task_id);

        if params.subtasks.is_empty() {
            return Ok(CallToolResult::error(vec![Content::text(
                "At least one subtask is required".to_string(),
            )]));
        }

        for (index, subtask) in params.subtasks.iter().enumerate() {
            if subtask.title.trim().is_empty() {
                return Ok(CallToolResult::error(vec![Content::text(format!(
                    "Subtask {} has an empty title",
                    index
                ))]));
            }
            for &dep_index in &subtask.depends_on_subtask_indexes {
                if dep_index >= index {
                    return Ok(CallToolResult::error(vec![Content::text(format!(
                        "Subtask {} may only depend on earlier subtasks (got index {})",
                        index, dep_index
                    ))]));
                }
            }
        }

        let mut store = self.state.store.write().await;

        match store.get(&parent_id) {
            Some(parent) if parent.is_complete() => {
                return Ok(CallToolResult::error(vec![Content::text(format!(
                    "Task {} is already finished and cannot be decomposed",
                    params.task_id
                ))]));
            }
            Some(_) => {}
            None => {
                return Ok(CallToolResult::error(vec![Content::text(format!(
                    "Task not found: {}",
                    params.task_id
                ))]));
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

        let result = DecomposeTaskResult {
            task_id: parent_id.as_str().to_string(),
            subtask_ids: created.iter().map(|id| id.as_str().to_string()).collect(),
        };

        let response = serde_json::to_string_pretty(&result).unwrap_or_else(|_| "{}".to_string());

        Ok(CallToolResult::success(vec![Content::text(response)]))
    }

    /// Append detail or dependencies to an existing task.
    #[tool(description = "Update a task: append description text, completion criteria, uncertainty areas, or additional dependencies.")]
    async fn update_task(
        &self,
        Parameters(params): Parameters<UpdateTaskParams>,
    ) -> Result<CallToolResult, McpError> {
        let task_id = TaskId::new(&params.task_id);

        if params
            .add_depends_on_task_ids
            .iter()
            .any(|dep| dep == &params.task_id)
        {
            return Ok(CallToolResult::error(vec![Content::text(
                "A task cannot depend on itself".to_string(),
            )]));
        }

        let mut store = self.state.store.write().await;

        let task = match store.get_mut(&task_id) {
            Some(t) => t,
            None => {
                return Ok(CallToolResult::error(vec![Content::text(format!(
                    "Task not found: {}",
                    params.task_id
                ))]));
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

        let result = UpdateTaskResult {
            task_id: task_id.as_str().to_string(),
            status: status.to_string(),
        };

        let response = serde_json::to_string_pretty(&result).unwrap_or_else(|_| "{}".to_string());

        Ok(CallToolResult::success(vec![Content::text(response)]))
    }

    /// Transition a task through its lifecycle.
    #[tool(description = "Set a task's status. Transitions move forward (todo -> in-progress -> done/failed); done -> in-progress is allowed for rework. High-complexity tasks must be decomposed before starting.")]
    async fn set_task_status(
        &self,
        Parameters(params): Parameters<SetTaskStatusParams>,
    ) -> Result<CallToolResult, McpError> {
        let task_id = TaskId::new(&params.task_id);

        let next = match parse_status(&params.status) {
            Some(s) => s,
            None => {
                return Ok(CallToolResult::error(vec![Content::text(format!(
                    "Unknown status: {}",
                    params.status
                ))]));
            }
        };

        let mut store = self.state.store.write().await;

        let old_status = {
            let task = match store.get_mut(&task_id) {
                Some(t) => t,
                None => {
                    return Ok(CallToolResult::error(vec![Content::text(format!(
                        "Task not found: {}",
                        params.task_id
                    ))]));
                }
            };

            match task.transition_to(next) {
                Ok(old) => old,
                Err(e) => {
                    return Ok(CallToolResult::error(vec![Content::text(e.to_string())]));
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

        let result = SetTaskStatusResult {
            task_id: task_id.as_str().to_string(),
            old_status: old_status.to_string(),
            new_status: next.to_string(),
        };

        let response = serde_json::to_string_pretty(&result).unwrap_or_else(|_| "{}".to_string());

        Ok(CallToolResult::success(vec![Content::text(response)]))
    }

    /// Get a task, its dependency tree, and the incomplete execution order.
    #[tool(description = "Get a task's record, every task in its dependency tree, and the incomplete tasks of that tree in execution order.")]
    async fn get_task_info(
        &self,
        Parameters(params): Parameters<GetTaskInfoParams>,
    ) -> Result<CallToolResult, McpError> {
        let task_id = TaskId::new(&params.task_id);

        let store = self.state.store.read().await;

        let task = match store.get(&task_id) {
            Some(t) => t.clone(),
            None => {
                return Ok(CallToolResult::error(vec![Content::text(format!(
                    "Task not found: {}",
                    params.task_id
                ))]));
            }
        };

        let tree: Vec<Task> = store.all_in_tree(&task_id).into_iter().cloned().collect();
        let next_up: Vec<Task> = store
            .incomplete_tasks_in_tree(&task_id)
            .into_iter()
            .cloned()
            .collect();

        info!(task_id = %task_id, tree_size = tree.len(), "Retrieved task info via MCP");

        let result = TaskInfoResult {
            task,
            tree,
            next_up,
        };

        let response = serde_json::to_string_pretty(&result).unwrap_or_else(|_| "{}".to_string());

        Ok(CallToolResult::success(vec![Content::text(response)]))
    }

    /// Get the task currently being worked on, if any.
    #[tool(description = "Get the current in-progress task pointer and its record.")]
    async fn get_current_task(
        &self,
        Parameters(_params): Parameters<GetCurrentTaskParams>,
    ) -> Result<CallToolResult, McpError> {
        let store = self.state.store.read().await;

        let task_id = store.current_task().cloned();
        let task = task_id.as_ref().and_then(|id| store.get(id)).cloned();

        let result = CurrentTaskResult {
            task_id: task_id.map(|id| id.as_str().to_string()),
            task,
        };

        let response = serde_json::to_string_pretty(&result).unwrap_or_else(|_| "{}".to_string());

        Ok(CallToolResult::success(vec![Content::text(response)]))
    }
}

// ============================================================================
// Server Handler Implementation
// ============================================================================

#[tool_handler]
impl ServerHandler for TaskTreeMcpServer {
    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            protocol_version: Default::default(),
            capabilities: ServerCapabilities::builder().enable_tools().build(),
            server_info: rmcp::model::Implementation {
                name: "tasktree-server".to_string(),
                version: env!("CARGO_PKG_VERSION").to_string(),
                title: None,
                website_url: None,
                icons: None,
            },
            instructions: Some(
                "TaskTree MCP Server - Plan and track dependent tasks. \
                 Use create_task to add work, decompose_task to split large tasks, \
                 set_task_status to move work forward, and get_task_info to see the \
                 dependency tree and what to do next."
                    .to_string(),
            ),
        }
    }
}

// ============================================================================
// HTTP Server Setup
// ============================================================================

/// Create an axum Router for the MCP HTTP server.
///
/// This router handles MCP protocol requests over HTTP using the Streamable
/// HTTP transport. Mount this at `/mcp` on your existing HTTP server or run
/// it standalone.
pub fn create_mcp_router(state: Arc<AppState>, ct: CancellationToken) -> Router {
    let state_clone = state.clone();
    let service = StreamableHttpService::new(
        move || Ok(TaskTreeMcpServer::new(state_clone.clone())),
        LocalSessionManager::default().into(),
        StreamableHttpServerConfig {
            cancellation_token: ct,
            ..Default::default()
        },
    );

    info!("MCP server initialized with Streamable HTTP transport");

    Router::new().nest_service("/mcp", service)
}
