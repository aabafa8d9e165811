//! MCP request and response types for the legacy JSON endpoints.

use serde::{Deserialize, Serialize};

use tasktree_core::Task;

// ============================================================================
// Generic MCP Types
// ============================================================================

/// Generic MCP request wrapper.
#[derive(Debug, Deserialize)]
pub struct McpRequest<T> {
    /// Tool-specific parameters.
    pub params: T,
}

/// Generic MCP response wrapper.
#[derive(Debug, Serialize)]
pub struct McpResponse<T> {
    /// Tool result on success.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result: Option<T>,

    /// Error message on failure.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<McpError>,
}

impl<T> McpResponse<T> {
    /// Create a success response.
    pub fn ok(result: T) -> Self {
        Self {
            result: Some(result),
            error: None,
        }
    }

    /// Create an error response.
    pub fn err(code: &str, message: &str) -> Self {
        Self {
            result: None,
            error: Some(McpError {
                code: code.to_string(),
                message: message.to_string(),
            }),
        }
    }
}

/// MCP error details.
#[derive(Debug, Serialize)]
pub struct McpError {
    /// Error code.
    pub code: String,

    /// Human-readable error message.
    pub message: String,
}

// ============================================================================
// create_task Types
// ============================================================================

/// Complexity estimate parameters.
#[derive(Debug, Deserialize)]
pub struct ComplexityParams {
    /// Estimated level: "low", "medium", or "high".
    pub level: String,

    /// Optional notes explaining the estimate.
    #[serde(default)]
    pub notes: Option<String>,
}

/// Parameters for create_task.
#[derive(Debug, Deserialize)]
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

    /// Whether the task sits on the critical path.
    #[serde(default)]
    pub critical_path: bool,

    /// Optional complexity estimate.
    #[serde(default)]
    pub estimated_complexity: Option<ComplexityParams>,
}

/// Result of create_task.
#[derive(Debug, Serialize)]
pub struct CreateTaskResult {
    pub task_id: String,
    pub status: String,
}

// ============================================================================
// decompose_task Types
// ============================================================================

/// One subtask in a decompose_task request.
#[derive(Debug, Deserialize)]
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

/// Parameters for decompose_task.
#[derive(Debug, Deserialize)]
pub struct DecomposeTaskParams {
    /// Task ID to decompose.
    pub task_id: String,

    /// Subtasks to create.
    pub subtasks: Vec<SubtaskParams>,
}

/// Result of decompose_task.
#[derive(Debug, Serialize)]
pub struct DecomposeTaskResult {
    pub task_id: String,
    pub subtask_ids: Vec<String>,
}

// ============================================================================
// update_task Types
// ============================================================================

/// Parameters for update_task.
#[derive(Debug, Deserialize)]
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

/// Result of update_task.
#[derive(Debug, Serialize)]
pub struct UpdateTaskResult {
    pub task_id: String,
    pub status: String,
}

// ============================================================================
// set_task_status Types
// ============================================================================

/// Parameters for set_task_status.
#[derive(Debug, Deserialize)]
pub struct SetTaskStatusParams {
    /// Task ID to transition.
    pub task_id: String,

    /// Target status: "todo", "in-progress", "done", or "failed".
    pub status: String,
}

/// Result of set_task_status.
#[derive(Debug, Serialize)]
pub struct SetTaskStatusResult {
    pub task_id: String,
    pub old_status: String,
    pub new_status: String,
}

// ============================================================================
// get_task_info Types
// ============================================================================

/// Parameters for get_task_info.
#[derive(Debug, Deserialize)]
pub struct GetTaskInfoParams {
    /// Task ID to retrieve.
    pub task_id: String,
}

/// Result of get_task_info, serialized straight from the store.
#[derive(Debug, Serialize)]
pub struct GetTaskInfoResult {
    /// The requested task record.
    pub task: Task,

    /// Every task in the same dependency tree, in discovery order.
    pub tree: Vec<Task>,

    /// Incomplete tasks of the tree in execution order.
    pub next_up: Vec<Task>,
}

// ============================================================================
// get_current_task Types
// ============================================================================

/// Parameters for get_current_task (none required).
#[derive(Debug, Deserialize, Default)]
pub struct GetCurrentTaskParams {}

/// Result of get_current_task.
#[derive(Debug, Serialize)]
pub struct GetCurrentTaskResult {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub task_id: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub task: Option<Task>,
}
