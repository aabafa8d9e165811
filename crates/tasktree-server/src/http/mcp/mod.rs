//! MCP (Model Context Protocol) HTTP tools.
//!
//! Legacy plain-JSON variant of the MCP surface:
//! - `create_task` - Create a new task
//! - `decompose_task` - Split a task into subtasks
//! - `update_task` - Append detail or dependencies
//! - `set_task_status` - Transition a task's lifecycle
//! - `get_task_info` - Task record, dependency tree, execution order
//! - `get_current_task` - The current in-progress task

mod tools;
mod types;

pub use tools::{
    create_task, decompose_task, get_current_task, get_task_info, set_task_status, update_task,
};
