//! Prometheus metrics collection and formatting.
//!
//! This module provides metrics in Prometheus text exposition format.

use std::fmt::Write;
use std::sync::Arc;

use tasktree_core::TaskStatus;

use crate::state::AppState;

/// Collect all metrics from AppState and format as Prometheus text.
pub async fn collect_metrics(state: &Arc<AppState>) -> String {
    let mut output = String::new();

    collect_task_metrics(state, &mut output).await;

    output
}

/// Collect task metrics by status.
async fn collect_task_metrics(state: &Arc<AppState>, output: &mut String) {
    let store = state.store.read().await;

    // Count tasks by status
    let mut todo = 0u64;
    let mut in_progress = 0u64;
    let mut done = 0u64;
    let mut failed = 0u64;
    let mut critical = 0u64;

    for task in store.tasks() {
        match task.status {
            TaskStatus::Todo => todo += 1,
            TaskStatus::InProgress => in_progress += 1,
            TaskStatus::Done => done += 1,
            TaskStatus::Failed => failed += 1,
        }
        if task.critical_path {
            critical += 1;
        }
    }

    // Write Prometheus format
    writeln!(
        output,
        "# HELP tasktree_tasks_total Total number of tasks by status"
    )
    .ok();
    writeln!(output, "# TYPE tasktree_tasks_total gauge").ok();
    writeln!(output, "tasktree_tasks_total{{status=\"todo\"}} {todo}").ok();
    writeln!(
        output,
        "tasktree_tasks_total{{status=\"in-progress\"}} {in_progress}"
    )
    .ok();
    writeln!(output, "tasktree_tasks_total{{status=\"done\"}} {done}").ok();
    writeln!(output, "tasktree_tasks_total{{status=\"failed\"}} {failed}").ok();

    writeln!(output).ok();
    writeln!(
        output,
        "# HELP tasktree_tasks_critical_path Number of tasks flagged critical-path"
    )
    .ok();
    writeln!(output, "# TYPE tasktree_tasks_critical_path gauge").ok();
    writeln!(output, "tasktree_tasks_critical_path {critical}").ok();
}

#[cfg(test)]
mod tests {
    use super::*;
    use tasktree_core::{Task, TaskStatus};

    #[tokio::test]
    async fn test_collect_metrics_empty_state() {
        let state = AppState::new();
        let output = collect_metrics(&state).await;

        assert!(output.contains("tasktree_tasks_total"));
        assert!(output.contains("tasktree_tasks_total{status=\"todo\"} 0"));
        assert!(output.contains("tasktree_tasks_critical_path 0"));
    }

    #[tokio::test]
    async fn test_collect_metrics_counts_statuses() {
        let state = AppState::new();
        {
            let mut store = state.store.write().await;
            let mut done = Task::new("done", "", "", "test").with_critical_path(true);
            done.status = TaskStatus::Done;
            store.set(done.id.clone(), done);

            let todo = Task::new("todo", "", "", "test");
            store.set(todo.id.clone(), todo);
        }

        let output = collect_metrics(&state).await;
        assert!(output.contains("tasktree_tasks_total{status=\"todo\"} 1"));
        assert!(output.contains("tasktree_tasks_total{status=\"done\"} 1"));
        assert!(output.contains("tasktree_tasks_total{status=\"in-progress\"} 0"));
        assert!(output.contains("tasktree_tasks_critical_path 1"));
    }
}
