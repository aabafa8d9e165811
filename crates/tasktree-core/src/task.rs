//! The Task record.

use crate::{ComplexityEstimate, CoreError, TaskId, TaskStatus};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A Task is a unit of work with an identifier, status, and dependency list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Task {
    /// Unique task identifier, assigned at creation, immutable.
    pub id: TaskId,

    /// Short human-readable title.
    pub title: String,

    /// Longer description of the work.
    pub description: String,

    /// What finishing this task achieves.
    pub goal: String,

    /// Current task status.
    pub status: TaskStatus,

    /// Tasks this one cannot start before. Ordered, grows over the task's
    /// life; referenced tasks may not exist yet at read time.
    pub depends_on_task_ids: Vec<TaskId>,

    /// Concrete completion criteria.
    pub definitions_of_done: Vec<String>,

    /// Known unknowns worth resolving during execution.
    pub uncertainty_areas: Vec<String>,

    /// Scheduling tie-break signal. Never affects dependency legality.
    pub critical_path: bool,

    /// Optional complexity estimate; a high estimate gates execution on
    /// decomposition.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub estimated_complexity: Option<ComplexityEstimate>,

    /// Who created this task.
    pub created_by: String,

    /// When the task was created.
    pub created_at: DateTime<Utc>,
}

impl Task {
    /// Create a new Task in `Todo` with a fresh id.
    pub fn new(
        title: impl Into<String>,
        description: impl Into<String>,
        goal: impl Into<String>,
        created_by: impl Into<String>,
    ) -> Self {
        Self {
            id: TaskId::generate(),
            title: title.into(),
            description: description.into(),
            goal: goal.into(),
            status: TaskStatus::Todo,
            depends_on_task_ids: Vec::new(),
            definitions_of_done: Vec::new(),
            uncertainty_areas: Vec::new(),
            critical_path: false,
            estimated_complexity: None,
            created_by: created_by.into(),
            created_at: Utc::now(),
        }
    }

    /// Builder method to set a specific ID (useful for testing).
    pub fn with_id(mut self, id: TaskId) -> Self {
        self.id = id;
        self
    }

    /// Builder method to mark the task as on the critical path.
    pub fn with_critical_path(mut self, critical: bool) -> Self {
        self.critical_path = critical;
        self
    }

    /// Builder method to set the dependency list.
    pub fn with_dependencies(mut self, deps: Vec<TaskId>) -> Self {
        self.depends_on_task_ids = deps;
        self
    }

    /// Builder method to set the complexity estimate.
    pub fn with_complexity(mut self, estimate: ComplexityEstimate) -> Self {
        self.estimated_complexity = Some(estimate);
        self
    }

    /// Builder method to set the definitions of done.
    pub fn with_definitions_of_done(mut self, dod: Vec<String>) -> Self {
        self.definitions_of_done = dod;
        self
    }

    /// Builder method to set the uncertainty areas.
    pub fn with_uncertainty_areas(mut self, areas: Vec<String>) -> Self {
        self.uncertainty_areas = areas;
        self
    }

    /// Append a dependency, skipping ids already listed.
    pub fn add_dependency(&mut self, dep: TaskId) {
        if !self.depends_on_task_ids.contains(&dep) {
            self.depends_on_task_ids.push(dep);
        }
    }

    /// Append additional text to the description.
    pub fn append_description(&mut self, text: &str) {
        if !self.description.is_empty() {
            self.description.push_str("\n\n");
        }
        self.description.push_str(text);
    }

    /// Check if the task is finished (done or failed).
    pub fn is_complete(&self) -> bool {
        self.status.is_complete()
    }

    /// Validate and apply a status transition, returning the old status.
    ///
    /// Rejects illegal moves and refuses to start a task that still needs
    /// decomposition.
    pub fn transition_to(&mut self, next: TaskStatus) -> Result<TaskStatus, CoreError> {
        if !self.status.can_transition_to(next) {
            return Err(CoreError::InvalidStateTransition {
                from: self.status.to_string(),
                to: next.to_string(),
            });
        }
        if next == TaskStatus::InProgress && self.needs_decomposition() {
            return Err(CoreError::DecompositionRequired(self.id.to_string()));
        }
        let old = self.status;
        self.status = next;
        Ok(old)
    }

    /// Returns true if this task must be decomposed before it may start.
    ///
    /// A task counts as decomposed once it has at least one dependency.
    pub fn needs_decomposition(&self) -> bool {
        self.depends_on_task_ids.is_empty()
            && self
                .estimated_complexity
                .as_ref()
                .is_some_and(|c| c.requires_decomposition())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ComplexityLevel;

    #[test]
    fn test_new_task_defaults() {
        let task = Task::new("Write parser", "Parse the input format", "Working parser", "test");
        assert_eq!(task.status, TaskStatus::Todo);
        assert!(task.depends_on_task_ids.is_empty());
        assert!(!task.critical_path);
        assert!(task.estimated_complexity.is_none());
    }

    #[test]
    fn test_add_dependency_skips_duplicates() {
        let mut task = Task::new("a", "", "", "test");
        let dep = TaskId::new("dep-1");
        task.add_dependency(dep.clone());
        task.add_dependency(dep);
        assert_eq!(task.depends_on_task_ids.len(), 1);
    }

    #[test]
    fn test_append_description() {
        let mut task = Task::new("a", "first", "", "test");
        task.append_description("second");
        assert_eq!(task.description, "first\n\nsecond");
    }

    #[test]
    fn test_transition_to() {
        let mut task = Task::new("a", "", "", "test");

        let old = task.transition_to(TaskStatus::InProgress).unwrap();
        assert_eq!(old, TaskStatus::Todo);
        assert_eq!(task.status, TaskStatus::InProgress);

        assert!(matches!(
            task.transition_to(TaskStatus::Todo),
            Err(CoreError::InvalidStateTransition { .. })
        ));
    }

    #[test]
    fn test_transition_to_blocks_undecomposed_start() {
        let mut task = Task::new("big", "", "", "test")
            .with_complexity(ComplexityEstimate::new(ComplexityLevel::High));

        assert!(matches!(
            task.transition_to(TaskStatus::InProgress),
            Err(CoreError::DecompositionRequired(_))
        ));
        assert_eq!(task.status, TaskStatus::Todo);
    }

    #[test]
    fn test_needs_decomposition() {
        let mut task = Task::new("big", "", "", "test")
            .with_complexity(ComplexityEstimate::new(ComplexityLevel::High));
        assert!(task.needs_decomposition());

        task.add_dependency(TaskId::new("sub-1"));
        assert!(!task.needs_decomposition());

        let simple = Task::new("small", "", "", "test")
            .with_complexity(ComplexityEstimate::new(ComplexityLevel::Low));
        assert!(!simple.needs_decomposition());
    }
}
