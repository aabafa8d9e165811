//! Status enum and transition rules for Tasks.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Status of a Task.
///
/// A task moves forward through its lifecycle; the single allowed backward
/// edge is `Done -> InProgress`, used when finished work needs rework.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum TaskStatus {
    /// Task created but not yet started.
    #[default]
    Todo,
    /// Task is actively being worked on.
    InProgress,
    /// Task finished successfully.
    Done,
    /// Task finished unsuccessfully.
    Failed,
}

impl TaskStatus {
    /// Returns true if the task is finished, successfully or not.
    ///
    /// Finished tasks impose no ordering constraints on their dependents.
    pub fn is_complete(&self) -> bool {
        matches!(self, Self::Done | Self::Failed)
    }

    /// Returns true if the task still needs work (todo or in-progress).
    pub fn is_incomplete(&self) -> bool {
        !self.is_complete()
    }

    /// Returns true if moving from `self` to `next` is a legal transition.
    ///
    /// Forward moves may skip intermediate states; `Done -> InProgress` is
    /// the rework edge. `Failed` is terminal.
    pub fn can_transition_to(&self, next: TaskStatus) -> bool {
        match (self, next) {
            (Self::Todo, Self::InProgress | Self::Done | Self::Failed) => true,
            (Self::InProgress, Self::Done | Self::Failed) => true,
            (Self::Done, Self::InProgress) => true,
            _ => false,
        }
    }
}

impl fmt::Display for TaskStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Todo => "todo",
            Self::InProgress => "in-progress",
            Self::Done => "done",
            Self::Failed => "failed",
        };
        write!(f, "{}", s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_completion_predicates() {
        assert!(TaskStatus::Done.is_complete());
        assert!(TaskStatus::Failed.is_complete());
        assert!(TaskStatus::Todo.is_incomplete());
        assert!(TaskStatus::InProgress.is_incomplete());
    }

    #[test]
    fn test_forward_transitions() {
        assert!(TaskStatus::Todo.can_transition_to(TaskStatus::InProgress));
        assert!(TaskStatus::Todo.can_transition_to(TaskStatus::Done));
        assert!(TaskStatus::Todo.can_transition_to(TaskStatus::Failed));
        assert!(TaskStatus::InProgress.can_transition_to(TaskStatus::Done));
        assert!(TaskStatus::InProgress.can_transition_to(TaskStatus::Failed));
    }

    #[test]
    fn test_rework_edge() {
        assert!(TaskStatus::Done.can_transition_to(TaskStatus::InProgress));
        assert!(!TaskStatus::Done.can_transition_to(TaskStatus::Todo));
    }

    #[test]
    fn test_failed_is_terminal() {
        assert!(!TaskStatus::Failed.can_transition_to(TaskStatus::Todo));
        assert!(!TaskStatus::Failed.can_transition_to(TaskStatus::InProgress));
        assert!(!TaskStatus::Failed.can_transition_to(TaskStatus::Done));
    }

    #[test]
    fn test_no_self_transition() {
        assert!(!TaskStatus::InProgress.can_transition_to(TaskStatus::InProgress));
        assert!(!TaskStatus::Done.can_transition_to(TaskStatus::Done));
    }

    #[test]
    fn test_wire_names() {
        let json = serde_json::to_string(&TaskStatus::InProgress).unwrap();
        assert_eq!(json, "\"in-progress\"");
        let parsed: TaskStatus = serde_json::from_str("\"done\"").unwrap();
        assert_eq!(parsed, TaskStatus::Done);
    }
}
