//! Complexity estimates attached to tasks at creation time.

use serde::{Deserialize, Serialize};

/// Rough complexity level for a task.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ComplexityLevel {
    /// Small, well-understood unit of work.
    Low,
    /// Non-trivial but executable as a single unit.
    Medium,
    /// Too large to execute directly; must be decomposed first.
    High,
}

/// Structured complexity estimate, optionally set at task creation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComplexityEstimate {
    /// Estimated level.
    pub level: ComplexityLevel,

    /// Optional free-form notes explaining the estimate.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

impl ComplexityEstimate {
    /// Create an estimate with just a level.
    pub fn new(level: ComplexityLevel) -> Self {
        Self { level, notes: None }
    }

    /// Builder method to attach notes.
    pub fn with_notes(mut self, notes: impl Into<String>) -> Self {
        self.notes = Some(notes.into());
        self
    }

    /// Returns true if the task must be decomposed into subtasks before it
    /// may enter `in-progress`.
    pub fn requires_decomposition(&self) -> bool {
        matches!(self.level, ComplexityLevel::High)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decomposition_gate() {
        assert!(!ComplexityEstimate::new(ComplexityLevel::Low).requires_decomposition());
        assert!(!ComplexityEstimate::new(ComplexityLevel::Medium).requires_decomposition());
        assert!(ComplexityEstimate::new(ComplexityLevel::High).requires_decomposition());
    }

    #[test]
    fn test_wire_names() {
        let estimate = ComplexityEstimate::new(ComplexityLevel::High).with_notes("many unknowns");
        let json = serde_json::to_value(&estimate).unwrap();
        assert_eq!(json["level"], "high");
        assert_eq!(json["notes"], "many unknowns");
    }
}
