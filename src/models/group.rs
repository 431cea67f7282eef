//! Task groups (combinations).
//!
//! A group earns a bonus when every one of its tasks lands on the same
//! agent. Membership is stored by task name, never by reference.

use serde::{Deserialize, Serialize};

/// A set of tasks we'd like to see assigned to a single agent.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskGroup {
    /// Member task names, in order.
    pub tasks: Vec<String>,
    /// Bonus earned when all members share an agent.
    #[serde(default = "default_weight")]
    pub weight: i64,
}

fn default_weight() -> i64 {
    1
}

impl TaskGroup {
    /// Creates a group with weight 1.
    pub fn new<I, S>(tasks: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            tasks: tasks.into_iter().map(Into::into).collect(),
            weight: 1,
        }
    }

    /// Sets the bonus weight.
    pub fn with_weight(mut self, weight: i64) -> Self {
        self.weight = weight;
        self
    }

    /// Whether the group contains the given task.
    pub fn contains(&self, task: &str) -> bool {
        self.tasks.iter().any(|t| t == task)
    }

    /// Whether the group shares at least one task with `tasks`.
    pub fn overlaps<S: AsRef<str>>(&self, tasks: &[S]) -> bool {
        tasks.iter().any(|t| self.contains(t.as_ref()))
    }

    /// Model name of the group's bonus variable.
    pub fn name(&self) -> String {
        format!("assign_multiple_{}", self.tasks.join("_and_"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_group_name() {
        let group = TaskGroup::new(["A", "B", "C"]).with_weight(10);
        assert_eq!(group.name(), "assign_multiple_A_and_B_and_C");
        assert_eq!(group.weight, 10);
    }

    #[test]
    fn test_group_overlaps() {
        let group = TaskGroup::new(["A", "B"]);
        assert!(group.contains("A"));
        assert!(group.overlaps(&["B", "C"]));
        assert!(!group.overlaps(&["C", "D"]));
    }
}
