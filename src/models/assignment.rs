//! Agent/task assignment.
//!
//! The same type serves two lists with different semantics: fixed
//! assignments (hard constraints) and the last solution (advisory,
//! overwritten on every completed search).

use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

/// An agent assigned to a task, both referenced by name.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Assignment {
    /// Agent name.
    pub agent: String,
    /// Task name.
    pub task: String,
}

impl Assignment {
    /// Creates a new assignment.
    pub fn new(agent: impl Into<String>, task: impl Into<String>) -> Self {
        Self {
            agent: agent.into(),
            task: task.into(),
        }
    }
}

/// Assignments order by task first, then agent.
impl Ord for Assignment {
    fn cmp(&self, other: &Self) -> Ordering {
        self.task
            .cmp(&other.task)
            .then_with(|| self.agent.cmp(&other.agent))
    }
}

impl PartialOrd for Assignment {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}
