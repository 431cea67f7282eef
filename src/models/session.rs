//! Session (context) aggregate.
//!
//! A session owns every agent, task, fixed assignment and group, plus the
//! settings and the last solution. The editing layer mutates it; the model
//! builder only ever reads it, and the solution is the one field written
//! back after a search.

use serde::{Deserialize, Serialize};

use super::{Agent, Assignment, Settings, Task, TaskGroup};
use crate::error::{Error, Result};
use crate::validation::validate_session;

/// Everything needed to run a solve.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Session {
    /// Agents, in display order.
    pub agents: Vec<Agent>,
    /// Tasks, in display order.
    pub tasks: Vec<Task>,
    /// Fixed assignments (hard constraints).
    pub assignments: Vec<Assignment>,
    /// Task groups (co-assignment bonuses).
    pub groups: Vec<TaskGroup>,
    /// Soft-goal weights.
    pub settings: Settings,
    /// Most recent search result.
    pub solution: Vec<Assignment>,
}

impl Session {
    /// Creates an empty session.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds an agent.
    pub fn with_agent(mut self, agent: Agent) -> Self {
        self.agents.push(agent);
        self
    }

    /// Adds a task.
    pub fn with_task(mut self, task: Task) -> Self {
        self.tasks.push(task);
        self
    }

    /// Adds a fixed assignment without replacing earlier ones.
    ///
    /// Unlike [`Session::assign`], this keeps conflicting entries so the
    /// solve can report them as infeasible.
    pub fn with_assignment(mut self, agent: impl Into<String>, task: impl Into<String>) -> Self {
        self.assignments.push(Assignment::new(agent, task));
        self
    }

    /// Adds a task group.
    pub fn with_group(mut self, group: TaskGroup) -> Self {
        self.groups.push(group);
        self
    }

    /// Sets the soft-goal weights.
    pub fn with_settings(mut self, settings: Settings) -> Self {
        self.settings = settings;
        self
    }

    /// Finds an agent by name.
    pub fn agent(&self, name: &str) -> Option<&Agent> {
        self.agents.iter().find(|a| a.name == name)
    }

    /// Finds a task by name.
    pub fn task(&self, name: &str) -> Option<&Task> {
        self.tasks.iter().find(|t| t.name == name)
    }

    /// Whether there is anything to solve.
    pub fn can_solve(&self) -> bool {
        !self.agents.is_empty() && !self.tasks.is_empty()
    }

    /// Sum of task durations in model units.
    pub fn total_units(&self) -> i64 {
        self.tasks.iter().map(Task::units).sum()
    }

    /// Sum of agent availabilities.
    pub fn total_availability(&self) -> i64 {
        self.agents.iter().map(|a| a.availability).sum()
    }

    /// Appends an agent.
    pub fn add_agent(&mut self, agent: Agent) {
        self.agents.push(agent);
    }

    /// Appends a task.
    pub fn add_task(&mut self, task: Task) {
        self.tasks.push(task);
    }

    /// Removes an agent and every assignment that references it.
    pub fn remove_agent(&mut self, name: &str) -> Option<Agent> {
        let index = self.agents.iter().position(|a| a.name == name)?;
        let agent = self.agents.remove(index);
        self.assignments.retain(|a| a.agent != name);
        self.solution.retain(|a| a.agent != name);
        Some(agent)
    }

    /// Removes a task, its assignments and its group memberships.
    ///
    /// Groups left empty are deleted.
    pub fn remove_task(&mut self, name: &str) -> Option<Task> {
        let index = self.tasks.iter().position(|t| t.name == name)?;
        let task = self.tasks.remove(index);
        self.assignments.retain(|a| a.task != name);
        self.solution.retain(|a| a.task != name);
        for group in &mut self.groups {
            group.tasks.retain(|t| t != name);
        }
        self.groups.retain(|g| !g.tasks.is_empty());
        Some(task)
    }

    /// Pins a task to an agent, replacing any previous pin of that task.
    pub fn assign(&mut self, agent: impl Into<String>, task: impl Into<String>) {
        let task = task.into();
        self.unassign(&task);
        self.assignments.push(Assignment::new(agent, task));
    }

    /// Removes any fixed assignment of a task.
    pub fn unassign(&mut self, task: &str) {
        self.assignments.retain(|a| a.task != task);
    }

    /// Adds a group, first removing existing groups that share a task with it.
    pub fn add_group(&mut self, group: TaskGroup) {
        self.groups.retain(|g| !g.overlaps(&group.tasks));
        self.groups.push(group);
    }

    /// Removes a group. Returns `false` if it was not present.
    pub fn remove_group(&mut self, group: &TaskGroup) -> bool {
        match self.groups.iter().position(|g| g == group) {
            Some(index) => {
                self.groups.remove(index);
                true
            }
            None => false,
        }
    }

    /// Replaces the last solution.
    pub fn set_solution(&mut self, solution: Vec<Assignment>) {
        self.solution = solution;
    }

    /// Agent the last solution gave a task to.
    pub fn solved_agent_for(&self, task: &str) -> Option<&str> {
        self.solution
            .iter()
            .find(|a| a.task == task)
            .map(|a| a.agent.as_str())
    }

    /// A placeholder assignment for display before any solve: each task
    /// goes to its pinned agent, or to the first agent.
    pub fn default_assignments(&self) -> Vec<Assignment> {
        let Some(first) = self.agents.first() else {
            return Vec::new();
        };
        self.tasks
            .iter()
            .map(|task| {
                let agent = self
                    .assignments
                    .iter()
                    .find(|a| a.task == task.name)
                    .map(|a| a.agent.as_str())
                    .unwrap_or(&first.name);
                Assignment::new(agent, &task.name)
            })
            .collect()
    }

    /// First `{prefix}N` (N ≥ 1) not used by any agent.
    pub fn unique_agent_name(&self, prefix: &str) -> String {
        unique_name(prefix, |name| self.agent(name).is_some())
    }

    /// First `{prefix}N` (N ≥ 1) not used by any task.
    pub fn unique_task_name(&self, prefix: &str) -> String {
        unique_name(prefix, |name| self.task(name).is_some())
    }

    /// Parses and validates a JSON session document.
    pub fn from_json(json: &str) -> Result<Self> {
        let session: Session = serde_json::from_str(json)?;
        validate_session(&session).map_err(Error::InvalidSession)?;
        Ok(session)
    }

    /// Serializes the session to pretty-printed JSON.
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

fn unique_name(prefix: &str, taken: impl Fn(&str) -> bool) -> String {
    (1..)
        .map(|n| format!("{prefix}{n}"))
        .find(|name| !taken(name))
        .unwrap_or_else(|| prefix.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_session() -> Session {
        Session::new()
            .with_agent(Agent::new("artist1"))
            .with_agent(Agent::new("artist2"))
            .with_task(Task::new("0010").with_duration_hours(1.0))
            .with_task(Task::new("0020").with_duration_hours(2.0))
            .with_task(Task::new("0030").with_duration_hours(3.0))
    }

    #[test]
    fn test_totals() {
        let s = sample_session();
        assert_eq!(s.total_units(), 360);
        assert_eq!(s.total_availability(), 200);
        assert!(s.can_solve());
        assert!(!Session::new().can_solve());
    }

    #[test]
    fn test_assign_replaces_previous_pin() {
        let mut s = sample_session();
        s.assign("artist1", "0010");
        s.assign("artist2", "0010");
        assert_eq!(s.assignments, vec![Assignment::new("artist2", "0010")]);

        s.unassign("0010");
        assert!(s.assignments.is_empty());
    }

    #[test]
    fn test_remove_agent_cascades() {
        let mut s = sample_session();
        s.assign("artist1", "0010");
        s.assign("artist2", "0020");
        s.set_solution(vec![
            Assignment::new("artist1", "0010"),
            Assignment::new("artist2", "0020"),
        ]);

        let removed = s.remove_agent("artist1").unwrap();
        assert_eq!(removed.name, "artist1");
        assert_eq!(s.agents.len(), 1);
        assert_eq!(s.assignments, vec![Assignment::new("artist2", "0020")]);
        assert_eq!(s.solution, vec![Assignment::new("artist2", "0020")]);
        assert!(s.remove_agent("artist1").is_none());
    }

    #[test]
    fn test_remove_task_cascades_into_groups() {
        let mut s = sample_session()
            .with_group(TaskGroup::new(["0010", "0020"]))
            .with_group(TaskGroup::new(["0010"]));
        s.assign("artist1", "0010");

        s.remove_task("0010").unwrap();

        assert_eq!(s.tasks.len(), 2);
        assert!(s.assignments.is_empty());
        // The single-member group became empty and was deleted.
        assert_eq!(s.groups, vec![TaskGroup::new(["0020"])]);
    }

    #[test]
    fn test_add_group_breaks_conflicting_groups() {
        let mut s = sample_session();
        s.add_group(TaskGroup::new(["0010", "0020"]));
        assert_eq!(s.groups, vec![TaskGroup::new(["0010", "0020"])]);

        s.add_group(TaskGroup::new(["0020", "0030"]));
        assert_eq!(s.groups, vec![TaskGroup::new(["0020", "0030"])]);
    }

    #[test]
    fn test_remove_group() {
        let mut s = sample_session();
        let group = TaskGroup::new(["0010", "0020"]);
        s.add_group(group.clone());
        assert!(s.remove_group(&group));
        assert!(s.groups.is_empty());
        assert!(!s.remove_group(&group));
    }

    #[test]
    fn test_unique_names() {
        let s = sample_session().with_agent(Agent::new("Agent1"));
        assert_eq!(s.unique_agent_name("Agent"), "Agent2");
        assert_eq!(s.unique_task_name("Task"), "Task1");
    }

    #[test]
    fn test_default_assignments() {
        let mut s = sample_session();
        s.assign("artist2", "0020");
        let defaults = s.default_assignments();
        assert_eq!(
            defaults,
            vec![
                Assignment::new("artist1", "0010"),
                Assignment::new("artist2", "0020"),
                Assignment::new("artist1", "0030"),
            ]
        );
        assert!(Session::new().default_assignments().is_empty());
    }

    #[test]
    fn test_json_round_trip_keeps_names() {
        let mut s = sample_session().with_group(TaskGroup::new(["0010", "0020"]).with_weight(5));
        s.assign("artist1", "0030");
        let json = s.to_json().unwrap();
        let loaded = Session::from_json(&json).unwrap();
        assert_eq!(loaded, s);
    }

    #[test]
    fn test_from_json_rejects_unknown_reference() {
        let json = r#"{
            "agents": [{"id": "a", "name": "a"}],
            "tasks": [{"id": "t", "name": "t", "duration_ms": 3600000}],
            "assignments": [{"agent": "ghost", "task": "t"}]
        }"#;
        let err = Session::from_json(json).unwrap_err();
        assert!(matches!(err, Error::InvalidSession(_)));
    }
}
