//! Assignment quality metrics (KPIs).
//!
//! Computes workload statistics from a solved assignment.
//!
//! # Metrics
//!
//! | Metric | Definition |
//! |--------|-----------|
//! | Load | Sum of assigned task minutes per agent |
//! | Task count | Number of assigned tasks per agent |
//! | Mean | Average over agents |
//! | Std dev | Population standard deviation over agents |
//! | Max deviation | Largest pairwise difference between agents |
//! | Load ratio | Load relative to availability-weighted share |
//!
//! # Reference
//! Pinedo (2016), "Scheduling", Ch. 1.2: Performance Measures

use serde::Serialize;

use crate::models::{Assignment, Session};

/// Workload of one agent.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AgentLoad {
    /// Agent name.
    pub agent: String,
    /// Assigned minutes.
    pub units: i64,
    /// Assigned tasks.
    pub tasks: usize,
    /// Assigned minutes divided by the agent's availability-weighted
    /// share of the total (1.0 is a perfect fit).
    pub load_ratio: f64,
}

/// Summary statistics over agents.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Spread {
    /// Mean value.
    pub mean: f64,
    /// Population standard deviation.
    pub std_dev: f64,
    /// Largest minus smallest value.
    pub max_deviation: f64,
}

impl Spread {
    fn of(values: &[f64]) -> Self {
        if values.is_empty() {
            return Self {
                mean: 0.0,
                std_dev: 0.0,
                max_deviation: 0.0,
            };
        }
        let n = values.len() as f64;
        let mean = values.iter().sum::<f64>() / n;
        let variance = values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / n;
        let max = values.iter().copied().fold(f64::NEG_INFINITY, f64::max);
        let min = values.iter().copied().fold(f64::INFINITY, f64::min);
        Self {
            mean,
            std_dev: variance.sqrt(),
            max_deviation: max - min,
        }
    }
}

/// Assignment performance indicators.
#[derive(Debug, Clone, Serialize)]
pub struct AssignmentKpi {
    /// Total task minutes in the session.
    pub total_units: i64,
    /// Per-agent workload, in session order.
    pub loads: Vec<AgentLoad>,
    /// Spread of assigned minutes.
    pub units: Spread,
    /// Spread of task counts.
    pub tasks: Spread,
    /// Tasks with no assignment.
    pub unassigned: Vec<String>,
}

impl AssignmentKpi {
    /// Computes KPIs for a solution of a session.
    ///
    /// Assignments naming unknown agents or tasks are ignored.
    pub fn calculate(session: &Session, assignments: &[Assignment]) -> Self {
        let total_units = session.total_units();
        let total_availability = session.total_availability();

        let loads: Vec<AgentLoad> = session
            .agents
            .iter()
            .map(|agent| {
                let (units, tasks) = assignments
                    .iter()
                    .filter(|a| a.agent == agent.name)
                    .filter_map(|a| session.task(&a.task))
                    .fold((0, 0), |(units, count), task| (units + task.units(), count + 1));
                let share = if total_availability > 0 {
                    total_units as f64 * agent.availability as f64 / total_availability as f64
                } else {
                    0.0
                };
                let load_ratio = if share > 0.0 {
                    units as f64 / share
                } else {
                    0.0
                };
                AgentLoad {
                    agent: agent.name.clone(),
                    units,
                    tasks,
                    load_ratio,
                }
            })
            .collect();

        let unassigned = session
            .tasks
            .iter()
            .filter(|t| !assignments.iter().any(|a| a.task == t.name))
            .map(|t| t.name.clone())
            .collect();

        let units: Vec<f64> = loads.iter().map(|l| l.units as f64).collect();
        let tasks: Vec<f64> = loads.iter().map(|l| l.tasks as f64).collect();
        Self {
            total_units,
            units: Spread::of(&units),
            tasks: Spread::of(&tasks),
            loads,
            unassigned,
        }
    }

    /// Whether the workload spread stays within the given bounds.
    pub fn meets_thresholds(&self, max_unit_deviation: f64, max_task_deviation: f64) -> bool {
        self.units.max_deviation <= max_unit_deviation
            && self.tasks.max_deviation <= max_task_deviation
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Agent, Task};

    fn session() -> Session {
        Session::new()
            .with_agent(Agent::new("a"))
            .with_agent(Agent::new("b"))
            .with_task(Task::new("1").with_duration_hours(1.0))
            .with_task(Task::new("2").with_duration_hours(1.0))
            .with_task(Task::new("3").with_duration_hours(2.0))
    }

    #[test]
    fn test_kpi_balanced() {
        let assignments = vec![
            Assignment::new("a", "1"),
            Assignment::new("a", "2"),
            Assignment::new("b", "3"),
        ];
        let kpi = AssignmentKpi::calculate(&session(), &assignments);
        assert_eq!(kpi.total_units, 240);
        assert_eq!(kpi.loads[0].units, 120);
        assert_eq!(kpi.loads[0].tasks, 2);
        assert_eq!(kpi.loads[1].units, 120);
        assert!((kpi.units.mean - 120.0).abs() < 1e-10);
        assert!(kpi.units.std_dev.abs() < 1e-10);
        assert!((kpi.tasks.max_deviation - 1.0).abs() < 1e-10);
        assert!((kpi.loads[1].load_ratio - 1.0).abs() < 1e-10);
        assert!(kpi.unassigned.is_empty());
        assert!(kpi.meets_thresholds(0.0, 1.0));
    }

    #[test]
    fn test_kpi_unbalanced() {
        let assignments = vec![
            Assignment::new("a", "1"),
            Assignment::new("a", "2"),
            Assignment::new("a", "3"),
        ];
        let kpi = AssignmentKpi::calculate(&session(), &assignments);
        // Loads 240 and 0: mean 120, population std dev 120.
        assert!((kpi.units.std_dev - 120.0).abs() < 1e-10);
        assert!((kpi.units.max_deviation - 240.0).abs() < 1e-10);
        assert!(!kpi.meets_thresholds(60.0, 3.0));
    }

    #[test]
    fn test_kpi_unassigned_and_empty() {
        let kpi = AssignmentKpi::calculate(&session(), &[Assignment::new("a", "1")]);
        assert_eq!(kpi.unassigned, vec!["2".to_string(), "3".to_string()]);

        let empty = AssignmentKpi::calculate(&Session::new(), &[]);
        assert!(empty.loads.is_empty());
        assert_eq!(empty.units.mean, 0.0);
    }
}
