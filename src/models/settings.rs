//! Solver heuristics settings.

use serde::{Deserialize, Serialize};

/// How workload deviation is turned into a penalty.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum BalanceMode {
    /// One squared-distance penalty per agent.
    #[default]
    Quadratic,
    /// A single penalty over the summed per-agent distances, expressed
    /// as a percentage of the domain.
    AggregateLinear,
}

/// Weight multipliers for each soft goal.
///
/// All weights are non-negative. A weight of 0 disables the goal while
/// still creating its variables, so score reports stay uniform.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Multiplier applied to agent tag preferences.
    pub weight_tags: i64,
    /// Multiplier for the equal-hours (relative to availability) goal.
    pub weight_equal_hours: i64,
    /// Multiplier for the equal-task-count goal.
    pub weight_equal_task_count: i64,
    /// Penalty shape used by both balance goals.
    pub balance_mode: BalanceMode,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            weight_tags: 1,
            weight_equal_hours: 10,
            weight_equal_task_count: 10,
            balance_mode: BalanceMode::Quadratic,
        }
    }
}

impl Settings {
    /// Settings with every goal disabled.
    pub fn disabled() -> Self {
        Self {
            weight_tags: 0,
            weight_equal_hours: 0,
            weight_equal_task_count: 0,
            balance_mode: BalanceMode::Quadratic,
        }
    }

    /// Sets the tag preference multiplier.
    pub fn with_weight_tags(mut self, weight: i64) -> Self {
        self.weight_tags = weight;
        self
    }

    /// Sets the equal-hours multiplier.
    pub fn with_weight_equal_hours(mut self, weight: i64) -> Self {
        self.weight_equal_hours = weight;
        self
    }

    /// Sets the equal-task-count multiplier.
    pub fn with_weight_equal_task_count(mut self, weight: i64) -> Self {
        self.weight_equal_task_count = weight;
        self
    }

    /// Sets the balance penalty shape.
    pub fn with_balance_mode(mut self, mode: BalanceMode) -> Self {
        self.balance_mode = mode;
        self
    }
}
