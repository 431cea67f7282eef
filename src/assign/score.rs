//! Soft terms and score breakdowns.

use serde::{Deserialize, Serialize};

use crate::cp::{CpSolution, VarId};

/// A weighted variable in the maximized objective.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SoftTerm {
    /// Unique, human-readable name.
    pub name: String,
    /// Scored variable (boolean or integer).
    pub var: VarId,
    /// Objective coefficient.
    pub weight: i64,
}

impl SoftTerm {
    /// Creates a soft term.
    pub fn new(name: impl Into<String>, var: VarId, weight: i64) -> Self {
        Self {
            name: name.into(),
            var,
            weight,
        }
    }

    /// Evaluates the term against a solution.
    pub fn score(&self, solution: &CpSolution) -> Score {
        Score {
            name: self.name.clone(),
            value: solution.value(self.var) * self.weight,
            weight: self.weight,
        }
    }
}

/// Contribution of one soft term to a solution's objective.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Score {
    /// Soft term name.
    pub name: String,
    /// Variable value times weight.
    pub value: i64,
    /// Weight.
    pub weight: i64,
}

/// Scores of one solution, split into opportunities taken and missed.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ScoreBreakdown {
    scores: Vec<Score>,
}

impl ScoreBreakdown {
    /// Sorts scores by name, then by contribution.
    pub fn new(mut scores: Vec<Score>) -> Self {
        scores.sort_by(|a, b| a.name.cmp(&b.name).then(a.value.cmp(&b.value)));
        Self { scores }
    }

    /// Sum of all contributions.
    pub fn total(&self) -> i64 {
        self.scores.iter().map(|s| s.value).sum()
    }

    /// Terms that earned something.
    pub fn taken(&self) -> impl Iterator<Item = &Score> {
        self.scores.iter().filter(|s| s.value > 0)
    }

    /// Terms that earned nothing or cost something.
    pub fn missed(&self) -> impl Iterator<Item = &Score> {
        self.scores.iter().filter(|s| s.value <= 0)
    }

    /// All scores.
    pub fn scores(&self) -> &[Score] {
        &self.scores
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn score(name: &str, value: i64) -> Score {
        Score {
            name: name.into(),
            value,
            weight: value.signum(),
        }
    }

    #[test]
    fn test_breakdown_split() {
        let breakdown = ScoreBreakdown::new(vec![
            score("b_tags", 5),
            score("a_hours_deviation_cost", -40),
            score("c_group", 0),
        ]);
        assert_eq!(breakdown.total(), -35);
        assert_eq!(breakdown.taken().count(), 1);
        let missed: Vec<&str> = breakdown.missed().map(|s| s.name.as_str()).collect();
        assert_eq!(missed, vec!["a_hours_deviation_cost", "c_group"]);
    }

    #[test]
    fn test_soft_term_score() {
        let term = SoftTerm::new("x", VarId(1), -3);
        let solution = CpSolution::new(vec![0, 4], -12);
        assert_eq!(
            term.score(&solution),
            Score {
                name: "x".into(),
                value: -12,
                weight: -3
            }
        );
    }
}
