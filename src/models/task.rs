//! Task (shot) model.
//!
//! A task is a unit of work with a duration and an ordered set of tags.
//! It is assigned to exactly one agent in any solution.
//!
//! # Time Representation
//! Durations are stored in milliseconds. The optimization model works in
//! whole minutes, the smallest granularity the system handles.

use serde::{Deserialize, Serialize};

/// Milliseconds per model unit (one minute).
pub const MS_PER_UNIT: i64 = 60_000;

/// Milliseconds per hour.
pub const MS_PER_HOUR: i64 = 3_600_000;

/// A task to be assigned to an agent.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Task {
    /// Unique task identifier (defaults to the name).
    pub id: String,
    /// Unique human-readable name.
    pub name: String,
    /// Duration in milliseconds. Must be positive.
    pub duration_ms: i64,
    /// Tags, in insertion order, without duplicates.
    #[serde(default)]
    pub tags: Vec<String>,
}

impl Task {
    /// Creates a one-hour task with no tags.
    pub fn new(name: impl Into<String>) -> Self {
        let name = name.into();
        Self {
            id: name.clone(),
            name,
            duration_ms: MS_PER_HOUR,
            tags: Vec::new(),
        }
    }

    /// Sets an identifier distinct from the name.
    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = id.into();
        self
    }

    /// Sets the duration in milliseconds.
    pub fn with_duration_ms(mut self, duration_ms: i64) -> Self {
        self.duration_ms = duration_ms;
        self
    }

    /// Sets the duration in (possibly fractional) hours.
    pub fn with_duration_hours(mut self, hours: f64) -> Self {
        self.duration_ms = (hours * MS_PER_HOUR as f64).round() as i64;
        self
    }

    /// Adds a tag. Tags already present are ignored.
    pub fn with_tag(mut self, tag: impl Into<String>) -> Self {
        let tag = tag.into();
        if !self.has_tag(&tag) {
            self.tags.push(tag);
        }
        self
    }

    /// Whether the task carries the given tag.
    pub fn has_tag(&self, tag: &str) -> bool {
        self.tags.iter().any(|t| t == tag)
    }

    /// Duration in model units (whole minutes, rounded up so that a
    /// valid task never weighs zero).
    #[inline]
    pub fn units(&self) -> i64 {
        (self.duration_ms.max(0) + MS_PER_UNIT - 1) / MS_PER_UNIT
    }

    /// Duration in hours.
    pub fn hours(&self) -> f64 {
        self.duration_ms as f64 / MS_PER_HOUR as f64
    }
}
