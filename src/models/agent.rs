//! Agent (artist) model.
//!
//! An agent is the entity that receives tasks. Each agent has a relative
//! availability used to weight its share of the total workload, and a set
//! of weighted tag preferences used to score agent/task affinity.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Default availability weight for a new agent.
pub const DEFAULT_AVAILABILITY: i64 = 100;

/// An agent that tasks can be assigned to.
///
/// The `name` is the identity key: fixed assignments, groups and
/// solutions all refer to agents by name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Agent {
    /// Unique agent identifier (defaults to the name).
    pub id: String,
    /// Unique human-readable name.
    pub name: String,
    /// Capacity weight relative to other agents (default: 100).
    #[serde(default = "default_availability")]
    pub availability: i64,
    /// Tag preferences: tag name → preference strength.
    #[serde(default)]
    pub tags: BTreeMap<String, i64>,
}

fn default_availability() -> i64 {
    DEFAULT_AVAILABILITY
}

impl Agent {
    /// Creates an agent with default availability and no tags.
    pub fn new(name: impl Into<String>) -> Self {
        let name = name.into();
        Self {
            id: name.clone(),
            name,
            availability: DEFAULT_AVAILABILITY,
            tags: BTreeMap::new(),
        }
    }

    /// Sets an identifier distinct from the name.
    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = id.into();
        self
    }

    /// Sets the availability weight.
    pub fn with_availability(mut self, availability: i64) -> Self {
        self.availability = availability;
        self
    }

    /// Adds (or replaces) a tag preference.
    pub fn with_tag(mut self, tag: impl Into<String>, weight: i64) -> Self {
        self.tags.insert(tag.into(), weight);
        self
    }

    /// Preference weight for a tag, if any.
    pub fn tag_weight(&self, tag: &str) -> Option<i64> {
        self.tags.get(tag).copied()
    }
}
