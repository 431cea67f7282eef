//! Random session generator.
//!
//! Produces reproducible sessions for demos, benchmarks and randomized
//! tests. Generated sessions always pass validation, and fixed
//! assignments never conflict, so every generated session is solvable.

use rand::prelude::*;
use rand::rngs::StdRng;

use crate::models::{Agent, Session, Settings, Task, TaskGroup, MS_PER_UNIT};

/// Configuration for generating sessions.
#[derive(Debug, Clone)]
pub struct SessionGeneratorConfig {
    /// Number of agents.
    pub num_agents: usize,
    /// Number of tasks.
    pub num_tasks: usize,
    /// Task duration range in minutes (min, max).
    pub duration_range: (i64, i64),
    /// Agent availability range (min, max).
    pub availability_range: (i64, i64),
    /// Tag vocabulary.
    pub tags: Vec<String>,
    /// Tag weight range (min, max).
    pub tag_weight_range: (i64, i64),
    /// Probability that a task is pinned to a random agent.
    pub pinned_fraction: f64,
    /// Number of task groups (disjoint).
    pub num_groups: usize,
    /// Soft-goal weights.
    pub settings: Settings,
}

impl Default for SessionGeneratorConfig {
    fn default() -> Self {
        Self {
            num_agents: 3,
            num_tasks: 6,
            duration_range: (30, 240),
            availability_range: (50, 100),
            tags: ["fx", "anim", "layout", "light"]
                .into_iter()
                .map(String::from)
                .collect(),
            tag_weight_range: (1, 5),
            pinned_fraction: 0.1,
            num_groups: 1,
            settings: Settings::default(),
        }
    }
}

impl SessionGeneratorConfig {
    /// Small sessions the bundled solver proves optimal quickly.
    pub fn small() -> Self {
        Self {
            num_agents: 2,
            num_tasks: 4,
            ..Self::default()
        }
    }

    /// Sessions large enough for the search to run for a long time.
    pub fn large() -> Self {
        Self {
            num_agents: 6,
            num_tasks: 12,
            pinned_fraction: 0.0,
            num_groups: 2,
            ..Self::default()
        }
    }
}

/// Generator for sessions.
pub struct SessionGenerator {
    config: SessionGeneratorConfig,
    rng: StdRng,
}

impl SessionGenerator {
    /// Creates a generator with the given config and seed.
    pub fn new(config: SessionGeneratorConfig, seed: u64) -> Self {
        Self {
            config,
            rng: StdRng::seed_from_u64(seed),
        }
    }

    /// Generates a session.
    pub fn generate(&mut self) -> Session {
        let mut session = Session::new().with_settings(self.config.settings.clone());
        for agent in self.generate_agents() {
            session.add_agent(agent);
        }
        for task in self.generate_tasks() {
            session.add_task(task);
        }
        session.groups = self.generate_groups(&session.tasks);

        if !session.agents.is_empty() {
            for i in 0..session.tasks.len() {
                if self.rng.random_bool(self.config.pinned_fraction.clamp(0.0, 1.0)) {
                    let agent = session.agents[self.rng.random_range(0..session.agents.len())]
                        .name
                        .clone();
                    let task = session.tasks[i].name.clone();
                    session.assign(agent, task);
                }
            }
        }
        session
    }

    fn generate_agents(&mut self) -> Vec<Agent> {
        let (lo, hi) = self.config.availability_range;
        (1..=self.config.num_agents)
            .map(|i| {
                let mut agent =
                    Agent::new(format!("agent{i}")).with_availability(self.rng.random_range(lo..=hi));
                if let Some(tag) = self.config.tags.choose(&mut self.rng) {
                    let (wlo, whi) = self.config.tag_weight_range;
                    agent = agent.with_tag(tag.clone(), self.rng.random_range(wlo..=whi));
                }
                agent
            })
            .collect()
    }

    fn generate_tasks(&mut self) -> Vec<Task> {
        let (lo, hi) = self.config.duration_range;
        (1..=self.config.num_tasks)
            .map(|i| {
                let minutes = self.rng.random_range(lo.max(1)..=hi.max(lo.max(1)));
                let mut task = Task::new(format!("{:04}", i * 10)).with_duration_ms(minutes * MS_PER_UNIT);
                if let Some(tag) = self.config.tags.choose(&mut self.rng) {
                    task = task.with_tag(tag.clone());
                }
                task
            })
            .collect()
    }

    fn generate_groups(&mut self, tasks: &[Task]) -> Vec<TaskGroup> {
        let mut names: Vec<&str> = tasks.iter().map(|t| t.name.as_str()).collect();
        names.shuffle(&mut self.rng);
        names
            .chunks(2)
            .filter(|chunk| chunk.len() == 2)
            .take(self.config.num_groups)
            .map(|chunk| TaskGroup::new(chunk.iter().copied()).with_weight(self.rng.random_range(1..=10)))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::validation::validate_session;

    #[test]
    fn test_generate_is_reproducible() {
        let a = SessionGenerator::new(SessionGeneratorConfig::default(), 42).generate();
        let b = SessionGenerator::new(SessionGeneratorConfig::default(), 42).generate();
        assert_eq!(a, b);
        assert_eq!(a.agents.len(), 3);
        assert_eq!(a.tasks.len(), 6);
    }

    #[test]
    fn test_generated_sessions_are_valid() {
        for seed in 0..20 {
            let session = SessionGenerator::new(SessionGeneratorConfig::default(), seed).generate();
            assert!(validate_session(&session).is_ok(), "seed {seed}");
            // At most one pin per task.
            for task in &session.tasks {
                assert!(session.assignments.iter().filter(|a| a.task == task.name).count() <= 1);
            }
        }
    }

    #[test]
    fn test_large_config() {
        let session = SessionGenerator::new(SessionGeneratorConfig::large(), 7).generate();
        assert_eq!(session.agents.len(), 6);
        assert_eq!(session.tasks.len(), 12);
        assert!(session.assignments.is_empty());
        assert_eq!(session.groups.len(), 2);
    }
}
