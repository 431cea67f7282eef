//! Session → constraint model translation.
//!
//! One boolean per (agent, task) pair, exactly one agent per task,
//! fixed assignments pinned, and every soft goal registered as a
//! [`SoftTerm`] so that solutions can be explained term by term.

use std::collections::{BTreeSet, HashMap};

use super::{BalanceEncoder, Score, SoftTerm};
use crate::cp::{CpModel, CpSolution, LinearExpr, VarId};
use crate::error::{Error, ModelError, Result};
use crate::models::{Agent, Assignment, BalanceMode, Session, Task, TaskGroup};
use crate::search::ModelDecoder;
use crate::validation::validate_session;

/// Name of the decision variable for a task/agent pair.
pub fn assignment_variable_name(task: &str, agent: &str) -> String {
    format!("assign_task_{task}_to_{agent}")
}

/// Builds an [`AssignmentModel`] from a session.
///
/// The session is borrowed for the duration of the build and never
/// mutated. A model is built once per solve; edits to the session
/// require a new builder.
///
/// # Example
/// ```
/// use u_assign::assign::AssignmentModelBuilder;
/// use u_assign::models::{Agent, Session, Task};
///
/// let session = Session::new()
///     .with_agent(Agent::new("alice"))
///     .with_task(Task::new("0010"));
/// let model = AssignmentModelBuilder::new(&session).unwrap().build().unwrap();
/// assert!(model.assignment_variable("0010", "alice").is_some());
/// ```
pub struct AssignmentModelBuilder<'a> {
    session: &'a Session,
    model: CpModel,
    agent_index: HashMap<&'a str, usize>,
    task_index: HashMap<&'a str, usize>,
    /// `[agent][task]`
    vars: Vec<Vec<Option<VarId>>>,
    soft_terms: Vec<SoftTerm>,
}

impl<'a> AssignmentModelBuilder<'a> {
    /// Creates a builder for a session.
    ///
    /// # Errors
    /// [`Error::InvalidSession`] if the session fails validation.
    pub fn new(session: &'a Session) -> Result<Self> {
        validate_session(session).map_err(Error::InvalidSession)?;
        let agent_index = session
            .agents
            .iter()
            .enumerate()
            .map(|(i, a)| (a.name.as_str(), i))
            .collect();
        let task_index = session
            .tasks
            .iter()
            .enumerate()
            .map(|(i, t)| (t.name.as_str(), i))
            .collect();
        Ok(Self {
            session,
            model: CpModel::new("assignment"),
            agent_index,
            task_index,
            vars: vec![vec![None; session.tasks.len()]; session.agents.len()],
            soft_terms: Vec::new(),
        })
    }

    fn indices(&self, task: &str, agent: &str) -> Result<(usize, usize), ModelError> {
        let agent_i = *self
            .agent_index
            .get(agent)
            .ok_or_else(|| ModelError::UnknownVariable(agent.to_string()))?;
        let task_i = *self
            .task_index
            .get(task)
            .ok_or_else(|| ModelError::UnknownVariable(task.to_string()))?;
        Ok((agent_i, task_i))
    }

    fn var(&self, task: &str, agent: &str) -> Result<VarId, ModelError> {
        let (agent_i, task_i) = self.indices(task, agent)?;
        self.vars[agent_i][task_i]
            .ok_or_else(|| ModelError::UnknownVariable(assignment_variable_name(task, agent)))
    }

    /// Creates the boolean "agent does task".
    ///
    /// # Errors
    /// [`ModelError::DuplicateName`] if the pair already has a variable.
    pub fn create_assignment_variable(&mut self, task: &Task, agent: &Agent) -> Result<VarId> {
        let (agent_i, task_i) = self.indices(&task.name, &agent.name)?;
        let name = assignment_variable_name(&task.name, &agent.name);
        if self.vars[agent_i][task_i].is_some() {
            return Err(ModelError::DuplicateName(name).into());
        }
        let var = self.model.new_bool_var(self.model.unique_name(&name))?;
        self.vars[agent_i][task_i] = Some(var);
        Ok(var)
    }

    /// Requires the task to go to exactly one agent.
    pub fn add_exactly_one_constraint(&mut self, task: &Task) -> Result<()> {
        let vars = self
            .session
            .agents
            .iter()
            .map(|agent| self.var(&task.name, &agent.name))
            .collect::<Result<Vec<_>, _>>()?;
        self.model.add_equality(LinearExpr::sum(vars), 1);
        Ok(())
    }

    /// Forces a fixed assignment.
    pub fn pin_fixed_assignment(&mut self, agent: &str, task: &str) -> Result<()> {
        let var = self.var(task, agent)?;
        self.model.add_equality(LinearExpr::from(var), 1);
        Ok(())
    }

    /// Scores tag affinity.
    ///
    /// Each distinct agent tag counts once per pair when it equals the
    /// task name or appears in the task's tags. The pair's variable is
    /// registered with the summed tag weights times the tags setting.
    pub fn score_tag_affinity(&mut self) -> Result<()> {
        let multiplier = self.session.settings.weight_tags;
        for agent in &self.session.agents {
            for task in &self.session.tasks {
                let matching: Vec<i64> = agent
                    .tags
                    .iter()
                    .filter(|(tag, _)| **tag == task.name || task.has_tag(tag))
                    .map(|(_, &weight)| weight)
                    .collect();
                if matching.is_empty() {
                    continue;
                }
                let var = self.var(&task.name, &agent.name)?;
                let weight = matching.iter().sum::<i64>() * multiplier;
                let name = self.model.variable(var).name.clone();
                self.soft_terms.push(SoftTerm::new(name, var, weight));
            }
        }
        Ok(())
    }

    /// Scores a group: a bonus of `group.weight` when one agent gets
    /// every task in it.
    pub fn score_group_bonus(&mut self, group: &TaskGroup) -> Result<()> {
        let prefix = self.model.unique_name(&group.name());
        let transition = self.model.new_bool_var(prefix.clone())?;
        let mut owners = Vec::with_capacity(self.session.agents.len());
        for agent in &self.session.agents {
            let owner = self
                .model
                .new_bool_var(self.model.unique_name(&format!("{prefix}_to_{}", agent.name)))?;
            let members = group
                .tasks
                .iter()
                .map(|task| self.var(task, &agent.name))
                .collect::<Result<Vec<_>, _>>()?;
            let count = members.len() as i64;
            self.model
                .add_equality(LinearExpr::sum(members), count)
                .only_enforce_if(owner);
            owners.push(owner);
        }
        self.model.add_bool_or(owners).only_enforce_if(transition);
        self.soft_terms
            .push(SoftTerm::new(prefix, transition, group.weight));
        Ok(())
    }

    /// Scores workload balance: hours relative to availability, and
    /// task counts.
    pub fn score_balance_terms(&mut self) -> Result<()> {
        let session = self.session;
        let settings = &session.settings;
        let total_units = session.total_units();
        let total_availability = session.total_availability();
        let task_count = session.tasks.len() as i64;
        let agent_count = session.agents.len() as i64;

        let mut hours = Vec::with_capacity(session.agents.len());
        let mut counts = Vec::with_capacity(session.agents.len());
        for agent in &session.agents {
            let mut load = LinearExpr::new();
            let mut count = LinearExpr::new();
            for task in &session.tasks {
                let var = self.var(&task.name, &agent.name)?;
                load.add_term(var, task.units());
                count.add_term(var, 1);
            }
            let hours_goal = if total_availability > 0 {
                total_units * agent.availability / total_availability
            } else {
                0
            };
            let count_goal = if agent_count > 0 {
                task_count / agent_count
            } else {
                0
            };
            hours.push((agent.name.clone(), load, hours_goal));
            counts.push((agent.name.clone(), count, count_goal));
        }

        let hours_encoder = BalanceEncoder::new(total_units, settings.weight_equal_hours);
        let count_encoder = BalanceEncoder::new(task_count, settings.weight_equal_task_count);
        match settings.balance_mode {
            BalanceMode::Quadratic => {
                for (name, expr, goal) in hours {
                    let term = hours_encoder.encode(
                        &mut self.model,
                        &format!("{name}_hours_deviation_cost"),
                        expr,
                        goal,
                    )?;
                    self.soft_terms.push(term);
                }
                for (name, expr, goal) in counts {
                    let term = count_encoder.encode(
                        &mut self.model,
                        &format!("{name}_number_of_tasks_deviation_cost"),
                        expr,
                        goal,
                    )?;
                    self.soft_terms.push(term);
                }
            }
            BalanceMode::AggregateLinear => {
                let term = hours_encoder.encode_aggregate(
                    &mut self.model,
                    "hours_deviation_cost",
                    hours,
                )?;
                self.soft_terms.push(term);
                let term = count_encoder.encode_aggregate(
                    &mut self.model,
                    "number_of_tasks_deviation_cost",
                    counts,
                )?;
                self.soft_terms.push(term);
            }
        }
        Ok(())
    }

    /// Sets the objective to the weighted sum of every soft term.
    pub fn build_objective(&mut self) {
        let objective =
            LinearExpr::weighted_sum(self.soft_terms.iter().map(|t| (t.var, t.weight)));
        self.model.maximize(objective);
    }

    /// Runs every step and returns the finished model.
    pub fn build(mut self) -> Result<AssignmentModel> {
        let session = self.session;
        for agent in &session.agents {
            for task in &session.tasks {
                self.create_assignment_variable(task, agent)?;
            }
        }
        for task in &session.tasks {
            self.add_exactly_one_constraint(task)?;
        }
        for assignment in &session.assignments {
            self.pin_fixed_assignment(&assignment.agent, &assignment.task)?;
        }
        self.score_tag_affinity()?;
        for group in &session.groups {
            self.score_group_bonus(group)?;
        }
        self.score_balance_terms()?;
        Ok(self.finish())
    }

    /// Sets the objective and returns the model, without running the
    /// remaining steps.
    pub fn finish(mut self) -> AssignmentModel {
        self.build_objective();
        tracing::info!(
            agents = self.session.agents.len(),
            tasks = self.session.tasks.len(),
            variables = self.model.variable_count(),
            constraints = self.model.constraint_count(),
            soft_terms = self.soft_terms.len(),
            "assignment model built"
        );
        AssignmentModel {
            model: self.model,
            agents: self.session.agents.iter().map(|a| a.name.clone()).collect(),
            tasks: self.session.tasks.iter().map(|t| t.name.clone()).collect(),
            vars: self.vars,
            soft_terms: self.soft_terms,
        }
    }
}

/// A built assignment model plus what is needed to decode solutions.
#[derive(Debug, Clone)]
pub struct AssignmentModel {
    model: CpModel,
    agents: Vec<String>,
    tasks: Vec<String>,
    vars: Vec<Vec<Option<VarId>>>,
    soft_terms: Vec<SoftTerm>,
}

impl AssignmentModel {
    /// The constraint model.
    pub fn model(&self) -> &CpModel {
        &self.model
    }

    /// Registered soft terms, in creation order.
    pub fn soft_terms(&self) -> &[SoftTerm] {
        &self.soft_terms
    }

    /// Variable for a task/agent pair.
    pub fn assignment_variable(&self, task: &str, agent: &str) -> Option<VarId> {
        let agent_i = self.agents.iter().position(|a| a == agent)?;
        let task_i = self.tasks.iter().position(|t| t == task)?;
        self.vars[agent_i][task_i]
    }

    /// Soft term by name.
    pub fn soft_term(&self, name: &str) -> Option<&SoftTerm> {
        self.soft_terms.iter().find(|t| t.name == name)
    }

    /// Assignments whose variable is true, agent-major in session order.
    pub fn decode_assignments(&self, solution: &CpSolution) -> Vec<Assignment> {
        let mut result = Vec::new();
        for (agent, row) in self.agents.iter().zip(&self.vars) {
            for (task, var) in self.tasks.iter().zip(row) {
                if var.is_some_and(|v| solution.boolean_value(v)) {
                    result.push(Assignment::new(agent, task));
                }
            }
        }
        result
    }

    /// Per-term contributions, in registration order.
    pub fn decode_scores(&self, solution: &CpSolution) -> Vec<Score> {
        self.soft_terms.iter().map(|t| t.score(solution)).collect()
    }

    /// Names of the groups whose bonus is on.
    pub fn satisfied_groups(&self, solution: &CpSolution) -> BTreeSet<String> {
        self.soft_terms
            .iter()
            .filter(|t| t.name.starts_with("assign_multiple_") && solution.boolean_value(t.var))
            .map(|t| t.name.clone())
            .collect()
    }
}

impl ModelDecoder for AssignmentModel {
    type Output = Vec<Assignment>;

    fn model(&self) -> &CpModel {
        &self.model
    }

    fn soft_terms(&self) -> &[SoftTerm] {
        &self.soft_terms
    }

    fn decode(&self, solution: &CpSolution) -> Self::Output {
        self.decode_assignments(solution)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cp::{CpSolver, SimpleCpSolver, SolveStatus, SolverConfig};
    use crate::models::Settings;

    fn solve(session: &Session) -> (AssignmentModel, CpSolution) {
        let built = AssignmentModelBuilder::new(session).unwrap().build().unwrap();
        let result = SimpleCpSolver::new().solve(built.model(), &SolverConfig::default());
        assert_eq!(result.status, SolveStatus::Optimal);
        let best = result.best.unwrap();
        (built, best)
    }

    fn tasks_of(assignments: &[Assignment], agent: &str) -> Vec<String> {
        assignments
            .iter()
            .filter(|a| a.agent == agent)
            .map(|a| a.task.clone())
            .collect()
    }

    #[test]
    fn test_variables_and_exactly_one() {
        let session = Session::new()
            .with_agent(Agent::new("a"))
            .with_agent(Agent::new("b"))
            .with_task(Task::new("t1"))
            .with_task(Task::new("t2"))
            .with_task(Task::new("t3"));
        let (built, best) = solve(&session);
        assert_eq!(
            built.model().var_by_name("assign_task_t2_to_b"),
            built.assignment_variable("t2", "b")
        );
        let assignments = built.decode_assignments(&best);
        for task in ["t1", "t2", "t3"] {
            assert_eq!(assignments.iter().filter(|a| a.task == task).count(), 1);
        }
    }

    #[test]
    fn test_duplicate_variable_is_precondition_error() {
        let session = Session::new()
            .with_agent(Agent::new("a"))
            .with_task(Task::new("t"));
        let mut builder = AssignmentModelBuilder::new(&session).unwrap();
        builder
            .create_assignment_variable(&session.tasks[0], &session.agents[0])
            .unwrap();
        let err = builder
            .create_assignment_variable(&session.tasks[0], &session.agents[0])
            .unwrap_err();
        assert!(matches!(err, Error::Model(ModelError::DuplicateName(_))));
    }

    #[test]
    fn test_names_with_separators_do_not_collide() {
        // "a_to_b" + "c" and "a" + "b_to_c" read the same once joined.
        let session = Session::new()
            .with_agent(Agent::new("b_to_c"))
            .with_agent(Agent::new("c"))
            .with_task(Task::new("a_to_b"))
            .with_task(Task::new("a"));
        let (built, best) = solve(&session);

        let first = built.assignment_variable("a", "b_to_c").unwrap();
        let second = built.assignment_variable("a_to_b", "c").unwrap();
        assert_ne!(first, second);
        assert_ne!(
            built.model().variable(first).name,
            built.model().variable(second).name
        );

        let assignments = built.decode_assignments(&best);
        assert_eq!(assignments.len(), 2);
        for task in ["a_to_b", "a"] {
            assert_eq!(assignments.iter().filter(|a| a.task == task).count(), 1);
        }
    }

    #[test]
    fn test_group_names_with_separators_do_not_collide() {
        let session = Session::new()
            .with_agent(Agent::new("a"))
            .with_agent(Agent::new("b"))
            .with_task(Task::new("x"))
            .with_task(Task::new("y"))
            .with_task(Task::new("x_and_y"))
            .with_task(Task::new("z"))
            .with_task(Task::new("z_to_a"))
            .with_group(TaskGroup::new(["x", "y"]))
            .with_group(TaskGroup::new(["x_and_y"]))
            // Owner "assign_multiple_z_to_a" meets the next group's bonus.
            .with_group(TaskGroup::new(["z"]))
            .with_group(TaskGroup::new(["z_to_a"]));
        let (built, _) = solve(&session);

        let groups: BTreeSet<&str> = built
            .soft_terms()
            .iter()
            .filter(|t| t.name.starts_with("assign_multiple_"))
            .map(|t| t.name.as_str())
            .collect();
        assert_eq!(groups.len(), 4);
        assert!(groups.contains("assign_multiple_x_and_y"));
        assert!(groups.contains("assign_multiple_x_and_y#2"));
    }

    #[test]
    fn test_exactly_one_requires_variables() {
        let session = Session::new()
            .with_agent(Agent::new("a"))
            .with_task(Task::new("t"));
        let mut builder = AssignmentModelBuilder::new(&session).unwrap();
        assert!(matches!(
            builder.add_exactly_one_constraint(&session.tasks[0]),
            Err(Error::Model(ModelError::UnknownVariable(_)))
        ));
    }

    #[test]
    fn test_invalid_session_is_rejected() {
        let session = Session::new()
            .with_agent(Agent::new("a"))
            .with_task(Task::new("t").with_duration_ms(0));
        assert!(matches!(
            AssignmentModelBuilder::new(&session),
            Err(Error::InvalidSession(_))
        ));
    }

    #[test]
    fn test_spread_workload() {
        // 2 agents, 4 one-hour tasks: 2 tasks and 120 minutes each.
        let session = Session::new()
            .with_agent(Agent::new("a"))
            .with_agent(Agent::new("b"))
            .with_task(Task::new("1"))
            .with_task(Task::new("2"))
            .with_task(Task::new("3"))
            .with_task(Task::new("4"))
            .with_settings(Settings::disabled().with_weight_equal_hours(1));
        let (built, best) = solve(&session);
        let assignments = built.decode_assignments(&best);
        for agent in ["a", "b"] {
            let tasks = tasks_of(&assignments, agent);
            assert_eq!(tasks.len(), 2);
            let minutes: i64 = tasks
                .iter()
                .map(|t| session.task(t).unwrap().units())
                .sum();
            assert_eq!(minutes, 120);
        }
    }

    #[test]
    fn test_spread_workload_relative_to_availability() {
        let session = Session::new()
            .with_agent(Agent::new("full").with_availability(100))
            .with_agent(Agent::new("half").with_availability(50))
            .with_task(Task::new("1"))
            .with_task(Task::new("2"))
            .with_task(Task::new("3"))
            .with_settings(Settings::disabled().with_weight_equal_hours(1));
        let (built, best) = solve(&session);
        let assignments = built.decode_assignments(&best);
        assert_eq!(tasks_of(&assignments, "full").len(), 2);
        assert_eq!(tasks_of(&assignments, "half").len(), 1);
    }

    #[test]
    fn test_equal_task_count() {
        // Durations differ; only the count goal is active.
        let session = Session::new()
            .with_agent(Agent::new("a"))
            .with_agent(Agent::new("b"))
            .with_task(Task::new("1").with_duration_hours(1.0))
            .with_task(Task::new("2").with_duration_hours(2.0))
            .with_task(Task::new("3").with_duration_hours(3.0))
            .with_task(Task::new("4").with_duration_hours(4.0))
            .with_task(Task::new("5").with_duration_hours(5.0))
            .with_task(Task::new("6").with_duration_hours(6.0))
            .with_settings(Settings::disabled().with_weight_equal_task_count(1));
        let (built, best) = solve(&session);
        let assignments = built.decode_assignments(&best);
        assert_eq!(tasks_of(&assignments, "a").len(), 3);
        assert_eq!(tasks_of(&assignments, "b").len(), 3);
    }

    #[test]
    fn test_tag_preferences() {
        let session = Session::new()
            .with_agent(Agent::new("a").with_tag("fx", 10))
            .with_agent(Agent::new("b").with_tag("anim", 10))
            .with_task(Task::new("1").with_tag("fx"))
            .with_task(Task::new("2").with_tag("anim"))
            .with_task(Task::new("3").with_tag("fx"))
            .with_settings(Settings::disabled().with_weight_tags(1));
        let (built, best) = solve(&session);
        let assignments = built.decode_assignments(&best);
        assert_eq!(tasks_of(&assignments, "a"), vec!["1", "3"]);
        assert_eq!(tasks_of(&assignments, "b"), vec!["2"]);
        assert_eq!(best.objective(), 30);
    }

    #[test]
    fn test_tag_matching_name_and_tag_counts_once() {
        let session = Session::new()
            .with_agent(Agent::new("a").with_tag("0010", 7))
            .with_task(Task::new("0010").with_tag("0010"))
            .with_settings(Settings::disabled().with_weight_tags(2));
        let (built, best) = solve(&session);
        let term = built.soft_term("assign_task_0010_to_a").unwrap();
        assert_eq!(term.weight, 14);
        assert_eq!(best.objective(), 14);
    }

    #[test]
    fn test_hard_assignment_beats_preference() {
        let session = Session::new()
            .with_agent(Agent::new("a").with_tag("fx", 100))
            .with_agent(Agent::new("b"))
            .with_task(Task::new("1").with_tag("fx"))
            .with_assignment("b", "1")
            .with_settings(Settings::disabled().with_weight_tags(1));
        let (built, best) = solve(&session);
        assert_eq!(
            built.decode_assignments(&best),
            vec![Assignment::new("b", "1")]
        );
    }

    #[test]
    fn test_conflicting_pins_are_infeasible() {
        let session = Session::new()
            .with_agent(Agent::new("x"))
            .with_agent(Agent::new("y"))
            .with_task(Task::new("T"))
            .with_assignment("x", "T")
            .with_assignment("y", "T");
        let built = AssignmentModelBuilder::new(&session).unwrap().build().unwrap();
        let result = SimpleCpSolver::new().solve(built.model(), &SolverConfig::default());
        assert_eq!(result.status, SolveStatus::Infeasible);
    }

    #[test]
    fn test_group_lands_on_one_agent() {
        let session = Session::new()
            .with_agent(Agent::new("a"))
            .with_agent(Agent::new("b"))
            .with_task(Task::new("A"))
            .with_task(Task::new("B"))
            .with_task(Task::new("C"))
            .with_task(Task::new("D"))
            .with_group(TaskGroup::new(["A", "B", "C"]).with_weight(10))
            .with_settings(Settings::disabled().with_weight_equal_task_count(1));
        let (built, best) = solve(&session);
        let assignments = built.decode_assignments(&best);
        let owner_of = |task: &str| {
            assignments
                .iter()
                .find(|a| a.task == task)
                .map(|a| a.agent.clone())
                .unwrap()
        };
        assert_eq!(owner_of("A"), owner_of("B"));
        assert_eq!(owner_of("B"), owner_of("C"));
        assert_ne!(owner_of("A"), owner_of("D"));
        assert_eq!(
            built.satisfied_groups(&best),
            BTreeSet::from(["assign_multiple_A_and_B_and_C".to_string()])
        );
    }

    #[test]
    fn test_group_bonus_never_true_when_split() {
        // Pins split the group, so its bonus must stay off.
        let session = Session::new()
            .with_agent(Agent::new("a"))
            .with_agent(Agent::new("b"))
            .with_task(Task::new("A"))
            .with_task(Task::new("B"))
            .with_group(TaskGroup::new(["A", "B"]).with_weight(10))
            .with_assignment("a", "A")
            .with_assignment("b", "B")
            .with_settings(Settings::disabled());
        let (built, best) = solve(&session);
        assert!(built.satisfied_groups(&best).is_empty());
        let scores = built.decode_scores(&best);
        let group = scores
            .iter()
            .find(|s| s.name == "assign_multiple_A_and_B")
            .unwrap();
        assert_eq!(group.value, 0);
        assert_eq!(group.weight, 10);
    }

    #[test]
    fn test_zero_weights_keep_terms() {
        let session = Session::new()
            .with_agent(Agent::new("a"))
            .with_agent(Agent::new("b"))
            .with_task(Task::new("1"))
            .with_settings(Settings::disabled());
        let (built, best) = solve(&session);
        let names: Vec<&str> = built.soft_terms().iter().map(|t| t.name.as_str()).collect();
        assert!(names.contains(&"a_hours_deviation_cost"));
        assert!(names.contains(&"b_number_of_tasks_deviation_cost"));
        assert!(built.decode_scores(&best).iter().all(|s| s.value == 0));
    }

    #[test]
    fn test_aggregate_balance_mode() {
        let session = Session::new()
            .with_agent(Agent::new("a"))
            .with_agent(Agent::new("b"))
            .with_task(Task::new("1"))
            .with_task(Task::new("2"))
            .with_task(Task::new("3"))
            .with_task(Task::new("4"))
            .with_settings(
                Settings::disabled()
                    .with_weight_equal_hours(1)
                    .with_balance_mode(BalanceMode::AggregateLinear),
            );
        let (built, best) = solve(&session);
        assert!(built.soft_term("hours_deviation_cost").is_some());
        let assignments = built.decode_assignments(&best);
        assert_eq!(tasks_of(&assignments, "a").len(), 2);
        assert_eq!(best.objective(), 0);
    }

    #[test]
    fn test_decoding_is_idempotent() {
        let session = Session::new()
            .with_agent(Agent::new("a").with_tag("x", 3))
            .with_agent(Agent::new("b"))
            .with_task(Task::new("1").with_tag("x"))
            .with_task(Task::new("2"))
            .with_group(TaskGroup::new(["1", "2"]).with_weight(2));
        let (built, best) = solve(&session);
        assert_eq!(
            built.decode_assignments(&best),
            built.decode_assignments(&best)
        );
        assert_eq!(built.decode_scores(&best), built.decode_scores(&best));
        let total: i64 = built.decode_scores(&best).iter().map(|s| s.value).sum();
        assert_eq!(total, best.objective());
    }
}
