//! Input validation for assignment sessions.
//!
//! Checks structural integrity of a session before a model is built.
//! Detects:
//! - Duplicate agent/task names or IDs
//! - Non-positive task durations and negative weights
//! - Assignments and groups referring to unknown agents or tasks
//! - Duplicate fixed assignments and duplicate or empty groups
//!
//! Conflicting fixed assignments (one task pinned to two agents) are not
//! reported here: they are a legal input whose solve is infeasible.

use crate::models::Session;
use std::collections::HashSet;
use std::fmt;

/// Validation result.
pub type ValidationResult = Result<(), Vec<ValidationError>>;

/// A validation error.
#[derive(Debug, Clone, PartialEq)]
pub struct ValidationError {
    /// Error category.
    pub kind: ValidationErrorKind,
    /// Human-readable description.
    pub message: String,
}

/// Categories of validation errors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationErrorKind {
    /// Two entities share the same name or ID.
    DuplicateName,
    /// A task has a zero or negative duration.
    NonPositiveDuration,
    /// An availability or settings weight is negative.
    NegativeWeight,
    /// An assignment or group refers to an unknown agent or task.
    InvalidReference,
    /// The same agent/task pair is pinned twice.
    DuplicateAssignment,
    /// A group has no tasks.
    EmptyGroup,
    /// Two groups have the same members, or a group repeats a task.
    DuplicateGroup,
}

impl ValidationError {
    pub(crate) fn new(kind: ValidationErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}

/// Validates a session.
///
/// # Returns
/// `Ok(())` if all checks pass, `Err(errors)` with all detected issues.
pub fn validate_session(session: &Session) -> ValidationResult {
    let mut errors = Vec::new();

    // Agents
    let mut agent_names = HashSet::new();
    let mut agent_ids = HashSet::new();
    for agent in &session.agents {
        if !agent_names.insert(agent.name.as_str()) {
            errors.push(ValidationError::new(
                ValidationErrorKind::DuplicateName,
                format!("Duplicate agent name: {}", agent.name),
            ));
        }
        if !agent_ids.insert(agent.id.as_str()) {
            errors.push(ValidationError::new(
                ValidationErrorKind::DuplicateName,
                format!("Duplicate agent ID: {}", agent.id),
            ));
        }
        if agent.availability < 0 {
            errors.push(ValidationError::new(
                ValidationErrorKind::NegativeWeight,
                format!("Agent '{}' has a negative availability", agent.name),
            ));
        }
    }

    // Tasks
    let mut task_names = HashSet::new();
    let mut task_ids = HashSet::new();
    for task in &session.tasks {
        if !task_names.insert(task.name.as_str()) {
            errors.push(ValidationError::new(
                ValidationErrorKind::DuplicateName,
                format!("Duplicate task name: {}", task.name),
            ));
        }
        if !task_ids.insert(task.id.as_str()) {
            errors.push(ValidationError::new(
                ValidationErrorKind::DuplicateName,
                format!("Duplicate task ID: {}", task.id),
            ));
        }
        if task.duration_ms <= 0 {
            errors.push(ValidationError::new(
                ValidationErrorKind::NonPositiveDuration,
                format!("Task '{}' has no duration", task.name),
            ));
        }
    }

    // Settings
    let settings = &session.settings;
    for (label, weight) in [
        ("tags", settings.weight_tags),
        ("equal hours", settings.weight_equal_hours),
        ("equal task count", settings.weight_equal_task_count),
    ] {
        if weight < 0 {
            errors.push(ValidationError::new(
                ValidationErrorKind::NegativeWeight,
                format!("Negative {label} weight: {weight}"),
            ));
        }
    }

    // Fixed assignments and solution
    let mut pinned = HashSet::new();
    for assignment in &session.assignments {
        check_reference(&mut errors, "Assignment", &agent_names, &task_names, assignment);
        if !pinned.insert((assignment.agent.as_str(), assignment.task.as_str())) {
            errors.push(ValidationError::new(
                ValidationErrorKind::DuplicateAssignment,
                format!(
                    "Task '{}' is pinned to '{}' more than once",
                    assignment.task, assignment.agent
                ),
            ));
        }
    }
    for assignment in &session.solution {
        check_reference(&mut errors, "Solution", &agent_names, &task_names, assignment);
    }

    // Groups
    let mut group_members = HashSet::new();
    for group in &session.groups {
        if group.tasks.is_empty() {
            errors.push(ValidationError::new(
                ValidationErrorKind::EmptyGroup,
                "Task group has no tasks",
            ));
            continue;
        }
        let mut seen = HashSet::new();
        for task in &group.tasks {
            if !task_names.contains(task.as_str()) {
                errors.push(ValidationError::new(
                    ValidationErrorKind::InvalidReference,
                    format!("Group '{}' references unknown task '{}'", group.name(), task),
                ));
            }
            if !seen.insert(task.as_str()) {
                errors.push(ValidationError::new(
                    ValidationErrorKind::DuplicateGroup,
                    format!("Group '{}' lists task '{}' twice", group.name(), task),
                ));
            }
        }
        if !group_members.insert(group.tasks.clone()) {
            errors.push(ValidationError::new(
                ValidationErrorKind::DuplicateGroup,
                format!("Duplicate group: {}", group.name()),
            ));
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

fn check_reference(
    errors: &mut Vec<ValidationError>,
    label: &str,
    agent_names: &HashSet<&str>,
    task_names: &HashSet<&str>,
    assignment: &crate::models::Assignment,
) {
    if !agent_names.contains(assignment.agent.as_str()) {
        errors.push(ValidationError::new(
            ValidationErrorKind::InvalidReference,
            format!("{label} references unknown agent '{}'", assignment.agent),
        ));
    }
    if !task_names.contains(assignment.task.as_str()) {
        errors.push(ValidationError::new(
            ValidationErrorKind::InvalidReference,
            format!("{label} references unknown task '{}'", assignment.task),
        ));
    }
}
