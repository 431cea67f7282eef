//! Assignment domain models.
//!
//! Provides the data types for describing who can do what: agents, tasks,
//! groups of tasks that prefer a single owner, the soft-goal settings, and
//! the session aggregate that ties them together.
//!
//! # Domain Mappings
//!
//! | u-assign | Animation | Support desk | Packaging |
//! |----------|-----------|--------------|-----------|
//! | Agent | Artist | Engineer | Dependency graph |
//! | Task | Shot | Ticket | Package version |
//! | TaskGroup | Shot sequence | Related tickets | n/a |
//! | Assignment | Casting | Ownership | Selection |
//!
//! Entities reference each other by name only. Lookups happen at solve
//! time, so there are no back-references to keep in sync.

mod agent;
mod assignment;
mod group;
mod session;
mod settings;
mod task;

pub use agent::{Agent, DEFAULT_AVAILABILITY};
pub use assignment::Assignment;
pub use group::TaskGroup;
pub use session::Session;
pub use settings::{BalanceMode, Settings};
pub use task::{Task, MS_PER_HOUR, MS_PER_UNIT};
