//! SQLite storage implementation for goals and contributions.

mod model;
mod repository;

pub use model::{ContributionDB, GoalChangesDB, GoalContributionDB, GoalDB, NewGoalDB};
pub use repository::GoalRepository;
