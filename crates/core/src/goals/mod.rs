//! Goals module - domain models, services, and traits.

mod goals_model;
mod goals_service;
mod goals_traits;

pub use goals_model::{
    parse_deadline, Contribution, Goal, GoalChanges, GoalDraft, GoalProgress, GoalStatus,
    GoalUpdate, GoalsSummary, NewContribution, NewGoal, MIN_TARGET_AMOUNT,
};
pub use goals_service::GoalService;
pub use goals_traits::{GoalRepositoryTrait, GoalServiceTrait};
