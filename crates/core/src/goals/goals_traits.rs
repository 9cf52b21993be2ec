use crate::errors::Result;
use crate::goals::goals_model::{
    Contribution, Goal, GoalChanges, GoalDraft, GoalProgress, GoalUpdate, GoalsSummary,
    NewContribution, NewGoal,
};
use async_trait::async_trait;
use chrono::{DateTime, Utc};

/// Trait for goal repository operations
///
/// Write methods re-derive the goal's status as of `now` and persist it in
/// the same transaction as the change that caused it.
#[async_trait]
pub trait GoalRepositoryTrait: Send + Sync {
    fn load_goals(&self, created_by: Option<&str>) -> Result<Vec<Goal>>;
    fn get_goal(&self, goal_id: &str) -> Result<Goal>;
    fn load_contributions(&self, goal_id: &str) -> Result<Vec<Contribution>>;
    async fn insert_new_goal(&self, draft: GoalDraft) -> Result<Goal>;
    /// Applies `changes` and persists the status derived for the result.
    async fn update_goal(
        &self,
        goal_id: String,
        changes: GoalChanges,
        now: DateTime<Utc>,
    ) -> Result<Goal>;
    async fn delete_goal(&self, goal_id: String) -> Result<usize>;
    /// Stores the contribution, appends it to the goal and increments the
    /// goal's amount in the store.
    async fn add_contribution(
        &self,
        goal_id: String,
        contribution: NewContribution,
        now: DateTime<Utc>,
    ) -> Result<Goal>;
    /// Detaches and deletes the contribution, decrementing the goal's amount.
    async fn remove_contribution(
        &self,
        goal_id: String,
        contribution_id: String,
        now: DateTime<Utc>,
    ) -> Result<Goal>;
}

/// Trait for goal service operations
#[async_trait]
pub trait GoalServiceTrait: Send + Sync {
    fn get_goals(&self, created_by: Option<&str>) -> Result<Vec<Goal>>;
    fn get_goal(&self, goal_id: &str) -> Result<Goal>;
    async fn create_goal(&self, new_goal: NewGoal) -> Result<Goal>;
    async fn update_goal(&self, goal_id: String, update: GoalUpdate) -> Result<Goal>;
    async fn delete_goal(&self, goal_id: String) -> Result<usize>;
    fn get_contributions(&self, goal_id: &str) -> Result<Vec<Contribution>>;
    async fn record_contribution(
        &self,
        goal_id: String,
        contribution: NewContribution,
    ) -> Result<Goal>;
    async fn remove_contribution(&self, goal_id: String, contribution_id: String)
        -> Result<Goal>;
    fn get_goals_progress(&self, created_by: Option<&str>) -> Result<Vec<GoalProgress>>;
    fn get_goals_summary(&self, created_by: Option<&str>) -> Result<GoalsSummary>;
}
