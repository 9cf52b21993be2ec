use crate::errors::Result;
use crate::goals::goals_model::{
    Contribution, Goal, GoalProgress, GoalUpdate, GoalsSummary, NewContribution, NewGoal,
};
use crate::goals::goals_traits::{GoalRepositoryTrait, GoalServiceTrait};
use async_trait::async_trait;
use chrono::Utc;
use log::{debug, info, warn};
use std::sync::Arc;

pub struct GoalService {
    goal_repo: Arc<dyn GoalRepositoryTrait>,
}

impl GoalService {
    pub fn new(goal_repo: Arc<dyn GoalRepositoryTrait>) -> Self {
        GoalService { goal_repo }
    }

    /// Stored statuses are only refreshed on write, so a deadline may have
    /// passed since. Every goal leaving the service is re-derived.
    fn fresh(mut goal: Goal) -> Goal {
        if goal.refresh_status(Utc::now()) {
            debug!("Goal {} status is now {}", goal.id, goal.status);
        }
        goal
    }
}

#[async_trait]
impl GoalServiceTrait for GoalService {
    fn get_goals(&self, created_by: Option<&str>) -> Result<Vec<Goal>> {
        let goals = self.goal_repo.load_goals(created_by)?;
        Ok(goals.into_iter().map(Self::fresh).collect())
    }

    fn get_goal(&self, goal_id: &str) -> Result<Goal> {
        self.goal_repo.get_goal(goal_id).map(Self::fresh)
    }

    async fn create_goal(&self, new_goal: NewGoal) -> Result<Goal> {
        let draft = new_goal.into_draft(Utc::now()).inspect_err(|e| {
            warn!("Rejected new goal: {}", e);
        })?;
        let goal = self.goal_repo.insert_new_goal(draft).await?;
        info!("Created goal {} ({})", goal.id, goal.status);
        Ok(goal)
    }

    async fn update_goal(&self, goal_id: String, update: GoalUpdate) -> Result<Goal> {
        let changes = update.validate()?;
        let goal = self
            .goal_repo
            .update_goal(goal_id, changes, Utc::now())
            .await?;
        info!("Updated goal {} ({})", goal.id, goal.status);
        Ok(goal)
    }

    async fn delete_goal(&self, goal_id: String) -> Result<usize> {
        let deleted = self.goal_repo.delete_goal(goal_id.clone()).await?;
        info!("Deleted goal {}", goal_id);
        Ok(deleted)
    }

    fn get_contributions(&self, goal_id: &str) -> Result<Vec<Contribution>> {
        self.goal_repo.load_contributions(goal_id)
    }

    async fn record_contribution(
        &self,
        goal_id: String,
        contribution: NewContribution,
    ) -> Result<Goal> {
        let contribution = contribution
            .validate(Utc::now().date_naive())
            .inspect_err(|e| warn!("Rejected contribution to goal {}: {}", goal_id, e))?;
        let amount = contribution.amount;
        let goal = self
            .goal_repo
            .add_contribution(goal_id, contribution, Utc::now())
            .await?;
        info!(
            "Recorded contribution of {} to goal {} (now {} of {}, {})",
            amount, goal.id, goal.current_amount, goal.target_amount, goal.status
        );
        Ok(goal)
    }

    async fn remove_contribution(
        &self,
        goal_id: String,
        contribution_id: String,
    ) -> Result<Goal> {
        let goal = self
            .goal_repo
            .remove_contribution(goal_id, contribution_id.clone(), Utc::now())
            .await?;
        info!(
            "Removed contribution {} from goal {} ({})",
            contribution_id, goal.id, goal.status
        );
        Ok(goal)
    }

    fn get_goals_progress(&self, created_by: Option<&str>) -> Result<Vec<GoalProgress>> {
        let today = Utc::now().date_naive();
        Ok(self
            .get_goals(created_by)?
            .iter()
            .map(|goal| GoalProgress::from_goal(goal, today))
            .collect())
    }

    fn get_goals_summary(&self, created_by: Option<&str>) -> Result<GoalsSummary> {
        Ok(GoalsSummary::from_goals(&self.get_goals(created_by)?))
    }
}
