use std::sync::Arc;

use crate::{error::ApiResult, main_lib::AppState};
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    routing::{delete, get},
    Json, Router,
};
use fintrack_core::goals::{
    Contribution, Goal, GoalProgress, GoalUpdate, GoalsSummary, NewContribution, NewGoal,
};
use serde::Deserialize;

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GoalsQuery {
    created_by: Option<String>,
}

async fn get_goals(
    State(state): State<Arc<AppState>>,
    Query(query): Query<GoalsQuery>,
) -> ApiResult<Json<Vec<Goal>>> {
    let goals = state.goal_service.get_goals(query.created_by.as_deref())?;
    Ok(Json(goals))
}

async fn get_goal(
    Path(id): Path<String>,
    State(state): State<Arc<AppState>>,
) -> ApiResult<Json<Goal>> {
    Ok(Json(state.goal_service.get_goal(&id)?))
}

async fn create_goal(
    State(state): State<Arc<AppState>>,
    Json(goal): Json<NewGoal>,
) -> ApiResult<(StatusCode, Json<Goal>)> {
    let g = state.goal_service.create_goal(goal).await?;
    Ok((StatusCode::CREATED, Json(g)))
}

async fn update_goal(
    Path(id): Path<String>,
    State(state): State<Arc<AppState>>,
    Json(update): Json<GoalUpdate>,
) -> ApiResult<Json<Goal>> {
    let g = state.goal_service.update_goal(id, update).await?;
    Ok(Json(g))
}

async fn delete_goal(
    Path(id): Path<String>,
    State(state): State<Arc<AppState>>,
) -> ApiResult<StatusCode> {
    let _ = state.goal_service.delete_goal(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

async fn get_contributions(
    Path(id): Path<String>,
    State(state): State<Arc<AppState>>,
) -> ApiResult<Json<Vec<Contribution>>> {
    Ok(Json(state.goal_service.get_contributions(&id)?))
}

async fn record_contribution(
    Path(id): Path<String>,
    State(state): State<Arc<AppState>>,
    Json(contribution): Json<NewContribution>,
) -> ApiResult<(StatusCode, Json<Goal>)> {
    let g = state
        .goal_service
        .record_contribution(id, contribution)
        .await?;
    Ok((StatusCode::CREATED, Json(g)))
}

async fn remove_contribution(
    Path((id, contribution_id)): Path<(String, String)>,
    State(state): State<Arc<AppState>>,
) -> ApiResult<Json<Goal>> {
    let g = state
        .goal_service
        .remove_contribution(id, contribution_id)
        .await?;
    Ok(Json(g))
}

async fn get_goals_progress(
    State(state): State<Arc<AppState>>,
    Query(query): Query<GoalsQuery>,
) -> ApiResult<Json<Vec<GoalProgress>>> {
    let progress = state
        .goal_service
        .get_goals_progress(query.created_by.as_deref())?;
    Ok(Json(progress))
}

async fn get_goals_summary(
    State(state): State<Arc<AppState>>,
    Query(query): Query<GoalsQuery>,
) -> ApiResult<Json<GoalsSummary>> {
    let summary = state
        .goal_service
        .get_goals_summary(query.created_by.as_deref())?;
    Ok(Json(summary))
}

pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/goals", get(get_goals).post(create_goal))
        .route("/goals/progress", get(get_goals_progress))
        .route("/goals/summary", get(get_goals_summary))
        .route(
            "/goals/{id}",
            get(get_goal).put(update_goal).delete(delete_goal),
        )
        .route(
            "/goals/{id}/contributions",
            get(get_contributions).post(record_contribution),
        )
        .route(
            "/goals/{id}/contributions/{contribution_id}",
            delete(remove_contribution),
        )
}
