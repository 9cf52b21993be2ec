use fintrack_core::errors::Error;
use fintrack_core::goals::{
    Contribution, Goal, GoalChanges, GoalDraft, GoalRepositoryTrait, NewContribution,
};
use fintrack_core::Result;

use super::model::{ContributionDB, GoalChangesDB, GoalContributionDB, GoalDB, NewGoalDB};
use crate::db::{get_connection, DbPool, WriteHandle};
use crate::errors::{IntoCore, StorageError};
use crate::schema::{contributions, goal_contributions, goals};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use diesel::dsl::max;
use diesel::prelude::*;
use diesel::result::Error as DieselError;
use diesel::sqlite::Sqlite;
use diesel::SqliteConnection;
use log::debug;

use std::collections::HashMap;
use std::sync::Arc;
use uuid::Uuid;

pub struct GoalRepository {
    pool: Arc<DbPool>,
    writer: WriteHandle,
}

impl GoalRepository {
    pub fn new(pool: Arc<DbPool>, writer: WriteHandle) -> Self {
        GoalRepository { pool, writer }
    }
}

fn find_goal_row(conn: &mut SqliteConnection, goal_id: &str) -> Result<GoalDB> {
    goals::table
        .find(goal_id)
        .select(GoalDB::as_select())
        .first(conn)
        .optional()
        .into_core()?
        .ok_or_else(|| Error::not_found("Goal", goal_id))
}

fn contribution_ids(conn: &mut SqliteConnection, goal_id: &str) -> Result<Vec<String>> {
    goal_contributions::table
        .filter(goal_contributions::goal_id.eq(goal_id))
        .order(goal_contributions::position.asc())
        .select(goal_contributions::contribution_id)
        .load::<String>(conn)
        .into_core()
}

fn load_goal(conn: &mut SqliteConnection, goal_id: &str) -> Result<Goal> {
    let row = find_goal_row(conn, goal_id)?;
    let ids = contribution_ids(conn, goal_id)?;
    Ok(row.into_domain(ids))
}

/// Re-derives the status of a freshly written goal as of `now` and stores
/// it when it changed. Runs inside the caller's write transaction.
fn persist_status(conn: &mut SqliteConnection, goal: &mut Goal, now: DateTime<Utc>) -> Result<()> {
    let previous = goal.status;
    if goal.refresh_status(now) {
        diesel::update(goals::table.find(&goal.id))
            .set(goals::status.eq(goal.status.as_str()))
            .execute(conn)
            .into_core()?;
        debug!("Goal {} moved from {} to {}", goal.id, previous, goal.status);
    }
    Ok(())
}

/// Loads the goal after an amount change, rejecting a sum that no longer
/// fits in a finite number. The error rolls back the writer transaction.
fn load_adjusted_goal(conn: &mut SqliteConnection, goal_id: &str) -> Result<Goal> {
    let goal = load_goal(conn, goal_id)?;
    if !goal.current_amount.is_finite() {
        return Err(Error::invalid_input(format!(
            "Contribution would overflow the saved amount of goal {}",
            goal_id
        )));
    }
    Ok(goal)
}

/// Adds `delta` to the stored amount with a single UPDATE so concurrent
/// writers can never lose an increment. Returns the number of goals touched.
fn adjust_current_amount(conn: &mut SqliteConnection, goal_id: &str, delta: f64) -> Result<usize> {
    diesel::update(goals::table.find(goal_id))
        .set((
            goals::current_amount.eq(goals::current_amount + delta),
            goals::updated_at.eq(Utc::now().naive_utc()),
        ))
        .execute(conn)
        .into_core()
}

#[async_trait]
impl GoalRepositoryTrait for GoalRepository {
    fn load_goals(&self, created_by: Option<&str>) -> Result<Vec<Goal>> {
        let mut conn = get_connection(&self.pool)?;

        // Goal rows and their links come from one snapshot.
        let (goals_db, links) = conn
            .transaction::<_, DieselError, _>(|c| {
                let mut query: goals::BoxedQuery<'_, Sqlite> = goals::table
                    .order((goals::deadline.asc(), goals::title.asc()))
                    .into_boxed();
                if let Some(user) = created_by {
                    query = query.filter(goals::created_by.eq(user));
                }
                let goals_db = query.load::<GoalDB>(c)?;

                let links = goal_contributions::table
                    .filter(goal_contributions::goal_id.eq_any(goals_db.iter().map(|g| &g.id)))
                    .order(goal_contributions::position.asc())
                    .select(GoalContributionDB::as_select())
                    .load::<GoalContributionDB>(c)?;
                Ok((goals_db, links))
            })
            .into_core()?;

        let mut by_goal: HashMap<String, Vec<String>> = HashMap::new();
        for link in links {
            by_goal
                .entry(link.goal_id)
                .or_default()
                .push(link.contribution_id);
        }

        Ok(goals_db
            .into_iter()
            .map(|goal| {
                let ids = by_goal.remove(&goal.id).unwrap_or_default();
                goal.into_domain(ids)
            })
            .collect())
    }

    fn get_goal(&self, goal_id: &str) -> Result<Goal> {
        let mut conn = get_connection(&self.pool)?;
        conn.transaction::<_, StorageError, _>(|c| {
            load_goal(c, goal_id).map_err(StorageError::from)
        })
        .map_err(Error::from)
    }

    fn load_contributions(&self, goal_id: &str) -> Result<Vec<Contribution>> {
        let mut conn = get_connection(&self.pool)?;
        let rows = conn
            .transaction::<_, StorageError, _>(|c| {
                find_goal_row(c, goal_id)?;
                Ok(goal_contributions::table
                    .inner_join(contributions::table)
                    .filter(goal_contributions::goal_id.eq(goal_id))
                    .order(goal_contributions::position.asc())
                    .select(ContributionDB::as_select())
                    .load::<ContributionDB>(c)?)
            })
            .map_err(Error::from)?;
        Ok(rows.into_iter().map(Contribution::from).collect())
    }

    async fn insert_new_goal(&self, draft: GoalDraft) -> Result<Goal> {
        self.writer
            .exec(move |conn: &mut SqliteConnection| -> Result<Goal> {
                let now = Utc::now().naive_utc();
                let new_goal_db = NewGoalDB {
                    id: Uuid::new_v4().to_string(),
                    title: draft.title,
                    target_amount: draft.target_amount,
                    current_amount: 0.0,
                    deadline: draft.deadline,
                    status: draft.status.as_str().to_string(),
                    created_by: draft.created_by,
                    created_at: now,
                    updated_at: now,
                };

                let result_db = diesel::insert_into(goals::table)
                    .values(&new_goal_db)
                    .returning(GoalDB::as_returning())
                    .get_result(conn)
                    .into_core()?;
                Ok(result_db.into_domain(Vec::new()))
            })
            .await
    }

    async fn update_goal(
        &self,
        goal_id: String,
        changes: GoalChanges,
        now: DateTime<Utc>,
    ) -> Result<Goal> {
        let changes_db = GoalChangesDB {
            title: changes.title,
            target_amount: changes.target_amount,
            deadline: changes.deadline,
            updated_at: Utc::now().naive_utc(),
        };

        self.writer
            .exec(move |conn: &mut SqliteConnection| -> Result<Goal> {
                let updated = diesel::update(goals::table.find(&goal_id))
                    .set(&changes_db)
                    .execute(conn)
                    .into_core()?;
                if updated == 0 {
                    return Err(Error::not_found("Goal", &goal_id));
                }

                let mut goal = load_goal(conn, &goal_id)?;
                persist_status(conn, &mut goal, now)?;
                Ok(goal)
            })
            .await
    }

    async fn delete_goal(&self, goal_id: String) -> Result<usize> {
        self.writer
            .exec(move |conn: &mut SqliteConnection| -> Result<usize> {
                let owned = contribution_ids(conn, &goal_id)?;

                diesel::delete(
                    goal_contributions::table.filter(goal_contributions::goal_id.eq(&goal_id)),
                )
                .execute(conn)
                .into_core()?;
                diesel::delete(contributions::table.filter(contributions::id.eq_any(&owned)))
                    .execute(conn)
                    .into_core()?;

                let deleted = diesel::delete(goals::table.find(&goal_id))
                    .execute(conn)
                    .into_core()?;
                if deleted == 0 {
                    return Err(Error::not_found("Goal", &goal_id));
                }
                Ok(deleted)
            })
            .await
    }

    async fn add_contribution(
        &self,
        goal_id: String,
        contribution: NewContribution,
        now: DateTime<Utc>,
    ) -> Result<Goal> {
        self.writer
            .exec(move |conn: &mut SqliteConnection| -> Result<Goal> {
                if adjust_current_amount(conn, &goal_id, contribution.amount)? == 0 {
                    return Err(Error::not_found("Goal", &goal_id));
                }

                let created_at = Utc::now().naive_utc();
                let contribution_db = ContributionDB {
                    id: Uuid::new_v4().to_string(),
                    amount: contribution.amount,
                    contributed_on: contribution
                        .contributed_on
                        .unwrap_or_else(|| created_at.date()),
                    note: contribution.note,
                    created_at,
                };
                diesel::insert_into(contributions::table)
                    .values(&contribution_db)
                    .execute(conn)
                    .into_core()?;

                let last_position: Option<i32> = goal_contributions::table
                    .filter(goal_contributions::goal_id.eq(&goal_id))
                    .select(max(goal_contributions::position))
                    .first(conn)
                    .into_core()?;
                diesel::insert_into(goal_contributions::table)
                    .values(&GoalContributionDB {
                        goal_id: goal_id.clone(),
                        contribution_id: contribution_db.id.clone(),
                        position: last_position.map_or(0, |p| p + 1),
                    })
                    .execute(conn)
                    .into_core()?;

                let mut goal = load_adjusted_goal(conn, &goal_id)?;
                persist_status(conn, &mut goal, now)?;
                Ok(goal)
            })
            .await
    }

    async fn remove_contribution(
        &self,
        goal_id: String,
        contribution_id: String,
        now: DateTime<Utc>,
    ) -> Result<Goal> {
        self.writer
            .exec(move |conn: &mut SqliteConnection| -> Result<Goal> {
                let unlinked = diesel::delete(
                    goal_contributions::table
                        .filter(goal_contributions::goal_id.eq(&goal_id))
                        .filter(goal_contributions::contribution_id.eq(&contribution_id)),
                )
                .execute(conn)
                .into_core()?;
                if unlinked == 0 {
                    return Err(Error::not_found("Contribution", &contribution_id));
                }

                let amount: f64 = contributions::table
                    .find(&contribution_id)
                    .select(contributions::amount)
                    .first(conn)
                    .into_core()?;
                diesel::delete(contributions::table.find(&contribution_id))
                    .execute(conn)
                    .into_core()?;

                adjust_current_amount(conn, &goal_id, -amount)?;
                // Float subtraction can leave a tiny negative residue.
                diesel::update(
                    goals::table
                        .find(&goal_id)
                        .filter(goals::current_amount.lt(0.0)),
                )
                .set(goals::current_amount.eq(0.0))
                .execute(conn)
                .into_core()?;

                let mut goal = load_goal(conn, &goal_id)?;
                persist_status(conn, &mut goal, now)?;
                Ok(goal)
            })
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::{create_pool, run_migrations, spawn_writer};
    use chrono::{Duration, NaiveDate};
    use fintrack_core::goals::GoalStatus;
    use tempfile::tempdir;

    /// Creates a repository backed by a fresh database in a temp dir.
    /// The temp dir must be kept alive for the duration of the test.
    fn create_test_repository() -> (GoalRepository, Arc<DbPool>, tempfile::TempDir) {
        let temp_dir = tempdir().expect("Failed to create temp directory");
        let db_path = temp_dir.path().join("test.db");
        let db_path_str = db_path.to_string_lossy().to_string();

        let pool = create_pool(&db_path_str).expect("Failed to create pool");
        run_migrations(&pool).expect("Failed to run migrations");
        let writer = spawn_writer((*pool).clone());

        (
            GoalRepository::new(Arc::clone(&pool), writer),
            pool,
            temp_dir,
        )
    }

    fn draft(title: &str, target_amount: f64, deadline_in_days: i64) -> GoalDraft {
        let deadline = Utc::now().date_naive() + Duration::days(deadline_in_days);
        GoalDraft {
            title: title.to_string(),
            target_amount,
            deadline,
            status: GoalStatus::derive(0.0, target_amount, deadline, Utc::now()),
            created_by: None,
        }
    }

    fn deposit(amount: f64) -> NewContribution {
        NewContribution {
            amount,
            contributed_on: None,
            note: None,
        }
    }

    #[tokio::test]
    async fn test_contributions_increment_and_complete_goal() {
        let (repo, _pool, _temp_dir) = create_test_repository();
        let goal = repo
            .insert_new_goal(draft("House deposit", 1000.0, 30))
            .await
            .unwrap();
        assert_eq!(goal.status, GoalStatus::Active);

        let goal = repo
            .add_contribution(goal.id.clone(), deposit(400.0), Utc::now())
            .await
            .unwrap();
        assert_eq!(goal.current_amount, 400.0);
        assert_eq!(goal.status, GoalStatus::Active);

        let goal = repo
            .add_contribution(goal.id.clone(), deposit(600.0), Utc::now())
            .await
            .unwrap();
        assert_eq!(goal.current_amount, 1000.0);
        assert_eq!(goal.status, GoalStatus::Completed);
        assert_eq!(goal.contributions.len(), 2);

        let stored = repo.get_goal(&goal.id).unwrap();
        assert_eq!(stored.status, GoalStatus::Completed);
        assert_eq!(stored.contributions, goal.contributions);

        let listed = repo.load_contributions(&goal.id).unwrap();
        assert_eq!(
            listed.iter().map(|c| c.amount).collect::<Vec<_>>(),
            vec![400.0, 600.0]
        );
        assert_eq!(listed[0].contributed_on, Utc::now().date_naive());
    }

    #[tokio::test]
    async fn test_concurrent_contributions_are_not_lost() {
        let (repo, _pool, _temp_dir) = create_test_repository();
        let repo = Arc::new(repo);
        let goal = repo
            .insert_new_goal(draft("Rainy day", 10_000.0, 30))
            .await
            .unwrap();

        let mut handles = Vec::new();
        for _ in 0..20 {
            let repo = Arc::clone(&repo);
            let goal_id = goal.id.clone();
            handles.push(tokio::spawn(async move {
                repo.add_contribution(goal_id, deposit(5.0), Utc::now())
                    .await
                    .unwrap();
            }));
        }
        for handle in handles {
            handle.await.unwrap();
        }

        let stored = repo.get_goal(&goal.id).unwrap();
        assert_eq!(stored.current_amount, 100.0);
        assert_eq!(stored.contributions.len(), 20);
    }

    #[tokio::test]
    async fn test_contribution_to_missing_goal_leaves_nothing_behind() {
        let (repo, pool, _temp_dir) = create_test_repository();
        let result = repo
            .add_contribution("missing".to_string(), deposit(10.0), Utc::now())
            .await;
        assert!(matches!(result, Err(Error::NotFound(_))));

        let mut conn = get_connection(&pool).unwrap();
        let count: i64 = contributions::table.count().get_result(&mut conn).unwrap();
        assert_eq!(count, 0);
    }

    #[tokio::test]
    async fn test_remove_contribution_and_delete_goal() {
        let (repo, pool, _temp_dir) = create_test_repository();
        let goal = repo
            .insert_new_goal(draft("Trip", 300.0, 10))
            .await
            .unwrap();
        let goal = repo
            .add_contribution(goal.id.clone(), deposit(0.1), Utc::now())
            .await
            .unwrap();
        let goal = repo
            .add_contribution(goal.id.clone(), deposit(0.2), Utc::now())
            .await
            .unwrap();

        let first = goal.contributions[0].clone();
        let goal = repo
            .remove_contribution(goal.id.clone(), first.clone(), Utc::now())
            .await
            .unwrap();
        assert_eq!(goal.contributions.len(), 1);
        let goal = repo
            .remove_contribution(goal.id.clone(), goal.contributions[0].clone(), Utc::now())
            .await
            .unwrap();
        assert!(goal.current_amount >= 0.0 && goal.current_amount < 1e-9);

        let again = repo
            .remove_contribution(goal.id.clone(), first, Utc::now())
            .await;
        assert!(matches!(again, Err(Error::NotFound(_))));

        repo.add_contribution(goal.id.clone(), deposit(50.0), Utc::now())
            .await
            .unwrap();
        assert_eq!(repo.delete_goal(goal.id.clone()).await.unwrap(), 1);
        assert!(matches!(repo.get_goal(&goal.id), Err(Error::NotFound(_))));
        assert!(matches!(
            repo.delete_goal(goal.id.clone()).await,
            Err(Error::NotFound(_))
        ));

        let mut conn = get_connection(&pool).unwrap();
        let remaining: i64 = contributions::table.count().get_result(&mut conn).unwrap();
        assert_eq!(remaining, 0);
    }

    #[tokio::test]
    async fn test_update_goal_persists_derived_status() {
        let (repo, _pool, _temp_dir) = create_test_repository();
        let goal = repo
            .insert_new_goal(draft("Course", 500.0, 20))
            .await
            .unwrap();

        let goal = repo
            .update_goal(
                goal.id.clone(),
                GoalChanges {
                    deadline: NaiveDate::from_ymd_opt(2020, 6, 1),
                    ..Default::default()
                },
                Utc::now(),
            )
            .await
            .unwrap();
        assert_eq!(goal.status, GoalStatus::Expired);
        assert_eq!(repo.get_goal(&goal.id).unwrap().status, GoalStatus::Expired);

        let missing = repo
            .update_goal("nope".to_string(), GoalChanges::default(), Utc::now())
            .await;
        assert!(matches!(missing, Err(Error::NotFound(_))));
    }

    #[tokio::test]
    async fn test_load_goals_orders_and_filters() {
        let (repo, _pool, _temp_dir) = create_test_repository();
        let later = repo.insert_new_goal(draft("Later", 100.0, 60)).await.unwrap();
        let sooner = repo
            .insert_new_goal(GoalDraft {
                created_by: Some("alice".to_string()),
                ..draft("Sooner", 100.0, 5)
            })
            .await
            .unwrap();
        repo.add_contribution(later.id.clone(), deposit(10.0), Utc::now())
            .await
            .unwrap();

        let all = repo.load_goals(None).unwrap();
        assert_eq!(
            all.iter().map(|g| g.id.clone()).collect::<Vec<_>>(),
            vec![sooner.id.clone(), later.id.clone()]
        );
        assert!(all[0].contributions.is_empty());
        assert_eq!(all[1].contributions.len(), 1);

        let mine = repo.load_goals(Some("alice")).unwrap();
        assert_eq!(mine.len(), 1);
        assert_eq!(mine[0].id, sooner.id);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_listed_goal_amount_matches_its_contributions() {
        let (repo, _pool, _temp_dir) = create_test_repository();
        let repo = Arc::new(repo);
        let goal = repo
            .insert_new_goal(draft("Snapshot", 10_000.0, 30))
            .await
            .unwrap();

        let mut handles = Vec::new();
        for _ in 0..20 {
            let repo = Arc::clone(&repo);
            let goal_id = goal.id.clone();
            handles.push(tokio::spawn(async move {
                repo.add_contribution(goal_id, deposit(5.0), Utc::now())
                    .await
                    .unwrap();
            }));
        }

        for _ in 0..40 {
            tokio::task::yield_now().await;
            for listed in repo.load_goals(None).unwrap() {
                assert_eq!(listed.current_amount, 5.0 * listed.contributions.len() as f64);
            }
            let single = repo.get_goal(&goal.id).unwrap();
            assert_eq!(single.current_amount, 5.0 * single.contributions.len() as f64);
        }
        for handle in handles {
            handle.await.unwrap();
        }
        assert_eq!(repo.get_goal(&goal.id).unwrap().contributions.len(), 20);
    }

    #[tokio::test]
    async fn test_overflowing_contribution_is_rejected_and_rolled_back() {
        let (repo, pool, _temp_dir) = create_test_repository();
        let goal = repo
            .insert_new_goal(draft("Huge", f64::MAX, 30))
            .await
            .unwrap();
        repo.add_contribution(goal.id.clone(), deposit(1e308), Utc::now())
            .await
            .unwrap();

        let overflow = repo
            .add_contribution(goal.id.clone(), deposit(1e308), Utc::now())
            .await;
        assert!(matches!(overflow, Err(Error::Validation(_))));

        let stored = repo.get_goal(&goal.id).unwrap();
        assert_eq!(stored.current_amount, 1e308);
        assert_eq!(stored.contributions.len(), 1);

        let mut conn = get_connection(&pool).unwrap();
        let count: i64 = contributions::table.count().get_result(&mut conn).unwrap();
        assert_eq!(count, 1);
    }
}
