//! Database models for goals and their contributions.

use chrono::{NaiveDate, NaiveDateTime};
use diesel::prelude::*;

use fintrack_core::goals::{Contribution, Goal, GoalStatus};

/// Database model for goals
#[derive(Queryable, Identifiable, Selectable, PartialEq, Debug, Clone)]
#[diesel(table_name = crate::schema::goals)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct GoalDB {
    pub id: String,
    pub title: String,
    pub target_amount: f64,
    pub current_amount: f64,
    pub deadline: NaiveDate,
    pub status: String,
    pub created_by: Option<String>,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

/// Database model for creating a new goal
#[derive(Insertable, Debug, Clone)]
#[diesel(table_name = crate::schema::goals)]
pub struct NewGoalDB {
    pub id: String,
    pub title: String,
    pub target_amount: f64,
    pub current_amount: f64,
    pub deadline: NaiveDate,
    pub status: String,
    pub created_by: Option<String>,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

/// Changeset for the caller-owned goal fields. `None` leaves a column as is.
#[derive(AsChangeset, Debug, Clone)]
#[diesel(table_name = crate::schema::goals)]
pub struct GoalChangesDB {
    pub title: Option<String>,
    pub target_amount: Option<f64>,
    pub deadline: Option<NaiveDate>,
    pub updated_at: NaiveDateTime,
}

/// Database model for contributions
#[derive(Queryable, Identifiable, Insertable, Selectable, PartialEq, Debug, Clone)]
#[diesel(table_name = crate::schema::contributions)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct ContributionDB {
    pub id: String,
    pub amount: f64,
    pub contributed_on: NaiveDate,
    pub note: Option<String>,
    pub created_at: NaiveDateTime,
}

/// Ordered reference from a goal to one of its contributions
#[derive(Queryable, Insertable, Selectable, PartialEq, Debug, Clone)]
#[diesel(table_name = crate::schema::goal_contributions)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct GoalContributionDB {
    pub goal_id: String,
    pub contribution_id: String,
    pub position: i32,
}

impl GoalDB {
    /// Builds the domain goal; `contributions` are the ordered reference ids.
    pub fn into_domain(self, contributions: Vec<String>) -> Goal {
        Goal {
            id: self.id,
            title: self.title,
            target_amount: self.target_amount,
            current_amount: self.current_amount,
            deadline: self.deadline,
            status: GoalStatus::from_db(&self.status),
            contributions,
            created_by: self.created_by,
            created_at: self.created_at,
            updated_at: self.updated_at,
        }
    }
}

impl From<ContributionDB> for Contribution {
    fn from(db: ContributionDB) -> Self {
        Self {
            id: db.id,
            amount: db.amount,
            contributed_on: db.contributed_on,
            note: db.note,
            created_at: db.created_at,
        }
    }
}
