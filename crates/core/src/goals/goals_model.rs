//! Goals domain models.

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::errors::{Error, Result, ValidationError};

/// Smallest accepted target amount for a goal.
pub const MIN_TARGET_AMOUNT: f64 = 1.0;

/// Lifecycle state of a goal. Always derived, never accepted from callers.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum GoalStatus {
    Active,
    Completed,
    Expired,
}

impl GoalStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            GoalStatus::Active => "Active",
            GoalStatus::Completed => "Completed",
            GoalStatus::Expired => "Expired",
        }
    }

    /// Maps a stored value back to a status. Unknown values read as `Active`;
    /// the service re-derives the status before returning a goal anyway.
    pub fn from_db(value: &str) -> Self {
        match value {
            "Completed" => GoalStatus::Completed,
            "Expired" => GoalStatus::Expired,
            _ => GoalStatus::Active,
        }
    }

    /// Derives the status of a goal.
    ///
    /// Reaching the target wins over a passed deadline. A deadline counts as
    /// passed once its calendar day (UTC) is over.
    pub fn derive(
        current_amount: f64,
        target_amount: f64,
        deadline: NaiveDate,
        now: DateTime<Utc>,
    ) -> Self {
        if current_amount >= target_amount {
            GoalStatus::Completed
        } else if deadline < now.date_naive() {
            GoalStatus::Expired
        } else {
            GoalStatus::Active
        }
    }
}

impl std::fmt::Display for GoalStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Domain model representing a savings goal
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Goal {
    pub id: String,
    pub title: String,
    pub target_amount: f64,
    pub current_amount: f64,
    pub deadline: NaiveDate,
    pub status: GoalStatus,
    /// Contribution ids in the order they were recorded.
    pub contributions: Vec<String>,
    pub created_by: Option<String>,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

impl Goal {
    /// Recomputes `status` against `now`. Returns true when it changed.
    pub fn refresh_status(&mut self, now: DateTime<Utc>) -> bool {
        let derived =
            GoalStatus::derive(self.current_amount, self.target_amount, self.deadline, now);
        let changed = derived != self.status;
        self.status = derived;
        changed
    }
}

/// Input model for creating a new goal
#[derive(Serialize, Deserialize, Debug, Clone, Default)]
#[serde(rename_all = "camelCase", default)]
pub struct NewGoal {
    pub title: String,
    pub target_amount: f64,
    /// `YYYY-MM-DD` or an RFC 3339 timestamp.
    pub deadline: Option<String>,
    pub created_by: Option<String>,
}

/// Partial update of a goal's caller-owned fields.
#[derive(Serialize, Deserialize, Debug, Clone, Default)]
#[serde(rename_all = "camelCase", default)]
pub struct GoalUpdate {
    pub title: Option<String>,
    pub target_amount: Option<f64>,
    pub deadline: Option<String>,
}

/// Validated goal ready to be inserted.
#[derive(Debug, Clone, PartialEq)]
pub struct GoalDraft {
    pub title: String,
    pub target_amount: f64,
    pub deadline: NaiveDate,
    pub status: GoalStatus,
    pub created_by: Option<String>,
}

/// Validated changes ready to be applied to a stored goal.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct GoalChanges {
    pub title: Option<String>,
    pub target_amount: Option<f64>,
    pub deadline: Option<NaiveDate>,
}

/// Domain model for a single deposit towards a goal
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Contribution {
    pub id: String,
    pub amount: f64,
    pub contributed_on: NaiveDate,
    pub note: Option<String>,
    pub created_at: NaiveDateTime,
}

/// Input model for recording a contribution
#[derive(Serialize, Deserialize, Debug, Clone, Default)]
#[serde(rename_all = "camelCase", default)]
pub struct NewContribution {
    pub amount: f64,
    pub contributed_on: Option<NaiveDate>,
    pub note: Option<String>,
}

/// Progress of a single goal, as shown on dashboards.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct GoalProgress {
    pub goal_id: String,
    pub title: String,
    pub target_amount: f64,
    pub current_amount: f64,
    pub remaining_amount: f64,
    pub progress_percent: f64,
    /// Days until the deadline; negative once it has passed.
    pub days_remaining: i64,
    pub status: GoalStatus,
}

impl GoalProgress {
    pub fn from_goal(goal: &Goal, today: NaiveDate) -> Self {
        let remaining_amount = (goal.target_amount - goal.current_amount).max(0.0);
        let progress_percent = if goal.target_amount > 0.0 {
            (goal.current_amount / goal.target_amount * 100.0).min(100.0)
        } else {
            0.0
        };
        GoalProgress {
            goal_id: goal.id.clone(),
            title: goal.title.clone(),
            target_amount: goal.target_amount,
            current_amount: goal.current_amount,
            remaining_amount,
            progress_percent,
            days_remaining: (goal.deadline - today).num_days(),
            status: goal.status,
        }
    }
}

/// Totals across a set of goals.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct GoalsSummary {
    pub total_target: f64,
    pub total_saved: f64,
    pub active_count: usize,
    pub completed_count: usize,
    pub expired_count: usize,
}

impl GoalsSummary {
    pub fn from_goals(goals: &[Goal]) -> Self {
        goals.iter().fold(GoalsSummary::default(), |mut acc, goal| {
            acc.total_target += goal.target_amount;
            acc.total_saved += goal.current_amount;
            match goal.status {
                GoalStatus::Active => acc.active_count += 1,
                GoalStatus::Completed => acc.completed_count += 1,
                GoalStatus::Expired => acc.expired_count += 1,
            }
            acc
        })
    }
}

// === Input validation ===

pub(crate) fn validate_title(title: &str) -> Result<String> {
    let trimmed = title.trim();
    if trimmed.is_empty() {
        return Err(Error::invalid_input("Goal title cannot be empty"));
    }
    Ok(trimmed.to_string())
}

pub(crate) fn validate_target_amount(target_amount: f64) -> Result<f64> {
    if !target_amount.is_finite() || target_amount < MIN_TARGET_AMOUNT {
        return Err(Error::invalid_input(format!(
            "Target amount must be at least {}, got {}",
            MIN_TARGET_AMOUNT, target_amount
        )));
    }
    Ok(target_amount)
}

pub(crate) fn validate_contribution_amount(amount: f64) -> Result<f64> {
    if !amount.is_finite() || amount <= 0.0 {
        return Err(Error::invalid_input(format!(
            "Contribution amount must be positive, got {}",
            amount
        )));
    }
    Ok(amount)
}

/// Parses a deadline given as `YYYY-MM-DD` or as an RFC 3339 timestamp.
pub fn parse_deadline(raw: Option<&str>) -> Result<NaiveDate> {
    let raw = raw
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .ok_or_else(|| ValidationError::MissingField("deadline".to_string()))?;

    if let Ok(date) = NaiveDate::parse_from_str(raw, "%Y-%m-%d") {
        return Ok(date);
    }
    let timestamp = DateTime::parse_from_rfc3339(raw)?;
    Ok(timestamp.with_timezone(&Utc).date_naive())
}

impl NewGoal {
    /// Validates the input and derives the initial status.
    pub fn into_draft(self, now: DateTime<Utc>) -> Result<GoalDraft> {
        let title = validate_title(&self.title)?;
        let target_amount = validate_target_amount(self.target_amount)?;
        let deadline = parse_deadline(self.deadline.as_deref())?;
        let created_by = self
            .created_by
            .map(|user| user.trim().to_string())
            .filter(|user| !user.is_empty());

        Ok(GoalDraft {
            status: GoalStatus::derive(0.0, target_amount, deadline, now),
            title,
            target_amount,
            deadline,
            created_by,
        })
    }
}

impl GoalUpdate {
    pub fn validate(self) -> Result<GoalChanges> {
        Ok(GoalChanges {
            title: self.title.as_deref().map(validate_title).transpose()?,
            target_amount: self.target_amount.map(validate_target_amount).transpose()?,
            deadline: match self.deadline {
                Some(raw) => Some(parse_deadline(Some(&raw))?),
                None => None,
            },
        })
    }
}

impl NewContribution {
    pub fn validate(mut self, today: NaiveDate) -> Result<NewContribution> {
        self.amount = validate_contribution_amount(self.amount)?;
        self.contributed_on.get_or_insert(today);
        self.note = self
            .note
            .map(|note| note.trim().to_string())
            .filter(|note| !note.is_empty());
        Ok(self)
    }
}
