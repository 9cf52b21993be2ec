//! Property-based tests for goal status derivation and progress reporting.

use chrono::{Duration, NaiveDate, TimeZone, Utc};
use fintrack_core::goals::{Goal, GoalProgress, GoalStatus, GoalsSummary};
use proptest::prelude::*;

fn fixed_now() -> chrono::DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 6, 15, 12, 0, 0).unwrap()
}

fn deadline_from_offset(days: i64) -> NaiveDate {
    fixed_now().date_naive() + Duration::days(days)
}

fn arb_goal() -> impl Strategy<Value = Goal> {
    (1.0f64..100_000.0, 0.0f64..150_000.0, -400i64..400).prop_map(|(target, current, offset)| {
        let now = fixed_now();
        let deadline = deadline_from_offset(offset);
        Goal {
            id: format!("g-{}-{}", offset, target as i64),
            title: "Generated".to_string(),
            target_amount: target,
            current_amount: current,
            deadline,
            status: GoalStatus::derive(current, target, deadline, now),
            contributions: Vec::new(),
            created_by: None,
            created_at: now.naive_utc(),
            updated_at: now.naive_utc(),
        }
    })
}

proptest! {
    #[test]
    fn reaching_target_always_completes(
        target in 1.0f64..100_000.0,
        extra in 0.0f64..10_000.0,
        offset in -400i64..400,
    ) {
        let status = GoalStatus::derive(target + extra, target, deadline_from_offset(offset), fixed_now());
        prop_assert_eq!(status, GoalStatus::Completed);
    }

    #[test]
    fn short_of_target_depends_only_on_deadline(
        target in 1.0f64..100_000.0,
        fraction in 0.0f64..0.999,
        offset in -400i64..400,
    ) {
        let status = GoalStatus::derive(target * fraction, target, deadline_from_offset(offset), fixed_now());
        let expected = if offset < 0 { GoalStatus::Expired } else { GoalStatus::Active };
        prop_assert_eq!(status, expected);
    }

    #[test]
    fn progress_stays_within_bounds(goal in arb_goal()) {
        let progress = GoalProgress::from_goal(&goal, fixed_now().date_naive());
        prop_assert!(progress.progress_percent >= 0.0);
        prop_assert!(progress.progress_percent <= 100.0);
        prop_assert!(progress.remaining_amount >= 0.0);
        prop_assert_eq!(progress.status, goal.status);
    }

    #[test]
    fn summary_counts_every_goal_once(goals in prop::collection::vec(arb_goal(), 0..20)) {
        let summary = GoalsSummary::from_goals(&goals);
        prop_assert_eq!(
            summary.active_count + summary.completed_count + summary.expired_count,
            goals.len()
        );
        let completed = goals.iter().filter(|g| g.status == GoalStatus::Completed).count();
        prop_assert_eq!(summary.completed_count, completed);
    }
}
