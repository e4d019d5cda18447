use chrono::NaiveDateTime;

use super::task::Task;

/// A user's run of consecutive completion days, ending at their most
/// recent completion.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Streak {
    pub count: u32,
    pub last_completion: Option<NaiveDateTime>,
}

/// Walk the user's completions newest-first, counting consecutive calendar
/// days. Dates are truncated to midnight before differencing; a second
/// completion on the same day neither extends nor breaks the run, and a gap
/// of more than one day ends it.
pub fn streak_for(user_id: &str, tasks: &[Task]) -> Streak {
    let mut completions: Vec<NaiveDateTime> = tasks
        .iter()
        .filter(|t| t.is_assigned_to(user_id) && t.status.is_done())
        .filter_map(|t| t.completed_at)
        .collect();
    if completions.is_empty() {
        return Streak::default();
    }
    completions.sort_by(|a, b| b.cmp(a));

    let mut count = 1u32;
    let mut current = completions[0].date();
    for ts in &completions[1..] {
        let gap = (current - ts.date()).num_days();
        if gap == 1 {
            count += 1;
            current = ts.date();
        } else if gap > 1 {
            break;
        }
    }

    Streak {
        count,
        last_completion: Some(completions[0]),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn completed_task(user_id: &str, y: i32, m: u32, d: u32, hour: u32) -> Task {
        let when = NaiveDate::from_ymd_opt(y, m, d)
            .unwrap()
            .and_hms_opt(hour, 0, 0)
            .unwrap();
        let mut task = Task::new("Shelf audit", when, "u-admin");
        task.assignee_ids.push(user_id.to_string());
        task.complete(when);
        task
    }

    #[test]
    fn streak_breaks_at_gap() {
        let tasks = vec![
            completed_task("u-1", 2024, 1, 10, 16),
            completed_task("u-1", 2024, 1, 9, 11),
            completed_task("u-1", 2024, 1, 8, 9),
            completed_task("u-1", 2024, 1, 5, 14),
        ];
        let streak = streak_for("u-1", &tasks);
        assert_eq!(streak.count, 3);
        assert_eq!(
            streak.last_completion,
            Some(
                NaiveDate::from_ymd_opt(2024, 1, 10)
                    .unwrap()
                    .and_hms_opt(16, 0, 0)
                    .unwrap()
            )
        );
    }

    #[test]
    fn same_day_completions_count_once() {
        let tasks = vec![
            completed_task("u-1", 2024, 1, 10, 16),
            completed_task("u-1", 2024, 1, 10, 8),
            completed_task("u-1", 2024, 1, 9, 12),
        ];
        assert_eq!(streak_for("u-1", &tasks).count, 2);
    }

    #[test]
    fn no_completions_means_zero() {
        let mut open = Task::new(
            "Unfinished",
            NaiveDate::from_ymd_opt(2024, 1, 10)
                .unwrap()
                .and_hms_opt(12, 0, 0)
                .unwrap(),
            "u-admin",
        );
        open.assignee_ids.push("u-1".to_string());

        let streak = streak_for("u-1", &[open]);
        assert_eq!(streak, Streak::default());
    }

    #[test]
    fn other_users_tasks_are_ignored() {
        let tasks = vec![
            completed_task("u-1", 2024, 1, 10, 10),
            completed_task("u-2", 2024, 1, 9, 10),
        ];
        assert_eq!(streak_for("u-1", &tasks).count, 1);
    }
}
