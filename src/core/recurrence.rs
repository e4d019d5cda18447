use chrono::{Datelike, NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::task::{Task, TaskStatus};

/// Fixed calendar offset applied to a deadline to produce the next
/// occurrence of a recurring task.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RecurrenceFrequency {
    Daily,
    Weekly,
    Biweekly,
    Monthly,
}

impl RecurrenceFrequency {
    pub fn label(&self) -> &'static str {
        match self {
            Self::Daily => "Daily",
            Self::Weekly => "Weekly",
            Self::Biweekly => "Every two weeks",
            Self::Monthly => "Monthly",
        }
    }

    pub const ALL: &'static [RecurrenceFrequency] = &[
        RecurrenceFrequency::Daily,
        RecurrenceFrequency::Weekly,
        RecurrenceFrequency::Biweekly,
        RecurrenceFrequency::Monthly,
    ];

    /// Next occurrence of a deadline under this frequency. Monthly uses
    /// calendar month arithmetic, not a fixed day count.
    pub fn next_deadline(&self, deadline: NaiveDateTime) -> NaiveDateTime {
        match self {
            Self::Daily => deadline + chrono::Duration::days(1),
            Self::Weekly => deadline + chrono::Duration::days(7),
            Self::Biweekly => deadline + chrono::Duration::days(14),
            Self::Monthly => NaiveDateTime::new(add_months(deadline.date(), 1), deadline.time()),
        }
    }
}

fn add_months(date: NaiveDate, months: u32) -> NaiveDate {
    let total_months = date.month0() + months;
    let new_year = date.year() + (total_months / 12) as i32;
    let new_month = (total_months % 12) + 1;
    // Clamp day to valid range for the new month
    let max_day = days_in_month(new_year, new_month);
    let new_day = date.day().min(max_day);
    NaiveDate::from_ymd_opt(new_year, new_month, new_day).unwrap_or(date)
}

fn days_in_month(year: i32, month: u32) -> u32 {
    NaiveDate::from_ymd_opt(
        if month == 12 { year + 1 } else { year },
        if month == 12 { 1 } else { month + 1 },
        1,
    )
    .unwrap()
    .pred_opt()
    .unwrap()
    .day()
}

/// Compute the follow-up task for a just-completed recurring task.
///
/// Returns `None` when the task does not recur, or when an end date is set
/// and the next deadline falls after it. The follow-up keeps the task's
/// descriptive fields, resets every checklist item, clears comments, and
/// starts over as ToDo under a fresh id.
pub fn successor(task: &Task) -> Option<Task> {
    if !task.is_recurring {
        return None;
    }
    let frequency = task.recurrence_frequency?;
    let next_deadline = frequency.next_deadline(task.deadline);
    if let Some(end) = task.recurrence_end_date {
        if next_deadline > end {
            return None;
        }
    }

    let mut next = task.clone();
    next.id = Uuid::new_v4().to_string();
    next.deadline = next_deadline;
    next.status = TaskStatus::ToDo;
    next.completed_at = None;
    next.is_archived = false;
    next.comments.clear();
    for item in &mut next.checklist {
        item.is_completed = false;
    }
    Some(next)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::task::ChecklistItem;

    fn datetime(y: i32, m: u32, d: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(y, m, d)
            .unwrap()
            .and_hms_opt(9, 30, 0)
            .unwrap()
    }

    fn recurring(frequency: RecurrenceFrequency, deadline: NaiveDateTime) -> Task {
        let mut task = Task::new("Fridge temperature log", deadline, "u-admin");
        task.is_recurring = true;
        task.recurrence_frequency = Some(frequency);
        task
    }

    #[test]
    fn daily_weekly_biweekly_offsets() {
        let deadline = datetime(2024, 3, 1);
        assert_eq!(
            RecurrenceFrequency::Daily.next_deadline(deadline),
            datetime(2024, 3, 2)
        );
        assert_eq!(
            RecurrenceFrequency::Weekly.next_deadline(deadline),
            datetime(2024, 3, 8)
        );
        assert_eq!(
            RecurrenceFrequency::Biweekly.next_deadline(deadline),
            datetime(2024, 3, 15)
        );
    }

    #[test]
    fn monthly_clamps_to_month_end() {
        assert_eq!(
            RecurrenceFrequency::Monthly.next_deadline(datetime(2024, 1, 31)),
            datetime(2024, 2, 29)
        );
        assert_eq!(
            RecurrenceFrequency::Monthly.next_deadline(datetime(2023, 1, 31)),
            datetime(2023, 2, 28)
        );
        assert_eq!(
            RecurrenceFrequency::Monthly.next_deadline(datetime(2024, 12, 15)),
            datetime(2025, 1, 15)
        );
    }

    #[test]
    fn successor_resets_checklist_and_comments() {
        let mut task = recurring(RecurrenceFrequency::Weekly, datetime(2024, 3, 1));
        task.assignee_ids.push("u-1".to_string());
        let mut item = ChecklistItem::new("Read the probe");
        item.is_completed = true;
        task.checklist.push(item);
        task.complete(datetime(2024, 3, 1));

        let next = successor(&task).unwrap();
        assert_ne!(next.id, task.id);
        assert_eq!(next.title, task.title);
        assert_eq!(next.assignee_ids, task.assignee_ids);
        assert_eq!(next.deadline, datetime(2024, 3, 8));
        assert_eq!(next.status, TaskStatus::ToDo);
        assert!(next.completed_at.is_none());
        assert!(next.comments.is_empty());
        assert!(next.checklist.iter().all(|i| !i.is_completed));
    }

    #[test]
    fn no_successor_past_end_date() {
        let mut task = recurring(RecurrenceFrequency::Weekly, datetime(2024, 3, 1));
        task.recurrence_end_date = Some(datetime(2024, 3, 5));
        assert!(successor(&task).is_none());
    }

    #[test]
    fn successor_on_end_date_is_created() {
        let mut task = recurring(RecurrenceFrequency::Weekly, datetime(2024, 3, 1));
        task.recurrence_end_date = Some(datetime(2024, 3, 8));
        assert!(successor(&task).is_some());
    }

    #[test]
    fn non_recurring_task_has_no_successor() {
        let task = Task::new("One-off", datetime(2024, 3, 1), "u-admin");
        assert!(successor(&task).is_none());

        let mut missing_frequency = recurring(RecurrenceFrequency::Daily, datetime(2024, 3, 1));
        missing_frequency.recurrence_frequency = None;
        assert!(successor(&missing_frequency).is_none());
    }
}
