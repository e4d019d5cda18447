use chrono::NaiveDate;

use super::task::{Task, TaskPriority};

/// `{total, completed}` for one priority bucket.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BucketProgress {
    pub total: u32,
    pub completed: u32,
}

/// Per-priority progress over the user's tasks due today. Feeds the
/// dashboard progress rings; recomputed on demand, never persisted.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DailyProgress {
    pub urgent: BucketProgress,
    pub important: BucketProgress,
    pub general: BucketProgress,
}

impl DailyProgress {
    pub fn build(user_id: &str, tasks: &[Task], today: NaiveDate) -> Self {
        let mut progress = Self::default();
        for task in tasks {
            if !task.is_assigned_to(user_id) || !task.is_due_on(today) {
                continue;
            }
            let bucket = progress.bucket_mut(task.priority);
            bucket.total += 1;
            if task.status.is_done() {
                bucket.completed += 1;
            }
        }
        progress
    }

    pub fn bucket(&self, priority: TaskPriority) -> BucketProgress {
        match priority {
            TaskPriority::Urgent => self.urgent,
            TaskPriority::Important => self.important,
            TaskPriority::General => self.general,
        }
    }

    fn bucket_mut(&mut self, priority: TaskPriority) -> &mut BucketProgress {
        match priority {
            TaskPriority::Urgent => &mut self.urgent,
            TaskPriority::Important => &mut self.important,
            TaskPriority::General => &mut self.general,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 6, d).unwrap()
    }

    fn task_due(user_id: &str, d: u32, priority: TaskPriority, done: bool) -> Task {
        let deadline = day(d).and_hms_opt(17, 0, 0).unwrap();
        let mut task = Task::new("Till reconciliation", deadline, "u-admin");
        task.assignee_ids.push(user_id.to_string());
        task.priority = priority;
        if done {
            task.complete(deadline);
        }
        task
    }

    #[test]
    fn buckets_by_priority_for_todays_tasks() {
        let tasks = vec![
            task_due("u-1", 10, TaskPriority::Urgent, true),
            task_due("u-1", 10, TaskPriority::Urgent, false),
            task_due("u-1", 10, TaskPriority::General, false),
            // Wrong day and wrong user stay out of the buckets
            task_due("u-1", 11, TaskPriority::Important, false),
            task_due("u-2", 10, TaskPriority::Important, true),
        ];

        let progress = DailyProgress::build("u-1", &tasks, day(10));
        assert_eq!(progress.urgent, BucketProgress { total: 2, completed: 1 });
        assert_eq!(progress.important, BucketProgress::default());
        assert_eq!(progress.general, BucketProgress { total: 1, completed: 0 });
    }
}
