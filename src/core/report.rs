use chrono::NaiveDateTime;

use super::task::{Task, TaskPriority, TaskStatus};
use super::user::User;

/// Completion counts for one active employee.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmployeePerformance {
    pub user_id: String,
    pub name: String,
    pub assigned: u32,
    pub completed: u32,
    pub completed_urgent: u32,
    pub completed_important: u32,
    pub completed_general: u32,
}

/// Org-wide reporting aggregates, rebuilt from the live task list on demand.
#[derive(Debug, Clone, Default)]
pub struct Report {
    pub total_tasks: u32,
    pub completed_tasks: u32,
    /// Whole percent, 0 when there are no tasks.
    pub completion_rate: u32,
    pub completed_urgent: u32,
    pub completed_important: u32,
    pub completed_general: u32,
    pub overdue: Vec<Task>,
    pub employees: Vec<EmployeePerformance>,
}

impl Report {
    pub fn build(tasks: &[Task], users: &[User], now: NaiveDateTime) -> Self {
        let total_tasks = tasks.len() as u32;
        let completed: Vec<&Task> = tasks.iter().filter(|t| t.status.is_done()).collect();
        let completed_tasks = completed.len() as u32;
        let completion_rate = if total_tasks > 0 {
            (completed_tasks as f64 / total_tasks as f64 * 100.0).round() as u32
        } else {
            0
        };

        let by_priority = |priority: TaskPriority| {
            completed.iter().filter(|t| t.priority == priority).count() as u32
        };

        let overdue: Vec<Task> = tasks
            .iter()
            .filter(|t| t.is_overdue(now))
            .cloned()
            .collect();

        let employees = users
            .iter()
            .filter(|u| u.is_active_employee())
            .map(|user| {
                let assigned: Vec<&Task> = tasks
                    .iter()
                    .filter(|t| t.is_assigned_to(&user.id))
                    .collect();
                let done: Vec<&&Task> =
                    assigned.iter().filter(|t| t.status.is_done()).collect();
                let done_with = |priority: TaskPriority| {
                    done.iter().filter(|t| t.priority == priority).count() as u32
                };
                EmployeePerformance {
                    user_id: user.id.clone(),
                    name: user.name.clone(),
                    assigned: assigned.len() as u32,
                    completed: done.len() as u32,
                    completed_urgent: done_with(TaskPriority::Urgent),
                    completed_important: done_with(TaskPriority::Important),
                    completed_general: done_with(TaskPriority::General),
                }
            })
            .collect();

        Self {
            total_tasks,
            completed_tasks,
            completion_rate,
            completed_urgent: by_priority(TaskPriority::Urgent),
            completed_important: by_priority(TaskPriority::Important),
            completed_general: by_priority(TaskPriority::General),
            overdue,
            employees,
        }
    }

    /// Completed tasks assigned to one user, for the per-user detail view.
    pub fn completed_for<'a>(tasks: &'a [Task], user_id: &str) -> Vec<&'a Task> {
        tasks
            .iter()
            .filter(|t| t.status == TaskStatus::Done && t.is_assigned_to(user_id))
            .collect()
    }
}
