use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::recurrence::RecurrenceFrequency;
use super::user::{User, UserRole};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TaskStatus {
    ToDo,
    InProgress,
    Done,
    PendingApproval,
}

impl TaskStatus {
    pub fn label(&self) -> &'static str {
        match self {
            Self::ToDo => "To Do",
            Self::InProgress => "In Progress",
            Self::Done => "Done",
            Self::PendingApproval => "Pending Approval",
        }
    }

    pub fn is_done(&self) -> bool {
        matches!(self, Self::Done)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TaskPriority {
    Urgent,
    Important,
    General,
}

impl TaskPriority {
    pub fn label(&self) -> &'static str {
        match self {
            Self::Urgent => "Urgent",
            Self::Important => "Important",
            Self::General => "General",
        }
    }

    pub const ALL: &'static [TaskPriority] = &[
        TaskPriority::Urgent,
        TaskPriority::Important,
        TaskPriority::General,
    ];
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChecklistItem {
    pub id: String,
    pub text: String,
    pub is_completed: bool,
}

impl ChecklistItem {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            text: text.into(),
            is_completed: false,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskComment {
    pub id: String,
    pub author_id: String,
    pub timestamp: NaiveDateTime,
    pub text: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Task {
    pub id: String,
    pub title: String,
    pub checklist: Vec<ChecklistItem>,
    pub assignee_ids: Vec<String>,
    pub deadline: NaiveDateTime,
    pub status: TaskStatus,
    pub priority: TaskPriority,
    pub is_private: bool,
    pub is_recurring: bool,
    pub recurrence_frequency: Option<RecurrenceFrequency>,
    pub recurrence_end_date: Option<NaiveDateTime>,
    pub is_archived: bool,
    pub created_by: String,
    pub comments: Vec<TaskComment>,
    pub completed_at: Option<NaiveDateTime>,
}

impl Task {
    pub fn new(
        title: impl Into<String>,
        deadline: NaiveDateTime,
        created_by: impl Into<String>,
    ) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            title: title.into(),
            checklist: Vec::new(),
            assignee_ids: Vec::new(),
            deadline,
            status: TaskStatus::ToDo,
            priority: TaskPriority::General,
            is_private: false,
            is_recurring: false,
            recurrence_frequency: None,
            recurrence_end_date: None,
            is_archived: false,
            created_by: created_by.into(),
            comments: Vec::new(),
            completed_at: None,
        }
    }

    /// Mark done, stamping the completion time. `completed_at` is set if and
    /// only if status is Done.
    pub fn complete(&mut self, now: NaiveDateTime) {
        self.status = TaskStatus::Done;
        self.completed_at = Some(now);
    }

    pub fn is_assigned_to(&self, user_id: &str) -> bool {
        self.assignee_ids.iter().any(|id| id == user_id)
    }

    /// Privacy rule: admins see everything; everyone else sees a private
    /// task only as its creator or an assignee.
    pub fn visible_to(&self, user: &User) -> bool {
        if user.role == UserRole::Admin {
            return true;
        }
        !self.is_private || self.created_by == user.id || self.is_assigned_to(&user.id)
    }

    pub fn is_overdue(&self, now: NaiveDateTime) -> bool {
        self.deadline < now && !self.status.is_done()
    }

    pub fn is_due_on(&self, day: NaiveDate) -> bool {
        self.deadline.date() == day
    }
}

/// Apply a manual status change. Returns true when this call drove the task
/// into Done, the completion edge the recurrence hook hangs off. Setting
/// Done on an already-Done task is not a new edge, so the hook cannot fire
/// twice for one completion.
pub fn set_status(task: &mut Task, status: TaskStatus, now: NaiveDateTime) -> bool {
    let was_done = task.status == TaskStatus::Done;
    task.status = status;
    if status == TaskStatus::Done {
        if was_done {
            return false;
        }
        task.completed_at = Some(now);
        true
    } else {
        task.completed_at = None;
        false
    }
}

/// Toggle one checklist item and derive the task's status from the
/// checklist: all items checked completes the task, a first check moves
/// ToDo to InProgress, unchecking the last moves InProgress back to ToDo.
/// Returns true when the toggle completed the task.
pub fn toggle_checklist_item(task: &mut Task, item_id: &str, now: NaiveDateTime) -> bool {
    let Some(item) = task.checklist.iter_mut().find(|i| i.id == item_id) else {
        return false;
    };
    item.is_completed = !item.is_completed;

    let all_completed = task.checklist.iter().all(|i| i.is_completed);
    let any_completed = task.checklist.iter().any(|i| i.is_completed);

    if all_completed && task.status != TaskStatus::Done {
        task.complete(now);
        return true;
    }
    if task.status == TaskStatus::ToDo && any_completed {
        task.status = TaskStatus::InProgress;
    } else if task.status == TaskStatus::InProgress && !any_completed {
        task.status = TaskStatus::ToDo;
    }
    false
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::user::UserRole;

    fn datetime(y: i32, m: u32, d: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(y, m, d)
            .unwrap()
            .and_hms_opt(12, 0, 0)
            .unwrap()
    }

    fn task_with_checklist(items: usize) -> Task {
        let mut task = Task::new("Count the safe", datetime(2024, 3, 1), "u-admin");
        for i in 0..items {
            task.checklist.push(ChecklistItem::new(format!("Step {}", i + 1)));
        }
        task
    }

    #[test]
    fn checklist_completion_marks_done() {
        let mut task = task_with_checklist(2);
        let now = datetime(2024, 3, 1);

        let first = task.checklist[0].id.clone();
        assert!(!toggle_checklist_item(&mut task, &first, now));
        assert_eq!(task.status, TaskStatus::InProgress);
        assert!(task.completed_at.is_none());

        let second = task.checklist[1].id.clone();
        assert!(toggle_checklist_item(&mut task, &second, now));
        assert_eq!(task.status, TaskStatus::Done);
        assert_eq!(task.completed_at, Some(now));
    }

    #[test]
    fn unchecking_last_item_reverts_to_todo() {
        let mut task = task_with_checklist(2);
        let now = datetime(2024, 3, 1);
        let first = task.checklist[0].id.clone();

        toggle_checklist_item(&mut task, &first, now);
        assert_eq!(task.status, TaskStatus::InProgress);

        // Untick the same item: zero checked, back to ToDo
        toggle_checklist_item(&mut task, &first, now);
        assert_eq!(task.status, TaskStatus::ToDo);
    }

    #[test]
    fn unchecking_with_items_remaining_keeps_status() {
        let mut task = task_with_checklist(3);
        let now = datetime(2024, 3, 1);
        let first = task.checklist[0].id.clone();
        let second = task.checklist[1].id.clone();

        toggle_checklist_item(&mut task, &first, now);
        toggle_checklist_item(&mut task, &second, now);
        assert_eq!(task.status, TaskStatus::InProgress);

        toggle_checklist_item(&mut task, &second, now);
        assert_eq!(task.status, TaskStatus::InProgress);
    }

    #[test]
    fn manual_done_is_edge_triggered() {
        let mut task = task_with_checklist(0);
        let now = datetime(2024, 3, 2);

        assert!(set_status(&mut task, TaskStatus::Done, now));
        assert_eq!(task.completed_at, Some(now));

        // Second Done is not a new completion edge
        assert!(!set_status(&mut task, TaskStatus::Done, now));

        assert!(!set_status(&mut task, TaskStatus::ToDo, now));
        assert!(task.completed_at.is_none());
    }

    #[test]
    fn private_task_visibility() {
        let mut task = Task::new("Narcotics recount", datetime(2024, 3, 1), "u-creator");
        task.is_private = true;
        task.assignee_ids.push("u-assignee".to_string());

        let mut admin = User::new("Dana", "dana@rx.test", UserRole::Admin);
        admin.id = "u-admin".to_string();
        let mut creator = User::new("Lee", "lee@rx.test", UserRole::Employee);
        creator.id = "u-creator".to_string();
        let mut assignee = User::new("Sam", "sam@rx.test", UserRole::Employee);
        assignee.id = "u-assignee".to_string();
        let mut outsider = User::new("Pat", "pat@rx.test", UserRole::Employee);
        outsider.id = "u-outsider".to_string();

        assert!(task.visible_to(&admin));
        assert!(task.visible_to(&creator));
        assert!(task.visible_to(&assignee));
        assert!(!task.visible_to(&outsider));

        task.is_private = false;
        assert!(task.visible_to(&outsider));
    }

    #[test]
    fn status_roundtrips_through_wire_names() {
        let json = serde_json::to_string(&TaskStatus::PendingApproval).unwrap();
        assert_eq!(json, "\"PENDING_APPROVAL\"");
        let back: TaskStatus = serde_json::from_str("\"IN_PROGRESS\"").unwrap();
        assert_eq!(back, TaskStatus::InProgress);
    }
}
