use std::path::PathBuf;

use chrono::NaiveDateTime;
use serde::Serialize;

use mortar::core::message::{Attachment, Mailbox};
use mortar::core::recurrence::RecurrenceFrequency;
use mortar::core::resource::KnowledgeResource;
use mortar::core::task::{Task, TaskPriority, TaskStatus};
use mortar::core::user::{Theme, User, UserRole, UserStatus};
use mortar::import::ImportedDocument;
use mortar::services::Session;

/// Top-level views, one per sidebar entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum View {
    Tasks,
    Messages,
    KnowledgeBase,
    Users,
    Pending,
    Reports,
    Archives,
    Account,
}

impl View {
    pub fn title(&self) -> &'static str {
        match self {
            Self::Tasks => "Tasks",
            Self::Messages => "Messages",
            Self::KnowledgeBase => "Knowledge Base",
            Self::Users => "Team",
            Self::Pending => "Pending Approval",
            Self::Reports => "Reports",
            Self::Archives => "Archived Tasks",
            Self::Account => "My Account",
        }
    }

    /// Views only admins can open.
    pub fn admin_only(&self) -> bool {
        matches!(self, Self::Users | Self::Pending | Self::Reports | Self::Archives)
    }

    pub const ALL: &'static [View] = &[
        View::Tasks,
        View::Messages,
        View::KnowledgeBase,
        View::Users,
        View::Pending,
        View::Reports,
        View::Archives,
        View::Account,
    ];
}

/// How the task board is laid out.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum BoardLayout {
    Kanban,
    Calendar,
}

/// The modal currently covering the active view, if any.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum Modal {
    NewTask,
    EditTask(String),
    Compose,
    Briefing,
    Ask(String),
    Reminder(String),
    AddUser,
    WelcomeBack,
}

/// New-task form payload.
#[derive(Debug, Clone)]
pub struct TaskDraft {
    pub title: String,
    pub checklist: Vec<String>,
    pub assignee_ids: Vec<String>,
    pub deadline: NaiveDateTime,
    pub priority: TaskPriority,
    pub is_private: bool,
    pub is_recurring: bool,
    pub recurrence_frequency: Option<RecurrenceFrequency>,
    pub recurrence_end_date: Option<NaiveDateTime>,
}

/// Compose form payload.
#[derive(Debug, Clone)]
pub struct MessageDraft {
    pub recipient_ids: Vec<String>,
    pub subject: String,
    pub body: String,
    pub attachments: Vec<Attachment>,
}

/// Add-user form payload.
#[derive(Debug, Clone)]
pub struct UserDraft {
    pub name: String,
    pub email: String,
    pub role: UserRole,
}

/// New-resource form payload.
#[derive(Debug, Clone)]
pub struct ResourceDraft {
    pub title: String,
    pub content: String,
    pub folder_id: Option<String>,
    pub tags: Vec<String>,
}

#[derive(Debug, Clone)]
pub enum Message {
    // Session
    SignIn { email: String, password: String },
    SignedIn(Result<Session, String>),
    SignOut,
    SignedOut(Result<(), String>),
    SubmitPasswordChange { current: String, new: String },
    PasswordChanged(Result<(), String>),
    RequestPasswordReset(String),
    PasswordResetRequested(Result<(), String>),
    SubmitEmail(String),

    // Live collection pushes
    TasksChanged(Vec<Task>),
    MessagesChanged(Vec<mortar::core::message::Message>),
    UsersChanged(Vec<User>),
    ResourcesChanged(Vec<KnowledgeResource>),
    FoldersChanged(Vec<mortar::core::resource::Folder>),

    // Navigation & view state
    SelectView(View),
    SetBoardLayout(BoardLayout),
    SelectMailbox(Mailbox),
    SelectFolder(Option<String>),
    SelectUserDetail(Option<String>),
    OpenModal(Modal),
    CloseModal,
    DismissAlert,
    DismissWelcomeBack,

    // Tasks
    SubmitNewTask(TaskDraft),
    SubmitTaskEdit(Task),
    ToggleChecklistItem { task_id: String, item_id: String },
    SetTaskStatus { task_id: String, status: TaskStatus },
    SetTaskPriority { task_id: String, priority: TaskPriority },
    SetTaskPrivacy { task_id: String, is_private: bool },
    SetTaskArchived { task_id: String, is_archived: bool },
    DeleteTask(String),
    AddTaskComment { task_id: String, text: String },
    ApproveTask(String),
    RejectTask(String),
    SendReminder { task_id: String, note: String },

    // Messaging
    SendMessage(MessageDraft),
    SetMessageRead { message_id: String, is_read: bool },
    SetMessageArchived { message_id: String, is_archived: bool },
    TrashMessage(String),
    PermanentlyDeleteMessage(String),

    // Knowledge base
    SubmitNewResource(ResourceDraft),
    SubmitResourceEdit(KnowledgeResource),
    DeleteResource(String),
    AddFolder(String),
    RenameFolder { folder_id: String, name: String },
    DeleteFolder(String),
    ImportFile(PathBuf),
    FileImported(Result<ImportedDocument, String>),
    AskKnowledgeBase { resource_id: String, question: String },
    AnswerReady(Result<String, String>),

    // User administration
    SubmitNewUser(UserDraft),
    SubmitUserEdit(User),
    SetUserStatus { user_id: String, status: UserStatus },
    SetTheme(Theme),

    // Daily briefing
    GenerateBriefing,
    BriefingReady(Result<String, String>),

    Quit,
}

/// Async effects returned by `update`. The event loop spawns each one and
/// feeds the resulting message back into the queue; effects cannot be
/// cancelled and complete in no particular order.
#[derive(Debug, Clone)]
pub enum Command {
    SignIn { email: String, password: String },
    SignOut { token: String },
    ChangePassword { token: String, current: String, new: String },
    ResetPassword { email: String },
    GenerateBriefing { tasks: Vec<Task>, users: Vec<User> },
    AskKnowledgeBase { question: String, context: String },
    ImportFile(PathBuf),
}
