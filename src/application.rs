use chrono::Local;
use serde::Serialize;
use tokio::sync::{broadcast, mpsc};

use mortar::config::MortarConfig;
use mortar::core::message::{self as mail, Mailbox, Message as CoreMessage};
use mortar::core::progress::DailyProgress;
use mortar::core::recurrence;
use mortar::core::report::Report;
use mortar::core::resource::{Folder, KnowledgeResource};
use mortar::core::streak::{self, Streak};
use mortar::core::task::{self, ChecklistItem, Task, TaskComment, TaskStatus};
use mortar::core::user::{self, User};
use mortar::services::Session;
use mortar::store::org::OrgStore;

use crate::message::{BoardLayout, Command, Message, Modal, View};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LaunchMode {
    Normal,
    Briefing,
}

/// Transient state of one in-flight assistant request, shown inside the
/// modal that issued it.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum RequestState {
    #[default]
    Idle,
    Pending,
    Ready(String),
    Failed(String),
}

/// Explicit, serializable UI state: which view is active, which modal is
/// open, which entities are selected. Everything the shell renders from.
#[derive(Debug, Clone, Serialize)]
pub struct ViewState {
    pub view: View,
    pub board: BoardLayout,
    pub mailbox: Mailbox,
    pub modal: Option<Modal>,
    pub selected_folder: Option<String>,
    pub selected_user: Option<String>,
    /// Blocking alert text; cleared by `DismissAlert`.
    pub alert: Option<String>,
}

impl Default for ViewState {
    fn default() -> Self {
        Self {
            view: View::Tasks,
            board: BoardLayout::Kanban,
            mailbox: Mailbox::Inbox,
            modal: None,
            selected_folder: None,
            selected_user: None,
            alert: None,
        }
    }
}

pub struct Mortar {
    config: MortarConfig,
    launch_mode: LaunchMode,
    /// Handle back into the event loop, used to forward store pushes.
    tx: mpsc::UnboundedSender<Message>,

    // Session
    session: Option<Session>,
    sign_in_error: Option<String>,

    // Store and the latest pushed snapshots
    store: Option<OrgStore>,
    tasks: Vec<Task>,
    messages: Vec<CoreMessage>,
    users: Vec<User>,
    resources: Vec<KnowledgeResource>,
    folders: Vec<Folder>,

    view: ViewState,

    // Assistant state
    briefing: RequestState,
    answer: RequestState,

    // Admin welcome-back: tasks completed since the previous login
    newly_completed: Vec<Task>,

    should_exit: bool,
}

impl Mortar {
    pub fn new(
        config: MortarConfig,
        launch_mode: LaunchMode,
        tx: mpsc::UnboundedSender<Message>,
    ) -> Self {
        Self {
            config,
            launch_mode,
            tx,
            session: None,
            sign_in_error: None,
            store: None,
            tasks: Vec::new(),
            messages: Vec::new(),
            users: Vec::new(),
            resources: Vec::new(),
            folders: Vec::new(),
            view: ViewState::default(),
            briefing: RequestState::Idle,
            answer: RequestState::Idle,
            newly_completed: Vec::new(),
            should_exit: false,
        }
    }

    pub fn update(&mut self, message: Message) -> Vec<Command> {
        let mut commands: Vec<Command> = Vec::new();

        match message {
            // ---- Session -------------------------------------------------
            Message::SignIn { email, password } => {
                self.sign_in_error = None;
                commands.push(Command::SignIn { email, password });
            }

            Message::SignedIn(Ok(session)) => {
                self.sign_in_error = None;
                self.open_store(&session);
                let Some(store) = self.store.as_ref() else {
                    return commands;
                };
                if store.users.get(&session.user_id).is_none() {
                    log::error!("User document not found for {}", session.user_id);
                    self.sign_in_error = Some("User data not found".to_string());
                    self.close_session();
                    return commands;
                }
                log::info!("Signed in as {}", session.user_id);
                self.session = Some(session);
                self.after_sign_in();
            }

            Message::SignedIn(Err(e)) => {
                log::warn!("Sign-in failed: {}", e);
                self.sign_in_error = Some(e);
            }

            Message::SignOut => {
                if let Some(session) = self.session.take() {
                    commands.push(Command::SignOut { token: session.token });
                }
                self.close_session();
            }

            Message::SignedOut(result) => {
                if let Err(e) = result {
                    log::warn!("Server-side sign-out failed: {}", e);
                }
            }

            Message::SubmitPasswordChange { current, new } => {
                if let Some(session) = self.session.clone() {
                    commands.push(Command::ChangePassword {
                        token: session.token,
                        current,
                        new,
                    });
                }
            }

            Message::PasswordChanged(Ok(())) => {
                if let Some(user) = self.current_user().cloned() {
                    self.try_update_user(&user.id, |u| u.force_password_change = false);
                }
                self.view.modal = None;
                log::info!("Password changed");
            }

            Message::PasswordChanged(Err(e)) => {
                self.view.alert = Some(e);
            }

            Message::RequestPasswordReset(email) => {
                commands.push(Command::ResetPassword { email });
            }

            Message::PasswordResetRequested(Ok(())) => {
                self.view.alert = Some("Password reset email sent".to_string());
            }

            Message::PasswordResetRequested(Err(e)) => {
                self.view.alert = Some(e);
            }

            Message::SubmitEmail(email) => {
                if !user::is_valid_email(&email) {
                    self.view.alert = Some("Invalid email address".to_string());
                } else if let Some(user) = self.current_user().cloned() {
                    self.try_update_user(&user.id, |u| u.email = email);
                }
            }

            // ---- Live collection pushes ---------------------------------
            Message::TasksChanged(tasks) => self.tasks = tasks,
            Message::MessagesChanged(messages) => self.messages = messages,
            Message::UsersChanged(users) => self.users = users,
            Message::ResourcesChanged(resources) => self.resources = resources,
            Message::FoldersChanged(folders) => self.folders = folders,

            // ---- Navigation & view state --------------------------------
            Message::SelectView(view) => {
                if view.admin_only() && !self.current_user().is_some_and(User::is_admin) {
                    log::debug!("Ignoring non-admin navigation to {:?}", view);
                } else {
                    self.view.view = view;
                    self.view.modal = None;
                }
            }

            Message::SetBoardLayout(layout) => self.view.board = layout,
            Message::SelectMailbox(mailbox) => self.view.mailbox = mailbox,
            Message::SelectFolder(folder_id) => self.view.selected_folder = folder_id,

            Message::SelectUserDetail(user_id) => {
                if self.current_user().is_some_and(User::is_admin) {
                    self.view.selected_user = user_id;
                }
            }

            Message::OpenModal(modal) => self.view.modal = Some(modal),
            Message::CloseModal => self.view.modal = None,
            Message::DismissAlert => self.view.alert = None,

            Message::DismissWelcomeBack => {
                self.newly_completed.clear();
                if self.view.modal == Some(Modal::WelcomeBack) {
                    self.view.modal = None;
                }
            }

            // ---- Tasks ---------------------------------------------------
            Message::SubmitNewTask(draft) => {
                let Some(creator) = self.current_user().cloned() else {
                    return commands;
                };
                let mut new_task = Task::new(draft.title, draft.deadline, &creator.id);
                new_task.checklist = draft.checklist.into_iter().map(ChecklistItem::new).collect();
                new_task.assignee_ids = draft.assignee_ids;
                new_task.priority = draft.priority;
                new_task.is_private = draft.is_private;
                new_task.is_recurring = draft.is_recurring;
                new_task.recurrence_frequency = draft.recurrence_frequency;
                new_task.recurrence_end_date = draft.recurrence_end_date;
                // Employee submissions wait for an admin to approve them
                new_task.status = if creator.is_admin() {
                    TaskStatus::ToDo
                } else {
                    TaskStatus::PendingApproval
                };
                if let Some(store) = self.store.as_mut() {
                    if let Err(e) = store.tasks.create(new_task) {
                        self.write_failed("Failed to create task", e);
                    }
                }
                self.view.modal = None;
            }

            Message::SubmitTaskEdit(edited) => {
                let id = edited.id.clone();
                self.try_update_task(&id, |t| *t = edited);
                self.view.modal = None;
            }

            Message::ToggleChecklistItem { task_id, item_id } => {
                let now = Local::now().naive_local();
                let mut completed = false;
                let updated = self.try_update_task(&task_id, |t| {
                    completed = task::toggle_checklist_item(t, &item_id, now);
                });
                if updated && completed {
                    self.handle_completion(&task_id);
                }
            }

            Message::SetTaskStatus { task_id, status } => {
                let now = Local::now().naive_local();
                let mut completed = false;
                let updated = self.try_update_task(&task_id, |t| {
                    completed = task::set_status(t, status, now);
                });
                if updated && completed {
                    self.handle_completion(&task_id);
                }
            }

            Message::SetTaskPriority { task_id, priority } => {
                self.try_update_task(&task_id, |t| t.priority = priority);
            }

            Message::SetTaskPrivacy { task_id, is_private } => {
                self.try_update_task(&task_id, |t| t.is_private = is_private);
            }

            Message::SetTaskArchived { task_id, is_archived } => {
                if !self.current_user().is_some_and(User::is_admin) {
                    self.view.alert = Some("Only admins can archive tasks".to_string());
                    return commands;
                }
                self.try_update_task(&task_id, |t| t.is_archived = is_archived);
            }

            Message::DeleteTask(task_id) => {
                if let Some(store) = self.store.as_mut() {
                    if let Err(e) = store.tasks.delete(&task_id) {
                        self.write_failed("Failed to delete task", e);
                    }
                }
                self.view.modal = None;
            }

            Message::AddTaskComment { task_id, text } => {
                let Some(author) = self.current_user().cloned() else {
                    return commands;
                };
                let comment = TaskComment {
                    id: uuid::Uuid::new_v4().to_string(),
                    author_id: author.id,
                    timestamp: Local::now().naive_local(),
                    text,
                };
                self.try_update_task(&task_id, |t| t.comments.push(comment));
            }

            Message::ApproveTask(task_id) => {
                if !self.current_user().is_some_and(User::is_admin) {
                    return commands;
                }
                self.try_update_task(&task_id, |t| {
                    if t.status == TaskStatus::PendingApproval {
                        t.status = TaskStatus::ToDo;
                    }
                });
            }

            Message::RejectTask(task_id) => {
                if !self.current_user().is_some_and(User::is_admin) {
                    return commands;
                }
                if let Some(store) = self.store.as_mut() {
                    if let Err(e) = store.tasks.delete(&task_id) {
                        self.write_failed("Failed to reject task", e);
                    }
                }
            }

            Message::SendReminder { task_id, note } => {
                let alert = match self.tasks.iter().find(|t| t.id == task_id) {
                    Some(reminded) => {
                        let recipients: Vec<String> = self
                            .users
                            .iter()
                            .filter(|u| reminded.is_assigned_to(&u.id) && !u.email.is_empty())
                            .map(|u| format!("{} ({})", u.name, u.email))
                            .collect();
                        if recipients.is_empty() {
                            "No assignees with email addresses found for this task.".to_string()
                        } else {
                            format!(
                                "Reminder sent to {} for task \"{}\" with note: \"{}\"",
                                recipients.join(", "),
                                reminded.title,
                                note
                            )
                        }
                    }
                    None => return commands,
                };
                self.view.alert = Some(alert);
                self.view.modal = None;
            }

            // ---- Messaging ----------------------------------------------
            Message::SendMessage(draft) => {
                let Some(sender) = self.current_user().cloned() else {
                    return commands;
                };
                let mut outgoing = CoreMessage::new(
                    &sender.id,
                    &draft.recipient_ids,
                    draft.subject,
                    draft.body,
                    Local::now().naive_local(),
                );
                outgoing.attachments = draft.attachments;
                if let Some(store) = self.store.as_mut() {
                    if let Err(e) = store.messages.create(outgoing) {
                        self.write_failed("Failed to send message", e);
                    }
                }
                self.view.modal = None;
            }

            Message::SetMessageRead { message_id, is_read } => {
                let Some(viewer) = self.current_user().cloned() else {
                    return commands;
                };
                self.try_update_message(&message_id, |m| {
                    if let Some(r) = m.recipient_mut(&viewer.id) {
                        r.is_read = is_read;
                    }
                });
            }

            Message::SetMessageArchived { message_id, is_archived } => {
                let Some(viewer) = self.current_user().cloned() else {
                    return commands;
                };
                self.try_update_message(&message_id, |m| {
                    if let Some(r) = m.recipient_mut(&viewer.id) {
                        r.is_archived = is_archived;
                    }
                });
            }

            Message::TrashMessage(message_id) => {
                let Some(viewer) = self.current_user().cloned() else {
                    return commands;
                };
                self.try_update_message(&message_id, |m| {
                    if m.sender_id == viewer.id {
                        m.sender_deleted = true;
                    } else if let Some(r) = m.recipient_mut(&viewer.id) {
                        r.is_deleted = true;
                    }
                });
            }

            Message::PermanentlyDeleteMessage(message_id) => {
                if let Some(store) = self.store.as_mut() {
                    if let Err(e) = store.messages.delete(&message_id) {
                        self.write_failed("Failed to delete message", e);
                    }
                }
            }

            // ---- Knowledge base -----------------------------------------
            Message::SubmitNewResource(draft) => {
                let now = Local::now().naive_local();
                let mut resource = KnowledgeResource::new(draft.title, draft.content, now);
                resource.folder_id = draft.folder_id;
                resource.tags = draft.tags;
                if let Some(store) = self.store.as_mut() {
                    if let Err(e) = store.resources.create(resource) {
                        self.write_failed("Failed to add resource", e);
                    }
                }
                self.view.modal = None;
            }

            Message::SubmitResourceEdit(edited) => {
                let id = edited.id.clone();
                let now = Local::now().naive_local();
                self.try_update_resource(&id, |r| {
                    *r = edited;
                    r.touch(now);
                });
                self.view.modal = None;
            }

            Message::DeleteResource(resource_id) => {
                if let Some(store) = self.store.as_mut() {
                    if let Err(e) = store.resources.delete(&resource_id) {
                        self.write_failed("Failed to delete resource", e);
                    }
                }
            }

            Message::AddFolder(name) => {
                let folder = Folder::new(name, Local::now().naive_local());
                if let Some(store) = self.store.as_mut() {
                    if let Err(e) = store.folders.create(folder) {
                        self.write_failed("Failed to add folder", e);
                    }
                }
            }

            Message::RenameFolder { folder_id, name } => {
                if let Some(store) = self.store.as_mut() {
                    if let Err(e) = store.folders.update(&folder_id, |f| f.name = name) {
                        self.write_failed("Failed to rename folder", e);
                    }
                }
            }

            Message::DeleteFolder(folder_id) => {
                if let Some(store) = self.store.as_mut() {
                    if let Err(e) = store.folders.delete(&folder_id) {
                        self.write_failed("Failed to delete folder", e);
                    }
                }
                if self.view.selected_folder.as_deref() == Some(folder_id.as_str()) {
                    self.view.selected_folder = None;
                }
            }

            Message::ImportFile(path) => {
                commands.push(Command::ImportFile(path));
            }

            Message::FileImported(Ok(doc)) => {
                let now = Local::now().naive_local();
                let mut resource = KnowledgeResource::new(doc.title, doc.content, now);
                resource.folder_id = self.view.selected_folder.clone();
                if let Some(store) = self.store.as_mut() {
                    if let Err(e) = store.resources.create(resource) {
                        self.write_failed("Failed to add resource", e);
                    }
                }
            }

            Message::FileImported(Err(e)) => {
                log::warn!("File import failed: {}", e);
                self.view.alert = Some(e);
            }

            Message::AskKnowledgeBase { resource_id, question } => {
                let Some(context) = self
                    .resources
                    .iter()
                    .find(|r| r.id == resource_id)
                    .map(|r| r.content.clone())
                else {
                    self.view.alert = Some("Resource not found".to_string());
                    return commands;
                };
                self.answer = RequestState::Pending;
                self.view.modal = Some(Modal::Ask(resource_id));
                commands.push(Command::AskKnowledgeBase { question, context });
            }

            Message::AnswerReady(Ok(answer)) => {
                self.answer = RequestState::Ready(answer);
            }

            Message::AnswerReady(Err(e)) => {
                // Error stays inside the ask panel; the view survives
                self.answer = RequestState::Failed(e);
            }

            // ---- User administration ------------------------------------
            Message::SubmitNewUser(draft) => {
                if !self.current_user().is_some_and(User::is_admin) {
                    self.view.alert = Some("Only admins can add users".to_string());
                    return commands;
                }
                if !user::is_valid_email(&draft.email) {
                    self.view.alert = Some("Invalid email address".to_string());
                    return commands;
                }
                let new_user = User::new(draft.name, draft.email, draft.role);
                if let Some(store) = self.store.as_mut() {
                    if let Err(e) = store.users.create(new_user) {
                        self.write_failed("Failed to add user", e);
                    }
                }
                self.view.modal = None;
            }

            Message::SubmitUserEdit(edited) => {
                let can_edit = self.current_user().is_some_and(|u| {
                    u.is_admin() || u.id == edited.id
                });
                if !can_edit {
                    return commands;
                }
                let id = edited.id.clone();
                self.try_update_user(&id, |u| *u = edited);
            }

            Message::SetUserStatus { user_id, status } => {
                if !self.current_user().is_some_and(User::is_admin) {
                    self.view.alert = Some("Only admins can change user status".to_string());
                    return commands;
                }
                self.try_update_user(&user_id, |u| u.status = status);
            }

            Message::SetTheme(theme) => {
                if let Some(current) = self.current_user().cloned() {
                    self.try_update_user(&current.id, |u| u.theme = Some(theme));
                }
            }

            // ---- Daily briefing -----------------------------------------
            Message::GenerateBriefing => {
                if self.current_user().is_none() {
                    return commands;
                }
                self.briefing = RequestState::Pending;
                self.view.modal = Some(Modal::Briefing);
                commands.push(Command::GenerateBriefing {
                    tasks: self.visible_tasks(),
                    users: self.users.clone(),
                });
            }

            Message::BriefingReady(Ok(report)) => {
                self.briefing = RequestState::Ready(report);
            }

            Message::BriefingReady(Err(e)) => {
                self.briefing = RequestState::Failed(e);
            }

            Message::Quit => {
                self.should_exit = true;
            }
        }

        commands
    }

    // ---- Session plumbing -----------------------------------------------

    fn open_store(&mut self, session: &Session) {
        let org_id = if session.organization_id.is_empty() {
            self.config.organization_id.clone()
        } else {
            session.organization_id.clone()
        };
        if org_id.is_empty() {
            log::error!("No organization configured for this session");
            self.sign_in_error = Some("Organization not configured".to_string());
            return;
        }

        let store = OrgStore::open(&self.config.org_dir(&org_id), &org_id);
        self.tasks = store.tasks.snapshot();
        self.messages = store.messages.snapshot();
        self.users = store.users.snapshot();
        self.resources = store.resources.snapshot();
        self.folders = store.folders.snapshot();
        self.spawn_forwarders(&store);
        self.store = Some(store);
    }

    /// Forward every collection push into the event loop as a message, for
    /// the lifetime of the session.
    fn spawn_forwarders(&self, store: &OrgStore) {
        forward(store.tasks.subscribe(), self.tx.clone(), Message::TasksChanged);
        forward(store.messages.subscribe(), self.tx.clone(), Message::MessagesChanged);
        forward(store.users.subscribe(), self.tx.clone(), Message::UsersChanged);
        forward(store.resources.subscribe(), self.tx.clone(), Message::ResourcesChanged);
        forward(store.folders.subscribe(), self.tx.clone(), Message::FoldersChanged);
    }

    fn after_sign_in(&mut self) {
        let Some(session) = self.session.clone() else {
            return;
        };
        let me = self.users.iter().find(|u| u.id == session.user_id);
        let previous_login = me.and_then(|u| u.last_login);
        let is_admin = me.is_some_and(User::is_admin);

        let now = Local::now().naive_local();
        self.try_update_user(&session.user_id, |u| u.last_login = Some(now));

        // Admins get a welcome-back list of tasks finished since their last visit
        if is_admin {
            if let Some(prev) = previous_login {
                self.newly_completed = self
                    .tasks
                    .iter()
                    .filter(|t| {
                        t.status.is_done() && t.completed_at.is_some_and(|at| at > prev)
                    })
                    .cloned()
                    .collect();
                if !self.newly_completed.is_empty() {
                    self.view.modal = Some(Modal::WelcomeBack);
                }
            }
        }

        if self.launch_mode == LaunchMode::Briefing {
            let _ = self.tx.send(Message::GenerateBriefing);
        }
    }

    fn close_session(&mut self) {
        self.session = None;
        self.store = None;
        self.tasks.clear();
        self.messages.clear();
        self.users.clear();
        self.resources.clear();
        self.folders.clear();
        self.view = ViewState::default();
        self.briefing = RequestState::Idle;
        self.answer = RequestState::Idle;
        self.newly_completed.clear();
    }

    // ---- Write helpers ---------------------------------------------------

    /// Log a failed write and surface it as the blocking alert. Nothing is
    /// retried; the user re-initiates the action if they still want it.
    fn write_failed(&mut self, action: &str, e: impl std::fmt::Display) {
        log::error!("{}: {}", action, e);
        self.view.alert = Some(format!("{}: {}", action, e));
    }

    fn try_update_task(&mut self, id: &str, apply: impl FnOnce(&mut Task)) -> bool {
        let Some(store) = self.store.as_mut() else {
            return false;
        };
        match store.tasks.update(id, apply) {
            Ok(_) => true,
            Err(e) => {
                self.write_failed("Failed to update task", e);
                false
            }
        }
    }

    fn try_update_message(&mut self, id: &str, apply: impl FnOnce(&mut CoreMessage)) -> bool {
        let Some(store) = self.store.as_mut() else {
            return false;
        };
        match store.messages.update(id, apply) {
            Ok(_) => true,
            Err(e) => {
                self.write_failed("Failed to update message", e);
                false
            }
        }
    }

    fn try_update_user(&mut self, id: &str, apply: impl FnOnce(&mut User)) -> bool {
        let Some(store) = self.store.as_mut() else {
            return false;
        };
        match store.users.update(id, apply) {
            Ok(_) => true,
            Err(e) => {
                self.write_failed("Failed to update user", e);
                false
            }
        }
    }

    fn try_update_resource(
        &mut self,
        id: &str,
        apply: impl FnOnce(&mut KnowledgeResource),
    ) -> bool {
        let Some(store) = self.store.as_mut() else {
            return false;
        };
        match store.resources.update(id, apply) {
            Ok(_) => true,
            Err(e) => {
                self.write_failed("Failed to update resource", e);
                false
            }
        }
    }

    /// Post-completion hook. Both completion paths (checklist-driven and
    /// direct status change) come through here, and the callers only invoke
    /// it on a genuine ToDo/InProgress -> Done edge, so a recurring task
    /// spawns exactly one follow-up per completion.
    fn handle_completion(&mut self, task_id: &str) {
        let Some(store) = self.store.as_mut() else {
            return;
        };
        let Some(done) = store.tasks.get(task_id).cloned() else {
            return;
        };
        if let Some(next) = recurrence::successor(&done) {
            log::info!(
                "Recurring task complete, next occurrence due {}: {}",
                next.deadline.date(),
                next.title
            );
            if let Err(e) = store.tasks.create(next) {
                self.write_failed("Failed to create recurring follow-up", e);
            }
        }
    }

    // ---- Derived views ---------------------------------------------------

    pub fn current_user(&self) -> Option<&User> {
        let session = self.session.as_ref()?;
        self.users.iter().find(|u| u.id == session.user_id)
    }

    /// The task board: unarchived, approved tasks the current user may see.
    /// The privacy filter runs on every call, never cached.
    pub fn visible_tasks(&self) -> Vec<Task> {
        let Some(viewer) = self.current_user() else {
            return Vec::new();
        };
        self.tasks
            .iter()
            .filter(|t| {
                !t.is_archived
                    && t.status != TaskStatus::PendingApproval
                    && t.visible_to(viewer)
            })
            .cloned()
            .collect()
    }

    pub fn pending_tasks(&self) -> Vec<Task> {
        self.tasks
            .iter()
            .filter(|t| t.status == TaskStatus::PendingApproval)
            .cloned()
            .collect()
    }

    pub fn archived_tasks(&self) -> Vec<Task> {
        self.tasks.iter().filter(|t| t.is_archived).cloned().collect()
    }

    pub fn daily_progress(&self) -> DailyProgress {
        match self.current_user() {
            Some(viewer) => {
                DailyProgress::build(&viewer.id, &self.tasks, Local::now().date_naive())
            }
            None => DailyProgress::default(),
        }
    }

    pub fn streak(&self) -> Streak {
        match self.current_user() {
            Some(viewer) => streak::streak_for(&viewer.id, &self.tasks),
            None => Streak::default(),
        }
    }

    pub fn unread_messages(&self) -> usize {
        match self.current_user() {
            Some(viewer) => mail::unread_count(&self.messages, &viewer.id),
            None => 0,
        }
    }

    pub fn mailbox_messages(&self) -> Vec<CoreMessage> {
        let Some(viewer) = self.current_user() else {
            return Vec::new();
        };
        self.messages
            .iter()
            .filter(|m| mail::in_mailbox(m, &viewer.id, self.view.mailbox))
            .cloned()
            .collect()
    }

    pub fn report(&self) -> Report {
        Report::build(&self.tasks, &self.users, Local::now().naive_local())
    }

    /// Detail for the selected roster entry: the user, their completed
    /// tasks, and their streak. Admin-only, like the selection itself.
    pub fn user_detail(&self) -> Option<(User, Vec<Task>, Streak)> {
        let id = self.view.selected_user.as_deref()?;
        let user = self.users.iter().find(|u| u.id == id)?.clone();
        let completed = Report::completed_for(&self.tasks, id)
            .into_iter()
            .cloned()
            .collect();
        let streak = streak::streak_for(id, &self.tasks);
        Some((user, completed, streak))
    }

    /// The knowledge-base listing: resources in the selected folder, or all
    /// of them when none is selected. A resource whose folder was deleted
    /// keeps its dangling id and stays in the all-resources listing.
    pub fn folder_resources(&self) -> Vec<KnowledgeResource> {
        match self.view.selected_folder.as_deref() {
            Some(folder_id) => self
                .resources
                .iter()
                .filter(|r| r.folder_id.as_deref() == Some(folder_id))
                .cloned()
                .collect(),
            None => self.resources.clone(),
        }
    }

    // ---- Accessors for the shell ----------------------------------------

    pub fn session(&self) -> Option<&Session> {
        self.session.as_ref()
    }

    pub fn sign_in_error(&self) -> Option<&str> {
        self.sign_in_error.as_deref()
    }

    pub fn view(&self) -> &ViewState {
        &self.view
    }

    pub fn briefing(&self) -> &RequestState {
        &self.briefing
    }

    pub fn answer(&self) -> &RequestState {
        &self.answer
    }

    pub fn newly_completed(&self) -> &[Task] {
        &self.newly_completed
    }

    pub fn should_exit(&self) -> bool {
        self.should_exit
    }

    pub(crate) fn store(&self) -> Option<&OrgStore> {
        self.store.as_ref()
    }
}

fn forward<T, F>(
    mut rx: broadcast::Receiver<Vec<T>>,
    tx: mpsc::UnboundedSender<Message>,
    wrap: F,
) where
    T: Clone + Send + 'static,
    F: Fn(Vec<T>) -> Message + Send + 'static,
{
    tokio::spawn(async move {
        loop {
            match rx.recv().await {
                Ok(snapshot) => {
                    if tx.send(wrap(snapshot)).is_err() {
                        break;
                    }
                }
                Err(broadcast::error::RecvError::Lagged(skipped)) => {
                    log::debug!("Subscription lagged, skipped {} pushes", skipped);
                }
                Err(broadcast::error::RecvError::Closed) => break,
            }
        }
    });
}
