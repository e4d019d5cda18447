use std::path::Path;

use crate::core::message::Message;
use crate::core::resource::{Folder, KnowledgeResource};
use crate::core::task::Task;
use crate::core::user::User;

use super::{Collection, Document};

impl Document for Task {
    fn id(&self) -> &str {
        &self.id
    }
}

impl Document for Message {
    fn id(&self) -> &str {
        &self.id
    }
}

impl Document for User {
    fn id(&self) -> &str {
        &self.id
    }
}

impl Document for KnowledgeResource {
    fn id(&self) -> &str {
        &self.id
    }
}

impl Document for Folder {
    fn id(&self) -> &str {
        &self.id
    }
}

/// Per-organization document store: five live collections under one
/// directory. Tenant isolation is the directory boundary; an `OrgStore`
/// can only ever see the organization it was opened for.
pub struct OrgStore {
    pub org_id: String,
    pub tasks: Collection<Task>,
    pub messages: Collection<Message>,
    pub users: Collection<User>,
    pub resources: Collection<KnowledgeResource>,
    pub folders: Collection<Folder>,
}

impl OrgStore {
    /// Open (or create) the organization's collections. Orderings mirror
    /// the hosted queries: tasks by deadline, messages and resources
    /// newest-first, users by name.
    pub fn open(org_dir: &Path, org_id: impl Into<String>) -> Self {
        Self {
            org_id: org_id.into(),
            tasks: Collection::open(org_dir.join("tasks.json"), |a, b| {
                a.deadline.cmp(&b.deadline)
            }),
            messages: Collection::open(org_dir.join("messages.json"), |a, b| {
                b.timestamp.cmp(&a.timestamp)
            }),
            users: Collection::open(org_dir.join("users.json"), |a, b| a.name.cmp(&b.name)),
            resources: Collection::open(org_dir.join("resources.json"), |a, b| {
                b.created_at.cmp(&a.created_at)
            }),
            folders: Collection::open(org_dir.join("folders.json"), |a, b| {
                b.created_at.cmp(&a.created_at)
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::user::UserRole;
    use chrono::NaiveDate;

    fn temp_org_dir() -> std::path::PathBuf {
        std::env::temp_dir().join(format!("mortar-org-test-{}", uuid::Uuid::new_v4()))
    }

    #[test]
    fn collections_are_scoped_to_their_directory() {
        let dir_a = temp_org_dir();
        let dir_b = temp_org_dir();

        let mut store_a = OrgStore::open(&dir_a, "org-a");
        store_a
            .users
            .create(User::new("Dana", "dana@rx.test", UserRole::Admin))
            .unwrap();

        let store_b = OrgStore::open(&dir_b, "org-b");
        assert!(store_b.users.is_empty());

        let reopened = OrgStore::open(&dir_a, "org-a");
        assert_eq!(reopened.users.len(), 1);
    }

    #[test]
    fn tasks_are_ordered_by_deadline() {
        let dir = temp_org_dir();
        let mut store = OrgStore::open(&dir, "org");

        let later = NaiveDate::from_ymd_opt(2024, 6, 2)
            .unwrap()
            .and_hms_opt(9, 0, 0)
            .unwrap();
        let earlier = NaiveDate::from_ymd_opt(2024, 6, 1)
            .unwrap()
            .and_hms_opt(9, 0, 0)
            .unwrap();

        store.tasks.create(Task::new("Later", later, "u")).unwrap();
        store.tasks.create(Task::new("Earlier", earlier, "u")).unwrap();

        let snapshot = store.tasks.snapshot();
        assert_eq!(snapshot[0].title, "Earlier");
        assert_eq!(snapshot[1].title, "Later");
    }
}
