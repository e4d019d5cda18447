use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Per-recipient delivery state. Every recipient owns an independent record;
/// nothing one recipient does is visible in another's copy.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MessageRecipient {
    pub user_id: String,
    pub is_read: bool,
    pub is_archived: bool,
    pub is_deleted: bool,
}

impl MessageRecipient {
    pub fn new(user_id: impl Into<String>) -> Self {
        Self {
            user_id: user_id.into(),
            is_read: false,
            is_archived: false,
            is_deleted: false,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Attachment {
    pub name: String,
    pub mime_type: String,
    /// Data URL, as produced by the upload form.
    pub content: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Message {
    pub id: String,
    pub sender_id: String,
    /// Set when the sender trashes their own copy from Sent.
    #[serde(default)]
    pub sender_deleted: bool,
    pub recipients: Vec<MessageRecipient>,
    pub subject: String,
    pub body: String,
    pub timestamp: NaiveDateTime,
    #[serde(default)]
    pub attachments: Vec<Attachment>,
}

impl Message {
    pub fn new(
        sender_id: impl Into<String>,
        recipient_ids: &[String],
        subject: impl Into<String>,
        body: impl Into<String>,
        timestamp: NaiveDateTime,
    ) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            sender_id: sender_id.into(),
            sender_deleted: false,
            recipients: recipient_ids
                .iter()
                .map(|id| MessageRecipient::new(id.clone()))
                .collect(),
            subject: subject.into(),
            body: body.into(),
            timestamp,
            attachments: Vec::new(),
        }
    }

    pub fn recipient(&self, user_id: &str) -> Option<&MessageRecipient> {
        self.recipients.iter().find(|r| r.user_id == user_id)
    }

    pub fn recipient_mut(&mut self, user_id: &str) -> Option<&mut MessageRecipient> {
        self.recipients.iter_mut().find(|r| r.user_id == user_id)
    }

    pub fn involves(&self, user_id: &str) -> bool {
        self.sender_id == user_id || self.recipient(user_id).is_some()
    }
}

/// Mailboxes are views over recipient state; nothing is stored per mailbox.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Mailbox {
    Inbox,
    Sent,
    Archived,
    Trash,
}

impl Mailbox {
    pub fn title(&self) -> &'static str {
        match self {
            Self::Inbox => "Inbox",
            Self::Sent => "Sent",
            Self::Archived => "Archived",
            Self::Trash => "Trash",
        }
    }

    pub const ALL: &'static [Mailbox] =
        &[Mailbox::Inbox, Mailbox::Sent, Mailbox::Archived, Mailbox::Trash];
}

pub fn in_mailbox(message: &Message, user_id: &str, mailbox: Mailbox) -> bool {
    match mailbox {
        Mailbox::Inbox => message
            .recipient(user_id)
            .is_some_and(|r| !r.is_archived && !r.is_deleted),
        Mailbox::Sent => message.sender_id == user_id && !message.sender_deleted,
        Mailbox::Archived => message
            .recipient(user_id)
            .is_some_and(|r| r.is_archived && !r.is_deleted),
        Mailbox::Trash => {
            message.recipient(user_id).is_some_and(|r| r.is_deleted)
                || (message.sender_id == user_id && message.sender_deleted)
        }
    }
}

/// Unread badge count: undeleted, unarchived inbox copies not yet read.
pub fn unread_count(messages: &[Message], user_id: &str) -> usize {
    messages
        .iter()
        .filter(|m| {
            m.recipient(user_id)
                .is_some_and(|r| !r.is_read && !r.is_archived && !r.is_deleted)
        })
        .count()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn at_noon() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 4, 2)
            .unwrap()
            .and_hms_opt(12, 0, 0)
            .unwrap()
    }

    fn two_recipient_message() -> Message {
        Message::new(
            "u-sender",
            &["u-a".to_string(), "u-b".to_string()],
            "Shift swap",
            "Can anyone cover Saturday?",
            at_noon(),
        )
    }

    #[test]
    fn recipient_delete_is_independent() {
        let mut message = two_recipient_message();
        message.recipient_mut("u-a").unwrap().is_deleted = true;

        assert!(message.recipient("u-a").unwrap().is_deleted);
        assert!(!message.recipient("u-b").unwrap().is_deleted);
        assert!(!message.sender_deleted);

        assert!(!in_mailbox(&message, "u-a", Mailbox::Inbox));
        assert!(in_mailbox(&message, "u-a", Mailbox::Trash));
        assert!(in_mailbox(&message, "u-b", Mailbox::Inbox));
        assert!(in_mailbox(&message, "u-sender", Mailbox::Sent));
    }

    #[test]
    fn sender_delete_hides_sent_copy_only() {
        let mut message = two_recipient_message();
        message.sender_deleted = true;

        assert!(!in_mailbox(&message, "u-sender", Mailbox::Inbox));
        assert!(!in_mailbox(&message, "u-sender", Mailbox::Sent));
        assert!(in_mailbox(&message, "u-sender", Mailbox::Trash));
        assert!(in_mailbox(&message, "u-a", Mailbox::Inbox));
    }

    #[test]
    fn archive_moves_between_mailboxes() {
        let mut message = two_recipient_message();
        message.recipient_mut("u-a").unwrap().is_archived = true;

        assert!(!in_mailbox(&message, "u-a", Mailbox::Inbox));
        assert!(in_mailbox(&message, "u-a", Mailbox::Archived));
    }

    #[test]
    fn unread_counts_inbox_copies_only() {
        let mut first = two_recipient_message();
        first.recipient_mut("u-a").unwrap().is_read = true;
        let mut second = two_recipient_message();
        second.recipient_mut("u-a").unwrap().is_archived = true;
        let third = two_recipient_message();

        let messages = vec![first, second, third];
        assert_eq!(unread_count(&messages, "u-a"), 1);
        assert_eq!(unread_count(&messages, "u-b"), 3);
        assert_eq!(unread_count(&messages, "u-sender"), 0);
    }
}
