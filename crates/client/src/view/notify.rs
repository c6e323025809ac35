//! Notifications and Confirmation Prompts

use storage::Student;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotificationKind {
    Success,
    Error,
}

/// Transient message shown to the user
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    pub kind: NotificationKind,
    pub message: String,
}

impl Notification {
    pub fn success(message: impl Into<String>) -> Self {
        Self {
            kind: NotificationKind::Success,
            message: message.into(),
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            kind: NotificationKind::Error,
            message: message.into(),
        }
    }
}

/// Dismissible delete confirmation naming the record
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfirmPrompt {
    pub student_id: Uuid,
    pub title: String,
    pub message: String,
}

impl ConfirmPrompt {
    pub fn delete(student: &Student) -> Self {
        Self {
            student_id: student.id,
            title: "Confirm deletion".to_string(),
            message: format!(
                "Are you sure you want to delete {}? This action cannot be undone.",
                student.name
            ),
        }
    }
}
