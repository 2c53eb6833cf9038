//! Create/update payloads and their form validation.
//!
//! These are the payloads the task and user forms hand to the backend.
//! Validation collects every failing field at once so a form can show all
//! messages together.

use crate::error::{FieldErrors, Result, TaskboardError};
use crate::types::{Task, TaskPriority, TaskStatus, User, UserId, UserRole};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Minimum accepted password length.
pub const MIN_PASSWORD_LEN: usize = 6;

/// Payload for creating a task.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NewTask {
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub status: TaskStatus,
    #[serde(default)]
    pub priority: TaskPriority,
    #[serde(default)]
    pub due_date: Option<DateTime<Utc>>,
    #[serde(default)]
    pub assigned_to: Option<UserId>,
}

impl NewTask {
    pub fn validate(&self) -> Result<()> {
        let mut errors = FieldErrors::new();
        if self.title.trim().is_empty() {
            errors.insert("title".into(), "Title is required".into());
        }
        if self.description.trim().is_empty() {
            errors.insert("description".into(), "Description is required".into());
        }
        finish(errors)
    }

    /// The task the backend would return for this payload. Does not validate.
    pub fn build(&self, id: i64, created_by: Option<UserId>, now: DateTime<Utc>) -> Task {
        Task {
            id,
            title: self.title.trim().to_string(),
            description: Some(self.description.clone()),
            status: self.status,
            priority: self.priority,
            due_date: self.due_date,
            created_by,
            updated_by: None,
            assigned_to: self.assigned_to,
            created_at: now,
            updated_at: now,
        }
    }
}

/// Partial update of a task. Absent fields keep their current value.
///
/// `due_date` and `assigned_to` distinguish "leave alone" (field missing)
/// from "clear" (explicit `null`).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TaskUpdate {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<TaskStatus>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub priority: Option<TaskPriority>,
    #[serde(default, with = "double_option", skip_serializing_if = "Option::is_none")]
    pub due_date: Option<Option<DateTime<Utc>>>,
    #[serde(default, with = "double_option", skip_serializing_if = "Option::is_none")]
    pub assigned_to: Option<Option<UserId>>,
}

impl TaskUpdate {
    /// Quick status change, as offered next to each task in the list.
    pub fn status(status: TaskStatus) -> Self {
        Self {
            status: Some(status),
            ..Default::default()
        }
    }

    pub fn validate(&self) -> Result<()> {
        let mut errors = FieldErrors::new();
        if matches!(self.title.as_deref(), Some(t) if t.trim().is_empty()) {
            errors.insert("title".into(), "Title is required".into());
        }
        if matches!(self.description.as_deref(), Some(d) if d.trim().is_empty()) {
            errors.insert("description".into(), "Description is required".into());
        }
        finish(errors)
    }

    /// The updated task, stamped with the updater and time. Does not validate.
    pub fn apply(&self, task: &Task, updated_by: Option<UserId>, now: DateTime<Utc>) -> Task {
        let mut next = task.clone();
        if let Some(ref title) = self.title {
            next.title = title.trim().to_string();
        }
        if let Some(ref description) = self.description {
            next.description = Some(description.clone());
        }
        if let Some(status) = self.status {
            next.status = status;
        }
        if let Some(priority) = self.priority {
            next.priority = priority;
        }
        if let Some(due_date) = self.due_date {
            next.due_date = due_date;
        }
        if let Some(assigned_to) = self.assigned_to {
            next.assigned_to = assigned_to;
        }
        if updated_by.is_some() {
            next.updated_by = updated_by;
        }
        next.updated_at = now;
        next
    }
}

/// Payload for creating a user account.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NewUser {
    pub username: String,
    pub email: String,
    #[serde(default)]
    pub full_name: Option<String>,
    pub password: String,
    #[serde(default)]
    pub confirm_password: String,
    #[serde(rename = "type", alias = "role", default)]
    pub role: UserRole,
}

impl NewUser {
    pub fn validate(&self) -> Result<()> {
        let mut errors = FieldErrors::new();
        if self.username.trim().is_empty() {
            errors.insert("username".into(), "Username is required.".into());
        }
        let email = self.email.trim();
        if email.is_empty() {
            errors.insert("email".into(), "Email is required.".into());
        } else if !email.contains('@') {
            errors.insert("email".into(), "Email address is invalid.".into());
        }
        if self.password.is_empty() {
            errors.insert("password".into(), "Password is required.".into());
        } else if self.password.chars().count() < MIN_PASSWORD_LEN {
            errors.insert(
                "password".into(),
                format!("Password must be at least {} characters.", MIN_PASSWORD_LEN),
            );
        }
        if self.password != self.confirm_password {
            errors.insert("confirm_password".into(), "Passwords do not match.".into());
        }
        finish(errors)
    }

    /// The roster entry for this account. The password never leaves the payload.
    pub fn build(&self, id: UserId) -> User {
        User {
            id,
            username: self.username.trim().to_string(),
            full_name: self
                .full_name
                .as_deref()
                .map(str::trim)
                .filter(|n| !n.is_empty())
                .map(str::to_string),
            email: self.email.trim().to_string(),
            role: self.role,
            is_active: true,
        }
    }
}

fn finish(errors: FieldErrors) -> Result<()> {
    if errors.is_empty() {
        Ok(())
    } else {
        Err(TaskboardError::Validation(errors))
    }
}

/// Serde helper so that a missing field and an explicit `null` differ.
mod double_option {
    use serde::{Deserialize, Deserializer, Serialize, Serializer};

    pub fn serialize<T, S>(value: &Option<Option<T>>, serializer: S) -> Result<S::Ok, S::Error>
    where
        T: Serialize,
        S: Serializer,
    {
        match value {
            Some(inner) => inner.serialize(serializer),
            None => serializer.serialize_none(),
        }
    }

    pub fn deserialize<'de, T, D>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
    where
        T: Deserialize<'de>,
        D: Deserializer<'de>,
    {
        Option::<T>::deserialize(deserializer).map(Some)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 6, 1, 9, 0, 0).unwrap()
    }

    fn field_errors(result: Result<()>) -> FieldErrors {
        match result {
            Err(TaskboardError::Validation(fields)) => fields,
            other => panic!("expected validation error, got {:?}", other),
        }
    }

    #[test]
    fn new_task_requires_title_and_description() {
        let fields = field_errors(NewTask::default().validate());
        assert_eq!(fields["title"], "Title is required");
        assert_eq!(fields["description"], "Description is required");
    }

    #[test]
    fn new_task_defaults_to_pending_low() {
        let payload: NewTask =
            serde_json::from_str(r#"{"title":" Ship it ","description":"now"}"#).unwrap();
        payload.validate().unwrap();
        let task = payload.build(10, Some(3), now());
        assert_eq!(task.title, "Ship it");
        assert_eq!(task.status, TaskStatus::Pending);
        assert_eq!(task.priority, TaskPriority::Low);
        assert_eq!(task.created_by, Some(3));
        assert_eq!(task.created_at, now());
    }

    #[test]
    fn update_distinguishes_missing_from_null() {
        let base = NewTask {
            title: "T".into(),
            description: "D".into(),
            assigned_to: Some(4),
            ..Default::default()
        }
        .build(1, Some(1), now());

        let keep: TaskUpdate = serde_json::from_str(r#"{"status":"completed"}"#).unwrap();
        let kept = keep.apply(&base, Some(2), now());
        assert_eq!(kept.assigned_to, Some(4));
        assert_eq!(kept.status, TaskStatus::Completed);
        assert_eq!(kept.updated_by, Some(2));

        let clear: TaskUpdate = serde_json::from_str(r#"{"assigned_to":null}"#).unwrap();
        let cleared = clear.apply(&base, None, now());
        assert_eq!(cleared.assigned_to, None);
        assert_eq!(cleared.updated_by, None);
    }

    #[test]
    fn update_rejects_blank_title() {
        let update = TaskUpdate {
            title: Some("  ".into()),
            ..Default::default()
        };
        let fields = field_errors(update.validate());
        assert!(fields.contains_key("title"));
        assert!(TaskUpdate::status(TaskStatus::Hold).validate().is_ok());
    }

    #[test]
    fn new_user_rules() {
        let user = NewUser {
            username: "".into(),
            email: "nope".into(),
            password: "abc".into(),
            confirm_password: "abd".into(),
            ..Default::default()
        };
        let fields = field_errors(user.validate());
        assert_eq!(fields["username"], "Username is required.");
        assert_eq!(fields["email"], "Email address is invalid.");
        assert_eq!(fields["password"], "Password must be at least 6 characters.");
        assert_eq!(fields["confirm_password"], "Passwords do not match.");

        let ok = NewUser {
            username: "ada".into(),
            email: "ada@example.com".into(),
            password: "secret1".into(),
            confirm_password: "secret1".into(),
            ..Default::default()
        };
        assert!(ok.validate().is_ok());
    }

    #[test]
    fn new_user_builds_active_roster_entry() {
        let draft = NewUser {
            username: " ada ".into(),
            email: "ada@example.com".into(),
            full_name: Some("  ".into()),
            password: "secret1".into(),
            confirm_password: "secret1".into(),
            role: UserRole::Admin,
        };
        let user = draft.build(7);
        assert_eq!(user.username, "ada");
        assert_eq!(user.full_name, None);
        assert!(user.is_admin());
        assert!(user.is_active);
    }
}
