use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Todo priority. Ordering is `Low < Medium < High`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    Low,
    #[default]
    Medium,
    High,
}

impl Priority {
    /// Group label used by the priority grouping level
    pub fn label(self) -> &'static str {
        match self {
            Priority::High => "High Priority",
            Priority::Medium => "Medium Priority",
            Priority::Low => "Low Priority",
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Priority::High => "high",
            Priority::Medium => "medium",
            Priority::Low => "low",
        }
    }

    /// Parse a priority keyword (case-insensitive)
    pub fn parse_priority(s: &str) -> Option<Priority> {
        match s.trim().to_ascii_lowercase().as_str() {
            "low" | "l" => Some(Priority::Low),
            "medium" | "med" | "m" => Some(Priority::Medium),
            "high" | "h" => Some(Priority::High),
            _ => None,
        }
    }
}

impl std::fmt::Display for Priority {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single task record.
///
/// Field names serialize in camelCase so collections written by earlier
/// versions of the state blob load unchanged.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Todo {
    /// Opaque identifier, assigned once at creation
    pub id: String,
    /// User-supplied description
    pub text: String,
    #[serde(default)]
    pub completed: bool,
    /// Creation instant; never changes after `add`
    pub created_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub due_date: Option<DateTime<Utc>>,
    /// When set and in the future, the store keeps a reminder armed for it
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reminder: Option<DateTime<Utc>>,
    #[serde(default)]
    pub priority: Priority,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub project_name: Option<String>,
}

impl Todo {
    /// Create an open todo with a fresh id
    pub fn new(text: impl Into<String>, created_at: DateTime<Utc>) -> Self {
        Todo {
            id: uuid::Uuid::new_v4().to_string(),
            text: text.into(),
            completed: false,
            created_at,
            due_date: None,
            reminder: None,
            priority: Priority::default(),
            project_name: None,
        }
    }

    /// Due date strictly before `now` and not yet completed
    pub fn is_overdue(&self, now: DateTime<Utc>) -> bool {
        !self.completed && self.due_date.is_some_and(|due| due < now)
    }

    /// Project label, with todos lacking a project collapsed to `No Project`
    pub fn project_label(&self) -> &str {
        self.project_name.as_deref().unwrap_or(NO_PROJECT)
    }
}

/// Label standing in for todos with no project name
pub const NO_PROJECT: &str = "No Project";

/// Fields supplied when creating a todo
#[derive(Debug, Clone, Default)]
pub struct NewTodo {
    pub text: String,
    pub priority: Priority,
    pub due_date: Option<DateTime<Utc>>,
    pub project_name: Option<String>,
    pub reminder: Option<DateTime<Utc>>,
}

impl NewTodo {
    pub fn new(text: impl Into<String>) -> Self {
        NewTodo {
            text: text.into(),
            ..Default::default()
        }
    }
}

/// Partial update for the mutable non-text fields.
///
/// `None` leaves a field untouched; `Some(None)` clears an optional field.
#[derive(Debug, Clone, Default)]
pub struct TodoPatch {
    pub priority: Option<Priority>,
    pub due_date: Option<Option<DateTime<Utc>>>,
    pub project_name: Option<Option<String>>,
}

impl TodoPatch {
    pub fn is_empty(&self) -> bool {
        self.priority.is_none() && self.due_date.is_none() && self.project_name.is_none()
    }

    /// Apply the patch; returns whether anything changed
    pub fn apply(&self, todo: &mut Todo) -> bool {
        let mut changed = false;
        if let Some(priority) = self.priority
            && todo.priority != priority
        {
            todo.priority = priority;
            changed = true;
        }
        if let Some(due) = self.due_date
            && todo.due_date != due
        {
            todo.due_date = due;
            changed = true;
        }
        if let Some(ref project) = self.project_name
            && todo.project_name != *project
        {
            todo.project_name = project.clone();
            changed = true;
        }
        changed
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn priority_orders_low_to_high() {
        assert!(Priority::High > Priority::Medium);
        assert!(Priority::Medium > Priority::Low);
        assert_eq!(Priority::default(), Priority::Medium);
    }

    #[test]
    fn parse_priority_accepts_short_forms() {
        assert_eq!(Priority::parse_priority("HIGH"), Some(Priority::High));
        assert_eq!(Priority::parse_priority("m"), Some(Priority::Medium));
        assert_eq!(Priority::parse_priority("urgent"), None);
    }

    #[test]
    fn deserializes_camel_case_blob() {
        let json = r#"{
            "id": "1704880800000",
            "text": "Ship release",
            "completed": false,
            "createdAt": "2024-01-10T09:00:00.000Z",
            "dueDate": "2024-01-10T17:00:00.000Z",
            "priority": "high",
            "projectName": "Work"
        }"#;
        let todo: Todo = serde_json::from_str(json).unwrap();
        assert_eq!(todo.id, "1704880800000");
        assert_eq!(todo.priority, Priority::High);
        assert_eq!(todo.project_name.as_deref(), Some("Work"));
        assert_eq!(
            todo.due_date,
            Some(Utc.with_ymd_and_hms(2024, 1, 10, 17, 0, 0).unwrap())
        );
        assert!(todo.reminder.is_none());
    }

    #[test]
    fn missing_priority_defaults_to_medium() {
        let json = r#"{"id":"a","text":"t","createdAt":"2024-01-10T09:00:00Z"}"#;
        let todo: Todo = serde_json::from_str(json).unwrap();
        assert_eq!(todo.priority, Priority::Medium);
        assert!(!todo.completed);
    }

    #[test]
    fn overdue_requires_open_and_past_due() {
        let now = Utc.with_ymd_and_hms(2024, 1, 10, 12, 0, 0).unwrap();
        let mut todo = Todo::new("x", now);
        assert!(!todo.is_overdue(now));
        todo.due_date = Some(now - chrono::Duration::hours(1));
        assert!(todo.is_overdue(now));
        todo.completed = true;
        assert!(!todo.is_overdue(now));
    }

    #[test]
    fn patch_reports_changes_only() {
        let now = Utc.with_ymd_and_hms(2024, 1, 10, 12, 0, 0).unwrap();
        let mut todo = Todo::new("x", now);
        let patch = TodoPatch {
            priority: Some(Priority::Medium),
            ..Default::default()
        };
        assert!(!patch.apply(&mut todo));

        let patch = TodoPatch {
            project_name: Some(Some("Work".into())),
            due_date: Some(Some(now)),
            ..Default::default()
        };
        assert!(patch.apply(&mut todo));
        assert_eq!(todo.project_label(), "Work");

        let clear = TodoPatch {
            project_name: Some(None),
            ..Default::default()
        };
        assert!(clear.apply(&mut todo));
        assert_eq!(todo.project_label(), NO_PROJECT);
    }

    #[test]
    fn new_todos_get_distinct_ids() {
        let now = Utc::now();
        assert_ne!(Todo::new("a", now).id, Todo::new("a", now).id);
    }
}
