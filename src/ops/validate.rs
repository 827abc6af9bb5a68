use chrono::{DateTime, Utc};

pub const MAX_TEXT_CHARS: usize = 200;
pub const MAX_PROJECT_CHARS: usize = 50;

/// Rejected user input
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("todo text cannot be empty")]
    EmptyText,
    #[error("todo text is too long ({0} characters, max 200)")]
    TextTooLong(usize),
    #[error("project name cannot be empty")]
    EmptyProject,
    #[error("project name is too long ({0} characters, max 50)")]
    ProjectTooLong(usize),
    #[error("reminder time {0} is not in the future")]
    ReminderInPast(DateTime<Utc>),
}

/// Trimmed todo text, 1..=200 characters
pub fn todo_text(raw: &str) -> Result<String, ValidationError> {
    let text = raw.trim();
    let len = text.chars().count();
    if len == 0 {
        return Err(ValidationError::EmptyText);
    }
    if len > MAX_TEXT_CHARS {
        return Err(ValidationError::TextTooLong(len));
    }
    Ok(text.to_string())
}

/// Trimmed project name, 1..=50 characters
pub fn project_name(raw: &str) -> Result<String, ValidationError> {
    let name = raw.trim();
    let len = name.chars().count();
    if len == 0 {
        return Err(ValidationError::EmptyProject);
    }
    if len > MAX_PROJECT_CHARS {
        return Err(ValidationError::ProjectTooLong(len));
    }
    Ok(name.to_string())
}

pub fn reminder_time(at: DateTime<Utc>, now: DateTime<Utc>) -> Result<DateTime<Utc>, ValidationError> {
    if at <= now {
        return Err(ValidationError::ReminderInPast(at));
    }
    Ok(at)
}
