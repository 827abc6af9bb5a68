use chrono::{DateTime, Local, Utc};
use serde::Serialize;

use crate::model::todo::Todo;
use crate::model::tree::{GroupSummary, TreeItem};
use crate::model::view::{EvalInstant, StatusFilter};
use crate::ops::describe::{describe, format_due_date, format_reminder_time};
use crate::ops::filter::status_class;

/// Characters of the id shown in listings
pub const SHORT_ID_LEN: usize = 8;

// ---------------------------------------------------------------------------
// JSON output structs
// ---------------------------------------------------------------------------

#[derive(Serialize)]
pub struct TodoJson<'a> {
    #[serde(flatten)]
    pub todo: &'a Todo,
    pub status: StatusFilter,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub description: String,
}

#[derive(Serialize)]
pub struct AddedJson {
    pub id: String,
}

#[derive(Serialize)]
pub struct OverdueJson<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    pub todos: Vec<TodoJson<'a>>,
}

#[derive(Serialize)]
pub struct LedgerJson {
    pub path: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
}

// ---------------------------------------------------------------------------
// Conversions
// ---------------------------------------------------------------------------

pub fn todo_to_json<'a>(todo: &'a Todo, at: &EvalInstant) -> TodoJson<'a> {
    TodoJson {
        todo,
        status: status_class(todo, at),
        description: describe(todo, at.now),
    }
}

// ---------------------------------------------------------------------------
// Text formatting
// ---------------------------------------------------------------------------

pub fn short_id(id: &str) -> &str {
    match id.char_indices().nth(SHORT_ID_LEN) {
        Some((end, _)) => &id[..end],
        None => id,
    }
}

fn check_char(todo: &Todo) -> char {
    if todo.completed { 'x' } else { ' ' }
}

/// Format a single todo row: `[ ] 1a2b3c4d  text  (description)`
pub fn format_todo_line(todo: &Todo, now: DateTime<Utc>) -> String {
    let mut line = format!("[{}] {}  {}", check_char(todo), short_id(&todo.id), todo.text);
    let desc = describe(todo, now);
    if !desc.is_empty() {
        line.push_str(&format!("  ({})", desc));
    }
    line
}

/// `3 todos, 1 urgent, 1 overdue, 1 done`, leaving out zero counts
pub fn format_summary(summary: &GroupSummary) -> String {
    let noun = if summary.total == 1 { "todo" } else { "todos" };
    let mut parts = vec![format!("{} {}", summary.total, noun)];
    if summary.urgent > 0 {
        parts.push(format!("{} urgent", summary.urgent));
    }
    if summary.overdue > 0 {
        parts.push(format!("{} overdue", summary.overdue));
    }
    if let Some(done) = summary.completed
        && done > 0
    {
        parts.push(format!("{} done", done));
    }
    parts.join(", ")
}

/// Indented rows for a flattened forest
pub fn format_tree(rows: &[(usize, TreeItem)], now: DateTime<Utc>) -> Vec<String> {
    rows.iter()
        .map(|(depth, item)| {
            let indent = "  ".repeat(*depth);
            match item {
                TreeItem::Group { label, summary } => {
                    format!("{}{} ({})", indent, label, format_summary(summary))
                }
                TreeItem::Project { name, summary } => {
                    format!("{}# {} ({})", indent, name, format_summary(summary))
                }
                TreeItem::Todo(todo) => format!("{}{}", indent, format_todo_line(todo, now)),
            }
        })
        .collect()
}

fn format_local(ts: DateTime<Utc>) -> String {
    ts.with_timezone(&Local).format("%Y-%m-%d %H:%M").to_string()
}

/// Detailed todo view
pub fn format_todo_detail(todo: &Todo, at: &EvalInstant) -> Vec<String> {
    let mut lines = Vec::new();
    lines.push(format!("[{}] {}", check_char(todo), todo.text));
    lines.push(format!("id: {}", todo.id));
    lines.push(format!("status: {}", status_label(status_class(todo, at))));
    lines.push(format!("priority: {}", todo.priority));
    if let Some(project) = &todo.project_name {
        lines.push(format!("project: {}", project));
    }
    lines.push(format!("created: {}", format_local(todo.created_at)));
    if let Some(due) = todo.due_date {
        lines.push(format!(
            "due: {} ({})",
            format_local(due),
            format_due_date(due, at.now)
        ));
    }
    if let Some(reminder) = todo.reminder {
        let when = if reminder > at.now {
            format_reminder_time(reminder, at.now)
        } else {
            "passed".to_string()
        };
        lines.push(format!("reminder: {} ({})", format_local(reminder), when));
    }
    lines
}

pub fn status_label(status: StatusFilter) -> &'static str {
    match status {
        StatusFilter::Completed => "completed",
        StatusFilter::Pending => "pending",
        StatusFilter::Overdue => "overdue",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::todo::Priority;
    use crate::model::tree::GroupSummary;
    use crate::util::test_helpers::{local, todo};
    use pretty_assertions::assert_eq;

    #[test]
    fn short_id_truncates() {
        assert_eq!(short_id("0123456789abcdef"), "01234567");
        assert_eq!(short_id("abc"), "abc");
    }

    #[test]
    fn summary_skips_zero_counts() {
        let summary = GroupSummary {
            total: 3,
            urgent: 1,
            overdue: 0,
            completed: Some(1),
        };
        assert_eq!(format_summary(&summary), "3 todos, 1 urgent, 1 done");
        let one = GroupSummary {
            total: 1,
            ..Default::default()
        };
        assert_eq!(format_summary(&one), "1 todo");
    }

    #[test]
    fn tree_rows_indent_by_depth() {
        let now = local(2024, 1, 10, 9, 0);
        let mut t = todo("Ship release", Priority::High, now);
        t.id = "abcdef0123".into();
        t.project_name = Some("Work".into());
        let summary = GroupSummary {
            total: 1,
            urgent: 1,
            overdue: 0,
            completed: Some(0),
        };
        let rows = vec![
            (
                0,
                TreeItem::Group {
                    label: "Urgent".into(),
                    summary,
                },
            ),
            (
                1,
                TreeItem::Project {
                    name: "Work".into(),
                    summary,
                },
            ),
            (2, TreeItem::Todo(&t)),
        ];
        assert_eq!(
            format_tree(&rows, now),
            vec![
                "Urgent (1 todo, 1 urgent)".to_string(),
                "  # Work (1 todo, 1 urgent)".to_string(),
                "    [ ] abcdef01  Ship release  (Work • High Priority)".to_string(),
            ]
        );
    }

    #[test]
    fn detail_lists_optional_fields() {
        let now = local(2024, 1, 10, 9, 0);
        let mut t = todo("Ship release", Priority::High, now);
        t.due_date = Some(local(2024, 1, 11, 17, 0));
        let lines = format_todo_detail(&t, &EvalInstant::at(now));
        assert!(lines.contains(&"status: pending".to_string()));
        assert!(lines.contains(&"due: 2024-01-11 17:00 (tomorrow)".to_string()));
        assert!(!lines.iter().any(|l| l.starts_with("project:")));
    }
}
