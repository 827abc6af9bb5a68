//! Short human-readable descriptions of todos, due dates and reminders.

use chrono::{DateTime, Days, Local, Utc};

use crate::model::todo::{Priority, Todo};
use crate::model::view::local_date;
use crate::ops::group::days_until;

const SEPARATOR: &str = " • ";

/// `Overdue`, `Due Today`, `Due Tomorrow` or `Due in N days` (up to a week out)
pub fn due_description(due: DateTime<Utc>, now: DateTime<Utc>) -> Option<String> {
    match days_until(due, now) {
        d if d < 0 => Some("Overdue".to_string()),
        0 => Some("Due Today".to_string()),
        1 => Some("Due Tomorrow".to_string()),
        d if d <= 7 => Some(format!("Due in {d} days")),
        _ => None,
    }
}

/// Low priority is unremarkable and gets no description
pub fn priority_description(priority: Priority) -> Option<&'static str> {
    match priority {
        Priority::High | Priority::Medium => Some(priority.label()),
        Priority::Low => None,
    }
}

/// One-line summary: project, then completion, due date or priority
pub fn describe(todo: &Todo, now: DateTime<Utc>) -> String {
    let mut parts: Vec<String> = Vec::new();
    if let Some(project) = &todo.project_name {
        parts.push(project.clone());
    }

    if todo.completed {
        parts.push("✓ Completed".to_string());
    } else if let Some(due) = todo.due_date.and_then(|d| due_description(d, now)) {
        parts.push(due);
    } else if let Some(desc) = priority_description(todo.priority) {
        parts.push(desc.to_string());
    }
    parts.join(SEPARATOR)
}

/// Relative phrasing of a reminder time:
/// `in 25 minutes (09:25)`, `in 3 hours (12:00)`, `tomorrow at 09:00`,
/// otherwise `Thu, Jan 18, 09:00`.
pub fn format_reminder_time(at: DateTime<Utc>, now: DateTime<Utc>) -> String {
    let local = at.with_timezone(&Local);
    let clock = local.format("%H:%M");
    let today = local_date(now);
    let day = local.date_naive();

    if day == today {
        let diff = at - now;
        let hours = diff.num_hours();
        if hours == 0 {
            let minutes = diff.num_minutes();
            return format!("in {minutes} minute{} ({clock})", plural(minutes));
        }
        if (1..24).contains(&hours) {
            return format!("in {hours} hour{} ({clock})", plural(hours));
        }
    }
    if today.checked_add_days(Days::new(1)) == Some(day) {
        return format!("tomorrow at {clock}");
    }
    local.format("%a, %b %-d, %H:%M").to_string()
}

/// Calendar phrasing of a due date: `today`, `tomorrow`, `in N days`, else `Jan 18`
pub fn format_due_date(due: DateTime<Utc>, now: DateTime<Utc>) -> String {
    let today = local_date(now);
    let day = local_date(due);
    let diff = (day - today).num_days();
    match diff {
        0 => "today".to_string(),
        1 => "tomorrow".to_string(),
        2..=7 => format!("in {diff} days"),
        _ => due.with_timezone(&Local).format("%b %-d").to_string(),
    }
}

/// Open todos whose due date has passed, in collection order
pub fn overdue_todos(todos: &[Todo], now: DateTime<Utc>) -> Vec<&Todo> {
    todos.iter().filter(|t| t.is_overdue(now)).collect()
}

/// Digest line for the overdue check, or `None` when nothing is overdue
pub fn overdue_message(overdue: &[&Todo]) -> Option<String> {
    match overdue {
        [] => None,
        [only] => Some(format!("You have 1 overdue todo: \"{}\"", only.text)),
        many => Some(format!("You have {} overdue todos", many.len())),
    }
}

fn plural(n: i64) -> &'static str {
    if n == 1 { "" } else { "s" }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::util::test_helpers::{local, todo};
    use chrono::Duration;

    fn now() -> DateTime<Utc> {
        local(2024, 1, 10, 9, 0)
    }

    #[test]
    fn due_descriptions_use_rounded_up_days() {
        assert_eq!(due_description(now() - Duration::minutes(1), now()).as_deref(), Some("Overdue"));
        assert_eq!(due_description(now(), now()).as_deref(), Some("Due Today"));
        // eight hours ahead rounds up to one day
        assert_eq!(
            due_description(now() + Duration::hours(8), now()).as_deref(),
            Some("Due Tomorrow")
        );
        assert_eq!(
            due_description(now() + Duration::days(3), now()).as_deref(),
            Some("Due in 3 days")
        );
        assert_eq!(due_description(now() + Duration::days(9), now()), None);
    }

    #[test]
    fn describe_prefers_completion_then_due_then_priority() {
        let mut t = todo("Ship release", Priority::High, now());
        t.project_name = Some("Work".into());
        assert_eq!(describe(&t, now()), "Work • High Priority");

        t.due_date = Some(now() + Duration::days(2));
        assert_eq!(describe(&t, now()), "Work • Due in 2 days");

        t.completed = true;
        assert_eq!(describe(&t, now()), "Work • ✓ Completed");

        let low = todo("someday", Priority::Low, now());
        assert_eq!(describe(&low, now()), "");
    }

    #[test]
    fn reminder_times_read_relative() {
        assert_eq!(
            format_reminder_time(local(2024, 1, 10, 9, 25), now()),
            "in 25 minutes (09:25)"
        );
        assert_eq!(
            format_reminder_time(local(2024, 1, 10, 10, 0), now()),
            "in 1 hour (10:00)"
        );
        assert_eq!(
            format_reminder_time(local(2024, 1, 11, 8, 30), now()),
            "tomorrow at 08:30"
        );
        assert_eq!(
            format_reminder_time(local(2024, 1, 18, 9, 0), now()),
            "Thu, Jan 18, 09:00"
        );
    }

    #[test]
    fn due_dates_read_as_calendar_days() {
        assert_eq!(format_due_date(local(2024, 1, 10, 23, 59), now()), "today");
        assert_eq!(format_due_date(local(2024, 1, 11, 0, 30), now()), "tomorrow");
        assert_eq!(format_due_date(local(2024, 1, 15, 12, 0), now()), "in 5 days");
        assert_eq!(format_due_date(local(2024, 2, 1, 12, 0), now()), "Feb 1");
    }

    #[test]
    fn overdue_digest() {
        let mut late = todo("File taxes", Priority::Medium, now() - Duration::days(3));
        late.due_date = Some(now() - Duration::days(1));
        let mut done = late.clone();
        done.completed = true;
        let fresh = todo("later", Priority::Medium, now());

        let todos = vec![late.clone(), done, fresh];
        let overdue = overdue_todos(&todos, now());
        assert_eq!(
            overdue_message(&overdue).as_deref(),
            Some("You have 1 overdue todo: \"File taxes\"")
        );

        let two = [&late, &late];
        assert_eq!(overdue_message(&two).as_deref(), Some("You have 2 overdue todos"));
        assert_eq!(overdue_message(&[]), None);
    }
}
