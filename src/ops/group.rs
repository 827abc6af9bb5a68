use std::cmp::Ordering;

use chrono::{DateTime, Days, Utc};
use indexmap::IndexMap;

use crate::model::todo::{Priority, Todo};
use crate::model::tree::{GroupNode, GroupSummary};
use crate::model::view::{EvalInstant, GroupLevel, GroupingConfig, local_date};
use crate::ops::sort::sort_todos;

/// Status group a todo falls into
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusBucket {
    Completed,
    Overdue,
    Urgent,
    Active,
}

impl StatusBucket {
    pub fn label(self) -> &'static str {
        match self {
            StatusBucket::Completed => "Completed",
            StatusBucket::Overdue => "Overdue",
            StatusBucket::Urgent => "Urgent",
            StatusBucket::Active => "Active",
        }
    }
}

/// Relative date group a todo falls into
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DateBucket {
    Today,
    Tomorrow,
    Yesterday,
    ThisWeek,
    NextWeek,
    Older,
    Future,
}

impl DateBucket {
    pub fn label(self) -> &'static str {
        match self {
            DateBucket::Today => "Today",
            DateBucket::Tomorrow => "Tomorrow",
            DateBucket::Yesterday => "Yesterday",
            DateBucket::ThisWeek => "This Week",
            DateBucket::NextWeek => "Next Week",
            DateBucket::Older => "Older",
            DateBucket::Future => "Future",
        }
    }
}

const STATUS_ORDER: &[&str] = &["Urgent", "Overdue", "Active", "Completed"];
const PRIORITY_ORDER: &[&str] = &["High Priority", "Medium Priority", "Low Priority"];
const DATE_ORDER: &[&str] = &[
    "Overdue",
    "Today",
    "Tomorrow",
    "Yesterday",
    "This Week",
    "Next Week",
    "Future",
    "Older",
];

/// Whole days until `due`, rounded up. Negative when overdue.
pub fn days_until(due: DateTime<Utc>, now: DateTime<Utc>) -> i64 {
    let ms = (due - now).num_milliseconds();
    let day = 86_400_000;
    // ceiling division
    ms.div_euclid(day) + i64::from(ms.rem_euclid(day) != 0)
}

/// High priority, or due within the next day (including overdue)
pub fn is_urgent(todo: &Todo, now: DateTime<Utc>) -> bool {
    todo.priority == Priority::High
        || todo.due_date.is_some_and(|due| days_until(due, now) <= 1)
}

pub fn classify_status(todo: &Todo, at: &EvalInstant) -> StatusBucket {
    if todo.completed {
        StatusBucket::Completed
    } else if todo.is_overdue(at.now) {
        StatusBucket::Overdue
    } else if is_urgent(todo, at.now) {
        StatusBucket::Urgent
    } else {
        StatusBucket::Active
    }
}

/// Bucket the due date (or creation date when undated) against today's
/// calendar boundaries.
pub fn classify_date(todo: &Todo, at: &EvalInstant) -> DateBucket {
    let date = local_date(todo.due_date.unwrap_or(todo.created_at));
    let today = at.today();
    let week_start = at.week_start_date();
    let next_week_start = week_start + Days::new(7);

    if date == today {
        DateBucket::Today
    } else if date == today + Days::new(1) {
        DateBucket::Tomorrow
    } else if date + Days::new(1) == today {
        DateBucket::Yesterday
    } else if date < today {
        DateBucket::Older
    } else if date < next_week_start {
        DateBucket::ThisWeek
    } else if date < next_week_start + Days::new(7) {
        DateBucket::NextWeek
    } else {
        DateBucket::Future
    }
}

/// Group key of a todo at one level
pub fn group_key(level: GroupLevel, todo: &Todo, at: &EvalInstant) -> String {
    match level {
        GroupLevel::Status => classify_status(todo, at).label().to_string(),
        GroupLevel::Priority => todo.priority.label().to_string(),
        GroupLevel::Project => todo.project_label().to_string(),
        GroupLevel::Date => classify_date(todo, at).label().to_string(),
    }
}

/// Order two keys of the same level
fn compare_keys(level: GroupLevel, a: &str, b: &str) -> Ordering {
    let precedence = match level {
        GroupLevel::Status => STATUS_ORDER,
        GroupLevel::Priority => PRIORITY_ORDER,
        GroupLevel::Date => DATE_ORDER,
        GroupLevel::Project => return a.cmp(b),
    };
    let rank = |key: &str| {
        precedence
            .iter()
            .position(|p| *p == key)
            .unwrap_or(precedence.len())
    };
    rank(a).cmp(&rank(b)).then_with(|| a.cmp(b))
}

fn summarize(todos: &[&Todo], level: GroupLevel, at: &EvalInstant) -> GroupSummary {
    GroupSummary {
        total: todos.len(),
        urgent: todos
            .iter()
            .filter(|t| !t.completed && is_urgent(t, at.now))
            .count(),
        overdue: todos.iter().filter(|t| t.is_overdue(at.now)).count(),
        completed: (level != GroupLevel::Status)
            .then(|| todos.iter().filter(|t| t.completed).count()),
    }
}

/// Partition `todos` into the nested groups described by `config`.
///
/// Group order at each level is fixed by the level's ranking, and every leaf
/// is sorted with [`crate::ops::sort::compare_todos`]. Each input todo
/// appears in exactly one leaf.
pub fn group_todos<'a>(
    todos: &[&'a Todo],
    config: &GroupingConfig,
    at: &EvalInstant,
) -> Vec<GroupNode<'a>> {
    build_level(todos, &config.levels(), at)
}

fn build_level<'a>(todos: &[&'a Todo], levels: &[GroupLevel], at: &EvalInstant) -> Vec<GroupNode<'a>> {
    let Some((&level, rest)) = levels.split_first() else {
        return Vec::new();
    };

    let mut buckets: IndexMap<String, Vec<&'a Todo>> = IndexMap::new();
    for &todo in todos {
        buckets.entry(group_key(level, todo, at)).or_default().push(todo);
    }
    buckets.sort_by(|a, _, b, _| compare_keys(level, a, b));

    buckets
        .into_iter()
        .map(|(label, mut bucket)| {
            let summary = summarize(&bucket, level, at);
            if rest.is_empty() {
                sort_todos(&mut bucket);
                GroupNode::Leaf {
                    label,
                    level,
                    summary,
                    todos: bucket,
                }
            } else {
                GroupNode::Branch {
                    label,
                    level,
                    summary,
                    children: build_level(&bucket, rest, at),
                }
            }
        })
        .collect()
}
