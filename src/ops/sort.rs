use std::cmp::Ordering;

use crate::model::todo::Todo;

/// Leaf ordering: priority high→low, then due date ascending with undated
/// todos last, then creation time ascending.
pub fn compare_todos(a: &Todo, b: &Todo) -> Ordering {
    b.priority
        .cmp(&a.priority)
        .then_with(|| compare_due(a, b))
        .then_with(|| a.created_at.cmp(&b.created_at))
}

fn compare_due(a: &Todo, b: &Todo) -> Ordering {
    match (a.due_date, b.due_date) {
        (Some(x), Some(y)) => x.cmp(&y),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}

/// Sort in place with [`compare_todos`]
pub fn sort_todos(todos: &mut [&Todo]) {
    todos.sort_by(|a, b| compare_todos(a, b));
}

/// Ungrouped listing: open todos in leaf order, then completed todos newest
/// first.
pub fn flat_order<'a, I>(todos: I) -> Vec<&'a Todo>
where
    I: IntoIterator<Item = &'a Todo>,
{
    let (mut done, mut open): (Vec<&Todo>, Vec<&Todo>) =
        todos.into_iter().partition(|t| t.completed);
    sort_todos(&mut open);
    done.sort_by(|a, b| b.created_at.cmp(&a.created_at));
    open.extend(done);
    open
}
