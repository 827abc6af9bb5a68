use chrono::{Datelike, Days, NaiveDate};

use crate::model::todo::Todo;
use crate::model::view::{DateRange, EvalInstant, FilterConfig, StatusFilter, local_date};

/// Status class of a single todo for the status filter
pub fn status_class(todo: &Todo, at: &EvalInstant) -> StatusFilter {
    if todo.completed {
        StatusFilter::Completed
    } else if todo.due_date.is_some_and(|due| due < at.now) {
        StatusFilter::Overdue
    } else {
        StatusFilter::Pending
    }
}

/// Reduce `todos` to those satisfying every constrained field of `filter`.
///
/// Pure: the result depends only on the arguments, and order follows the
/// input.
pub fn filter_todos<'a, I>(todos: I, filter: &FilterConfig, at: &EvalInstant) -> Vec<&'a Todo>
where
    I: IntoIterator<Item = &'a Todo>,
{
    let search = filter
        .search_text
        .as_deref()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_lowercase);

    todos
        .into_iter()
        .filter(|todo| {
            (filter.status.is_empty() || filter.status.contains(&status_class(todo, at)))
                && (filter.priority.is_empty() || filter.priority.contains(&todo.priority))
                && (filter.projects.is_empty()
                    || filter.projects.iter().any(|p| p == todo.project_label()))
                && in_date_range(todo, filter.date_range, at)
                && search.as_deref().is_none_or(|needle| matches_search(todo, needle))
        })
        .collect()
}

fn matches_search(todo: &Todo, needle: &str) -> bool {
    todo.text.to_lowercase().contains(needle)
        || todo
            .project_name
            .as_deref()
            .is_some_and(|p| p.to_lowercase().contains(needle))
}

/// Whether either the due date or the creation date falls in `range`
pub fn in_date_range(todo: &Todo, range: DateRange, at: &EvalInstant) -> bool {
    match range {
        DateRange::All => true,
        DateRange::Overdue => todo.is_overdue(at.now),
        DateRange::Upcoming => todo.due_date.is_some_and(|due| due > at.now),
        DateRange::Today | DateRange::ThisWeek | DateRange::ThisMonth => {
            let (start, end) = window(range, at);
            let inside = |date: NaiveDate| date >= start && date < end;
            todo.due_date.map(local_date).is_some_and(inside) || inside(local_date(todo.created_at))
        }
    }
}

/// Half-open `[start, end)` calendar window for the day-aligned ranges
fn window(range: DateRange, at: &EvalInstant) -> (NaiveDate, NaiveDate) {
    let today = at.today();
    match range {
        DateRange::ThisWeek => {
            let start = at.week_start_date();
            (start, start + Days::new(7))
        }
        DateRange::ThisMonth => {
            let start = today.with_day(1).unwrap_or(today);
            let end = start.checked_add_months(chrono::Months::new(1)).unwrap_or(NaiveDate::MAX);
            (start, end)
        }
        _ => (today, today + Days::new(1)),
    }
}
