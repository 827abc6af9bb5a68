use chrono::NaiveDate;

use crate::model::todo::Todo;
use crate::model::view::local_date;

/// Suffix shared by every date section header
pub const DATE_HEADER_SUFFIX: &str = "'s tasks:";

/// Project header used for todos without a project
pub const GENERAL_HEADER: &str = "#General";

/// Comment lines written at the top of a new ledger, followed by a blank line
pub const LEDGER_PREAMBLE: &str = "# Todo Tasks Log\n# Generated by tasklog\n\n";

/// `Wednesday, January 10, 2024's tasks:`
pub fn date_header(date: NaiveDate) -> String {
    format!("{}{}", date.format("%A, %B %-d, %Y"), DATE_HEADER_SUFFIX)
}

/// `#<project>` or `#General`
pub fn project_header(project: Option<&str>) -> String {
    match project {
        Some(name) => format!("#{}", name),
        None => GENERAL_HEADER.to_string(),
    }
}

fn is_date_header(line: &str) -> bool {
    line.ends_with(DATE_HEADER_SUFFIX)
}

/// Insert `todo` into the ledger lines under its creation date and project.
///
/// Lines are only ever inserted: a missing date section is appended to the
/// end, a missing project subsection is placed after the date's existing
/// subsections, and the task line goes after the subsection's last task.
pub fn insert_task(lines: &mut Vec<String>, todo: &Todo) {
    let date = date_header(local_date(todo.created_at));
    let project = project_header(todo.project_name.as_deref());

    let date_idx = match lines.iter().position(|l| *l == date) {
        Some(idx) => idx,
        None => {
            lines.push(String::new());
            lines.push(date);
            lines.push(String::new());
            lines.len() - 2
        }
    };

    let project_idx = match find_project(lines, date_idx, &project) {
        Some(idx) => idx,
        None => {
            let at = subsection_insert_point(lines, date_idx);
            lines.insert(at, String::new());
            lines.insert(at + 1, project);
            at + 1
        }
    };

    let mut task_idx = project_idx + 1;
    while task_idx < lines.len() && lines[task_idx].starts_with('-') {
        task_idx += 1;
    }
    lines.insert(task_idx, format!("- {}", todo.text));
}

/// Find `header` within the date section starting at `date_idx`
fn find_project(lines: &[String], date_idx: usize, header: &str) -> Option<usize> {
    for (idx, line) in lines.iter().enumerate().skip(date_idx + 1) {
        if line == header {
            return Some(idx);
        }
        if is_date_header(line) {
            return None;
        }
    }
    None
}

/// Position for a new project subsection: the next date header, or just
/// past the last `#`/`-` line of this date section.
fn subsection_insert_point(lines: &[String], date_idx: usize) -> usize {
    let mut at = date_idx + 1;
    for (idx, line) in lines.iter().enumerate().skip(date_idx + 1) {
        if is_date_header(line) {
            return idx;
        }
        if line.starts_with('#') || line.starts_with('-') {
            at = idx + 1;
        }
    }
    at
}

/// Insert into a whole ledger document. An empty document gets the preamble.
pub fn insert_into_document(content: &str, todo: &Todo) -> String {
    let source = if content.is_empty() { LEDGER_PREAMBLE } else { content };
    let mut lines: Vec<String> = source.split('\n').map(str::to_string).collect();
    insert_task(&mut lines, todo);
    lines.join("\n")
}
