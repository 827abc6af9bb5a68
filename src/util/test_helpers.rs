//! Shared builders for unit tests.

use chrono::{DateTime, Local, TimeZone, Utc};

use crate::model::todo::{Priority, Todo};

/// A local wall-clock time as a stored instant
pub fn local(y: i32, m: u32, d: u32, h: u32, min: u32) -> DateTime<Utc> {
    Local
        .with_ymd_and_hms(y, m, d, h, min, 0)
        .single()
        .expect("unambiguous local time")
        .with_timezone(&Utc)
}

/// An open todo with the given priority and creation time
pub fn todo(text: &str, priority: Priority, created_at: DateTime<Utc>) -> Todo {
    let mut t = Todo::new(text, created_at);
    t.priority = priority;
    t
}
