pub mod describe;
pub mod filter;
pub mod group;
pub mod reminder;
pub mod sort;
pub mod store;
pub mod validate;

pub use filter::filter_todos;
pub use group::group_todos;
pub use reminder::{Notifier, ReminderAction, ReminderEvent, ReminderScheduler};
pub use sort::{compare_todos, sort_todos};
pub use store::{StoreError, StoreOptions, TodoStore};
