use chrono::{DateTime, Duration, Utc};

use crate::io::kv_store::{KeyValueStore, PersistError, TODOS_KEY, VIEW_KEY};
use crate::io::ledger_io::{LedgerError, LedgerFile};
use crate::model::todo::{NewTodo, Priority, Todo, TodoPatch};
use crate::model::tree::GroupNode;
use crate::model::view::{EvalInstant, FilterConfig, GroupingConfig, ViewState};
use crate::ops::filter::filter_todos;
use crate::ops::group::group_todos;
use crate::ops::reminder::{
    Notifier, ReminderAction, ReminderEvent, ReminderScheduler, ReminderState,
};

/// Error type for store mutations
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error(transparent)]
    Persist(#[from] PersistError),
    #[error(transparent)]
    Ledger(#[from] LedgerError),
}

/// Settings applied when a store is opened
#[derive(Debug, Clone)]
pub struct StoreOptions {
    /// Create the welcome todos when the loaded collection is empty
    pub seed_samples: bool,
    pub snooze: Duration,
    /// Arm reminders due after this instant rather than after `now`, so a
    /// reload does not skip the ones that came due since the last poll
    pub armed_since: Option<DateTime<Utc>>,
}

impl Default for StoreOptions {
    fn default() -> Self {
        StoreOptions {
            seed_samples: false,
            snooze: Duration::minutes(10),
            armed_since: None,
        }
    }
}

/// Owns the todo collection and keeps the backend, ledger and reminder
/// timers in step with it.
///
/// Every mutation updates memory first, then persists. Errors from the
/// backend or ledger are returned as-is; in-memory state is not rolled back.
pub struct TodoStore<S: KeyValueStore> {
    todos: Vec<Todo>,
    backend: S,
    ledger: Option<LedgerFile>,
    reminders: ReminderScheduler,
    snooze: Duration,
}

impl<S: KeyValueStore> TodoStore<S> {
    /// Load the collection and arm a timer for every open todo whose
    /// reminder is still ahead of `now`, or of `options.armed_since` when
    /// that is earlier. Reminders already due fire on the next poll.
    pub fn open(
        backend: S,
        ledger: Option<LedgerFile>,
        options: StoreOptions,
        now: DateTime<Utc>,
    ) -> Result<Self, StoreError> {
        let todos: Vec<Todo> = backend.load(TODOS_KEY)?;
        let mut store = TodoStore {
            todos,
            backend,
            ledger,
            reminders: ReminderScheduler::new(),
            snooze: options.snooze,
        };

        if store.todos.is_empty() && options.seed_samples {
            store.todos = sample_todos(now);
            store.persist()?;
            tracing::info!("seeded sample todos");
        }

        let horizon = options.armed_since.map_or(now, |since| since.min(now));
        let mut armed = 0;
        for todo in store.todos.iter().filter(|t| !t.completed) {
            if let Some(at) = todo.reminder
                && store.reminders.arm(&todo.id, at, horizon)
            {
                armed += 1;
            }
        }
        tracing::debug!(count = store.todos.len(), armed, "store opened");
        Ok(store)
    }

    pub fn todos(&self) -> &[Todo] {
        &self.todos
    }

    pub fn get(&self, id: &str) -> Option<&Todo> {
        self.todos.iter().find(|t| t.id == id)
    }

    pub fn backend(&self) -> &S {
        &self.backend
    }

    pub fn snooze(&self) -> Duration {
        self.snooze
    }

    /// Append a new todo, persist, record it in the ledger and arm its
    /// reminder if one lies in the future. Returns the new id.
    pub fn add(&mut self, new: NewTodo, now: DateTime<Utc>) -> Result<String, StoreError> {
        let mut todo = Todo::new(new.text, now);
        while self.get(&todo.id).is_some() {
            todo.id = uuid::Uuid::new_v4().to_string();
        }
        todo.priority = new.priority;
        todo.due_date = new.due_date;
        todo.project_name = new.project_name;
        todo.reminder = new.reminder;

        let id = todo.id.clone();
        if let Some(at) = todo.reminder {
            self.reminders.arm(&id, at, now);
        }
        self.todos.push(todo);
        tracing::debug!(id = %id, "todo added");

        self.persist()?;
        if let Some(ledger) = &self.ledger
            && let Some(todo) = self.todos.last()
        {
            ledger.record(todo)?;
        }
        Ok(id)
    }

    pub fn edit(&mut self, id: &str, text: &str) -> Result<bool, StoreError> {
        self.mutate(id, |t| t.text = text.to_string())
    }

    pub fn toggle_complete(&mut self, id: &str) -> Result<bool, StoreError> {
        self.mutate(id, |t| t.completed = !t.completed)
    }

    /// Mark complete without toggling. Already-complete todos stay complete.
    pub fn complete(&mut self, id: &str) -> Result<bool, StoreError> {
        self.mutate(id, |t| t.completed = true)
    }

    /// Apply a partial update. Persists only when a field actually changed.
    pub fn update(&mut self, id: &str, patch: &TodoPatch) -> Result<bool, StoreError> {
        let Some(todo) = self.todos.iter_mut().find(|t| t.id == id) else {
            return Ok(false);
        };
        if patch.apply(todo) {
            tracing::debug!(id, "todo updated");
            self.persist()?;
        }
        Ok(true)
    }

    /// Remove a todo and any reminder state kept for it
    pub fn delete(&mut self, id: &str) -> Result<bool, StoreError> {
        let before = self.todos.len();
        self.todos.retain(|t| t.id != id);
        if self.todos.len() == before {
            return Ok(false);
        }
        self.reminders.forget(id);
        tracing::debug!(id, "todo deleted");
        self.persist()?;
        Ok(true)
    }

    /// Set the reminder field and arm a timer when `at` is after `now`
    pub fn set_reminder(
        &mut self,
        id: &str,
        at: DateTime<Utc>,
        now: DateTime<Utc>,
    ) -> Result<bool, StoreError> {
        let Some(todo) = self.todos.iter_mut().find(|t| t.id == id) else {
            return Ok(false);
        };
        todo.reminder = Some(at);
        let armed = self.reminders.arm(id, at, now);
        tracing::debug!(id, at = %at, armed, "reminder set");
        self.persist()?;
        Ok(true)
    }

    pub fn reminder_state(&self, id: &str) -> ReminderState {
        self.reminders.state(id)
    }

    pub fn next_deadline(&self) -> Option<DateTime<Utc>> {
        self.reminders.next_deadline()
    }

    pub fn armed_reminders(&self) -> usize {
        self.reminders.armed_count()
    }

    /// Fire every timer due at `now`. Timers whose todo is gone or complete
    /// are dropped without an event.
    pub fn poll_reminders(&mut self, now: DateTime<Utc>) -> Vec<ReminderEvent> {
        let mut events = Vec::new();
        for id in self.reminders.due(now) {
            match self.get(&id) {
                None => {
                    self.reminders.forget(&id);
                    tracing::debug!(id = %id, "reminder dropped: todo deleted");
                }
                Some(todo) if todo.completed => {
                    tracing::debug!(id = %id, "reminder dropped: todo completed")
                }
                Some(todo) => {
                    tracing::info!(id = %id, text = %todo.text, "reminder fired");
                    events.push(ReminderEvent {
                        todo_id: id.clone(),
                        text: todo.text.clone(),
                        fired_at: now,
                        snooze: self.snooze,
                    });
                }
            }
        }
        events
    }

    /// Carry out the user's answer to a fired reminder
    pub fn respond(
        &mut self,
        event: &ReminderEvent,
        action: Option<ReminderAction>,
        now: DateTime<Utc>,
    ) -> Result<(), StoreError> {
        match action {
            Some(ReminderAction::Complete) => {
                self.complete(&event.todo_id)?;
            }
            Some(ReminderAction::Snooze) => {
                self.set_reminder(&event.todo_id, now + self.snooze, now)?;
            }
            Some(ReminderAction::Dismiss) | None => {}
        }
        Ok(())
    }

    /// Poll, hand each event to `notifier`, and apply its answer.
    /// Returns the number of reminders delivered.
    pub fn dispatch_reminders(
        &mut self,
        notifier: &mut dyn Notifier,
        now: DateTime<Utc>,
    ) -> Result<usize, StoreError> {
        let events = self.poll_reminders(now);
        for event in &events {
            let action = notifier.notify(event);
            self.respond(event, action, now)?;
        }
        Ok(events.len())
    }

    /// Filtered, grouped view of the collection
    pub fn view(
        &self,
        filter: &FilterConfig,
        grouping: &GroupingConfig,
        at: &EvalInstant,
    ) -> Vec<GroupNode<'_>> {
        let visible = filter_todos(&self.todos, filter, at);
        group_todos(&visible, grouping, at)
    }

    pub fn load_view(&self) -> Result<ViewState, StoreError> {
        Ok(self.backend.load(VIEW_KEY)?)
    }

    pub fn save_view(&mut self, view: &ViewState) -> Result<(), StoreError> {
        Ok(self.backend.save(VIEW_KEY, view)?)
    }

    fn mutate(&mut self, id: &str, change: impl FnOnce(&mut Todo)) -> Result<bool, StoreError> {
        let Some(todo) = self.todos.iter_mut().find(|t| t.id == id) else {
            return Ok(false);
        };
        change(todo);
        tracing::debug!(id, "todo changed");
        self.persist()?;
        Ok(true)
    }

    fn persist(&mut self) -> Result<(), PersistError> {
        self.backend.save(TODOS_KEY, &self.todos)
    }
}

/// Welcome todos for an empty collection
fn sample_todos(now: DateTime<Utc>) -> Vec<Todo> {
    let sample = |text: &str, priority: Priority, completed: bool| {
        let mut todo = Todo::new(text, now);
        todo.priority = priority;
        todo.completed = completed;
        todo
    };
    vec![
        sample("Welcome to tasklog!", Priority::High, false),
        sample("Add your own todos with `tl add`", Priority::Medium, false),
        sample("Toggle a todo with `tl done <id>`", Priority::Low, true),
    ]
}
