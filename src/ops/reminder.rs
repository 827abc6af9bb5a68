use std::cmp::Reverse;
use std::collections::{BinaryHeap, HashMap, HashSet};

use chrono::{DateTime, Duration, Utc};
use serde::Serialize;

/// Lifecycle of a todo's reminder timer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReminderState {
    Unarmed,
    Armed,
    Fired,
}

/// Choices offered when a reminder fires
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ReminderAction {
    Complete,
    Snooze,
    Dismiss,
}

impl ReminderAction {
    pub const ALL: [ReminderAction; 3] = [
        ReminderAction::Complete,
        ReminderAction::Snooze,
        ReminderAction::Dismiss,
    ];

    /// Button label; the snooze label names its length in minutes
    pub fn label(self, snooze: Duration) -> String {
        match self {
            ReminderAction::Complete => "Mark Complete".to_string(),
            ReminderAction::Snooze => format!("Snooze {} min", snooze.num_minutes()),
            ReminderAction::Dismiss => "Dismiss".to_string(),
        }
    }

    /// Match a typed answer: the full label, the action name, or its first letter
    pub fn parse_answer(s: &str, snooze: Duration) -> Option<ReminderAction> {
        let answer = s.trim().to_ascii_lowercase();
        ReminderAction::ALL.into_iter().find(|action| {
            let label = action.label(snooze).to_ascii_lowercase();
            let name = format!("{action:?}").to_ascii_lowercase();
            answer == label || answer == name || (answer.len() == 1 && name.starts_with(&answer))
        })
    }
}

/// A fired reminder, handed to the notifier
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReminderEvent {
    pub todo_id: String,
    pub text: String,
    pub fired_at: DateTime<Utc>,
    #[serde(skip)]
    pub snooze: Duration,
}

impl ReminderEvent {
    pub fn message(&self) -> String {
        format!("Reminder: {}", self.text)
    }

    pub fn action_labels(&self) -> [String; 3] {
        ReminderAction::ALL.map(|a| a.label(self.snooze))
    }
}

/// Presents a fired reminder and reports the user's choice, if any.
pub trait Notifier {
    fn notify(&mut self, event: &ReminderEvent) -> Option<ReminderAction>;
}

#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
struct Armed {
    due: DateTime<Utc>,
    generation: u64,
    todo_id: String,
}

/// One-shot reminder timers keyed by todo id, polled by the owner.
///
/// Re-arming an id supersedes its pending entry: the old queue entry stays in
/// the heap but no longer matches the id's live generation and is discarded
/// when it surfaces.
#[derive(Debug, Default)]
pub struct ReminderScheduler {
    queue: BinaryHeap<Reverse<Armed>>,
    live: HashMap<String, u64>,
    fired: HashSet<String>,
    next_generation: u64,
}

impl ReminderScheduler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Arm a timer for `at`, superseding any pending one for the same id.
    /// Returns false unless `at > now`, in which case the id is left unarmed.
    pub fn arm(&mut self, todo_id: &str, at: DateTime<Utc>, now: DateTime<Utc>) -> bool {
        if at <= now {
            self.live.remove(todo_id);
            return false;
        }
        self.next_generation += 1;
        let generation = self.next_generation;
        self.live.insert(todo_id.to_string(), generation);
        self.fired.remove(todo_id);
        self.queue.push(Reverse(Armed {
            due: at,
            generation,
            todo_id: todo_id.to_string(),
        }));
        tracing::debug!(id = todo_id, at = %at, "reminder armed");
        true
    }

    /// Pop every live timer with `due <= now`, in due order. Each fires once.
    pub fn due(&mut self, now: DateTime<Utc>) -> Vec<String> {
        let mut fired = Vec::new();
        while let Some(Reverse(top)) = self.queue.peek() {
            if top.due > now {
                break;
            }
            let Some(Reverse(entry)) = self.queue.pop() else {
                break;
            };
            if self.live.get(&entry.todo_id) != Some(&entry.generation) {
                continue;
            }
            self.live.remove(&entry.todo_id);
            self.fired.insert(entry.todo_id.clone());
            fired.push(entry.todo_id);
        }
        fired
    }

    /// Earliest live deadline, for sizing the owner's sleep
    pub fn next_deadline(&self) -> Option<DateTime<Utc>> {
        self.queue
            .iter()
            .filter(|Reverse(e)| self.live.get(&e.todo_id) == Some(&e.generation))
            .map(|Reverse(e)| e.due)
            .min()
    }

    pub fn state(&self, todo_id: &str) -> ReminderState {
        if self.live.contains_key(todo_id) {
            ReminderState::Armed
        } else if self.fired.contains(todo_id) {
            ReminderState::Fired
        } else {
            ReminderState::Unarmed
        }
    }

    pub fn armed_count(&self) -> usize {
        self.live.len()
    }

    /// Drop all state for an id whose todo is gone. A queued entry for it
    /// is discarded when it surfaces.
    pub fn forget(&mut self, todo_id: &str) {
        self.live.remove(todo_id);
        self.fired.remove(todo_id);
    }
}
