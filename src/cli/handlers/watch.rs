use std::io::{BufRead, Write};
use std::time::Duration as StdDuration;

use chrono::{DateTime, Duration, Utc};

use super::{CmdResult, Context};
use crate::cli::commands::WatchArgs;
use crate::cli::output::format_todo_line;
use crate::io::watcher::StateWatcher;
use crate::ops::describe::{overdue_message, overdue_todos};
use crate::ops::reminder::{Notifier, ReminderAction, ReminderEvent};

/// Longest sleep between checks for external changes
const TICK: StdDuration = StdDuration::from_secs(1);

/// Prints fired reminders and, when interactive, asks what to do with them.
pub struct TerminalNotifier {
    interactive: bool,
}

impl TerminalNotifier {
    pub fn new(interactive: bool) -> Self {
        TerminalNotifier { interactive }
    }
}

impl Notifier for TerminalNotifier {
    fn notify(&mut self, event: &ReminderEvent) -> Option<ReminderAction> {
        println!("{}", event.message());
        if !self.interactive {
            return None;
        }

        let [complete, snooze, dismiss] = event.action_labels();
        print!("  {} / {} / {} [c/s/d]: ", complete, snooze, dismiss);
        std::io::stdout().flush().ok()?;

        let mut answer = String::new();
        std::io::stdin().lock().read_line(&mut answer).ok()?;
        let action = ReminderAction::parse_answer(&answer, event.snooze);
        if action.is_none() && !answer.trim().is_empty() {
            println!("  unrecognized answer, dismissed");
        }
        action
    }
}

/// Foreground loop: deliver reminders as they come due, print the overdue
/// digest periodically, and reload when another process rewrites the state.
pub fn cmd_watch(ctx: &Context, args: WatchArgs) -> CmdResult {
    std::fs::create_dir_all(&ctx.data_dir)?;
    let mut last_poll = Utc::now();
    let mut store = {
        let _lock = ctx.read_lock(false)?;
        ctx.open_store(last_poll)?
    };
    let watcher = StateWatcher::start(&ctx.state_path())?;
    let mut notifier = TerminalNotifier::new(args.interactive);

    let digest_every = Duration::minutes(i64::from(ctx.config.reminders.overdue_check_minutes));
    let mut next_digest = (digest_every > Duration::zero()).then(Utc::now);

    tracing::info!(data_dir = %ctx.data_dir.display(), "watching for reminders");
    let armed = store.armed_reminders();
    println!(
        "watching {} ({} reminder{} pending)",
        ctx.data_dir.display(),
        armed,
        if armed == 1 { "" } else { "s" }
    );

    loop {
        let now = Utc::now();

        if watcher.poll() {
            tracing::debug!("state changed on disk, reloading");
            let _lock = ctx.read_lock(false)?;
            match ctx.reopen_store(last_poll, now) {
                Ok(reloaded) => store = reloaded,
                Err(e) => tracing::warn!(error = %e, "reload failed, keeping previous state"),
            }
        }

        let events = store.poll_reminders(now);
        last_poll = now;
        if !events.is_empty() {
            let answers: Vec<_> = events
                .iter()
                .map(|event| (event, notifier.notify(event)))
                .collect();
            if answers.iter().any(|(_, action)| action.is_some()) {
                // apply answers to the current on-disk state; reminders that
                // came due while the prompt was open fire on the next pass
                let now = Utc::now();
                let _lock = ctx.lock()?;
                store = ctx.reopen_store(last_poll, now)?;
                for (event, action) in answers {
                    store.respond(event, action, now)?;
                }
            }
        }

        if let Some(due) = next_digest
            && due <= now
        {
            let overdue = overdue_todos(store.todos(), now);
            if let Some(message) = overdue_message(&overdue) {
                println!("{}", message);
                for todo in overdue {
                    println!("  {}", format_todo_line(todo, now));
                }
            }
            next_digest = Some(now + digest_every);
        }

        if args.once {
            return Ok(());
        }

        std::thread::sleep(sleep_for(store.next_deadline(), next_digest, Utc::now()));
    }
}

/// Sleep until the nearest deadline, but never longer than one tick
fn sleep_for(
    reminder: Option<DateTime<Utc>>,
    digest: Option<DateTime<Utc>>,
    now: DateTime<Utc>,
) -> StdDuration {
    [reminder, digest]
        .into_iter()
        .flatten()
        .map(|at| (at - now).to_std().unwrap_or(StdDuration::ZERO))
        .fold(TICK, StdDuration::min)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn sleep_is_capped_by_tick_and_deadlines() {
        let now = Utc.with_ymd_and_hms(2024, 1, 10, 9, 0, 0).unwrap();
        assert_eq!(sleep_for(None, None, now), TICK);
        assert_eq!(
            sleep_for(Some(now + Duration::milliseconds(200)), None, now),
            StdDuration::from_millis(200)
        );
        assert_eq!(
            sleep_for(Some(now - Duration::seconds(5)), Some(now + Duration::hours(1)), now),
            StdDuration::ZERO
        );
    }
}
