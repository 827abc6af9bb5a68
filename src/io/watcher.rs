use std::path::{Path, PathBuf};
use std::sync::mpsc;

use notify::{Config, Event, EventKind, RecommendedWatcher, RecursiveMode, Watcher};

/// Notification that the state file was rewritten by another process
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StateChanged;

/// Watches the data directory for external writes to the state file.
pub struct StateWatcher {
    _watcher: RecommendedWatcher,
    rx: mpsc::Receiver<StateChanged>,
}

impl StateWatcher {
    /// Watch `state_file`. The parent directory is watched because atomic
    /// writes replace the file rather than modifying it.
    pub fn start(state_file: &Path) -> Result<Self, notify::Error> {
        let (tx, rx) = mpsc::channel();
        let target: PathBuf = state_file.to_path_buf();
        let file_name = state_file.file_name().map(|n| n.to_os_string());
        let dir = match state_file.parent() {
            Some(dir) if !dir.as_os_str().is_empty() => dir.to_path_buf(),
            _ => PathBuf::from("."),
        };

        let mut watcher = RecommendedWatcher::new(
            move |result: Result<Event, notify::Error>| {
                let Ok(event) = result else {
                    return;
                };
                match event.kind {
                    EventKind::Create(_) | EventKind::Modify(_) | EventKind::Remove(_) => {}
                    _ => return,
                }
                let relevant = event
                    .paths
                    .iter()
                    .any(|p| p == &target || p.file_name().map(|n| n.to_os_string()) == file_name);
                if relevant {
                    let _ = tx.send(StateChanged);
                }
            },
            Config::default(),
        )?;

        watcher.watch(&dir, RecursiveMode::NonRecursive)?;
        Ok(StateWatcher {
            _watcher: watcher,
            rx,
        })
    }

    /// Drain queued notifications. Returns true when at least one arrived.
    pub fn poll(&self) -> bool {
        let mut changed = false;
        while self.rx.try_recv().is_ok() {
            changed = true;
        }
        changed
    }
}
