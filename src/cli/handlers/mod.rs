mod watch;
pub use watch::cmd_watch;

use std::path::{Path, PathBuf};

use chrono::{DateTime, Duration, NaiveTime, Utc};

use crate::cli::commands::*;
use crate::cli::output::*;
use crate::io::config_io::read_config;
use crate::io::kv_store::{JsonFileStore, KeyValueStore};
use crate::io::ledger_io::LedgerFile;
use crate::io::lock::{LockError, StoreLock};
use crate::io::paths;
use crate::model::config::AppConfig;
use crate::model::todo::{NewTodo, Priority, TodoPatch};
use crate::model::tree::flatten_forest;
use crate::model::view::{
    DateRange, EvalInstant, FilterConfig, GroupLevel, GroupingConfig, StatusFilter, ViewState,
};
use crate::ops::describe::{overdue_message, overdue_todos};
use crate::ops::filter::filter_todos;
use crate::ops::sort::flat_order;
use crate::ops::store::{StoreError, StoreOptions, TodoStore};
use crate::ops::validate;
use crate::util::dates::{END_OF_DAY, parse_when};

type CmdResult = Result<(), Box<dyn std::error::Error>>;

/// Reminders given without a time of day fire at nine in the morning
const DEFAULT_REMINDER_TIME: NaiveTime = match NaiveTime::from_hms_opt(9, 0, 0) {
    Some(t) => t,
    None => panic!("09:00 is a valid time"),
};

// ---------------------------------------------------------------------------
// Dispatch
// ---------------------------------------------------------------------------

pub fn dispatch(cli: Cli) -> CmdResult {
    let ctx = Context::load(cli.data_dir.as_deref())?;
    let json = cli.json;

    match cli.command {
        // Read commands
        Commands::List(args) => cmd_list(&ctx, args, json),
        Commands::Show(args) => cmd_show(&ctx, args, json),
        Commands::Overdue => cmd_overdue(&ctx, json),
        Commands::Ledger(args) => cmd_ledger(&ctx, args, json),

        // Write commands
        Commands::Add(args) => cmd_add(&ctx, args, json),
        Commands::Done(args) => cmd_done(&ctx, args),
        Commands::Edit(args) => cmd_edit(&ctx, args),
        Commands::Set(args) => cmd_set(&ctx, args),
        Commands::Rm(args) => cmd_rm(&ctx, args),
        Commands::Remind(args) => cmd_remind(&ctx, args),

        Commands::Watch(args) => cmd_watch(&ctx, args),
    }
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Resolved data directory and its configuration
pub struct Context {
    pub data_dir: PathBuf,
    pub config: AppConfig,
}

impl Context {
    pub fn load(data_dir: Option<&str>) -> Result<Self, Box<dyn std::error::Error>> {
        let data_dir = paths::data_dir(data_dir.map(Path::new));
        let config = read_config(&data_dir)?;
        tracing::debug!(data_dir = %data_dir.display(), "context loaded");
        Ok(Context { data_dir, config })
    }

    pub fn state_path(&self) -> PathBuf {
        paths::state_path(&self.data_dir)
    }

    pub fn ledger(&self) -> Option<LedgerFile> {
        self.config
            .ledger
            .enabled
            .then(|| LedgerFile::new(paths::ledger_path(&self.config)))
    }

    pub fn snooze(&self) -> Duration {
        Duration::minutes(i64::from(self.config.reminders.snooze_minutes))
    }

    pub fn open_store(&self, now: DateTime<Utc>) -> Result<TodoStore<JsonFileStore>, StoreError> {
        self.open_store_with(None, now)
    }

    /// Reload for a long-running loop: reminders due after `last_poll` are
    /// armed even if they are already past, so the next poll delivers them.
    pub fn reopen_store(
        &self,
        last_poll: DateTime<Utc>,
        now: DateTime<Utc>,
    ) -> Result<TodoStore<JsonFileStore>, StoreError> {
        self.open_store_with(Some(last_poll), now)
    }

    fn open_store_with(
        &self,
        armed_since: Option<DateTime<Utc>>,
        now: DateTime<Utc>,
    ) -> Result<TodoStore<JsonFileStore>, StoreError> {
        let options = StoreOptions {
            seed_samples: self.config.store.seed_samples,
            snooze: self.snooze(),
            armed_since,
        };
        TodoStore::open(JsonFileStore::new(self.state_path()), self.ledger(), options, now)
    }

    pub fn eval_at(&self, now: DateTime<Utc>) -> EvalInstant {
        EvalInstant::at(now).with_week_start(self.config.view.week_start)
    }

    pub fn lock(&self) -> Result<StoreLock, LockError> {
        StoreLock::acquire_default(&self.data_dir)
    }

    /// Lock for a command that mostly reads. Opening may still write when
    /// sample seeding is on, so the lock is taken then too.
    pub fn read_lock(&self, writing: bool) -> Result<Option<StoreLock>, LockError> {
        if writing || self.config.store.seed_samples {
            self.lock().map(Some)
        } else {
            Ok(None)
        }
    }
}

/// Resolve a full id or a unique prefix of one
fn resolve_id<S: KeyValueStore>(store: &TodoStore<S>, given: &str) -> Result<String, String> {
    if let Some(todo) = store.get(given) {
        return Ok(todo.id.clone());
    }
    let matches: Vec<&str> = store
        .todos()
        .iter()
        .filter(|t| t.id.starts_with(given))
        .map(|t| t.id.as_str())
        .collect();
    match matches.as_slice() {
        [] => Err(format!("no todo matches id '{}'", given)),
        [id] => Ok(id.to_string()),
        many => Err(format!(
            "id '{}' is ambiguous ({} todos match)",
            given,
            many.len()
        )),
    }
}

fn parse_priority_arg(s: &str) -> Result<Priority, String> {
    Priority::parse_priority(s)
        .ok_or_else(|| format!("unknown priority '{}' (expected: low, medium, high)", s))
}

fn parse_due(s: &str, now: DateTime<Utc>) -> Result<DateTime<Utc>, Box<dyn std::error::Error>> {
    Ok(parse_when(s, END_OF_DAY, now)?)
}

fn parse_reminder(s: &str, now: DateTime<Utc>) -> Result<DateTime<Utc>, Box<dyn std::error::Error>> {
    let at = parse_when(s, DEFAULT_REMINDER_TIME, now)?;
    Ok(validate::reminder_time(at, now)?)
}

fn not_found(id: &str) -> Box<dyn std::error::Error> {
    format!("todo not found: {}", id).into()
}

/// Translate `list` flags into a filter
fn filter_from_args(args: &ListArgs) -> Result<FilterConfig, String> {
    let status = args
        .status
        .iter()
        .map(|s| {
            StatusFilter::parse_status(s).ok_or_else(|| {
                format!("unknown status '{}' (expected: completed, pending, overdue)", s)
            })
        })
        .collect::<Result<Vec<_>, _>>()?;
    let priority = args
        .priority
        .iter()
        .map(|s| parse_priority_arg(s))
        .collect::<Result<Vec<_>, _>>()?;
    let date_range = match &args.range {
        Some(r) => DateRange::parse_range(r).ok_or_else(|| {
            format!(
                "unknown range '{}' (expected: today, this-week, this-month, overdue, upcoming, all)",
                r
            )
        })?,
        None => DateRange::All,
    };
    Ok(FilterConfig {
        status,
        priority,
        projects: args.project.clone(),
        date_range,
        search_text: args.search.clone(),
    })
}

fn grouping_from_args(args: &ListArgs) -> Result<Option<GroupingConfig>, String> {
    let levels = args
        .group
        .iter()
        .map(|s| {
            GroupLevel::parse_level(s).ok_or_else(|| {
                format!("unknown group level '{}' (expected: status, priority, project, date)", s)
            })
        })
        .collect::<Result<Vec<_>, _>>()?;
    if levels.len() > 3 {
        return Err("at most three grouping levels are supported".to_string());
    }
    Ok(GroupingConfig::from_levels(&levels))
}

// ---------------------------------------------------------------------------
// Read command handlers
// ---------------------------------------------------------------------------

fn cmd_list(ctx: &Context, args: ListArgs, json: bool) -> CmdResult {
    let now = Utc::now();
    let at = ctx.eval_at(now);

    let _lock = ctx.read_lock(args.save)?;
    let mut store = ctx.open_store(now)?;
    let saved = if args.fresh {
        ViewState::default()
    } else {
        store.load_view()?
    };
    let filter = saved.filter.merge(filter_from_args(&args)?);
    let grouping = grouping_from_args(&args)?.unwrap_or(saved.grouping);

    if args.save {
        store.save_view(&ViewState {
            grouping,
            filter: filter.clone(),
        })?;
    }

    if args.flat {
        let ordered = flat_order(filter_todos(store.todos(), &filter, &at));
        if json {
            let out: Vec<_> = ordered.iter().map(|t| todo_to_json(t, &at)).collect();
            println!("{}", serde_json::to_string_pretty(&out)?);
        } else {
            for todo in ordered {
                println!("{}", format_todo_line(todo, now));
            }
        }
        return Ok(());
    }

    let forest = store.view(&filter, &grouping, &at);
    if json {
        println!("{}", serde_json::to_string_pretty(&forest)?);
    } else if forest.is_empty() {
        println!("no todos");
    } else {
        for line in format_tree(&flatten_forest(&forest), now) {
            println!("{}", line);
        }
    }
    Ok(())
}

fn cmd_show(ctx: &Context, args: IdArgs, json: bool) -> CmdResult {
    let now = Utc::now();
    let _lock = ctx.read_lock(false)?;
    let store = ctx.open_store(now)?;
    let id = resolve_id(&store, &args.id)?;
    let todo = store.get(&id).ok_or_else(|| not_found(&id))?;
    let at = ctx.eval_at(now);

    if json {
        println!("{}", serde_json::to_string_pretty(&todo_to_json(todo, &at))?);
    } else {
        for line in format_todo_detail(todo, &at) {
            println!("{}", line);
        }
    }
    Ok(())
}

fn cmd_overdue(ctx: &Context, json: bool) -> CmdResult {
    let now = Utc::now();
    let _lock = ctx.read_lock(false)?;
    let store = ctx.open_store(now)?;
    let overdue = overdue_todos(store.todos(), now);
    let message = overdue_message(&overdue);

    if json {
        let at = ctx.eval_at(now);
        let out = OverdueJson {
            message,
            todos: overdue.iter().map(|t| todo_to_json(t, &at)).collect(),
        };
        println!("{}", serde_json::to_string_pretty(&out)?);
        return Ok(());
    }

    match message {
        Some(message) => {
            println!("{}", message);
            for todo in overdue {
                println!("  {}", format_todo_line(todo, now));
            }
        }
        None => println!("nothing overdue"),
    }
    Ok(())
}

fn cmd_ledger(ctx: &Context, args: LedgerArgs, json: bool) -> CmdResult {
    let path = paths::ledger_path(&ctx.config);
    let content = if args.path {
        None
    } else {
        match std::fs::read_to_string(&path) {
            Ok(content) => Some(content),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Some(String::new()),
            Err(e) => return Err(format!("could not read {}: {}", path.display(), e).into()),
        }
    };

    if json {
        let out = LedgerJson {
            path: path.display().to_string(),
            content,
        };
        println!("{}", serde_json::to_string_pretty(&out)?);
    } else {
        match content {
            Some(content) => print!("{}", content),
            None => println!("{}", path.display()),
        }
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Write command handlers
// ---------------------------------------------------------------------------

fn cmd_add(ctx: &Context, args: AddArgs, json: bool) -> CmdResult {
    let now = Utc::now();
    let mut new = NewTodo::new(validate::todo_text(&args.text.join(" "))?);
    if let Some(ref p) = args.priority {
        new.priority = parse_priority_arg(p)?;
    }
    if let Some(ref due) = args.due {
        new.due_date = Some(parse_due(due, now)?);
    }
    if let Some(ref project) = args.project {
        new.project_name = Some(validate::project_name(project)?);
    }
    if let Some(ref when) = args.remind {
        new.reminder = Some(parse_reminder(when, now)?);
    }

    let _lock = ctx.lock()?;
    let mut store = ctx.open_store(now)?;
    let id = store.add(new, now)?;

    if json {
        println!("{}", serde_json::to_string(&AddedJson { id })?);
    } else {
        println!("{}", short_id(&id));
    }
    Ok(())
}

fn cmd_done(ctx: &Context, args: IdArgs) -> CmdResult {
    let now = Utc::now();
    let _lock = ctx.lock()?;
    let mut store = ctx.open_store(now)?;
    let id = resolve_id(&store, &args.id)?;
    if !store.toggle_complete(&id)? {
        return Err(not_found(&id));
    }
    if let Some(todo) = store.get(&id) {
        let state = if todo.completed { "completed" } else { "reopened" };
        println!("{} {}", state, short_id(&id));
    }
    Ok(())
}

fn cmd_edit(ctx: &Context, args: EditArgs) -> CmdResult {
    let now = Utc::now();
    let text = validate::todo_text(&args.text.join(" "))?;
    let _lock = ctx.lock()?;
    let mut store = ctx.open_store(now)?;
    let id = resolve_id(&store, &args.id)?;
    if !store.edit(&id, &text)? {
        return Err(not_found(&id));
    }
    Ok(())
}

fn cmd_set(ctx: &Context, args: SetArgs) -> CmdResult {
    let now = Utc::now();
    let mut patch = TodoPatch::default();
    if let Some(ref p) = args.priority {
        patch.priority = Some(parse_priority_arg(p)?);
    }
    if let Some(ref due) = args.due {
        patch.due_date = Some(Some(parse_due(due, now)?));
    } else if args.no_due {
        patch.due_date = Some(None);
    }
    if let Some(ref project) = args.project {
        patch.project_name = Some(Some(validate::project_name(project)?));
    } else if args.no_project {
        patch.project_name = Some(None);
    }
    if patch.is_empty() {
        return Err("nothing to change (use --priority, --due, --no-due, --project or --no-project)".into());
    }

    let _lock = ctx.lock()?;
    let mut store = ctx.open_store(now)?;
    let id = resolve_id(&store, &args.id)?;
    if !store.update(&id, &patch)? {
        return Err(not_found(&id));
    }
    Ok(())
}

fn cmd_rm(ctx: &Context, args: IdArgs) -> CmdResult {
    let now = Utc::now();
    let _lock = ctx.lock()?;
    let mut store = ctx.open_store(now)?;
    let id = resolve_id(&store, &args.id)?;
    if !store.delete(&id)? {
        return Err(not_found(&id));
    }
    println!("deleted {}", short_id(&id));
    Ok(())
}

fn cmd_remind(ctx: &Context, args: RemindArgs) -> CmdResult {
    let now = Utc::now();
    let at = parse_reminder(&args.when.join(" "), now)?;
    let _lock = ctx.lock()?;
    let mut store = ctx.open_store(now)?;
    let id = resolve_id(&store, &args.id)?;
    if !store.set_reminder(&id, at, now)? {
        return Err(not_found(&id));
    }
    println!(
        "reminder set for {}",
        crate::ops::describe::format_reminder_time(at, now)
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn context(dir: &TempDir, seed_samples: bool) -> Context {
        let mut config = AppConfig::default();
        config.store.seed_samples = seed_samples;
        Context {
            data_dir: dir.path().to_path_buf(),
            config,
        }
    }

    #[test]
    fn read_lock_taken_only_when_opening_may_write() {
        let dir = TempDir::new().unwrap();
        let plain = context(&dir, false);
        assert!(plain.read_lock(false).unwrap().is_none());
        assert!(plain.read_lock(true).unwrap().is_some());

        let seeding = context(&dir, true);
        assert!(seeding.read_lock(false).unwrap().is_some());
    }
}
