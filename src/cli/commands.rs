use clap::{Args, Parser, Subcommand};

#[derive(Parser)]
#[command(name = "tl", about = concat!("tasklog v", env!("CARGO_PKG_VERSION"), " - todos, reminders and a plain-text ledger"), version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Output as JSON
    #[arg(long, global = true)]
    pub json: bool,

    /// Use a different data directory
    #[arg(short = 'C', long = "data-dir", global = true)]
    pub data_dir: Option<String>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Add a todo
    Add(AddArgs),
    /// List todos, grouped or flat
    List(ListArgs),
    /// Show todo details
    Show(IdArgs),
    /// Toggle a todo between open and completed
    Done(IdArgs),
    /// Change a todo's text
    Edit(EditArgs),
    /// Change priority, due date or project
    Set(SetArgs),
    /// Delete a todo
    Rm(IdArgs),
    /// Set a reminder
    Remind(RemindArgs),
    /// List overdue todos
    Overdue,
    /// Run in the foreground, delivering reminders as they come due
    Watch(WatchArgs),
    /// Print the task ledger
    Ledger(LedgerArgs),
}

#[derive(Args)]
pub struct AddArgs {
    /// Todo text
    #[arg(required = true, num_args = 1..)]
    pub text: Vec<String>,
    /// Priority (low, medium, high)
    #[arg(short, long)]
    pub priority: Option<String>,
    /// Due date: "today", "friday 5pm", "in 3 days", "2024-02-01"
    #[arg(short, long)]
    pub due: Option<String>,
    /// Project name
    #[arg(short = 'P', long)]
    pub project: Option<String>,
    /// Reminder time: "in 30 minutes", "tomorrow 9am"
    #[arg(short, long)]
    pub remind: Option<String>,
}

#[derive(Args)]
pub struct ListArgs {
    /// Filter by status (completed, pending, overdue); comma-separated
    #[arg(long, value_delimiter = ',')]
    pub status: Vec<String>,
    /// Filter by priority (low, medium, high); comma-separated
    #[arg(short, long, value_delimiter = ',')]
    pub priority: Vec<String>,
    /// Filter by project ("No Project" for none); repeatable
    #[arg(short = 'P', long)]
    pub project: Vec<String>,
    /// Date window (today, this-week, this-month, overdue, upcoming, all)
    #[arg(long)]
    pub range: Option<String>,
    /// Case-insensitive text search over text and project
    #[arg(short, long)]
    pub search: Option<String>,
    /// Grouping levels, outermost first (status, priority, project, date)
    #[arg(short, long, value_delimiter = ',', num_args = 1..=3)]
    pub group: Vec<String>,
    /// Ungrouped listing: open todos first, then completed newest first
    #[arg(long, conflicts_with = "group")]
    pub flat: bool,
    /// Remember these filter and grouping settings as the default view
    #[arg(long)]
    pub save: bool,
    /// Ignore the saved view
    #[arg(long)]
    pub fresh: bool,
}

#[derive(Args)]
pub struct IdArgs {
    /// Todo id (a unique prefix is enough)
    pub id: String,
}

#[derive(Args)]
pub struct EditArgs {
    /// Todo id (a unique prefix is enough)
    pub id: String,
    /// New text
    #[arg(required = true, num_args = 1..)]
    pub text: Vec<String>,
}

#[derive(Args)]
pub struct SetArgs {
    /// Todo id (a unique prefix is enough)
    pub id: String,
    /// New priority
    #[arg(short, long)]
    pub priority: Option<String>,
    /// New due date
    #[arg(short, long, conflicts_with = "no_due")]
    pub due: Option<String>,
    /// Clear the due date
    #[arg(long)]
    pub no_due: bool,
    /// New project
    #[arg(short = 'P', long, conflicts_with = "no_project")]
    pub project: Option<String>,
    /// Clear the project
    #[arg(long)]
    pub no_project: bool,
}

#[derive(Args)]
pub struct RemindArgs {
    /// Todo id (a unique prefix is enough)
    pub id: String,
    /// When: "in 30 minutes", "tomorrow 9am", "2024-02-01 14:30"
    #[arg(required = true, num_args = 1..)]
    pub when: Vec<String>,
}

#[derive(Args)]
pub struct WatchArgs {
    /// Ask what to do when a reminder fires (complete, snooze, dismiss)
    #[arg(short, long)]
    pub interactive: bool,
    /// Deliver reminders that are already due, then exit
    #[arg(long)]
    pub once: bool,
}

#[derive(Args)]
pub struct LedgerArgs {
    /// Print the ledger location instead of its contents
    #[arg(long)]
    pub path: bool,
}
