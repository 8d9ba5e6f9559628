use clap::{Args, Parser, Subcommand};

#[derive(Parser)]
#[command(name = "tally", about = concat!("[✓] tally v", env!("CARGO_PKG_VERSION"), " - your to-do list, one user at a time"), version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Output as JSON
    #[arg(long, global = true)]
    pub json: bool,

    /// Run against a different store directory
    #[arg(short = 'D', long = "data-dir", global = true)]
    pub data_dir: Option<String>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Create an account and log in
    Register(RegisterArgs),
    /// Log in as an existing user
    Login(LoginArgs),
    /// End the current session
    Logout,
    /// Show the logged-in user
    Whoami,
    /// Add a task
    Add(AddArgs),
    /// List tasks (ordered by priority, then due date)
    List(ListArgs),
    /// Toggle a task's completed state
    Done(NumberArg),
    /// Toggle a task's important flag
    Star(NumberArg),
    /// Delete a task
    Rm(NumberArg),
    /// Show task counts
    Stats,
}

// ---------------------------------------------------------------------------
// Account args
// ---------------------------------------------------------------------------

#[derive(Args)]
pub struct RegisterArgs {
    /// Username for the new account
    pub username: String,
    /// Password (minimum 6 characters)
    #[arg(long)]
    pub password: String,
    /// Password confirmation (defaults to --password)
    #[arg(long)]
    pub confirm: Option<String>,
    /// Email address
    #[arg(long, default_value = "")]
    pub email: String,
}

#[derive(Args)]
pub struct LoginArgs {
    /// Username
    pub username: String,
    /// Password
    #[arg(long)]
    pub password: String,
}

// ---------------------------------------------------------------------------
// Task args
// ---------------------------------------------------------------------------

#[derive(Args)]
pub struct AddArgs {
    /// Task text
    pub text: String,
    /// Due date: YYYY-MM-DD or RFC 3339 (default: tomorrow)
    #[arg(long)]
    pub due: Option<String>,
}

#[derive(Args)]
pub struct ListArgs {
    /// Filter: all, active, completed, important, due-today
    #[arg(long, default_value = "all")]
    pub filter: String,
}

#[derive(Args)]
pub struct NumberArg {
    /// Task number as shown by `list`
    pub number: u64,
}
