use std::path::{Path, PathBuf};

use chrono::Utc;

use crate::cli::commands::*;
use crate::cli::output::*;
use crate::io::lock::FileLock;
use crate::io::store_io;
use crate::model::task::FilterKind;
use crate::ops::{auth, filter, stats, task_ops};

// ---------------------------------------------------------------------------
// Dispatch
// ---------------------------------------------------------------------------

pub fn dispatch(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    let json = cli.json;
    let dir = store_io::resolve_data_dir(cli.data_dir.as_deref())?;

    match cli.command {
        None => {
            // Handled in main.rs (launches the TUI)
            Ok(())
        }
        Some(cmd) => match cmd {
            // Account commands
            Commands::Register(args) => cmd_register(args, &dir, json),
            Commands::Login(args) => cmd_login(args, &dir, json),
            Commands::Logout => cmd_logout(&dir),
            Commands::Whoami => cmd_whoami(&dir, json),

            // Read commands
            Commands::List(args) => cmd_list(args, &dir, json),
            Commands::Stats => cmd_stats(&dir, json),

            // Write commands
            Commands::Add(args) => cmd_add(args, &dir, json),
            Commands::Done(args) => cmd_done(args, &dir),
            Commands::Star(args) => cmd_star(args, &dir),
            Commands::Rm(args) => cmd_rm(args, &dir),
        },
    }
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// The active session, or a friendly error if nobody is logged in.
fn require_session(dir: &Path) -> Result<crate::model::user::Session, Box<dyn std::error::Error>> {
    auth::current_session(dir)
        .ok_or_else(|| "not logged in (try `tally login <username>` or `tally register`)".into())
}

/// Load the task store for the active session and surface any load
/// warning (e.g. a corrupt store file) on stderr.
fn load_store(dir: &PathBuf) -> Result<task_ops::TaskStore, Box<dyn std::error::Error>> {
    let session = require_session(dir)?;
    let mut store = task_ops::TaskStore::load(dir, &session);
    if let Some(warning) = store.take_warning() {
        eprintln!("warning: {}", warning);
    }
    Ok(store)
}

/// Print a persist warning after a mutation, if one was recorded.
fn report_warning(store: &mut task_ops::TaskStore) {
    if let Some(warning) = store.take_warning() {
        eprintln!("warning: {}", warning);
    }
}

// ---------------------------------------------------------------------------
// Account command handlers
// ---------------------------------------------------------------------------

fn cmd_register(
    args: RegisterArgs,
    dir: &Path,
    json: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    let _lock = FileLock::acquire_default(dir)?;
    let confirm = args.confirm.as_deref().unwrap_or(&args.password);
    let session = auth::register(dir, &args.username, &args.email, &args.password, confirm)?;

    if json {
        println!("{}", serde_json::to_string_pretty(&session_to_json(&session))?);
    } else {
        println!("account created; logged in as {}", session.username);
    }
    Ok(())
}

fn cmd_login(args: LoginArgs, dir: &Path, json: bool) -> Result<(), Box<dyn std::error::Error>> {
    let session = auth::login(dir, &args.username, &args.password)?;

    if json {
        println!("{}", serde_json::to_string_pretty(&session_to_json(&session))?);
    } else {
        println!("welcome back, {}!", session.username);
    }
    Ok(())
}

fn cmd_logout(dir: &Path) -> Result<(), Box<dyn std::error::Error>> {
    auth::logout(dir)?;
    println!("logged out");
    Ok(())
}

fn cmd_whoami(dir: &Path, json: bool) -> Result<(), Box<dyn std::error::Error>> {
    let session = require_session(dir)?;
    if json {
        println!("{}", serde_json::to_string_pretty(&session_to_json(&session))?);
    } else if session.email.is_empty() {
        println!("{}", session.username);
    } else {
        println!("{} <{}>", session.username, session.email);
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Read command handlers
// ---------------------------------------------------------------------------

fn cmd_list(args: ListArgs, dir: &PathBuf, json: bool) -> Result<(), Box<dyn std::error::Error>> {
    let kind = FilterKind::parse(&args.filter)?;
    let store = load_store(dir)?;
    let now = Utc::now();
    let view = filter::filtered_view(store.tasks(), kind, now);

    if json {
        let listing = TaskListJson {
            user: store.username().to_string(),
            filter: kind.as_str().to_string(),
            tasks: view.iter().map(|t| task_to_json(t)).collect(),
        };
        println!("{}", serde_json::to_string_pretty(&listing)?);
    } else {
        println!("== {}'s tasks ({}) ==", store.username(), kind.as_str());
        if view.is_empty() {
            println!("(no tasks to show)");
        }
        for task in view {
            println!("{}", format_task_line(task));
        }
    }
    Ok(())
}

fn cmd_stats(dir: &PathBuf, json: bool) -> Result<(), Box<dyn std::error::Error>> {
    let store = load_store(dir)?;
    let counts = stats::compute_stats(store.tasks(), Utc::now());

    if json {
        println!("{}", serde_json::to_string_pretty(&counts)?);
    } else {
        for line in format_stats(&counts) {
            println!("{}", line);
        }
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Write command handlers
// ---------------------------------------------------------------------------

fn cmd_add(args: AddArgs, dir: &PathBuf, json: bool) -> Result<(), Box<dyn std::error::Error>> {
    let _lock = FileLock::acquire_default(dir)?;
    let mut store = load_store(dir)?;

    let due = args
        .due
        .as_deref()
        .map(task_ops::parse_due_date)
        .transpose()?;
    let task = store.add(&args.text, due)?;
    report_warning(&mut store);

    if json {
        println!("{}", serde_json::to_string_pretty(&task_to_json(&task))?);
    } else {
        println!("added #{} ({})", task.display_number, task.priority.label());
    }
    Ok(())
}

fn cmd_done(args: NumberArg, dir: &PathBuf) -> Result<(), Box<dyn std::error::Error>> {
    let _lock = FileLock::acquire_default(dir)?;
    let mut store = load_store(dir)?;

    match store.find_by_number(args.number).map(|t| t.id) {
        Some(id) => {
            store.toggle_completed(id);
            report_warning(&mut store);
            let task = store.tasks().iter().find(|t| t.id == id);
            let state = match task {
                Some(t) if t.completed => "done",
                _ => "active",
            };
            println!("#{} is now {}", args.number, state);
        }
        // Unknown numbers are a soft no-op, not a failure
        None => eprintln!("no task #{}", args.number),
    }
    Ok(())
}

fn cmd_star(args: NumberArg, dir: &PathBuf) -> Result<(), Box<dyn std::error::Error>> {
    let _lock = FileLock::acquire_default(dir)?;
    let mut store = load_store(dir)?;

    match store.find_by_number(args.number).map(|t| t.id) {
        Some(id) => {
            store.toggle_important(id);
            report_warning(&mut store);
            let starred = store
                .tasks()
                .iter()
                .any(|t| t.id == id && t.important);
            let state = if starred { "starred" } else { "unstarred" };
            println!("#{} {}", args.number, state);
        }
        None => eprintln!("no task #{}", args.number),
    }
    Ok(())
}

fn cmd_rm(args: NumberArg, dir: &PathBuf) -> Result<(), Box<dyn std::error::Error>> {
    let _lock = FileLock::acquire_default(dir)?;
    let mut store = load_store(dir)?;

    match store.find_by_number(args.number).map(|t| t.id) {
        Some(id) => {
            store.remove(id);
            report_warning(&mut store);
            println!("deleted #{}", args.number);
        }
        None => eprintln!("no task #{}", args.number),
    }
    Ok(())
}
