use std::io;
use std::path::PathBuf;
use std::time::{Duration, Instant};

use chrono::Utc;
use crossterm::event::{self, Event, KeyEventKind};
use crossterm::execute;
use crossterm::terminal::{
    EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode,
};
use ratatui::Terminal;
use ratatui::backend::CrosstermBackend;
use uuid::Uuid;

use crate::io::lock::FileLock;
use crate::io::store_io;
use crate::model::task::{FilterKind, Task};
use crate::model::user::Session;
use crate::ops::filter::filtered_view;
use crate::ops::stats::{Stats, compute_stats};
use crate::ops::task_ops::TaskStore;

use super::input;
use super::render;
use super::theme::Theme;

const NOTIFICATION_TTL: Duration = Duration::from_secs(3);

/// Current interaction mode
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    Navigate,
    /// Typing the text of a new task
    Insert,
}

/// Main application state
pub struct App {
    pub dir: PathBuf,
    pub store: TaskStore,
    pub filter: FilterKind,
    pub mode: Mode,
    pub cursor: usize,
    pub scroll_offset: usize,
    pub input: String,
    pub show_help: bool,
    pub should_quit: bool,
    pub theme: Theme,
    notification: Option<(String, Instant)>,
}

impl App {
    pub fn new(dir: PathBuf, store: TaskStore, theme: Theme) -> Self {
        App {
            dir,
            store,
            filter: FilterKind::All,
            mode: Mode::Navigate,
            cursor: 0,
            scroll_offset: 0,
            input: String::new(),
            show_help: false,
            should_quit: false,
            theme,
            notification: None,
        }
    }

    /// The ordered view for the current filter, recomputed per call.
    pub fn visible(&self) -> Vec<&Task> {
        filtered_view(self.store.tasks(), self.filter, Utc::now())
    }

    pub fn stats(&self) -> Stats {
        compute_stats(self.store.tasks(), Utc::now())
    }

    /// The id of the task under the cursor, if any.
    pub fn current_task_id(&self) -> Option<Uuid> {
        self.visible().get(self.cursor).map(|t| t.id)
    }

    pub fn set_filter(&mut self, filter: FilterKind) {
        if self.filter != filter {
            self.filter = filter;
            self.cursor = 0;
            self.scroll_offset = 0;
        }
    }

    /// Keep the cursor inside the (possibly shrunk) view.
    pub fn clamp_cursor(&mut self) {
        let len = self.visible().len();
        if len == 0 {
            self.cursor = 0;
        } else if self.cursor >= len {
            self.cursor = len - 1;
        }
    }

    /// Show a non-blocking notification for a few seconds.
    pub fn notify(&mut self, message: impl Into<String>) {
        self.notification = Some((message.into(), Instant::now()));
    }

    pub fn notification(&self) -> Option<&str> {
        self.notification.as_ref().map(|(m, _)| m.as_str())
    }

    fn expire_notification(&mut self) {
        if let Some((_, since)) = &self.notification
            && since.elapsed() >= NOTIFICATION_TTL
        {
            self.notification = None;
        }
    }

    /// Run a mutation under the store lock, then surface either the
    /// persist warning or the given confirmation.
    pub fn mutate(&mut self, message: &str, op: impl FnOnce(&mut TaskStore)) {
        let _lock = match FileLock::acquire_default(&self.dir) {
            Ok(lock) => lock,
            Err(e) => {
                self.notify(e.to_string());
                return;
            }
        };
        op(&mut self.store);
        match self.store.take_warning() {
            Some(warning) => self.notify(warning),
            None => self.notify(message),
        }
        self.clamp_cursor();
    }
}

/// Run the TUI application
pub fn run(data_dir: Option<&str>) -> Result<(), Box<dyn std::error::Error>> {
    let dir = store_io::resolve_data_dir(data_dir)?;
    let session: Session = crate::ops::auth::current_session(&dir)
        .ok_or("not logged in (try `tally login <username>` or `tally register`)")?;

    let config = store_io::read_config(&dir);
    let theme = Theme::from_config(&config.ui);
    let mut store = TaskStore::load(&dir, &session);
    let load_warning = store.take_warning();

    let mut app = App::new(dir, store, theme);
    if let Some(warning) = load_warning {
        app.notify(warning);
    }

    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;
    terminal.clear()?;

    // Install panic hook to restore terminal on panic
    let original_hook = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |panic_info| {
        let _ = disable_raw_mode();
        let _ = execute!(io::stdout(), LeaveAlternateScreen);
        original_hook(panic_info);
    }));

    // Run event loop
    let result = run_event_loop(&mut terminal, &mut app);

    // Restore terminal
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    result
}

fn run_event_loop(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    app: &mut App,
) -> Result<(), Box<dyn std::error::Error>> {
    loop {
        app.expire_notification();
        terminal.draw(|frame| render::render(frame, app))?;

        if event::poll(Duration::from_millis(250))?
            && let Event::Key(key) = event::read()?
            && key.kind == KeyEventKind::Press
        {
            input::handle_key(app, key);
        }

        if app.should_quit {
            break;
        }
    }
    Ok(())
}
