use crossterm::event::{KeyCode, KeyEvent};

use crate::model::task::FilterKind;

use super::app::{App, Mode};

/// Handle a key event in the current mode
pub fn handle_key(app: &mut App, key: KeyEvent) {
    // Ignore bare modifier key presses (Shift, Ctrl, Alt, etc.)
    if matches!(key.code, KeyCode::Modifier(_)) {
        return;
    }

    // Help overlay swallows all input
    if app.show_help {
        app.show_help = false;
        return;
    }

    match app.mode {
        Mode::Navigate => handle_navigate(app, key),
        Mode::Insert => handle_insert(app, key),
    }
}

fn handle_navigate(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Char('q') | KeyCode::Esc => app.should_quit = true,
        KeyCode::Char('?') => app.show_help = true,

        // Cursor movement
        KeyCode::Char('j') | KeyCode::Down => move_cursor(app, 1),
        KeyCode::Char('k') | KeyCode::Up => move_cursor(app, -1),
        KeyCode::Char('g') | KeyCode::Home => app.cursor = 0,
        KeyCode::Char('G') | KeyCode::End => {
            app.cursor = app.visible().len().saturating_sub(1);
        }

        // Filter tabs
        KeyCode::Tab => cycle_filter(app, 1),
        KeyCode::BackTab => cycle_filter(app, -1),
        KeyCode::Char(c @ '1'..='5') => {
            let idx = (c as usize) - ('1' as usize);
            app.set_filter(FilterKind::ALL[idx]);
        }

        // Task intents
        KeyCode::Char(' ') | KeyCode::Char('x') | KeyCode::Enter => toggle_completed(app),
        KeyCode::Char('s') | KeyCode::Char('*') => toggle_important(app),
        KeyCode::Char('d') | KeyCode::Delete => delete_current(app),
        KeyCode::Char('a') | KeyCode::Char('i') => {
            app.mode = Mode::Insert;
            app.input.clear();
        }

        _ => {}
    }
}

fn handle_insert(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Esc => {
            app.mode = Mode::Navigate;
            app.input.clear();
        }
        KeyCode::Enter => submit_new_task(app),
        KeyCode::Backspace => {
            app.input.pop();
        }
        KeyCode::Char(c) => app.input.push(c),
        _ => {}
    }
}

fn move_cursor(app: &mut App, delta: isize) {
    let len = app.visible().len();
    if len == 0 {
        return;
    }
    let cursor = app.cursor as isize + delta;
    app.cursor = cursor.clamp(0, len as isize - 1) as usize;
}

fn cycle_filter(app: &mut App, delta: isize) {
    let all = FilterKind::ALL;
    let idx = all
        .iter()
        .position(|f| *f == app.filter)
        .unwrap_or(0) as isize;
    let next = (idx + delta).rem_euclid(all.len() as isize) as usize;
    app.set_filter(all[next]);
}

fn toggle_completed(app: &mut App) {
    let Some(id) = app.current_task_id() else {
        return;
    };
    app.mutate("toggled", |store| {
        store.toggle_completed(id);
    });
}

fn toggle_important(app: &mut App) {
    let Some(id) = app.current_task_id() else {
        return;
    };
    app.mutate("toggled ★", |store| {
        store.toggle_important(id);
    });
}

fn delete_current(app: &mut App) {
    let Some(id) = app.current_task_id() else {
        return;
    };
    app.mutate("task deleted", |store| {
        store.remove(id);
    });
}

fn submit_new_task(app: &mut App) {
    let text = app.input.trim().to_string();
    if text.is_empty() {
        app.notify("task text cannot be empty");
        return;
    }
    // Default due date (tomorrow) applies; the CLI takes explicit dates
    app.mutate("task added", |store| {
        let _ = store.add(&text, None);
    });
    app.input.clear();
    app.mode = Mode::Navigate;
}
