//! Keyboard input handling.
//!
//! Printable keys always edit the search box; navigation lives on the
//! arrow/page keys so typing never collides with a shortcut.

use crate::app::App;
use crossterm::event::{KeyCode, KeyModifiers};

use super::loop_runner::Action;

pub(super) fn handle_input(app: &mut App, code: KeyCode, modifiers: KeyModifiers) -> Action {
    if modifiers.contains(KeyModifiers::CONTROL) {
        return handle_control(app, code);
    }

    let page = app.list_height.max(1);

    match code {
        KeyCode::Esc => {
            if app.search_input.is_empty() {
                return Action::Quit;
            }
            app.clear_input();
        }
        KeyCode::Enter => app.submit_input(),
        KeyCode::Backspace => app.pop_char(),
        KeyCode::Char(c) => app.push_char(c),
        KeyCode::Down => app.select_next(1),
        KeyCode::Up => app.select_prev(1),
        KeyCode::PageDown => app.select_next(page),
        KeyCode::PageUp => app.select_prev(page),
        KeyCode::Home => app.select_first(),
        KeyCode::End => app.select_last(),
        _ => {}
    }

    Action::Continue
}

fn handle_control(app: &mut App, code: KeyCode) -> Action {
    match code {
        KeyCode::Char('c') | KeyCode::Char('q') => return Action::Quit,
        KeyCode::Char('u') => app.clear_input(),
        KeyCode::Char('n') => app.select_next(1),
        KeyCode::Char('p') => app.select_prev(1),
        KeyCode::Char('r') => app.retry(),
        _ => {}
    }
    Action::Continue
}
