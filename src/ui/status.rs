use crate::app::App;
use ratatui::{
    layout::Rect,
    style::{Color, Style},
    widgets::Paragraph,
    Frame,
};
use std::borrow::Cow;

const HINTS: &str = "Type to search | ENTER now | ↑↓ PgUp/PgDn move | ^R retry | ESC clear/quit";

/// Render the status bar
pub fn render(f: &mut Frame, app: &App, area: Rect) {
    if area.width < 1 || area.height < 1 {
        return;
    }

    let text: Cow<'_, str> = if let Some((msg, _)) = &app.status_message {
        Cow::Borrowed(&**msg)
    } else {
        let count = app.feed.state().items.len();
        if count == 0 {
            Cow::Borrowed(HINTS)
        } else {
            Cow::Owned(format!("{} / {count} | {HINTS}", app.selected + 1))
        }
    };

    let style = Style::default().bg(Color::DarkGray).fg(Color::White);
    f.render_widget(Paragraph::new(text).style(style), area);
}
