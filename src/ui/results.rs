use crate::app::App;
use crate::catalog::Movie;
use crate::util::{display_width, sanitize_line, truncate_to_width};
use ratatui::{
    layout::{Alignment, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Frame,
};

use super::render::spinner;

/// Render the result list, including the trailing sentinel / end-of-feed row.
///
/// Records the viewport (`list_offset`, `list_height`) on `app` for the
/// scroll trigger.
pub fn render(f: &mut Frame, app: &mut App, area: Rect) {
    if area.width < 1 || area.height < 1 {
        app.list_height = 0;
        return;
    }

    let title = if app.feed.state().query.trim().is_empty() {
        " Popular Movies ".to_string()
    } else {
        format!(
            " Results for \"{}\" ",
            truncate_to_width(&sanitize_line(&app.feed.state().query), 30)
        )
    };
    let block = Block::default().borders(Borders::ALL).title(title);
    let inner = block.inner(area);
    f.render_widget(block, area);

    let height = inner.height as usize;
    let width = inner.width as usize;

    let state = app.feed.state();
    if state.loading {
        let msg = Paragraph::new(format!("{} Loading...", spinner(app)))
            .alignment(Alignment::Center);
        f.render_widget(msg, inner);
        app.list_height = 0;
        return;
    }
    if let Some(err) = state.error.as_ref().filter(|_| state.items.is_empty()) {
        let msg = Paragraph::new(vec![
            Line::from(Span::styled(err.to_string(), Style::default().fg(Color::Red))),
            Line::from(Span::styled(
                "Ctrl+R to retry",
                Style::default().fg(Color::DarkGray),
            )),
        ])
        .alignment(Alignment::Center);
        f.render_widget(msg, inner);
        app.list_height = 0;
        return;
    }

    app.scroll_into_view(height);

    let state = app.feed.state();
    let mut lines = Vec::with_capacity(height);
    for row in app.list_offset..app.list_offset + height {
        if let Some(movie) = state.items.get(row) {
            lines.push(movie_line(movie, row == app.selected, width));
        } else if row == state.items.len() {
            lines.push(trailer_line(app));
        } else {
            break;
        }
    }

    f.render_widget(Paragraph::new(lines), inner);
}

fn movie_line(movie: &Movie, selected: bool, width: usize) -> Line<'static> {
    let year = movie.year().map(|y| format!(" ({y})")).unwrap_or_default();
    let rating = movie
        .vote_average
        .filter(|v| *v > 0.0)
        .map(|v| format!("★ {v:.1}"))
        .unwrap_or_else(|| "★ N/A".to_string());
    let lang = movie
        .original_language
        .as_deref()
        .map(|l| format!(" · {}", l.to_ascii_uppercase()))
        .unwrap_or_default();

    let suffix = format!("{year}{lang}  {rating}");
    let title_width = width.saturating_sub(display_width(&suffix) + 2);
    let title = sanitize_line(&movie.title);
    let title = truncate_to_width(&title, title_width).into_owned();

    let (marker, style) = if selected {
        (
            "▶ ",
            Style::default()
                .fg(Color::Black)
                .bg(Color::Cyan)
                .add_modifier(Modifier::BOLD),
        )
    } else {
        ("  ", Style::default())
    };

    Line::from(vec![
        Span::styled(marker, style),
        Span::styled(title, style),
        Span::styled(suffix, Style::default().fg(Color::DarkGray)),
    ])
}

/// The row after the last result: loader, sentinel, failure or end notice.
fn trailer_line(app: &App) -> Line<'static> {
    let state = app.feed.state();
    let dim = Style::default().fg(Color::DarkGray);

    if state.loading_more {
        Line::from(Span::styled(format!("  {} Loading more...", spinner(app)), dim))
    } else if let Some(err) = &state.error {
        Line::from(Span::styled(
            format!("  {err} (Ctrl+R to retry)"),
            Style::default().fg(Color::Red),
        ))
    } else if state.has_more {
        Line::from(Span::styled("  ···", dim))
    } else {
        Line::from(Span::styled("  No more movies to load", dim))
    }
}
