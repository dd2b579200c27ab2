//! Render functions for the TUI.
//!
//! The screen is a single view: search box, trending strip, result list,
//! pagination footer and status bar, top to bottom.

use crate::app::App;
use crate::util::{sanitize_line, truncate_to_width};
use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Frame,
};

use super::{pagination, results, status};

/// Minimum terminal dimensions required for normal operation.
pub(super) const MIN_WIDTH: u16 = 40;
pub(super) const MIN_HEIGHT: u16 = 12;

const SPINNER: [&str; super::loop_runner::SPINNER_FRAMES] =
    ["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"];

pub(super) fn spinner(app: &App) -> &'static str {
    SPINNER[app.spinner_frame % SPINNER.len()]
}

pub(super) fn render(f: &mut Frame, app: &mut App) {
    let area = f.area();

    if area.width < 1 || area.height < 1 {
        return;
    }

    if area.width < MIN_WIDTH || area.height < MIN_HEIGHT {
        let msg = if area.height < 3 || area.width < 20 {
            Paragraph::new("Too small")
        } else {
            Paragraph::new(format!(
                "Terminal too small\n\nMinimum: {}x{}\nCurrent: {}x{}",
                MIN_WIDTH, MIN_HEIGHT, area.width, area.height
            ))
            .alignment(Alignment::Center)
        };
        f.render_widget(msg, area);
        // Nothing on screen, so nothing can be in view.
        app.list_height = 0;
        return;
    }

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Length(3),
            Constraint::Min(3),
            Constraint::Length(1),
            Constraint::Length(1),
        ])
        .split(area);

    render_search(f, app, chunks[0]);
    render_trending(f, app, chunks[1]);
    results::render(f, app, chunks[2]);
    pagination::render(f, app, chunks[3]);
    status::render(f, app, chunks[4]);
}

fn render_search(f: &mut Frame, app: &App, area: Rect) {
    let block = Block::default().borders(Borders::ALL).title(" Search ");
    let inner_width = area.width.saturating_sub(2) as usize;

    let line = if app.search_input.is_empty() {
        Line::from(Span::styled(
            "Search through thousands of movies",
            Style::default().fg(Color::DarkGray),
        ))
    } else {
        let shown = truncate_to_width(&app.search_input, inner_width.saturating_sub(1));
        Line::from(vec![
            Span::raw(shown.into_owned()),
            Span::styled("▏", Style::default().fg(Color::Cyan)),
        ])
    };

    f.render_widget(Paragraph::new(line).block(block), area);
}

fn render_trending(f: &mut Frame, app: &App, area: Rect) {
    let block = Block::default()
        .borders(Borders::ALL)
        .title(" Trending This Week ");

    let line = if app.trending.loading {
        Line::from(format!("{} Loading...", spinner(app)))
    } else if let Some(err) = &app.trending.error {
        Line::from(Span::styled(err.as_str(), Style::default().fg(Color::Red)))
    } else {
        let mut spans = Vec::with_capacity(app.trending.items.len() * 2);
        for (i, movie) in app.trending.items.iter().enumerate() {
            spans.push(Span::styled(
                format!("{}. ", i + 1),
                Style::default()
                    .fg(Color::Yellow)
                    .add_modifier(Modifier::BOLD),
            ));
            spans.push(Span::raw(format!("{}   ", sanitize_line(&movie.title))));
        }
        Line::from(spans)
    };

    f.render_widget(Paragraph::new(line).block(block), area);
}
