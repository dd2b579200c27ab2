use crate::app::App;
use crate::feed::{PageNav, PageToken};
use ratatui::{
    layout::{Alignment, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::Paragraph,
    Frame,
};

/// Render the page footer: `«  1 … 4 5 6 … 10  »`.
///
/// Nothing is drawn while there is at most one page.
pub fn render(f: &mut Frame, app: &App, area: Rect) {
    if area.width < 1 || area.height < 1 {
        return;
    }

    let state = app.feed.state();
    let Some(nav) = PageNav::new(state.page, state.total_pages) else {
        return;
    };

    f.render_widget(
        Paragraph::new(nav_line(&nav)).alignment(Alignment::Center),
        area,
    );
}

fn nav_line(nav: &PageNav) -> Line<'static> {
    let dim = Style::default().fg(Color::DarkGray);
    let arrow = |enabled: bool| if enabled { Style::default() } else { dim };

    let mut spans = Vec::with_capacity(nav.tokens.len() * 2 + 4);
    spans.push(Span::styled("«", arrow(nav.can_prev)));
    spans.push(Span::raw("  "));

    for (i, token) in nav.tokens.iter().enumerate() {
        if i > 0 {
            spans.push(Span::raw(" "));
        }
        let style = match token {
            PageToken::Page(n) if *n == nav.current => Style::default()
                .fg(Color::Black)
                .bg(Color::Cyan)
                .add_modifier(Modifier::BOLD),
            PageToken::Page(_) => Style::default(),
            PageToken::Ellipsis => dim,
        };
        spans.push(Span::styled(token.to_string(), style));
    }

    spans.push(Span::raw("  "));
    spans.push(Span::styled("»", arrow(nav.can_next)));
    Line::from(spans)
}
