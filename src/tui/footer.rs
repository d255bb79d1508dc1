use ratatui::layout::Rect;
use ratatui::style::{Color, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Paragraph};
use ratatui::Frame;

use crate::app::{AppState, NARROW_WIDTH_THRESHOLD};

pub fn render(f: &mut Frame, area: Rect, state: &AppState) {
    let narrow = area.width < NARROW_WIDTH_THRESHOLD;

    // First line: transient error, or caption plus pagination of the
    // visible table.
    let info = if let Some(err) = state.error_message() {
        Line::from(vec![
            Span::styled("✗ ", Style::default().fg(Color::Red)),
            Span::styled(err.to_string(), Style::default().fg(Color::Red)),
        ])
    } else if let Some(set) = state.current_table() {
        let mut spans = vec![Span::styled(
            set.caption.clone(),
            Style::default().fg(Color::DarkGray),
        )];
        let pages = set.pagination.page_count(state.settings.page_size);
        if pages > 1 {
            spans.push(Span::styled(
                format!("  page {}/{}", set.pagination.page + 1, pages),
                Style::default().fg(Color::Cyan),
            ));
        }
        Line::from(spans)
    } else {
        Line::raw("")
    };

    let hints: &[(&str, &str)] = if state.prompt.is_some() {
        &[("Enter", "go"), ("Esc", "cancel")]
    } else if narrow {
        &[
            ("j/k", "nav"),
            ("h/l", "page"),
            ("Tab", "tab"),
            ("Enter", "act"),
            ("q", "quit"),
        ]
    } else {
        &[
            ("↑↓/jk", "navigate"),
            ("←→/hl", "page"),
            ("Tab", "tabs"),
            ("1-5", "apps"),
            ("Enter", "activate"),
            ("Space", "play/pause"),
            ("g", "goto"),
            ("/", "search"),
            ("q", "quit"),
        ]
    };

    let mut hint_spans: Vec<Span> = Vec::new();
    for (i, (keys, desc)) in hints.iter().enumerate() {
        if i > 0 {
            hint_spans.push(Span::raw(" "));
        }
        hint_spans.push(Span::styled(*keys, Style::default().fg(Color::Cyan)));
        hint_spans.push(Span::styled(
            format!(" {}", desc),
            Style::default().fg(Color::DarkGray),
        ));
    }

    let footer = Paragraph::new(vec![info, Line::from(hint_spans)]).block(
        Block::default()
            .borders(Borders::TOP)
            .border_style(Style::default().fg(Color::DarkGray)),
    );
    f.render_widget(footer, area);
}
