use ratatui::layout::Rect;
use ratatui::style::{Color, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Clear, Paragraph};
use ratatui::Frame;

use crate::app::{AppState, PromptKind};

/// Centered single-line input overlay for goto locations and search terms.
pub fn render(f: &mut Frame, state: &AppState) {
    let Some(prompt) = &state.prompt else {
        return;
    };

    let screen = f.area();
    if screen.width < 10 || screen.height < 5 {
        return;
    }
    let width = screen.width.saturating_sub(4).min(64);
    let area = Rect {
        x: screen.x + (screen.width.saturating_sub(width)) / 2,
        y: screen.y + screen.height / 3,
        width,
        height: 3,
    };

    let title = match prompt.kind {
        PromptKind::Goto => " Go to location ",
        PromptKind::Search => " Search ",
    };

    let line = Line::from(vec![
        Span::raw(prompt.buffer.clone()),
        Span::styled("█", Style::default().fg(Color::Cyan)),
    ]);

    f.render_widget(Clear, area);
    let para = Paragraph::new(line).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::Cyan))
            .title(title),
    );
    f.render_widget(para, area);
}
