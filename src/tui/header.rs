use ratatui::layout::Rect;
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Paragraph};
use ratatui::Frame;

use crate::app::AppState;

const SPINNER_FRAMES: &[char] = &['⠋', '⠙', '⠹', '⠸', '⠼', '⠴', '⠦', '⠧', '⠇', '⠏'];

pub fn spinner_frame(idx: usize) -> char {
    SPINNER_FRAMES[idx % SPINNER_FRAMES.len()]
}

pub fn render(f: &mut Frame, area: Rect, state: &AppState) {
    let mut spans = vec![
        Span::styled(
            format!(" mpdw v{} ", env!("CARGO_PKG_VERSION")),
            Style::default()
                .fg(Color::Cyan)
                .add_modifier(Modifier::BOLD),
        ),
        Span::raw("│ "),
        Span::styled(
            &state.settings.address,
            Style::default().fg(Color::White),
        ),
    ];

    if let Some(key) = state.router.current_key() {
        spans.push(Span::raw(" │ "));
        spans.push(Span::styled(
            key.breadcrumb(),
            Style::default()
                .fg(Color::White)
                .add_modifier(Modifier::BOLD),
        ));
    }

    if !state.connected {
        spans.push(Span::raw(" "));
        spans.push(Span::styled(
            "[offline]",
            Style::default().fg(Color::Red).add_modifier(Modifier::BOLD),
        ));
    }

    if state.is_loading() {
        spans.push(Span::raw(" "));
        spans.push(Span::styled(
            spinner_frame(state.spinner_frame).to_string(),
            Style::default().fg(Color::Yellow),
        ));
    }

    if state.error_message().is_some() {
        spans.push(Span::raw(" "));
        spans.push(Span::styled(
            "!",
            Style::default().fg(Color::Red).add_modifier(Modifier::BOLD),
        ));
    }

    let header = Paragraph::new(Line::from(spans)).block(
        Block::default()
            .borders(Borders::BOTTOM)
            .border_style(Style::default().fg(Color::DarkGray)),
    );
    f.render_widget(header, area);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::SPINNER_FRAME_COUNT;

    #[test]
    fn frame_count_matches_app_constant() {
        assert_eq!(SPINNER_FRAMES.len(), SPINNER_FRAME_COUNT);
    }

    #[test]
    fn spinner_wraps_without_panicking() {
        assert_eq!(spinner_frame(0), spinner_frame(SPINNER_FRAMES.len()));
        let _ = spinner_frame(usize::MAX);
    }
}
