use ratatui::layout::{Constraint, Direction, Layout};
use ratatui::Frame;

use crate::app::AppState;
use crate::tui::{footer, header, panel, prompt, table};

/// Full-frame layout: header, the one visible view, footer, plus the input
/// overlay when a prompt is open.
pub fn render(f: &mut Frame, state: &AppState) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(2),
            Constraint::Min(0),
            Constraint::Length(3),
        ])
        .split(f.area());

    header::render(f, chunks[0], state);

    match state.router.current_key().map(|k| k.app) {
        Some(app) if app == "Playback" => panel::render_player(f, chunks[1], state),
        Some(app) if app == "Home" => panel::render_stats(f, chunks[1], state),
        _ => table::render(f, chunks[1], state),
    }

    footer::render(f, chunks[2], state);
    prompt::render(f, state);
}
