use ratatui::layout::Rect;
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Paragraph};
use ratatui::Frame;

use crate::app::{AppState, PlayState};
use crate::i18n::t;
use crate::table::format_duration;

/// Current-song panel for the Playback view.
pub fn render_player(f: &mut Frame, area: Rect, state: &AppState) {
    let Some(playback) = &state.playback else {
        let para = Paragraph::new(t("loading"))
            .style(Style::default().fg(Color::DarkGray))
            .block(Block::default().borders(Borders::NONE));
        f.render_widget(para, area);
        return;
    };

    let state_icon = match playback.state {
        PlayState::Play => "▶",
        PlayState::Pause => "⏸",
        PlayState::Stop => "■",
    };

    let mut lines: Vec<Line> = Vec::new();
    match &playback.song {
        Some(song) => {
            lines.push(Line::from(vec![
                Span::styled(
                    format!(" {} ", state_icon),
                    Style::default().fg(Color::Green),
                ),
                Span::styled(
                    song.title.clone(),
                    Style::default().add_modifier(Modifier::BOLD),
                ),
            ]));
            if !song.artist.is_empty() {
                lines.push(Line::from(Span::raw(format!("   {}", song.artist))));
            }
            if !song.album.is_empty() {
                lines.push(Line::from(Span::styled(
                    format!("   {}", song.album),
                    Style::default().fg(Color::DarkGray),
                )));
            }
            lines.push(Line::raw(""));
            let mut progress = format!(
                "   {} / {}",
                format_duration(playback.elapsed),
                format_duration(song.duration)
            );
            if let Some(volume) = playback.volume {
                progress.push_str(&format!("   vol {}%", volume));
            }
            lines.push(Line::from(Span::styled(
                progress,
                Style::default().fg(Color::DarkGray),
            )));
        }
        None => {
            lines.push(Line::from(Span::styled(
                format!(" {} {}", state_icon, t("not-playing")),
                Style::default().fg(Color::DarkGray),
            )));
        }
    }

    let para = Paragraph::new(lines).block(Block::default().borders(Borders::NONE));
    f.render_widget(para, area);
}

/// Daemon statistics panel for the Home view.
pub fn render_stats(f: &mut Frame, area: Rect, state: &AppState) {
    let Some(stats) = &state.stats else {
        let para = Paragraph::new(t("loading"))
            .style(Style::default().fg(Color::DarkGray))
            .block(Block::default().borders(Borders::NONE));
        f.render_widget(para, area);
        return;
    };

    let rows = [
        ("Artists", stats.artists.to_string()),
        ("Albums", stats.albums.to_string()),
        ("Songs", stats.songs.to_string()),
        ("Play time", format_duration(stats.db_play_time)),
        ("Uptime", format_duration(stats.uptime)),
    ];

    let lines: Vec<Line> = rows
        .iter()
        .map(|(label, value)| {
            Line::from(vec![
                Span::styled(
                    format!(" {:<12}", label),
                    Style::default().fg(Color::DarkGray),
                ),
                Span::raw(value.clone()),
            ])
        })
        .collect();

    let para = Paragraph::new(lines).block(Block::default().borders(Borders::NONE));
    f.render_widget(para, area);
}
