use ratatui::layout::Rect;
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Paragraph};
use ratatui::Frame;
use unicode_width::{UnicodeWidthChar, UnicodeWidthStr};

use crate::app::{AppState, Column, Item};
use crate::i18n::t;
use crate::table::{Row, RowSet};

pub fn render(f: &mut Frame, area: Rect, state: &AppState) {
    let Some(key) = state.router.current_key() else {
        return;
    };
    let columns = state.settings.columns_for(&key);

    let Some(set) = state.table(&key) else {
        let para = Paragraph::new(t("loading"))
            .style(Style::default().fg(Color::DarkGray))
            .block(Block::default().borders(Borders::NONE));
        f.render_widget(para, area);
        return;
    };

    let inner_width = area.width.saturating_sub(1) as usize;
    let widths = column_widths(columns, inner_width);

    let mut lines: Vec<Line> = vec![heading_line(columns, &widths)];

    // One heading line, the rest is the scroll window around the cursor.
    let visible_height = (area.height as usize).saturating_sub(1);
    let cursor = set.focused.unwrap_or(0);
    let scroll_offset = if cursor >= visible_height && visible_height > 0 {
        cursor - visible_height + 1
    } else {
        0
    };

    for (i, row) in set
        .rows()
        .iter()
        .enumerate()
        .skip(scroll_offset)
        .take(visible_height)
    {
        let selected = set.focused == Some(i);
        lines.push(row_line(row, set, i, columns, &widths, selected));
    }

    let table = Paragraph::new(lines).block(Block::default().borders(Borders::NONE));
    f.render_widget(table, area);
}

fn heading_line(columns: &[Column], widths: &[usize]) -> Line<'static> {
    let mut spans = Vec::new();
    for (i, column) in columns.iter().enumerate() {
        if i > 0 {
            spans.push(Span::raw(" "));
        }
        spans.push(Span::styled(
            fit(column.heading(), widths[i], align_right(*column)),
            Style::default()
                .fg(Color::DarkGray)
                .add_modifier(Modifier::BOLD),
        ));
    }
    Line::from(spans)
}

fn row_line(
    row: &Row,
    set: &RowSet,
    index: usize,
    columns: &[Column],
    widths: &[usize],
    selected: bool,
) -> Line<'static> {
    let select_style = if selected {
        Style::default().add_modifier(Modifier::REVERSED)
    } else {
        Style::default()
    };

    match row {
        Row::Data { cells, .. } => {
            let kind_color = set.items.get(index).map_or(Color::White, item_color);
            let mut spans = Vec::new();
            for (i, cell) in cells.iter().enumerate() {
                if i > 0 {
                    spans.push(Span::styled(" ", select_style));
                }
                let width = widths.get(i).copied().unwrap_or(0);
                let column = columns.get(i).copied().unwrap_or(Column::Title);
                let style = match column {
                    Column::Kind => select_style.fg(kind_color),
                    Column::Pos | Column::Duration | Column::SongCount => {
                        select_style.fg(Color::DarkGray)
                    }
                    _ => select_style,
                };
                spans.push(Span::styled(fit(cell, width, align_right(column)), style));
            }
            Line::from(spans)
        }
        Row::Empty { message, .. } => Line::from(vec![
            Span::raw("  "),
            Span::styled(
                message.clone(),
                select_style.fg(Color::DarkGray).add_modifier(Modifier::ITALIC),
            ),
        ]),
        Row::Error { message } => Line::from(vec![
            Span::styled("✗ ", Style::default().fg(Color::Red)),
            Span::styled(message.clone(), select_style.fg(Color::Red)),
        ]),
    }
}

fn item_color(item: &Item) -> Color {
    match item {
        Item::Song(_) => Color::White,
        Item::Dir(_) => Color::Blue,
        Item::Plist(_) => Color::Magenta,
        Item::Album(_) => Color::Yellow,
        Item::Tag(_) => Color::Green,
    }
}

fn align_right(column: Column) -> bool {
    matches!(column, Column::Pos | Column::Duration | Column::SongCount)
}

fn fixed_width(column: Column) -> Option<usize> {
    match column {
        Column::Kind => Some(2),
        Column::Pos => Some(5),
        Column::Duration => Some(8),
        Column::SongCount => Some(6),
        Column::LastModified | Column::LastPlayed => Some(17),
        Column::Title | Column::Artist | Column::Album | Column::Name | Column::Value => None,
    }
}

/// Fixed columns take their width, flexible ones share the rest evenly.
fn column_widths(columns: &[Column], total: usize) -> Vec<usize> {
    let fixed: usize = columns.iter().filter_map(|c| fixed_width(*c)).sum();
    let flex_count = columns.iter().filter(|c| fixed_width(**c).is_none()).count();
    let gaps = columns.len().saturating_sub(1);
    let share = if flex_count > 0 {
        total.saturating_sub(fixed + gaps) / flex_count
    } else {
        0
    };
    columns
        .iter()
        .map(|c| fixed_width(*c).unwrap_or(share))
        .collect()
}

/// Truncates to the display width (ellipsis past the cut) and pads to it.
fn fit(s: &str, width: usize, right: bool) -> String {
    let truncated = truncate(s, width);
    let pad = width.saturating_sub(UnicodeWidthStr::width(truncated.as_str()));
    if right {
        format!("{}{}", " ".repeat(pad), truncated)
    } else {
        format!("{}{}", truncated, " ".repeat(pad))
    }
}

fn truncate(s: &str, max_width: usize) -> String {
    if UnicodeWidthStr::width(s) <= max_width {
        return s.to_string();
    }
    let mut result = String::new();
    let mut width = 0;
    for c in s.chars() {
        let cw = UnicodeWidthChar::width(c).unwrap_or(0);
        if width + cw + 1 > max_width {
            result.push('…');
            break;
        }
        result.push(c);
        width += cw;
    }
    result
}
