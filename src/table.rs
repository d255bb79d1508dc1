//! Incremental reconciliation of fetched result pages into live table rows.
//!
//! Rows are matched by position, not by record identity: row `i` is reused to
//! display record `i` of every refresh, and is only rebuilt when its rendered
//! content actually changes (judged by a fingerprint of the cell texts). This
//! keeps cursor and scroll stable across the periodic refreshes of a view.
//! The positional match is sound because row order within one result page is
//! server-determined and stable.

use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};

use chrono::DateTime;

use crate::app::{Column, Item};
use crate::i18n::t;

#[derive(Debug, Clone, PartialEq)]
pub enum Row {
    Data {
        cells: Vec<String>,
        fingerprint: u64,
    },
    /// Synthetic row shown when a page has no records, spanning the data
    /// columns after the leading icon column.
    Empty {
        message: String,
        span: usize,
    },
    /// Inline fetch failure, rendered in place of the data.
    Error {
        message: String,
    },
}

impl Row {
    pub fn fingerprint(&self) -> u64 {
        match self {
            Row::Data { fingerprint, .. } => *fingerprint,
            Row::Empty { message, .. } => salted_fingerprint("empty", message),
            Row::Error { message } => salted_fingerprint("error", message),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Pagination {
    pub total: u64,
    pub returned: u64,
    pub page: u64,
}

impl Pagination {
    pub fn page_count(&self, page_size: u64) -> u64 {
        if page_size == 0 {
            return 1;
        }
        self.total.div_ceil(page_size).max(1)
    }
}

/// Result-page bookkeeping the daemon sends alongside the records.
#[derive(Debug, Clone, Copy, Default)]
pub struct PageMeta {
    pub total: u64,
    pub returned: u64,
    pub page: u64,
    /// Summed duration of the listed entries, where the command supplies it.
    pub total_time: Option<u64>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ReconcileSummary {
    pub kept: usize,
    pub replaced: usize,
    pub appended: usize,
    pub removed: usize,
}

/// The live ordered row sequence of one view, plus the source records the
/// rows were built from (row actions need the record, not its rendering).
#[derive(Debug, Default)]
pub struct RowSet {
    rows: Vec<Row>,
    pub items: Vec<Item>,
    pub focused: Option<usize>,
    pub loading: bool,
    pub pagination: Pagination,
    pub caption: String,
}

impl RowSet {
    pub fn rows(&self) -> &[Row] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn focused_item(&self) -> Option<&Item> {
        self.items.get(self.focused?)
    }

    pub fn set_focus(&mut self, index: usize) {
        if self.rows.is_empty() {
            self.focused = None;
        } else {
            self.focused = Some(index.min(self.rows.len() - 1));
        }
    }

    pub fn move_focus(&mut self, delta: isize) {
        if self.rows.is_empty() {
            return;
        }
        let current = self.focused.unwrap_or(0) as isize;
        let next = (current + delta).clamp(0, self.rows.len() as isize - 1);
        self.focused = Some(next as usize);
    }

    /// Reconciles a fetched page into the existing rows. Row `i` is replaced
    /// only when record `i` renders differently; rows past the new record
    /// count are dropped from the end. An empty page collapses the region to
    /// a single localized empty row. Pagination, caption and the loading
    /// flag are updated last. A cursor that was inside the table survives at
    /// its index, clamped to the new length; an absent cursor stays absent.
    pub fn reconcile(
        &mut self,
        items: &[Item],
        columns: &[Column],
        meta: PageMeta,
    ) -> ReconcileSummary {
        let had_focus = self.focused;
        let mut summary = ReconcileSummary::default();

        if items.is_empty() {
            let row = Row::Empty {
                message: t("empty-list").to_string(),
                span: columns.len().saturating_sub(1),
            };
            if self.rows.len() == 1 && self.rows[0].fingerprint() == row.fingerprint() {
                summary.kept = 1;
            } else {
                summary.removed = self.rows.len();
                summary.appended = 1;
                self.rows.clear();
                self.rows.push(row);
            }
        } else {
            for (i, item) in items.iter().enumerate() {
                let row = build_row(item, columns);
                if i < self.rows.len() {
                    if self.rows[i].fingerprint() == row.fingerprint() {
                        summary.kept += 1;
                    } else {
                        self.rows[i] = row;
                        summary.replaced += 1;
                    }
                } else {
                    self.rows.push(row);
                    summary.appended += 1;
                }
            }
            while self.rows.len() > items.len() {
                self.rows.pop();
                summary.removed += 1;
            }
        }

        self.items = items.to_vec();
        self.pagination = Pagination {
            total: meta.total,
            returned: meta.returned,
            page: meta.page,
        };
        self.caption = caption(&meta);
        self.loading = false;

        if let Some(focus) = had_focus {
            self.focused = Some(focus.min(self.rows.len().saturating_sub(1)));
        }

        summary
    }

    /// Replaces the row region with a single inline error row. Not a thrown
    /// condition; the next navigation or refresh tries again.
    pub fn set_error(&mut self, message: String) {
        self.rows.clear();
        self.rows.push(Row::Error { message });
        self.items.clear();
        self.pagination = Pagination::default();
        self.caption.clear();
        self.loading = false;
        if self.focused.is_some() {
            self.focused = Some(0);
        }
    }
}

fn salted_fingerprint(salt: &str, text: &str) -> u64 {
    let mut hasher = DefaultHasher::new();
    salt.hash(&mut hasher);
    text.hash(&mut hasher);
    hasher.finish()
}

fn fingerprint_cells(cells: &[String]) -> u64 {
    let mut hasher = DefaultHasher::new();
    for cell in cells {
        cell.hash(&mut hasher);
    }
    hasher.finish()
}

/// Builds the replacement row for one record under a view's column list.
pub fn build_row(item: &Item, columns: &[Column]) -> Row {
    let cells: Vec<String> = columns.iter().map(|c| cell_text(item, *c)).collect();
    let fingerprint = fingerprint_cells(&cells);
    Row::Data { cells, fingerprint }
}

pub fn kind_icon(item: &Item) -> &'static str {
    match item {
        Item::Song(_) => "♪",
        Item::Dir(_) => "/",
        Item::Plist(_) => "≡",
        Item::Album(_) => "◎",
        Item::Tag(_) => "#",
    }
}

fn cell_text(item: &Item, column: Column) -> String {
    match column {
        Column::Kind => kind_icon(item).to_string(),
        Column::Pos => match item {
            // Daemon positions are 0-based; people count from 1.
            Item::Song(s) => s.pos.map(|p| (p + 1).to_string()).unwrap_or_default(),
            _ => String::new(),
        },
        Column::Title => match item {
            Item::Song(s) => s.title.clone(),
            Item::Dir(d) => d.name.clone(),
            Item::Plist(p) => p.name.clone(),
            Item::Album(a) => a.album.clone(),
            Item::Tag(v) => v.value.clone(),
        },
        Column::Artist => match item {
            Item::Song(s) => s.artist.clone(),
            Item::Album(a) => a.album_artist.clone(),
            _ => String::new(),
        },
        Column::Album => match item {
            Item::Song(s) => s.album.clone(),
            Item::Album(a) => a.album.clone(),
            _ => String::new(),
        },
        Column::Duration => match item {
            Item::Song(s) => format_duration(s.duration),
            Item::Album(a) => format_duration(a.duration),
            _ => String::new(),
        },
        Column::Name => match item {
            Item::Dir(d) => d.name.clone(),
            Item::Plist(p) => p.name.clone(),
            Item::Song(s) => s.title.clone(),
            _ => String::new(),
        },
        Column::Value => match item {
            Item::Tag(v) => v.value.clone(),
            _ => String::new(),
        },
        Column::LastModified => match item {
            Item::Plist(p) => p.last_modified.map(format_date).unwrap_or_default(),
            _ => String::new(),
        },
        Column::LastPlayed => match item {
            Item::Song(s) => s.last_played.map(format_date).unwrap_or_default(),
            _ => String::new(),
        },
        Column::SongCount => match item {
            Item::Album(a) => a.song_count.to_string(),
            _ => String::new(),
        },
    }
}

/// `m:ss` under an hour, `h:mm:ss` from there on.
pub fn format_duration(secs: u64) -> String {
    if secs < 3600 {
        format!("{}:{:02}", secs / 60, secs % 60)
    } else {
        format!("{}:{:02}:{:02}", secs / 3600, (secs % 3600) / 60, secs % 60)
    }
}

fn format_date(epoch: i64) -> String {
    DateTime::from_timestamp(epoch, 0)
        .map(|dt| dt.format("%Y-%m-%d %H:%M").to_string())
        .unwrap_or_default()
}

fn caption(meta: &PageMeta) -> String {
    let mut caption = format!("{} {}", meta.total, t("entries"));
    if let Some(total_time) = meta.total_time {
        caption.push_str(" · ");
        caption.push_str(&format_duration(total_time));
    }
    caption
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::{Album, Dir, Song};
    use pretty_assertions::assert_eq;

    fn song(title: &str, pos: u64) -> Item {
        Item::Song(Song {
            uri: format!("music/{}.flac", title),
            id: Some(pos + 100),
            pos: Some(pos),
            title: title.to_string(),
            artist: "Artist".to_string(),
            album: "Album".to_string(),
            duration: 180 + pos,
            last_played: None,
        })
    }

    fn songs(n: u64) -> Vec<Item> {
        (0..n).map(|i| song(&format!("track-{}", i), i)).collect()
    }

    const COLS: &[Column] = &[
        Column::Pos,
        Column::Title,
        Column::Artist,
        Column::Album,
        Column::Duration,
    ];

    fn meta(total: u64, returned: u64) -> PageMeta {
        PageMeta {
            total,
            returned,
            page: 0,
            total_time: None,
        }
    }

    // --- Row counts across N vs M ---

    #[test]
    fn fresh_table_appends_all_rows() {
        let mut set = RowSet::default();
        let summary = set.reconcile(&songs(3), COLS, meta(3, 3));
        assert_eq!(set.len(), 3);
        assert_eq!(summary.appended, 3);
        assert_eq!(summary.replaced, 0);
    }

    #[test]
    fn shrinking_result_removes_from_the_end() {
        let mut set = RowSet::default();
        set.reconcile(&songs(5), COLS, meta(5, 5));
        let summary = set.reconcile(&songs(2), COLS, meta(2, 2));
        assert_eq!(set.len(), 2);
        assert_eq!(summary.removed, 3);
        assert_eq!(summary.kept, 2);
    }

    #[test]
    fn growing_result_appends_past_old_count() {
        let mut set = RowSet::default();
        set.reconcile(&songs(2), COLS, meta(2, 2));
        let summary = set.reconcile(&songs(5), COLS, meta(5, 5));
        assert_eq!(set.len(), 5);
        assert_eq!(summary.kept, 2);
        assert_eq!(summary.appended, 3);
    }

    #[test]
    fn empty_result_is_single_empty_row() {
        let mut set = RowSet::default();
        set.reconcile(&songs(4), COLS, meta(4, 4));
        set.reconcile(&[], COLS, meta(0, 0));
        assert_eq!(set.len(), 1);
        match &set.rows()[0] {
            Row::Empty { message, span } => {
                assert_eq!(message, "Empty list");
                assert_eq!(*span, COLS.len() - 1);
            }
            other => panic!("expected empty row, got {:?}", other),
        }
    }

    #[test]
    fn empty_result_is_idempotent_too() {
        let mut set = RowSet::default();
        set.reconcile(&[], COLS, meta(0, 0));
        let summary = set.reconcile(&[], COLS, meta(0, 0));
        assert_eq!(summary.kept, 1);
        assert_eq!(summary.appended, 0);
        assert_eq!(set.len(), 1);
    }

    // --- Fingerprint idempotence ---

    #[test]
    fn identical_refresh_replaces_nothing() {
        let mut set = RowSet::default();
        set.reconcile(&songs(4), COLS, meta(4, 4));
        let summary = set.reconcile(&songs(4), COLS, meta(4, 4));
        assert_eq!(summary.replaced, 0);
        assert_eq!(summary.kept, 4);
        assert_eq!(summary.appended, 0);
        assert_eq!(summary.removed, 0);
    }

    #[test]
    fn single_changed_record_replaces_one_row() {
        let mut set = RowSet::default();
        set.reconcile(&songs(5), COLS, meta(5, 5));
        let mut items = songs(5);
        items[2] = song("renamed", 2);
        let summary = set.reconcile(&items, COLS, meta(5, 5));
        assert_eq!(summary.replaced, 1);
        assert_eq!(summary.kept, 4);
    }

    // --- Focus continuity ---

    #[test]
    fn focus_survives_in_place_replacement() {
        let mut set = RowSet::default();
        set.reconcile(&songs(5), COLS, meta(5, 5));
        set.set_focus(2);
        let mut items = songs(5);
        items[2] = song("renamed", 2);
        set.reconcile(&items, COLS, meta(5, 5));
        assert_eq!(set.focused, Some(2));
        match set.focused_item() {
            Some(Item::Song(s)) => assert_eq!(s.title, "renamed"),
            other => panic!("expected focused song, got {:?}", other),
        }
    }

    #[test]
    fn focus_clamped_when_table_shrinks() {
        let mut set = RowSet::default();
        set.reconcile(&songs(5), COLS, meta(5, 5));
        set.set_focus(4);
        set.reconcile(&songs(2), COLS, meta(2, 2));
        assert_eq!(set.focused, Some(1));
    }

    #[test]
    fn absent_focus_stays_absent() {
        let mut set = RowSet::default();
        set.reconcile(&songs(3), COLS, meta(3, 3));
        assert_eq!(set.focused, None);
    }

    #[test]
    fn move_focus_clamps_to_bounds() {
        let mut set = RowSet::default();
        set.reconcile(&songs(3), COLS, meta(3, 3));
        set.set_focus(0);
        set.move_focus(-1);
        assert_eq!(set.focused, Some(0));
        set.move_focus(10);
        assert_eq!(set.focused, Some(2));
    }

    // --- Error rows ---

    #[test]
    fn fetch_failure_renders_inline_error_row() {
        let mut set = RowSet::default();
        set.reconcile(&songs(3), COLS, meta(3, 3));
        set.loading = true;
        set.set_error("no such playlist".to_string());
        assert_eq!(set.len(), 1);
        assert!(matches!(&set.rows()[0], Row::Error { message } if message == "no such playlist"));
        assert!(!set.loading);
        assert!(set.items.is_empty());
    }

    #[test]
    fn data_refresh_recovers_from_error_row() {
        let mut set = RowSet::default();
        set.set_error("transient".to_string());
        let summary = set.reconcile(&songs(2), COLS, meta(2, 2));
        assert_eq!(set.len(), 2);
        // The error row at index 0 is overwritten, the second row appended.
        assert_eq!(summary.replaced, 1);
        assert_eq!(summary.appended, 1);
    }

    // --- Bookkeeping ---

    #[test]
    fn reconcile_updates_pagination_caption_and_loading() {
        let mut set = RowSet::default();
        set.loading = true;
        set.reconcile(
            &songs(3),
            COLS,
            PageMeta {
                total: 120,
                returned: 3,
                page: 2,
                total_time: Some(7265),
            },
        );
        assert_eq!(
            set.pagination,
            Pagination {
                total: 120,
                returned: 3,
                page: 2
            }
        );
        assert_eq!(set.caption, "120 entries · 2:01:05");
        assert!(!set.loading);
    }

    #[test]
    fn page_count_rounds_up() {
        let p = Pagination {
            total: 101,
            returned: 50,
            page: 0,
        };
        assert_eq!(p.page_count(50), 3);
        assert_eq!(Pagination::default().page_count(50), 1);
    }

    // --- Cell rendering ---

    #[test]
    fn row_cells_follow_column_order() {
        let row = build_row(&song("Alpha", 0), COLS);
        match row {
            Row::Data { cells, .. } => {
                assert_eq!(cells, vec!["1", "Alpha", "Artist", "Album", "3:00"]);
            }
            other => panic!("expected data row, got {:?}", other),
        }
    }

    #[test]
    fn icons_discriminate_record_kinds() {
        assert_eq!(kind_icon(&song("x", 0)), "♪");
        assert_eq!(
            kind_icon(&Item::Dir(Dir {
                uri: "a".into(),
                name: "a".into()
            })),
            "/"
        );
        assert_eq!(
            kind_icon(&Item::Album(Album {
                album: "x".into(),
                album_artist: String::new(),
                song_count: 0,
                duration: 0
            })),
            "◎"
        );
    }

    #[test]
    fn duration_formats() {
        assert_eq!(format_duration(0), "0:00");
        assert_eq!(format_duration(59), "0:59");
        assert_eq!(format_duration(185), "3:05");
        assert_eq!(format_duration(3600), "1:00:00");
        assert_eq!(format_duration(3725), "1:02:05");
    }

    #[test]
    fn date_cells_render_for_last_played() {
        let mut item = song("x", 0);
        if let Item::Song(s) = &mut item {
            s.last_played = Some(1700000000);
        }
        let row = build_row(&item, &[Column::LastPlayed]);
        match row {
            Row::Data { cells, .. } => assert_eq!(cells[0], "2023-11-14 22:13"),
            other => panic!("expected data row, got {:?}", other),
        }
    }
}
