use std::collections::HashMap;
use std::time::Instant;

use crate::api::commands::{self, FetchKind};
use crate::events::FetchPayload;
use crate::route::{RouteKey, Router};
use crate::table::{PageMeta, RowSet};

// UI constants
pub const ERROR_TTL_SECS: u64 = 10;
pub const SPINNER_FRAME_COUNT: usize = 10;
pub const NARROW_WIDTH_THRESHOLD: u16 = 70;
pub const PROMPT_MAX_LEN: usize = 512;

#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PlayState {
    Play,
    Pause,
    Stop,
}

/// One record of a fetched result page. The daemon discriminates list entries
/// by their `type` field; queue pages carry songs, filesystem pages mix songs,
/// directories and playlists, database pages carry albums or tag values.
#[derive(Debug, Clone, PartialEq, serde::Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum Item {
    Song(Song),
    Dir(Dir),
    Plist(PlaylistRef),
    Album(Album),
    Tag(TagValue),
}

#[derive(Debug, Clone, PartialEq, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Song {
    pub uri: String,
    /// Queue song id, present only for queue entries.
    #[serde(default)]
    pub id: Option<u64>,
    /// Queue position, present only for queue entries.
    #[serde(default)]
    pub pos: Option<u64>,
    pub title: String,
    #[serde(default)]
    pub artist: String,
    #[serde(default)]
    pub album: String,
    /// Seconds.
    #[serde(default)]
    pub duration: u64,
    /// Unix timestamp, present on last-played pages.
    #[serde(default)]
    pub last_played: Option<i64>,
}

#[derive(Debug, Clone, PartialEq, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Dir {
    pub uri: String,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlaylistRef {
    pub uri: String,
    pub name: String,
    #[serde(default)]
    pub last_modified: Option<i64>,
}

#[derive(Debug, Clone, PartialEq, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Album {
    pub album: String,
    #[serde(default)]
    pub album_artist: String,
    #[serde(default)]
    pub song_count: u64,
    #[serde(default)]
    pub duration: u64,
}

#[derive(Debug, Clone, PartialEq, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TagValue {
    pub value: String,
}

impl Item {
    /// The uri a row action operates on, where the record has one.
    pub fn uri(&self) -> Option<&str> {
        match self {
            Item::Song(s) => Some(&s.uri),
            Item::Dir(d) => Some(&d.uri),
            Item::Plist(p) => Some(&p.uri),
            Item::Album(_) | Item::Tag(_) => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlayerState {
    pub state: PlayState,
    #[serde(default)]
    pub song: Option<Song>,
    /// Seconds into the current song.
    #[serde(default)]
    pub elapsed: u64,
    #[serde(default)]
    pub volume: Option<u8>,
    #[serde(default)]
    pub queue_version: Option<u64>,
}

#[derive(Debug, Clone, PartialEq, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Stats {
    pub artists: u64,
    pub albums: u64,
    pub songs: u64,
    /// Seconds of audio in the database.
    pub db_play_time: u64,
    pub uptime: u64,
}

/// Column identifiers a view's table can be configured with. Each renders a
/// literal record field, an icon keyed by the record type, or a derived value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Column {
    Kind,
    Pos,
    Title,
    Artist,
    Album,
    Duration,
    Name,
    Value,
    LastModified,
    LastPlayed,
    SongCount,
}

impl Column {
    pub fn heading(self) -> &'static str {
        match self {
            Column::Kind => "",
            Column::Pos => "#",
            Column::Title => "Title",
            Column::Artist => "Artist",
            Column::Album => "Album",
            Column::Duration => "Length",
            Column::Name => "Name",
            Column::Value => "Value",
            Column::LastModified => "Modified",
            Column::LastPlayed => "Played",
            Column::SongCount => "Songs",
        }
    }
}

/// Immutable configuration set at startup.
pub struct Settings {
    pub address: String,
    /// Rows fetched per page.
    pub page_size: u64,
    /// Seconds between automatic refreshes of the visible view.
    pub refresh_interval: u64,
    pub desktop_notify: bool,
}

impl Settings {
    /// Ordered column list for a list view. Home and Playback are panels, not
    /// tables, but still return a sane default so a stray list render works.
    pub fn columns_for(&self, key: &RouteKey) -> &'static [Column] {
        use Column::*;
        match (key.app.as_str(), key.tab.as_deref(), key.view.as_deref()) {
            ("Queue", Some("Current"), _) => &[Pos, Title, Artist, Album, Duration],
            ("Queue", Some("LastPlayed"), _) => &[Pos, Title, Artist, LastPlayed],
            ("Queue", Some("Jukebox"), _) => &[Pos, Title, Artist, Album, Duration],
            ("Browse", Some("Database"), Some("TagList")) => &[Kind, Value],
            ("Browse", Some("Database"), Some("AlbumList")) => {
                &[Kind, Album, Artist, SongCount, Duration]
            }
            ("Browse", Some("Filesystem"), _) => &[Kind, Title, Artist, Album, Duration],
            ("Browse", Some("Playlist"), Some("List")) => &[Kind, Name, LastModified],
            ("Browse", Some("Playlist"), Some("Detail")) => &[Pos, Title, Artist, Album, Duration],
            ("Search", _, _) => &[Kind, Title, Artist, Album, Duration],
            _ => &[Kind, Title],
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PromptKind {
    Goto,
    Search,
}

#[derive(Debug, Clone)]
pub struct Prompt {
    pub kind: PromptKind,
    pub buffer: String,
}

pub struct AppState {
    pub settings: Settings,
    pub router: Router,

    /// One live row set per (app, tab, view) triple; rows persist while the
    /// view is hidden, exactly one is visible at a time.
    pub tables: HashMap<RouteKey, RowSet>,

    // Panel data
    pub playback: Option<PlayerState>,
    pub stats: Option<Stats>,

    // Transient UI
    pub error: Option<(String, Instant)>,
    pub spinner_frame: usize,
    pub prompt: Option<Prompt>,
    pub connected: bool,
    pub should_quit: bool,

    // Song-change detection for desktop notifications
    pub last_song_id: Option<u64>,
    pub queue_version: Option<u64>,
}

impl AppState {
    pub fn new(settings: Settings) -> Self {
        Self {
            settings,
            router: Router::new(),
            tables: HashMap::new(),
            playback: None,
            stats: None,
            error: None,
            spinner_frame: 0,
            prompt: None,
            connected: true,
            should_quit: false,
            last_song_id: None,
            queue_version: None,
        }
    }

    pub fn table(&self, key: &RouteKey) -> Option<&RowSet> {
        self.tables.get(key)
    }

    pub fn table_mut(&mut self, key: &RouteKey) -> &mut RowSet {
        self.tables.entry(key.clone()).or_default()
    }

    pub fn current_table(&self) -> Option<&RowSet> {
        self.router.current_key().and_then(|k| self.tables.get(&k))
    }

    /// Cursor index of the visible table, persisted into the state tree when
    /// navigating away.
    pub fn current_scroll(&self) -> usize {
        self.current_table().and_then(|t| t.focused).unwrap_or(0)
    }

    pub fn is_loading(&self) -> bool {
        self.current_table().is_some_and(|t| t.loading)
    }

    pub fn advance_spinner(&mut self) {
        self.spinner_frame = (self.spinner_frame + 1) % SPINNER_FRAME_COUNT;
    }

    pub fn set_error(&mut self, msg: String) {
        self.error = Some((msg, Instant::now()));
    }

    pub fn clear_error(&mut self) {
        self.error = None;
    }

    pub fn prune_error(&mut self) {
        if let Some((_, ts)) = &self.error {
            if ts.elapsed().as_secs() >= ERROR_TTL_SECS {
                self.error = None;
            }
        }
    }

    pub fn error_message(&self) -> Option<&str> {
        self.error.as_ref().map(|(msg, _)| msg.as_str())
    }

    pub fn open_prompt(&mut self, kind: PromptKind) {
        self.prompt = Some(Prompt {
            kind,
            buffer: String::new(),
        });
    }

    pub fn close_prompt(&mut self) {
        self.prompt = None;
    }

    pub fn prompt_push(&mut self, c: char) {
        if let Some(prompt) = &mut self.prompt {
            if prompt.buffer.len() < PROMPT_MAX_LEN {
                prompt.buffer.push(c);
            }
        }
    }

    pub fn prompt_pop(&mut self) {
        if let Some(prompt) = &mut self.prompt {
            prompt.buffer.pop();
        }
    }

    /// Closes the prompt and returns its kind and contents.
    pub fn take_prompt(&mut self) -> Option<(PromptKind, String)> {
        self.prompt.take().map(|p| (p.kind, p.buffer))
    }

    /// Applies one fetch completion. Completions stamped with a superseded
    /// generation are discarded whole; a navigation issued after the request
    /// went out owns the view now. Returns `true` when the playing song
    /// changed to a different, present song (the notification trigger).
    pub fn apply_fetch(
        &mut self,
        generation: u64,
        key: &RouteKey,
        payload: Result<FetchPayload, String>,
    ) -> bool {
        if generation != self.router.generation() {
            tracing::debug!("discarding stale fetch (gen {generation}) for {key:?}");
            return false;
        }

        match payload {
            Ok(FetchPayload::List { list, page }) => {
                let columns = self.settings.columns_for(key);
                let meta = PageMeta {
                    total: list.total_entities,
                    returned: list.returned_entities,
                    page,
                    total_time: list.total_time,
                };
                if let Some(version) = list.queue_version {
                    self.queue_version = Some(version);
                }
                let summary = self.table_mut(key).reconcile(&list.data, columns, meta);
                tracing::debug!(
                    "reconciled {key:?}: kept {} replaced {} appended {} removed {}",
                    summary.kept,
                    summary.replaced,
                    summary.appended,
                    summary.removed
                );
                false
            }
            Ok(FetchPayload::Player(player)) => {
                let new_id = player.song.as_ref().and_then(|s| s.id);
                let changed = self.last_song_id.is_some()
                    && self.last_song_id != new_id
                    && player.song.is_some();
                self.last_song_id = new_id;
                if let Some(version) = player.queue_version {
                    self.queue_version = Some(version);
                }
                self.playback = Some(player);
                changed
            }
            Ok(FetchPayload::Stats(stats)) => {
                self.stats = Some(stats);
                false
            }
            Err(message) => {
                match commands::spec_for(key).kind {
                    // List views render the failure inline where rows would be.
                    FetchKind::List => self.table_mut(key).set_error(message),
                    FetchKind::Stats | FetchKind::Player => self.set_error(message),
                }
                false
            }
        }
    }
}
