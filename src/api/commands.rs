use serde_json::{json, Value};
use tokio::sync::mpsc::UnboundedSender;

use crate::api::client::ApiClient;
use crate::api::parser;
use crate::events::{AppEvent, FetchPayload};
use crate::route::{RouteKey, RouteParams};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetchKind {
    Stats,
    Player,
    List,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FetchSpec {
    pub method: &'static str,
    pub kind: FetchKind,
}

/// Exactly one fetch routine per (app, tab, view) triple. The router only
/// produces keys for configured nodes, so the trailing arm is unreachable in
/// practice and routes to the default app's fetch.
pub fn spec_for(key: &RouteKey) -> FetchSpec {
    let spec = |method, kind| FetchSpec { method, kind };
    match (key.app.as_str(), key.tab.as_deref(), key.view.as_deref()) {
        ("Playback", _, _) => spec("player_current", FetchKind::Player),
        ("Queue", Some("LastPlayed"), _) => spec("queue_last_played", FetchKind::List),
        ("Queue", Some("Jukebox"), _) => spec("jukebox_list", FetchKind::List),
        ("Queue", _, _) => spec("queue_list", FetchKind::List),
        ("Browse", Some("Database"), Some("AlbumList")) => {
            spec("database_album_list", FetchKind::List)
        }
        ("Browse", Some("Database"), _) => spec("database_tag_list", FetchKind::List),
        ("Browse", Some("Filesystem"), _) => spec("filesystem_list", FetchKind::List),
        ("Browse", Some("Playlist"), Some("Detail")) => {
            spec("playlist_content", FetchKind::List)
        }
        ("Browse", Some("Playlist"), _) => spec("playlist_list", FetchKind::List),
        ("Search", _, _) => spec("database_search", FetchKind::List),
        _ => spec("stats_get", FetchKind::Stats),
    }
}

/// Flat parameter map for a list fetch, built from the resolved leaf values.
/// Filesystem paths travel in the greedy search field; the daemon reads the
/// same field as the search expression elsewhere.
pub fn list_params(params: &RouteParams, page_size: u64) -> Value {
    json!({
        "offset": params.page * page_size,
        "limit": page_size,
        "filter": params.filter,
        "sort": params.sort,
        "tag": params.tag,
        "search": params.search,
    })
}

fn parse_payload(
    kind: FetchKind,
    value: Value,
    page: u64,
) -> Result<FetchPayload, String> {
    match kind {
        FetchKind::Stats => parser::parse_stats(value)
            .map(FetchPayload::Stats)
            .map_err(|e| e.to_string()),
        FetchKind::Player => parser::parse_player(value)
            .map(FetchPayload::Player)
            .map_err(|e| e.to_string()),
        FetchKind::List => parser::parse_list(value)
            .map(|list| FetchPayload::List { list, page })
            .map_err(|e| e.to_string()),
    }
}

/// Issues the fetch for one navigation on a detached task. The completion
/// event carries the generation the navigation was stamped with; receivers
/// drop events whose generation is no longer current.
pub fn dispatch(
    client: &ApiClient,
    key: RouteKey,
    params: &RouteParams,
    generation: u64,
    page_size: u64,
    tx: UnboundedSender<AppEvent>,
) {
    let fetch = spec_for(&key);
    let request_params = match fetch.kind {
        FetchKind::List => list_params(params, page_size),
        FetchKind::Stats | FetchKind::Player => json!({}),
    };
    let page = params.page;
    let client = client.clone();
    tracing::debug!("dispatch {} for {:?} gen {}", fetch.method, key, generation);
    tokio::spawn(async move {
        let payload = match client.call(fetch.method, request_params).await {
            Ok(value) => parse_payload(fetch.kind, value, page),
            Err(message) => Err(message),
        };
        if tx
            .send(AppEvent::Fetched {
                generation,
                key,
                payload,
            })
            .is_err()
        {
            tracing::warn!("fetch: channel closed");
        }
    });
}

/// Fire-and-forget control command (playback, queue edits). Failures surface
/// through the transient error slot; the next refresh re-reads daemon state.
pub fn control(
    client: &ApiClient,
    method: &'static str,
    params: Value,
    tx: UnboundedSender<AppEvent>,
) {
    let client = client.clone();
    tokio::spawn(async move {
        if let Err(message) = client.call(method, params).await {
            if tx.send(AppEvent::Error(format!("{method}: {message}"))).is_err() {
                tracing::warn!("control: channel closed");
            }
        }
    });
}
