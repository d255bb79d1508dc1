
use fixtures::*;
use mpdw::api::commands::{self, FetchKind};
use mpdw::api::parser;
use mpdw::app::{Item, PlayState, PlayerState, Song};
use mpdw::events::FetchPayload;
use mpdw::route::{format_location, Overrides};
use mpdw::table::Row;

use pretty_assertions::assert_eq;

fn list_payload(json: &str, page: u64) -> FetchPayload {
    let value: serde_json::Value = serde_json::from_str(json).expect("fixture json");
    let list = parser::parse_list(value).expect("fixture list");
    FetchPayload::List { list, page }
}

fn player_payload(id: u64, title: &str) -> FetchPayload {
    FetchPayload::Player(PlayerState {
        state: PlayState::Play,
        song: Some(Song {
            uri: format!("library/{}.flac", title),
            id: Some(id),
            pos: Some(0),
            title: title.to_string(),
            artist: "Artist".to_string(),
            album: "Album".to_string(),
            duration: 180,
            last_played: None,
        }),
        elapsed: 10,
        volume: Some(60),
        queue_version: None,
    })
}

// ========== Location to rendered rows ==========

#[test]
fn full_flow_location_to_fetch_to_rows() {
    let mut state = make_state();

    // Step 1: resolve the location
    let nav = state.router.navigate("#/Queue/Current!0/any/-/-/", 0);
    assert_eq!(nav.key, key("Queue", Some("Current"), None));
    assert_eq!(nav.params.page, 0);
    assert_eq!(nav.params.filter, "any");
    assert_eq!(nav.params.sort, "-");
    assert_eq!(nav.params.tag, "-");
    assert_eq!(nav.params.search, "");

    // Step 2: the route maps to exactly one command
    let spec = commands::spec_for(&nav.key);
    assert_eq!(spec.method, "queue_list");
    assert_eq!(spec.kind, FetchKind::List);

    // Step 3: apply the daemon's page
    let json = queue_page_json(&["one", "two", "three"]);
    let applied = state.apply_fetch(
        nav.generation,
        &nav.key,
        Ok(list_payload(&json, nav.params.page)),
    );
    assert!(!applied); // list fetches never signal a song change

    // Step 4: exactly three rows, no empty-state row
    let table = state.table(&nav.key).expect("table exists");
    assert_eq!(table.len(), 3);
    assert!(table
        .rows()
        .iter()
        .all(|row| matches!(row, Row::Data { .. })));
    assert_eq!(table.pagination.total, 3);
    assert_eq!(state.queue_version, Some(3));
}

#[test]
fn empty_fetch_renders_single_localized_empty_row() {
    let mut state = make_state();
    let nav = state.router.navigate("#/Queue/Current!0/-/-/-/", 0);
    let json = r#"{"data":[],"returnedEntities":0,"totalEntities":0}"#;
    state.apply_fetch(nav.generation, &nav.key, Ok(list_payload(json, 0)));

    let table = state.table(&nav.key).expect("table exists");
    assert_eq!(table.len(), 1);
    let columns = state.settings.columns_for(&nav.key);
    match &table.rows()[0] {
        Row::Empty { message, span } => {
            assert_eq!(message, "Empty list");
            assert_eq!(*span, columns.len() - 1);
        }
        other => panic!("expected empty row, got {:?}", other),
    }
}

#[test]
fn refresh_that_changes_one_row_keeps_focus_on_it() {
    let mut state = make_state();
    let nav = state.router.navigate("#/Queue/Current!0/-/-/-/", 0);
    let json = queue_page_json(&["a", "b", "c", "d", "e"]);
    state.apply_fetch(nav.generation, &nav.key, Ok(list_payload(&json, 0)));
    state.table_mut(&nav.key).set_focus(2);

    let refresh = state.router.refresh().expect("route is current");
    let json = queue_page_json(&["a", "b", "changed", "d", "e"]);
    state.apply_fetch(refresh.generation, &refresh.key, Ok(list_payload(&json, 0)));

    let table = state.table(&nav.key).expect("table exists");
    assert_eq!(table.focused, Some(2));
    match table.focused_item() {
        Some(Item::Song(song)) => assert_eq!(song.title, "changed"),
        other => panic!("expected focused song, got {:?}", other),
    }
}

#[test]
fn identical_refresh_is_a_no_op_on_rows() {
    let mut state = make_state();
    let nav = state.router.navigate("#/Queue/Current!0/-/-/-/", 0);
    let json = queue_page_json(&["a", "b", "c"]);
    state.apply_fetch(nav.generation, &nav.key, Ok(list_payload(&json, 0)));

    let before: Vec<u64> = state
        .table(&nav.key)
        .expect("table exists")
        .rows()
        .iter()
        .map(Row::fingerprint)
        .collect();

    let refresh = state.router.refresh().expect("route is current");
    state.apply_fetch(refresh.generation, &refresh.key, Ok(list_payload(&json, 0)));

    let after: Vec<u64> = state
        .table(&nav.key)
        .expect("table exists")
        .rows()
        .iter()
        .map(Row::fingerprint)
        .collect();
    assert_eq!(before, after);
}

// ========== Stale responses ==========

#[test]
fn stale_generation_never_touches_the_current_view() {
    let mut state = make_state();
    let first = state.router.navigate("#/Queue/Current!0/-/-/-/", 0);
    // The user navigates on before the queue response arrives.
    let second = state.router.navigate("#/Search!0/any/-/-/beatles", 0);

    let json = queue_page_json(&["late", "response"]);
    let applied_key = first.key.clone();
    state.apply_fetch(first.generation, &first.key, Ok(list_payload(&json, 0)));

    // The stale queue page was dropped entirely.
    assert!(state.table(&applied_key).is_none());

    // The current response still lands.
    let json = queue_page_json(&["hit"]);
    state.apply_fetch(second.generation, &second.key, Ok(list_payload(&json, 0)));
    assert_eq!(state.table(&second.key).expect("table exists").len(), 1);
}

// ========== Error rendering ==========

#[test]
fn failed_list_fetch_becomes_inline_error_row() {
    let mut state = make_state();
    let nav = state
        .router
        .navigate("#/Browse/Playlist/Detail!0/-/-/gone/", 0);
    state.apply_fetch(
        nav.generation,
        &nav.key,
        Err("no such playlist: gone".to_string()),
    );

    let table = state.table(&nav.key).expect("table exists");
    assert_eq!(table.len(), 1);
    assert!(
        matches!(&table.rows()[0], Row::Error { message } if message.contains("no such playlist"))
    );
    // Inline errors do not use the transient footer slot.
    assert!(state.error_message().is_none());
}

#[test]
fn failed_panel_fetch_uses_transient_error_slot() {
    let mut state = make_state();
    let nav = state.router.navigate("#/Home!0/-/-/-/", 0);
    state.apply_fetch(nav.generation, &nav.key, Err("stats unavailable".to_string()));
    assert_eq!(state.error_message(), Some("stats unavailable"));
}

// ========== Router round-trips and stored defaults ==========

#[test]
fn navigation_roundtrips_through_format_location() {
    let mut state = make_state();
    let location = "#/Browse/Database/AlbumList!2/AlbumArtist/-Album/rock/";
    let nav = state.router.navigate(location, 0);
    assert_eq!(format_location(&nav.key, &nav.params), location);
}

#[test]
fn omitted_fields_keep_stored_values_for_the_target() {
    let mut state = make_state();
    state
        .router
        .navigate("#/Queue/Current!2/any/-Title/-/zappa", 0);
    state.router.navigate("#/Home!0/-/-/-/", 0);

    // Back to the queue without naming sort, filter or search.
    let location = state
        .router
        .location_for("Queue", Some("Current"), None, Overrides::default())
        .expect("known target");
    assert_eq!(location, "#/Queue/Current!2/any/-Title/-/zappa");
}

#[test]
fn scroll_position_survives_leaving_and_returning() {
    let mut state = make_state();
    let nav = state.router.navigate("#/Queue/Current!0/-/-/-/", 0);
    let json = queue_page_json(&["a", "b", "c", "d", "e", "f"]);
    state.apply_fetch(nav.generation, &nav.key, Ok(list_payload(&json, 0)));
    state.table_mut(&nav.key).set_focus(4);

    // Leaving persists the cursor into the state tree.
    let cursor = state.current_scroll();
    state.router.navigate("#/Home!0/-/-/-/", cursor);
    assert_eq!(state.router.scroll_of(&nav.key), 4);
}

// ========== Playback flow ==========

#[test]
fn song_change_is_detected_across_player_fetches() {
    let mut state = make_state();
    let nav = state.router.navigate("#/Playback!0/-/-/-/", 0);

    // First observation never notifies.
    let applied = state.apply_fetch(nav.generation, &nav.key, Ok(player_payload(5, "first")));
    assert!(!applied);

    // Same song again: no change.
    let refresh = state.router.refresh().expect("route is current");
    let applied = state.apply_fetch(
        refresh.generation,
        &refresh.key,
        Ok(player_payload(5, "first")),
    );
    assert!(!applied);

    // A different song id is the notification trigger.
    let refresh = state.router.refresh().expect("route is current");
    let applied = state.apply_fetch(
        refresh.generation,
        &refresh.key,
        Ok(player_payload(6, "second")),
    );
    assert!(applied);
    assert_eq!(
        state
            .playback
            .as_ref()
            .and_then(|p| p.song.as_ref())
            .map(|s| s.title.as_str()),
        Some("second")
    );
}
