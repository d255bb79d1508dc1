use mpdw::api;
use mpdw::app;
use mpdw::cli;
use mpdw::events;
use mpdw::i18n;
use mpdw::input;
use mpdw::notify;
use mpdw::route;
use mpdw::tui;

use api::client::ApiClient;
use api::commands::{self, FetchKind};
use app::{AppState, Item, PromptKind, Settings};
use clap::Parser;
use cli::Cli;
use color_eyre::eyre::{eyre, Result};
use crossterm::execute;
use crossterm::terminal::{self, EnterAlternateScreen, LeaveAlternateScreen};
use events::{AppEvent, EventHandler, FetchPayload};
use input::{Action, InputContext};
use ratatui::backend::CrosstermBackend;
use ratatui::Terminal;
use route::{Navigation, Overrides, RouteKey};
use serde_json::json;
use std::io;
use std::time::{Duration, Instant};
use tokio::sync::mpsc::UnboundedSender;

fn state_dir() -> std::path::PathBuf {
    if let Some(state) = std::env::var_os("XDG_STATE_HOME") {
        std::path::PathBuf::from(state).join("mpdw")
    } else if let Some(home) = std::env::var_os("HOME") {
        std::path::PathBuf::from(home)
            .join(".local")
            .join("state")
            .join("mpdw")
    } else {
        std::path::PathBuf::from("/tmp/mpdw")
    }
}

fn setup_verbose_logging() -> Result<()> {
    let dir = state_dir();
    std::fs::create_dir_all(&dir)
        .map_err(|e| eyre!("Failed to create log directory {dir:?}: {e}"))?;
    let log_path = dir.join("debug.log");
    let file = std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(&log_path)
        .map_err(|e| eyre!("Failed to open log file {log_path:?}: {e}"))?;
    tracing_subscriber::fmt()
        .with_writer(file)
        .with_ansi(false)
        .init();
    tracing::info!(
        "mpdw v{} starting with verbose logging",
        env!("CARGO_PKG_VERSION")
    );
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    color_eyre::install()?;
    let args = Cli::parse();
    if args.verbose {
        setup_verbose_logging()?;
    }

    let settings = Settings {
        address: args.address.clone(),
        page_size: args.limit.max(1),
        refresh_interval: args.interval,
        desktop_notify: !args.no_notify,
    };
    let mut state = AppState::new(settings);

    // Event channel first: the connection forwards daemon pushes into it.
    let events = EventHandler::new(Duration::from_millis(100));
    let tx = events.sender();

    // Startup validation: no reachable daemon, no UI.
    let client = match ApiClient::connect(&args.address, tx.clone()).await {
        Ok(client) => client,
        Err(e) => {
            eprintln!("Error: {e}");
            std::process::exit(1);
        }
    };

    // Setup terminal with panic hook
    let original_hook = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |panic_info| {
        let _ = terminal::disable_raw_mode();
        let _ = execute!(io::stdout(), LeaveAlternateScreen);
        original_hook(panic_info);
    }));

    terminal::enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;
    terminal.clear()?;

    events::spawn_refresher(state.settings.refresh_interval, tx.clone());

    // First navigation: an explicit --open location, or the default route.
    let initial = args
        .open
        .clone()
        .unwrap_or_else(|| state.router.default_location());
    go(&mut state, &client, &tx, &initial);

    let result = run_app(&mut terminal, &mut state, events, &tx, &client).await;

    // Restore terminal
    terminal::disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    result
}

async fn run_app(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    state: &mut AppState,
    mut events: EventHandler,
    tx: &UnboundedSender<AppEvent>,
    client: &ApiClient,
) -> Result<()> {
    let mut last_tick = Instant::now();

    loop {
        terminal.draw(|f| tui::render::render(f, state))?;
        state.prune_error();

        if let Some(event) = events.next().await {
            match event {
                AppEvent::Key(key) => {
                    let ctx = InputContext {
                        prompt_open: state.prompt.is_some(),
                        has_error: state.error_message().is_some(),
                        is_loading: state.is_loading(),
                    };
                    match input::map_key(key, ctx) {
                        Action::Quit => state.should_quit = true,
                        Action::DismissError => state.clear_error(),
                        Action::MoveUp => move_focus(state, -1),
                        Action::MoveDown => move_focus(state, 1),
                        Action::PageNext => change_page(state, client, tx, 1),
                        Action::PagePrev => change_page(state, client, tx, -1),
                        Action::NextTab => cycle_tab(state, client, tx, true),
                        Action::PrevTab => cycle_tab(state, client, tx, false),
                        Action::CycleView => cycle_view(state, client, tx),
                        Action::QuickApp(n) => quick_app(state, client, tx, n),
                        Action::Activate => activate(state, client, tx),
                        Action::Append => append_focused(state, client, tx),
                        Action::ClearQueue => {
                            commands::control(client, "queue_clear", json!({}), tx.clone());
                        }
                        Action::TogglePlay => {
                            commands::control(client, "player_play_pause", json!({}), tx.clone());
                        }
                        Action::NextSong => {
                            commands::control(client, "player_next", json!({}), tx.clone());
                        }
                        Action::PrevSong => {
                            commands::control(client, "player_prev", json!({}), tx.clone());
                        }
                        Action::ReverseSort => reverse_sort(state, client, tx),
                        Action::Refresh => refresh_current(state, client, tx),
                        Action::OpenGoto => state.open_prompt(PromptKind::Goto),
                        Action::OpenSearch => state.open_prompt(PromptKind::Search),
                        Action::PromptChar(c) => state.prompt_push(c),
                        Action::PromptBackspace => state.prompt_pop(),
                        Action::ClosePrompt => state.close_prompt(),
                        Action::PromptSubmit => submit_prompt(state, client, tx),
                        Action::None => {}
                    }
                }
                AppEvent::Tick => {
                    if last_tick.elapsed() >= Duration::from_millis(100) {
                        state.advance_spinner();
                        last_tick = Instant::now();
                    }
                }
                AppEvent::RefreshDue => refresh_current(state, client, tx),
                AppEvent::Fetched {
                    generation,
                    key,
                    payload,
                } => handle_fetch(state, generation, key, payload),
                AppEvent::Push(push) => {
                    tracing::debug!("daemon push: {}", push.event);
                    if let Some(version) = push.queue_version {
                        state.queue_version = Some(version);
                    }
                    refresh_current(state, client, tx);
                }
                AppEvent::Disconnected => {
                    state.connected = false;
                    state.set_error(i18n::t("disconnected").to_string());
                }
                AppEvent::Error(e) => state.set_error(e),
            }
        }

        if state.should_quit {
            return Ok(());
        }
    }
}

/// Routes a location string: resolves it, switches the visible view when the
/// triple changed (restoring that view's persisted cursor), and issues the
/// one fetch the resolved route maps to.
fn go(state: &mut AppState, client: &ApiClient, tx: &UnboundedSender<AppEvent>, location: &str) {
    let scroll = state.current_scroll();
    let nav = state.router.navigate(location, scroll);
    dispatch_navigation(state, client, tx, &nav);
}

fn dispatch_navigation(
    state: &mut AppState,
    client: &ApiClient,
    tx: &UnboundedSender<AppEvent>,
    nav: &Navigation,
) {
    if commands::spec_for(&nav.key).kind == FetchKind::List {
        if nav.view_changed {
            let stored = state.router.scroll_of(&nav.key);
            state.table_mut(&nav.key).focused = Some(stored);
        }
        state.table_mut(&nav.key).loading = true;
    }
    commands::dispatch(
        client,
        nav.key.clone(),
        &nav.params,
        nav.generation,
        state.settings.page_size,
        tx.clone(),
    );
}

fn refresh_current(state: &mut AppState, client: &ApiClient, tx: &UnboundedSender<AppEvent>) {
    if let Some(nav) = state.router.refresh() {
        dispatch_navigation(state, client, tx, &nav);
    }
}

fn handle_fetch(
    state: &mut AppState,
    generation: u64,
    key: RouteKey,
    payload: Result<FetchPayload, String>,
) {
    let song_changed = state.apply_fetch(generation, &key, payload);
    if song_changed && state.settings.desktop_notify {
        if let Some(song) = state.playback.as_ref().and_then(|p| p.song.as_ref()) {
            notify::now_playing(song);
        }
    }
}

fn move_focus(state: &mut AppState, delta: isize) {
    if let Some(key) = state.router.current_key() {
        state.table_mut(&key).move_focus(delta);
    }
}

fn change_page(
    state: &mut AppState,
    client: &ApiClient,
    tx: &UnboundedSender<AppEvent>,
    delta: i64,
) {
    let Some(params) = state.router.current_params() else {
        return;
    };
    let next = if delta < 0 {
        match params.page.checked_sub(1) {
            Some(page) => page,
            None => return,
        }
    } else {
        let next = params.page + 1;
        // Don't run past the last page when the total is known.
        if let Some(set) = state.current_table() {
            if next >= set.pagination.page_count(state.settings.page_size) {
                return;
            }
        }
        next
    };
    if let Some(location) = state.router.relocate(Overrides::page(next)) {
        go(state, client, tx, &location);
    }
}

fn cycle_tab(
    state: &mut AppState,
    client: &ApiClient,
    tx: &UnboundedSender<AppEvent>,
    forward: bool,
) {
    let Some(key) = state.router.current_key() else {
        return;
    };
    let Some(target) = state.router.cycle_tab(&key, forward) else {
        return;
    };
    go_to_key(state, client, tx, &target);
}

fn cycle_view(state: &mut AppState, client: &ApiClient, tx: &UnboundedSender<AppEvent>) {
    let Some(key) = state.router.current_key() else {
        return;
    };
    let Some(target) = state.router.cycle_view(&key, true) else {
        return;
    };
    go_to_key(state, client, tx, &target);
}

fn go_to_key(
    state: &mut AppState,
    client: &ApiClient,
    tx: &UnboundedSender<AppEvent>,
    target: &RouteKey,
) {
    let location = state.router.location_for(
        &target.app,
        target.tab.as_deref(),
        target.view.as_deref(),
        Overrides::default(),
    );
    if let Some(location) = location {
        go(state, client, tx, &location);
    }
}

fn quick_app(
    state: &mut AppState,
    client: &ApiClient,
    tx: &UnboundedSender<AppEvent>,
    n: usize,
) {
    let name = state
        .router
        .app_names()
        .get(n - 1)
        .map(|s| (*s).to_string());
    if let Some(name) = name {
        let location = state
            .router
            .location_for(&name, None, None, Overrides::default());
        if let Some(location) = location {
            go(state, client, tx, &location);
        }
    }
}

/// Row activation: queue entries start playing, songs elsewhere are appended
/// to the queue, containers navigate into their contents.
fn activate(state: &mut AppState, client: &ApiClient, tx: &UnboundedSender<AppEvent>) {
    let Some(item) = state.current_table().and_then(|t| t.focused_item()).cloned() else {
        return;
    };
    match item {
        Item::Song(song) => match song.id {
            Some(id) => commands::control(client, "player_play_id", json!({"songId": id}), tx.clone()),
            None => commands::control(client, "queue_append", json!({"uri": song.uri}), tx.clone()),
        },
        Item::Dir(dir) => {
            let location = state.router.location_for(
                "Browse",
                Some("Filesystem"),
                None,
                Overrides::search(dir.uri),
            );
            if let Some(location) = location {
                go(state, client, tx, &location);
            }
        }
        Item::Plist(plist) => {
            let location = state.router.location_for(
                "Browse",
                Some("Playlist"),
                Some("Detail"),
                Overrides::tag(plist.name),
            );
            if let Some(location) = location {
                go(state, client, tx, &location);
            }
        }
        Item::Album(album) => {
            let overrides = Overrides {
                filter: Some("Album".to_string()),
                search: Some(album.album),
                page: Some(0),
                ..Overrides::default()
            };
            let location = state.router.location_for("Search", None, None, overrides);
            if let Some(location) = location {
                go(state, client, tx, &location);
            }
        }
        Item::Tag(tag) => {
            let location = state.router.location_for(
                "Browse",
                Some("Database"),
                Some("AlbumList"),
                Overrides::tag(tag.value),
            );
            if let Some(location) = location {
                go(state, client, tx, &location);
            }
        }
    }
}

fn append_focused(state: &mut AppState, client: &ApiClient, tx: &UnboundedSender<AppEvent>) {
    let uri = state
        .current_table()
        .and_then(|t| t.focused_item())
        .and_then(|item| item.uri())
        .map(str::to_string);
    if let Some(uri) = uri {
        commands::control(client, "queue_append", json!({"uri": uri}), tx.clone());
    }
}

fn reverse_sort(state: &mut AppState, client: &ApiClient, tx: &UnboundedSender<AppEvent>) {
    let Some(params) = state.router.current_params() else {
        return;
    };
    // "-" alone means unsorted; only a real tag can flip direction.
    if params.sort == "-" {
        return;
    }
    let sort = match params.sort.strip_prefix('-') {
        Some(rest) => rest.to_string(),
        None => format!("-{}", params.sort),
    };
    let overrides = Overrides {
        sort: Some(sort),
        ..Overrides::default()
    };
    if let Some(location) = state.router.relocate(overrides) {
        go(state, client, tx, &location);
    }
}

fn submit_prompt(state: &mut AppState, client: &ApiClient, tx: &UnboundedSender<AppEvent>) {
    let Some((kind, text)) = state.take_prompt() else {
        return;
    };
    match kind {
        PromptKind::Goto => go(state, client, tx, text.trim()),
        PromptKind::Search => {
            let location = state
                .router
                .location_for("Search", None, None, Overrides::search(text));
            if let Some(location) = location {
                go(state, client, tx, &location);
            }
        }
    }
}
