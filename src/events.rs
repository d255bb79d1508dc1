use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::JoinHandle;
use std::time::Duration;

use crossterm::event::{self, Event as CrosstermEvent, KeyEvent};
use tokio::sync::mpsc;

use crate::api::parser::{ListResult, Push};
use crate::app::{PlayerState, Stats};
use crate::route::RouteKey;

#[derive(Debug)]
pub enum FetchPayload {
    List { list: ListResult, page: u64 },
    Player(PlayerState),
    Stats(Stats),
}

#[derive(Debug)]
pub enum AppEvent {
    Key(KeyEvent),
    Tick,
    /// Periodic signal to re-issue the current view's fetch.
    RefreshDue,
    /// Completion of one fetch routine. Stale generations are discarded by
    /// the receiver, never applied.
    Fetched {
        generation: u64,
        key: RouteKey,
        payload: Result<FetchPayload, String>,
    },
    Push(Push),
    Disconnected,
    Error(String),
}

/// Bridges blocking terminal input into the async event channel. Keys are
/// read on a dedicated thread; poll timeouts double as ticks driving
/// spinner frames and error expiry. Everything else in the channel comes
/// from detached fetch tasks and the connection reader.
pub struct EventHandler {
    rx: mpsc::UnboundedReceiver<AppEvent>,
    tx: mpsc::UnboundedSender<AppEvent>,
    shutdown: Arc<AtomicBool>,
    input_thread: Option<JoinHandle<()>>,
}

impl EventHandler {
    pub fn new(tick_rate: Duration) -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        let shutdown = Arc::new(AtomicBool::new(false));

        let input_tx = tx.clone();
        let stop = shutdown.clone();
        let input_thread = std::thread::spawn(move || loop {
            if stop.load(Ordering::Relaxed) {
                break;
            }
            let event = match event::poll(tick_rate) {
                Ok(true) => match event::read() {
                    Ok(CrosstermEvent::Key(key)) => AppEvent::Key(key),
                    _ => continue,
                },
                Ok(false) => AppEvent::Tick,
                Err(_) => break,
            };
            if input_tx.send(event).is_err() {
                break;
            }
        });

        Self {
            rx,
            tx,
            shutdown,
            input_thread: Some(input_thread),
        }
    }

    pub fn sender(&self) -> mpsc::UnboundedSender<AppEvent> {
        self.tx.clone()
    }

    pub async fn next(&mut self) -> Option<AppEvent> {
        self.rx.recv().await
    }

    pub fn stop(&mut self) {
        self.shutdown.store(true, Ordering::Relaxed);
        if let Some(handle) = self.input_thread.take() {
            let _ = handle.join();
        }
    }
}

impl Drop for EventHandler {
    fn drop(&mut self) {
        self.stop();
    }
}

/// Fires `RefreshDue` forever at a fixed cadence so the visible view stays
/// live; ends when the receiving side goes away.
pub fn spawn_refresher(interval_secs: u64, tx: mpsc::UnboundedSender<AppEvent>) {
    tokio::spawn(async move {
        let period = Duration::from_secs(interval_secs.max(1));
        loop {
            tokio::time::sleep(period).await;
            if tx.send(AppEvent::RefreshDue).is_err() {
                break;
            }
        }
    });
}
