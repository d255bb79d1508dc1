//! Persistent daemon connection: newline-delimited JSON over TCP.
//!
//! One writer task owns the socket's write half and drains outgoing request
//! lines; one reader task parses incoming lines, completes the pending
//! request matching the reply id, and forwards id-less daemon pushes to the
//! event loop. When the connection dies, every still-pending request is
//! completed with an error and a `Disconnected` event is emitted.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};

use color_eyre::eyre::{eyre, Result};
use serde_json::{json, Value};
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::net::TcpStream;
use tokio::sync::{mpsc, oneshot};

use crate::api::parser::{self, Incoming};
use crate::events::AppEvent;

type Outcome = std::result::Result<Value, String>;
type Pending = Arc<Mutex<HashMap<u64, oneshot::Sender<Outcome>>>>;

fn lock_pending(pending: &Pending) -> MutexGuard<'_, HashMap<u64, oneshot::Sender<Outcome>>> {
    match pending.lock() {
        Ok(guard) => guard,
        Err(poisoned) => poisoned.into_inner(),
    }
}

#[derive(Clone)]
pub struct ApiClient {
    out_tx: mpsc::UnboundedSender<String>,
    pending: Pending,
    next_id: Arc<AtomicU64>,
}

impl ApiClient {
    pub async fn connect(addr: &str, events: mpsc::UnboundedSender<AppEvent>) -> Result<Self> {
        let stream = TcpStream::connect(addr)
            .await
            .map_err(|e| eyre!("Cannot reach daemon at {addr}: {e}"))?;
        let (read_half, mut write_half) = stream.into_split();
        let pending: Pending = Arc::new(Mutex::new(HashMap::new()));
        let (out_tx, mut out_rx) = mpsc::unbounded_channel::<String>();

        tokio::spawn(async move {
            while let Some(line) = out_rx.recv().await {
                if write_half.write_all(line.as_bytes()).await.is_err() {
                    break;
                }
                if write_half.write_all(b"\n").await.is_err() {
                    break;
                }
            }
        });

        let reader_pending = pending.clone();
        tokio::spawn(async move {
            let mut lines = BufReader::new(read_half).lines();
            loop {
                match lines.next_line().await {
                    Ok(Some(line)) => match parser::parse_incoming(&line) {
                        Ok(Incoming::Reply { id, outcome }) => {
                            let sender = lock_pending(&reader_pending).remove(&id);
                            match sender {
                                Some(sender) => {
                                    let _ = sender.send(outcome);
                                }
                                None => tracing::debug!("reply for unknown request id {id}"),
                            }
                        }
                        Ok(Incoming::Push(push)) => {
                            if events.send(AppEvent::Push(push)).is_err() {
                                break;
                            }
                        }
                        Err(e) => tracing::warn!("unparseable line from daemon: {e}"),
                    },
                    Ok(None) => break,
                    Err(e) => {
                        tracing::warn!("daemon read failed: {e}");
                        break;
                    }
                }
            }
            for (_, sender) in lock_pending(&reader_pending).drain() {
                let _ = sender.send(Err("connection closed".to_string()));
            }
            let _ = events.send(AppEvent::Disconnected);
        });

        Ok(Self {
            out_tx,
            pending,
            next_id: Arc::new(AtomicU64::new(1)),
        })
    }

    /// Issues one named command with a flat parameter map and awaits its
    /// result payload. Failures the daemon reports come back as the error
    /// message; transport loss reads the same way.
    pub async fn call(&self, method: &str, params: Value) -> Outcome {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let (tx, rx) = oneshot::channel();
        lock_pending(&self.pending).insert(id, tx);

        let request = json!({ "id": id, "method": method, "params": params });
        if self.out_tx.send(request.to_string()).is_err() {
            lock_pending(&self.pending).remove(&id);
            return Err("connection closed".to_string());
        }

        match rx.await {
            Ok(outcome) => outcome,
            Err(_) => Err("connection closed".to_string()),
        }
    }
}
