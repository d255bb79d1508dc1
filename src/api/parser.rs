use color_eyre::eyre::{eyre, Result};
use serde_json::Value;

use crate::app::{Item, PlayerState, Stats};

/// Envelope of one line received from the daemon. Replies carry the request
/// id and exactly one of `result` or `error`; daemon pushes carry `event`
/// and no id.
#[derive(serde::Deserialize)]
struct Envelope {
    #[serde(default)]
    id: Option<u64>,
    #[serde(default)]
    result: Option<Value>,
    #[serde(default)]
    error: Option<WireError>,
    #[serde(default)]
    event: Option<String>,
    #[serde(default, rename = "queueVersion")]
    queue_version: Option<u64>,
}

#[derive(serde::Deserialize)]
struct WireError {
    message: String,
}

/// Unsolicited daemon notification.
#[derive(Debug, Clone)]
pub struct Push {
    pub event: String,
    pub queue_version: Option<u64>,
}

#[derive(Debug)]
pub enum Incoming {
    Reply {
        id: u64,
        outcome: std::result::Result<Value, String>,
    },
    Push(Push),
}

pub fn parse_incoming(line: &str) -> Result<Incoming> {
    let envelope: Envelope = serde_json::from_str(line)?;
    if let Some(id) = envelope.id {
        let outcome = match (envelope.result, envelope.error) {
            (Some(result), _) => Ok(result),
            (None, Some(error)) => Err(error.message),
            (None, None) => Err("response carries neither result nor error".to_string()),
        };
        return Ok(Incoming::Reply { id, outcome });
    }
    if let Some(event) = envelope.event {
        return Ok(Incoming::Push(Push {
            event,
            queue_version: envelope.queue_version,
        }));
    }
    Err(eyre!("line is neither a reply nor an event"))
}

/// Payload of every list command: one page of records plus bookkeeping.
#[derive(Debug, Clone, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListResult {
    #[serde(default)]
    pub data: Vec<Item>,
    pub returned_entities: u64,
    pub total_entities: u64,
    #[serde(default)]
    pub total_time: Option<u64>,
    #[serde(default)]
    pub queue_version: Option<u64>,
}

pub fn parse_list(result: Value) -> Result<ListResult> {
    Ok(serde_json::from_value(result)?)
}

pub fn parse_player(result: Value) -> Result<PlayerState> {
    Ok(serde_json::from_value(result)?)
}

pub fn parse_stats(result: Value) -> Result<Stats> {
    Ok(serde_json::from_value(result)?)
}
