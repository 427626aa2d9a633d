//! Realtime change feed listener
//!
//! Maintains a websocket connection to the realtime endpoint, joins
//! the channel for the applications table, and translates incoming
//! frames into [`ChangeEvent`]s. The connection is re-established with
//! exponential backoff after a drop; the task ends once the receiving
//! side of the channel is gone.
//!
//! Frames that cannot be parsed are logged and skipped - the feed is a
//! trigger for reconciliation, not a data source, so a lost or
//! malformed frame at worst delays one reload until the next event.

use std::time::Duration;

use anyhow::{Context, Result};
use futures_util::{SinkExt, StreamExt};
use serde_json::{json, Value};
use tokio::sync::mpsc;
use tokio_tungstenite::connect_async;
use tokio_tungstenite::tungstenite::Message;
use tracing::{debug, warn};

use super::{ChangeEvent, ChangeKind};

const HEARTBEAT_INTERVAL: Duration = Duration::from_secs(30);
const MAX_RECONNECT_DELAY: Duration = Duration::from_secs(30);

/// Run the feed until the receiver side is dropped
pub(super) async fn run(
    url: String,
    api_key: String,
    table: String,
    tx: mpsc::Sender<ChangeEvent>,
) {
    let mut reconnect_delay = Duration::from_secs(1);

    loop {
        match connect_and_listen(&url, &api_key, &table, &tx).await {
            Ok(()) => {
                // Normal disconnect, reset backoff
                reconnect_delay = Duration::from_secs(1);
            }
            Err(e) => {
                warn!("Change feed connection failed: {:#}", e);
                reconnect_delay = (reconnect_delay * 2).min(MAX_RECONNECT_DELAY);
            }
        }

        if tx.is_closed() {
            debug!("Change feed consumer gone, stopping listener");
            break;
        }

        tokio::time::sleep(reconnect_delay).await;
    }
}

/// One connection lifetime: join the channel, forward events, send
/// heartbeats
async fn connect_and_listen(
    url: &str,
    api_key: &str,
    table: &str,
    tx: &mpsc::Sender<ChangeEvent>,
) -> Result<()> {
    let ws_url = format!("{}?apikey={}&vsn=1.0.0", url, api_key);
    let (ws_stream, _response) = connect_async(&ws_url)
        .await
        .context("Failed to connect to realtime endpoint")?;
    debug!("Connected to change feed");

    let (mut write, mut read) = ws_stream.split();

    let topic = format!("realtime:public:{}", table);
    let join_ref = uuid::Uuid::new_v4().to_string();
    let join = json!({
        "topic": topic,
        "event": "phx_join",
        "payload": {},
        "ref": join_ref,
    });
    write.send(Message::Text(join.to_string())).await?;

    let mut heartbeat = tokio::time::interval(HEARTBEAT_INTERVAL);
    heartbeat.tick().await; // first tick fires immediately

    loop {
        tokio::select! {
            msg = read.next() => {
                match msg {
                    Some(Ok(Message::Text(text))) => {
                        if let Some(event) = parse_event(&text) {
                            debug!(kind = ?event.kind, id = ?event.id, "change notification");
                            if tx.send(event).await.is_err() {
                                // Consumer dropped the feed
                                return Ok(());
                            }
                        }
                    }
                    Some(Ok(Message::Close(_))) | None => return Ok(()),
                    Some(Err(e)) => return Err(e).context("Websocket read failed"),
                    _ => {}
                }
            }
            _ = heartbeat.tick() => {
                let beat = json!({
                    "topic": "phoenix",
                    "event": "heartbeat",
                    "payload": {},
                    "ref": uuid::Uuid::new_v4().to_string(),
                });
                write.send(Message::Text(beat.to_string())).await?;
            }
        }
    }
}

/// Translate one frame into a change event
///
/// Returns `None` for protocol frames (join replies, heartbeats) and
/// anything that does not parse as a table change.
fn parse_event(text: &str) -> Option<ChangeEvent> {
    let frame: Value = match serde_json::from_str(text) {
        Ok(v) => v,
        Err(e) => {
            warn!("Skipping unparseable feed frame: {}", e);
            return None;
        }
    };

    let kind: ChangeKind = serde_json::from_value(frame.get("event")?.clone()).ok()?;

    // The row id is advisory; delete events carry it under old_record
    let payload = frame.get("payload");
    let id = payload
        .and_then(|p| p.get("record").or_else(|| p.get("old_record")))
        .and_then(|r| r.get("id"))
        .and_then(|v| v.as_str())
        .map(String::from);

    Some(ChangeEvent { kind, id })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_insert_event() {
        let frame = r#"{
            "topic": "realtime:public:applications",
            "event": "INSERT",
            "payload": {"record": {"id": "abc-123", "name": "Ana"}},
            "ref": null
        }"#;
        let event = parse_event(frame).unwrap();
        assert_eq!(event.kind, ChangeKind::Insert);
        assert_eq!(event.id.as_deref(), Some("abc-123"));
    }

    #[test]
    fn test_parse_delete_uses_old_record() {
        let frame = r#"{
            "topic": "realtime:public:applications",
            "event": "DELETE",
            "payload": {"old_record": {"id": "gone"}},
            "ref": null
        }"#;
        let event = parse_event(frame).unwrap();
        assert_eq!(event.kind, ChangeKind::Delete);
        assert_eq!(event.id.as_deref(), Some("gone"));
    }

    #[test]
    fn test_protocol_frames_are_ignored() {
        let join_reply = r#"{
            "topic": "realtime:public:applications",
            "event": "phx_reply",
            "payload": {"status": "ok"},
            "ref": "1"
        }"#;
        assert!(parse_event(join_reply).is_none());
        assert!(parse_event("not json at all").is_none());
    }

    #[test]
    fn test_missing_id_is_still_an_event() {
        // A partial payload must still trigger reconciliation
        let frame = r#"{"event": "UPDATE", "payload": {}}"#;
        let event = parse_event(frame).unwrap();
        assert_eq!(event.kind, ChangeKind::Update);
        assert!(event.id.is_none());
    }
}
