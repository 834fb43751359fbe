//! Session event log - JSON lines audit trail
//!
//! When `CONNECT4_LOG_PATH` is set, every session event is serialized as one
//! JSON object per line and appended to that file by a single background task.
//! Sessions only push records into an unbounded channel, so a slow or broken
//! log file never stalls a game.

use serde::Serialize;
use tokio::sync::mpsc;

use crate::core::DropError;
use crate::types::{GameMode, GameStatus, Mover, Placement};

/// One line of the session log.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum SessionEvent {
    SessionStarted {
        session: u64,
        mode: &'static str,
        ui_flag: bool,
        ts: u64,
    },
    MoveApplied {
        session: u64,
        turn: u32,
        mover: &'static str,
        row: u8,
        column: u8,
        ts: u64,
    },
    MoveRejected {
        session: u64,
        turn: u32,
        mover: &'static str,
        column: i32,
        reason: String,
        ts: u64,
    },
    SessionFinished {
        session: u64,
        status: &'static str,
        turns: u32,
        ts: u64,
    },
    SessionAborted {
        session: u64,
        error: String,
        ts: u64,
    },
}

impl SessionEvent {
    pub fn started(session: u64, mode: GameMode, ui_flag: bool) -> Self {
        SessionEvent::SessionStarted {
            session,
            mode: mode.as_str(),
            ui_flag,
            ts: current_timestamp_ms(),
        }
    }

    pub fn applied(session: u64, turn: u32, placement: Placement) -> Self {
        SessionEvent::MoveApplied {
            session,
            turn,
            mover: placement.mover.as_str(),
            row: placement.row,
            column: placement.column,
            ts: current_timestamp_ms(),
        }
    }

    pub fn rejected(session: u64, turn: u32, mover: Mover, err: &DropError) -> Self {
        SessionEvent::MoveRejected {
            session,
            turn,
            mover: mover.as_str(),
            column: err.column(),
            reason: err.to_string(),
            ts: current_timestamp_ms(),
        }
    }

    pub fn finished(session: u64, status: GameStatus, turns: u32) -> Self {
        SessionEvent::SessionFinished {
            session,
            status: status.as_str(),
            turns,
            ts: current_timestamp_ms(),
        }
    }

    pub fn aborted(session: u64, error: String) -> Self {
        SessionEvent::SessionAborted {
            session,
            error,
            ts: current_timestamp_ms(),
        }
    }
}

/// Cloneable handle sessions use to record events. A disabled log drops them.
#[derive(Debug, Clone, Default)]
pub struct EventLog {
    tx: Option<mpsc::UnboundedSender<SessionEvent>>,
}

impl EventLog {
    pub fn disabled() -> Self {
        Self { tx: None }
    }

    /// Start the writer task appending to `path`. Must be called inside a runtime.
    pub fn spawn_file_writer(path: String) -> Self {
        let (tx, mut rx) = mpsc::unbounded_channel::<SessionEvent>();
        tokio::spawn(async move {
            use tokio::fs::OpenOptions;
            use tokio::io::AsyncWriteExt;

            let mut file = match OpenOptions::new().create(true).append(true).open(&path).await {
                Ok(f) => f,
                Err(e) => {
                    log::warn!("session log {} unavailable: {}", path, e);
                    return;
                }
            };

            let mut buf: Vec<u8> = Vec::with_capacity(256);

            while let Some(event) = rx.recv().await {
                buf.clear();
                if serde_json::to_writer(&mut buf, &event).is_err() {
                    continue;
                }
                buf.push(b'\n');
                if file.write_all(&buf).await.is_err() {
                    break;
                }
                if file.flush().await.is_err() {
                    break;
                }
            }

            let _ = file.flush().await;
        });
        Self { tx: Some(tx) }
    }

    /// Channel-backed log for tests
    pub fn channel() -> (Self, mpsc::UnboundedReceiver<SessionEvent>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self { tx: Some(tx) }, rx)
    }

    pub fn record(&self, event: SessionEvent) {
        if let Some(tx) = self.tx.as_ref() {
            let _ = tx.send(event);
        }
    }
}

/// Get current timestamp in milliseconds
fn current_timestamp_ms() -> u64 {
    use std::time::{SystemTime, UNIX_EPOCH};
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_millis() as u64
}
