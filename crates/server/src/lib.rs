//! Game server - sessions over TCP with a binary protocol
//!
//! This crate lets two remote players, or one player and the computer, play
//! a game whose rules are enforced only by the server.
//!
//! # Protocol Overview
//!
//! The protocol is a fixed sequence of big-endian `i32` values and one-byte
//! booleans over a plain TCP stream (default port 8004):
//!
//! 1. **Identity**: the first connection receives `1` (mover A)
//! 2. **Setup**: it answers with a UI flag (opaque, forwarded) and a
//!    game-mode flag (`true` = player vs player)
//! 3. **Pairing**: for player vs player the next connection after the setup
//!    receives `2` and the UI flag, then the first player receives `1` again
//!    as the start signal
//! 4. **Moves**: the active player sends a column, the server answers
//!    `true`/`false`; on `true` every player receives `(row, column, mine)`
//!    followed by a status code
//!
//! See [`protocol`] for the exact encoding.
//!
//! # Environment Variables
//!
//! - `CONNECT4_HOST`: Bind address (default: "0.0.0.0")
//! - `CONNECT4_PORT`: Port number (default: 8004)
//! - `CONNECT4_MOVE_TIMEOUT_SECS`: Per-move read deadline, `0` disables (default: 300)
//! - `CONNECT4_HANDSHAKE_TIMEOUT_SECS`: Setup read deadline, `0` disables (default: 30)
//! - `CONNECT4_LOG_PATH`: Append a JSON line per session event to this file
//! - `CONNECT4_COMPUTER_SEED`: Make computer opponents reproducible
//!
//! # Implementation
//!
//! - Uses **tokio** for async networking
//! - One task per session; the board never leaves its session
//! - A failed connection ends only its own session
//! - See [`server`] for the accept loop and [`session`] for the game loops

pub mod client;
pub mod connection;
pub mod event_log;
pub mod protocol;
pub mod server;
pub mod session;

pub use connect4_core as core;
pub use connect4_types as types;

pub use client::GameClient;
pub use connection::PlayerConn;
pub use event_log::{EventLog, SessionEvent};
pub use protocol::{MoveNotice, ServerMessage};
pub use server::{check_tcp_listen_available, run_server, serve, ServerConfig, ServerContext};
pub use session::{Session, SessionError, SessionOutcome};
