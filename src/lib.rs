//! Connect Four server (workspace facade crate).
//!
//! Re-exports `connect4::{core,server,types}` while the implementation lives
//! in dedicated crates under `crates/`.

pub use connect4_core as core;
pub use connect4_server as server;
pub use connect4_types as types;
