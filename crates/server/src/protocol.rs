//! Protocol module - binary message vocabulary between server and players
//!
//! Every value is either a big-endian 32-bit signed integer or a one-byte
//! boolean (written as 0/1, any non-zero byte reads as `true`). Messages carry
//! no framing or type tags; both sides know what comes next from the
//! position in the exchange.
//!
//! ```text
//! S -> P1: i32 identity (1)
//! P1 -> S: bool ui flag, bool game-mode flag (true = pvp)
//! S -> P2: i32 identity (2), bool ui flag            (pvp only)
//! S -> P1: i32 identity (1)                          (pvp session start)
//! loop:
//!   active -> S: i32 column (1-based)
//!   S -> active: bool accepted                        (repeat until true)
//!   S -> each: i32 row, i32 column, bool mine
//!   S -> each: i32 status (1 = A wins, 2 = B wins, 3 = tie, 4 = continue)
//! ```

use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};

use crate::types::{GameStatus, Mover, Placement};

/// Message sent from the server to one connection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ServerMessage {
    /// Player identity assignment, also reused as the pvp session-start notice
    Identity(Mover),
    /// UI-mode flag forwarded from the first player to the second
    UiMode(bool),
    /// Acknowledgement of a column choice
    MoveAccepted(bool),
    /// Placement broadcast, tagged relative to the receiving connection
    Move { row: u8, column: u8, mine: bool },
    Status(GameStatus),
}

impl ServerMessage {
    /// Move broadcast of `placement` as seen by `viewer`
    pub fn move_for(placement: Placement, viewer: Mover) -> Self {
        ServerMessage::Move {
            row: placement.row,
            column: placement.column,
            mine: placement.mover == viewer,
        }
    }

    /// Append the wire encoding to `buf`
    pub fn encode_into(&self, buf: &mut Vec<u8>) {
        match *self {
            ServerMessage::Identity(mover) => put_i32(buf, mover.id()),
            ServerMessage::UiMode(flag) | ServerMessage::MoveAccepted(flag) => put_bool(buf, flag),
            ServerMessage::Move { row, column, mine } => {
                put_i32(buf, row as i32);
                put_i32(buf, column as i32);
                put_bool(buf, mine);
            }
            ServerMessage::Status(status) => put_i32(buf, status.code()),
        }
    }

    pub fn encode(&self) -> Vec<u8> {
        let mut buf = Vec::with_capacity(9);
        self.encode_into(&mut buf);
        buf
    }
}

/// Move broadcast as decoded by a client
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MoveNotice {
    pub row: i32,
    pub column: i32,
    pub mine: bool,
}

#[inline]
pub fn put_i32(buf: &mut Vec<u8>, value: i32) {
    buf.extend_from_slice(&value.to_be_bytes());
}

#[inline]
pub fn put_bool(buf: &mut Vec<u8>, value: bool) {
    buf.push(u8::from(value));
}

pub async fn read_i32<R: AsyncRead + Unpin>(reader: &mut R) -> std::io::Result<i32> {
    reader.read_i32().await
}

pub async fn read_bool<R: AsyncRead + Unpin>(reader: &mut R) -> std::io::Result<bool> {
    Ok(reader.read_u8().await? != 0)
}

pub async fn write_i32<W: AsyncWrite + Unpin>(writer: &mut W, value: i32) -> std::io::Result<()> {
    writer.write_all(&value.to_be_bytes()).await
}

pub async fn write_bool<W: AsyncWrite + Unpin>(writer: &mut W, value: bool) -> std::io::Result<()> {
    writer.write_all(&[u8::from(value)]).await
}

/// Read a move broadcast (row, column, mine)
pub async fn read_move<R: AsyncRead + Unpin>(reader: &mut R) -> std::io::Result<MoveNotice> {
    let row = read_i32(reader).await?;
    let column = read_i32(reader).await?;
    let mine = read_bool(reader).await?;
    Ok(MoveNotice { row, column, mine })
}

/// Read a status code, rejecting values outside the protocol
pub async fn read_status<R: AsyncRead + Unpin>(reader: &mut R) -> std::io::Result<GameStatus> {
    let code = read_i32(reader).await?;
    GameStatus::from_code(code).ok_or_else(|| {
        std::io::Error::new(
            std::io::ErrorKind::InvalidData,
            format!("unknown status code {}", code),
        )
    })
}

/// Read an identity code, rejecting values outside the protocol
pub async fn read_identity<R: AsyncRead + Unpin>(reader: &mut R) -> std::io::Result<Mover> {
    let id = read_i32(reader).await?;
    Mover::from_id(id).ok_or_else(|| {
        std::io::Error::new(
            std::io::ErrorKind::InvalidData,
            format!("unknown player identity {}", id),
        )
    })
}
