//! Protocol client - the player side of the exchange
//!
//! No rendering and no prompting: callers decide which column to send and
//! what to do with the broadcasts. Used by the bot binary and by tests.

use tokio::io::{AsyncRead, AsyncWrite, AsyncWriteExt};
use tokio::net::TcpStream;

use crate::protocol::{self, MoveNotice};
use crate::types::{GameMode, GameStatus, Mover};

pub struct GameClient<S> {
    stream: S,
    mover: Option<Mover>,
}

impl GameClient<TcpStream> {
    pub async fn connect(addr: &str) -> std::io::Result<Self> {
        let stream = TcpStream::connect(addr).await?;
        stream.set_nodelay(true)?;
        Ok(Self::new(stream))
    }
}

impl<S> GameClient<S>
where
    S: AsyncRead + AsyncWrite + Unpin,
{
    pub fn new(stream: S) -> Self {
        Self {
            stream,
            mover: None,
        }
    }

    /// Identity assigned by the server, once received
    pub fn mover(&self) -> Option<Mover> {
        self.mover
    }

    /// Read the identity the server assigns to this connection
    pub async fn read_identity(&mut self) -> std::io::Result<Mover> {
        let mover = protocol::read_identity(&mut self.stream).await?;
        self.mover = Some(mover);
        Ok(mover)
    }

    /// First player only: send the opaque UI flag and the game mode
    pub async fn send_setup(&mut self, ui_flag: bool, mode: GameMode) -> std::io::Result<()> {
        protocol::write_bool(&mut self.stream, ui_flag).await?;
        protocol::write_bool(&mut self.stream, mode.flag()).await?;
        self.stream.flush().await
    }

    /// Second player only: read the UI flag forwarded from the first player
    pub async fn read_ui_flag(&mut self) -> std::io::Result<bool> {
        protocol::read_bool(&mut self.stream).await
    }

    /// First player in a pvp game: wait until the opponent has joined
    pub async fn wait_for_opponent(&mut self) -> std::io::Result<()> {
        protocol::read_identity(&mut self.stream).await?;
        Ok(())
    }

    /// Send a 1-based column and return whether the server accepted it
    pub async fn send_column(&mut self, column: i32) -> std::io::Result<bool> {
        protocol::write_i32(&mut self.stream, column).await?;
        self.stream.flush().await?;
        protocol::read_bool(&mut self.stream).await
    }

    pub async fn read_move(&mut self) -> std::io::Result<MoveNotice> {
        protocol::read_move(&mut self.stream).await
    }

    pub async fn read_status(&mut self) -> std::io::Result<GameStatus> {
        protocol::read_status(&mut self.stream).await
    }

    /// Read one full broadcast: placement then status
    pub async fn read_update(&mut self) -> std::io::Result<(MoveNotice, GameStatus)> {
        let notice = self.read_move().await?;
        let status = self.read_status().await?;
        Ok((notice, status))
    }
}
