//! Player connection - one human participant's stream inside a session
//!
//! Wraps any `AsyncRead + AsyncWrite` stream (a `TcpStream` in production,
//! in-memory pipes in tests) together with the mover it plays for. Every read
//! can be bounded by a deadline so a stalled peer cannot pin a session forever.

use std::time::Duration;

use tokio::io::{AsyncRead, AsyncWrite, AsyncWriteExt};

use crate::protocol::{self, ServerMessage};
use crate::session::SessionError;
use crate::types::Mover;

pub struct PlayerConn<S> {
    stream: S,
    mover: Mover,
    read_timeout: Option<Duration>,
    buf: Vec<u8>,
}

impl<S> PlayerConn<S>
where
    S: AsyncRead + AsyncWrite + Unpin,
{
    pub fn new(stream: S, mover: Mover, read_timeout: Option<Duration>) -> Self {
        Self {
            stream,
            mover,
            read_timeout,
            buf: Vec::with_capacity(16),
        }
    }

    pub fn mover(&self) -> Mover {
        self.mover
    }

    /// Encode and flush one message
    pub async fn send(&mut self, msg: ServerMessage) -> Result<(), SessionError> {
        self.buf.clear();
        msg.encode_into(&mut self.buf);
        self.stream.write_all(&self.buf).await?;
        self.stream.flush().await?;
        Ok(())
    }

    /// Read the next 1-based column choice
    pub async fn recv_column(&mut self) -> Result<i32, SessionError> {
        let mover = self.mover;
        match self.read_timeout {
            Some(limit) => tokio::time::timeout(limit, protocol::read_i32(&mut self.stream))
                .await
                .map_err(|_| SessionError::Timeout { mover })?
                .map_err(SessionError::from),
            None => Ok(protocol::read_i32(&mut self.stream).await?),
        }
    }

    /// Read one boolean flag
    pub async fn recv_flag(&mut self) -> Result<bool, SessionError> {
        let mover = self.mover;
        match self.read_timeout {
            Some(limit) => tokio::time::timeout(limit, protocol::read_bool(&mut self.stream))
                .await
                .map_err(|_| SessionError::Timeout { mover })?
                .map_err(SessionError::from),
            None => Ok(protocol::read_bool(&mut self.stream).await?),
        }
    }

    /// Flush and close the write side; errors are ignored since the game is over
    pub async fn close(&mut self) {
        let _ = self.stream.flush().await;
        let _ = self.stream.shutdown().await;
    }

    pub fn set_read_timeout(&mut self, read_timeout: Option<Duration>) {
        self.read_timeout = read_timeout;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::io::AsyncReadExt;

    #[tokio::test]
    async fn test_send_writes_wire_bytes() {
        let (server_side, mut client_side) = tokio::io::duplex(64);
        let mut conn = PlayerConn::new(server_side, Mover::B, None);
        conn.send(ServerMessage::Identity(Mover::B)).await.unwrap();
        conn.send(ServerMessage::UiMode(true)).await.unwrap();

        let mut got = [0u8; 5];
        client_side.read_exact(&mut got).await.unwrap();
        assert_eq!(got, [0, 0, 0, 2, 1]);
    }

    #[tokio::test]
    async fn test_recv_column_times_out() {
        let (server_side, _client_side) = tokio::io::duplex(64);
        let mut conn = PlayerConn::new(server_side, Mover::A, Some(Duration::from_millis(20)));
        let err = conn.recv_column().await.unwrap_err();
        assert!(matches!(err, SessionError::Timeout { mover: Mover::A }));
    }

    #[tokio::test]
    async fn test_recv_column_after_disconnect_is_connection_error() {
        let (server_side, client_side) = tokio::io::duplex(64);
        drop(client_side);
        let mut conn = PlayerConn::new(server_side, Mover::A, None);
        let err = conn.recv_column().await.unwrap_err();
        assert!(matches!(err, SessionError::Connection(_)));
    }
}
