//! Session loops - one complete game from pairing to terminal status
//!
//! A session owns its board exclusively and talks to its connections strictly
//! in order: it only ever reads from the connection whose turn it is, and it
//! answers every read before issuing the next one.
//!
//! Each iteration:
//!
//! 1. Ask the board whose turn it is
//! 2. Read columns from that mover until one is accepted (rejections are
//!    answered with `false` and never shown to the opponent)
//! 3. Broadcast the placement, tagged per connection with an ownership flag
//! 4. Broadcast the status; stop on a terminal status
//!
//! In player-vs-computer sessions mover B is a [`ColumnPicker`] retried
//! locally, and only mover A's connection receives broadcasts.

use log::{debug, info, warn};
use tokio::io::{AsyncRead, AsyncWrite};

use crate::connection::PlayerConn;
use crate::core::{Board, ColumnPicker};
use crate::event_log::{EventLog, SessionEvent};
use crate::protocol::ServerMessage;
use crate::types::{GameMode, GameStatus, Mover, Placement};

/// Failure that ends a session. Other sessions are unaffected.
#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    #[error("connection failure: {0}")]
    Connection(#[from] std::io::Error),

    #[error("mover {} did not send anything before the deadline", .mover.as_str())]
    Timeout { mover: Mover },
}

/// How a finished session ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SessionOutcome {
    pub status: GameStatus,
    /// Successful drops played
    pub moves: u32,
}

pub struct Session {
    id: u64,
    board: Board,
    log: EventLog,
}

impl Session {
    pub fn new(id: u64, log: EventLog) -> Self {
        Self {
            id,
            board: Board::new(),
            log,
        }
    }

    /// Play a game between two connections.
    pub async fn run_pvp<S>(
        mut self,
        mut p1: PlayerConn<S>,
        mut p2: PlayerConn<S>,
        ui_flag: bool,
    ) -> Result<SessionOutcome, SessionError>
    where
        S: AsyncRead + AsyncWrite + Unpin,
    {
        self.log
            .record(SessionEvent::started(self.id, GameMode::PlayerVsPlayer, ui_flag));
        info!("Session {} started (player vs player)", self.id);

        let result = self.play_pvp(&mut p1, &mut p2).await;
        p1.close().await;
        p2.close().await;
        self.conclude(result)
    }

    /// Play a game between one connection (mover A) and a computer (mover B).
    pub async fn run_pvc<S, P>(
        mut self,
        mut p1: PlayerConn<S>,
        mut computer: P,
        ui_flag: bool,
    ) -> Result<SessionOutcome, SessionError>
    where
        S: AsyncRead + AsyncWrite + Unpin,
        P: ColumnPicker,
    {
        self.log
            .record(SessionEvent::started(self.id, GameMode::PlayerVsComputer, ui_flag));
        info!(
            "Session {} started (player vs {} computer)",
            self.id,
            computer.name()
        );

        let result = self.play_pvc(&mut p1, &mut computer).await;
        p1.close().await;
        self.conclude(result)
    }

    async fn play_pvp<S>(
        &mut self,
        p1: &mut PlayerConn<S>,
        p2: &mut PlayerConn<S>,
    ) -> Result<SessionOutcome, SessionError>
    where
        S: AsyncRead + AsyncWrite + Unpin,
    {
        // Tells the first player the opponent has arrived.
        p1.send(ServerMessage::Identity(Mover::A)).await?;

        loop {
            let mover = self.board.current_mover();
            let placement = match mover {
                Mover::A => self.accept_move(p1).await?,
                Mover::B => self.accept_move(p2).await?,
            };

            for conn in [&mut *p1, &mut *p2] {
                conn.send(ServerMessage::move_for(placement, conn.mover()))
                    .await?;
            }

            let status = self.board.status_after(mover);
            self.board.advance_turn();

            p1.send(ServerMessage::Status(status)).await?;
            p2.send(ServerMessage::Status(status)).await?;

            if status.is_terminal() {
                return Ok(self.outcome(status));
            }
        }
    }

    async fn play_pvc<S, P>(
        &mut self,
        p1: &mut PlayerConn<S>,
        computer: &mut P,
    ) -> Result<SessionOutcome, SessionError>
    where
        S: AsyncRead + AsyncWrite + Unpin,
        P: ColumnPicker,
    {
        loop {
            let mover = self.board.current_mover();
            let placement = match mover {
                Mover::A => self.accept_move(p1).await?,
                Mover::B => self.computer_move(computer),
            };

            p1.send(ServerMessage::move_for(placement, Mover::A)).await?;

            let status = self.board.status_after(mover);
            self.board.advance_turn();

            p1.send(ServerMessage::Status(status)).await?;

            if status.is_terminal() {
                return Ok(self.outcome(status));
            }
        }
    }

    /// Keep reading from `conn` until it sends a column the board accepts.
    async fn accept_move<S>(&mut self, conn: &mut PlayerConn<S>) -> Result<Placement, SessionError>
    where
        S: AsyncRead + AsyncWrite + Unpin,
    {
        loop {
            let column = conn.recv_column().await?;
            match self.board.apply_drop(column) {
                Ok(placement) => {
                    conn.send(ServerMessage::MoveAccepted(true)).await?;
                    self.log.record(SessionEvent::applied(
                        self.id,
                        self.board.turn(),
                        placement,
                    ));
                    return Ok(placement);
                }
                Err(e) => {
                    debug!(
                        "Session {} mover {} rejected column {}: {} (open: {:?})",
                        self.id,
                        conn.mover().as_str(),
                        e.column(),
                        e,
                        self.board.legal_columns()
                    );
                    self.log.record(SessionEvent::rejected(
                        self.id,
                        self.board.turn(),
                        conn.mover(),
                        &e,
                    ));
                    conn.send(ServerMessage::MoveAccepted(false)).await?;
                }
            }
        }
    }

    /// Draw computer columns until one is accepted. The board is never full
    /// here, since a full board ends the session first.
    fn computer_move<P: ColumnPicker>(&mut self, computer: &mut P) -> Placement {
        loop {
            let column = computer.choose_column();
            if let Ok(placement) = self.board.apply_drop(column) {
                self.log.record(SessionEvent::applied(
                    self.id,
                    self.board.turn(),
                    placement,
                ));
                return placement;
            }
        }
    }

    fn outcome(&self, status: GameStatus) -> SessionOutcome {
        SessionOutcome {
            status,
            moves: self.board.drops(),
        }
    }

    fn conclude(
        &self,
        result: Result<SessionOutcome, SessionError>,
    ) -> Result<SessionOutcome, SessionError> {
        match &result {
            Ok(outcome) => {
                info!(
                    "Session {} finished: {} after {} moves",
                    self.id,
                    outcome.status.as_str(),
                    outcome.moves
                );
                self.log.record(SessionEvent::finished(
                    self.id,
                    outcome.status,
                    outcome.moves,
                ));
            }
            Err(e) => {
                warn!("Session {} aborted: {}", self.id, e);
                self.log
                    .record(SessionEvent::aborted(self.id, e.to_string()));
            }
        }
        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::protocol::{read_bool, read_i32, read_move, read_status, MoveNotice};
    use std::collections::VecDeque;
    use tokio::io::{AsyncWriteExt, DuplexStream};
    use tokio_test::io::Builder;

    /// Computer that replays a fixed list of columns
    struct ScriptedPicker(VecDeque<i32>);

    impl ColumnPicker for ScriptedPicker {
        fn choose_column(&mut self) -> i32 {
            self.0.pop_front().expect("script exhausted")
        }

        fn name(&self) -> &str {
            "scripted"
        }
    }

    fn col(c: i32) -> [u8; 4] {
        c.to_be_bytes()
    }

    fn mv(row: u8, column: u8, mine: bool) -> Vec<u8> {
        ServerMessage::Move { row, column, mine }.encode()
    }

    fn status(s: GameStatus) -> Vec<u8> {
        ServerMessage::Status(s).encode()
    }

    #[tokio::test]
    async fn pvc_exact_byte_stream_until_vertical_win() {
        let mut builder = Builder::new();
        // Out-of-range choice is refused and the same player is asked again.
        builder.read(&col(0)).write(&[0]);
        for (turn, row) in [5u8, 4, 3, 2].into_iter().enumerate() {
            builder.read(&col(1)).write(&[1]).write(&mv(row, 0, true));
            if row == 2 {
                builder.write(&status(GameStatus::Win(Mover::A)));
                break;
            }
            builder
                .write(&status(GameStatus::Continue))
                .write(&mv(5 - turn as u8, 1, false))
                .write(&status(GameStatus::Continue));
        }
        let mock = builder.build();

        let (log, mut events) = EventLog::channel();
        let session = Session::new(1, log);
        let picker = ScriptedPicker(VecDeque::from(vec![2, 2, 2]));
        let outcome = session
            .run_pvc(PlayerConn::new(mock, Mover::A, None), picker, false)
            .await
            .unwrap();

        assert_eq!(outcome.status, GameStatus::Win(Mover::A));
        assert_eq!(outcome.moves, 7);

        let mut kinds = Vec::new();
        while let Ok(event) = events.try_recv() {
            kinds.push(match event {
                SessionEvent::SessionStarted { .. } => "started",
                SessionEvent::MoveApplied { .. } => "applied",
                SessionEvent::MoveRejected { .. } => "rejected",
                SessionEvent::SessionFinished { .. } => "finished",
                SessionEvent::SessionAborted { .. } => "aborted",
            });
        }
        assert_eq!(kinds.first(), Some(&"started"));
        assert_eq!(kinds.iter().filter(|k| **k == "applied").count(), 7);
        assert_eq!(kinds.iter().filter(|k| **k == "rejected").count(), 1);
        assert_eq!(kinds.last(), Some(&"finished"));
    }

    #[tokio::test]
    async fn pvc_computer_retries_full_column_without_network() {
        // Player fills column 1 alternately with the computer; the computer
        // then keeps choosing the full column before landing in column 7.
        let mut builder = Builder::new();
        let mut script = Vec::new();
        for i in 0..3u8 {
            let a_row = 5 - 2 * i;
            let b_row = a_row - 1;
            builder
                .read(&col(1))
                .write(&[1])
                .write(&mv(a_row, 0, true))
                .write(&status(GameStatus::Continue))
                .write(&mv(b_row, 0, false))
                .write(&status(GameStatus::Continue));
            script.push(1);
        }
        // Column 1 is now full: both the player and the computer are refused.
        builder
            .read(&col(1))
            .write(&[0])
            .read(&col(3))
            .write(&[1])
            .write(&mv(5, 2, true))
            .write(&status(GameStatus::Continue))
            .write(&mv(5, 6, false))
            .write(&status(GameStatus::Continue));
        script.extend([1, 1, 1, 7]);
        let mock = builder.build();

        // Player stops answering after the last broadcast; the read fails.
        let session = Session::new(2, EventLog::disabled());
        let err = session
            .run_pvc(
                PlayerConn::new(mock, Mover::A, None),
                ScriptedPicker(VecDeque::from(script)),
                true,
            )
            .await
            .unwrap_err();
        assert!(matches!(err, SessionError::Connection(_)));
    }

    #[tokio::test]
    async fn pvc_computer_win_is_broadcast_before_close() {
        // The player spreads along the bottom row with a gap while the
        // computer stacks column 7.
        let mut builder = Builder::new();
        for (i, column) in [1, 2, 3, 5].into_iter().enumerate() {
            builder
                .read(&col(column))
                .write(&[1])
                .write(&mv(5, column as u8 - 1, true))
                .write(&status(GameStatus::Continue))
                .write(&mv(5 - i as u8, 6, false));
            if i < 3 {
                builder.write(&status(GameStatus::Continue));
            }
        }
        builder.write(&[0, 0, 0, 2]);
        let mock = builder.build();

        let outcome = Session::new(3, EventLog::disabled())
            .run_pvc(
                PlayerConn::new(mock, Mover::A, None),
                ScriptedPicker(VecDeque::from(vec![7, 7, 7, 7])),
                false,
            )
            .await
            .unwrap();
        assert_eq!(outcome.status, GameStatus::Win(Mover::B));
        assert_eq!(outcome.moves, 8);
    }

    /// Fills the board without a line for either mover.
    const DRAW_ORDER: [i32; 42] = [
        1, 2, 1, 2, 1, 2, 2, 1, 2, 1, 2, 1, //
        3, 4, 3, 4, 3, 4, 4, 3, 4, 3, 4, 3, //
        5, 6, 5, 6, 5, 6, 6, 5, 6, 5, 6, 5, //
        7, 7, 7, 7, 7, 7,
    ];

    #[tokio::test]
    async fn pvc_full_board_ends_with_tie_status() {
        let mut builder = Builder::new();
        let mut heights = [0u8; 7];
        let mut computer = VecDeque::new();
        for (i, &column) in DRAW_ORDER.iter().enumerate() {
            let c = (column - 1) as usize;
            let row = 5 - heights[c];
            heights[c] += 1;

            let human = i % 2 == 0;
            if human {
                builder.read(&col(column)).write(&[1]);
            } else {
                computer.push_back(column);
            }
            builder.write(&mv(row, c as u8, human));
            if i + 1 < DRAW_ORDER.len() {
                builder.write(&status(GameStatus::Continue));
            } else {
                builder.write(&[0, 0, 0, 3]);
            }
        }
        let mock = builder.build();

        let (log, mut events) = EventLog::channel();
        let outcome = Session::new(4, log)
            .run_pvc(
                PlayerConn::new(mock, Mover::A, None),
                ScriptedPicker(computer),
                false,
            )
            .await
            .unwrap();
        assert_eq!(outcome.status, GameStatus::Tie);
        assert_eq!(outcome.moves, 42);

        let mut last = None;
        while let Ok(event) = events.try_recv() {
            last = Some(event);
        }
        assert!(matches!(
            last,
            Some(SessionEvent::SessionFinished {
                status: "tie",
                turns: 42,
                ..
            })
        ));
    }

    async fn expect_move(stream: &mut DuplexStream) -> MoveNotice {
        read_move(stream).await.unwrap()
    }

    #[tokio::test]
    async fn pvp_broadcasts_opposite_ownership_and_keeps_rejections_private() {
        let (s1, mut c1) = tokio::io::duplex(256);
        let (s2, mut c2) = tokio::io::duplex(256);
        let session = Session::new(7, EventLog::disabled());
        let handle = tokio::spawn(session.run_pvp(
            PlayerConn::new(s1, Mover::A, None),
            PlayerConn::new(s2, Mover::B, None),
            false,
        ));

        // Session start notice.
        assert_eq!(read_i32(&mut c1).await.unwrap(), 1);

        c1.write_all(&col(4)).await.unwrap();
        assert!(read_bool(&mut c1).await.unwrap());
        let seen_by_a = expect_move(&mut c1).await;
        let seen_by_b = expect_move(&mut c2).await;
        assert_eq!((seen_by_a.row, seen_by_a.column), (5, 3));
        assert_eq!((seen_by_b.row, seen_by_b.column), (5, 3));
        assert!(seen_by_a.mine);
        assert!(!seen_by_b.mine);
        assert_eq!(read_status(&mut c1).await.unwrap(), GameStatus::Continue);
        assert_eq!(read_status(&mut c2).await.unwrap(), GameStatus::Continue);

        // Mover B picks an illegal column, then a legal one.
        c2.write_all(&col(8)).await.unwrap();
        assert!(!read_bool(&mut c2).await.unwrap());
        c2.write_all(&col(4)).await.unwrap();
        assert!(read_bool(&mut c2).await.unwrap());

        // A's next bytes are B's accepted move, nothing about the rejection.
        let seen_by_a = expect_move(&mut c1).await;
        assert_eq!((seen_by_a.row, seen_by_a.column, seen_by_a.mine), (4, 3, false));
        let seen_by_b = expect_move(&mut c2).await;
        assert_eq!((seen_by_b.row, seen_by_b.column, seen_by_b.mine), (4, 3, true));
        assert_eq!(read_status(&mut c1).await.unwrap(), GameStatus::Continue);
        assert_eq!(read_status(&mut c2).await.unwrap(), GameStatus::Continue);

        // A leaves mid-game: the session ends with a connection failure.
        drop(c1);
        let err = handle.await.unwrap().unwrap_err();
        assert!(matches!(err, SessionError::Connection(_)));
    }

    #[tokio::test]
    async fn pvp_horizontal_win_reaches_both_players() {
        let (s1, mut c1) = tokio::io::duplex(1024);
        let (s2, mut c2) = tokio::io::duplex(1024);
        let session = Session::new(8, EventLog::disabled());
        let handle = tokio::spawn(session.run_pvp(
            PlayerConn::new(s1, Mover::A, None),
            PlayerConn::new(s2, Mover::B, None),
            true,
        ));
        assert_eq!(read_i32(&mut c1).await.unwrap(), 1);

        // A: 1,2,3,4 on the bottom row; B stacks on top of A's pieces.
        let mut last = GameStatus::Continue;
        for column in 1..=4 {
            c1.write_all(&col(column)).await.unwrap();
            assert!(read_bool(&mut c1).await.unwrap());
            expect_move(&mut c1).await;
            expect_move(&mut c2).await;
            last = read_status(&mut c1).await.unwrap();
            assert_eq!(read_status(&mut c2).await.unwrap(), last);
            if last.is_terminal() {
                break;
            }
            c2.write_all(&col(column)).await.unwrap();
            assert!(read_bool(&mut c2).await.unwrap());
            expect_move(&mut c1).await;
            expect_move(&mut c2).await;
            assert_eq!(read_status(&mut c1).await.unwrap(), GameStatus::Continue);
            assert_eq!(read_status(&mut c2).await.unwrap(), GameStatus::Continue);
        }
        assert_eq!(last, GameStatus::Win(Mover::A));

        let outcome = handle.await.unwrap().unwrap();
        assert_eq!(outcome.status, GameStatus::Win(Mover::A));
        assert_eq!(outcome.moves, 7);
    }
}
