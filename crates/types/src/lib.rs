//! Core types module - shared data structures and constants
//!
//! This module defines the fundamental types used by the engine, the session
//! loops and the wire protocol. Everything here is plain data with no
//! dependencies, so it can be shared by the server, the bot client and tests.
//!
//! # Board Dimensions
//!
//! Standard Connect Four grid:
//!
//! - **Rows**: 6 (row 0 is the top, row 5 the bottom)
//! - **Columns**: 7 (0-based internally, 1-based on the wire when choosing)
//! - **Cells**: 42, so the game always ends by turn 43 at the latest
//!
//! # Wire Codes
//!
//! | Constant | Value | Description |
//! |----------|-------|-------------|
//! | `MOVER_A_ID` | 1 | identity sent to the first connection |
//! | `MOVER_B_ID` | 2 | identity sent to the second connection |
//! | `STATUS_MOVER_A_WIN` | 1 | mover A completed a line |
//! | `STATUS_MOVER_B_WIN` | 2 | mover B completed a line |
//! | `STATUS_TIE` | 3 | board full, no line |
//! | `STATUS_CONTINUE` | 4 | game goes on |
//!
//! # Examples
//!
//! ```
//! use connect4_types::{GameStatus, Mover, BOARD_COLS, BOARD_ROWS};
//!
//! assert_eq!(Mover::for_turn(1), Mover::A);
//! assert_eq!(Mover::for_turn(2), Mover::B);
//! assert_eq!(Mover::A.opponent(), Mover::B);
//!
//! assert_eq!(GameStatus::from_code(4), Some(GameStatus::Continue));
//! assert!(GameStatus::Win(Mover::B).is_terminal());
//!
//! assert_eq!(BOARD_ROWS * BOARD_COLS, 42);
//! ```

/// Board height in cells (6 rows)
pub const BOARD_ROWS: u8 = 6;

/// Board width in cells (7 columns)
pub const BOARD_COLS: u8 = 7;

/// Number of same-token cells in a line needed to win
pub const WIN_LENGTH: u8 = 4;

/// Total number of drops before the board is full
pub const BOARD_CELLS: u32 = BOARD_ROWS as u32 * BOARD_COLS as u32;

/// Well-known listen port of the game server
pub const DEFAULT_PORT: u16 = 8004;

/// Identity code of mover A on the wire
pub const MOVER_A_ID: i32 = 1;

/// Identity code of mover B on the wire
pub const MOVER_B_ID: i32 = 2;

/// Status code: mover A completed a line
pub const STATUS_MOVER_A_WIN: i32 = 1;

/// Status code: mover B completed a line
pub const STATUS_MOVER_B_WIN: i32 = 2;

/// Status code: board full without a line
pub const STATUS_TIE: i32 = 3;

/// Status code: the game goes on
pub const STATUS_CONTINUE: i32 = 4;

/// One of the two participants of a game.
///
/// Mover A always moves on odd turns and owns the `X` token, mover B moves on
/// even turns and owns the `O` token. The binding is fixed for a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Mover {
    A,
    B,
}

impl Mover {
    /// Mover whose turn it is for a 1-based turn number.
    pub fn for_turn(turn: u32) -> Self {
        if turn % 2 == 1 {
            Mover::A
        } else {
            Mover::B
        }
    }

    pub fn opponent(self) -> Self {
        match self {
            Mover::A => Mover::B,
            Mover::B => Mover::A,
        }
    }

    /// Identity code sent on the wire
    pub fn id(self) -> i32 {
        match self {
            Mover::A => MOVER_A_ID,
            Mover::B => MOVER_B_ID,
        }
    }

    /// Parse an identity code
    ///
    /// ```
    /// use connect4_types::Mover;
    ///
    /// assert_eq!(Mover::from_id(1), Some(Mover::A));
    /// assert_eq!(Mover::from_id(2), Some(Mover::B));
    /// assert_eq!(Mover::from_id(3), None);
    /// ```
    pub fn from_id(id: i32) -> Option<Self> {
        match id {
            MOVER_A_ID => Some(Mover::A),
            MOVER_B_ID => Some(Mover::B),
            _ => None,
        }
    }

    /// Token symbol shown in logs
    pub fn symbol(self) -> char {
        match self {
            Mover::A => 'X',
            Mover::B => 'O',
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Mover::A => "a",
            Mover::B => "b",
        }
    }
}

/// Board cell: `None` when empty, otherwise the mover whose token fills it
pub type Cell = Option<Mover>;

/// Result of a successful drop.
///
/// `row` and `column` are 0-based grid coordinates, row 0 being the top row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Placement {
    pub row: u8,
    pub column: u8,
    pub mover: Mover,
}

/// Outcome of the game after a move.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GameStatus {
    Continue,
    Win(Mover),
    Tie,
}

impl GameStatus {
    pub fn is_terminal(self) -> bool {
        !matches!(self, GameStatus::Continue)
    }

    /// Status code sent on the wire
    pub fn code(self) -> i32 {
        match self {
            GameStatus::Win(Mover::A) => STATUS_MOVER_A_WIN,
            GameStatus::Win(Mover::B) => STATUS_MOVER_B_WIN,
            GameStatus::Tie => STATUS_TIE,
            GameStatus::Continue => STATUS_CONTINUE,
        }
    }

    pub fn from_code(code: i32) -> Option<Self> {
        match code {
            STATUS_MOVER_A_WIN => Some(GameStatus::Win(Mover::A)),
            STATUS_MOVER_B_WIN => Some(GameStatus::Win(Mover::B)),
            STATUS_TIE => Some(GameStatus::Tie),
            STATUS_CONTINUE => Some(GameStatus::Continue),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            GameStatus::Continue => "continue",
            GameStatus::Win(Mover::A) => "mover_a_win",
            GameStatus::Win(Mover::B) => "mover_b_win",
            GameStatus::Tie => "tie",
        }
    }
}

/// Kind of session requested by the first connection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GameMode {
    PlayerVsPlayer,
    PlayerVsComputer,
}

impl GameMode {
    /// Decode the game-mode flag (`true` = player vs player)
    pub fn from_flag(pvp: bool) -> Self {
        if pvp {
            GameMode::PlayerVsPlayer
        } else {
            GameMode::PlayerVsComputer
        }
    }

    pub fn flag(self) -> bool {
        matches!(self, GameMode::PlayerVsPlayer)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            GameMode::PlayerVsPlayer => "pvp",
            GameMode::PlayerVsComputer => "pvc",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reference_wire_codes() {
        assert_eq!(MOVER_A_ID, 1);
        assert_eq!(MOVER_B_ID, 2);
        assert_eq!(GameStatus::Win(Mover::A).code(), 1);
        assert_eq!(GameStatus::Win(Mover::B).code(), 2);
        assert_eq!(GameStatus::Tie.code(), 3);
        assert_eq!(GameStatus::Continue.code(), 4);
        assert_eq!(DEFAULT_PORT, 8004);
    }

    #[test]
    fn status_code_roundtrip_rejects_unknown() {
        for status in [
            GameStatus::Continue,
            GameStatus::Win(Mover::A),
            GameStatus::Win(Mover::B),
            GameStatus::Tie,
        ] {
            assert_eq!(GameStatus::from_code(status.code()), Some(status));
        }
        assert_eq!(GameStatus::from_code(0), None);
        assert_eq!(GameStatus::from_code(5), None);
    }

    #[test]
    fn turn_parity_alternates() {
        for turn in 1..=BOARD_CELLS {
            let expected = if turn % 2 == 1 { Mover::A } else { Mover::B };
            assert_eq!(Mover::for_turn(turn), expected);
        }
    }

    #[test]
    fn game_mode_flag() {
        assert_eq!(GameMode::from_flag(true), GameMode::PlayerVsPlayer);
        assert_eq!(GameMode::from_flag(false), GameMode::PlayerVsComputer);
        assert!(GameMode::PlayerVsPlayer.flag());
    }
}
