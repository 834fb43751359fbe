//! Board module - the authoritative game engine
//!
//! The board is a 6x7 grid where each cell is empty or holds one mover's token,
//! plus the turn counter that decides who moves next.
//! Uses a flat array for cache locality and zero allocation.
//! Coordinates: (row, col) where row ranges 0..5 (top to bottom) and col 0..6
//! (left to right). Tokens fall to the highest-numbered empty row of a column.

use crate::error::DropError;
use crate::types::{
    Cell, GameStatus, Mover, Placement, BOARD_CELLS, BOARD_COLS, BOARD_ROWS, WIN_LENGTH,
};

/// Total number of cells on the board
const BOARD_SIZE: usize = BOARD_CELLS as usize;

/// Line directions scanned for a win: horizontal, vertical, down-right, up-right
const DIRECTIONS: [(i8, i8); 4] = [(0, 1), (1, 0), (1, 1), (-1, 1)];

/// The game board - 6 rows x 7 columns using flat array storage
#[derive(Debug, Clone, PartialEq)]
pub struct Board {
    /// Flat array of cells, row-major order (row * COLS + col)
    cells: [Cell; BOARD_SIZE],
    /// 1-based turn counter; parity picks the mover
    turn: u32,
    /// Successful drops so far
    drops: u32,
}

impl Board {
    /// Create a new empty board at turn 1
    pub fn new() -> Self {
        Self {
            cells: [None; BOARD_SIZE],
            turn: 1,
            drops: 0,
        }
    }

    /// Calculate flat index from (row, col) coordinates
    #[inline(always)]
    fn index(row: i8, col: i8) -> Option<usize> {
        if row < 0 || row >= BOARD_ROWS as i8 || col < 0 || col >= BOARD_COLS as i8 {
            return None;
        }
        Some((row as usize) * (BOARD_COLS as usize) + (col as usize))
    }

    /// Get cell at (row, col), `None` if out of bounds
    pub fn get(&self, row: i8, col: i8) -> Option<Cell> {
        Self::index(row, col).map(|idx| self.cells[idx])
    }

    /// Number of tokens stacked in a 0-based column
    pub fn column_height(&self, col: u8) -> u8 {
        if col >= BOARD_COLS {
            return 0;
        }
        (0..BOARD_ROWS)
            .filter(|&row| self.cells[row as usize * BOARD_COLS as usize + col as usize].is_some())
            .count() as u8
    }

    /// A column is full once its top cell is occupied
    pub fn is_column_full(&self, col: u8) -> bool {
        col >= BOARD_COLS || self.cells[col as usize].is_some()
    }

    /// 1-based columns that would currently accept a drop
    pub fn legal_columns(&self) -> Vec<i32> {
        (0..BOARD_COLS)
            .filter(|&col| !self.is_column_full(col))
            .map(|col| col as i32 + 1)
            .collect()
    }

    /// Current turn number, starting at 1
    pub fn turn(&self) -> u32 {
        self.turn
    }

    /// Successful drops made so far
    pub fn drops(&self) -> u32 {
        self.drops
    }

    /// Mover for the current turn: odd turns are A, even turns are B
    pub fn current_mover(&self) -> Mover {
        Mover::for_turn(self.turn)
    }

    /// Move on to the next turn. Called by the session after a successful drop.
    pub fn advance_turn(&mut self) {
        self.turn += 1;
    }

    /// Drop the current mover's token into a 1-based column.
    ///
    /// The token lands in the lowest empty cell. On error the board is left
    /// untouched. The turn counter is not advanced.
    pub fn apply_drop(&mut self, column: i32) -> Result<Placement, DropError> {
        if column < 1 || column > BOARD_COLS as i32 {
            return Err(DropError::OutOfRange(column));
        }
        let col = (column - 1) as u8;
        if self.is_column_full(col) {
            return Err(DropError::ColumnFull(column));
        }

        // Columns fill contiguously from the bottom, so the height locates the
        // first empty cell.
        let row = BOARD_ROWS - 1 - self.column_height(col);
        let mover = self.current_mover();
        self.cells[row as usize * BOARD_COLS as usize + col as usize] = Some(mover);
        self.drops += 1;
        Ok(Placement {
            row,
            column: col,
            mover,
        })
    }

    /// Full-board scan for four consecutive cells holding `mover`'s token
    pub fn has_four_in_row(&self, mover: Mover) -> bool {
        for row in 0..BOARD_ROWS as i8 {
            for col in 0..BOARD_COLS as i8 {
                if self.get(row, col) != Some(Some(mover)) {
                    continue;
                }
                for &(dr, dc) in &DIRECTIONS {
                    if self.run_length(row, col, dr, dc, mover) >= WIN_LENGTH {
                        return true;
                    }
                }
            }
        }
        false
    }

    /// Count consecutive `mover` cells starting at (row, col), capped at WIN_LENGTH
    fn run_length(&self, row: i8, col: i8, dr: i8, dc: i8, mover: Mover) -> u8 {
        let mut len = 0u8;
        let (mut r, mut c) = (row, col);
        while len < WIN_LENGTH && self.get(r, c) == Some(Some(mover)) {
            len += 1;
            r += dr;
            c += dc;
        }
        len
    }

    /// True exactly once every cell has received a drop
    pub fn is_full(&self) -> bool {
        self.drops == BOARD_CELLS
    }

    /// Status after `mover` has just moved.
    ///
    /// The mover's own line is checked first, then the opponent's, then a full
    /// board; the first hit wins.
    pub fn status_after(&self, mover: Mover) -> GameStatus {
        if self.has_four_in_row(mover) {
            GameStatus::Win(mover)
        } else if self.has_four_in_row(mover.opponent()) {
            GameStatus::Win(mover.opponent())
        } else if self.is_full() {
            GameStatus::Tie
        } else {
            GameStatus::Continue
        }
    }

    /// Get a reference to the internal cells array
    pub fn cells(&self) -> &[Cell] {
        &self.cells
    }

    /// Create from text rows for testing (`X` = A, `O` = B, anything else empty).
    /// Drops are counted from the filled cells; the turn follows from them.
    #[cfg(test)]
    pub fn from_rows(rows: [&str; BOARD_ROWS as usize]) -> Self {
        let mut board = Self::new();
        for (r, line) in rows.iter().enumerate() {
            for (c, ch) in line.chars().take(BOARD_COLS as usize).enumerate() {
                let cell = match ch {
                    'X' => Some(Mover::A),
                    'O' => Some(Mover::B),
                    _ => None,
                };
                if cell.is_some() {
                    board.drops += 1;
                }
                board.cells[r * BOARD_COLS as usize + c] = cell;
            }
        }
        board.turn = board.drops + 1;
        board
    }
}

impl Default for Board {
    fn default() -> Self {
        Self::new()
    }
}
