//! Core game logic module - pure, deterministic, and testable
//!
//! This module contains the rules of the game and the computer opponent.
//! It has **zero dependencies** on networking or I/O.
//!
//! # Module Structure
//!
//! - [`board`]: 6x7 grid with gravity drops, turn counter, line and tie detection
//! - [`computer`]: column pickers for automated movers
//! - [`error`]: drop rejection reasons
//!
//! # Game Rules
//!
//! - Mover A plays odd turns, mover B even turns
//! - A drop fills the lowest empty cell of the chosen column
//! - Four same-token cells in a row, column or diagonal win
//! - 42 drops without a line is a tie
//!
//! # Example
//!
//! ```
//! use connect4_core::Board;
//! use connect4_types::{GameStatus, Mover};
//!
//! let mut board = Board::new();
//! for _ in 0..4 {
//!     let placement = board.apply_drop(1).unwrap();
//!     assert_eq!(placement.mover, Mover::A);
//! }
//! assert_eq!(board.status_after(Mover::A), GameStatus::Win(Mover::A));
//! ```

pub mod board;
pub mod computer;
pub mod error;

pub use connect4_types as types;

// Re-export commonly used types for convenience
pub use board::Board;
pub use computer::{ColumnPicker, RandomComputer};
pub use error::DropError;
