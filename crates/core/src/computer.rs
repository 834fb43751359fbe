//! Computer player - picks columns without looking at the board
//!
//! The computer never inspects legality and keeps no memory of rejections.
//! Callers retry with a fresh draw whenever the engine refuses a column.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::types::BOARD_COLS;

/// Source of column choices for an automated mover.
///
/// A smarter opponent plugs in here without touching the session loop.
pub trait ColumnPicker: Send {
    /// Next 1-based column to try
    fn choose_column(&mut self) -> i32;

    fn name(&self) -> &str;
}

/// Uniformly random column in `1..=BOARD_COLS`.
pub struct RandomComputer {
    rng: StdRng,
}

impl RandomComputer {
    pub fn new() -> Self {
        Self {
            rng: StdRng::from_os_rng(),
        }
    }

    /// Deterministic sequence for tests and reproducible sessions
    pub fn seeded(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
        }
    }
}

impl Default for RandomComputer {
    fn default() -> Self {
        Self::new()
    }
}

impl ColumnPicker for RandomComputer {
    fn choose_column(&mut self) -> i32 {
        self.rng.random_range(1..=BOARD_COLS as i32)
    }

    fn name(&self) -> &str {
        "random"
    }
}
