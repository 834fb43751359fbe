use crate::types::BOARD_COLS;

/// Rejected drop. Both variants are an invalid column choice: the board is
/// unchanged and the same mover has to choose again.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum DropError {
    #[error("column {0} is outside 1..={max}", max = BOARD_COLS)]
    OutOfRange(i32),

    #[error("column {0} is full")]
    ColumnFull(i32),
}

impl DropError {
    /// The 1-based column that was rejected
    pub fn column(&self) -> i32 {
        match *self {
            DropError::OutOfRange(c) | DropError::ColumnFull(c) => c,
        }
    }
}
