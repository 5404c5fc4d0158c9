use thiserror::Error;

/// Errors raised while configuring a grid. Aggregating into a configured grid
/// cannot fail.
#[derive(Debug, Error, PartialEq)]
pub enum GridError {
    #[error("cell size must be a positive, finite number of degrees (got {0})")]
    InvalidCellSize(f64),

    #[error("cell size must be a floating-point number (got {0:?})")]
    UnparsableCellSize(String),
}
