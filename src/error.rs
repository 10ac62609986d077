//! Engine error type.

use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum EngineError {
    /// Shape index outside the seven known templates.
    #[error("no such shape: {0}")]
    UnknownShape(usize),
    /// Grid cell outside the board or color above the highest id.
    #[error("invalid cell ({row}, {col}) = {color}")]
    InvalidCell { row: usize, col: usize, color: u8 },
    #[error("invalid config: {0}")]
    InvalidConfig(String),
}
