//! Engine tunables.

use crate::error::EngineError;
use crate::grid::COLS;

pub const START_DROP_TIME_MS: u32 = 300;
pub const HARD_DROP_TIMEOUT_MS: u32 = 5;
pub const SPAWN_COL: i32 = COLS as i32 / 2;

/// Every n-th lateral move or rotation also pulls the piece down one row.
pub const FORCED_DESCENT_EVERY: u32 = 3;

/// Widest template, used to bound the spawn column.
const WIDEST_SHAPE: i32 = 4;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GameConfig {
    pub start_drop_time_ms: u32,
    pub hard_drop_timeout_ms: u32,
    pub spawn_col: i32,
    /// `0` turns forced descent off.
    pub forced_descent_every: u32,
}

impl GameConfig {
    pub fn validate(&self) -> Result<(), EngineError> {
        if self.start_drop_time_ms == 0 {
            return Err(EngineError::InvalidConfig(
                "start drop time must be positive".into(),
            ));
        }
        if self.hard_drop_timeout_ms == 0 {
            return Err(EngineError::InvalidConfig(
                "hard drop timeout must be positive".into(),
            ));
        }
        let max_col = COLS as i32 - WIDEST_SHAPE;
        if !(0..=max_col).contains(&self.spawn_col) {
            return Err(EngineError::InvalidConfig(format!(
                "spawn column {} outside 0..={}",
                self.spawn_col, max_col
            )));
        }
        Ok(())
    }
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            start_drop_time_ms: START_DROP_TIME_MS,
            hard_drop_timeout_ms: HARD_DROP_TIMEOUT_MS,
            spawn_col: SPAWN_COL,
            forced_descent_every: FORCED_DESCENT_EVERY,
        }
    }
}
