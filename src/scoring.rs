//! Score, streak and gravity pacing.

use std::time::Duration;

use crate::config::{HARD_DROP_TIMEOUT_MS, START_DROP_TIME_MS};
use crate::grid::Grid;

// Per-clear multipliers; fewer rows pay more.
pub const SCORE_SINGLE: u64 = 1200;
pub const SCORE_DOUBLE: u64 = 300;
pub const SCORE_TRIPLE: u64 = 100;
pub const SCORE_QUAD: u64 = 40;

/// Added unscaled when a clearing lock came from a hard drop.
pub const DROP_BONUS: u64 = 500;

/// Gravity slows by `DROP_TIME_STEP_MS` whenever the score lands on a
/// multiple of this.
pub const SCORE_MILESTONE: u64 = 1000;
pub const DROP_TIME_STEP_MS: u32 = 10;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ScoreState {
    pub score: u64,
    pub level: u32,
    pub streak: u32,
    pub drop_time: u32,
    pub drop_flag: bool,
    hard_drop_timeout: u32,
}

impl ScoreState {
    pub fn new(start_drop_time: u32, hard_drop_timeout: u32) -> Self {
        Self {
            score: 0,
            level: 0,
            streak: 0,
            drop_time: start_drop_time,
            drop_flag: false,
            hard_drop_timeout,
        }
    }

    pub fn reset(&mut self, start_drop_time: u32) {
        self.score = 0;
        self.level = 0;
        self.streak = 0;
        self.drop_time = start_drop_time;
        self.drop_flag = false;
    }

    pub fn set_drop_flag(&mut self) {
        self.drop_flag = true;
    }

    pub fn clear_drop_flag(&mut self) {
        self.drop_flag = false;
    }

    /// How long the input layer may wait before the next gravity tick.
    pub fn poll_timeout(&self) -> Duration {
        let ms = if self.drop_flag {
            self.hard_drop_timeout
        } else {
            self.drop_time
        };
        Duration::from_millis(u64::from(ms))
    }

    /// Clears full rows and scores them. Returns the number of rows cleared.
    ///
    /// The whole grid is rescanned; `_top_row` is only a hint and is ignored.
    pub fn update_score(&mut self, grid: &mut Grid, _top_row: i32) -> u32 {
        let rows = grid.clear_full_rows(0);
        self.award(rows);
        rows
    }

    /// Applies the scoring table for a lock that cleared `rows` rows.
    pub fn award(&mut self, rows: u32) {
        let bonus = if self.drop_flag { DROP_BONUS } else { 0 };

        if rows > 0 {
            self.streak += 1;
        }

        let base = match rows {
            1 => Some(SCORE_SINGLE),
            2 => Some(SCORE_DOUBLE),
            3 => Some(SCORE_TRIPLE),
            4 => Some(SCORE_QUAD),
            _ => None,
        };

        match base {
            Some(base) => {
                let scaled = base * (u64::from(self.level) + 1) * u64::from(self.streak);
                self.score = self.score.saturating_add(scaled + bonus);
            }
            None => self.streak = 0,
        }

        if self.score % SCORE_MILESTONE == 0 {
            self.drop_time = self.drop_time.saturating_add(DROP_TIME_STEP_MS);
        }
    }
}

impl Default for ScoreState {
    fn default() -> Self {
        Self::new(START_DROP_TIME_MS, HARD_DROP_TIMEOUT_MS)
    }
}
