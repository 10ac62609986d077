use std::time::Duration;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::collision::Collider;
use crate::config::GameConfig;
use crate::error::EngineError;
use crate::grid::{Grid, Mask, ROWS};
use crate::scoring::ScoreState;
use crate::shape::{Shape, ShapeKind, SHAPE_COUNT};

// ============================================================================
// Types
// ============================================================================

/// Where the controller is in the spawn / fall / lock / clear cycle.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Phase {
    Spawning,
    Falling,
    Locking,
    Clearing,
    Paused,
    GameOver,
}

/// What the input layer hands the controller each iteration.
///
/// `Tick` means the poll timeout elapsed with no key.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Action {
    Left,
    Right,
    Rotate,
    SoftDrop,
    HardDrop,
    Tick,
}

/// Result of an action entry point.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Outcome {
    Moved,
    Blocked,
    Locked { rows_cleared: u32 },
    /// The game is paused or over; nothing happened.
    Inactive,
}

#[derive(Clone, PartialEq, Eq, Debug)]
pub enum GameEvent {
    PieceSpawned(ShapeKind),
    PieceMoved,
    PieceRotated,
    PieceLocked,
    LinesCleared(u32),
    Paused,
    Unpaused,
    GameRestarted,
    GameOver,
}

// ============================================================================
// Piece Provider Trait
// ============================================================================

pub trait PieceProvider {
    fn next_shape(&mut self) -> Shape;
}

pub struct RandomPieceProvider<R: Rng> {
    rng: R,
}

impl<R: Rng> RandomPieceProvider<R> {
    pub fn new(rng: R) -> Self {
        Self { rng }
    }
}

impl RandomPieceProvider<StdRng> {
    pub fn seeded(seed: u64) -> Self {
        Self::new(StdRng::seed_from_u64(seed))
    }

    pub fn from_entropy() -> Self {
        Self::new(StdRng::from_entropy())
    }
}

impl<R: Rng> PieceProvider for RandomPieceProvider<R> {
    fn next_shape(&mut self) -> Shape {
        Shape::random(&mut self.rng)
    }
}

/// Cycles through a fixed list of kinds. An empty list cycles all seven.
pub struct SequencePieceProvider {
    kinds: Vec<ShapeKind>,
    index: usize,
}

impl SequencePieceProvider {
    pub fn new(kinds: Vec<ShapeKind>) -> Self {
        Self { kinds, index: 0 }
    }
}

impl PieceProvider for SequencePieceProvider {
    fn next_shape(&mut self) -> Shape {
        let kind = if self.kinds.is_empty() {
            ShapeKind::ALL[self.index % SHAPE_COUNT]
        } else {
            self.kinds[self.index % self.kinds.len()]
        };
        self.index += 1;
        Shape::new(kind)
    }
}

// ============================================================================
// Game
// ============================================================================

pub struct Game {
    grid: Grid,
    shape: Shape,
    collider: Collider,
    overlay: Mask,
    scoring: ScoreState,
    phase: Phase,
    top_row: i32,
    action_ticks: u32,
    config: GameConfig,
    provider: Box<dyn PieceProvider>,
    events: Vec<GameEvent>,
}

impl Game {
    pub fn new() -> Self {
        Self::with_provider(Box::new(RandomPieceProvider::from_entropy()))
    }

    pub fn with_provider(provider: Box<dyn PieceProvider>) -> Self {
        let config = GameConfig::default();
        let mut game = Self::assemble(Grid::new(), Shape::new(ShapeKind::O), provider, config);
        game.spawn_next();
        game
    }

    pub fn with_config(
        provider: Box<dyn PieceProvider>,
        config: GameConfig,
    ) -> Result<Self, EngineError> {
        config.validate()?;
        let mut game = Self::assemble(Grid::new(), Shape::new(ShapeKind::O), provider, config);
        game.spawn_next();
        Ok(game)
    }

    /// Starts from a prepared board with `shape` already falling.
    pub fn with_grid(grid: Grid, shape: Shape) -> Self {
        Self::with_grid_and_provider(grid, shape, Box::new(RandomPieceProvider::from_entropy()))
    }

    pub fn with_grid_and_provider(
        grid: Grid,
        shape: Shape,
        provider: Box<dyn PieceProvider>,
    ) -> Self {
        let mut game = Self::assemble(grid, shape, provider, GameConfig::default());
        game.phase = Phase::Falling;
        game.refresh_overlay();
        game
    }

    fn assemble(
        grid: Grid,
        shape: Shape,
        provider: Box<dyn PieceProvider>,
        config: GameConfig,
    ) -> Self {
        Self {
            grid,
            shape,
            collider: Collider::new(),
            overlay: Mask::new(),
            scoring: ScoreState::new(config.start_drop_time_ms, config.hard_drop_timeout_ms),
            phase: Phase::Spawning,
            top_row: ROWS as i32 - 1,
            action_ticks: 0,
            config,
            provider,
            events: Vec::new(),
        }
    }

    // ------------------------------------------------------------------------
    // Player actions
    // ------------------------------------------------------------------------

    pub fn move_left(&mut self) -> Outcome {
        if self.phase != Phase::Falling {
            return Outcome::Inactive;
        }
        if !self.collider.can_move_left(&self.grid, &self.shape) {
            return Outcome::Blocked;
        }
        self.shape.col -= 1;
        self.shape_changed(GameEvent::PieceMoved);
        Outcome::Moved
    }

    pub fn move_right(&mut self) -> Outcome {
        if self.phase != Phase::Falling {
            return Outcome::Inactive;
        }
        if !self.collider.can_move_right(&self.grid, &self.shape) {
            return Outcome::Blocked;
        }
        self.shape.col += 1;
        self.shape_changed(GameEvent::PieceMoved);
        Outcome::Moved
    }

    pub fn rotate(&mut self) -> Outcome {
        if self.phase != Phase::Falling {
            return Outcome::Inactive;
        }
        if !self.collider.can_rotate(&self.grid, &self.shape) {
            return Outcome::Blocked;
        }
        self.shape.rotate();
        self.shape_changed(GameEvent::PieceRotated);
        Outcome::Moved
    }

    /// One gravity step: fall a row, or lock when the way down is blocked.
    pub fn tick_gravity(&mut self) -> Outcome {
        if self.phase != Phase::Falling {
            return Outcome::Inactive;
        }
        self.step_down()
    }

    pub fn soft_drop(&mut self) -> Outcome {
        self.tick_gravity()
    }

    /// Marks the fall as forced, then steps down.
    ///
    /// While the flag is up the poll timeout shrinks so gravity runs fast, and
    /// a clearing lock earns the drop bonus.
    pub fn hard_drop(&mut self) -> Outcome {
        if self.phase != Phase::Falling {
            return Outcome::Inactive;
        }
        self.scoring.set_drop_flag();
        self.step_down()
    }

    /// Locks the falling shape where it is, clears rows, scores and spawns.
    pub fn lock_and_clear(&mut self) -> Outcome {
        if self.phase != Phase::Falling {
            return Outcome::Inactive;
        }
        self.phase = Phase::Locking;
        let mut rows_cleared = 0;

        loop {
            match self.phase {
                Phase::Locking => {
                    self.grid.stamp(&self.shape);
                    self.top_row = self.grid.top_row_estimate(self.top_row);
                    self.events.push(GameEvent::PieceLocked);
                    self.phase = Phase::Clearing;
                }
                Phase::Clearing => {
                    rows_cleared = self.scoring.update_score(&mut self.grid, self.top_row);
                    self.scoring.clear_drop_flag();
                    if rows_cleared > 0 {
                        self.events.push(GameEvent::LinesCleared(rows_cleared));
                    }
                    if self.top_row < 0 {
                        self.end_game();
                    } else {
                        self.phase = Phase::Spawning;
                    }
                }
                Phase::Spawning => self.spawn_next(),
                Phase::Falling | Phase::Paused | Phase::GameOver => break,
            }
        }

        Outcome::Locked { rows_cleared }
    }

    /// Single entry point for the input layer.
    ///
    /// Lateral moves and rotations pull the piece down a row on every
    /// `forced_descent_every`-th press, so holding a key cannot stall gravity.
    pub fn apply(&mut self, action: Action) -> Outcome {
        match action {
            Action::Left => self.with_forced_descent(Self::move_left),
            Action::Right => self.with_forced_descent(Self::move_right),
            Action::Rotate => self.with_forced_descent(Self::rotate),
            Action::SoftDrop => self.soft_drop(),
            Action::HardDrop => self.hard_drop(),
            Action::Tick => self.tick_gravity(),
        }
    }

    fn with_forced_descent(&mut self, act: fn(&mut Self) -> Outcome) -> Outcome {
        if self.phase != Phase::Falling {
            return Outcome::Inactive;
        }
        let every = self.config.forced_descent_every;
        let force = every > 0 && self.action_ticks % every == 0;
        self.action_ticks = self.action_ticks.wrapping_add(1);

        let outcome = act(self);
        if !force {
            return outcome;
        }
        match (outcome, self.step_down()) {
            (_, locked @ Outcome::Locked { .. }) => locked,
            (Outcome::Blocked, Outcome::Moved) => Outcome::Moved,
            (outcome, _) => outcome,
        }
    }

    pub fn toggle_pause(&mut self) {
        match self.phase {
            Phase::Falling => {
                self.phase = Phase::Paused;
                self.events.push(GameEvent::Paused);
            }
            Phase::Paused => {
                self.phase = Phase::Falling;
                self.events.push(GameEvent::Unpaused);
            }
            // Only a falling piece can be paused
            _ => {}
        }
    }

    pub fn restart(&mut self) {
        self.grid.zero();
        self.scoring.reset(self.config.start_drop_time_ms);
        self.top_row = ROWS as i32 - 1;
        self.action_ticks = 0;
        self.events.clear();
        self.events.push(GameEvent::GameRestarted);
        self.spawn_next();
    }

    // ------------------------------------------------------------------------
    // Internals
    // ------------------------------------------------------------------------

    fn step_down(&mut self) -> Outcome {
        if self.collider.can_move_down(&self.grid, &self.shape) {
            self.shape.row += 1;
            self.shape_changed(GameEvent::PieceMoved);
            Outcome::Moved
        } else {
            self.lock_and_clear()
        }
    }

    fn spawn_next(&mut self) {
        let mut shape = self.provider.next_shape();
        shape.row = 0;
        shape.col = self.config.spawn_col;
        self.shape = shape;

        if self.collider.collides(&self.grid, &self.shape) {
            self.end_game();
        } else {
            self.phase = Phase::Falling;
            self.events.push(GameEvent::PieceSpawned(shape.kind));
        }
        self.refresh_overlay();
    }

    fn end_game(&mut self) {
        self.phase = Phase::GameOver;
        self.events.push(GameEvent::GameOver);
    }

    fn shape_changed(&mut self, event: GameEvent) {
        self.refresh_overlay();
        self.events.push(event);
    }

    fn refresh_overlay(&mut self) {
        self.overlay.zero();
        if self.phase != Phase::GameOver {
            self.overlay.stamp(&self.shape);
        }
    }

    // ------------------------------------------------------------------------
    // Read access
    // ------------------------------------------------------------------------

    pub fn grid(&self) -> &Grid {
        &self.grid
    }

    pub fn shape(&self) -> &Shape {
        &self.shape
    }

    /// The falling shape alone, drawn on an otherwise empty board.
    pub fn overlay(&self) -> &Mask {
        &self.overlay
    }

    /// Locked color at a cell, or the falling shape's color if it covers it.
    pub fn visual_cell(&self, row: usize, col: usize) -> u8 {
        match self.grid.get(row, col) {
            Some(0) => self.overlay.get(row, col).unwrap_or(0),
            Some(color) => color,
            None => 0,
        }
    }

    /// Locked cells with the falling shape on top.
    pub fn render_grid(&self) -> Grid {
        let mut visual = self.grid.clone();
        if self.phase != Phase::GameOver {
            visual.stamp(&self.shape);
        }
        visual
    }

    pub fn score(&self) -> u64 {
        self.scoring.score
    }

    pub fn level(&self) -> u32 {
        self.scoring.level
    }

    pub fn streak(&self) -> u32 {
        self.scoring.streak
    }

    pub fn drop_time(&self) -> u32 {
        self.scoring.drop_time
    }

    pub fn poll_timeout(&self) -> Duration {
        self.scoring.poll_timeout()
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn is_game_over(&self) -> bool {
        self.phase == Phase::GameOver
    }

    pub fn top_row(&self) -> i32 {
        self.top_row
    }

    /// Takes and clears all pending events
    pub fn take_events(&mut self) -> Vec<GameEvent> {
        std::mem::take(&mut self.events)
    }
}

impl Default for Game {
    fn default() -> Self {
        Self::new()
    }
}

// ============================================================================
// Test Helpers
// ============================================================================

pub mod test_helpers {
    use crate::grid::{Grid, COLS};

    pub const FILLER: u8 = 6;

    pub fn empty_grid() -> Grid {
        Grid::new()
    }

    pub fn fill_row(grid: &mut Grid, row: usize) {
        for col in 0..COLS {
            grid.set(row, col, FILLER);
        }
    }

    pub fn fill_row_with_gap(grid: &mut Grid, row: usize, gap_col: usize) {
        for col in 0..COLS {
            if col != gap_col {
                grid.set(row, col, FILLER);
            }
        }
    }
}
