//! Falling-block puzzle engine.
//!
//! A 10x20 [`Grid`](grid::Grid) of color ids, seven 4x4 [`Shape`](shape::Shape)
//! templates, scratch-mask collision predicates, row clearing with downward
//! coalescing, and streak-based scoring. [`Game`](game::Game) drives the
//! spawn / fall / lock / clear cycle; rendering and input live in the binary.

pub mod collision;
pub mod config;
pub mod error;
pub mod game;
pub mod grid;
pub mod scoring;
pub mod shape;

pub use collision::{test_collision, Collider};
pub use config::GameConfig;
pub use error::EngineError;
pub use game::{Action, Game, GameEvent, Outcome, Phase, PieceProvider};
pub use grid::{Grid, Mask, COLS, ROWS};
pub use scoring::ScoreState;
pub use shape::{Shape, ShapeKind};
