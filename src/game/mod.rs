//! Core game logic module for Snake
//!
//! This module contains all the game rules without any I/O or rendering
//! dependencies: entity model, spawning, and the per-tick simulation step.

pub mod action;
pub mod config;
pub mod engine;
pub mod spawn;
pub mod state;

// Re-export commonly used types
pub use action::{Action, Direction};
pub use config::GameConfig;
pub use engine::{GameEngine, StepInfo, StepResult};
pub use spawn::Spawner;
pub use state::{
    CollisionType, GameState, Position, PowerUp, Snake, SnakeColor, obstacle_layout,
};
