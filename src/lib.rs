//! Snake Coach - a terminal Snake game with a learning collision coach
//!
//! This library provides:
//! - Core game logic (game module)
//! - Per-tick feature logging, offline training, and look-ahead warnings (coach module)
//! - The play session tying both together (session module)
//! - TUI rendering and input handling (render, input modules)
//! - Interactive and offline-training execution modes (modes module)

pub mod coach;
pub mod error;
pub mod game;
pub mod input;
pub mod metrics;
pub mod modes;
pub mod render;
pub mod session;

pub use error::CoachError;
