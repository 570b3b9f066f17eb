//! Terminal "game renderer" module.
//!
//! This is a small, game-oriented rendering layer for terminal gameplay.
//! The view step is pure (session state in, text lines out) so it can be
//! unit-tested without a terminal; the renderer flushes lines via crossterm.

pub mod game_view;
pub mod renderer;

pub use math_pinball_core as core;
pub use math_pinball_types as types;

pub use game_view::{format_timer, GameView};
pub use renderer::TerminalRenderer;
