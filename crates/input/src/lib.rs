//! Terminal input module (engine-facing).
//!
//! This module is intentionally independent of any UI framework. It maps
//! `crossterm` key events into [`crate::types::GameCommand`] so the game loop
//! never touches raw terminal events directly.

pub mod map;

pub use math_pinball_types as types;

pub use map::{handle_key_event, should_quit};
