//! Core game logic module - pure, deterministic, and testable
//!
//! This module contains all the equation rules, round state management, and
//! scoring logic. It has **zero dependencies** on UI, networking, or I/O,
//! making it:
//!
//! - **Deterministic**: Same strikes and seed produce identical rounds
//! - **Testable**: Comprehensive unit tests for all equation rules
//! - **Portable**: Can run in any environment (terminal, remote, headless)
//!
//! # Module Structure
//!
//! - [`sequence`]: the accumulated token sequence and completeness predicate
//! - [`eval`]: two-pass precedence-aware arithmetic evaluation
//! - [`scoring`]: award computation and level star ratings
//! - [`engine`]: the equation engine round state machine and its events
//! - [`level`]: level configuration and the running session
//! - [`rng`]: deterministic ball-deck generation for a level board
//!
//! # Game Rules
//!
//! A ball striking a numbered or operator sphere contributes one token to
//! the running equation. When the tokens form a complete equation (number,
//! operator, number, alternating, ending on a number) the engine evaluates
//! it after a short settle delay, respecting `*`/`/` precedence, and awards
//! points from the result's magnitude plus bonuses for longer chains and
//! multiplicative operators. Failures (bad symbol, broken structure,
//! division by zero) award nothing and reset the round; the engine never
//! panics across its boundary.
//!
//! # Example
//!
//! ```
//! use math_pinball_core::engine::{EngineEvent, EquationEngine};
//! use math_pinball_core::types::EngineConfig;
//!
//! let mut engine = EquationEngine::new(EngineConfig {
//!     evaluation_delay_ms: 0,
//!     ..EngineConfig::default()
//! });
//!
//! for symbol in ["2", "+", "3"] {
//!     engine.strike(symbol).unwrap();
//! }
//!
//! let awards: Vec<i64> = engine
//!     .drain_events()
//!     .into_iter()
//!     .filter_map(|e| match e {
//!         EngineEvent::RoundEvaluated { award, .. } => Some(award),
//!         _ => None,
//!     })
//!     .collect();
//! assert_eq!(awards, vec![5]);
//! ```
//!
//! # Timing
//!
//! The engine is driven by the host's fixed-timestep loop: call
//! [`engine::EquationEngine::tick`] every frame with elapsed milliseconds to
//! advance the settle delay, and [`level::LevelSession::tick`] to advance
//! the level countdown.

pub mod engine;
pub mod eval;
pub mod level;
pub mod rng;
pub mod scoring;
pub mod sequence;

pub use math_pinball_types as types;

// Re-export commonly used types for convenience
pub use engine::{EngineEvent, EquationEngine};
pub use eval::evaluate;
pub use level::{default_levels, LevelConfig, LevelSession, LevelStatus};
pub use rng::{BallDeck, OperatorBag, SimpleRng};
pub use scoring::{calculate_award, calculate_stars, AwardBreakdown};
pub use sequence::{parse_equation, render_tokens, EquationSequence};
