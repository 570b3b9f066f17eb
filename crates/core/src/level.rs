//! Level module - per-level configuration and the running session
//!
//! A level supplies the engine's configuration (allowed operators, value
//! ranges, equation bounds) and a target score with an optional countdown.
//! The session tracks the running total, completes the level when the target
//! is reached, fails it on timeout, and grades the result in stars.

use crate::scoring::calculate_stars;
use crate::types::{
    EngineConfig, Operator, DEFAULT_EVALUATION_DELAY_MS, DEFAULT_MAX_EQUATION_LENGTH,
    LOW_TIME_WARNING_MS,
};

/// Static configuration for one level.
#[derive(Debug, Clone, PartialEq)]
pub struct LevelConfig {
    pub name: String,
    pub target_score: i64,
    /// Countdown in milliseconds; 0 means untimed.
    pub time_limit_ms: u32,
    pub number_ball_count: usize,
    pub operator_ball_count: usize,
    pub allowed_operators: Vec<Operator>,
    pub min_number_value: i32,
    pub max_number_value: i32,
    pub max_equation_length: usize,
    pub allow_multiple_operators: bool,
    pub evaluation_delay_ms: u32,
}

impl LevelConfig {
    /// Engine configuration for this level.
    pub fn engine_config(&self) -> EngineConfig {
        EngineConfig {
            max_equation_length: self.max_equation_length,
            allow_multiple_operators: self.allow_multiple_operators,
            evaluation_delay_ms: self.evaluation_delay_ms,
        }
    }
}

impl Default for LevelConfig {
    fn default() -> Self {
        Self {
            name: "Level".to_string(),
            target_score: 100,
            time_limit_ms: 60_000,
            number_ball_count: 10,
            operator_ball_count: 5,
            allowed_operators: vec![Operator::Add, Operator::Sub],
            min_number_value: 1,
            max_number_value: 9,
            max_equation_length: DEFAULT_MAX_EQUATION_LENGTH,
            allow_multiple_operators: true,
            evaluation_delay_ms: DEFAULT_EVALUATION_DELAY_MS,
        }
    }
}

/// The three built-in levels: easy, medium, hard.
pub fn default_levels() -> Vec<LevelConfig> {
    vec![
        LevelConfig {
            name: "Level 1 - Addition".to_string(),
            target_score: 50,
            time_limit_ms: 90_000,
            number_ball_count: 8,
            operator_ball_count: 3,
            allowed_operators: vec![Operator::Add],
            min_number_value: 1,
            max_number_value: 5,
            ..LevelConfig::default()
        },
        LevelConfig {
            name: "Level 2 - Addition & Subtraction".to_string(),
            target_score: 100,
            time_limit_ms: 75_000,
            number_ball_count: 10,
            operator_ball_count: 5,
            allowed_operators: vec![Operator::Add, Operator::Sub],
            min_number_value: 1,
            max_number_value: 9,
            ..LevelConfig::default()
        },
        LevelConfig {
            name: "Level 3 - All Operations".to_string(),
            target_score: 150,
            time_limit_ms: 60_000,
            number_ball_count: 12,
            operator_ball_count: 8,
            allowed_operators: Operator::ALL.to_vec(),
            min_number_value: 1,
            max_number_value: 9,
            ..LevelConfig::default()
        },
    ]
}

/// Session lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LevelStatus {
    Playing,
    Complete,
    Failed,
}

/// One play-through of a level.
#[derive(Debug, Clone)]
pub struct LevelSession {
    config: LevelConfig,
    score: i64,
    remaining_ms: u32,
    paused: bool,
    status: LevelStatus,
    stars: u8,
}

impl LevelSession {
    pub fn new(config: LevelConfig) -> Self {
        let remaining_ms = config.time_limit_ms;
        Self {
            config,
            score: 0,
            remaining_ms,
            paused: false,
            status: LevelStatus::Playing,
            stars: 0,
        }
    }

    pub fn config(&self) -> &LevelConfig {
        &self.config
    }

    pub fn score(&self) -> i64 {
        self.score
    }

    pub fn remaining_ms(&self) -> u32 {
        self.remaining_ms
    }

    pub fn status(&self) -> LevelStatus {
        self.status
    }

    pub fn is_over(&self) -> bool {
        self.status != LevelStatus::Playing
    }

    pub fn paused(&self) -> bool {
        self.paused
    }

    /// Stars earned; meaningful once the level is complete.
    pub fn stars(&self) -> u8 {
        self.stars
    }

    /// Whether the timer should be highlighted as running out.
    pub fn low_time(&self) -> bool {
        self.config.time_limit_ms > 0
            && self.remaining_ms <= LOW_TIME_WARNING_MS
            && self.status == LevelStatus::Playing
    }

    pub fn toggle_pause(&mut self) {
        if self.status == LevelStatus::Playing {
            self.paused = !self.paused;
        }
    }

    /// Apply a round award; completes the level when the target is reached.
    ///
    /// Returns true if this award completed the level. Points arriving after
    /// the session is over are ignored.
    pub fn add_score(&mut self, points: i64) -> bool {
        if self.status != LevelStatus::Playing {
            return false;
        }

        self.score += points;
        if self.score >= self.config.target_score {
            self.status = LevelStatus::Complete;
            self.stars = calculate_stars(
                self.score,
                self.config.target_score,
                self.remaining_ms,
                self.config.time_limit_ms,
            );
            return true;
        }
        false
    }

    /// Advance the countdown; fails the session at zero.
    pub fn tick(&mut self, elapsed_ms: u32) {
        if self.status != LevelStatus::Playing || self.paused || self.config.time_limit_ms == 0 {
            return;
        }

        self.remaining_ms = self.remaining_ms.saturating_sub(elapsed_ms);
        if self.remaining_ms == 0 {
            self.status = LevelStatus::Failed;
        }
    }

    /// Restart the same level from scratch.
    pub fn restart(&mut self) {
        self.score = 0;
        self.remaining_ms = self.config.time_limit_ms;
        self.paused = false;
        self.status = LevelStatus::Playing;
        self.stars = 0;
    }
}
