//! Equation engine - token accumulation, round state machine, evaluation
//!
//! The engine is driven by discrete external events: `strike` calls from a
//! collision source and `tick` calls from the host's fixed-timestep loop.
//! It owns the in-progress equation sequence exclusively, decides when the
//! sequence is ready, evaluates it, computes the award, and resets for the
//! next round. All outcomes (including failures) are reported as data
//! through a drained event queue; nothing panics or throws past this
//! boundary.
//!
//! # State machine
//!
//! `Idle` (empty, accepting) → `Accumulating` (1..N-1 tokens, accepting) →
//! `Evaluating` (complete or at capacity; settle timer may be running) →
//! `Resetting` (clearing) → `Idle`. The machine cycles indefinitely; there
//! is no terminal state.
//!
//! # Settle delay
//!
//! When the sequence becomes complete the engine waits
//! `evaluation_delay_ms` before evaluating so presentation can catch up.
//! The delay is cooperative: it only advances through [`EquationEngine::tick`],
//! strikes arriving while it runs are dropped, and a reset cancels it so a
//! stale evaluation can never fire against a cleared sequence.

use crate::eval::evaluate;
use crate::scoring::calculate_award;
use crate::sequence::EquationSequence;
use crate::types::{EngineConfig, EngineState, EvaluationResult, FailureKind, Token};

/// Outbound engine event, drained by the host loop.
#[derive(Debug, Clone, PartialEq)]
pub enum EngineEvent {
    /// The running equation text changed (token accepted or sequence
    /// cleared). The text re-tokenizes to the exact token sequence.
    DisplayChanged { text: String },
    /// One round closed: success or failure detail plus the award
    /// (zero on failure).
    RoundEvaluated {
        result: EvaluationResult,
        award: i64,
    },
}

/// The equation engine for one active game round.
///
/// Constructed once per level and handed by reference to the collision
/// source and presentation layer; no process-wide singleton.
#[derive(Debug, Clone)]
pub struct EquationEngine {
    config: EngineConfig,
    sequence: EquationSequence,
    state: EngineState,
    /// Remaining settle delay; meaningful only while `Evaluating`.
    settle_timer_ms: u32,
    events: Vec<EngineEvent>,
}

impl EquationEngine {
    pub fn new(config: EngineConfig) -> Self {
        Self {
            config,
            sequence: EquationSequence::new(),
            state: EngineState::Idle,
            settle_timer_ms: 0,
            events: Vec::new(),
        }
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn state(&self) -> EngineState {
        self.state
    }

    pub fn sequence_len(&self) -> usize {
        self.sequence.len()
    }

    /// Current running-equation text, e.g. `"2 + 3"`.
    pub fn display_text(&self) -> String {
        self.sequence.render()
    }

    /// Whether a settle-delayed evaluation is armed.
    pub fn is_evaluation_pending(&self) -> bool {
        self.state == EngineState::Evaluating && self.settle_timer_ms > 0
    }

    fn is_round_closing(&self) -> bool {
        matches!(self.state, EngineState::Evaluating | EngineState::Resetting)
    }

    /// Classify a struck symbol and feed it to the engine.
    ///
    /// Returns `Ok(true)` if the token was accepted, `Ok(false)` if it was
    /// dropped because a round is closing (a round boundary is not
    /// reentrant). An unrecognized symbol is never stored: the error comes
    /// back as data and the round is reported as failed with zero award.
    pub fn strike(&mut self, symbol: &str) -> Result<bool, FailureKind> {
        if self.is_round_closing() {
            return Ok(false);
        }

        match Token::from_symbol(symbol) {
            Some(token) => Ok(self.accept_token(token)),
            None => {
                self.events.push(EngineEvent::RoundEvaluated {
                    result: EvaluationResult::Failure {
                        kind: FailureKind::MalformedToken,
                    },
                    award: 0,
                });
                self.state = EngineState::Resetting;
                self.clear_equation();
                Err(FailureKind::MalformedToken)
            }
        }
    }

    /// Append a token to the sequence.
    ///
    /// Dropped (returns false) while a round is closing. Reaching the
    /// configured maximum length forces evaluation immediately, bypassing
    /// the settle delay, regardless of syntactic completeness.
    pub fn accept_token(&mut self, token: Token) -> bool {
        if self.is_round_closing() {
            return false;
        }

        self.sequence.push(token);
        self.state = EngineState::Accumulating;
        self.push_display_event();

        if self.sequence.len() >= self.config.max_equation_length {
            self.force_evaluate();
        } else if self
            .sequence
            .is_complete(self.config.allow_multiple_operators)
        {
            self.state = EngineState::Evaluating;
            if self.config.evaluation_delay_ms == 0 {
                self.evaluate_now();
            } else {
                self.settle_timer_ms = self.config.evaluation_delay_ms;
            }
        }

        true
    }

    /// Advance the settle timer; runs a pending evaluation on expiry.
    pub fn tick(&mut self, elapsed_ms: u32) {
        if self.state != EngineState::Evaluating || self.settle_timer_ms == 0 {
            return;
        }

        self.settle_timer_ms = self.settle_timer_ms.saturating_sub(elapsed_ms);
        if self.settle_timer_ms == 0 {
            self.evaluate_now();
        }
    }

    /// Evaluate whatever has been accumulated, complete or not.
    ///
    /// Used internally when the sequence hits capacity and externally when a
    /// round is cut off mid-flight; incomplete shapes surface as
    /// `MalformedSequence`.
    pub fn force_evaluate(&mut self) {
        if self.state == EngineState::Resetting {
            return;
        }
        self.evaluate_now();
    }

    fn evaluate_now(&mut self) {
        self.state = EngineState::Evaluating;
        self.settle_timer_ms = 0;

        let tokens = self.sequence.tokens();
        let (result, award) = match evaluate(tokens) {
            Ok(value) => (
                EvaluationResult::Success { value },
                calculate_award(value, tokens).total,
            ),
            Err(kind) => (EvaluationResult::Failure { kind }, 0),
        };

        self.events.push(EngineEvent::RoundEvaluated { result, award });

        self.state = EngineState::Resetting;
        self.clear_equation();
    }

    /// Unconditionally empty the sequence and return to `Idle`.
    ///
    /// Cancels any pending settle-delayed evaluation. Idempotent.
    pub fn clear_equation(&mut self) {
        self.settle_timer_ms = 0;
        self.sequence.clear();
        self.state = EngineState::Idle;
        self.push_display_event();
    }

    /// External reset (level restart, new round).
    pub fn reset(&mut self) {
        self.clear_equation();
    }

    /// Take all queued outbound events.
    pub fn drain_events(&mut self) -> Vec<EngineEvent> {
        std::mem::take(&mut self.events)
    }

    fn push_display_event(&mut self) {
        self.events.push(EngineEvent::DisplayChanged {
            text: self.sequence.render(),
        });
    }
}

impl Default for EquationEngine {
    fn default() -> Self {
        Self::new(EngineConfig::default())
    }
}
