//! Core types module - shared data structures and constants
//!
//! This module defines the fundamental types used throughout the application.
//! All types are pure data structures with no external dependencies, making
//! them usable in any context (core logic, terminal UI, remote adapter).
//!
//! # Equation rules
//!
//! An equation is an alternating sequence of number and operator tokens that
//! starts and ends with a number. The shortest complete equation is
//! `number operator number` (3 tokens). Evaluation respects standard
//! precedence: `*` and `/` resolve before `+` and `-`.
//!
//! # Timing constants
//!
//! Timing values are in milliseconds:
//!
//! | Constant | Value | Description |
//! |----------|-------|-------------|
//! | `TICK_MS` | 16 | Fixed timestep interval (~60 FPS) |
//! | `DEFAULT_EVALUATION_DELAY_MS` | 500 | Settle delay before a complete equation evaluates |
//! | `FEEDBACK_DURATION_MS` | 2000 | How long round feedback stays on screen |
//! | `LOW_TIME_WARNING_MS` | 10000 | Timer highlight threshold |
//!
//! # Scoring constants
//!
//! A successful round awards `base + complexity + operation` points where
//! `base = max(1, round(|result|))`, `complexity = (len - 3) *
//! COMPLEXITY_BONUS_STEP` and `operation = OPERATION_BONUS` per `*`/`/` used.
//!
//! # Examples
//!
//! ```
//! use math_pinball_types::{Operator, Token};
//!
//! // Classify collision symbols into tokens
//! let seven = Token::from_symbol("7").unwrap();
//! assert_eq!(seven, Token::Number(7.0));
//!
//! let times = Token::from_symbol("*").unwrap();
//! assert_eq!(times, Token::Operator(Operator::Mul));
//! assert!(Operator::Mul.is_multiplicative());
//!
//! // Tokens render back to the symbol that produced them
//! assert_eq!(seven.render(), "7");
//! assert_eq!(times.render(), "*");
//! ```

/// Fixed timestep interval in milliseconds (16ms ≈ 60 FPS)
pub const TICK_MS: u32 = 16;

/// Maximum number of tokens accumulated before evaluation is forced
pub const DEFAULT_MAX_EQUATION_LENGTH: usize = 10;

/// Settle delay between a sequence becoming complete and evaluation (500ms)
pub const DEFAULT_EVALUATION_DELAY_MS: u32 = 500;

/// Minimum token count for a complete equation (number, operator, number)
pub const MIN_COMPLETE_LENGTH: usize = 3;

/// Bonus points per token beyond the minimal 3-token equation
pub const COMPLEXITY_BONUS_STEP: i64 = 5;

/// Bonus points per multiplication/division operator used
pub const OPERATION_BONUS: i64 = 10;

/// How long round feedback stays visible (2s)
pub const FEEDBACK_DURATION_MS: u32 = 2000;

/// Remaining time below which the timer is highlighted (10s)
pub const LOW_TIME_WARNING_MS: u32 = 10_000;

/// Arithmetic operators recognized by the engine
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operator {
    Add,
    Sub,
    Mul,
    Div,
}

impl Operator {
    /// Parse an operator from its symbol string
    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "+" => Some(Operator::Add),
            "-" => Some(Operator::Sub),
            "*" => Some(Operator::Mul),
            "/" => Some(Operator::Div),
            _ => None,
        }
    }

    /// Parse an operator from a single character
    pub fn from_char(c: char) -> Option<Self> {
        match c {
            '+' => Some(Operator::Add),
            '-' => Some(Operator::Sub),
            '*' => Some(Operator::Mul),
            '/' => Some(Operator::Div),
            _ => None,
        }
    }

    /// Symbol string for this operator
    pub fn as_str(&self) -> &'static str {
        match self {
            Operator::Add => "+",
            Operator::Sub => "-",
            Operator::Mul => "*",
            Operator::Div => "/",
        }
    }

    /// Whether this operator resolves in the first evaluation pass
    pub fn is_multiplicative(&self) -> bool {
        matches!(self, Operator::Mul | Operator::Div)
    }

    /// All four operators, in display order
    pub const ALL: [Operator; 4] = [Operator::Add, Operator::Sub, Operator::Mul, Operator::Div];
}

/// A single contributed equation unit: a number or an operator.
///
/// Tokens are immutable once created; they are produced by classifying the
/// symbol carried by a ball-collision event and consumed in arrival order.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Token {
    Number(f64),
    Operator(Operator),
}

impl Token {
    /// Classify a collision symbol into a token.
    ///
    /// Accepts the four operator glyphs and any string that parses as a
    /// finite number (`"7"`, `"12"`, `"2.5"`). Returns `None` for anything
    /// else; callers surface that as [`FailureKind::MalformedToken`].
    pub fn from_symbol(symbol: &str) -> Option<Self> {
        if let Some(op) = Operator::from_str(symbol) {
            return Some(Token::Operator(op));
        }
        match symbol.trim().parse::<f64>() {
            Ok(v) if v.is_finite() => Some(Token::Number(v)),
            _ => None,
        }
    }

    pub fn is_number(&self) -> bool {
        matches!(self, Token::Number(_))
    }

    pub fn is_operator(&self) -> bool {
        matches!(self, Token::Operator(_))
    }

    /// Render the token back to its display symbol.
    ///
    /// Whole numbers render without a decimal point so that a rendered
    /// equation re-tokenizes to the exact sequence that produced it.
    pub fn render(&self) -> String {
        match self {
            Token::Number(v) => format_number(*v),
            Token::Operator(op) => op.as_str().to_string(),
        }
    }
}

/// Format a numeric value for display: integers without a trailing `.0`.
pub fn format_number(v: f64) -> String {
    if v.fract() == 0.0 && v.abs() < 1e15 {
        format!("{}", v as i64)
    } else {
        format!("{}", v)
    }
}

/// Why a round failed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FailureKind {
    /// Unrecognized symbol handed to the engine; never stored.
    MalformedToken,
    /// Structural invariant violated at evaluation time (chiefly forced
    /// evaluation of an incomplete sequence).
    MalformedSequence,
    /// A `/` step with a zero right operand.
    DivisionByZero,
}

impl FailureKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            FailureKind::MalformedToken => "malformedToken",
            FailureKind::MalformedSequence => "malformedSequence",
            FailureKind::DivisionByZero => "divisionByZero",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "malformedToken" => Some(FailureKind::MalformedToken),
            "malformedSequence" => Some(FailureKind::MalformedSequence),
            "divisionByZero" => Some(FailureKind::DivisionByZero),
            _ => None,
        }
    }
}

/// Outcome of one evaluated round.
///
/// Produced once per completed/forced round and consumed immediately by the
/// scoring step; the engine does not keep it.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum EvaluationResult {
    Success { value: f64 },
    Failure { kind: FailureKind },
}

impl EvaluationResult {
    pub fn is_success(&self) -> bool {
        matches!(self, EvaluationResult::Success { .. })
    }

    pub fn value(&self) -> Option<f64> {
        match self {
            EvaluationResult::Success { value } => Some(*value),
            EvaluationResult::Failure { .. } => None,
        }
    }

    pub fn failure_kind(&self) -> Option<FailureKind> {
        match self {
            EvaluationResult::Success { .. } => None,
            EvaluationResult::Failure { kind } => Some(*kind),
        }
    }
}

/// Engine round state.
///
/// `Evaluating` and `Resetting` are transient round-close states; tokens
/// struck while the engine is in either of them are dropped, never queued.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EngineState {
    Idle,
    Accumulating,
    Evaluating,
    Resetting,
}

/// Engine configuration, supplied once at construction.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EngineConfig {
    /// Reaching this many tokens forces evaluation.
    pub max_equation_length: usize,
    /// When false only minimal 3-token equations are considered complete.
    pub allow_multiple_operators: bool,
    /// Settle delay between completeness and evaluation; zero is valid.
    pub evaluation_delay_ms: u32,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            max_equation_length: DEFAULT_MAX_EQUATION_LENGTH,
            allow_multiple_operators: true,
            evaluation_delay_ms: DEFAULT_EVALUATION_DELAY_MS,
        }
    }
}

/// Player commands produced by the input layer
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum GameCommand {
    /// Strike a token symbol (digit or operator key).
    Strike(char),
    /// Clear the in-progress equation.
    Clear,
    Pause,
    Restart,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_operator_round_trip() {
        for op in Operator::ALL {
            assert_eq!(Operator::from_str(op.as_str()), Some(op));
            let c = op.as_str().chars().next().unwrap();
            assert_eq!(Operator::from_char(c), Some(op));
        }
        assert_eq!(Operator::from_str("%"), None);
        assert_eq!(Operator::from_char('x'), None);
    }

    #[test]
    fn test_multiplicative_split() {
        assert!(Operator::Mul.is_multiplicative());
        assert!(Operator::Div.is_multiplicative());
        assert!(!Operator::Add.is_multiplicative());
        assert!(!Operator::Sub.is_multiplicative());
    }

    #[test]
    fn test_token_classification() {
        assert_eq!(Token::from_symbol("7"), Some(Token::Number(7.0)));
        assert_eq!(Token::from_symbol("12"), Some(Token::Number(12.0)));
        assert_eq!(Token::from_symbol("2.5"), Some(Token::Number(2.5)));
        assert_eq!(
            Token::from_symbol("/"),
            Some(Token::Operator(Operator::Div))
        );
        assert_eq!(Token::from_symbol("banana"), None);
        assert_eq!(Token::from_symbol(""), None);
        assert_eq!(Token::from_symbol("inf"), None);
        assert_eq!(Token::from_symbol("NaN"), None);
    }

    #[test]
    fn test_token_render() {
        assert_eq!(Token::Number(7.0).render(), "7");
        assert_eq!(Token::Number(-3.0).render(), "-3");
        assert_eq!(Token::Number(2.5).render(), "2.5");
        assert_eq!(Token::Operator(Operator::Add).render(), "+");
    }

    #[test]
    fn test_format_number() {
        assert_eq!(format_number(14.0), "14");
        assert_eq!(format_number(0.0), "0");
        assert_eq!(format_number(-2.0), "-2");
        assert_eq!(format_number(1.5), "1.5");
    }

    #[test]
    fn test_failure_kind_round_trip() {
        for kind in [
            FailureKind::MalformedToken,
            FailureKind::MalformedSequence,
            FailureKind::DivisionByZero,
        ] {
            assert_eq!(FailureKind::from_str(kind.as_str()), Some(kind));
        }
        assert_eq!(FailureKind::from_str("nope"), None);
    }

    #[test]
    fn test_evaluation_result_accessors() {
        let ok = EvaluationResult::Success { value: 14.0 };
        assert!(ok.is_success());
        assert_eq!(ok.value(), Some(14.0));
        assert_eq!(ok.failure_kind(), None);

        let err = EvaluationResult::Failure {
            kind: FailureKind::DivisionByZero,
        };
        assert!(!err.is_success());
        assert_eq!(err.value(), None);
        assert_eq!(err.failure_kind(), Some(FailureKind::DivisionByZero));
    }

    #[test]
    fn test_default_engine_config() {
        let config = EngineConfig::default();
        assert_eq!(config.max_equation_length, DEFAULT_MAX_EQUATION_LENGTH);
        assert!(config.allow_multiple_operators);
        assert_eq!(config.evaluation_delay_ms, DEFAULT_EVALUATION_DELAY_MS);
    }
}
