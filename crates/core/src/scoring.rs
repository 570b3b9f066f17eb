//! Scoring module - point awards and level star ratings
//!
//! The award policy rewards longer chains and harder operators:
//! absolute rounded result as the base, a flat bonus per token beyond the
//! minimal 3-token form, and a flat bonus per `*`/`/` used.

use crate::types::{Token, COMPLEXITY_BONUS_STEP, MIN_COMPLETE_LENGTH, OPERATION_BONUS};

/// Breakdown of one round's score award
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct AwardBreakdown {
    /// `max(1, round(|result|))`
    pub base_points: i64,
    /// `(sequence length - 3) * 5`
    pub complexity_bonus: i64,
    /// `10` per multiplication/division operator
    pub operation_bonus: i64,
    pub total: i64,
}

/// Count multiplication/division operators in a sequence.
pub fn count_multiplicative(tokens: &[Token]) -> usize {
    tokens
        .iter()
        .filter(|t| matches!(t, Token::Operator(op) if op.is_multiplicative()))
        .count()
}

/// Compute the award for a successful evaluation result over `tokens`.
pub fn calculate_award(result: f64, tokens: &[Token]) -> AwardBreakdown {
    let base_points = (result.abs().round() as i64).max(1);
    let complexity_bonus =
        (tokens.len() as i64 - MIN_COMPLETE_LENGTH as i64) * COMPLEXITY_BONUS_STEP;
    let operation_bonus = count_multiplicative(tokens) as i64 * OPERATION_BONUS;

    AwardBreakdown {
        base_points,
        complexity_bonus,
        operation_bonus,
        total: base_points + complexity_bonus + operation_bonus,
    }
}

/// Star rating for a completed level.
///
/// Based on how far past the target the final score landed, with one bonus
/// star (capped at 3) when more than half the time limit remains.
pub fn calculate_stars(score: i64, target_score: i64, remaining_ms: u32, time_limit_ms: u32) -> u8 {
    if target_score <= 0 {
        return 3;
    }

    let score_ratio = score as f64 / target_score as f64;
    let mut stars: u8 = if score_ratio >= 1.5 {
        3
    } else if score_ratio >= 1.2 {
        2
    } else {
        1
    };

    if time_limit_ms > 0 {
        let time_ratio = remaining_ms as f64 / time_limit_ms as f64;
        if time_ratio > 0.5 && stars < 3 {
            stars += 1;
        }
    }

    stars
}
