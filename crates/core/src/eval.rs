//! Evaluation module - precedence-aware arithmetic over a token sequence
//!
//! Two-pass, left-to-right-per-tier evaluation: all `*`/`/` occurrences
//! collapse first, then `+`/`-` fold into a single accumulator. For the four
//! supported operators this is equivalent to standard arithmetic precedence
//! without building an expression tree.

use crate::types::{FailureKind, Operator, Token, MIN_COMPLETE_LENGTH};

/// Evaluate a token sequence.
///
/// The structural checks are deliberately defensive: forced evaluation can
/// hand this function a sequence that the completeness predicate would have
/// rejected (too short, operator-terminated, broken alternation). All such
/// shapes surface as [`FailureKind::MalformedSequence`]; division by zero
/// fails the whole evaluation with no partial result.
pub fn evaluate(tokens: &[Token]) -> Result<f64, FailureKind> {
    if tokens.len() < MIN_COMPLETE_LENGTH {
        return Err(FailureKind::MalformedSequence);
    }

    // Split operands (even positions) from operator symbols (odd positions).
    let mut operands: Vec<f64> = Vec::with_capacity(tokens.len() / 2 + 1);
    let mut operators: Vec<Operator> = Vec::with_capacity(tokens.len() / 2);
    for token in tokens {
        match token {
            Token::Number(v) => operands.push(*v),
            Token::Operator(op) => operators.push(*op),
        }
    }

    // Holds for every complete sequence; catches forced/incomplete shapes.
    if operands.len() != operators.len() + 1 {
        return Err(FailureKind::MalformedSequence);
    }

    // First pass: resolve * and / left to right. A collapse removes
    // operands[i + 1] and operators[i], shifting later entries down, so the
    // same index is re-examined instead of advancing.
    let mut i = 0;
    while i < operators.len() {
        let op = operators[i];
        if op.is_multiplicative() {
            let result = match op {
                Operator::Mul => operands[i] * operands[i + 1],
                Operator::Div => {
                    if operands[i + 1] == 0.0 {
                        return Err(FailureKind::DivisionByZero);
                    }
                    operands[i] / operands[i + 1]
                }
                Operator::Add | Operator::Sub => unreachable!(),
            };
            operands[i] = result;
            operands.remove(i + 1);
            operators.remove(i);
        } else {
            i += 1;
        }
    }

    // Second pass: fold the remaining + and - left to right.
    let mut acc = operands[0];
    for (i, op) in operators.iter().enumerate() {
        match op {
            Operator::Add => acc += operands[i + 1],
            Operator::Sub => acc -= operands[i + 1],
            Operator::Mul | Operator::Div => unreachable!(),
        }
    }

    Ok(acc)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn n(v: f64) -> Token {
        Token::Number(v)
    }

    fn op(o: Operator) -> Token {
        Token::Operator(o)
    }

    #[test]
    fn test_simple_addition() {
        assert_eq!(evaluate(&[n(2.0), op(Operator::Add), n(3.0)]), Ok(5.0));
    }

    #[test]
    fn test_additive_left_to_right_fold() {
        // 10 - 4 + 2 = 8 (left to right, no precedence ambiguity)
        let tokens = [
            n(10.0),
            op(Operator::Sub),
            n(4.0),
            op(Operator::Add),
            n(2.0),
        ];
        assert_eq!(evaluate(&tokens), Ok(8.0));
    }

    #[test]
    fn test_precedence_mul_before_add() {
        // 2 + 3 * 4 = 14, not 20
        let tokens = [
            n(2.0),
            op(Operator::Add),
            n(3.0),
            op(Operator::Mul),
            n(4.0),
        ];
        assert_eq!(evaluate(&tokens), Ok(14.0));
    }

    #[test]
    fn test_precedence_div_before_sub() {
        // 10 - 8 / 4 = 8
        let tokens = [
            n(10.0),
            op(Operator::Sub),
            n(8.0),
            op(Operator::Div),
            n(4.0),
        ];
        assert_eq!(evaluate(&tokens), Ok(8.0));
    }

    #[test]
    fn test_consecutive_multiplicative_chain() {
        // 2 * 3 * 4 + 1 = 25; exercises re-examining the collapsed index.
        let tokens = [
            n(2.0),
            op(Operator::Mul),
            n(3.0),
            op(Operator::Mul),
            n(4.0),
            op(Operator::Add),
            n(1.0),
        ];
        assert_eq!(evaluate(&tokens), Ok(25.0));
    }

    #[test]
    fn test_division_result_fractional() {
        let tokens = [n(7.0), op(Operator::Div), n(2.0)];
        assert_eq!(evaluate(&tokens), Ok(3.5));
    }

    #[test]
    fn test_division_by_zero() {
        let tokens = [n(8.0), op(Operator::Div), n(0.0)];
        assert_eq!(evaluate(&tokens), Err(FailureKind::DivisionByZero));
    }

    #[test]
    fn test_division_by_zero_mid_sequence_no_partial_result() {
        // 1 + 8 / 0 fails the whole evaluation.
        let tokens = [
            n(1.0),
            op(Operator::Add),
            n(8.0),
            op(Operator::Div),
            n(0.0),
        ];
        assert_eq!(evaluate(&tokens), Err(FailureKind::DivisionByZero));
    }

    #[test]
    fn test_too_short_is_malformed() {
        assert_eq!(evaluate(&[]), Err(FailureKind::MalformedSequence));
        assert_eq!(evaluate(&[n(1.0)]), Err(FailureKind::MalformedSequence));
        assert_eq!(
            evaluate(&[n(1.0), op(Operator::Add)]),
            Err(FailureKind::MalformedSequence)
        );
    }

    #[test]
    fn test_operator_terminated_is_malformed() {
        let tokens = [n(1.0), op(Operator::Add), n(2.0), op(Operator::Add)];
        assert_eq!(evaluate(&tokens), Err(FailureKind::MalformedSequence));
    }

    #[test]
    fn test_operand_heavy_is_malformed() {
        let tokens = [n(1.0), n(2.0), n(3.0)];
        assert_eq!(evaluate(&tokens), Err(FailureKind::MalformedSequence));
    }

    #[test]
    fn test_negative_result() {
        let tokens = [n(3.0), op(Operator::Sub), n(10.0)];
        assert_eq!(evaluate(&tokens), Ok(-7.0));
    }
}
