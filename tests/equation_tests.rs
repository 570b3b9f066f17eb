//! Integration tests for parsing, evaluation and scoring end to end.

use math_pinball::core::{calculate_award, evaluate, parse_equation, render_tokens};
use math_pinball::types::FailureKind;

#[test]
fn test_parse_evaluate_score_pipeline() {
    let tokens = parse_equation("2 + 3 * 4").expect("valid equation");
    assert_eq!(render_tokens(&tokens), "2 + 3 * 4");

    let value = evaluate(&tokens).expect("evaluates");
    assert_eq!(value, 14.0);

    let award = calculate_award(value, &tokens);
    // base 14 + complexity (5 - 3) * 5 + one multiplicative bonus 10
    assert_eq!(award.base_points, 14);
    assert_eq!(award.complexity_bonus, 10);
    assert_eq!(award.operation_bonus, 10);
    assert_eq!(award.total, 34);
}

#[test]
fn test_precedence_and_left_associativity() {
    let cases = [
        ("2 + 3 * 4", 14.0),
        ("10 - 2 - 3", 5.0),
        ("12 / 4 * 3", 9.0),
        ("8 / 2 / 2", 2.0),
        ("1 + 2 * 3 - 4 / 2", 5.0),
    ];
    for (input, expected) in cases {
        let tokens = parse_equation(input).expect("valid equation");
        assert_eq!(evaluate(&tokens), Ok(expected), "{}", input);
    }
}

#[test]
fn test_negative_result_still_awards_points() {
    let tokens = parse_equation("2 - 9").expect("valid equation");
    let value = evaluate(&tokens).unwrap();
    assert_eq!(value, -7.0);

    let award = calculate_award(value, &tokens);
    assert_eq!(award.base_points, 7);
}

#[test]
fn test_tiny_result_awards_minimum_base() {
    let tokens = parse_equation("1 / 4").expect("valid equation");
    let value = evaluate(&tokens).unwrap();
    assert_eq!(value, 0.25);

    let award = calculate_award(value, &tokens);
    assert_eq!(award.base_points, 1);
}

#[test]
fn test_malformed_and_division_failures() {
    let div = parse_equation("5 / 0").unwrap();
    assert_eq!(evaluate(&div), Err(FailureKind::DivisionByZero));

    let trailing = parse_equation("5 +").unwrap();
    assert_eq!(evaluate(&trailing), Err(FailureKind::MalformedSequence));

    let short = parse_equation("5").unwrap();
    assert_eq!(evaluate(&short), Err(FailureKind::MalformedSequence));

    assert!(parse_equation("5 # 3").is_none());
}
