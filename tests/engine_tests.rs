//! Integration tests for the equation engine round lifecycle.

use math_pinball::core::{EngineEvent, EquationEngine};
use math_pinball::types::{
    EngineConfig, EngineState, EvaluationResult, FailureKind, DEFAULT_EVALUATION_DELAY_MS,
};

fn immediate_engine() -> EquationEngine {
    EquationEngine::new(EngineConfig {
        evaluation_delay_ms: 0,
        ..EngineConfig::default()
    })
}

#[test]
fn test_round_lifecycle_success() {
    let mut engine = immediate_engine();
    assert_eq!(engine.state(), EngineState::Idle);

    engine.strike("7").unwrap();
    engine.strike("*").unwrap();
    engine.strike("8").unwrap();

    let events = engine.drain_events();
    let round = events.iter().find_map(|e| match e {
        EngineEvent::RoundEvaluated { result, award } => Some((*result, *award)),
        _ => None,
    });
    let (result, award) = round.expect("round should have settled");
    assert_eq!(result, EvaluationResult::Success { value: 56.0 });
    // base 56 + operation bonus 10
    assert_eq!(award, 66);

    // Round cleared back to a fresh state.
    assert_eq!(engine.state(), EngineState::Idle);
    assert_eq!(engine.sequence_len(), 0);
    assert_eq!(engine.display_text(), "");
}

#[test]
fn test_settle_delay_holds_evaluation() {
    let mut engine = EquationEngine::new(EngineConfig::default());

    engine.strike("1").unwrap();
    engine.strike("+").unwrap();
    engine.strike("2").unwrap();

    assert_eq!(engine.state(), EngineState::Evaluating);
    assert!(engine.is_evaluation_pending());

    engine.tick(DEFAULT_EVALUATION_DELAY_MS - 16);
    assert!(engine.is_evaluation_pending());

    engine.tick(16);
    let events = engine.drain_events();
    assert!(events
        .iter()
        .any(|e| matches!(e, EngineEvent::RoundEvaluated { .. })));
    assert_eq!(engine.state(), EngineState::Idle);
}

#[test]
fn test_strikes_dropped_while_round_closing() {
    let mut engine = EquationEngine::new(EngineConfig::default());

    engine.strike("1").unwrap();
    engine.strike("+").unwrap();
    engine.strike("2").unwrap();
    assert_eq!(engine.state(), EngineState::Evaluating);

    // The round is settling; further strikes bounce off.
    assert_eq!(engine.strike("5"), Ok(false));
    assert_eq!(engine.sequence_len(), 3);
}

#[test]
fn test_unknown_symbol_fails_round_and_clears() {
    let mut engine = EquationEngine::new(EngineConfig::default());
    engine.strike("4").unwrap();

    let err = engine.strike("%");
    assert_eq!(err, Err(FailureKind::MalformedToken));

    let events = engine.drain_events();
    let failure = events.iter().find_map(|e| match e {
        EngineEvent::RoundEvaluated { result, award } => Some((*result, *award)),
        _ => None,
    });
    let (result, award) = failure.expect("failure round expected");
    assert_eq!(
        result,
        EvaluationResult::Failure {
            kind: FailureKind::MalformedToken
        }
    );
    assert_eq!(award, 0);
    assert_eq!(engine.sequence_len(), 0);
    assert_eq!(engine.state(), EngineState::Idle);
}

#[test]
fn test_capacity_forces_evaluation_of_incomplete_sequence() {
    let mut engine = EquationEngine::new(EngineConfig {
        max_equation_length: 4,
        ..EngineConfig::default()
    });

    // Never complete: ends on an operator at every step.
    engine.strike("1").unwrap();
    engine.strike("+").unwrap();
    engine.strike("+").unwrap();
    engine.strike("+").unwrap();

    let events = engine.drain_events();
    let round = events.iter().find_map(|e| match e {
        EngineEvent::RoundEvaluated { result, .. } => Some(*result),
        _ => None,
    });
    assert_eq!(
        round.expect("forced evaluation expected"),
        EvaluationResult::Failure {
            kind: FailureKind::MalformedSequence
        }
    );
}

#[test]
fn test_division_by_zero_round() {
    let mut engine = immediate_engine();
    engine.strike("8").unwrap();
    engine.strike("/").unwrap();
    engine.strike("0").unwrap();

    let events = engine.drain_events();
    let round = events.iter().find_map(|e| match e {
        EngineEvent::RoundEvaluated { result, award } => Some((*result, *award)),
        _ => None,
    });
    let (result, award) = round.expect("round expected");
    assert_eq!(
        result,
        EvaluationResult::Failure {
            kind: FailureKind::DivisionByZero
        }
    );
    assert_eq!(award, 0);
}

#[test]
fn test_clear_cancels_pending_evaluation() {
    let mut engine = EquationEngine::new(EngineConfig::default());
    engine.strike("1").unwrap();
    engine.strike("+").unwrap();
    engine.strike("2").unwrap();
    assert!(engine.is_evaluation_pending());

    engine.clear_equation();
    assert!(!engine.is_evaluation_pending());
    assert_eq!(engine.state(), EngineState::Idle);

    // Enough time for the old timer; nothing should fire.
    engine.tick(DEFAULT_EVALUATION_DELAY_MS * 2);
    let events = engine.drain_events();
    assert!(!events
        .iter()
        .any(|e| matches!(e, EngineEvent::RoundEvaluated { .. })));
}

#[test]
fn test_display_events_track_strikes() {
    let mut engine = EquationEngine::new(EngineConfig::default());
    engine.strike("2").unwrap();
    engine.strike("+").unwrap();

    let events = engine.drain_events();
    let texts: Vec<String> = events
        .into_iter()
        .filter_map(|e| match e {
            EngineEvent::DisplayChanged { text } => Some(text),
            _ => None,
        })
        .collect();
    assert_eq!(texts, vec!["2".to_string(), "2 +".to_string()]);
}

#[test]
fn test_multi_digit_number_symbols() {
    let mut engine = immediate_engine();
    engine.strike("12").unwrap();
    engine.strike("+").unwrap();
    engine.strike("30").unwrap();

    let events = engine.drain_events();
    let round = events.iter().find_map(|e| match e {
        EngineEvent::RoundEvaluated { result, .. } => Some(*result),
        _ => None,
    });
    assert_eq!(round, Some(EvaluationResult::Success { value: 42.0 }));
}
