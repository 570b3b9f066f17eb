use criterion::{black_box, criterion_group, criterion_main, Criterion};
use math_pinball::core::{evaluate, parse_equation, EngineEvent, EquationEngine};
use math_pinball::types::{EngineConfig, Token};

fn bench_evaluate_mixed(c: &mut Criterion) {
    let tokens = parse_equation("2 + 3 * 4 - 6 / 2 + 9").expect("valid equation");

    c.bench_function("evaluate_mixed_precedence", |b| {
        b.iter(|| evaluate(black_box(&tokens)))
    });
}

fn bench_evaluate_long_chain(c: &mut Criterion) {
    let mut tokens = vec![Token::Number(1.0)];
    for i in 0..63 {
        tokens.push(Token::Operator(if i % 2 == 0 {
            math_pinball::types::Operator::Mul
        } else {
            math_pinball::types::Operator::Add
        }));
        tokens.push(Token::Number((i % 7 + 1) as f64));
    }

    c.bench_function("evaluate_long_chain", |b| {
        b.iter(|| evaluate(black_box(&tokens)))
    });
}

fn bench_strike_round(c: &mut Criterion) {
    let config = EngineConfig {
        evaluation_delay_ms: 0,
        ..EngineConfig::default()
    };

    c.bench_function("strike_round_immediate", |b| {
        b.iter(|| {
            let mut engine = EquationEngine::new(config.clone());
            engine.strike("7").unwrap();
            engine.strike("*").unwrap();
            engine.strike("8").unwrap();
            let events = engine.drain_events();
            black_box(events)
        })
    });
}

fn bench_tick(c: &mut Criterion) {
    let mut engine = EquationEngine::new(EngineConfig::default());
    engine.strike("1").unwrap();
    engine.strike("+").unwrap();

    c.bench_function("engine_tick_16ms", |b| {
        b.iter(|| {
            engine.tick(black_box(16));
            // Keep the event queue from growing across iterations.
            let events = engine.drain_events();
            debug_assert!(matches!(
                events.first(),
                None | Some(EngineEvent::DisplayChanged { .. })
                    | Some(EngineEvent::RoundEvaluated { .. })
            ));
        })
    });
}

criterion_group!(
    benches,
    bench_evaluate_mixed,
    bench_evaluate_long_chain,
    bench_strike_round,
    bench_tick
);
criterion_main!(benches);
