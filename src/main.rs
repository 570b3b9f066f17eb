//! Terminal math pinball runner (default binary).
//!
//! Fixed-timestep game loop: crossterm input, the equation engine and level
//! session from `core`, and the line-based terminal renderer from `term`.
//! The TCP adapter (if enabled) feeds remote strikes into the same loop.

use std::time::{Duration, Instant, SystemTime, UNIX_EPOCH};

use anyhow::Result;
use crossterm::event::{self, Event, KeyEventKind};

use math_pinball::adapter::{
    create_display, create_round, Adapter, ClientCommand, OutboundMessage, RoundOutcome,
};
use math_pinball::core::{
    default_levels, BallDeck, EngineEvent, EquationEngine, LevelConfig, LevelSession,
};
use math_pinball::input::{handle_key_event, should_quit};
use math_pinball::term::{GameView, TerminalRenderer};
use math_pinball::types::{
    format_number, EvaluationResult, FailureKind, GameCommand, FEEDBACK_DURATION_MS, TICK_MS,
};

fn main() -> Result<()> {
    env_logger::init();

    let config = select_level();
    log::info!("starting level: {}", config.name);

    let mut term = TerminalRenderer::new();
    term.enter()?;

    let result = run(&mut term, config);

    // Always try to restore terminal state.
    let _ = term.exit();
    result
}

/// Pick a level from `MATH_PINBALL_LEVEL` (1-based), defaulting to the first.
fn select_level() -> LevelConfig {
    let mut levels = default_levels();
    let index = std::env::var("MATH_PINBALL_LEVEL")
        .ok()
        .and_then(|s| s.parse::<usize>().ok())
        .unwrap_or(1)
        .clamp(1, levels.len());
    levels.remove(index - 1)
}

fn seed_from_clock() -> u32 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_millis() as u32
}

fn rack_string(deck: &BallDeck) -> String {
    let mut parts: Vec<String> = deck.numbers.iter().map(|n| n.to_string()).collect();
    parts.extend(deck.operators.iter().map(|o| o.as_str().to_string()));
    parts.join(" ")
}

fn feedback_for(result: &EvaluationResult, award: i64) -> String {
    match result {
        EvaluationResult::Success { value } => {
            format!("= {}  (+{})", format_number(*value), award)
        }
        EvaluationResult::Failure { kind } => match kind {
            FailureKind::MalformedToken => "BAD BALL!".to_string(),
            FailureKind::MalformedSequence => "MALFORMED EQUATION!".to_string(),
            FailureKind::DivisionByZero => "DIVISION BY ZERO!".to_string(),
        },
    }
}

fn run(term: &mut TerminalRenderer, config: LevelConfig) -> Result<()> {
    let mut engine = EquationEngine::new(config.engine_config());
    let mut deck = BallDeck::generate(&config, seed_from_clock());
    let mut session = LevelSession::new(config);

    let view = GameView::new();
    let mut adapter = Adapter::start_from_env();

    let mut feedback: Option<String> = None;
    let mut feedback_timer_ms: u32 = 0;
    let mut out_seq: u64 = 0;

    let mut last_tick = Instant::now();
    let tick_duration = Duration::from_millis(TICK_MS as u64);

    loop {
        // Render.
        let rack = rack_string(&deck);
        let lines = view.render(&session, &engine, Some(&rack), feedback.as_deref());
        term.draw(&lines)?;

        // Input with timeout until next tick.
        let timeout = tick_duration
            .checked_sub(last_tick.elapsed())
            .unwrap_or_else(|| Duration::from_secs(0));

        if event::poll(timeout)? {
            match event::read()? {
                Event::Key(key) => {
                    if key.kind == KeyEventKind::Press {
                        if should_quit(key) {
                            return Ok(());
                        }
                        if let Some(command) = handle_key_event(key) {
                            apply_command(&mut session, &mut engine, &mut deck, command);
                        }
                    }
                }
                Event::Resize(_, _) => {
                    term.invalidate();
                }
                _ => {}
            }
        }

        // Tick.
        if last_tick.elapsed() >= tick_duration {
            last_tick = Instant::now();

            // Remote commands, applied as if struck at the flipper.
            if let Some(adapter) = adapter.as_mut() {
                while let Some(inbound) = adapter.try_recv() {
                    match inbound.command {
                        ClientCommand::Strikes(symbols) => {
                            if session.status() == math_pinball::core::LevelStatus::Playing
                                && !session.paused()
                            {
                                for s in symbols.iter() {
                                    let _ = engine.strike(s);
                                }
                            }
                        }
                        ClientCommand::Clear => {
                            apply_command(&mut session, &mut engine, &mut deck, GameCommand::Clear)
                        }
                        ClientCommand::Pause => {
                            apply_command(&mut session, &mut engine, &mut deck, GameCommand::Pause)
                        }
                        ClientCommand::Restart => apply_command(
                            &mut session,
                            &mut engine,
                            &mut deck,
                            GameCommand::Restart,
                        ),
                    }
                }
            }

            if !session.paused() {
                session.tick(TICK_MS);
                engine.tick(TICK_MS);
            }

            if feedback_timer_ms > 0 {
                feedback_timer_ms = feedback_timer_ms.saturating_sub(TICK_MS);
                if feedback_timer_ms == 0 {
                    feedback = None;
                }
            }

            for ev in engine.drain_events() {
                match ev {
                    EngineEvent::DisplayChanged { text } => {
                        if let Some(adapter) = adapter.as_ref() {
                            out_seq += 1;
                            let msg = create_display(out_seq, &text);
                            if let Ok(line) = serde_json::to_string(&msg) {
                                adapter.send(OutboundMessage::Broadcast { line });
                            }
                        }
                    }
                    EngineEvent::RoundEvaluated { result, award } => {
                        if result.is_success() && award > 0 {
                            session.add_score(award);
                        }

                        feedback = Some(feedback_for(&result, award));
                        feedback_timer_ms = FEEDBACK_DURATION_MS;

                        if let Some(adapter) = adapter.as_ref() {
                            out_seq += 1;
                            let (outcome, value, failure) = match result {
                                EvaluationResult::Success { value } => {
                                    (RoundOutcome::Success, Some(value), None)
                                }
                                EvaluationResult::Failure { kind } => {
                                    (RoundOutcome::Failure, None, Some(kind))
                                }
                            };
                            let msg = create_round(
                                out_seq,
                                outcome,
                                value,
                                failure,
                                award,
                                session.score(),
                                session.status(),
                            );
                            if let Ok(line) = serde_json::to_string(&msg) {
                                adapter.send(OutboundMessage::Broadcast { line });
                            }
                        }
                    }
                }
            }
        }
    }
}

fn apply_command(
    session: &mut LevelSession,
    engine: &mut EquationEngine,
    deck: &mut BallDeck,
    command: GameCommand,
) {
    match command {
        GameCommand::Strike(c) => {
            if session.status() == math_pinball::core::LevelStatus::Playing && !session.paused() {
                let _ = engine.strike(&c.to_string());
            }
        }
        GameCommand::Clear => {
            engine.clear_equation();
        }
        GameCommand::Pause => {
            if !session.is_over() {
                session.toggle_pause();
            }
        }
        GameCommand::Restart => {
            session.restart();
            engine.reset();
            *deck = BallDeck::generate(session.config(), seed_from_clock());
        }
    }
}
