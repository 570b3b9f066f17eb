//! GameView: maps the session and engine into terminal lines.
//!
//! This module is pure (no I/O). It can be unit-tested.

use crate::core::{EquationEngine, LevelSession, LevelStatus};

/// Width of the playfield panel in characters.
const PANEL_WIDTH: usize = 44;

/// A lightweight terminal view for the game.
///
/// Renders the current session into a list of text lines. The caller owns
/// flushing those lines to a terminal backend.
#[derive(Debug, Default)]
pub struct GameView;

impl GameView {
    pub fn new() -> Self {
        Self
    }

    /// Render the current game state into display lines.
    pub fn render(
        &self,
        session: &LevelSession,
        engine: &EquationEngine,
        rack: Option<&str>,
        feedback: Option<&str>,
    ) -> Vec<String> {
        let mut lines = Vec::with_capacity(12);

        lines.push(top_border());
        lines.push(boxed(&center(&session.config().name.to_uppercase())));
        lines.push(separator());

        let display = engine.display_text();
        let display = if display.is_empty() {
            "_".to_string()
        } else {
            display
        };
        lines.push(boxed(""));
        lines.push(boxed(&center(&display)));
        lines.push(boxed(""));
        lines.push(separator());

        if let Some(rack) = rack {
            lines.push(boxed(&format!(" BALLS  {}", rack)));
            lines.push(separator());
        }

        lines.push(boxed(&format!(
            " SCORE {:>6} / {}",
            session.score(),
            session.config().target_score
        )));
        lines.push(boxed(&self.timer_line(session)));

        let status_line = match session.status() {
            LevelStatus::Playing if session.paused() => Some("PAUSED".to_string()),
            LevelStatus::Playing => feedback.map(|f| f.to_string()),
            LevelStatus::Complete => {
                Some(format!("LEVEL COMPLETE  {}", star_row(session.stars())))
            }
            LevelStatus::Failed => Some("TIME UP".to_string()),
        };
        lines.push(boxed(&center(status_line.as_deref().unwrap_or(""))));

        lines.push(bottom_border());
        lines.push(" digits/+-*/ strike   c clear   p pause   r restart   q quit".to_string());

        lines
    }

    fn timer_line(&self, session: &LevelSession) -> String {
        if session.config().time_limit_ms == 0 {
            " TIME   --:--".to_string()
        } else {
            let marker = if session.low_time() && session.status() == LevelStatus::Playing {
                "  LOW!"
            } else {
                ""
            };
            format!(" TIME   {}{}", format_timer(session.remaining_ms()), marker)
        }
    }
}

/// Format milliseconds as mm:ss, rounding up partial seconds.
///
/// Rounding up keeps the display at 00:01 until time actually expires.
pub fn format_timer(ms: u32) -> String {
    let total_secs = ms / 1000 + u32::from(ms % 1000 != 0);
    let mins = total_secs / 60;
    let secs = total_secs % 60;
    format!("{:02}:{:02}", mins, secs)
}

fn star_row(stars: u8) -> String {
    let mut out = String::new();
    for i in 0..3 {
        out.push(if i < stars { '*' } else { '.' });
    }
    out
}

fn center(text: &str) -> String {
    let inner = PANEL_WIDTH - 2;
    let len = text.chars().count();
    if len >= inner {
        return text.to_string();
    }
    let pad = (inner - len) / 2;
    format!("{}{}", " ".repeat(pad), text)
}

fn boxed(text: &str) -> String {
    let inner = PANEL_WIDTH - 2;
    let len = text.chars().count();
    if len >= inner {
        let truncated: String = text.chars().take(inner).collect();
        return format!("│{}│", truncated);
    }
    format!("│{}{}│", text, " ".repeat(inner - len))
}

fn top_border() -> String {
    format!("┌{}┐", "─".repeat(PANEL_WIDTH - 2))
}

fn bottom_border() -> String {
    format!("└{}┘", "─".repeat(PANEL_WIDTH - 2))
}

fn separator() -> String {
    format!("├{}┤", "─".repeat(PANEL_WIDTH - 2))
}
