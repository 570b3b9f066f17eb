//! TerminalRenderer: flushes view lines to a real terminal.
//!
//! This module intentionally keeps the drawing API small. Lines are diffed
//! against the previous frame so unchanged rows are not rewritten.

use std::io::{self, Write};

use anyhow::Result;

use crossterm::{
    cursor,
    style::{Attribute, Print, ResetColor, SetAttribute},
    terminal, QueueableCommand,
};

pub struct TerminalRenderer {
    stdout: io::Stdout,
    last: Vec<String>,
}

impl TerminalRenderer {
    pub fn new() -> Self {
        Self {
            stdout: io::stdout(),
            last: Vec::new(),
        }
    }

    pub fn enter(&mut self) -> Result<()> {
        terminal::enable_raw_mode()?;
        self.stdout.queue(terminal::EnterAlternateScreen)?;
        self.stdout.queue(cursor::Hide)?;
        self.stdout.queue(terminal::DisableLineWrap)?;
        self.stdout.flush()?;
        Ok(())
    }

    pub fn exit(&mut self) -> Result<()> {
        self.stdout.queue(ResetColor)?;
        self.stdout.queue(SetAttribute(Attribute::Reset))?;
        self.stdout.queue(terminal::EnableLineWrap)?;
        self.stdout.queue(cursor::Show)?;
        self.stdout.queue(terminal::LeaveAlternateScreen)?;
        self.stdout.flush()?;
        terminal::disable_raw_mode()?;
        Ok(())
    }

    /// Force the next draw to be a full redraw.
    ///
    /// Useful on terminal resize events.
    pub fn invalidate(&mut self) {
        self.last.clear();
    }

    /// Draw view lines, rewriting only rows that changed since last frame.
    pub fn draw(&mut self, lines: &[String]) -> Result<()> {
        let full = self.last.is_empty() || self.last.len() != lines.len();
        if full {
            self.stdout
                .queue(terminal::Clear(terminal::ClearType::All))?;
        }

        for (y, line) in lines.iter().enumerate() {
            if !full && self.last.get(y) == Some(line) {
                continue;
            }
            self.stdout.queue(cursor::MoveTo(0, y as u16))?;
            self.stdout
                .queue(terminal::Clear(terminal::ClearType::CurrentLine))?;
            self.stdout.queue(Print(line.as_str()))?;
        }

        self.stdout.flush()?;
        self.last = lines.to_vec();
        Ok(())
    }
}

impl Default for TerminalRenderer {
    fn default() -> Self {
        Self::new()
    }
}
