//! Renderers paint snapshots.
//!
//! The scheduler hands every completed snapshot to a [`Renderer`]. Rendering the same
//! snapshot twice produces the same output. Output errors are logged and otherwise ignored:
//! a broken terminal must not stop the refresh loop.
use std::io::Write;

use log::warn;
use ticker_common::format::{ColorClass, Frame};
use ticker_common::{DisplaySnapshot, Result};

/// Consumer of completed snapshots.
pub trait Renderer {
    /// Paint `snapshot`, replacing whatever was painted before.
    fn render(&mut self, snapshot: &DisplaySnapshot);
}

const CLEAR_SCREEN: &str = "\x1b[2J\x1b[H";
const RESET: &str = "\x1b[0m";

fn ansi_color(color: ColorClass) -> &'static str {
    match color {
        ColorClass::Positive => "\x1b[32m",
        ColorClass::Negative => "\x1b[31m",
        ColorClass::Neutral | ColorClass::Error => "\x1b[37m",
    }
}

/// Repaints a terminal with the lines of a [`Frame`].
pub struct TerminalRenderer<W: Write> {
    out: W,
    color: bool,
}

impl<W: Write> TerminalRenderer<W> {
    /// Create a renderer writing to `out`, with or without ANSI colors.
    pub fn new(out: W, color: bool) -> Self {
        Self { out, color }
    }

    fn paint(&mut self, frame: &Frame) -> Result<()> {
        if self.color {
            write!(self.out, "{}", CLEAR_SCREEN)?;
        }
        for line in &frame.lines {
            if self.color {
                writeln!(self.out, "{}{}{}", ansi_color(line.color), line.text, RESET)?;
            } else {
                writeln!(self.out, "{}", line.text)?;
            }
        }
        if !self.color {
            writeln!(self.out)?;
        }
        self.out.flush()?;
        Ok(())
    }
}

impl<W: Write> Renderer for TerminalRenderer<W> {
    fn render(&mut self, snapshot: &DisplaySnapshot) {
        if let Err(e) = self.paint(&Frame::from_snapshot(snapshot)) {
            warn!("Failed to paint frame: {}", e);
        }
    }
}

/// Writes every snapshot as one JSON line.
pub struct JsonRenderer<W: Write> {
    out: W,
}

impl<W: Write> JsonRenderer<W> {
    /// Create a renderer writing to `out`.
    pub fn new(out: W) -> Self {
        Self { out }
    }

    fn write_line(&mut self, snapshot: &DisplaySnapshot) -> Result<()> {
        serde_json::to_writer(&mut self.out, snapshot)?;
        writeln!(self.out)?;
        self.out.flush()?;
        Ok(())
    }
}

impl<W: Write> Renderer for JsonRenderer<W> {
    fn render(&mut self, snapshot: &DisplaySnapshot) {
        if let Err(e) = self.write_line(snapshot) {
            warn!("Failed to write snapshot: {}", e);
        }
    }
}
