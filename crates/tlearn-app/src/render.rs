//! Terminal rendering of the interpreter's display history.
//!
//! The interpreter keeps the whole history; the renderer remembers the last
//! line id it wrote and only emits newer lines.

use std::io::{self, Write};

use tlearn_types::display::{DisplayLine, LineKind};

const CLEAR_SCREEN: &str = "\x1b[2J\x1b[H";
const RESET: &str = "\x1b[0m";

fn color_code(kind: LineKind) -> Option<&'static str> {
    match kind {
        LineKind::Command => Some("\x1b[1m"),
        LineKind::Error => Some("\x1b[31m"),
        LineKind::Success => Some("\x1b[32m"),
        LineKind::Info => Some("\x1b[36m"),
        LineKind::Output => None,
    }
}

pub struct Renderer {
    /// Stdin is a terminal: print prompts, skip echoing typed commands.
    interactive: bool,
    /// Stdout is a terminal: colorize by line kind.
    color: bool,
    last_id: Option<u64>,
}

impl Renderer {
    pub fn new(interactive: bool, color: bool) -> Self {
        Self {
            interactive,
            color,
            last_id: None,
        }
    }

    /// Text for one display line, without the trailing newline.
    pub fn format_line(&self, line: &DisplayLine) -> String {
        let text = match line.kind {
            LineKind::Command => format!("$ {}", line.content),
            _ => line.content.clone(),
        };
        match color_code(line.kind).filter(|_| self.color) {
            Some(code) => format!("{code}{text}{RESET}"),
            None => text,
        }
    }

    /// Write every line newer than the last one written.
    pub fn flush_new(&mut self, lines: &[DisplayLine], out: &mut impl Write) -> io::Result<()> {
        for line in lines {
            if self.last_id.is_some_and(|last| line.id <= last) {
                continue;
            }
            self.last_id = Some(line.id);
            if line.kind == LineKind::Command && self.interactive {
                continue;
            }
            writeln!(out, "{}", self.format_line(line))?;
        }
        out.flush()
    }

    pub fn prompt(&self, prompt: &str, out: &mut impl Write) -> io::Result<()> {
        if self.interactive {
            write!(out, "{prompt} ")?;
            out.flush()?;
        }
        Ok(())
    }

    pub fn clear_screen(&self, out: &mut impl Write) -> io::Result<()> {
        if self.color {
            write!(out, "{CLEAR_SCREEN}")?;
        }
        out.flush()
    }
}
