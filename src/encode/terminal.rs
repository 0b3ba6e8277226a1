use std::io::Write;

use crossterm::cursor::MoveTo;
use crossterm::queue;
use crossterm::terminal::{Clear, ClearType};

use crate::codec::render_command;
use crate::encode::sink::CommandSink;
use crate::foundation::error::SegResult;

/// Draws every command as segment art.
pub struct TerminalSink<W> {
    out: W,
    clear_screen: bool,
    print_code: bool,
}

impl<W: Write + Send> TerminalSink<W> {
    pub fn new(out: W) -> Self {
        Self {
            out,
            clear_screen: false,
            print_code: false,
        }
    }

    /// Clear the terminal before each drawing.
    pub fn clear_screen(mut self, on: bool) -> Self {
        self.clear_screen = on;
        self
    }

    /// Echo the raw command above the drawing.
    pub fn print_code(mut self, on: bool) -> Self {
        self.print_code = on;
        self
    }

    pub fn into_inner(self) -> W {
        self.out
    }
}

impl<W: Write + Send> CommandSink for TerminalSink<W> {
    fn send(&mut self, cmd: &str) -> SegResult<()> {
        let art = render_command(cmd)?;
        if self.clear_screen {
            queue!(self.out, Clear(ClearType::All), MoveTo(0, 0))?;
        }
        if self.print_code {
            writeln!(self.out, "{cmd}")?;
        }
        self.out.write_all(art.as_bytes())?;
        self.out.flush()?;
        Ok(())
    }
}
