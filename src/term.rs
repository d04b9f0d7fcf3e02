use crate::{Coords, TermInt};
use std::{error::Error, fmt, io::{Stdout, Write, stdout}};

use anyhow::{Context, Result};
use crossterm::{cursor, execute, queue, style, terminal};
use crossterm::style::Color;
use crossterm::terminal::{ClearType, EnterAlternateScreen, LeaveAlternateScreen};

/// Cursor target outside the viewport the surface last sampled.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OutOfBounds {
    pub pos: Coords,
    pub viewport: Coords,
}

impl fmt::Display for OutOfBounds {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "position ({}, {}) is outside the {}x{} terminal",
            self.pos.0, self.pos.1, self.viewport.0, self.viewport.1
        )
    }
}

impl Error for OutOfBounds {}

/// Whatever the grid gets drawn on.
pub trait Surface {
    /// Sample the current viewport size. Later cursor moves are checked against it.
    fn viewport(&mut self) -> Result<Coords>;

    /// Fails with [`OutOfBounds`] when `pos` is not inside the last sampled viewport.
    fn set_cursor(&mut self, pos: Coords) -> Result<()>;

    /// Write at the cursor. A colored write leaves the default colors in place afterwards.
    fn write(&mut self, glyph: char, color: Option<Color>) -> Result<()>;

    fn clear(&mut self) -> Result<()>;

    fn flush(&mut self) -> Result<()>;

    fn write_str(&mut self, text: &str) -> Result<()> {
        for ch in text.chars() {
            self.write(ch, None)?;
        }
        Ok(())
    }
}

impl<T: Surface + ?Sized> Surface for &mut T {
    fn viewport(&mut self) -> Result<Coords> {
        (**self).viewport()
    }

    fn set_cursor(&mut self, pos: Coords) -> Result<()> {
        (**self).set_cursor(pos)
    }

    fn write(&mut self, glyph: char, color: Option<Color>) -> Result<()> {
        (**self).write(glyph, color)
    }

    fn clear(&mut self) -> Result<()> {
        (**self).clear()
    }

    fn flush(&mut self) -> Result<()> {
        (**self).flush()
    }
}

pub struct TermManager<W: Write = Stdout> {
    width: TermInt,
    height: TermInt,
    out: W,
}

impl TermManager<Stdout> {
    pub fn new() -> Result<Self> {
        let viewport = terminal::size().context("Error reading size.")?;
        Ok(TermManager::with_writer(stdout(), viewport))
    }
}

impl<W: Write> TermManager<W> {
    /// Draw into `out`, treating `viewport` as the terminal size until the next sample.
    pub fn with_writer(out: W, viewport: Coords) -> Self {
        TermManager { width: viewport.0, height: viewport.1, out }
    }

    pub fn setup(&mut self) -> Result<()> {
        execute!(self.out, EnterAlternateScreen).context("Error entering alt screen")?;
        self.set_raw_mode(true)?;
        self.set_cursor_visibility(false)
    }

    pub fn restore(&mut self) -> Result<()> {
        self.set_raw_mode(false)?;
        self.set_cursor_visibility(true)?;
        execute!(self.out, style::ResetColor, LeaveAlternateScreen).context("Error leaving alt screen")?;
        Ok(())
    }

    fn set_raw_mode(&self, option: bool) -> Result<()> {
        let res = if option {
            terminal::enable_raw_mode()
        } else {
            terminal::disable_raw_mode()
        };

        res.context("Error setting raw mode.")
    }

    fn set_cursor_visibility(&mut self, option: bool) -> Result<()> {
        let res = if option {
            execute!(self.out, cursor::Show)
        } else {
            execute!(self.out, cursor::Hide)
        };

        res.context("Error setting cursor visibility.")
    }
}

impl<W: Write> Surface for TermManager<W> {
    fn viewport(&mut self) -> Result<Coords> {
        let (width, height) = terminal::size().context("Error reading size.")?;
        self.width = width;
        self.height = height;
        Ok((width, height))
    }

    fn set_cursor(&mut self, pos: Coords) -> Result<()> {
        if pos.0 >= self.width || pos.1 >= self.height {
            return Err(OutOfBounds { pos, viewport: (self.width, self.height) }.into());
        }
        queue!(self.out, cursor::MoveTo(pos.0, pos.1)).context("Error moving cursor.")?;
        Ok(())
    }

    fn write(&mut self, glyph: char, color: Option<Color>) -> Result<()> {
        let res = match color {
            Some(c) => queue!(self.out, style::SetForegroundColor(c), style::Print(glyph), style::ResetColor),
            None => queue!(self.out, style::Print(glyph)),
        };
        res.context("Error writing glyph.")
    }

    fn clear(&mut self) -> Result<()> {
        execute!(self.out, terminal::Clear(ClearType::All), cursor::MoveTo(0, 0)).context("Error clearing.")?;
        Ok(())
    }

    fn flush(&mut self) -> Result<()> {
        self.out.flush().context("Error flushing.")
    }
}
