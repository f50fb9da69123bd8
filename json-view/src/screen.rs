use std::fmt;
use std::io::Write;

use crossterm::cursor::MoveTo;
use crossterm::style::{
    Attribute, Print, ResetColor, SetAttribute, SetBackgroundColor, SetForegroundColor,
};
use crossterm::terminal::{self, Clear, ClearType, ScrollDown, ScrollUp};
use crossterm::{queue, Command};

use crate::error::Result;
use crate::style::{role_style, Role, SchemeId};

/// Terminal driver seam used by the render engine. Rows and columns are
/// zero-based; `shift_rows` moves already-rendered content within the
/// inclusive row range without rewriting it (positive delta moves content
/// up, i.e. the view scrolled down).
pub trait Screen {
    /// Current (columns, rows).
    fn size(&self) -> (u16, u16);
    fn clear_all(&mut self) -> Result<()>;
    fn clear_row(&mut self, row: u16) -> Result<()>;
    fn draw_text(&mut self, row: u16, col: u16, text: &str, role: Role) -> Result<()>;
    fn shift_rows(&mut self, top: u16, bottom: u16, delta: i32) -> Result<()>;
    fn flush(&mut self) -> Result<()> {
        Ok(())
    }
}

/// DECSTBM: confine scrolling to an inclusive row range (converted to the
/// terminal's one-based coordinates).
struct SetScrollRegion {
    top: u16,
    bottom: u16,
}

impl Command for SetScrollRegion {
    fn write_ansi(&self, f: &mut impl fmt::Write) -> fmt::Result {
        write!(f, "\x1b[{};{}r", self.top + 1, self.bottom + 1)
    }

    #[cfg(windows)]
    fn execute_winapi(&self) -> std::io::Result<()> {
        Ok(())
    }
}

struct ResetScrollRegion;

impl Command for ResetScrollRegion {
    fn write_ansi(&self, f: &mut impl fmt::Write) -> fmt::Result {
        f.write_str("\x1b[r")
    }

    #[cfg(windows)]
    fn execute_winapi(&self) -> std::io::Result<()> {
        Ok(())
    }
}

/// Crossterm-backed [`Screen`] over any writer (normally stdout).
pub struct TerminalScreen<W: Write> {
    out: W,
    cols: u16,
    rows: u16,
    scheme: SchemeId,
}

impl<W: Write> TerminalScreen<W> {
    pub fn new(out: W, scheme: SchemeId) -> Result<Self> {
        let (cols, rows) = terminal::size()?;
        Ok(Self {
            out,
            cols,
            rows,
            scheme,
        })
    }

    pub fn set_scheme(&mut self, scheme: SchemeId) {
        self.scheme = scheme;
    }

    /// Record a new viewport size after a resize notification.
    pub fn set_size(&mut self, cols: u16, rows: u16) {
        self.cols = cols;
        self.rows = rows;
    }
}

impl<W: Write> Screen for TerminalScreen<W> {
    fn size(&self) -> (u16, u16) {
        (self.cols, self.rows)
    }

    fn clear_all(&mut self) -> Result<()> {
        queue!(self.out, Clear(ClearType::All))?;
        Ok(())
    }

    fn clear_row(&mut self, row: u16) -> Result<()> {
        queue!(self.out, MoveTo(0, row), Clear(ClearType::CurrentLine))?;
        Ok(())
    }

    fn draw_text(&mut self, row: u16, col: u16, text: &str, role: Role) -> Result<()> {
        let style = role_style(self.scheme, role);
        queue!(self.out, MoveTo(col, row))?;
        if let Some(fg) = style.fg {
            queue!(self.out, SetForegroundColor(fg))?;
        }
        if let Some(bg) = style.bg {
            queue!(self.out, SetBackgroundColor(bg))?;
        }
        if style.bold {
            queue!(self.out, SetAttribute(Attribute::Bold))?;
        }
        if style.reverse {
            queue!(self.out, SetAttribute(Attribute::Reverse))?;
        }
        queue!(self.out, Print(text), SetAttribute(Attribute::Reset), ResetColor)?;
        Ok(())
    }

    fn shift_rows(&mut self, top: u16, bottom: u16, delta: i32) -> Result<()> {
        if delta == 0 || bottom < top {
            return Ok(());
        }
        queue!(self.out, SetScrollRegion { top, bottom })?;
        if delta > 0 {
            queue!(self.out, ScrollUp(delta as u16))?;
        } else {
            queue!(self.out, ScrollDown((-delta) as u16))?;
        }
        queue!(self.out, ResetScrollRegion)?;
        Ok(())
    }

    fn flush(&mut self) -> Result<()> {
        self.out.flush()?;
        Ok(())
    }
}
