use crossterm::{
    cursor::{Hide, MoveTo, Show},
    event::{
        poll, read, DisableMouseCapture, EnableMouseCapture, Event, KeyCode, KeyEventKind,
        KeyModifiers, MouseButton, MouseEventKind,
    },
    execute, queue,
    style::{Attribute, Color, Print, ResetColor, SetAttribute, SetForegroundColor},
    terminal::{
        disable_raw_mode, enable_raw_mode, size, Clear, ClearType, EnterAlternateScreen,
        LeaveAlternateScreen,
    },
};
use std::io::{self, stdout, Write};
use std::time::Duration;

/// Terminal abstraction for rendering
pub struct Terminal {
    width: u16,
    height: u16,
    buffer: Vec<Vec<Cell>>,
    alternate_screen: bool,
}

/// A single cell in the terminal buffer
#[derive(Clone, Debug, PartialEq)]
pub struct Cell {
    pub ch: char,
    pub fg: Option<Color>,
    pub bold: bool,
}

impl Default for Cell {
    fn default() -> Self {
        Self {
            ch: ' ',
            fg: None,
            bold: false,
        }
    }
}

/// Pointer actions the viewer cares about
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Pointer {
    Down { col: u16, row: u16 },
    Drag { col: u16, row: u16 },
    Up,
    ScrollUp,
    ScrollDown,
}

/// Input polled once per frame
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Input {
    Key(KeyCode, KeyModifiers),
    Pointer(Pointer),
}

impl Terminal {
    /// Initialize the terminal for drawing. With `alternate_screen`, raw mode
    /// and mouse capture are enabled until drop.
    pub fn new(alternate_screen: bool) -> io::Result<Self> {
        let (width, height) = size()?;

        if alternate_screen {
            enable_raw_mode()?;
            execute!(stdout(), EnterAlternateScreen, Hide, EnableMouseCapture)?;
        }

        let buffer = vec![vec![Cell::default(); width as usize]; height as usize];

        Ok(Self {
            width,
            height,
            buffer,
            alternate_screen,
        })
    }

    /// A buffer-only terminal that never touches the real screen
    pub fn offscreen(width: u16, height: u16) -> Self {
        Self {
            width,
            height,
            buffer: vec![vec![Cell::default(); width as usize]; height as usize],
            alternate_screen: false,
        }
    }

    /// Get terminal dimensions
    pub fn size(&self) -> (u16, u16) {
        (self.width, self.height)
    }

    /// Reallocate the buffer after the window changed size
    pub fn resize(&mut self, width: u16, height: u16) {
        self.width = width;
        self.height = height;
        self.buffer = vec![vec![Cell::default(); width as usize]; height as usize];
    }

    /// Clear the buffer
    pub fn clear(&mut self) {
        for row in &mut self.buffer {
            row.fill(Cell::default());
        }
    }

    /// Clear the actual terminal
    pub fn clear_screen(&self) -> io::Result<()> {
        execute!(stdout(), Clear(ClearType::All))?;
        Ok(())
    }

    /// Set a character at position with optional color
    pub fn set(&mut self, x: i32, y: i32, ch: char, fg: Option<Color>, bold: bool) {
        if x >= 0 && x < self.width as i32 && y >= 0 && y < self.height as i32 {
            self.buffer[y as usize][x as usize] = Cell { ch, fg, bold };
        }
    }

    /// Set a string starting at position
    pub fn set_str(&mut self, x: i32, y: i32, s: &str, fg: Option<Color>, bold: bool) {
        for (i, ch) in s.chars().enumerate() {
            self.set(x + i as i32, y, ch, fg, bold);
        }
    }

    pub fn get(&self, x: u16, y: u16) -> Option<&Cell> {
        self.buffer.get(y as usize).and_then(|row| row.get(x as usize))
    }

    /// Write the whole buffer to the screen in one flush
    pub fn present(&self) -> io::Result<()> {
        let mut out = stdout();

        for (y, row) in self.buffer.iter().enumerate() {
            queue!(out, MoveTo(0, y as u16))?;

            for cell in row {
                if cell.bold {
                    queue!(out, SetAttribute(Attribute::Bold))?;
                }

                if let Some(color) = cell.fg {
                    queue!(out, SetForegroundColor(color), Print(cell.ch), ResetColor)?;
                } else {
                    queue!(out, Print(cell.ch))?;
                }

                if cell.bold {
                    queue!(out, SetAttribute(Attribute::Reset))?;
                }
            }
        }

        out.flush()?;
        Ok(())
    }

    /// Poll for input without blocking
    pub fn check_input(&self) -> io::Result<Option<Input>> {
        if !poll(Duration::from_millis(0))? {
            return Ok(None);
        }
        Ok(match read()? {
            Event::Key(key) if key.kind != KeyEventKind::Release => {
                Some(Input::Key(key.code, key.modifiers))
            }
            Event::Mouse(mouse) => {
                let (col, row) = (mouse.column, mouse.row);
                match mouse.kind {
                    MouseEventKind::Down(MouseButton::Left) => Some(Input::Pointer(Pointer::Down { col, row })),
                    MouseEventKind::Drag(MouseButton::Left) => Some(Input::Pointer(Pointer::Drag { col, row })),
                    MouseEventKind::Up(_) => Some(Input::Pointer(Pointer::Up)),
                    MouseEventKind::ScrollUp => Some(Input::Pointer(Pointer::ScrollUp)),
                    MouseEventKind::ScrollDown => Some(Input::Pointer(Pointer::ScrollDown)),
                    _ => None,
                }
            }
            _ => None,
        })
    }

    /// Plain text of one buffer row, trailing blanks trimmed
    pub fn row_text(&self, y: u16) -> String {
        self.buffer
            .get(y as usize)
            .map(|row| row.iter().map(|c| c.ch).collect::<String>().trim_end().to_string())
            .unwrap_or_default()
    }

    /// Print buffer to stdout with ANSI colors (for headless mode)
    pub fn print_to_stdout(&self) -> io::Result<()> {
        let mut out = stdout();
        for row in &self.buffer {
            for cell in row {
                match (cell.ch, cell.fg) {
                    (' ', _) | (_, None) => queue!(out, Print(cell.ch))?,
                    (ch, Some(color)) => {
                        if cell.bold {
                            queue!(out, SetAttribute(Attribute::Bold))?;
                        }
                        queue!(out, SetForegroundColor(color), Print(ch), ResetColor)?;
                        if cell.bold {
                            queue!(out, SetAttribute(Attribute::Reset))?;
                        }
                    }
                }
            }
            queue!(out, Print('\n'))?;
        }
        out.flush()
    }

    /// Sleep for specified duration
    pub fn sleep(&self, seconds: f32) {
        std::thread::sleep(Duration::from_secs_f32(seconds.max(0.0)));
    }
}

impl Drop for Terminal {
    fn drop(&mut self) {
        if self.alternate_screen {
            let _ = execute!(stdout(), DisableMouseCapture, Show, LeaveAlternateScreen);
            let _ = disable_raw_mode();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn set_clips_to_bounds() {
        let mut term = Terminal::offscreen(4, 2);
        term.set(-1, 0, 'x', None, false);
        term.set(4, 0, 'x', None, false);
        term.set(3, 1, 'y', Some(Color::Red), true);
        assert_eq!(term.row_text(0), "");
        assert_eq!(term.get(3, 1).map(|c| c.ch), Some('y'));
        assert_eq!(term.get(4, 1), None);
    }

    #[test]
    fn resize_and_clear() {
        let mut term = Terminal::offscreen(4, 2);
        term.set_str(0, 0, "abcdef", None, false);
        assert_eq!(term.row_text(0), "abcd");
        term.clear();
        assert_eq!(term.row_text(0), "");
        term.resize(10, 3);
        assert_eq!(term.size(), (10, 3));
        assert!(term.get(9, 2).is_some());
    }
}
