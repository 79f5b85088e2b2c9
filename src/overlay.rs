//! Boxed text overlays drawn into the back buffer (help, welcome message).

use crate::colors::Rgb;
use crate::terminal::Terminal;
use crossterm::style::Color;

/// Draw `text` in a bordered box centred on the screen. Nothing is drawn for
/// empty text or a box that does not fit.
pub fn render_box(term: &mut Terminal, text: &str, border: Color, fg: Color) {
    let (width, height) = term.size();
    let lines: Vec<&str> = text.lines().collect();
    if lines.is_empty() {
        return;
    }

    let max_width = lines.iter().map(|l| l.chars().count()).max().unwrap_or(0);
    let box_width = max_width + 4;
    let box_height = lines.len() + 2;
    if box_width > width as usize || box_height > height as usize {
        return;
    }

    let x0 = ((width as usize - box_width) / 2) as i32;
    let y0 = ((height as usize - box_height) / 2) as i32;
    let x1 = x0 + box_width as i32 - 1;
    let y1 = y0 + box_height as i32 - 1;

    for x in x0 + 1..x1 {
        term.set(x, y0, '─', Some(border), false);
        term.set(x, y1, '─', Some(border), false);
    }
    term.set(x0, y0, '┌', Some(border), false);
    term.set(x1, y0, '┐', Some(border), false);
    term.set(x0, y1, '└', Some(border), false);
    term.set(x1, y1, '┘', Some(border), false);

    for (i, line) in lines.iter().enumerate() {
        let y = y0 + 1 + i as i32;
        term.set(x0, y, '│', Some(border), false);
        let padded = format!(" {:<width$} ", line, width = max_width);
        term.set_str(x0 + 1, y, &padded, Some(fg), false);
        term.set(x1, y, '│', Some(border), false);
    }
}

/// Help box in the usual grey-on-white
pub fn render_help(term: &mut Terminal, text: &str) {
    render_box(term, text, Color::White, Color::Grey);
}

const WELCOME: &str = "\
Tracking stratospheric balloons
space  replay the last 24 hours
?      controls";

const WELCOME_COLOR: Rgb = Rgb::new(235, 240, 255);

/// Welcome box faded by `opacity` (0 draws nothing)
pub fn render_welcome(term: &mut Terminal, opacity: f64) {
    if opacity <= 0.0 {
        return;
    }
    let color: Color = WELCOME_COLOR.scale(opacity).into();
    render_box(term, WELCOME, color, color);
}
