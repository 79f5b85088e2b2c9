//! Braille-dot canvas: 2×4 dots per terminal cell.

use crate::terminal::Terminal;
use crossterm::style::Color;

/// Draw order; a dot only takes a new color from an equal or higher layer
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Layer {
    Grid = 1,
    Coast = 2,
    Trail = 3,
    Marker = 4,
}

#[derive(Debug, Clone, Copy, Default)]
struct Dot {
    layer: u8,
    color: Option<Color>,
}

// Dot offsets within a cell, in braille bit order
const DOT_BITS: [(usize, usize, u8); 8] = [
    (0, 0, 0x01),
    (0, 1, 0x02),
    (0, 2, 0x04),
    (1, 0, 0x08),
    (1, 1, 0x10),
    (1, 2, 0x20),
    (0, 3, 0x40),
    (1, 3, 0x80),
];

/// Projections close to the camera plane can produce huge segments
const MAX_LINE_STEPS: i32 = 4096;

pub struct BrailleCanvas {
    width: usize,
    height: usize,
    dots: Vec<Dot>,
}

impl BrailleCanvas {
    /// Canvas covering `cols` × `rows` terminal cells
    pub fn new(cols: u16, rows: u16) -> Self {
        let width = cols as usize * 2;
        let height = rows as usize * 4;
        Self { width, height, dots: vec![Dot::default(); width * height] }
    }

    /// Width in dots
    pub fn width(&self) -> usize {
        self.width
    }

    /// Height in dots
    pub fn height(&self) -> usize {
        self.height
    }

    pub fn resize(&mut self, cols: u16, rows: u16) {
        if cols as usize * 2 != self.width || rows as usize * 4 != self.height {
            *self = Self::new(cols, rows);
        }
    }

    pub fn clear(&mut self) {
        self.dots.fill(Dot::default());
    }

    pub fn is_set(&self, x: usize, y: usize) -> bool {
        x < self.width && y < self.height && self.dots[y * self.width + x].layer > 0
    }

    pub fn plot(&mut self, x: i32, y: i32, layer: Layer, color: Color) {
        if x < 0 || y < 0 || x as usize >= self.width || y as usize >= self.height {
            return;
        }
        let dot = &mut self.dots[y as usize * self.width + x as usize];
        if layer as u8 >= dot.layer {
            *dot = Dot { layer: layer as u8, color: Some(color) };
        }
    }

    /// Bresenham line between two dot positions
    pub fn line(&mut self, from: (i32, i32), to: (i32, i32), layer: Layer, color: Color) {
        let (mut x, mut y) = from;
        let dx = (to.0 - x).abs();
        let dy = -(to.1 - y).abs();
        let sx = if x < to.0 { 1 } else { -1 };
        let sy = if y < to.1 { 1 } else { -1 };
        let mut err = dx + dy;

        let steps = dx.max(-dy).min(MAX_LINE_STEPS);
        for _ in 0..=steps {
            self.plot(x, y, layer, color);
            if x == to.0 && y == to.1 {
                break;
            }
            let e2 = 2 * err;
            if e2 >= dy {
                err += dy;
                x += sx;
            }
            if e2 <= dx {
                err += dx;
                y += sy;
            }
        }
    }

    /// Copy the canvas into the terminal buffer. Each cell takes the color of
    /// its highest-layer dot; empty cells are left untouched.
    pub fn render(&self, term: &mut Terminal) {
        let cols = self.width / 2;
        let rows = self.height / 4;
        for cy in 0..rows {
            for cx in 0..cols {
                let mut bits = 0u8;
                let mut top = Dot::default();
                for &(ox, oy, bit) in &DOT_BITS {
                    let dot = self.dots[(cy * 4 + oy) * self.width + cx * 2 + ox];
                    if dot.layer > 0 {
                        bits |= bit;
                        if dot.layer >= top.layer {
                            top = dot;
                        }
                    }
                }
                if bits > 0 {
                    let ch = char::from_u32(0x2800 + bits as u32).unwrap_or(' ');
                    let bold = top.layer >= Layer::Marker as u8;
                    term.set(cx as i32, cy as i32, ch, top.color, bold);
                }
            }
        }
    }
}
