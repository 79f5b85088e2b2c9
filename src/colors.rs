use crossterm::event::KeyCode;
use crossterm::style::Color;

/// 8-bit RGB color carried through the engine and converted at the terminal
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Scale every channel by `factor` (clamped to 0..=1)
    pub fn darken(self, factor: f64) -> Self {
        self.scale(factor)
    }

    /// Scale every channel by `factor`, used for fades as well as darkening
    pub fn scale(self, factor: f64) -> Self {
        let f = if factor.is_nan() { 0.0 } else { factor.clamp(0.0, 1.0) };
        let ch = |c: u8| (c as f64 * f).round() as u8;
        Self::new(ch(self.r), ch(self.g), ch(self.b))
    }

    fn lerp(self, other: Rgb, t: f64) -> Self {
        let ch = |a: u8, b: u8| (a as f64 + (b as f64 - a as f64) * t).round() as u8;
        Self::new(ch(self.r, other.r), ch(self.g, other.g), ch(self.b, other.b))
    }
}

impl From<Rgb> for Color {
    fn from(c: Rgb) -> Self {
        Color::Rgb { r: c.r, g: c.g, b: c.b }
    }
}

/// Altitude (meters) where the color ramp tops out
pub const ALTITUDE_RAMP_MAX: f64 = 25_000.0;

// Low → high: teal, green, yellow, orange, red
const ALTITUDE_STOPS: [Rgb; 5] = [
    Rgb::new(0, 170, 200),
    Rgb::new(60, 200, 90),
    Rgb::new(240, 220, 60),
    Rgb::new(250, 140, 40),
    Rgb::new(230, 50, 50),
];

/// Marker color for a balloon at `altitude` meters
pub fn altitude_color(altitude: f64) -> Rgb {
    let t = if altitude.is_finite() {
        (altitude / ALTITUDE_RAMP_MAX).clamp(0.0, 1.0)
    } else {
        0.0
    };
    let segments = (ALTITUDE_STOPS.len() - 1) as f64;
    let pos = t * segments;
    let idx = (pos.floor() as usize).min(ALTITUDE_STOPS.len() - 2);
    ALTITUDE_STOPS[idx].lerp(ALTITUDE_STOPS[idx + 1], pos - idx as f64)
}

/// Color scheme selection for the globe grid and coastlines
#[derive(Clone, Copy)]
pub struct ColorState {
    pub scheme: u8,
}

impl ColorState {
    pub fn new(default_scheme: u8) -> Self {
        Self { scheme: default_scheme.min(4) }
    }

    /// Shift+digit picks a scheme. Returns true if the key was consumed.
    pub fn handle_key(&mut self, code: KeyCode) -> bool {
        match code {
            KeyCode::Char(')') => self.scheme = 0, // Shift+0: ocean
            KeyCode::Char('!') => self.scheme = 1, // Shift+1: matrix
            KeyCode::Char('@') => self.scheme = 2, // Shift+2: ice
            KeyCode::Char('#') => self.scheme = 3, // Shift+3: amber
            KeyCode::Char('$') => self.scheme = 4, // Shift+4: mono
            _ => return false,
        }
        true
    }
}

/// Globe line color for a scheme; intensity 0 = graticule, 1 = night coast,
/// 2 = day coast
pub fn scheme_color(scheme: u8, intensity: u8) -> Color {
    match scheme {
        1 => match intensity {
            0 => Color::DarkGreen,
            1 => Color::Green,
            _ => Color::AnsiValue(10),
        },
        2 => match intensity {
            0 => Color::DarkBlue,
            1 => Color::DarkCyan,
            _ => Color::Cyan,
        },
        3 => match intensity {
            0 => Color::DarkRed,
            1 => Color::DarkYellow,
            _ => Color::Yellow,
        },
        4 => match intensity {
            0 => Color::DarkGrey,
            1 => Color::Grey,
            _ => Color::White,
        },
        _ => match intensity {
            0 => Color::Rgb { r: 20, g: 50, b: 90 },
            1 => Color::Rgb { r: 40, g: 90, b: 140 },
            _ => Color::Rgb { r: 90, g: 170, b: 230 },
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn darken_scales_channels() {
        let c = Rgb::new(200, 100, 50).darken(0.5);
        assert_eq!(c, Rgb::new(100, 50, 25));
        assert_eq!(Rgb::new(10, 20, 30).darken(2.0), Rgb::new(10, 20, 30));
        assert_eq!(Rgb::new(10, 20, 30).scale(f64::NAN), Rgb::new(0, 0, 0));
    }

    #[test]
    fn altitude_ramp_endpoints() {
        assert_eq!(altitude_color(0.0), ALTITUDE_STOPS[0]);
        assert_eq!(altitude_color(-5.0), ALTITUDE_STOPS[0]);
        assert_eq!(altitude_color(ALTITUDE_RAMP_MAX), ALTITUDE_STOPS[4]);
        assert_eq!(altitude_color(1.0e9), ALTITUDE_STOPS[4]);
        assert_eq!(altitude_color(f64::NAN), ALTITUDE_STOPS[0]);
    }

    #[test]
    fn altitude_ramp_hits_inner_stops() {
        let quarter = ALTITUDE_RAMP_MAX / 4.0;
        assert_eq!(altitude_color(quarter), ALTITUDE_STOPS[1]);
        assert_eq!(altitude_color(quarter * 2.0), ALTITUDE_STOPS[2]);
    }

    #[test]
    fn scheme_keys() {
        let mut colors = ColorState::new(9);
        assert_eq!(colors.scheme, 4);
        assert!(colors.handle_key(KeyCode::Char('@')));
        assert_eq!(colors.scheme, 2);
        assert!(!colors.handle_key(KeyCode::Char('x')));
    }
}
