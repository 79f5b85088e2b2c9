//! Terminal viewer: braille canvas, camera projection, orbit controls and the
//! globe scene that ties them to the engine.

pub mod canvas;
pub mod controls;
pub mod globe;
pub mod projection;

use crate::colors::ColorState;
use crate::overlay;
use crate::terminal::Terminal;
use crossterm::event::{KeyCode, KeyModifiers};

/// What the viewer should do with a key after [`VizState`] has seen it
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyAction {
    Quit,
    /// Start the replay, or stop and reset it
    ToggleAnimation,
    /// Help overlay toggled; does not count as interacting with the scene
    Help,
    /// Handled here (pause, speed, colors)
    Consumed,
    /// Left for the camera controls
    Unhandled,
}

/// Runtime state for the interactive keys shared by the viewer
pub struct VizState {
    /// Seconds per rendered frame
    pub speed: f32,
    pub paused: bool,
    pub show_help: bool,
    help_text: &'static str,
    colors: ColorState,
}

impl VizState {
    pub fn new(initial_speed: f32, help_text: &'static str, color_scheme: u8) -> Self {
        Self {
            speed: initial_speed,
            paused: false,
            show_help: false,
            help_text,
            colors: ColorState::new(color_scheme),
        }
    }

    pub fn color_scheme(&self) -> u8 {
        self.colors.scheme
    }

    pub fn handle_key(&mut self, code: KeyCode, _modifiers: KeyModifiers) -> KeyAction {
        if self.colors.handle_key(code) {
            return KeyAction::Consumed;
        }
        match code {
            KeyCode::Char('q') | KeyCode::Esc => KeyAction::Quit,
            KeyCode::Char('?') => {
                self.show_help = !self.show_help;
                KeyAction::Help
            }
            KeyCode::Char(' ') => KeyAction::ToggleAnimation,
            KeyCode::Char('p') => {
                self.paused = !self.paused;
                KeyAction::Consumed
            }
            // 1 = fastest, 9 = slowest, 0 = a slideshow
            KeyCode::Char(c) if c.is_ascii_digit() => {
                self.speed = match c {
                    '0' => 0.25,
                    '1' => 0.008,
                    '2' => 0.016,
                    '3' => 0.025,
                    '4' => 0.033,
                    '5' => 0.05,
                    '6' => 0.07,
                    '7' => 0.1,
                    '8' => 0.15,
                    _ => 0.2,
                };
                KeyAction::Consumed
            }
            _ => KeyAction::Unhandled,
        }
    }

    /// Draw the help box if it is toggled on
    pub fn render_help(&self, term: &mut Terminal) {
        if self.show_help {
            overlay::render_help(term, self.help_text);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key(state: &mut VizState, c: char) -> KeyAction {
        state.handle_key(KeyCode::Char(c), KeyModifiers::NONE)
    }

    #[test]
    fn quit_and_help_keys() {
        let mut state = VizState::new(0.03, "HELP", 0);
        assert_eq!(key(&mut state, 'q'), KeyAction::Quit);
        assert_eq!(state.handle_key(KeyCode::Esc, KeyModifiers::NONE), KeyAction::Quit);
        assert_eq!(key(&mut state, '?'), KeyAction::Help);
        assert!(state.show_help);
        assert_eq!(key(&mut state, '?'), KeyAction::Help);
        assert!(!state.show_help);
    }

    #[test]
    fn speed_pause_and_colors() {
        let mut state = VizState::new(0.03, "HELP", 0);
        assert_eq!(key(&mut state, '1'), KeyAction::Consumed);
        assert_eq!(state.speed, 0.008);
        assert_eq!(key(&mut state, 'p'), KeyAction::Consumed);
        assert!(state.paused);
        assert_eq!(key(&mut state, '#'), KeyAction::Consumed);
        assert_eq!(state.color_scheme(), 3);
        assert_eq!(key(&mut state, ' '), KeyAction::ToggleAnimation);
        assert_eq!(key(&mut state, 'h'), KeyAction::Unhandled);
    }

    #[test]
    fn help_drawn_only_when_shown() {
        let mut term = Terminal::offscreen(20, 5);
        let mut state = VizState::new(0.03, "HELP", 0);
        state.render_help(&mut term);
        assert!((0..5).all(|y| term.row_text(y).is_empty()));
        state.show_help = true;
        state.render_help(&mut term);
        assert!((0..5).any(|y| term.row_text(y).contains("HELP")));
    }
}
