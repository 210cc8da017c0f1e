//! Keyboard stand-in for the original NES-style controller. Polled once per
//! frame from `main`'s foreground loop.

use bitflags::bitflags;
use crossterm::event::{self, Event, KeyCode};
use std::time::Duration;

bitflags! {
    pub struct Buttons: u8 {
        const A      = 0x01;
        const B      = 0x02;
        const SELECT = 0x04;
        const START  = 0x08;
        const UP     = 0x10;
        const DOWN   = 0x20;
        const LEFT   = 0x40;
        const RIGHT  = 0x80;
    }
}

/// Terminal key events are already edge-triggered (there is no sustained
/// "key down" state to compare against, unlike the source's polled shift
/// register), so a poll simply drains whatever key presses arrived since
/// the last call and reports them as newly pressed.
#[derive(Debug, Default)]
pub struct Gamepad;

impl Gamepad {
    pub fn new() -> Self {
        Gamepad::default()
    }

    /// Drains any pending key events without blocking and returns the set of
    /// buttons pressed since the last call.
    pub fn poll(&mut self) -> Buttons {
        let mut pressed = Buttons::empty();

        while let Ok(true) = event::poll(Duration::from_secs(0)) {
            match event::read() {
                Ok(Event::Key(key)) => {
                    if let Some(button) = key_to_button(key.code) {
                        pressed.insert(button);
                    }
                }
                _ => break,
            }
        }

        pressed
    }
}

fn key_to_button(code: KeyCode) -> Option<Buttons> {
    match code {
        KeyCode::Char('z') | KeyCode::Char('Z') => Some(Buttons::A),
        KeyCode::Char('x') | KeyCode::Char('X') => Some(Buttons::B),
        KeyCode::Enter => Some(Buttons::START),
        KeyCode::Backspace => Some(Buttons::SELECT),
        KeyCode::Up => Some(Buttons::UP),
        KeyCode::Down => Some(Buttons::DOWN),
        KeyCode::Left => Some(Buttons::LEFT),
        KeyCode::Right => Some(Buttons::RIGHT),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pressed_set_never_includes_bits_outside_its_mask() {
        let all = Buttons::all();
        assert_eq!(all.bits(), 0xFF);
    }
}
