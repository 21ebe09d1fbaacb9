//! Keyboard sampling and movement intent derivation

use macroquad::prelude::{get_keys_pressed, get_keys_released, KeyCode};
use shared::ClientMessage;
use std::collections::HashSet;

/// Physical keys that steer the player
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MoveKey {
    W,
    A,
    S,
    D,
    ArrowUp,
    ArrowLeft,
    ArrowDown,
    ArrowRight,
}

impl MoveKey {
    pub fn from_keycode(code: KeyCode) -> Option<Self> {
        match code {
            KeyCode::W => Some(MoveKey::W),
            KeyCode::A => Some(MoveKey::A),
            KeyCode::S => Some(MoveKey::S),
            KeyCode::D => Some(MoveKey::D),
            KeyCode::Up => Some(MoveKey::ArrowUp),
            KeyCode::Left => Some(MoveKey::ArrowLeft),
            KeyCode::Down => Some(MoveKey::ArrowDown),
            KeyCode::Right => Some(MoveKey::ArrowRight),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyEvent {
    Down(MoveKey),
    Up(MoveKey),
}

/// Movement intent for one frame, each axis in `{-1, 0, 1}`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct InputVector {
    pub dx: i8,
    pub dy: i8,
}

impl InputVector {
    pub fn is_zero(&self) -> bool {
        self.dx == 0 && self.dy == 0
    }

    pub fn to_message(self) -> ClientMessage {
        ClientMessage::Move {
            x: self.dx,
            y: self.dy,
        }
    }
}

/// Live table of held movement keys.
///
/// Key events arrive whenever the window delivers them; the render loop reads
/// the table once per frame through [`InputManager::sample`].
pub struct InputManager {
    held: HashSet<MoveKey>,
    listening: bool,
}

impl InputManager {
    pub fn new() -> Self {
        Self {
            held: HashSet::new(),
            listening: true,
        }
    }

    pub fn handle_event(&mut self, event: KeyEvent) {
        if !self.listening {
            return;
        }

        match event {
            KeyEvent::Down(key) => {
                self.held.insert(key);
            }
            KeyEvent::Up(key) => {
                self.held.remove(&key);
            }
        }
    }

    pub fn is_held(&self, key: MoveKey) -> bool {
        self.held.contains(&key)
    }

    /// Opposing directions cancel out, so holding up and down yields `dy = 0`.
    pub fn sample(&self) -> InputVector {
        let up = self.is_held(MoveKey::W) || self.is_held(MoveKey::ArrowUp);
        let down = self.is_held(MoveKey::S) || self.is_held(MoveKey::ArrowDown);
        let left = self.is_held(MoveKey::A) || self.is_held(MoveKey::ArrowLeft);
        let right = self.is_held(MoveKey::D) || self.is_held(MoveKey::ArrowRight);

        InputVector {
            dx: axis(left, right),
            dy: axis(up, down),
        }
    }

    /// Stops accepting key events and forgets everything held.
    pub fn detach(&mut self) {
        self.listening = false;
        self.held.clear();
    }

    pub fn is_listening(&self) -> bool {
        self.listening
    }
}

impl Default for InputManager {
    fn default() -> Self {
        Self::new()
    }
}

fn axis(negative: bool, positive: bool) -> i8 {
    i8::from(positive) - i8::from(negative)
}

/// Collects this frame's key transitions from the window.
pub fn poll_keyboard() -> Vec<KeyEvent> {
    let pressed = get_keys_pressed()
        .into_iter()
        .filter_map(MoveKey::from_keycode)
        .map(KeyEvent::Down);
    let released = get_keys_released()
        .into_iter()
        .filter_map(MoveKey::from_keycode)
        .map(KeyEvent::Up);

    pressed.chain(released).collect()
}
