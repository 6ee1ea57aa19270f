use glfw::{Action, Key, WindowEvent};
use rustc_hash::FxHashMap;

/// Per-frame key states, fed from window events.
#[derive(Debug, Default)]
pub struct Keyboard {
    states: FxHashMap<Key, KeyState>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyState {
    /// The key is up. e.g. not pressed.
    Up,
    /// The key was pressed this frame.
    Pressed,
    /// The key was released this frame.
    Released,
    /// The key is being held down.
    /// Specifically, the key was pressed in a previous frame and has not been released yet.
    Held,
}

impl Keyboard {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get_key_state(&self, key: Key) -> Option<KeyState> {
        self.states.get(&key).copied()
    }

    /// Returns true if the key was pressed this frame.
    pub fn is_key_pressed(&self, key: Key) -> bool {
        matches!(self.get_key_state(key), Some(KeyState::Pressed))
    }

    /// Returns true if the key is currently being held down.
    pub fn is_key_held(&self, key: Key) -> bool {
        matches!(
            self.get_key_state(key),
            Some(KeyState::Pressed | KeyState::Held)
        )
    }

    pub fn press_key(&mut self, key: Key) {
        self.states.insert(key, KeyState::Pressed);
    }

    pub fn release_key(&mut self, key: Key) {
        self.states.insert(key, KeyState::Released);
    }

    /// Applies a key event; everything else is ignored.
    pub fn handle_event(&mut self, event: &WindowEvent) {
        match event {
            WindowEvent::Key(key, _, Action::Press, _) => self.press_key(*key),
            WindowEvent::Key(key, _, Action::Release, _) => self.release_key(*key),
            _ => {}
        }
    }

    /// Advances to the next frame. Call before handling the frame's events.
    pub fn update_keys(&mut self) {
        for state in self.states.values_mut() {
            if *state == KeyState::Pressed {
                *state = KeyState::Held;
            } else if *state == KeyState::Released {
                *state = KeyState::Up;
            }
        }
    }
}
