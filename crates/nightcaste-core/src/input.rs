//! Input and game status as seen by behaviours.
//!
//! Polling the keyboard is the host's job. Behaviours only ask "is this
//! logical key pressed?" through [`InputQuery`]; [`KeySet`] is a snapshot of
//! pressed keys that answers that question and is handy in tests.

use bitflags::bitflags;
use serde::{Deserialize, Serialize};

/// Logical keys the core knows about.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Key {
    /// Cursor left.
    Left,
    /// Cursor right.
    Right,
    /// Cursor up.
    Up,
    /// Cursor down.
    Down,
    /// Keypad 1 (down-left).
    Kp1,
    /// Keypad 2 (down).
    Kp2,
    /// Keypad 3 (down-right).
    Kp3,
    /// Keypad 4 (left).
    Kp4,
    /// Keypad 5.
    Kp5,
    /// Keypad 6 (right).
    Kp6,
    /// Keypad 7 (up-left).
    Kp7,
    /// Keypad 8 (up).
    Kp8,
    /// Keypad 9 (up-right).
    Kp9,
    /// Enter / confirm.
    Enter,
}

impl Key {
    /// Every key, in declaration order.
    pub const ALL: [Key; 14] = [
        Key::Left,
        Key::Right,
        Key::Up,
        Key::Down,
        Key::Kp1,
        Key::Kp2,
        Key::Kp3,
        Key::Kp4,
        Key::Kp5,
        Key::Kp6,
        Key::Kp7,
        Key::Kp8,
        Key::Kp9,
        Key::Enter,
    ];
}

/// Answers whether a logical key is currently pressed.
pub trait InputQuery {
    /// Returns `true` if `key` is pressed.
    fn is_pressed(&self, key: Key) -> bool;

    /// Returns `true` if any of `keys` is pressed.
    fn any_pressed(&self, keys: &[Key]) -> bool {
        keys.iter().any(|key| self.is_pressed(*key))
    }
}

bitflags! {
    /// Snapshot of pressed keys.
    ///
    /// ```
    /// use nightcaste_core::input::{InputQuery, Key, KeySet};
    ///
    /// let pressed = KeySet::from_keys([Key::Up, Key::Left]);
    /// assert!(pressed.is_pressed(Key::Up));
    /// assert!(!pressed.is_pressed(Key::Enter));
    /// ```
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
    pub struct KeySet: u16 {
        /// Cursor left
        const LEFT = 1 << 0;
        /// Cursor right
        const RIGHT = 1 << 1;
        /// Cursor up
        const UP = 1 << 2;
        /// Cursor down
        const DOWN = 1 << 3;
        /// Keypad 1
        const KP1 = 1 << 4;
        /// Keypad 2
        const KP2 = 1 << 5;
        /// Keypad 3
        const KP3 = 1 << 6;
        /// Keypad 4
        const KP4 = 1 << 7;
        /// Keypad 5
        const KP5 = 1 << 8;
        /// Keypad 6
        const KP6 = 1 << 9;
        /// Keypad 7
        const KP7 = 1 << 10;
        /// Keypad 8
        const KP8 = 1 << 11;
        /// Keypad 9
        const KP9 = 1 << 12;
        /// Enter
        const ENTER = 1 << 13;
    }
}

impl KeySet {
    /// Builds a snapshot from individual keys.
    #[must_use]
    pub fn from_keys(keys: impl IntoIterator<Item = Key>) -> Self {
        keys.into_iter().map(Self::from).collect()
    }
}

impl From<Key> for KeySet {
    fn from(key: Key) -> Self {
        match key {
            Key::Left => Self::LEFT,
            Key::Right => Self::RIGHT,
            Key::Up => Self::UP,
            Key::Down => Self::DOWN,
            Key::Kp1 => Self::KP1,
            Key::Kp2 => Self::KP2,
            Key::Kp3 => Self::KP3,
            Key::Kp4 => Self::KP4,
            Key::Kp5 => Self::KP5,
            Key::Kp6 => Self::KP6,
            Key::Kp7 => Self::KP7,
            Key::Kp8 => Self::KP8,
            Key::Kp9 => Self::KP9,
            Key::Enter => Self::ENTER,
        }
    }
}

impl InputQuery for KeySet {
    fn is_pressed(&self, key: Key) -> bool {
        self.contains(Self::from(key))
    }
}

/// Phase of the turn loop, owned by the host.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum GameStatus {
    /// The round waits for the player.
    #[default]
    WaitingForInput,
    /// The round is being resolved.
    Processing,
    /// The game is paused.
    Paused,
}
