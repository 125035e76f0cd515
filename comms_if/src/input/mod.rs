//! # Input Devices
//!
//! Event snapshots delivered by operator input devices. Each snapshot is self-contained, listeners
//! never need to track device history to interpret one.

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use serde::{Deserialize, Serialize};

// ------------------------------------------------------------------------------------------------
// STRUCTS
// ------------------------------------------------------------------------------------------------

/// A single key transition from a keyboard.
#[derive(Serialize, Deserialize, Debug, Copy, Clone, PartialEq, Eq)]
pub struct KeyEvent {
    /// The character produced by the key
    pub key: char,

    /// Whether the key went down or up
    pub action: KeyAction,
}

/// The state of every button on a game controller at one instant.
///
/// Index `i` holds the value of button `i`, `1` meaning pressed.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq, Default)]
pub struct JoyButtons(pub Vec<i32>);

// ------------------------------------------------------------------------------------------------
// ENUMS
// ------------------------------------------------------------------------------------------------

#[derive(Serialize, Deserialize, Debug, Copy, Clone, PartialEq, Eq)]
pub enum KeyAction {
    Pressed,
    Released,
}

// ------------------------------------------------------------------------------------------------
// IMPLS
// ------------------------------------------------------------------------------------------------

impl KeyEvent {
    pub fn pressed(key: char) -> Self {
        Self {
            key,
            action: KeyAction::Pressed,
        }
    }

    pub fn released(key: char) -> Self {
        Self {
            key,
            action: KeyAction::Released,
        }
    }
}

impl JoyButtons {
    /// Returns true if the button at `index` exists and is pressed.
    pub fn is_pressed(&self, index: usize) -> bool {
        self.0.get(index).map_or(false, |v| *v == 1)
    }
}

impl From<Vec<i32>> for JoyButtons {
    fn from(buttons: Vec<i32>) -> Self {
        Self(buttons)
    }
}
