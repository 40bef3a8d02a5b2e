// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Input events raised by the render/input surface, and the default key map.
//!
//! Screen rows grow downward while the hub's NORTH increases `y`, so the key
//! drawn "up" on the keyboard maps to SOUTH.

use std::str::FromStr;

use seeker_session_proto::Direction;
use thiserror::Error;

/// On-screen buttons.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Button {
    /// Ask the hub to reset the world.
    ResetMap,
    /// Wipe stored session material and leave the scene.
    ClearSession,
    /// Spawn the player's seeker.
    SpawnSeeker,
}

/// One user input.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum InputEvent {
    /// Directional key.
    Direction(Direction),
    /// Button activation.
    Button(Button),
}

/// Direction bound to `key`, case-insensitive.
pub fn key_direction(key: char) -> Option<Direction> {
    match key.to_ascii_lowercase() {
        'w' => Some(Direction::South),
        's' => Some(Direction::North),
        'a' => Some(Direction::West),
        'd' => Some(Direction::East),
        'q' => Some(Direction::SouthWest),
        'e' => Some(Direction::SouthEast),
        'z' => Some(Direction::NorthWest),
        'c' => Some(Direction::NorthEast),
        _ => None,
    }
}

/// Text that is neither a bound key nor a button name.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("unrecognised input {0:?}")]
pub struct UnknownInput(pub String);

impl FromStr for InputEvent {
    type Err = UnknownInput;

    /// Single bound key (`w`, `a`, …) or a button name such as `reset`,
    /// `spawn`, `clear` or a full label like `SPAWN SEEKER`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let text = s.trim();
        let mut chars = text.chars();
        if let (Some(key), None) = (chars.next(), chars.next()) {
            if let Some(direction) = key_direction(key) {
                return Ok(InputEvent::Direction(direction));
            }
        }
        let button = match text.to_ascii_lowercase().as_str() {
            "reset" | "reset map" => Button::ResetMap,
            "clear" | "clear session" => Button::ClearSession,
            "spawn" | "spawn seeker" => Button::SpawnSeeker,
            _ => return Err(UnknownInput(text.to_string())),
        };
        Ok(InputEvent::Button(button))
    }
}
