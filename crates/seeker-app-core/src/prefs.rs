// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Saved client preferences (which hub, which game).

use serde::{Deserialize, Serialize};

/// Game id the client follows when nothing else is configured.
pub const DEFAULT_GAME_ID: &str = "latest";

/// Saved preferences for a seeker client.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClientPrefs {
    /// Unix socket path of the state hub; `None` uses the transport default.
    #[serde(default)]
    pub socket_path: Option<String>,
    /// Game the client signs in to and follows.
    #[serde(default = "default_game_id")]
    pub game_id: String,
}

fn default_game_id() -> String {
    DEFAULT_GAME_ID.to_string()
}

impl Default for ClientPrefs {
    fn default() -> Self {
        Self {
            socket_path: None,
            game_id: default_game_id(),
        }
    }
}
