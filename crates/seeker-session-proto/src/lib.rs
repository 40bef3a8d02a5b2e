// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Session wire schema for the seeker state hub (state queries, pushed
//! snapshots, signin, signed action dispatch).
//! Messages travel as CBOR `OpEnvelope`s inside checksummed packets (see [`wire`]).

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

pub mod action;
pub mod ids;
pub mod snapshot;
pub mod wire;

pub use action::{Action, Direction};
pub use ids::{Address, EntityKey, GridPos, IdError, Signature};
pub use snapshot::{BiomeKind, SeekerView, SnapshotError, StateGraph, TileView, WorldSnapshot};

/// 32-byte digest.
pub type Hash32 = [u8; 32];

/// Default Unix socket path for the state hub.
///
/// Prefers a per-user runtime dir (XDG_RUNTIME_DIR) and falls back to `/tmp`
/// when unavailable.
pub fn default_socket_path() -> PathBuf {
    let base = std::env::var_os("XDG_RUNTIME_DIR")
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from("/tmp"));
    base.join("seeker-session.sock")
}

/// Session lifetime requested at signin (hub-defined units).
pub const SESSION_TTL: u32 = 1000;
/// Scope mask requested at signin (all actions).
pub const SESSION_SCOPE: &str = "0xffffffff";
/// Text the root wallet signs, followed by the session address.
pub const SIGNIN_PREAMBLE: &str = "You are signing in with session: ";

/// Bytes the root wallet signs to authorize `session`.
pub fn signin_message(session: &Address) -> Vec<u8> {
    let mut msg = SIGNIN_PREAMBLE.as_bytes().to_vec();
    msg.extend_from_slice(session.as_str().as_bytes());
    msg
}

/// Canonical OpEnvelope carried as the payload of a packet.
///
/// * `op` – operation name.
/// * `ts` – request sequence; responses echo the sequence they answer.
/// * `payload` – operation specific body.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct OpEnvelope<P> {
    /// Operation name (e.g., "signin", "dispatch_ack", "state_stream").
    pub op: String,
    /// Request sequence number.
    pub ts: u64,
    /// Operation-specific body.
    pub payload: P,
}

/// Error payload sent by the hub in place of a response.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ErrorPayload {
    /// Numeric error code.
    pub code: u32,
    /// Stable identifier (e.g., "E_BAD_SIGNATURE").
    pub name: String,
    /// Human readable message.
    pub message: String,
}

/// Identifies the game a request is about.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct GamePayload {
    /// Game id (`"latest"` follows the newest game).
    pub game_id: String,
}

/// State answer or push; `None` when the hub has no state for the game.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct StatePayload {
    /// Graph-shaped state record.
    pub state: Option<StateGraph>,
}

/// Signin request authorizing a session key for a game.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct SigninPayload {
    /// Game id.
    pub game_id: String,
    /// Session address being authorized.
    pub session: Address,
    /// Requested lifetime.
    pub ttl: u32,
    /// Requested scope mask.
    pub scope: String,
    /// Root wallet signature over [`signin_message`], `0x` hex.
    pub authorization: String,
}

/// Signin verdict.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct SigninAckPayload {
    /// True when the hub accepted the session.
    pub accepted: bool,
}

/// Signed action submission.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct DispatchPayload {
    /// Game id.
    pub game_id: String,
    /// Encoded action bytes, `0x` hex.
    pub action: String,
    /// Session signature over the action digest, `0x` hex.
    pub authorization: String,
}

/// Dispatch acknowledgement.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct DispatchAckPayload {
    /// Hub-assigned transaction id.
    pub id: String,
    /// Hub-reported status (e.g., "PENDING").
    pub status: String,
}

/// Wire message kinds carried inside OpEnvelope payloads.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Message {
    /// One-shot state fetch (op = "query_state").
    QueryState(GamePayload),
    /// Answer to a state fetch (op = "state").
    State(StatePayload),
    /// Open the state subscription (op = "subscribe_state").
    SubscribeState(GamePayload),
    /// Pushed state (op = "state_stream").
    StateStream(StatePayload),
    /// Authorize a session key (op = "signin").
    Signin(SigninPayload),
    /// Signin verdict (op = "signin_ack").
    SigninAck(SigninAckPayload),
    /// Submit a signed action (op = "dispatch").
    Dispatch(DispatchPayload),
    /// Dispatch acknowledgement (op = "dispatch_ack").
    DispatchAck(DispatchAckPayload),
    /// Protocol or processing error (op = "error").
    Error(ErrorPayload),
}

impl Message {
    /// Canonical op string for this message variant.
    pub fn op_name(&self) -> &'static str {
        match self {
            Message::QueryState(_) => "query_state",
            Message::State(_) => "state",
            Message::SubscribeState(_) => "subscribe_state",
            Message::StateStream(_) => "state_stream",
            Message::Signin(_) => "signin",
            Message::SigninAck(_) => "signin_ack",
            Message::Dispatch(_) => "dispatch",
            Message::DispatchAck(_) => "dispatch_ack",
            Message::Error(_) => "error",
        }
    }
}
