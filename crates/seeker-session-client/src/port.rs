// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Transport port consumed by the sync controller.
//!
//! `GameTransport` is the whole surface the controller needs from the hub:
//! a one-shot state fetch, the push subscription, signin and dispatch. The
//! socket client in this crate implements it; tests substitute scripted fakes.

use std::future::Future;

use seeker_session_proto::{
    wire::WireError, DispatchAckPayload, DispatchPayload, SigninPayload, SnapshotError,
    WorldSnapshot,
};
use thiserror::Error;
use tokio::sync::mpsc::Receiver;

/// Transport-level failure.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum TransportError {
    /// Socket I/O failed.
    #[error("io error: {0}")]
    Io(String),
    /// Packet framing or CBOR failure.
    #[error(transparent)]
    Wire(#[from] WireError),
    /// Connection closed before the answer arrived.
    #[error("connection closed")]
    Closed,
    /// Hub answered with an error payload.
    #[error("hub error {code} {name}: {message}")]
    Remote {
        /// Numeric error code.
        code: u32,
        /// Stable identifier.
        name: String,
        /// Human readable message.
        message: String,
    },
    /// Hub answered with a message of the wrong kind.
    #[error("unexpected response op {0}")]
    Unexpected(&'static str),
    /// State record failed validation.
    #[error(transparent)]
    Snapshot(#[from] SnapshotError),
}

impl From<std::io::Error> for TransportError {
    fn from(err: std::io::Error) -> Self {
        TransportError::Io(err.to_string())
    }
}

/// One item of the state subscription: a validated snapshot, `None` when the
/// hub has no state, or an error for a push that could not be used.
pub type StateEvent = Result<Option<WorldSnapshot>, TransportError>;

/// Receiving end of the state subscription; yields `None` once it is closed.
pub type StateSubscription = Receiver<StateEvent>;

/// Hub operations the client depends on.
pub trait GameTransport: Send + Sync + 'static {
    /// Fetch the current state of `game_id`.
    fn fetch_state(
        &self,
        game_id: &str,
    ) -> impl Future<Output = Result<Option<WorldSnapshot>, TransportError>> + Send;

    /// Open the push subscription for `game_id`.
    fn subscribe_state(
        &self,
        game_id: &str,
    ) -> impl Future<Output = Result<StateSubscription, TransportError>> + Send;

    /// Authorize a session key. `Ok(false)` when the hub refuses it.
    fn signin(
        &self,
        request: SigninPayload,
    ) -> impl Future<Output = Result<bool, TransportError>> + Send;

    /// Submit a signed action.
    fn dispatch(
        &self,
        request: DispatchPayload,
    ) -> impl Future<Output = Result<DispatchAckPayload, TransportError>> + Send;
}
