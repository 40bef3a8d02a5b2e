// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Action Dispatcher: encode, sign and submit actions without blocking the
//! caller.
//!
//! Every dispatch runs on its own task. Failures are logged and reported
//! through the returned [`DispatchHandle`]; nothing is retried.

use std::sync::Arc;

use seeker_session_client::GameTransport;
use seeker_session_proto::action::digest;
use seeker_session_proto::{Action, DispatchAckPayload, DispatchPayload};
use tokio::task::JoinHandle;
use tracing::{info, warn};

use crate::error::ClientError;
use crate::wallet::SessionKey;

/// Signs actions with the session key and submits them to the hub.
pub struct Dispatcher<T> {
    transport: Arc<T>,
    session: Arc<dyn SessionKey>,
    game_id: String,
}

impl<T: GameTransport> Dispatcher<T> {
    /// Dispatcher for `game_id` signing with `session`.
    pub fn new(transport: Arc<T>, session: Arc<dyn SessionKey>, game_id: impl Into<String>) -> Self {
        Self {
            transport,
            session,
            game_id: game_id.into(),
        }
    }

    /// Build the signed submission for `action`.
    pub fn sign(&self, action: Action) -> DispatchPayload {
        let payload = action.encode();
        let authorization = self.session.sign(&digest(&payload));
        DispatchPayload {
            game_id: self.game_id.clone(),
            action: format!("0x{}", hex::encode(&payload)),
            authorization: authorization.to_hex(),
        }
    }

    /// Submit `action` in the background. Must be called within a Tokio runtime.
    pub fn dispatch(&self, action: Action) -> DispatchHandle {
        let request = self.sign(action);
        let transport = Arc::clone(&self.transport);
        info!(%action, "dispatching");
        DispatchHandle(tokio::spawn(async move {
            match transport.dispatch(request).await {
                Ok(ack) => {
                    info!(action = action.name(), id = %ack.id, status = %ack.status, "dispatched");
                    Ok(ack)
                }
                Err(err) => {
                    warn!(action = action.name(), ?err, "dispatch failed");
                    Err(ClientError::DispatchFailed(err.to_string()))
                }
            }
        }))
    }
}

/// Outcome of a background dispatch. Dropping it does not cancel the submission.
#[derive(Debug)]
pub struct DispatchHandle(JoinHandle<Result<DispatchAckPayload, ClientError>>);

impl DispatchHandle {
    /// Wait for the hub's acknowledgement.
    pub async fn outcome(self) -> Result<DispatchAckPayload, ClientError> {
        match self.0.await {
            Ok(result) => result,
            Err(join) => Err(ClientError::DispatchFailed(join.to_string())),
        }
    }
}
