// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Error taxonomy of the sync controller.
//!
//! Wallet, signin and biome errors are fatal to the scene and surface to the
//! caller. Dispatch and subscription failures are logged and swallowed so the
//! render loop stays live.

use seeker_app_core::config::ConfigError;
use seeker_session_client::TransportError;
use seeker_session_proto::SnapshotError;
use thiserror::Error;

use crate::wallet::WalletError;

/// Errors surfaced by the sync controller.
#[derive(Debug, Error)]
pub enum ClientError {
    /// No external signer is reachable.
    #[error("wallet unavailable: {0}")]
    WalletUnavailable(String),
    /// The user declined the signing prompt.
    #[error("user rejected the signing request")]
    UserRejected,
    /// The hub refused the session signin.
    #[error("signin rejected by hub")]
    SigninRejected,
    /// Biome code outside the known set; protocol mismatch with the hub.
    #[error("unknown biome kind={0}")]
    UnknownBiome(i64),
    /// An action submission failed (logged and swallowed by the scene).
    #[error("dispatch failed: {0}")]
    DispatchFailed(String),
    /// The state subscription ended; the scene keeps running on stale state.
    #[error("state subscription closed")]
    SubscriptionClosed,
    /// Stored session key could not be decoded.
    #[error("invalid session key: {0}")]
    InvalidSessionKey(String),
    /// Durable storage failed.
    #[error(transparent)]
    Storage(#[from] ConfigError),
    /// Hub transport failed outside a dispatch.
    #[error(transparent)]
    Transport(TransportError),
}

impl From<TransportError> for ClientError {
    fn from(err: TransportError) -> Self {
        match err {
            TransportError::Snapshot(SnapshotError::UnknownBiome(code)) => {
                ClientError::UnknownBiome(code)
            }
            other => ClientError::Transport(other),
        }
    }
}

impl From<WalletError> for ClientError {
    fn from(err: WalletError) -> Self {
        match err {
            WalletError::Unavailable(why) => ClientError::WalletUnavailable(why),
            WalletError::Rejected => ClientError::UserRejected,
        }
    }
}

impl ClientError {
    /// True for errors that must stop the scene.
    pub fn is_fatal(&self) -> bool {
        !matches!(
            self,
            ClientError::DispatchFailed(_) | ClientError::SubscriptionClosed
        )
    }
}
