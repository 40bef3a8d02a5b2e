// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Signing capabilities: the root wallet (external) and session keys.
//!
//! The root wallet is owned by an external provider and only ever asked for
//! its address and a signature. Session keys are generated, exported and
//! re-imported through a [`KeyScheme`].
//!
//! [`LocalKeyScheme`] derives addresses and signatures from a 32-byte secret
//! with blake3 keyed hashing. Only a holder of the secret can check such a
//! signature, so it suits local hubs that share the scheme; a hub verifying
//! public-key signatures needs a scheme backed by that algorithm.

use std::fmt;
use std::future::Future;
use std::sync::Arc;

use seeker_session_proto::{Address, Signature};
use thiserror::Error;

use crate::error::ClientError;

const ADDRESS_CONTEXT: &str = "seeker 2024 session address v1";

/// Failure reported by a wallet provider.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum WalletError {
    /// No signer could be reached.
    #[error("wallet unavailable: {0}")]
    Unavailable(String),
    /// The user declined the prompt.
    #[error("rejected by user")]
    Rejected,
}

/// External holder of the root identity.
pub trait WalletProvider {
    /// Ask the wallet for its root address (may prompt the user).
    fn request_address(&self) -> impl Future<Output = Result<Address, WalletError>>;
    /// Ask the wallet to sign `message` with the root key (may prompt the user).
    fn sign_message(&self, message: &[u8]) -> impl Future<Output = Result<Signature, WalletError>>;
}

/// Short-lived delegated signing key.
pub trait SessionKey: Send + Sync {
    /// Address the hub knows this key by.
    fn address(&self) -> Address;
    /// Sign `message`.
    fn sign(&self, message: &[u8]) -> Signature;
    /// Secret in the text form [`KeyScheme::import`] accepts.
    fn export(&self) -> String;
}

/// Factory for session keys.
pub trait KeyScheme: Send + Sync {
    /// Generate a fresh random key.
    fn generate(&self) -> Arc<dyn SessionKey>;
    /// Rebuild a key from its exported text.
    fn import(&self, secret: &str) -> Result<Arc<dyn SessionKey>, ClientError>;
}

/// blake3-backed key: address and signatures derive from the secret.
#[derive(Clone, PartialEq, Eq)]
pub struct LocalSessionKey {
    secret: [u8; 32],
}

impl LocalSessionKey {
    /// Key from raw secret bytes.
    pub fn from_secret(secret: [u8; 32]) -> Self {
        Self { secret }
    }

    /// Fresh key from the OS-seeded thread RNG.
    pub fn random() -> Self {
        Self::from_secret(rand::random())
    }

    /// Parse a 64-digit hex secret (optionally `0x`-prefixed).
    pub fn from_hex(text: &str) -> Result<Self, ClientError> {
        let digits = text.trim();
        let digits = digits.strip_prefix("0x").unwrap_or(digits);
        let bytes = hex::decode(digits)
            .map_err(|_| ClientError::InvalidSessionKey("not hex".into()))?;
        let secret: [u8; 32] = bytes
            .try_into()
            .map_err(|_| ClientError::InvalidSessionKey("expected 32 bytes".into()))?;
        Ok(Self::from_secret(secret))
    }
}

impl fmt::Debug for LocalSessionKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LocalSessionKey")
            .field("address", &self.address())
            .finish_non_exhaustive()
    }
}

impl SessionKey for LocalSessionKey {
    fn address(&self) -> Address {
        let derived = blake3::derive_key(ADDRESS_CONTEXT, &self.secret);
        let mut raw = [0u8; 20];
        raw.copy_from_slice(&derived[..20]);
        Address::from_bytes(raw)
    }

    fn sign(&self, message: &[u8]) -> Signature {
        Signature(blake3::keyed_hash(&self.secret, message).as_bytes().to_vec())
    }

    fn export(&self) -> String {
        format!("0x{}", hex::encode(self.secret))
    }
}

/// [`KeyScheme`] producing [`LocalSessionKey`]s.
#[derive(Debug, Clone, Copy, Default)]
pub struct LocalKeyScheme;

impl KeyScheme for LocalKeyScheme {
    fn generate(&self) -> Arc<dyn SessionKey> {
        Arc::new(LocalSessionKey::random())
    }

    fn import(&self, secret: &str) -> Result<Arc<dyn SessionKey>, ClientError> {
        Ok(Arc::new(LocalSessionKey::from_hex(secret)?))
    }
}
