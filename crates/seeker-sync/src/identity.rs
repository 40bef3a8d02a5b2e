// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Identity Manager: binds a short-lived session key to the wallet's root
//! address and keeps the session material in durable storage.
//!
//! Storage is scoped to one root address. Whenever the wallet reports a
//! different root than the one stored, every stored value is cleared before
//! anything else happens. A session key is persisted only after the hub has
//! accepted its signin.

use std::fmt;
use std::sync::Arc;

use seeker_app_core::config::{ConfigService, ConfigStore};
use seeker_session_client::GameTransport;
use seeker_session_proto::{signin_message, Address, SigninPayload, SESSION_SCOPE, SESSION_TTL};
use tracing::{info, warn};

use crate::error::ClientError;
use crate::wallet::{KeyScheme, SessionKey, WalletProvider};

const ROOT_ADDRESS_KEY: &str = "root_address";
const SESSION_KEY_KEY: &str = "session_key";

/// Root address plus the session key acting on its behalf.
#[derive(Clone)]
pub struct Identity {
    root: Address,
    session: Arc<dyn SessionKey>,
}

impl Identity {
    /// Pair a root address with a session key.
    pub fn new(root: Address, session: Arc<dyn SessionKey>) -> Self {
        Self { root, session }
    }

    /// Wallet-held root address.
    pub fn root_address(&self) -> &Address {
        &self.root
    }

    /// Address of the delegated session key.
    pub fn session_address(&self) -> Address {
        self.session.address()
    }

    /// Session signing key.
    pub fn session_key(&self) -> &Arc<dyn SessionKey> {
        &self.session
    }
}

impl fmt::Debug for Identity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Identity")
            .field("root", &self.root)
            .field("session", &self.session.address())
            .finish()
    }
}

/// Durable session material, scoped to one root address.
pub struct SessionStore<S> {
    config: ConfigService<S>,
}

impl<S: ConfigStore> SessionStore<S> {
    /// Wrap a store dedicated to session material.
    pub fn new(store: S) -> Self {
        Self {
            config: ConfigService::new(store),
        }
    }

    /// Root address the stored material belongs to.
    pub fn root_address(&self) -> Result<Option<Address>, ClientError> {
        // Unparseable roots count as foreign so the next bind clears them.
        let raw: Option<String> = self.config.load(ROOT_ADDRESS_KEY)?;
        Ok(raw.and_then(|r| r.parse().ok()))
    }

    /// Exported session key, if one was persisted.
    pub fn session_secret(&self) -> Result<Option<String>, ClientError> {
        Ok(self.config.load(SESSION_KEY_KEY)?)
    }

    /// Make `root` the owner of this store, clearing everything when the
    /// previous owner differs. Returns true when a clear happened.
    pub fn bind_root(&self, root: &Address) -> Result<bool, ClientError> {
        if self.root_address()?.as_ref() == Some(root) {
            return Ok(false);
        }
        self.config.clear()?;
        self.config.save(ROOT_ADDRESS_KEY, &root.as_str())?;
        Ok(true)
    }

    /// Persist an exported session key.
    pub fn save_session(&self, secret: &str) -> Result<(), ClientError> {
        Ok(self.config.save(SESSION_KEY_KEY, &secret)?)
    }

    /// Forget the stored session key but keep the root binding.
    pub fn forget_session(&self) -> Result<(), ClientError> {
        Ok(self.config.remove(SESSION_KEY_KEY)?)
    }

    /// Clear every stored value (sign-out).
    pub fn clear(&self) -> Result<(), ClientError> {
        Ok(self.config.clear()?)
    }
}

/// Establishes and tears down [`Identity`]s.
pub struct IdentityManager<S> {
    store: SessionStore<S>,
    keys: Box<dyn KeyScheme>,
}

impl<S: ConfigStore> IdentityManager<S> {
    /// Manager persisting into `store` and minting keys with `keys`.
    pub fn new(store: S, keys: impl KeyScheme + 'static) -> Self {
        Self {
            store: SessionStore::new(store),
            keys: Box::new(keys),
        }
    }

    /// Session storage backing this manager.
    pub fn store(&self) -> &SessionStore<S> {
        &self.store
    }

    /// Resolve the root address, reuse a stored session key for it or sign
    /// in a fresh one.
    pub async fn establish<W, T>(
        &self,
        wallet: &W,
        transport: &T,
        game_id: &str,
    ) -> Result<Identity, ClientError>
    where
        W: WalletProvider,
        T: GameTransport,
    {
        let root = wallet.request_address().await?;
        if self.store.bind_root(&root)? {
            info!(%root, "root address changed; cleared stored session");
        }

        if let Some(secret) = self.store.session_secret()? {
            match self.keys.import(&secret) {
                Ok(session) => {
                    info!(session = %session.address(), "using stored session key");
                    return Ok(Identity::new(root, session));
                }
                Err(err) => {
                    warn!(%err, "stored session key unusable; signing in again");
                    self.store.forget_session()?;
                }
            }
        }

        let session = self.keys.generate();
        let session_address = session.address();
        let authorization = wallet
            .sign_message(&signin_message(&session_address))
            .await?;
        let accepted = transport
            .signin(SigninPayload {
                game_id: game_id.to_string(),
                session: session_address.clone(),
                ttl: SESSION_TTL,
                scope: SESSION_SCOPE.to_string(),
                authorization: authorization.to_hex(),
            })
            .await?;
        if !accepted {
            return Err(ClientError::SigninRejected);
        }
        self.store.save_session(&session.export())?;
        info!(session = %session_address, "signed in with fresh session key");
        Ok(Identity::new(root, session))
    }

    /// Explicit sign-out: drop every stored value.
    pub fn sign_out(&self) -> Result<(), ClientError> {
        self.store.clear()?;
        info!("session cleared");
        Ok(())
    }
}
