// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Terminal wallet: a locally held root key that asks before every signature.

use seeker_session_proto::{Address, Signature};
use seeker_sync::{LocalSessionKey, SessionKey, WalletError, WalletProvider};
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader, Lines, Stdin};
use tokio::sync::Mutex;

pub type StdinLines = Lines<BufReader<Stdin>>;

pub struct PromptWallet {
    root: Option<LocalSessionKey>,
    auto_approve: bool,
    lines: Mutex<StdinLines>,
}

impl PromptWallet {
    pub fn new(root: Option<LocalSessionKey>, auto_approve: bool, lines: StdinLines) -> Self {
        Self {
            root,
            auto_approve,
            lines: Mutex::new(lines),
        }
    }

    /// Hand stdin back once signing is over.
    pub fn into_lines(self) -> StdinLines {
        self.lines.into_inner()
    }

    fn key(&self) -> Result<&LocalSessionKey, WalletError> {
        self.root
            .as_ref()
            .ok_or_else(|| WalletError::Unavailable("no root key; pass --root-key".into()))
    }

    async fn confirm(&self, message: &[u8]) -> Result<(), WalletError> {
        if self.auto_approve {
            return Ok(());
        }
        let prompt = format!(
            "sign \"{}\"? [y/N] ",
            String::from_utf8_lossy(message)
        );
        let mut err = tokio::io::stderr();
        err.write_all(prompt.as_bytes())
            .await
            .map_err(|e| WalletError::Unavailable(e.to_string()))?;
        err.flush()
            .await
            .map_err(|e| WalletError::Unavailable(e.to_string()))?;
        let answer = self
            .lines
            .lock()
            .await
            .next_line()
            .await
            .map_err(|e| WalletError::Unavailable(e.to_string()))?;
        match answer.as_deref().map(str::trim) {
            Some("y" | "Y" | "yes") => Ok(()),
            _ => Err(WalletError::Rejected),
        }
    }
}

impl WalletProvider for PromptWallet {
    async fn request_address(&self) -> Result<Address, WalletError> {
        Ok(self.key()?.address())
    }

    async fn sign_message(&self, message: &[u8]) -> Result<Signature, WalletError> {
        let key = self.key()?;
        self.confirm(message).await?;
        Ok(key.sign(message))
    }
}
