// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Session and state-sync controller for the seeker client.
//!
//! * [`identity`] binds a session key to the wallet's root address.
//! * [`dispatcher`] signs actions with the session key and submits them.
//! * [`reconciler`] folds hub snapshots into render state and triggers reveals.
//! * [`movement`] predicts the player's cursor ahead of confirmation.
//! * [`scene`] drives all of the above from one cooperative loop.
//!
//! The hub is reached through [`seeker_session_client::GameTransport`]; the
//! drawing surface through [`seeker_app_core::render_port::RenderPort`].

pub mod dispatcher;
pub mod entities;
pub mod error;
pub mod identity;
pub mod input;
pub mod movement;
pub mod reconciler;
pub mod scene;
pub mod tilemap;
pub mod wallet;

pub use dispatcher::{DispatchHandle, Dispatcher};
pub use error::ClientError;
pub use identity::{Identity, IdentityManager, SessionStore};
pub use input::{Button, InputEvent};
pub use movement::{MoveOutcome, MovementTracker, Phase};
pub use reconciler::Reconciler;
pub use scene::{GameScene, InputOutcome, SceneExit};
pub use wallet::{KeyScheme, LocalKeyScheme, LocalSessionKey, SessionKey, WalletError, WalletProvider};
