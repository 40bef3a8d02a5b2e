// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Headless seeker client: signs in, follows the hub's state and reads moves
//! and button presses from stdin (`w`/`a`/`s`/`d`, `reset`, `spawn`, `clear`).

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use seeker_app_core::config::ConfigService;
use seeker_app_core::prefs::ClientPrefs;
use seeker_config_fs::FsConfigStore;
use seeker_session_client::SessionClient;
use seeker_session_proto::default_socket_path;
use seeker_sync::{GameScene, IdentityManager, InputEvent, LocalKeyScheme, LocalSessionKey, SceneExit};
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::mpsc;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

mod render;
mod wallet;

use render::LogRenderPort;
use wallet::{PromptWallet, StdinLines};

const PREFS_KEY: &str = "client";

#[derive(Parser, Debug)]
#[command(author, version, about = "Seeker terminal client")]
struct Args {
    /// Unix socket of the state hub (overrides saved prefs)
    #[arg(long)]
    socket: Option<PathBuf>,
    /// Game to sign in to (overrides saved prefs)
    #[arg(long)]
    game_id: Option<String>,
    /// Hex secret of the root wallet key
    #[arg(long, env = "SEEKER_ROOT_KEY", hide_env_values = true)]
    root_key: Option<String>,
    /// Sign without asking
    #[arg(long)]
    yes: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive("info".parse()?))
        .init();

    let store = FsConfigStore::new().context("open config directory")?;
    let sessions = store.namespace("session").context("open session store")?;
    let prefs = load_prefs(&ConfigService::new(store));

    let socket = args
        .socket
        .or_else(|| prefs.socket_path.map(PathBuf::from))
        .unwrap_or_else(default_socket_path);
    let game_id = args.game_id.unwrap_or(prefs.game_id);

    let root = args
        .root_key
        .as_deref()
        .map(LocalSessionKey::from_hex)
        .transpose()
        .context("parse --root-key")?;
    let lines = BufReader::new(tokio::io::stdin()).lines();
    let wallet = PromptWallet::new(root, args.yes, lines);

    let transport = Arc::new(
        SessionClient::connect(&socket)
            .await
            .with_context(|| format!("connect to {}", socket.display()))?,
    );
    info!(socket = %socket.display(), game = %game_id, "connected");

    let identities = IdentityManager::new(sessions, LocalKeyScheme);
    let identity = identities
        .establish(&wallet, transport.as_ref(), &game_id)
        .await
        .context("establish session")?;
    info!(root = %identity.root_address(), session = %identity.session_address(), "session ready");

    let mut scene = GameScene::new(transport, &identity, game_id, LogRenderPort::default());
    scene.start().await.context("start scene")?;

    let (inputs, rx) = mpsc::channel(32);
    tokio::spawn(pump_stdin(wallet.into_lines(), inputs));

    let shutdown = async {
        if let Err(err) = tokio::signal::ctrl_c().await {
            warn!(?err, "ctrl-c handler unavailable");
            std::future::pending::<()>().await;
        }
    };

    match scene.run(rx, shutdown).await.context("scene")? {
        SceneExit::SignedOut => {
            identities.sign_out().context("clear session")?;
            info!("signed out; run again to sign in");
        }
        SceneExit::Shutdown | SceneExit::InputClosed => info!("bye"),
    }
    Ok(())
}

/// Saved prefs, falling back to defaults. Defaults are written once when
/// nothing readable is stored.
fn load_prefs(config: &ConfigService<FsConfigStore>) -> ClientPrefs {
    match config.load::<ClientPrefs>(PREFS_KEY) {
        Ok(Some(prefs)) => prefs,
        Ok(None) | Err(_) => {
            let prefs = ClientPrefs::default();
            if let Err(err) = config.save(PREFS_KEY, &prefs) {
                warn!(?err, "could not persist default prefs");
            }
            prefs
        }
    }
}

async fn pump_stdin(mut lines: StdinLines, inputs: mpsc::Sender<InputEvent>) {
    loop {
        let line = match lines.next_line().await {
            Ok(Some(line)) => line,
            Ok(None) => break,
            Err(err) => {
                warn!(?err, "stdin read failed");
                break;
            }
        };
        if line.trim().is_empty() {
            continue;
        }
        match line.parse::<InputEvent>() {
            Ok(event) => {
                if inputs.send(event).await.is_err() {
                    break;
                }
            }
            Err(err) => warn!(%err, "ignored"),
        }
    }
}
