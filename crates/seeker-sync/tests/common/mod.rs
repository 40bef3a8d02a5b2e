// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use seeker_app_core::config::{ConfigError, ConfigStore, MemConfigStore};
use seeker_app_core::render_port::{Layer, RenderPort, SpriteId, TextSlot};
use seeker_session_client::{GameTransport, StateEvent, StateSubscription, TransportError};
use seeker_session_proto::{
    Action, Address, BiomeKind, DispatchAckPayload, DispatchPayload, EntityKey, GridPos,
    SeekerView, Signature, SigninPayload, TileView, WorldSnapshot,
};
use seeker_sync::{WalletError, WalletProvider};
use tokio::sync::mpsc;

/// Shared, ordered record of observable side effects.
pub type Journal = Arc<Mutex<Vec<String>>>;

pub fn journal() -> Journal {
    Arc::new(Mutex::new(Vec::new()))
}

pub fn root() -> Address {
    Address::from_bytes([0x11; 20])
}

pub fn other_root() -> Address {
    Address::from_bytes([0x22; 20])
}

pub fn action_hex(action: Action) -> String {
    format!("0x{}", hex::encode(action.encode()))
}

pub fn tile(x: i32, y: i32, biome: Option<BiomeKind>, seed: Option<u64>) -> TileView {
    TileView {
        coords: GridPos::new(x, y),
        biome,
        seed: seed.map(EntityKey::new),
    }
}

pub fn seeker(key: u64, x: i32, y: i32, owner: Address, corn: i64) -> SeekerView {
    SeekerView {
        key: EntityKey::new(key),
        position: GridPos::new(x, y),
        owner,
        corn_balance: corn,
    }
}

pub fn snapshot(block: u64, tiles: Vec<TileView>, seekers: Vec<SeekerView>) -> WorldSnapshot {
    WorldSnapshot {
        block,
        tiles,
        seekers,
    }
}

// --- Transport ------------------------------------------------------------

#[derive(Default)]
pub struct FakeTransport {
    pub state: Mutex<Option<Result<Option<WorldSnapshot>, TransportError>>>,
    pub refuse_signin: bool,
    pub fail_dispatch: bool,
    pub signins: Mutex<Vec<SigninPayload>>,
    pub dispatches: Mutex<Vec<DispatchPayload>>,
    pub fetches: Mutex<usize>,
    pub subscribes: Mutex<usize>,
    pub push: Mutex<Option<mpsc::Sender<StateEvent>>>,
    pub journal: Option<Journal>,
}

impl FakeTransport {
    pub fn with_state(state: WorldSnapshot) -> Self {
        Self {
            state: Mutex::new(Some(Ok(Some(state)))),
            ..Self::default()
        }
    }

    pub fn dispatched(&self) -> Vec<DispatchPayload> {
        self.dispatches.lock().unwrap().clone()
    }

    pub fn pusher(&self) -> mpsc::Sender<StateEvent> {
        self.push.lock().unwrap().clone().unwrap()
    }

    pub fn hang_up(&self) {
        self.push.lock().unwrap().take();
    }
}

impl GameTransport for FakeTransport {
    async fn fetch_state(&self, _: &str) -> Result<Option<WorldSnapshot>, TransportError> {
        *self.fetches.lock().unwrap() += 1;
        self.state.lock().unwrap().clone().unwrap_or(Ok(None))
    }

    async fn subscribe_state(&self, _: &str) -> Result<StateSubscription, TransportError> {
        *self.subscribes.lock().unwrap() += 1;
        let (tx, rx) = mpsc::channel(16);
        *self.push.lock().unwrap() = Some(tx);
        Ok(rx)
    }

    async fn signin(&self, request: SigninPayload) -> Result<bool, TransportError> {
        if let Some(journal) = &self.journal {
            journal.lock().unwrap().push("signin".into());
        }
        self.signins.lock().unwrap().push(request);
        Ok(!self.refuse_signin)
    }

    async fn dispatch(
        &self,
        request: DispatchPayload,
    ) -> Result<DispatchAckPayload, TransportError> {
        self.dispatches.lock().unwrap().push(request);
        if self.fail_dispatch {
            return Err(TransportError::Io("connection reset".into()));
        }
        Ok(DispatchAckPayload {
            id: "tx".into(),
            status: "PENDING".into(),
        })
    }
}

// --- Wallet ---------------------------------------------------------------

pub struct FakeWallet {
    pub root: Result<Address, WalletError>,
    pub refuse_signing: bool,
    pub signed: Mutex<Vec<Vec<u8>>>,
}

impl FakeWallet {
    pub fn new(root: Address) -> Self {
        Self {
            root: Ok(root),
            refuse_signing: false,
            signed: Mutex::new(Vec::new()),
        }
    }

    pub fn failing(err: WalletError) -> Self {
        Self {
            root: Err(err),
            refuse_signing: false,
            signed: Mutex::new(Vec::new()),
        }
    }

    pub fn signature_for(message: &[u8]) -> Signature {
        Signature(blake3::hash(message).as_bytes().to_vec())
    }
}

impl WalletProvider for FakeWallet {
    async fn request_address(&self) -> Result<Address, WalletError> {
        self.root.clone()
    }

    async fn sign_message(&self, message: &[u8]) -> Result<Signature, WalletError> {
        if self.refuse_signing {
            return Err(WalletError::Rejected);
        }
        self.signed.lock().unwrap().push(message.to_vec());
        Ok(Self::signature_for(message))
    }
}

// --- Storage --------------------------------------------------------------

/// Memory store that journals writes.
pub struct JournalStore {
    pub inner: MemConfigStore,
    pub journal: Journal,
}

impl JournalStore {
    pub fn new(journal: Journal) -> Self {
        Self {
            inner: MemConfigStore::new(),
            journal,
        }
    }

    fn note(&self, entry: String) {
        self.journal.lock().unwrap().push(entry);
    }
}

impl ConfigStore for JournalStore {
    fn load_raw(&self, key: &str) -> Result<Vec<u8>, ConfigError> {
        self.inner.load_raw(key)
    }

    fn save_raw(&self, key: &str, data: &[u8]) -> Result<(), ConfigError> {
        self.note(format!("save {key}"));
        self.inner.save_raw(key, data)
    }

    fn remove_raw(&self, key: &str) -> Result<(), ConfigError> {
        self.note(format!("remove {key}"));
        self.inner.remove_raw(key)
    }

    fn clear(&self) -> Result<(), ConfigError> {
        self.note("clear".into());
        self.inner.clear()
    }
}

// --- Render ---------------------------------------------------------------

#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct Canvas {
    pub base: HashMap<(i32, i32), u32>,
    pub resources: HashMap<(i32, i32), u32>,
    pub sprites: Vec<u32>,
    pub sprite_at: HashMap<SpriteId, (i32, i32)>,
    pub marker: Option<(i32, i32)>,
    pub texts: HashMap<String, String>,
}

impl Canvas {
    pub fn text(&self, slot: TextSlot) -> Option<&str> {
        self.texts.get(&format!("{slot:?}")).map(String::as_str)
    }
}

impl RenderPort for Canvas {
    fn put_tile(&mut self, layer: Layer, x: i32, y: i32, index: u32) {
        match layer {
            Layer::Base => self.base.insert((x, y), index),
            Layer::Resources => self.resources.insert((x, y), index),
        };
    }

    fn remove_tile(&mut self, layer: Layer, x: i32, y: i32) {
        match layer {
            Layer::Base => self.base.remove(&(x, y)),
            Layer::Resources => self.resources.remove(&(x, y)),
        };
    }

    fn add_sprite(&mut self, frame: u32) -> SpriteId {
        self.sprites.push(frame);
        self.sprites.len() as SpriteId
    }

    fn move_sprite(&mut self, sprite: SpriteId, px: i32, py: i32) {
        self.sprite_at.insert(sprite, (px, py));
    }

    fn move_marker(&mut self, px: i32, py: i32) {
        self.marker = Some((px, py));
    }

    fn set_text(&mut self, slot: TextSlot, text: &str) {
        self.texts.insert(format!("{slot:?}"), text.to_string());
    }
}
