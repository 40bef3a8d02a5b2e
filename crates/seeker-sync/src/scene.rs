// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! The game scene: one cooperative loop driving reconciliation, input and the
//! cursor reassert tick.
//!
//! All state is owned by the scene and touched from a single task. Network
//! completions other than state pushes (dispatch acknowledgements) run on
//! their own tasks and never feed back into scene state.

use std::future::{pending, Future};
use std::sync::Arc;

use rand::Rng;
use seeker_app_core::render_port::{RenderPort, TextSlot};
use seeker_session_client::{GameTransport, StateEvent, StateSubscription};
use seeker_session_proto::{Action, WorldSnapshot};
use tokio::sync::mpsc;
use tokio::time::{interval, Instant, MissedTickBehavior};
use tracing::{debug, info, warn};

use crate::dispatcher::{DispatchHandle, Dispatcher};
use crate::error::ClientError;
use crate::identity::Identity;
use crate::input::{Button, InputEvent};
use crate::movement::{MoveOutcome, MovementTracker, REASSERT_INTERVAL};
use crate::reconciler::Reconciler;
use crate::tilemap::cell_origin;

/// Text shown in the help slot.
pub const HELP_TEXT: &str = "use WASD to move";
/// Spawn columns are drawn from `0..SPAWN_COLUMNS`.
pub const SPAWN_COLUMNS: u8 = 32;

/// What an input led to.
#[derive(Debug)]
pub enum InputOutcome {
    /// An action was sent.
    Dispatched(DispatchHandle),
    /// Nothing to do (logged).
    Ignored,
    /// The player asked to clear the session.
    SignOut,
}

/// Why [`GameScene::run`] returned.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SceneExit {
    /// The shutdown future resolved.
    Shutdown,
    /// The player pressed CLEAR SESSION; the caller should sign out.
    SignedOut,
    /// The input source went away.
    InputClosed,
}

/// Controller state for one game.
pub struct GameScene<T, R> {
    transport: Arc<T>,
    dispatcher: Dispatcher<T>,
    reconciler: Reconciler,
    movement: MovementTracker,
    render: R,
    game_id: String,
    subscription: Option<StateSubscription>,
}

impl<T: GameTransport, R: RenderPort> GameScene<T, R> {
    /// Scene for `game_id` acting as `identity`.
    pub fn new(transport: Arc<T>, identity: &Identity, game_id: impl Into<String>, render: R) -> Self {
        let game_id = game_id.into();
        let dispatcher = Dispatcher::new(
            Arc::clone(&transport),
            Arc::clone(identity.session_key()),
            game_id.clone(),
        );
        Self {
            transport,
            dispatcher,
            reconciler: Reconciler::new(identity.root_address().clone()),
            movement: MovementTracker::new(),
            render,
            game_id,
            subscription: None,
        }
    }

    /// Use reproducible reveal entropy.
    #[must_use]
    pub fn with_reveal_seed(mut self, seed: u64) -> Self {
        self.reconciler = Reconciler::with_seed(self.reconciler.root().clone(), seed);
        self
    }

    /// Render surface.
    pub fn render(&self) -> &R {
        &self.render
    }

    /// Local world view.
    pub fn reconciler(&self) -> &Reconciler {
        &self.reconciler
    }

    /// Cursor state.
    pub fn movement(&self) -> &MovementTracker {
        &self.movement
    }

    /// Open the push subscription, pull the initial state and draw the HUD.
    pub async fn start(&mut self) -> Result<(), ClientError> {
        self.render.set_text(TextSlot::Help, HELP_TEXT);
        match self.transport.subscribe_state(&self.game_id).await {
            Ok(subscription) => self.subscription = Some(subscription),
            Err(err) => warn!(?err, "state subscription failed; running on pulls only"),
        }
        match self.transport.fetch_state(&self.game_id).await {
            Ok(Some(snapshot)) => {
                self.apply_snapshot(&snapshot, Instant::now());
            }
            Ok(None) => debug!(game = %self.game_id, "no state yet"),
            Err(err) => match ClientError::from(err) {
                err @ ClientError::UnknownBiome(_) => return Err(err),
                err => warn!(?err, "initial fetch failed; waiting for pushes"),
            },
        }
        self.place_marker();
        Ok(())
    }

    fn place_marker(&mut self) {
        let (px, py) = cell_origin(self.movement.cursor());
        self.render.move_marker(px, py);
    }

    /// Fold a snapshot into local state and dispatch the reveals it triggers.
    pub fn apply_snapshot(&mut self, snapshot: &WorldSnapshot, now: Instant) -> Vec<DispatchHandle> {
        self.reconciler
            .apply(snapshot, &mut self.render, &mut self.movement, now)
            .into_iter()
            .map(|action| self.dispatcher.dispatch(action))
            .collect()
    }

    /// Handle one subscription event. Only an unknown biome is fatal.
    pub fn on_state_event(
        &mut self,
        event: StateEvent,
        now: Instant,
    ) -> Result<Vec<DispatchHandle>, ClientError> {
        match event {
            Ok(Some(snapshot)) => Ok(self.apply_snapshot(&snapshot, now)),
            Ok(None) => Ok(Vec::new()),
            Err(err) => match ClientError::from(err) {
                err @ ClientError::UnknownBiome(_) => Err(err),
                err => {
                    warn!(?err, "state subscription error");
                    Ok(Vec::new())
                }
            },
        }
    }

    /// Handle one input event.
    pub fn handle_input(&mut self, event: InputEvent, now: Instant) -> InputOutcome {
        match event {
            InputEvent::Direction(direction) => {
                let seeker_id = self
                    .reconciler
                    .player_seeker()
                    .and_then(|key| u32::try_from(key.value()).ok());
                let outcome =
                    self.movement
                        .request_move(direction, seeker_id, self.reconciler.grid(), now);
                if let Some(action) = outcome.action() {
                    self.place_marker();
                    return InputOutcome::Dispatched(self.dispatcher.dispatch(action));
                }
                match outcome {
                    MoveOutcome::Blocked { target } => info!(%target, "bumped into a wall"),
                    _ => info!("no seeker"),
                }
                InputOutcome::Ignored
            }
            InputEvent::Button(Button::ResetMap) => {
                InputOutcome::Dispatched(self.dispatcher.dispatch(Action::ResetMap))
            }
            InputEvent::Button(Button::SpawnSeeker) => {
                if self.reconciler.player_seeker().is_some() {
                    info!("already own a seeker");
                    return InputOutcome::Ignored;
                }
                let known = self.reconciler.entities().len() + 2;
                let action = Action::SpawnSeeker {
                    seeker_id: u32::try_from(known).unwrap_or(u32::MAX),
                    x: rand::thread_rng().gen_range(0..SPAWN_COLUMNS),
                    y: 0,
                    strength: 1,
                };
                InputOutcome::Dispatched(self.dispatcher.dispatch(action))
            }
            InputEvent::Button(Button::ClearSession) => InputOutcome::SignOut,
        }
    }

    /// Reassert tick: snap the cursor back to the anchor after the grace window.
    pub fn tick(&mut self, now: Instant) {
        if self.movement.reassert(now) {
            self.place_marker();
        }
    }

    /// Drive the scene until shutdown, sign-out, end of input or a fatal error.
    ///
    /// The reassert tick is owned by this loop and stops with it.
    pub async fn run(
        mut self,
        mut inputs: mpsc::Receiver<InputEvent>,
        shutdown: impl Future<Output = ()>,
    ) -> Result<SceneExit, ClientError> {
        tokio::pin!(shutdown);
        let mut subscription = self.subscription.take();
        let mut ticker = interval(REASSERT_INTERVAL);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        loop {
            tokio::select! {
                () = &mut shutdown => return Ok(SceneExit::Shutdown),
                _ = ticker.tick() => self.tick(Instant::now()),
                input = inputs.recv() => match input {
                    Some(event) => {
                        if let InputOutcome::SignOut = self.handle_input(event, Instant::now()) {
                            return Ok(SceneExit::SignedOut);
                        }
                    }
                    None => return Ok(SceneExit::InputClosed),
                },
                event = next_event(&mut subscription) => match event {
                    Some(event) => {
                        self.on_state_event(event, Instant::now())?;
                    }
                    None => {
                        warn!(err = %ClientError::SubscriptionClosed, "continuing on last known state");
                        subscription = None;
                    }
                },
            }
        }
    }
}

async fn next_event(subscription: &mut Option<StateSubscription>) -> Option<StateEvent> {
    match subscription {
        Some(rx) => rx.recv().await,
        None => pending().await,
    }
}
