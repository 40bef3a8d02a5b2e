// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! State Reconciler: folds complete world snapshots into render state.
//!
//! Each snapshot is authoritative and complete. Tiles are drawn and recorded
//! in the passability grid first, then seekers are placed. Hidden seeded
//! tiles near the cursor produce one `REVEAL_SEED` each for the lifetime of
//! the reconciler; a reveal is never retried.
//!
//! Reveal entropy is chosen by the client. The hub has to treat it as
//! untrusted input; nothing here makes it unpredictable to the player.

use std::collections::HashSet;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use seeker_app_core::render_port::{Layer, RenderPort, TextSlot};
use seeker_session_proto::{Action, Address, BiomeKind, EntityKey, SeekerView, WorldSnapshot};
use tokio::time::Instant;
use tracing::{debug, warn};

use crate::entities::{EntityRow, EntityTable};
use crate::movement::MovementTracker;
use crate::tilemap::{
    cell_centre, cell_origin, sprite_frame, tile_index, TileGrid, CORN_OVERLAY_INDEX,
};

/// Reveals are requested for tiles strictly closer than this to the cursor.
pub const REVEAL_RADIUS: u32 = 4;
/// Entropy is drawn from `0..ENTROPY_RANGE`.
pub const ENTROPY_RANGE: u32 = 1000;

/// Local view of the world built from snapshots.
#[derive(Debug)]
pub struct Reconciler {
    root: Address,
    entities: EntityTable,
    grid: TileGrid,
    revealing: HashSet<EntityKey>,
    rng: StdRng,
}

impl Reconciler {
    /// Reconciler for the player identified by `root`.
    pub fn new(root: Address) -> Self {
        Self::with_rng(root, StdRng::from_entropy())
    }

    /// Reconciler with reproducible reveal entropy.
    pub fn with_seed(root: Address, seed: u64) -> Self {
        Self::with_rng(root, StdRng::seed_from_u64(seed))
    }

    fn with_rng(root: Address, rng: StdRng) -> Self {
        Self {
            root,
            entities: EntityTable::new(),
            grid: TileGrid::new(),
            revealing: HashSet::new(),
            rng,
        }
    }

    /// Root address of the local player.
    pub fn root(&self) -> &Address {
        &self.root
    }

    /// Known entities.
    pub fn entities(&self) -> &EntityTable {
        &self.entities
    }

    /// Base-layer indices from the last snapshot.
    pub fn grid(&self) -> &TileGrid {
        &self.grid
    }

    /// True once a reveal was requested for `seed`.
    pub fn is_revealing(&self, seed: EntityKey) -> bool {
        self.revealing.contains(&seed)
    }

    /// Number of seeds a reveal was requested for.
    pub fn revealing_len(&self) -> usize {
        self.revealing.len()
    }

    /// The local player's seeker, if one has been seen.
    pub fn player_seeker(&self) -> Option<EntityKey> {
        self.entities.player_seeker(&self.root)
    }

    /// Apply one snapshot. Returns the reveal actions to dispatch.
    pub fn apply(
        &mut self,
        snapshot: &WorldSnapshot,
        render: &mut dyn RenderPort,
        movement: &mut MovementTracker,
        now: Instant,
    ) -> Vec<Action> {
        let mut reveals = Vec::new();
        let cursor = movement.cursor();
        for tile in &snapshot.tiles {
            let (x, y) = (tile.coords.x, tile.coords.y);
            let index = tile_index(tile.biome, tile.seed_value());
            render.put_tile(Layer::Base, x, y, index);
            self.grid.set(tile.coords, index);
            if tile.biome == Some(BiomeKind::Corn) {
                render.put_tile(Layer::Resources, x, y, CORN_OVERLAY_INDEX);
            } else {
                render.remove_tile(Layer::Resources, x, y);
            }

            let Some(seed) = tile.seed else { continue };
            if !tile.is_revealable()
                || tile.coords.chebyshev(cursor) >= REVEAL_RADIUS
                || !self.revealing.insert(seed)
            {
                continue;
            }
            match u32::try_from(seed.value()) {
                Ok(seed_block) => reveals.push(Action::RevealSeed {
                    seed_block,
                    entropy: self.rng.gen_range(0..ENTROPY_RANGE),
                }),
                Err(_) => warn!(%seed, "seed key does not fit a reveal; skipped"),
            }
        }

        let mut player: Option<&SeekerView> = None;
        for seeker in &snapshot.seekers {
            let row = self.entities.get_or_insert_with(seeker.key, || EntityRow {
                sprite: render.add_sprite(sprite_frame(seeker.key.value())),
                owner: seeker.owner.clone(),
            });
            let (px, py) = cell_centre(seeker.position);
            render.move_sprite(row.sprite, px, py);
            if seeker.owner == self.root && player.map_or(true, |p| seeker.key < p.key) {
                player = Some(seeker);
            }
        }
        if let Some(seeker) = player {
            render.set_text(TextSlot::Balance, &format!("CORN: {}", seeker.corn_balance));
            if movement.confirm(seeker.position, now) {
                let (px, py) = cell_origin(movement.cursor());
                render.move_marker(px, py);
            }
        }

        debug!(
            block = snapshot.block,
            tiles = snapshot.tiles.len(),
            seekers = snapshot.seekers.len(),
            reveals = reveals.len(),
            "snapshot applied"
        );
        reveals
    }
}
