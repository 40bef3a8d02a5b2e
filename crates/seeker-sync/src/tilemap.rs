// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Tile lookup policy and the base-layer passability grid.

use seeker_session_proto::{BiomeKind, GridPos};

/// Cell edge in pixels.
pub const TILE_PX: i32 = 16;
/// Map width in cells.
pub const MAP_WIDTH: i32 = 48;
/// Map height in cells.
pub const MAP_HEIGHT: i32 = 32;
/// Index every base cell starts with.
pub const FILL_INDEX: u32 = 7;
/// Tile shown for a tile the hub has no biome for.
pub const UNKNOWN_INDEX: u32 = 1;
/// Tile shown for fog.
pub const UNDISCOVERED_INDEX: u32 = 6;
/// Tile shown for impassable terrain.
pub const BLOCKER_INDEX: u32 = 64;
/// Grass variants, picked by seed value.
pub const GRASS_INDICES: [u32; 3] = [5, 62, 66];
/// Tile shown for corn.
pub const CORN_INDEX: u32 = 5;
/// Resource overlay drawn on corn tiles.
pub const CORN_OVERLAY_INDEX: u32 = 15;
/// Base indices a seeker cannot walk onto. 0 stands for "no tile".
pub const BLOCKER_SET: [u32; 3] = [UNDISCOVERED_INDEX, BLOCKER_INDEX, 0];
/// Distinct seeker sprite frames.
pub const SPRITE_FRAMES: u64 = 14;

/// Base-layer index for a tile. Pure in `(biome, seed_value)`.
pub fn tile_index(biome: Option<BiomeKind>, seed_value: u64) -> u32 {
    match biome {
        None => UNKNOWN_INDEX,
        Some(BiomeKind::Undiscovered) => UNDISCOVERED_INDEX,
        Some(BiomeKind::Blocker) => BLOCKER_INDEX,
        #[allow(clippy::cast_possible_truncation)]
        Some(BiomeKind::Grass) => GRASS_INDICES[(seed_value % 3) as usize],
        Some(BiomeKind::Corn) => CORN_INDEX,
    }
}

/// Sprite frame for a seeker key.
pub fn sprite_frame(key: u64) -> u32 {
    #[allow(clippy::cast_possible_truncation)]
    let frame = (key % SPRITE_FRAMES) as u32;
    frame
}

/// Pixel centre of a grid cell.
pub fn cell_centre(pos: GridPos) -> (i32, i32) {
    let (px, py) = cell_origin(pos);
    (px.saturating_add(TILE_PX / 2), py.saturating_add(TILE_PX / 2))
}

/// Pixel top-left corner of a grid cell. Saturates far off the map.
pub fn cell_origin(pos: GridPos) -> (i32, i32) {
    (pos.x.saturating_mul(TILE_PX), pos.y.saturating_mul(TILE_PX))
}

/// Last-known base-layer indices, consulted for passability.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TileGrid {
    cells: Vec<u32>,
}

impl Default for TileGrid {
    fn default() -> Self {
        Self::new()
    }
}

impl TileGrid {
    /// Map filled with [`FILL_INDEX`].
    pub fn new() -> Self {
        #[allow(clippy::cast_sign_loss)]
        let len = (MAP_WIDTH * MAP_HEIGHT) as usize;
        Self {
            cells: vec![FILL_INDEX; len],
        }
    }

    fn slot(pos: GridPos) -> Option<usize> {
        if !(0..MAP_WIDTH).contains(&pos.x) || !(0..MAP_HEIGHT).contains(&pos.y) {
            return None;
        }
        #[allow(clippy::cast_sign_loss)]
        let slot = (pos.y * MAP_WIDTH + pos.x) as usize;
        Some(slot)
    }

    /// Index at `pos`; `None` off the map.
    pub fn index_at(&self, pos: GridPos) -> Option<u32> {
        Self::slot(pos).map(|i| self.cells[i])
    }

    /// Record `index` at `pos`. Returns false off the map.
    pub fn set(&mut self, pos: GridPos, index: u32) -> bool {
        match Self::slot(pos) {
            Some(i) => {
                self.cells[i] = index;
                true
            }
            None => false,
        }
    }

    /// True when a seeker may step onto `pos`.
    pub fn is_passable(&self, pos: GridPos) -> bool {
        self.index_at(pos)
            .is_some_and(|index| !BLOCKER_SET.contains(&index))
    }
}
