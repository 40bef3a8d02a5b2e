// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! World state as served by the hub.
//!
//! The hub answers with a loosely typed, graph-shaped record ([`StateGraph`]):
//! numbers and keys as text, nested `{ key }` / `{ coords }` / `{ address }`
//! references, optional values everywhere. [`WorldSnapshot::try_from`] validates
//! that record once, at the transport boundary, into the typed shape the client
//! works with. Every snapshot is complete; nothing here is a delta.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::ids::{parse_coord, parse_uint, Address, EntityKey, GridPos, IdError};

/// Terrain of a revealed (or still hidden) tile.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BiomeKind {
    /// Hidden behind fog; may carry a seed that can be revealed.
    Undiscovered,
    /// Impassable terrain.
    Blocker,
    /// Open ground.
    Grass,
    /// Harvestable corn.
    Corn,
}

impl BiomeKind {
    /// Wire code of this biome.
    pub const fn code(self) -> i64 {
        match self {
            BiomeKind::Undiscovered => 0,
            BiomeKind::Blocker => 1,
            BiomeKind::Grass => 2,
            BiomeKind::Corn => 3,
        }
    }
}

impl TryFrom<i64> for BiomeKind {
    type Error = SnapshotError;

    fn try_from(code: i64) -> Result<Self, Self::Error> {
        match code {
            0 => Ok(BiomeKind::Undiscovered),
            1 => Ok(BiomeKind::Blocker),
            2 => Ok(BiomeKind::Grass),
            3 => Ok(BiomeKind::Corn),
            other => Err(SnapshotError::UnknownBiome(other)),
        }
    }
}

/// Validation failure while converting a [`StateGraph`].
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum SnapshotError {
    /// Biome code outside the known set; the hub speaks a newer protocol.
    #[error("unknown biome kind={0}")]
    UnknownBiome(i64),
    /// A reference the client depends on was absent.
    #[error("missing {0}")]
    Missing(&'static str),
    /// Coordinates did not have exactly two components.
    #[error("expected 2 coordinates, got {0}")]
    Arity(usize),
    /// Coordinate parsed but lies outside the `i16` range the hub produces.
    #[error("coordinate {0} out of range")]
    CoordRange(i32),
    /// Key, coordinate or address text failed to parse.
    #[error(transparent)]
    Id(#[from] IdError),
}

/// One map cell.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TileView {
    /// Grid position of the tile.
    pub coords: GridPos,
    /// `None` while the hub has no biome for the tile at all.
    pub biome: Option<BiomeKind>,
    /// Seed providing entropy to this tile, if any.
    pub seed: Option<EntityKey>,
}

impl TileView {
    /// Numeric seed value used for visual variation (0 without a seed).
    pub fn seed_value(&self) -> u64 {
        self.seed.map_or(0, EntityKey::value)
    }

    /// Hidden tile whose seed can be revealed.
    pub fn is_revealable(&self) -> bool {
        self.seed.is_some() && self.biome == Some(BiomeKind::Undiscovered)
    }
}

/// One player-controlled unit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SeekerView {
    /// Server-issued key.
    pub key: EntityKey,
    /// Current grid position.
    pub position: GridPos,
    /// Root address of the owning player.
    pub owner: Address,
    /// Harvested corn.
    pub corn_balance: i64,
}

/// Complete authoritative world state at one block.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct WorldSnapshot {
    /// Block height the state was read at.
    pub block: u64,
    /// Every known tile.
    pub tiles: Vec<TileView>,
    /// Every seeker.
    pub seekers: Vec<SeekerView>,
}

/// `{ key }` reference to another node.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeyRef {
    /// Referenced node key.
    pub key: String,
}

/// `{ coords }` reference to a tile node.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CoordsRef {
    /// Tile coordinates as text.
    pub coords: Vec<String>,
}

/// `{ address }` reference to a player node.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AddressRef {
    /// Player address as text.
    pub address: String,
}

/// Tile node as served.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawTile {
    /// Coordinates as text.
    pub coords: Vec<String>,
    /// Biome code, if the tile has a biome edge.
    #[serde(default)]
    pub biome: Option<i64>,
    /// Seed that provides entropy to the tile.
    #[serde(default)]
    pub seed: Option<KeyRef>,
}

/// Seeker node as served.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawSeeker {
    /// Seeker key.
    pub key: String,
    /// Location edge.
    #[serde(default)]
    pub position: Option<CoordsRef>,
    /// Owner edge.
    #[serde(default)]
    pub player: Option<AddressRef>,
    /// Balance value; missing means zero.
    #[serde(default)]
    pub corn_balance: Option<i64>,
}

/// Graph-shaped state record exactly as the hub serves it.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct StateGraph {
    /// Block height.
    #[serde(default)]
    pub block: u64,
    /// Tile nodes.
    #[serde(default)]
    pub tiles: Vec<RawTile>,
    /// Seeker nodes.
    #[serde(default)]
    pub seekers: Vec<RawSeeker>,
}

fn grid_pos(coords: &[String]) -> Result<GridPos, SnapshotError> {
    match coords {
        [x, y] => Ok(GridPos::new(bounded_coord(x)?, bounded_coord(y)?)),
        other => Err(SnapshotError::Arity(other.len())),
    }
}

fn bounded_coord(s: &str) -> Result<i32, SnapshotError> {
    let v = parse_coord(s)?;
    i16::try_from(v)
        .map(i32::from)
        .map_err(|_| SnapshotError::CoordRange(v))
}

impl TryFrom<&RawTile> for TileView {
    type Error = SnapshotError;

    fn try_from(raw: &RawTile) -> Result<Self, Self::Error> {
        Ok(TileView {
            coords: grid_pos(&raw.coords)?,
            biome: raw.biome.map(BiomeKind::try_from).transpose()?,
            seed: raw
                .seed
                .as_ref()
                .map(|s| parse_uint(&s.key).map(EntityKey::new))
                .transpose()?,
        })
    }
}

impl TryFrom<&RawSeeker> for SeekerView {
    type Error = SnapshotError;

    fn try_from(raw: &RawSeeker) -> Result<Self, Self::Error> {
        let position = raw
            .position
            .as_ref()
            .ok_or(SnapshotError::Missing("seeker position"))?;
        let player = raw
            .player
            .as_ref()
            .ok_or(SnapshotError::Missing("seeker owner"))?;
        Ok(SeekerView {
            key: raw.key.parse()?,
            position: grid_pos(&position.coords)?,
            owner: player.address.parse()?,
            corn_balance: raw.corn_balance.unwrap_or(0),
        })
    }
}

impl TryFrom<&StateGraph> for WorldSnapshot {
    type Error = SnapshotError;

    fn try_from(raw: &StateGraph) -> Result<Self, Self::Error> {
        Ok(WorldSnapshot {
            block: raw.block,
            tiles: raw
                .tiles
                .iter()
                .map(TileView::try_from)
                .collect::<Result<_, _>>()?,
            seekers: raw
                .seekers
                .iter()
                .map(SeekerView::try_from)
                .collect::<Result<_, _>>()?,
        })
    }
}

impl From<&WorldSnapshot> for StateGraph {
    fn from(snap: &WorldSnapshot) -> Self {
        StateGraph {
            block: snap.block,
            tiles: snap
                .tiles
                .iter()
                .map(|t| RawTile {
                    coords: vec![t.coords.x.to_string(), t.coords.y.to_string()],
                    biome: t.biome.map(BiomeKind::code),
                    seed: t.seed.map(|k| KeyRef { key: k.to_string() }),
                })
                .collect(),
            seekers: snap
                .seekers
                .iter()
                .map(|s| RawSeeker {
                    key: s.key.to_string(),
                    position: Some(CoordsRef {
                        coords: vec![s.position.x.to_string(), s.position.y.to_string()],
                    }),
                    player: Some(AddressRef {
                        address: s.owner.to_string(),
                    }),
                    corn_balance: Some(s.corn_balance),
                })
                .collect(),
        }
    }
}
