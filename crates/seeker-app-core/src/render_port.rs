// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Port trait for the tilemap/sprite surface the client draws on, so the sync
//! controller never depends on a specific game engine or terminal.
//!
//! Tile operations address grid cells; sprite and marker operations address
//! pixel positions (top-left origin).

/// Tilemap layer addressed by tile operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Layer {
    /// Biome tiles; also the layer consulted for passability.
    Base,
    /// Resource overlay drawn above the base layer.
    Resources,
}

/// Handle of a sprite created through [`RenderPort::add_sprite`].
pub type SpriteId = u64;

/// Text areas the client writes to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TextSlot {
    /// Player balance readout.
    Balance,
    /// Static controls hint.
    Help,
}

/// Drawing surface; implementations are expected to be cheap and infallible.
pub trait RenderPort {
    /// Place tile `index` at grid cell `(x, y)` on `layer`.
    fn put_tile(&mut self, layer: Layer, x: i32, y: i32, index: u32);
    /// Clear grid cell `(x, y)` on `layer`.
    fn remove_tile(&mut self, layer: Layer, x: i32, y: i32);
    /// Create a sprite showing `frame` and return its handle.
    fn add_sprite(&mut self, frame: u32) -> SpriteId;
    /// Move a sprite so its centre sits at pixel `(px, py)`.
    fn move_sprite(&mut self, sprite: SpriteId, px: i32, py: i32);
    /// Move the selection marker so its top-left corner sits at pixel `(px, py)`.
    fn move_marker(&mut self, px: i32, py: i32);
    /// Replace the text shown in `slot`.
    fn set_text(&mut self, slot: TextSlot, text: &str);
}
