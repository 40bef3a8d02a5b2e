// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Render surface that reports draw calls through `tracing`.

use seeker_app_core::render_port::{Layer, RenderPort, SpriteId, TextSlot};
use tracing::{debug, info, trace};

#[derive(Debug, Default)]
pub struct LogRenderPort {
    next_sprite: SpriteId,
}

impl RenderPort for LogRenderPort {
    fn put_tile(&mut self, layer: Layer, x: i32, y: i32, index: u32) {
        trace!(?layer, x, y, index, "tile");
    }

    fn remove_tile(&mut self, layer: Layer, x: i32, y: i32) {
        trace!(?layer, x, y, "tile cleared");
    }

    fn add_sprite(&mut self, frame: u32) -> SpriteId {
        self.next_sprite += 1;
        debug!(sprite = self.next_sprite, frame, "sprite added");
        self.next_sprite
    }

    fn move_sprite(&mut self, sprite: SpriteId, px: i32, py: i32) {
        debug!(sprite, px, py, "sprite moved");
    }

    fn move_marker(&mut self, px: i32, py: i32) {
        info!(px, py, "cursor");
    }

    fn set_text(&mut self, slot: TextSlot, text: &str) {
        info!(?slot, "{text}");
    }
}
