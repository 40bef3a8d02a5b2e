// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Local entity table: one row per server key, created on first sighting.

use std::collections::BTreeMap;

use seeker_app_core::render_port::SpriteId;
use seeker_session_proto::{Address, EntityKey};

/// Render state kept for one seeker.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EntityRow {
    /// Sprite drawing the seeker.
    pub sprite: SpriteId,
    /// Owner recorded when the seeker was first seen.
    pub owner: Address,
}

/// Rows keyed by [`EntityKey`]. Rows are never removed during a session.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EntityTable {
    rows: BTreeMap<EntityKey, EntityRow>,
}

impl EntityTable {
    /// Empty table.
    pub fn new() -> Self {
        Self::default()
    }

    /// Row for `key`, inserting the one built by `create` on first sighting.
    pub fn get_or_insert_with(
        &mut self,
        key: EntityKey,
        create: impl FnOnce() -> EntityRow,
    ) -> &EntityRow {
        self.rows.entry(key).or_insert_with(create)
    }

    /// Row for `key`.
    pub fn get(&self, key: EntityKey) -> Option<&EntityRow> {
        self.rows.get(&key)
    }

    /// Number of known entities.
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// True before any seeker has been seen.
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// The player's seeker: the lowest key owned by `root`.
    pub fn player_seeker(&self, root: &Address) -> Option<EntityKey> {
        self.rows
            .iter()
            .find(|(_, row)| &row.owner == root)
            .map(|(key, _)| *key)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn addr(byte: u8) -> Address {
        Address::from_bytes([byte; 20])
    }

    #[test]
    fn second_sighting_keeps_the_first_row() {
        let mut table = EntityTable::new();
        table.get_or_insert_with(EntityKey::new(4), || EntityRow {
            sprite: 1,
            owner: addr(1),
        });
        let row = table.get_or_insert_with(EntityKey::new(4), || EntityRow {
            sprite: 2,
            owner: addr(2),
        });
        assert_eq!(row.sprite, 1);
        assert_eq!(table.len(), 1);
    }

    #[test]
    fn player_seeker_is_lowest_owned_key() {
        let mut table = EntityTable::new();
        for (key, owner) in [(9, 1), (5, 2), (7, 1)] {
            table.get_or_insert_with(EntityKey::new(key), || EntityRow {
                sprite: key,
                owner: addr(owner),
            });
        }
        assert_eq!(table.player_seeker(&addr(1)), Some(EntityKey::new(7)));
        assert_eq!(table.player_seeker(&addr(3)), None);
    }
}
