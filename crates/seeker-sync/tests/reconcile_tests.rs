// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
#![allow(missing_docs)]

mod common;

use common::{other_root, root, seeker, snapshot, tile, Canvas};
use seeker_app_core::render_port::TextSlot;
use seeker_session_proto::{Action, BiomeKind, EntityKey, GridPos};
use seeker_sync::tilemap::{tile_index, CORN_OVERLAY_INDEX};
use seeker_sync::{MovementTracker, Reconciler};
use tokio::time::Instant;

const BIOMES: [Option<BiomeKind>; 5] = [
    None,
    Some(BiomeKind::Undiscovered),
    Some(BiomeKind::Blocker),
    Some(BiomeKind::Grass),
    Some(BiomeKind::Corn),
];

fn tracker_at(pos: GridPos) -> MovementTracker {
    let mut tracker = MovementTracker::new();
    tracker.confirm(pos, Instant::now());
    tracker
}

#[test]
fn tile_index_is_a_pure_function_of_biome_and_seed() {
    for biome in BIOMES {
        for seed in 0..64 {
            assert_eq!(tile_index(biome, seed), tile_index(biome, seed));
        }
    }
    let mut a = Canvas::default();
    let mut b = Canvas::default();
    let tiles: Vec<_> = (0..12)
        .map(|i| tile(i, 0, BIOMES[(i % 5) as usize], Some(i as u64 * 7)))
        .collect();
    let snap = snapshot(1, tiles, vec![]);
    Reconciler::with_seed(root(), 1).apply(&snap, &mut a, &mut tracker_at(GridPos::new(40, 30)), Instant::now());
    Reconciler::with_seed(root(), 2).apply(&snap, &mut b, &mut tracker_at(GridPos::new(40, 30)), Instant::now());
    assert_eq!(a.base, b.base);
}

#[test]
fn same_snapshot_twice_leaves_identical_local_state() {
    let snap = snapshot(
        5,
        vec![
            tile(1, 1, Some(BiomeKind::Undiscovered), Some(3)),
            tile(2, 1, Some(BiomeKind::Corn), None),
            tile(3, 1, Some(BiomeKind::Grass), Some(8)),
        ],
        vec![seeker(4, 2, 2, root(), 7), seeker(6, 9, 9, other_root(), 1)],
    );
    let mut canvas = Canvas::default();
    let mut movement = MovementTracker::new();
    let mut rec = Reconciler::with_seed(root(), 3);

    let first = rec.apply(&snap, &mut canvas, &mut movement, Instant::now());
    let entities = rec.entities().clone();
    let grid = rec.grid().clone();
    let drawn = canvas.clone();

    let second = rec.apply(&snap, &mut canvas, &mut movement, Instant::now());

    assert_eq!(first.len(), 1);
    assert!(second.is_empty());
    assert_eq!(rec.entities(), &entities);
    assert_eq!(rec.grid(), &grid);
    assert_eq!(canvas, drawn);
}

#[test]
fn a_seed_is_revealed_once_across_snapshots() {
    let mut rec = Reconciler::with_seed(root(), 9);
    let mut canvas = Canvas::default();
    let mut movement = tracker_at(GridPos::new(5, 5));
    let hidden = |block| {
        snapshot(
            block,
            vec![
                tile(6, 6, Some(BiomeKind::Undiscovered), Some(11)),
                tile(7, 7, Some(BiomeKind::Undiscovered), Some(11)),
            ],
            vec![],
        )
    };

    let first = rec.apply(&hidden(1), &mut canvas, &mut movement, Instant::now());
    let second = rec.apply(&hidden(2), &mut canvas, &mut movement, Instant::now());

    assert_eq!(first.len(), 1);
    assert!(matches!(first[0], Action::RevealSeed { seed_block: 11, .. }));
    assert!(second.is_empty());
    assert!(rec.is_revealing(EntityKey::new(11)));
    assert_eq!(rec.revealing_len(), 1);
}

#[test]
fn reveal_window_is_strictly_less_than_four() {
    let mut rec = Reconciler::with_seed(root(), 1);
    let mut movement = tracker_at(GridPos::new(10, 10));
    let snap = snapshot(
        1,
        vec![
            tile(14, 10, Some(BiomeKind::Undiscovered), Some(1)),
            tile(10, 6, Some(BiomeKind::Undiscovered), Some(2)),
            tile(13, 10, Some(BiomeKind::Undiscovered), Some(3)),
            tile(7, 13, Some(BiomeKind::Undiscovered), Some(4)),
        ],
        vec![],
    );

    let reveals = rec.apply(&snap, &mut Canvas::default(), &mut movement, Instant::now());

    let seeds: Vec<u32> = reveals
        .iter()
        .filter_map(|a| match a {
            Action::RevealSeed { seed_block, .. } => Some(*seed_block),
            _ => None,
        })
        .collect();
    assert_eq!(seeds, vec![3, 4]);
    assert!(!rec.is_revealing(EntityKey::new(1)));
}

#[test]
fn only_hidden_seeded_tiles_trigger_reveals() {
    let mut rec = Reconciler::with_seed(root(), 1);
    let snap = snapshot(
        1,
        vec![
            tile(1, 0, Some(BiomeKind::Grass), Some(1)),
            tile(2, 0, None, Some(2)),
            tile(3, 0, Some(BiomeKind::Undiscovered), None),
        ],
        vec![],
    );
    let reveals = rec.apply(&snap, &mut Canvas::default(), &mut MovementTracker::new(), Instant::now());
    assert!(reveals.is_empty());
}

#[test]
fn tiles_and_overlay_follow_the_latest_snapshot() {
    let mut rec = Reconciler::with_seed(root(), 1);
    let mut canvas = Canvas::default();
    let mut movement = MovementTracker::new();

    rec.apply(
        &snapshot(1, vec![tile(4, 4, Some(BiomeKind::Corn), None)], vec![]),
        &mut canvas,
        &mut movement,
        Instant::now(),
    );
    assert_eq!(canvas.base.get(&(4, 4)), Some(&5));
    assert_eq!(canvas.resources.get(&(4, 4)), Some(&CORN_OVERLAY_INDEX));

    rec.apply(
        &snapshot(2, vec![tile(4, 4, Some(BiomeKind::Blocker), None)], vec![]),
        &mut canvas,
        &mut movement,
        Instant::now(),
    );
    assert_eq!(canvas.base.get(&(4, 4)), Some(&64));
    assert_eq!(canvas.resources.get(&(4, 4)), None);
    assert!(!rec.grid().is_passable(GridPos::new(4, 4)));
}

#[test]
fn seekers_get_one_sprite_each_and_only_the_player_drives_the_hud() {
    let mut rec = Reconciler::with_seed(root(), 1);
    let mut canvas = Canvas::default();
    let mut movement = MovementTracker::new();

    rec.apply(
        &snapshot(1, vec![], vec![seeker(20, 3, 4, root(), 40), seeker(21, 8, 8, other_root(), 90)]),
        &mut canvas,
        &mut movement,
        Instant::now(),
    );
    rec.apply(
        &snapshot(2, vec![], vec![seeker(20, 3, 5, root(), 41), seeker(21, 8, 9, other_root(), 91)]),
        &mut canvas,
        &mut movement,
        Instant::now(),
    );

    assert_eq!(canvas.sprites, vec![20 % 14, 21 % 14]);
    assert_eq!(rec.entities().len(), 2);
    let player = rec.entities().get(EntityKey::new(20)).unwrap();
    assert_eq!(canvas.sprite_at.get(&player.sprite), Some(&(3 * 16 + 8, 5 * 16 + 8)));
    assert_eq!(canvas.text(TextSlot::Balance), Some("CORN: 41"));
    assert_eq!(movement.anchor(), Some(GridPos::new(3, 5)));
    assert_eq!(movement.cursor(), GridPos::new(3, 5));
    assert_eq!(canvas.marker, Some((3 * 16, 5 * 16)));
}

#[test]
fn seeker_far_off_the_map_is_placed_without_overflow() {
    let snap = snapshot(2, vec![], vec![seeker(1, 0x1000_0000, -3, root(), 0)]);
    let mut canvas = Canvas::default();
    let mut movement = MovementTracker::new();
    Reconciler::with_seed(root(), 5).apply(&snap, &mut canvas, &mut movement, Instant::now());

    assert_eq!(canvas.sprite_at.get(&1), Some(&(i32::MAX, -40)));
    assert_eq!(movement.cursor(), GridPos::new(0x1000_0000, -3));
}
