// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Player actions and their canonical byte encoding.
//!
//! Layout: `SELECTOR(4) || WORD(32)*`, one big-endian, left-padded word per
//! positional argument. The selector is the first four bytes of the blake3
//! hash of the action signature text (e.g. `MOVE_SEEKER(uint32,uint8)`).
//! The hub treats the payload as opaque bytes signed by the session key.

use std::fmt;

use crate::Hash32;

/// Width of one encoded argument word.
pub const WORD_BYTES: usize = 32;

/// Compass direction of a one-cell move. The hub's NORTH increases `y`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Direction {
    /// Code 0, `(0, +1)`.
    North,
    /// Code 1, `(+1, +1)`.
    NorthEast,
    /// Code 2, `(+1, 0)`.
    East,
    /// Code 3, `(+1, -1)`.
    SouthEast,
    /// Code 4, `(0, -1)`.
    South,
    /// Code 5, `(-1, -1)`.
    SouthWest,
    /// Code 6, `(-1, 0)`.
    West,
    /// Code 7, `(-1, +1)`.
    NorthWest,
}

impl Direction {
    /// All directions in code order.
    pub const ALL: [Direction; 8] = [
        Direction::North,
        Direction::NorthEast,
        Direction::East,
        Direction::SouthEast,
        Direction::South,
        Direction::SouthWest,
        Direction::West,
        Direction::NorthWest,
    ];

    /// Wire code (0..=7).
    pub const fn code(self) -> u8 {
        match self {
            Direction::North => 0,
            Direction::NorthEast => 1,
            Direction::East => 2,
            Direction::SouthEast => 3,
            Direction::South => 4,
            Direction::SouthWest => 5,
            Direction::West => 6,
            Direction::NorthWest => 7,
        }
    }

    /// Direction for a wire code.
    pub fn from_code(code: u8) -> Option<Self> {
        Self::ALL.get(usize::from(code)).copied()
    }

    /// Grid delta `(dx, dy)` of one step.
    pub const fn delta(self) -> (i32, i32) {
        match self {
            Direction::North => (0, 1),
            Direction::NorthEast => (1, 1),
            Direction::East => (1, 0),
            Direction::SouthEast => (1, -1),
            Direction::South => (0, -1),
            Direction::SouthWest => (-1, -1),
            Direction::West => (-1, 0),
            Direction::NorthWest => (-1, 1),
        }
    }
}

/// The closed set of actions a client may dispatch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Action {
    /// Ask the hub to reset the world.
    ResetMap,
    /// Resolve the fog at a seed, mixing in client entropy.
    RevealSeed {
        /// Seed key (block the seed was planted at).
        seed_block: u32,
        /// Client-chosen entropy.
        entropy: u32,
    },
    /// Create the player's seeker.
    SpawnSeeker {
        /// Id for the new seeker.
        seeker_id: u32,
        /// Spawn column.
        x: u8,
        /// Spawn row.
        y: u8,
        /// Starting strength.
        strength: u8,
    },
    /// Move a seeker one cell.
    MoveSeeker {
        /// Seeker to move.
        seeker_id: u32,
        /// Step direction.
        direction: Direction,
    },
}

impl Action {
    /// Action name as the hub knows it.
    pub const fn name(&self) -> &'static str {
        match self {
            Action::ResetMap => "RESET_MAP",
            Action::RevealSeed { .. } => "REVEAL_SEED",
            Action::SpawnSeeker { .. } => "SPAWN_SEEKER",
            Action::MoveSeeker { .. } => "MOVE_SEEKER",
        }
    }

    /// Canonical signature text the selector is derived from.
    pub const fn signature(&self) -> &'static str {
        match self {
            Action::ResetMap => "RESET_MAP()",
            Action::RevealSeed { .. } => "REVEAL_SEED(uint32,uint32)",
            Action::SpawnSeeker { .. } => "SPAWN_SEEKER(uint32,uint8,uint8,uint8)",
            Action::MoveSeeker { .. } => "MOVE_SEEKER(uint32,uint8)",
        }
    }

    fn args(&self) -> Vec<u64> {
        match *self {
            Action::ResetMap => vec![],
            Action::RevealSeed {
                seed_block,
                entropy,
            } => vec![seed_block.into(), entropy.into()],
            Action::SpawnSeeker {
                seeker_id,
                x,
                y,
                strength,
            } => vec![seeker_id.into(), x.into(), y.into(), strength.into()],
            Action::MoveSeeker {
                seeker_id,
                direction,
            } => vec![seeker_id.into(), direction.code().into()],
        }
    }

    /// Encode into the canonical payload.
    pub fn encode(&self) -> Vec<u8> {
        let args = self.args();
        let mut out = Vec::with_capacity(4 + args.len() * WORD_BYTES);
        out.extend_from_slice(&selector(self.signature()));
        for arg in args {
            let mut word = [0u8; WORD_BYTES];
            word[WORD_BYTES - 8..].copy_from_slice(&arg.to_be_bytes());
            out.extend_from_slice(&word);
        }
        out
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{:?}", self.name(), self.args())
    }
}

/// First four bytes of the blake3 hash of `signature`.
pub fn selector(signature: &str) -> [u8; 4] {
    let hash = blake3::hash(signature.as_bytes());
    let mut out = [0u8; 4];
    out.copy_from_slice(&hash.as_bytes()[..4]);
    out
}

/// Content digest of an encoded payload; this is what the session key signs.
pub fn digest(payload: &[u8]) -> Hash32 {
    *blake3::hash(payload).as_bytes()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn move_payload_is_selector_then_two_words() {
        let action = Action::MoveSeeker {
            seeker_id: 3,
            direction: Direction::West,
        };
        let bytes = action.encode();
        assert_eq!(bytes.len(), 4 + 2 * WORD_BYTES);
        assert_eq!(bytes[..4], selector("MOVE_SEEKER(uint32,uint8)"));
        assert_eq!(bytes[4 + WORD_BYTES - 1], 3);
        assert!(bytes[4..4 + WORD_BYTES - 1].iter().all(|b| *b == 0));
        assert_eq!(bytes[4 + 2 * WORD_BYTES - 1], 6);
    }

    #[test]
    fn display_names_the_action_and_its_arguments() {
        assert_eq!(Action::ResetMap.to_string(), "RESET_MAP[]");
        let reveal = Action::RevealSeed {
            seed_block: 7,
            entropy: 42,
        };
        assert_eq!(reveal.to_string(), "REVEAL_SEED[7, 42]");
    }

    #[test]
    fn reset_payload_is_selector_only() {
        assert_eq!(Action::ResetMap.encode(), selector("RESET_MAP()").to_vec());
    }

    #[test]
    fn selectors_differ_between_actions() {
        let names = [
            "RESET_MAP()",
            "REVEAL_SEED(uint32,uint32)",
            "SPAWN_SEEKER(uint32,uint8,uint8,uint8)",
            "MOVE_SEEKER(uint32,uint8)",
        ];
        for (i, a) in names.iter().enumerate() {
            for b in &names[i + 1..] {
                assert_ne!(selector(a), selector(b), "{a} vs {b}");
            }
        }
    }

    #[test]
    fn direction_codes_are_dense_and_opposites_cancel() {
        for (code, dir) in Direction::ALL.iter().enumerate() {
            assert_eq!(usize::from(dir.code()), code);
            assert_eq!(Direction::from_code(dir.code()), Some(*dir));
            let opposite = Direction::from_code((dir.code() + 4) % 8).unwrap();
            let (dx, dy) = dir.delta();
            let (ox, oy) = opposite.delta();
            assert_eq!((dx + ox, dy + oy), (0, 0));
        }
        assert_eq!(Direction::from_code(8), None);
    }

    #[test]
    fn digest_tracks_payload_bytes() {
        let a = Action::RevealSeed {
            seed_block: 1,
            entropy: 2,
        }
        .encode();
        let b = Action::RevealSeed {
            seed_block: 1,
            entropy: 3,
        }
        .encode();
        assert_eq!(digest(&a), digest(&a));
        assert_ne!(digest(&a), digest(&b));
    }
}
