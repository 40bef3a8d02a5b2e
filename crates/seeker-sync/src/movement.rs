// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Optimistic Movement Tracker.
//!
//! The cursor is the only client-owned position. It equals the authoritative
//! anchor (the player's seeker as last reported by the hub) or sits on a
//! predicted cell one step from it while a move is pending. Authoritative
//! state wins: after the grace window the cursor is put back on the anchor.

use seeker_session_proto::{Action, Direction, GridPos};
use tokio::time::{Duration, Instant};

use crate::tilemap::TileGrid;

/// How long a prediction may diverge from the anchor.
pub const GRACE: Duration = Duration::from_millis(500);
/// Period of the reassert tick.
pub const REASSERT_INTERVAL: Duration = Duration::from_millis(3000);

/// Tracker state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    /// Cursor agrees with the last authoritative placement.
    Idle,
    /// A move was dispatched and not yet confirmed.
    PendingMove,
}

/// Result of a directional input.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MoveOutcome {
    /// Player owns no seeker; nothing dispatched.
    NoSeeker,
    /// Target cell is impassable; nothing dispatched.
    Blocked {
        /// Cell that was refused.
        target: GridPos,
    },
    /// Move accepted locally; dispatch `MOVE_SEEKER`.
    Moved {
        /// Seeker to move.
        seeker_id: u32,
        /// Step direction.
        direction: Direction,
        /// Cursor after the input.
        cursor: GridPos,
        /// False when the cursor was held to stay one step from the anchor.
        predicted: bool,
    },
}

impl MoveOutcome {
    /// Action to dispatch, if any.
    pub fn action(&self) -> Option<Action> {
        match *self {
            MoveOutcome::Moved {
                seeker_id,
                direction,
                ..
            } => Some(Action::MoveSeeker {
                seeker_id,
                direction,
            }),
            _ => None,
        }
    }
}

/// Cursor prediction state machine.
#[derive(Debug, Clone)]
pub struct MovementTracker {
    cursor: GridPos,
    anchor: Option<GridPos>,
    last_move_at: Option<Instant>,
    phase: Phase,
}

impl Default for MovementTracker {
    fn default() -> Self {
        Self::new()
    }
}

impl MovementTracker {
    /// Idle tracker with the cursor at the origin and no anchor.
    pub fn new() -> Self {
        Self {
            cursor: GridPos::default(),
            anchor: None,
            last_move_at: None,
            phase: Phase::Idle,
        }
    }

    /// Current cursor cell.
    pub fn cursor(&self) -> GridPos {
        self.cursor
    }

    /// Last authoritative position of the player's seeker.
    pub fn anchor(&self) -> Option<GridPos> {
        self.anchor
    }

    /// Current phase.
    pub fn phase(&self) -> Phase {
        self.phase
    }

    fn in_grace(&self, now: Instant) -> bool {
        self.last_move_at
            .is_some_and(|at| now.saturating_duration_since(at) < GRACE)
    }

    /// Authoritative placement of the player's seeker. Returns true when the
    /// cursor moved. The phase stays `PendingMove` while a kept prediction
    /// still differs from the anchor.
    pub fn confirm(&mut self, anchor: GridPos, now: Instant) -> bool {
        self.anchor = Some(anchor);
        let keep = self.in_grace(now) && self.cursor.chebyshev(anchor) <= 1;
        let moved = !keep && self.cursor != anchor;
        if moved {
            self.cursor = anchor;
        }
        if self.cursor == anchor {
            self.phase = Phase::Idle;
        }
        moved
    }

    /// Periodic tick: put the cursor back on the anchor once the grace window
    /// has passed. Returns true when the cursor moved.
    pub fn reassert(&mut self, now: Instant) -> bool {
        let Some(anchor) = self.anchor else {
            return false;
        };
        if self.cursor == anchor || self.in_grace(now) {
            return false;
        }
        self.cursor = anchor;
        self.phase = Phase::Idle;
        true
    }

    /// Directional input. `seeker_id` is the player's seeker, if any.
    pub fn request_move(
        &mut self,
        direction: Direction,
        seeker_id: Option<u32>,
        grid: &TileGrid,
        now: Instant,
    ) -> MoveOutcome {
        let Some(seeker_id) = seeker_id else {
            return MoveOutcome::NoSeeker;
        };
        self.last_move_at = Some(now);
        let (dx, dy) = direction.delta();
        let target = self.cursor.offset(dx, dy);
        if !grid.is_passable(target) {
            return MoveOutcome::Blocked { target };
        }
        let predicted = self.anchor.map_or(true, |a| target.chebyshev(a) <= 1);
        if predicted {
            self.cursor = target;
        }
        self.phase = Phase::PendingMove;
        MoveOutcome::Moved {
            seeker_id,
            direction,
            cursor: self.cursor,
            predicted,
        }
    }
}
