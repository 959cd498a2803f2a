//! Tile phase state machine.
//!
//! A tile cycles between [`TilePhase::Active`] and [`TilePhase::Inactive`]
//! on its own timers until the session ends, at which point it enters the
//! terminal [`TilePhase::Stopped`] phase and performs no further
//! transitions.

use serde::{Deserialize, Serialize};

/// Phase of a single tile.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, derive_more::Display)]
pub enum TilePhase {
    /// A tap scores a point; the tile will flip back on its own.
    Active,
    /// A tap ends the game; the tile will re-arm on its own.
    Inactive,
    /// Terminal: the session ended and the tile is inert.
    Stopped,
}

impl TilePhase {
    /// Returns true if a tap on this tile scores a point.
    pub fn is_active(self) -> bool {
        matches!(self, TilePhase::Active)
    }

    /// Returns true if the tile has entered its terminal phase.
    pub fn is_stopped(self) -> bool {
        matches!(self, TilePhase::Stopped)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn predicates_match_phases() {
        assert!(TilePhase::Active.is_active());
        assert!(!TilePhase::Inactive.is_active());
        assert!(!TilePhase::Stopped.is_active());
        assert!(TilePhase::Stopped.is_stopped());
        assert!(!TilePhase::Active.is_stopped());
    }

    #[test]
    fn display_names_phases() {
        assert_eq!(TilePhase::Active.to_string(), "Active");
        assert_eq!(TilePhase::Stopped.to_string(), "Stopped");
    }
}
