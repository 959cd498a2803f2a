//! Game over stops the whole grid.

use crate::invariants::Invariant;
use crate::session::SessionSnapshot;

/// Once a session is over, every tile in its grid has stopped and no
/// timer remains armed, regardless of grid size.
pub struct AllStoppedWhenOverInvariant;

impl Invariant<SessionSnapshot> for AllStoppedWhenOverInvariant {
    fn holds(state: &SessionSnapshot) -> bool {
        !state.over
            || state
                .tiles
                .iter()
                .all(|tile| tile.phase.is_stopped() && !tile.armed)
    }

    fn description() -> &'static str {
        "a finished session has only stopped, unarmed tiles"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::phase::TilePhase;
    use crate::tile::TileSnapshot;
    use crate::timer::TimerLedger;

    fn tile(phase: TilePhase, armed: bool) -> TileSnapshot {
        let ledger = TimerLedger {
            scheduled: 1,
            cancelled: u64::from(!armed),
            fired: 0,
        };
        TileSnapshot::new(0, phase, armed, ledger)
    }

    #[test]
    fn holds_while_game_is_live() {
        let snapshot = SessionSnapshot::new(3, false, vec![tile(TilePhase::Active, true)]);
        assert!(AllStoppedWhenOverInvariant::holds(&snapshot));
    }

    #[test]
    fn holds_for_fully_stopped_grid() {
        let tiles = vec![
            tile(TilePhase::Stopped, false),
            tile(TilePhase::Stopped, false),
        ];
        let snapshot = SessionSnapshot::new(3, true, tiles);
        assert!(AllStoppedWhenOverInvariant::holds(&snapshot));
    }

    #[test]
    fn holds_for_empty_grid() {
        let snapshot = SessionSnapshot::new(0, true, Vec::new());
        assert!(AllStoppedWhenOverInvariant::holds(&snapshot));
    }

    #[test]
    fn detects_straggler_tile() {
        let tiles = vec![
            tile(TilePhase::Stopped, false),
            tile(TilePhase::Inactive, true),
        ];
        let snapshot = SessionSnapshot::new(3, true, tiles);
        assert!(!AllStoppedWhenOverInvariant::holds(&snapshot));
    }
}
