//! Stopped tiles stay inert.

use crate::invariants::Invariant;
use crate::tile::TileSnapshot;

/// A stopped tile is never armed: the stop signal cancels the pending
/// timer rather than letting it fire into a dead tile.
pub struct TerminalStopInvariant;

impl Invariant<TileSnapshot> for TerminalStopInvariant {
    fn holds(state: &TileSnapshot) -> bool {
        !state.phase.is_stopped() || !state.armed
    }

    fn description() -> &'static str {
        "a stopped tile has no armed timer"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::phase::TilePhase;
    use crate::timer::TimerLedger;

    #[test]
    fn holds_for_unarmed_stopped_tile() {
        let ledger = TimerLedger {
            scheduled: 4,
            cancelled: 1,
            fired: 3,
        };
        let snapshot = TileSnapshot::new(0, TilePhase::Stopped, false, ledger);
        assert!(TerminalStopInvariant::holds(&snapshot));
    }

    #[test]
    fn ignores_live_tiles() {
        let ledger = TimerLedger {
            scheduled: 1,
            cancelled: 0,
            fired: 0,
        };
        let snapshot = TileSnapshot::new(0, TilePhase::Active, true, ledger);
        assert!(TerminalStopInvariant::holds(&snapshot));
    }

    #[test]
    fn detects_armed_stopped_tile() {
        let ledger = TimerLedger {
            scheduled: 1,
            cancelled: 0,
            fired: 0,
        };
        let snapshot = TileSnapshot::new(0, TilePhase::Stopped, true, ledger);
        assert!(!TerminalStopInvariant::holds(&snapshot));
    }
}
