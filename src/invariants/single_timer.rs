//! At most one armed timer per tile.

use crate::invariants::Invariant;
use crate::tile::TileSnapshot;

/// A tile owns at most one armed timer, and every timer it ever scheduled
/// is accounted for: fired, cancelled, or still armed.
///
/// The `Option<ArmedTimer>` slot makes two simultaneous timers impossible
/// by construction; the ledger check proves no schedule path forgot the
/// explicit cancel that must precede a re-arm.
pub struct SingleTimerInvariant;

impl Invariant<TileSnapshot> for SingleTimerInvariant {
    fn holds(state: &TileSnapshot) -> bool {
        state.ledger.balances(state.armed)
    }

    fn description() -> &'static str {
        "every scheduled timer is fired, cancelled, or the single armed one"
    }
}
