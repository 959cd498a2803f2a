//! Tile controllers: the per-cell state machine of the grid.
//!
//! Each [`TileController`] owns one tile's alternating active/inactive
//! state and schedules its own future transitions. Taps are relayed upward
//! through the [`SessionControl`] capability; the session never reaches
//! back into a tile except through the stop signal.

use std::sync::{Arc, Mutex, MutexGuard, Weak};
use std::time::Duration;

use rand::Rng;
use serde::Serialize;
use tracing::{debug, instrument, trace};

use crate::broadcast::StopListener;
use crate::phase::TilePhase;
use crate::timer::{ArmedTimer, TimerLedger};

/// The two-method capability a tile holds on its session.
///
/// Tiles never own the session; they only report taps through this seam.
pub trait SessionControl: Send + Sync {
    /// Records a successful tap on an active tile. Returns the new score.
    fn increment_score(&self) -> u32;

    /// Ends the game after a tap on an inactive tile.
    fn end_game(&self);
}

/// Timing parameters a tile schedules itself with.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TileTimings {
    /// How long a tile stays active before flipping back on its own.
    pub active_window: Duration,
    /// Lower bound (inclusive) of the re-arm delay, in whole seconds.
    pub rearm_min_secs: u64,
    /// Upper bound (inclusive) of the re-arm delay, in whole seconds.
    pub rearm_max_secs: u64,
}

/// Point-in-time view of a tile, for rendering, tests, and invariants.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, derive_new::new)]
pub struct TileSnapshot {
    /// Position of the tile in the grid.
    pub index: usize,
    /// Current phase.
    pub phase: TilePhase,
    /// Whether a transition timer is currently armed.
    pub armed: bool,
    /// Schedule/cancel/fire counters.
    pub ledger: TimerLedger,
}

/// Which transition a fired timer performs.
#[derive(Debug, Clone, Copy)]
enum Flip {
    /// Re-arm: the tile becomes active again.
    Activate,
    /// The active window elapsed: the tile goes inactive.
    Deactivate,
}

enum TapOutcome {
    Hit,
    Miss,
}

#[derive(Debug)]
struct TileState {
    phase: TilePhase,
    pending: Option<ArmedTimer>,
    ledger: TimerLedger,
}

/// Shared core of a tile, reachable from timer callbacks and the stop
/// broadcast through weak references.
pub(crate) struct TileShared {
    index: usize,
    timings: TileTimings,
    session: Arc<dyn SessionControl>,
    // Handle to this allocation, cloned into timer callbacks so a pending
    // timer never keeps a discarded tile alive.
    weak_self: Weak<TileShared>,
    state: Mutex<TileState>,
}

/// Controller for a single tile.
///
/// Freshly built tiles are inert; the grid owner calls [`activate`] once to
/// start the flip cycle. All operations are total and safe to call in any
/// phase; a stopped tile ignores everything.
///
/// [`activate`]: TileController::activate
pub struct TileController {
    shared: Arc<TileShared>,
}

impl TileController {
    /// Creates a tile bound to its session capability.
    ///
    /// The session reference is required at construction, so a tile without
    /// a session cannot exist.
    pub fn new(index: usize, timings: TileTimings, session: Arc<dyn SessionControl>) -> Self {
        let shared = Arc::new_cyclic(|weak_self| TileShared {
            index,
            timings,
            session,
            weak_self: weak_self.clone(),
            state: Mutex::new(TileState {
                phase: TilePhase::Inactive,
                pending: None,
                ledger: TimerLedger::default(),
            }),
        });
        Self { shared }
    }

    /// Makes the tile active and arms the deactivation timer.
    ///
    /// Replaces (explicitly cancelling) any prior timer, so it is safe to
    /// call at any point without violating the one-timer invariant. No-op
    /// once the tile has stopped.
    pub fn activate(&self) {
        self.shared.activate();
    }

    /// Makes the tile inactive and arms the randomized re-arm timer.
    ///
    /// The delay is drawn uniformly from the configured whole-second range.
    /// No-op once the tile has stopped.
    pub fn deactivate(&self) {
        self.shared.deactivate();
    }

    /// Handles a tap from the UI boundary.
    ///
    /// A tap on an active tile flips it inactive (with the usual re-arm)
    /// and reports a hit; a tap on an inactive tile reports a game-ending
    /// miss and leaves the tile unchanged. Taps on stopped tiles are
    /// ignored.
    pub fn on_tap(&self) {
        self.shared.on_tap();
    }

    /// Handles the session's stop signal directly.
    ///
    /// Normally delivered through the stop broadcast; exposed so a grid
    /// owner can halt a single tile. Idempotent.
    pub fn on_stop_signal(&self) {
        StopListener::on_stop_signal(&*self.shared);
    }

    /// True while a tap on this tile scores a point.
    pub fn is_active(&self) -> bool {
        self.shared.lock_state().phase.is_active()
    }

    /// True once the tile has received the stop signal.
    pub fn is_stopped(&self) -> bool {
        self.shared.lock_state().phase.is_stopped()
    }

    /// Position of the tile in the grid.
    pub fn index(&self) -> usize {
        self.shared.index
    }

    /// Captures the tile's current phase, armed state, and timer ledger.
    pub fn snapshot(&self) -> TileSnapshot {
        let st = self.shared.lock_state();
        TileSnapshot::new(
            self.shared.index,
            st.phase,
            st.pending.is_some(),
            st.ledger,
        )
    }

    /// Weak handle for registration with a stop broadcast.
    pub fn stop_listener(&self) -> Weak<dyn StopListener> {
        let shared: Arc<dyn StopListener> = self.shared.clone();
        let listener: Weak<dyn StopListener> = Arc::downgrade(&shared);
        listener
    }
}

impl std::fmt::Debug for TileController {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let st = self.shared.lock_state();
        f.debug_struct("TileController")
            .field("index", &self.shared.index)
            .field("phase", &st.phase)
            .field("armed", &st.pending.is_some())
            .finish()
    }
}

impl TileShared {
    fn lock_state(&self) -> MutexGuard<'_, TileState> {
        self.state.lock().unwrap()
    }

    #[instrument(skip(self), fields(tile = self.index))]
    fn activate(&self) {
        let mut st = self.lock_state();
        if st.phase.is_stopped() {
            trace!("activate ignored on stopped tile");
            return;
        }
        Self::cancel_pending(&mut st);
        self.enter_active(&mut st);
    }

    #[instrument(skip(self), fields(tile = self.index))]
    fn deactivate(&self) {
        let mut st = self.lock_state();
        if st.phase.is_stopped() {
            trace!("deactivate ignored on stopped tile");
            return;
        }
        Self::cancel_pending(&mut st);
        self.enter_inactive(&mut st);
    }

    #[instrument(skip(self), fields(tile = self.index))]
    fn on_tap(&self) {
        let outcome = {
            let mut st = self.lock_state();
            match st.phase {
                TilePhase::Stopped => {
                    debug!("tap on stopped tile ignored");
                    return;
                }
                TilePhase::Active => {
                    Self::cancel_pending(&mut st);
                    self.enter_inactive(&mut st);
                    TapOutcome::Hit
                }
                TilePhase::Inactive => TapOutcome::Miss,
            }
        };

        // The tile lock is released before calling into the session: the
        // stop broadcast may call straight back into this tile.
        match outcome {
            TapOutcome::Hit => {
                let score = self.session.increment_score();
                debug!(score, "hit");
            }
            TapOutcome::Miss => {
                debug!("miss, ending game");
                self.session.end_game();
            }
        }
    }

    /// Sets the active phase and arms the fixed deactivation window.
    ///
    /// Caller must have cleared any pending timer.
    fn enter_active(&self, st: &mut TileState) {
        st.phase = TilePhase::Active;
        self.schedule(st, self.timings.active_window, Flip::Deactivate);
    }

    /// Sets the inactive phase and arms the randomized re-arm.
    ///
    /// Caller must have cleared any pending timer.
    fn enter_inactive(&self, st: &mut TileState) {
        st.phase = TilePhase::Inactive;
        let secs =
            rand::rng().random_range(self.timings.rearm_min_secs..=self.timings.rearm_max_secs);
        trace!(secs, "re-arm delay drawn");
        self.schedule(st, Duration::from_secs(secs), Flip::Activate);
    }

    fn schedule(&self, st: &mut TileState, delay: Duration, flip: Flip) {
        let weak = self.weak_self.clone();
        st.ledger.record_scheduled();
        st.pending = Some(ArmedTimer::arm(delay, move || {
            if let Some(tile) = weak.upgrade() {
                tile.timer_fired(flip);
            }
        }));
    }

    #[instrument(skip(self), fields(tile = self.index))]
    fn timer_fired(&self, flip: Flip) {
        let mut st = self.lock_state();
        if st.phase.is_stopped() {
            // The stop signal won the race; the cancellation is already on
            // the ledger.
            return;
        }
        st.pending = None;
        st.ledger.record_fired();
        match flip {
            Flip::Activate => {
                debug!("timer fired, tile active");
                self.enter_active(&mut st);
            }
            Flip::Deactivate => {
                debug!("timer fired, tile inactive");
                self.enter_inactive(&mut st);
            }
        }
    }

    fn cancel_pending(st: &mut TileState) {
        if let Some(timer) = st.pending.take() {
            timer.cancel();
            st.ledger.record_cancelled();
        }
    }
}

impl StopListener for TileShared {
    fn on_stop_signal(&self) {
        let mut st = self.lock_state();
        if st.phase.is_stopped() {
            trace!(tile = self.index, "stop signal on stopped tile ignored");
            return;
        }
        Self::cancel_pending(&mut st);
        st.phase = TilePhase::Stopped;
        debug!(tile = self.index, "tile stopped");
    }
}
