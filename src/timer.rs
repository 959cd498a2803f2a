//! Cancellable one-shot timers for tile transitions.
//!
//! Every scheduled tile transition is held as an [`ArmedTimer`]: a single
//! deferred callback that can be cancelled explicitly and that aborts its
//! task when dropped, so a discarded tile can never leak scheduled work.

use std::time::Duration;

use serde::{Deserialize, Serialize};
use tokio::task::JoinHandle;
use tracing::trace;

/// A single scheduled callback, owned by the component that armed it.
///
/// Arming spawns a task that sleeps for the delay and then runs the
/// callback. Cancellation aborts the task; the callback never runs after a
/// completed [`ArmedTimer::cancel`]. Dropping the handle also aborts, as a
/// backstop for torn-down owners.
#[derive(Debug)]
pub struct ArmedTimer {
    handle: JoinHandle<()>,
}

impl ArmedTimer {
    /// Arms a timer that runs `callback` after `delay`.
    ///
    /// Must be called from within a tokio runtime.
    pub fn arm<F>(delay: Duration, callback: F) -> Self
    where
        F: FnOnce() + Send + 'static,
    {
        trace!(?delay, "arming timer");
        let handle = tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            callback();
        });
        Self { handle }
    }

    /// Cancels the timer, aborting the scheduled callback.
    pub fn cancel(self) {
        trace!("cancelling timer");
        self.handle.abort();
    }

    /// Returns true once the callback has run (or the task was aborted).
    pub fn is_finished(&self) -> bool {
        self.handle.is_finished()
    }
}

impl Drop for ArmedTimer {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

/// Counters proving the one-timer-per-tile property.
///
/// Every armed timer is recorded as scheduled, and leaves the books as
/// either cancelled or fired. The ledger balances when
/// `scheduled == cancelled + fired + armed`, where `armed` is 1 while a
/// timer is outstanding.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TimerLedger {
    /// Timers armed over the tile's lifetime.
    pub scheduled: u64,
    /// Timers cancelled before firing.
    pub cancelled: u64,
    /// Timers whose callback ran.
    pub fired: u64,
}

impl TimerLedger {
    /// Records a newly armed timer.
    pub(crate) fn record_scheduled(&mut self) {
        self.scheduled += 1;
    }

    /// Records an explicit cancellation.
    pub(crate) fn record_cancelled(&mut self) {
        self.cancelled += 1;
    }

    /// Records a callback that ran.
    pub(crate) fn record_fired(&mut self) {
        self.fired += 1;
    }

    /// Checks the ledger against the current armed state.
    pub fn balances(&self, armed: bool) -> bool {
        self.scheduled == self.cancelled + self.fired + u64::from(armed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicBool, Ordering};

    #[tokio::test(start_paused = true)]
    async fn fires_after_delay() {
        let fired = Arc::new(AtomicBool::new(false));
        let flag = fired.clone();
        let timer = ArmedTimer::arm(Duration::from_secs(2), move || {
            flag.store(true, Ordering::SeqCst);
        });

        tokio::time::sleep(Duration::from_millis(1500)).await;
        assert!(!fired.load(Ordering::SeqCst));

        tokio::time::sleep(Duration::from_millis(600)).await;
        assert!(fired.load(Ordering::SeqCst));
        assert!(timer.is_finished());
    }

    #[tokio::test(start_paused = true)]
    async fn cancel_prevents_firing() {
        let fired = Arc::new(AtomicBool::new(false));
        let flag = fired.clone();
        let timer = ArmedTimer::arm(Duration::from_secs(2), move || {
            flag.store(true, Ordering::SeqCst);
        });

        timer.cancel();
        tokio::time::sleep(Duration::from_secs(5)).await;
        assert!(!fired.load(Ordering::SeqCst));
    }

    #[tokio::test(start_paused = true)]
    async fn drop_aborts_scheduled_work() {
        let fired = Arc::new(AtomicBool::new(false));
        let flag = fired.clone();
        drop(ArmedTimer::arm(Duration::from_secs(2), move || {
            flag.store(true, Ordering::SeqCst);
        }));

        tokio::time::sleep(Duration::from_secs(5)).await;
        assert!(!fired.load(Ordering::SeqCst));
    }

    #[test]
    fn ledger_balances_track_armed_state() {
        let mut ledger = TimerLedger::default();
        assert!(ledger.balances(false));

        ledger.record_scheduled();
        assert!(ledger.balances(true));
        assert!(!ledger.balances(false));

        ledger.record_cancelled();
        assert!(ledger.balances(false));

        ledger.record_scheduled();
        ledger.record_fired();
        assert!(ledger.balances(false));
    }
}
