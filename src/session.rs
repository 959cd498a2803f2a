//! Game session: score aggregation, game-over, and restart.
//!
//! A [`GameSession`] owns the tile grid and the stop broadcast for one
//! play-through. Tiles call back into the session core through the
//! [`SessionControl`] capability; the core holds only weak references to
//! tiles (via the broadcast), so there is no ownership cycle.

use std::sync::{Arc, Mutex};

use serde::Serialize;
use tokio::sync::broadcast;
use tracing::{debug, info, instrument, warn};

use crate::broadcast::StopBroadcast;
use crate::config::GameConfig;
use crate::events::SessionEvent;
use crate::tile::{SessionControl, TileController, TileSnapshot};

/// Buffered events per subscriber; a lagging UI loses the oldest first.
const EVENT_CAPACITY: usize = 64;

#[derive(Debug, Default)]
struct CoreState {
    score: u32,
    over: bool,
}

/// Shared core of a session: the counters, the stop broadcast, and the
/// event stream. Implements [`SessionControl`] for the tiles.
pub(crate) struct SessionCore {
    state: Mutex<CoreState>,
    stop: StopBroadcast,
    events: broadcast::Sender<SessionEvent>,
}

impl SessionCore {
    fn new() -> Self {
        let (events, _) = broadcast::channel(EVENT_CAPACITY);
        Self {
            state: Mutex::new(CoreState::default()),
            stop: StopBroadcast::new(),
            events,
        }
    }

    fn score(&self) -> u32 {
        self.state.lock().unwrap().score
    }

    fn is_over(&self) -> bool {
        self.state.lock().unwrap().over
    }

    fn emit(&self, event: SessionEvent) {
        // Send only fails when no UI is subscribed, which is fine for a
        // headless core.
        let _ = self.events.send(event);
    }
}

impl SessionControl for SessionCore {
    #[instrument(skip(self))]
    fn increment_score(&self) -> u32 {
        let score = {
            let mut st = self.state.lock().unwrap();
            if st.over {
                debug!(score = st.score, "hit after game over dropped");
                return st.score;
            }
            st.score += 1;
            st.score
        };
        info!(score, "score incremented");
        self.emit(SessionEvent::ScoreChanged { score });
        score
    }

    #[instrument(skip(self))]
    fn end_game(&self) {
        {
            let mut st = self.state.lock().unwrap();
            if st.over {
                warn!("end_game on a finished session ignored");
                return;
            }
            st.over = true;
        }
        // Synchronous fan-out: every tile observes the stop before this
        // call returns.
        self.stop.publish();
        let final_score = self.score();
        info!(final_score, "game over");
        self.emit(SessionEvent::GameOver { final_score });
    }
}

/// Point-in-time view of a session and its grid.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, derive_new::new)]
pub struct SessionSnapshot {
    /// Current score.
    pub score: u32,
    /// Whether the game has ended and not yet been reset.
    pub over: bool,
    /// Snapshot of every tile in the grid.
    pub tiles: Vec<TileSnapshot>,
}

/// One play-through of the game.
///
/// Created with a fresh, fully active grid. Ends when any tile reports a
/// miss (or [`end_game`] is called directly) and restarts via [`reset`],
/// which rebuilds the grid with new tile instances.
///
/// [`end_game`]: GameSession::end_game
/// [`reset`]: GameSession::reset
pub struct GameSession {
    config: GameConfig,
    core: Arc<SessionCore>,
    grid: Vec<TileController>,
}

impl GameSession {
    /// Creates a session and populates its grid.
    ///
    /// Must be called from within a tokio runtime; every tile arms its
    /// first timer immediately.
    #[instrument(skip(config), fields(tiles = *config.tile_count()))]
    pub fn new(config: GameConfig) -> Self {
        let mut session = Self {
            config,
            core: Arc::new(SessionCore::new()),
            grid: Vec::new(),
        };
        session.populate_grid();
        session
    }

    /// Current score.
    pub fn score(&self) -> u32 {
        self.core.score()
    }

    /// True between end-of-game and the next [`reset`](GameSession::reset).
    pub fn is_over(&self) -> bool {
        self.core.is_over()
    }

    /// The live tile grid, in index order.
    pub fn tiles(&self) -> &[TileController] {
        &self.grid
    }

    /// Subscribes to session events.
    pub fn subscribe(&self) -> broadcast::Receiver<SessionEvent> {
        self.core.events.subscribe()
    }

    /// Records a successful tap. Normally driven by the tiles themselves
    /// through [`SessionControl`]; exposed for the grid boundary.
    pub fn increment_score(&self) -> u32 {
        self.core.increment_score()
    }

    /// Ends the game: marks the session over and stops every tile.
    ///
    /// Fires once per game; later calls are no-ops.
    pub fn end_game(&self) {
        self.core.end_game();
    }

    /// Clears the score and game-over flag and rebuilds a fresh grid.
    ///
    /// Old tiles are stopped (if still live) and discarded; the new tiles
    /// begin active. Safe to call mid-game.
    #[instrument(skip(self))]
    pub fn reset(&mut self) {
        // Halt whatever is still running before the old grid is dropped.
        self.core.stop.publish();
        self.core.stop.clear();
        {
            let mut st = self.core.state.lock().unwrap();
            st.score = 0;
            st.over = false;
        }
        self.populate_grid();
        self.core.emit(SessionEvent::GameReset);
        info!("session reset");
    }

    /// Captures the session counters and every tile's state.
    pub fn snapshot(&self) -> SessionSnapshot {
        let st = self.core.state.lock().unwrap();
        let tiles = self.grid.iter().map(TileController::snapshot).collect();
        SessionSnapshot::new(st.score, st.over, tiles)
    }

    fn populate_grid(&mut self) {
        let timings = self.config.timings();
        let session: Arc<dyn SessionControl> = self.core.clone();
        self.grid = (0..*self.config.tile_count())
            .map(|index| {
                let tile = TileController::new(index, timings, session.clone());
                self.core.stop.subscribe(tile.stop_listener());
                tile.activate();
                tile
            })
            .collect();
        debug!(tiles = self.grid.len(), "grid populated");
    }
}

impl std::fmt::Debug for GameSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GameSession")
            .field("score", &self.score())
            .field("over", &self.is_over())
            .field("tiles", &self.grid.len())
            .finish()
    }
}
