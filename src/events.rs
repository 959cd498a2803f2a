//! Notifications surfaced to the UI boundary.
//!
//! The core renders nothing; a UI shell subscribes to these events to
//! update the score display and present the end-of-game dialog.

use serde::{Deserialize, Serialize};

/// Event emitted by a game session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, derive_more::Display)]
pub enum SessionEvent {
    /// The score changed after a successful tap.
    #[display("score changed to {}", score)]
    ScoreChanged {
        /// The new score.
        score: u32,
    },

    /// The game ended; present the final score and offer a restart.
    #[display("game over with final score {}", final_score)]
    GameOver {
        /// Score at the moment the game ended.
        final_score: u32,
    },

    /// The session was reset; a fresh grid is live.
    #[display("session reset")]
    GameReset,
}
