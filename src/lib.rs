//! Tapgrid library - headless core of a reaction-time tile game
//!
//! A grid of tiles flips between active and inactive on randomized timers.
//! Tapping an active tile scores a point; tapping an inactive tile ends
//! the game. This crate is the core only: state machines, timers, score,
//! and the stop signal. Rendering, input devices, and dialogs belong to an
//! external UI shell.
//!
//! # Architecture
//!
//! - **TileController**: one tile's active/inactive state machine and its
//!   single cancellable transition timer
//! - **GameSession**: score counter, game-over detection, restart; owns
//!   the grid and the stop broadcast
//! - **StopBroadcast**: explicitly-scoped many-listener stop signal
//! - **Invariants**: independently testable properties of the timer and
//!   stop-signal guarantees
//!
//! # Example
//!
//! ```no_run
//! use tapgrid::{GameConfig, GameSession};
//!
//! # async fn example() {
//! // Tiles arm their timers on the tokio runtime.
//! let session = GameSession::new(GameConfig::default());
//!
//! // The UI boundary wires taps through to the tiles.
//! session.tiles()[0].on_tap();
//! println!("score: {}", session.score());
//! # }
//! ```

#![warn(missing_docs)]
#![forbid(unsafe_code)]

// Private module declarations
mod broadcast;
mod config;
mod events;
mod phase;
mod session;
mod tile;
mod timer;

pub mod invariants;

// Crate-level exports - Stop signal
pub use broadcast::{StopBroadcast, StopListener};

// Crate-level exports - Configuration
pub use config::{ConfigError, GameConfig};

// Crate-level exports - UI-facing events
pub use events::SessionEvent;

// Crate-level exports - Tile state machine
pub use phase::TilePhase;
pub use tile::{SessionControl, TileController, TileSnapshot, TileTimings};

// Crate-level exports - Session
pub use session::{GameSession, SessionSnapshot};

// Crate-level exports - Timer plumbing
pub use timer::{ArmedTimer, TimerLedger};
