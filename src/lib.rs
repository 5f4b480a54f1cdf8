//! Skirmish - action-RPG session orchestration core.
//!
//! This crate is the gameplay backbone of the client: the event bus, the
//! session state machine, wave scheduling, combat resolution, and versioned
//! save persistence. Rendering, UI, audio, and asset loading live elsewhere
//! and talk to this core through the event bus and a handful of small traits.

pub mod combat;
pub mod config;
pub mod constants;
pub mod events;
pub mod persistence;
pub mod session;
pub mod waves;

pub use events::bus::EventBus;
pub use events::types::{EventKind, GameEvent};
pub use session::logic::GameSession;
pub use session::types::GamePhase;
