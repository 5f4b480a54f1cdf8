//! Session lifecycle: the top-level game state machine.

pub mod logic;
pub mod types;

pub use logic::GameSession;
pub use types::{GamePhase, LootEntry, SettlementSummary};
