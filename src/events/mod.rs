//! Typed publish/subscribe event system.
//!
//! The sole communication channel between the combat resolver, the wave
//! scheduler, and the session. Events are a closed sum type; the bus registry
//! is keyed by [`types::EventKind`].

pub mod bus;
pub mod types;

pub use bus::{EventBus, SubscriptionId};
pub use types::{EventKind, GameEvent};
