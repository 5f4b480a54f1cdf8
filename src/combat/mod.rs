//! Combat stats and damage resolution.

pub mod resolver;
pub mod types;

pub use resolver::{resolve, resolve_on_bus};
pub use types::{AttackOutcome, CombatStats};
