//! Wave-based spawn scheduling.

pub mod scheduler;
pub mod types;

pub use scheduler::WaveScheduler;
pub use types::{MonsterSpawner, WavePhase};
