//! Scheduler phases and the world-side spawn interface.

use crate::config::types::{MonsterConfig, Vec3};

/// Where the scheduler is in a level's spawn timeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WavePhase {
    /// Not started yet.
    Idle,
    /// Emitting spawn calls for the current wave.
    Spawning,
    /// Current wave fully spawned; waiting for alive count to reach 0.
    WaitingForClear,
    /// All waves cleared; about to spawn the boss.
    BossSpawning,
    /// Boss alive; waiting for it to die.
    BossWaitingForClear,
    /// Timeline exhausted.
    Finished,
}

/// World-side collaborator that actually creates entities.
///
/// The scheduler decides *what* to spawn and *where*; scene construction,
/// meshes, and AI live behind this trait. Implementations that cannot find
/// a visual template for `monster.template` are expected to produce a
/// minimal stats-only body — gameplay never blocks on missing art.
pub trait MonsterSpawner {
    /// Creates a live entity, returning its entity id.
    fn spawn(&mut self, monster: &MonsterConfig, position: Vec3) -> u64;
}
