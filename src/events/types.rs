//! Event payload definitions.

use crate::config::types::Vec3;
use crate::session::types::GamePhase;

/// Every event that can cross the bus, one variant per event name.
///
/// Payload shapes are fixed per variant, so a handler can never observe a
/// malformed payload. Handlers that only care about a subset of events match
/// the variants they want and ignore the rest.
#[derive(Debug, Clone, PartialEq)]
pub enum GameEvent {
    /// Combat resolver landed a hit on `target_id`.
    DamageDealt {
        damage: u32,
        was_crit: bool,
        target_id: u64,
    },
    /// Companion to [`GameEvent::DamageDealt`] when the hit crit.
    CriticalHit { damage: u32, target_id: u64 },
    /// A spawned monster died.
    MonsterKilled {
        monster_id: u32,
        position: Vec3,
        drop_table_id: u32,
    },
    /// The player died.
    PlayerKilled { player_id: u64 },
    /// The scheduler began spawning a wave.
    WaveStarted { wave_id: u32 },
    /// All entities of a wave have been cleared.
    WaveCompleted { wave_id: u32 },
    /// The boss entry of the level was spawned.
    BossSpawned { monster_id: u32, position: Vec3 },
    /// Session ended in victory; rewards already applied.
    LevelCompleted {
        reward_gold: u64,
        reward_exp: u64,
        level_id: u32,
    },
    /// Session ended in defeat; retain ratios already applied.
    LevelFailed {
        reward_gold: u64,
        reward_exp: u64,
        level_id: u32,
    },
    /// The session state machine moved to a new phase.
    GameStateChanged { new_state: GamePhase },
    /// The simulation clock was frozen by a pause.
    GamePaused,
    /// The simulation clock was unfrozen.
    GameResumed,
    /// Player gold total changed by `delta`.
    GoldChanged { total_gold: u64, delta: i64 },
}

impl GameEvent {
    /// The registry key this event dispatches under.
    pub fn kind(&self) -> EventKind {
        match self {
            GameEvent::DamageDealt { .. } => EventKind::DamageDealt,
            GameEvent::CriticalHit { .. } => EventKind::CriticalHit,
            GameEvent::MonsterKilled { .. } => EventKind::MonsterKilled,
            GameEvent::PlayerKilled { .. } => EventKind::PlayerKilled,
            GameEvent::WaveStarted { .. } => EventKind::WaveStarted,
            GameEvent::WaveCompleted { .. } => EventKind::WaveCompleted,
            GameEvent::BossSpawned { .. } => EventKind::BossSpawned,
            GameEvent::LevelCompleted { .. } => EventKind::LevelCompleted,
            GameEvent::LevelFailed { .. } => EventKind::LevelFailed,
            GameEvent::GameStateChanged { .. } => EventKind::GameStateChanged,
            GameEvent::GamePaused => EventKind::GamePaused,
            GameEvent::GameResumed => EventKind::GameResumed,
            GameEvent::GoldChanged { .. } => EventKind::GoldChanged,
        }
    }
}

/// Discriminant-only view of [`GameEvent`], used as the bus registry key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventKind {
    DamageDealt,
    CriticalHit,
    MonsterKilled,
    PlayerKilled,
    WaveStarted,
    WaveCompleted,
    BossSpawned,
    LevelCompleted,
    LevelFailed,
    GameStateChanged,
    GamePaused,
    GameResumed,
    GoldChanged,
}

impl EventKind {
    /// All kinds, for bulk registration at startup.
    pub fn all() -> [EventKind; 13] {
        [
            EventKind::DamageDealt,
            EventKind::CriticalHit,
            EventKind::MonsterKilled,
            EventKind::PlayerKilled,
            EventKind::WaveStarted,
            EventKind::WaveCompleted,
            EventKind::BossSpawned,
            EventKind::LevelCompleted,
            EventKind::LevelFailed,
            EventKind::GameStateChanged,
            EventKind::GamePaused,
            EventKind::GameResumed,
            EventKind::GoldChanged,
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_matches_variant() {
        let ev = GameEvent::WaveStarted { wave_id: 3 };
        assert_eq!(ev.kind(), EventKind::WaveStarted);

        let ev = GameEvent::GoldChanged {
            total_gold: 100,
            delta: -5,
        };
        assert_eq!(ev.kind(), EventKind::GoldChanged);
    }

    #[test]
    fn test_all_kinds_covered() {
        // One entry per variant; a new variant must be added here too.
        assert_eq!(EventKind::all().len(), 13);
    }
}
