//! Cooperative, tick-driven wave controller.
//!
//! One `tick()` call per frame advances an explicit state machine; at most
//! one entity is spawned per tick, so the concurrency-cap check structurally
//! precedes every spawn call. Pauses map to the `suspended` flag and session
//! teardown to `cancelled`; both are checked on every tick.

use std::collections::HashSet;
use std::rc::Rc;

use super::types::{MonsterSpawner, WavePhase};
use crate::config::types::{LevelConfig, MonsterConfig, Vec3};
use crate::config::ConfigDb;
use crate::events::types::GameEvent;

/// Spawns a level's configured waves and boss, throttled by a global
/// alive-entity cap, and tracks clear conditions from kill notifications.
pub struct WaveScheduler {
    level: LevelConfig,
    configs: Rc<ConfigDb>,
    cap: u32,
    phase: WavePhase,
    wave_index: usize,
    entry_index: usize,
    spawned_in_entry: u32,
    alive: u32,
    total_kills: u32,
    suspended: bool,
    cancelled: bool,
    warned_missing: HashSet<u32>,
}

impl WaveScheduler {
    pub fn new(level: LevelConfig, configs: Rc<ConfigDb>, cap: u32) -> Self {
        Self {
            level,
            configs,
            cap,
            phase: WavePhase::Idle,
            wave_index: 0,
            entry_index: 0,
            spawned_in_entry: 0,
            alive: 0,
            total_kills: 0,
            suspended: false,
            cancelled: false,
            warned_missing: HashSet::new(),
        }
    }

    /// Advances the timeline by one step.
    ///
    /// Returns the events this tick produced; the owning session publishes
    /// them, so no borrow of the scheduler is held while handlers run.
    pub fn tick(&mut self, spawner: &mut dyn MonsterSpawner) -> Vec<GameEvent> {
        let mut events = Vec::new();
        if self.cancelled || self.suspended {
            return events;
        }

        match self.phase {
            WavePhase::Idle => {
                if self.level.waves.is_empty() {
                    // Nothing to spawn: straight to the boss, or done with
                    // zero kills required.
                    self.phase = match self.level.boss {
                        Some(_) => WavePhase::BossSpawning,
                        None => WavePhase::Finished,
                    };
                } else {
                    self.begin_wave(0, &mut events);
                }
            }
            WavePhase::Spawning => {
                if self.alive >= self.cap {
                    return events; // cap reached: yield until a kill frees room
                }
                if let Some((monster_id, position)) = self.next_spawn() {
                    let monster = self.resolve_monster(monster_id);
                    let _ = spawner.spawn(&monster, position);
                    self.alive += 1;
                }
                if self.entry_index >= self.level.waves[self.wave_index].entries.len() {
                    self.phase = WavePhase::WaitingForClear;
                }
            }
            WavePhase::WaitingForClear => {
                if self.alive == 0 {
                    let wave_id = self.level.waves[self.wave_index].wave_id;
                    events.push(GameEvent::WaveCompleted { wave_id });
                    if self.wave_index + 1 < self.level.waves.len() {
                        self.begin_wave(self.wave_index + 1, &mut events);
                    } else if self.level.boss.is_some() {
                        self.phase = WavePhase::BossSpawning;
                    } else {
                        self.phase = WavePhase::Finished;
                    }
                }
            }
            WavePhase::BossSpawning => {
                if self.alive >= self.cap {
                    return events;
                }
                // Phase is only entered when a boss entry exists.
                let Some(boss) = self.level.boss.clone() else {
                    self.phase = WavePhase::Finished;
                    return events;
                };
                let monster = self.resolve_monster(boss.monster_id);
                let _ = spawner.spawn(&monster, boss.spawn_point);
                self.alive += 1;
                events.push(GameEvent::BossSpawned {
                    monster_id: boss.monster_id,
                    position: boss.spawn_point,
                });
                self.phase = WavePhase::BossWaitingForClear;
            }
            WavePhase::BossWaitingForClear => {
                if self.alive == 0 {
                    self.phase = WavePhase::Finished;
                }
            }
            WavePhase::Finished => {}
        }
        events
    }

    /// Kill notification from the bus: one fewer entity alive.
    pub fn notify_kill(&mut self) {
        self.alive = self.alive.saturating_sub(1);
        self.total_kills += 1;
    }

    /// Pause/resume. While suspended, `tick()` makes no progress and the
    /// timeline resumes exactly where it left off.
    pub fn set_suspended(&mut self, suspended: bool) {
        self.suspended = suspended;
    }

    /// Permanently stops the timeline (session teardown).
    pub fn cancel(&mut self) {
        self.cancelled = true;
    }

    pub fn phase(&self) -> WavePhase {
        self.phase
    }

    pub fn alive(&self) -> u32 {
        self.alive
    }

    pub fn total_kills(&self) -> u32 {
        self.total_kills
    }

    /// The timeline is exhausted and everything spawned has died.
    pub fn is_victory(&self) -> bool {
        self.phase == WavePhase::Finished && self.alive == 0
    }

    fn begin_wave(&mut self, index: usize, events: &mut Vec<GameEvent>) {
        self.wave_index = index;
        self.entry_index = 0;
        self.spawned_in_entry = 0;
        self.phase = WavePhase::Spawning;
        events.push(GameEvent::WaveStarted {
            wave_id: self.level.waves[index].wave_id,
        });
    }

    /// Next (monster, position) of the current wave, advancing the cursor.
    /// Placement rotates through the entry's spawn points.
    fn next_spawn(&mut self) -> Option<(u32, Vec3)> {
        let entries = &self.level.waves[self.wave_index].entries;
        while self.entry_index < entries.len() {
            let entry = &entries[self.entry_index];
            if self.spawned_in_entry < entry.count {
                let position = if entry.spawn_points.is_empty() {
                    Vec3::default()
                } else {
                    entry.spawn_points[self.spawned_in_entry as usize % entry.spawn_points.len()]
                };
                self.spawned_in_entry += 1;
                let monster_id = entry.monster_id;
                if self.spawned_in_entry >= entry.count {
                    self.entry_index += 1;
                    self.spawned_in_entry = 0;
                }
                return Some((monster_id, position));
            }
            self.entry_index += 1;
            self.spawned_in_entry = 0;
        }
        None
    }

    /// Monster config lookup with a stats-only fallback for dangling ids,
    /// warned once per id.
    fn resolve_monster(&mut self, monster_id: u32) -> MonsterConfig {
        if let Some(monster) = self.configs.monster(monster_id) {
            return monster.clone();
        }
        if self.warned_missing.insert(monster_id) {
            log::warn!("monster {monster_id} has no config; spawning stats-only fallback");
        }
        MonsterConfig {
            monster_id,
            name: format!("monster-{monster_id}"),
            max_hp: 10,
            attack: 1,
            defense: 0,
            crit_chance: 0.0,
            crit_damage: 1.5,
            move_speed: 1.0,
            exp_reward: 0,
            drop_table_id: 0,
            template: None,
        }
    }
}
