//! The session state machine.
//!
//! `GameSession` owns the session lifecycle: it drives the wave scheduler,
//! settles rewards and failure-retain economics, and checkpoints progression
//! through the persistence store on every significant transition. It is
//! constructed by a composition root that builds the event bus first; there
//! are no global accessors.

use std::cell::RefCell;
use std::rc::Rc;

use rand::Rng;

use super::types::{
    GamePhase, SessionClock, SessionLedger, SessionSignals, SettlementSummary,
};
use crate::config::types::{DropKind, LevelConfig};
use crate::config::ConfigDb;
use crate::constants::{
    AUTOSAVE_INTERVAL_SECONDS, DEFAULT_ALIVE_CAP, FALLBACK_REWARD_EXP_BASE,
    FALLBACK_REWARD_EXP_PER_LEVEL, FALLBACK_REWARD_GOLD_BASE, FALLBACK_REWARD_GOLD_PER_LEVEL,
};
use crate::events::bus::{EventBus, SubscriptionId};
use crate::events::types::{EventKind, GameEvent};
use crate::persistence::store::{PersistenceStore, SaveStorage};
use crate::persistence::types::{EquipmentRecord, PlayerRecord, SettingsRecord};
use crate::waves::scheduler::WaveScheduler;
use crate::waves::types::MonsterSpawner;

/// Top-level session controller and state machine.
///
/// Valid transitions: `MainMenu → Loading → InGame ⇄ Paused → Settlement →
/// MainMenu | Loading`. Requests that don't match the current phase are
/// no-ops, never errors.
pub struct GameSession<S: SaveStorage> {
    bus: Rc<EventBus>,
    configs: Rc<ConfigDb>,
    store: PersistenceStore<S>,
    phase: GamePhase,
    clock: SessionClock,

    // Live runtime state, synchronized with the store via capture/apply.
    player: PlayerRecord,
    equipment: EquipmentRecord,
    settings: SettingsRecord,

    scheduler: Option<Rc<RefCell<WaveScheduler>>>,
    scheduler_kill_sub: Option<SubscriptionId>,
    signals: Rc<RefCell<SessionSignals>>,

    current_level_id: u32,
    last_level_id: u32,
    ledger: SessionLedger,
    settlement: Option<SettlementSummary>,
    alive_cap: u32,

    play_time_seconds: f64,
    autosave_timer: f64,
}

impl<S: SaveStorage> GameSession<S> {
    /// Builds a session against an already-constructed bus and config
    /// database, loading progression from storage.
    pub fn new(bus: Rc<EventBus>, configs: Rc<ConfigDb>, storage: S) -> Self {
        let mut store = PersistenceStore::new(storage);
        store.load();

        let mut player = PlayerRecord::default();
        let mut equipment = EquipmentRecord::default();
        let mut settings = SettingsRecord::default();
        store.apply(&mut player, &mut equipment, &mut settings);
        let play_time_seconds = store.blob().play_time_seconds as f64;

        let signals = Rc::new(RefCell::new(SessionSignals::default()));
        {
            let signals = Rc::clone(&signals);
            bus.subscribe(EventKind::MonsterKilled, move |ev| {
                if let GameEvent::MonsterKilled {
                    monster_id,
                    drop_table_id,
                    ..
                } = ev
                {
                    signals.borrow_mut().kills.push((*monster_id, *drop_table_id));
                }
            });
        }
        {
            let signals = Rc::clone(&signals);
            bus.subscribe(EventKind::PlayerKilled, move |_| {
                signals.borrow_mut().player_killed = true;
            });
        }

        Self {
            bus,
            configs,
            store,
            phase: GamePhase::MainMenu,
            clock: SessionClock::default(),
            player,
            equipment,
            settings,
            scheduler: None,
            scheduler_kill_sub: None,
            signals,
            current_level_id: 0,
            last_level_id: 1,
            ledger: SessionLedger::default(),
            settlement: None,
            alive_cap: DEFAULT_ALIVE_CAP,
            play_time_seconds,
            autosave_timer: 0.0,
        }
    }

    // ── Lifecycle operations ────────────────────────────────────────────

    /// Starts a level. The requested id is clamped into
    /// `[1, unlocked_level_id]` (never above the highest configured level);
    /// an unconfigured level falls back to level 1 rather than blocking.
    pub fn start_game(&mut self, level_id: u32) {
        if !matches!(self.phase, GamePhase::MainMenu | GamePhase::Settlement) {
            log::debug!("start_game ignored in phase {:?}", self.phase);
            return;
        }

        let level = self.pick_level(level_id);
        let chosen_id = level.level_id;

        self.ledger.reset();
        self.settlement = None;
        self.signals.borrow_mut().player_killed = false;
        self.signals.borrow_mut().kills.clear();
        self.clock.unfreeze();

        // Crash-safety checkpoint before the world gets torn down/rebuilt.
        self.checkpoint();

        self.set_phase(GamePhase::Loading);

        let scheduler = Rc::new(RefCell::new(WaveScheduler::new(
            level,
            Rc::clone(&self.configs),
            self.alive_cap,
        )));
        let sub = {
            let scheduler = Rc::clone(&scheduler);
            self.bus.subscribe(EventKind::MonsterKilled, move |_| {
                scheduler.borrow_mut().notify_kill();
            })
        };
        self.scheduler = Some(scheduler);
        self.scheduler_kill_sub = Some(sub);
        self.current_level_id = chosen_id;
        self.last_level_id = chosen_id;

        self.set_phase(GamePhase::InGame);
    }

    /// Freezes the simulation clock. Valid only from `InGame`.
    pub fn pause_game(&mut self) {
        if self.phase != GamePhase::InGame {
            return;
        }
        self.clock.freeze();
        if let Some(scheduler) = &self.scheduler {
            scheduler.borrow_mut().set_suspended(true);
        }
        self.set_phase(GamePhase::Paused);
        self.bus.publish(&GameEvent::GamePaused);
    }

    /// Unfreezes the simulation clock. Valid only from `Paused`.
    pub fn resume_game(&mut self) {
        if self.phase != GamePhase::Paused {
            return;
        }
        self.clock.unfreeze();
        if let Some(scheduler) = &self.scheduler {
            scheduler.borrow_mut().set_suspended(false);
        }
        self.set_phase(GamePhase::InGame);
        self.bus.publish(&GameEvent::GameResumed);
    }

    /// Ends the running session and settles the economy.
    ///
    /// Victory applies the level's configured reward (or a deterministic
    /// level-scaled fallback) and unlocks the next level. Defeat keeps only
    /// the configured retain fraction of session earnings.
    pub fn end_game(&mut self, victory: bool) {
        if !matches!(self.phase, GamePhase::InGame | GamePhase::Paused) {
            return;
        }
        self.clock.freeze();
        self.detach_scheduler();

        let level_id = self.current_level_id;
        let (reward_gold, reward_exp) = if victory {
            let reward = self.victory_reward(level_id);
            self.add_gold(reward.0 as i64);
            self.player.exp += reward.1;
            let unlocked = (level_id + 1).min(self.configs.max_level_id().max(level_id));
            if unlocked > self.player.unlocked_level_id {
                self.player.unlocked_level_id = unlocked;
            }
            reward
        } else {
            self.apply_defeat_retain()
        };

        self.settlement = Some(SettlementSummary {
            victory,
            level_id,
            reward_gold,
            reward_exp,
            loot: self.ledger.loot.clone(),
            kills: self.ledger.kills,
        });

        self.set_phase(GamePhase::Settlement);
        let event = if victory {
            GameEvent::LevelCompleted {
                reward_gold,
                reward_exp,
                level_id,
            }
        } else {
            GameEvent::LevelFailed {
                reward_gold,
                reward_exp,
                level_id,
            }
        };
        self.bus.publish(&event);
        self.checkpoint();
    }

    /// Returns to the main menu from anywhere, checkpointing progression.
    pub fn load_main_menu(&mut self) {
        if self.phase == GamePhase::MainMenu {
            return;
        }
        self.clock.unfreeze();
        self.detach_scheduler();
        self.ledger.reset();
        self.settlement = None;
        self.checkpoint();
        self.set_phase(GamePhase::MainMenu);
    }

    /// Plays the last played level again.
    pub fn retry_level(&mut self) {
        self.start_game(self.last_level_id);
    }

    /// Per-frame hook, called by the owning runtime loop.
    ///
    /// Drains kill signals (exp and drop-table rolls), reacts to player
    /// death, advances the wave scheduler, detects victory, and autosaves
    /// on a fixed cadence. Does nothing unless `InGame`.
    pub fn on_tick(&mut self, dt: f64, spawner: &mut dyn MonsterSpawner, rng: &mut impl Rng) {
        if self.phase != GamePhase::InGame {
            return;
        }
        let dt = dt * self.clock.scale();
        self.play_time_seconds += dt;
        self.autosave_timer += dt;

        // Kill decrements already happened synchronously during publish;
        // grants and drops settle here, before the clear-check below.
        let (kills, player_killed) = {
            let mut signals = self.signals.borrow_mut();
            let kills = std::mem::take(&mut signals.kills);
            let player_killed = std::mem::replace(&mut signals.player_killed, false);
            (kills, player_killed)
        };
        for (monster_id, drop_table_id) in kills {
            self.settle_kill(monster_id, drop_table_id, rng);
        }
        if player_killed {
            self.end_game(false);
            return;
        }

        let events = match &self.scheduler {
            Some(scheduler) => scheduler.borrow_mut().tick(spawner),
            None => Vec::new(),
        };
        for event in &events {
            self.bus.publish(event);
        }
        if let Some(scheduler) = &self.scheduler {
            if scheduler.borrow().is_victory() {
                self.end_game(true);
                return;
            }
        }

        if self.autosave_timer >= AUTOSAVE_INTERVAL_SECONDS {
            self.autosave_timer = 0.0;
            self.checkpoint();
        }
    }

    // ── Accessors ───────────────────────────────────────────────────────

    pub fn phase(&self) -> GamePhase {
        self.phase
    }

    pub fn player(&self) -> &PlayerRecord {
        &self.player
    }

    pub fn equipment(&self) -> &EquipmentRecord {
        &self.equipment
    }

    pub fn settings(&self) -> &SettingsRecord {
        &self.settings
    }

    pub fn settings_mut(&mut self) -> &mut SettingsRecord {
        &mut self.settings
    }

    pub fn settlement(&self) -> Option<&SettlementSummary> {
        self.settlement.as_ref()
    }

    /// Level currently (or last) being played.
    pub fn current_level_id(&self) -> u32 {
        self.current_level_id
    }

    pub fn scheduler(&self) -> Option<&Rc<RefCell<WaveScheduler>>> {
        self.scheduler.as_ref()
    }

    pub fn store(&self) -> &PersistenceStore<S> {
        &self.store
    }

    pub fn is_clock_frozen(&self) -> bool {
        self.clock.is_frozen()
    }

    /// The damage multiplier for a skill slot, resolved against config and
    /// the player's learned level.
    pub fn skill_multiplier(&self, slot: usize) -> f64 {
        let level = self
            .player
            .skill_levels
            .get(slot)
            .copied()
            .unwrap_or(0);
        let skill_id = slot as u32 + 1;
        match self.configs.skill(skill_id) {
            Some(skill) => skill.multiplier_at(level),
            None => 1.0,
        }
    }

    // ── Internals ───────────────────────────────────────────────────────

    fn set_phase(&mut self, phase: GamePhase) {
        self.phase = phase;
        self.bus
            .publish(&GameEvent::GameStateChanged { new_state: phase });
    }

    /// Clamps the requested level into the playable range and resolves its
    /// config, falling back so that play is never blocked.
    fn pick_level(&self, requested: u32) -> LevelConfig {
        let max_level = self.configs.max_level_id();
        let mut upper = self.player.unlocked_level_id.max(1);
        if max_level > 0 {
            upper = upper.min(max_level);
        }
        let clamped = requested.clamp(1, upper);

        if let Some(level) = self.configs.level(clamped) {
            return level.clone();
        }
        log::warn!("level {clamped} has no config; falling back to level 1");
        match self.configs.level(1) {
            Some(level) => level.clone(),
            None => LevelConfig::empty(1),
        }
    }

    fn victory_reward(&self, level_id: u32) -> (u64, u64) {
        let level = self.configs.level(level_id);
        let gold = level.and_then(|l| l.reward_gold).unwrap_or_else(|| {
            FALLBACK_REWARD_GOLD_BASE + FALLBACK_REWARD_GOLD_PER_LEVEL * level_id as u64
        });
        let exp = level.and_then(|l| l.reward_exp).unwrap_or_else(|| {
            FALLBACK_REWARD_EXP_BASE + FALLBACK_REWARD_EXP_PER_LEVEL * level_id as u64
        });
        (gold, exp)
    }

    /// Defeat economics: keep the retain fraction of session earnings and
    /// revert the rest. Returns what was kept.
    fn apply_defeat_retain(&mut self) -> (u64, u64) {
        let economy = self.configs.economy();
        let gold_kept = (self.ledger.gold_earned as f64 * economy.clamped_gold_retain()) as u64;
        let exp_kept = (self.ledger.exp_earned as f64 * economy.clamped_exp_retain()) as u64;

        let gold_reverted = self.ledger.gold_earned - gold_kept;
        let exp_reverted = self.ledger.exp_earned - exp_kept;
        if gold_reverted > 0 {
            self.add_gold(-(gold_reverted as i64));
        }
        self.player.exp = self.player.exp.saturating_sub(exp_reverted);

        (gold_kept, exp_kept)
    }

    /// Grants a kill's exp and rolls its drop table.
    fn settle_kill(&mut self, monster_id: u32, drop_table_id: u32, rng: &mut impl Rng) {
        self.ledger.kills += 1;

        if let Some(monster) = self.configs.monster(monster_id) {
            self.player.exp += monster.exp_reward;
            self.ledger.exp_earned += monster.exp_reward;
        }

        let Some(table) = self.configs.drop_table(drop_table_id).cloned() else {
            return;
        };
        for entry in &table.entries {
            if rng.gen::<f64>() >= entry.chance {
                continue;
            }
            match entry.kind {
                DropKind::Gold => {
                    self.ledger.gold_earned += entry.amount as u64;
                    self.add_gold(entry.amount as i64);
                }
                DropKind::Potion => {
                    self.player.potion_count += entry.amount;
                }
                DropKind::Equipment => {
                    self.equipment.add_item(entry.item_id, entry.amount);
                    self.ledger.add_loot(entry.item_id, entry.amount);
                }
                DropKind::Unknown => {
                    log::debug!(
                        "skipping unknown drop kind in table {}",
                        table.table_id
                    );
                }
            }
        }
    }

    fn add_gold(&mut self, delta: i64) {
        if delta >= 0 {
            self.player.gold += delta as u64;
        } else {
            self.player.gold = self.player.gold.saturating_sub((-delta) as u64);
        }
        self.bus.publish(&GameEvent::GoldChanged {
            total_gold: self.player.gold,
            delta,
        });
    }

    fn detach_scheduler(&mut self) {
        if let Some(scheduler) = self.scheduler.take() {
            scheduler.borrow_mut().cancel();
        }
        if let Some(sub) = self.scheduler_kill_sub.take() {
            self.bus.unsubscribe(EventKind::MonsterKilled, sub);
        }
    }

    /// Capture-then-save, strictly in that order. Save failures are logged
    /// and swallowed; the next checkpoint may succeed.
    fn checkpoint(&mut self) {
        let now = chrono::Utc::now().timestamp();
        let play_time = self.play_time_seconds as u64;
        self.store.capture(
            &self.player,
            &self.equipment,
            &self.settings,
            now,
            play_time,
        );
        if let Err(err) = self.store.save() {
            log::warn!("progression save failed: {err}; continuing without it");
        }
    }
}
