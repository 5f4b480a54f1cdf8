//! Session state types.

/// The session phase. Mutated exclusively by
/// [`GameSession`](super::logic::GameSession); the single source of truth
/// for which subsystems are active.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GamePhase {
    MainMenu,
    /// Transient: entered and left within the same `start_game` call.
    Loading,
    InGame,
    Paused,
    /// Post-session: rewards/losses finalized and displayed.
    Settlement,
}

/// Simulation clock scale. Frozen while paused or settling; the wave
/// scheduler and all timed gameplay read time through this.
#[derive(Debug, Clone, Copy)]
pub struct SessionClock {
    time_scale: f64,
}

impl Default for SessionClock {
    fn default() -> Self {
        Self { time_scale: 1.0 }
    }
}

impl SessionClock {
    pub fn freeze(&mut self) {
        self.time_scale = 0.0;
    }

    pub fn unfreeze(&mut self) {
        self.time_scale = 1.0;
    }

    pub fn is_frozen(&self) -> bool {
        self.time_scale == 0.0
    }

    pub fn scale(&self) -> f64 {
        self.time_scale
    }
}

/// An item stack gained during the session, for the settlement screen.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LootEntry {
    pub item_id: u32,
    pub count: u32,
}

/// Everything earned during the current session. Reverted (partially) on
/// defeat, snapshotted into the settlement summary on session end.
#[derive(Debug, Clone, Default)]
pub struct SessionLedger {
    pub gold_earned: u64,
    pub exp_earned: u64,
    pub loot: Vec<LootEntry>,
    pub kills: u32,
}

impl SessionLedger {
    pub fn reset(&mut self) {
        *self = Self::default();
    }

    pub fn add_loot(&mut self, item_id: u32, count: u32) {
        if let Some(entry) = self.loot.iter_mut().find(|e| e.item_id == item_id) {
            entry.count += count;
        } else {
            self.loot.push(LootEntry { item_id, count });
        }
    }
}

/// Final outcome of a session, kept for the settlement screen.
#[derive(Debug, Clone)]
pub struct SettlementSummary {
    pub victory: bool,
    pub level_id: u32,
    pub reward_gold: u64,
    pub reward_exp: u64,
    pub loot: Vec<LootEntry>,
    pub kills: u32,
}

/// Mailbox written by bus handlers and drained by the session on its own
/// tick, so no handler ever needs a mutable borrow of the session itself.
#[derive(Debug, Default)]
pub struct SessionSignals {
    pub player_killed: bool,
    /// (monster_id, drop_table_id) per kill, in arrival order.
    pub kills: Vec<(u32, u32)>,
}
