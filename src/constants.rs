//! Game balance and engine constants.

// Combat
/// Defense soft-cap: reduction = defense / (defense + DEFENSE_K).
pub const DEFENSE_K: f64 = 100.0;
/// Every landed hit deals at least this much damage.
pub const MIN_DAMAGE: u32 = 1;

// Wave scheduling
/// Default bound on simultaneously-alive spawned monsters.
pub const DEFAULT_ALIVE_CAP: u32 = 15;

// Session economics
/// Reward fallbacks when a level has no configured reward.
pub const FALLBACK_REWARD_GOLD_BASE: u64 = 30;
pub const FALLBACK_REWARD_GOLD_PER_LEVEL: u64 = 10;
pub const FALLBACK_REWARD_EXP_BASE: u64 = 20;
pub const FALLBACK_REWARD_EXP_PER_LEVEL: u64 = 8;

// Persistence
pub const SAVE_FILE_NAME: &str = "save.json";
pub const AUTOSAVE_INTERVAL_SECONDS: f64 = 30.0;

// Skills
pub const NUM_SKILL_SLOTS: usize = 2;
