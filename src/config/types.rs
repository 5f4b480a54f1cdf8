//! Config document record types.

use serde::{Deserialize, Serialize};

/// World-space position. The core only threads these through to spawn calls
/// and kill events; no geometry happens here.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Vec3 {
    pub x: f32,
    pub y: f32,
    pub z: f32,
}

impl Vec3 {
    pub fn new(x: f32, y: f32, z: f32) -> Self {
        Self { x, y, z }
    }
}

/// One monster type within a wave: how many to spawn and where.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MonsterWaveEntry {
    pub monster_id: u32,
    pub count: u32,
    /// Spawn placement rotates through these points.
    #[serde(default)]
    pub spawn_points: Vec<Vec3>,
}

/// One spawn wave of a level.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WaveConfig {
    pub wave_id: u32,
    pub entries: Vec<MonsterWaveEntry>,
}

impl WaveConfig {
    /// Total monsters this wave will spawn.
    pub fn total_count(&self) -> u32 {
        self.entries.iter().map(|e| e.count).sum()
    }
}

/// Optional boss fought after all waves clear.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BossEntry {
    pub monster_id: u32,
    #[serde(default)]
    pub spawn_point: Vec3,
}

/// A playable level: its waves, optional boss, and completion reward.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LevelConfig {
    pub level_id: u32,
    #[serde(default)]
    pub waves: Vec<WaveConfig>,
    #[serde(default)]
    pub boss: Option<BossEntry>,
    #[serde(default)]
    pub reward_gold: Option<u64>,
    #[serde(default)]
    pub reward_exp: Option<u64>,
}

impl LevelConfig {
    /// Synthesized empty level used when even the fallback level is missing.
    /// Finishes immediately, so a broken content build still never blocks play.
    pub fn empty(level_id: u32) -> Self {
        Self {
            level_id,
            waves: Vec::new(),
            boss: None,
            reward_gold: None,
            reward_exp: None,
        }
    }
}

/// A spawnable monster type.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MonsterConfig {
    pub monster_id: u32,
    pub name: String,
    pub max_hp: u32,
    pub attack: u32,
    pub defense: u32,
    #[serde(default)]
    pub crit_chance: f64,
    #[serde(default = "default_crit_damage")]
    pub crit_damage: f64,
    #[serde(default = "default_move_speed")]
    pub move_speed: f64,
    pub exp_reward: u64,
    pub drop_table_id: u32,
    /// Visual prefab name; `None` means the stats-only fallback body.
    #[serde(default)]
    pub template: Option<String>,
}

fn default_crit_damage() -> f64 {
    1.5
}

fn default_move_speed() -> f64 {
    1.0
}

/// An active skill. The damage multiplier fed into combat resolution is
/// `base_multiplier + per_level_bonus * (level - 1)`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SkillConfig {
    pub skill_id: u32,
    pub name: String,
    pub base_multiplier: f64,
    #[serde(default)]
    pub per_level_bonus: f64,
}

impl SkillConfig {
    pub fn multiplier_at(&self, level: u32) -> f64 {
        if level == 0 {
            return 1.0;
        }
        self.base_multiplier + self.per_level_bonus * (level - 1) as f64
    }
}

/// What a drop entry yields.
///
/// Unrecognized kinds from newer content documents deserialize as `Unknown`
/// and are warned about and skipped when rolled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DropKind {
    Gold,
    Potion,
    Equipment,
    #[serde(other)]
    Unknown,
}

/// One weighted entry of a drop table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DropEntry {
    pub kind: DropKind,
    /// Equipment item id; unused for gold/potion drops.
    #[serde(default)]
    pub item_id: u32,
    /// Gold amount or item count.
    #[serde(default = "default_amount")]
    pub amount: u32,
    /// Independent roll probability in [0, 1].
    pub chance: f64,
}

fn default_amount() -> u32 {
    1
}

/// A monster's loot table; every entry rolls independently.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DropTableConfig {
    pub table_id: u32,
    pub entries: Vec<DropEntry>,
}

/// Failure-retain economics for defeated sessions.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EconomyConfig {
    pub gold_retain_ratio: f64,
    pub exp_retain_ratio: f64,
}

impl Default for EconomyConfig {
    fn default() -> Self {
        Self {
            gold_retain_ratio: 0.5,
            exp_retain_ratio: 0.5,
        }
    }
}

impl EconomyConfig {
    /// Ratios as actually applied: clamped into [0, 1]. Out-of-range values
    /// in content documents are a warning, not a failure.
    pub fn clamped_gold_retain(&self) -> f64 {
        self.gold_retain_ratio.clamp(0.0, 1.0)
    }

    pub fn clamped_exp_retain(&self) -> f64 {
        self.exp_retain_ratio.clamp(0.0, 1.0)
    }
}
