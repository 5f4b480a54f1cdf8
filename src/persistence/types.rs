//! Save blob schema.
//!
//! Versioning rules: fields added in later schema versions carry
//! `#[serde(default)]` so older blobs backfill instead of failing to load,
//! and the stored version number never decreases. Version 2 added
//! `player.profession` and the quality/fps/language settings.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::constants::NUM_SKILL_SLOTS;

/// Current schema version written by this build.
pub const SAVE_SCHEMA_VERSION: u32 = 2;

/// Player progression record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlayerRecord {
    pub gold: u64,
    pub exp: u64,
    pub level: u32,
    pub unlocked_level_id: u32,
    pub potion_count: u32,
    pub skill_levels: [u32; NUM_SKILL_SLOTS],
    /// Added in schema v2.
    #[serde(default = "default_profession")]
    pub profession: String,
}

fn default_profession() -> String {
    "warrior".to_string()
}

impl Default for PlayerRecord {
    fn default() -> Self {
        Self {
            gold: 0,
            exp: 0,
            level: 1,
            unlocked_level_id: 1,
            potion_count: 0,
            skill_levels: [1, 0],
            profession: default_profession(),
        }
    }
}

/// Equipment slots an item can be equipped into.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum EquipSlot {
    Weapon,
    Armor,
    Helmet,
    Boots,
    Amulet,
    Ring,
}

/// Inventory and equipped-item record.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EquipmentRecord {
    /// item id → owned count.
    #[serde(default)]
    pub inventory: BTreeMap<u32, u32>,
    /// slot → equipped item id.
    #[serde(default)]
    pub equipped: BTreeMap<EquipSlot, u32>,
}

impl EquipmentRecord {
    /// Adds `count` of an item to the inventory.
    pub fn add_item(&mut self, item_id: u32, count: u32) {
        *self.inventory.entry(item_id).or_insert(0) += count;
    }

    /// Equips an owned item into a slot. The previously equipped item (if
    /// any) goes back to the inventory. Returns false when the item is not
    /// in the inventory.
    pub fn equip(&mut self, slot: EquipSlot, item_id: u32) -> bool {
        match self.inventory.get_mut(&item_id) {
            Some(count) if *count > 0 => {
                *count -= 1;
                if *count == 0 {
                    self.inventory.remove(&item_id);
                }
            }
            _ => return false,
        }
        if let Some(previous) = self.equipped.insert(slot, item_id) {
            self.add_item(previous, 1);
        }
        true
    }

    /// Unequips a slot, returning the item to the inventory.
    pub fn unequip(&mut self, slot: EquipSlot) {
        if let Some(item_id) = self.equipped.remove(&slot) {
            self.add_item(item_id, 1);
        }
    }
}

/// Audio/video/locale settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SettingsRecord {
    pub bgm_volume: f64,
    pub sfx_volume: f64,
    /// Added in schema v2.
    #[serde(default = "default_quality_level")]
    pub quality_level: u32,
    /// Added in schema v2.
    #[serde(default = "default_target_fps")]
    pub target_fps: u32,
    /// Added in schema v2.
    #[serde(default = "default_language")]
    pub language: String,
}

fn default_quality_level() -> u32 {
    2
}

fn default_target_fps() -> u32 {
    60
}

fn default_language() -> String {
    "en".to_string()
}

impl Default for SettingsRecord {
    fn default() -> Self {
        Self {
            bgm_volume: 0.8,
            sfx_volume: 0.8,
            quality_level: default_quality_level(),
            target_fps: default_target_fps(),
            language: default_language(),
        }
    }
}

/// The single persisted record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SaveBlob {
    pub version: u32,
    #[serde(default)]
    pub player: PlayerRecord,
    #[serde(default)]
    pub equipment: EquipmentRecord,
    #[serde(default)]
    pub settings: SettingsRecord,
    /// Unix seconds of the last capture.
    #[serde(default)]
    pub last_save_time: i64,
    #[serde(default)]
    pub play_time_seconds: u64,
}

impl Default for SaveBlob {
    fn default() -> Self {
        Self {
            version: SAVE_SCHEMA_VERSION,
            player: PlayerRecord::default(),
            equipment: EquipmentRecord::default(),
            settings: SettingsRecord::default(),
            last_save_time: 0,
            play_time_seconds: 0,
        }
    }
}
