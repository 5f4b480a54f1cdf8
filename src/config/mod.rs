//! Read-only game content configuration.
//!
//! Level, monster, skill, drop-table, and economy documents are loaded once
//! at startup into a [`ConfigDb`] and never mutated afterwards. Dangling
//! cross-references are validation warnings, not hard failures; they get
//! resolved with fallbacks lazily at spawn/roll time.

pub mod types;
pub mod validate;

use std::collections::HashMap;

use thiserror::Error;

use types::{DropTableConfig, EconomyConfig, LevelConfig, MonsterConfig, SkillConfig};

/// A config document failed to parse. Unlike content-level problems this is
/// a broken build, so it is the one hard error in the config layer.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to parse {document} config: {source}")]
    Parse {
        document: &'static str,
        #[source]
        source: serde_json::Error,
    },
}

/// Immutable lookup tables for all game content.
#[derive(Debug, Default)]
pub struct ConfigDb {
    levels: HashMap<u32, LevelConfig>,
    monsters: HashMap<u32, MonsterConfig>,
    skills: HashMap<u32, SkillConfig>,
    drop_tables: HashMap<u32, DropTableConfig>,
    economy: EconomyConfig,
    max_level_id: u32,
}

impl ConfigDb {
    /// Builds a database from already-deserialized documents.
    pub fn new(
        levels: Vec<LevelConfig>,
        monsters: Vec<MonsterConfig>,
        skills: Vec<SkillConfig>,
        drop_tables: Vec<DropTableConfig>,
        economy: EconomyConfig,
    ) -> Self {
        let max_level_id = levels.iter().map(|l| l.level_id).max().unwrap_or(0);
        Self {
            levels: levels.into_iter().map(|l| (l.level_id, l)).collect(),
            monsters: monsters.into_iter().map(|m| (m.monster_id, m)).collect(),
            skills: skills.into_iter().map(|s| (s.skill_id, s)).collect(),
            drop_tables: drop_tables.into_iter().map(|d| (d.table_id, d)).collect(),
            economy,
            max_level_id,
        }
    }

    /// Parses the five JSON documents and builds the database.
    pub fn from_json(
        levels: &str,
        monsters: &str,
        skills: &str,
        drop_tables: &str,
        economy: &str,
    ) -> Result<Self, ConfigError> {
        let parse = |document, err| ConfigError::Parse {
            document,
            source: err,
        };
        Ok(Self::new(
            serde_json::from_str(levels).map_err(|e| parse("level", e))?,
            serde_json::from_str(monsters).map_err(|e| parse("monster", e))?,
            serde_json::from_str(skills).map_err(|e| parse("skill", e))?,
            serde_json::from_str(drop_tables).map_err(|e| parse("drop table", e))?,
            serde_json::from_str(economy).map_err(|e| parse("economy", e))?,
        ))
    }

    pub fn level(&self, level_id: u32) -> Option<&LevelConfig> {
        self.levels.get(&level_id)
    }

    pub fn monster(&self, monster_id: u32) -> Option<&MonsterConfig> {
        self.monsters.get(&monster_id)
    }

    pub fn skill(&self, skill_id: u32) -> Option<&SkillConfig> {
        self.skills.get(&skill_id)
    }

    pub fn drop_table(&self, table_id: u32) -> Option<&DropTableConfig> {
        self.drop_tables.get(&table_id)
    }

    /// Highest configured level id, 0 when no levels are configured.
    pub fn max_level_id(&self) -> u32 {
        self.max_level_id
    }

    pub fn economy(&self) -> &EconomyConfig {
        &self.economy
    }

    pub fn levels(&self) -> impl Iterator<Item = &LevelConfig> {
        self.levels.values()
    }

    pub fn monsters(&self) -> impl Iterator<Item = &MonsterConfig> {
        self.monsters.values()
    }

    pub fn drop_tables(&self) -> impl Iterator<Item = &DropTableConfig> {
        self.drop_tables.values()
    }
}
