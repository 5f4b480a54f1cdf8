//! Cross-reference integrity checks, run once after all documents load.
//!
//! Every finding is a warning: dangling references are resolved lazily at
//! spawn/roll time with fallbacks, so content problems never block play.

use super::types::DropKind;
use super::ConfigDb;
use crate::constants::DEFAULT_ALIVE_CAP;

/// Validates cross-references between documents and returns the findings.
/// Each finding is also logged through the `log` facade.
pub fn validate(db: &ConfigDb) -> Vec<String> {
    let mut warnings = Vec::new();

    for level in db.levels() {
        for wave in &level.waves {
            for entry in &wave.entries {
                if db.monster(entry.monster_id).is_none() {
                    warnings.push(format!(
                        "level {} wave {} references unknown monster {}",
                        level.level_id, wave.wave_id, entry.monster_id
                    ));
                }
            }
            let total = wave.total_count();
            if total > DEFAULT_ALIVE_CAP {
                warnings.push(format!(
                    "level {} wave {} spawns {} monsters, above the alive cap {}",
                    level.level_id, wave.wave_id, total, DEFAULT_ALIVE_CAP
                ));
            }
        }
        if let Some(boss) = &level.boss {
            if db.monster(boss.monster_id).is_none() {
                warnings.push(format!(
                    "level {} boss references unknown monster {}",
                    level.level_id, boss.monster_id
                ));
            }
        }
    }

    for monster in db.monsters() {
        if db.drop_table(monster.drop_table_id).is_none() {
            warnings.push(format!(
                "monster {} references unknown drop table {}",
                monster.monster_id, monster.drop_table_id
            ));
        }
    }

    for table in db.drop_tables() {
        for entry in &table.entries {
            if entry.kind == DropKind::Unknown {
                warnings.push(format!(
                    "drop table {} contains an unknown drop kind; entry will be skipped",
                    table.table_id
                ));
            }
            if !(0.0..=1.0).contains(&entry.chance) {
                warnings.push(format!(
                    "drop table {} entry has chance {} outside [0, 1]",
                    table.table_id, entry.chance
                ));
            }
        }
    }

    let economy = db.economy();
    for (name, ratio) in [
        ("gold_retain_ratio", economy.gold_retain_ratio),
        ("exp_retain_ratio", economy.exp_retain_ratio),
    ] {
        if !(0.0..=1.0).contains(&ratio) {
            warnings.push(format!("{name} {ratio} outside [0, 1]; will be clamped"));
        }
    }

    for warning in &warnings {
        log::warn!("config: {warning}");
    }
    warnings
}
