//! Headless session simulator.
//!
//! Wires the composition root (bus → configs → session) against an
//! in-process arena and runs one level end-to-end without any rendering.
//! Useful for balance checks and for exercising the orchestration core.
//!
//! Usage:
//!   cargo run --bin simulate -- [--level N] [--seed N] [--ticks N]

use std::cell::RefCell;
use std::env;
use std::rc::Rc;

use rand::rngs::StdRng;
use rand::SeedableRng;

use skirmish::combat::resolver::resolve_on_bus;
use skirmish::combat::types::CombatStats;
use skirmish::config::types::{
    BossEntry, DropEntry, DropKind, DropTableConfig, EconomyConfig, LevelConfig, MonsterConfig,
    MonsterWaveEntry, SkillConfig, Vec3, WaveConfig,
};
use skirmish::config::{validate, ConfigDb};
use skirmish::events::bus::EventBus;
use skirmish::events::types::{EventKind, GameEvent};
use skirmish::persistence::store::MemoryStorage;
use skirmish::session::logic::GameSession;
use skirmish::session::types::GamePhase;
use skirmish::waves::types::MonsterSpawner;

struct SimConfig {
    level: u32,
    seed: u64,
    max_ticks: u64,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            level: 1,
            seed: 7,
            max_ticks: 100_000,
        }
    }
}

/// A live monster in the arena.
struct ActiveMonster {
    entity_id: u64,
    monster_id: u32,
    drop_table_id: u32,
    position: Vec3,
    stats: CombatStats,
}

/// Minimal stand-in for the game world: holds spawned monsters and trades
/// blows with the player each tick.
#[derive(Default)]
struct Arena {
    monsters: Vec<ActiveMonster>,
    next_entity_id: u64,
}

impl MonsterSpawner for Arena {
    fn spawn(&mut self, monster: &MonsterConfig, position: Vec3) -> u64 {
        self.next_entity_id += 1;
        self.monsters.push(ActiveMonster {
            entity_id: self.next_entity_id,
            monster_id: monster.monster_id,
            drop_table_id: monster.drop_table_id,
            position,
            stats: CombatStats::new(monster.max_hp, monster.attack, monster.defense)
                .with_crit(monster.crit_chance, monster.crit_damage),
        });
        self.next_entity_id
    }
}

fn main() {
    let _ = env_logger::Builder::from_env(
        env_logger::Env::default().default_filter_or("info"),
    )
    .format_timestamp(None)
    .try_init();

    let sim = parse_args(&env::args().collect::<Vec<_>>());
    let mut rng = StdRng::seed_from_u64(sim.seed);

    // Composition root: bus first, then configs, then the session.
    let bus = Rc::new(EventBus::with_all_registered());
    let configs = Rc::new(demo_configs());
    let warnings = validate::validate(&configs);
    if !warnings.is_empty() {
        log::warn!("{} config warning(s)", warnings.len());
    }

    let wave_events = Rc::new(RefCell::new(0u32));
    for kind in [
        EventKind::WaveStarted,
        EventKind::WaveCompleted,
        EventKind::BossSpawned,
    ] {
        let wave_events = Rc::clone(&wave_events);
        bus.subscribe(kind, move |ev| {
            *wave_events.borrow_mut() += 1;
            log::info!("{ev:?}");
        });
    }

    let mut session = GameSession::new(Rc::clone(&bus), Rc::clone(&configs), MemoryStorage::new());
    let mut arena = Arena::default();
    let mut player = CombatStats::new(120, 15, 10).with_crit(0.2, 1.5);
    let skill_multiplier = session.skill_multiplier(0);

    session.start_game(sim.level);

    let mut ticks = 0u64;
    while session.phase() == GamePhase::InGame && ticks < sim.max_ticks {
        session.on_tick(0.1, &mut arena, &mut rng);
        ticks += 1;

        // Player swings at the front monster.
        if let Some(target) = arena.monsters.first_mut() {
            let outcome = resolve_on_bus(
                &bus,
                Some(&player),
                Some(&target.stats),
                skill_multiplier,
                target.entity_id,
                &mut rng,
            );
            target.stats.apply_damage(outcome.damage);
            if !target.stats.is_alive() {
                let dead = arena.monsters.remove(0);
                bus.publish(&GameEvent::MonsterKilled {
                    monster_id: dead.monster_id,
                    position: dead.position,
                    drop_table_id: dead.drop_table_id,
                });
            }
        }

        // Everyone still standing swings back.
        let mut incoming = 0u32;
        for monster in &arena.monsters {
            let outcome = resolve_on_bus(
                &bus,
                Some(&monster.stats),
                Some(&player),
                1.0,
                0,
                &mut rng,
            );
            incoming += outcome.damage;
        }
        player.apply_damage(incoming);
        if !player.is_alive() {
            bus.publish(&GameEvent::PlayerKilled { player_id: 0 });
        }
    }

    if session.phase() == GamePhase::InGame {
        log::warn!("tick limit reached; abandoning session");
        session.load_main_menu();
    }

    println!();
    println!("Simulation finished after {ticks} ticks");
    match session.settlement() {
        Some(result) => {
            println!(
                "  {}: level {} | +{} gold, +{} exp | {} kills, {} loot stack(s)",
                if result.victory { "VICTORY" } else { "DEFEAT" },
                result.level_id,
                result.reward_gold,
                result.reward_exp,
                result.kills,
                result.loot.len(),
            );
        }
        None => println!("  no settlement (session abandoned)"),
    }
    println!(
        "  player: {} gold, {} exp, unlocked up to level {}",
        session.player().gold,
        session.player().exp,
        session.player().unlocked_level_id,
    );
    println!("  wave/boss events observed: {}", wave_events.borrow());
}

fn parse_args(args: &[String]) -> SimConfig {
    let mut sim = SimConfig::default();
    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--level" => {
                if i + 1 < args.len() {
                    sim.level = args[i + 1].parse().unwrap_or(1);
                    i += 1;
                }
            }
            "--seed" => {
                if i + 1 < args.len() {
                    sim.seed = args[i + 1].parse().unwrap_or(7);
                    i += 1;
                }
            }
            "--ticks" => {
                if i + 1 < args.len() {
                    sim.max_ticks = args[i + 1].parse().unwrap_or(100_000);
                    i += 1;
                }
            }
            other => {
                eprintln!("unknown argument: {other}");
            }
        }
        i += 1;
    }
    sim
}

/// Built-in demo content: two levels, three monster types, simple drops.
fn demo_configs() -> ConfigDb {
    let spawn_ring = vec![
        Vec3::new(-6.0, 0.0, 0.0),
        Vec3::new(6.0, 0.0, 0.0),
        Vec3::new(0.0, 0.0, 6.0),
    ];
    let levels = vec![
        LevelConfig {
            level_id: 1,
            waves: vec![
                WaveConfig {
                    wave_id: 1,
                    entries: vec![MonsterWaveEntry {
                        monster_id: 1,
                        count: 4,
                        spawn_points: spawn_ring.clone(),
                    }],
                },
                WaveConfig {
                    wave_id: 2,
                    entries: vec![
                        MonsterWaveEntry {
                            monster_id: 1,
                            count: 3,
                            spawn_points: spawn_ring.clone(),
                        },
                        MonsterWaveEntry {
                            monster_id: 2,
                            count: 2,
                            spawn_points: spawn_ring.clone(),
                        },
                    ],
                },
            ],
            boss: Some(BossEntry {
                monster_id: 3,
                spawn_point: Vec3::new(0.0, 0.0, 10.0),
            }),
            reward_gold: Some(120),
            reward_exp: Some(60),
        },
        LevelConfig {
            level_id: 2,
            waves: vec![WaveConfig {
                wave_id: 1,
                entries: vec![MonsterWaveEntry {
                    monster_id: 2,
                    count: 6,
                    spawn_points: spawn_ring,
                }],
            }],
            boss: None,
            reward_gold: None, // exercises the fallback reward formula
            reward_exp: None,
        },
    ];
    let monsters = vec![
        MonsterConfig {
            monster_id: 1,
            name: "Gnawer".to_string(),
            max_hp: 30,
            attack: 4,
            defense: 2,
            crit_chance: 0.05,
            crit_damage: 1.5,
            move_speed: 1.2,
            exp_reward: 5,
            drop_table_id: 1,
            template: Some("gnawer_basic".to_string()),
        },
        MonsterConfig {
            monster_id: 2,
            name: "Husk".to_string(),
            max_hp: 55,
            attack: 7,
            defense: 5,
            crit_chance: 0.05,
            crit_damage: 1.5,
            move_speed: 0.9,
            exp_reward: 9,
            drop_table_id: 1,
            template: Some("husk_basic".to_string()),
        },
        MonsterConfig {
            monster_id: 3,
            name: "Gravewarden".to_string(),
            max_hp: 220,
            attack: 12,
            defense: 10,
            crit_chance: 0.1,
            crit_damage: 2.0,
            move_speed: 0.8,
            exp_reward: 40,
            drop_table_id: 2,
            template: None, // falls back to the capsule body in-engine
        },
    ];
    let skills = vec![
        SkillConfig {
            skill_id: 1,
            name: "Cleave".to_string(),
            base_multiplier: 1.2,
            per_level_bonus: 0.1,
        },
        SkillConfig {
            skill_id: 2,
            name: "Stormcall".to_string(),
            base_multiplier: 2.0,
            per_level_bonus: 0.25,
        },
    ];
    let drop_tables = vec![
        DropTableConfig {
            table_id: 1,
            entries: vec![
                DropEntry {
                    kind: DropKind::Gold,
                    item_id: 0,
                    amount: 3,
                    chance: 0.8,
                },
                DropEntry {
                    kind: DropKind::Potion,
                    item_id: 0,
                    amount: 1,
                    chance: 0.1,
                },
            ],
        },
        DropTableConfig {
            table_id: 2,
            entries: vec![
                DropEntry {
                    kind: DropKind::Gold,
                    item_id: 0,
                    amount: 25,
                    chance: 1.0,
                },
                DropEntry {
                    kind: DropKind::Equipment,
                    item_id: 101,
                    amount: 1,
                    chance: 0.5,
                },
            ],
        },
    ];
    ConfigDb::new(
        levels,
        monsters,
        skills,
        drop_tables,
        EconomyConfig::default(),
    )
}
