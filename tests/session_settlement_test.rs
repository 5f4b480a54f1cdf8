//! Behavior tests for the session state machine: victory/defeat settlement,
//! level clamping, pause rules, and event emission.

use std::cell::RefCell;
use std::rc::Rc;

use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

use skirmish::config::types::{
    BossEntry, DropEntry, DropKind, DropTableConfig, EconomyConfig, LevelConfig, MonsterConfig,
    MonsterWaveEntry, Vec3, WaveConfig,
};
use skirmish::config::ConfigDb;
use skirmish::events::bus::EventBus;
use skirmish::events::types::{EventKind, GameEvent};
use skirmish::persistence::store::MemoryStorage;
use skirmish::persistence::types::SaveBlob;
use skirmish::session::logic::GameSession;
use skirmish::session::types::GamePhase;
use skirmish::waves::types::MonsterSpawner;

// =============================================================================
// Helpers
// =============================================================================

/// Records spawns so the test loop can "fight back" by publishing kills.
struct TestSpawner {
    /// (monster_id, drop_table_id) of entities not yet killed by the test.
    pending: Vec<(u32, u32)>,
    next_id: u64,
}

impl TestSpawner {
    fn new() -> Self {
        Self {
            pending: Vec::new(),
            next_id: 0,
        }
    }
}

impl MonsterSpawner for TestSpawner {
    fn spawn(&mut self, monster: &MonsterConfig, _position: Vec3) -> u64 {
        self.pending.push((monster.monster_id, monster.drop_table_id));
        self.next_id += 1;
        self.next_id
    }
}

fn monster(id: u32, exp_reward: u64, drop_table_id: u32) -> MonsterConfig {
    MonsterConfig {
        monster_id: id,
        name: format!("Monster {id}"),
        max_hp: 10,
        attack: 2,
        defense: 0,
        crit_chance: 0.0,
        crit_damage: 1.5,
        move_speed: 1.0,
        exp_reward,
        drop_table_id,
        template: None,
    }
}

fn wave(wave_id: u32, monster_id: u32, count: u32) -> WaveConfig {
    WaveConfig {
        wave_id,
        entries: vec![MonsterWaveEntry {
            monster_id,
            count,
            spawn_points: vec![],
        }],
    }
}

fn gold_table(table_id: u32, amount: u32) -> DropTableConfig {
    DropTableConfig {
        table_id,
        entries: vec![DropEntry {
            kind: DropKind::Gold,
            item_id: 0,
            amount,
            chance: 1.0,
        }],
    }
}

/// Level 1: one 3-monster wave plus a boss, configured 100 gold / 40 exp.
/// Level 2: one 1-monster wave, no boss, no configured reward.
/// Level 3: placeholder so the max configured level is 3.
fn campaign_configs() -> Rc<ConfigDb> {
    Rc::new(ConfigDb::new(
        vec![
            LevelConfig {
                level_id: 1,
                waves: vec![wave(1, 1, 3)],
                boss: Some(BossEntry {
                    monster_id: 9,
                    spawn_point: Vec3::default(),
                }),
                reward_gold: Some(100),
                reward_exp: Some(40),
            },
            LevelConfig {
                level_id: 2,
                waves: vec![wave(1, 1, 1)],
                boss: None,
                reward_gold: None,
                reward_exp: None,
            },
            LevelConfig {
                level_id: 3,
                waves: vec![wave(1, 1, 1)],
                boss: None,
                reward_gold: None,
                reward_exp: None,
            },
        ],
        vec![monster(1, 10, 1), monster(9, 0, 0)],
        vec![],
        vec![gold_table(1, 20)],
        EconomyConfig::default(),
    ))
}

fn storage_with_unlocked(unlocked: u32) -> MemoryStorage {
    let mut blob = SaveBlob::default();
    blob.player.unlocked_level_id = unlocked;
    MemoryStorage::with_content(&serde_json::to_string(&blob).unwrap())
}

fn record_kinds(bus: &EventBus, kinds: &[EventKind]) -> Rc<RefCell<Vec<EventKind>>> {
    let seen = Rc::new(RefCell::new(Vec::new()));
    for &kind in kinds {
        let seen = Rc::clone(&seen);
        bus.subscribe(kind, move |ev| seen.borrow_mut().push(ev.kind()));
    }
    seen
}

/// Ticks the session, killing every spawned monster after each tick, until
/// the session settles or the tick budget runs out.
fn run_to_settlement(
    session: &mut GameSession<MemoryStorage>,
    bus: &EventBus,
    spawner: &mut TestSpawner,
    rng: &mut ChaCha8Rng,
) {
    for _ in 0..10_000 {
        if session.phase() != GamePhase::InGame {
            return;
        }
        session.on_tick(0.1, spawner, rng);
        for (monster_id, drop_table_id) in spawner.pending.drain(..) {
            bus.publish(&GameEvent::MonsterKilled {
                monster_id,
                position: Vec3::default(),
                drop_table_id,
            });
        }
    }
    panic!("session did not settle within the tick budget");
}

fn rng() -> ChaCha8Rng {
    ChaCha8Rng::seed_from_u64(42)
}

// =============================================================================
// Victory settlement
// =============================================================================

#[test]
fn test_full_level_flow_victory_settlement() {
    let bus = Rc::new(EventBus::with_all_registered());
    let seen = record_kinds(
        &bus,
        &[
            EventKind::WaveStarted,
            EventKind::WaveCompleted,
            EventKind::BossSpawned,
            EventKind::LevelCompleted,
            EventKind::LevelFailed,
        ],
    );
    let mut session = GameSession::new(
        Rc::clone(&bus),
        campaign_configs(),
        MemoryStorage::new(),
    );
    let mut spawner = TestSpawner::new();
    let mut rng = rng();

    session.start_game(1);
    assert_eq!(session.phase(), GamePhase::InGame);
    run_to_settlement(&mut session, &bus, &mut spawner, &mut rng);

    assert_eq!(session.phase(), GamePhase::Settlement);
    assert_eq!(
        *seen.borrow(),
        vec![
            EventKind::WaveStarted,
            EventKind::WaveCompleted,
            EventKind::BossSpawned,
            EventKind::LevelCompleted,
        ]
    );

    let result = session.settlement().expect("settlement after victory");
    assert!(result.victory);
    assert_eq!(result.level_id, 1);
    assert_eq!(result.reward_gold, 100);
    assert_eq!(result.reward_exp, 40);
    assert_eq!(result.kills, 4);

    // 3 kills x 20 gold drops + 100 reward; 3 x 10 exp + 40 reward.
    assert_eq!(session.player().gold, 160);
    assert_eq!(session.player().exp, 70);
    assert_eq!(session.player().unlocked_level_id, 2);
    assert!(session.is_clock_frozen());
}

#[test]
fn test_victory_reward_falls_back_to_level_scaled_formula() {
    let bus = Rc::new(EventBus::with_all_registered());
    let mut session = GameSession::new(
        Rc::clone(&bus),
        campaign_configs(),
        storage_with_unlocked(2),
    );
    let mut spawner = TestSpawner::new();
    let mut rng = rng();

    session.start_game(2);
    run_to_settlement(&mut session, &bus, &mut spawner, &mut rng);

    let result = session.settlement().expect("settlement after victory");
    assert!(result.victory);
    // 30 + 10*2 gold, 20 + 8*2 exp.
    assert_eq!(result.reward_gold, 50);
    assert_eq!(result.reward_exp, 36);
    assert_eq!(session.player().unlocked_level_id, 3);
}

#[test]
fn test_unlock_is_capped_at_max_configured_level() {
    let bus = Rc::new(EventBus::with_all_registered());
    let mut session = GameSession::new(
        Rc::clone(&bus),
        campaign_configs(),
        storage_with_unlocked(3),
    );
    let mut spawner = TestSpawner::new();
    let mut rng = rng();

    session.start_game(3);
    run_to_settlement(&mut session, &bus, &mut spawner, &mut rng);

    // Highest configured level is 3: no unlock past it.
    assert_eq!(session.player().unlocked_level_id, 3);
}

// =============================================================================
// Defeat settlement (failure-retain economics)
// =============================================================================

#[test]
fn test_defeat_retains_half_of_session_earnings() {
    // One big wave: 10 monsters, each worth 10 exp and a guaranteed
    // 20-gold drop. Kill 5, then die: earned 100 gold / 50 exp.
    let configs = Rc::new(ConfigDb::new(
        vec![LevelConfig {
            level_id: 1,
            waves: vec![wave(1, 1, 10)],
            boss: None,
            reward_gold: None,
            reward_exp: None,
        }],
        vec![monster(1, 10, 1)],
        vec![],
        vec![gold_table(1, 20)],
        EconomyConfig {
            gold_retain_ratio: 0.5,
            exp_retain_ratio: 0.5,
        },
    ));
    let bus = Rc::new(EventBus::with_all_registered());
    let seen = record_kinds(&bus, &[EventKind::LevelCompleted, EventKind::LevelFailed]);
    let mut session = GameSession::new(Rc::clone(&bus), configs, MemoryStorage::new());
    let mut spawner = TestSpawner::new();
    let mut rng = rng();

    session.start_game(1);
    let mut killed = 0;
    while killed < 5 {
        session.on_tick(0.1, &mut spawner, &mut rng);
        for (monster_id, drop_table_id) in spawner.pending.drain(..) {
            if killed < 5 {
                bus.publish(&GameEvent::MonsterKilled {
                    monster_id,
                    position: Vec3::default(),
                    drop_table_id,
                });
                killed += 1;
            }
        }
    }
    // Let the kill signals settle, then die.
    session.on_tick(0.1, &mut spawner, &mut rng);
    assert_eq!(session.player().gold, 100);
    assert_eq!(session.player().exp, 50);

    bus.publish(&GameEvent::PlayerKilled { player_id: 0 });
    session.on_tick(0.1, &mut spawner, &mut rng);

    assert_eq!(session.phase(), GamePhase::Settlement);
    assert_eq!(*seen.borrow(), vec![EventKind::LevelFailed]);

    // Net +50 gold / +25 exp of the session's gains are kept.
    assert_eq!(session.player().gold, 50);
    assert_eq!(session.player().exp, 25);

    let result = session.settlement().expect("settlement after defeat");
    assert!(!result.victory);
    assert_eq!(result.reward_gold, 50);
    assert_eq!(result.reward_exp, 25);
    // Defeat unlocks nothing.
    assert_eq!(session.player().unlocked_level_id, 1);
}

// =============================================================================
// Level selection and clamping
// =============================================================================

#[test]
fn test_start_game_clamps_to_unlocked_level() {
    let bus = Rc::new(EventBus::with_all_registered());
    let mut session = GameSession::new(
        Rc::clone(&bus),
        campaign_configs(),
        MemoryStorage::new(),
    );

    // Fresh save: only level 1 unlocked.
    session.start_game(3);
    assert_eq!(session.current_level_id(), 1);
    assert_eq!(session.phase(), GamePhase::InGame);
}

#[test]
fn test_start_game_missing_config_falls_back_to_level_one() {
    // Levels 1 and 3 configured, 2 missing.
    let configs = Rc::new(ConfigDb::new(
        vec![
            LevelConfig {
                level_id: 1,
                waves: vec![wave(1, 1, 1)],
                boss: None,
                reward_gold: None,
                reward_exp: None,
            },
            LevelConfig {
                level_id: 3,
                waves: vec![wave(1, 1, 1)],
                boss: None,
                reward_gold: None,
                reward_exp: None,
            },
        ],
        vec![monster(1, 1, 0)],
        vec![],
        vec![],
        EconomyConfig::default(),
    ));
    let bus = Rc::new(EventBus::with_all_registered());
    let mut session = GameSession::new(Rc::clone(&bus), configs, storage_with_unlocked(3));

    session.start_game(2);
    assert_eq!(session.current_level_id(), 1);
    assert_eq!(session.phase(), GamePhase::InGame);
}

#[test]
fn test_retry_level_replays_last_level() {
    let bus = Rc::new(EventBus::with_all_registered());
    let mut session = GameSession::new(
        Rc::clone(&bus),
        campaign_configs(),
        storage_with_unlocked(2),
    );
    let mut spawner = TestSpawner::new();
    let mut rng = rng();

    session.start_game(2);
    assert_eq!(session.current_level_id(), 2);

    // Die immediately.
    session.on_tick(0.1, &mut spawner, &mut rng);
    bus.publish(&GameEvent::PlayerKilled { player_id: 0 });
    session.on_tick(0.1, &mut spawner, &mut rng);
    assert_eq!(session.phase(), GamePhase::Settlement);

    session.retry_level();
    assert_eq!(session.phase(), GamePhase::InGame);
    assert_eq!(session.current_level_id(), 2);
}

// =============================================================================
// Pause rules
// =============================================================================

#[test]
fn test_pause_resume_transition_rules() {
    let bus = Rc::new(EventBus::with_all_registered());
    let seen = record_kinds(&bus, &[EventKind::GamePaused, EventKind::GameResumed]);
    let mut session = GameSession::new(
        Rc::clone(&bus),
        campaign_configs(),
        MemoryStorage::new(),
    );
    let mut spawner = TestSpawner::new();
    let mut rng = rng();

    // Pausing from the menu is a no-op.
    session.pause_game();
    assert_eq!(session.phase(), GamePhase::MainMenu);
    assert!(seen.borrow().is_empty());

    session.start_game(1);
    session.on_tick(0.1, &mut spawner, &mut rng);
    let spawned_before_pause = spawner.next_id;

    session.pause_game();
    assert_eq!(session.phase(), GamePhase::Paused);
    assert!(session.is_clock_frozen());
    // Double-pause is a no-op.
    session.pause_game();
    assert_eq!(*seen.borrow(), vec![EventKind::GamePaused]);

    // Ticking while paused spawns nothing and changes no alive count.
    let alive_before = session.scheduler().unwrap().borrow().alive();
    for _ in 0..20 {
        session.on_tick(0.1, &mut spawner, &mut rng);
    }
    assert_eq!(spawner.next_id, spawned_before_pause);
    assert_eq!(session.scheduler().unwrap().borrow().alive(), alive_before);

    session.resume_game();
    assert_eq!(session.phase(), GamePhase::InGame);
    assert!(!session.is_clock_frozen());
    // Double-resume is a no-op.
    session.resume_game();
    assert_eq!(
        *seen.borrow(),
        vec![EventKind::GamePaused, EventKind::GameResumed]
    );

    // Progress continues after resume.
    session.on_tick(0.1, &mut spawner, &mut rng);
    assert!(spawner.next_id > spawned_before_pause);
}

#[test]
fn test_end_game_outside_session_is_noop() {
    let bus = Rc::new(EventBus::with_all_registered());
    let mut session = GameSession::new(
        Rc::clone(&bus),
        campaign_configs(),
        MemoryStorage::new(),
    );

    session.end_game(true);
    assert_eq!(session.phase(), GamePhase::MainMenu);
    assert!(session.settlement().is_none());
}

// =============================================================================
// Event bookkeeping
// =============================================================================

#[test]
fn test_gold_changed_deltas_sum_to_total() {
    let bus = Rc::new(EventBus::with_all_registered());
    let deltas = Rc::new(RefCell::new(Vec::new()));
    {
        let deltas = Rc::clone(&deltas);
        bus.subscribe(EventKind::GoldChanged, move |ev| {
            if let GameEvent::GoldChanged { delta, .. } = ev {
                deltas.borrow_mut().push(*delta);
            }
        });
    }
    let mut session = GameSession::new(
        Rc::clone(&bus),
        campaign_configs(),
        MemoryStorage::new(),
    );
    let mut spawner = TestSpawner::new();
    let mut rng = rng();

    session.start_game(1);
    run_to_settlement(&mut session, &bus, &mut spawner, &mut rng);

    let sum: i64 = deltas.borrow().iter().sum();
    assert_eq!(sum, session.player().gold as i64);
}

#[test]
fn test_state_changes_are_published_in_order() {
    let bus = Rc::new(EventBus::with_all_registered());
    let states = Rc::new(RefCell::new(Vec::new()));
    {
        let states = Rc::clone(&states);
        bus.subscribe(EventKind::GameStateChanged, move |ev| {
            if let GameEvent::GameStateChanged { new_state } = ev {
                states.borrow_mut().push(*new_state);
            }
        });
    }
    let mut session = GameSession::new(
        Rc::clone(&bus),
        campaign_configs(),
        MemoryStorage::new(),
    );
    let mut spawner = TestSpawner::new();
    let mut rng = rng();

    session.start_game(1);
    run_to_settlement(&mut session, &bus, &mut spawner, &mut rng);
    session.load_main_menu();

    assert_eq!(
        *states.borrow(),
        vec![
            GamePhase::Loading,
            GamePhase::InGame,
            GamePhase::Settlement,
            GamePhase::MainMenu,
        ]
    );
}
