use std::{
    collections::hash_map::DefaultHasher,
    hash::{Hash, Hasher},
    time::Duration,
};

use survivor_core::{
    ConfigError, EnemyTemplate, Event, PlayState, PlayerConfig, SessionConfig, SpawnArea,
    StatRow, StatTable, TemplateId, Vector2, WaveConfig, WeaponConfig, WeaponId, WeaponKind,
};
use survivor_simulation::{Simulation, MAX_FRAME_DELTA};
use survivor_world::query;

fn config() -> SessionConfig {
    SessionConfig {
        player: PlayerConfig {
            max_health: 100.0,
            speed: 5.0,
            radius: 0.5,
            immunity: Duration::from_millis(500),
            level_thresholds: vec![2, 4, 6],
            active_weapon: Some(WeaponId::new(0)),
        },
        weapons: vec![WeaponConfig {
            name: "Aura".to_owned(),
            kind: WeaponKind::Area,
            stats: StatTable::new(vec![
                StatRow {
                    cooldown: Duration::from_millis(1_500),
                    duration: Duration::from_millis(1_000),
                    damage: 6.0,
                    range: 4.0,
                    tick_interval: Duration::from_millis(250),
                    description: "A ring of light".to_owned(),
                },
                StatRow {
                    cooldown: Duration::from_millis(1_200),
                    duration: Duration::from_millis(1_200),
                    damage: 9.0,
                    range: 5.0,
                    tick_interval: Duration::from_millis(250),
                    description: "A wider ring".to_owned(),
                },
            ]),
        }],
        enemy_templates: vec![EnemyTemplate {
            name: "bat".to_owned(),
            max_health: 10.0,
            speed: 3.0,
            contact_damage: 8.0,
            experience_reward: 1,
            knockback: Duration::from_millis(300),
            radius: 0.4,
        }],
        waves: vec![WaveConfig {
            template: TemplateId::new(0),
            spawn_interval: Duration::from_millis(400),
            enemies_per_wave: 5,
        }],
        spawn_area: SpawnArea::new(Vector2::new(-6.0, -4.0), Vector2::new(6.0, 4.0)),
        fixed_step: Duration::from_millis(20),
        rng_seed: 0x0ddb_a11,
    }
}

#[test]
fn invalid_configuration_is_rejected() {
    let mut config = config();
    config.player.level_thresholds.clear();
    let error = Simulation::new(config).expect_err("empty thresholds");
    assert_eq!(error, ConfigError::EmptyLevelThresholds);
}

#[test]
fn new_session_reports_initial_state() {
    let mut simulation = Simulation::new(config()).expect("valid config");
    let events: Vec<Event> = simulation.drain_events().collect();
    assert_eq!(
        events,
        vec![
            Event::HealthChanged {
                current: 100.0,
                max: 100.0,
            },
            Event::ExperienceChanged {
                current: 0,
                threshold: 2,
            },
        ]
    );
    assert_eq!(simulation.drain_events().count(), 0);
}

#[test]
fn fixed_steps_accumulate_across_frames() {
    let mut simulation = Simulation::new(config()).expect("valid config");
    simulation.set_movement_intent(Vector2::new(0.0, 10.0));

    simulation.advance(Duration::from_millis(30));
    let after_one = query::player(simulation.world()).position.y();
    assert!((after_one - 0.1).abs() < 1e-5, "one step expected: {after_one}");

    simulation.advance(Duration::from_millis(30));
    let after_three = query::player(simulation.world()).position.y();
    assert!((after_three - 0.3).abs() < 1e-5, "three steps expected: {after_three}");
}

#[test]
fn long_frames_are_clamped() {
    let mut simulation = Simulation::new(config()).expect("valid config");
    let _ = simulation.drain_events().count();

    simulation.advance(Duration::from_secs(3));
    let ticks: Vec<Duration> = simulation
        .drain_events()
        .filter_map(|event| match event {
            Event::TimeAdvanced { dt } => Some(dt),
            _ => None,
        })
        .collect();
    assert_eq!(ticks, vec![MAX_FRAME_DELTA]);
    assert_eq!(simulation.elapsed(), MAX_FRAME_DELTA);
}

#[test]
fn spawner_reacts_to_ticks() {
    let mut simulation = Simulation::new(config()).expect("valid config");

    for _ in 0..25 {
        simulation.advance(Duration::from_millis(16));
    }

    let spawned: Vec<Vector2> = simulation
        .drain_events()
        .filter_map(|event| match event {
            Event::EnemySpawned { position, .. } => Some(position),
            _ => None,
        })
        .collect();
    assert_eq!(spawned.len(), 1);
    assert_eq!(simulation.spawning().waves()[0].spawned, 1);
}

#[test]
fn pause_stops_the_session_clock() {
    let mut simulation = Simulation::new(config()).expect("valid config");
    simulation.advance(Duration::from_millis(100));
    simulation.set_paused(true);
    assert_eq!(simulation.play_state(), PlayState::Paused);

    for _ in 0..10 {
        simulation.advance(Duration::from_millis(100));
    }
    assert_eq!(simulation.elapsed(), Duration::from_millis(100));
    assert!(simulation.spawning().waves()[0].spawn_timer <= Duration::from_millis(100));

    simulation.set_paused(false);
    simulation.advance(Duration::from_millis(100));
    assert_eq!(simulation.elapsed(), Duration::from_millis(200));
}

#[test]
fn restart_rebuilds_world_and_spawner() {
    let mut simulation = Simulation::new(config()).expect("valid config");
    for _ in 0..60 {
        simulation.advance(Duration::from_millis(50));
    }
    let spawned = simulation
        .drain_events()
        .filter(|event| matches!(event, Event::EnemySpawned { .. }))
        .count();
    assert!(spawned > 0);
    assert!(!simulation.elapsed().is_zero());

    simulation.restart();
    assert!(query::enemy_view(simulation.world()).is_empty());
    assert!(simulation.elapsed().is_zero());
    assert_eq!(simulation.spawning().current_wave(), 0);
    let wave = &simulation.spawning().waves()[0];
    assert_eq!(wave.spawned, 0);
    assert!(wave.spawn_timer.is_zero());
    assert_eq!(wave.spawn_interval, Duration::from_millis(400));
}

#[test]
fn session_eventually_offers_and_applies_upgrade() {
    let mut simulation = Simulation::new(config()).expect("valid config");
    let mut offered = None;

    for _ in 0..2_000 {
        simulation.advance(Duration::from_millis(16));
        if simulation.play_state() == PlayState::AwaitingUpgrade {
            offered = query::upgrade_offer(simulation.world());
            break;
        }
        if !query::is_player_alive(simulation.world()) {
            break;
        }
    }

    let offer = offered.expect("player should level up before dying");
    assert_eq!(offer.weapon, WeaponId::new(0));
    simulation.choose_upgrade(offer.weapon);
    assert_eq!(simulation.play_state(), PlayState::Running);
    assert_eq!(query::weapons(simulation.world())[0].level, 1);
}

#[test]
fn level_up_inside_a_frame_still_advances_the_spawner() {
    let mut simulation = Simulation::new(config()).expect("valid config");
    let frame = Duration::from_millis(16);

    let mut levelled = false;
    for _ in 0..2_000 {
        let before = (
            simulation.spawning().current_wave(),
            simulation.spawning().waves().to_vec(),
        );
        simulation.advance(frame);
        if simulation.play_state() != PlayState::AwaitingUpgrade {
            assert!(query::is_player_alive(simulation.world()));
            continue;
        }

        let after = (
            simulation.spawning().current_wave(),
            simulation.spawning().waves().to_vec(),
        );
        assert_ne!(before, after, "spawner skipped the frame of the level-up");
        levelled = true;
        break;
    }
    assert!(levelled, "player should level up before dying");

    let before = simulation.spawning().waves().to_vec();
    simulation.advance(frame);
    assert_eq!(simulation.spawning().waves(), before.as_slice());
}

#[test]
fn deterministic_replay_produces_identical_sequence() {
    let first = replay();
    let second = replay();

    assert_eq!(first.len(), second.len());
    assert_eq!(fingerprint(&first), fingerprint(&second), "replay diverged");
}

fn replay() -> Vec<String> {
    let mut simulation = Simulation::new(config()).expect("valid config");
    let mut log = Vec::new();

    for frame in 0..600_u32 {
        let direction = match (frame / 60) % 4 {
            0 => Vector2::new(1.0, 0.0),
            1 => Vector2::new(0.0, 1.0),
            2 => Vector2::new(-1.0, 0.0),
            _ => Vector2::new(0.0, -1.0),
        };
        simulation.set_movement_intent(direction);
        simulation.advance(Duration::from_millis(16 + u64::from(frame % 5)));

        if let Some(offer) = query::upgrade_offer(simulation.world()) {
            simulation.choose_upgrade(offer.weapon);
        }
        log.extend(simulation.drain_events().map(|event| format!("{event:?}")));
    }

    log
}

fn fingerprint(log: &[String]) -> u64 {
    let mut hasher = DefaultHasher::new();
    log.hash(&mut hasher);
    hasher.finish()
}
