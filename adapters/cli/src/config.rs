//! Loads TOML session files and resolves them into a [`SessionConfig`].

use std::{collections::HashMap, fs, path::Path, time::Duration};

use anyhow::{bail, Context, Result};
use serde::Deserialize;
use survivor_core::{
    EnemyTemplate, PlayerConfig, SessionConfig, SpawnArea, StatRow, StatTable, TemplateId,
    Vector2, WaveConfig, WeaponConfig, WeaponId, WeaponKind,
};

const SUPPORTED_SESSION_VERSION: u32 = 1;

/// Reads, parses, resolves, and validates the session file at `path`.
pub(crate) fn load(path: impl AsRef<Path>) -> Result<SessionConfig> {
    let path = path.as_ref();
    let contents = fs::read_to_string(path)
        .with_context(|| format!("failed to read session file at {}", path.display()))?;
    parse_session(&contents)
        .with_context(|| format!("invalid session file at {}", path.display()))
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct SessionFile {
    version: u32,
    seed: u64,
    fixed_step_ms: u64,
    player: PlayerSection,
    spawn_area: SpawnAreaSection,
    #[serde(default)]
    weapons: Vec<WeaponSection>,
    #[serde(default)]
    enemies: Vec<EnemySection>,
    #[serde(default)]
    waves: Vec<WaveSection>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct PlayerSection {
    max_health: f32,
    speed: f32,
    radius: f32,
    immunity_ms: u64,
    level_thresholds: Vec<u32>,
    active_weapon: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct SpawnAreaSection {
    min: [f32; 2],
    max: [f32; 2],
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct WeaponSection {
    name: String,
    kind: WeaponKind,
    levels: Vec<LevelSection>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct LevelSection {
    cooldown_ms: u64,
    duration_ms: u64,
    damage: f32,
    range: f32,
    tick_interval_ms: u64,
    #[serde(default)]
    description: String,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct EnemySection {
    name: String,
    max_health: f32,
    speed: f32,
    contact_damage: f32,
    experience_reward: u32,
    knockback_ms: u64,
    radius: f32,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct WaveSection {
    enemy: String,
    spawn_interval_ms: u64,
    count: u32,
}

fn parse_session(contents: &str) -> Result<SessionConfig> {
    let file: SessionFile =
        toml::from_str(contents).context("failed to parse session toml contents")?;
    if file.version != SUPPORTED_SESSION_VERSION {
        bail!(
            "unsupported session file version {}; expected {}",
            file.version,
            SUPPORTED_SESSION_VERSION
        );
    }

    let weapon_ids = index_names(
        file.weapons.iter().map(|weapon| weapon.name.as_str()),
        "weapon",
    )?;
    let enemy_ids = index_names(file.enemies.iter().map(|enemy| enemy.name.as_str()), "enemy")?;

    let active_weapon = match &file.player.active_weapon {
        Some(name) => {
            let Some(index) = weapon_ids.get(name.as_str()) else {
                bail!("active weapon `{name}` is not defined");
            };
            Some(WeaponId::new(*index))
        }
        None => None,
    };

    let waves = file
        .waves
        .iter()
        .map(|wave| {
            let Some(index) = enemy_ids.get(wave.enemy.as_str()) else {
                bail!("wave references unknown enemy `{}`", wave.enemy);
            };
            Ok(WaveConfig {
                template: TemplateId::new(*index),
                spawn_interval: Duration::from_millis(wave.spawn_interval_ms),
                enemies_per_wave: wave.count,
            })
        })
        .collect::<Result<Vec<_>>>()?;

    let config = SessionConfig {
        player: PlayerConfig {
            max_health: file.player.max_health,
            speed: file.player.speed,
            radius: file.player.radius,
            immunity: Duration::from_millis(file.player.immunity_ms),
            level_thresholds: file.player.level_thresholds,
            active_weapon,
        },
        weapons: file.weapons.into_iter().map(resolve_weapon).collect(),
        enemy_templates: file.enemies.into_iter().map(resolve_enemy).collect(),
        waves,
        spawn_area: SpawnArea::new(
            Vector2::new(file.spawn_area.min[0], file.spawn_area.min[1]),
            Vector2::new(file.spawn_area.max[0], file.spawn_area.max[1]),
        ),
        fixed_step: Duration::from_millis(file.fixed_step_ms),
        rng_seed: file.seed,
    };

    config.validate().context("session file failed validation")?;
    Ok(config)
}

fn index_names<'a>(
    names: impl Iterator<Item = &'a str>,
    kind: &str,
) -> Result<HashMap<&'a str, u32>> {
    let mut indexed = HashMap::new();
    for (index, name) in names.enumerate() {
        let id = u32::try_from(index).with_context(|| format!("too many {kind} entries"))?;
        if indexed.insert(name, id).is_some() {
            bail!("session file contains duplicate {kind} `{name}`");
        }
    }
    Ok(indexed)
}

fn resolve_weapon(section: WeaponSection) -> WeaponConfig {
    let rows = section
        .levels
        .into_iter()
        .map(|level| StatRow {
            cooldown: Duration::from_millis(level.cooldown_ms),
            duration: Duration::from_millis(level.duration_ms),
            damage: level.damage,
            range: level.range,
            tick_interval: Duration::from_millis(level.tick_interval_ms),
            description: level.description,
        })
        .collect();
    WeaponConfig {
        name: section.name,
        kind: section.kind,
        stats: StatTable::new(rows),
    }
}

fn resolve_enemy(section: EnemySection) -> EnemyTemplate {
    EnemyTemplate {
        name: section.name,
        max_health: section.max_health,
        speed: section.speed,
        contact_damage: section.contact_damage,
        experience_reward: section.experience_reward,
        knockback: Duration::from_millis(section.knockback_ms),
        radius: section.radius,
    }
}
