//! Static session configuration and its validation rules.

use std::time::Duration;

use thiserror::Error;

use crate::{SpawnArea, StatTable, TemplateId, WeaponId, WeaponKind};

/// Attributes of the player at the start of a session.
#[derive(Clone, Debug, PartialEq)]
pub struct PlayerConfig {
    /// Maximum and starting health.
    pub max_health: f32,
    /// Movement speed in world units per second.
    pub speed: f32,
    /// Radius of the player's collider.
    pub radius: f32,
    /// Length of the immunity window opened by every accepted hit.
    pub immunity: Duration,
    /// Experience required to complete each level, indexed by level.
    pub level_thresholds: Vec<u32>,
    /// Weapon offered on level-up. Must refer to an equipped weapon.
    pub active_weapon: Option<WeaponId>,
}

/// Equipped weapon description.
#[derive(Clone, Debug, PartialEq)]
pub struct WeaponConfig {
    /// Display name of the weapon.
    pub name: String,
    /// Behaviour tag of the weapon.
    pub kind: WeaponKind,
    /// Per-level attributes of the weapon.
    pub stats: StatTable,
}

/// Stats shared by every enemy spawned from the template.
#[derive(Clone, Debug, PartialEq)]
pub struct EnemyTemplate {
    /// Name used in logs and configuration files.
    pub name: String,
    /// Starting health.
    pub max_health: f32,
    /// Chase speed in world units per second.
    pub speed: f32,
    /// Damage dealt to the player on every physics step of contact.
    pub contact_damage: f32,
    /// Experience credited to the player when the enemy dies.
    pub experience_reward: u32,
    /// Length of the pushback triggered by every hit.
    pub knockback: Duration,
    /// Radius of the enemy's collider.
    pub radius: f32,
}

/// Batch-spawn rule for a single enemy template.
#[derive(Clone, Debug, PartialEq)]
pub struct WaveConfig {
    /// Template spawned by the wave.
    pub template: TemplateId,
    /// Initial time between two spawns.
    pub spawn_interval: Duration,
    /// Number of spawns before the spawner advances to the next wave.
    pub enemies_per_wave: u32,
}

/// Complete static configuration of a session.
#[derive(Clone, Debug, PartialEq)]
pub struct SessionConfig {
    /// Player attributes.
    pub player: PlayerConfig,
    /// Equipped weapons; a weapon's identifier is its index in this list.
    pub weapons: Vec<WeaponConfig>,
    /// Enemy templates; a template's identifier is its index in this list.
    pub enemy_templates: Vec<EnemyTemplate>,
    /// Wave table cycled by the spawner.
    pub waves: Vec<WaveConfig>,
    /// Rectangle whose perimeter hosts spawn points.
    pub spawn_area: SpawnArea,
    /// Length of one fixed-rate physics step.
    pub fixed_step: Duration,
    /// Seed of the spawner's random number generator.
    pub rng_seed: u64,
}

impl SessionConfig {
    /// Looks up an enemy template by identifier.
    #[must_use]
    pub fn template(&self, id: TemplateId) -> Option<&EnemyTemplate> {
        usize::try_from(id.get())
            .ok()
            .and_then(|index| self.enemy_templates.get(index))
    }

    /// Looks up an equipped weapon by identifier.
    #[must_use]
    pub fn weapon(&self, id: WeaponId) -> Option<&WeaponConfig> {
        usize::try_from(id.get())
            .ok()
            .and_then(|index| self.weapons.get(index))
    }

    /// Checks every table for values the simulation cannot run with.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let player = &self.player;
        if !(player.max_health > 0.0) {
            return Err(ConfigError::NonPositivePlayerHealth);
        }
        if !(player.speed >= 0.0) {
            return Err(ConfigError::NegativeSpeed {
                subject: "player".to_owned(),
            });
        }
        if player.level_thresholds.is_empty() {
            return Err(ConfigError::EmptyLevelThresholds);
        }
        if let Some(level) = player.level_thresholds.iter().position(|value| *value == 0) {
            return Err(ConfigError::ZeroLevelThreshold { level });
        }
        if let Some(active) = player.active_weapon {
            if self.weapon(active).is_none() {
                return Err(ConfigError::UnknownActiveWeapon { weapon: active });
            }
        }

        for weapon in &self.weapons {
            if weapon.stats.is_empty() {
                return Err(ConfigError::EmptyStatTable {
                    weapon: weapon.name.clone(),
                });
            }
        }

        for template in &self.enemy_templates {
            if !(template.max_health > 0.0) {
                return Err(ConfigError::NonPositiveEnemyHealth {
                    template: template.name.clone(),
                });
            }
            if !(template.speed >= 0.0) {
                return Err(ConfigError::NegativeSpeed {
                    subject: template.name.clone(),
                });
            }
        }

        for (index, wave) in self.waves.iter().enumerate() {
            if self.template(wave.template).is_none() {
                return Err(ConfigError::UnknownTemplate {
                    wave: index,
                    template: wave.template,
                });
            }
            if wave.enemies_per_wave == 0 {
                return Err(ConfigError::EmptyWave { wave: index });
            }
            if wave.spawn_interval.is_zero() {
                return Err(ConfigError::ZeroSpawnInterval { wave: index });
            }
        }

        let min = self.spawn_area.min();
        let max = self.spawn_area.max();
        if min.x() > max.x() || min.y() > max.y() {
            return Err(ConfigError::InvertedSpawnArea);
        }

        if self.fixed_step.is_zero() {
            return Err(ConfigError::ZeroFixedStep);
        }

        Ok(())
    }
}

/// Reasons a session configuration may be rejected.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum ConfigError {
    /// The player would start dead.
    #[error("player max health must be positive")]
    NonPositivePlayerHealth,
    /// An enemy template would spawn dead.
    #[error("enemy template `{template}` must have positive max health")]
    NonPositiveEnemyHealth {
        /// Name of the offending template.
        template: String,
    },
    /// A base speed was negative; pushback flips the sign at runtime instead.
    #[error("{subject} speed must not be negative")]
    NegativeSpeed {
        /// Player or template name.
        subject: String,
    },
    /// The level threshold table has no rows.
    #[error("level threshold table is empty")]
    EmptyLevelThresholds,
    /// A threshold of zero would level up on every grant.
    #[error("level threshold for level {level} is zero")]
    ZeroLevelThreshold {
        /// Level whose threshold is zero.
        level: usize,
    },
    /// The active weapon is not part of the equipped weapon list.
    #[error("active weapon {weapon:?} is not equipped")]
    UnknownActiveWeapon {
        /// Identifier that failed to resolve.
        weapon: WeaponId,
    },
    /// A weapon has no stat rows.
    #[error("weapon `{weapon}` has an empty stat table")]
    EmptyStatTable {
        /// Name of the offending weapon.
        weapon: String,
    },
    /// A wave references a template that does not exist.
    #[error("wave {wave} references unknown enemy template {template:?}")]
    UnknownTemplate {
        /// Index of the offending wave.
        wave: usize,
        /// Identifier that failed to resolve.
        template: TemplateId,
    },
    /// A wave would never complete.
    #[error("wave {wave} spawns no enemies")]
    EmptyWave {
        /// Index of the offending wave.
        wave: usize,
    },
    /// A wave would spawn without any delay.
    #[error("wave {wave} has a zero spawn interval")]
    ZeroSpawnInterval {
        /// Index of the offending wave.
        wave: usize,
    },
    /// The spawn rectangle's minimum corner exceeds its maximum corner.
    #[error("spawn area minimum corner exceeds its maximum corner")]
    InvertedSpawnArea,
    /// The physics step would never advance.
    #[error("fixed step must be longer than zero")]
    ZeroFixedStep,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{StatRow, Vector2};

    fn config() -> SessionConfig {
        SessionConfig {
            player: PlayerConfig {
                max_health: 100.0,
                speed: 5.0,
                radius: 0.5,
                immunity: Duration::from_millis(500),
                level_thresholds: vec![10, 20],
                active_weapon: Some(WeaponId::new(0)),
            },
            weapons: vec![WeaponConfig {
                name: "Aura".to_owned(),
                kind: WeaponKind::Area,
                stats: StatTable::new(vec![StatRow {
                    cooldown: Duration::from_secs(3),
                    duration: Duration::from_secs(2),
                    damage: 4.0,
                    range: 2.0,
                    tick_interval: Duration::from_millis(500),
                    description: "Base aura".to_owned(),
                }]),
            }],
            enemy_templates: vec![EnemyTemplate {
                name: "bat".to_owned(),
                max_health: 10.0,
                speed: 2.0,
                contact_damage: 5.0,
                experience_reward: 1,
                knockback: Duration::from_millis(300),
                radius: 0.4,
            }],
            waves: vec![WaveConfig {
                template: TemplateId::new(0),
                spawn_interval: Duration::from_secs(1),
                enemies_per_wave: 3,
            }],
            spawn_area: SpawnArea::new(Vector2::new(-10.0, -6.0), Vector2::new(10.0, 6.0)),
            fixed_step: Duration::from_millis(20),
            rng_seed: 7,
        }
    }

    #[test]
    fn well_formed_config_validates() {
        assert_eq!(config().validate(), Ok(()));
    }

    #[test]
    fn wave_with_unknown_template_is_rejected() {
        let mut config = config();
        config.waves[0].template = TemplateId::new(4);
        assert_eq!(
            config.validate(),
            Err(ConfigError::UnknownTemplate {
                wave: 0,
                template: TemplateId::new(4),
            })
        );
    }

    #[test]
    fn empty_threshold_table_is_rejected() {
        let mut config = config();
        config.player.level_thresholds.clear();
        assert_eq!(config.validate(), Err(ConfigError::EmptyLevelThresholds));
    }

    #[test]
    fn inverted_spawn_area_is_rejected() {
        let mut config = config();
        config.spawn_area = SpawnArea::new(Vector2::new(5.0, 0.0), Vector2::new(-5.0, 1.0));
        assert_eq!(config.validate(), Err(ConfigError::InvertedSpawnArea));
    }

    #[test]
    fn weapon_without_levels_is_rejected() {
        let mut config = config();
        config.weapons[0].stats = StatTable::default();
        assert!(matches!(
            config.validate(),
            Err(ConfigError::EmptyStatTable { .. })
        ));
    }

    #[test]
    fn empty_wave_table_is_allowed() {
        let mut config = config();
        config.waves.clear();
        assert_eq!(config.validate(), Ok(()));
    }
}
