#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Authoritative world state management for the survivor combat core.

use std::{collections::VecDeque, time::Duration};

use survivor_core::{
    Command, EnemyId, Event, PlayState, SessionConfig, TemplateId, Vector2, WeaponId, WeaponKind,
};
use tracing::{debug, info, warn};

mod enemies;
mod player;
mod progression;
mod weapons;
mod zones;

use enemies::{EnemyHit, EnemyRegistry};
use player::{Player, PlayerHit};
use progression::ProgressionLedger;
use weapons::WeaponInstance;
use zones::ZoneRegistry;

/// Running time between the player's death and the game-over signal.
pub const GAME_OVER_DELAY: Duration = Duration::from_millis(1_500);

/// Represents the authoritative survivor world state.
#[derive(Debug)]
pub struct World {
    config: SessionConfig,
    player: Player,
    ledger: ProgressionLedger,
    enemies: EnemyRegistry,
    weapons: Vec<WeaponInstance>,
    zones: ZoneRegistry,
    paused: bool,
    pending_upgrades: VecDeque<WeaponId>,
    game_over_in: Option<Duration>,
    game_over: bool,
    elapsed: Duration,
}

impl World {
    /// Creates a world populated from the provided configuration.
    ///
    /// The configuration is expected to have passed
    /// [`SessionConfig::validate`]; the world degrades to inaction on any
    /// table it cannot use.
    #[must_use]
    pub fn new(config: SessionConfig) -> Self {
        let player = Player::from_config(&config.player);
        let ledger = ProgressionLedger::new(config.player.level_thresholds.clone());
        let weapons = equip_weapons(&config);
        Self {
            config,
            player,
            ledger,
            enemies: EnemyRegistry::new(),
            weapons,
            zones: ZoneRegistry::new(),
            paused: false,
            pending_upgrades: VecDeque::new(),
            game_over_in: None,
            game_over: false,
            elapsed: Duration::ZERO,
        }
    }

    fn reset(&mut self, out_events: &mut Vec<Event>) {
        self.player = Player::from_config(&self.config.player);
        self.ledger = ProgressionLedger::new(self.config.player.level_thresholds.clone());
        self.enemies = EnemyRegistry::new();
        self.weapons = equip_weapons(&self.config);
        self.zones = ZoneRegistry::new();
        self.paused = false;
        self.pending_upgrades.clear();
        self.game_over_in = None;
        self.game_over = false;
        self.elapsed = Duration::ZERO;

        self.push_health(out_events);
        self.push_experience(out_events);
    }

    fn play_state(&self) -> PlayState {
        if self.paused {
            PlayState::Paused
        } else if !self.pending_upgrades.is_empty() {
            PlayState::AwaitingUpgrade
        } else {
            PlayState::Running
        }
    }

    fn step(&mut self, dt: Duration, out_events: &mut Vec<Event>) {
        self.player.step(dt);
        let player_alive = self.player.is_alive();
        let player_position = self.player.position;

        for enemy in self.enemies.iter_mut() {
            if !player_alive {
                enemy.freeze();
                continue;
            }

            enemy.resolve_knockback(dt);
            enemy.chase(player_position, dt);
            enemy.face(player_position);
        }

        if !player_alive {
            return;
        }

        let contacts: Vec<f32> = self
            .enemies
            .iter()
            .filter(|enemy| enemy.touches(player_position, self.player.radius))
            .map(|enemy| enemy.contact_damage)
            .collect();
        for damage in contacts {
            self.damage_player(damage, out_events);
        }

        let player_position = self.player.position;
        for zone in self.zones.iter_mut() {
            zone.center = player_position;
            zone.refresh_membership(self.enemies.iter());
        }
    }

    fn tick(&mut self, dt: Duration, out_events: &mut Vec<Event>) {
        out_events.push(Event::TimeAdvanced { dt });

        self.player.decay_immunity(dt);

        if let Some(remaining) = self.game_over_in {
            let remaining = remaining.saturating_sub(dt);
            if remaining.is_zero() {
                self.game_over_in = None;
                self.game_over = true;
                out_events.push(Event::GameOver);
            } else {
                self.game_over_in = Some(remaining);
            }
        }

        if !self.player.is_alive() {
            return;
        }

        self.elapsed = self.elapsed.saturating_add(dt);
        self.tick_zones(dt, out_events);
        self.tick_weapons(dt, out_events);
    }

    fn tick_zones(&mut self, dt: Duration, out_events: &mut Vec<Event>) {
        for zone_id in self.zones.ids() {
            let Some(zone) = self.zones.get_mut(zone_id) else {
                continue;
            };

            if zone.animate(dt) {
                let _ = self.zones.remove(zone_id);
                out_events.push(Event::ZoneExpired { zone: zone_id });
                continue;
            }

            let Some(stats) = find_weapon(&self.weapons, zone.weapon).and_then(|w| w.stats())
            else {
                continue;
            };
            let damage = stats.damage;
            if !zone.advance_damage_clock(dt, stats.tick_interval) {
                continue;
            }

            for enemy in zone.targets() {
                self.damage_enemy(enemy, damage, out_events);
            }
        }
    }

    fn tick_weapons(&mut self, dt: Duration, out_events: &mut Vec<Event>) {
        let position = self.player.position;
        for weapon in &mut self.weapons {
            if !weapon.advance(dt) {
                continue;
            }

            match weapon.kind {
                WeaponKind::Instant => out_events.push(Event::WeaponFired {
                    weapon: weapon.id,
                    position,
                    level: weapon.level(),
                }),
                WeaponKind::Area => {
                    let Some(stats) = weapon.stats() else {
                        continue;
                    };
                    let zone = self.zones.spawn(weapon.id, position, stats);
                    out_events.push(Event::ZoneSpawned {
                        zone,
                        weapon: weapon.id,
                        center: position,
                    });
                }
            }
        }
    }

    fn damage_player(&mut self, amount: f32, out_events: &mut Vec<Event>) {
        match self.player.take_damage(amount) {
            PlayerHit::Ignored => {}
            PlayerHit::Wounded => self.push_health(out_events),
            PlayerHit::Killed => {
                self.push_health(out_events);
                out_events.push(Event::PlayerDied);
                self.game_over_in = Some(GAME_OVER_DELAY);
                self.pending_upgrades.clear();
                if self.paused {
                    self.paused = false;
                    out_events.push(Event::PauseChanged { paused: false });
                }
                info!(elapsed = ?self.elapsed, level = self.ledger.level(), "player died");
            }
        }
    }

    fn damage_enemy(&mut self, id: EnemyId, amount: f32, out_events: &mut Vec<Event>) {
        if !(amount > 0.0) {
            debug!(enemy = id.get(), amount, "ignoring non-positive enemy damage");
            return;
        }

        let Some(enemy) = self.enemies.get_mut(id) else {
            return;
        };

        let hit = enemy.take_damage(amount);
        out_events.push(Event::DamageDealt {
            enemy: id,
            amount,
            position: enemy.position,
        });

        if hit != EnemyHit::Killed {
            return;
        }

        let Some(enemy) = self.enemies.remove(id) else {
            return;
        };
        self.zones.forget_enemy(id);
        out_events.push(Event::EnemyDestroyed {
            enemy: id,
            position: enemy.position,
            heading: enemy.heading,
        });
        self.grant_experience(enemy.experience_reward, out_events);
    }

    fn grant_experience(&mut self, amount: u32, out_events: &mut Vec<Event>) {
        if !self.player.is_alive() {
            return;
        }

        self.ledger.credit(amount);
        self.push_experience(out_events);

        let Some(level) = self.ledger.level_up_once() else {
            return;
        };

        let offered = self.config.player.active_weapon;
        if let Some(weapon) = offered {
            self.pending_upgrades.push_back(weapon);
        }
        debug!(level, ?offered, "player levelled up");
        out_events.push(Event::LevelUp { level, offered });
        self.push_experience(out_events);
    }

    fn choose_upgrade(&mut self, weapon: WeaponId, out_events: &mut Vec<Event>) {
        if self.pending_upgrades.front() != Some(&weapon) {
            warn!(weapon = weapon.get(), "rejected upgrade choice without matching offer");
            return;
        }
        let _ = self.pending_upgrades.pop_front();

        let Some(instance) = self.weapons.iter_mut().find(|w| w.id == weapon) else {
            return;
        };
        if !instance.level_up() {
            debug!(weapon = %instance.name, "weapon already at max level");
        }
        out_events.push(Event::UpgradeApplied {
            weapon,
            level: instance.level(),
        });
    }

    fn set_paused(&mut self, paused: bool, out_events: &mut Vec<Event>) {
        if !self.player.is_alive() {
            debug!(paused, "ignoring pause request after death");
            return;
        }
        if self.paused == paused {
            return;
        }

        self.paused = paused;
        out_events.push(Event::PauseChanged { paused });
    }

    fn spawn_enemy(&mut self, template: TemplateId, position: Vector2, out_events: &mut Vec<Event>) {
        let Some(stats) = self.config.template(template) else {
            warn!(template = template.get(), "skipping spawn of unknown enemy template");
            return;
        };

        let enemy = self.enemies.spawn(template, stats, position);
        out_events.push(Event::EnemySpawned {
            enemy,
            template,
            position,
        });
    }

    fn push_health(&self, out_events: &mut Vec<Event>) {
        out_events.push(Event::HealthChanged {
            current: self.player.reported_health(),
            max: self.player.max_health(),
        });
    }

    fn push_experience(&self, out_events: &mut Vec<Event>) {
        out_events.push(Event::ExperienceChanged {
            current: self.ledger.experience(),
            threshold: self.ledger.threshold(),
        });
    }
}

/// Applies the provided command to the world, mutating state deterministically.
pub fn apply(world: &mut World, command: Command, out_events: &mut Vec<Event>) {
    match command {
        Command::Reset => world.reset(out_events),
        Command::Step { dt } => {
            if world.play_state() == PlayState::Running {
                world.step(dt, out_events);
            }
        }
        Command::Tick { dt } => {
            if world.play_state() == PlayState::Running {
                world.tick(dt, out_events);
            }
        }
        Command::SetMovementIntent { direction } => world.player.set_intent(direction),
        Command::SetPaused { paused } => world.set_paused(paused, out_events),
        Command::ChooseUpgrade { weapon } => world.choose_upgrade(weapon, out_events),
        Command::SpawnEnemy { template, position } => {
            world.spawn_enemy(template, position, out_events)
        }
        Command::DamagePlayer { amount } => world.damage_player(amount, out_events),
        Command::DamageEnemy { enemy, amount } => world.damage_enemy(enemy, amount, out_events),
        Command::GrantExperience { amount } => world.grant_experience(amount, out_events),
    }
}

fn equip_weapons(config: &SessionConfig) -> Vec<WeaponInstance> {
    config
        .weapons
        .iter()
        .enumerate()
        .map(|(index, weapon)| {
            let id = WeaponId::new(u32::try_from(index).unwrap_or(u32::MAX));
            WeaponInstance::from_config(id, weapon)
        })
        .collect()
}

fn find_weapon(weapons: &[WeaponInstance], id: WeaponId) -> Option<&WeaponInstance> {
    weapons.iter().find(|weapon| weapon.id == id)
}

/// Query functions that provide read-only access to the world state.
pub mod query {
    use std::time::Duration;

    use super::{find_weapon, World};
    use survivor_core::{
        EnemyView, PlayState, PlayerSnapshot, SessionConfig, UpgradeOffer, WeaponSnapshot,
        ZoneSnapshot,
    };

    /// Reports whether gameplay time is flowing, paused, or awaiting an upgrade choice.
    #[must_use]
    pub fn play_state(world: &World) -> PlayState {
        world.play_state()
    }

    /// Provides read-only access to the configuration the world was built from.
    #[must_use]
    pub fn config(world: &World) -> &SessionConfig {
        &world.config
    }

    /// Reports whether the player is alive and therefore a valid target.
    #[must_use]
    pub fn is_player_alive(world: &World) -> bool {
        world.player.is_alive()
    }

    /// Reports whether the game-over delay has elapsed after the player's death.
    #[must_use]
    pub fn is_game_over(world: &World) -> bool {
        world.game_over
    }

    /// Running time accumulated while the player was alive.
    #[must_use]
    pub fn elapsed(world: &World) -> Duration {
        world.elapsed
    }

    /// Captures the player's state.
    #[must_use]
    pub fn player(world: &World) -> PlayerSnapshot {
        PlayerSnapshot {
            position: world.player.position,
            velocity: world.player.velocity,
            health: world.player.reported_health(),
            max_health: world.player.max_health(),
            alive: world.player.is_alive(),
            immunity_remaining: world.player.immunity_remaining(),
            level: world.ledger.level(),
            experience: world.ledger.experience(),
            threshold: world.ledger.threshold(),
        }
    }

    /// Captures a read-only view of the enemies in the arena.
    #[must_use]
    pub fn enemy_view(world: &World) -> EnemyView {
        EnemyView::from_snapshots(world.enemies.iter().map(|enemy| enemy.snapshot()).collect())
    }

    /// Captures every equipped weapon in identifier order.
    #[must_use]
    pub fn weapons(world: &World) -> Vec<WeaponSnapshot> {
        world.weapons.iter().map(|weapon| weapon.snapshot()).collect()
    }

    /// Captures every live area effect zone in identifier order.
    #[must_use]
    pub fn zones(world: &World) -> Vec<ZoneSnapshot> {
        world.zones.iter().map(|zone| zone.snapshot()).collect()
    }

    /// Describes the upgrade currently waiting for the player's choice.
    #[must_use]
    pub fn upgrade_offer(world: &World) -> Option<UpgradeOffer> {
        let weapon = *world.pending_upgrades.front()?;
        let instance = find_weapon(&world.weapons, weapon)?;
        Some(UpgradeOffer {
            weapon,
            name: instance.name.clone(),
            description: instance
                .stats()
                .map(|row| row.description.clone())
                .unwrap_or_default(),
        })
    }
}
