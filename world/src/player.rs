//! Player actor state: movement, health, and the immunity window.

use std::time::Duration;

use survivor_core::{PlayerConfig, Vector2};

/// Result of routing a hit to the player.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum PlayerHit {
    /// The hit was rejected by the immunity window, a dead player, or a non-positive amount.
    Ignored,
    /// The hit removed health and opened the immunity window.
    Wounded,
    /// The hit was lethal. Reported exactly once per session.
    Killed,
}

/// Authoritative player state.
#[derive(Clone, Debug)]
pub(crate) struct Player {
    pub(crate) position: Vector2,
    pub(crate) velocity: Vector2,
    pub(crate) radius: f32,
    intent: Vector2,
    speed: f32,
    health: f32,
    max_health: f32,
    immunity_duration: Duration,
    immunity_remaining: Duration,
    alive: bool,
}

impl Player {
    pub(crate) fn from_config(config: &PlayerConfig) -> Self {
        Self {
            position: Vector2::ZERO,
            velocity: Vector2::ZERO,
            radius: config.radius,
            intent: Vector2::ZERO,
            speed: config.speed,
            health: config.max_health,
            max_health: config.max_health,
            immunity_duration: config.immunity,
            immunity_remaining: Duration::ZERO,
            alive: true,
        }
    }

    pub(crate) fn is_alive(&self) -> bool {
        self.alive
    }

    pub(crate) fn is_immune(&self) -> bool {
        !self.immunity_remaining.is_zero()
    }

    pub(crate) fn immunity_remaining(&self) -> Duration {
        self.immunity_remaining
    }

    /// Health clamped to zero for external reporting.
    pub(crate) fn reported_health(&self) -> f32 {
        self.health.max(0.0)
    }

    pub(crate) fn max_health(&self) -> f32 {
        self.max_health
    }

    pub(crate) fn set_intent(&mut self, direction: Vector2) {
        self.intent = direction;
    }

    pub(crate) fn take_damage(&mut self, amount: f32) -> PlayerHit {
        if !self.alive || self.is_immune() || !(amount > 0.0) {
            return PlayerHit::Ignored;
        }

        self.health -= amount;
        self.immunity_remaining = self.immunity_duration;

        if self.health <= 0.0 {
            self.alive = false;
            self.intent = Vector2::ZERO;
            self.velocity = Vector2::ZERO;
            PlayerHit::Killed
        } else {
            PlayerHit::Wounded
        }
    }

    pub(crate) fn decay_immunity(&mut self, dt: Duration) {
        self.immunity_remaining = self.immunity_remaining.saturating_sub(dt);
    }

    pub(crate) fn step(&mut self, dt: Duration) {
        if !self.alive {
            self.velocity = Vector2::ZERO;
            return;
        }

        self.velocity = self.intent.normalized() * self.speed;
        self.position = self.position + self.velocity * dt.as_secs_f32();
    }
}
