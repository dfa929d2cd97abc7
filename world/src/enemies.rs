//! Enemy state: chasing, pushback, and the registry that owns every enemy.

use std::{collections::BTreeMap, time::Duration};

use survivor_core::{EnemyId, EnemySnapshot, EnemyTemplate, TemplateId, Vector2};

/// Result of routing a hit to an enemy.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum EnemyHit {
    /// The enemy survived and entered pushback.
    Wounded,
    /// The enemy's health dropped to zero or below.
    Killed,
}

/// Authoritative state of a single enemy.
#[derive(Clone, Debug)]
pub(crate) struct Enemy {
    pub(crate) id: EnemyId,
    pub(crate) template: TemplateId,
    pub(crate) position: Vector2,
    pub(crate) heading: Vector2,
    pub(crate) radius: f32,
    pub(crate) contact_damage: f32,
    pub(crate) experience_reward: u32,
    velocity: Vector2,
    health: f32,
    speed: f32,
    knockback_duration: Duration,
    knockback_remaining: Duration,
    faces_right: bool,
}

impl Enemy {
    pub(crate) fn spawn(
        id: EnemyId,
        template_id: TemplateId,
        template: &EnemyTemplate,
        position: Vector2,
    ) -> Self {
        Self {
            id,
            template: template_id,
            position,
            heading: Vector2::ZERO,
            radius: template.radius,
            contact_damage: template.contact_damage,
            experience_reward: template.experience_reward,
            velocity: Vector2::ZERO,
            health: template.max_health,
            speed: template.speed.abs(),
            knockback_duration: template.knockback,
            knockback_remaining: Duration::ZERO,
            faces_right: false,
        }
    }

    /// Removes health and restarts the pushback window.
    ///
    /// The speed sign flips only when entering pushback, so repeated hits
    /// extend the window without flipping the enemy back toward the player.
    pub(crate) fn take_damage(&mut self, amount: f32) -> EnemyHit {
        self.health -= amount;
        self.knockback_remaining = self.knockback_duration;
        if self.speed > 0.0 && !self.knockback_remaining.is_zero() {
            self.speed = -self.speed;
        }

        if self.health <= 0.0 {
            EnemyHit::Killed
        } else {
            EnemyHit::Wounded
        }
    }

    pub(crate) fn resolve_knockback(&mut self, dt: Duration) {
        if self.knockback_remaining.is_zero() {
            return;
        }

        self.knockback_remaining = self.knockback_remaining.saturating_sub(dt);
        if self.knockback_remaining.is_zero() {
            self.speed = self.speed.abs();
        }
    }

    pub(crate) fn chase(&mut self, target: Vector2, dt: Duration) {
        self.heading = (target - self.position).normalized();
        self.velocity = self.heading * self.speed;
        self.position = self.position + self.velocity * dt.as_secs_f32();
    }

    pub(crate) fn face(&mut self, target: Vector2) {
        self.faces_right = target.x() > self.position.x();
    }

    /// Stops the enemy without touching its pushback timer.
    pub(crate) fn freeze(&mut self) {
        self.velocity = Vector2::ZERO;
    }

    pub(crate) fn touches(&self, point: Vector2, radius: f32) -> bool {
        self.position.distance(point) <= self.radius + radius
    }

    pub(crate) fn snapshot(&self) -> EnemySnapshot {
        EnemySnapshot {
            id: self.id,
            template: self.template,
            position: self.position,
            velocity: self.velocity,
            health: self.health,
            speed: self.speed,
            knockback_remaining: self.knockback_remaining,
            faces_right: self.faces_right,
        }
    }
}

/// Registry that stores enemies and manages identifier allocation.
#[derive(Debug)]
pub(crate) struct EnemyRegistry {
    entries: BTreeMap<EnemyId, Enemy>,
    next_enemy_id: EnemyId,
}

impl EnemyRegistry {
    /// Creates an empty enemy registry with a reset identifier counter.
    pub(crate) fn new() -> Self {
        Self {
            entries: BTreeMap::new(),
            next_enemy_id: EnemyId::new(0),
        }
    }

    pub(crate) fn spawn(
        &mut self,
        template_id: TemplateId,
        template: &EnemyTemplate,
        position: Vector2,
    ) -> EnemyId {
        let id = self.next_enemy_id;
        self.next_enemy_id = EnemyId::new(id.get().wrapping_add(1));
        let _ = self
            .entries
            .insert(id, Enemy::spawn(id, template_id, template, position));
        id
    }

    pub(crate) fn get_mut(&mut self, id: EnemyId) -> Option<&mut Enemy> {
        self.entries.get_mut(&id)
    }

    pub(crate) fn remove(&mut self, id: EnemyId) -> Option<Enemy> {
        self.entries.remove(&id)
    }

    /// Iterates enemies in ascending identifier order.
    pub(crate) fn iter(&self) -> impl Iterator<Item = &Enemy> {
        self.entries.values()
    }

    pub(crate) fn iter_mut(&mut self) -> impl Iterator<Item = &mut Enemy> {
        self.entries.values_mut()
    }
}
