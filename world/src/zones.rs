//! Transient area effect zones spawned by area weapons.

use std::{
    collections::{BTreeMap, BTreeSet},
    time::Duration,
};

use survivor_core::{EnemyId, StatRow, Vector2, WeaponId, ZoneId, ZoneSnapshot};

use crate::enemies::Enemy;

/// Radius units gained or lost per second while a zone animates.
pub(crate) const GROWTH_RATE: f32 = 6.0;

/// Damage zone that grows around its wielder, ticks damage, then collapses.
#[derive(Clone, Debug)]
pub(crate) struct AreaEffectZone {
    pub(crate) id: ZoneId,
    pub(crate) weapon: WeaponId,
    pub(crate) center: Vector2,
    current_radius: f32,
    target_radius: f32,
    life_remaining: Duration,
    tick_remaining: Duration,
    enemies_in_range: BTreeSet<EnemyId>,
}

impl AreaEffectZone {
    fn new(id: ZoneId, weapon: WeaponId, center: Vector2, stats: &StatRow) -> Self {
        Self {
            id,
            weapon,
            center,
            current_radius: 0.0,
            target_radius: stats.range.max(0.0),
            life_remaining: stats.duration,
            tick_remaining: Duration::ZERO,
            enemies_in_range: BTreeSet::new(),
        }
    }

    /// Moves the radius toward its target and runs the lifetime clock.
    ///
    /// Returns `true` once the zone has fully collapsed after expiring.
    pub(crate) fn animate(&mut self, dt: Duration) -> bool {
        let max_delta = GROWTH_RATE * dt.as_secs_f32();
        self.current_radius = move_towards(self.current_radius, self.target_radius, max_delta);

        self.life_remaining = self.life_remaining.saturating_sub(dt);
        if !self.life_remaining.is_zero() {
            return false;
        }

        self.target_radius = 0.0;
        self.current_radius == 0.0
    }

    /// Runs the damage clock, returning `true` when a damage tick is due.
    pub(crate) fn advance_damage_clock(&mut self, dt: Duration, interval: Duration) -> bool {
        self.tick_remaining = self.tick_remaining.saturating_sub(dt);
        if self.tick_remaining.is_zero() {
            self.tick_remaining = interval;
            true
        } else {
            false
        }
    }

    /// Enemies currently inside the zone, in ascending order.
    pub(crate) fn targets(&self) -> Vec<EnemyId> {
        self.enemies_in_range.iter().copied().collect()
    }

    /// Adds enemies that entered the zone and drops the ones that left it.
    pub(crate) fn refresh_membership<'a>(&mut self, enemies: impl Iterator<Item = &'a Enemy>) {
        for enemy in enemies {
            let inside = self.current_radius > 0.0
                && enemy.position.distance(self.center) <= self.current_radius + enemy.radius;
            if inside {
                let _ = self.enemies_in_range.insert(enemy.id);
            } else {
                let _ = self.enemies_in_range.remove(&enemy.id);
            }
        }
    }

    pub(crate) fn snapshot(&self) -> ZoneSnapshot {
        ZoneSnapshot {
            id: self.id,
            weapon: self.weapon,
            center: self.center,
            current_radius: self.current_radius,
            target_radius: self.target_radius,
            life_remaining: self.life_remaining,
            tick_remaining: self.tick_remaining,
            enemies_in_range: self.targets(),
        }
    }
}

/// Registry that stores live zones and manages identifier allocation.
#[derive(Debug)]
pub(crate) struct ZoneRegistry {
    entries: BTreeMap<ZoneId, AreaEffectZone>,
    next_zone_id: ZoneId,
}

impl ZoneRegistry {
    pub(crate) fn new() -> Self {
        Self {
            entries: BTreeMap::new(),
            next_zone_id: ZoneId::new(0),
        }
    }

    pub(crate) fn spawn(&mut self, weapon: WeaponId, center: Vector2, stats: &StatRow) -> ZoneId {
        let id = self.next_zone_id;
        self.next_zone_id = ZoneId::new(id.get().wrapping_add(1));
        let _ = self
            .entries
            .insert(id, AreaEffectZone::new(id, weapon, center, stats));
        id
    }

    pub(crate) fn ids(&self) -> Vec<ZoneId> {
        self.entries.keys().copied().collect()
    }

    pub(crate) fn get_mut(&mut self, id: ZoneId) -> Option<&mut AreaEffectZone> {
        self.entries.get_mut(&id)
    }

    pub(crate) fn remove(&mut self, id: ZoneId) -> Option<AreaEffectZone> {
        self.entries.remove(&id)
    }

    pub(crate) fn iter(&self) -> impl Iterator<Item = &AreaEffectZone> {
        self.entries.values()
    }

    pub(crate) fn iter_mut(&mut self) -> impl Iterator<Item = &mut AreaEffectZone> {
        self.entries.values_mut()
    }

    /// Drops a destroyed enemy from every zone's membership set.
    pub(crate) fn forget_enemy(&mut self, enemy: EnemyId) {
        for zone in self.entries.values_mut() {
            let _ = zone.enemies_in_range.remove(&enemy);
        }
    }
}

fn move_towards(current: f32, target: f32, max_delta: f32) -> f32 {
    let remaining = target - current;
    if remaining.abs() <= max_delta {
        target
    } else {
        current + max_delta.copysign(remaining)
    }
}
