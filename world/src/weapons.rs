//! Leveled weapon instances and their cooldown clocks.

use std::time::Duration;

use survivor_core::{StatRow, StatTable, WeaponConfig, WeaponId, WeaponKind, WeaponSnapshot};

/// Equipped weapon owned by the world.
#[derive(Clone, Debug)]
pub(crate) struct WeaponInstance {
    pub(crate) id: WeaponId,
    pub(crate) name: String,
    pub(crate) kind: WeaponKind,
    stats: StatTable,
    level: u32,
    cooldown_remaining: Duration,
}

impl WeaponInstance {
    pub(crate) fn from_config(id: WeaponId, config: &WeaponConfig) -> Self {
        Self {
            id,
            name: config.name.clone(),
            kind: config.kind,
            stats: config.stats.clone(),
            level: 0,
            cooldown_remaining: Duration::ZERO,
        }
    }

    pub(crate) fn level(&self) -> u32 {
        self.level
    }

    /// Stats of the current level. `None` only for an empty table.
    pub(crate) fn stats(&self) -> Option<&StatRow> {
        self.stats.row(self.level)
    }

    /// Raises the level by one unless the table is exhausted.
    pub(crate) fn level_up(&mut self) -> bool {
        if self.level < self.stats.max_level() {
            self.level += 1;
            true
        } else {
            false
        }
    }

    /// Runs the cooldown clock, returning `true` when the weapon activates.
    ///
    /// The weapon activates once the elapsed time exceeds the remaining
    /// cooldown, after which the clock restarts from the current level's
    /// cooldown. A fresh weapon therefore activates on its first tick.
    pub(crate) fn advance(&mut self, dt: Duration) -> bool {
        if dt > self.cooldown_remaining {
            self.cooldown_remaining = self
                .stats()
                .map_or(Duration::ZERO, |row| row.cooldown);
            true
        } else {
            self.cooldown_remaining -= dt;
            false
        }
    }

    pub(crate) fn snapshot(&self) -> WeaponSnapshot {
        WeaponSnapshot {
            id: self.id,
            name: self.name.clone(),
            kind: self.kind,
            level: self.level,
            cooldown_remaining: self.cooldown_remaining,
        }
    }
}
