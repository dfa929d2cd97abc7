#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Core contracts shared across the survivor combat engine.
//!
//! This crate defines the message surface that connects adapters, the
//! authoritative world, and pure systems. Adapters submit [`Command`] values
//! describing desired mutations, the world executes those commands via its
//! `apply` entry point, and then broadcasts [`Event`] values for systems and
//! presentation layers to react to deterministically. Systems consume event
//! streams, query immutable snapshots, and respond exclusively with new
//! command batches.

use std::{
    ops::{Add, Mul, Sub},
    time::Duration,
};

use serde::{Deserialize, Serialize};

mod config;

pub use config::{
    ConfigError, EnemyTemplate, PlayerConfig, SessionConfig, WaveConfig, WeaponConfig,
};

/// Describes whether gameplay time is currently flowing.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
pub enum PlayState {
    /// Gameplay ticks advance the simulation.
    Running,
    /// The session owner paused the game.
    Paused,
    /// A level-up offer is waiting for the player's choice.
    AwaitingUpgrade,
}

/// Commands that express all permissible world mutations.
#[derive(Clone, Debug, PartialEq)]
pub enum Command {
    /// Rebuilds every piece of session state from the configured tables.
    Reset,
    /// Advances the fixed-rate physics step (movement, knockback, contact).
    Step {
        /// Duration of simulated time covered by the step.
        dt: Duration,
    },
    /// Advances the variable-rate clock (timers, cooldowns, area zones).
    Tick {
        /// Duration of simulated time that elapsed since the previous tick.
        dt: Duration,
    },
    /// Replaces the player's movement intent. The world normalizes the vector.
    SetMovementIntent {
        /// Raw direction requested by the input collaborator.
        direction: Vector2,
    },
    /// Suspends or resumes every gameplay tick.
    SetPaused {
        /// Whether gameplay should be paused.
        paused: bool,
    },
    /// Resolves a pending level-up offer by upgrading the chosen weapon.
    ChooseUpgrade {
        /// Weapon the player selected.
        weapon: WeaponId,
    },
    /// Requests that an enemy built from a template appear at a position.
    SpawnEnemy {
        /// Template describing the enemy's stats.
        template: TemplateId,
        /// World-space position of the new enemy.
        position: Vector2,
    },
    /// Applies damage to the player, subject to the immunity window.
    DamagePlayer {
        /// Amount of health to remove.
        amount: f32,
    },
    /// Applies damage to a single enemy.
    DamageEnemy {
        /// Enemy receiving the hit.
        enemy: EnemyId,
        /// Amount of health to remove.
        amount: f32,
    },
    /// Credits the player with experience points.
    GrantExperience {
        /// Experience points to add to the ledger.
        amount: u32,
    },
}

/// Events broadcast by the world after processing commands.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub enum Event {
    /// Indicates that the variable-rate clock advanced.
    TimeAdvanced {
        /// Duration of simulated time that elapsed in the tick.
        dt: Duration,
    },
    /// Reports the player's health after a change.
    HealthChanged {
        /// Current health, never reported below zero.
        current: f32,
        /// Maximum health.
        max: f32,
    },
    /// Reports the player's experience after a change.
    ExperienceChanged {
        /// Experience accumulated toward the next level.
        current: u32,
        /// Experience required to complete the current level.
        threshold: u32,
    },
    /// Announces that the player reached a new level.
    LevelUp {
        /// Level reached.
        level: u32,
        /// Weapon offered as an upgrade, if the player carries one.
        offered: Option<WeaponId>,
    },
    /// Confirms that a weapon gained a level through an upgrade choice.
    UpgradeApplied {
        /// Upgraded weapon.
        weapon: WeaponId,
        /// Level of the weapon after the upgrade.
        level: u32,
    },
    /// Reports damage applied to an enemy, for floating damage text.
    DamageDealt {
        /// Enemy that received the damage.
        enemy: EnemyId,
        /// Amount of damage applied.
        amount: f32,
        /// Position of the enemy when it was hit.
        position: Vector2,
    },
    /// Confirms that an enemy entered the arena.
    EnemySpawned {
        /// Identifier allocated to the enemy.
        enemy: EnemyId,
        /// Template the enemy was built from.
        template: TemplateId,
        /// Position of the enemy after spawning.
        position: Vector2,
    },
    /// Announces that an enemy died, for destruction effects.
    EnemyDestroyed {
        /// Enemy that died.
        enemy: EnemyId,
        /// Position where the enemy died.
        position: Vector2,
        /// Heading the enemy had when it died.
        heading: Vector2,
    },
    /// Announces that the player died.
    PlayerDied,
    /// Signals that the game-over screen should be shown.
    GameOver,
    /// Reports that an instantaneous weapon triggered its effect.
    WeaponFired {
        /// Weapon that fired.
        weapon: WeaponId,
        /// Position of the wielder when the weapon fired.
        position: Vector2,
        /// Level whose stats the effect uses.
        level: u32,
    },
    /// Confirms that an area weapon created a damage zone.
    ZoneSpawned {
        /// Identifier allocated to the zone.
        zone: ZoneId,
        /// Weapon that owns the zone.
        weapon: WeaponId,
        /// Centre of the zone when it was created.
        center: Vector2,
    },
    /// Confirms that a damage zone collapsed and was removed.
    ZoneExpired {
        /// Zone that was removed.
        zone: ZoneId,
    },
    /// Reports a change of the session-global pause flag.
    PauseChanged {
        /// Whether the session is now paused.
        paused: bool,
    },
}

/// Two-dimensional vector used for positions and directions.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Vector2 {
    x: f32,
    y: f32,
}

impl Vector2 {
    /// Vector with both components set to zero.
    pub const ZERO: Self = Self::new(0.0, 0.0);

    /// Creates a vector from its components.
    #[must_use]
    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    /// Horizontal component.
    #[must_use]
    pub const fn x(&self) -> f32 {
        self.x
    }

    /// Vertical component.
    #[must_use]
    pub const fn y(&self) -> f32 {
        self.y
    }

    /// Euclidean length of the vector.
    #[must_use]
    pub fn length(self) -> f32 {
        self.x.hypot(self.y)
    }

    /// Unit vector pointing in the same direction, or zero for a zero vector.
    #[must_use]
    pub fn normalized(self) -> Self {
        let length = self.length();
        if length > 0.0 && length.is_finite() {
            Self::new(self.x / length, self.y / length)
        } else {
            Self::ZERO
        }
    }

    /// Distance between two points.
    #[must_use]
    pub fn distance(self, other: Self) -> f32 {
        (other - self).length()
    }
}

impl Add for Vector2 {
    type Output = Self;

    fn add(self, rhs: Self) -> Self {
        Self::new(self.x + rhs.x, self.y + rhs.y)
    }
}

impl Sub for Vector2 {
    type Output = Self;

    fn sub(self, rhs: Self) -> Self {
        Self::new(self.x - rhs.x, self.y - rhs.y)
    }
}

impl Mul<f32> for Vector2 {
    type Output = Self;

    fn mul(self, rhs: f32) -> Self {
        Self::new(self.x * rhs, self.y * rhs)
    }
}

/// Axis-aligned rectangle whose perimeter hosts enemy spawn points.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct SpawnArea {
    min: Vector2,
    max: Vector2,
}

impl SpawnArea {
    /// Creates a spawn area from its minimum and maximum corners.
    #[must_use]
    pub const fn new(min: Vector2, max: Vector2) -> Self {
        Self { min, max }
    }

    /// Corner with the smallest coordinates.
    #[must_use]
    pub const fn min(&self) -> Vector2 {
        self.min
    }

    /// Corner with the largest coordinates.
    #[must_use]
    pub const fn max(&self) -> Vector2 {
        self.max
    }

    /// Reports whether the point lies exactly on one of the rectangle's edges.
    #[must_use]
    pub fn is_on_perimeter(&self, point: Vector2) -> bool {
        let within_x = point.x() >= self.min.x() && point.x() <= self.max.x();
        let within_y = point.y() >= self.min.y() && point.y() <= self.max.y();
        let on_vertical_edge = point.x() == self.min.x() || point.x() == self.max.x();
        let on_horizontal_edge = point.y() == self.min.y() || point.y() == self.max.y();
        (on_vertical_edge && within_y) || (on_horizontal_edge && within_x)
    }
}

/// Unique identifier assigned to an enemy.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct EnemyId(u32);

impl EnemyId {
    /// Creates a new enemy identifier with the provided numeric value.
    #[must_use]
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    /// Retrieves the numeric representation of the identifier.
    #[must_use]
    pub const fn get(&self) -> u32 {
        self.0
    }
}

/// Identifier of an equipped weapon, its index in the session's weapon list.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct WeaponId(u32);

impl WeaponId {
    /// Creates a new weapon identifier with the provided numeric value.
    #[must_use]
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    /// Retrieves the numeric representation of the identifier.
    #[must_use]
    pub const fn get(&self) -> u32 {
        self.0
    }
}

/// Unique identifier assigned to an area effect zone.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ZoneId(u32);

impl ZoneId {
    /// Creates a new zone identifier with the provided numeric value.
    #[must_use]
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    /// Retrieves the numeric representation of the identifier.
    #[must_use]
    pub const fn get(&self) -> u32 {
        self.0
    }
}

/// Identifier of an enemy template, its index in the session's template list.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TemplateId(u32);

impl TemplateId {
    /// Creates a new template identifier with the provided numeric value.
    #[must_use]
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    /// Retrieves the numeric representation of the identifier.
    #[must_use]
    pub const fn get(&self) -> u32 {
        self.0
    }
}

/// Behaviour tag dispatched by the weapon update.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum WeaponKind {
    /// Triggers a one-off effect at the wielder's position when the cooldown elapses.
    Instant,
    /// Creates a growing damage zone around the wielder when the cooldown elapses.
    Area,
}

/// Attributes of a weapon at a single level.
#[derive(Clone, Debug, PartialEq)]
pub struct StatRow {
    /// Time between two activations of the weapon.
    pub cooldown: Duration,
    /// Lifetime of the effect before it starts to collapse.
    pub duration: Duration,
    /// Damage applied per hit.
    pub damage: f32,
    /// Radius reached by the effect.
    pub range: f32,
    /// Interval between two damage ticks of the effect.
    pub tick_interval: Duration,
    /// Text shown when the level is offered as an upgrade.
    pub description: String,
}

/// Immutable per-level attribute table. Index 0 holds the base level.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct StatTable {
    rows: Vec<StatRow>,
}

impl StatTable {
    /// Creates a table from rows ordered by level.
    #[must_use]
    pub fn new(rows: Vec<StatRow>) -> Self {
        Self { rows }
    }

    /// Number of levels described by the table.
    #[must_use]
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// Reports whether the table has no rows.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Highest level the table describes.
    #[must_use]
    pub fn max_level(&self) -> u32 {
        u32::try_from(self.rows.len().saturating_sub(1)).unwrap_or(u32::MAX)
    }

    /// Returns the row for `level`, clamped to the last row of the table.
    ///
    /// Only an empty table yields `None`.
    #[must_use]
    pub fn row(&self, level: u32) -> Option<&StatRow> {
        let index = usize::try_from(level.min(self.max_level())).ok()?;
        self.rows.get(index)
    }
}

/// Immutable representation of the player's state used for queries.
#[derive(Clone, Debug, PartialEq)]
pub struct PlayerSnapshot {
    /// Position of the player.
    pub position: Vector2,
    /// Velocity applied during the last physics step.
    pub velocity: Vector2,
    /// Current health, never reported below zero.
    pub health: f32,
    /// Maximum health.
    pub max_health: f32,
    /// Whether the player is still alive.
    pub alive: bool,
    /// Remaining time of the immunity window.
    pub immunity_remaining: Duration,
    /// Current level.
    pub level: u32,
    /// Experience accumulated toward the next level.
    pub experience: u32,
    /// Experience required to complete the current level.
    pub threshold: u32,
}

/// Immutable representation of a single enemy's state used for queries.
#[derive(Clone, Debug, PartialEq)]
pub struct EnemySnapshot {
    /// Unique identifier assigned to the enemy.
    pub id: EnemyId,
    /// Template the enemy was built from.
    pub template: TemplateId,
    /// Position of the enemy.
    pub position: Vector2,
    /// Velocity applied during the last physics step.
    pub velocity: Vector2,
    /// Remaining health.
    pub health: f32,
    /// Signed scalar speed; negative while pushed back.
    pub speed: f32,
    /// Remaining knockback time.
    pub knockback_remaining: Duration,
    /// Whether the player stands to the right of the enemy.
    pub faces_right: bool,
}

/// Read-only snapshot describing all enemies in the arena.
#[derive(Clone, Debug, Default)]
pub struct EnemyView {
    snapshots: Vec<EnemySnapshot>,
}

impl EnemyView {
    /// Creates a new enemy view from the provided snapshots.
    #[must_use]
    pub fn from_snapshots(mut snapshots: Vec<EnemySnapshot>) -> Self {
        snapshots.sort_by_key(|snapshot| snapshot.id);
        Self { snapshots }
    }

    /// Iterator over the captured enemy snapshots in deterministic order.
    pub fn iter(&self) -> impl Iterator<Item = &EnemySnapshot> {
        self.snapshots.iter()
    }

    /// Number of enemies captured in the view.
    #[must_use]
    pub fn len(&self) -> usize {
        self.snapshots.len()
    }

    /// Reports whether the view captured no enemies.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.snapshots.is_empty()
    }

    /// Consumes the view, yielding the underlying snapshots.
    #[must_use]
    pub fn into_vec(self) -> Vec<EnemySnapshot> {
        self.snapshots
    }
}

/// Immutable representation of an equipped weapon.
#[derive(Clone, Debug, PartialEq)]
pub struct WeaponSnapshot {
    /// Identifier of the weapon.
    pub id: WeaponId,
    /// Display name of the weapon.
    pub name: String,
    /// Behaviour tag of the weapon.
    pub kind: WeaponKind,
    /// Current level.
    pub level: u32,
    /// Remaining time before the weapon activates again.
    pub cooldown_remaining: Duration,
}

/// Immutable representation of an area effect zone.
#[derive(Clone, Debug, PartialEq)]
pub struct ZoneSnapshot {
    /// Identifier of the zone.
    pub id: ZoneId,
    /// Weapon that owns the zone.
    pub weapon: WeaponId,
    /// Centre of the zone.
    pub center: Vector2,
    /// Radius currently covered by the zone.
    pub current_radius: f32,
    /// Radius the zone is animating toward.
    pub target_radius: f32,
    /// Lifetime left before the zone starts collapsing.
    pub life_remaining: Duration,
    /// Time left before the next damage tick.
    pub tick_remaining: Duration,
    /// Enemies currently inside the zone, in ascending order.
    pub enemies_in_range: Vec<EnemyId>,
}

/// Upgrade presented to the player after a level-up.
#[derive(Clone, Debug, PartialEq)]
pub struct UpgradeOffer {
    /// Weapon that would be upgraded.
    pub weapon: WeaponId,
    /// Display name of the weapon.
    pub name: String,
    /// Description of the weapon's current level.
    pub description: String,
}
