#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Session driver that couples the authoritative world with its systems.
//!
//! A [`Simulation`] owns the [`World`] and the [`Spawning`] system. Each
//! presentation frame calls [`Simulation::advance`], which runs as many
//! fixed-rate physics steps as the accumulated time allows, then one
//! variable-rate tick, then feeds the tick's events to the spawner. Every
//! event the world emits is queued until the presentation layer drains it.

use std::{
    collections::{vec_deque::Drain, VecDeque},
    time::Duration,
};

use survivor_core::{Command, ConfigError, Event, PlayState, SessionConfig, Vector2, WeaponId};
use survivor_system_spawning::Spawning;
use survivor_world::{self as world, query, World};
use tracing::info;

/// Longest frame the driver simulates in one call; longer frames are clamped.
pub const MAX_FRAME_DELTA: Duration = Duration::from_millis(250);

/// Owns one survivor session and its outbound event queue.
#[derive(Debug)]
pub struct Simulation {
    world: World,
    spawning: Spawning,
    fixed_step: Duration,
    accumulator: Duration,
    events: VecDeque<Event>,
}

impl Simulation {
    /// Validates the configuration and starts a fresh session.
    pub fn new(config: SessionConfig) -> Result<Self, ConfigError> {
        config.validate()?;

        let spawning = Spawning::new(&config);
        let fixed_step = config.fixed_step;
        let mut simulation = Self {
            world: World::new(config),
            spawning,
            fixed_step,
            accumulator: Duration::ZERO,
            events: VecDeque::new(),
        };
        let _ = simulation.submit(Command::Reset);
        info!(?fixed_step, "session started");
        Ok(simulation)
    }

    /// Advances the session by one presentation frame.
    pub fn advance(&mut self, frame_dt: Duration) {
        let frame_dt = frame_dt.min(MAX_FRAME_DELTA);

        self.accumulator = self.accumulator.saturating_add(frame_dt);
        while self.accumulator >= self.fixed_step {
            self.accumulator -= self.fixed_step;
            let _ = self.submit(Command::Step {
                dt: self.fixed_step,
            });
        }

        let play_state = query::play_state(&self.world);
        let tick_events = self.submit(Command::Tick { dt: frame_dt });

        let mut commands = Vec::new();
        self.spawning.handle(
            &tick_events,
            play_state,
            query::is_player_alive(&self.world),
            &mut commands,
        );
        for command in commands {
            let _ = self.submit(command);
        }
    }

    /// Replaces the player's movement intent.
    pub fn set_movement_intent(&mut self, direction: Vector2) {
        let _ = self.submit(Command::SetMovementIntent { direction });
    }

    /// Suspends or resumes gameplay.
    pub fn set_paused(&mut self, paused: bool) {
        let _ = self.submit(Command::SetPaused { paused });
    }

    /// Resolves the pending level-up offer with the chosen weapon.
    pub fn choose_upgrade(&mut self, weapon: WeaponId) {
        let _ = self.submit(Command::ChooseUpgrade { weapon });
    }

    /// Starts the session over from the configured tables.
    pub fn restart(&mut self) {
        self.spawning = Spawning::new(query::config(&self.world));
        self.accumulator = Duration::ZERO;
        let _ = self.submit(Command::Reset);
        info!("session restarted");
    }

    /// Applies a command to the world and queues the resulting events.
    ///
    /// Returns a copy of the events the command produced.
    pub fn submit(&mut self, command: Command) -> Vec<Event> {
        let mut events = Vec::new();
        world::apply(&mut self.world, command, &mut events);
        self.events.extend(events.iter().cloned());
        events
    }

    /// Removes and yields every queued event in emission order.
    pub fn drain_events(&mut self) -> Drain<'_, Event> {
        self.events.drain(..)
    }

    /// Reports whether gameplay time is currently flowing.
    #[must_use]
    pub fn play_state(&self) -> PlayState {
        query::play_state(&self.world)
    }

    /// Running time survived by the player in the current session.
    #[must_use]
    pub fn elapsed(&self) -> Duration {
        query::elapsed(&self.world)
    }

    /// Read-only access to the world for snapshot queries.
    #[must_use]
    pub fn world(&self) -> &World {
        &self.world
    }

    /// Read-only access to the spawner's wave progress.
    #[must_use]
    pub fn spawning(&self) -> &Spawning {
        &self.spawning
    }
}
