#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Wave-table spawning system responsible for emitting enemy spawn commands.

use std::time::Duration;

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use survivor_core::{Command, Event, PlayState, SessionConfig, SpawnArea, TemplateId, Vector2};
use tracing::{debug, warn};

/// Spawn interval at or below which completed waves no longer speed up.
pub const INTERVAL_FLOOR: Duration = Duration::from_millis(300);

/// Mutable progress of a single wave slot.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct WaveProgress {
    /// Template spawned by the wave.
    pub template: TemplateId,
    /// Time between two spawns, shrinking each time the wave completes.
    pub spawn_interval: Duration,
    /// Time accumulated toward the next spawn.
    pub spawn_timer: Duration,
    /// Enemies the wave spawns before handing over to the next slot.
    pub enemies_per_wave: u32,
    /// Enemies spawned since the wave last completed.
    pub spawned: u32,
}

impl WaveProgress {
    fn complete(&mut self) {
        self.spawned = 0;
        if self.spawn_interval > INTERVAL_FLOOR {
            self.spawn_interval = self.spawn_interval * 9 / 10;
        }
    }
}

/// Pure system that cycles through the wave table while the player is alive.
#[derive(Debug)]
pub struct Spawning {
    waves: Vec<WaveProgress>,
    current_wave: usize,
    spawn_area: SpawnArea,
    rng: ChaCha8Rng,
}

impl Spawning {
    /// Creates a new spawning system from the session's wave table.
    ///
    /// Waves naming a template the session does not define are dropped.
    #[must_use]
    pub fn new(config: &SessionConfig) -> Self {
        let waves = config
            .waves
            .iter()
            .enumerate()
            .filter_map(|(index, wave)| {
                if config.template(wave.template).is_none() {
                    warn!(
                        wave = index,
                        template = wave.template.get(),
                        "dropping wave with unknown enemy template"
                    );
                    return None;
                }

                Some(WaveProgress {
                    template: wave.template,
                    spawn_interval: wave.spawn_interval,
                    spawn_timer: Duration::ZERO,
                    enemies_per_wave: wave.enemies_per_wave,
                    spawned: 0,
                })
            })
            .collect();

        Self {
            waves,
            current_wave: 0,
            spawn_area: config.spawn_area,
            rng: ChaCha8Rng::seed_from_u64(config.rng_seed),
        }
    }

    /// Index of the wave slot that will spawn next.
    #[must_use]
    pub fn current_wave(&self) -> usize {
        self.current_wave
    }

    /// Progress of every wave slot in table order.
    #[must_use]
    pub fn waves(&self) -> &[WaveProgress] {
        &self.waves
    }

    /// Consumes world events and emits spawn commands.
    ///
    /// Every `TimeAdvanced` event counts as one spawner tick. Nothing happens
    /// while time is suspended or the player is dead.
    pub fn handle(
        &mut self,
        events: &[Event],
        play_state: PlayState,
        player_alive: bool,
        out: &mut Vec<Command>,
    ) {
        if play_state != PlayState::Running || !player_alive || self.waves.is_empty() {
            return;
        }

        for event in events {
            if let Event::TimeAdvanced { dt } = event {
                self.tick(*dt, out);
            }
        }
    }

    fn tick(&mut self, dt: Duration, out: &mut Vec<Command>) {
        if self.current_wave >= self.waves.len() {
            self.current_wave = 0;
            debug!("wave table wrapped");
            return;
        }

        let wave = &mut self.waves[self.current_wave];
        wave.spawn_timer = wave.spawn_timer.saturating_add(dt);
        if wave.spawn_timer < wave.spawn_interval {
            return;
        }

        wave.spawn_timer = Duration::ZERO;
        wave.spawned = wave.spawned.saturating_add(1);
        let template = wave.template;
        let wave_complete = wave.spawned >= wave.enemies_per_wave;
        if wave_complete {
            wave.complete();
            debug!(
                wave = self.current_wave,
                interval = ?wave.spawn_interval,
                "wave completed"
            );
            self.current_wave += 1;
        }

        let position = self.perimeter_point();
        out.push(Command::SpawnEnemy { template, position });
    }

    fn perimeter_point(&mut self) -> Vector2 {
        let min = self.spawn_area.min();
        let max = self.spawn_area.max();

        if self.rng.gen_bool(0.5) {
            let x = self.sample(min.x(), max.x());
            let y = if self.rng.gen_bool(0.5) { min.y() } else { max.y() };
            Vector2::new(x, y)
        } else {
            let y = self.sample(min.y(), max.y());
            let x = if self.rng.gen_bool(0.5) { min.x() } else { max.x() };
            Vector2::new(x, y)
        }
    }

    fn sample(&mut self, low: f32, high: f32) -> f32 {
        if high > low {
            self.rng.gen_range(low..=high)
        } else {
            low
        }
    }
}
