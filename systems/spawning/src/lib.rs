#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Deterministic wave scheduler responsible for emitting unit spawn commands.

use std::time::Duration;

use citadel_defence_core::{
    BorderSide, Command, Event, GridDimensions, MatchConfig, UnitArchetype, UnitRoster,
    WaveConfig,
};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use sha2::{Digest, Sha256};
use tracing::info;

/// Configuration parameters required to construct the spawning system.
#[derive(Clone, Copy, Debug)]
pub struct Config {
    waves: WaveConfig,
    roster: UnitRoster,
    dimensions: GridDimensions,
}

impl Config {
    /// Creates a new configuration from explicit wave, roster and board settings.
    #[must_use]
    pub const fn new(waves: WaveConfig, roster: UnitRoster, dimensions: GridDimensions) -> Self {
        Self {
            waves,
            roster,
            dimensions,
        }
    }

    /// Extracts the scheduler settings of a match.
    #[must_use]
    pub fn from_match(config: &MatchConfig) -> Self {
        Self::new(config.waves, config.units, config.dimensions())
    }

    /// Number of units spawned by the 1-indexed wave.
    #[must_use]
    pub fn wave_size(&self, wave: u32) -> u32 {
        let increments = wave.saturating_sub(1);
        self.waves
            .start_wave_size
            .saturating_add(increments.saturating_mul(self.waves.wave_size_increase))
    }
}

/// Pure system that emits an unbounded sequence of spawn waves.
#[derive(Debug)]
pub struct Spawning {
    config: Config,
    wave: u32,
    spawned: u32,
    countdown: Duration,
    rng: ChaCha8Rng,
    stopped: bool,
}

impl Spawning {
    /// Creates a new spawning system using the supplied configuration.
    #[must_use]
    pub fn new(config: Config) -> Self {
        Self {
            config,
            wave: 0,
            spawned: 0,
            countdown: Duration::ZERO,
            rng: ChaCha8Rng::seed_from_u64(derive_wave_seed(config.waves.seed, 0)),
            stopped: false,
        }
    }

    /// Current 1-indexed wave, zero before the first spawn.
    #[must_use]
    pub const fn wave(&self) -> u32 {
        self.wave
    }

    /// Consumes events to emit spawn commands.
    ///
    /// The first spawn happens as soon as time first advances. Every spawn is
    /// followed by the spawn interval, and the last spawn of a wave also by
    /// the pause between waves. A match end stops the scheduler until a
    /// restart resets it.
    pub fn handle(&mut self, events: &[Event], out: &mut Vec<Command>) {
        let mut accumulated = Duration::ZERO;
        for event in events {
            match event {
                Event::TimeAdvanced { dt } => accumulated = accumulated.saturating_add(*dt),
                Event::MatchEnded { .. } => self.stopped = true,
                Event::MatchRestarted => {
                    *self = Self::new(self.config);
                    accumulated = Duration::ZERO;
                }
                _ => {}
            }
        }

        if self.stopped || accumulated.is_zero() {
            return;
        }

        if self.wave == 0 {
            self.begin_wave(1);
        }

        let mut budget = accumulated;
        while budget >= self.countdown {
            budget -= self.countdown;
            if self.spawned < self.config.wave_size(self.wave) {
                out.push(self.spawn());
                self.spawned += 1;
                self.countdown = self.config.waves.spawn_interval;
                if self.spawned == self.config.wave_size(self.wave) {
                    self.countdown += self.config.waves.time_between_waves;
                }
            } else {
                self.begin_wave(self.wave.saturating_add(1));
            }
        }
        self.countdown -= budget;
    }

    fn begin_wave(&mut self, wave: u32) {
        self.wave = wave;
        self.spawned = 0;
        self.countdown = Duration::ZERO;
        self.rng = ChaCha8Rng::seed_from_u64(derive_wave_seed(self.config.waves.seed, wave));
        info!(wave, size = self.config.wave_size(wave), "wave started");
        if self.config.wave_size(wave) == 0 {
            self.countdown = self.config.waves.time_between_waves;
        }
    }

    fn spawn(&mut self) -> Command {
        let waves = self.config.waves;
        let remaining = self.config.wave_size(self.wave) - self.spawned;
        let requested = if remaining <= waves.min_tank_per_wave {
            UnitArchetype::Tank
        } else {
            let roll: f32 = self.rng.gen();
            if roll < waves.fast_chance {
                UnitArchetype::Fast
            } else if roll < waves.fast_chance + waves.tank_chance {
                UnitArchetype::Tank
            } else {
                UnitArchetype::Standard
            }
        };
        let archetype = self.config.roster.resolve(requested).unwrap_or(requested);

        let side = BorderSide::ALL[self.rng.gen_range(0..BorderSide::ALL.len())];
        let dimensions = self.config.dimensions;
        let extent = match side {
            BorderSide::Left | BorderSide::Right => dimensions.rows(),
            BorderSide::Bottom | BorderSide::Top => dimensions.columns(),
        };
        let along = self.rng.gen_range(0..extent.max(1));
        let position = dimensions.border_position(side, waves.border_offset, along);

        Command::SpawnUnit {
            archetype,
            side,
            position,
        }
    }
}

fn derive_wave_seed(seed: u64, wave: u32) -> u64 {
    let mut hasher = Sha256::new();
    hasher.update(seed.to_le_bytes());
    hasher.update(wave.to_le_bytes());
    finalize_seed(hasher)
}

fn finalize_seed(hasher: Sha256) -> u64 {
    let digest = hasher.finalize();
    let mut bytes = [0_u8; 8];
    bytes.copy_from_slice(&digest[..8]);
    u64::from_le_bytes(bytes)
}
