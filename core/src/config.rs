//! Match configuration and validation.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::{
    CellCoord, CellRect, CellRectSize, ConfigError, EndOfMatchPolicy, GridDimensions, PlayerId,
    StructureKind, UnitArchetype, UnitStats,
};

/// Maximum number of players sharing one match.
pub const MAX_PLAYERS: usize = 4;

/// Complete description of a match, loadable from TOML.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MatchConfig {
    /// Board dimensions.
    pub grid: GridConfig,
    /// Mana limits shared by every player.
    pub economy: EconomyConfig,
    /// Player roster; at least one and at most four entries.
    pub players: PlayersConfig,
    /// Wave pacing and composition.
    pub waves: WaveConfig,
    /// Per-archetype unit stats; `None` disables an archetype.
    pub units: UnitRoster,
    /// Projectile and proximity tuning.
    pub combat: CombatConfig,
    /// Registry rescan cadence and end-of-match policy.
    pub registry: RegistryConfig,
    /// Player structures placed before the first tick.
    pub layout: Vec<LayoutEntry>,
}

impl MatchConfig {
    /// Board dimensions as a value type.
    #[must_use]
    pub const fn dimensions(&self) -> GridDimensions {
        GridDimensions::new(self.grid.columns, self.grid.rows)
    }

    /// Rejects configurations the simulation cannot run.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.grid.columns == 0 || self.grid.rows == 0 {
            return Err(ConfigError::ZeroDimensions);
        }
        if self.grid.columns < 2 || self.grid.rows < 2 {
            return Err(ConfigError::GridTooSmall {
                columns: self.grid.columns,
                rows: self.grid.rows,
            });
        }
        if self.economy.max_mana == 0 {
            return Err(ConfigError::ZeroMaxMana);
        }
        if self.economy.start_mana > self.economy.max_mana {
            return Err(ConfigError::StartManaExceedsMax {
                start: self.economy.start_mana,
                max: self.economy.max_mana,
            });
        }

        let roster = &self.players.roster;
        if roster.is_empty() || roster.len() > MAX_PLAYERS {
            return Err(ConfigError::PlayerCount {
                count: roster.len(),
            });
        }
        if usize::from(self.players.active.get()) >= roster.len() {
            return Err(ConfigError::UnknownActivePlayer {
                player: self.players.active,
            });
        }

        let bounds = self.dimensions();
        for (index, player) in roster.iter().enumerate() {
            if let Some(zone) = player.zone {
                if !bounds.contains_rect(zone) {
                    return Err(ConfigError::InvalidZone { player: index });
                }
            }
        }

        if self.units.enabled().next().is_none() {
            return Err(ConfigError::NoArchetypes);
        }

        let waves = &self.waves;
        let chances_valid = (0.0..=1.0).contains(&waves.fast_chance)
            && (0.0..=1.0).contains(&waves.tank_chance)
            && waves.fast_chance + waves.tank_chance <= 1.0;
        if !chances_valid {
            return Err(ConfigError::InvalidChance);
        }
        if waves.spawn_interval.is_zero() {
            return Err(ConfigError::ZeroSpawnInterval);
        }
        if waves.start_wave_size == 0 && waves.wave_size_increase == 0 {
            return Err(ConfigError::EmptyWaves);
        }
        if self.registry.rescan_interval.is_zero() {
            return Err(ConfigError::ZeroRescanInterval);
        }

        Ok(())
    }

    /// Zone of the provided player with the whole board as the default.
    #[must_use]
    pub fn zone_of(&self, player: PlayerId) -> Option<CellRect> {
        let entry = self.players.roster.get(usize::from(player.get()))?;
        Some(entry.zone.unwrap_or_else(|| {
            CellRect::from_origin_and_size(
                CellCoord::new(0, 0),
                CellRectSize::new(self.grid.columns, self.grid.rows),
            )
        }))
    }
}

/// Board dimensions expressed in cells.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GridConfig {
    /// Number of cell columns.
    pub columns: u32,
    /// Number of cell rows.
    pub rows: u32,
}

impl Default for GridConfig {
    fn default() -> Self {
        Self {
            columns: 8,
            rows: 8,
        }
    }
}

/// Mana limits applied to every player.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EconomyConfig {
    /// Balance each player starts the match with.
    pub start_mana: u32,
    /// Upper clamp for every balance.
    pub max_mana: u32,
}

impl Default for EconomyConfig {
    fn default() -> Self {
        Self {
            start_mana: 500,
            max_mana: 50_000,
        }
    }
}

/// Player roster and initial selection.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlayersConfig {
    /// Player drawn from for unattributed placements.
    pub active: PlayerId,
    /// One entry per player, indexed by [`PlayerId`].
    pub roster: Vec<PlayerConfig>,
}

impl Default for PlayersConfig {
    fn default() -> Self {
        Self {
            active: PlayerId::new(0),
            roster: vec![PlayerConfig::default()],
        }
    }
}

/// Per-player settings.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlayerConfig {
    /// Cells the player may build in; the whole board when absent.
    pub zone: Option<CellRect>,
}

/// Wave pacing and archetype weights.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WaveConfig {
    /// Seed from which every wave's random stream is derived.
    pub seed: u64,
    /// Units spawned by the first wave.
    pub start_wave_size: u32,
    /// Additional units per subsequent wave.
    pub wave_size_increase: u32,
    /// Delay between consecutive spawns within a wave.
    #[serde(with = "seconds")]
    pub spawn_interval: Duration,
    /// Pause after the last spawn of a wave.
    #[serde(with = "seconds")]
    pub time_between_waves: Duration,
    /// Probability that a spawn is a fast unit.
    pub fast_chance: f32,
    /// Probability that a spawn is a tank.
    pub tank_chance: f32,
    /// Trailing spawns of every wave forced to the tank archetype.
    pub min_tank_per_wave: u32,
    /// Distance in cells between the board edge and the spawn line.
    pub border_offset: u32,
}

impl Default for WaveConfig {
    fn default() -> Self {
        Self {
            seed: 0x5eed_c17a_de1f_0001,
            start_wave_size: 6,
            wave_size_increase: 2,
            spawn_interval: Duration::from_millis(800),
            time_between_waves: Duration::from_secs(6),
            fast_chance: 0.15,
            tank_chance: 0.05,
            min_tank_per_wave: 1,
            border_offset: 2,
        }
    }
}

/// Stats for every archetype the scheduler may spawn.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct UnitRoster {
    /// Default walker stats.
    pub standard: Option<UnitStats>,
    /// Runner stats.
    pub fast: Option<UnitStats>,
    /// Brute stats.
    pub tank: Option<UnitStats>,
}

impl Default for UnitRoster {
    fn default() -> Self {
        Self {
            standard: Some(UnitArchetype::Standard.default_stats()),
            fast: Some(UnitArchetype::Fast.default_stats()),
            tank: Some(UnitArchetype::Tank.default_stats()),
        }
    }
}

impl UnitRoster {
    /// Stats of the archetype, or `None` when it is disabled.
    #[must_use]
    pub const fn stats(&self, archetype: UnitArchetype) -> Option<UnitStats> {
        match archetype {
            UnitArchetype::Standard => self.standard,
            UnitArchetype::Fast => self.fast,
            UnitArchetype::Tank => self.tank,
        }
    }

    /// Enabled archetypes in fallback order.
    pub fn enabled(&self) -> impl Iterator<Item = UnitArchetype> + '_ {
        UnitArchetype::ALL
            .into_iter()
            .filter(|archetype| self.stats(*archetype).is_some())
    }

    /// Returns the requested archetype, or the first enabled one if it is disabled.
    #[must_use]
    pub fn resolve(&self, requested: UnitArchetype) -> Option<UnitArchetype> {
        if self.stats(requested).is_some() {
            return Some(requested);
        }
        self.enabled().next()
    }
}

/// Projectile and proximity tuning.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CombatConfig {
    /// Projectile travel speed in world units per second.
    pub projectile_speed: f32,
    /// Distance at which a projectile strikes its target.
    pub hit_radius: f32,
    /// Distance from the target beyond which a projectile is discarded.
    pub max_projectile_distance: f32,
    /// Radius of the unit proximity query used to engage structures.
    pub engage_radius: f32,
    /// Half-width of the corridor a main tower blocks for friendly fire.
    pub shot_block_radius: f32,
    /// Distance at which a unit counts as arrived at its destination.
    pub arrive_threshold: f32,
}

impl Default for CombatConfig {
    fn default() -> Self {
        Self {
            projectile_speed: 8.0,
            hit_radius: 0.5,
            max_projectile_distance: 50.0,
            engage_radius: 0.6,
            shot_block_radius: 0.45,
            arrive_threshold: 0.05,
        }
    }
}

/// Registry bookkeeping settings.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RegistryConfig {
    /// Cadence of the self-healing rescan.
    #[serde(with = "seconds")]
    pub rescan_interval: Duration,
    /// Condition under which the match is lost.
    pub end_policy: EndOfMatchPolicy,
}

impl Default for RegistryConfig {
    fn default() -> Self {
        Self {
            rescan_interval: Duration::from_millis(500),
            end_policy: EndOfMatchPolicy::default(),
        }
    }
}

/// Structure placed on behalf of a player when the match starts.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct LayoutEntry {
    /// Cell the structure occupies.
    pub cell: CellCoord,
    /// Kind of structure to build.
    pub kind: StructureKind,
    /// Paying player; the active player when absent.
    #[serde(default)]
    pub player: Option<PlayerId>,
}

/// Serde adapter storing durations as fractional seconds.
pub(crate) mod seconds {
    use std::time::Duration;

    use serde::{de::Error, Deserialize, Deserializer, Serializer};

    pub(crate) fn serialize<S>(value: &Duration, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_f64(value.as_secs_f64())
    }

    pub(crate) fn deserialize<'de, D>(deserializer: D) -> Result<Duration, D::Error>
    where
        D: Deserializer<'de>,
    {
        let secs = f64::deserialize(deserializer)?;
        Duration::try_from_secs_f64(secs).map_err(D::Error::custom)
    }
}
