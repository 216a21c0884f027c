#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Core contracts shared across the Citadel Defence engine.
//!
//! This crate defines the message surface that connects adapters, the
//! authoritative world, and pure systems. Adapters submit [`Command`] values
//! describing desired mutations, the world executes those commands via its
//! `apply` entry point, and then broadcasts [`Event`] values for systems to
//! react to deterministically. Systems consume event streams, query immutable
//! snapshots, and respond exclusively with new command batches.
//!
//! World positions are continuous [`Vec2`] values measured in cells: the
//! centre of cell `(x, y)` sits at `(x, y)`. Rows grow toward the top of the
//! board, so [`Direction::North`] points at increasing row indices.

mod catalog;
mod config;

use std::time::Duration;

pub use glam::Vec2;
use serde::{Deserialize, Serialize};
use thiserror::Error;

pub use catalog::{
    CannonProfile, ShotgunProfile, StructureKind, UnitArchetype, UnitStats, WeaponProfile,
    CANNON_ALIGNMENT_TOLERANCE,
};
pub use config::{
    CombatConfig, EconomyConfig, GridConfig, LayoutEntry, MatchConfig, PlayerConfig,
    PlayersConfig, RegistryConfig, UnitRoster, WaveConfig, MAX_PLAYERS,
};

/// Number of main tower slots guarding the objective.
pub const MAIN_TOWER_SLOTS: usize = 4;

/// Commands that express all permissible world mutations.
#[derive(Clone, Debug, PartialEq)]
pub enum Command {
    /// Advances the simulation clock by the provided delta time.
    Tick {
        /// Duration of simulated time that elapsed since the previous tick.
        dt: Duration,
    },
    /// Selects the player charged for unattributed placements.
    SelectActivePlayer {
        /// Player that becomes active.
        player: PlayerId,
    },
    /// Selects the structure kind used by [`Command::PlaceSelected`].
    SelectStructureType {
        /// Kind that becomes selected.
        kind: StructureKind,
    },
    /// Requests placement of a structure paid for by a player.
    PlaceStructure {
        /// Cell the structure should occupy.
        cell: CellCoord,
        /// Kind of structure to build.
        kind: StructureKind,
        /// Paying player; the active player when absent.
        player: Option<PlayerId>,
    },
    /// Places the currently selected structure kind for the active player.
    PlaceSelected {
        /// Cell the structure should occupy.
        cell: CellCoord,
    },
    /// Places an ownerless structure free of charge, ignoring player zones.
    SeedStructure {
        /// Cell the structure should occupy.
        cell: CellCoord,
        /// Kind of structure to build.
        kind: StructureKind,
    },
    /// Notifies the registry that a structure is gone.
    UnregisterStructure {
        /// Structure to drop from every registry.
        structure: StructureId,
    },
    /// Requests that a structure guard one of the main tower slots.
    RegisterMainTower {
        /// Slot suggested by the caller; the world resolves the real slot.
        slot: SlotIndex,
        /// Structure to register.
        structure: StructureId,
    },
    /// Forces an immediate self-healing rescan of the registry.
    Resync,
    /// Creates a hostile unit at a border position.
    SpawnUnit {
        /// Archetype chosen for the unit.
        archetype: UnitArchetype,
        /// Border the unit enters from.
        side: BorderSide,
        /// World position of the spawn point.
        position: Vec2,
    },
    /// Moves a unit to a new position.
    MoveUnit {
        /// Unit to move.
        unit: UnitId,
        /// Position the unit occupies after the move.
        position: Vec2,
        /// Facing derived from the movement axis.
        facing: Direction,
    },
    /// Suspends a unit's movement and fixes its attack target.
    EngageStructure {
        /// Attacking unit.
        unit: UnitId,
        /// Structure found by the proximity query.
        structure: StructureId,
    },
    /// Returns an attacking unit to its march.
    DisengageUnit {
        /// Unit that lost its target.
        unit: UnitId,
    },
    /// Applies one melee strike from a unit to its target.
    StrikeStructure {
        /// Striking unit.
        unit: UnitId,
        /// Structure receiving the damage.
        structure: StructureId,
    },
    /// Updates a turret's orientation.
    AimTurret {
        /// Structure whose turret rotates.
        structure: StructureId,
        /// New heading in degrees, counter-clockwise from east.
        angle: f32,
    },
    /// Fires a homing projectile at a unit.
    FireProjectile {
        /// Firing structure.
        structure: StructureId,
        /// Unit the projectile homes in on.
        target: UnitId,
    },
    /// Fires a pellet volley; each entry receives one pellet.
    FirePellets {
        /// Firing structure.
        structure: StructureId,
        /// Pellet recipients, repeated entries included.
        targets: Vec<UnitId>,
    },
    /// Reinitializes the match from empty state with the same configuration.
    RestartMatch,
}

/// Events broadcast by the world after processing commands.
#[derive(Clone, Debug, PartialEq)]
pub enum Event {
    /// Indicates that the simulation clock advanced.
    TimeAdvanced {
        /// Duration of simulated time that elapsed in the tick.
        dt: Duration,
    },
    /// Announces a new active player.
    ActivePlayerChanged {
        /// Player that became active.
        player: PlayerId,
    },
    /// Announces a new selected structure kind.
    StructureTypeSelected {
        /// Kind that became selected.
        kind: StructureKind,
    },
    /// Confirms that a structure was placed and registered.
    StructurePlaced {
        /// Identifier assigned by the world.
        structure: StructureId,
        /// Kind of structure that was built.
        kind: StructureKind,
        /// Cell the structure occupies.
        cell: CellCoord,
        /// Player that paid for the structure.
        owner: Option<PlayerId>,
    },
    /// Reports that a placement request was rejected.
    PlacementRejected {
        /// Cell provided in the request.
        cell: CellCoord,
        /// Kind requested, if one was resolved.
        kind: Option<StructureKind>,
        /// Specific reason the placement failed.
        reason: PlacementError,
    },
    /// Reports damage applied to a structure.
    StructureDamaged {
        /// Damaged structure.
        structure: StructureId,
        /// Hit points removed.
        amount: u32,
        /// Hit points left after the hit.
        remaining: u32,
    },
    /// Reports that a structure reached zero hit points.
    StructureDestroyed {
        /// Destroyed structure.
        structure: StructureId,
        /// Kind of the destroyed structure.
        kind: StructureKind,
        /// Cell the structure occupied.
        cell: CellCoord,
    },
    /// Reports that an external notice removed a structure.
    StructureUnregistered {
        /// Removed structure.
        structure: StructureId,
    },
    /// Confirms a main tower registration.
    MainTowerRegistered {
        /// Slot resolved from the tower's quadrant.
        slot: SlotIndex,
        /// Registered structure.
        structure: StructureId,
    },
    /// Reports a rejected main tower registration.
    RegistrationRejected {
        /// Structure named in the request.
        structure: StructureId,
        /// Specific reason the registration failed.
        reason: RegistrationError,
    },
    /// Confirms that a hostile unit entered the board.
    UnitSpawned {
        /// Identifier assigned by the world.
        unit: UnitId,
        /// Archetype of the unit.
        archetype: UnitArchetype,
        /// Spawn position.
        position: Vec2,
    },
    /// Reports that a unit stopped to attack a structure.
    UnitEngaged {
        /// Attacking unit.
        unit: UnitId,
        /// Targeted structure.
        structure: StructureId,
    },
    /// Reports that a unit resumed moving.
    UnitDisengaged {
        /// Unit that resumed its march.
        unit: UnitId,
    },
    /// Reports damage applied to a unit.
    UnitDamaged {
        /// Damaged unit.
        unit: UnitId,
        /// Hit points removed.
        amount: u32,
        /// Hit points left after the hit.
        remaining: u32,
    },
    /// Reports that a unit died.
    UnitDestroyed {
        /// Dead unit.
        unit: UnitId,
        /// Archetype of the dead unit.
        archetype: UnitArchetype,
        /// Mana credited for the kill.
        reward: u32,
        /// Player credited with the reward.
        credited: Option<PlayerId>,
    },
    /// Confirms that a projectile left a turret.
    ProjectileFired {
        /// Identifier assigned by the world.
        projectile: ProjectileId,
        /// Firing structure.
        structure: StructureId,
        /// Unit the projectile homes in on.
        target: UnitId,
    },
    /// Confirms a pellet volley.
    PelletsFired {
        /// Firing structure.
        structure: StructureId,
        /// Pellets that struck a live unit.
        hits: u32,
    },
    /// Reports that a projectile left the simulation.
    ProjectileResolved {
        /// Resolved projectile.
        projectile: ProjectileId,
        /// How the projectile ended.
        outcome: ProjectileOutcome,
    },
    /// Reports that a fire command was refused.
    FireRejected {
        /// Structure that attempted to fire.
        structure: StructureId,
        /// Specific reason the shot was refused.
        reason: CombatError,
    },
    /// Reports a changed mana balance.
    ManaChanged {
        /// Player whose balance changed.
        player: PlayerId,
        /// Balance after the change.
        balance: u32,
    },
    /// Reports repairs performed by a registry rescan.
    RegistryResynced {
        /// Summary of the repairs.
        report: ResyncReport,
    },
    /// Announces the end of the match.
    MatchEnded {
        /// Policy whose condition was met.
        policy: EndOfMatchPolicy,
    },
    /// Announces that the match was reinitialized.
    MatchRestarted,
}

macro_rules! numeric_id {
    ($(#[$meta:meta])* $name:ident($repr:ty)) => {
        $(#[$meta])*
        #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        pub struct $name($repr);

        impl $name {
            /// Creates a new identifier with the provided numeric value.
            #[must_use]
            pub const fn new(value: $repr) -> Self {
                Self(value)
            }

            /// Retrieves the numeric representation of the identifier.
            #[must_use]
            pub const fn get(&self) -> $repr {
                self.0
            }
        }
    };
}

numeric_id!(
    /// Unique identifier assigned to a structure.
    StructureId(u32)
);
numeric_id!(
    /// Unique identifier assigned to a hostile unit.
    UnitId(u32)
);
numeric_id!(
    /// Unique identifier assigned to a projectile.
    ProjectileId(u32)
);
numeric_id!(
    /// Index of a player sharing the match, 0 to 3.
    PlayerId(u8)
);
numeric_id!(
    /// Index of a main tower slot, 0 to 3.
    SlotIndex(u8)
);

impl Default for PlayerId {
    fn default() -> Self {
        Self(0)
    }
}

/// Location of a single grid cell expressed as column and row coordinates.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct CellCoord {
    column: u32,
    row: u32,
}

impl CellCoord {
    /// Creates a new grid cell coordinate.
    #[must_use]
    pub const fn new(column: u32, row: u32) -> Self {
        Self { column, row }
    }

    /// Zero-based column index of the cell.
    #[must_use]
    pub const fn column(&self) -> u32 {
        self.column
    }

    /// Zero-based row index of the cell.
    #[must_use]
    pub const fn row(&self) -> u32 {
        self.row
    }

    /// World position of the cell centre.
    #[must_use]
    pub fn center(self) -> Vec2 {
        Vec2::new(self.column as f32, self.row as f32)
    }

    /// Cell whose centre is closest to the position, if it has non-negative coordinates.
    #[must_use]
    pub fn nearest_to(position: Vec2) -> Option<Self> {
        let column = position.x.round();
        let row = position.y.round();
        if !column.is_finite() || !row.is_finite() || column < 0.0 || row < 0.0 {
            return None;
        }
        Some(Self::new(column as u32, row as u32))
    }
}

/// Axis-aligned rectangle expressed in cell coordinates.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CellRect {
    origin: CellCoord,
    size: CellRectSize,
}

impl CellRect {
    /// Constructs a rectangle from an origin cell and size.
    #[must_use]
    pub const fn from_origin_and_size(origin: CellCoord, size: CellRectSize) -> Self {
        Self { origin, size }
    }

    /// Lowest-indexed cell that anchors the rectangle.
    #[must_use]
    pub const fn origin(&self) -> CellCoord {
        self.origin
    }

    /// Dimensions of the rectangle measured in whole cells.
    #[must_use]
    pub const fn size(&self) -> CellRectSize {
        self.size
    }

    /// Reports whether the cell lies inside the rectangle.
    #[must_use]
    pub const fn contains(&self, cell: CellCoord) -> bool {
        let column = cell.column();
        let row = cell.row();
        column >= self.origin.column()
            && row >= self.origin.row()
            && column - self.origin.column() < self.size.width()
            && row - self.origin.row() < self.size.height()
    }
}

/// Size of a [`CellRect`] measured in whole cells.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CellRectSize {
    width: u32,
    height: u32,
}

impl CellRectSize {
    /// Creates a new size descriptor with explicit dimensions.
    #[must_use]
    pub const fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    /// Width of the rectangle in cells.
    #[must_use]
    pub const fn width(&self) -> u32 {
        self.width
    }

    /// Height of the rectangle in cells.
    #[must_use]
    pub const fn height(&self) -> u32 {
        self.height
    }
}

/// Dimensions of the board and the geometry derived from them.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct GridDimensions {
    columns: u32,
    rows: u32,
}

impl GridDimensions {
    /// Creates a new dimension descriptor.
    #[must_use]
    pub const fn new(columns: u32, rows: u32) -> Self {
        Self { columns, rows }
    }

    /// Number of cell columns.
    #[must_use]
    pub const fn columns(&self) -> u32 {
        self.columns
    }

    /// Number of cell rows.
    #[must_use]
    pub const fn rows(&self) -> u32 {
        self.rows
    }

    /// Reports whether the cell lies on the board.
    #[must_use]
    pub const fn contains(&self, cell: CellCoord) -> bool {
        cell.column() < self.columns && cell.row() < self.rows
    }

    /// Reports whether the rectangle is non-empty and lies fully on the board.
    #[must_use]
    pub const fn contains_rect(&self, rect: CellRect) -> bool {
        let origin = rect.origin();
        let size = rect.size();
        size.width() > 0
            && size.height() > 0
            && origin.column() < self.columns
            && origin.row() < self.rows
            && size.width() <= self.columns - origin.column()
            && size.height() <= self.rows - origin.row()
    }

    /// World position of the board centre.
    #[must_use]
    pub fn center(&self) -> Vec2 {
        Vec2::new(
            (self.columns as f32 - 1.0) / 2.0,
            (self.rows as f32 - 1.0) / 2.0,
        )
    }

    /// The central 2×2 objective: bottom-left, top-left, bottom-right, top-right.
    #[must_use]
    pub const fn objective_cells(&self) -> [CellCoord; 4] {
        let right = self.columns / 2;
        let top = self.rows / 2;
        let left = right.saturating_sub(1);
        let bottom = top.saturating_sub(1);
        [
            CellCoord::new(left, bottom),
            CellCoord::new(left, top),
            CellCoord::new(right, bottom),
            CellCoord::new(right, top),
        ]
    }

    /// Objective corner nearest to the spawn point, chosen independently per axis.
    #[must_use]
    pub fn objective_destination(&self, spawn: Vec2) -> Vec2 {
        let [low, _, _, high] = self.objective_cells();
        let low = low.center();
        let high = high.center();
        let pick = |value: f32, near: f32, far: f32| {
            if (value - near).abs() <= (value - far).abs() {
                near
            } else {
                far
            }
        };
        Vec2::new(pick(spawn.x, low.x, high.x), pick(spawn.y, low.y, high.y))
    }

    /// Main tower slot owning the cell's quadrant.
    ///
    /// Quadrants are measured from the board centre with rows growing
    /// upward: top-left is slot 0, bottom-left 1, top-right 2 and
    /// bottom-right 3. Cells on a centre line fall to the right or bottom.
    #[must_use]
    pub fn quadrant_slot(&self, cell: CellCoord) -> SlotIndex {
        let center = self.center();
        let position = cell.center();
        let left = position.x < center.x;
        let top = position.y > center.y;
        let index = match (left, top) {
            (true, true) => 0,
            (true, false) => 1,
            (false, true) => 2,
            (false, false) => 3,
        };
        SlotIndex::new(index)
    }

    /// Spawn point on a border side, `offset` cells beyond the edge.
    ///
    /// `along` is the coordinate perpendicular to the chosen side.
    #[must_use]
    pub fn border_position(&self, side: BorderSide, offset: u32, along: u32) -> Vec2 {
        let offset = offset as f32;
        let along = along as f32;
        match side {
            BorderSide::Left => Vec2::new(-offset, along),
            BorderSide::Right => Vec2::new(self.columns as f32 + offset - 1.0, along),
            BorderSide::Bottom => Vec2::new(along, -offset),
            BorderSide::Top => Vec2::new(along, self.rows as f32 + offset - 1.0),
        }
    }
}

/// Cardinal directions on the board.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Direction {
    /// Toward increasing row indices.
    North,
    /// Toward increasing column indices.
    East,
    /// Toward decreasing row indices.
    South,
    /// Toward decreasing column indices.
    West,
}

impl Direction {
    /// Dominant cardinal direction of the delta; vertical wins ties.
    #[must_use]
    pub fn dominant(delta: Vec2) -> Self {
        if delta.x.abs() > delta.y.abs() {
            if delta.x >= 0.0 {
                Self::East
            } else {
                Self::West
            }
        } else if delta.y >= 0.0 {
            Self::North
        } else {
            Self::South
        }
    }

    /// Heading of the direction in degrees, counter-clockwise from east.
    #[must_use]
    pub const fn angle_degrees(self) -> f32 {
        match self {
            Self::East => 0.0,
            Self::North => 90.0,
            Self::West => 180.0,
            Self::South => 270.0,
        }
    }
}

/// Board edge a unit enters from.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum BorderSide {
    /// Column `-offset`.
    Left,
    /// Column `columns + offset - 1`.
    Right,
    /// Row `-offset`.
    Bottom,
    /// Row `rows + offset - 1`.
    Top,
}

impl BorderSide {
    /// Every side, in draw order.
    pub const ALL: [BorderSide; 4] = [Self::Left, Self::Right, Self::Bottom, Self::Top];

    /// Axis a unit entering from this side resolves first.
    #[must_use]
    pub const fn axis_priority(self) -> AxisPriority {
        match self {
            Self::Left | Self::Right => AxisPriority::XFirst,
            Self::Bottom | Self::Top => AxisPriority::YFirst,
        }
    }
}

/// Order in which a unit closes the distance to its destination.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum AxisPriority {
    /// Resolve the column delta before the row delta.
    XFirst,
    /// Resolve the row delta before the column delta.
    YFirst,
}

/// Line a unit shares with a turret.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum AlignmentAxis {
    /// Same column as the turret.
    Vertical,
    /// Same row as the turret.
    Horizontal,
}

impl AlignmentAxis {
    /// Axis shared by a unit at `delta` from the turret, if any.
    #[must_use]
    pub fn of(delta: Vec2, tolerance: f32) -> Option<Self> {
        if delta.x.abs() <= tolerance {
            Some(Self::Vertical)
        } else if delta.y.abs() <= tolerance {
            Some(Self::Horizontal)
        } else {
            None
        }
    }

    /// Reports whether `delta` stays on this axis within `tolerance`.
    #[must_use]
    pub fn holds(self, delta: Vec2, tolerance: f32) -> bool {
        match self {
            Self::Vertical => delta.x.abs() <= tolerance,
            Self::Horizontal => delta.y.abs() <= tolerance,
        }
    }

    /// Cardinal direction along this axis toward `delta`.
    #[must_use]
    pub fn facing(self, delta: Vec2) -> Direction {
        match self {
            Self::Vertical if delta.y >= 0.0 => Direction::North,
            Self::Vertical => Direction::South,
            Self::Horizontal if delta.x >= 0.0 => Direction::East,
            Self::Horizontal => Direction::West,
        }
    }
}

/// Behavioural state of a hostile unit.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum UnitState {
    /// Marching toward the objective.
    Moving,
    /// Standing still and striking a structure.
    Attacking,
    /// Killed; removed on the next tick.
    Dead,
}

/// Lifecycle phase of the match.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum MatchPhase {
    /// Timers run and commands are accepted.
    Running,
    /// The end condition was met; everything is frozen.
    Ended,
}

/// Condition under which the defenders lose.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EndOfMatchPolicy {
    /// Every main tower slot has been filled once and all are now empty or at zero hp.
    #[default]
    MainTowersDestroyed,
    /// The live structure set became empty after having been non-empty.
    RegistryEmptied,
}

/// How a projectile left the simulation.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ProjectileOutcome {
    /// Reached its target and applied damage.
    Hit,
    /// Drifted beyond the maximum distance from its target.
    OutOfRange,
    /// Its target died or vanished first.
    TargetLost,
}

/// Repairs performed by one registry rescan.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct ResyncReport {
    /// Size of the live set after the rescan.
    pub live: usize,
    /// Structures that joined the live set.
    pub added: usize,
    /// Structures that left the live set.
    pub removed: usize,
    /// Grid links to missing or destroyed structures that were cleared.
    pub stale_links_cleared: usize,
    /// Structures whose recorded cell was corrected from the grid.
    pub relinked: usize,
    /// Live structures missing from the grid that were put back.
    pub orphans_restored: usize,
}

impl ResyncReport {
    /// Reports whether the rescan changed nothing.
    #[must_use]
    pub const fn is_clean(&self) -> bool {
        self.added == 0
            && self.removed == 0
            && self.stale_links_cleared == 0
            && self.relinked == 0
            && self.orphans_restored == 0
    }
}

/// Reasons a placement request may be rejected by the world.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Error)]
pub enum PlacementError {
    /// The cell already holds a structure.
    #[error("cell is already occupied")]
    CellOccupied,
    /// The paying player cannot afford the structure.
    #[error("not enough mana")]
    InsufficientResources,
    /// The cell is off the board or outside the player's zone.
    #[error("cell is out of bounds or outside the player's zone")]
    InvalidCell,
    /// The named player does not exist.
    #[error("unknown player")]
    UnknownPlayer,
    /// No structure kind has been selected yet.
    #[error("no structure type selected")]
    NothingSelected,
    /// The match is over.
    #[error("the match has ended")]
    MatchEnded,
}

/// Reasons a fire command may be refused.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Error)]
pub enum CombatError {
    /// The target died between selection and firing.
    #[error("target is no longer alive")]
    TargetInvalidated,
    /// The turret is still reloading.
    #[error("turret is reloading")]
    NotReady,
    /// The structure has no weapon of the requested kind.
    #[error("structure cannot fire this way")]
    Unarmed,
}

/// Reasons a main tower registration may be refused.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Error)]
pub enum RegistrationError {
    /// The structure already holds the resolved slot.
    #[error("structure is already registered in this slot")]
    DuplicateRegistration,
    /// No live structure carries the identifier.
    #[error("unknown structure")]
    UnknownStructure,
    /// Another live structure already guards the resolved slot.
    #[error("main tower slot is held by another structure")]
    SlotTaken,
}

/// Configuration problems that prevent a match from starting.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Error)]
pub enum ConfigError {
    /// A grid dimension is zero.
    #[error("grid dimensions must be non-zero")]
    ZeroDimensions,
    /// The grid cannot hold the 2×2 objective.
    #[error("grid {columns}x{rows} is too small for the 2x2 objective")]
    GridTooSmall {
        /// Configured columns.
        columns: u32,
        /// Configured rows.
        rows: u32,
    },
    /// The mana cap is zero.
    #[error("maximum mana must be non-zero")]
    ZeroMaxMana,
    /// Players would start above the mana cap.
    #[error("starting mana {start} exceeds the maximum {max}")]
    StartManaExceedsMax {
        /// Configured starting balance.
        start: u32,
        /// Configured cap.
        max: u32,
    },
    /// The roster is empty or too large.
    #[error("between 1 and 4 players are required, got {count}")]
    PlayerCount {
        /// Configured roster size.
        count: usize,
    },
    /// The initially active player is not on the roster.
    #[error("active player {player:?} is not on the roster")]
    UnknownActivePlayer {
        /// Configured active player.
        player: PlayerId,
    },
    /// A player zone is empty or leaves the board.
    #[error("zone of player {player} is empty or leaves the board")]
    InvalidZone {
        /// Roster index of the offending player.
        player: usize,
    },
    /// Every unit archetype is disabled.
    #[error("at least one unit archetype must be configured")]
    NoArchetypes,
    /// Archetype weights are outside `[0, 1]` or sum above one.
    #[error("archetype chances must lie in [0, 1] and sum to at most 1")]
    InvalidChance,
    /// Spawns would happen infinitely often.
    #[error("spawn interval must be non-zero")]
    ZeroSpawnInterval,
    /// Every wave would be empty.
    #[error("waves must contain at least one unit")]
    EmptyWaves,
    /// Rescans would happen infinitely often.
    #[error("rescan interval must be non-zero")]
    ZeroRescanInterval,
}

/// Immutable representation of a single structure's state used for queries.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct StructureSnapshot {
    /// Identifier allocated to the structure by the world.
    pub id: StructureId,
    /// Kind of structure that was constructed.
    pub kind: StructureKind,
    /// Cell the structure occupies.
    pub cell: CellCoord,
    /// Player that paid for the structure.
    pub owner: Option<PlayerId>,
    /// Current hit points.
    pub hp: u32,
    /// Hit points at activation.
    pub max_hp: u32,
    /// Turret heading in degrees, `None` until the first target is acquired.
    pub turret_angle: Option<f32>,
    /// Remaining reload time.
    pub ready_in: Duration,
}

impl StructureSnapshot {
    /// World position of the structure.
    #[must_use]
    pub fn position(&self) -> Vec2 {
        self.cell.center()
    }
}

/// Read-only snapshot describing all live structures.
#[derive(Clone, Debug, Default)]
pub struct StructureView {
    snapshots: Vec<StructureSnapshot>,
}

impl StructureView {
    /// Creates a new structure view from the provided snapshots.
    #[must_use]
    pub fn from_snapshots(mut snapshots: Vec<StructureSnapshot>) -> Self {
        snapshots.sort_by_key(|snapshot| snapshot.id);
        Self { snapshots }
    }

    /// Iterator over the captured snapshots in deterministic order.
    pub fn iter(&self) -> impl Iterator<Item = &StructureSnapshot> {
        self.snapshots.iter()
    }

    /// Looks up the snapshot of a structure.
    #[must_use]
    pub fn get(&self, id: StructureId) -> Option<&StructureSnapshot> {
        self.snapshots
            .binary_search_by_key(&id, |snapshot| snapshot.id)
            .ok()
            .map(|index| &self.snapshots[index])
    }

    /// Number of captured structures.
    #[must_use]
    pub fn len(&self) -> usize {
        self.snapshots.len()
    }

    /// Reports whether the view holds no structures.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.snapshots.is_empty()
    }

    /// Consumes the view, yielding the underlying snapshots.
    #[must_use]
    pub fn into_vec(self) -> Vec<StructureSnapshot> {
        self.snapshots
    }
}

/// Immutable representation of a single hostile unit's state used for queries.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct UnitSnapshot {
    /// Identifier allocated to the unit by the world.
    pub id: UnitId,
    /// Archetype chosen at spawn.
    pub archetype: UnitArchetype,
    /// Current position.
    pub position: Vec2,
    /// Objective corner fixed at spawn.
    pub destination: Vec2,
    /// Axis resolved first, fixed at spawn.
    pub axis_priority: AxisPriority,
    /// Direction of the last movement.
    pub facing: Direction,
    /// Behavioural state.
    pub state: UnitState,
    /// Structure under attack.
    pub target: Option<StructureId>,
    /// Current hit points.
    pub hp: u32,
    /// Travel speed in world units per second.
    pub speed: f32,
    /// Remaining time before the next strike may land.
    pub attack_ready_in: Duration,
}

/// Read-only snapshot describing all hostile units.
#[derive(Clone, Debug, Default)]
pub struct UnitView {
    snapshots: Vec<UnitSnapshot>,
}

impl UnitView {
    /// Creates a new unit view from the provided snapshots.
    #[must_use]
    pub fn from_snapshots(mut snapshots: Vec<UnitSnapshot>) -> Self {
        snapshots.sort_by_key(|snapshot| snapshot.id);
        Self { snapshots }
    }

    /// Iterator over the captured snapshots in deterministic order.
    pub fn iter(&self) -> impl Iterator<Item = &UnitSnapshot> {
        self.snapshots.iter()
    }

    /// Iterator over units that have not died.
    pub fn alive(&self) -> impl Iterator<Item = &UnitSnapshot> {
        self.snapshots
            .iter()
            .filter(|snapshot| snapshot.state != UnitState::Dead)
    }

    /// Looks up the snapshot of a unit.
    #[must_use]
    pub fn get(&self, id: UnitId) -> Option<&UnitSnapshot> {
        self.snapshots
            .binary_search_by_key(&id, |snapshot| snapshot.id)
            .ok()
            .map(|index| &self.snapshots[index])
    }

    /// Consumes the view, yielding the underlying snapshots.
    #[must_use]
    pub fn into_vec(self) -> Vec<UnitSnapshot> {
        self.snapshots
    }
}

/// Immutable representation of an in-flight projectile.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ProjectileSnapshot {
    /// Identifier allocated to the projectile.
    pub id: ProjectileId,
    /// Structure that fired the projectile.
    pub source: StructureId,
    /// Unit the projectile homes in on.
    pub target: UnitId,
    /// Current position.
    pub position: Vec2,
    /// Damage applied on impact.
    pub damage: u32,
}

/// Health of one main tower slot.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct MainTowerSlotSnapshot {
    /// Slot index.
    pub slot: SlotIndex,
    /// Structure guarding the slot.
    pub structure: Option<StructureId>,
    /// Current hit points, zero when the slot is empty.
    pub hp: u32,
    /// Highest hit points observed for the slot.
    pub peak_hp: u32,
}

impl MainTowerSlotSnapshot {
    /// Fraction of peak health remaining, in `[0, 1]`.
    #[must_use]
    pub fn health_ratio(&self) -> f32 {
        if self.peak_hp == 0 {
            return 0.0;
        }
        (self.hp as f32 / self.peak_hp as f32).clamp(0.0, 1.0)
    }
}

/// Mana balance of one player.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ManaSnapshot {
    /// Player owning the balance.
    pub player: PlayerId,
    /// Current balance.
    pub balance: u32,
    /// Upper clamp for the balance.
    pub max: u32,
}

/// Read-only view into the dense structure occupancy grid.
#[derive(Clone, Copy, Debug)]
pub struct OccupancyView<'a> {
    cells: &'a [Option<StructureId>],
    columns: u32,
    rows: u32,
}

impl<'a> OccupancyView<'a> {
    /// Captures a new occupancy view backed by the provided cell slice.
    #[must_use]
    pub fn new(cells: &'a [Option<StructureId>], columns: u32, rows: u32) -> Self {
        Self {
            cells,
            columns,
            rows,
        }
    }

    /// Returns the structure occupying the provided cell, if any.
    #[must_use]
    pub fn occupant(&self, cell: CellCoord) -> Option<StructureId> {
        self.index(cell)
            .and_then(|index| self.cells.get(index).copied().flatten())
    }

    /// Reports whether the cell is on the board and free.
    #[must_use]
    pub fn is_free(&self, cell: CellCoord) -> bool {
        self.index(cell).is_some() && self.occupant(cell).is_none()
    }

    /// Provides the dimensions of the underlying occupancy grid.
    #[must_use]
    pub const fn dimensions(&self) -> (u32, u32) {
        (self.columns, self.rows)
    }

    fn index(&self, cell: CellCoord) -> Option<usize> {
        if cell.column() < self.columns && cell.row() < self.rows {
            let row = usize::try_from(cell.row()).ok()?;
            let column = usize::try_from(cell.column()).ok()?;
            let width = usize::try_from(self.columns).ok()?;
            Some(row * width + column)
        } else {
            None
        }
    }
}

/// Target assignment produced by the targeting system for one turret.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TurretTarget {
    /// Turret that acquired the target.
    pub structure: StructureId,
    /// Selected unit.
    pub unit: UnitId,
    /// World position of the turret.
    pub structure_position: Vec2,
    /// World position of the unit.
    pub unit_position: Vec2,
    /// Line shared by the turret and the unit.
    pub axis: AlignmentAxis,
    /// Turret heading after this tick's bounded rotation.
    pub aim_angle: f32,
}

/// Heading of a vector in degrees, counter-clockwise from east, in `[0, 360)`.
#[must_use]
pub fn heading_degrees(vector: Vec2) -> f32 {
    vector.y.atan2(vector.x).to_degrees().rem_euclid(360.0)
}

/// Signed shortest rotation from `from` to `to`, in `(-180, 180]`.
#[must_use]
pub fn delta_angle(from: f32, to: f32) -> f32 {
    let delta = (to - from).rem_euclid(360.0);
    if delta > 180.0 {
        delta - 360.0
    } else {
        delta
    }
}

/// Rotates `current` toward `target` by at most `max_delta` degrees along the shortest arc.
#[must_use]
pub fn move_towards_angle(current: f32, target: f32, max_delta: f32) -> f32 {
    let delta = delta_angle(current, target);
    if delta.abs() <= max_delta {
        return target.rem_euclid(360.0);
    }
    (current + max_delta.max(0.0) * delta.signum()).rem_euclid(360.0)
}
