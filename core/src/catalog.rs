//! Static catalog of structure kinds and hostile unit archetypes.

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Positional tolerance used by the cannon family when testing line alignment.
pub const CANNON_ALIGNMENT_TOLERANCE: f32 = 0.1;

/// Types of structures that can occupy a grid cell.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum StructureKind {
    /// Basic objective tower guarding the centre of the board.
    MainTower,
    /// Balanced single-projectile turret.
    Cannon,
    /// Slow turret that trades fire rate for damage.
    HeavyCannon,
    /// Cheap turret with a short reload.
    RapidCannon,
    /// Turret with the shortest reload and the lightest rounds.
    MachineGun,
    /// Short-ranged turret that splits its shot into pellets.
    Shotgun,
}

impl StructureKind {
    /// Every structure kind in catalog order.
    pub const ALL: [StructureKind; 6] = [
        Self::MainTower,
        Self::Cannon,
        Self::HeavyCannon,
        Self::RapidCannon,
        Self::MachineGun,
        Self::Shotgun,
    ];

    /// Hit points a freshly constructed structure starts with.
    #[must_use]
    pub const fn max_hp(self) -> u32 {
        match self {
            Self::MainTower => 200,
            Self::Cannon => 100,
            Self::HeavyCannon => 220,
            Self::RapidCannon => 80,
            Self::MachineGun => 90,
            Self::Shotgun => 140,
        }
    }

    /// Damage dealt by a single projectile or pellet.
    #[must_use]
    pub const fn damage(self) -> u32 {
        match self {
            Self::MainTower | Self::Cannon => 20,
            Self::HeavyCannon => 55,
            Self::RapidCannon => 10,
            Self::MachineGun => 6,
            Self::Shotgun => 8,
        }
    }

    /// Energy upkeep reported for the structure.
    #[must_use]
    pub const fn energy_cost(self) -> u32 {
        match self {
            Self::MainTower | Self::Cannon => 5,
            Self::HeavyCannon => 12,
            Self::RapidCannon => 7,
            Self::MachineGun => 6,
            Self::Shotgun => 8,
        }
    }

    /// Mana debited from the placing player.
    #[must_use]
    pub const fn price(self) -> u32 {
        match self {
            Self::MainTower => 50,
            Self::Cannon | Self::HeavyCannon => 150,
            Self::RapidCannon => 75,
            Self::MachineGun => 200,
            Self::Shotgun => 250,
        }
    }

    /// Reports whether the kind guards the objective.
    #[must_use]
    pub const fn is_main_tower(self) -> bool {
        matches!(self, Self::MainTower)
    }

    /// Weapon mounted on the structure, if it can fire at all.
    #[must_use]
    pub const fn weapon(self) -> Option<WeaponProfile> {
        match self {
            Self::MainTower => None,
            Self::Cannon => Some(WeaponProfile::Cannon(CannonProfile {
                scan_range: 100.0,
                fire_cooldown: Duration::from_millis(500),
                rotation_speed: 180.0,
            })),
            Self::HeavyCannon => Some(WeaponProfile::Cannon(CannonProfile {
                scan_range: 140.0,
                fire_cooldown: Duration::from_millis(1_200),
                rotation_speed: 90.0,
            })),
            Self::RapidCannon => Some(WeaponProfile::Cannon(CannonProfile {
                scan_range: 120.0,
                fire_cooldown: Duration::from_millis(200),
                rotation_speed: 720.0,
            })),
            Self::MachineGun => Some(WeaponProfile::Cannon(CannonProfile {
                scan_range: 120.0,
                fire_cooldown: Duration::from_millis(120),
                rotation_speed: 720.0,
            })),
            Self::Shotgun => Some(WeaponProfile::Shotgun(ShotgunProfile {
                scan_range: 6.0,
                fire_cooldown: Duration::from_millis(1_100),
                rotation_speed: 360.0,
                pellets: 6,
                pellet_damage: 8,
                spread_radius: 1.5,
                align_threshold: 0.12,
            })),
        }
    }
}

/// Firing behaviour attached to a structure kind.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum WeaponProfile {
    /// Fires one homing projectile per shot.
    Cannon(CannonProfile),
    /// Splits each shot into pellets spread across aligned units.
    Shotgun(ShotgunProfile),
}

impl WeaponProfile {
    /// Maximum Euclidean distance at which a target may be selected.
    #[must_use]
    pub const fn scan_range(&self) -> f32 {
        match self {
            Self::Cannon(profile) => profile.scan_range,
            Self::Shotgun(profile) => profile.scan_range,
        }
    }

    /// Reload time applied after every successful shot.
    #[must_use]
    pub const fn fire_cooldown(&self) -> Duration {
        match self {
            Self::Cannon(profile) => profile.fire_cooldown,
            Self::Shotgun(profile) => profile.fire_cooldown,
        }
    }

    /// Turret turn rate in degrees per second.
    #[must_use]
    pub const fn rotation_speed(&self) -> f32 {
        match self {
            Self::Cannon(profile) => profile.rotation_speed,
            Self::Shotgun(profile) => profile.rotation_speed,
        }
    }

    /// Maximum off-axis offset a unit may have and still count as in line.
    #[must_use]
    pub const fn alignment_tolerance(&self) -> f32 {
        match self {
            Self::Cannon(_) => CANNON_ALIGNMENT_TOLERANCE,
            Self::Shotgun(profile) => profile.align_threshold,
        }
    }
}

/// Parameters of the single-projectile turret family.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CannonProfile {
    /// Maximum target distance in world units.
    pub scan_range: f32,
    /// Reload time applied after every shot.
    pub fire_cooldown: Duration,
    /// Turret turn rate in degrees per second.
    pub rotation_speed: f32,
}

/// Parameters of the pellet-spreading turret.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ShotgunProfile {
    /// Maximum target distance in world units.
    pub scan_range: f32,
    /// Reload time applied after every shot.
    pub fire_cooldown: Duration,
    /// Turret turn rate in degrees per second.
    pub rotation_speed: f32,
    /// Number of pellets distributed per shot.
    pub pellets: u32,
    /// Damage applied by each pellet.
    pub pellet_damage: u32,
    /// Radius around the primary target that pellets may spread to.
    pub spread_radius: f32,
    /// Off-axis tolerance used for targeting and pellet spread.
    pub align_threshold: f32,
}

/// Archetypes of hostile units produced by the wave scheduler.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum UnitArchetype {
    /// Default walker.
    Standard,
    /// Fragile runner.
    Fast,
    /// Armoured brute guaranteed at the end of every wave.
    Tank,
}

impl UnitArchetype {
    /// Every archetype in fallback order.
    pub const ALL: [UnitArchetype; 3] = [Self::Standard, Self::Fast, Self::Tank];

    /// Stats used when the configuration does not override the archetype.
    #[must_use]
    pub const fn default_stats(self) -> UnitStats {
        match self {
            Self::Standard => UnitStats {
                hp: 100,
                damage: 20,
                speed: 0.5,
                mana_reward: 30,
                attack_interval: Duration::from_secs(1),
            },
            Self::Fast => UnitStats {
                hp: 30,
                damage: 5,
                speed: 4.0,
                mana_reward: 20,
                attack_interval: Duration::from_secs(1),
            },
            Self::Tank => UnitStats {
                hp: 250,
                damage: 25,
                speed: 1.5,
                mana_reward: 80,
                attack_interval: Duration::from_secs(1),
            },
        }
    }
}

/// Combat and movement parameters of a hostile unit archetype.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct UnitStats {
    /// Starting hit points.
    pub hp: u32,
    /// Damage applied to a structure per strike.
    pub damage: u32,
    /// Travel speed in world units per second.
    pub speed: f32,
    /// Mana credited once when the unit dies.
    pub mana_reward: u32,
    /// Time between consecutive strikes.
    #[serde(with = "crate::config::seconds")]
    pub attack_interval: Duration,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn main_tower_is_unarmed() {
        assert!(StructureKind::MainTower.weapon().is_none());
        assert!(StructureKind::MainTower.is_main_tower());
    }

    #[test]
    fn every_turret_carries_a_weapon() {
        for kind in StructureKind::ALL {
            if kind.is_main_tower() {
                continue;
            }
            let weapon = kind.weapon();
            assert!(weapon.is_some(), "{kind:?} should be armed");
        }
    }

    #[test]
    fn shotgun_alignment_is_wider_than_cannon() {
        let Some(shotgun) = StructureKind::Shotgun.weapon() else {
            panic!("shotgun must be armed");
        };
        let Some(cannon) = StructureKind::Cannon.weapon() else {
            panic!("cannon must be armed");
        };
        assert!(shotgun.alignment_tolerance() > cannon.alignment_tolerance());
        assert!((cannon.scan_range() - 100.0).abs() < f32::EPSILON);
    }

    #[test]
    fn tank_outlasts_other_archetypes() {
        let tank = UnitArchetype::Tank.default_stats();
        for archetype in UnitArchetype::ALL {
            assert!(archetype.default_stats().hp <= tank.hp);
        }
    }
}
