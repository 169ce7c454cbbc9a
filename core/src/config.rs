//! Explicit game configuration loaded once at startup.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::{Cell, PlayerIndex, Tick, UnitTypeId};

/// Size class of a unit.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum UnitMake {
    /// Regular purchasable unit.
    Normal,
    /// Unit with special abilities.
    Special,
    /// The player's big shot.
    Big,
}

/// Static description of one unit type.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct UnitConfig {
    /// Identifier referenced by purchases and unit pieces.
    pub id: UnitTypeId,
    /// Human-readable type name.
    pub name: String,
    /// Size class of the unit.
    pub make: UnitMake,
    /// Killing a leader pulls its team's pending respawns forward.
    #[serde(default)]
    pub leader: bool,
    /// Whether the unit returns to play after dying in respawning scenarios.
    #[serde(default = "default_true")]
    pub respawns: bool,
    /// Damage dealt by one shot of the unit.
    pub damage: u8,
}

/// Round timing and board economy parameters.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoundConfig {
    /// Number of ticks in a round.
    pub duration: Tick,
    /// Number of rounds in a game.
    pub rounds: usize,
    /// Delay between a unit's death and its respawn.
    pub respawn_ticks: Tick,
    /// Ticks between bonus placement attempts.
    pub bonus_interval: Tick,
    /// Bonuses allowed on the board per seated player.
    pub max_bonuses_per_player: usize,
    /// Wall-clock length of one tick, used for game time statistics.
    #[serde(default = "default_tick_millis")]
    pub tick_millis: u64,
}

impl Default for RoundConfig {
    fn default() -> Self {
        Self {
            duration: 300,
            rounds: 3,
            respawn_ticks: 12,
            bonus_interval: 10,
            max_bonuses_per_player: 1,
            tick_millis: default_tick_millis(),
        }
    }
}

/// Timing of the scripted wendigo waves.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct WendigoConfig {
    /// Minimum ticks between waves.
    pub min_ticks: Tick,
    /// Maximum ticks between waves.
    pub max_ticks: Tick,
    /// Ticks a wave waits at the board edge before charging.
    pub wait: Tick,
}

impl Default for WendigoConfig {
    fn default() -> Self {
        Self {
            min_ticks: 40,
            max_ticks: 60,
            wait: 6,
        }
    }
}

/// Complete game configuration passed by reference into the engine.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameConfig {
    /// Available unit types.
    pub units: Vec<UnitConfig>,
    /// Round parameters.
    #[serde(default)]
    pub round: RoundConfig,
    /// Wendigo wave parameters.
    #[serde(default)]
    pub wendigo: WendigoConfig,
    /// Seed of the scenario random source.
    #[serde(default)]
    pub seed: u64,
}

impl Default for GameConfig {
    fn default() -> Self {
        let unit = |id: u16, name: &str, make: UnitMake, leader: bool, damage: u8| UnitConfig {
            id: UnitTypeId::new(id),
            name: name.to_owned(),
            make,
            leader,
            respawns: true,
            damage,
        };
        Self {
            units: vec![
                unit(1, "gunslinger", UnitMake::Normal, false, 34),
                unit(2, "dirigible", UnitMake::Normal, false, 25),
                unit(3, "artillery", UnitMake::Normal, false, 50),
                unit(4, "revolutionary", UnitMake::Special, true, 30),
                unit(5, "cavalry", UnitMake::Big, false, 40),
            ],
            round: RoundConfig::default(),
            wendigo: WendigoConfig::default(),
            seed: 0x0b16_6a11,
        }
    }
}

impl GameConfig {
    /// Looks up a unit type.
    #[must_use]
    pub fn unit(&self, id: UnitTypeId) -> Option<&UnitConfig> {
        self.units.iter().find(|unit| unit.id == id)
    }

    /// Looks up a unit type by name.
    #[must_use]
    pub fn unit_by_name(&self, name: &str) -> Option<&UnitConfig> {
        self.units.iter().find(|unit| unit.name == name)
    }

    /// Checks the configuration for inconsistent values.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.units.is_empty() {
            return Err(ConfigError::Invalid("no unit types configured".to_owned()));
        }
        for (index, unit) in self.units.iter().enumerate() {
            if self.units[..index].iter().any(|other| other.id == unit.id) {
                return Err(ConfigError::Invalid(format!(
                    "unit type {} declared twice",
                    unit.id.get()
                )));
            }
        }
        if self.round.duration == 0 {
            return Err(ConfigError::Invalid("round duration must be positive".to_owned()));
        }
        if self.round.rounds == 0 {
            return Err(ConfigError::Invalid("a game needs at least one round".to_owned()));
        }
        if self.round.respawn_ticks == 0 {
            return Err(ConfigError::Invalid("respawn delay must be positive".to_owned()));
        }
        if self.wendigo.min_ticks == 0 || self.wendigo.min_ticks > self.wendigo.max_ticks {
            return Err(ConfigError::Invalid(format!(
                "wendigo interval [{}, {}] is empty",
                self.wendigo.min_ticks, self.wendigo.max_ticks
            )));
        }
        Ok(())
    }
}

fn default_true() -> bool {
    true
}

fn default_tick_millis() -> u64 {
    1_750
}

/// Errors raised when board or game configuration cannot support a round.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum ConfigError {
    /// A player has no start marker on the board.
    #[error("no start marker for player {}", .player.get())]
    MissingStartMarker {
        /// Player lacking a start marker.
        player: PlayerIndex,
    },
    /// A claim could not be matched to any start marker.
    #[error("no start marker for claim at ({}, {})", .cell.x(), .cell.y())]
    UnassignedClaim {
        /// Position of the claim.
        cell: Cell,
    },
    /// A player's start marker has no claim to defend.
    #[error("no claim for player {}", .player.get())]
    MissingClaim {
        /// Player lacking a claim.
        player: PlayerIndex,
    },
    /// The scenario requires at least one marker of the named kind.
    #[error("board has no {0} markers")]
    MissingMarkers(&'static str),
    /// A purchase references an unknown unit type.
    #[error("unknown unit type {}", .0.get())]
    UnknownUnitType(UnitTypeId),
    /// There is no free cell near a start marker for a purchased unit.
    #[error("no room near start marker of player {}", .player.get())]
    NoRoomAtStart {
        /// Player whose unit could not be placed.
        player: PlayerIndex,
    },
    /// A configuration value is out of range.
    #[error("invalid configuration: {0}")]
    Invalid(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_configuration_is_valid() {
        let config = GameConfig::default();
        assert_eq!(config.validate(), Ok(()));
        let leader = config.unit_by_name("revolutionary").map(|unit| unit.leader);
        assert_eq!(leader, Some(true));
    }

    #[test]
    fn inverted_wendigo_interval_is_rejected() {
        let mut config = GameConfig::default();
        config.wendigo.min_ticks = 80;
        assert!(matches!(config.validate(), Err(ConfigError::Invalid(_))));
    }

    #[test]
    fn partial_json_falls_back_to_defaults() {
        let json = r#"{
            "units": [
                { "id": 7, "name": "tricksterraven", "make": "Big", "damage": 45 }
            ],
            "seed": 99
        }"#;
        let config: GameConfig = serde_json::from_str(json).expect("valid configuration");
        assert_eq!(config.seed, 99);
        assert_eq!(config.round, RoundConfig::default());
        let unit = config.unit(UnitTypeId::new(7)).expect("unit is declared");
        assert!(unit.respawns);
        assert!(!unit.leader);
        assert_eq!(config.validate(), Ok(()));
    }

    #[test]
    fn missing_start_marker_message_names_the_problem() {
        let error = ConfigError::UnassignedClaim {
            cell: Cell::new(4, 7),
        };
        assert_eq!(error.to_string(), "no start marker for claim at (4, 7)");
    }
}
