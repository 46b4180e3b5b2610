use crate::core::models::ids::UnitId;
use serde::Deserialize;
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;
use thiserror::Error;

/// Largest slit size whose power-of-two rounding still fits a `u32` box extent.
const MAX_SLIT_SIZE: u32 = 1 << 31;

#[derive(Debug, Error, PartialEq, Eq, Clone)]
pub enum ConfigError {
    #[error("Missing required parameter: {0}")]
    MissingParameter(&'static str),
    #[error("Invalid value for '{name}': {reason}")]
    InvalidParameter { name: &'static str, reason: String },
}

/// Selects which chain ends are pinned and how far the chain spans along Z.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize)]
#[serde(try_from = "String")]
pub enum FixMode {
    /// Only the first unit is pinned, at the bottom of the slit.
    SingleFixpointBottom,
    /// The first unit sits on the bottom and the last one on the top wall; both pinned.
    DoubleFixedAtWalls,
    /// The first unit is pinned at the bottom, the last one at a given height in space.
    FixedAtWallAndInSpace,
}

impl FixMode {
    pub fn pins_both_ends(self) -> bool {
        !matches!(self, FixMode::SingleFixpointBottom)
    }

    pub fn index(self) -> u8 {
        match self {
            FixMode::SingleFixpointBottom => 0,
            FixMode::DoubleFixedAtWalls => 1,
            FixMode::FixedAtWallAndInSpace => 2,
        }
    }
}

impl fmt::Display for FixMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            FixMode::SingleFixpointBottom => "single-fixpoint-bottom",
            FixMode::DoubleFixedAtWalls => "double-fixed-at-walls",
            FixMode::FixedAtWallAndInSpace => "fixed-at-wall-and-in-space",
        };
        f.write_str(name)
    }
}

impl FromStr for FixMode {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "0" | "bottom" | "single-fixpoint-bottom" => Ok(FixMode::SingleFixpointBottom),
            "1" | "walls" | "double-fixed-at-walls" => Ok(FixMode::DoubleFixedAtWalls),
            "2" | "space" | "fixed-at-wall-and-in-space" => Ok(FixMode::FixedAtWallAndInSpace),
            other => Err(ConfigError::InvalidParameter {
                name: "fix_mode",
                reason: format!("unknown fix mode '{}' (expected 0, 1 or 2)", other),
            }),
        }
    }
}

impl TryFrom<String> for FixMode {
    type Error = ConfigError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChainInSlitConfig {
    pub chain_length: usize,
    pub slit_size: u32,
    pub box_xy: u32,
    pub fix_mode: FixMode,
    /// Height of the pinned last unit; only used by [`FixMode::FixedAtWallAndInSpace`].
    pub distance_fixpoint_wall: Option<u32>,
}

impl ChainInSlitConfig {
    /// The Z extent the chain is stacked toward: the fixpoint distance for the
    /// wall-and-space mode, the slit size otherwise.
    pub fn span_height(&self) -> u32 {
        match (self.fix_mode, self.distance_fixpoint_wall) {
            (FixMode::FixedAtWallAndInSpace, Some(distance)) => distance,
            _ => self.slit_size,
        }
    }

    /// Checks the value ranges the builder enforces. Configs assembled by hand should be
    /// passed through this before use.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.chain_length == 0 {
            return Err(ConfigError::InvalidParameter {
                name: "chain_length",
                reason: "must be positive".to_string(),
            });
        }
        if !(2..=MAX_SLIT_SIZE).contains(&self.slit_size) {
            return Err(ConfigError::InvalidParameter {
                name: "slit_size",
                reason: format!("must lie between 2 and {}", MAX_SLIT_SIZE),
            });
        }
        if self.box_xy == 0 {
            return Err(ConfigError::InvalidParameter {
                name: "box_xy",
                reason: "must be positive".to_string(),
            });
        }
        if self.fix_mode == FixMode::FixedAtWallAndInSpace {
            let distance = self
                .distance_fixpoint_wall
                .ok_or(ConfigError::MissingParameter("distance_fixpoint_wall"))?;
            if !(2..=self.slit_size).contains(&distance) {
                return Err(ConfigError::InvalidParameter {
                    name: "distance_fixpoint_wall",
                    reason: format!("must lie between 2 and the slit size {}", self.slit_size),
                });
            }
        }
        Ok(())
    }
}

#[derive(Default)]
pub struct ChainInSlitConfigBuilder {
    chain_length: Option<usize>,
    slit_size: Option<u32>,
    box_xy: Option<u32>,
    fix_mode: Option<FixMode>,
    distance_fixpoint_wall: Option<u32>,
}

impl ChainInSlitConfigBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn chain_length(mut self, length: usize) -> Self {
        self.chain_length = Some(length);
        self
    }
    pub fn slit_size(mut self, size: u32) -> Self {
        self.slit_size = Some(size);
        self
    }
    pub fn box_xy(mut self, size: u32) -> Self {
        self.box_xy = Some(size);
        self
    }
    pub fn fix_mode(mut self, mode: FixMode) -> Self {
        self.fix_mode = Some(mode);
        self
    }
    pub fn distance_fixpoint_wall(mut self, distance: u32) -> Self {
        self.distance_fixpoint_wall = Some(distance);
        self
    }

    pub fn build(self) -> Result<ChainInSlitConfig, ConfigError> {
        let config = ChainInSlitConfig {
            chain_length: self
                .chain_length
                .ok_or(ConfigError::MissingParameter("chain_length"))?,
            slit_size: self
                .slit_size
                .ok_or(ConfigError::MissingParameter("slit_size"))?,
            box_xy: self.box_xy.ok_or(ConfigError::MissingParameter("box_xy"))?,
            fix_mode: self.fix_mode.ok_or(ConfigError::MissingParameter("fix_mode"))?,
            distance_fixpoint_wall: self.distance_fixpoint_wall,
        };
        config.validate()?;
        Ok(config)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ForceAnalysisConfig {
    /// Units whose directional acceptance is counted, in output order.
    pub tracked_units: Vec<UnitId>,
    /// Measurements at a system age below this value are skipped.
    pub begin_age: u64,
    pub output_path: Option<PathBuf>,
}

#[derive(Default)]
pub struct ForceAnalysisConfigBuilder {
    tracked_units: Option<Vec<UnitId>>,
    begin_age: Option<u64>,
    output_path: Option<PathBuf>,
}

impl ForceAnalysisConfigBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn tracked_units(mut self, units: Vec<UnitId>) -> Self {
        self.tracked_units = Some(units);
        self
    }
    pub fn begin_age(mut self, age: u64) -> Self {
        self.begin_age = Some(age);
        self
    }
    pub fn output_path(mut self, path: PathBuf) -> Self {
        self.output_path = Some(path);
        self
    }

    pub fn build(self) -> Result<ForceAnalysisConfig, ConfigError> {
        let tracked_units = self
            .tracked_units
            .ok_or(ConfigError::MissingParameter("tracked_units"))?;
        if tracked_units.is_empty() {
            return Err(ConfigError::InvalidParameter {
                name: "tracked_units",
                reason: "at least one unit must be tracked".to_string(),
            });
        }
        Ok(ForceAnalysisConfig {
            tracked_units,
            begin_age: self.begin_age.unwrap_or(0),
            output_path: self.output_path,
        })
    }
}
