use thiserror::Error;

use super::config::ConfigError;
use crate::core::io::conformation::ConformationError;
use crate::core::io::force_table::ForceTableError;
use crate::core::models::ids::UnitId;

#[derive(Debug, Error)]
pub enum EngineError {
    #[error("Invalid configuration: {0}")]
    Config(#[from] ConfigError),

    #[error(
        "Chain of {chain_length} units cannot span a slit of size {slit_size} with both ends pinned"
    )]
    InfeasibleGeometry { chain_length: usize, slit_size: u32 },

    #[error("Span height {span_height} leaves no room to stack a second unit")]
    NoRoomToStack { span_height: u32 },

    #[error(
        "No free position for a unit between {existing} and {partner} ({placed} of {target} units placed)"
    )]
    PlacementExhausted {
        existing: UnitId,
        partner: UnitId,
        placed: usize,
        target: usize,
    },

    #[error("Chain construction was aborted by an earlier placement failure")]
    BuildAborted,

    #[error("Unit {0} not found in system")]
    UnitNotFound(UnitId),

    #[error("Units {0} and {1} are not bonded")]
    NotBonded(UnitId, UnitId),

    #[error("No units selected for tracking")]
    EmptySelection,

    #[error("Task '{0}' executed before initialization")]
    NotInitialized(&'static str),

    #[error("System topology changed: expected {expected} units, found {found}")]
    TopologyChanged { expected: usize, found: usize },

    #[error("Trajectory exhausted after {frames} frames")]
    TrajectoryExhausted { frames: usize },

    #[error("Conformation I/O failed: {0}")]
    Conformation(#[from] ConformationError),

    #[error("Force table output failed: {0}")]
    ForceOutput(#[from] ForceTableError),

    #[error("Internal logic error: {0}")]
    Internal(String),
}
