//! Error types for the battle simulation.

use thiserror::Error;

use crate::units::{Team, UnitId};

/// Result type alias using [`BattleError`].
pub type Result<T> = std::result::Result<T, BattleError>;

/// Top-level error type for all battle simulation errors.
#[derive(Debug, Error)]
pub enum BattleError {
    /// Failed to parse unit definition data.
    #[error("Failed to load unit definitions: {0}")]
    DefinitionLoad(String),

    /// The definition list contained no units.
    #[error("Unit definition list is empty")]
    EmptyRegistry,

    /// Two definitions share the same id.
    #[error("Duplicate unit definition id: {0}")]
    DuplicateDefinition(String),

    /// A definition failed validation.
    #[error("Invalid unit definition '{id}': {message}")]
    InvalidDefinition {
        /// Id of the offending definition.
        id: String,
        /// What was wrong with it.
        message: String,
    },

    /// Placement referenced a unit type the registry does not know.
    #[error("Unknown unit type: {0}")]
    UnknownUnitType(String),

    /// A cell outside the board was referenced.
    #[error("Cell ({row}, {col}) is outside the board")]
    OutOfBounds {
        /// Row of the cell.
        row: u16,
        /// Column of the cell.
        col: u16,
    },

    /// Placement targeted an occupied cell.
    #[error("Cell ({row}, {col}) is already occupied")]
    CellOccupied {
        /// Row of the cell.
        row: u16,
        /// Column of the cell.
        col: u16,
    },

    /// Placement targeted a cell outside the team's zone.
    #[error("Cell ({row}, {col}) is outside the {team} placement zone")]
    OutsideZone {
        /// Team that requested the placement.
        team: Team,
        /// Row of the cell.
        row: u16,
        /// Column of the cell.
        col: u16,
    },

    /// An operation referenced a unit that does not exist.
    #[error("Unit not found: {0}")]
    UnitNotFound(UnitId),

    /// An operation was attempted in the wrong lifecycle phase.
    #[error("Invalid phase for {operation}: battle is {phase}")]
    InvalidPhase {
        /// The rejected operation.
        operation: &'static str,
        /// Human-readable current phase.
        phase: String,
    },

    /// The board configuration is unusable.
    #[error("Invalid board configuration: {0}")]
    InvalidBoard(String),

    /// Battle state could not be serialized or deserialized.
    #[error("Invalid battle state: {0}")]
    InvalidState(String),
}
