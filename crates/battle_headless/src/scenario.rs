//! Scenario loading and configuration.
//!
//! A scenario bundles a board configuration with a list of unit
//! placements and a tick budget. Scenarios and unit definition files are
//! RON; the crate ships a default roster and skirmish under `data/`.

use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use battle_core::prelude::*;
use std::result::Result;

/// Default unit roster shipped with the runner.
pub const DEFAULT_UNITS_RON: &str = include_str!("../data/units.ron");

/// Default skirmish scenario shipped with the runner.
pub const DEFAULT_SCENARIO_RON: &str = include_str!("../data/skirmish.ron");

/// Error type for scenario operations.
#[derive(Error, Debug)]
pub enum ScenarioError {
    /// File not found.
    #[error("Scenario file not found: {0}")]
    FileNotFound(String),
    /// Failed to read file.
    #[error("Failed to read scenario file: {0}")]
    ReadError(#[from] std::io::Error),
    /// Failed to parse RON.
    #[error("Failed to parse scenario: {0}")]
    ParseError(#[from] ron::error::SpannedError),
    /// The scenario references invalid placements or definitions.
    #[error("Invalid scenario: {0}")]
    InvalidScenario(#[from] BattleError),
}

/// One unit placement in a scenario.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Placement {
    /// Unit definition id.
    pub def_id: String,
    /// Side to place on.
    pub team: Team,
    /// Board row.
    pub row: u16,
    /// Board column.
    pub col: u16,
}

/// A complete scenario configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Scenario {
    /// Scenario name.
    pub name: String,
    /// Human-readable description.
    pub description: String,
    /// Board dimensions and placement zones.
    pub board: BoardConfig,
    /// Units to place before the battle starts.
    pub placements: Vec<Placement>,
    /// Tick budget before the run is declared a draw.
    pub max_ticks: u64,
}

impl Scenario {
    /// Load a scenario from a RON file.
    ///
    /// # Errors
    ///
    /// Returns a [`ScenarioError`] if the file is missing, unreadable or
    /// not valid scenario RON.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ScenarioError> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(ScenarioError::FileNotFound(path.display().to_string()));
        }
        let contents = std::fs::read_to_string(path)?;
        let scenario: Scenario = ron::from_str(&contents)?;
        Ok(scenario)
    }

    /// Load from a RON string (useful for embedded scenarios).
    ///
    /// # Errors
    ///
    /// Returns [`ScenarioError::ParseError`] on malformed RON.
    pub fn from_ron_str(text: &str) -> Result<Self, ScenarioError> {
        let scenario: Scenario = ron::from_str(text)?;
        Ok(scenario)
    }

    /// The default skirmish shipped with the runner.
    ///
    /// # Panics
    ///
    /// Panics if the embedded scenario file is malformed, which would be
    /// a packaging bug.
    #[must_use]
    pub fn default_skirmish() -> Self {
        Self::from_ron_str(DEFAULT_SCENARIO_RON)
            .unwrap_or_else(|e| panic!("embedded skirmish scenario is malformed: {e}"))
    }

    /// Build a started battle from this scenario.
    ///
    /// # Errors
    ///
    /// Returns [`ScenarioError::InvalidScenario`] if the board is
    /// unusable or a placement is rejected.
    pub fn build(&self, registry: UnitRegistry, seed: u64) -> Result<Battle, ScenarioError> {
        let mut battle = Battle::new(registry, self.board, seed)?;
        for placement in &self.placements {
            battle.place_unit(
                &placement.def_id,
                placement.team,
                placement.row,
                placement.col,
            )?;
        }
        battle.start_battle()?;
        Ok(battle)
    }
}

/// Load a unit registry from a RON file, falling back to the embedded
/// roster when no path is given.
///
/// # Errors
///
/// Returns a [`ScenarioError`] if the file is missing, unreadable or not
/// a valid definition list.
pub fn load_registry(path: Option<&Path>) -> Result<UnitRegistry, ScenarioError> {
    let text = match path {
        Some(path) => {
            if !path.exists() {
                return Err(ScenarioError::FileNotFound(path.display().to_string()));
            }
            std::fs::read_to_string(path)?
        }
        None => DEFAULT_UNITS_RON.to_string(),
    };
    Ok(UnitRegistry::from_ron_str(&text)?)
}
