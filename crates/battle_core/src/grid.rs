//! Board geometry and cell occupancy.
//!
//! The battle plays out on a fixed `rows x cols` grid. Each cell holds at
//! most one living unit. All distances are Manhattan distances; a "lane"
//! is a shared row.

use serde::{Deserialize, Serialize};

use crate::error::{BattleError, Result};
use crate::units::{Team, UnitId};

/// A grid coordinate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Cell {
    /// Row index, top to bottom.
    pub row: u16,
    /// Column index, left to right.
    pub col: u16,
}

impl Cell {
    /// Create a new cell coordinate.
    #[must_use]
    pub const fn new(row: u16, col: u16) -> Self {
        Self { row, col }
    }

    /// Manhattan distance to another cell.
    #[must_use]
    pub fn manhattan_distance(self, other: Self) -> u32 {
        let dr = i32::from(self.row) - i32::from(other.row);
        let dc = i32::from(self.col) - i32::from(other.col);
        dr.unsigned_abs() + dc.unsigned_abs()
    }

    /// True if the other cell is exactly one step away.
    #[must_use]
    pub fn is_adjacent_to(self, other: Self) -> bool {
        self.manhattan_distance(other) == 1
    }

    /// True if both cells share a row.
    #[must_use]
    pub fn in_lane_with(self, other: Self) -> bool {
        self.row == other.row
    }
}

/// Board dimensions and placement zones.
///
/// The player zone is the leftmost `player_zone_cols` columns; the opponent
/// zone is the rightmost `opponent_zone_cols` columns. Units may only be
/// placed inside their own team's zone during setup.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BoardConfig {
    /// Number of rows (lanes).
    pub rows: u16,
    /// Number of columns.
    pub cols: u16,
    /// Width of the player placement zone, from the left edge.
    pub player_zone_cols: u16,
    /// Width of the opponent placement zone, from the right edge.
    pub opponent_zone_cols: u16,
}

impl Default for BoardConfig {
    fn default() -> Self {
        Self {
            rows: 5,
            cols: 30,
            player_zone_cols: 10,
            opponent_zone_cols: 10,
        }
    }
}

impl BoardConfig {
    /// Create a board configuration.
    #[must_use]
    pub const fn new(rows: u16, cols: u16, player_zone_cols: u16, opponent_zone_cols: u16) -> Self {
        Self {
            rows,
            cols,
            player_zone_cols,
            opponent_zone_cols,
        }
    }

    /// Check that the configuration describes a usable board.
    ///
    /// # Errors
    ///
    /// Returns [`BattleError::InvalidBoard`] if either dimension is zero or
    /// the placement zones overlap.
    pub fn validate(&self) -> Result<()> {
        if self.rows == 0 || self.cols == 0 {
            return Err(BattleError::InvalidBoard(format!(
                "board must be at least 1x1, got {}x{}",
                self.rows, self.cols
            )));
        }
        if u32::from(self.player_zone_cols) + u32::from(self.opponent_zone_cols)
            > u32::from(self.cols)
        {
            return Err(BattleError::InvalidBoard(format!(
                "placement zones ({} + {}) exceed {} columns",
                self.player_zone_cols, self.opponent_zone_cols, self.cols
            )));
        }
        Ok(())
    }

    /// True if the cell lies on the board.
    #[must_use]
    pub fn contains(&self, cell: Cell) -> bool {
        cell.row < self.rows && cell.col < self.cols
    }

    /// True if the cell lies inside the given team's placement zone.
    #[must_use]
    pub fn in_zone(&self, team: Team, cell: Cell) -> bool {
        match team {
            Team::Player => cell.col < self.player_zone_cols,
            Team::Opponent => cell.col >= self.cols - self.opponent_zone_cols,
        }
    }
}

/// Cell occupancy for the whole board.
///
/// Mutated only by placement, movement and unit removal. Targeting queries
/// never touch it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Grid {
    rows: u16,
    cols: u16,
    cells: Vec<Option<UnitId>>,
}

impl Grid {
    /// Create an empty grid of the given dimensions.
    #[must_use]
    pub fn new(rows: u16, cols: u16) -> Self {
        Self {
            rows,
            cols,
            cells: vec![None; usize::from(rows) * usize::from(cols)],
        }
    }

    fn index(&self, cell: Cell) -> usize {
        usize::from(cell.row) * usize::from(self.cols) + usize::from(cell.col)
    }

    /// True if the cell lies on this grid.
    #[must_use]
    pub fn in_bounds(&self, cell: Cell) -> bool {
        cell.row < self.rows && cell.col < self.cols
    }

    /// The unit occupying the cell, if any.
    #[must_use]
    pub fn occupant(&self, cell: Cell) -> Option<UnitId> {
        if self.in_bounds(cell) {
            self.cells[self.index(cell)]
        } else {
            None
        }
    }

    /// Mark the cell as occupied by the given unit.
    pub fn place(&mut self, cell: Cell, id: UnitId) {
        if self.in_bounds(cell) {
            let idx = self.index(cell);
            self.cells[idx] = Some(id);
        }
    }

    /// Clear the cell, but only if the given unit occupies it.
    ///
    /// The occupancy check makes removal idempotent: clearing a cell for a
    /// unit that already left it (or was already removed) is a no-op.
    pub fn remove(&mut self, cell: Cell, id: UnitId) {
        if self.in_bounds(cell) {
            let idx = self.index(cell);
            if self.cells[idx] == Some(id) {
                self.cells[idx] = None;
            }
        }
    }

    /// Move a unit from one cell to another.
    pub fn relocate(&mut self, from: Cell, to: Cell, id: UnitId) {
        self.remove(from, id);
        self.place(to, id);
    }
}
