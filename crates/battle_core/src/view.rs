//! Read-only snapshots for frontends.
//!
//! A snapshot carries everything a renderer needs and nothing it could use
//! to mutate the simulation. Frontends poll [`crate::sim::Battle::snapshot`]
//! and draw from it.

use serde::{Deserialize, Serialize};

use crate::sim::Phase;
use crate::units::{Team, UnitId};

/// One unit as a renderer sees it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UnitView {
    /// Unit id.
    pub id: UnitId,
    /// Definition id, for sprite or style lookup.
    pub def_id: String,
    /// Display glyph from the definition.
    pub emoji: String,
    /// Side the unit fights for.
    pub team: Team,
    /// Board row.
    pub row: u16,
    /// Board column.
    pub col: u16,
    /// Current health.
    pub health: u32,
    /// Health cap, for drawing health bars.
    pub max_health: u32,
}

/// One projectile in flight as a renderer sees it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProjectileView {
    /// Launch cell as `(row, col)`.
    pub origin: (u16, u16),
    /// Destination cell as `(row, col)`.
    pub target: (u16, u16),
    /// Team of the shooter.
    pub team: Team,
    /// Fraction of the flight completed, in `0.0..=1.0`. Renderers
    /// interpolate the drawn position from this.
    pub progress: f32,
}

/// Full render state at one instant.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BattleSnapshot {
    /// Tick the snapshot was taken at.
    pub tick: u64,
    /// Current lifecycle phase.
    pub phase: Phase,
    /// All units, in ascending id order.
    pub units: Vec<UnitView>,
    /// All projectiles in flight.
    pub projectiles: Vec<ProjectileView>,
}
