//! End-of-battle detection.

use serde::{Deserialize, Serialize};

use crate::units::{Team, UnitStore};

/// How a finished battle ended, from the player's perspective.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BattleOutcome {
    /// All opponent units are dead and at least one player unit survives.
    Victory,
    /// All player units are dead. A simultaneous wipe also counts as
    /// defeat.
    Defeat,
}

/// Check whether either side has been eliminated.
///
/// Evaluated once per tick after deaths are purged. The player-side check
/// runs first, so a tick that wipes both teams resolves as [`BattleOutcome::Defeat`].
#[must_use]
pub fn evaluate(units: &UnitStore) -> Option<BattleOutcome> {
    if units.living_count(Team::Player) == 0 {
        Some(BattleOutcome::Defeat)
    } else if units.living_count(Team::Opponent) == 0 {
        Some(BattleOutcome::Victory)
    } else {
        None
    }
}
