//! In-flight projectile tracking.
//!
//! A ranged attack spawns a [`Projectile`] whose flight lasts
//! `manhattan_distance * projectile_speed` ticks. The projectile remembers
//! the target's cell at launch; on arrival it damages the target only if
//! the target is still alive in that same cell, otherwise it fizzles.
//! Either way the projectile is destroyed on arrival.

use serde::{Deserialize, Serialize};

use crate::grid::Cell;
use crate::sim::{BattleState, TickEvents};
use crate::units::{Team, UnitId};

/// One projectile in flight.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Projectile {
    /// Cell the shooter occupied at launch.
    pub origin: Cell,
    /// Unit the projectile was aimed at.
    pub target: UnitId,
    /// Cell the target occupied at launch. Arrival damage requires the
    /// target to still be there.
    pub target_cell: Cell,
    /// Team of the shooter.
    pub team: Team,
    /// Total flight duration in ticks.
    pub total_ticks: u64,
    /// Ticks flown so far.
    pub elapsed_ticks: u64,
    /// Tick on which the projectile was launched. It does not advance on
    /// its launch tick, so a flight of N ticks lands N ticks later.
    pub launch_tick: u64,
    /// Damage dealt on a clean arrival.
    pub damage: u32,
}

impl Projectile {
    /// Fraction of the flight completed, in `0.0..=1.0`.
    #[must_use]
    pub fn progress(&self) -> f32 {
        if self.total_ticks == 0 {
            1.0
        } else {
            #[allow(clippy::cast_precision_loss)]
            {
                (self.elapsed_ticks as f32 / self.total_ticks as f32).min(1.0)
            }
        }
    }
}

/// Advance every projectile by one tick and resolve arrivals.
///
/// `now` is the tick currently being simulated; projectiles launched on
/// this tick hold their position until the next one.
pub(crate) fn advance_flights(state: &mut BattleState, now: u64, events: &mut TickEvents) {
    let projectiles = std::mem::take(&mut state.projectiles);
    for mut projectile in projectiles {
        if projectile.launch_tick == now {
            state.projectiles.push(projectile);
            continue;
        }
        projectile.elapsed_ticks += 1;
        if projectile.elapsed_ticks < projectile.total_ticks {
            state.projectiles.push(projectile);
            continue;
        }
        // Arrival. Damage lands only if the target is alive and never moved.
        let hit = state
            .units
            .get(projectile.target)
            .is_some_and(|u| u.is_alive() && u.cell == projectile.target_cell);
        if hit {
            state.apply_damage(projectile.target, projectile.damage, events);
        }
    }
}
