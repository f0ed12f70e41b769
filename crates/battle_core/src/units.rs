//! Runtime unit state and the unit store.
//!
//! A [`Unit`] is a live instance of a [`UnitDefinition`] with mutable
//! combat state. The [`UnitStore`] owns every unit on the board and hands
//! out ids; all iteration for game logic goes through [`UnitStore::sorted_ids`]
//! so results never depend on hash order.

use std::collections::HashMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::defs::UnitDefinition;
use crate::grid::Cell;

/// Unique identifier for a unit within one battle.
pub type UnitId = u64;

/// Which side a unit fights for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Team {
    /// Advances rightward from the left zone.
    Player,
    /// Advances leftward from the right zone.
    Opponent,
}

impl Team {
    /// Column delta of one movement step.
    #[must_use]
    pub fn direction(self) -> i32 {
        match self {
            Self::Player => 1,
            Self::Opponent => -1,
        }
    }

    /// The other team.
    #[must_use]
    pub fn opposing(self) -> Self {
        match self {
            Self::Player => Self::Opponent,
            Self::Opponent => Self::Player,
        }
    }
}

impl fmt::Display for Team {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Player => write!(f, "player"),
            Self::Opponent => write!(f, "opponent"),
        }
    }
}

/// A live unit on the board.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Unit {
    /// Unique id within the battle.
    pub id: UnitId,
    /// Definition this unit was spawned from.
    pub def_id: String,
    /// Side the unit fights for.
    pub team: Team,
    /// Current board position.
    pub cell: Cell,
    /// Current health. Zero means dead.
    pub health: u32,
    /// Health cap for healing.
    pub max_health: u32,
    /// Current speed rating. Differs from the definition while slowed.
    pub speed: u32,
    /// Current movement interval. Differs from the definition while slowed.
    pub movement_ticks: u32,
    /// Ticks until the next movement step.
    pub move_countdown: u32,
    /// Ticks until the next attack. Unused if the unit has no attack.
    pub attack_countdown: u32,
    /// Ticks until the next heal attempt. Unused if the unit cannot heal.
    pub heal_countdown: u32,
    /// Remaining healing pool.
    pub heal_power: u32,
    /// True while the slow-down effect is active.
    pub slowed: bool,
}

impl Unit {
    /// Instantiate a unit from a definition.
    ///
    /// Countdowns start at their full interval, so a unit's first action
    /// happens one full interval after battle start.
    #[must_use]
    pub fn from_definition(id: UnitId, def: &UnitDefinition, team: Team, cell: Cell) -> Self {
        let attack_countdown = def.attack.as_ref().map_or(0, |a| a.frequency_ticks());
        let (heal_countdown, heal_power) = def
            .behavior
            .heal
            .map_or((0, 0), |h| (h.frequency_ticks, h.initial_power));
        Self {
            id,
            def_id: def.id.clone(),
            team,
            cell,
            health: def.stats.health,
            max_health: def.stats.health,
            speed: def.stats.speed,
            movement_ticks: def.stats.movement_ticks,
            move_countdown: def.stats.movement_ticks,
            attack_countdown,
            heal_countdown,
            heal_power,
            slowed: false,
        }
    }

    /// True while the unit has health remaining.
    #[must_use]
    pub fn is_alive(&self) -> bool {
        self.health > 0
    }

    /// Reduce health, saturating at zero.
    pub fn apply_damage(&mut self, amount: u32) {
        self.health = self.health.saturating_sub(amount);
    }

    /// Restore health up to the cap. Returns the amount actually restored.
    pub fn heal_by(&mut self, amount: u32) -> u32 {
        let applied = amount.min(self.max_health - self.health);
        self.health += applied;
        applied
    }
}

/// Owner of every unit in a battle.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UnitStore {
    units: HashMap<UnitId, Unit>,
    next_id: UnitId,
}

impl Default for UnitStore {
    fn default() -> Self {
        Self::new()
    }
}

impl UnitStore {
    /// Create an empty store. Ids start at 1.
    #[must_use]
    pub fn new() -> Self {
        Self {
            units: HashMap::new(),
            next_id: 1,
        }
    }

    /// Allocate the next unit id.
    pub fn allocate_id(&mut self) -> UnitId {
        let id = self.next_id;
        self.next_id += 1;
        id
    }

    /// Insert a unit under its own id.
    pub fn insert(&mut self, unit: Unit) {
        self.units.insert(unit.id, unit);
    }

    /// Remove and return a unit. Removing an absent id is a no-op.
    pub fn remove(&mut self, id: UnitId) -> Option<Unit> {
        self.units.remove(&id)
    }

    /// Look up a unit.
    #[must_use]
    pub fn get(&self, id: UnitId) -> Option<&Unit> {
        self.units.get(&id)
    }

    /// Look up a unit mutably.
    pub fn get_mut(&mut self, id: UnitId) -> Option<&mut Unit> {
        self.units.get_mut(&id)
    }

    /// Number of units, dead or alive.
    #[must_use]
    pub fn len(&self) -> usize {
        self.units.len()
    }

    /// True if the store is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.units.is_empty()
    }

    /// All unit ids in ascending order.
    ///
    /// Game logic iterates this, never the map directly, so behavior is
    /// independent of hash order.
    #[must_use]
    pub fn sorted_ids(&self) -> Vec<UnitId> {
        let mut ids: Vec<UnitId> = self.units.keys().copied().collect();
        ids.sort_unstable();
        ids
    }

    /// Iterate over all units in arbitrary order. Display and bookkeeping
    /// only; game logic uses [`Self::sorted_ids`].
    pub fn iter(&self) -> impl Iterator<Item = &Unit> {
        self.units.values()
    }

    /// Number of living units on the given team.
    #[must_use]
    pub fn living_count(&self, team: Team) -> usize {
        self.iter()
            .filter(|u| u.team == team && u.is_alive())
            .count()
    }
}
