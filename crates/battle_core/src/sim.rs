//! Battle lifecycle and the tick loop.
//!
//! [`Battle`] owns the full simulation state and drives it through three
//! phases: setup (placing units), fighting (ticking), and ended. The same
//! registry, board configuration and seed always produce the same battle,
//! tick for tick.

use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};

use serde::{Deserialize, Serialize};

use crate::combat;
use crate::defs::UnitRegistry;
use crate::error::{BattleError, Result};
use crate::grid::{BoardConfig, Cell, Grid};
use crate::projectile::{self, Projectile};
use crate::rng::BattleRng;
use crate::units::{Team, Unit, UnitId, UnitStore};
use crate::victory::{self, BattleOutcome};
use crate::view::{BattleSnapshot, ProjectileView, UnitView};

/// Lifecycle phase of a battle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Phase {
    /// Units may be placed and removed; the clock is stopped.
    Setup,
    /// The tick loop is running.
    Fighting,
    /// One side has been eliminated.
    Ended(BattleOutcome),
}

impl Phase {
    fn name(self) -> &'static str {
        match self {
            Self::Setup => "setup",
            Self::Fighting => "fighting",
            Self::Ended(_) => "ended",
        }
    }
}

/// Damage applied to a unit during a tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DamageEvent {
    /// Unit that took the damage.
    pub target: UnitId,
    /// Amount applied, before saturation at zero health.
    pub amount: u32,
}

/// A heal that landed during a tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct HealEvent {
    /// Unit that performed the heal.
    pub healer: UnitId,
    /// Unit that was healed.
    pub target: UnitId,
    /// Hit points actually restored.
    pub amount: u32,
}

/// A projectile launched during a tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProjectileLaunch {
    /// Unit that fired.
    pub shooter: UnitId,
    /// Unit the projectile is aimed at.
    pub target: UnitId,
    /// Flight duration in ticks.
    pub flight_ticks: u64,
}

/// Everything that happened during one tick, for observers.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TickEvents {
    /// Damage applied this tick.
    pub damage: Vec<DamageEvent>,
    /// Heals that landed this tick.
    pub heals: Vec<HealEvent>,
    /// Units that died and were removed this tick.
    pub deaths: Vec<UnitId>,
    /// Projectiles launched this tick.
    pub launches: Vec<ProjectileLaunch>,
    /// Set on the tick that ends the battle.
    pub outcome: Option<BattleOutcome>,
}

/// Mutable simulation state shared by the combat and projectile passes.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub(crate) struct BattleState {
    pub(crate) config: BoardConfig,
    pub(crate) registry: UnitRegistry,
    pub(crate) units: UnitStore,
    pub(crate) grid: Grid,
    pub(crate) projectiles: Vec<Projectile>,
    pub(crate) rng: BattleRng,
}

impl BattleState {
    /// Apply damage to a unit and record the event. Deaths are detected
    /// later, at end of tick.
    pub(crate) fn apply_damage(&mut self, target: UnitId, amount: u32, events: &mut TickEvents) {
        if let Some(unit) = self.units.get_mut(target) {
            unit.apply_damage(amount);
            events.damage.push(DamageEvent { target, amount });
        }
    }
}

/// A complete battle simulation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Battle {
    phase: Phase,
    tick: u64,
    seed: u64,
    state: BattleState,
}

impl Battle {
    /// Create a battle in the setup phase.
    ///
    /// # Errors
    ///
    /// Returns [`BattleError::InvalidBoard`] if the board configuration is
    /// unusable.
    pub fn new(registry: UnitRegistry, config: BoardConfig, seed: u64) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            phase: Phase::Setup,
            tick: 0,
            seed,
            state: BattleState {
                config,
                registry,
                units: UnitStore::new(),
                grid: Grid::new(config.rows, config.cols),
                projectiles: Vec::new(),
                rng: BattleRng::from_seed(seed),
            },
        })
    }

    fn require_phase(&self, expected: Phase, operation: &'static str) -> Result<()> {
        if self.phase == expected {
            Ok(())
        } else {
            Err(BattleError::InvalidPhase {
                operation,
                phase: self.phase.name().to_string(),
            })
        }
    }

    /// Place a unit during setup.
    ///
    /// # Errors
    ///
    /// Fails outside the setup phase, for unknown definition ids, for cells
    /// off the board or outside the team's placement zone, and for occupied
    /// cells.
    pub fn place_unit(&mut self, def_id: &str, team: Team, row: u16, col: u16) -> Result<UnitId> {
        self.require_phase(Phase::Setup, "place_unit")?;
        let def = self
            .state
            .registry
            .get(def_id)
            .ok_or_else(|| BattleError::UnknownUnitType(def_id.to_string()))?
            .clone();
        let cell = Cell::new(row, col);
        if !self.state.config.contains(cell) {
            return Err(BattleError::OutOfBounds { row, col });
        }
        if !self.state.config.in_zone(team, cell) {
            return Err(BattleError::OutsideZone { team, row, col });
        }
        if self.state.grid.occupant(cell).is_some() {
            return Err(BattleError::CellOccupied { row, col });
        }
        let id = self.state.units.allocate_id();
        self.state
            .units
            .insert(Unit::from_definition(id, &def, team, cell));
        self.state.grid.place(cell, id);
        Ok(id)
    }

    /// Remove a placed unit during setup.
    ///
    /// # Errors
    ///
    /// Fails outside the setup phase or if the unit does not exist.
    pub fn remove_unit(&mut self, id: UnitId) -> Result<()> {
        self.require_phase(Phase::Setup, "remove_unit")?;
        let unit = self
            .state
            .units
            .remove(id)
            .ok_or(BattleError::UnitNotFound(id))?;
        self.state.grid.remove(unit.cell, id);
        Ok(())
    }

    /// Change the number of lanes during setup. Units placed on rows that
    /// no longer exist are dropped.
    ///
    /// # Errors
    ///
    /// Fails outside the setup phase or for an invalid row count.
    pub fn set_rows(&mut self, rows: u16) -> Result<()> {
        self.require_phase(Phase::Setup, "set_rows")?;
        let mut config = self.state.config;
        config.rows = rows;
        config.validate()?;
        self.state.config = config;

        let mut grid = Grid::new(config.rows, config.cols);
        let mut dropped = Vec::new();
        for id in self.state.units.sorted_ids() {
            let Some(unit) = self.state.units.get(id) else { continue };
            if unit.cell.row < rows {
                grid.place(unit.cell, id);
            } else {
                dropped.push(id);
            }
        }
        for id in dropped {
            self.state.units.remove(id);
        }
        self.state.grid = grid;
        Ok(())
    }

    /// Leave setup and start the tick loop.
    ///
    /// # Errors
    ///
    /// Fails outside the setup phase.
    pub fn start_battle(&mut self) -> Result<()> {
        self.require_phase(Phase::Setup, "start_battle")?;
        self.phase = Phase::Fighting;
        tracing::info!(
            seed = self.seed,
            units = self.state.units.len(),
            "battle started"
        );
        Ok(())
    }

    /// Reset the battle to an empty setup phase with a fresh seed. All
    /// units, projectiles and the clock are cleared.
    pub fn restart(&mut self, seed: u64) {
        self.phase = Phase::Setup;
        self.tick = 0;
        self.seed = seed;
        self.state.units = UnitStore::new();
        self.state.grid = Grid::new(self.state.config.rows, self.state.config.cols);
        self.state.projectiles.clear();
        self.state.rng = BattleRng::from_seed(seed);
    }

    /// Advance the simulation by one tick.
    ///
    /// Resolves unit actions, then projectile flights, then purges the
    /// dead, then checks for an outcome. Returns the events the tick
    /// produced. Outside the fighting phase this is a no-op.
    pub fn tick(&mut self) -> TickEvents {
        let mut events = TickEvents::default();
        if self.phase != Phase::Fighting {
            return events;
        }
        let now = self.tick;
        combat::resolve_tick(&mut self.state, now, &mut events);
        projectile::advance_flights(&mut self.state, now, &mut events);
        self.purge_dead(&mut events);
        if let Some(outcome) = victory::evaluate(&self.state.units) {
            self.phase = Phase::Ended(outcome);
            events.outcome = Some(outcome);
            tracing::info!(tick = self.tick, ?outcome, "battle ended");
        }
        self.tick += 1;
        events
    }

    /// Run up to `ticks` ticks, stopping early if the battle ends. Returns
    /// the number of ticks actually simulated.
    pub fn advance(&mut self, ticks: u64) -> u64 {
        let mut ran = 0;
        while ran < ticks && self.phase == Phase::Fighting {
            self.tick();
            ran += 1;
        }
        ran
    }

    /// Remove dead units from the store and the grid.
    fn purge_dead(&mut self, events: &mut TickEvents) {
        for id in self.state.units.sorted_ids() {
            let dead = self.state.units.get(id).is_some_and(|u| !u.is_alive());
            if dead {
                if let Some(unit) = self.state.units.remove(id) {
                    self.state.grid.remove(unit.cell, id);
                    events.deaths.push(id);
                    tracing::debug!(unit = id, tick = self.tick, "unit died");
                }
            }
        }
    }

    /// Current lifecycle phase.
    #[must_use]
    pub fn phase(&self) -> Phase {
        self.phase
    }

    /// Ticks simulated so far.
    #[must_use]
    pub fn current_tick(&self) -> u64 {
        self.tick
    }

    /// The outcome, if the battle has ended.
    #[must_use]
    pub fn outcome(&self) -> Option<BattleOutcome> {
        match self.phase {
            Phase::Ended(outcome) => Some(outcome),
            _ => None,
        }
    }

    /// Number of living units on a team.
    #[must_use]
    pub fn living(&self, team: Team) -> usize {
        self.state.units.living_count(team)
    }

    /// Look up a unit by id.
    #[must_use]
    pub fn unit(&self, id: UnitId) -> Option<&Unit> {
        self.state.units.get(id)
    }

    /// The board configuration.
    #[must_use]
    pub fn config(&self) -> &BoardConfig {
        &self.state.config
    }

    /// The definition registry.
    #[must_use]
    pub fn registry(&self) -> &UnitRegistry {
        &self.state.registry
    }

    /// Read-only snapshot for rendering.
    #[must_use]
    pub fn snapshot(&self) -> BattleSnapshot {
        let mut units: Vec<UnitView> = self
            .state
            .units
            .sorted_ids()
            .into_iter()
            .filter_map(|id| self.state.units.get(id))
            .map(|u| {
                let emoji = self
                    .state
                    .registry
                    .get(&u.def_id)
                    .map_or_else(|| "?".to_string(), |d| d.emoji.clone());
                UnitView {
                    id: u.id,
                    def_id: u.def_id.clone(),
                    emoji,
                    team: u.team,
                    row: u.cell.row,
                    col: u.cell.col,
                    health: u.health,
                    max_health: u.max_health,
                }
            })
            .collect();
        units.sort_by_key(|u| u.id);
        let projectiles = self
            .state
            .projectiles
            .iter()
            .map(|p| ProjectileView {
                origin: (p.origin.row, p.origin.col),
                target: (p.target_cell.row, p.target_cell.col),
                team: p.team,
                progress: p.progress(),
            })
            .collect();
        BattleSnapshot {
            tick: self.tick,
            phase: self.phase,
            units,
            projectiles,
        }
    }

    /// Hash of the observable simulation state, for determinism checks.
    /// Equal battles hash equal; iteration is id-sorted so the hash never
    /// depends on map order.
    #[must_use]
    pub fn state_hash(&self) -> u64 {
        let mut hasher = DefaultHasher::new();
        self.tick.hash(&mut hasher);
        self.phase.name().hash(&mut hasher);
        if let Phase::Ended(outcome) = self.phase {
            (outcome == BattleOutcome::Victory).hash(&mut hasher);
        }
        for id in self.state.units.sorted_ids() {
            if let Some(unit) = self.state.units.get(id) {
                unit.id.hash(&mut hasher);
                unit.def_id.hash(&mut hasher);
                unit.cell.hash(&mut hasher);
                unit.health.hash(&mut hasher);
                unit.move_countdown.hash(&mut hasher);
                unit.attack_countdown.hash(&mut hasher);
                unit.heal_countdown.hash(&mut hasher);
                unit.heal_power.hash(&mut hasher);
                unit.slowed.hash(&mut hasher);
            }
        }
        for projectile in &self.state.projectiles {
            projectile.target.hash(&mut hasher);
            projectile.elapsed_ticks.hash(&mut hasher);
            projectile.total_ticks.hash(&mut hasher);
        }
        hasher.finish()
    }

    /// Serialize the full battle, RNG stream included.
    ///
    /// # Errors
    ///
    /// Returns [`BattleError::InvalidState`] on encoding failure.
    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        bincode::serialize(self).map_err(|e| BattleError::InvalidState(e.to_string()))
    }

    /// Restore a battle serialized with [`Self::to_bytes`].
    ///
    /// # Errors
    ///
    /// Returns [`BattleError::InvalidState`] on decoding failure.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        bincode::deserialize(bytes).map_err(|e| BattleError::InvalidState(e.to_string()))
    }
}
