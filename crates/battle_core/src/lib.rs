//! # Battle Core
//!
//! Deterministic lane-battle simulation core.
//!
//! This crate contains **only** deterministic logic:
//! - No rendering
//! - No IO
//! - No system randomness (all randomness is seeded ChaCha8)
//! - No wall-clock reads (drivers convert time to ticks via [`clock`])
//!
//! This separation enables:
//! - Reproducible battles (same registry, board and seed, same result)
//! - Headless runs and scripted scenarios
//! - Determinism testing via state hashes
//!
//! ## Crate Structure
//!
//! - [`defs`] - Unit definitions and the definition registry
//! - [`units`] - Runtime unit state and the unit store
//! - [`grid`] - Board geometry and cell occupancy
//! - [`targeting`] - Deterministic targeting queries
//! - [`combat`] - Per-tick movement, attack and heal resolution
//! - [`projectile`] - In-flight projectile tracking
//! - [`victory`] - End-of-battle detection
//! - [`sim`] - Battle lifecycle and the tick loop
//! - [`view`] - Read-only snapshots for frontends
//! - [`clock`] - Wall-clock to tick conversion for real-time drivers

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all, clippy::pedantic)]

pub mod clock;
pub mod combat;
pub mod defs;
pub mod error;
pub mod grid;
pub mod projectile;
pub mod rng;
pub mod sim;
pub mod targeting;
pub mod units;
pub mod victory;
pub mod view;

/// Re-export commonly used types
pub mod prelude {
    pub use crate::clock::{TickClock, TICK_DURATION_MS};
    pub use crate::defs::{
        AttackSpec, Behavior, CompareOp, Condition, DamageRule, HealBehavior, MeleeAttack,
        RangedAttack, SlowDown, Stats, UnitDefinition, UnitRegistry,
    };
    pub use crate::error::{BattleError, Result};
    pub use crate::grid::{BoardConfig, Cell};
    pub use crate::sim::{
        Battle, DamageEvent, HealEvent, Phase, ProjectileLaunch, TickEvents,
    };
    pub use crate::units::{Team, Unit, UnitId};
    pub use crate::victory::BattleOutcome;
    pub use crate::view::{BattleSnapshot, ProjectileView, UnitView};
}
