//! Determinism testing utilities.
//!
//! Provides a harness for verifying that a battle produces identical
//! results given identical inputs.
//!
//! # Testing Strategy
//!
//! Battles must be fully reproducible: the same registry, board and seed
//! must produce the same outcome, tick for tick. Sources of
//! non-determinism include:
//!
//! - **HashMap iteration order**: Rust's default hasher is randomized.
//!   All game logic iterates in sorted unit ID order.
//!
//! - **System randomness**: No calls to `rand()` without explicit seeds.
//!   All random target selection flows through a seeded ChaCha8 stream.
//!
//! - **Wall-clock time**: The simulation only counts ticks; drivers
//!   convert elapsed time to ticks outside the core.
//!
//! # Test Levels
//!
//! 1. **Unit tests**: Individual pass determinism (movement, combat, heal)
//! 2. **Property tests**: Random setups must still replay identically
//! 3. **Integration tests**: Full battles are reproducible
//! 4. **Parallel tests**: Running N battles in parallel all match

use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};
use std::thread;

use battle_core::sim::Battle;

/// Result of a determinism test.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeterminismResult {
    /// Whether all runs produced identical results.
    pub is_deterministic: bool,
    /// Hashes from each run.
    pub hashes: Vec<u64>,
    /// Number of ticks simulated.
    pub ticks: u64,
}

impl DeterminismResult {
    /// Get all unique hashes (should be 1 for a deterministic battle).
    #[must_use]
    pub fn unique_hashes(&self) -> Vec<u64> {
        let mut unique: Vec<u64> = self.hashes.clone();
        unique.sort_unstable();
        unique.dedup();
        unique
    }

    /// Assert that the battle was deterministic, with a detailed error message.
    ///
    /// # Panics
    ///
    /// Panics if the battle produced different hashes across runs.
    pub fn assert_deterministic(&self) {
        if !self.is_deterministic {
            let unique = self.unique_hashes();
            panic!(
                "Battle is non-deterministic!\n\
                 Runs: {}\n\
                 Ticks: {}\n\
                 Unique hashes: {} (expected 1)\n\
                 All hashes: {:?}",
                self.hashes.len(),
                self.ticks,
                unique.len(),
                self.hashes
            );
        }
    }
}

/// Result of parallel battle runs.
#[derive(Debug, Clone)]
pub struct ParallelBattleResult {
    /// Final state hash from each battle.
    pub hashes: Vec<u64>,
    /// Number of ticks each battle ran.
    pub ticks: u64,
    /// Number of battles run.
    pub num_battles: usize,
}

impl ParallelBattleResult {
    /// Check if all battles produced identical results.
    #[must_use]
    pub fn is_deterministic(&self) -> bool {
        self.hashes.windows(2).all(|w| w[0] == w[1])
    }

    /// Assert all battles matched.
    ///
    /// # Panics
    ///
    /// Panics if battles produced different hashes.
    pub fn assert_deterministic(&self) {
        if !self.is_deterministic() {
            let mut unique: Vec<u64> = self.hashes.clone();
            unique.sort_unstable();
            unique.dedup();
            panic!(
                "Parallel battles diverged!\n\
                 Battles: {}\n\
                 Ticks: {}\n\
                 Unique hashes: {}\n\
                 All hashes: {:?}",
                self.num_battles,
                self.ticks,
                unique.len(),
                self.hashes
            );
        }
    }
}

/// Run a simulation multiple times and verify determinism.
///
/// # Arguments
///
/// * `runs` - Number of times to run the simulation
/// * `ticks` - Number of ticks to simulate per run
/// * `setup` - Function to create initial state
/// * `step` - Function to advance by one tick
/// * `hash` - Function to compute state hash
pub fn verify_determinism<S, Setup, Step, HashFn>(
    runs: usize,
    ticks: u64,
    setup: Setup,
    step: Step,
    hash: HashFn,
) -> DeterminismResult
where
    Setup: Fn() -> S,
    Step: Fn(&mut S),
    HashFn: Fn(&S) -> u64,
{
    let mut hashes = Vec::with_capacity(runs);

    for _ in 0..runs {
        let mut state = setup();

        for _ in 0..ticks {
            step(&mut state);
        }

        hashes.push(hash(&state));
    }

    let is_deterministic = hashes.windows(2).all(|w| w[0] == w[1]);
    tracing::debug!(runs, ticks, is_deterministic, "determinism check complete");

    DeterminismResult {
        is_deterministic,
        hashes,
        ticks,
    }
}

/// Simplified determinism verification for [`Battle`].
///
/// Runs the battle twice with identical setup and verifies the final
/// state hashes match exactly.
pub fn verify_battle_determinism<F>(setup_fn: F, num_ticks: u64) -> bool
where
    F: Fn() -> Battle,
{
    let result = verify_determinism(
        2,
        num_ticks,
        &setup_fn,
        |battle| {
            battle.tick();
        },
        Battle::state_hash,
    );
    result.is_deterministic
}

/// Run N battles in parallel using scoped threads and collect final hashes.
///
/// This is useful for catching non-determinism that only manifests under
/// thread scheduling variations or memory layout differences.
pub fn run_parallel_battles<F>(setup_fn: F, num_battles: usize, num_ticks: u64) -> ParallelBattleResult
where
    F: Fn() -> Battle + Sync,
{
    let hashes = thread::scope(|s| {
        let handles: Vec<_> = (0..num_battles)
            .map(|_| {
                s.spawn(|| {
                    let mut battle = setup_fn();
                    for _ in 0..num_ticks {
                        battle.tick();
                    }
                    battle.state_hash()
                })
            })
            .collect();

        handles.into_iter().map(|h| h.join().unwrap()).collect()
    });

    ParallelBattleResult {
        hashes,
        ticks: num_ticks,
        num_battles,
    }
}

/// Compare two battle runs tick-by-tick, finding the first divergence.
///
/// # Returns
///
/// `None` if the runs are deterministic, `Some(tick)` if they diverge
/// at that tick.
pub fn find_first_divergence<F>(setup_fn: F, num_ticks: u64) -> Option<u64>
where
    F: Fn() -> Battle,
{
    let mut battle1 = setup_fn();
    let mut battle2 = setup_fn();

    if battle1.state_hash() != battle2.state_hash() {
        return Some(0);
    }

    for tick in 1..=num_ticks {
        battle1.tick();
        battle2.tick();

        if battle1.state_hash() != battle2.state_hash() {
            tracing::warn!(tick, "battle runs diverged");
            return Some(tick);
        }
    }

    None
}

/// Verify that serialization round-trip preserves battle state exactly.
///
/// This is critical for save/resume: a restored battle must continue the
/// same RNG stream and produce the same remaining ticks.
pub fn verify_serialization_determinism<F>(setup_fn: F, num_ticks: u64) -> bool
where
    F: Fn() -> Battle,
{
    let mut battle = setup_fn();

    for _ in 0..num_ticks {
        battle.tick();
    }

    let hash_before = battle.state_hash();

    let bytes = match battle.to_bytes() {
        Ok(b) => b,
        Err(_) => return false,
    };

    let restored = match Battle::from_bytes(&bytes) {
        Ok(b) => b,
        Err(_) => return false,
    };

    hash_before == restored.state_hash()
}

/// Compute a simple hash for any hashable value.
pub fn compute_hash<T: Hash>(value: &T) -> u64 {
    let mut hasher = DefaultHasher::new();
    value.hash(&mut hasher);
    hasher.finish()
}

/// Proptest strategies for determinism testing.
///
/// These strategies generate random but reproducible inputs for
/// property-based testing of battle determinism.
pub mod strategies {
    use proptest::prelude::*;

    use battle_core::units::Team;

    /// Generate an RNG seed.
    pub fn arb_seed() -> impl Strategy<Value = u64> {
        any::<u64>()
    }

    /// Generate a lane count within the supported range.
    pub fn arb_rows() -> impl Strategy<Value = u16> {
        1u16..8
    }

    /// One unit placement request: archetype, team, row, column offset
    /// into the team's zone.
    #[derive(Debug, Clone)]
    pub struct TestPlacement {
        /// Fixture archetype id.
        pub def_id: &'static str,
        /// Side to place on.
        pub team: Team,
        /// Board row.
        pub row: u16,
        /// Column offset inside the team's placement zone.
        pub zone_col: u16,
    }

    /// Generate one placement on a board with the given lane count.
    pub fn arb_placement(rows: u16) -> impl Strategy<Value = TestPlacement> {
        let archetypes = ["bruiser", "duelist", "stalker", "archer", "medic"];
        (
            0usize..archetypes.len(),
            prop_oneof![Just(Team::Player), Just(Team::Opponent)],
            0u16..rows,
            0u16..10,
        )
            .prop_map(move |(def, team, row, zone_col)| TestPlacement {
                def_id: archetypes[def],
                team,
                row,
                zone_col,
            })
    }

    /// Generate a list of placements on a board with the given lane count.
    pub fn arb_placements(rows: u16, max: usize) -> impl Strategy<Value = Vec<TestPlacement>> {
        proptest::collection::vec(arb_placement(rows), 1..max)
    }
}
