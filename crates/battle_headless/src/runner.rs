//! Scenario execution and determinism verification.

use serde::{Deserialize, Serialize};

use battle_core::prelude::*;
use std::result::Result;

use crate::scenario::{Scenario, ScenarioError};

/// How a headless run finished.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RunResult {
    /// The player side eliminated the opponent.
    Victory,
    /// The player side was eliminated.
    Defeat,
    /// The tick budget ran out with both sides still standing.
    Draw,
}

impl From<BattleOutcome> for RunResult {
    fn from(outcome: BattleOutcome) -> Self {
        match outcome {
            BattleOutcome::Victory => Self::Victory,
            BattleOutcome::Defeat => Self::Defeat,
        }
    }
}

/// Summary of one finished run, serialized as JSON on stdout.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunReport {
    /// Scenario name.
    pub scenario: String,
    /// Seed the battle ran with.
    pub seed: u64,
    /// How the run finished.
    pub result: RunResult,
    /// Ticks simulated before the run finished.
    pub ticks: u64,
    /// Living player units at the end.
    pub player_survivors: usize,
    /// Living opponent units at the end.
    pub opponent_survivors: usize,
    /// Final state hash, for cross-run comparison.
    pub state_hash: u64,
}

/// Run a scenario to completion or until its tick budget lapses.
///
/// # Errors
///
/// Returns a [`ScenarioError`] if the scenario cannot be built.
pub fn run_scenario(
    scenario: &Scenario,
    registry: UnitRegistry,
    seed: u64,
) -> Result<RunReport, ScenarioError> {
    let mut battle = scenario.build(registry, seed)?;
    battle.advance(scenario.max_ticks);

    let result = battle.outcome().map_or(RunResult::Draw, RunResult::from);
    tracing::info!(
        scenario = %scenario.name,
        seed,
        ?result,
        ticks = battle.current_tick(),
        "run finished"
    );
    Ok(RunReport {
        scenario: scenario.name.clone(),
        seed,
        result,
        ticks: battle.current_tick(),
        player_survivors: battle.living(Team::Player),
        opponent_survivors: battle.living(Team::Opponent),
        state_hash: battle.state_hash(),
    })
}

/// Run the same scenario and seed several times and compare final hashes.
///
/// # Errors
///
/// Returns a [`ScenarioError`] if the scenario cannot be built.
pub fn verify_determinism(
    scenario: &Scenario,
    registry: &UnitRegistry,
    seed: u64,
    runs: u32,
) -> Result<bool, ScenarioError> {
    let mut hashes = Vec::with_capacity(runs as usize);
    for _ in 0..runs {
        let report = run_scenario(scenario, registry.clone(), seed)?;
        hashes.push(report.state_hash);
    }
    let deterministic = hashes.windows(2).all(|w| w[0] == w[1]);
    if !deterministic {
        tracing::error!(?hashes, "determinism check failed");
    }
    Ok(deterministic)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scenario::load_registry;

    #[test]
    fn test_default_skirmish_runs_to_a_report() {
        let scenario = Scenario::default_skirmish();
        let registry = load_registry(None).unwrap();
        let report = run_scenario(&scenario, registry, 42).unwrap();

        assert!(report.ticks <= scenario.max_ticks);
        match report.result {
            RunResult::Victory => assert_eq!(report.opponent_survivors, 0),
            RunResult::Defeat => assert_eq!(report.player_survivors, 0),
            RunResult::Draw => {
                assert!(report.player_survivors > 0);
                assert!(report.opponent_survivors > 0);
            }
        }
    }

    #[test]
    fn test_same_seed_same_report() {
        let scenario = Scenario::default_skirmish();
        let registry = load_registry(None).unwrap();
        let a = run_scenario(&scenario, registry.clone(), 7).unwrap();
        let b = run_scenario(&scenario, registry, 7).unwrap();
        assert_eq!(a.state_hash, b.state_hash);
        assert_eq!(a.ticks, b.ticks);
        assert_eq!(a.result, b.result);
    }

    #[test]
    fn test_verify_determinism_passes() {
        let scenario = Scenario::default_skirmish();
        let registry = load_registry(None).unwrap();
        assert!(verify_determinism(&scenario, &registry, 12345, 3).unwrap());
    }

    #[test]
    fn test_no_tick_level_divergence() {
        let scenario = Scenario::default_skirmish();
        let registry = load_registry(None).unwrap();
        let divergence = battle_test_utils::determinism::find_first_divergence(
            || scenario.build(registry.clone(), 5).unwrap(),
            2_000,
        );
        assert!(divergence.is_none(), "diverged at tick {divergence:?}");
    }

    #[test]
    fn test_report_serializes_to_json() {
        let scenario = Scenario::default_skirmish();
        let registry = load_registry(None).unwrap();
        let report = run_scenario(&scenario, registry, 1).unwrap();
        let json = serde_json::to_string(&report).unwrap();
        let parsed: RunReport = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed.state_hash, report.state_hash);
    }
}
