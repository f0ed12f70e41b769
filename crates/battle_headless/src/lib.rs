//! Headless battle runner for scripted scenarios and CI verification.
//!
//! This crate drives [`battle_core`] without any graphics:
//!
//! - **Scenario runs**: Load a roster and a scenario from RON, run the
//!   battle to completion and emit a JSON report on stdout
//! - **CI verification**: Re-run the same seed several times and compare
//!   final state hashes
//! - **ASCII rendering**: Draw the board in the terminal while a run is
//!   in progress
//!
//! Logs go to stderr so stdout stays machine-readable.

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all, clippy::pedantic)]

pub mod ascii;
pub mod runner;
pub mod scenario;

pub use ascii::{render, AsciiConfig};
pub use runner::{run_scenario, verify_determinism, RunReport, RunResult};
pub use scenario::{load_registry, Placement, Scenario, ScenarioError};
