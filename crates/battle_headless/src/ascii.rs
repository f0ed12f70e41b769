//! ASCII rendering of battle snapshots.
//!
//! Renders a [`BattleSnapshot`] as a bordered character grid for terminal
//! output. Player units draw as uppercase initials, opponent units as
//! lowercase, projectiles as `>` and `<` at their interpolated position.

use std::fmt::Write as _;

use battle_core::prelude::*;

/// Rendering options.
#[derive(Debug, Clone, Copy)]
pub struct AsciiConfig {
    /// Append a `id:health/max` roster below the grid.
    pub show_health: bool,
    /// Draw in-flight projectiles.
    pub show_projectiles: bool,
}

impl Default for AsciiConfig {
    fn default() -> Self {
        Self {
            show_health: true,
            show_projectiles: true,
        }
    }
}

fn glyph(view: &UnitView) -> char {
    let initial = view.def_id.chars().next().unwrap_or('?');
    match view.team {
        Team::Player => initial.to_ascii_uppercase(),
        Team::Opponent => initial.to_ascii_lowercase(),
    }
}

/// Column a projectile is drawn at, interpolated along its lane.
fn projectile_col(view: &ProjectileView) -> u16 {
    let (_, from) = view.origin;
    let (_, to) = view.target;
    let from = f32::from(from);
    let to = f32::from(to);
    let col = from + (to - from) * view.progress;
    #[allow(clippy::cast_sign_loss, clippy::cast_possible_truncation)]
    {
        col.round().max(0.0) as u16
    }
}

/// Render a snapshot into a bordered grid string.
#[must_use]
pub fn render(snapshot: &BattleSnapshot, board: &BoardConfig, config: &AsciiConfig) -> String {
    let rows = usize::from(board.rows);
    let cols = usize::from(board.cols);
    let mut cells = vec![vec!['.'; cols]; rows];

    if config.show_projectiles {
        for projectile in &snapshot.projectiles {
            let row = usize::from(projectile.origin.0);
            let col = usize::from(projectile_col(projectile)).min(cols.saturating_sub(1));
            if row < rows {
                cells[row][col] = match projectile.team {
                    Team::Player => '>',
                    Team::Opponent => '<',
                };
            }
        }
    }

    // Units draw over projectiles.
    for unit in &snapshot.units {
        let row = usize::from(unit.row);
        let col = usize::from(unit.col);
        if row < rows && col < cols {
            cells[row][col] = glyph(unit);
        }
    }

    let mut out = String::new();
    let _ = writeln!(out, "tick {}  phase {:?}", snapshot.tick, snapshot.phase);
    let _ = writeln!(out, "+{}+", "-".repeat(cols));
    for row in &cells {
        let line: String = row.iter().collect();
        let _ = writeln!(out, "|{line}|");
    }
    let _ = writeln!(out, "+{}+", "-".repeat(cols));

    if config.show_health {
        for unit in &snapshot.units {
            let _ = writeln!(
                out,
                "  {} #{} {} ({},{}) {}/{}",
                glyph(unit),
                unit.id,
                unit.def_id,
                unit.row,
                unit.col,
                unit.health,
                unit.max_health
            );
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scenario::{load_registry, Scenario};

    #[test]
    fn test_render_shows_units_at_their_cells() {
        let scenario = Scenario::default_skirmish();
        let registry = load_registry(None).unwrap();
        let battle = scenario.build(registry, 1).unwrap();

        let output = render(&battle.snapshot(), battle.config(), &AsciiConfig::default());
        // Player grunt at (2, 9) renders as an uppercase initial.
        let grid_row = output.lines().nth(4).unwrap();
        assert_eq!(grid_row.chars().nth(10), Some('G'));
        // Opponent grunt at (2, 20) renders lowercase.
        assert_eq!(grid_row.chars().nth(21), Some('g'));
        assert!(output.contains("grunt"));
    }

    #[test]
    fn test_render_without_health_roster() {
        let scenario = Scenario::default_skirmish();
        let registry = load_registry(None).unwrap();
        let battle = scenario.build(registry, 1).unwrap();

        let config = AsciiConfig {
            show_health: false,
            show_projectiles: true,
        };
        let output = render(&battle.snapshot(), battle.config(), &config);
        // Header, two borders, five lanes.
        assert_eq!(output.lines().count(), 8);
    }

    #[test]
    fn test_projectile_interpolation_stays_in_lane() {
        let view = ProjectileView {
            origin: (0, 2),
            target: (0, 8),
            team: Team::Player,
            progress: 0.5,
        };
        assert_eq!(projectile_col(&view), 5);
    }
}
