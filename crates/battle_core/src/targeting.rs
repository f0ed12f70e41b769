//! Targeting queries over the unit store.
//!
//! Every query filters to living units and walks ids in sorted order, so
//! candidate lists are deterministic. Dead units are invisible to all
//! targeting from the moment their health reaches zero, even before they
//! are purged from the board at end of tick.

use crate::grid::Cell;
use crate::units::{Team, UnitId, UnitStore};

/// Living enemies of `team`, in ascending id order.
fn living_enemies<'a>(units: &'a UnitStore, team: Team) -> impl Iterator<Item = &'a crate::units::Unit> {
    let enemy = team.opposing();
    units
        .sorted_ids()
        .into_iter()
        .filter_map(move |id| units.get(id))
        .filter(move |u| u.team == enemy && u.is_alive())
}

/// Manhattan distance to the nearest living enemy, if any.
#[must_use]
pub fn nearest_enemy_distance(units: &UnitStore, team: Team, origin: Cell) -> Option<u32> {
    living_enemies(units, team)
        .map(|u| origin.manhattan_distance(u.cell))
        .min()
}

/// True if a living enemy occupies a cell adjacent to `origin`.
#[must_use]
pub fn has_adjacent_enemy(units: &UnitStore, team: Team, origin: Cell) -> bool {
    living_enemies(units, team).any(|u| origin.is_adjacent_to(u.cell))
}

/// True if a living enemy shares the lane and is within `range`.
#[must_use]
pub fn enemy_in_lane_within(units: &UnitStore, team: Team, origin: Cell, range: u32) -> bool {
    living_enemies(units, team)
        .any(|u| origin.in_lane_with(u.cell) && origin.manhattan_distance(u.cell) <= range)
}

/// True if any living enemy is within `range`.
#[must_use]
pub fn enemy_within(units: &UnitStore, team: Team, origin: Cell, range: u32) -> bool {
    living_enemies(units, team).any(|u| origin.manhattan_distance(u.cell) <= range)
}

/// Living enemies within `range`, in ascending id order.
#[must_use]
pub fn enemies_within(units: &UnitStore, team: Team, origin: Cell, range: u32) -> Vec<UnitId> {
    living_enemies(units, team)
        .filter(|u| origin.manhattan_distance(u.cell) <= range)
        .map(|u| u.id)
        .collect()
}

/// Living enemies in adjacent cells, in ascending id order.
#[must_use]
pub fn adjacent_enemies(units: &UnitStore, team: Team, origin: Cell) -> Vec<UnitId> {
    living_enemies(units, team)
        .filter(|u| origin.is_adjacent_to(u.cell))
        .map(|u| u.id)
        .collect()
}

/// Living allies of `self_id`'s team below full health within `range`,
/// in ascending id order. The unit never heals itself into the list twice;
/// it excludes itself entirely, matching support units that heal others.
#[must_use]
pub fn injured_allies_within(
    units: &UnitStore,
    self_id: UnitId,
    team: Team,
    origin: Cell,
    range: u32,
) -> Vec<UnitId> {
    units
        .sorted_ids()
        .into_iter()
        .filter_map(|id| units.get(id))
        .filter(|u| {
            u.id != self_id
                && u.team == team
                && u.is_alive()
                && u.health < u.max_health
                && origin.manhattan_distance(u.cell) <= range
        })
        .map(|u| u.id)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::defs::{Behavior, Stats, UnitDefinition};
    use crate::units::Unit;

    fn def() -> UnitDefinition {
        UnitDefinition {
            id: "pawn".to_string(),
            name: "Pawn".to_string(),
            emoji: "p".to_string(),
            stats: Stats {
                health: 10,
                speed: 10,
                movement_ticks: 100,
            },
            attack: None,
            behavior: Behavior::default(),
        }
    }

    fn spawn(store: &mut UnitStore, team: Team, row: u16, col: u16) -> UnitId {
        let id = store.allocate_id();
        store.insert(Unit::from_definition(id, &def(), team, Cell::new(row, col)));
        id
    }

    #[test]
    fn test_nearest_enemy_distance() {
        let mut store = UnitStore::new();
        spawn(&mut store, Team::Player, 0, 0);
        spawn(&mut store, Team::Opponent, 0, 5);
        spawn(&mut store, Team::Opponent, 2, 1);

        let dist = nearest_enemy_distance(&store, Team::Player, Cell::new(0, 0));
        assert_eq!(dist, Some(3));
    }

    #[test]
    fn test_no_enemies_means_no_distance() {
        let mut store = UnitStore::new();
        spawn(&mut store, Team::Player, 0, 0);
        assert_eq!(nearest_enemy_distance(&store, Team::Player, Cell::new(0, 0)), None);
    }

    #[test]
    fn test_dead_enemies_are_invisible() {
        let mut store = UnitStore::new();
        spawn(&mut store, Team::Player, 0, 0);
        let enemy = spawn(&mut store, Team::Opponent, 0, 1);
        assert!(has_adjacent_enemy(&store, Team::Player, Cell::new(0, 0)));

        store.get_mut(enemy).unwrap().apply_damage(100);
        assert!(!has_adjacent_enemy(&store, Team::Player, Cell::new(0, 0)));
        assert!(enemies_within(&store, Team::Player, Cell::new(0, 0), 10).is_empty());
    }

    #[test]
    fn test_lane_check_requires_shared_row() {
        let mut store = UnitStore::new();
        spawn(&mut store, Team::Player, 0, 0);
        spawn(&mut store, Team::Opponent, 1, 1);

        // Distance 2 but in a different lane.
        assert!(!enemy_in_lane_within(&store, Team::Player, Cell::new(0, 0), 5));
        assert!(enemy_within(&store, Team::Player, Cell::new(0, 0), 5));
    }

    #[test]
    fn test_candidate_lists_are_id_sorted() {
        let mut store = UnitStore::new();
        spawn(&mut store, Team::Player, 0, 0);
        let b = spawn(&mut store, Team::Opponent, 0, 2);
        let c = spawn(&mut store, Team::Opponent, 0, 1);
        let d = spawn(&mut store, Team::Opponent, 1, 0);

        let hits = enemies_within(&store, Team::Player, Cell::new(0, 0), 3);
        assert_eq!(hits, vec![b, c, d]);
    }

    #[test]
    fn test_injured_allies_excludes_self_and_healthy() {
        let mut store = UnitStore::new();
        let healer = spawn(&mut store, Team::Player, 0, 0);
        let hurt = spawn(&mut store, Team::Player, 0, 1);
        let healthy = spawn(&mut store, Team::Player, 0, 2);
        spawn(&mut store, Team::Opponent, 0, 3);

        store.get_mut(hurt).unwrap().apply_damage(4);
        store.get_mut(healer).unwrap().apply_damage(1);

        let allies = injured_allies_within(&store, healer, Team::Player, Cell::new(0, 0), 5);
        assert_eq!(allies, vec![hurt]);
        assert!(!allies.contains(&healthy));
    }
}
