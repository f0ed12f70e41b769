//! Per-tick combat resolution.
//!
//! Each tick processes every unit that was alive when the tick started,
//! front-most first within each team (players by descending column, then
//! opponents by ascending column, ids breaking ties). Units keep acting
//! even if they drop to zero health mid-tick, which is what lets two
//! adjacent melee units trade killing blows on the same tick. Dead units
//! are purged after the whole tick resolves.

use std::cmp::Reverse;

use crate::defs::{AttackSpec, Behavior, HealBehavior, MeleeAttack, RangedAttack, SlowDown};
use crate::projectile::Projectile;
use crate::sim::{BattleState, ProjectileLaunch, TickEvents};
use crate::targeting;
use crate::units::{Team, UnitId, UnitStore};

/// Tick-start processing order: living player units front-most first, then
/// living opponent units front-most first. "Front" is the direction of
/// travel, so player order is by descending column and opponent order by
/// ascending column, with unit id breaking ties.
fn processing_order(units: &UnitStore) -> Vec<UnitId> {
    let mut player: Vec<(u16, UnitId)> = Vec::new();
    let mut opponent: Vec<(u16, UnitId)> = Vec::new();
    for id in units.sorted_ids() {
        let Some(unit) = units.get(id) else { continue };
        if !unit.is_alive() {
            continue;
        }
        match unit.team {
            Team::Player => player.push((unit.cell.col, id)),
            Team::Opponent => opponent.push((unit.cell.col, id)),
        }
    }
    player.sort_unstable_by_key(|&(col, id)| (Reverse(col), id));
    opponent.sort_unstable_by_key(|&(col, id)| (col, id));
    player
        .into_iter()
        .chain(opponent)
        .map(|(_, id)| id)
        .collect()
}

/// Resolve one tick of unit actions. `now` is the tick being simulated.
pub(crate) fn resolve_tick(state: &mut BattleState, now: u64, events: &mut TickEvents) {
    for id in processing_order(&state.units) {
        // The unit may have been removed, but it acts even at zero health.
        let Some(unit) = state.units.get(id) else {
            continue;
        };
        let Some(def) = state.registry.get(&unit.def_id) else {
            continue;
        };
        let behavior = def.behavior;
        let base_speed = def.stats.speed;
        let base_movement_ticks = def.stats.movement_ticks;
        let attack = def.attack.clone();

        if let Some(slow) = behavior.slow_down {
            apply_slow_down(state, id, slow, base_speed, base_movement_ticks);
        }
        apply_movement(state, id, behavior, attack.as_ref());
        if let Some(spec) = attack {
            apply_attack(state, id, &spec, now, events);
        }
        if let Some(heal) = behavior.heal {
            apply_heal(state, id, heal, events);
        }
    }
}

/// Engage or release the self-slow depending on enemy proximity.
fn apply_slow_down(
    state: &mut BattleState,
    id: UnitId,
    slow: SlowDown,
    base_speed: u32,
    base_movement_ticks: u32,
) {
    let Some(unit) = state.units.get(id) else { return };
    let in_range = targeting::nearest_enemy_distance(&state.units, unit.team, unit.cell)
        .is_some_and(|d| d <= slow.condition_range_manhattan);
    let Some(unit) = state.units.get_mut(id) else { return };
    if in_range && !unit.slowed {
        unit.slowed = true;
        unit.speed = slow.new_speed;
        unit.movement_ticks = slow.new_movement_ticks;
    } else if !in_range && unit.slowed {
        unit.slowed = false;
        unit.speed = base_speed;
        unit.movement_ticks = base_movement_ticks;
    }
}

/// True if some behavior or an adjacent melee target keeps the unit in place.
fn movement_blocked(
    units: &UnitStore,
    team: Team,
    cell: crate::grid::Cell,
    behavior: Behavior,
    attack: Option<&AttackSpec>,
) -> bool {
    if behavior.stop_on_adjacent_enemy && targeting::has_adjacent_enemy(units, team, cell) {
        return true;
    }
    if let Some(range) = behavior.stop_on_enemy_in_lane {
        if targeting::enemy_in_lane_within(units, team, cell, range) {
            return true;
        }
    }
    if let Some(range) = behavior.stop_on_enemy_within {
        if targeting::enemy_within(units, team, cell, range) {
            return true;
        }
    }
    // Melee units hold position while they have someone to hit.
    if attack.is_some_and(AttackSpec::is_melee) && targeting::has_adjacent_enemy(units, team, cell) {
        return true;
    }
    false
}

/// Count down toward the next step and take it when the countdown lapses.
///
/// The countdown always resets when it lapses, whether or not the unit
/// actually moved.
fn apply_movement(
    state: &mut BattleState,
    id: UnitId,
    behavior: Behavior,
    attack: Option<&AttackSpec>,
) {
    let Some(unit) = state.units.get_mut(id) else { return };
    if unit.move_countdown > 0 {
        unit.move_countdown -= 1;
    }
    if unit.move_countdown > 0 {
        return;
    }
    let team = unit.team;
    let from = unit.cell;
    let interval = unit.movement_ticks;

    let mut destination = None;
    if !movement_blocked(&state.units, team, from, behavior, attack) {
        let next_col = i32::from(from.col) + team.direction();
        if next_col >= 0 && next_col < i32::from(state.config.cols) {
            #[allow(clippy::cast_sign_loss, clippy::cast_possible_truncation)]
            let to = crate::grid::Cell::new(from.row, next_col as u16);
            if state.grid.occupant(to).is_none() {
                destination = Some(to);
            }
        }
    }

    let Some(unit) = state.units.get_mut(id) else { return };
    if let Some(to) = destination {
        unit.cell = to;
        state.grid.relocate(from, to, id);
    }
    let Some(unit) = state.units.get_mut(id) else { return };
    unit.move_countdown = interval;
}

/// Count down toward the next attack and strike when the countdown lapses.
///
/// The countdown resets even when no target is in reach.
fn apply_attack(
    state: &mut BattleState,
    id: UnitId,
    spec: &AttackSpec,
    now: u64,
    events: &mut TickEvents,
) {
    let Some(unit) = state.units.get_mut(id) else { return };
    if unit.attack_countdown > 0 {
        unit.attack_countdown -= 1;
    }
    if unit.attack_countdown > 0 {
        return;
    }
    unit.attack_countdown = spec.frequency_ticks();
    let team = unit.team;
    let origin = unit.cell;

    match spec {
        AttackSpec::Melee(melee) => melee_strike(state, team, origin, melee, events),
        AttackSpec::Ranged(ranged) => ranged_shot(state, id, team, origin, ranged, now, events),
    }
}

/// Strike the weakest adjacent enemy, lowest id breaking ties.
fn melee_strike(
    state: &mut BattleState,
    team: Team,
    origin: crate::grid::Cell,
    melee: &MeleeAttack,
    events: &mut TickEvents,
) {
    let mut best: Option<(u32, UnitId, u32)> = None;
    for candidate in targeting::adjacent_enemies(&state.units, team, origin) {
        let Some(target) = state.units.get(candidate) else { continue };
        let key = (target.health, candidate);
        let better = match best {
            Some((health, id, _)) => key < (health, id),
            None => true,
        };
        if better {
            best = Some((target.health, candidate, target.speed));
        }
    }
    if let Some((_, target_id, target_speed)) = best {
        let damage = melee.damage_against(target_speed);
        state.apply_damage(target_id, damage, events);
    }
}

/// Launch a projectile at a uniformly chosen enemy in range.
fn ranged_shot(
    state: &mut BattleState,
    shooter: UnitId,
    team: Team,
    origin: crate::grid::Cell,
    ranged: &RangedAttack,
    now: u64,
    events: &mut TickEvents,
) {
    let candidates = targeting::enemies_within(&state.units, team, origin, ranged.range_manhattan);
    let Some(&target_id) = state.rng.pick(&candidates) else {
        return;
    };
    let Some(target) = state.units.get(target_id) else { return };
    let distance = origin.manhattan_distance(target.cell);
    let total_ticks = u64::from(distance) * u64::from(ranged.projectile_speed);
    state.projectiles.push(Projectile {
        origin,
        target: target_id,
        target_cell: target.cell,
        team,
        total_ticks,
        elapsed_ticks: 0,
        launch_tick: now,
        damage: ranged.damage,
    });
    events.launches.push(ProjectileLaunch {
        shooter,
        target: target_id,
        flight_ticks: total_ticks,
    });
}

/// Count down toward the next heal attempt.
///
/// The countdown ticks and resets for as long as the unit lives, even once
/// its healing pool is exhausted. Power only drains when a heal lands.
fn apply_heal(state: &mut BattleState, id: UnitId, heal: HealBehavior, events: &mut TickEvents) {
    let Some(unit) = state.units.get_mut(id) else { return };
    if unit.heal_countdown > 0 {
        unit.heal_countdown -= 1;
    }
    if unit.heal_countdown > 0 {
        return;
    }
    unit.heal_countdown = heal.frequency_ticks;
    if unit.heal_power == 0 {
        return;
    }
    let team = unit.team;
    let origin = unit.cell;
    let power = unit.heal_power;

    let candidates =
        targeting::injured_allies_within(&state.units, id, team, origin, heal.range_manhattan);
    let Some(&target_id) = state.rng.pick(&candidates) else {
        return;
    };
    let Some(target) = state.units.get_mut(target_id) else { return };
    let applied = target.heal_by(power);
    let Some(unit) = state.units.get_mut(id) else { return };
    unit.heal_power -= 1;
    events.heals.push(crate::sim::HealEvent {
        healer: id,
        target: target_id,
        amount: applied,
    });
}
