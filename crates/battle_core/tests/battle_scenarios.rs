//! End-to-end battle scenarios driven through the public API.

use battle_core::prelude::*;
use battle_test_utils::fixtures::{archer, bruiser, duelist, stalker, standard_registry};

fn registry(defs: Vec<UnitDefinition>) -> UnitRegistry {
    UnitRegistry::from_definitions(defs).unwrap()
}

/// A tough, unarmed unit that effectively never moves.
fn sentry() -> UnitDefinition {
    UnitDefinition {
        id: "sentry".to_string(),
        name: "Sentry".to_string(),
        emoji: "s".to_string(),
        stats: Stats {
            health: 100,
            speed: 1,
            movement_ticks: 1_000_000,
        },
        attack: None,
        behavior: Behavior::default(),
    }
}

#[test]
fn test_bruiser_duel_ends_in_mutual_defeat() {
    // Two identical bruisers (20 health, 3 damage every 700 ticks) trade
    // blows from adjacent cells. The seventh exchange at tick 4900 kills
    // both at once, which resolves as a defeat.
    let config = BoardConfig::new(1, 2, 1, 1);
    let mut battle = Battle::new(registry(vec![bruiser()]), config, 1).unwrap();
    battle.place_unit("bruiser", Team::Player, 0, 0).unwrap();
    battle.place_unit("bruiser", Team::Opponent, 0, 1).unwrap();
    battle.start_battle().unwrap();

    let ran = battle.advance(10_000);
    assert_eq!(ran, 4_900);
    assert_eq!(battle.current_tick(), 4_900);
    assert_eq!(battle.outcome(), Some(BattleOutcome::Defeat));
    assert_eq!(battle.living(Team::Player), 0);
    assert_eq!(battle.living(Team::Opponent), 0);
}

#[test]
fn test_duelist_damage_depends_on_target_speed() {
    // The duelist deals 5 against slow targets and 2 against fast ones.
    // Against a bruiser (speed 10) the heavy rule applies: 4 hits of 5
    // kill it at tick 2400 while the bruiser has only landed 3 hits of 3.
    let config = BoardConfig::new(1, 2, 1, 1);
    let reg = registry(vec![duelist(), bruiser()]);
    let mut battle = Battle::new(reg, config, 1).unwrap();
    let duelist_id = battle.place_unit("duelist", Team::Player, 0, 0).unwrap();
    let bruiser_id = battle.place_unit("bruiser", Team::Opponent, 0, 1).unwrap();
    battle.start_battle().unwrap();

    battle.advance(599);
    let events = battle.tick();
    assert_eq!(events.damage.len(), 1);
    assert_eq!(events.damage[0].target, bruiser_id);
    assert_eq!(events.damage[0].amount, 5);

    let ran = battle.advance(10_000);
    assert_eq!(battle.current_tick(), 2_400);
    assert_eq!(ran, 2_400 - 600);
    assert_eq!(battle.outcome(), Some(BattleOutcome::Victory));
    assert_eq!(battle.unit(duelist_id).unwrap().health, 15 - 3 * 3);
}

#[test]
fn test_duelists_use_light_rule_against_each_other() {
    // Duelist speed is 25, above the fast-target threshold of 20, so two
    // duelists hit each other for 2 instead of 5.
    let config = BoardConfig::new(1, 2, 1, 1);
    let mut battle = Battle::new(registry(vec![duelist()]), config, 1).unwrap();
    battle.place_unit("duelist", Team::Player, 0, 0).unwrap();
    battle.place_unit("duelist", Team::Opponent, 0, 1).unwrap();
    battle.start_battle().unwrap();

    battle.advance(599);
    let events = battle.tick();
    assert_eq!(events.damage.len(), 2);
    assert!(events.damage.iter().all(|d| d.amount == 2));
}

#[test]
fn test_frequency_one_brawlers_finish_each_other_on_tick_two() {
    // Attack frequency 1 strikes on every tick from the first. Two
    // 10-health units dealing 5 halve each other on tick 1 and land the
    // killing blows together on tick 2.
    let brawler = UnitDefinition {
        id: "brawler".to_string(),
        name: "Brawler".to_string(),
        emoji: "b".to_string(),
        stats: Stats {
            health: 10,
            speed: 10,
            movement_ticks: 1_000,
        },
        attack: Some(AttackSpec::Melee(MeleeAttack {
            damage: 5,
            frequency_ticks: 1,
            rules: vec![],
        })),
        behavior: Behavior::default(),
    };
    let config = BoardConfig::new(1, 2, 1, 1);
    let mut battle = Battle::new(registry(vec![brawler]), config, 1).unwrap();
    battle.place_unit("brawler", Team::Player, 0, 0).unwrap();
    battle.place_unit("brawler", Team::Opponent, 0, 1).unwrap();
    battle.start_battle().unwrap();

    let events = battle.tick();
    assert_eq!(events.damage.len(), 2);
    assert!(events.deaths.is_empty());

    let events = battle.tick();
    assert_eq!(events.deaths.len(), 2);
    assert_eq!(events.outcome, Some(BattleOutcome::Defeat));
    assert_eq!(battle.current_tick(), 2);
}

#[test]
fn test_stalker_halts_at_its_proximity_range() {
    // The stalker stops while any enemy is within 4 cells, in lane or
    // not. Against a stationary enemy in the other lane it advances
    // until the Manhattan distance reaches 4 and parks there, even
    // though its forward cell stays vacant.
    let config = BoardConfig::new(2, 10, 1, 4);
    let reg = registry(vec![stalker(), sentry()]);
    let mut battle = Battle::new(reg, config, 1).unwrap();
    let stalker_id = battle.place_unit("stalker", Team::Player, 0, 0).unwrap();
    battle.place_unit("sentry", Team::Opponent, 1, 6).unwrap();
    battle.start_battle().unwrap();

    // Steps at 350, 700 and 1050 bring it to column 3, distance 4.
    battle.advance(1_100);
    assert_eq!(battle.unit(stalker_id).unwrap().cell.col, 3);

    battle.advance(5_000);
    assert_eq!(battle.unit(stalker_id).unwrap().cell.col, 3);
    assert_eq!(battle.phase(), Phase::Fighting);
}

#[test]
fn test_bruiser_holds_beside_a_cross_lane_enemy() {
    // stop_on_adjacent_enemy halts the bruiser once an enemy sits one
    // cell away in the other lane. Its forward cell is vacant the whole
    // time, so the halt comes from the behavior, not from occupancy.
    let config = BoardConfig::new(2, 6, 3, 3);
    let reg = registry(vec![bruiser(), sentry()]);
    let mut battle = Battle::new(reg, config, 1).unwrap();
    let bruiser_id = battle.place_unit("bruiser", Team::Player, 0, 2).unwrap();
    let sentry_id = battle.place_unit("sentry", Team::Opponent, 1, 3).unwrap();
    battle.start_battle().unwrap();

    // The first step lands it adjacent: same column, other lane.
    battle.advance(500);
    assert_eq!(battle.unit(bruiser_id).unwrap().cell.col, 3);

    battle.advance(3_000);
    assert_eq!(battle.unit(bruiser_id).unwrap().cell.col, 3);
    // It fights from there instead of marching past.
    assert!(battle.unit(sentry_id).unwrap().health < 100);
}

#[test]
fn test_archers_stop_at_lane_range_and_trade_volleys() {
    // Two archers march toward each other and halt once the enemy in
    // their lane is within 6 cells, at columns 2 and 8. From there each
    // volley takes 300 ticks to cross the 6-cell gap; four volleys of 2
    // against 8 health kill both sides at tick 3900.
    let config = BoardConfig::new(1, 10, 1, 1);
    let mut battle = Battle::new(registry(vec![archer()]), config, 1).unwrap();
    let left = battle.place_unit("archer", Team::Player, 0, 0).unwrap();
    let right = battle.place_unit("archer", Team::Opponent, 0, 9).unwrap();
    battle.start_battle().unwrap();

    battle.advance(1_500);
    assert_eq!(battle.unit(left).unwrap().cell.col, 2);
    assert_eq!(battle.unit(right).unwrap().cell.col, 8);

    let ran = battle.advance(10_000);
    assert_eq!(battle.current_tick(), 3_900);
    assert_eq!(ran, 3_900 - 1_500);
    assert_eq!(battle.outcome(), Some(BattleOutcome::Defeat));
}

#[test]
fn test_projectile_flight_time_scales_with_distance() {
    let config = BoardConfig::new(1, 10, 1, 1);
    let mut battle = Battle::new(registry(vec![archer()]), config, 1).unwrap();
    battle.place_unit("archer", Team::Player, 0, 0).unwrap();
    battle.place_unit("archer", Team::Opponent, 0, 9).unwrap();
    battle.start_battle().unwrap();

    // Both archers settle at distance 6 before the first volley at tick
    // 900, so each flight is 6 * 50 = 300 ticks.
    battle.advance(900);
    let snapshot = battle.snapshot();
    assert_eq!(snapshot.projectiles.len(), 2);
    for projectile in &snapshot.projectiles {
        assert!(projectile.progress >= 0.0 && projectile.progress <= 1.0);
    }

    let mut launch_ticks = Vec::new();
    let mut battle2 = Battle::new(registry(vec![archer()]), config, 1).unwrap();
    battle2.place_unit("archer", Team::Player, 0, 0).unwrap();
    battle2.place_unit("archer", Team::Opponent, 0, 9).unwrap();
    battle2.start_battle().unwrap();
    for _ in 0..1_000 {
        let events = battle2.tick();
        for launch in &events.launches {
            launch_ticks.push((battle2.current_tick(), launch.flight_ticks));
        }
    }
    assert_eq!(launch_ticks.len(), 2);
    for (_, flight) in &launch_ticks {
        assert_eq!(*flight, 300);
    }
}

#[test]
fn test_skirmish_stays_consistent_over_a_long_run() {
    let mut battle = battle_test_utils::fixtures::skirmish_battle(42);
    battle.advance(30_000);

    let snapshot = battle.snapshot();
    for unit in &snapshot.units {
        assert!(unit.health > 0);
        assert!(unit.health <= unit.max_health);
    }
    match battle.phase() {
        Phase::Ended(BattleOutcome::Victory) => {
            assert_eq!(battle.living(Team::Opponent), 0);
            assert!(battle.living(Team::Player) > 0);
        }
        Phase::Ended(BattleOutcome::Defeat) => {
            assert_eq!(battle.living(Team::Player), 0);
        }
        Phase::Fighting => {
            assert!(battle.living(Team::Player) > 0);
            assert!(battle.living(Team::Opponent) > 0);
        }
        Phase::Setup => panic!("battle cannot return to setup"),
    }
}

#[test]
fn test_same_seed_replays_identically() {
    let mut a = battle_test_utils::fixtures::skirmish_battle(7);
    let mut b = battle_test_utils::fixtures::skirmish_battle(7);
    for _ in 0..5_000 {
        let events_a = a.tick();
        let events_b = b.tick();
        assert_eq!(events_a, events_b);
    }
    assert_eq!(a.state_hash(), b.state_hash());
}

#[test]
fn test_standard_registry_parses_from_ron() {
    // The RON shape used by the headless runner round-trips through the
    // registry loader.
    let text = r#"(
        units: [
            (
                id: "grunt",
                name: "Grunt",
                emoji: "g",
                stats: (health: 10, speed: 12, movement_ticks: 500),
                attack: Some(Melee((
                    damage: 2,
                    frequency_ticks: 650,
                    rules: [
                        (condition: TargetSpeed(op: Gt, value: 20), damage: 1),
                        (condition: Default, damage: 4),
                    ],
                ))),
                behavior: (
                    stop_on_adjacent_enemy: true,
                ),
            ),
        ],
    )"#;
    let reg = UnitRegistry::from_ron_str(text).unwrap();
    let grunt = reg.get("grunt").unwrap();
    assert!(grunt.behavior.stop_on_adjacent_enemy);
    match grunt.attack.as_ref().unwrap() {
        AttackSpec::Melee(melee) => {
            assert_eq!(melee.damage_against(25), 1);
            assert_eq!(melee.damage_against(10), 4);
        }
        AttackSpec::Ranged(_) => panic!("expected melee"),
    }
    assert_eq!(standard_registry().len(), 5);
}
