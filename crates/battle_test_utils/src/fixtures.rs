//! Test fixtures and battle builders.
//!
//! A small roster of archetype definitions covering every mechanic
//! (melee, conditional damage, ranged, slow-down, stop behaviors, healing)
//! plus ready-made battles built from them.

use battle_core::prelude::*;

/// Plain melee unit that holds position next to an enemy.
#[must_use]
pub fn bruiser() -> UnitDefinition {
    UnitDefinition {
        id: "bruiser".to_string(),
        name: "Bruiser".to_string(),
        emoji: "\u{1f9cc}".to_string(),
        stats: Stats {
            health: 20,
            speed: 10,
            movement_ticks: 500,
        },
        attack: Some(AttackSpec::Melee(MeleeAttack {
            damage: 3,
            frequency_ticks: 700,
            rules: vec![],
        })),
        behavior: Behavior {
            stop_on_adjacent_enemy: true,
            ..Behavior::default()
        },
    }
}

/// Melee unit with conditional damage: light hits against fast targets,
/// heavy hits against everything else.
#[must_use]
pub fn duelist() -> UnitDefinition {
    UnitDefinition {
        id: "duelist".to_string(),
        name: "Duelist".to_string(),
        emoji: "\u{1f93a}".to_string(),
        stats: Stats {
            health: 15,
            speed: 25,
            movement_ticks: 450,
        },
        attack: Some(AttackSpec::Melee(MeleeAttack {
            damage: 1,
            frequency_ticks: 600,
            rules: vec![
                DamageRule {
                    condition: Condition::TargetSpeed {
                        op: CompareOp::Gt,
                        value: 20,
                    },
                    damage: 2,
                },
                DamageRule {
                    condition: Condition::Default,
                    damage: 5,
                },
            ],
        })),
        behavior: Behavior::default(),
    }
}

/// Melee unit that halts while any enemy is near, in lane or not.
#[must_use]
pub fn stalker() -> UnitDefinition {
    UnitDefinition {
        id: "stalker".to_string(),
        name: "Stalker".to_string(),
        emoji: "\u{1f987}".to_string(),
        stats: Stats {
            health: 18,
            speed: 30,
            movement_ticks: 350,
        },
        attack: Some(AttackSpec::Melee(MeleeAttack {
            damage: 4,
            frequency_ticks: 800,
            rules: vec![],
        })),
        behavior: Behavior {
            stop_on_enemy_within: Some(4),
            ..Behavior::default()
        },
    }
}

/// Ranged unit that slows itself when enemies close in and stops
/// advancing once an enemy shares its lane.
#[must_use]
pub fn archer() -> UnitDefinition {
    UnitDefinition {
        id: "archer".to_string(),
        name: "Archer".to_string(),
        emoji: "\u{1f3f9}".to_string(),
        stats: Stats {
            health: 8,
            speed: 20,
            movement_ticks: 400,
        },
        attack: Some(AttackSpec::Ranged(RangedAttack {
            damage: 2,
            frequency_ticks: 900,
            range_manhattan: 8,
            projectile_speed: 50,
        })),
        behavior: Behavior {
            slow_down: Some(SlowDown {
                condition_range_manhattan: 3,
                new_movement_ticks: 1200,
                new_speed: 5,
            }),
            stop_on_enemy_in_lane: Some(6),
            ..Behavior::default()
        },
    }
}

/// Unarmed support unit with a finite healing pool.
#[must_use]
pub fn medic() -> UnitDefinition {
    UnitDefinition {
        id: "medic".to_string(),
        name: "Medic".to_string(),
        emoji: "\u{2695}".to_string(),
        stats: Stats {
            health: 12,
            speed: 15,
            movement_ticks: 550,
        },
        attack: None,
        behavior: Behavior {
            heal: Some(HealBehavior {
                frequency_ticks: 800,
                initial_power: 5,
                range_manhattan: 4,
            }),
            ..Behavior::default()
        },
    }
}

/// Registry holding every fixture archetype.
#[must_use]
pub fn standard_registry() -> UnitRegistry {
    UnitRegistry::from_definitions(vec![bruiser(), duelist(), stalker(), archer(), medic()])
        .unwrap_or_else(|e| panic!("fixture definitions must be valid: {e}"))
}

/// A mixed battle on the default board, already started.
#[must_use]
pub fn skirmish_battle(seed: u64) -> Battle {
    let mut battle = Battle::new(standard_registry(), BoardConfig::default(), seed)
        .unwrap_or_else(|e| panic!("default board must be valid: {e}"));
    let placements = [
        ("bruiser", Team::Player, 2, 9),
        ("duelist", Team::Player, 1, 9),
        ("stalker", Team::Player, 3, 9),
        ("archer", Team::Player, 2, 7),
        ("medic", Team::Player, 2, 5),
        ("bruiser", Team::Opponent, 2, 20),
        ("duelist", Team::Opponent, 3, 20),
        ("stalker", Team::Opponent, 1, 20),
        ("archer", Team::Opponent, 2, 22),
        ("medic", Team::Opponent, 2, 24),
    ];
    for (def_id, team, row, col) in placements {
        battle
            .place_unit(def_id, team, row, col)
            .unwrap_or_else(|e| panic!("fixture placement must be valid: {e}"));
    }
    battle
        .start_battle()
        .unwrap_or_else(|e| panic!("fixture battle must start: {e}"));
    battle
}

/// A minimal duel on a 1x2 board: two bruisers face to face.
#[must_use]
pub fn duel_battle(seed: u64) -> Battle {
    let config = BoardConfig::new(1, 2, 1, 1);
    let mut battle = Battle::new(standard_registry(), config, seed)
        .unwrap_or_else(|e| panic!("duel board must be valid: {e}"));
    battle
        .place_unit("bruiser", Team::Player, 0, 0)
        .unwrap_or_else(|e| panic!("fixture placement must be valid: {e}"));
    battle
        .place_unit("bruiser", Team::Opponent, 0, 1)
        .unwrap_or_else(|e| panic!("fixture placement must be valid: {e}"));
    battle
        .start_battle()
        .unwrap_or_else(|e| panic!("fixture battle must start: {e}"));
    battle
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_standard_registry_holds_all_archetypes() {
        let registry = standard_registry();
        assert_eq!(registry.len(), 5);
        for id in ["bruiser", "duelist", "stalker", "archer", "medic"] {
            assert!(registry.get(id).is_some(), "missing archetype {id}");
        }
    }

    #[test]
    fn test_skirmish_battle_is_fighting() {
        let battle = skirmish_battle(1);
        assert_eq!(battle.phase(), Phase::Fighting);
        assert_eq!(battle.living(Team::Player), 5);
        assert_eq!(battle.living(Team::Opponent), 5);
    }
}
