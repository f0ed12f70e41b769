//! Unit definitions and the definition registry.
//!
//! Definitions are static templates loaded once at startup (typically from
//! a RON file) and shared by every unit spawned from them. Runtime state
//! lives on [`crate::units::Unit`], never here.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::error::{BattleError, Result};

/// Base combat statistics shared by every unit type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Stats {
    /// Starting and maximum health.
    pub health: u32,
    /// Abstract speed rating, used by conditional damage rules.
    pub speed: u32,
    /// Ticks between movement steps.
    pub movement_ticks: u32,
}

/// Comparison operator for conditional damage rules.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CompareOp {
    /// Strictly greater than.
    Gt,
    /// Greater than or equal.
    Ge,
    /// Strictly less than.
    Lt,
    /// Less than or equal.
    Le,
}

impl CompareOp {
    /// Apply the comparison with `lhs` on the left.
    #[must_use]
    pub fn compare(self, lhs: u32, rhs: u32) -> bool {
        match self {
            Self::Gt => lhs > rhs,
            Self::Ge => lhs >= rhs,
            Self::Lt => lhs < rhs,
            Self::Le => lhs <= rhs,
        }
    }
}

/// Predicate a damage rule checks against the target.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Condition {
    /// Always matches. Used as the fallback rule.
    Default,
    /// Matches when the target's speed compares as given.
    TargetSpeed {
        /// How to compare the target's speed to `value`.
        op: CompareOp,
        /// Threshold the target's speed is compared against.
        value: u32,
    },
}

impl Condition {
    /// Evaluate the condition against a target's speed.
    #[must_use]
    pub fn matches(self, target_speed: u32) -> bool {
        match self {
            Self::Default => true,
            Self::TargetSpeed { op, value } => op.compare(target_speed, value),
        }
    }
}

/// One conditional damage entry for a melee attack.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DamageRule {
    /// Predicate checked against the target.
    pub condition: Condition,
    /// Damage dealt when the predicate matches.
    pub damage: u32,
}

/// A melee attack against an adjacent enemy.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MeleeAttack {
    /// Base damage when no rule matches.
    pub damage: u32,
    /// Ticks between attacks.
    pub frequency_ticks: u32,
    /// Conditional damage rules, checked in order. First match wins.
    #[serde(default)]
    pub rules: Vec<DamageRule>,
}

impl MeleeAttack {
    /// Damage dealt against a target with the given speed.
    #[must_use]
    pub fn damage_against(&self, target_speed: u32) -> u32 {
        for rule in &self.rules {
            if rule.condition.matches(target_speed) {
                return rule.damage;
            }
        }
        self.damage
    }
}

fn default_projectile_speed() -> u32 {
    50
}

/// A ranged attack that launches a projectile at an enemy in range.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RangedAttack {
    /// Damage dealt on projectile arrival.
    pub damage: u32,
    /// Ticks between attacks.
    pub frequency_ticks: u32,
    /// Maximum Manhattan distance to the target.
    pub range_manhattan: u32,
    /// Flight time per cell of Manhattan distance, in ticks.
    #[serde(default = "default_projectile_speed")]
    pub projectile_speed: u32,
}

/// The attack a unit carries, if any.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum AttackSpec {
    /// Strike an adjacent enemy directly.
    Melee(MeleeAttack),
    /// Launch a projectile at an enemy in range.
    Ranged(RangedAttack),
}

impl AttackSpec {
    /// Ticks between attacks.
    #[must_use]
    pub fn frequency_ticks(&self) -> u32 {
        match self {
            Self::Melee(melee) => melee.frequency_ticks,
            Self::Ranged(ranged) => ranged.frequency_ticks,
        }
    }

    /// True for melee attacks.
    #[must_use]
    pub fn is_melee(&self) -> bool {
        matches!(self, Self::Melee(_))
    }
}

/// Healing behavior. The unit's healing power is a finite pool that drains
/// by one each time a heal actually lands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct HealBehavior {
    /// Ticks between heal attempts.
    pub frequency_ticks: u32,
    /// Healing pool at battle start. Each successful heal restores this
    /// many hit points at the pool's current level and then drains it by one.
    pub initial_power: u32,
    /// Maximum Manhattan distance to the ally being healed.
    pub range_manhattan: u32,
}

/// Self-slow effect applied when any enemy comes within range.
///
/// The effect toggles: it applies while an enemy is in range and reverts
/// to the base stats when none is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SlowDown {
    /// Manhattan distance at which the slow engages.
    pub condition_range_manhattan: u32,
    /// Movement interval while slowed.
    pub new_movement_ticks: u32,
    /// Speed rating while slowed.
    pub new_speed: u32,
}

/// Optional per-unit behaviors beyond the basic march-and-attack loop.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Behavior {
    /// Healing behavior, for support units.
    #[serde(default)]
    pub heal: Option<HealBehavior>,
    /// Self-slow when an enemy closes in.
    #[serde(default)]
    pub slow_down: Option<SlowDown>,
    /// Halt while any enemy occupies an adjacent cell.
    #[serde(default)]
    pub stop_on_adjacent_enemy: bool,
    /// Halt while an enemy in the same lane is within this distance.
    #[serde(default)]
    pub stop_on_enemy_in_lane: Option<u32>,
    /// Halt while any enemy is within this Manhattan distance.
    #[serde(default)]
    pub stop_on_enemy_within: Option<u32>,
}

/// A static unit template.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UnitDefinition {
    /// Unique identifier, referenced by placements and scenarios.
    pub id: String,
    /// Display name.
    pub name: String,
    /// Single-glyph representation for board rendering.
    pub emoji: String,
    /// Base statistics.
    pub stats: Stats,
    /// Attack, if the unit fights. Pure support units carry none.
    #[serde(default)]
    pub attack: Option<AttackSpec>,
    /// Optional behaviors.
    #[serde(default)]
    pub behavior: Behavior,
}

impl UnitDefinition {
    /// Check internal consistency of a single definition.
    fn validate(&self) -> Result<()> {
        let invalid = |message: String| BattleError::InvalidDefinition {
            id: self.id.clone(),
            message,
        };

        if self.id.is_empty() {
            return Err(BattleError::InvalidDefinition {
                id: "<empty>".to_string(),
                message: "definition id must not be empty".to_string(),
            });
        }
        if self.stats.health == 0 {
            return Err(invalid("health must be positive".to_string()));
        }
        if self.stats.movement_ticks == 0 {
            return Err(invalid("movement_ticks must be positive".to_string()));
        }
        if let Some(attack) = &self.attack {
            if attack.frequency_ticks() == 0 {
                return Err(invalid("attack frequency_ticks must be positive".to_string()));
            }
            if let AttackSpec::Ranged(ranged) = attack {
                if ranged.range_manhattan == 0 {
                    return Err(invalid("ranged range_manhattan must be positive".to_string()));
                }
                if ranged.projectile_speed == 0 {
                    return Err(invalid("projectile_speed must be positive".to_string()));
                }
            }
        }
        if let Some(heal) = &self.behavior.heal {
            if heal.frequency_ticks == 0 {
                return Err(invalid("heal frequency_ticks must be positive".to_string()));
            }
        }
        if let Some(slow) = &self.behavior.slow_down {
            if slow.new_movement_ticks == 0 {
                return Err(invalid("slow_down new_movement_ticks must be positive".to_string()));
            }
        }
        Ok(())
    }
}

/// RON file shape: a top-level list of unit definitions.
#[derive(Debug, Deserialize)]
struct DefinitionFile {
    units: Vec<UnitDefinition>,
}

/// Immutable lookup table of unit definitions, keyed by id.
///
/// Built once before the battle starts. A `BTreeMap` keeps iteration order
/// stable for hashing and display.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UnitRegistry {
    definitions: BTreeMap<String, UnitDefinition>,
}

impl UnitRegistry {
    /// Build a registry from a list of definitions.
    ///
    /// # Errors
    ///
    /// Returns an error if the list is empty, contains duplicate ids, or
    /// any definition fails validation.
    pub fn from_definitions(definitions: Vec<UnitDefinition>) -> Result<Self> {
        if definitions.is_empty() {
            return Err(BattleError::EmptyRegistry);
        }
        let mut map = BTreeMap::new();
        for def in definitions {
            def.validate()?;
            if map.contains_key(&def.id) {
                return Err(BattleError::DuplicateDefinition(def.id));
            }
            map.insert(def.id.clone(), def);
        }
        Ok(Self { definitions: map })
    }

    /// Parse a registry from RON text of the form `(units: [...])`.
    ///
    /// # Errors
    ///
    /// Returns [`BattleError::DefinitionLoad`] on parse failure, or the
    /// same errors as [`Self::from_definitions`] on invalid content.
    pub fn from_ron_str(text: &str) -> Result<Self> {
        let file: DefinitionFile =
            ron::from_str(text).map_err(|e| BattleError::DefinitionLoad(e.to_string()))?;
        Self::from_definitions(file.units)
    }

    /// Look up a definition by id.
    #[must_use]
    pub fn get(&self, id: &str) -> Option<&UnitDefinition> {
        self.definitions.get(id)
    }

    /// Number of definitions.
    #[must_use]
    pub fn len(&self) -> usize {
        self.definitions.len()
    }

    /// True if the registry holds no definitions.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.definitions.is_empty()
    }

    /// Iterate over definitions in id order.
    pub fn iter(&self) -> impl Iterator<Item = &UnitDefinition> {
        self.definitions.values()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn minimal_def(id: &str) -> UnitDefinition {
        UnitDefinition {
            id: id.to_string(),
            name: id.to_string(),
            emoji: "x".to_string(),
            stats: Stats {
                health: 10,
                speed: 10,
                movement_ticks: 100,
            },
            attack: None,
            behavior: Behavior::default(),
        }
    }

    #[test]
    fn test_registry_rejects_empty_list() {
        assert!(matches!(
            UnitRegistry::from_definitions(vec![]),
            Err(BattleError::EmptyRegistry)
        ));
    }

    #[test]
    fn test_registry_rejects_duplicates() {
        let result = UnitRegistry::from_definitions(vec![minimal_def("a"), minimal_def("a")]);
        assert!(matches!(result, Err(BattleError::DuplicateDefinition(id)) if id == "a"));
    }

    #[test]
    fn test_registry_rejects_zero_health() {
        let mut def = minimal_def("a");
        def.stats.health = 0;
        assert!(UnitRegistry::from_definitions(vec![def]).is_err());
    }

    #[test]
    fn test_damage_rules_first_match_wins() {
        let attack = MeleeAttack {
            damage: 1,
            frequency_ticks: 100,
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
        };
        // Fast target matches the first rule.
        assert_eq!(attack.damage_against(25), 2);
        // Slow target falls through to the default rule.
        assert_eq!(attack.damage_against(20), 5);
    }

    #[test]
    fn test_damage_falls_back_to_base_without_rules() {
        let attack = MeleeAttack {
            damage: 3,
            frequency_ticks: 100,
            rules: vec![],
        };
        assert_eq!(attack.damage_against(999), 3);
    }

    #[test]
    fn test_compare_ops() {
        assert!(CompareOp::Gt.compare(3, 2));
        assert!(!CompareOp::Gt.compare(2, 2));
        assert!(CompareOp::Ge.compare(2, 2));
        assert!(CompareOp::Lt.compare(1, 2));
        assert!(CompareOp::Le.compare(2, 2));
    }

    #[test]
    fn test_parse_ron_definitions() {
        let text = r#"(
            units: [
                (
                    id: "archer",
                    name: "Archer",
                    emoji: "A",
                    stats: (health: 8, speed: 15, movement_ticks: 400),
                    attack: Some(Ranged((
                        damage: 2,
                        frequency_ticks: 900,
                        range_manhattan: 6,
                    ))),
                ),
            ],
        )"#;
        let registry = UnitRegistry::from_ron_str(text).unwrap();
        let archer = registry.get("archer").unwrap();
        match archer.attack.as_ref().unwrap() {
            AttackSpec::Ranged(ranged) => {
                assert_eq!(ranged.range_manhattan, 6);
                // projectile_speed defaults when omitted.
                assert_eq!(ranged.projectile_speed, 50);
            }
            AttackSpec::Melee(_) => panic!("expected ranged attack"),
        }
        assert!(!archer.behavior.stop_on_adjacent_enemy);
    }
}
