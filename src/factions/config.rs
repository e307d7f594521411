//! Per-archetype configuration
//!
//! A missing or malformed config for a declared faction is a programming or
//! integration error: the registry fails fast at construction and the
//! scheduler refuses to start, rather than silently defaulting.

use ahash::AHashMap;
use serde::{Deserialize, Serialize};

use crate::core::error::{EngineError, Result};
use crate::factions::archetype::FactionArchetype;

/// Archetype-wide behavioral rule
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SpecialRule {
    /// Treats every other faction as hostile regardless of relationships
    AlwaysHostile,
    /// Engages only after a relationship drops below the provocation threshold
    RequiresProvocation,
    /// Mobilizes when another fleet exceeds `power_threshold` times its own
    PowerThreshold,
}

/// Tuning knobs for one faction archetype
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ArchetypeConfig {
    /// Base disposition weights in [0, 1]
    pub aggression: f32,
    pub expansion: f32,
    pub trading: f32,

    /// Preferred engagement range in world units
    pub preferred_range: f32,
    /// Health fraction below which individual ships disengage
    pub retreat_threshold: f32,

    /// Spawn ceiling and cadence
    pub max_ships: usize,
    pub spawn_interval_ticks: u64,
    /// Per-opportunity spawn probability gate (used by probabilistic archetypes)
    pub spawn_probability: f32,

    pub special_rule: SpecialRule,
    /// Only meaningful under `SpecialRule::PowerThreshold`
    #[serde(default = "default_power_threshold")]
    pub power_threshold: f32,
}

fn default_power_threshold() -> f32 {
    1.0
}

impl ArchetypeConfig {
    pub fn validate(&self, archetype: FactionArchetype) -> Result<()> {
        let invalid = |reason: String| EngineError::InvalidConfig { archetype, reason };

        for (name, value) in [
            ("aggression", self.aggression),
            ("expansion", self.expansion),
            ("trading", self.trading),
            ("retreat_threshold", self.retreat_threshold),
            ("spawn_probability", self.spawn_probability),
        ] {
            if !(0.0..=1.0).contains(&value) {
                return Err(invalid(format!("{name} ({value}) must be within [0, 1]")));
            }
        }

        if self.preferred_range <= 0.0 {
            return Err(invalid(format!(
                "preferred_range ({}) must be positive",
                self.preferred_range
            )));
        }

        if self.max_ships == 0 {
            return Err(invalid("max_ships must be at least 1".to_string()));
        }

        if self.spawn_interval_ticks == 0 {
            return Err(invalid("spawn_interval_ticks must be at least 1".to_string()));
        }

        if self.special_rule == SpecialRule::PowerThreshold && self.power_threshold <= 0.0 {
            return Err(invalid(format!(
                "power_threshold ({}) must be positive under the power-threshold rule",
                self.power_threshold
            )));
        }

        Ok(())
    }
}

/// Immutable registry of archetype configs, built once at startup
#[derive(Debug, Clone)]
pub struct ConfigRegistry {
    configs: AHashMap<FactionArchetype, ArchetypeConfig>,
}

impl ConfigRegistry {
    pub fn empty() -> Self {
        Self { configs: AHashMap::new() }
    }

    /// The tuned defaults for the three sprawl archetypes
    pub fn standard() -> Self {
        let mut configs = AHashMap::new();

        configs.insert(
            FactionArchetype::SpaceRats,
            ArchetypeConfig {
                aggression: 0.9,
                expansion: 0.6,
                trading: 0.2,
                preferred_range: 150.0,
                retreat_threshold: 0.3,
                max_ships: 20,
                spawn_interval_ticks: 8,
                spawn_probability: 0.3,
                special_rule: SpecialRule::AlwaysHostile,
                power_threshold: 1.0,
            },
        );

        configs.insert(
            FactionArchetype::LostNova,
            ArchetypeConfig {
                aggression: 0.5,
                expansion: 0.3,
                trading: 0.4,
                preferred_range: 120.0,
                retreat_threshold: 0.4,
                max_ships: 12,
                spawn_interval_ticks: 12,
                spawn_probability: 1.0,
                special_rule: SpecialRule::RequiresProvocation,
                power_threshold: 1.0,
            },
        );

        configs.insert(
            FactionArchetype::EquatorHorizon,
            ArchetypeConfig {
                aggression: 0.4,
                expansion: 0.2,
                trading: 0.7,
                preferred_range: 200.0,
                retreat_threshold: 0.5,
                max_ships: 16,
                spawn_interval_ticks: 10,
                spawn_probability: 1.0,
                special_rule: SpecialRule::PowerThreshold,
                power_threshold: 1.5,
            },
        );

        Self { configs }
    }

    pub fn insert(&mut self, archetype: FactionArchetype, config: ArchetypeConfig) {
        self.configs.insert(archetype, config);
    }

    /// Config for an archetype; missing entries are a fatal startup error
    pub fn for_archetype(&self, archetype: FactionArchetype) -> Result<&ArchetypeConfig> {
        self.configs
            .get(&archetype)
            .ok_or(EngineError::MissingArchetypeConfig(archetype))
    }

    /// Validate every registered config
    pub fn validate(&self) -> Result<()> {
        for (&archetype, config) in &self.configs {
            config.validate(archetype)?;
        }
        Ok(())
    }

    /// Parse a registry from TOML, keyed by archetype name
    ///
    /// ```toml
    /// [space-rats]
    /// aggression = 0.9
    /// ...
    /// ```
    pub fn from_toml_str(input: &str) -> Result<Self> {
        let raw: AHashMap<String, ArchetypeConfig> = toml::from_str(input)?;
        let mut registry = Self::empty();
        for (key, config) in raw {
            let archetype: FactionArchetype = key.parse().map_err(|reason| {
                EngineError::InvalidConfig {
                    archetype: FactionArchetype::SpaceRats,
                    reason,
                }
            })?;
            config.validate(archetype)?;
            registry.insert(archetype, config);
        }
        Ok(registry)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_standard_registry_is_valid() {
        let registry = ConfigRegistry::standard();
        assert!(registry.validate().is_ok());
        for archetype in FactionArchetype::ALL {
            assert!(registry.for_archetype(archetype).is_ok());
        }
    }

    #[test]
    fn test_missing_archetype_is_error() {
        let registry = ConfigRegistry::empty();
        assert!(matches!(
            registry.for_archetype(FactionArchetype::LostNova),
            Err(EngineError::MissingArchetypeConfig(FactionArchetype::LostNova))
        ));
    }

    #[test]
    fn test_out_of_range_weight_rejected() {
        let mut config = ConfigRegistry::standard()
            .for_archetype(FactionArchetype::SpaceRats)
            .unwrap()
            .clone();
        config.aggression = 1.4;
        assert!(config.validate(FactionArchetype::SpaceRats).is_err());
    }

    #[test]
    fn test_toml_round_trip() {
        let input = r#"
            [space-rats]
            aggression = 0.8
            expansion = 0.5
            trading = 0.1
            preferred_range = 140.0
            retreat_threshold = 0.25
            max_ships = 10
            spawn_interval_ticks = 6
            spawn_probability = 0.5
            special_rule = "always-hostile"
        "#;
        let registry = ConfigRegistry::from_toml_str(input).unwrap();
        let config = registry.for_archetype(FactionArchetype::SpaceRats).unwrap();
        assert_eq!(config.max_ships, 10);
        assert_eq!(config.special_rule, SpecialRule::AlwaysHostile);
        assert_eq!(config.power_threshold, 1.0);
    }

    #[test]
    fn test_toml_unknown_archetype_rejected() {
        let input = r#"
            [void-walkers]
            aggression = 0.8
            expansion = 0.5
            trading = 0.1
            preferred_range = 140.0
            retreat_threshold = 0.25
            max_ships = 10
            spawn_interval_ticks = 6
            spawn_probability = 0.5
            special_rule = "always-hostile"
        "#;
        assert!(ConfigRegistry::from_toml_str(input).is_err());
    }
}
