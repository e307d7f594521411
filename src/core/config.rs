//! Engine configuration with documented constants
//!
//! All magic numbers are collected here with explanations of their purpose
//! and how they interact with each other.

/// Configuration for the decision engine
///
/// These values have been tuned to produce readable faction behavior.
/// Changing them will affect pacing and how quickly factions escalate.
#[derive(Debug, Clone)]
pub struct EngineConfig {
    // === SCHEDULING ===
    /// Interval between decision ticks, in milliseconds
    ///
    /// The engine itself is interval-agnostic; this is the reference
    /// cadence a driving loop should use.
    pub tick_interval_ms: u64,

    /// Interval for the read-only telemetry view, in milliseconds
    ///
    /// Telemetry reads the scheduler state between ticks without
    /// re-deriving the snapshot, so it can run on a shorter cadence.
    pub telemetry_interval_ms: u64,

    // === STATE MACHINE ===
    /// Maximum number of retained history entries per faction
    ///
    /// Each applied transition records the prior state. The buffer is a
    /// ring: once full, the oldest entry is dropped.
    pub history_cap: usize,

    // === TRIGGER DERIVATION ===
    /// Territory threat level at or above which HeavyDamage fires
    ///
    /// Threat is normalized to [0, 1]; 0.7 means a faction under
    /// sustained pressure switches to damage-reaction transitions.
    pub heavy_damage_threat: f32,

    /// Number of hostiles that saturates the threat level
    ///
    /// threat = min(1, hostiles / threat_divisor). At 10.0, ten or more
    /// hostiles in territory pin threat at the maximum.
    pub threat_divisor: f32,

    /// Multiplier on territory radius used for the SafeDistance check
    ///
    /// A retreating faction is "safe" once no hostile sits within
    /// radius * safe_distance_factor of the territory center.
    pub safe_distance_factor: f32,

    /// Minimum stealth-capable ships for an ambush opportunity
    pub ambush_min_stealth_ships: usize,

    /// Maximum territory threat for an ambush opportunity
    pub ambush_max_threat: f32,

    /// Relationship value at or below which a faction counts as provoked
    pub provocation_threshold: f32,

    /// Allies required in territory for the Reinforced trigger
    pub reinforcement_min_allies: usize,

    // === SPAWNING ===
    /// Distance inside the territory boundary at which new ships appear
    ///
    /// Spawn points are random points at radius - offset from the
    /// center, keeping fresh ships clear of boundary skirmishes.
    pub spawn_boundary_offset: f32,

    // === PARALLELIZATION ===
    /// Minimum ship count before using parallel context gathering
    ///
    /// Below this threshold, thread overhead exceeds benefits.
    pub parallel_threshold: usize,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            tick_interval_ms: 1000,
            telemetry_interval_ms: 250,

            history_cap: 32,

            heavy_damage_threat: 0.7,
            threat_divisor: 10.0,
            safe_distance_factor: 1.5,
            ambush_min_stealth_ships: 3,
            ambush_max_threat: 0.3,
            provocation_threshold: -0.3,
            reinforcement_min_allies: 4,

            spawn_boundary_offset: 50.0,

            parallel_threshold: 1000,
        }
    }
}

impl EngineConfig {
    /// Create a new config with default values
    pub fn new() -> Self {
        Self::default()
    }

    /// Validate configuration for internal consistency
    pub fn validate(&self) -> Result<(), String> {
        if self.history_cap == 0 {
            return Err("history_cap must be at least 1".into());
        }

        if self.threat_divisor <= 0.0 {
            return Err("threat_divisor must be positive".into());
        }

        if !(0.0..=1.0).contains(&self.heavy_damage_threat) {
            return Err(format!(
                "heavy_damage_threat ({}) must be within [0, 1]",
                self.heavy_damage_threat
            ));
        }

        if self.safe_distance_factor < 1.0 {
            return Err(format!(
                "safe_distance_factor ({}) must be >= 1.0 or SafeDistance fires while hostiles remain in territory",
                self.safe_distance_factor
            ));
        }

        if self.telemetry_interval_ms > self.tick_interval_ms {
            return Err(format!(
                "telemetry_interval_ms ({}) should be <= tick_interval_ms ({})",
                self.telemetry_interval_ms, self.tick_interval_ms
            ));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        assert!(EngineConfig::default().validate().is_ok());
    }

    #[test]
    fn test_zero_history_cap_rejected() {
        let cfg = EngineConfig {
            history_cap: 0,
            ..EngineConfig::default()
        };
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn test_safe_distance_below_one_rejected() {
        let cfg = EngineConfig {
            safe_distance_factor: 0.5,
            ..EngineConfig::default()
        };
        assert!(cfg.validate().is_err());
    }
}
