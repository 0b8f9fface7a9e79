//! Fixed constants and the typed configs that carry them.

/// Maximum number of people in the room at once.
pub const MAX_OCCUPANCY: usize = 3;

/// Once this many opposite-class waits have piled up, entry is blocked so the class can swap.
pub const FAIRNESS_THRESHOLD: usize = 4;

/// Number of people in a simulation run.
pub const NUM_PEOPLE: usize = 20;

/// Number of times each person enters the room.
pub const NUM_ITERATIONS: usize = 100;

/// Seed for class assignment.
pub const DEFAULT_SEED: u64 = 1;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConfigError {
    #[error("room capacity must be at least 1")]
    ZeroCapacity,
    #[error("simulation needs at least one person")]
    NoPeople,
    #[error("simulation needs at least one iteration")]
    NoIterations,
}

/// Admission parameters for one room.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WashroomConfig {
    pub max_occupancy: usize,
    pub fairness_threshold: usize,
}

impl Default for WashroomConfig {
    fn default() -> Self {
        Self {
            max_occupancy: MAX_OCCUPANCY,
            fairness_threshold: FAIRNESS_THRESHOLD,
        }
    }
}

impl WashroomConfig {
    pub fn with_max_occupancy(mut self, max_occupancy: usize) -> Self {
        self.max_occupancy = max_occupancy;
        self
    }

    pub fn with_fairness_threshold(mut self, fairness_threshold: usize) -> Self {
        self.fairness_threshold = fairness_threshold;
        self
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.max_occupancy == 0 {
            return Err(ConfigError::ZeroCapacity);
        }
        Ok(())
    }
}

/// Parameters for a full simulation run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SimulationConfig {
    pub people: usize,
    pub iterations: usize,
    pub seed: u64,
    pub room: WashroomConfig,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            people: NUM_PEOPLE,
            iterations: NUM_ITERATIONS,
            seed: DEFAULT_SEED,
            room: WashroomConfig::default(),
        }
    }
}

impl SimulationConfig {
    pub fn with_people(mut self, people: usize) -> Self {
        self.people = people;
        self
    }

    pub fn with_iterations(mut self, iterations: usize) -> Self {
        self.iterations = iterations;
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    pub fn with_room(mut self, room: WashroomConfig) -> Self {
        self.room = room;
        self
    }

    /// Number of waiting-time buckets; longer waits land in the overflow counter.
    pub fn waiting_buckets(&self) -> usize {
        self.people * self.iterations
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        self.room.validate()?;
        if self.people == 0 {
            return Err(ConfigError::NoPeople);
        }
        if self.iterations == 0 {
            return Err(ConfigError::NoIterations);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_carry_constants() {
        let config = SimulationConfig::default();
        assert_eq!(config.people, 20);
        assert_eq!(config.iterations, 100);
        assert_eq!(config.seed, 1);
        assert_eq!(config.room.max_occupancy, 3);
        assert_eq!(config.room.fairness_threshold, 4);
        assert_eq!(config.waiting_buckets(), 2000);
    }

    #[test]
    fn builder_pattern() {
        let config = SimulationConfig::default()
            .with_people(6)
            .with_iterations(10)
            .with_seed(7)
            .with_room(WashroomConfig::default().with_max_occupancy(2).with_fairness_threshold(1));

        assert_eq!(config.people, 6);
        assert_eq!(config.iterations, 10);
        assert_eq!(config.seed, 7);
        assert_eq!(config.room.max_occupancy, 2);
        assert_eq!(config.room.fairness_threshold, 1);
        assert_eq!(config.waiting_buckets(), 60);
    }

    #[test]
    fn validate_rejects_empty_dimensions() {
        let zero_room = SimulationConfig::default()
            .with_room(WashroomConfig::default().with_max_occupancy(0));
        assert_eq!(zero_room.validate(), Err(ConfigError::ZeroCapacity));
        assert_eq!(
            SimulationConfig::default().with_people(0).validate(),
            Err(ConfigError::NoPeople)
        );
        assert_eq!(
            SimulationConfig::default().with_iterations(0).validate(),
            Err(ConfigError::NoIterations)
        );
        assert!(SimulationConfig::default().validate().is_ok());
    }
}
