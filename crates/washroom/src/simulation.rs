//! Full simulation run: a crowd of people sharing one room.
//!
//! Each person is an OS thread that enters, yields while inside, leaves, and
//! yields again, for a fixed number of rounds. Class assignment is drawn from a
//! seeded RNG so runs are reproducible.

use std::io;
use std::sync::Arc;
use std::thread;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::admission::{AdmissionError, Washroom};
use crate::class::Class;
use crate::config::{ConfigError, SimulationConfig};
use crate::report::{PerClass, Report};

#[derive(Debug, thiserror::Error)]
pub enum SimulationError {
    #[error("invalid configuration: {0}")]
    Config(#[from] ConfigError),
    #[error("failed to spawn person {person}")]
    Spawn {
        person: usize,
        #[source]
        source: io::Error,
    },
    #[error(transparent)]
    Admission(#[from] AdmissionError),
}

/// Draw a class for each person: even draws in `0..100` are class A, odd draws class B.
pub fn assign_classes(people: usize, seed: u64) -> Vec<Class> {
    let mut rng = StdRng::seed_from_u64(seed);
    (0..people)
        .map(|_| Class::from_draw(rng.gen_range(0..100)))
        .collect()
}

pub struct Simulation {
    config: SimulationConfig,
    washroom: Arc<Washroom>,
    classes: Vec<Class>,
}

impl Simulation {
    pub fn new(config: SimulationConfig) -> Result<Self, SimulationError> {
        config.validate()?;
        Ok(Self {
            washroom: Arc::new(Washroom::new(config.room, config.waiting_buckets())),
            classes: assign_classes(config.people, config.seed),
            config,
        })
    }

    /// Validate `config`, run every person to completion, and report.
    pub fn run(config: SimulationConfig) -> Result<Report, SimulationError> {
        Self::new(config)?.execute()
    }

    pub fn washroom(&self) -> &Arc<Washroom> {
        &self.washroom
    }

    pub fn classes(&self) -> &[Class] {
        &self.classes
    }

    /// Run every person to completion and report.
    ///
    /// A worker that panicked (an invariant breach) has its panic re-raised here.
    pub fn execute(self) -> Result<Report, SimulationError> {
        let mut people = PerClass::<usize>::default();
        for class in &self.classes {
            *people.get_mut(*class) += 1;
        }
        tracing::info!(
            people = self.config.people,
            iterations = self.config.iterations,
            class_a = people.a,
            class_b = people.b,
            capacity = self.config.room.max_occupancy,
            threshold = self.config.room.fairness_threshold,
            "Starting simulation"
        );

        let outcomes = thread::scope(|scope| {
            let washroom: &Washroom = &self.washroom;
            let config = &self.config;
            let mut handles = Vec::with_capacity(self.classes.len());
            for (person, class) in self.classes.iter().copied().enumerate() {
                let handle = thread::Builder::new()
                    .name(format!("person-{person}"))
                    .spawn_scoped(scope, move || visit_repeatedly(washroom, class, config))
                    .map_err(|source| SimulationError::Spawn { person, source })?;
                handles.push(handle);
            }
            Ok::<_, SimulationError>(handles.into_iter().map(|h| h.join()).collect::<Vec<_>>())
        })?;

        let mut first_error = None;
        for outcome in outcomes {
            match outcome {
                Ok(Ok(())) => {}
                Ok(Err(e)) => {
                    first_error.get_or_insert(e);
                }
                Err(panic) => std::panic::resume_unwind(panic),
            }
        }
        if let Some(e) = first_error {
            return Err(e.into());
        }

        let histograms = self.washroom.histograms()?;
        let report = Report::new(&self.config, people, &histograms);
        tracing::info!(
            entries = report.total_entries,
            overflow = report.overflow,
            "Simulation finished"
        );
        Ok(report)
    }
}

/// One person's life: `iterations` rounds of enter, dawdle, leave, dawdle.
fn visit_repeatedly(
    washroom: &Washroom,
    class: Class,
    config: &SimulationConfig,
) -> Result<(), AdmissionError> {
    for _ in 0..config.iterations {
        let visit = washroom.enter(class)?;
        for _ in 0..config.people {
            thread::yield_now();
        }
        visit.leave()?;
        for _ in 0..config.people {
            thread::yield_now();
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::WashroomConfig;

    #[test]
    fn class_assignment_is_reproducible() {
        assert_eq!(assign_classes(20, 1), assign_classes(20, 1));
        assert_eq!(assign_classes(0, 1), Vec::<Class>::new());
    }

    #[test]
    fn invalid_config_is_rejected_before_spawning() {
        let err = Simulation::run(SimulationConfig::default().with_people(0)).unwrap_err();
        assert!(matches!(err, SimulationError::Config(ConfigError::NoPeople)));
        assert_eq!(
            err.to_string(),
            "invalid configuration: simulation needs at least one person"
        );
    }

    #[test]
    fn every_entry_lands_in_the_histogram() {
        let config = SimulationConfig::default()
            .with_people(8)
            .with_iterations(25)
            .with_seed(3);
        let simulation = Simulation::new(config).unwrap();
        let washroom = Arc::clone(simulation.washroom());
        let classes = simulation.classes().to_vec();

        let report = simulation.execute().unwrap();

        assert_eq!(report.total_entries, 8 * 25);
        assert_eq!(report.people.a + report.people.b, 8);
        for class in Class::ALL {
            let headcount = classes.iter().filter(|c| **c == class).count() as u64;
            let entries: u64 = report.occupancy.get(class).iter().sum();
            assert_eq!(entries, headcount * 25);
        }

        let room = washroom.snapshot().unwrap();
        assert_eq!(room.occupancy, 0);
        assert_eq!(room.blocked, 0);
        assert!(room.gate_open);
        assert_eq!(room.clock, 8 * 25);
    }

    #[test]
    fn single_class_crowd_never_counts_waits() {
        let config = SimulationConfig::default()
            .with_people(6)
            .with_iterations(10)
            .with_room(WashroomConfig::default().with_max_occupancy(2));
        let simulation = Simulation {
            washroom: Arc::new(Washroom::new(config.room, config.waiting_buckets())),
            classes: vec![Class::A; 6],
            config,
        };
        let washroom = Arc::clone(simulation.washroom());

        let report = simulation.execute().unwrap();

        assert_eq!(report.people, PerClass { a: 6, b: 0 });
        assert_eq!(report.total_entries, 60);
        assert_eq!(report.occupancy.b, vec![0, 0]);
        assert_eq!(washroom.snapshot().unwrap().wait_counts, [0, 0]);
    }

    #[test]
    fn default_run_completes() {
        let report = Simulation::run(SimulationConfig::default()).unwrap();
        assert_eq!(report.total_entries, 2000);
        assert_eq!(report.parameters.max_occupancy, 3);
        assert_eq!(report.occupancy.a.len(), 3);
    }
}
