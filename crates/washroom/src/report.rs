//! End-of-run report built from the diagnostic histograms.

use std::fmt;

use serde::Serialize;

use crate::class::Class;
use crate::config::SimulationConfig;
use crate::stats::Histograms;
use crate::version::VersionInfo;

/// One value per class.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct PerClass<T> {
    pub a: T,
    pub b: T,
}

impl<T> PerClass<T> {
    pub fn get(&self, class: Class) -> &T {
        match class {
            Class::A => &self.a,
            Class::B => &self.b,
        }
    }

    pub fn get_mut(&mut self, class: Class) -> &mut T {
        match class {
            Class::A => &mut self.a,
            Class::B => &mut self.b,
        }
    }
}

/// Echo of the parameters the run used.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RunParameters {
    pub people: usize,
    pub iterations: usize,
    pub max_occupancy: usize,
    pub fairness_threshold: usize,
    pub seed: u64,
}

impl From<&SimulationConfig> for RunParameters {
    fn from(config: &SimulationConfig) -> Self {
        Self {
            people: config.people,
            iterations: config.iterations,
            max_occupancy: config.room.max_occupancy,
            fairness_threshold: config.room.fairness_threshold,
            seed: config.seed,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct WaitBucket {
    pub ticks: usize,
    pub count: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Report {
    pub version: VersionInfo,
    pub parameters: RunParameters,
    /// Head count per class.
    pub people: PerClass<usize>,
    /// `occupancy.a[n - 1]` counts entries that brought class A to `n` occupants.
    pub occupancy: PerClass<Vec<u64>>,
    /// Non-empty waiting buckets, in tick order.
    pub waiting: Vec<WaitBucket>,
    /// Waits at or beyond this many ticks are counted as overflow.
    pub waiting_limit: usize,
    pub overflow: u64,
    pub total_entries: u64,
}

impl Report {
    pub fn new(config: &SimulationConfig, people: PerClass<usize>, histograms: &Histograms) -> Self {
        let occupancy_levels = |class: Class| {
            (1..=histograms.max_occupancy())
                .map(|n| histograms.occupancy(class, n))
                .collect::<Vec<_>>()
        };

        Self {
            version: VersionInfo::new(),
            parameters: RunParameters::from(config),
            people,
            occupancy: PerClass {
                a: occupancy_levels(Class::A),
                b: occupancy_levels(Class::B),
            },
            waiting: histograms
                .waiting_nonzero()
                .map(|(ticks, count)| WaitBucket { ticks, count })
                .collect(),
            waiting_limit: histograms.waiting().len(),
            overflow: histograms.overflow(),
            total_entries: histograms.total_entries(),
        }
    }

    pub fn with_version(mut self, version: VersionInfo) -> Self {
        self.version = version;
        self
    }
}

impl fmt::Display for Report {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut lines = Vec::new();

        for class in Class::ALL {
            for (i, count) in self.occupancy.get(class).iter().enumerate() {
                let n = i + 1;
                let noun = if n == 1 { "person" } else { "people" };
                lines.push(format!(
                    "Times with {n} {noun} of class {}  {count}",
                    class.as_str()
                ));
            }
        }

        lines.push("Waiting histogram".to_string());
        for bucket in &self.waiting {
            let noun = if bucket.ticks == 1 { "entry" } else { "entries" };
            lines.push(format!(
                "  Number of times people waited for {} {noun}: {}",
                bucket.ticks, bucket.count
            ));
        }
        if self.overflow > 0 {
            lines.push(format!(
                "  Number of times people waited more than {} entries: {}",
                self.waiting_limit, self.overflow
            ));
        }

        f.write_str(&lines.join("\n"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_histograms() -> Histograms {
        let mut histograms = Histograms::new(3, 4);
        histograms.record_entry(Class::A, 1, 0);
        histograms.record_entry(Class::A, 2, 0);
        histograms.record_entry(Class::A, 2, 1);
        histograms.record_entry(Class::B, 1, 3);
        histograms.record_entry(Class::B, 3, 9);
        histograms
    }

    fn sample_report() -> Report {
        let config = SimulationConfig::default()
            .with_people(2)
            .with_iterations(2)
            .with_seed(7);
        Report::new(&config, PerClass { a: 1, b: 1 }, &sample_histograms()).with_version(
            VersionInfo {
                washroom: "0.1.0",
                binary: None,
            },
        )
    }

    #[test]
    fn report_counts_every_entry() {
        let report = sample_report();
        assert_eq!(report.total_entries, 5);
        assert_eq!(report.occupancy.a, vec![1, 2, 0]);
        assert_eq!(report.occupancy.b, vec![1, 0, 1]);
        assert_eq!(report.overflow, 1);
        assert_eq!(report.waiting_limit, 4);
    }

    #[test]
    fn report_renders_text() {
        insta::assert_snapshot!(sample_report().to_string(), @r"
        Times with 1 person of class A  1
        Times with 2 people of class A  2
        Times with 3 people of class A  0
        Times with 1 person of class B  1
        Times with 2 people of class B  0
        Times with 3 people of class B  1
        Waiting histogram
          Number of times people waited for 0 entries: 2
          Number of times people waited for 1 entry: 1
          Number of times people waited for 3 entries: 1
          Number of times people waited more than 4 entries: 1
        ");
    }

    #[test]
    fn report_omits_overflow_line_when_empty() {
        let mut histograms = Histograms::new(1, 4);
        histograms.record_entry(Class::A, 1, 0);
        let report = Report::new(
            &SimulationConfig::default(),
            PerClass { a: 1, b: 0 },
            &histograms,
        );
        assert!(!report.to_string().contains("more than"));
    }

    #[test]
    fn report_serializes() {
        insta::assert_json_snapshot!(sample_report(), @r#"
        {
          "version": {
            "washroom": "0.1.0"
          },
          "parameters": {
            "people": 2,
            "iterations": 2,
            "max_occupancy": 3,
            "fairness_threshold": 4,
            "seed": 7
          },
          "people": {
            "a": 1,
            "b": 1
          },
          "occupancy": {
            "a": [
              1,
              2,
              0
            ],
            "b": [
              1,
              0,
              1
            ]
          },
          "waiting": [
            {
              "ticks": 0,
              "count": 2
            },
            {
              "ticks": 1,
              "count": 1
            },
            {
              "ticks": 3,
              "count": 1
            }
          ],
          "waiting_limit": 4,
          "overflow": 1,
          "total_entries": 5
        }
        "#);
    }
}
