//! Wall-clock timing of parse and simulate over input files.

use profit_core::profiling::RunProfile;
use profit_core::world::World;
use serde::Serialize;
use serde_json::Value;
use std::path::PathBuf;
use std::time::Instant;

/// Summary of a set of millisecond samples.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Stats {
    pub average: f64,
    pub median: f64,
    pub minimum: f64,
    pub maximum: f64,
    pub standard_deviation: f64,
}

impl Stats {
    /// `None` for an empty sample set. The median is the upper one for an
    /// even count.
    pub fn from_samples(samples: &[f64]) -> Option<Self> {
        let n = samples.len();
        if n == 0 {
            return None;
        }
        let mut sorted = samples.to_vec();
        sorted.sort_by(f64::total_cmp);
        let average = sorted.iter().sum::<f64>() / n as f64;
        let variance = sorted.iter().map(|s| (s - average).powi(2)).sum::<f64>() / n as f64;
        Some(Self {
            average,
            median: sorted[n / 2],
            minimum: sorted[0],
            maximum: sorted[n - 1],
            standard_deviation: variance.sqrt(),
        })
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct StageReport {
    pub duration: Option<Stats>,
}

#[derive(Debug, Clone, Serialize)]
pub struct Bottleneck {
    pub phase: &'static str,
    pub ms: f64,
}

#[derive(Debug, Clone, Serialize)]
pub struct BenchReport {
    pub file: PathBuf,
    pub iterations: usize,
    pub parse: StageReport,
    pub simulate: StageReport,
    /// Slowest phase of the last run, when one completed.
    pub bottleneck: Option<Bottleneck>,
}

fn measure<T>(action: impl FnOnce() -> T) -> (T, f64) {
    let started = Instant::now();
    let value = action();
    (value, started.elapsed().as_secs_f64() * 1000.0)
}

/// Parse `raw` into a fresh world `iterations` times and simulate each one
/// with the event log off. Invalid worlds are timed through the refusal.
pub fn run(file: PathBuf, raw: &Value, iterations: usize) -> BenchReport {
    let mut parse = Vec::with_capacity(iterations);
    let mut simulate = Vec::with_capacity(iterations);
    let mut profile: Option<RunProfile> = None;

    for _ in 0..iterations {
        let (mut world, parse_ms) = measure(|| World::from_value(raw));
        world.set_log_enabled(false);
        let (_, simulate_ms) = measure(|| world.simulate().map(|_| ()));
        parse.push(parse_ms);
        simulate.push(simulate_ms);
        if let Some(last) = world.last_profile() {
            profile = Some(last.clone());
        }
    }

    tracing::info!(file = %file.display(), iterations, "benchmark finished");

    BenchReport {
        file,
        iterations,
        parse: StageReport {
            duration: Stats::from_samples(&parse),
        },
        simulate: StageReport {
            duration: Stats::from_samples(&simulate),
        },
        bottleneck: profile.map(|p| {
            let (phase, duration) = p.bottleneck_phase();
            Bottleneck {
                phase,
                ms: duration.as_secs_f64() * 1000.0,
            }
        }),
    }
}
