use std::collections::BTreeMap;
use std::fmt::{Display, Formatter};
use std::time::Duration;

use chrono::{DateTime, Utc};

/// Point in time statistics for a [crate::prelude::Timer].
#[derive(Debug, Clone, PartialEq)]
pub struct TimerSnapshot {
    pub count: usize,
    /// Samples per second since the timer was created.
    pub mean_rate: f64,
    pub min: Duration,
    pub max: Duration,
    pub mean: Duration,
    pub stddev: Duration,
    pub p50: Duration,
    pub p75: Duration,
    pub p95: Duration,
    pub p98: Duration,
    pub p99: Duration,
    pub p999: Duration,
}

impl TimerSnapshot {
    pub(crate) fn from_samples(mut samples: Vec<Duration>, age: Duration) -> Self {
        samples.sort_unstable();

        let count = samples.len();
        if count == 0 {
            return Self {
                count,
                mean_rate: 0.0,
                min: Duration::ZERO,
                max: Duration::ZERO,
                mean: Duration::ZERO,
                stddev: Duration::ZERO,
                p50: Duration::ZERO,
                p75: Duration::ZERO,
                p95: Duration::ZERO,
                p98: Duration::ZERO,
                p99: Duration::ZERO,
                p999: Duration::ZERO,
            };
        }

        let secs = samples.iter().map(Duration::as_secs_f64).collect::<Vec<_>>();
        let mean = secs.iter().sum::<f64>() / count as f64;
        // Sample variance, a single sample has no spread.
        let variance = if count > 1 {
            secs.iter().map(|s| (s - mean).powi(2)).sum::<f64>() / (count - 1) as f64
        } else {
            0.0
        };

        let age_secs = age.as_secs_f64();

        Self {
            count,
            mean_rate: if age_secs > 0.0 {
                count as f64 / age_secs
            } else {
                0.0
            },
            min: samples[0],
            max: samples[count - 1],
            mean: Duration::from_secs_f64(mean),
            stddev: Duration::from_secs_f64(variance.sqrt()),
            p50: percentile(&samples, 0.5),
            p75: percentile(&samples, 0.75),
            p95: percentile(&samples, 0.95),
            p98: percentile(&samples, 0.98),
            p99: percentile(&samples, 0.99),
            p999: percentile(&samples, 0.999),
        }
    }
}

/// Nearest-rank percentile over sorted, non-empty samples.
fn percentile(sorted: &[Duration], quantile: f64) -> Duration {
    let rank = (quantile * sorted.len() as f64).ceil() as usize;
    sorted[rank.clamp(1, sorted.len()) - 1]
}

fn millis(d: Duration) -> f64 {
    d.as_secs_f64() * 1000.0
}

impl Display for TimerSnapshot {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "count={} mean_rate={:.2}/s min={:.3}ms max={:.3}ms mean={:.3}ms stddev={:.3}ms \
             p50={:.3}ms p75={:.3}ms p95={:.3}ms p98={:.3}ms p99={:.3}ms p999={:.3}ms",
            self.count,
            self.mean_rate,
            millis(self.min),
            millis(self.max),
            millis(self.mean),
            millis(self.stddev),
            millis(self.p50),
            millis(self.p75),
            millis(self.p95),
            millis(self.p98),
            millis(self.p99),
            millis(self.p999),
        )
    }
}

/// Everything a [crate::prelude::MetricsRegistry] held at the moment it was read.
#[derive(Debug, Clone, PartialEq)]
pub struct MetricsSnapshot {
    pub taken_at: DateTime<Utc>,
    pub gauges: BTreeMap<String, f64>,
    pub timers: BTreeMap<String, TimerSnapshot>,
}

impl MetricsSnapshot {
    pub fn gauge(&self, name: &str) -> Option<f64> {
        self.gauges.get(name).copied()
    }

    pub fn timer(&self, name: &str) -> Option<&TimerSnapshot> {
        self.timers.get(name)
    }
}

impl Display for MetricsSnapshot {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "Metrics report")?;
        for (name, value) in &self.gauges {
            write!(f, " | gauge {name}: value={value:.3}")?;
        }
        for (name, timer) in &self.timers {
            write!(f, " | timer {name}: {timer}")?;
        }
        Ok(())
    }
}
