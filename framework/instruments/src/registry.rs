use std::collections::BTreeMap;
use std::sync::Arc;

use chrono::Utc;
use fib_tunnel_core::prelude::DuplicateMetricError;

use crate::gauge::Gauge;
use crate::snapshot::MetricsSnapshot;
use crate::timer::Timer;

/// A named set of metrics that are collected and reported together.
///
/// Every metric has to be registered by name before it can be used. Names are unique across all
/// metric kinds in one registry.
#[derive(Default)]
pub struct MetricsRegistry {
    gauges: BTreeMap<String, Box<dyn Gauge>>,
    timers: BTreeMap<String, Arc<Timer>>,
}

impl MetricsRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register_gauge(&mut self, name: &str, gauge: impl Gauge + 'static) -> anyhow::Result<()> {
        self.ensure_unused(name)?;
        self.gauges.insert(name.to_string(), Box::new(gauge));
        Ok(())
    }

    /// Register a new timer and get a shared handle to it for recording samples.
    pub fn register_timer(&mut self, name: &str) -> anyhow::Result<Arc<Timer>> {
        self.ensure_unused(name)?;
        let timer = Arc::new(Timer::new());
        self.timers.insert(name.to_string(), timer.clone());
        Ok(timer)
    }

    /// Read every registered metric. Gauges are evaluated now.
    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            taken_at: Utc::now(),
            gauges: self
                .gauges
                .iter()
                .map(|(name, gauge)| (name.clone(), gauge.value()))
                .collect(),
            timers: self
                .timers
                .iter()
                .map(|(name, timer)| (name.clone(), timer.snapshot()))
                .collect(),
        }
    }

    fn ensure_unused(&self, name: &str) -> anyhow::Result<()> {
        if self.gauges.contains_key(name) || self.timers.contains_key(name) {
            return Err(DuplicateMetricError::new(name).into());
        }

        Ok(())
    }
}
