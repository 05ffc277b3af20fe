use std::hint::black_box;
use std::sync::Arc;

use anyhow::Context;
use fib_tunnel_core::prelude::DiagnosticContext;
use fib_tunnel_instruments::prelude::{
    MetricsRegistry, MetricsSnapshot, ProcessUptimeGauge, Reporter, Timer,
};

use crate::config::HarnessConfig;
use crate::event::EventRecord;
use crate::executor::WorkerPool;

/// Name of the timer shared by both execution streams.
pub const FIBONACCI_TIMER: &str = "fibonacci.timer";

/// The computation timed by the harness. Receives the configured Fibonacci parameter.
pub type ComputeFn = fn(u64) -> anyhow::Result<u64>;

/// Unmemoized recursive Fibonacci. Exponential on purpose, it exists to burn CPU.
pub fn fibonacci(n: u64) -> u64 {
    if n == 0 || n == 1 {
        n
    } else {
        fibonacci(n - 1) + fibonacci(n - 2)
    }
}

fn compute_fibonacci(n: u64) -> anyhow::Result<u64> {
    Ok(fibonacci(n))
}

/// Handles an event by running the same timed workload twice at once: on the pool's background
/// worker and on the calling thread. Both streams record into one timer.
pub struct TimedComputeHarness {
    pool: Arc<WorkerPool>,
    config: HarnessConfig,
    reporter: Arc<Reporter>,
    compute: ComputeFn,
}

impl TimedComputeHarness {
    pub fn new(pool: Arc<WorkerPool>, config: HarnessConfig, reporter: Arc<Reporter>) -> Self {
        Self {
            pool,
            config,
            reporter,
            compute: compute_fibonacci,
        }
    }

    /// Replace the timed computation.
    pub fn with_compute(mut self, compute: ComputeFn) -> Self {
        self.compute = compute;
        self
    }

    /// Run the workload for one event and report its metrics.
    ///
    /// Fails without reporting if either stream fails or if waiting for the background stream is
    /// interrupted. The background stream is always waited for before returning, including when
    /// the inline stream has already failed.
    pub fn handle(
        &self,
        event: &EventRecord,
        diagnostics: &DiagnosticContext,
    ) -> anyhow::Result<MetricsSnapshot> {
        log::info!("Received event = [{}] {}", event.id_or_empty(), diagnostics);

        let mut metrics = MetricsRegistry::new();
        metrics.register_gauge(ProcessUptimeGauge::NAME, ProcessUptimeGauge)?;
        let timer = metrics.register_timer(FIBONACCI_TIMER)?;

        let task = FibonacciTask {
            diagnostics: diagnostics.clone(),
            timer,
            config: self.config,
            compute: self.compute,
        };

        // Start one task in the background, and one on this thread
        let background = self.pool.submit({
            let task = task.clone();
            move || task.run()
        })?;
        let inline = task.run();

        let background = background.join();
        log::debug!("Background fibonacci task joined {diagnostics}");

        inline.context("Inline fibonacci task failed")?;
        background?;

        let snapshot = metrics.snapshot();
        self.reporter.add_snapshot(&snapshot, diagnostics);

        Ok(snapshot)
    }
}

#[derive(Clone)]
struct FibonacciTask {
    diagnostics: DiagnosticContext,
    timer: Arc<Timer>,
    config: HarnessConfig,
    compute: ComputeFn,
}

impl FibonacciTask {
    fn run(&self) -> anyhow::Result<()> {
        log::info!("Starting fibonacci task {}", self.diagnostics);

        let parameter = self.config.fibonacci_parameter;
        for iteration in 0..self.config.fibonacci_iterations {
            let value = self
                .timer
                .time(|| (self.compute)(black_box(parameter)))
                .with_context(|| format!("Fibonacci iteration {iteration} failed"))?;
            black_box(value);
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn iterative_fibonacci(n: u64) -> u64 {
        let (mut a, mut b) = (0u64, 1u64);
        for _ in 0..n {
            (a, b) = (b, a + b);
        }
        a
    }

    #[test]
    fn reference_values() {
        assert_eq!(fibonacci(0), 0);
        assert_eq!(fibonacci(1), 1);
        assert_eq!(fibonacci(2), 1);
        assert_eq!(fibonacci(10), 55);
        assert_eq!(fibonacci(30), 832040);
    }

    #[test]
    fn matches_iterative_reference() {
        for n in 0..=25 {
            assert_eq!(fibonacci(n), iterative_fibonacci(n), "fib({n})");
        }
    }

    #[test]
    fn recurrence_holds() {
        for n in 2..=25 {
            assert_eq!(fibonacci(n), fibonacci(n - 1) + fibonacci(n - 2), "fib({n})");
        }
    }

    #[test]
    fn task_records_one_sample_per_iteration() {
        let timer = Arc::new(Timer::new());
        let task = FibonacciTask {
            diagnostics: DiagnosticContext::for_request("unit"),
            timer: timer.clone(),
            config: HarnessConfig::default()
                .with_fibonacci_parameter(5)
                .with_fibonacci_iterations(7),
            compute: compute_fibonacci,
        };

        task.run().unwrap();

        assert_eq!(timer.count(), 7);
    }

    #[test]
    fn task_stops_at_the_first_failure() {
        fn fail(_: u64) -> anyhow::Result<u64> {
            anyhow::bail!("injected")
        }

        let timer = Arc::new(Timer::new());
        let task = FibonacciTask {
            diagnostics: DiagnosticContext::new(),
            timer: timer.clone(),
            config: HarnessConfig::default().with_fibonacci_iterations(10),
            compute: fail,
        };

        let err = task.run().unwrap_err();

        assert_eq!(format!("{err:#}"), "Fibonacci iteration 0 failed: injected");
        // The failed call is still timed.
        assert_eq!(timer.count(), 1);
    }
}
