use std::time::{Duration, Instant};

use parking_lot::Mutex;

use crate::snapshot::TimerSnapshot;

/// Collects duration samples into a single distribution.
///
/// Samples can be recorded from any number of threads at once, so one timer may be shared by
/// every stream of work that should be aggregated together.
#[derive(Debug)]
pub struct Timer {
    created: Instant,
    samples: Mutex<Vec<Duration>>,
}

impl Default for Timer {
    fn default() -> Self {
        Self::new()
    }
}

impl Timer {
    pub fn new() -> Self {
        Self {
            created: Instant::now(),
            samples: Mutex::new(Vec::new()),
        }
    }

    /// Start timing an operation. The sample is recorded when [TimerContext::stop] is called.
    pub fn start(&self) -> TimerContext<'_> {
        TimerContext {
            timer: self,
            started: Instant::now(),
        }
    }

    /// Time a fallible operation. The sample is recorded whether or not the operation succeeds.
    pub fn time<T, E>(&self, operation: impl FnOnce() -> Result<T, E>) -> Result<T, E> {
        let context = self.start();
        let result = operation();
        context.stop();
        result
    }

    pub fn update(&self, duration: Duration) {
        self.samples.lock().push(duration);
    }

    pub fn count(&self) -> usize {
        self.samples.lock().len()
    }

    pub fn snapshot(&self) -> TimerSnapshot {
        let samples = self.samples.lock().clone();
        TimerSnapshot::from_samples(samples, self.created.elapsed())
    }
}

/// An in-flight measurement started by [Timer::start].
#[must_use = "the sample is only recorded when the context is stopped"]
pub struct TimerContext<'a> {
    timer: &'a Timer,
    started: Instant,
}

impl TimerContext<'_> {
    pub fn stop(self) -> Duration {
        let elapsed = self.started.elapsed();
        self.timer.update(elapsed);
        elapsed
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    #[test]
    fn time_records_successful_and_failed_operations() {
        let timer = Timer::new();

        let ok: Result<u64, String> = timer.time(|| Ok(55));
        let err: Result<u64, String> = timer.time(|| Err("boom".to_string()));

        assert_eq!(ok, Ok(55));
        assert_eq!(err, Err("boom".to_string()));
        assert_eq!(timer.count(), 2);
    }

    #[test]
    fn stop_returns_the_recorded_duration() {
        let timer = Timer::new();
        let context = timer.start();
        std::thread::sleep(Duration::from_millis(5));
        let elapsed = context.stop();

        assert!(elapsed >= Duration::from_millis(5));
        assert_eq!(timer.snapshot().max, elapsed);
    }

    #[test]
    fn concurrent_recording_keeps_every_sample() {
        let timer = Arc::new(Timer::new());

        let handles = (0..4)
            .map(|_| {
                let timer = timer.clone();
                std::thread::spawn(move || {
                    for i in 0..250 {
                        timer.update(Duration::from_micros(i));
                    }
                })
            })
            .collect::<Vec<_>>();

        for handle in handles {
            handle.join().unwrap();
        }

        assert_eq!(timer.count(), 1000);
    }
}
