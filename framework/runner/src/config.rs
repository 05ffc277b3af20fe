/// Fibonacci parameter used by the benchmark unless configured otherwise.
pub const FIBONACCI_PARAMETER: u64 = 30;

/// Number of Fibonacci computations each execution stream performs per invocation.
pub const FIBONACCI_ITERATIONS: u64 = 500;

/// `fib(93)` is the largest Fibonacci number that fits in a `u64`.
pub const MAX_FIBONACCI_PARAMETER: u64 = 93;

/// Workload settings for the harness.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HarnessConfig {
    pub fibonacci_parameter: u64,
    pub fibonacci_iterations: u64,
}

impl Default for HarnessConfig {
    fn default() -> Self {
        Self {
            fibonacci_parameter: FIBONACCI_PARAMETER,
            fibonacci_iterations: FIBONACCI_ITERATIONS,
        }
    }
}

impl HarnessConfig {
    pub fn with_fibonacci_parameter(mut self, fibonacci_parameter: u64) -> Self {
        self.fibonacci_parameter = fibonacci_parameter;
        self
    }

    pub fn with_fibonacci_iterations(mut self, fibonacci_iterations: u64) -> Self {
        self.fibonacci_iterations = fibonacci_iterations;
        self
    }

    pub fn validate(self) -> anyhow::Result<Self> {
        if self.fibonacci_parameter > MAX_FIBONACCI_PARAMETER {
            anyhow::bail!(
                "Fibonacci parameter {} is too large, the maximum is {}",
                self.fibonacci_parameter,
                MAX_FIBONACCI_PARAMETER
            );
        }

        Ok(self)
    }

    /// Timer samples expected from one invocation, counting both execution streams.
    pub fn expected_samples(&self) -> u64 {
        self.fibonacci_iterations * 2
    }
}
