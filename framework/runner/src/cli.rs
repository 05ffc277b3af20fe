use std::path::PathBuf;

use clap::Parser;
use fib_tunnel_instruments::prelude::ReportConfig;

use crate::config::{FIBONACCI_ITERATIONS, FIBONACCI_PARAMETER};

#[derive(Parser, Debug)]
#[command(about, long_about = None)]
pub struct FibTunnelCli {
    /// Path to a JSON event to deliver to the handler, in the CloudWatch/EventBridge event format.
    ///
    /// Use `-` to read the event from stdin. When omitted, a synthetic scheduled event is used.
    #[clap(short, long)]
    pub event: Option<PathBuf>,

    /// The number of times to invoke the handler. Every invocation reuses the same worker pool.
    #[clap(long, default_value_t = 1)]
    pub invocations: usize,

    /// The `n` in `fib(n)`. Must be at most 93.
    #[clap(long, default_value_t = FIBONACCI_PARAMETER)]
    pub fibonacci_parameter: u64,

    /// How many times each execution stream computes `fib(n)` per invocation.
    #[clap(long, default_value_t = FIBONACCI_ITERATIONS)]
    pub iterations: u64,

    /// Request id to attach to the log lines of every invocation.
    ///
    /// When omitted, each invocation gets a freshly generated id.
    #[clap(long)]
    pub request_id: Option<String>,

    /// Where to report the metrics of each invocation. Can be given more than once.
    #[clap(long, value_enum, default_values_t = [ReporterOpt::Log])]
    pub reporter: Vec<ReporterOpt>,
}

#[derive(clap::ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReporterOpt {
    /// One info log line per invocation
    Log,
    /// A table of all invocations, printed once at the end of the run
    Summary,
    /// Discard the metrics
    Noop,
}

/// Build the report configuration selected by the `--reporter` flags.
pub(crate) fn report_config(reporters: &[ReporterOpt]) -> ReportConfig {
    reporters
        .iter()
        .fold(ReportConfig::default(), |config, reporter| match reporter {
            ReporterOpt::Log => config.enable_log(),
            ReporterOpt::Summary => config.enable_summary(),
            ReporterOpt::Noop => config,
        })
}
