use std::fs::File;
use std::io::BufReader;
use std::path::Path;
use std::sync::Arc;

use anyhow::Context;
use chrono::Utc;
use fib_tunnel_core::prelude::DiagnosticContext;
use fib_tunnel_instruments::prelude::mark_process_start;

use crate::cli::{report_config, FibTunnelCli};
use crate::config::HarnessConfig;
use crate::event::EventRecord;
use crate::executor::{shared_worker_pool, shutdown_shared_worker_pool};
use crate::harness::TimedComputeHarness;
use crate::shutdown::start_interrupt_listener;

/// Deliver the configured event to the harness as many times as requested.
///
/// Stops at the first failed invocation. Reporters are finalized and the shared worker pool is
/// shut down whether or not the invocations succeed. Returns the number of invocations run.
pub fn run(cli: FibTunnelCli) -> anyhow::Result<usize> {
    mark_process_start();

    let config = HarnessConfig::default()
        .with_fibonacci_parameter(cli.fibonacci_parameter)
        .with_fibonacci_iterations(cli.iterations)
        .validate()?;
    let event = load_event(cli.event.as_deref())?;

    log::info!(
        "Running {} invocation(s) computing fib({}) {} times per stream",
        cli.invocations,
        config.fibonacci_parameter,
        config.fibonacci_iterations
    );

    let reporter = Arc::new(report_config(&cli.reporter).init());
    if reporter.is_noop() {
        log::info!("No reporter enabled, invocation metrics will be discarded");
    }
    let pool = shared_worker_pool()?;
    start_interrupt_listener();

    let harness = TimedComputeHarness::new(pool, config, reporter.clone());
    let result = invoke(&harness, &event, cli.invocations, cli.request_id.as_deref());

    reporter.finalize();
    shutdown_shared_worker_pool();

    result
}

fn invoke(
    harness: &TimedComputeHarness,
    event: &EventRecord,
    invocations: usize,
    request_id: Option<&str>,
) -> anyhow::Result<usize> {
    for invocation in 1..=invocations {
        let request_id = request_id
            .map(ToString::to_string)
            .unwrap_or_else(|| nanoid::nanoid!());
        let diagnostics = DiagnosticContext::for_request(request_id);

        harness
            .handle(event, &diagnostics)
            .with_context(|| format!("Invocation {invocation} of {invocations} failed"))?;
    }

    Ok(invocations)
}

/// Read the event from a file, from stdin for `-`, or make up a scheduled event when no path is
/// given.
pub(crate) fn load_event(path: Option<&Path>) -> anyhow::Result<EventRecord> {
    match path {
        None => Ok(scheduled_event()),
        Some(path) if path == Path::new("-") => EventRecord::from_reader(std::io::stdin().lock()),
        Some(path) => {
            let file = File::open(path)
                .with_context(|| format!("Failed to open event file {}", path.display()))?;
            EventRecord::from_reader(BufReader::new(file))
        }
    }
}

fn scheduled_event() -> EventRecord {
    EventRecord {
        id: Some(nanoid::nanoid!()),
        source: Some("fib_tunnel.local".to_string()),
        detail_type: Some("Scheduled Event".to_string()),
        time: Some(Utc::now()),
        resources: Some(Vec::new()),
        details: Some(Default::default()),
        ..Default::default()
    }
}
