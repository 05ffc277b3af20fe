mod timers_table;

use fib_tunnel_core::prelude::DiagnosticContext;
use parking_lot::Mutex;
use tabled::settings::Style;
use tabled::Table;

use crate::gauge::ProcessUptimeGauge;
use crate::report::in_memory_reporter::timers_table::TimerRow;
use crate::report::ReportCollector;
use crate::snapshot::MetricsSnapshot;

/// A very basic reporter that is useful while running the benchmark locally. It keeps every
/// snapshot in memory and prints a summary of them when it is finalized.
#[derive(Default)]
pub struct InMemoryReporter {
    snapshots: Mutex<Vec<(DiagnosticContext, MetricsSnapshot)>>,
}

impl InMemoryReporter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn snapshots(&self) -> Vec<(DiagnosticContext, MetricsSnapshot)> {
        self.snapshots.lock().clone()
    }

    pub(crate) fn summary_rows(&self) -> Vec<TimerRow> {
        self.snapshots
            .lock()
            .iter()
            .enumerate()
            .flat_map(|(index, (diagnostics, snapshot))| {
                let request_id = diagnostics
                    .request_id()
                    .map(ToString::to_string)
                    .unwrap_or_else(|| format!("#{}", index + 1));
                let uptime_ms = snapshot
                    .gauge(ProcessUptimeGauge::NAME)
                    .unwrap_or_default();

                snapshot
                    .timers
                    .iter()
                    .map(move |(name, timer)| {
                        TimerRow::new(request_id.clone(), name.clone(), timer, uptime_ms)
                    })
                    .collect::<Vec<_>>()
            })
            .collect()
    }

    fn print_summary(&self) {
        let rows = self.summary_rows();
        if rows.is_empty() {
            return;
        }

        println!("\nSummary of invocations");

        let mut table = Table::new(rows);
        table.with(Style::modern());

        println!("{table}");
    }
}

impl ReportCollector for InMemoryReporter {
    fn add_snapshot(&self, snapshot: &MetricsSnapshot, diagnostics: &DiagnosticContext) {
        self.snapshots
            .lock()
            .push((diagnostics.clone(), snapshot.clone()));
    }

    fn finalize(&self) {
        self.print_summary();
    }
}
