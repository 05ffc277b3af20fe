use fib_tunnel_core::prelude::DiagnosticContext;

use crate::report::ReportCollector;
use crate::snapshot::MetricsSnapshot;

/// Writes each snapshot as a single human-readable info line.
pub struct LogReporter;

impl ReportCollector for LogReporter {
    fn add_snapshot(&self, snapshot: &MetricsSnapshot, diagnostics: &DiagnosticContext) {
        log::info!("{snapshot} {diagnostics}");
    }
}
