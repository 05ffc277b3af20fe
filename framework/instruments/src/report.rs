mod in_memory_reporter;
mod log_reporter;

use std::sync::Arc;

use fib_tunnel_core::prelude::DiagnosticContext;

use crate::snapshot::MetricsSnapshot;

pub use in_memory_reporter::InMemoryReporter;
pub use log_reporter::LogReporter;

/// Receives the metrics of each completed invocation.
pub trait ReportCollector: Send + Sync {
    fn add_snapshot(&self, snapshot: &MetricsSnapshot, diagnostics: &DiagnosticContext);

    /// Called once when no more snapshots will be reported.
    fn finalize(&self) {}
}

/// Chooses which reporters are active. Nothing is reported unless at least one is enabled.
#[derive(Default)]
pub struct ReportConfig {
    enable_log: bool,
    enable_summary: bool,
    collectors: Vec<Arc<dyn ReportCollector>>,
}

impl ReportConfig {
    /// Write one info line per invocation through the `log` facade.
    pub fn enable_log(mut self) -> Self {
        self.enable_log = true;
        self
    }

    /// Keep every snapshot and print a summary table when the reporter is finalized.
    pub fn enable_summary(mut self) -> Self {
        self.enable_summary = true;
        self
    }

    pub fn add_collector(mut self, collector: Arc<dyn ReportCollector>) -> Self {
        self.collectors.push(collector);
        self
    }

    pub fn init(self) -> Reporter {
        let mut collectors: Vec<Arc<dyn ReportCollector>> = Vec::new();

        if self.enable_log {
            collectors.push(Arc::new(LogReporter));
        }

        if self.enable_summary {
            collectors.push(Arc::new(InMemoryReporter::new()));
        }

        collectors.extend(self.collectors);

        Reporter { collectors }
    }
}

/// Fans snapshots out to every configured [ReportCollector].
pub struct Reporter {
    collectors: Vec<Arc<dyn ReportCollector>>,
}

impl Reporter {
    pub fn add_snapshot(&self, snapshot: &MetricsSnapshot, diagnostics: &DiagnosticContext) {
        for collector in &self.collectors {
            collector.add_snapshot(snapshot, diagnostics);
        }
    }

    pub fn finalize(&self) {
        for collector in &self.collectors {
            collector.finalize();
        }
    }

    pub fn is_noop(&self) -> bool {
        self.collectors.is_empty()
    }
}
