mod gauge;
mod registry;
mod report;
mod snapshot;
mod timer;

pub mod prelude {
    pub use crate::gauge::{mark_process_start, process_uptime, Gauge, ProcessUptimeGauge};
    pub use crate::registry::MetricsRegistry;
    pub use crate::report::{
        InMemoryReporter, LogReporter, ReportCollector, ReportConfig, Reporter,
    };
    pub use crate::snapshot::{MetricsSnapshot, TimerSnapshot};
    pub use crate::timer::{Timer, TimerContext};
}
