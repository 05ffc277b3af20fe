use std::sync::OnceLock;
use std::time::{Duration, Instant};

use sysinfo::{ProcessRefreshKind, ProcessesToUpdate, System};

/// A metric that is read on demand rather than recorded.
pub trait Gauge: Send + Sync {
    fn value(&self) -> f64;
}

impl<F> Gauge for F
where
    F: Fn() -> f64 + Send + Sync,
{
    fn value(&self) -> f64 {
        self()
    }
}

static PROCESS_START: OnceLock<Instant> = OnceLock::new();

/// Reports how long the current process has been running, in milliseconds.
#[derive(Debug, Default, Clone, Copy)]
pub struct ProcessUptimeGauge;

impl ProcessUptimeGauge {
    pub const NAME: &'static str = "process.uptime";
}

impl Gauge for ProcessUptimeGauge {
    fn value(&self) -> f64 {
        match process_uptime() {
            Some(uptime) => uptime.as_secs_f64() * 1000.0,
            None => {
                log::warn!("Could not read the process uptime, reporting 0");
                0.0
            }
        }
    }
}

/// Record the moment the process started. Only the first call has an effect.
///
/// Call this as early as possible, uptime is measured from here at full [Instant] resolution.
pub fn mark_process_start() {
    PROCESS_START.get_or_init(|| {
        let already_running = os_process_run_time().unwrap_or_default();
        Instant::now().checked_sub(already_running).unwrap_or_else(Instant::now)
    });
}

/// Time since the current process started.
///
/// Measured from [mark_process_start] when it has been called. Otherwise the operating system's
/// view of the process is used, which only has whole second resolution.
pub fn process_uptime() -> Option<Duration> {
    match PROCESS_START.get() {
        Some(start) => Some(start.elapsed()),
        None => os_process_run_time(),
    }
}

fn os_process_run_time() -> Option<Duration> {
    let pid = sysinfo::get_current_pid().ok()?;

    let mut sys = System::new();
    sys.refresh_processes_specifics(
        ProcessesToUpdate::Some(&[pid]),
        false,
        ProcessRefreshKind::nothing(),
    );

    sys.process(pid)
        .map(|process| Duration::from_secs(process.run_time()))
}
