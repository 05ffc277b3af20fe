mod cli;
mod config;
mod event;
mod executor;
mod harness;
mod init;
mod run;
mod shutdown;
mod types;

pub mod prelude {
    pub use crate::cli::{FibTunnelCli, ReporterOpt};
    pub use crate::config::{
        HarnessConfig, FIBONACCI_ITERATIONS, FIBONACCI_PARAMETER, MAX_FIBONACCI_PARAMETER,
    };
    pub use crate::event::EventRecord;
    pub use crate::executor::{
        interrupt_shared_worker_pool, shared_worker_pool, shutdown_shared_worker_pool,
        TaskHandle, WorkerPool, WORKER_THREADS, WORKER_THREAD_NAME,
    };
    pub use crate::harness::{fibonacci, ComputeFn, TimedComputeHarness, FIBONACCI_TIMER};
    pub use crate::init::init;
    pub use crate::run::run;
    pub use crate::types::FibTunnelResult;

    /// Re-export of the core and instruments preludes.
    ///
    /// This is for convenience so that you can depend on a single crate for the runner.
    pub use fib_tunnel_core::prelude::*;
    pub use fib_tunnel_instruments::prelude::*;
}
