use crate::cli::FibTunnelCli;
use clap::Parser;
use fib_tunnel_instruments::prelude::mark_process_start;

/// Initialise the CLI and logging for the runner.
///
/// Logs at `info` level unless `RUST_LOG` says otherwise.
pub fn init() -> FibTunnelCli {
    mark_process_start();
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    FibTunnelCli::parse()
}
