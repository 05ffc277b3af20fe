use fib_tunnel_runner::prelude::*;

fn main() -> FibTunnelResult<()> {
    let cli = init();

    let invocations = run(cli)?;
    log::info!("Completed {invocations} invocation(s)");

    Ok(())
}
