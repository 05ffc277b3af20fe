use std::sync::Once;

use tokio::signal;

use crate::executor::interrupt_shared_worker_pool;

static INTERRUPT_LISTENER: Once = Once::new();

/// Listen for Ctrl-C and interrupt whoever is waiting on the shared worker pool when it arrives.
///
/// Only the first call starts a listener, later calls do nothing.
pub(crate) fn start_interrupt_listener() {
    INTERRUPT_LISTENER.call_once(|| {
        let started = std::thread::Builder::new()
            .name("interrupt-listener".to_string())
            .spawn(|| {
                let runtime = match tokio::runtime::Builder::new_current_thread()
                    .enable_all()
                    .build()
                {
                    Ok(runtime) => runtime,
                    Err(e) => {
                        log::warn!("Failed to create runtime for the interrupt listener: {e:?}");
                        return;
                    }
                };

                loop {
                    if let Err(e) = runtime.block_on(signal::ctrl_c()) {
                        log::warn!("Failed to listen for Ctrl-C: {e:?}");
                        return;
                    }

                    println!("Received interrupt, abandoning the background task...");
                    interrupt_shared_worker_pool();
                }
            });

        if let Err(e) = started {
            log::warn!("Failed to start the interrupt listener: {e:?}");
        }
    });
}
