use std::any::Any;
use std::sync::Arc;

use anyhow::Context;
use fib_tunnel_core::prelude::{
    DelegatedShutdownListener, JoinInterruptedError, PoolShutdownError, ShutdownHandle,
    WorkerTaskError,
};
use parking_lot::Mutex;
use tokio::runtime::{Runtime, RuntimeFlavor};
use tokio::task::{JoinError, JoinHandle};

/// Number of background execution contexts in a [WorkerPool].
pub const WORKER_THREADS: usize = 1;

/// Name given to the background worker thread. Log lines written by submitted work carry it.
pub const WORKER_THREAD_NAME: &str = "fibonacci-worker";

static SHARED_POOL: Mutex<Option<Arc<WorkerPool>>> = parking_lot::const_mutex(None);

/// A pool of [WORKER_THREADS] background threads that run submitted work one task at a time.
///
/// Submitted work runs on the runtime's blocking pool, capped at [WORKER_THREADS] threads, so it
/// never occupies an async worker. Tasks submitted while the worker is busy queue behind it
/// without limit.
#[derive(Debug)]
pub struct WorkerPool {
    runtime: Mutex<Option<Runtime>>,
    interrupt_handle: ShutdownHandle,
}

impl WorkerPool {
    pub fn new() -> anyhow::Result<Self> {
        let runtime = tokio::runtime::Builder::new_multi_thread()
            .worker_threads(1)
            .max_blocking_threads(WORKER_THREADS)
            .thread_name(WORKER_THREAD_NAME)
            .enable_all()
            .build()
            .context("Failed to create worker runtime")?;

        Ok(Self {
            runtime: Mutex::new(Some(runtime)),
            interrupt_handle: ShutdownHandle::new(),
        })
    }

    /// Queue a blocking task on the worker.
    ///
    /// The task starts as soon as the worker is free. Its result, or its panic, is only observed
    /// through [TaskHandle::join].
    pub fn submit<T, F>(&self, task: F) -> anyhow::Result<TaskHandle<T>>
    where
        T: Send + 'static,
        F: FnOnce() -> anyhow::Result<T> + Send + 'static,
    {
        let guard = self.runtime.lock();
        let runtime = guard.as_ref().ok_or_else(PoolShutdownError::default)?;

        // Subscribe before spawning so an interrupt can never fall between the two.
        let interrupt_listener = self.interrupt_handle.new_listener();
        let join_handle = runtime.spawn_blocking(task);

        Ok(TaskHandle {
            join_handle,
            runtime_handle: runtime.handle().clone(),
            interrupt_listener,
        })
    }

    /// Signalling this handle makes every [TaskHandle::join] that is currently waiting return a
    /// [JoinInterruptedError]. The pool itself keeps running.
    pub fn interrupt_handle(&self) -> ShutdownHandle {
        self.interrupt_handle.clone()
    }

    pub fn is_shutdown(&self) -> bool {
        self.runtime.lock().is_none()
    }

    /// Interrupt anyone waiting on a task and stop the worker. Queued tasks are dropped and a task
    /// that is already running is left to finish on its own.
    pub fn shutdown(&self) {
        let runtime = self.runtime.lock().take();
        if let Some(runtime) = runtime {
            log::debug!("Shutting down worker pool");
            self.interrupt_handle.shutdown();
            runtime.shutdown_background();
        }
    }
}

impl Drop for WorkerPool {
    fn drop(&mut self) {
        // A runtime may not be dropped from async code, shutting it down in the background is
        // always allowed.
        self.shutdown();
    }
}

/// The pending result of a task submitted to a [WorkerPool].
pub struct TaskHandle<T> {
    join_handle: JoinHandle<anyhow::Result<T>>,
    runtime_handle: tokio::runtime::Handle,
    interrupt_listener: DelegatedShutdownListener,
}

impl<T: Send> TaskHandle<T> {
    /// Block the calling thread until the task completes.
    ///
    /// May be called from synchronous code or from inside a tokio runtime. On a multi-threaded
    /// runtime the wait moves off the async worker with `block_in_place`; on a current-thread
    /// runtime it happens on a helper thread, since that runtime cannot hand off its only worker.
    pub fn join(self) -> anyhow::Result<T> {
        match tokio::runtime::Handle::try_current() {
            Err(_) => self.wait(),
            Ok(current) if current.runtime_flavor() == RuntimeFlavor::MultiThread => {
                tokio::task::block_in_place(|| self.wait())
            }
            Ok(_) => std::thread::scope(|scope| {
                scope
                    .spawn(move || self.wait())
                    .join()
                    .unwrap_or_else(|payload| {
                        Err(WorkerTaskError::new(format!(
                            "join panicked: {}",
                            panic_message(payload)
                        ))
                        .into())
                    })
            }),
        }
    }

    fn wait(self) -> anyhow::Result<T> {
        let TaskHandle {
            join_handle,
            runtime_handle,
            mut interrupt_listener,
        } = self;

        runtime_handle.block_on(async move {
            tokio::select! {
                result = join_handle => match result {
                    Ok(Ok(value)) => Ok(value),
                    Ok(Err(e)) => Err(WorkerTaskError::new(format!("{e:#}")).into()),
                    Err(e) => Err(join_error(e)),
                },
                _ = interrupt_listener.wait_for_shutdown() => {
                    Err(JoinInterruptedError::default().into())
                },
            }
        })
    }
}

fn join_error(e: JoinError) -> anyhow::Error {
    if e.is_cancelled() {
        // The runtime was shut down before the task could complete.
        return JoinInterruptedError::default().into();
    }

    WorkerTaskError::new(format!("panicked: {}", panic_message(e.into_panic()))).into()
}

fn panic_message(payload: Box<dyn Any + Send>) -> String {
    if let Some(msg) = payload.downcast_ref::<&str>() {
        msg.to_string()
    } else if let Some(msg) = payload.downcast_ref::<String>() {
        msg.clone()
    } else {
        "unknown panic payload".to_string()
    }
}

/// Get the process-wide worker pool, creating it on first use.
///
/// The same pool is returned until [shutdown_shared_worker_pool] is called, after which the next
/// call creates a fresh pool.
pub fn shared_worker_pool() -> anyhow::Result<Arc<WorkerPool>> {
    let mut shared = SHARED_POOL.lock();
    if let Some(pool) = shared.as_ref() {
        return Ok(pool.clone());
    }

    log::debug!("Creating shared worker pool");
    let pool = Arc::new(WorkerPool::new()?);
    *shared = Some(pool.clone());

    Ok(pool)
}

/// Interrupt every join currently waiting on the shared pool, if one exists.
pub fn interrupt_shared_worker_pool() {
    if let Some(pool) = SHARED_POOL.lock().as_ref() {
        pool.interrupt_handle().shutdown();
    }
}

/// Teardown hook for the pool returned by [shared_worker_pool]. Safe to call when no pool exists.
pub fn shutdown_shared_worker_pool() {
    let pool = SHARED_POOL.lock().take();
    if let Some(pool) = pool {
        pool.shutdown();
    }
}
