/// The unit of work submitted to the background worker failed, either by returning an error or by
/// panicking. The original failure is carried as the message.
#[derive(derive_more::Error, derive_more::Display, Debug)]
#[display("Background task failed: {msg}")]
pub struct WorkerTaskError {
    msg: String,
}

impl WorkerTaskError {
    pub fn new(msg: impl Into<String>) -> Self {
        Self { msg: msg.into() }
    }

    pub fn message(&self) -> &str {
        &self.msg
    }
}

/// The caller stopped waiting for a background task because an interrupt was signalled.
///
/// The task itself is not cancelled and may still be running on the worker.
#[derive(derive_more::Error, derive_more::Display, Debug)]
pub struct JoinInterruptedError {
    msg: String,
}

impl Default for JoinInterruptedError {
    fn default() -> Self {
        Self {
            msg: "Interrupted while waiting for the background task".to_string(),
        }
    }
}

/// Work was submitted to a worker pool that has already been shut down.
#[derive(derive_more::Error, derive_more::Display, Debug)]
pub struct PoolShutdownError {
    msg: String,
}

impl Default for PoolShutdownError {
    fn default() -> Self {
        Self {
            msg: "Worker pool has been shut down".to_string(),
        }
    }
}

/// A metric was registered under a name that is already taken in the same registry.
#[derive(derive_more::Error, derive_more::Display, Debug)]
#[display("Metric [{name}] is already registered")]
pub struct DuplicateMetricError {
    name: String,
}

impl DuplicateMetricError {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }
}
