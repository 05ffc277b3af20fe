mod diagnostics;
mod error;
mod shutdown;

pub mod prelude {
    pub use crate::diagnostics::{DiagnosticContext, REQUEST_ID_KEY};
    pub use crate::error::{
        DuplicateMetricError, JoinInterruptedError, PoolShutdownError, WorkerTaskError,
    };
    pub use crate::shutdown::{DelegatedShutdownListener, ShutdownHandle};
}
