use thiserror::Error;

use ludev_core::LoopError;

/// Error surface for daemon startup and the running loop.
#[derive(Debug, Error)]
pub enum DaemonError {
    /// Opening the kernel uevent socket failed.
    #[error("{op}: {source}")]
    Open {
        op: &'static str,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid log filter '{directive}': {reason}")]
    LogFilter { directive: String, reason: String },

    #[error(transparent)]
    Loop(#[from] LoopError),
}

pub(crate) fn open_err(op: &'static str) -> DaemonError {
    DaemonError::Open {
        op,
        source: std::io::Error::last_os_error(),
    }
}
