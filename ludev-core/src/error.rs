//! Error types for ludev-core.

use std::fmt;
use std::os::unix::io::RawFd;

use thiserror::Error;

use crate::driver::LoopState;
use crate::identity::ResourceRole;
use crate::readiness::Token;

/// Which `epoll_ctl` operation a registration failure came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RegistrationOp {
    Add,
    Modify,
}

impl fmt::Display for RegistrationOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RegistrationOp::Add => f.write_str("EPOLL_CTL_ADD"),
            RegistrationOp::Modify => f.write_str("EPOLL_CTL_MOD"),
        }
    }
}

/// Why a readiness wait produced no usable batch.
#[derive(Debug, Error)]
pub enum WaitFailure {
    /// The multiplexer call itself failed.
    #[error("{0}")]
    Os(#[source] std::io::Error),

    /// The call returned successfully but reported zero ready resources.
    /// With an infinite timeout this should not happen, so it is fatal.
    #[error("returned 0 events")]
    NoEvents,
}

/// Every failure the event loop can produce.
///
/// Only [`LoopError::InterruptedWait`] is recovered (by retrying the wait);
/// everything else unwinds the loop and terminates the process.
#[derive(Debug, Error)]
pub enum LoopError {
    /// Creating the readiness multiplexer failed.
    #[error("{op}: {source}")]
    Init {
        op: &'static str,
        #[source]
        source: std::io::Error,
    },

    /// Adding or re-arming a resource in the multiplexer failed.
    #[error("epoll_ctl({op}) on fd {fd}: {source}")]
    Registration {
        op: RegistrationOp,
        fd: RawFd,
        #[source]
        source: std::io::Error,
    },

    /// The wait was interrupted by a delivered signal.
    #[error("epoll_wait interrupted by signal")]
    InterruptedWait,

    #[error("epoll_wait: {0}")]
    Wait(#[source] WaitFailure),

    /// Reading a ready resource failed. Would-block lands here as well: a
    /// descriptor that was just reported readable must not block.
    #[error("read on fd {fd}: {source}")]
    Read {
        fd: RawFd,
        #[source]
        source: std::io::Error,
    },

    #[error("read on fd {fd}: read 0 bytes")]
    EmptyChannelRead { fd: RawFd },

    /// Readiness was reported for a token nobody registered a handler for.
    #[error("no handler matched readiness for {token}")]
    NoHandlerMatched { token: Token },

    #[error("a resource is already attached for role {role}")]
    AlreadyAttached { role: ResourceRole },

    /// The loop was asked to wait before any resource was attached, or
    /// after it terminated.
    #[error("event loop is not running (state: {state:?})")]
    NotRunning { state: LoopState },
}

impl LoopError {
    /// `true` for failures the loop driver retries instead of terminating.
    pub fn is_transient(&self) -> bool {
        matches!(self, LoopError::InterruptedWait)
    }
}

pub(crate) fn registration_err(op: RegistrationOp, fd: RawFd, source: std::io::Error) -> LoopError {
    LoopError::Registration { op, fd, source }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io;

    #[test]
    fn only_interrupted_wait_is_transient() {
        assert!(LoopError::InterruptedWait.is_transient());
        assert!(!LoopError::EmptyChannelRead { fd: 3 }.is_transient());
        assert!(!LoopError::Wait(WaitFailure::NoEvents).is_transient());
    }

    #[test]
    fn messages_carry_operation_and_os_error_text() {
        let err = registration_err(
            RegistrationOp::Modify,
            7,
            io::Error::from_raw_os_error(libc::EBADF),
        );
        let msg = err.to_string();
        assert!(msg.contains("EPOLL_CTL_MOD"), "got: {msg}");
        assert!(msg.contains("fd 7"), "got: {msg}");
        assert!(msg.contains("Bad file descriptor"), "got: {msg}");

        let err = LoopError::Wait(WaitFailure::NoEvents);
        assert_eq!(err.to_string(), "epoll_wait: returned 0 events");
    }
}
