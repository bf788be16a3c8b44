//! Readiness registry seam: the types a multiplexer speaks and the
//! [`Poller`] trait the event loop drives.

use std::fmt;
use std::ops::BitOr;
use std::os::unix::io::RawFd;

use crate::error::LoopError;

/// Maximum number of readiness records returned by one wait.
pub const BATCH_CAPACITY: usize = 8;

/// Opaque identity attached to a registration and echoed back on readiness.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Token(pub u64);

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "token {}", self.0)
    }
}

/// Set of readiness conditions, using the epoll bit layout.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Interest(u32);

impl Interest {
    pub const READABLE: Interest = Interest(libc::EPOLLIN as u32);
    pub const ERROR: Interest = Interest(libc::EPOLLERR as u32);
    pub const HANGUP: Interest = Interest(libc::EPOLLHUP as u32);

    pub const fn from_bits(bits: u32) -> Self {
        Interest(bits)
    }

    pub const fn bits(self) -> u32 {
        self.0
    }

    pub const fn contains(self, other: Interest) -> bool {
        self.0 & other.0 == other.0
    }
}

impl BitOr for Interest {
    type Output = Interest;

    fn bitor(self, rhs: Interest) -> Interest {
        Interest(self.0 | rhs.0)
    }
}

/// Interest every channel is registered with.
pub const CHANNEL_INTEREST: Interest = Interest(
    Interest::READABLE.bits() | Interest::ERROR.bits() | Interest::HANGUP.bits(),
);

/// Delivery mode of a registration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    /// Reported once, then disabled until [`Poller::rearm`].
    OneShot,
    /// Reported for as long as the condition holds.
    Level,
}

/// One "this resource became ready" record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Readiness {
    pub token: Token,
    pub events: Interest,
}

impl Readiness {
    pub fn new(token: Token, events: Interest) -> Self {
        Self { token, events }
    }

    pub fn is_readable(&self) -> bool {
        self.events.contains(Interest::READABLE)
    }

    pub fn is_error(&self) -> bool {
        self.events.contains(Interest::ERROR)
    }

    pub fn is_hangup(&self) -> bool {
        self.events.contains(Interest::HANGUP)
    }
}

/// Records produced by one wait, in the order the multiplexer reported them.
#[derive(Debug, Clone)]
pub struct ReadyBatch {
    records: Vec<Readiness>,
    capacity: usize,
}

impl ReadyBatch {
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            records: Vec::with_capacity(capacity),
            capacity,
        }
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn clear(&mut self) {
        self.records.clear();
    }

    /// Appends a record. Returns `false` and drops the record when full.
    pub fn push(&mut self, ready: Readiness) -> bool {
        if self.records.len() >= self.capacity {
            return false;
        }
        self.records.push(ready);
        true
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Readiness> {
        self.records.iter()
    }
}

impl Default for ReadyBatch {
    fn default() -> Self {
        Self::with_capacity(BATCH_CAPACITY)
    }
}

impl<'a> IntoIterator for &'a ReadyBatch {
    type Item = &'a Readiness;
    type IntoIter = std::slice::Iter<'a, Readiness>;

    fn into_iter(self) -> Self::IntoIter {
        self.records.iter()
    }
}

/// A readiness multiplexer.
///
/// Implementations must never hand back a successful empty batch: zero ready
/// resources is reported as [`LoopError::Wait`] and a signal interruption as
/// [`LoopError::InterruptedWait`].
pub trait Poller {
    /// Add `fd` with the given interest; readiness records will carry `token`.
    fn register(
        &mut self,
        fd: RawFd,
        token: Token,
        interest: Interest,
        mode: Mode,
    ) -> Result<(), LoopError>;

    /// Re-enable a one-shot registration after it fired.
    fn rearm(&mut self, fd: RawFd, token: Token, interest: Interest) -> Result<(), LoopError>;

    /// Block without deadline until at least one resource is ready, filling
    /// `batch` (cleared first) up to its capacity.
    fn wait(&mut self, batch: &mut ReadyBatch) -> Result<(), LoopError>;
}
