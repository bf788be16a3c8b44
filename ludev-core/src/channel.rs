//! Channel handler: drains a ready channel, forwards the bytes to the sink
//! and re-arms the one-shot registration.

use std::io::{self, Read};
use std::os::unix::io::AsRawFd;

use crate::dispatch::{Handler, HandlerContext};
use crate::error::LoopError;
use crate::identity::Resource;
use crate::readiness::Readiness;

/// Bytes read from a channel per readiness notification.
pub const DRAIN_CAPACITY: usize = 8192;

/// A readable, registerable resource.
pub trait Channel: AsRawFd {
    /// One non-blocking read into `buf`.
    fn drain(&mut self, buf: &mut [u8]) -> io::Result<usize>;
}

impl<T: Read + AsRawFd> Channel for T {
    fn drain(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        self.read(buf)
    }
}

#[derive(Debug)]
pub struct ChannelHandler<C> {
    channel: C,
}

impl<C: Channel> ChannelHandler<C> {
    pub fn new(channel: C) -> Self {
        Self { channel }
    }
}

impl<C: Channel> Handler for ChannelHandler<C> {
    fn handle(
        &mut self,
        resource: &Resource,
        ready: Readiness,
        cx: &mut HandlerContext<'_>,
    ) -> Result<(), LoopError> {
        let fd = resource.fd;
        if ready.is_error() || ready.is_hangup() {
            tracing::debug!(fd, events = ready.events.bits(), "channel reported error/hangup");
        }

        let mut buf = [0u8; DRAIN_CAPACITY];
        let n = self
            .channel
            .drain(&mut buf)
            .map_err(|source| LoopError::Read { fd, source })?;
        if n == 0 {
            return Err(LoopError::EmptyChannelRead { fd });
        }

        cx.sink.drained(resource.role, &buf[..n]);
        cx.poller.rearm(fd, resource.token, resource.interest)
    }
}
