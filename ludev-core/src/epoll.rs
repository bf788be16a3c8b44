//! Linux epoll implementation of [`Poller`].

use std::fmt;
use std::io;
use std::os::unix::io::{AsRawFd, FromRawFd, OwnedFd, RawFd};

use crate::error::{registration_err, LoopError, RegistrationOp, WaitFailure};
use crate::readiness::{Interest, Mode, Poller, ReadyBatch, Readiness, Token};

/// Owns an epoll instance; the descriptor is close-on-exec and closed on drop.
pub struct EpollRegistry {
    fd: OwnedFd,
    events: Vec<libc::epoll_event>,
}

impl EpollRegistry {
    /// Create an epoll instance able to report up to `max_batch` records per wait.
    pub fn new(max_batch: usize) -> Result<Self, LoopError> {
        // SAFETY: plain syscall, no pointers involved.
        let raw = unsafe { libc::epoll_create1(libc::EPOLL_CLOEXEC) };
        if raw < 0 {
            return Err(LoopError::Init {
                op: "epoll_create1",
                source: io::Error::last_os_error(),
            });
        }
        // SAFETY: `raw` was just returned by epoll_create1 and is owned by nobody else.
        let fd = unsafe { OwnedFd::from_raw_fd(raw) };

        Ok(Self {
            fd,
            events: vec![libc::epoll_event { events: 0, u64: 0 }; max_batch.max(1)],
        })
    }

    fn ctl(
        &self,
        op: RegistrationOp,
        fd: RawFd,
        token: Token,
        interest: Interest,
        mode: Mode,
    ) -> Result<(), LoopError> {
        let mut flags = interest.bits();
        if mode == Mode::OneShot {
            flags |= libc::EPOLLONESHOT as u32;
        }
        let mut event = libc::epoll_event {
            events: flags,
            u64: token.0,
        };
        let raw_op = match op {
            RegistrationOp::Add => libc::EPOLL_CTL_ADD,
            RegistrationOp::Modify => libc::EPOLL_CTL_MOD,
        };
        // SAFETY: `event` outlives the call; the kernel copies it.
        let rc = unsafe { libc::epoll_ctl(self.fd.as_raw_fd(), raw_op, fd, &mut event) };
        if rc < 0 {
            return Err(registration_err(op, fd, io::Error::last_os_error()));
        }
        Ok(())
    }

    /// Wait with an explicit timeout in milliseconds (`-1` blocks forever).
    pub(crate) fn wait_timeout(
        &mut self,
        batch: &mut ReadyBatch,
        timeout_ms: i32,
    ) -> Result<(), LoopError> {
        batch.clear();
        let max = batch.capacity().min(self.events.len());

        // SAFETY: `events` holds at least `max` entries; the kernel writes at most `max`.
        let n = unsafe {
            libc::epoll_wait(
                self.fd.as_raw_fd(),
                self.events.as_mut_ptr(),
                max as libc::c_int,
                timeout_ms,
            )
        };
        if n < 0 {
            let err = io::Error::last_os_error();
            if err.kind() == io::ErrorKind::Interrupted {
                return Err(LoopError::InterruptedWait);
            }
            return Err(LoopError::Wait(WaitFailure::Os(err)));
        }
        if n == 0 {
            return Err(LoopError::Wait(WaitFailure::NoEvents));
        }

        for raw in &self.events[..n as usize] {
            // Copy out of the (possibly packed) struct before use.
            let bits = raw.events;
            let data = raw.u64;
            batch.push(Readiness::new(Token(data), Interest::from_bits(bits)));
        }
        Ok(())
    }
}

impl Poller for EpollRegistry {
    fn register(
        &mut self,
        fd: RawFd,
        token: Token,
        interest: Interest,
        mode: Mode,
    ) -> Result<(), LoopError> {
        self.ctl(RegistrationOp::Add, fd, token, interest, mode)?;
        tracing::debug!(fd, token = token.0, ?mode, "registered resource");
        Ok(())
    }

    fn rearm(&mut self, fd: RawFd, token: Token, interest: Interest) -> Result<(), LoopError> {
        self.ctl(RegistrationOp::Modify, fd, token, interest, Mode::OneShot)
    }

    fn wait(&mut self, batch: &mut ReadyBatch) -> Result<(), LoopError> {
        self.wait_timeout(batch, -1)
    }
}

impl fmt::Debug for EpollRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EpollRegistry")
            .field("fd", &self.fd)
            .field("max_batch", &self.events.len())
            .finish()
    }
}

impl AsRawFd for EpollRegistry {
    fn as_raw_fd(&self) -> RawFd {
        self.fd.as_raw_fd()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::readiness::CHANNEL_INTEREST;
    use std::io::{Read, Write};
    use std::os::unix::net::UnixStream;

    fn readable_pair() -> (UnixStream, UnixStream) {
        let (reader, writer) = UnixStream::pair().expect("socketpair");
        reader.set_nonblocking(true).expect("nonblocking");
        (reader, writer)
    }

    #[test]
    fn one_shot_fires_once_until_rearmed() {
        let mut epoll = EpollRegistry::new(8).expect("epoll");
        let (mut reader, mut writer) = readable_pair();
        let token = Token(42);
        epoll
            .register(reader.as_raw_fd(), token, CHANNEL_INTEREST, Mode::OneShot)
            .expect("register");

        writer.write_all(b"add@/devices/x").expect("write");

        let mut batch = ReadyBatch::default();
        epoll.wait_timeout(&mut batch, 1_000).expect("first wait");
        assert_eq!(batch.len(), 1);
        let ready = *batch.iter().next().expect("record");
        assert_eq!(ready.token, token);
        assert!(ready.is_readable());

        // Data is still pending but the registration is disarmed.
        let err = epoll.wait_timeout(&mut batch, 0).unwrap_err();
        assert!(matches!(err, LoopError::Wait(WaitFailure::NoEvents)), "got: {err}");

        epoll
            .rearm(reader.as_raw_fd(), token, CHANNEL_INTEREST)
            .expect("rearm");
        epoll.wait_timeout(&mut batch, 1_000).expect("wait after rearm");
        assert_eq!(batch.len(), 1);

        let mut buf = [0u8; 64];
        let n = reader.read(&mut buf).expect("read");
        assert_eq!(&buf[..n], b"add@/devices/x");
    }

    #[test]
    fn zero_ready_resources_is_a_wait_error() {
        let mut epoll = EpollRegistry::new(8).expect("epoll");
        let mut batch = ReadyBatch::default();
        let err = epoll.wait_timeout(&mut batch, 0).unwrap_err();
        assert!(matches!(err, LoopError::Wait(WaitFailure::NoEvents)));
        assert!(!err.is_transient());
    }

    #[test]
    fn rearm_of_unregistered_fd_is_registration_error() {
        let mut epoll = EpollRegistry::new(8).expect("epoll");
        let (reader, _writer) = readable_pair();
        let err = epoll
            .rearm(reader.as_raw_fd(), Token(1), CHANNEL_INTEREST)
            .unwrap_err();
        match err {
            LoopError::Registration { op, source, .. } => {
                assert_eq!(op, RegistrationOp::Modify);
                assert_eq!(source.raw_os_error(), Some(libc::ENOENT));
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn register_invalid_fd_fails() {
        let mut epoll = EpollRegistry::new(8).expect("epoll");
        let err = epoll
            .register(-1, Token(1), CHANNEL_INTEREST, Mode::OneShot)
            .unwrap_err();
        assert!(matches!(
            err,
            LoopError::Registration {
                op: RegistrationOp::Add,
                ..
            }
        ));
    }

    #[test]
    fn level_registration_refires_without_rearm() {
        let mut epoll = EpollRegistry::new(8).expect("epoll");
        let (reader, mut writer) = readable_pair();
        epoll
            .register(reader.as_raw_fd(), Token(3), CHANNEL_INTEREST, Mode::Level)
            .expect("register");
        writer.write_all(b"change@/devices/y").expect("write");

        let mut batch = ReadyBatch::default();
        for _ in 0..2 {
            epoll.wait_timeout(&mut batch, 1_000).expect("wait");
            assert_eq!(batch.len(), 1);
            assert_eq!(batch.iter().next().map(|r| r.token), Some(Token(3)));
        }
    }

    #[test]
    fn batch_is_capped_at_capacity() {
        let mut epoll = EpollRegistry::new(2).expect("epoll");
        let mut pairs = Vec::new();
        for n in 0..3u64 {
            let (reader, mut writer) = readable_pair();
            epoll
                .register(reader.as_raw_fd(), Token(n), CHANNEL_INTEREST, Mode::OneShot)
                .expect("register");
            writer.write_all(b"x").expect("write");
            pairs.push((reader, writer));
        }

        let mut batch = ReadyBatch::with_capacity(8);
        epoll.wait_timeout(&mut batch, 1_000).expect("wait");
        assert_eq!(batch.len(), 2, "never more records than the epoll buffer");
    }
}
