//! Loop driver and the per-process loop context.

use crate::channel::{Channel, ChannelHandler};
use crate::dispatch::{Dispatcher, HandlerContext};
use crate::error::LoopError;
use crate::identity::{Resource, ResourceRole, ResourceTable};
use crate::readiness::{Mode, Poller, ReadyBatch, BATCH_CAPACITY, CHANNEL_INTEREST};
use crate::sink::EventSink;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoopState {
    /// Context built, no resource attached yet.
    Initialized,
    Running,
    Terminated,
}

/// Everything the running daemon owns: the multiplexer, the attached
/// resources and their handlers, and the sink observations go to.
pub struct LoopContext<P, S> {
    poller: P,
    sink: S,
    resources: ResourceTable,
    dispatcher: Dispatcher,
    batch: ReadyBatch,
    state: LoopState,
}

impl<P: Poller, S: EventSink> LoopContext<P, S> {
    pub fn new(poller: P, sink: S) -> Self {
        Self {
            poller,
            sink,
            resources: ResourceTable::new(),
            dispatcher: Dispatcher::new(),
            batch: ReadyBatch::with_capacity(BATCH_CAPACITY),
            state: LoopState::Initialized,
        }
    }

    pub fn state(&self) -> LoopState {
        self.state
    }

    pub fn resources(&self) -> &ResourceTable {
        &self.resources
    }

    /// Register `channel` for `role` in one-shot mode with
    /// {readable, error, hangup} interest and install its handler. The first
    /// successful attach moves the context to [`LoopState::Running`].
    pub fn attach<C>(&mut self, role: ResourceRole, channel: C) -> Result<Resource, LoopError>
    where
        C: Channel + 'static,
    {
        if self.dispatcher.contains(role) {
            return Err(LoopError::AlreadyAttached { role });
        }

        let fd = channel.as_raw_fd();
        let token = self.resources.next_token();
        self.poller
            .register(fd, token, CHANNEL_INTEREST, Mode::OneShot)?;
        let resource = self.resources.insert(fd, role, CHANNEL_INTEREST);
        self.dispatcher
            .insert(role, Box::new(ChannelHandler::new(channel)))?;

        if self.state == LoopState::Initialized {
            self.state = LoopState::Running;
        }
        tracing::info!(%role, fd, "attached channel");
        Ok(resource)
    }

    /// One iteration: wait for readiness, then dispatch the batch.
    pub fn turn(&mut self) -> Result<(), LoopError> {
        self.ensure_running()?;
        self.poller.wait(&mut self.batch)?;
        if self.batch.is_empty() {
            return Err(LoopError::Wait(crate::error::WaitFailure::NoEvents));
        }

        let mut cx = HandlerContext {
            poller: &mut self.poller,
            sink: &mut self.sink,
        };
        self.dispatcher.dispatch(&self.batch, &self.resources, &mut cx)
    }

    /// Run until a fatal error. Interrupted waits are retried silently; any
    /// other failure is reported to the sink once and returned.
    pub fn run(&mut self) -> Result<(), LoopError> {
        self.ensure_running()?;
        loop {
            match self.turn() {
                Ok(()) => {}
                Err(err) if err.is_transient() => {
                    tracing::debug!("wait interrupted, retrying");
                }
                Err(err) => {
                    self.state = LoopState::Terminated;
                    self.sink.failure(&err);
                    return Err(err);
                }
            }
        }
    }

    fn ensure_running(&self) -> Result<(), LoopError> {
        match self.state {
            LoopState::Running => Ok(()),
            state => Err(LoopError::NotRunning { state }),
        }
    }
}
