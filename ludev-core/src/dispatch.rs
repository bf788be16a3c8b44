//! Event dispatcher: routes each readiness record to the handler registered
//! for its resource's role, stopping at the first failure.

use std::collections::HashMap;

use crate::error::LoopError;
use crate::identity::{Resource, ResourceRole, ResourceTable};
use crate::readiness::{Poller, ReadyBatch, Readiness};
use crate::sink::EventSink;

/// What a handler may touch while it runs.
pub struct HandlerContext<'a> {
    pub poller: &'a mut dyn Poller,
    pub sink: &'a mut dyn EventSink,
}

/// Reacts to one readiness record of one resource.
pub trait Handler {
    fn handle(
        &mut self,
        resource: &Resource,
        ready: Readiness,
        cx: &mut HandlerContext<'_>,
    ) -> Result<(), LoopError>;
}

#[derive(Default)]
pub struct Dispatcher {
    handlers: HashMap<ResourceRole, Box<dyn Handler>>,
}

impl Dispatcher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn contains(&self, role: ResourceRole) -> bool {
        self.handlers.contains_key(&role)
    }

    /// Install the handler for `role`; fails if one is already installed.
    pub fn insert(&mut self, role: ResourceRole, handler: Box<dyn Handler>) -> Result<(), LoopError> {
        if self.contains(role) {
            return Err(LoopError::AlreadyAttached { role });
        }
        self.handlers.insert(role, handler);
        Ok(())
    }

    /// Handle `batch` in delivery order. The first failing record aborts the
    /// rest of the batch.
    pub fn dispatch(
        &mut self,
        batch: &ReadyBatch,
        table: &ResourceTable,
        cx: &mut HandlerContext<'_>,
    ) -> Result<(), LoopError> {
        for ready in batch {
            let token = ready.token;
            let resource = table
                .get(token)
                .ok_or(LoopError::NoHandlerMatched { token })?;
            let handler = self
                .handlers
                .get_mut(&resource.role)
                .ok_or(LoopError::NoHandlerMatched { token })?;
            handler.handle(resource, *ready, cx)?;
        }
        Ok(())
    }
}
