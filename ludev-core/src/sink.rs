//! Logging collaborator seam.

use crate::error::LoopError;
use crate::identity::ResourceRole;

/// Write-only destination for what the loop observes.
pub trait EventSink {
    /// Bytes drained from a ready resource, exactly as read.
    fn drained(&mut self, role: ResourceRole, bytes: &[u8]);

    /// The fatal error that is about to terminate the loop.
    fn failure(&mut self, err: &LoopError);
}

/// [`EventSink`] backed by `tracing`.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingSink;

impl EventSink for TracingSink {
    fn drained(&mut self, role: ResourceRole, bytes: &[u8]) {
        tracing::info!(
            %role,
            len = bytes.len(),
            msg = %bytes.escape_ascii(),
            "drained channel"
        );
    }

    fn failure(&mut self, err: &LoopError) {
        tracing::error!(error = %err, "event loop failed");
    }
}
