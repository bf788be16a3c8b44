//! ludev core — a single-threaded, readiness-driven event loop.
//!
//! - [`readiness`] — the [`Poller`] seam and the records it produces
//! - [`epoll`] — the Linux implementation of [`Poller`]
//! - [`identity`] — token → resource role table
//! - [`dispatch`] — routes readiness records to handlers, fail-fast
//! - [`channel`] — drains a channel and re-arms it
//! - [`driver`] — [`LoopContext`] and the blocking loop
//! - [`sink`] — the logging collaborator
//! - [`error`] — [`LoopError`]

pub mod channel;
pub mod dispatch;
pub mod driver;
pub mod epoll;
pub mod error;
pub mod identity;
pub mod readiness;
pub mod sink;

pub use channel::{Channel, ChannelHandler, DRAIN_CAPACITY};
pub use dispatch::{Dispatcher, Handler, HandlerContext};
pub use driver::{LoopContext, LoopState};
pub use epoll::EpollRegistry;
pub use error::{LoopError, RegistrationOp, WaitFailure};
pub use identity::{Resource, ResourceRole, ResourceTable};
pub use readiness::{
    Interest, Mode, Poller, ReadyBatch, Readiness, Token, BATCH_CAPACITY, CHANNEL_INTEREST,
};
pub use sink::{EventSink, TracingSink};
