//! ludev daemon: opens the kernel uevent channel and drives the event loop.

pub mod config;
mod error;
pub mod netlink;
mod runtime;

pub use config::{DaemonConfig, LogFormat, LOG_FILTER_ENV};
pub use error::DaemonError;
pub use netlink::UeventSocket;
pub use runtime::start_blocking;
