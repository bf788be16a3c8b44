use tracing_subscriber::{fmt, EnvFilter};

use ludev_core::{EpollRegistry, LoopContext, ResourceRole, TracingSink, BATCH_CAPACITY};

use crate::config::{DaemonConfig, LogFormat, DEFAULT_LOG_FILTER};
use crate::error::DaemonError;
use crate::netlink::UeventSocket;

/// Install logging, open the uevent channel and run the event loop on the
/// current thread. Only returns on failure.
pub fn start_blocking(config: &DaemonConfig) -> Result<(), DaemonError> {
    init_tracing(config)?;

    let poller = EpollRegistry::new(BATCH_CAPACITY).inspect_err(|err| {
        tracing::error!(error = %err, "failed to create readiness registry");
    })?;
    let socket = UeventSocket::open().inspect_err(|err| {
        tracing::error!(error = %err, "failed to open uevent socket");
    })?;

    let mut ctx = LoopContext::new(poller, TracingSink);
    ctx.attach(ResourceRole::DeviceEvents, socket)
        .inspect_err(|err| tracing::error!(error = %err, "failed to attach uevent socket"))?;

    tracing::info!("listening for kernel uevents");
    ctx.run()?;
    Ok(())
}

fn init_tracing(config: &DaemonConfig) -> Result<(), DaemonError> {
    let filter = build_filter(config.log_filter.as_deref())?;
    let builder = fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_file(true)
        .with_line_number(true);

    // A subscriber may already be installed (tests, embedding); keep it.
    let _ = match config.log_format {
        LogFormat::Text => builder.try_init(),
        LogFormat::Json => builder.json().try_init(),
    };
    Ok(())
}

fn build_filter(explicit: Option<&str>) -> Result<EnvFilter, DaemonError> {
    if let Some(directive) = explicit {
        return EnvFilter::try_new(directive).map_err(|err| DaemonError::LogFilter {
            directive: directive.to_string(),
            reason: err.to_string(),
        });
    }
    Ok(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER)))
}
