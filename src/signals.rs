use anyhow::{Context, Result};
use tokio::select;
use tokio::signal::{
    self,
    unix::{self, SignalKind},
};
use tracing::{debug, info};
use tracing_core::LevelFilter;

use crate::trace::{toggle_tracing_override, TracingReloadFn};

/// Resolves once SIGINT or SIGTERM is received. SIGUSR2 toggles TRACE logging
/// and keeps waiting.
pub async fn wait_for_termination(
    tracing_reload_fn: TracingReloadFn,
    level: LevelFilter,
) -> Result<()> {
    let mut sigterm =
        unix::signal(SignalKind::terminate()).context("Unable to configure SIGTERM listener")?;
    let mut sigusr2 = unix::signal(SignalKind::user_defined2())
        .context("Unable to configure SIGUSR2 listener")?;

    loop {
        select! {
            r = signal::ctrl_c() => {
                r.context("Unable to receive SIGINT/Ctrl+C")?;
                info!("Got SIGINT/Ctrl+C, exiting");
                return Ok(());
            }

            _ = sigterm.recv() => {
                info!("Got SIGTERM, exiting");
                return Ok(());
            }

            _ = sigusr2.recv() => {
                debug!("Got SIGUSR2");
                toggle_tracing_override(&tracing_reload_fn, level)?;
            }
        }
    }
}
