use std::{
    io::stderr,
    sync::atomic::{AtomicBool, Ordering},
};

use anyhow::{anyhow, Context, Result};
use tracing::info;
use tracing_core::LevelFilter;
use tracing_subscriber::EnvFilter;

pub type TracingReloadFn =
    Box<dyn Fn(EnvFilter) -> std::result::Result<(), tracing_subscriber::reload::Error>>;

pub const fn default_level(verbosity: u8) -> LevelFilter {
    match verbosity {
        0 => LevelFilter::INFO,
        1 => LevelFilter::DEBUG,
        _ => LevelFilter::TRACE,
    }
}

fn base_filter(level: LevelFilter) -> EnvFilter {
    EnvFilter::builder()
        .with_default_directive(level.into())
        .from_env_lossy()
}

/// Logs go to stderr so that stdout only carries the final result.
pub fn init_tracing(without_timestamp: bool, level: LevelFilter) -> Result<TracingReloadFn> {
    let builder = tracing_subscriber::fmt()
        .with_target(true)
        .with_env_filter(base_filter(level))
        .with_writer(stderr);

    let reload_fn: TracingReloadFn = if without_timestamp {
        let builder = builder.without_time().with_filter_reloading();
        let reload_handle = builder.reload_handle();
        builder.try_init().map_err(|err| anyhow!(err))?;
        Box::new(move |new_filter| reload_handle.reload(new_filter))
    } else {
        let builder = builder.with_filter_reloading();
        let reload_handle = builder.reload_handle();
        builder.try_init().map_err(|err| anyhow!(err))?;
        Box::new(move |new_filter| reload_handle.reload(new_filter))
    };

    Ok(reload_fn)
}

pub fn toggle_tracing_override(reload_fn: &TracingReloadFn, level: LevelFilter) -> Result<()> {
    static OVERRIDE_ENABLED: AtomicBool = AtomicBool::new(false);

    let new_filter = if OVERRIDE_ENABLED.fetch_xor(true, Ordering::Relaxed) {
        info!("Tracing level override disabled, back to {}", level);
        base_filter(level)
    } else {
        info!("Tracing level override set to TRACE");
        base_filter(level).add_directive(LevelFilter::TRACE.into())
    };

    reload_fn(new_filter).context("Unable to reload logging/tracing")
}
