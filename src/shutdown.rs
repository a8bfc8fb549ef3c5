// Signal trapping and graceful shutdown for `vext serve`

use anyhow::Result;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

const POLL_INTERVAL: Duration = Duration::from_millis(100);

/// Shutdown flag shared between the signal thread and the server
#[derive(Clone, Default)]
pub struct ShutdownState {
    shutdown_requested: Arc<AtomicBool>,
}

impl ShutdownState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn request_shutdown(&self) {
        self.shutdown_requested.store(true, Ordering::SeqCst);
        log::info!("Shutdown requested");
    }

    pub fn is_shutdown_requested(&self) -> bool {
        self.shutdown_requested.load(Ordering::SeqCst)
    }

    /// Resolves once shutdown has been requested. Used as axum's graceful shutdown signal.
    pub async fn wait(self) {
        while !self.is_shutdown_requested() {
            tokio::time::sleep(POLL_INTERVAL).await;
        }
        log::info!("Shutdown signal received, draining in-flight requests...");
    }
}

/// Register handlers for SIGINT (Ctrl+C), SIGTERM and SIGHUP
#[cfg(unix)]
pub fn register_signal_handlers(state: ShutdownState) -> Result<()> {
    use signal_hook::consts::{SIGHUP, SIGINT, SIGTERM};
    use signal_hook::iterator::Signals;
    use std::thread;

    let mut signals = Signals::new([SIGINT, SIGTERM, SIGHUP])
        .map_err(|e| anyhow::anyhow!("Failed to register signal handlers: {}", e))?;

    thread::spawn(move || {
        for signal in signals.forever() {
            let name = match signal {
                SIGINT => "SIGINT",
                SIGTERM => "SIGTERM",
                SIGHUP => "SIGHUP",
                _ => continue,
            };
            log::info!("Received {}", name);
            state.request_shutdown();
        }
    });

    log::debug!("Signal handlers registered (SIGINT, SIGTERM, SIGHUP)");
    Ok(())
}

#[cfg(windows)]
pub fn register_signal_handlers(state: ShutdownState) -> Result<()> {
    ctrlc::set_handler(move || {
        log::info!("Received Ctrl+C");
        state.request_shutdown();
    })
    .map_err(|e| anyhow::anyhow!("Failed to register Ctrl+C handler: {}", e))?;

    log::debug!("Signal handler registered (Ctrl+C)");
    Ok(())
}
