//! Graceful shutdown support via atomic flag
//!
//! The pipeline only checks the flag between topics, so a topic is either
//! fully merged or not started when a run stops early.

use std::sync::atomic::{AtomicBool, Ordering};

/// Global shutdown flag, set by the SIGTERM/SIGINT handler
pub fn shutdown_flag() -> &'static AtomicBool {
    static FLAG: AtomicBool = AtomicBool::new(false);
    &FLAG
}

/// Check if shutdown was requested
pub fn is_shutdown_requested() -> bool {
    shutdown_flag().load(Ordering::Relaxed)
}

/// Install SIGINT/SIGTERM handlers.
///
/// First signal: set the shutdown flag (the current topic finishes, the
/// catalog is still written). Second signal: exit immediately with 130.
pub fn install_signal_handlers() -> std::io::Result<()> {
    for signal in [signal_hook::consts::SIGINT, signal_hook::consts::SIGTERM] {
        // SAFETY: the handler only touches an atomic and calls `_exit`,
        // both async-signal-safe.
        unsafe {
            signal_hook::low_level::register(signal, || {
                if shutdown_flag().swap(true, Ordering::Relaxed) {
                    signal_hook::low_level::exit(130);
                }
            })?;
        }
    }
    Ok(())
}
