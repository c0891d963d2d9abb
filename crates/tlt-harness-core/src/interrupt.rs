//! Ctrl+C (SIGINT) handling for runs that own temporary files.
//!
//! The handler only records the interrupt. The harness keeps waiting for the
//! running child, so generated scripts and rendered recipes are removed by
//! their guards before the process exits with [`INTERRUPTED_EXIT_CODE`].

use std::sync::atomic::{AtomicBool, Ordering};

/// Conventional status for termination by SIGINT (128 + 2).
pub const INTERRUPTED_EXIT_CODE: i32 = 130;

static INTERRUPTED: AtomicBool = AtomicBool::new(false);
static HANDLER_INSTALLED: AtomicBool = AtomicBool::new(false);

/// Install the process-wide handler. Later calls are no-ops.
pub fn install_handler() -> Result<(), ctrlc::Error> {
    if HANDLER_INSTALLED.swap(true, Ordering::SeqCst) {
        return Ok(());
    }
    ctrlc::set_handler(|| {
        tracing::warn!("Received Ctrl+C, finishing the current step before exiting");
        INTERRUPTED.store(true, Ordering::SeqCst);
    })
}

pub fn interrupted() -> bool {
    INTERRUPTED.load(Ordering::SeqCst)
}
