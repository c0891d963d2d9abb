//! Quiet-mode aware logging. When TLT_QUIET=1 (CI batch runs), suppress per-notebook [INFO].
//! Uses `tracing::info!` so output is captured by the tracing subscriber.

#[macro_export]
macro_rules! info_log {
    ($($arg:tt)*) => {{
        if !$crate::log::is_quiet() {
            tracing::info!($($arg)*);
        }
    }};
}

pub fn is_quiet() -> bool {
    tlt_harness_core::config::ObservabilityConfig::from_env().quiet
}
