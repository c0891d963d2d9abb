//! Observability: tracing init and the JSONL run-event log.
//!
//! Uses `config::ObservabilityConfig` for TLT_QUIET, TLT_LOG_LEVEL, TLT_LOG_JSON, TLT_RUN_LOG.

use std::fs::OpenOptions;
use std::io::Write;
use std::path::Path;
use std::sync::Mutex;

use chrono::Utc;
use serde_json::json;
use tracing_subscriber::{prelude::*, EnvFilter};

use crate::config::ObservabilityConfig;

static RUN_LOG_PATH: Mutex<Option<String>> = Mutex::new(None);

/// Initialize tracing. Call once at process startup.
/// When TLT_QUIET=1, only WARN and above are logged. `RUST_LOG` wins over both.
pub fn init_tracing() {
    let cfg = ObservabilityConfig::from_env();
    let level = if cfg.quiet {
        "warn".to_string()
    } else {
        cfg.log_level.clone()
    };

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&level));

    // Logs go to stderr; stdout belongs to the notebooks and to `list`/`render` output.
    let _ = if cfg.log_json {
        tracing_subscriber::registry()
            .with(filter)
            .with(
                tracing_subscriber::fmt::layer()
                    .json()
                    .with_writer(std::io::stderr)
                    .with_target(true)
                    .with_thread_ids(false),
            )
            .try_init()
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(
                tracing_subscriber::fmt::layer()
                    .with_writer(std::io::stderr)
                    .with_target(true)
                    .with_thread_ids(false),
            )
            .try_init()
    };
}

fn get_run_log_path() -> Option<String> {
    {
        let guard = RUN_LOG_PATH.lock().ok()?;
        if let Some(ref p) = *guard {
            return Some(p.clone());
        }
    }
    let path = ObservabilityConfig::from_env().run_log.clone()?;
    if let Some(parent) = Path::new(&path).parent() {
        let _ = std::fs::create_dir_all(parent);
    }
    {
        let mut guard = RUN_LOG_PATH.lock().ok()?;
        *guard = Some(path.clone());
    }
    Some(path)
}

fn append_jsonl(path: &Path, record: &serde_json::Value) {
    if let Ok(mut f) = OpenOptions::new().create(true).append(true).open(path) {
        if let Ok(line) = serde_json::to_string(record) {
            let _ = writeln!(f, "{}", line);
        }
    }
}

fn now() -> String {
    Utc::now().to_rfc3339_opts(chrono::SecondsFormat::Millis, true)
}

fn emit(record: serde_json::Value) {
    if let Some(path) = get_run_log_path() {
        append_jsonl(Path::new(&path), &record);
    }
}

/// Run event: a notebook is about to be converted and executed
pub fn notebook_started(notebook: &str, interpreter: &str, workdir: &str) {
    emit(json!({
        "ts": now(),
        "event": "notebook_started",
        "notebook": notebook,
        "interpreter": interpreter,
        "workdir": workdir,
    }));
}

/// Run event: a notebook script finished (exit_code is null when killed by a signal)
pub fn notebook_completed(notebook: &str, exit_code: Option<i32>, duration_ms: u64) {
    emit(json!({
        "ts": now(),
        "event": "notebook_completed",
        "notebook": notebook,
        "exit_code": exit_code,
        "duration_ms": duration_ms,
    }));
}

/// Run event: the container engine was invoked
pub fn image_build_invoked(engine: &str, tag: Option<&str>, build_args: &[(String, String)]) {
    let args: serde_json::Map<String, serde_json::Value> = build_args
        .iter()
        .map(|(k, v)| (k.clone(), json!(v)))
        .collect();
    emit(json!({
        "ts": now(),
        "event": "image_build_invoked",
        "engine": engine,
        "tag": tag,
        "build_args": args,
    }));
}

/// Run event: the training entry point launched its command
pub fn train_invoked(argv: &[String]) {
    emit(json!({
        "ts": now(),
        "event": "train_invoked",
        "argv": argv,
    }));
}
