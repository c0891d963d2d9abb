use std::ffi::OsString;
use std::fs::OpenOptions;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::process::Command;
use std::time::{Duration, Instant};

use serde::Serialize;
use tlt_harness_core::config::env_keys::runner as runner_keys;
use tlt_harness_core::{interrupt, observability};

use crate::convert;
use crate::document::Notebook;
use crate::error::NotebookError;
use crate::info_log;

/// Settings shared by every notebook in a batch.
#[derive(Debug, Clone)]
pub struct RunOptions {
    /// Resolved interpreter executable
    pub interpreter: PathBuf,
    /// Stem of the script generated next to the notebook (`<stem>.py`)
    pub script_name: String,
    /// Cells carrying any of these tags are removed before conversion
    pub strip_tags: Vec<String>,
    /// Directory the runner was invoked from; prepended to PYTHONPATH
    pub invoking_dir: PathBuf,
    /// Stop the batch at the first failing notebook
    pub fail_fast: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", content = "detail", rename_all = "snake_case")]
pub enum NotebookStatus {
    /// Interpreter exited with this code
    Exited(i32),
    /// Interpreter was killed by a signal
    Terminated,
    /// Conversion or launch failed before the script ran
    Errored(String),
}

#[derive(Debug, Clone, Serialize)]
pub struct NotebookOutcome {
    pub notebook: PathBuf,
    pub status: NotebookStatus,
    #[serde(rename = "duration_ms", serialize_with = "serialize_millis")]
    pub duration: Duration,
}

fn serialize_millis<S: serde::Serializer>(d: &Duration, s: S) -> Result<S::Ok, S::Error> {
    s.serialize_u64(d.as_millis() as u64)
}

impl NotebookOutcome {
    pub fn success(&self) -> bool {
        self.status == NotebookStatus::Exited(0)
    }

    pub fn exit_code(&self) -> i32 {
        match self.status {
            NotebookStatus::Exited(code) => code,
            NotebookStatus::Terminated | NotebookStatus::Errored(_) => 1,
        }
    }
}

/// How a batch maps onto the process exit status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ExitPolicy {
    /// Status of the last executed notebook
    #[default]
    Last,
    /// 1 if any notebook failed
    Strict,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct RunSummary {
    pub outcomes: Vec<NotebookOutcome>,
    /// Notebooks not attempted because of `fail_fast` or an interrupt
    pub skipped: usize,
    /// Ctrl+C arrived during the batch
    pub interrupted: bool,
}

impl RunSummary {
    pub fn failed(&self) -> usize {
        self.outcomes.iter().filter(|o| !o.success()).count()
    }

    /// Empty batches exit 0; interrupted batches exit 130 under either policy.
    pub fn exit_code(&self, policy: ExitPolicy) -> i32 {
        if self.interrupted {
            return interrupt::INTERRUPTED_EXIT_CODE;
        }
        match policy {
            ExitPolicy::Last => self.outcomes.last().map_or(0, NotebookOutcome::exit_code),
            ExitPolicy::Strict => i32::from(self.failed() > 0),
        }
    }
}

/// Generated script that is removed when the guard drops, whatever the run's result.
#[derive(Debug)]
pub struct ScriptGuard {
    path: PathBuf,
}

impl ScriptGuard {
    /// Create `path` with `contents`. Never overwrites an existing file.
    pub fn create(path: PathBuf, contents: &str) -> Result<Self, NotebookError> {
        let mut file = OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(&path)
            .map_err(|source| {
                if source.kind() == std::io::ErrorKind::AlreadyExists {
                    NotebookError::ScriptExists(path.clone())
                } else {
                    NotebookError::WriteScript {
                        path: path.clone(),
                        source,
                    }
                }
            })?;
        let guard = Self { path };
        file.write_all(contents.as_bytes())
            .map_err(|source| NotebookError::WriteScript {
                path: guard.path.clone(),
                source,
            })?;
        Ok(guard)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Drop for ScriptGuard {
    fn drop(&mut self) {
        match std::fs::remove_file(&self.path) {
            Ok(()) => tracing::debug!(script = %self.path.display(), "Removed generated script"),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
            Err(e) => tracing::warn!(
                script = %self.path.display(),
                error = %e,
                "Failed to remove generated script"
            ),
        }
    }
}

/// Directory the notebook's script runs in: the notebook's own folder.
pub fn workdir_for(notebook: &Path) -> PathBuf {
    match notebook.parent() {
        Some(p) if !p.as_os_str().is_empty() => p.to_path_buf(),
        _ => PathBuf::from("."),
    }
}

/// `invoking_dir` followed by the entries of an existing PYTHONPATH.
pub fn python_path(invoking_dir: &Path, existing: Option<OsString>) -> OsString {
    let mut entries = vec![invoking_dir.to_path_buf()];
    if let Some(existing) = existing {
        entries.extend(std::env::split_paths(&existing).filter(|p| !p.as_os_str().is_empty()));
    }
    std::env::join_paths(&entries).unwrap_or_else(|_| invoking_dir.as_os_str().to_os_string())
}

/// Convert one notebook, execute the generated script in the notebook's folder, clean up.
pub fn run_notebook(notebook: &Path, opts: &RunOptions) -> Result<NotebookOutcome, NotebookError> {
    let document = Notebook::load(notebook)?;
    let script = convert::to_script(&document, &opts.strip_tags);

    let workdir = workdir_for(notebook);
    let script_file = format!("{}.py", opts.script_name);
    let guard = ScriptGuard::create(workdir.join(&script_file), &script)?;

    observability::notebook_started(
        &notebook.to_string_lossy(),
        &opts.interpreter.to_string_lossy(),
        &workdir.to_string_lossy(),
    );
    let start = Instant::now();
    let status = Command::new(&opts.interpreter)
        .arg(&script_file)
        .current_dir(&workdir)
        .env(
            runner_keys::PYTHONPATH,
            python_path(&opts.invoking_dir, std::env::var_os(runner_keys::PYTHONPATH)),
        )
        .status()
        .map_err(|source| NotebookError::Spawn {
            program: opts.interpreter.clone(),
            source,
        })?;
    let duration = start.elapsed();
    drop(guard);

    let status = match status.code() {
        Some(code) => NotebookStatus::Exited(code),
        None => NotebookStatus::Terminated,
    };
    let exit_code = match status {
        NotebookStatus::Exited(code) => Some(code),
        _ => None,
    };
    observability::notebook_completed(
        &notebook.to_string_lossy(),
        exit_code,
        duration.as_millis() as u64,
    );

    Ok(NotebookOutcome {
        notebook: notebook.to_path_buf(),
        status,
        duration,
    })
}

/// Run notebooks one at a time. A failure is recorded and the batch continues
/// unless `fail_fast` is set. An interrupt stops the batch after the running notebook.
pub fn run_notebooks(notebooks: &[PathBuf], opts: &RunOptions) -> RunSummary {
    let mut summary = RunSummary::default();

    for (idx, notebook) in notebooks.iter().enumerate() {
        if interrupt::interrupted() {
            summary.skipped = notebooks.len() - idx;
            break;
        }
        info_log!("Running {}", notebook.display());
        let outcome = match run_notebook(notebook, opts) {
            Ok(outcome) => outcome,
            Err(e) => {
                tracing::error!(
                    notebook = %notebook.display(),
                    error = %e,
                    "Notebook could not be run"
                );
                NotebookOutcome {
                    notebook: notebook.clone(),
                    status: NotebookStatus::Errored(e.to_string()),
                    duration: Duration::ZERO,
                }
            }
        };

        let failed = !outcome.success();
        if failed {
            tracing::warn!(
                notebook = %notebook.display(),
                status = ?outcome.status,
                "Notebook failed"
            );
        } else {
            info_log!(
                "Finished {} in {:.1}s",
                notebook.display(),
                outcome.duration.as_secs_f64()
            );
        }
        summary.outcomes.push(outcome);

        if failed && opts.fail_fast {
            summary.skipped = notebooks.len() - idx - 1;
            break;
        }
    }

    summary.interrupted = interrupt::interrupted();
    summary
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    const NOTEBOOK: &str = r#"{
        "nbformat": 4, "nbformat_minor": 5, "metadata": {},
        "cells": [
            {"cell_type": "code", "metadata": {}, "execution_count": 1, "outputs": [],
             "source": "print('kept')"},
            {"cell_type": "code", "metadata": {"tags": ["skip_ci"]}, "execution_count": 2, "outputs": [],
             "source": "print('long running')"}
        ]
    }"#;

    fn write_notebook(dir: &Path, name: &str) -> PathBuf {
        fs::create_dir_all(dir).unwrap();
        let path = dir.join(name);
        fs::write(&path, NOTEBOOK).unwrap();
        path
    }

    fn options(interpreter: PathBuf, invoking_dir: &Path) -> RunOptions {
        RunOptions {
            interpreter,
            script_name: "notebook_test".to_string(),
            strip_tags: vec!["skip_ci".to_string()],
            invoking_dir: invoking_dir.to_path_buf(),
            fail_fast: false,
        }
    }

    fn outcome(code: i32) -> NotebookOutcome {
        NotebookOutcome {
            notebook: PathBuf::from("nb.ipynb"),
            status: NotebookStatus::Exited(code),
            duration: Duration::ZERO,
        }
    }

    #[test]
    fn test_workdir_for() {
        assert_eq!(workdir_for(Path::new("a/b/nb.ipynb")), PathBuf::from("a/b"));
        assert_eq!(workdir_for(Path::new("nb.ipynb")), PathBuf::from("."));
    }

    #[test]
    fn test_python_path_prepends_invoking_dir() {
        let joined = python_path(Path::new("/repo"), None);
        assert_eq!(joined, OsString::from("/repo"));

        let existing = std::env::join_paths(["/site", "/other"]).unwrap();
        let joined = python_path(Path::new("/repo"), Some(existing));
        let parts: Vec<_> = std::env::split_paths(&joined).collect();
        assert_eq!(
            parts,
            vec![PathBuf::from("/repo"), PathBuf::from("/site"), PathBuf::from("/other")]
        );
    }

    #[test]
    fn test_summary_exit_policies() {
        let empty = RunSummary::default();
        assert_eq!(empty.exit_code(ExitPolicy::Last), 0);
        assert_eq!(empty.exit_code(ExitPolicy::Strict), 0);

        let summary = RunSummary {
            outcomes: vec![outcome(2), outcome(0)],
            skipped: 0,
            interrupted: false,
        };
        assert_eq!(summary.failed(), 1);
        assert_eq!(summary.exit_code(ExitPolicy::Last), 0);
        assert_eq!(summary.exit_code(ExitPolicy::Strict), 1);

        let summary = RunSummary {
            outcomes: vec![outcome(0), outcome(3)],
            skipped: 0,
            interrupted: false,
        };
        assert_eq!(summary.exit_code(ExitPolicy::Last), 3);

        let summary = RunSummary {
            outcomes: vec![outcome(0)],
            skipped: 1,
            interrupted: true,
        };
        assert_eq!(summary.exit_code(ExitPolicy::Last), 130);
        assert_eq!(summary.exit_code(ExitPolicy::Strict), 130);
    }

    #[test]
    fn test_script_guard_removes_on_drop() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("notebook_test.py");
        {
            let guard = ScriptGuard::create(path.clone(), "print(1)\n").unwrap();
            assert_eq!(fs::read_to_string(guard.path()).unwrap(), "print(1)\n");
        }
        assert!(!path.exists());
    }

    #[test]
    fn test_script_guard_refuses_existing_file() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("notebook_test.py");
        fs::write(&path, "user file").unwrap();
        let err = ScriptGuard::create(path.clone(), "generated").unwrap_err();
        assert!(matches!(err, NotebookError::ScriptExists(_)));
        assert_eq!(fs::read_to_string(&path).unwrap(), "user file");
    }

    #[cfg(unix)]
    #[test]
    fn test_run_notebook_success_removes_script() {
        let tmp = tempfile::tempdir().unwrap();
        let nb = write_notebook(&tmp.path().join("nbs"), "demo.ipynb");
        let opts = options(which::which("true").unwrap(), tmp.path());

        let outcome = run_notebook(&nb, &opts).unwrap();
        assert!(outcome.success());
        assert!(!tmp.path().join("nbs").join("notebook_test.py").exists());
    }

    #[cfg(unix)]
    #[test]
    fn test_run_notebook_failure_still_removes_script() {
        let tmp = tempfile::tempdir().unwrap();
        let nb = write_notebook(&tmp.path().join("nbs"), "demo.ipynb");
        let opts = options(which::which("false").unwrap(), tmp.path());

        let outcome = run_notebook(&nb, &opts).unwrap();
        assert_eq!(outcome.status, NotebookStatus::Exited(1));
        assert!(!tmp.path().join("nbs").join("notebook_test.py").exists());
    }

    #[cfg(unix)]
    #[test]
    fn test_run_notebook_spawn_error_removes_script() {
        let tmp = tempfile::tempdir().unwrap();
        let nb = write_notebook(&tmp.path().join("nbs"), "demo.ipynb");
        let opts = options(tmp.path().join("no-such-interpreter"), tmp.path());

        let err = run_notebook(&nb, &opts).unwrap_err();
        assert!(matches!(err, NotebookError::Spawn { .. }));
        assert!(!tmp.path().join("nbs").join("notebook_test.py").exists());
    }

    #[cfg(unix)]
    #[test]
    fn test_run_notebook_workdir_pythonpath_and_stripped_script() {
        use std::os::unix::fs::PermissionsExt;

        let tmp = tempfile::tempdir().unwrap();
        let nb_dir = tmp.path().join("nbs");
        let nb = write_notebook(&nb_dir, "demo.ipynb");

        let fake = tmp.path().join("fake-python");
        fs::write(
            &fake,
            "#!/bin/sh\npwd > observed_cwd.txt\nprintf '%s' \"$PYTHONPATH\" > observed_path.txt\ncp \"$1\" observed_script.py\n",
        )
        .unwrap();
        fs::set_permissions(&fake, fs::Permissions::from_mode(0o755)).unwrap();

        let outcome = run_notebook(&nb, &options(fake, tmp.path())).unwrap();
        assert!(outcome.success());

        let cwd = fs::read_to_string(nb_dir.join("observed_cwd.txt")).unwrap();
        assert_eq!(
            PathBuf::from(cwd.trim()).canonicalize().unwrap(),
            nb_dir.canonicalize().unwrap()
        );
        let py_path = fs::read_to_string(nb_dir.join("observed_path.txt")).unwrap();
        let first = std::env::split_paths(&py_path).next().unwrap();
        assert_eq!(first, tmp.path());

        let script = fs::read_to_string(nb_dir.join("observed_script.py")).unwrap();
        assert!(script.contains("print('kept')"));
        assert!(!script.contains("long running"));
        assert!(!nb_dir.join("notebook_test.py").exists());
    }

    #[cfg(unix)]
    #[test]
    fn test_run_notebooks_continues_and_fail_fast_stops() {
        let tmp = tempfile::tempdir().unwrap();
        let missing = tmp.path().join("missing.ipynb");
        let good = write_notebook(&tmp.path().join("ok"), "good.ipynb");
        let list = vec![missing, good];

        let opts = options(which::which("true").unwrap(), tmp.path());
        let summary = run_notebooks(&list, &opts);
        assert_eq!(summary.outcomes.len(), 2);
        assert!(matches!(summary.outcomes[0].status, NotebookStatus::Errored(_)));
        assert!(summary.outcomes[1].success());
        assert_eq!(summary.exit_code(ExitPolicy::Last), 0);
        assert_eq!(summary.exit_code(ExitPolicy::Strict), 1);

        let opts = RunOptions {
            fail_fast: true,
            ..opts
        };
        let summary = run_notebooks(&list, &opts);
        assert_eq!(summary.outcomes.len(), 1);
        assert_eq!(summary.skipped, 1);
        assert_eq!(summary.exit_code(ExitPolicy::Last), 1);
    }
}
