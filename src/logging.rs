//! Tracing for training runs.
//!
//! Every `triage` invocation gets its own `triage_<timestamp>.log` under `.triage/logs`,
//! alongside the stdout output. Only the most recent run logs are kept.

use std::fs::{self, File};
use std::io;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;
use std::time::SystemTime;

use time::format_description::BorrowedFormatItem;
use time::macros::format_description;
use time::{OffsetDateTime, UtcOffset};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::fmt::time::OffsetTime;
use tracing_subscriber::{EnvFilter, Registry, fmt, prelude::*};

use crate::app_dirs::{self, AppDirError};

const RUN_LOG_PREFIX: &str = "triage_";
const RUN_LOG_EXTENSION: &str = "log";
/// Run logs kept after pruning, the current one included.
const RUN_LOGS_KEPT: usize = 10;

const FILE_STAMP: &[BorrowedFormatItem<'static>] =
    format_description!("[year]-[month]-[day]_[hour]-[minute]-[second]");
const LINE_STAMP: &[BorrowedFormatItem<'static>] =
    format_description!("[year]-[month]-[day] [hour]:[minute]:[second]");

/// Keeps the non-blocking file writer flushing until the process exits.
static FILE_WRITER_GUARD: OnceLock<WorkerGuard> = OnceLock::new();

#[derive(Debug, thiserror::Error)]
pub enum LogSetupError {
    #[error("no logs directory: {0}")]
    Dir(#[from] AppDirError),
    #[error("cannot {action} {path}: {source}")]
    File {
        action: &'static str,
        path: PathBuf,
        source: io::Error,
    },
    #[error("cannot timestamp the run log: {0}")]
    Timestamp(#[from] time::error::Format),
    #[error("a tracing subscriber is already installed: {0}")]
    Install(#[from] tracing::subscriber::SetGlobalDefaultError),
}

impl LogSetupError {
    fn file(action: &'static str, path: &Path) -> impl FnOnce(io::Error) -> Self {
        let path = path.to_path_buf();
        move |source| Self::File {
            action,
            path,
            source,
        }
    }
}

/// The log file of the current run.
struct RunLog {
    dir: PathBuf,
    file_name: String,
}

impl RunLog {
    /// Create an empty `triage_<stamp>.log` in `dir` for a run started at `started`.
    fn create(dir: &Path, started: OffsetDateTime) -> Result<Self, LogSetupError> {
        let file_name = format!(
            "{RUN_LOG_PREFIX}{}.{RUN_LOG_EXTENSION}",
            started.format(FILE_STAMP)?
        );
        let path = dir.join(&file_name);
        File::options()
            .create(true)
            .append(true)
            .open(&path)
            .map_err(LogSetupError::file("create", &path))?;
        Ok(Self {
            dir: dir.to_path_buf(),
            file_name,
        })
    }

    fn path(&self) -> PathBuf {
        self.dir.join(&self.file_name)
    }
}

/// Install the global subscriber: stdout plus the run log file.
///
/// A second call does nothing. On error nothing is installed and the caller may fall back
/// to [`init_console`].
pub fn init() -> Result<(), LogSetupError> {
    if FILE_WRITER_GUARD.get().is_some() {
        return Ok(());
    }

    let dir = app_dirs::logs_dir()?;
    let started = OffsetDateTime::now_local().unwrap_or_else(|_| OffsetDateTime::now_utc());
    let run_log = RunLog::create(&dir, started)?;
    for stale in stale_logs(&dir, RUN_LOGS_KEPT)? {
        fs::remove_file(&stale).map_err(LogSetupError::file("remove", &stale))?;
    }

    let (writer, guard) =
        tracing_appender::non_blocking(tracing_appender::rolling::never(&dir, &run_log.file_name));
    let timer = line_timer();
    let subscriber = Registry::default()
        .with(subscriber_filter())
        .with(
            fmt::layer()
                .with_target(false)
                .with_timer(timer.clone())
                .with_writer(io::stdout),
        )
        .with(
            fmt::layer()
                .with_ansi(false)
                .with_timer(timer)
                .with_writer(writer),
        );
    tracing::subscriber::set_global_default(subscriber)?;
    let _ = FILE_WRITER_GUARD.set(guard);

    tracing::debug!("Run log at {}", run_log.path().display());
    Ok(())
}

/// Stdout-only logging. Does nothing if a subscriber is already set.
pub fn init_console() {
    let _ = fmt()
        .with_env_filter(subscriber_filter())
        .with_target(false)
        .with_timer(line_timer())
        .try_init();
}

/// Run logs in `dir` beyond the newest `keep`, oldest first. Other files are ignored.
fn stale_logs(dir: &Path, keep: usize) -> Result<Vec<PathBuf>, LogSetupError> {
    let mut runs: Vec<(SystemTime, PathBuf)> = fs::read_dir(dir)
        .map_err(LogSetupError::file("list", dir))?
        .flatten()
        .map(|entry| entry.path())
        .filter(|path| is_run_log(path))
        .map(|path| {
            let modified = fs::metadata(&path)
                .and_then(|meta| meta.modified())
                .unwrap_or(SystemTime::UNIX_EPOCH);
            (modified, path)
        })
        .collect();
    runs.sort();
    let excess = runs.len().saturating_sub(keep);
    Ok(runs.into_iter().take(excess).map(|(_, path)| path).collect())
}

fn is_run_log(path: &Path) -> bool {
    path.is_file()
        && path.extension().is_some_and(|ext| ext == RUN_LOG_EXTENSION)
        && path
            .file_name()
            .and_then(|name| name.to_str())
            .is_some_and(|name| name.starts_with(RUN_LOG_PREFIX))
}

fn line_timer() -> OffsetTime<&'static [BorrowedFormatItem<'static>]> {
    let offset = UtcOffset::current_local_offset().unwrap_or(UtcOffset::UTC);
    OffsetTime::new(offset, LINE_STAMP)
}

/// `RUST_LOG` when set and valid, else `info`.
fn subscriber_filter() -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    fn touch_at(path: &Path, secs: u64) {
        let file = File::create(path).unwrap();
        file.set_modified(SystemTime::UNIX_EPOCH + Duration::from_secs(secs))
            .unwrap();
    }

    #[test]
    fn run_log_is_named_after_its_start_time() {
        let dir = tempfile::tempdir().unwrap();
        let started = OffsetDateTime::from_unix_timestamp(1_700_000_000).unwrap();
        let run_log = RunLog::create(dir.path(), started).unwrap();
        assert_eq!(run_log.file_name, "triage_2023-11-14_22-13-20.log");
        assert!(run_log.path().is_file());
    }

    #[test]
    fn stale_logs_are_the_oldest_runs_beyond_the_limit() {
        let dir = tempfile::tempdir().unwrap();
        for idx in 0..12u64 {
            touch_at(&dir.path().join(format!("triage_{idx:02}.log")), 1_000 + idx);
        }
        touch_at(&dir.path().join("notes.txt"), 1);
        touch_at(&dir.path().join("other_tool.log"), 1);

        let stale = stale_logs(dir.path(), 10).unwrap();
        assert_eq!(
            stale,
            vec![dir.path().join("triage_00.log"), dir.path().join("triage_01.log")]
        );
        assert!(stale_logs(dir.path(), 12).unwrap().is_empty());
    }
}
