//! Logging initialization and log file management.
//!
//! Every command writes a JSON log to
//! `.devarch/logs/<command>/<YYYYMMDD_HHMMSS>.log`. Commands that own the
//! terminal screen (the TUI) log to that file only; the others also log
//! human-readable lines to stderr.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::{Duration, SystemTime, UNIX_EPOCH};

use anyhow::{Context, Result};
use tracing_appender::non_blocking::{NonBlocking, WorkerGuard};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, Layer};

/// Log files older than this are removed at startup.
const LOG_RETENTION: Duration = Duration::from_secs(3 * 24 * 60 * 60);

/// Filter for the file layer when `RUST_LOG` is unset.
const DEFAULT_FILE_FILTER: &str = "info";

/// Initialize tracing for `command`.
///
/// Returns the [`WorkerGuard`] of the file writer; hold it until exit so
/// buffered lines are flushed.
///
/// # Errors
///
/// Returns an error if the log directory or file cannot be created.
pub fn init_tracing(work_dir: &Path, command: &str, to_stderr: bool) -> Result<WorkerGuard> {
    let (writer, guard) = open_log_writer(work_dir, command)?;

    let stderr_layer = to_stderr.then(|| {
        tracing_subscriber::fmt::layer()
            .with_writer(std::io::stderr)
            .with_filter(EnvFilter::from_default_env())
    });

    let file_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILE_FILTER));
    let file_layer = tracing_subscriber::fmt::layer()
        .json()
        .with_writer(writer)
        .with_filter(file_filter);

    tracing_subscriber::registry()
        .with(stderr_layer)
        .with(file_layer)
        .init();

    Ok(guard)
}

fn logs_root(work_dir: &Path) -> PathBuf {
    work_dir.join(".devarch").join("logs")
}

/// Create `.devarch/logs/<command>/` and a timestamped file inside it.
fn open_log_writer(work_dir: &Path, command: &str) -> Result<(NonBlocking, WorkerGuard)> {
    let dir = logs_root(work_dir).join(command);
    fs::create_dir_all(&dir)
        .with_context(|| format!("failed to create log directory: {}", dir.display()))?;

    let path = dir.join(format!("{}.log", utc_stamp(SystemTime::now())));
    let file = fs::File::create(&path)
        .with_context(|| format!("failed to create log file: {}", path.display()))?;

    Ok(tracing_appender::non_blocking(file))
}

/// Delete `.log` files past retention under `.devarch/logs/`, then any
/// directories left empty.
///
/// Runs before tracing is initialized, so problems are reported with
/// `eprintln!` and never abort startup.
pub fn cleanup_old_logs(work_dir: &Path) {
    let root = logs_root(work_dir);
    if !root.is_dir() {
        return;
    }
    let cutoff = SystemTime::now() - LOG_RETENTION;
    prune(&root, cutoff);
}

/// Returns true when `dir` is empty after pruning.
fn prune(dir: &Path, cutoff: SystemTime) -> bool {
    let entries = match fs::read_dir(dir) {
        Ok(entries) => entries,
        Err(e) => {
            eprintln!("warning: cannot read log directory {}: {e}", dir.display());
            return false;
        }
    };

    let mut empty = true;
    for entry in entries.flatten() {
        let path = entry.path();

        if path.is_dir() {
            if prune(&path, cutoff) {
                let _ = fs::remove_dir(&path);
            } else {
                empty = false;
            }
            continue;
        }

        let expired = path.extension().and_then(|e| e.to_str()) == Some("log")
            && fs::metadata(&path)
                .and_then(|m| m.modified())
                .is_ok_and(|modified| modified < cutoff);

        if !expired {
            empty = false;
            continue;
        }
        if let Err(e) = fs::remove_file(&path) {
            eprintln!("warning: cannot remove old log {}: {e}", path.display());
            empty = false;
        }
    }
    empty
}

/// `YYYYMMDD_HHMMSS` in UTC.
fn utc_stamp(time: SystemTime) -> String {
    let secs = time.duration_since(UNIX_EPOCH).unwrap_or_default().as_secs();
    let (year, month, day) = civil_date(secs / 86_400);
    let rem = secs % 86_400;
    format!(
        "{year:04}{month:02}{day:02}_{:02}{:02}{:02}",
        rem / 3600,
        rem % 3600 / 60,
        rem % 60
    )
}

/// Gregorian (year, month, day) for a count of days since 1970-01-01.
///
/// Howard Hinnant's `civil_from_days`, restricted to dates after the epoch.
fn civil_date(days: u64) -> (u64, u64, u64) {
    let shifted = days + 719_468;
    let era = shifted / 146_097;
    let day_of_era = shifted % 146_097;
    let year_of_era =
        (day_of_era - day_of_era / 1460 + day_of_era / 36_524 - day_of_era / 146_096) / 365;
    let day_of_year = day_of_era - (365 * year_of_era + year_of_era / 4 - year_of_era / 100);
    let month_index = (5 * day_of_year + 2) / 153;
    let day = day_of_year - (153 * month_index + 2) / 5 + 1;
    let month = if month_index < 10 {
        month_index + 3
    } else {
        month_index - 9
    };
    let year = year_of_era + era * 400 + u64::from(month <= 2);
    (year, month, day)
}
