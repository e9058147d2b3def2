//! Tracing setup for the desktop app and the CLI.
//!
//! The desktop app logs to stdout and to one file per launch under
//! `.fivedash/logs`, keeping the newest [`KEEP_LOG_FILES`]. The CLI logs to
//! stderr only so command output on stdout stays parseable.
//!
//! `FIVEDASH_LOG` takes an `EnvFilter` directive and wins over `RUST_LOG`.

use std::{
    fs,
    path::{Path, PathBuf},
    sync::OnceLock,
    time::SystemTime,
};

use time::{OffsetDateTime, UtcOffset, format_description::FormatItem, macros::format_description};
use tracing_appender::{non_blocking::WorkerGuard, rolling};
use tracing_subscriber::{EnvFilter, Registry, fmt, prelude::*};

use crate::app_dirs::{self, AppDirError};

/// Launch logs kept in the logs directory.
pub const KEEP_LOG_FILES: usize = 10;
/// Filter directive override, checked before `RUST_LOG`.
pub const LOG_FILTER_ENV: &str = "FIVEDASH_LOG";

const LOG_FILE_PREFIX: &str = "fivedash";
const LOG_FILE_EXTENSION: &str = "log";

static INSTALLED: OnceLock<Option<WorkerGuard>> = OnceLock::new();

/// Where log lines go.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LogTarget {
    /// stdout plus a per-launch file.
    Desktop,
    /// stderr only.
    Cli,
}

impl LogTarget {
    fn default_directive(self) -> &'static str {
        match self {
            // ureq logs every pooled connection at info.
            Self::Desktop => "info,ureq=warn",
            Self::Cli => "warn",
        }
    }
}

/// Errors that may occur while initializing logging.
#[derive(Debug, thiserror::Error)]
pub enum LoggingError {
    #[error("No suitable data directory available for logs")]
    NoDataDir,
    #[error("Failed to prepare log directory {path}: {source}")]
    LogDir {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("Failed to prune old logs in {path}: {source}")]
    Prune {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("Failed to format log file timestamp: {0}")]
    Timestamp(#[from] time::error::Format),
    #[error("Failed to install global tracing subscriber: {0}")]
    SetGlobal(#[from] tracing::subscriber::SetGlobalDefaultError),
}

impl From<AppDirError> for LoggingError {
    fn from(error: AppDirError) -> Self {
        match error {
            AppDirError::NoBaseDir => Self::NoDataDir,
            AppDirError::CreateDir { path, source } => Self::LogDir { path, source },
        }
    }
}

/// Desktop logging. Later calls, from either entry point, are no-ops.
pub fn init() -> Result<(), LoggingError> {
    install(LogTarget::Desktop)
}

/// CLI logging: stderr only, `warn` unless a filter env var says otherwise.
pub fn init_stderr() -> Result<(), LoggingError> {
    install(LogTarget::Cli)
}

/// Install the global subscriber for `target`.
pub fn install(target: LogTarget) -> Result<(), LoggingError> {
    if INSTALLED.get().is_some() {
        return Ok(());
    }
    let filter = env_filter(target);
    let timer = display_timer();
    let guard = match target {
        LogTarget::Cli => {
            let stderr_layer = fmt::layer()
                .with_timer(timer)
                .with_target(false)
                .with_writer(std::io::stderr);
            tracing::subscriber::set_global_default(
                Registry::default().with(filter).with(stderr_layer),
            )?;
            None
        }
        LogTarget::Desktop => {
            let dir = app_dirs::logs_dir()?;
            let file_name = launch_log_name(now_local_or_utc())?;
            prune_launch_logs(&dir, KEEP_LOG_FILES.saturating_sub(1))?;
            let (file_writer, guard) =
                tracing_appender::non_blocking(rolling::never(&dir, &file_name));
            let stdout_layer = fmt::layer()
                .with_timer(timer.clone())
                .with_writer(std::io::stdout);
            let file_layer = fmt::layer()
                .with_ansi(false)
                .with_timer(timer)
                .with_writer(file_writer);
            tracing::subscriber::set_global_default(
                Registry::default()
                    .with(filter)
                    .with(stdout_layer)
                    .with(file_layer),
            )?;
            tracing::info!("Logging to {}", dir.join(&file_name).display());
            Some(guard)
        }
    };
    let _ = INSTALLED.set(guard);
    Ok(())
}

fn env_filter(target: LogTarget) -> EnvFilter {
    std::env::var(LOG_FILTER_ENV)
        .ok()
        .and_then(|directive| EnvFilter::try_new(directive).ok())
        .or_else(|| EnvFilter::try_from_default_env().ok())
        .unwrap_or_else(|| EnvFilter::new(target.default_directive()))
}

/// `fivedash-20231114-221320.log`
fn launch_log_name(now: OffsetDateTime) -> Result<String, LoggingError> {
    const NAME_FORMAT: &[FormatItem<'_>] =
        format_description!("[year][month][day]-[hour][minute][second]");
    Ok(format!(
        "{LOG_FILE_PREFIX}-{}.{LOG_FILE_EXTENSION}",
        now.format(NAME_FORMAT)?
    ))
}

/// Launch logs in `dir`, oldest first.
fn launch_logs(dir: &Path) -> std::io::Result<Vec<PathBuf>> {
    let mut logs: Vec<(SystemTime, PathBuf)> = fs::read_dir(dir)?
        .filter_map(Result::ok)
        .filter(|entry| entry.file_type().is_ok_and(|kind| kind.is_file()))
        .map(|entry| entry.path())
        .filter(|path| is_launch_log(path))
        .map(|path| {
            let modified = fs::metadata(&path)
                .and_then(|meta| meta.modified())
                .unwrap_or(SystemTime::UNIX_EPOCH);
            (modified, path)
        })
        .collect();
    logs.sort();
    Ok(logs.into_iter().map(|(_, path)| path).collect())
}

fn is_launch_log(path: &Path) -> bool {
    let has_extension = path.extension().and_then(|ext| ext.to_str()) == Some(LOG_FILE_EXTENSION);
    let has_prefix = path
        .file_name()
        .and_then(|name| name.to_str())
        .is_some_and(|name| name.starts_with(LOG_FILE_PREFIX));
    has_extension && has_prefix
}

/// Delete the oldest launch logs until at most `keep` remain.
fn prune_launch_logs(dir: &Path, keep: usize) -> Result<(), LoggingError> {
    let prune_err = |source| LoggingError::Prune {
        path: dir.to_path_buf(),
        source,
    };
    let logs = launch_logs(dir).map_err(prune_err)?;
    let excess = logs.len().saturating_sub(keep);
    for path in &logs[..excess] {
        fs::remove_file(path).map_err(prune_err)?;
    }
    Ok(())
}

fn display_timer() -> fmt::time::OffsetTime<time::format_description::BorrowedFormatItem<'static>>
{
    const DISPLAY_FORMAT: &[FormatItem<'static>] =
        format_description!("[year]-[month]-[day] [hour]:[minute]:[second]");
    let offset = UtcOffset::current_local_offset().unwrap_or(UtcOffset::UTC);
    fmt::time::OffsetTime::new(offset, DISPLAY_FORMAT.into())
}

fn now_local_or_utc() -> OffsetDateTime {
    OffsetDateTime::now_local().unwrap_or_else(|_| OffsetDateTime::now_utc())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::{thread, time::Duration};
    use tempfile::tempdir;

    #[test]
    fn launch_log_name_is_sortable_timestamp() {
        let fixed = OffsetDateTime::from_unix_timestamp(1_700_000_000).unwrap();
        assert_eq!(
            launch_log_name(fixed).unwrap(),
            "fivedash-20231114-221320.log"
        );
    }

    #[test]
    fn prune_keeps_newest_launch_logs_only() {
        let dir = tempdir().unwrap();
        for idx in 0..5 {
            fs::write(dir.path().join(format!("fivedash-{idx}.log")), b"").unwrap();
            thread::sleep(Duration::from_millis(10));
        }
        fs::write(dir.path().join("other.log"), b"keep").unwrap();
        fs::write(dir.path().join("fivedash-notes.txt"), b"keep").unwrap();

        prune_launch_logs(dir.path(), 3).unwrap();
        let remaining = launch_logs(dir.path()).unwrap();
        assert_eq!(remaining.len(), 3);
        assert!(!dir.path().join("fivedash-0.log").exists());
        assert!(!dir.path().join("fivedash-1.log").exists());
        assert!(dir.path().join("fivedash-4.log").exists());
        assert!(dir.path().join("other.log").exists());
        assert!(dir.path().join("fivedash-notes.txt").exists());
    }

    #[test]
    fn cli_defaults_to_warnings() {
        assert_eq!(LogTarget::Cli.default_directive(), "warn");
        assert!(LogTarget::Desktop.default_directive().starts_with("info"));
    }
}
