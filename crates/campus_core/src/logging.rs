//! Process-wide log sink for the portal core.
//!
//! # Responsibility
//! - Start the rolling `campus_portal` log files once per process.
//! - Route panics into the same sink as `event=panic_captured` lines.
//!
//! # Invariants
//! - Asking again for the active level and directory succeeds without effect.
//! - Asking for another level or directory fails with `Conflict`.
//! - Nothing here panics; every failure is a `LoggingError`.
//! - Lines carry storage keys, IDs and counts, never submitted form values.

use flexi_logger::{Cleanup, Criterion, FileSpec, Logger, LoggerHandle, Naming, WriteMode};
use log::{error, info};
use once_cell::sync::OnceCell;
use std::any::Any;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::path::{Path, PathBuf};

const LOG_BASENAME: &str = "campus_portal";
const ROTATE_AT_BYTES: u64 = 8 * 1024 * 1024;
const KEEP_ROTATED: usize = 4;
const PANIC_PAYLOAD_LIMIT: usize = 160;

/// Accepted spellings and the level each one selects.
const LEVEL_ALIASES: &[(&str, &str)] = &[
    ("trace", "trace"),
    ("debug", "debug"),
    ("info", "info"),
    ("warn", "warn"),
    ("warning", "warn"),
    ("error", "error"),
];

static ACTIVE: OnceCell<ActiveSink> = OnceCell::new();
static PANIC_HOOK: OnceCell<()> = OnceCell::new();

struct ActiveSink {
    status: LoggingStatus,
    _handle: LoggerHandle,
}

/// Level and directory of the running log sink.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoggingStatus {
    pub level: &'static str,
    pub log_dir: PathBuf,
}

impl Display for LoggingStatus {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "level `{}` at `{}`", self.level, self.log_dir.display())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoggingError {
    UnsupportedLevel(String),
    InvalidDirectory(String),
    /// The sink is already running with a different level or directory.
    Conflict {
        active: String,
        requested: String,
    },
    Backend(String),
}

impl Display for LoggingError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::UnsupportedLevel(level) => {
                let names: Vec<&str> = LEVEL_ALIASES
                    .iter()
                    .filter(|(alias, target)| alias == target)
                    .map(|(alias, _)| *alias)
                    .collect();
                write!(
                    f,
                    "unknown log level `{level}`; use one of {}",
                    names.join("|")
                )
            }
            Self::InvalidDirectory(reason) => write!(f, "log directory rejected: {reason}"),
            Self::Conflict { active, requested } => write!(
                f,
                "log sink already running with {active}; refusing to switch to {requested}"
            ),
            Self::Backend(reason) => write!(f, "log sink failed to start: {reason}"),
        }
    }
}

impl Error for LoggingError {}

/// Starts file logging under `log_dir`, which must be absolute.
///
/// # Errors
/// - `UnsupportedLevel` / `InvalidDirectory` for bad arguments.
/// - `Conflict` when a sink with other settings is already running.
/// - `Backend` when the directory or the logger cannot be set up.
pub fn init_logging(level: &str, log_dir: impl AsRef<Path>) -> Result<(), LoggingError> {
    let requested = LoggingStatus {
        level: normalize_level(level)?,
        log_dir: normalize_log_dir(log_dir.as_ref())?,
    };

    let active = ACTIVE.get_or_try_init(|| start_sink(&requested))?;
    if active.status != requested {
        return Err(LoggingError::Conflict {
            active: active.status.to_string(),
            requested: requested.to_string(),
        });
    }
    Ok(())
}

/// Settings of the running sink, `None` before `init_logging` succeeds.
pub fn logging_status() -> Option<LoggingStatus> {
    ACTIVE.get().map(|active| active.status.clone())
}

/// Level used when nothing is configured: `debug` in debug builds.
pub fn default_log_level() -> &'static str {
    if cfg!(debug_assertions) {
        "debug"
    } else {
        "info"
    }
}

/// Resolves a case-insensitive level name or alias.
pub fn normalize_level(level: &str) -> Result<&'static str, LoggingError> {
    let wanted = level.trim().to_ascii_lowercase();
    LEVEL_ALIASES
        .iter()
        .find(|(alias, _)| *alias == wanted)
        .map(|(_, level)| *level)
        .ok_or(LoggingError::UnsupportedLevel(wanted))
}

fn normalize_log_dir(log_dir: &Path) -> Result<PathBuf, LoggingError> {
    if log_dir.as_os_str().is_empty() {
        return Err(LoggingError::InvalidDirectory("path is empty".to_string()));
    }
    if log_dir.is_relative() {
        return Err(LoggingError::InvalidDirectory(format!(
            "`{}` is not absolute",
            log_dir.display()
        )));
    }
    Ok(log_dir.to_path_buf())
}

fn start_sink(status: &LoggingStatus) -> Result<ActiveSink, LoggingError> {
    std::fs::create_dir_all(&status.log_dir)
        .map_err(|err| backend(format!("create `{}`: {err}", status.log_dir.display())))?;

    let handle = Logger::try_with_str(status.level)
        .map_err(backend)?
        .log_to_file(
            FileSpec::default()
                .directory(&status.log_dir)
                .basename(LOG_BASENAME),
        )
        .rotate(
            Criterion::Size(ROTATE_AT_BYTES),
            Naming::Numbers,
            Cleanup::KeepLogFiles(KEEP_ROTATED),
        )
        .write_mode(WriteMode::BufferAndFlush)
        .append()
        .format_for_files(flexi_logger::detailed_format)
        .start()
        .map_err(backend)?;

    if PANIC_HOOK.set(()).is_ok() {
        route_panics_to_log();
    }

    info!(
        "event=logging_init module=core status=ok level={} log_dir={} core_version={}",
        status.level,
        status.log_dir.display(),
        env!("CARGO_PKG_VERSION")
    );

    Ok(ActiveSink {
        status: status.clone(),
        _handle: handle,
    })
}

fn backend(err: impl Display) -> LoggingError {
    LoggingError::Backend(err.to_string())
}

fn route_panics_to_log() {
    let previous = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |info| {
        let location = info.location().map_or_else(
            || "unknown".to_string(),
            |loc| format!("{}:{}", loc.file(), loc.line()),
        );
        error!(
            "event=panic_captured module=core status=error location={} payload={}",
            location,
            flatten(panic_payload(info.payload()), PANIC_PAYLOAD_LIMIT)
        );
        previous(info);
    }));
}

fn panic_payload(payload: &(dyn Any + Send)) -> &str {
    payload
        .downcast_ref::<&str>()
        .copied()
        .or_else(|| payload.downcast_ref::<String>().map(String::as_str))
        .unwrap_or("non-string panic payload")
}

/// Single-line, length-capped copy of `value` (panic text may echo input).
fn flatten(value: &str, max_chars: usize) -> String {
    let mut out: String = value
        .chars()
        .map(|c| if c == '\n' || c == '\r' { ' ' } else { c })
        .take(max_chars)
        .collect();
    if value.chars().nth(max_chars).is_some() {
        out.push_str("...");
    }
    out
}
