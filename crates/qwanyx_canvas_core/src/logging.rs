//! Canvas logging bootstrap.
//!
//! # Responsibility
//! - Start one rolling file logger per process for the canvas core.
//! - Record the gesture tuning each canvas session runs with.
//!
//! # Invariants
//! - A repeated `init_logging` succeeds only for the same level and directory.
//! - Card bodies never reach the log; events carry ids, counts and phases.
//! - Panic payloads are cut to their first line before they are logged.

use crate::config::CanvasConfig;
use flexi_logger::{Cleanup, Criterion, FileSpec, Logger, LoggerHandle, Naming, WriteMode};
use log::{error, info, LevelFilter};
use once_cell::sync::OnceCell;
use std::any::Any;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::path::{Path, PathBuf};
use std::str::FromStr;

const LOG_FILE_BASENAME: &str = "qwanyx_canvas";
const MAX_LOG_FILE_SIZE_BYTES: u64 = 4 * 1024 * 1024;
const MAX_LOG_FILES: usize = 3;
const MAX_PANIC_SUMMARY_CHARS: usize = 120;

static ACTIVE: OnceCell<ActiveLogger> = OnceCell::new();

struct ActiveLogger {
    level: LevelFilter,
    log_dir: PathBuf,
    _handle: LoggerHandle,
}

/// Reasons the canvas logger could not be started.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoggingError {
    /// Level is not one of `trace|debug|info|warn|error`.
    UnknownLevel(String),
    /// Directory is blank or relative.
    InvalidDir(String),
    /// Directory could not be created.
    CreateDir { dir: PathBuf, reason: String },
    /// flexi_logger refused the spec or failed to open the file.
    Backend(String),
    /// Logger already runs with another level or directory.
    Conflict { active: String, requested: String },
}

impl Display for LoggingError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::UnknownLevel(raw) => write!(
                f,
                "unsupported log level `{raw}`; expected trace|debug|info|warn|error"
            ),
            Self::InvalidDir(raw) => write!(f, "log_dir must be an absolute path, got `{raw}`"),
            Self::CreateDir { dir, reason } => write!(
                f,
                "failed to create log directory `{}`: {reason}",
                dir.display()
            ),
            Self::Backend(reason) => write!(f, "failed to start canvas logger: {reason}"),
            Self::Conflict { active, requested } => write!(
                f,
                "canvas logging already runs as {active}; refusing to switch to {requested}"
            ),
        }
    }
}

impl Error for LoggingError {}

/// Starts file logging for the canvas core.
///
/// # Errors
/// - `UnknownLevel` / `InvalidDir` for malformed input.
/// - `Conflict` when a logger is already running with other settings.
/// - `CreateDir` / `Backend` when the log file cannot be opened.
pub fn init_logging(level: &str, log_dir: &str) -> Result<(), LoggingError> {
    let level = parse_level(level)?;
    let log_dir = parse_log_dir(log_dir)?;
    let active = ACTIVE.get_or_try_init(|| start(level, &log_dir))?;
    ensure_same_target((active.level, &active.log_dir), (level, &log_dir))
}

/// Level and directory of the running logger, if any.
pub fn logging_status() -> Option<(LevelFilter, PathBuf)> {
    ACTIVE
        .get()
        .map(|active| (active.level, active.log_dir.clone()))
}

/// Records the gesture tuning a canvas session was created with.
pub(crate) fn log_canvas_config(config: &CanvasConfig) {
    info!(
        "event=canvas_config module=canvas status=ok card_press_ms={} column_press_ms={} merge_hold_ms={} move_threshold_px={} pan_factor={} inertia_decay={}",
        config.card_press_ms,
        config.column_press_ms,
        config.merge_hold_ms,
        config.move_threshold_px,
        config.pan_factor,
        config.inertia_decay
    );
}

fn start(level: LevelFilter, log_dir: &Path) -> Result<ActiveLogger, LoggingError> {
    std::fs::create_dir_all(log_dir).map_err(|err| LoggingError::CreateDir {
        dir: log_dir.to_path_buf(),
        reason: err.to_string(),
    })?;

    let spec = level.to_string().to_ascii_lowercase();
    let handle = Logger::try_with_str(spec.as_str())
        .map_err(|err| LoggingError::Backend(err.to_string()))?
        .log_to_file(
            FileSpec::default()
                .directory(log_dir)
                .basename(LOG_FILE_BASENAME),
        )
        .rotate(
            Criterion::Size(MAX_LOG_FILE_SIZE_BYTES),
            Naming::Numbers,
            Cleanup::KeepLogFiles(MAX_LOG_FILES),
        )
        .write_mode(WriteMode::BufferAndFlush)
        .append()
        .format_for_files(flexi_logger::detailed_format)
        .start()
        .map_err(|err| LoggingError::Backend(err.to_string()))?;

    install_panic_hook();
    info!(
        "event=canvas_start module=canvas status=ok platform={} version={} level={spec} log_dir={}",
        std::env::consts::OS,
        env!("CARGO_PKG_VERSION"),
        log_dir.display()
    );

    Ok(ActiveLogger {
        level,
        log_dir: log_dir.to_path_buf(),
        _handle: handle,
    })
}

fn parse_level(raw: &str) -> Result<LevelFilter, LoggingError> {
    match LevelFilter::from_str(raw.trim()) {
        Ok(LevelFilter::Off) | Err(_) => Err(LoggingError::UnknownLevel(raw.trim().to_string())),
        Ok(level) => Ok(level),
    }
}

fn parse_log_dir(raw: &str) -> Result<PathBuf, LoggingError> {
    let trimmed = raw.trim();
    let path = Path::new(trimmed);
    if trimmed.is_empty() || !path.is_absolute() {
        return Err(LoggingError::InvalidDir(trimmed.to_string()));
    }
    Ok(path.to_path_buf())
}

fn ensure_same_target(
    active: (LevelFilter, &Path),
    requested: (LevelFilter, &Path),
) -> Result<(), LoggingError> {
    if active == requested {
        return Ok(());
    }
    let describe = |(level, dir): (LevelFilter, &Path)| format!("`{level}` at `{}`", dir.display());
    Err(LoggingError::Conflict {
        active: describe(active),
        requested: describe(requested),
    })
}

fn install_panic_hook() {
    let previous_hook = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |panic_info| {
        let location = panic_info
            .location()
            .map(|loc| format!("{}:{}", loc.file(), loc.line()))
            .unwrap_or_else(|| "unknown".to_string());
        error!(
            "event=panic_captured module=canvas status=error location={location} summary={}",
            panic_summary(panic_info.payload())
        );
        previous_hook(panic_info);
    }));
}

/// First payload line, capped; later lines may hold card text.
fn panic_summary(payload: &(dyn Any + Send)) -> String {
    let message = payload
        .downcast_ref::<&str>()
        .copied()
        .or_else(|| payload.downcast_ref::<String>().map(String::as_str))
        .unwrap_or("non-string panic payload");
    let first_line = message.lines().next().unwrap_or_default();
    let mut summary = first_line
        .chars()
        .take(MAX_PANIC_SUMMARY_CHARS)
        .collect::<String>();
    if summary.len() < message.len() {
        summary.push_str("...");
    }
    summary
}

#[cfg(test)]
mod tests {
    use super::{
        ensure_same_target, init_logging, logging_status, panic_summary, parse_level,
        parse_log_dir, LoggingError,
    };
    use log::LevelFilter;
    use std::path::Path;

    #[test]
    fn levels_parse_case_insensitively_and_reject_off() {
        assert_eq!(parse_level(" INFO "), Ok(LevelFilter::Info));
        assert_eq!(parse_level("warn"), Ok(LevelFilter::Warn));
        assert_eq!(
            parse_level("off"),
            Err(LoggingError::UnknownLevel("off".to_string()))
        );
        assert!(parse_level("verbose")
            .unwrap_err()
            .to_string()
            .contains("trace|debug|info|warn|error"));
    }

    #[test]
    fn log_dir_must_be_absolute() {
        assert!(matches!(
            parse_log_dir("logs/canvas"),
            Err(LoggingError::InvalidDir(_))
        ));
        assert!(matches!(parse_log_dir("  "), Err(LoggingError::InvalidDir(_))));
    }

    #[test]
    fn conflicting_targets_name_both_sides() {
        let dir = Path::new("/var/log/canvas");
        assert!(ensure_same_target((LevelFilter::Info, dir), (LevelFilter::Info, dir)).is_ok());

        let err = ensure_same_target(
            (LevelFilter::Info, dir),
            (LevelFilter::Debug, Path::new("/tmp/other")),
        )
        .unwrap_err();
        let message = err.to_string();
        assert!(message.contains("/var/log/canvas"));
        assert!(message.contains("/tmp/other"));
        assert!(message.contains("refusing to switch"));
    }

    #[test]
    fn panic_summary_drops_card_text_after_first_line() {
        let payload: Box<dyn std::any::Any + Send> =
            Box::new(String::from("body rejected\n{\"ops\":[{\"insert\":\"secret\"}]}"));
        let summary = panic_summary(payload.as_ref());
        assert_eq!(summary, "body rejected...");

        let payload: Box<dyn std::any::Any + Send> = Box::new("short");
        assert_eq!(panic_summary(payload.as_ref()), "short");
    }

    #[test]
    fn init_logging_is_idempotent_and_rejects_other_targets() {
        let dir = tempfile::tempdir().unwrap();
        let log_dir = dir.path().join("logs");
        let log_dir_str = log_dir.to_str().unwrap().to_string();
        let other = dir.path().join("other");

        init_logging("info", &log_dir_str).unwrap();
        init_logging("INFO", &log_dir_str).unwrap();

        assert!(matches!(
            init_logging("debug", &log_dir_str),
            Err(LoggingError::Conflict { .. })
        ));
        assert!(matches!(
            init_logging("info", other.to_str().unwrap()),
            Err(LoggingError::Conflict { .. })
        ));
        assert_eq!(logging_status(), Some((LevelFilter::Info, log_dir)));
    }
}
