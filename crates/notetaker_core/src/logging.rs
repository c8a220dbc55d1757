//! Process logger for the CLI.
//!
//! # Responsibility
//! - Resolve where diagnostics go from `AppConfig` and start `flexi_logger`
//!   once per process.
//! - Keep log records metadata-only: note ids and sizes, never note text.
//!
//! # Invariants
//! - A process always gets a logger: rolling files when a log directory is
//!   configured, otherwise stderr at `warn` so controller failures stay
//!   visible.
//! - A second init with the same settings is a no-op; different settings
//!   are rejected.
//! - Initialization never panics.

use crate::config::AppConfig;
use flexi_logger::{
    Cleanup, Criterion, FileSpec, FlexiLoggerError, Logger, LoggerHandle, Naming, WriteMode,
};
use log::{error, info};
use once_cell::sync::OnceCell;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::path::PathBuf;

const LOG_FILE_BASENAME: &str = "notetaker";
const MAX_LOG_FILE_SIZE_BYTES: u64 = 10 * 1024 * 1024;
const MAX_LOG_FILES: usize = 5;
const MAX_PANIC_PAYLOAD_CHARS: usize = 160;
/// Stderr shares the terminal with the shell prompt, so it only carries
/// failures unless a level is configured.
const STDERR_DEFAULT_LEVEL: &str = "warn";

static ACTIVE: OnceCell<ActiveLogger> = OnceCell::new();

struct ActiveLogger {
    settings: LogSettings,
    _handle: LoggerHandle,
}

/// Where log records are written.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LogTarget {
    Stderr,
    /// Rolling `notetaker_*.log` files in this absolute directory.
    Files(PathBuf),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogSettings {
    pub level: &'static str,
    pub target: LogTarget,
}

impl LogSettings {
    /// Derives settings from configuration.
    ///
    /// Without `log_dir` the target is stderr and the level defaults to
    /// `warn`; with it, files at the build-mode default level.
    pub fn from_config(config: &AppConfig) -> Result<Self, LoggingError> {
        let target = match &config.log_dir {
            None => LogTarget::Stderr,
            Some(dir) if dir.is_absolute() => LogTarget::Files(dir.clone()),
            Some(dir) => return Err(LoggingError::RelativeDir(dir.clone())),
        };
        let level = match (config.log_level.as_deref(), &target) {
            (Some(level), _) => normalize_level(level)?,
            (None, LogTarget::Stderr) => STDERR_DEFAULT_LEVEL,
            (None, LogTarget::Files(_)) => default_log_level(),
        };
        Ok(Self { level, target })
    }
}

#[derive(Debug)]
pub enum LoggingError {
    InvalidLevel(String),
    RelativeDir(PathBuf),
    CreateDir {
        dir: PathBuf,
        source: std::io::Error,
    },
    Backend(FlexiLoggerError),
    /// A logger with other settings already runs in this process.
    AlreadyActive {
        active: LogSettings,
        requested: LogSettings,
    },
}

impl Display for LoggingError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidLevel(level) => write!(
                f,
                "unsupported log level `{level}`; expected trace|debug|info|warn|error"
            ),
            Self::RelativeDir(dir) => {
                write!(f, "log dir must be an absolute path, got `{}`", dir.display())
            }
            Self::CreateDir { dir, source } => {
                write!(f, "failed to create log dir `{}`: {source}", dir.display())
            }
            Self::Backend(err) => write!(f, "failed to start logger: {err}"),
            Self::AlreadyActive { active, requested } => write!(
                f,
                "logging already runs as {active:?}; refusing to switch to {requested:?}"
            ),
        }
    }
}

impl Error for LoggingError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::CreateDir { source, .. } => Some(source),
            Self::Backend(err) => Some(err),
            _ => None,
        }
    }
}

/// Starts the process logger described by `config`.
///
/// Returns the settings that are now active.
pub fn init_logging_from_config(config: &AppConfig) -> Result<LogSettings, LoggingError> {
    let settings = LogSettings::from_config(config)?;
    init_logging(&settings)?;
    Ok(settings)
}

/// Starts the process logger, or confirms it already runs with `settings`.
///
/// # Errors
/// - `AlreadyActive` when an earlier call started different settings.
/// - `CreateDir` / `Backend` when the logger cannot start.
pub fn init_logging(settings: &LogSettings) -> Result<(), LoggingError> {
    let active = ACTIVE.get_or_try_init(|| {
        let handle = start_logger(settings)?;
        install_panic_hook();
        info!(
            "event=app_start module=logging status=ok platform={} build_mode={} version={}",
            std::env::consts::OS,
            build_mode(),
            env!("CARGO_PKG_VERSION")
        );
        info!(
            "event=logging_init module=logging status=ok level={} target={:?}",
            settings.level, settings.target
        );
        Ok::<_, LoggingError>(ActiveLogger {
            settings: settings.clone(),
            _handle: handle,
        })
    })?;

    if active.settings != *settings {
        return Err(LoggingError::AlreadyActive {
            active: active.settings.clone(),
            requested: settings.clone(),
        });
    }
    Ok(())
}

/// Returns the default file log level for the current build mode.
pub fn default_log_level() -> &'static str {
    if cfg!(debug_assertions) {
        "debug"
    } else {
        "info"
    }
}

fn start_logger(settings: &LogSettings) -> Result<LoggerHandle, LoggingError> {
    let logger = Logger::try_with_str(settings.level).map_err(LoggingError::Backend)?;
    let logger = match &settings.target {
        LogTarget::Stderr => logger
            .log_to_stderr()
            .format_for_stderr(flexi_logger::default_format),
        LogTarget::Files(dir) => {
            std::fs::create_dir_all(dir).map_err(|source| LoggingError::CreateDir {
                dir: dir.clone(),
                source,
            })?;
            logger
                .log_to_file(
                    FileSpec::default()
                        .directory(dir.as_path())
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
        }
    };
    logger.start().map_err(LoggingError::Backend)
}

fn normalize_level(level: &str) -> Result<&'static str, LoggingError> {
    match level.trim().to_ascii_lowercase().as_str() {
        "trace" => Ok("trace"),
        "debug" => Ok("debug"),
        "info" => Ok("info"),
        "warn" | "warning" => Ok("warn"),
        "error" => Ok("error"),
        _ => Err(LoggingError::InvalidLevel(level.trim().to_string())),
    }
}

fn build_mode() -> &'static str {
    if cfg!(debug_assertions) {
        "debug"
    } else {
        "release"
    }
}

fn install_panic_hook() {
    let previous_hook = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |panic_info| {
        // Payload may echo note text.
        let location = panic_info
            .location()
            .map(|loc| format!("{}:{}", loc.file(), loc.line()))
            .unwrap_or_else(|| "unknown".to_string());
        let payload = panic_info
            .payload()
            .downcast_ref::<&str>()
            .map(|message| (*message).to_string())
            .or_else(|| panic_info.payload().downcast_ref::<String>().cloned())
            .unwrap_or_else(|| "non-string panic payload".to_string());
        error!(
            "event=panic_captured module=logging status=error location={location} payload={}",
            one_line(&payload, MAX_PANIC_PAYLOAD_CHARS)
        );
        previous_hook(panic_info);
    }));
}

fn one_line(value: &str, max_chars: usize) -> String {
    let mut line: String = value
        .chars()
        .map(|c| if c == '\n' || c == '\r' { ' ' } else { c })
        .take(max_chars)
        .collect();
    if value.chars().count() > max_chars {
        line.push_str("...");
    }
    line
}
