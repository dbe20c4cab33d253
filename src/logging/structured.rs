//! Subscriber setup
//!
//! Human-readable events go to stderr so anonymized text on stdout stays
//! clean. With `[logging] local_enabled` a second layer writes JSON lines to
//! `<local_path>/scrubber.log` through a non-blocking rolling appender.
//!
//! ```no_run
//! use scrubber::config::LoggingConfig;
//! use scrubber::logging::init_logging;
//!
//! let _guard = init_logging("info", &LoggingConfig::default()).expect("logging");
//! ```

use crate::config::LoggingConfig;
use crate::domain::{Result, ScrubberError};
use tracing::Level;
use tracing_appender::non_blocking::{NonBlocking, WorkerGuard};
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{fmt, EnvFilter, Layer, Registry};

/// Name of the active log file inside `local_path`
pub const LOG_FILE_NAME: &str = "scrubber.log";

type BoxedLayer = Box<dyn Layer<Registry> + Send + Sync>;

/// Flushes the file writer when dropped; keep it alive until exit
pub struct LoggingGuard {
    _file_guard: Option<WorkerGuard>,
}

/// Install the global subscriber
///
/// `RUST_LOG`, when set, overrides `level`.
///
/// # Errors
///
/// [`ScrubberError::Configuration`] for an unknown level, a log directory
/// that cannot be created, or a second installation in one process.
pub fn init_logging(level: &str, config: &LoggingConfig) -> Result<LoggingGuard> {
    let filter = env_filter(parse_log_level(level)?);

    let mut layers: Vec<BoxedLayer> = vec![fmt::layer()
        .with_target(true)
        .with_writer(std::io::stderr)
        .with_filter(filter.clone())
        .boxed()];

    let file_guard = if config.local_enabled {
        let (writer, guard) = file_writer(config)?;
        layers.push(
            fmt::layer()
                .json()
                .with_target(true)
                .with_thread_ids(true)
                .with_writer(writer)
                .with_filter(filter)
                .boxed(),
        );
        Some(guard)
    } else {
        None
    };

    tracing_subscriber::registry()
        .with(layers)
        .try_init()
        .map_err(|e| ScrubberError::Configuration(format!("Logging already initialized: {e}")))?;

    tracing::debug!(
        file = config.local_enabled,
        rotation = %config.local_rotation,
        "Logging initialized"
    );
    Ok(LoggingGuard {
        _file_guard: file_guard,
    })
}

fn env_filter(level: Level) -> EnvFilter {
    EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("{}={level}", env!("CARGO_CRATE_NAME"))))
}

/// Rolling JSON writer under `config.local_path`, creating the directory
fn file_writer(config: &LoggingConfig) -> Result<(NonBlocking, WorkerGuard)> {
    std::fs::create_dir_all(&config.local_path).map_err(|e| {
        ScrubberError::Configuration(format!(
            "Cannot create log directory {}: {e}",
            config.local_path
        ))
    })?;
    let appender = RollingFileAppender::new(
        rotation_for(&config.local_rotation),
        &config.local_path,
        LOG_FILE_NAME,
    );
    Ok(tracing_appender::non_blocking(appender))
}

/// Unknown names fall back to daily; the config schema rejects them earlier
fn rotation_for(name: &str) -> Rotation {
    match name {
        "hourly" => Rotation::HOURLY,
        "never" => Rotation::NEVER,
        _ => Rotation::DAILY,
    }
}

/// Parse a level name, case-insensitively
pub fn parse_log_level(name: &str) -> Result<Level> {
    name.parse::<Level>().map_err(|_| {
        ScrubberError::Configuration(format!(
            "Invalid log level: {name}. Must be one of: trace, debug, info, warn, error"
        ))
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;
    use test_case::test_case;

    #[test_case("trace", Level::TRACE)]
    #[test_case("Debug", Level::DEBUG)]
    #[test_case("INFO", Level::INFO)]
    #[test_case("warn", Level::WARN)]
    #[test_case("error", Level::ERROR)]
    fn test_parse_log_level(name: &str, expected: Level) {
        assert_eq!(parse_log_level(name).unwrap(), expected);
    }

    #[test_case("" ; "empty")]
    #[test_case("chatty" ; "unknown")]
    fn test_parse_log_level_rejects(name: &str) {
        assert!(matches!(
            parse_log_level(name),
            Err(ScrubberError::Configuration(_))
        ));
    }

    #[test]
    fn test_rotation_names() {
        assert_eq!(rotation_for("hourly"), Rotation::HOURLY);
        assert_eq!(rotation_for("never"), Rotation::NEVER);
        assert_eq!(rotation_for("daily"), Rotation::DAILY);
    }

    #[test]
    fn test_file_writer_creates_directory() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("nested").join("logs");
        let config = LoggingConfig {
            local_enabled: true,
            local_path: path.to_string_lossy().to_string(),
            local_rotation: "never".to_string(),
        };

        let (_writer, guard) = file_writer(&config).unwrap();
        drop(guard);
        assert!(path.is_dir());
    }
}
