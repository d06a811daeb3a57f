use anyhow::{Context, Result};
use std::path::{Path, PathBuf};
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::{EnvFilter, Layer, fmt, layer::SubscriberExt, util::SubscriberInitExt};

/// Configuration for the logging system
#[derive(Debug, Clone)]
pub struct LogConfig {
    /// File the log is appended to
    pub log_file: PathBuf,
}

impl LogConfig {
    pub fn new(log_file: impl Into<PathBuf>) -> Self {
        Self {
            log_file: log_file.into(),
        }
    }
}

/// Splits `log_file` into the directory and file name the appender expects.
fn appender_parts(log_file: &Path) -> Result<(PathBuf, String)> {
    let file_name = log_file
        .file_name()
        .and_then(|name| name.to_str())
        .context("Log file path has no file name")?
        .to_string();
    let directory = log_file
        .parent()
        .filter(|parent| !parent.as_os_str().is_empty())
        .map(Path::to_path_buf)
        .unwrap_or_else(|| PathBuf::from("."));
    Ok((directory, file_name))
}

/// Initialize logging to the configured file.
///
/// Every line carries a timestamp and the component target:
/// - `dll` - class object requests from the shell
/// - `config` - configuration loading
/// - `shellext::registration` - class id to type resolution
/// - `shellext::context_menu` - factory and command lifecycle, invocations
/// - `shellext::launcher` - process launches and failures
///
/// The level is taken from `RUST_LOG` and defaults to `debug`. The file is
/// written synchronously so nothing is lost when the host unloads the module.
pub fn init_logging(config: &LogConfig) -> Result<()> {
    let (directory, file_name) = appender_parts(&config.log_file)?;

    // Rotation::NEVER keeps appending to exactly `file_name`.
    let file_appender = RollingFileAppender::builder()
        .rotation(Rotation::NEVER)
        .filename_prefix(file_name)
        .build(&directory)
        .context("Failed to open log file")?;

    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("debug"));

    let file_layer = fmt::layer()
        .with_writer(file_appender)
        .with_ansi(false)
        .with_target(true)
        .with_thread_ids(true)
        .with_filter(env_filter);

    tracing_subscriber::registry()
        .with(file_layer)
        .try_init()
        .context("Failed to install log subscriber")?;

    tracing::info!(
        target: "dll",
        session = %chrono::Local::now().format("%F %T"),
        log_file = %config.log_file.display(),
        "Logging system initialized"
    );

    Ok(())
}
