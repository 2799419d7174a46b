//! Tracing setup shared by the binary and integration tests.
//!
//! Events go to a daily rolling file so the terminal stays free for the UI.
//! Call [`init_logging`] once near process start; later calls are no-ops that
//! hand back the path resolved by the first call.

use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::sync::OnceLock;

use anyhow::Context;
use chrono::Utc;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::{
    fmt::{self, MakeWriter},
    layer::{Layered, SubscriberExt},
    util::SubscriberInitExt,
    EnvFilter, Layer, Registry,
};

const LOG_DIR_ENV: &str = "ZOOLIGHT_LOG_DIR";

/// The installed file sink. Dropping the guard would stop the writer thread.
struct Installed {
    path: PathBuf,
    _guard: WorkerGuard,
}

static INSTALLED: OnceLock<Installed> = OnceLock::new();

type FilteredRegistry = Layered<EnvFilter, Registry>;
type Sink = Box<dyn Layer<FilteredRegistry> + Send + Sync>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
    #[default]
    Text,
    Json,
}

impl FromStr for LogFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "text" | "plain" => Ok(Self::Text),
            "json" => Ok(Self::Json),
            other => Err(format!("unknown log format `{other}` (expected text or json)")),
        }
    }
}

#[derive(Debug, Clone)]
pub struct LogConfig {
    /// Used as the file prefix and the default directory name.
    pub app_name: &'static str,
    /// Overrides `ZOOLIGHT_LOG_DIR` and the platform data directory.
    pub log_dir: Option<PathBuf>,
    /// Also write to stderr. Leave off while a full-screen UI is running.
    pub emit_stderr: bool,
    pub format: LogFormat,
    /// Used when `RUST_LOG` is unset.
    pub default_filter: String,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            app_name: "zoolight",
            log_dir: None,
            emit_stderr: false,
            format: LogFormat::Text,
            default_filter: "info".to_string(),
        }
    }
}

impl LogConfig {
    /// Explicit dir, then `ZOOLIGHT_LOG_DIR`, then `<data dir>/<app_name>`.
    fn directory(&self) -> PathBuf {
        let configured = self
            .log_dir
            .clone()
            .or_else(|| std::env::var_os(LOG_DIR_ENV).map(PathBuf::from));
        match configured {
            Some(dir) => expand_tilde(&dir),
            None => dirs::data_local_dir()
                .unwrap_or_else(|| PathBuf::from("."))
                .join(self.app_name),
        }
    }
}

/// Install the global `tracing` subscriber and return today's log file.
///
/// Only the first call installs anything; later calls return the same path.
pub fn init_logging(config: LogConfig) -> anyhow::Result<PathBuf> {
    if let Some(installed) = INSTALLED.get() {
        return Ok(installed.path.clone());
    }

    let dir = config.directory();
    std::fs::create_dir_all(&dir)
        .with_context(|| format!("cannot create log directory {}", dir.display()))?;

    let appender = RollingFileAppender::builder()
        .rotation(Rotation::DAILY)
        .filename_prefix(config.app_name)
        .filename_suffix("log")
        .build(&dir)
        .with_context(|| format!("cannot open log file in {}", dir.display()))?;
    let path = dir.join(format!(
        "{}.{}.log",
        config.app_name,
        Utc::now().format("%Y-%m-%d")
    ));
    let (writer, guard) = tracing_appender::non_blocking(appender);

    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&config.default_filter));
    let mut sinks = vec![fmt_layer(config.format, writer, false)];
    if config.emit_stderr {
        sinks.push(fmt_layer(config.format, std::io::stderr, true));
    }

    tracing_subscriber::registry()
        .with(env_filter)
        .with(sinks)
        .try_init()
        .context("tracing setup failed")?;

    let installed = INSTALLED.get_or_init(|| Installed {
        path,
        _guard: guard,
    });
    tracing::debug!(path = %installed.path.display(), "logging initialised");
    Ok(installed.path.clone())
}

fn fmt_layer<W>(format: LogFormat, writer: W, ansi: bool) -> Sink
where
    W: for<'w> MakeWriter<'w> + Send + Sync + 'static,
{
    let layer = fmt::layer().with_writer(writer).with_ansi(ansi);
    match format {
        LogFormat::Text => layer.boxed(),
        LogFormat::Json => layer.json().boxed(),
    }
}

fn expand_tilde(path: &Path) -> PathBuf {
    match (path.strip_prefix("~"), dirs::home_dir()) {
        (Ok(rest), Some(home)) => home.join(rest),
        _ => path.to_path_buf(),
    }
}
