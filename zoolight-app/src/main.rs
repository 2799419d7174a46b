use anyhow::{Context, Result};
use clap::Parser;
use std::path::PathBuf;
use tether::{Tether, build_from_config};
use zoolight_common::observability::{LogConfig, LogFormat, init_logging};
use zoolight_config::{ZoolightConfig, ZoolightConfigLoader, default_config_path};
mod tether;

#[derive(Debug, Parser)]
#[command(
    name = "zoolight",
    version,
    about = "Search and browse the Zoolight animal encyclopedia"
)]
struct Cli {
    /// YAML config file. Without it `./zoolight.yaml` and the user config
    /// directory are tried.
    #[arg(long, env = "ZOOLIGHT_CONFIG")]
    config: Option<PathBuf>,

    /// Dataset location, overriding `dataset.url`.
    #[arg(long)]
    dataset_url: Option<String>,

    /// `text` or `json`.
    #[arg(long)]
    log_format: Option<LogFormat>,

    #[arg(long)]
    log_dir: Option<PathBuf>,
}

fn load_config(cli: &Cli) -> Result<ZoolightConfig> {
    let loader = match &cli.config {
        Some(path) => ZoolightConfigLoader::new().with_file(path),
        None => {
            let mut loader = ZoolightConfigLoader::new();
            if let Some(user) = default_config_path() {
                loader = loader.with_optional_file(user);
            }
            loader.with_optional_file("zoolight.yaml")
        }
    };
    let mut cfg = loader.load().context("loading configuration")?;
    if let Some(url) = &cli.dataset_url {
        cfg.dataset.url = url.clone();
    }
    cfg.validate()?;
    Ok(cfg)
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // 1) Config: files, then env, then flags
    let cfg = load_config(&cli)?;

    // 2) Logging to file; the terminal belongs to the UI
    let format = match cli.log_format {
        Some(format) => format,
        None => cfg.logging.format.parse().map_err(anyhow::Error::msg)?,
    };
    let log_path = init_logging(LogConfig {
        log_dir: cli.log_dir.clone().or_else(|| cfg.logging.dir.clone()),
        format,
        default_filter: cfg.logging.filter.clone(),
        ..LogConfig::default()
    })?;
    tracing::info!(log = %log_path.display(), dataset = %cfg.dataset.url, "zoolight starting");

    let mut tether = Tether::new();
    build_from_config(&mut tether, cfg)?;

    tether.run().await
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn flags_parse() {
        let cli = Cli::try_parse_from([
            "zoolight",
            "--dataset-url",
            "http://localhost:9000/animals.json",
            "--log-format",
            "json",
        ])
        .unwrap();
        assert_eq!(
            cli.dataset_url.as_deref(),
            Some("http://localhost:9000/animals.json")
        );
        assert_eq!(cli.log_format, Some(LogFormat::Json));
    }

    #[test]
    fn unknown_log_format_is_rejected() {
        assert!(Cli::try_parse_from(["zoolight", "--log-format", "xml"]).is_err());
    }
}
