//! Loader for Zoolight configuration with YAML + environment overlays.
//!
//! Every key has a default, so an empty source set yields a working
//! configuration. Sources are merged in the order they are added, with
//! `ZOOLIGHT__SECTION__KEY` environment variables applied last. String values
//! may reference `${VAR}` placeholders which are expanded after merging.
use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;
use serde_json::Value;
use std::path::{Path, PathBuf};
use url::Url;
use zoolight_common::ZoolightError;

const MAXIMUM_ENV_EXPANSION_DEPTH: usize = 8;

/// Values of `version` this build reads. An absent version means the current one.
pub const SUPPORTED_VERSIONS: &[&str] = &["1"];

pub const DEFAULT_DATASET_URL: &str =
    "https://zoolight.s3.ap-south-1.amazonaws.com/Zoolight+database.json";
pub const DEFAULT_CARD_PLACEHOLDER: &str = "https://via.placeholder.com/150?text=No+Image";
pub const DEFAULT_DETAIL_PLACEHOLDER: &str = "https://via.placeholder.com/400x300?text=No+Image";
pub const DEFAULT_SEARCH_URL: &str = "https://www.google.com/search";
pub const DEFAULT_BACKDROPS: [&str; 2] = [
    "https://zoolight.s3.ap-south-1.amazonaws.com/Screenshot+2025-02-02+210830.png",
    "https://zoolight.s3.ap-south-1.amazonaws.com/Screenshot+2025-02-03+140303.png",
];

#[derive(Debug, Clone, PartialEq, Deserialize, Default)]
#[serde(default)]
pub struct ZoolightConfig {
    pub version: Option<String>,
    pub dataset: DatasetConfig,
    pub images: ImageConfig,
    pub links: LinkConfig,
    pub ui: UiConfig,
    pub logging: LoggingConfig,
}

impl ZoolightConfig {
    /// Reject settings the app cannot start with.
    ///
    /// ```
    /// use zoolight_common::ZoolightError;
    /// use zoolight_config::ZoolightConfig;
    ///
    /// let mut cfg = ZoolightConfig::default();
    /// assert!(cfg.validate().is_ok());
    ///
    /// cfg.version = Some("7".into());
    /// assert!(matches!(cfg.validate(), Err(ZoolightError::Config(_))));
    /// ```
    pub fn validate(&self) -> zoolight_common::Result<()> {
        if let Some(version) = self.version.as_deref()
            && !SUPPORTED_VERSIONS.contains(&version)
        {
            return Err(ZoolightError::Config(format!(
                "unsupported config version `{version}` (supported: {})",
                SUPPORTED_VERSIONS.join(", ")
            )));
        }
        web_url("dataset.url", &self.dataset.url)?;
        self.search_url()?;
        Ok(())
    }

    /// Base of the Learn More web search.
    pub fn search_url(&self) -> zoolight_common::Result<Url> {
        web_url("links.search_url", &self.links.search_url)
    }
}

fn web_url(key: &str, raw: &str) -> zoolight_common::Result<Url> {
    let url = Url::parse(raw)
        .map_err(|e| ZoolightError::Config(format!("{key}: `{raw}` is not a URL ({e})")))?;
    match url.scheme() {
        "http" | "https" => Ok(url),
        other => Err(ZoolightError::Config(format!(
            "{key}: unsupported scheme `{other}` in `{raw}`"
        ))),
    }
}

/// Where the animal records come from and how hard to try.
///
/// `timeout_secs: None` leaves the fetch unbounded and `retries: 0` issues a
/// single request.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct DatasetConfig {
    pub url: String,
    pub timeout_secs: Option<u64>,
    pub retries: usize,
}

impl Default for DatasetConfig {
    fn default() -> Self {
        Self {
            url: DEFAULT_DATASET_URL.into(),
            timeout_secs: None,
            retries: 0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct ImageConfig {
    /// Check image URLs over HTTP before showing them.
    pub probe: bool,
    pub timeout_secs: u64,
    pub card_placeholder: String,
    pub detail_placeholder: String,
}

impl Default for ImageConfig {
    fn default() -> Self {
        Self {
            probe: true,
            timeout_secs: 5,
            card_placeholder: DEFAULT_CARD_PLACEHOLDER.into(),
            detail_placeholder: DEFAULT_DETAIL_PLACEHOLDER.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct LinkConfig {
    /// Web search endpoint used by "Learn More"; the animal name goes in `q`.
    pub search_url: String,
}

impl Default for LinkConfig {
    fn default() -> Self {
        Self {
            search_url: DEFAULT_SEARCH_URL.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct UiConfig {
    pub tick_ms: u64,
    pub backdrops: Vec<String>,
}

impl Default for UiConfig {
    fn default() -> Self {
        Self {
            tick_ms: 80,
            backdrops: DEFAULT_BACKDROPS.iter().map(|s| s.to_string()).collect(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub dir: Option<PathBuf>,
    pub format: String,
    pub filter: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            dir: None,
            format: "text".into(),
            filter: "info".into(),
        }
    }
}

/// `$XDG_CONFIG_HOME/zoolight/zoolight.yaml` (or the platform equivalent).
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join("zoolight").join("zoolight.yaml"))
}

fn expand_env_in_value(v: &mut Value) {
    match v {
        Value::String(s) => {
            if s.contains('$') {
                let mut cur = std::mem::take(s);
                for _ in 0..MAXIMUM_ENV_EXPANSION_DEPTH {
                    let expanded = match shellexpand::env(&cur) {
                        Ok(cow) => cow.into_owned(),
                        Err(_) => cur.clone(),
                    };
                    if expanded == cur {
                        break;
                    }
                    cur = expanded;
                }
                *s = cur;
            }
        }
        Value::Array(arr) => arr.iter_mut().for_each(expand_env_in_value),
        Value::Object(obj) => obj.values_mut().for_each(expand_env_in_value),
        _ => {}
    }
}

/// Builder over the `config` crate wiring (YAML + env overrides).
pub struct ZoolightConfigLoader {
    builder: config::ConfigBuilder<config::builder::DefaultState>,
    env_prefix: String,
}

impl Default for ZoolightConfigLoader {
    fn default() -> Self {
        Self::new()
    }
}

impl ZoolightConfigLoader {
    /// Start from built-in defaults; `ZOOLIGHT__` env overrides apply on load.
    ///
    /// ```
    /// use zoolight_config::{ZoolightConfigLoader, DEFAULT_DATASET_URL};
    ///
    /// let config = ZoolightConfigLoader::new()
    ///     .with_yaml_str("version: '1'")
    ///     .load()
    ///     .expect("valid config");
    ///
    /// assert_eq!(config.version.as_deref(), Some("1"));
    /// assert_eq!(config.dataset.url, DEFAULT_DATASET_URL);
    /// assert_eq!(config.dataset.retries, 0);
    /// ```
    pub fn new() -> Self {
        Self {
            builder: Config::builder(),
            env_prefix: "ZOOLIGHT".into(),
        }
    }

    /// Use a different environment prefix (tests keep theirs isolated).
    pub fn with_env_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.env_prefix = prefix.into();
        self
    }

    /// Attach a YAML/TOML/JSON file that must exist.
    pub fn with_file<P: AsRef<Path>>(mut self, path: P) -> Self {
        self.builder = self
            .builder
            .add_source(File::from(path.as_ref()).required(true));
        self
    }

    /// Attach a file that is skipped when missing.
    pub fn with_optional_file<P: AsRef<Path>>(mut self, path: P) -> Self {
        self.builder = self
            .builder
            .add_source(File::from(path.as_ref()).required(false));
        self
    }

    /// Merge an inline YAML snippet.
    ///
    /// ```
    /// use zoolight_config::ZoolightConfigLoader;
    ///
    /// let cfg = ZoolightConfigLoader::new()
    ///     .with_yaml_str(
    ///         r#"
    /// dataset:
    ///   url: "http://localhost:8080/animals.json"
    ///   timeout_secs: 10
    /// images:
    ///   probe: false
    /// "#,
    ///     )
    ///     .load()
    ///     .unwrap();
    ///
    /// assert_eq!(cfg.dataset.url, "http://localhost:8080/animals.json");
    /// assert_eq!(cfg.dataset.timeout_secs, Some(10));
    /// assert!(!cfg.images.probe);
    /// assert_eq!(cfg.ui.tick_ms, 80);
    /// ```
    pub fn with_yaml_str(mut self, yaml: &str) -> Self {
        self.builder = self
            .builder
            .add_source(File::from_str(yaml, config::FileFormat::Yaml));
        self
    }

    /// Merge all sources, expand `${VAR}` placeholders and deserialize.
    ///
    /// ```
    /// use zoolight_config::ZoolightConfigLoader;
    ///
    /// unsafe { std::env::set_var("ZOO_HOST", "mirror.example.org"); }
    ///
    /// let config = ZoolightConfigLoader::new()
    ///     .with_yaml_str(r#"
    /// dataset:
    ///   url: "https://${ZOO_HOST}/animals.json"
    /// "#)
    ///     .load()
    ///     .expect("valid configuration");
    ///
    /// assert_eq!(config.dataset.url, "https://mirror.example.org/animals.json");
    ///
    /// unsafe { std::env::remove_var("ZOO_HOST"); }
    /// ```
    pub fn load(self) -> Result<ZoolightConfig, ConfigError> {
        let cfg = self
            .builder
            .add_source(
                Environment::with_prefix(&self.env_prefix)
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        let mut v: Value = cfg.try_deserialize()?;
        expand_env_in_value(&mut v);

        serde_json::from_value(v).map_err(|e| ConfigError::Message(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use temp_env;

    #[test]
    fn expands_simple_string() {
        temp_env::with_var("FOO", Some("bar"), || {
            let mut v = json!("prefix-${FOO}-suffix");
            expand_env_in_value(&mut v);
            assert_eq!(v, json!("prefix-bar-suffix"));
        });
    }

    #[test]
    fn expands_in_array_and_object() {
        temp_env::with_vars([("CITY", Some("Pune")), ("ZONE", Some("south"))], || {
            let mut v = json!(["hello-$CITY", { "loc": "${CITY}-${ZONE}" }, 42, true, null]);
            expand_env_in_value(&mut v);
            assert_eq!(
                v,
                json!(["hello-Pune", { "loc": "Pune-south" }, 42, true, null])
            );
        });
    }

    #[test]
    fn stops_on_cycles() {
        temp_env::with_vars([("A", Some("${B}")), ("B", Some("${A}"))], || {
            let mut v = json!("x=${A}-y");
            expand_env_in_value(&mut v);
            let s = v.as_str().unwrap();
            assert!(s.starts_with("x=") && s.ends_with("-y"));
            assert!(s.contains("${"));
        });
    }

    #[test]
    fn unknown_vars_are_left_as_is() {
        let mut v = json!("hi-${DOES_NOT_EXIST}");
        expand_env_in_value(&mut v);
        assert_eq!(v, json!("hi-${DOES_NOT_EXIST}"));
    }

    #[test]
    fn empty_sources_yield_defaults() {
        let cfg = ZoolightConfigLoader::new()
            .with_env_prefix("ZOOLIGHT_UNIT_EMPTY")
            .load()
            .unwrap();
        assert_eq!(cfg, ZoolightConfig::default());
        assert_eq!(cfg.images.card_placeholder, DEFAULT_CARD_PLACEHOLDER);
        assert_eq!(cfg.ui.backdrops.len(), 2);
        assert_eq!(cfg.logging.format, "text");
    }

    #[test]
    fn missing_optional_file_is_skipped() {
        let cfg = ZoolightConfigLoader::new()
            .with_env_prefix("ZOOLIGHT_UNIT_OPTIONAL")
            .with_optional_file("/definitely/not/here/zoolight.yaml")
            .load()
            .unwrap();
        assert_eq!(cfg.dataset, DatasetConfig::default());
    }

    #[test]
    fn validation_names_the_bad_key() {
        let mut cfg = ZoolightConfig::default();
        cfg.version = Some("1".into());
        assert!(cfg.validate().is_ok());
        assert_eq!(cfg.search_url().unwrap().as_str(), DEFAULT_SEARCH_URL);

        cfg.links.search_url = "not a url".into();
        let err = cfg.validate().unwrap_err();
        assert!(matches!(err, ZoolightError::Config(_)));
        assert!(err.to_string().contains("links.search_url"), "{err}");

        let mut cfg = ZoolightConfig::default();
        cfg.dataset.url = "file:///tmp/animals.json".into();
        let err = cfg.validate().unwrap_err();
        assert!(err.to_string().contains("dataset.url"), "{err}");

        let mut cfg = ZoolightConfig::default();
        cfg.version = Some("0.1".into());
        assert!(cfg.validate().unwrap_err().to_string().contains("version"));
    }

    #[test]
    fn missing_required_file_fails() {
        let res = ZoolightConfigLoader::new()
            .with_env_prefix("ZOOLIGHT_UNIT_REQUIRED")
            .with_file("/definitely/not/here/zoolight.yaml")
            .load();
        assert!(res.is_err());
    }
}
