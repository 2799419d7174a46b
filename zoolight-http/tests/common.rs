use std::sync::Once;

use zoolight_common::observability::{init_logging, LogConfig, LogFormat};

static TRACING: Once = Once::new();

/// Debug-level tracing to stderr and a scratch log dir, once per test binary.
/// `ZOOLIGHT_LOG_FORMAT=json` switches the encoding.
pub fn init_test_tracing() {
    TRACING.call_once(|| {
        let format = std::env::var("ZOOLIGHT_LOG_FORMAT")
            .ok()
            .and_then(|raw| raw.parse().ok())
            .unwrap_or(LogFormat::Text);
        let _ = init_logging(LogConfig {
            app_name: "zoolight-tests",
            log_dir: Some(std::env::temp_dir().join("zoolight-tests")),
            emit_stderr: true,
            format,
            default_filter: "debug".into(),
        });
    });
}
