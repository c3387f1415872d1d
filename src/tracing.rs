//! Tracing initialization.

use std::sync::Once;
use tracing::Level;
use tracing_subscriber::EnvFilter;

static INIT: Once = Once::new();

/// Output format for log lines on stderr.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum LogFormat {
    #[default]
    Compact,
    Json,
}

fn under_test_harness() -> bool {
    std::env::var("NEXTEST").is_ok() || std::env::var("CARGO_TARGET_TMPDIR").is_ok()
}

/// Initialize tracing. Only the first call has an effect.
///
/// `RUST_LOG` directives take precedence over `default_level`. Under a test
/// harness logs go to the test writer at debug level, so they are captured
/// per test.
pub fn init(format: LogFormat, default_level: Level) {
    INIT.call_once(|| {
        let is_test = under_test_harness();
        let level = if is_test { Level::DEBUG } else { default_level };
        let filter = EnvFilter::builder()
            .with_default_directive(level.into())
            .from_env_lossy();

        let builder = tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_ansi(false)
            .with_target(true);

        let result = match (format, is_test) {
            (_, true) => builder.compact().with_test_writer().try_init(),
            (LogFormat::Compact, false) => {
                builder.compact().with_writer(std::io::stderr).try_init()
            }
            (LogFormat::Json, false) => builder.json().with_writer(std::io::stderr).try_init(),
        };
        if let Err(e) = result {
            eprintln!("Failed to initialize tracing: {}", e);
        }
    });
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn init_is_idempotent() {
        init(LogFormat::Compact, Level::INFO);
        init(LogFormat::Json, Level::TRACE);
        tracing::debug!("logging after repeated init");
    }
}
