use std::env;
use std::fs;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Environment variable naming a directory for JSON log files.
pub const LOG_DIR_ENV: &str = "DASHBOARD_TOOLS_LOG_DIR";

/// Initializes logging: human-readable lines on stderr, plus daily-rotated
/// JSON files when `DASHBOARD_TOOLS_LOG_DIR` is set.
///
/// Standard output is left to the tools themselves.
pub fn init_logging(file_stem: &str) {
    let filter = EnvFilter::from_default_env().add_directive(
        "grafana_dashboard_tools=info"
            .parse()
            .expect("static directive parses"),
    );

    let console_layer = fmt::layer().with_target(false).with_writer(std::io::stderr);

    let file_layer = env::var(LOG_DIR_ENV).ok().and_then(|dir| {
        fs::create_dir_all(&dir).ok()?;
        let file_appender = tracing_appender::rolling::daily(&dir, format!("{}.log", file_stem));
        let (non_blocking_writer, guard) = tracing_appender::non_blocking(file_appender);
        // Keep the guard alive so buffered lines are flushed on exit
        std::mem::forget(guard);
        Some(fmt::layer().json().with_writer(non_blocking_writer))
    });

    tracing_subscriber::registry()
        .with(filter)
        .with(console_layer)
        .with(file_layer)
        .init();
}
