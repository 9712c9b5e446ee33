//! Logging Infrastructure
//!
//! `RUST_LOG` overrides the level passed in. File output rolls daily when
//! the log directory exists.

use std::path::Path;

use tracing_subscriber::EnvFilter;

const DEFAULT_DIRECTIVES: &str = "portal_server=info,tower_http=info";

/// Initialize the logger (stdout only)
pub fn init_logger() {
    init_logger_with_file(None, false, None);
}

/// Initialize the logger with optional JSON formatting and file output
pub fn init_logger_with_file(log_level: Option<&str>, json: bool, log_dir: Option<&str>) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| match log_level {
        Some(level) => EnvFilter::new(format!(
            "portal_server={level},shared={level},tower_http={level}"
        )),
        None => EnvFilter::new(DEFAULT_DIRECTIVES),
    });

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_file(false)
        .with_line_number(false)
        .with_thread_ids(false)
        .with_target(false);

    if let Some(dir) = log_dir
        && Path::new(dir).exists()
    {
        let file_appender = tracing_appender::rolling::daily(dir, "portal-server");
        let builder = builder.with_writer(file_appender).with_ansi(false);
        // try_init: a second call (tests) keeps the first subscriber
        let _ = if json {
            builder.json().try_init()
        } else {
            builder.try_init()
        };
        return;
    }

    let _ = if json {
        builder.json().try_init()
    } else {
        builder.try_init()
    };
}
