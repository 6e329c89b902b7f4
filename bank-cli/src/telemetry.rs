use std::sync::Once;

use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer};

static INIT: Once = Once::new();

pub fn setup_telemetry() {
    INIT.call_once(|| {
        let file_appender = match RollingFileAppender::builder()
            .rotation(Rotation::HOURLY)
            .filename_prefix("bank")
            .filename_suffix("log")
            .max_log_files(24)
            .build("logs")
        {
            Ok(appender) => Some(appender),
            Err(e) => {
                eprintln!(
                    "Warning: Failed to create log file appender: {}. Logging to stderr only.",
                    e
                );
                None
            }
        };

        let stderr_env_filter =
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

        // Listings go to stdout, logs stay on stderr.
        let stderr_layer = fmt::Layer::new()
            .with_writer(std::io::stderr)
            .with_ansi(true)
            .with_filter(stderr_env_filter);

        if let Some(file_appender) = file_appender {
            let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);
            let file_layer = fmt::Layer::new()
                .with_writer(non_blocking)
                .with_ansi(false)
                .with_filter(EnvFilter::new("info,bank_client=debug"));

            tracing_subscriber::registry()
                .with(stderr_layer)
                .with(file_layer)
                .init();

            // The writer must outlive the process.
            std::mem::forget(guard);
        } else {
            tracing_subscriber::registry().with(stderr_layer).init();
        }
    });
}
