use std::{
    fs,
    path::{Path, PathBuf},
};

use anyhow::Context;
use tracing_appender::non_blocking::{NonBlocking, WorkerGuard};
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

const LOG_PREFIX: &str = "boun-scraper";

/// Keeps the file writer flushing until dropped at the end of `main`
#[allow(dead_code)]
pub struct LoggerGuard(Option<WorkerGuard>);

fn normalize_level(level: &str) -> &str {
    match level {
        "trace" | "debug" | "info" | "warn" | "error" => level,
        _ => "info",
    }
}

/// Console logging at `level` (RUST_LOG overrides), plus a daily file under
/// `log_dir` when given.
pub fn init_logging(
    level: &str,
    log_dir: Option<&Path>,
    retention_days: u64,
) -> anyhow::Result<LoggerGuard> {
    let effective = normalize_level(level);

    let builder = EnvFilter::builder().with_default_directive(
        effective
            .parse()
            .with_context(|| format!("Invalid log level '{}'", effective))?,
    );
    let rust_log = std::env::var("RUST_LOG").unwrap_or_default();
    let console_filter = builder.clone().parse_lossy(&rust_log);

    let stdout_layer = fmt::layer()
        .with_writer(std::io::stdout)
        .with_target(false)
        .with_ansi(true)
        .with_filter(console_filter);

    let (file_layer, guard) = match log_dir {
        Some(dir) => {
            fs::create_dir_all(dir)
                .with_context(|| format!("Failed to create log directory {:?}", dir))?;

            let file_appender = RollingFileAppender::builder()
                .rotation(Rotation::DAILY)
                .filename_prefix(LOG_PREFIX)
                .filename_suffix("log")
                .build(dir)
                .context("Failed to create file appender")?;
            let (non_blocking, guard) = NonBlocking::new(file_appender);

            let layer = fmt::layer()
                .with_writer(non_blocking)
                .with_ansi(false)
                .with_filter(builder.parse_lossy(&rust_log));
            (Some(layer), Some(guard))
        }
        None => (None, None),
    };

    tracing_subscriber::registry()
        .with(stdout_layer)
        .with(file_layer)
        .init();

    if level != effective {
        tracing::warn!("Invalid log level '{}', defaulting to 'info'", level);
    }

    if let Some(dir) = log_dir {
        match cleanup_old_logs(dir, LOG_PREFIX, retention_days) {
            Ok(0) => {}
            Ok(n) => tracing::info!("Deleted {} old log file(s) from {:?}", n, dir),
            Err(e) => tracing::warn!("Failed to delete old log files: {}", e),
        }
    }

    Ok(LoggerGuard(guard))
}

/// Remove `<prefix>*.log` files in `log_dir` last modified more than
/// `retention_days` ago. Returns how many were removed.
pub fn cleanup_old_logs(log_dir: &Path, prefix: &str, retention_days: u64) -> std::io::Result<usize> {
    let cutoff = chrono::Utc::now() - chrono::Duration::days(retention_days as i64);
    let mut removed = 0;

    for entry in fs::read_dir(log_dir)? {
        let path: PathBuf = entry?.path();

        let Some(file_name) = path.file_name().and_then(|n| n.to_str()) else {
            continue;
        };
        if !(file_name.starts_with(prefix) && file_name.ends_with(".log")) {
            continue;
        }

        let modified: chrono::DateTime<chrono::Utc> = fs::metadata(&path)?.modified()?.into();
        if modified < cutoff {
            fs::remove_file(&path)?;
            removed += 1;
        }
    }
    Ok(removed)
}
