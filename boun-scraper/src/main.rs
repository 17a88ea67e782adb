use std::process::ExitCode;

use boun_scraper::cli::{self, Args};
use boun_scraper::config::ScraperConfig;
use boun_scraper::logging;
use clap::Parser;

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    let args = Args::parse();

    // Logging is set up before a config error is reported so it goes to the log too
    let (config, config_error) = match ScraperConfig::load(args.config.as_deref()) {
        Ok(config) => (config, None),
        Err(e) => (ScraperConfig::default(), Some(e)),
    };

    let _logging_guard = match logging::init_logging(
        args.log_level(&config),
        config.log_dir.as_deref(),
        config.log_retention_days,
    ) {
        Ok(guard) => guard,
        Err(e) => {
            eprintln!("Failed to initialize logging: {:#}", e);
            return ExitCode::FAILURE;
        }
    };

    if let Some(e) = config_error {
        tracing::error!("{}", e);
        return ExitCode::FAILURE;
    }

    tracing::info!("get-boun-course-info {} starting", env!("CARGO_PKG_VERSION"));

    match cli::run(&args, &config).await {
        Ok(report) => {
            if !report.failures.is_empty() {
                tracing::warn!("{} of {} page(s) failed", report.failures.len(), report.pages);
            }
            ExitCode::SUCCESS
        }
        Err(e) => {
            tracing::error!("{:#}", e);
            ExitCode::FAILURE
        }
    }
}
