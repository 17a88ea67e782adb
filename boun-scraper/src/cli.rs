use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use boun_common::SemesterCode;
use clap::Parser;

use crate::config::ScraperConfig;
use crate::error::ConfigError;
use crate::module::registration::{
    NormalizeOptions, RegistrationClient, RequestThrottle, RunOptions, RunReport, ScheduleUpdater, write_json,
};

/// Scrape the Boğaziçi University course schedule into a JSON file
#[derive(Debug, Parser)]
#[command(name = "get-boun-course-info", version)]
pub struct Args {
    /// Semester code, e.g. 2024-2025-1 (1 = Fall, 2 = Spring, 3 = Summer)
    pub semester: SemesterCode,

    /// Destination JSON file
    #[arg(long, default_value = "courses.json")]
    pub output: PathBuf,

    /// Verbose logging; in test mode also saves the raw page next to the output
    #[arg(long)]
    pub debug: bool,

    /// Scrape a single department only
    #[arg(long)]
    pub test: bool,

    /// Department used with --test
    #[arg(long, default_value = "CMPE")]
    pub department: String,

    /// Keep sections that have no day, hour or room
    #[arg(long)]
    pub include_unscheduled: bool,

    /// TOML configuration file
    #[arg(long)]
    pub config: Option<PathBuf>,
}

impl Args {
    /// `--debug` wins over the configured level
    pub fn log_level<'a>(&self, config: &'a ScraperConfig) -> &'a str {
        if self.debug { "debug" } else { config.log_level.as_str() }
    }

    fn dump_dir(&self) -> Option<PathBuf> {
        if !(self.test && self.debug) {
            return None;
        }
        match self.output.parent() {
            Some(p) if !p.as_os_str().is_empty() => Some(p.to_path_buf()),
            _ => Some(Path::new(".").to_path_buf()),
        }
    }
}

/// Run one scrape as described by `args` and write the output file
pub async fn run(args: &Args, config: &ScraperConfig) -> Result<RunReport> {
    let mut catalog = config.catalog();
    if args.test {
        catalog = catalog
            .only(&args.department)
            .ok_or_else(|| ConfigError::UnknownDepartment(args.department.clone()))?;
        tracing::info!("Test mode: scraping {} only", args.department.to_uppercase());
    }

    let dump_dir = args.dump_dir();
    if let Some(dir) = &dump_dir {
        std::fs::create_dir_all(dir).with_context(|| format!("Failed to create directory {:?}", dir))?;
    }

    let options = RunOptions {
        semester: args.semester,
        normalize: NormalizeOptions {
            include_unscheduled: args.include_unscheduled,
        },
        on_error: config.on_error,
        dump_dir,
    };

    let client = RegistrationClient::new(config)?;
    let mut updater = ScheduleUpdater::new(client, RequestThrottle::new(config.request_delay()));

    let (sections, report) = updater.run(&catalog, &options).await?;
    write_json(&args.output, &sections)?;

    Ok(report)
}
