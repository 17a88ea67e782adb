///! Course schedule updater
///!
///! Walks the department catalog one page at a time: fetch → extract →
///! normalize → aggregate. The JSON output is written by the caller once
///! the whole run has finished.

use std::collections::BTreeMap;
use std::path::PathBuf;

use anyhow::{Context, Result, bail};
use boun_common::{Catalog, CourseSection, SemesterCode};
use scraper::Html;

use super::aggregator::Aggregate;
use super::extractor::{extract_row_groups, parse_slot_legend, summarize_page};
use super::fetcher::CourseSource;
use super::normalizer::{NormalizeOptions, NormalizedPage, normalize_page};
use super::throttle::RequestThrottle;
use crate::config::OnError;
use crate::error::{PageError, StructureError};

#[derive(Debug, Clone)]
pub struct RunOptions {
    pub semester: SemesterCode,
    pub normalize: NormalizeOptions,
    pub on_error: OnError,
    /// Save each raw page here and log page diagnostics (test mode with --debug)
    pub dump_dir: Option<PathBuf>,
}

impl RunOptions {
    pub fn new(semester: SemesterCode) -> Self {
        Self {
            semester,
            normalize: NormalizeOptions::default(),
            on_error: OnError::default(),
            dump_dir: None,
        }
    }
}

#[derive(Debug)]
pub struct PageFailure {
    pub department: String,
    pub page: String,
    pub error: PageError,
}

#[derive(Debug, Default)]
pub struct RunReport {
    pub pages: usize,
    pub failures: Vec<PageFailure>,
    pub collisions: usize,
    pub sections: usize,
    /// Schedule rows kept with a blank day or hour
    pub incomplete_rows: usize,
}

impl RunReport {
    pub fn succeeded(&self) -> usize {
        self.pages - self.failures.len()
    }
}

/// Parse one listing page into normalized sections
pub fn parse_page(html: &str, options: NormalizeOptions) -> Result<NormalizedPage, StructureError> {
    let document = Html::parse_document(html);
    let groups = extract_row_groups(&document)?;
    Ok(normalize_page(groups, options))
}

/// Log title, table count and slot legend of a page
fn log_page_diagnostics(html: &str, code: &str) {
    let document = Html::parse_document(html);
    let summary = summarize_page(&document);
    let legend = parse_slot_legend(&document);

    tracing::info!(
        "{}: title {:?}, {} table(s), {} bytes",
        code,
        summary.title.as_deref().unwrap_or("<none>"),
        summary.tables,
        html.len()
    );
    for (slot, hour) in &legend {
        tracing::debug!("{}: slot {} starts at {:02}:00", code, slot, hour);
    }
}

pub struct ScheduleUpdater<S> {
    source: S,
    throttle: RequestThrottle,
}

impl<S: CourseSource> ScheduleUpdater<S> {
    pub fn new(source: S, throttle: RequestThrottle) -> Self {
        Self { source, throttle }
    }

    /// Fetch and parse a single department page
    pub async fn scrape_page(
        &mut self,
        options: &RunOptions,
        code: &str,
        page_name: &str,
    ) -> Result<NormalizedPage, PageError> {
        self.throttle.ready().await;
        let fetched = self.source.fetch(&options.semester, code, page_name).await;
        self.throttle.finished();
        let html = fetched?;

        if let Some(dir) = &options.dump_dir {
            let path = dir.join(format!("test_response_{}_{}.html", code, options.semester));
            match std::fs::write(&path, &html) {
                Ok(()) => tracing::info!("Saved raw response to {:?}", path),
                Err(e) => tracing::warn!("Failed to save raw response to {:?}: {}", path, e),
            }
            log_page_diagnostics(&html, code);
        }

        Ok(parse_page(&html, options.normalize)?)
    }

    /// Scrape every page of `catalog` in order and merge the results.
    ///
    /// Under `OnError::Skip` failed pages are reported and skipped; the run
    /// only fails when no page succeeded. Under `OnError::Abort` the first
    /// failure ends the run.
    pub async fn run(
        &mut self,
        catalog: &Catalog,
        options: &RunOptions,
    ) -> Result<(BTreeMap<String, CourseSection>, RunReport)> {
        let total = catalog.page_count();
        if total == 0 {
            bail!("No department pages to scrape");
        }

        tracing::info!(
            "Scraping {} department page(s) for {} ({})",
            total,
            options.semester.label(),
            options.semester.donem()
        );

        let mut aggregate = Aggregate::new();
        let mut report = RunReport::default();

        for department in catalog.departments() {
            for page_name in &department.names {
                report.pages += 1;
                tracing::info!("[{}/{}] {} ({})", report.pages, total, department.code, page_name);

                match self.scrape_page(options, &department.code, page_name).await {
                    Ok(page) => {
                        report.incomplete_rows += page.incomplete_rows;
                        let found = page.sections.len();
                        let added = aggregate.merge(&department.code, page.sections);
                        tracing::info!("{}: {} section(s), {} new", department.code, found, added);
                    }
                    Err(error) => {
                        if options.on_error == OnError::Abort {
                            return Err(error)
                                .with_context(|| format!("Aborting run at {} ({})", department.code, page_name));
                        }
                        tracing::warn!("Skipping {} ({}): {}", department.code, page_name, error);
                        report.failures.push(PageFailure {
                            department: department.code.clone(),
                            page: page_name.clone(),
                            error,
                        });
                    }
                }
            }
        }

        if report.succeeded() == 0 {
            bail!("All {} department page(s) failed", report.pages);
        }

        report.collisions = aggregate.collisions();
        report.sections = aggregate.len();

        tracing::info!(
            "Scraped {} section(s) from {}/{} page(s), {} duplicate key(s)",
            report.sections,
            report.succeeded(),
            report.pages,
            report.collisions
        );
        if report.incomplete_rows > 0 {
            tracing::warn!(
                "{} schedule row(s) had no day or no hour and were kept with blanks",
                report.incomplete_rows
            );
        }
        for failure in &report.failures {
            tracing::warn!("Failed: {} ({}): {}", failure.department, failure.page, failure.error);
        }

        Ok((aggregate.into_map(), report))
    }
}
