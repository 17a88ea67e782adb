///! Course table extractor
///!
///! Reads the schedule table of one department listing page
///! (`table[border=1][width=1300px]`, header row `tr.schtitle`, data rows
///! `tr.schtd`/`tr.schtd2`) and yields one [`RowGroup`] per lecture section
///! together with the PS/lab rows listed under it.

use std::collections::HashMap;
use std::sync::LazyLock;

use regex::Regex;
use scraper::element_ref::Select;
use scraper::{ElementRef, Html, Selector};
use tracing::{debug, warn};

use super::normalizer::clean_text;
use super::types::{RawRow, RowGroup, SessionKind, SlotLegend, SubSessionRows};
use crate::error::StructureError;

fn css(selector: &str) -> Selector {
    Selector::parse(selector).expect("static CSS selector")
}

static COURSE_TABLE: LazyLock<Selector> = LazyLock::new(|| css(r#"table[border="1"][width="1300px"]"#));
static HEADER_ROW: LazyLock<Selector> = LazyLock::new(|| css("tr.schtitle"));
static DATA_ROW: LazyLock<Selector> = LazyLock::new(|| css("tr.schtd, tr.schtd2"));
static FONT: LazyLock<Selector> = LazyLock::new(|| css("font"));
static SPAN: LazyLock<Selector> = LazyLock::new(|| css("span"));
static ERROR_BANNER: LazyLock<Selector> = LazyLock::new(|| css("div.error"));
static TITLE: LazyLock<Selector> = LazyLock::new(|| css("title"));
static TABLE: LazyLock<Selector> = LazyLock::new(|| css("table"));
static LEGEND_TABLE: LazyLock<Selector> = LazyLock::new(|| css(r#"table[style="margin:20px 0"]"#));
static TR: LazyLock<Selector> = LazyLock::new(|| css("tr"));
static COLSPAN_TD: LazyLock<Selector> = LazyLock::new(|| css("td[colspan]"));
static GRAY_TD: LazyLock<Selector> = LazyLock::new(|| css("td.bodygray"));
static BOLD: LazyLock<Selector> = LazyLock::new(|| css("b"));

static SESSION_MARKER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(LAB|P\.S\.|PS|REC)\s*\d*$").expect("session regex"));
static ROOM_SEPARATOR: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"[,|]").expect("room regex"));
static SLOT_NUMBER: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"Slot\s*(\d+)").expect("slot regex"));
static SLOT_START: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r":\s*(\d{2}):(\d{2})\s*-").expect("slot time regex"));

/// Upper bound for a single cell's colspan; anything larger is markup noise
const MAX_COLSPAN: usize = 64;

/// Column positions resolved from the header row
#[derive(Debug, Clone, PartialEq, Eq)]
struct ColumnLayout {
    width: usize,
    code: usize,
    name: usize,
    days: usize,
    hours: usize,
    rooms: usize,
    credits: Option<usize>,
    ects: Option<usize>,
    instructor: Option<usize>,
}

impl ColumnLayout {
    fn from_headers(headers: &[String]) -> Result<Self, StructureError> {
        let index: HashMap<&str, usize> = headers
            .iter()
            .enumerate()
            .map(|(i, h)| (h.as_str(), i))
            .collect();
        let required = |name: &'static str| index.get(name).copied().ok_or(StructureError::ColumnMissing(name));

        Ok(Self {
            width: headers.len(),
            code: required("Code.Sec")?,
            name: required("Name")?,
            days: required("Days")?,
            hours: required("Hours")?,
            rooms: required("Rooms")?,
            credits: index.get("Cr.").copied(),
            ects: index.get("Ects").copied(),
            instructor: index.get("Instr.").copied(),
        })
    }

    /// Read one data row; `None` when it is shorter than the header
    fn read_row(&self, tr: ElementRef<'_>) -> Option<RawRow> {
        let cells = expand_cells(tr);
        if cells.len() < self.width {
            debug!("Skipping incomplete row ({} of {} cells)", cells.len(), self.width);
            return None;
        }

        let text = |idx: Option<usize>| {
            idx.and_then(|i| cells[i])
                .map(cell_text)
                .unwrap_or_default()
        };

        let code = cells[self.code]
            .map(|cell| match cell.select(&FONT).next() {
                Some(font) => cell_text(font),
                None => cell_text(cell),
            })
            .unwrap_or_default();

        Some(RawRow {
            code,
            name: text(Some(self.name)),
            credits: text(self.credits),
            ects: text(self.ects),
            instructor: text(self.instructor),
            days: text(Some(self.days)),
            hours: text(Some(self.hours)),
            rooms: cells[self.rooms].map(room_tokens).unwrap_or_default(),
        })
    }
}

/// Direct `td`/`th` children of a row, with `colspan=n` cells taking `n`
/// positions (only the first holds the element)
fn expand_cells(tr: ElementRef<'_>) -> Vec<Option<ElementRef<'_>>> {
    let mut cells = Vec::new();
    for cell in tr.children().filter_map(ElementRef::wrap) {
        if !matches!(cell.value().name(), "td" | "th") {
            continue;
        }
        let span = cell
            .value()
            .attr("colspan")
            .and_then(|v| v.trim().parse::<usize>().ok())
            .unwrap_or(1)
            .clamp(1, MAX_COLSPAN);
        cells.push(Some(cell));
        cells.extend(std::iter::repeat_n(None, span - 1));
    }
    cells
}

fn cell_text(el: ElementRef<'_>) -> String {
    clean_text(&el.text().collect::<String>())
}

/// Room names from a Rooms cell: the `<span>` entries if any, otherwise the
/// cell text split on `,` and `|`
fn room_tokens(cell: ElementRef<'_>) -> Vec<String> {
    let spans: Vec<String> = cell.select(&SPAN).map(cell_text).collect();
    if !spans.is_empty() {
        return spans
            .into_iter()
            .filter(|r| !r.is_empty() && r != "|")
            .collect();
    }

    ROOM_SEPARATOR
        .split(&cell_text(cell))
        .map(str::trim)
        .filter(|r| !r.is_empty())
        .map(str::to_string)
        .collect()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum RowKind {
    Blank,
    Primary,
    Session(SessionKind),
    Continuation,
}

fn classify(row: &RawRow) -> RowKind {
    if let Some(caps) = SESSION_MARKER.captures(row.name.trim()) {
        if let Some(kind) = SessionKind::from_marker(&caps[1]) {
            return RowKind::Session(kind);
        }
    }
    if !row.code.trim().is_empty() {
        RowKind::Primary
    } else if row.has_schedule() {
        RowKind::Continuation
    } else {
        RowKind::Blank
    }
}

/// Lazy iterator over the row groups of one course table
pub struct RowGroups<'a> {
    rows: Select<'a, 'static>,
    layout: ColumnLayout,
    pending: Option<RawRow>,
}

impl RowGroups<'_> {
    fn next_raw(&mut self) -> Option<RawRow> {
        if let Some(row) = self.pending.take() {
            return Some(row);
        }
        loop {
            let tr = self.rows.next()?;
            if let Some(row) = self.layout.read_row(tr) {
                return Some(row);
            }
        }
    }
}

impl Iterator for RowGroups<'_> {
    type Item = RowGroup;

    fn next(&mut self) -> Option<RowGroup> {
        let mut group = loop {
            let row = self.next_raw()?;
            match classify(&row) {
                RowKind::Primary => break RowGroup::new(row),
                RowKind::Blank => continue,
                RowKind::Session(kind) => debug!("Skipping {} row with no parent section", kind),
                RowKind::Continuation => debug!("Skipping meeting row with no parent section"),
            }
        };

        while let Some(row) = self.next_raw() {
            match classify(&row) {
                RowKind::Primary => {
                    self.pending = Some(row);
                    break;
                }
                RowKind::Blank => continue,
                RowKind::Session(kind) => group.sessions.push(SubSessionRows { kind, rows: vec![row] }),
                RowKind::Continuation => match group.sessions.last_mut() {
                    Some(session) => session.rows.push(row),
                    None => group.lecture.push(row),
                },
            }
        }

        Some(group)
    }
}

/// Reject pages carrying the registration system's error banner
pub fn check_error_banner(document: &Html) -> Result<(), StructureError> {
    match document.select(&ERROR_BANNER).next() {
        Some(banner) => Err(StructureError::ErrorPage(cell_text(banner))),
        None => Ok(()),
    }
}

/// Locate the course table and return its row groups.
///
/// Fails when the page shows an error banner or when the table, its header
/// row or one of the required columns is missing.
pub fn extract_row_groups(document: &Html) -> Result<RowGroups<'_>, StructureError> {
    check_error_banner(document)?;

    let table = document
        .select(&COURSE_TABLE)
        .next()
        .ok_or(StructureError::TableMissing)?;

    let header = table
        .select(&HEADER_ROW)
        .next()
        .ok_or(StructureError::HeaderMissing)?;

    let headers: Vec<String> = expand_cells(header)
        .into_iter()
        .map(|cell| cell.map(cell_text).unwrap_or_default())
        .collect();
    let layout = ColumnLayout::from_headers(&headers)?;
    debug!("Course table columns: {:?}", headers);

    Ok(RowGroups {
        rows: table.select(&DATA_ROW),
        layout,
        pending: None,
    })
}

/// Parse the slot legend ("Slot 1 : 09:00 - 09:50", …) into slot → start hour.
/// Returns an empty map when the legend is absent.
pub fn parse_slot_legend(document: &Html) -> SlotLegend {
    let mut legend = SlotLegend::new();

    let Some(table) = document.select(&LEGEND_TABLE).next() else {
        warn!("Time slot legend not found on page");
        return legend;
    };

    for row in table.select(&TR) {
        if row.select(&COLSPAN_TD).next().is_some() {
            continue;
        }

        let cells: Vec<ElementRef<'_>> = row.select(&GRAY_TD).collect();
        for pair in cells.chunks_exact(2) {
            let (slot_cell, time_cell) = (pair[0], pair[1]);
            if slot_cell.select(&BOLD).next().is_none() {
                continue;
            }

            let slot_text = cell_text(slot_cell);
            let time_text = cell_text(time_cell);

            let slot = SLOT_NUMBER
                .captures(&slot_text)
                .and_then(|c| c[1].parse::<u8>().ok());
            let start = SLOT_START
                .captures(&time_text)
                .and_then(|c| c[1].parse::<u8>().ok());

            match (slot, start) {
                (Some(slot), Some(hour)) => {
                    legend.insert(slot, hour);
                }
                _ => debug!("Unrecognised slot legend pair '{}' / '{}'", slot_text, time_text),
            }
        }
    }

    debug!("Parsed {} time slots: {:?}", legend.len(), legend);
    legend
}

/// Page title and table count, logged in test mode
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageSummary {
    pub title: Option<String>,
    pub tables: usize,
}

pub fn summarize_page(document: &Html) -> PageSummary {
    PageSummary {
        title: document.select(&TITLE).next().map(cell_text),
        tables: document.select(&TABLE).count(),
    }
}
