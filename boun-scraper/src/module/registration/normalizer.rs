///! Record normalizer
///!
///! Turns raw row groups into [`CourseSection`]s: cleans cell text, parses
///! the numeric columns, splits merged schedule cells into parallel
///! (day, hour, room) triples and names PS/lab sub-sessions.

use std::collections::HashMap;
use std::sync::LazyLock;

use boun_common::CourseSection;
use regex::Regex;
use tracing::{debug, warn};

use super::types::{RawRow, RowGroup, SessionKind};
use crate::error::FieldParseError;

static DAY_CODE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"Th|St|Su|[MTWF]").expect("day regex"));

/// Slots are numbered 1..=8 on the registration site
const MAX_SLOT: u8 = 8;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct NormalizeOptions {
    /// Keep sections that have no meeting information
    pub include_unscheduled: bool,
}

/// Trim and collapse whitespace runs (including non-breaking spaces)
pub fn clean_text(s: &str) -> String {
    s.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// "CMPE 150.01" → "CMPE150.01"
pub fn normalize_code(s: &str) -> String {
    s.chars()
        .filter(|c| !c.is_whitespace())
        .collect::<String>()
        .to_ascii_uppercase()
}

/// Repair room names whose Turkish capitals were decoded as Latin-1
pub fn fix_room_text(s: &str) -> String {
    clean_text(s).replace('Ý', "İ").replace('ý', "i")
}

pub fn parse_days(s: &str) -> Vec<String> {
    DAY_CODE.find_iter(s).map(|m| m.as_str().to_string()).collect()
}

/// Every digit 1..=8, in order ("333" → [3, 3, 3], "56" → [5, 6])
pub fn parse_hours(s: &str) -> Vec<u8> {
    s.chars()
        .filter_map(|c| c.to_digit(10))
        .map(|d| d as u8)
        .filter(|d| (1..=MAX_SLOT).contains(d))
        .collect()
}

/// Empty cells mean 0; anything else must be a non-negative integer
pub fn parse_credits(s: &str) -> Result<u32, FieldParseError> {
    let s = s.trim();
    if s.is_empty() {
        return Ok(0);
    }
    s.parse::<u32>().map_err(|_| FieldParseError {
        field: "credits",
        raw: s.to_string(),
    })
}

/// Empty cells mean 0.0; a decimal comma is accepted ("7,5")
pub fn parse_ects(s: &str) -> Result<f64, FieldParseError> {
    let s = s.trim();
    if s.is_empty() {
        return Ok(0.0);
    }
    match s.replace(',', ".").parse::<f64>() {
        Ok(v) if v.is_finite() && v >= 0.0 => Ok(v),
        _ => Err(FieldParseError {
            field: "ects",
            raw: s.to_string(),
        }),
    }
}

/// Hour recorded for a meeting whose Hours cell was empty
pub const UNKNOWN_SLOT: u8 = 0;

/// Parallel day/hour/room lists of one row
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Meetings {
    pub days: Vec<String>,
    pub hours: Vec<u8>,
    pub rooms: Vec<String>,
    /// Days or hours were missing while other schedule cells were filled
    pub incomplete: bool,
}

/// Pad `v` to `len` with its last entry, or with `filler` when it is empty
fn pad<T: Clone>(v: &mut Vec<T>, len: usize, filler: T) {
    let fill = v.last().cloned().unwrap_or(filler);
    v.resize(len, fill);
}

/// Split one row's schedule cells into equal-length lists.
///
/// Shorter lists repeat their last entry ("MWF" / "3" / "M2170" is three
/// meetings in slot 3, room M2170). Missing rooms and days become empty
/// strings and missing hours become [`UNKNOWN_SLOT`]. Rows lacking
/// days or hours are flagged `incomplete`; a row with no schedule cells at
/// all yields no meetings.
pub fn meeting_block(row: &RawRow) -> Meetings {
    let mut days = parse_days(&row.days);
    let mut hours = parse_hours(&row.hours);
    let mut rooms: Vec<String> = row
        .rooms
        .iter()
        .map(|r| fix_room_text(r))
        .filter(|r| !r.is_empty())
        .collect();

    if days.is_empty() && hours.is_empty() && rooms.is_empty() {
        return Meetings::default();
    }
    let incomplete = days.is_empty() || hours.is_empty();

    let len = days.len().max(hours.len()).max(rooms.len());
    pad(&mut days, len, String::new());
    pad(&mut hours, len, UNKNOWN_SLOT);
    pad(&mut rooms, len, String::new());

    Meetings {
        days,
        hours,
        rooms,
        incomplete,
    }
}

/// Append the meeting blocks of `rows` to `section`, returning how many
/// rows were incomplete
fn append_meetings<'a>(section: &mut CourseSection, rows: impl IntoIterator<Item = &'a RawRow>) -> usize {
    let mut incomplete = 0;
    for row in rows {
        let block = meeting_block(row);
        if block.incomplete {
            incomplete += 1;
            warn!(
                "{}: incomplete schedule row (days '{}', hours '{}', rooms {:?}), missing values left blank",
                section.code, row.days, row.hours, row.rooms
            );
        }
        section.days.extend(block.days);
        section.hours.extend(block.hours);
        section.rooms.extend(block.rooms);
    }
    incomplete
}

fn section(code: String, credits: u32, ects: f64, instructor: String, name: String) -> CourseSection {
    CourseSection {
        code,
        credits,
        ects,
        instructor,
        name,
        days: Vec::new(),
        hours: Vec::new(),
        rooms: Vec::new(),
    }
}

/// One lecture section while its page is being read
struct PageEntry {
    lecture: CourseSection,
    sessions: Vec<CourseSection>,
    counters: HashMap<SessionKind, usize>,
    incomplete_rows: usize,
}

impl PageEntry {
    fn new(code: String, primary: &RawRow) -> Self {
        let credits = parse_credits(&primary.credits).unwrap_or_else(|e| {
            debug!("{}: {}, using 0", code, e);
            0
        });
        let ects = parse_ects(&primary.ects).unwrap_or_else(|e| {
            debug!("{}: {}, using 0.0", code, e);
            0.0
        });

        Self {
            lecture: section(
                code,
                credits,
                ects,
                clean_text(&primary.instructor),
                clean_text(&primary.name),
            ),
            sessions: Vec::new(),
            counters: HashMap::new(),
            incomplete_rows: 0,
        }
    }

    /// Add the meetings and sub-sessions of `group`; ordinals continue per kind
    fn absorb(&mut self, group: &RowGroup) {
        self.incomplete_rows += append_meetings(&mut self.lecture, &group.lecture);

        for session in &group.sessions {
            let ordinal = self.counters.entry(session.kind).or_insert(0);
            *ordinal += 1;
            let suffix = format!("{} {}", session.kind, ordinal);

            let mut sub = section(
                format!("{} {}", self.lecture.code, suffix),
                0,
                0.0,
                self.lecture.instructor.clone(),
                format!("{} {}", self.lecture.name, suffix),
            );
            self.incomplete_rows += append_meetings(&mut sub, &session.rows);
            self.sessions.push(sub);
        }
    }
}

/// Sections of one page plus what was only partly readable
#[derive(Debug, Clone, Default, PartialEq)]
pub struct NormalizedPage {
    pub sections: Vec<CourseSection>,
    /// Rows kept with a blank day or hour
    pub incomplete_rows: usize,
}

/// Normalize every group of one page, in page order.
///
/// Groups sharing a lecture code are merged into one section (all meeting
/// blocks kept). Sub-sessions follow their lecture. Sections without any
/// schedule cells are dropped unless `include_unscheduled` is set.
pub fn normalize_page<I>(groups: I, options: NormalizeOptions) -> NormalizedPage
where
    I: IntoIterator<Item = RowGroup>,
{
    let mut entries: Vec<PageEntry> = Vec::new();
    let mut by_code: HashMap<String, usize> = HashMap::new();

    for group in groups {
        let code = normalize_code(&group.primary().code);
        let idx = match by_code.get(&code) {
            Some(&idx) => {
                debug!("{} listed again, merging meeting blocks", code);
                idx
            }
            None => {
                entries.push(PageEntry::new(code.clone(), group.primary()));
                by_code.insert(code, entries.len() - 1);
                entries.len() - 1
            }
        };
        entries[idx].absorb(&group);
    }

    let incomplete_rows = entries.iter().map(|e| e.incomplete_rows).sum();
    let sections = entries
        .into_iter()
        .flat_map(|entry| std::iter::once(entry.lecture).chain(entry.sessions))
        .filter(|s| {
            let keep = options.include_unscheduled || !s.is_unscheduled();
            if !keep {
                debug!("Skipping unscheduled section: {}", s.code);
            }
            keep
        })
        .collect();

    NormalizedPage {
        sections,
        incomplete_rows,
    }
}

/// Normalize a single row group: the lecture plus one section per sub-session
pub fn normalize_group(group: RowGroup, options: NormalizeOptions) -> Vec<CourseSection> {
    normalize_page(std::iter::once(group), options).sections
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::module::registration::types::SubSessionRows;

    fn row(code: &str, name: &str, days: &str, hours: &str, rooms: &[&str]) -> RawRow {
        RawRow {
            code: code.to_string(),
            name: name.to_string(),
            credits: "3".to_string(),
            ects: "6".to_string(),
            instructor: "ARDA  YURDAKUL".to_string(),
            days: days.to_string(),
            hours: hours.to_string(),
            rooms: rooms.iter().map(|r| r.to_string()).collect(),
        }
    }

    fn session(kind: SessionKind, days: &str, hours: &str, room: &str) -> SubSessionRows {
        SubSessionRows {
            kind,
            rows: vec![row("", kind.as_str(), days, hours, &[room])],
        }
    }

    #[test]
    fn test_clean_text_and_code() {
        assert_eq!(clean_text("  INTRO\u{a0}TO \n  COMPUTING "), "INTRO TO COMPUTING");
        assert_eq!(normalize_code(" cmpe 150.01 "), "CMPE150.01");
        assert_eq!(fix_room_text("ÝB 101"), "İB 101");
        assert_eq!(fix_room_text("KUZEY KAMPÜS"), "KUZEY KAMPÜS");
    }

    #[test]
    fn test_parse_days_and_hours() {
        assert_eq!(parse_days("MWF"), vec!["M", "W", "F"]);
        assert_eq!(parse_days("TTh"), vec!["T", "Th"]);
        assert_eq!(parse_days("St Su"), vec!["St", "Su"]);
        assert_eq!(parse_hours("333"), vec![3, 3, 3]);
        assert_eq!(parse_hours("5 6 9 0"), vec![5, 6]);
        assert!(parse_hours("").is_empty());
    }

    #[test]
    fn test_numeric_fields() {
        assert_eq!(parse_credits(""), Ok(0));
        assert_eq!(parse_credits(" 4 "), Ok(4));
        assert!(parse_credits("3.5").is_err());
        assert_eq!(parse_ects("7,5"), Ok(7.5));
        assert_eq!(parse_ects(""), Ok(0.0));
        assert!(parse_ects("n/a").is_err());
        assert!(parse_ects("-1").is_err());
    }

    #[test]
    fn test_merged_schedule_cells_split_into_triples() {
        let group = RowGroup::new(row("CMPE 150.01", "INTRO", "M W F", "3", &["M2170"]));
        let sections = normalize_group(group, NormalizeOptions::default());
        assert_eq!(sections.len(), 1);
        let s = &sections[0];
        assert_eq!(s.code, "CMPE150.01");
        assert_eq!(s.days, vec!["M", "W", "F"]);
        assert_eq!(s.hours, vec![3, 3, 3]);
        assert_eq!(s.rooms, vec!["M2170", "M2170", "M2170"]);
        assert_eq!(s.instructor, "ARDA YURDAKUL");
    }

    #[test]
    fn test_meeting_block_edge_cases() {
        let no_room = meeting_block(&row("X", "", "TTh", "12", &[]));
        assert_eq!(no_room.days, vec!["T", "Th"]);
        assert_eq!(no_room.rooms, vec!["", ""]);

        assert!(!no_room.incomplete);
        assert_eq!(meeting_block(&row("X", "", "", "", &[])), Meetings::default());

        let no_days = meeting_block(&row("X", "", "", "12", &["R1"]));
        assert_eq!(no_days.days, vec!["", ""]);
        assert_eq!(no_days.hours, vec![1, 2]);
        assert_eq!(no_days.rooms, vec!["R1", "R1"]);
        assert!(no_days.incomplete);

        let no_hours = meeting_block(&row("X", "", "M", "", &["R1"]));
        assert_eq!(no_hours.hours, vec![UNKNOWN_SLOT]);
        assert!(no_hours.incomplete);

        let padded_days = meeting_block(&row("X", "", "T", "56", &["BM B3"]));
        assert_eq!(padded_days.days, vec!["T", "T"]);
        assert_eq!(padded_days.hours, vec![5, 6]);
    }

    #[test]
    fn test_sub_session_keys() {
        let mut group = RowGroup::new(row("CMPE 150.01", "INTRO", "MWF", "333", &["M2170"]));
        group.sessions.push(session(SessionKind::Ps, "F", "7", "BM A2"));
        group.sessions.push(session(SessionKind::Lab, "T", "5", "BM B3"));
        group.sessions.push(session(SessionKind::Ps, "Th", "8", "NH101"));

        let sections = normalize_group(group, NormalizeOptions::default());
        let codes: Vec<&str> = sections.iter().map(|s| s.code.as_str()).collect();
        assert_eq!(
            codes,
            vec!["CMPE150.01", "CMPE150.01 PS 1", "CMPE150.01 LAB 1", "CMPE150.01 PS 2"]
        );

        let ps = &sections[1];
        assert_eq!(ps.credits, 0);
        assert_eq!(ps.ects, 0.0);
        assert_eq!(ps.name, "INTRO PS 1");
        assert_eq!(ps.instructor, "ARDA YURDAKUL");
        assert_eq!(ps.days, vec!["F"]);
    }

    #[test]
    fn test_many_sessions_have_distinct_keys() {
        let mut group = RowGroup::new(row("EE 211.01", "CIRCUITS", "M", "1", &["R"]));
        for _ in 0..12 {
            group.sessions.push(session(SessionKind::Lab, "W", "2", "LAB"));
        }
        let sections = normalize_group(group, NormalizeOptions::default());
        let mut codes: Vec<&str> = sections.iter().map(|s| s.code.as_str()).collect();
        codes.sort_unstable();
        codes.dedup();
        assert_eq!(codes.len(), 13);
    }

    #[test]
    fn test_empty_credits_default_to_zero() {
        let mut primary = row("CMPE 160.01", "OOP", "M", "1", &["R"]);
        primary.credits = String::new();
        primary.ects = "abc".to_string();
        let sections = normalize_group(RowGroup::new(primary), NormalizeOptions::default());
        assert_eq!(sections[0].credits, 0);
        assert_eq!(sections[0].ects, 0.0);
    }

    #[test]
    fn test_unscheduled_policy() {
        let group = || RowGroup::new(row("CMPE 300.01", "ALGORITHMS", "", "", &[]));
        assert!(normalize_group(group(), NormalizeOptions::default()).is_empty());

        let kept = normalize_group(group(), NormalizeOptions { include_unscheduled: true });
        assert_eq!(kept.len(), 1);
        assert!(kept[0].is_unscheduled());
    }

    #[test]
    fn test_days_only_row_is_kept_under_both_policies() {
        for include_unscheduled in [false, true] {
            let group = RowGroup::new(row("CMPE 492.01", "PROJECT", "M", "", &["BM A2"]));
            let page = normalize_page(vec![group], NormalizeOptions { include_unscheduled });

            assert_eq!(page.incomplete_rows, 1);
            assert_eq!(page.sections.len(), 1);
            let s = &page.sections[0];
            assert!(!s.is_unscheduled());
            assert_eq!(s.days, vec!["M"]);
            assert_eq!(s.hours, vec![UNKNOWN_SLOT]);
            assert_eq!(s.rooms, vec!["BM A2"]);
        }
    }

    #[test]
    fn test_rooms_only_row_is_kept_under_both_policies() {
        for include_unscheduled in [false, true] {
            let mut group = RowGroup::new(row("CMPE 492.01", "PROJECT", "T", "5", &["BM A2"]));
            group.sessions.push(session(SessionKind::Lab, "", "", "BM B3"));
            let page = normalize_page(vec![group], NormalizeOptions { include_unscheduled });

            assert_eq!(page.incomplete_rows, 1);
            let lab = &page.sections[1];
            assert_eq!(lab.code, "CMPE492.01 LAB 1");
            assert!(!lab.is_unscheduled());
            assert_eq!(lab.days, vec![""]);
            assert_eq!(lab.hours, vec![UNKNOWN_SLOT]);
            assert_eq!(lab.rooms, vec!["BM B3"]);
        }
    }

    #[test]
    fn test_repeated_code_accumulates_meetings() {
        let mut first = RowGroup::new(row("CMPE 160.01", "OOP", "TTh", "23", &["A", "B"]));
        first.lecture.push(row("", "", "F", "1", &["C"]));
        first.sessions.push(session(SessionKind::Ps, "M", "8", "D"));
        let mut second = RowGroup::new(row("CMPE160.01", "OOP", "W", "4", &["E"]));
        second.sessions.push(session(SessionKind::Ps, "T", "8", "F"));

        let page = normalize_page(vec![first, second], NormalizeOptions::default());
        assert_eq!(page.incomplete_rows, 0);
        let sections = page.sections;
        let codes: Vec<&str> = sections.iter().map(|s| s.code.as_str()).collect();
        assert_eq!(codes, vec!["CMPE160.01", "CMPE160.01 PS 1", "CMPE160.01 PS 2"]);

        let lecture = &sections[0];
        assert_eq!(lecture.days, vec!["T", "Th", "F", "W"]);
        assert_eq!(lecture.hours, vec![2, 3, 1, 4]);
        assert_eq!(lecture.rooms, vec!["A", "B", "C", "E"]);
    }

    #[test]
    fn test_parallel_lengths_hold() {
        let mut group = RowGroup::new(row("PHYS 101.01", "PHYSICS", "MWF", "12", &["A", "B", "C", "D"]));
        group.lecture.push(row("", "", "St", "", &["X"]));
        group.sessions.push(session(SessionKind::Lab, "TTh", "5", ""));
        for s in normalize_group(group, NormalizeOptions { include_unscheduled: true }) {
            assert!(s.meeting_count().is_some(), "{} has ragged schedule lists", s.code);
        }
    }
}
