///! Raw (unparsed) table data handed from the extractor to the normalizer

use std::collections::BTreeMap;
use std::fmt;

/// Kind of a sub-session row listed under a lecture section
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum SessionKind {
    /// Problem session ("PS" or "P.S." on the page)
    Ps,
    /// Laboratory or recitation ("LAB" or "REC" on the page)
    Lab,
}

impl SessionKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            SessionKind::Ps => "PS",
            SessionKind::Lab => "LAB",
        }
    }

    /// Map the marker found in the Name column, e.g. "P.S." or "REC"
    pub fn from_marker(marker: &str) -> Option<Self> {
        match marker {
            "PS" | "P.S." => Some(SessionKind::Ps),
            "LAB" | "REC" => Some(SessionKind::Lab),
            _ => None,
        }
    }
}

impl fmt::Display for SessionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Text of one `tr.schtd`/`tr.schtd2` row, cell by cell
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawRow {
    pub code: String,
    pub name: String,
    pub credits: String,
    pub ects: String,
    pub instructor: String,
    pub days: String,
    pub hours: String,
    /// Room tokens as listed (spans or separator-split text)
    pub rooms: Vec<String>,
}

impl RawRow {
    pub fn has_schedule(&self) -> bool {
        !self.days.trim().is_empty() || !self.hours.trim().is_empty() || !self.rooms.is_empty()
    }
}

/// Rows of one PS/lab sub-session: the marker row plus any continuation rows
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubSessionRows {
    pub kind: SessionKind,
    pub rows: Vec<RawRow>,
}

/// One lecture section and everything listed under it
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RowGroup {
    /// First row carries code/name/credits; later rows add meeting blocks
    pub lecture: Vec<RawRow>,
    pub sessions: Vec<SubSessionRows>,
}

impl RowGroup {
    pub fn new(primary: RawRow) -> Self {
        Self {
            lecture: vec![primary],
            sessions: Vec::new(),
        }
    }

    pub fn primary(&self) -> &RawRow {
        &self.lecture[0]
    }
}

/// Slot number → start hour, from the page's slot legend
pub type SlotLegend = BTreeMap<u8, u8>;
