///! Semester codes of the form `YYYY-YYYY-S`

use std::fmt;
use std::str::FromStr;
use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};
use thiserror::Error;

static SEMESTER_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(\d{4})-(\d{4})-([123])$").expect("valid semester regex"));

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SemesterError {
    #[error("invalid semester code '{0}', expected YYYY-YYYY-S with S in 1..3 (e.g. 2024-2025-1)")]
    Format(String),

    #[error("invalid semester code '{code}': {end} must directly follow {start}")]
    YearSpan { code: String, start: u16, end: u16 },
}

/// Academic term
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Term {
    Fall,
    Spring,
    Summer,
}

impl Term {
    pub fn number(&self) -> u8 {
        match self {
            Term::Fall => 1,
            Term::Spring => 2,
            Term::Summer => 3,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Term::Fall => "Fall Semester",
            Term::Spring => "Spring Semester",
            Term::Summer => "Summer Semester",
        }
    }

    fn from_number(n: u8) -> Option<Self> {
        match n {
            1 => Some(Term::Fall),
            2 => Some(Term::Spring),
            3 => Some(Term::Summer),
            _ => None,
        }
    }
}

/// A validated semester, e.g. `2024-2025-1` (Fall 2024)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SemesterCode {
    pub start_year: u16,
    pub end_year: u16,
    pub term: Term,
}

impl SemesterCode {
    /// Value of the registration site's `donem` parameter, e.g. `2024/2025-1`
    pub fn donem(&self) -> String {
        format!("{}/{}-{}", self.start_year, self.end_year, self.term.number())
    }

    /// e.g. "Fall Semester 2024-2025"
    pub fn label(&self) -> String {
        format!("{} {}-{}", self.term.label(), self.start_year, self.end_year)
    }
}

impl FromStr for SemesterCode {
    type Err = SemesterError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let code = s.trim();
        let caps = SEMESTER_RE
            .captures(code)
            .ok_or_else(|| SemesterError::Format(s.to_string()))?;

        let parse = |i: usize| caps[i].parse::<u16>().map_err(|_| SemesterError::Format(s.to_string()));
        let start_year = parse(1)?;
        let end_year = parse(2)?;
        if end_year != start_year + 1 {
            return Err(SemesterError::YearSpan {
                code: code.to_string(),
                start: start_year,
                end: end_year,
            });
        }

        let term = caps[3]
            .parse::<u8>()
            .ok()
            .and_then(Term::from_number)
            .ok_or_else(|| SemesterError::Format(s.to_string()))?;

        Ok(Self { start_year, end_year, term })
    }
}

impl fmt::Display for SemesterCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}-{}", self.start_year, self.end_year, self.term.number())
    }
}
