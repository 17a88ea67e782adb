///! Course section record, the unit written to the output JSON

use serde::{Deserialize, Serialize};

/// One schedulable teaching unit (lecture, lab or PS group)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CourseSection {
    /// Section key, e.g. "CMPE150.01" or "CMPE150.01 PS 1"
    pub code: String,
    /// Credit hours (0 for PS/lab sub-sessions)
    pub credits: u32,
    /// ECTS credits
    pub ects: f64,
    /// Instructor name as listed, may be empty
    pub instructor: String,
    /// Course title, suffixed with the sub-session type for PS/lab
    pub name: String,
    /// Day codes (M, T, W, Th, F, St, Su), parallel to `hours` and `rooms`
    pub days: Vec<String>,
    /// Slot indices, parallel to `days`
    pub hours: Vec<u8>,
    /// Room identifiers, parallel to `days`
    pub rooms: Vec<String>,
}

impl CourseSection {
    /// A section with no meeting information at all
    pub fn is_unscheduled(&self) -> bool {
        self.days.is_empty() && self.hours.is_empty() && self.rooms.is_empty()
    }

    /// Number of (day, hour, room) meetings, or `None` if the three lists disagree
    pub fn meeting_count(&self) -> Option<usize> {
        let n = self.days.len();
        (self.hours.len() == n && self.rooms.len() == n).then_some(n)
    }
}
