use std::collections::BTreeMap;

use boun_common::CourseSection;

/// All sections of a run, keyed by code. Later departments overwrite earlier
/// ones on key collision.
#[derive(Debug, Default)]
pub struct Aggregate {
    sections: BTreeMap<String, CourseSection>,
    collisions: usize,
}

impl Aggregate {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert the sections scraped from `department`, returning how many were added
    pub fn merge(&mut self, department: &str, sections: Vec<CourseSection>) -> usize {
        let mut added = 0;
        for section in sections {
            if let Some(previous) = self.sections.insert(section.code.clone(), section) {
                self.collisions += 1;
                tracing::warn!(
                    "Duplicate section {} overwritten by department {} (was '{}')",
                    previous.code,
                    department,
                    previous.name
                );
            } else {
                added += 1;
            }
        }
        added
    }

    pub fn len(&self) -> usize {
        self.sections.len()
    }

    pub fn collisions(&self) -> usize {
        self.collisions
    }

    pub fn into_map(self) -> BTreeMap<String, CourseSection> {
        self.sections
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn section(code: &str, name: &str) -> CourseSection {
        CourseSection {
            code: code.to_string(),
            credits: 3,
            ects: 6.0,
            instructor: "STAFF".to_string(),
            name: name.to_string(),
            days: vec!["M".to_string()],
            hours: vec![1],
            rooms: vec!["NH 101".to_string()],
        }
    }

    #[test]
    fn test_merge_sorted_by_code() {
        let mut agg = Aggregate::new();
        agg.merge("MATH", vec![section("MATH101.01", "CALCULUS")]);
        agg.merge("CMPE", vec![section("CMPE150.01", "INTRO")]);

        assert_eq!(agg.collisions(), 0);
        let keys: Vec<String> = agg.into_map().into_keys().collect();
        assert_eq!(keys, vec!["CMPE150.01", "MATH101.01"]);
    }

    #[test]
    fn test_last_write_wins() {
        let mut agg = Aggregate::new();
        assert_eq!(agg.merge("CMPE", vec![section("CMPE150.01", "FIRST")]), 1);
        assert_eq!(agg.merge("CMPE", vec![section("CMPE150.01", "SECOND")]), 0);

        assert_eq!(agg.len(), 1);
        assert_eq!(agg.collisions(), 1);
        assert_eq!(agg.into_map()["CMPE150.01"].name, "SECOND");
    }
}
