use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use boun_common::CourseSection;

/// Write the run's sections as pretty-printed UTF-8 JSON, creating parent
/// directories as needed.
pub fn write_json(path: &Path, sections: &BTreeMap<String, CourseSection>) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).with_context(|| format!("Failed to create directory {:?}", parent))?;
    }

    let json = serde_json::to_string_pretty(sections).context("Failed to serialize sections")?;
    fs::write(path, json).with_context(|| format!("Failed to write {:?}", path))?;

    tracing::info!("Wrote {} sections to {:?}", sections.len(), path);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn sections() -> BTreeMap<String, CourseSection> {
        let section = CourseSection {
            code: "CMPE160.01".to_string(),
            credits: 0,
            ects: 7.5,
            instructor: "ÖZGÜR ÖZTÜRK".to_string(),
            name: "OOP".to_string(),
            days: vec!["T".to_string()],
            hours: vec![2],
            rooms: vec!["İB 101".to_string()],
        };
        BTreeMap::from([(section.code.clone(), section)])
    }

    #[test]
    fn test_creates_parent_dirs() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("out/2024/courses.json");

        write_json(&path, &sections()).unwrap();

        let content = fs::read_to_string(&path).unwrap();
        let parsed: BTreeMap<String, CourseSection> = serde_json::from_str(&content).unwrap();
        assert_eq!(parsed, sections());
    }

    #[test]
    fn test_pretty_and_unescaped() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("courses.json");

        write_json(&path, &sections()).unwrap();

        let content = fs::read_to_string(&path).unwrap();
        assert!(content.starts_with("{\n  \"CMPE160.01\": {\n    \"code\""));
        assert!(content.contains("ÖZGÜR ÖZTÜRK"));
        assert!(content.contains("İB 101"));
    }

    #[test]
    fn test_unwritable_path_fails() {
        let dir = TempDir::new().unwrap();
        let blocker = dir.path().join("file");
        fs::write(&blocker, "x").unwrap();

        assert!(write_json(&blocker.join("courses.json"), &sections()).is_err());
    }
}
