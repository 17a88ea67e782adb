///! Shared domain types for the Boğaziçi course information scraper.

pub mod catalog;
pub mod semester;
pub mod types;

pub use catalog::{Catalog, Department};
pub use semester::{SemesterCode, SemesterError, Term};
pub use types::CourseSection;
